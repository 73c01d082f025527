use std::collections::{BTreeMap, HashMap, HashSet, btree_map::Entry};

use crate::expr::{Expr, Node, Var};

/// Runs a reverse pass from `output` and returns `∂output/∂var` for every
/// variable that `output` reaches.
///
/// Adjoints are built as expressions, so the returned derivatives can be
/// differentiated again. Variables that `output` does not reach are absent.
pub(crate) fn adjoints(output: &Expr) -> BTreeMap<Var, Expr> {
    let order = post_order(output);

    let mut pending: HashMap<*const Node, Expr> = HashMap::new();
    pending.insert(output.key(), Expr::constant(1.0));

    let mut vars: BTreeMap<Var, Expr> = BTreeMap::new();

    // Reverse post-order visits every node after all of its parents.
    for expr in order.iter().rev() {
        let Some(adjoint) = pending.remove(&expr.key()) else {
            continue;
        };

        match expr.node() {
            Node::Const(_) => {}
            Node::Var(var) => accumulate(vars.entry(*var), adjoint),
            Node::Add([a, b]) => {
                push(&mut pending, a, adjoint.clone());
                push(&mut pending, b, adjoint);
            }
            Node::Mul([a, b]) => {
                push(&mut pending, a, Expr::times(&adjoint, b));
                push(&mut pending, b, Expr::times(&adjoint, a));
            }
            Node::Neg(a) => push(&mut pending, a, Expr::negate(&adjoint)),
            Node::Exp(a) => push(&mut pending, a, Expr::times(&adjoint, expr)),
            Node::Ln(a) => push(&mut pending, a, Expr::over(&adjoint, a)),
            Node::Powi(a, n) => {
                let local = Expr::times(&Expr::constant(f64::from(*n)), &a.powi(n - 1));
                push(&mut pending, a, Expr::times(&adjoint, &local));
            }
            Node::Sum(terms) => {
                for term in terms {
                    push(&mut pending, term, adjoint.clone());
                }
            }
        }
    }

    vars
}

fn push(pending: &mut HashMap<*const Node, Expr>, target: &Expr, contribution: Expr) {
    match pending.get_mut(&target.key()) {
        Some(existing) => *existing = Expr::plus(existing, &contribution),
        None => {
            pending.insert(target.key(), contribution);
        }
    }
}

fn accumulate(entry: Entry<'_, Var, Expr>, contribution: Expr) {
    match entry {
        Entry::Occupied(mut occupied) => {
            let total = Expr::plus(occupied.get(), &contribution);
            occupied.insert(total);
        }
        Entry::Vacant(vacant) => {
            vacant.insert(contribution);
        }
    }
}

/// Returns every node reachable from `root`, children before parents.
fn post_order(root: &Expr) -> Vec<Expr> {
    let mut visited: HashSet<*const Node> = HashSet::new();
    let mut order = Vec::new();
    let mut stack = vec![(root.clone(), false)];

    while let Some((expr, expanded)) = stack.pop() {
        if expanded {
            order.push(expr);
            continue;
        }
        if !visited.insert(expr.key()) {
            continue;
        }

        stack.push((expr.clone(), true));
        for child in expr.children() {
            if !visited.contains(&child.key()) {
                stack.push((child.clone(), false));
            }
        }
    }

    order
}
