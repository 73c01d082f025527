mod ops;

use std::{collections::HashMap, rc::Rc};

use natgrad_core::ParameterVector;

use crate::SymbolicError;

/// Identifies one element of one parameter tensor.
///
/// `index` is the element's position in logical (row-major) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var {
    pub param: usize,
    pub index: usize,
}

/// A differentiable scalar expression.
///
/// Expressions are immutable DAGs with shared subterms. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Expr(Rc<Node>);

#[derive(Debug)]
pub(crate) enum Node {
    Const(f64),
    Var(Var),
    Add([Expr; 2]),
    Mul([Expr; 2]),
    Neg(Expr),
    Exp(Expr),
    Ln(Expr),
    Powi(Expr, i32),
    Sum(Vec<Expr>),
}

impl Expr {
    fn from_node(node: Node) -> Self {
        Self(Rc::new(node))
    }

    /// A constant.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::from_node(Node::Const(value))
    }

    /// A parameter element.
    #[must_use]
    pub fn var(var: Var) -> Self {
        Self::from_node(Node::Var(var))
    }

    /// Returns the value if this expression is a constant.
    #[must_use]
    pub fn as_constant(&self) -> Option<f64> {
        match *self.0 {
            Node::Const(c) => Some(c),
            _ => None,
        }
    }

    /// Sums any number of expressions. An empty sum is zero.
    #[must_use]
    pub fn sum(terms: impl IntoIterator<Item = Expr>) -> Self {
        let mut terms: Vec<Expr> = terms.into_iter().collect();
        match terms.len() {
            0 => Self::constant(0.0),
            1 => terms.swap_remove(0),
            _ => {
                let constants: Option<Vec<f64>> = terms.iter().map(Expr::as_constant).collect();
                match constants {
                    Some(values) => Self::constant(values.into_iter().sum()),
                    None => Self::from_node(Node::Sum(terms)),
                }
            }
        }
    }

    /// `eˣ`.
    #[must_use]
    pub fn exp(&self) -> Self {
        match self.as_constant() {
            Some(c) => Self::constant(c.exp()),
            None => Self::from_node(Node::Exp(self.clone())),
        }
    }

    /// Natural logarithm.
    #[must_use]
    pub fn ln(&self) -> Self {
        match self.as_constant() {
            Some(c) => Self::constant(c.ln()),
            None => Self::from_node(Node::Ln(self.clone())),
        }
    }

    /// Integer power.
    #[must_use]
    pub fn powi(&self, n: i32) -> Self {
        match (self.as_constant(), n) {
            (Some(c), _) => Self::constant(c.powi(n)),
            (None, 1) => self.clone(),
            (None, _) => Self::from_node(Node::Powi(self.clone(), n)),
        }
    }

    /// `x²`.
    #[must_use]
    pub fn square(&self) -> Self {
        self.powi(2)
    }

    /// Evaluates the expression at the current parameter values.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolicError::UnboundVariable`] if the expression refers to
    /// an element that `params` does not have.
    pub fn eval(&self, params: &ParameterVector) -> Result<f64, SymbolicError> {
        Evaluator::new(params).eval(self)
    }

    pub(crate) fn node(&self) -> &Node {
        &self.0
    }

    pub(crate) fn key(&self) -> *const Node {
        Rc::as_ptr(&self.0)
    }

    pub(crate) fn children(&self) -> &[Expr] {
        match &*self.0 {
            Node::Const(_) | Node::Var(_) => &[],
            Node::Add(pair) | Node::Mul(pair) => &pair[..],
            Node::Neg(a) | Node::Exp(a) | Node::Ln(a) | Node::Powi(a, _) => std::slice::from_ref(a),
            Node::Sum(terms) => terms,
        }
    }

    #[allow(clippy::float_cmp)]
    pub(crate) fn plus(a: &Expr, b: &Expr) -> Expr {
        match (a.as_constant(), b.as_constant()) {
            (Some(x), Some(y)) => Expr::constant(x + y),
            (Some(x), None) if x == 0.0 => b.clone(),
            (None, Some(y)) if y == 0.0 => a.clone(),
            _ => Expr::from_node(Node::Add([a.clone(), b.clone()])),
        }
    }

    /// Products with a constant one are folded away; products with a constant
    /// zero are kept so structural dependence does not hinge on values.
    #[allow(clippy::float_cmp)]
    pub(crate) fn times(a: &Expr, b: &Expr) -> Expr {
        match (a.as_constant(), b.as_constant()) {
            (Some(x), Some(y)) => Expr::constant(x * y),
            (Some(x), None) if x == 1.0 => b.clone(),
            (None, Some(y)) if y == 1.0 => a.clone(),
            _ => Expr::from_node(Node::Mul([a.clone(), b.clone()])),
        }
    }

    pub(crate) fn negate(a: &Expr) -> Expr {
        match a.as_constant() {
            Some(x) => Expr::constant(-x),
            None => Expr::from_node(Node::Neg(a.clone())),
        }
    }

    pub(crate) fn minus(a: &Expr, b: &Expr) -> Expr {
        Expr::plus(a, &Expr::negate(b))
    }

    pub(crate) fn over(a: &Expr, b: &Expr) -> Expr {
        Expr::times(a, &b.powi(-1))
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

/// Memoized evaluation of expressions against one set of parameter values.
pub(crate) struct Evaluator {
    values: Vec<Vec<f64>>,
    cache: HashMap<*const Node, f64>,
}

impl Evaluator {
    pub(crate) fn new(params: &ParameterVector) -> Self {
        Self {
            values: params
                .iter()
                .map(|p| p.value().iter().copied().collect())
                .collect(),
            cache: HashMap::new(),
        }
    }

    pub(crate) fn eval(&mut self, expr: &Expr) -> Result<f64, SymbolicError> {
        if let Some(&value) = self.cache.get(&expr.key()) {
            return Ok(value);
        }

        let value = match expr.node() {
            Node::Const(c) => *c,
            Node::Var(var) => self
                .values
                .get(var.param)
                .and_then(|v| v.get(var.index))
                .copied()
                .ok_or(SymbolicError::UnboundVariable {
                    param: var.param,
                    index: var.index,
                })?,
            Node::Add([a, b]) => self.eval(a)? + self.eval(b)?,
            Node::Mul([a, b]) => self.eval(a)? * self.eval(b)?,
            Node::Neg(a) => -self.eval(a)?,
            Node::Exp(a) => self.eval(a)?.exp(),
            Node::Ln(a) => self.eval(a)?.ln(),
            Node::Powi(a, n) => self.eval(a)?.powi(*n),
            Node::Sum(terms) => {
                let mut total = 0.0;
                for term in terms {
                    total += self.eval(term)?;
                }
                total
            }
        };

        self.cache.insert(expr.key(), value);
        Ok(value)
    }
}
