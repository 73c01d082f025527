use std::convert::Infallible;

use approx::assert_relative_eq;
use ndarray::{Array2, Ix1, arr1, arr2};
use thiserror::Error;

use natgrad_core::{Direction, LinearSolver, SolveError};

use super::{
    Action, Config, ConjugateGradient, Error, Event, Status, solve, solve_unobserved,
};

fn vector(values: &[f64]) -> Direction {
    Direction::new(vec![arr1(values).into_dyn()])
}

fn values(direction: &Direction) -> Vec<f64> {
    direction.iter().flat_map(|t| t.iter().copied()).collect()
}

/// The operator `x ↦ M x` for a single 1-D tensor.
fn matrix(m: Array2<f64>) -> impl Fn(&Direction) -> Result<Direction, Infallible> {
    move |x: &Direction| {
        let v = x.iter().next().unwrap().view().into_dimensionality::<Ix1>().unwrap();
        Ok(Direction::new(vec![m.dot(&v).into_dyn()]))
    }
}

fn undamped(max_iters: usize) -> Config {
    Config::new(max_iters, 0.0, false, 1e-20).unwrap()
}

#[test]
fn solves_spd_system_in_n_iterations() {
    let operator = matrix(arr2(&[[4.0, 1.0], [1.0, 3.0]]));
    let b = vector(&[1.0, 2.0]);

    let solution = solve_unobserved(&operator, &b, None, &undamped(10)).unwrap();

    assert_eq!(solution.status, Status::Converged);
    assert_eq!(solution.iters, 2);
    let x = values(&solution.x);
    assert_relative_eq!(x[0], 1.0 / 11.0, epsilon = 1e-12);
    assert_relative_eq!(x[1], 7.0 / 11.0, epsilon = 1e-12);
}

#[test]
fn damping_shifts_the_diagonal() {
    let operator = matrix(arr2(&[[4.0, 1.0], [1.0, 3.0]]));
    let b = vector(&[1.0, 2.0]);
    let config = Config::new(10, 0.5, false, 1e-20).unwrap();

    let solution = solve_unobserved(&operator, &b, None, &config).unwrap();

    // (A + 0.5 I)⁻¹ b with det(A + 0.5 I) = 14.75.
    let x = values(&solution.x);
    assert_relative_eq!(x[0], 1.5 / 14.75, epsilon = 1e-12);
    assert_relative_eq!(x[1], 8.0 / 14.75, epsilon = 1e-12);
}

#[test]
fn unroll_matches_early_exit() {
    let operator = matrix(arr2(&[[5.0, 1.0, 0.0], [1.0, 4.0, 1.0], [0.0, 1.0, 3.0]]));
    let b = vector(&[1.0, -2.0, 0.5]);

    for max_iters in [0, 1, 2, 3, 10] {
        let looped = Config::new(max_iters, 1e-3, false, 1e-12).unwrap();
        let unrolled = Config::new(max_iters, 1e-3, true, 1e-12).unwrap();

        assert_eq!(
            solve_unobserved(&operator, &b, None, &looped).unwrap(),
            solve_unobserved(&operator, &b, None, &unrolled).unwrap(),
            "max_iters = {max_iters}"
        );
    }
}

#[test]
fn observer_can_stop_early() {
    let operator = matrix(arr2(&[[4.0, 1.0], [1.0, 3.0]]));
    let b = vector(&[1.0, 2.0]);

    for unroll in [false, true] {
        let config = Config::new(10, 0.0, unroll, 1e-20).unwrap();
        let mut seen = Vec::new();
        let observer = |event: &Event<'_>| {
            seen.push((event.iter, event.residual_sq));
            Some(Action::StopEarly)
        };

        let solution = solve(&operator, &b, None, &config, observer).unwrap();

        assert_eq!(solution.status, Status::StoppedByObserver);
        assert_eq!(solution.iters, 1);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, 1);
        assert_relative_eq!(seen[0].1, solution.residual_sq);
    }
}

#[test]
fn events_follow_each_iteration() {
    let operator = matrix(arr2(&[[4.0, 1.0], [1.0, 3.0]]));
    let b = vector(&[1.0, 2.0]);

    let mut iters = Vec::new();
    let observer = |event: &Event<'_>| {
        assert!(event.alpha > 0.0);
        assert!(event.x.iter().flatten().all(|x| x.is_finite()));
        iters.push(event.iter);
        None
    };

    let solution = solve(&operator, &b, None, &undamped(10), observer).unwrap();

    assert_eq!(solution.status, Status::Converged);
    assert_eq!(iters, [1, 2]);
}

#[test]
fn zero_iterations_return_initial_guess() {
    let operator = matrix(arr2(&[[4.0, 1.0], [1.0, 3.0]]));
    let b = vector(&[1.0, 2.0]);
    let x0 = vector(&[1.0, 1.0]);

    let solution = solve_unobserved(&operator, &b, Some(&x0), &undamped(0)).unwrap();

    assert_eq!(solution.status, Status::MaxIters);
    assert_eq!(solution.iters, 0);
    assert_eq!(solution.x, x0);
    // r = b - A x0 = [1 - 5, 2 - 4]
    assert_relative_eq!(solution.residual_sq, 16.0 + 4.0);
}

#[test]
fn starts_from_initial_guess() {
    let operator = matrix(arr2(&[[2.0, 0.0], [0.0, 2.0]]));
    let b = vector(&[2.0, 4.0]);
    let exact = vector(&[1.0, 2.0]);

    let solution = solve_unobserved(&operator, &b, Some(&exact), &undamped(10)).unwrap();

    assert_eq!(solution.status, Status::Converged);
    assert_eq!(solution.iters, 0);
    assert_eq!(solution.x, exact);
}

#[test]
fn zero_operator_breaks_down() {
    let operator = |x: &Direction| Ok::<_, Infallible>(x.to_zeros());
    let b = vector(&[1.0, 2.0]);

    let solution = solve_unobserved(&operator, &b, None, &undamped(10)).unwrap();

    assert_eq!(solution.status, Status::Breakdown);
    assert_eq!(solution.iters, 0);
    assert_eq!(solution.x, b.to_zeros());
}

#[test]
fn negative_curvature_is_not_clamped() {
    let operator = |x: &Direction| Ok::<_, Infallible>(x.scaled(-1.0));
    let b = vector(&[1.0]);

    let solution = solve_unobserved(&operator, &b, None, &undamped(10)).unwrap();

    assert_eq!(solution.status, Status::Converged);
    assert_relative_eq!(values(&solution.x)[0], -1.0);
}

#[test]
fn rejects_mismatched_shapes() {
    let operator = matrix(arr2(&[[4.0, 1.0], [1.0, 3.0]]));
    let b = vector(&[1.0, 2.0]);
    let x0 = vector(&[1.0, 2.0, 3.0]);

    let result = solve_unobserved(&operator, &b, Some(&x0), &undamped(10));
    assert!(matches!(result, Err(Error::Shape(_))));

    let truncating = |_: &Direction| Ok::<_, Infallible>(vector(&[1.0]));
    let result = solve_unobserved(&truncating, &b, None, &undamped(10));
    assert!(matches!(result, Err(Error::Shape(_))));
}

#[derive(Debug, Error, PartialEq)]
#[error("operator unavailable")]
struct Unavailable;

#[test]
fn operator_errors_reach_the_caller() {
    let operator = |_: &Direction| Err::<Direction, _>(Unavailable);
    let b = vector(&[1.0, 2.0]);

    let result = solve_unobserved(&operator, &b, None, &undamped(10));
    assert!(matches!(result, Err(Error::Operator(_))));

    let solver = ConjugateGradient::new(undamped(10));
    match solver.solve(&operator, &b, None) {
        Err(SolveError::Operator(error)) => assert_eq!(error, Unavailable),
        other => panic!("expected an operator error, got {other:?}"),
    }
}

#[test]
fn linear_solver_returns_the_iterate() {
    let operator = matrix(arr2(&[[4.0, 1.0], [1.0, 3.0]]));
    let b = vector(&[1.0, 2.0]);
    let solver = ConjugateGradient::new(undamped(10));

    let x = solver.solve(&operator, &b, None).unwrap();
    let expected = solve_unobserved(&operator, &b, None, solver.config()).unwrap().x;

    assert_eq!(x, expected);
}
