#![allow(clippy::float_cmp)]

use std::cell::Cell;

use approx::assert_relative_eq;
use ndarray::{Array1, Array2, arr0, arr1, arr2};
use thiserror::Error;

use natgrad_core::{
    AddDelta, Direction, EvaluationInputs, FrozenInputs, GradientOracle, LinearOperator,
    LinearSolver, ParameterSchedule, ParameterVector, SolveError, Tensor,
};
use natgrad_symbolic::{Expr, SymbolicError, SymbolicOracle};

use crate::linear::conjugate_gradient::{self, ConjugateGradient};

use super::{
    Config, ConfigError, Error, FisherVectorProduct, NaturalGradient, ObjectiveKind, Outcome,
};

fn values(direction: &Direction) -> Vec<f64> {
    direction.iter().flat_map(|t| t.iter().copied()).collect()
}

fn stepper(radius: f64) -> NaturalGradient<SymbolicOracle, ConjugateGradient, f64, AddDelta> {
    NaturalGradient::new(SymbolicOracle::new(), ConjugateGradient::default(), radius, AddDelta)
        .unwrap()
}

/// A single scalar parameter `θ = [3]` with loss `θ²` and a divergence
/// `±½ (θ − anchor)²` anchored at the current value.
struct OneDimensional {
    params: ParameterVector,
    inputs: EvaluationInputs,
    theta: Expr,
}

impl OneDimensional {
    fn new() -> Self {
        let params = ParameterVector::new([("theta", arr1(&[3.0]).into_dyn())]).unwrap();
        let theta = SymbolicOracle::new().variables(&params)[0][[0]].clone();
        let mut inputs = EvaluationInputs::new();
        inputs.insert_scalar("anchor", 3.0);
        Self {
            params,
            inputs,
            theta,
        }
    }

    fn loss(&self) -> impl Fn(&FrozenInputs) -> Result<Expr, SymbolicError> + use<> {
        let theta = self.theta.clone();
        move |_: &FrozenInputs| Ok(theta.square())
    }

    fn divergence(&self, sign: f64) -> impl Fn(&FrozenInputs) -> Result<Expr, SymbolicError> + use<> {
        let theta = self.theta.clone();
        move |inputs: &FrozenInputs| {
            let anchor = inputs.scalar("anchor").unwrap();
            Ok(sign * 0.5 * (&theta - anchor).square())
        }
    }
}

#[test]
fn identity_curvature_steps_to_the_radius() {
    let mut problem = OneDimensional::new();
    let (loss, divergence) = (problem.loss(), problem.divergence(1.0));

    let (delta, improvement) = stepper(0.01)
        .step(&mut problem.params, &problem.inputs, &loss, &divergence, true)
        .unwrap();

    let expected = -(0.02_f64).sqrt();
    assert_relative_eq!(values(&delta)[0], expected, epsilon = 1e-12);
    assert_relative_eq!(improvement.unwrap(), 6.0 * expected, epsilon = 1e-12);
    assert_relative_eq!(problem.params.value(0).unwrap()[[0]], 3.0 + expected, epsilon = 1e-12);
    assert_eq!(problem.params.version(), 1);
}

#[test]
fn rescaled_step_does_not_depend_on_damping() {
    for damping in [0.0, 0.1, 0.5, 1.0] {
        let mut problem = OneDimensional::new();
        let (loss, divergence) = (problem.loss(), problem.divergence(1.0));
        let solver =
            ConjugateGradient::new(conjugate_gradient::Config::new(10, damping, false, 1e-12).unwrap());
        let stepper = NaturalGradient::new(SymbolicOracle::new(), solver, 0.01, AddDelta).unwrap();

        let outcome = stepper
            .step_outcome(&mut problem.params, &problem.inputs, &loss, &divergence)
            .unwrap();

        assert!(outcome.is_applied());
        assert_relative_eq!(values(outcome.delta())[0], -(0.02_f64).sqrt(), epsilon = 1e-12);
    }
}

#[test]
fn negative_curvature_skips_the_step() {
    let mut problem = OneDimensional::new();
    let (loss, divergence) = (problem.loss(), problem.divergence(-1.0));
    let before = problem.params.clone();

    let outcome = stepper(0.01)
        .step_outcome(&mut problem.params, &problem.inputs, &loss, &divergence)
        .unwrap();

    match &outcome {
        Outcome::Skipped {
            delta,
            quadratic_form,
        } => {
            assert_eq!(values(delta), [0.0]);
            assert!(*quadratic_form < 0.0);
        }
        Outcome::Applied { .. } => panic!("expected a skipped step"),
    }
    assert_eq!(outcome.improvement(), 0.0);
    assert_eq!(outcome.commit(), None);
    assert_eq!(problem.params, before);
    assert_eq!(problem.params.version(), 0);

    let (delta, improvement) = stepper(0.01)
        .step(&mut problem.params, &problem.inputs, &loss, &divergence, true)
        .unwrap();
    assert_eq!(values(&delta), [0.0]);
    assert_eq!(improvement, Some(0.0));
}

#[test]
fn improvement_is_only_reported_on_request() {
    let mut problem = OneDimensional::new();
    let (loss, divergence) = (problem.loss(), problem.divergence(1.0));

    let (_, improvement) = stepper(0.01)
        .step(&mut problem.params, &problem.inputs, &loss, &divergence, false)
        .unwrap();

    assert_eq!(improvement, None);
    assert_eq!(problem.params.version(), 1);
}

/// Parameters `w` (shape `[2]`) and `b` (a 0-d scalar) with a quadratic
/// divergence whose curvature is
///
/// ```text
/// F = [[2.0, 0.5, 0.0],
///      [0.5, 1.0, 0.0],
///      [0.0, 0.0, 4.0]]
/// ```
struct Quadratic {
    params: ParameterVector,
    inputs: EvaluationInputs,
    w: [Expr; 2],
    b: Expr,
}

impl Quadratic {
    fn new() -> Self {
        let params = ParameterVector::new([
            ("w", arr1(&[0.5, -1.0]).into_dyn()),
            ("b", arr0(0.2).into_dyn()),
        ])
        .unwrap();
        let vars = SymbolicOracle::new().variables(&params);
        let w = [vars[0][[0]].clone(), vars[0][[1]].clone()];
        let b = vars[1].iter().next().unwrap().clone();

        let mut inputs = EvaluationInputs::new();
        inputs
            .insert("anchor_w", arr1(&[0.5, -1.0]).into_dyn())
            .insert_scalar("anchor_b", 0.2);

        Self {
            params,
            inputs,
            w,
            b,
        }
    }

    fn curvature() -> Array2<f64> {
        arr2(&[[2.0, 0.5, 0.0], [0.5, 1.0, 0.0], [0.0, 0.0, 4.0]])
    }

    fn loss(&self) -> impl Fn(&FrozenInputs) -> Result<Expr, SymbolicError> + use<> {
        let ([w0, w1], b) = (self.w.clone(), self.b.clone());
        move |_: &FrozenInputs| Ok(w0.square() + 3.0 * &w1 + &w0 * &w1 + &b * &w0)
    }

    fn divergence(&self) -> impl Fn(&FrozenInputs) -> Result<Expr, SymbolicError> + use<> {
        let ([w0, w1], b) = (self.w.clone(), self.b.clone());
        move |inputs: &FrozenInputs| {
            let anchor = inputs.get("anchor_w").unwrap();
            let d0 = &w0 - anchor[[0]];
            let d1 = &w1 - anchor[[1]];
            let db = &b - inputs.scalar("anchor_b").unwrap();
            Ok(0.5 * (2.0 * d0.square() + d1.square() + &d0 * &d1 + 4.0 * db.square()))
        }
    }
}

#[test]
fn applied_step_lands_on_the_trust_region_boundary() {
    let mut problem = Quadratic::new();
    let (loss, divergence) = (problem.loss(), problem.divergence());
    let radius = 1e-3;

    let outcome = stepper(radius)
        .step_outcome(&mut problem.params, &problem.inputs, &loss, &divergence)
        .unwrap();
    let Outcome::Applied {
        delta,
        improvement,
        multiplier,
        quadratic_form,
        commit,
    } = outcome
    else {
        panic!("expected an applied step");
    };

    let d = Array1::from(values(&delta));
    assert_relative_eq!(0.5 * d.dot(&Quadratic::curvature().dot(&d)), radius, max_relative = 1e-10);
    assert_relative_eq!(multiplier, (quadratic_form / radius).sqrt());
    assert!(improvement < 0.0);
    assert_eq!(commit.version(), 1);

    // The divergence is exactly quadratic, so its true value after the step
    // equals the radius too.
    let after = divergence(&problem.inputs.snapshot()).unwrap();
    assert_relative_eq!(after.eval(&problem.params).unwrap(), radius, max_relative = 1e-10);
}

#[test]
fn delta_matches_parameter_shapes() {
    let mut problem = Quadratic::new();
    let (loss, divergence) = (problem.loss(), problem.divergence());

    let (delta, _) = stepper(0.01)
        .step(&mut problem.params, &problem.inputs, &loss, &divergence, false)
        .unwrap();

    let shapes: Vec<&[usize]> = delta.shapes().collect();
    assert_eq!(shapes, vec![&[2usize][..], &[][..]]);
    assert!(delta.check_matches(&problem.params).is_ok());
}

#[test]
fn fisher_vector_product_applies_the_curvature() {
    let problem = Quadratic::new();
    let oracle = SymbolicOracle::new();
    let divergence = problem.divergence()(&problem.inputs.snapshot()).unwrap();

    let fisher = FisherVectorProduct::new(&oracle, &problem.params, &divergence).unwrap();
    assert_eq!(fisher.disconnected(), [false, false]);

    let v = Direction::new(vec![arr1(&[1.0, -2.0]).into_dyn(), arr0(0.5).into_dyn()]);
    let product = values(&fisher.apply(&v).unwrap());
    let expected = Quadratic::curvature().dot(&arr1(&[1.0, -2.0, 0.5]));

    for (actual, expected) in product.iter().zip(expected.iter()) {
        assert_relative_eq!(*actual, *expected, epsilon = 1e-12);
    }

    let wrong = Direction::new(vec![arr1(&[1.0, -2.0]).into_dyn()]);
    assert!(matches!(fisher.apply(&wrong), Err(Error::Shape(_))));
}

/// Counts solves so tests can check that failures happen before one.
#[derive(Default)]
struct CountingSolver {
    inner: ConjugateGradient,
    calls: Cell<usize>,
}

impl LinearSolver for CountingSolver {
    type Error = conjugate_gradient::Error;

    fn solve<A>(
        &self,
        operator: &A,
        b: &Direction,
        x_init: Option<&Direction>,
    ) -> Result<Direction, SolveError<A::Error, Self::Error>>
    where
        A: LinearOperator,
    {
        self.calls.set(self.calls.get() + 1);
        self.inner.solve(operator, b, x_init)
    }
}

#[test]
fn constant_divergence_fails_before_the_solve() {
    let mut problem = OneDimensional::new();
    let loss = problem.loss();
    let divergence = |_: &FrozenInputs| Ok::<_, SymbolicError>(Expr::constant(0.0));
    let stepper =
        NaturalGradient::new(SymbolicOracle::new(), CountingSolver::default(), 0.01, AddDelta)
            .unwrap();

    let result = stepper.step(&mut problem.params, &problem.inputs, &loss, &divergence, true);

    assert!(matches!(
        result,
        Err(Error::DegenerateGradient {
            objective: ObjectiveKind::Divergence,
            parameters: 1,
        })
    ));
    assert_eq!(stepper.solver().calls.get(), 0);
    assert_eq!(problem.params.version(), 0);
}

#[test]
fn constant_loss_is_degenerate() {
    let mut problem = OneDimensional::new();
    let loss = |_: &FrozenInputs| Ok::<_, SymbolicError>(Expr::constant(1.0));
    let divergence = problem.divergence(1.0);

    let result = stepper(0.01).step(&mut problem.params, &problem.inputs, &loss, &divergence, true);

    assert!(matches!(
        result,
        Err(Error::DegenerateGradient {
            objective: ObjectiveKind::Loss,
            ..
        })
    ));
}

#[test]
fn objective_errors_are_wrapped() {
    let mut problem = OneDimensional::new();
    let failing = |_: &FrozenInputs| {
        Err::<Expr, _>(SymbolicError::UnboundVariable { param: 9, index: 0 })
    };
    let (loss, divergence) = (problem.loss(), problem.divergence(1.0));

    let result = stepper(0.01).step(&mut problem.params, &problem.inputs, &failing, &divergence, true);
    assert!(matches!(result, Err(Error::Loss(_))));

    let result = stepper(0.01).step(&mut problem.params, &problem.inputs, &loss, &failing, true);
    assert!(matches!(result, Err(Error::Divergence(_))));
    assert_eq!(problem.params.version(), 0);
}

#[test]
fn rejects_bad_radius() {
    let result = NaturalGradient::new(SymbolicOracle::new(), ConjugateGradient::default(), 0.0, AddDelta);
    assert!(matches!(result, Err(ConfigError::Radius { value }) if value == 0.0));

    let result =
        NaturalGradient::new(SymbolicOracle::new(), ConjugateGradient::default(), f64::NAN, AddDelta);
    assert!(matches!(result, Err(ConfigError::Radius { .. })));
}

/// A schedule whose value can be changed between steps.
struct Adjustable(Cell<f64>);

impl ParameterSchedule for Adjustable {
    fn value(&self) -> f64 {
        self.0.get()
    }
}

#[test]
fn radius_is_checked_before_applying() {
    let mut problem = OneDimensional::new();
    let (loss, divergence) = (problem.loss(), problem.divergence(1.0));
    let stepper = NaturalGradient::new(
        SymbolicOracle::new(),
        ConjugateGradient::default(),
        Adjustable(Cell::new(0.01)),
        AddDelta,
    )
    .unwrap();

    stepper.schedule().0.set(-1.0);
    let result = stepper.step(&mut problem.params, &problem.inputs, &loss, &divergence, true);

    assert!(matches!(result, Err(Error::Radius { value }) if value == -1.0));
    assert_eq!(problem.params.version(), 0);
}

#[test]
fn skipped_step_does_not_need_the_radius() {
    let mut problem = OneDimensional::new();
    let (loss, divergence) = (problem.loss(), problem.divergence(-1.0));
    let stepper = NaturalGradient::new(
        SymbolicOracle::new(),
        ConjugateGradient::default(),
        Adjustable(Cell::new(0.01)),
        AddDelta,
    )
    .unwrap();

    stepper.schedule().0.set(f64::NAN);
    let outcome = stepper
        .step_outcome(&mut problem.params, &problem.inputs, &loss, &divergence)
        .unwrap();

    assert!(!outcome.is_applied());
    assert_eq!(problem.params.version(), 0);
}

#[test]
fn from_config_uses_a_constant_radius() {
    let mut problem = OneDimensional::new();
    let (loss, divergence) = (problem.loss(), problem.divergence(1.0));
    let config = Config::new(0.08, conjugate_gradient::Config::default()).unwrap();

    let stepper = NaturalGradient::from_config(SymbolicOracle::new(), AddDelta, &config);
    let (delta, _) = stepper
        .step(&mut problem.params, &problem.inputs, &loss, &divergence, false)
        .unwrap();

    assert_relative_eq!(values(&delta)[0], -0.4, epsilon = 1e-12);
}

// ----------------------------------------------------------------------------
// A scripted oracle over one-element parameters with a fixed curvature matrix
// and configurable connectivity for each pass.
// ----------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Scalar {
    Loss,
    Divergence,
    Contraction(Vec<f64>),
}

#[derive(Debug, Clone)]
enum Grad {
    Value(f64),
    Divergence(usize),
}

#[derive(Debug, Error)]
#[error("inner product with a plain gradient")]
struct Misuse;

struct Scripted {
    loss: Vec<Option<f64>>,
    first_pass: Vec<bool>,
    second_pass: Vec<bool>,
    curvature: Array2<f64>,
    /// Makes `scalar_value` fail, which only logging relies on.
    opaque_scalars: bool,
}

impl Scripted {
    fn params(&self) -> ParameterVector {
        ParameterVector::new(
            (0..self.loss.len()).map(|i| (format!("p{i}"), arr1(&[0.0]).into_dyn())),
        )
        .unwrap()
    }
}

impl GradientOracle for Scripted {
    type Scalar = Scalar;
    type Tensor = Grad;
    type Error = Misuse;

    fn gradient(
        &self,
        output: &Scalar,
        _params: &ParameterVector,
    ) -> Result<Vec<Option<Grad>>, Misuse> {
        Ok(match output {
            Scalar::Loss => self.loss.iter().map(|g| g.map(Grad::Value)).collect(),
            Scalar::Divergence => self
                .first_pass
                .iter()
                .enumerate()
                .map(|(i, &connected)| connected.then_some(Grad::Divergence(i)))
                .collect(),
            Scalar::Contraction(v) => {
                let product = self.curvature.dot(&Array1::from(v.clone()));
                self.second_pass
                    .iter()
                    .zip(product.iter())
                    .map(|(&connected, &x)| connected.then_some(Grad::Value(x)))
                    .collect()
            }
        })
    }

    fn inner(&self, direction: &Tensor, tensor: &Grad) -> Result<Scalar, Misuse> {
        match tensor {
            Grad::Divergence(i) => {
                let mut v = vec![0.0; self.loss.len()];
                v[*i] = direction.sum();
                Ok(Scalar::Contraction(v))
            }
            Grad::Value(_) => Err(Misuse),
        }
    }

    fn sum(&self, terms: Vec<Scalar>) -> Scalar {
        let mut total = vec![0.0; self.loss.len()];
        for term in terms {
            if let Scalar::Contraction(v) = term {
                for (t, x) in total.iter_mut().zip(v) {
                    *t += x;
                }
            }
        }
        Scalar::Contraction(total)
    }

    fn value(&self, tensor: &Grad, _params: &ParameterVector) -> Result<Tensor, Misuse> {
        let value = match tensor {
            Grad::Value(x) => *x,
            Grad::Divergence(_) => 0.0,
        };
        Ok(arr1(&[value]).into_dyn())
    }

    fn scalar_value(&self, _scalar: &Scalar, _params: &ParameterVector) -> Result<f64, Misuse> {
        if self.opaque_scalars {
            Err(Misuse)
        } else {
            Ok(0.0)
        }
    }
}

fn scripted_step(oracle: Scripted) -> (Result<Outcome, Error>, ParameterVector) {
    let mut params = oracle.params();
    let loss = |_: &FrozenInputs| Ok::<_, Misuse>(Scalar::Loss);
    let divergence = |_: &FrozenInputs| Ok::<_, Misuse>(Scalar::Divergence);
    let stepper =
        NaturalGradient::new(oracle, ConjugateGradient::default(), 0.01, AddDelta).unwrap();

    let result = stepper.step_outcome(&mut params, &EvaluationInputs::new(), &loss, &divergence);
    (result, params)
}

#[test]
fn inconsistent_passes_are_rejected() {
    let (result, params) = scripted_step(Scripted {
        loss: vec![Some(1.0), Some(2.0)],
        first_pass: vec![true, true],
        second_pass: vec![true, false],
        curvature: Array2::eye(2),
        opaque_scalars: false,
    });

    assert!(matches!(
        result,
        Err(Error::GradientInconsistency {
            first_pass: 0,
            second_pass: 1,
        })
    ));
    assert_eq!(params.version(), 0);
}

#[test]
fn negative_definite_operator_skips() {
    let (result, params) = scripted_step(Scripted {
        loss: vec![Some(1.0), Some(-2.0)],
        first_pass: vec![true, true],
        second_pass: vec![true, true],
        curvature: -Array2::<f64>::eye(2),
        opaque_scalars: false,
    });

    let outcome = result.unwrap();
    assert!(!outcome.is_applied());
    assert_eq!(values(outcome.delta()), [0.0, 0.0]);
    assert_eq!(outcome.improvement(), 0.0);
    assert_eq!(params.version(), 0);
}

#[test]
fn disconnected_loss_is_degenerate() {
    let (result, _) = scripted_step(Scripted {
        loss: vec![None, None],
        first_pass: vec![true, true],
        second_pass: vec![true, true],
        curvature: Array2::eye(2),
        opaque_scalars: false,
    });

    assert!(matches!(
        result,
        Err(Error::DegenerateGradient {
            objective: ObjectiveKind::Loss,
            parameters: 2,
        })
    ));
}

#[test]
fn disconnected_divergence_is_degenerate() {
    let (result, _) = scripted_step(Scripted {
        loss: vec![Some(1.0), Some(1.0)],
        first_pass: vec![false, false],
        second_pass: vec![false, false],
        curvature: Array2::eye(2),
        opaque_scalars: false,
    });

    assert!(matches!(
        result,
        Err(Error::DegenerateGradient {
            objective: ObjectiveKind::Divergence,
            parameters: 2,
        })
    ));
}

/// Enables every level and discards what it receives.
struct EnableAll;

impl tracing::Subscriber for EnableAll {
    fn enabled(&self, _metadata: &tracing::Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _span: &tracing::span::Attributes<'_>) -> tracing::span::Id {
        tracing::span::Id::from_u64(1)
    }

    fn record(&self, _span: &tracing::span::Id, _values: &tracing::span::Record<'_>) {}

    fn record_follows_from(&self, _span: &tracing::span::Id, _follows: &tracing::span::Id) {}

    fn event(&self, _event: &tracing::Event<'_>) {}

    fn enter(&self, _span: &tracing::span::Id) {}

    fn exit(&self, _span: &tracing::span::Id) {}
}

#[test]
fn logging_does_not_change_the_result() {
    let oracle = || Scripted {
        loss: vec![Some(1.0), Some(-2.0)],
        first_pass: vec![true, true],
        second_pass: vec![true, true],
        curvature: Array2::eye(2),
        opaque_scalars: true,
    };

    let (quiet, _) = scripted_step(oracle());
    let (logged, params) = tracing::subscriber::with_default(EnableAll, || scripted_step(oracle()));

    let (quiet, logged) = (quiet.unwrap(), logged.unwrap());
    assert!(logged.is_applied());
    assert_eq!(values(logged.delta()), values(quiet.delta()));
    assert_eq!(params.version(), 1);
}
