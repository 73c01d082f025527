use natgrad_core::{
    Direction, EvaluationInputs, GradientOracle, LinearOperator, LinearSolver, Objective,
    ParameterSchedule, ParameterVector, SolveError, StepApplier,
};
use tracing::{Level, debug, enabled, trace};

use super::{
    Decision, Error, FisherVectorProduct, NaturalGradient, ObjectiveKind, Outcome,
    pass::{differentiate, evaluate},
};

impl<O, S, P, A> NaturalGradient<O, S, P, A>
where
    O: GradientOracle,
    S: LinearSolver,
    P: ParameterSchedule,
    A: StepApplier,
{
    /// Computes and commits one natural gradient step.
    ///
    /// Returns the update (zero if the step was skipped) and, when
    /// `want_improvement` is set, the predicted change in loss. See
    /// [`step_outcome`](Self::step_outcome) for the full result.
    ///
    /// # Errors
    ///
    /// See [`step_outcome`](Self::step_outcome).
    pub fn step<L, D>(
        &self,
        params: &mut ParameterVector,
        inputs: &EvaluationInputs,
        loss: &L,
        divergence: &D,
        want_improvement: bool,
    ) -> Result<(Direction, Option<f64>), Error>
    where
        L: Objective<O::Scalar>,
        D: Objective<O::Scalar>,
    {
        let outcome = self.step_outcome(params, inputs, loss, divergence)?;
        let improvement = want_improvement.then(|| outcome.improvement());
        Ok((outcome.into_delta(), improvement))
    }

    /// Computes one natural gradient step and commits it if the quadratic form
    /// is positive.
    ///
    /// Both objectives see the same frozen snapshot of `inputs`. The parameters
    /// are mutated at most once, through the step applier, and only on
    /// [`Outcome::Applied`].
    ///
    /// # Errors
    ///
    /// - [`Error::DegenerateGradient`] if the loss or divergence depends on no
    ///   parameter (raised before the solve)
    /// - [`Error::GradientInconsistency`] if a Fisher-vector product's passes
    ///   disagree on disconnected parameters
    /// - [`Error::Radius`] if a step would be applied while the schedule's
    ///   value is not finite and positive
    /// - collaborator and shape errors, wrapped
    pub fn step_outcome<L, D>(
        &self,
        params: &mut ParameterVector,
        inputs: &EvaluationInputs,
        loss: &L,
        divergence: &D,
    ) -> Result<Outcome, Error>
    where
        L: Objective<O::Scalar>,
        D: Objective<O::Scalar>,
    {
        let oracle = &self.oracle;
        let frozen = inputs.snapshot();

        let loss_value = loss
            .evaluate(&frozen)
            .map_err(|e| Error::Loss(Box::new(e)))?;
        // Logging only; a value that cannot be computed is not logged.
        if enabled!(Level::DEBUG) {
            if let Ok(value) = oracle.scalar_value(&loss_value, params) {
                debug!(loss = value, "evaluated loss");
            }
        }

        let loss_pass = differentiate(oracle, &loss_value, params)?;
        if loss_pass.iter().all(Option::is_none) {
            return Err(Error::DegenerateGradient {
                objective: ObjectiveKind::Loss,
                parameters: params.len(),
            });
        }
        let loss_gradient = evaluate(oracle, &loss_pass, params)?;

        let divergence_value = divergence
            .evaluate(&frozen)
            .map_err(|e| Error::Divergence(Box::new(e)))?;
        if enabled!(Level::TRACE) {
            if let Ok(value) = oracle.scalar_value(&divergence_value, params) {
                trace!(divergence = value, "evaluated divergence");
            }
        }

        let (raw, quadratic_form) = {
            let fisher = FisherVectorProduct::new(oracle, params, &divergence_value)?;

            let b = -loss_gradient.clone();
            let raw = self
                .solver
                .solve(&fisher, &b, None)
                .map_err(|error| match error {
                    SolveError::Operator(e) => e,
                    SolveError::Solver(e) => Error::Solver(Box::new(e)),
                })?;
            raw.check_matches(params)?;
            debug!(norm_squared = raw.norm_squared(), "solved for search direction");

            let curvature = fisher.apply(&raw)?;
            let quadratic_form = 0.5 * curvature.dot(&raw)?;
            (raw, quadratic_form)
        };

        let radius = self.schedule.value();

        match Decision::from_quadratic_form(quadratic_form) {
            Decision::Skip => {
                debug!(quadratic_form, radius, "non-positive quadratic form, skipping step");
                Ok(Outcome::Skipped {
                    delta: Direction::zeros_like(params),
                    quadratic_form,
                })
            }
            Decision::Apply => {
                // Checked at construction; a varying schedule must still hold it here.
                if !(radius.is_finite() && radius > 0.0) {
                    return Err(Error::Radius { value: radius });
                }

                let multiplier = (quadratic_form / radius).sqrt();
                let delta = raw.scaled(multiplier.recip());
                let improvement = loss_gradient.dot(&delta)?;

                let commit = self
                    .applier
                    .apply(params, &delta)
                    .map_err(|e| Error::Apply(Box::new(e)))?;

                debug!(
                    quadratic_form,
                    radius,
                    multiplier,
                    improvement,
                    version = commit.version(),
                    "applied natural gradient step"
                );
                Ok(Outcome::Applied {
                    delta,
                    improvement,
                    multiplier,
                    quadratic_form,
                    commit,
                })
            }
        }
    }
}
