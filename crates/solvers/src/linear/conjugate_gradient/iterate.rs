use natgrad_core::{Direction, LinearOperator, Observer, ShapeError, SolveError};
use tracing::{debug, trace};

use super::{Action, Config, Error, Event, Solution, Status};

type IterResult<T, A> = Result<T, SolveError<<A as LinearOperator>::Error, Error>>;

/// Core conjugate gradient loop shared by [`solve`](super::solve) and the
/// [`LinearSolver`](natgrad_core::LinearSolver) impl.
#[allow(clippy::float_cmp)]
pub(super) fn iterate<A, Obs>(
    operator: &A,
    b: &Direction,
    x_init: Option<&Direction>,
    config: &Config,
    mut observer: Obs,
) -> IterResult<Solution, A>
where
    A: LinearOperator,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    let (mut x, mut r) = match x_init {
        Some(x0) => {
            b.check_same_shape(x0).map_err(shape_error)?;
            let ax = damped(operator, x0, config.damping())?;
            let mut r = b.clone();
            r.axpy(-1.0, &ax).map_err(shape_error)?;
            (x0.clone(), r)
        }
        // A·0 = 0, so the residual starts at b.
        None => (b.to_zeros(), b.clone()),
    };

    let mut p = r.clone();
    let mut rho = r.norm_squared();
    let mut iters = 0;
    let mut stop: Option<Status> = None;

    for iter in 1..=config.max_iters() {
        if stop.is_some() {
            if config.unroll() {
                continue;
            }
            break;
        }

        if is_converged(rho, config.residual_tol()) {
            stop = Some(Status::Converged);
            continue;
        }

        let ap = damped(operator, &p, config.damping())?;
        let kappa = p.dot(&ap).map_err(shape_error)?;
        if kappa == 0.0 || !kappa.is_finite() {
            debug!(iter, kappa, "conjugate gradient breakdown");
            stop = Some(Status::Breakdown);
            continue;
        }

        let alpha = rho / kappa;
        x.axpy(alpha, &p).map_err(shape_error)?;
        r.axpy(-alpha, &ap).map_err(shape_error)?;

        let rho_next = r.norm_squared();
        let beta = rho_next / rho;
        let mut p_next = r.clone();
        p_next.axpy(beta, &p).map_err(shape_error)?;
        p = p_next;
        rho = rho_next;
        iters = iter;

        trace!(iter, residual_sq = rho, alpha, beta, "conjugate gradient iteration");

        let event = Event {
            iter,
            residual_sq: rho,
            alpha,
            beta,
            x: &x,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            stop = Some(Status::StoppedByObserver);
        }
    }

    let status = stop.unwrap_or(if is_converged(rho, config.residual_tol()) {
        Status::Converged
    } else {
        Status::MaxIters
    });

    debug!(?status, iters, residual_sq = rho, "conjugate gradient finished");

    Ok(Solution {
        status,
        x,
        residual_sq: rho,
        iters,
    })
}

/// Applies `A x + damping·x`, checking that the operator preserves shape.
fn damped<A: LinearOperator>(operator: &A, x: &Direction, damping: f64) -> IterResult<Direction, A> {
    let mut out = operator.apply(x).map_err(SolveError::Operator)?;
    x.check_same_shape(&out).map_err(shape_error)?;
    if damping > 0.0 {
        out.axpy(damping, x).map_err(shape_error)?;
    }
    Ok(out)
}

/// An exactly zero residual counts as converged even with a zero tolerance.
#[allow(clippy::float_cmp)]
fn is_converged(residual_sq: f64, tol: f64) -> bool {
    residual_sq < tol || residual_sq == 0.0
}

fn shape_error<OE>(error: ShapeError) -> SolveError<OE, Error> {
    SolveError::Solver(Error::Shape(error))
}
