//! Torque-coupling solver.
//!
//! Two mechanical subsystems joined by a rigid shaft transmit a single
//! torque and share a single resulting acceleration. Each side exposes its
//! acceleration-versus-torque curve through [`TorqueInterface`]; the solver
//! finds the torque at which the two curves intersect.

use thiserror::Error;

/// One side of a torque-coupling problem: a system's acceleration as a
/// function of the transmitted torque, plus its analytic derivative.
pub trait TorqueInterface {
    /// Resultant angular acceleration, given torque.
    fn acceleration(&self, torque: f64) -> f64;

    /// Derivative of angular acceleration with respect to torque.
    fn inertia(&self, torque: f64) -> f64;
}

/// Two load models on a shared shaft; accelerations and inertias add.
#[derive(Debug, Clone, Copy)]
pub struct Superposition<A, B> {
    first: A,
    second: B,
}

impl<A, B> Superposition<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: TorqueInterface, B: TorqueInterface> TorqueInterface for Superposition<A, B> {
    fn acceleration(&self, torque: f64) -> f64 {
        self.first.acceleration(torque) + self.second.acceleration(torque)
    }

    fn inertia(&self, torque: f64) -> f64 {
        self.first.inertia(torque) + self.second.inertia(torque)
    }
}

/// Failure modes of [`TorqueCoupling::solve`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum CouplingError {
    /// Newton's method hit a stationary point: the net inertia of the two
    /// sides cancels, so no unique transmitted torque exists. This signals
    /// a modeling bug rather than a transient condition.
    #[error("coupling derivative vanished at torque {torque} (iteration {iteration})")]
    Degenerate { torque: f64, iteration: usize },
}

/// A solved coupling: the transmitted torque and the input-side
/// acceleration at that torque.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouplingSolution {
    pub torque: f64,
    pub acceleration: f64,
}

/// Iteration budget used when none is specified.
pub const DEFAULT_ITERATIONS: usize = 4;

/// Derivative magnitude below which the coupling is considered degenerate.
const STATIONARY_THRESHOLD: f64 = 1e-5;

/// Newton–Raphson solver for the torque shared between a motor-side and a
/// load-side [`TorqueInterface`].
///
/// Each call warm-starts from the previous solution, exploiting
/// frame-to-frame continuity. The iteration count is fixed (no tolerance
/// check, no early exit) so the per-frame cost is bounded.
#[derive(Debug, Clone)]
pub struct TorqueCoupling {
    last_input_torque: f64,
    iterations: usize,
}

impl Default for TorqueCoupling {
    fn default() -> Self {
        Self::new()
    }
}

impl TorqueCoupling {
    pub fn new() -> Self {
        Self::with_iterations(DEFAULT_ITERATIONS)
    }

    pub fn with_iterations(iterations: usize) -> Self {
        Self {
            last_input_torque: 0.0,
            iterations,
        }
    }

    /// Find the torque at which `input` and `output` agree on acceleration.
    ///
    /// A NaN warm-start cache (from a previous diverged solve) is reset to
    /// zero before iterating, so one bad frame cannot poison all later ones.
    pub fn solve(
        &mut self,
        input: &impl TorqueInterface,
        output: &impl TorqueInterface,
    ) -> Result<CouplingSolution, CouplingError> {
        if self.last_input_torque.is_nan() {
            self.last_input_torque = 0.0;
        }

        let torque = self.newton(input, output, self.last_input_torque)?;
        self.last_input_torque = torque;

        Ok(CouplingSolution {
            torque,
            acceleration: input.acceleration(torque),
        })
    }

    fn newton(
        &self,
        input: &impl TorqueInterface,
        output: &impl TorqueInterface,
        initial_value: f64,
    ) -> Result<f64, CouplingError> {
        let f = |torque: f64| input.acceleration(torque) - output.acceleration(torque);
        let df = |torque: f64| input.inertia(torque) - output.inertia(torque);

        let mut x = initial_value;

        for iteration in 0..self.iterations {
            let slope = df(x);
            if slope.abs() < STATIONARY_THRESHOLD {
                return Err(CouplingError::Degenerate {
                    torque: x,
                    iteration,
                });
            }

            x -= f(x) / slope;
        }

        Ok(x)
    }
}
