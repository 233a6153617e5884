use crate::errors::{EosError, EosResult};

/// Level of detail in the iteration output.
#[derive(Copy, Clone, PartialOrd, PartialEq, Eq, Debug, Default)]
pub enum Verbosity {
    /// Do not print output.
    #[default]
    None,
    /// Print information about the success or failure of the iteration.
    Result,
    /// Print a detailed output for every iteration.
    Iter,
}

/// Options for the density iteration and the phase equilibrium solvers.
///
/// If the values are [None], solver specific default
/// values are used.
#[derive(Copy, Clone, Default, Debug)]
pub struct SolverOptions {
    /// Maximum number of iterations.
    pub max_iter: Option<usize>,
    /// Tolerance.
    pub tol: Option<f64>,
    /// Iteration output indicated by the [Verbosity] enum.
    pub verbosity: Verbosity,
}

impl SolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = Some(max_iter);
        self
    }

    pub fn tol(mut self, tol: f64) -> Self {
        self.tol = Some(tol);
        self
    }

    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn unwrap_or(self, max_iter: usize, tol: f64) -> (usize, f64, Verbosity) {
        (
            self.max_iter.unwrap_or(max_iter),
            self.tol.unwrap_or(tol),
            self.verbosity,
        )
    }
}

/// Result of an iterative solver together with its convergence diagnostics.
///
/// The solvers in this crate always return their last iterate, even if the
/// iteration budget was exhausted. Use [Converged::strict] to turn a
/// non-converged result into an error.
#[derive(Clone, Debug)]
pub struct Converged<T> {
    /// The last iterate.
    pub value: T,
    /// Number of iterations used.
    pub iterations: usize,
    /// Whether the tolerance was reached within the iteration budget.
    pub converged: bool,
    /// Final value of the convergence measure.
    pub residual: f64,
}

impl<T> Converged<T> {
    pub fn new(value: T, iterations: usize, converged: bool, residual: f64) -> Self {
        Self {
            value,
            iterations,
            converged,
            residual,
        }
    }

    /// Return the value if the iteration converged and an error otherwise.
    pub fn strict(self, solver: &str) -> EosResult<T> {
        if self.converged {
            Ok(self.value)
        } else if !self.residual.is_finite() {
            Err(EosError::IterationFailed(solver.to_owned()))
        } else {
            Err(EosError::NotConverged(solver.to_owned()))
        }
    }

    /// Apply a function to the value, keeping the diagnostics.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Converged<U> {
        Converged {
            value: f(self.value),
            iterations: self.iterations,
            converged: self.converged,
            residual: self.residual,
        }
    }

    /// Unwrap the value, ignoring the convergence status.
    pub fn into_value(self) -> T {
        self.value
    }

    pub(crate) fn log(&self, solver: &str, verbosity: Verbosity) {
        if self.converged {
            log_result!(
                verbosity,
                "{}: calculation converged in {} step(s) (residual: {:e})\n",
                solver,
                self.iterations,
                self.residual
            );
        } else {
            log_result!(
                verbosity,
                "{}: calculation did not converge within {} step(s) (residual: {:e})\n",
                solver,
                self.iterations,
                self.residual
            );
        }
    }
}
