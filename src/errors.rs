use crate::parameter::ParameterError;
use num_dual::linalg::LinAlgError;
use thiserror::Error;

/// Error type for invalid input and failed iterations.
#[derive(Error, Debug)]
pub enum EosError {
    #[error("{0}: no convergence within the maximum number of iterations.")]
    NotConverged(String),
    #[error("{0}: the iteration produced non-finite values.")]
    IterationFailed(String),
    #[error("The model contains {0} components but the composition has {1} entries.")]
    IncompatibleComponents(usize, usize),
    #[error("{0}: invalid {1} = {2}.")]
    InvalidState(String, String, f64),
    #[error(transparent)]
    ParameterError(#[from] ParameterError),
    #[error(transparent)]
    LinAlgError(#[from] LinAlgError),
}

/// Convenience type for `Result<T, EosError>`.
pub type EosResult<T> = Result<T, EosError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let e = EosError::InvalidState("density iteration".into(), "pressure".into(), -1.0);
        assert_eq!(e.to_string(), "density iteration: invalid pressure = -1.");
        let e = EosError::IncompatibleComponents(2, 3);
        assert_eq!(
            e.to_string(),
            "The model contains 2 components but the composition has 3 entries."
        );
    }
}
