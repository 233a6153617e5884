//! PC-SAFT equation of state for mixtures of non-polar, polar, associating
//! and ionic components.
//!
//! The crate evaluates residual properties (compressibility factor, fugacity
//! coefficients, pressure) for a given temperature, molar density and
//! composition, inverts the pressure equation for the density, and provides
//! the bubble point, dew point and PTz flash objectives that are meant to be
//! driven to zero by an external optimizer.
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::many_single_char_names)]

/// Print messages with level `Verbosity::Iter` or higher.
#[macro_export]
macro_rules! log_iter {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::Verbosity::Iter {
            println!($($arg)*);
        }
    }
}

/// Print messages with level `Verbosity::Result` or higher.
#[macro_export]
macro_rules! log_result {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::Verbosity::Result {
            println!($($arg)*);
        }
    }
}

mod density_iteration;
mod errors;
pub mod parameter;
pub mod pcsaft;
mod phase_equilibria;
mod solver;
mod state;

pub use density_iteration::{DensityIteration, Phase};
pub use errors::{EosError, EosResult};
pub use phase_equilibria::{BubblePoint, DewPoint, PTzFlash, RESIDUAL_SENTINEL};
pub use solver::{Converged, SolverOptions, Verbosity};
pub use state::{StateHD, AVOGADRO, BOLTZMANN, ELEMENTARY_CHARGE, VACUUM_PERMITTIVITY};
