//! Vapor-liquid equilibrium objectives.
//!
//! The functions in this module do not locate an equilibrium by themselves.
//! For a trial pressure (and trial phase split) they converge the phase
//! compositions by successive substitution and return a scalar residual that
//! vanishes at equilibrium. Driving that residual to zero is left to an
//! external optimizer.
use crate::density_iteration::Phase;
use crate::errors::{EosError, EosResult};
use crate::pcsaft::PcSaft;
use crate::solver::SolverOptions;
use ndarray::Array1;

mod bubble_dew;
mod ptz_flash;
pub use bubble_dew::{BubblePoint, DewPoint};
pub use ptz_flash::PTzFlash;

const MAX_ITER_EQUILIBRIUM: usize = 100;
const TOL_EQUILIBRIUM: f64 = 1e-9;

/// Value returned instead of a non-finite residual.
pub const RESIDUAL_SENTINEL: f64 = 1e8;

fn clamp_residual(residual: f64) -> f64 {
    if residual.is_finite() {
        residual
    } else {
        RESIDUAL_SENTINEL
    }
}

/// Sum of absolute differences between two compositions.
fn composition_change(x_new: &Array1<f64>, x_old: &Array1<f64>) -> f64 {
    x_new
        .iter()
        .zip(x_old.iter())
        .map(|(a, b)| (a - b).abs())
        .sum()
}

impl PcSaft {
    /// Molar density and fugacity coefficients of a phase at given temperature
    /// and pressure.
    fn phase_properties(
        &self,
        temperature: f64,
        pressure: f64,
        molefracs: &Array1<f64>,
        phase: Phase,
    ) -> EosResult<(f64, Array1<f64>)> {
        let density = self
            .density(temperature, pressure, molefracs, phase, SolverOptions::default())?
            .value
            .density;
        Ok((
            density,
            self.fugacity_coefficients(temperature, density, molefracs),
        ))
    }

    /// Components that can enter the vapor phase. Ions are non-volatile.
    fn volatile_components(&self) -> Vec<bool> {
        let p = self.parameters();
        (0..self.components()).map(|i| !p.is_ion(i)).collect()
    }

    fn check_composition(&self, molefracs: &Array1<f64>) -> EosResult<()> {
        if molefracs.len() != self.components() {
            return Err(EosError::IncompatibleComponents(
                self.components(),
                molefracs.len(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_residuals_are_clamped() {
        assert_eq!(clamp_residual(f64::NAN), RESIDUAL_SENTINEL);
        assert_eq!(clamp_residual(f64::INFINITY), RESIDUAL_SENTINEL);
        assert_eq!(clamp_residual(0.5), 0.5);
    }

    #[test]
    fn composition_change_is_l1() {
        let a = Array1::from_vec(vec![0.2, 0.8]);
        let b = Array1::from_vec(vec![0.5, 0.5]);
        assert!((composition_change(&a, &b) - 0.6).abs() < 1e-15);
    }
}
