use crate::errors::{EosError, EosResult};
use crate::pcsaft::PcSaft;
use crate::solver::{Converged, SolverOptions, Verbosity};
use crate::{log_iter, log_result};
use ndarray::Array1;

const MAX_ITER_DENSITY: usize = 300;
const TOL_DENSITY: f64 = 1e-8;
/// Initial increment of the secant iteration in mol/m³.
const SECANT_STEP: f64 = 1e-8;
/// Upper packing fraction bound of the vapor phase after widening.
const ETA_MAX_VAPOR_WIDENED: f64 = 0.14;
/// Relative pressure error above which a vapor iteration stuck at its bound is repeated.
const WIDENING_PRESSURE_ERROR: f64 = 1e-3;
/// Relative distance to the upper bound at which an iterate counts as stuck.
const WIDENING_BOUND_DISTANCE: f64 = 1e-6;

/// Phase used to select the initial guess and bounds of the density iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Liquid,
    Vapor,
}

impl Phase {
    /// Initial guess, lower and upper bound of the packing fraction.
    fn packing_fractions(self) -> (f64, f64, f64) {
        match self {
            Self::Liquid => (0.5, 0.2, 0.7405),
            Self::Vapor => (1e-9, 1e-12, 0.06),
        }
    }
}

/// Result of a density iteration.
#[derive(Clone, Debug)]
pub struct DensityIteration {
    /// Molar density in mol/m³.
    pub density: f64,
    /// Pressure in Pa at the final density.
    pub pressure: f64,
    /// Whether the upper bound of the vapor phase had to be widened.
    pub widened_bounds: bool,
}

/// Final iterate of a bounded secant pass.
struct SecantPass {
    density: f64,
    objective: f64,
    iterations: usize,
    converged: bool,
}

/// Secant iteration for the root of `objective`, where every step that leaves
/// the interval `[lower, upper]` is replaced by the midpoint between the
/// violated bound and the current iterate.
fn bounded_secant<F: Fn(f64) -> f64>(
    objective: F,
    mut rho1: f64,
    lower: f64,
    upper: f64,
    max_iter: usize,
    tol: f64,
    verbosity: Verbosity,
) -> SecantPass {
    let mut y1 = objective(rho1);
    let mut rho2 = rho1 + SECANT_STEP;
    for k in 1..=max_iter {
        let y2 = objective(rho2);
        log_iter!(verbosity, " {:4} | {:<14.8e} | {:<14.8e}", k, y2, rho2);
        if y2 < tol {
            return SecantPass {
                density: rho2,
                objective: y2,
                iterations: k,
                converged: true,
            };
        }

        let mut rho = rho2 - y2 / (y2 - y1) * (rho2 - rho1);
        if !rho.is_finite() {
            return SecantPass {
                density: rho2,
                objective: y2,
                iterations: k,
                converged: false,
            };
        }
        if rho < lower {
            rho = 0.5 * (lower + rho2);
        }
        if rho > upper {
            rho = 0.5 * (upper + rho2);
        }
        rho1 = rho2;
        y1 = y2;
        rho2 = rho;
    }
    SecantPass {
        density: rho1,
        objective: y1,
        iterations: max_iter,
        converged: false,
    }
}

impl PcSaft {
    /// Molar density (mol/m³) at given temperature (K), pressure (Pa) and
    /// composition.
    ///
    /// The squared relative pressure error in percent is minimized with a
    /// bounded secant method. The phase determines the initial guess and the
    /// bounds of the packing fraction. If a vapor iteration gets stuck at its
    /// upper bound, the bound is widened once and the iteration is repeated.
    ///
    /// Non-convergence is reported in the returned diagnostics and does not
    /// lead to an error.
    pub fn density(
        &self,
        temperature: f64,
        pressure: f64,
        molefracs: &Array1<f64>,
        phase: Phase,
        options: SolverOptions,
    ) -> EosResult<Converged<DensityIteration>> {
        if molefracs.len() != self.components() {
            return Err(EosError::IncompatibleComponents(
                self.components(),
                molefracs.len(),
            ));
        }
        if !(temperature > 0.0) {
            return Err(EosError::InvalidState(
                String::from("density iteration"),
                String::from("temperature"),
                temperature,
            ));
        }
        if !(pressure > 0.0) || !pressure.is_finite() {
            return Err(EosError::InvalidState(
                String::from("density iteration"),
                String::from("pressure"),
                pressure,
            ));
        }

        let (max_iter, tol, verbosity) = options.unwrap_or(MAX_ITER_DENSITY, TOL_DENSITY);
        let p = self.parameters();
        let to_density = |eta| p.density_from_packing_fraction(temperature, molefracs, eta);
        let objective = |rho| {
            let p_fit = self.pressure(temperature, rho, molefracs);
            ((p_fit - pressure) / pressure * 100.0).powi(2)
        };

        let (eta_guess, eta_lower, eta_upper) = phase.packing_fractions();
        let (lower, upper) = (to_density(eta_lower), to_density(eta_upper));

        log_iter!(verbosity, " iter | objective      | density");
        log_iter!(verbosity, "{:-<40}", "");
        let mut pass = bounded_secant(
            objective,
            to_density(eta_guess),
            lower,
            upper,
            max_iter,
            tol,
            verbosity,
        );
        let mut iterations = pass.iterations;

        let relative_error = pass.objective.sqrt() / 100.0;
        let at_upper_bound = (upper - pass.density) / upper < WIDENING_BOUND_DISTANCE;
        let widened_bounds = phase == Phase::Vapor
            && !pass.converged
            && relative_error > WIDENING_PRESSURE_ERROR
            && at_upper_bound;
        if widened_bounds {
            log_iter!(verbosity, "{:-<40}", "widen upper bound ");
            pass = bounded_secant(
                objective,
                upper,
                lower,
                to_density(ETA_MAX_VAPOR_WIDENED),
                max_iter,
                tol,
                verbosity,
            );
            iterations += pass.iterations;
        }

        let res = Converged::new(
            DensityIteration {
                density: pass.density,
                pressure: self.pressure(temperature, pass.density, molefracs),
                widened_bounds,
            },
            iterations,
            pass.converged,
            pass.objective,
        );
        res.log("Density iteration", verbosity);
        if widened_bounds {
            log_result!(verbosity, "Density iteration: upper vapor bound was widened\n");
        }
        Ok(res)
    }
}
