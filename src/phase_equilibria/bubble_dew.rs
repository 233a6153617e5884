use super::{clamp_residual, composition_change, MAX_ITER_EQUILIBRIUM, TOL_EQUILIBRIUM};
use crate::density_iteration::Phase;
use crate::errors::{EosError, EosResult};
use crate::pcsaft::PcSaft;
use crate::log_iter;
use crate::solver::{Converged, SolverOptions};
use itertools::izip;
use ndarray::Array1;

/// Vapor phase in equilibrium with a liquid of given composition at a trial pressure.
#[derive(Clone, Debug)]
pub struct BubblePoint {
    /// Squared deviation of the fugacities; vanishes at the bubble point.
    pub residual: f64,
    pub vapor_molefracs: Array1<f64>,
    /// Liquid molar density in mol/m³.
    pub liquid_density: f64,
    /// Vapor molar density in mol/m³.
    pub vapor_density: f64,
}

/// Liquid phase in equilibrium with a vapor of given composition at a trial pressure.
#[derive(Clone, Debug)]
pub struct DewPoint {
    /// Squared deviation of the fugacities; vanishes at the dew point.
    pub residual: f64,
    pub liquid_molefracs: Array1<f64>,
    /// Liquid molar density in mol/m³.
    pub liquid_density: f64,
    /// Vapor molar density in mol/m³.
    pub vapor_density: f64,
}

/// Converged state of the successive substitution on the incipient phase.
struct IncipientPhase {
    residual: f64,
    molefracs: Array1<f64>,
    density_fixed: f64,
    density: f64,
}

impl PcSaft {
    /// Converge the vapor composition in equilibrium with the liquid
    /// composition `molefracs` at a trial pressure.
    ///
    /// The vapor composition is updated by successive substitution
    /// $y_i\leftarrow\varphi_i^Lx_i/\varphi_i^V$ until the change of the
    /// composition is below the tolerance. Ions do not enter the vapor phase.
    pub fn bubble_point(
        &self,
        temperature: f64,
        pressure: f64,
        molefracs: &Array1<f64>,
        vapor_molefracs: &Array1<f64>,
        options: SolverOptions,
    ) -> EosResult<Converged<BubblePoint>> {
        let res = self.iterate_bubble_dew(
            temperature,
            pressure,
            molefracs,
            vapor_molefracs,
            true,
            options,
        )?;
        res.log("Bubble point", options.verbosity);
        Ok(res.map(|r| BubblePoint {
            residual: r.residual,
            vapor_molefracs: r.molefracs,
            liquid_density: r.density_fixed,
            vapor_density: r.density,
        }))
    }

    /// Bubble point objective for an external optimizer.
    ///
    /// Errors and non-finite values are mapped to [RESIDUAL_SENTINEL](crate::RESIDUAL_SENTINEL).
    pub fn bubble_point_residual(
        &self,
        temperature: f64,
        pressure: f64,
        molefracs: &Array1<f64>,
        vapor_molefracs: &Array1<f64>,
    ) -> f64 {
        clamp_residual(
            self.bubble_point(
                temperature,
                pressure,
                molefracs,
                vapor_molefracs,
                SolverOptions::default(),
            )
            .map_or(f64::NAN, |r| r.value.residual),
        )
    }

    /// Converge the liquid composition in equilibrium with the vapor
    /// composition `molefracs` at a trial pressure.
    ///
    /// The liquid composition is updated by successive substitution
    /// $x_i\leftarrow\varphi_i^Vy_i/\varphi_i^L$. The mole fractions of ions
    /// are not affected by the phase equilibrium and keep the values of the
    /// initial guess.
    pub fn dew_point(
        &self,
        temperature: f64,
        pressure: f64,
        molefracs: &Array1<f64>,
        liquid_molefracs: &Array1<f64>,
        options: SolverOptions,
    ) -> EosResult<Converged<DewPoint>> {
        let res = self.iterate_bubble_dew(
            temperature,
            pressure,
            molefracs,
            liquid_molefracs,
            false,
            options,
        )?;
        res.log("Dew point", options.verbosity);
        Ok(res.map(|r| DewPoint {
            residual: r.residual,
            liquid_molefracs: r.molefracs,
            liquid_density: r.density,
            vapor_density: r.density_fixed,
        }))
    }

    /// Dew point objective for an external optimizer.
    ///
    /// Errors and non-finite values are mapped to [RESIDUAL_SENTINEL](crate::RESIDUAL_SENTINEL).
    pub fn dew_point_residual(
        &self,
        temperature: f64,
        pressure: f64,
        molefracs: &Array1<f64>,
        liquid_molefracs: &Array1<f64>,
    ) -> f64 {
        clamp_residual(
            self.dew_point(
                temperature,
                pressure,
                molefracs,
                liquid_molefracs,
                SolverOptions::default(),
            )
            .map_or(f64::NAN, |r| r.value.residual),
        )
    }

    fn iterate_bubble_dew(
        &self,
        temperature: f64,
        pressure: f64,
        molefracs_fixed: &Array1<f64>,
        molefracs_init: &Array1<f64>,
        bubble: bool,
        options: SolverOptions,
    ) -> EosResult<Converged<IncipientPhase>> {
        self.check_composition(molefracs_fixed)?;
        self.check_composition(molefracs_init)?;
        if !(pressure > 0.0) {
            return Err(EosError::InvalidState(
                String::from(if bubble { "bubble point" } else { "dew point" }),
                String::from("pressure"),
                pressure,
            ));
        }
        let (max_iter, tol, verbosity) =
            options.unwrap_or(MAX_ITER_EQUILIBRIUM, TOL_EQUILIBRIUM);
        let (phase_fixed, phase) = if bubble {
            (Phase::Liquid, Phase::Vapor)
        } else {
            (Phase::Vapor, Phase::Liquid)
        };
        let volatile = self.volatile_components();

        let (density_fixed, phi_fixed) =
            self.phase_properties(temperature, pressure, molefracs_fixed, phase_fixed)?;
        // fugacities of the specified phase divided by the pressure
        let f_fixed = &phi_fixed * molefracs_fixed;

        log_iter!(verbosity, " iter | composition change | molefracs incipient phase");
        log_iter!(verbosity, "{:-<70}", "");
        let mut x = molefracs_init.clone();
        let mut density = f64::NAN;
        let mut phi = Array1::from_elem(x.len(), f64::NAN);
        let mut change = f64::INFINITY;
        let mut iterations = 0;
        for k in 1..=max_iter {
            iterations = k;
            (density, phi) = self.phase_properties(temperature, pressure, &x, phase)?;
            let mut x_new: Array1<f64> = izip!(&f_fixed, &phi, molefracs_init, &volatile)
                .map(|(&f, &phi, &x0, &volatile)| match (volatile, bubble) {
                    (true, _) => f / phi,
                    (false, true) => 0.0,
                    (false, false) => x0,
                })
                .collect();
            let sum = x_new.sum();
            x_new /= sum;
            change = composition_change(&x_new, &x);
            x = x_new;
            log_iter!(verbosity, " {:4} | {:<18.8e} | {:.8?}", k, change, x.to_vec());
            if !change.is_finite() || change < tol {
                break;
            }
        }

        let residual = izip!(&f_fixed, &phi, &x, &volatile)
            .filter(|(.., v)| **v)
            .map(|(f, phi, x, _)| (f - phi * x).powi(2))
            .sum();
        let converged = change < tol;
        Ok(Converged::new(
            IncipientPhase {
                residual: clamp_residual(residual),
                molefracs: x,
                density_fixed,
                density,
            },
            iterations,
            converged,
            change,
        ))
    }
}
