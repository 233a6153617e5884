use super::{clamp_residual, MAX_ITER_EQUILIBRIUM, TOL_EQUILIBRIUM};
use crate::density_iteration::Phase;
use crate::errors::{EosError, EosResult};
use crate::log_iter;
use crate::pcsaft::PcSaft;
use crate::solver::{Converged, SolverOptions};
use itertools::izip;
use ndarray::Array1;

/// Phase split of a closed system with given amount of substance, volume and
/// overall composition at a trial pressure.
#[derive(Clone, Debug)]
pub struct PTzFlash {
    /// Sum of squared volume, fugacity and mass balance residuals.
    pub residual: f64,
    pub liquid_molefracs: Array1<f64>,
    pub vapor_molefracs: Array1<f64>,
    /// Molar vapor fraction.
    pub vapor_fraction: f64,
    /// Liquid molar density in mol/m³.
    pub liquid_density: f64,
    /// Vapor molar density in mol/m³.
    pub vapor_density: f64,
}

/// Vapor composition from the component mass balance. Non-volatile
/// components are removed and the result is renormalized.
fn vapor_molefracs(
    molefracs: &Array1<f64>,
    liquid_molefracs: &Array1<f64>,
    vapor_fraction: f64,
    volatile: &[bool],
) -> Array1<f64> {
    let xv: Array1<f64> = izip!(molefracs, liquid_molefracs, volatile)
        .map(|(&z, &xl, &v)| {
            if v {
                (z - (1.0 - vapor_fraction) * xl) / vapor_fraction
            } else {
                0.0
            }
        })
        .collect();
    let sum = xv.sum();
    xv / sum
}

impl PcSaft {
    /// Converge the compositions and the vapor fraction of a two-phase system
    /// with `total_moles` (mol) of composition `molefracs` in `total_volume`
    /// (m³) at a trial pressure.
    ///
    /// The liquid composition is updated by successive substitution, the
    /// vapor composition follows from the mass balance and the vapor fraction
    /// from the volume balance
    /// $\beta=\frac{V/n-1/\rho_L}{1/\rho_V-1/\rho_L}$.
    /// The iteration stops once the change of the vapor fraction is below
    /// the tolerance. Ions remain in the liquid phase.
    pub fn ptz_flash(
        &self,
        temperature: f64,
        pressure: f64,
        liquid_molefracs: &Array1<f64>,
        vapor_fraction: f64,
        total_moles: f64,
        total_volume: f64,
        molefracs: &Array1<f64>,
        options: SolverOptions,
    ) -> EosResult<Converged<PTzFlash>> {
        self.check_composition(liquid_molefracs)?;
        self.check_composition(molefracs)?;
        for (name, value) in [
            ("pressure", pressure),
            ("vapor fraction", vapor_fraction),
            ("total moles", total_moles),
            ("total volume", total_volume),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(EosError::InvalidState(
                    String::from("PTz flash"),
                    String::from(name),
                    value,
                ));
            }
        }
        let (max_iter, tol, verbosity) =
            options.unwrap_or(MAX_ITER_EQUILIBRIUM, TOL_EQUILIBRIUM);
        let volatile = self.volatile_components();
        let molar_volume = total_volume / total_moles;

        let mut beta = vapor_fraction;
        let mut xl = liquid_molefracs.clone();
        let mut xv = vapor_molefracs(molefracs, &xl, beta, &volatile);
        let n = xl.len();
        let (mut rho_l, mut rho_v) = (f64::NAN, f64::NAN);
        let mut phi_l = Array1::from_elem(n, f64::NAN);
        let mut phi_v = Array1::from_elem(n, f64::NAN);
        let mut change = f64::INFINITY;
        let mut iterations = 0;

        log_iter!(verbosity, " iter | vapor fraction change | vapor fraction");
        log_iter!(verbosity, "{:-<55}", "");
        for k in 1..=max_iter {
            iterations = k;
            let beta_old = beta;
            (rho_l, phi_l) = self.phase_properties(temperature, pressure, &xl, Phase::Liquid)?;
            (rho_v, phi_v) = self.phase_properties(temperature, pressure, &xv, Phase::Vapor)?;

            let xl_new: Array1<f64> = izip!(&phi_l, &phi_v, &xv, molefracs, &volatile)
                .map(|(&phi_l, &phi_v, &xv, &z, &v)| {
                    if v {
                        phi_v * xv / phi_l
                    } else {
                        z / (1.0 - beta)
                    }
                })
                .collect();
            let sum = xl_new.sum();
            xl = xl_new / sum;
            xv = vapor_molefracs(molefracs, &xl, beta, &volatile);

            beta = (molar_volume - 1.0 / rho_l) / (1.0 / rho_v - 1.0 / rho_l);
            change = (beta - beta_old).abs();
            log_iter!(verbosity, " {:4} | {:<21.8e} | {:.8}", k, change, beta);
            if !change.is_finite() || change < tol {
                break;
            }
        }

        let volume_balance = total_volume
            - total_moles * (beta / rho_v + (1.0 - beta) / rho_l);
        let mut residual = volume_balance.powi(2);
        for (&xl, &xv, &phi_l, &phi_v, &z, &v) in
            izip!(&xl, &xv, &phi_l, &phi_v, molefracs, &volatile)
        {
            if v {
                residual += (xl * phi_l - xv * phi_v).powi(2);
            }
            residual += (total_moles * (z - beta * xv - (1.0 - beta) * xl)).powi(2);
        }

        let res = Converged::new(
            PTzFlash {
                residual: clamp_residual(residual),
                liquid_molefracs: xl,
                vapor_molefracs: xv,
                vapor_fraction: beta,
                liquid_density: rho_l,
                vapor_density: rho_v,
            },
            iterations,
            change < tol,
            change,
        );
        res.log("PTz flash", verbosity);
        Ok(res)
    }

    /// PTz flash objective for an external optimizer.
    ///
    /// Errors and non-finite values are mapped to [RESIDUAL_SENTINEL](crate::RESIDUAL_SENTINEL).
    pub fn ptz_residual(
        &self,
        temperature: f64,
        pressure: f64,
        liquid_molefracs: &Array1<f64>,
        vapor_fraction: f64,
        total_moles: f64,
        total_volume: f64,
        molefracs: &Array1<f64>,
    ) -> f64 {
        clamp_residual(
            self.ptz_flash(
                temperature,
                pressure,
                liquid_molefracs,
                vapor_fraction,
                total_moles,
                total_volume,
                molefracs,
                SolverOptions::default(),
            )
            .map_or(f64::NAN, |r| r.value.residual),
        )
    }
}
