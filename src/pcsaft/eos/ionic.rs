use super::{HelmholtzEnergyDual, PcSaftParameters, ResidualContribution};
use crate::state::{StateHD, BOLTZMANN, ELEMENTARY_CHARGE, VACUUM_PERMITTIVITY};
use num_dual::DualNum;
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

/// Below this value of $\kappa\sigma$ the screening function is evaluated from its series expansion.
const SERIES_LIMIT: f64 = 0.1;
const SERIES_TERMS: i32 = 17;

/// Debye-Hückel contribution of charged species.
pub struct Ionic {
    pub parameters: Arc<PcSaftParameters>,
}

/// Bjerrum length $\lambda_B=\frac{e^2}{4\pi\varepsilon_0\varepsilon_rkT}$ in Angstrom.
fn bjerrum_length(temperature: f64, dielc: f64) -> f64 {
    ELEMENTARY_CHARGE.powi(2) / (4.0 * PI * VACUUM_PERMITTIVITY * dielc * BOLTZMANN * temperature)
        * 1e10
}

/// Screening function $\chi(y)=\frac{3}{y^3}\left[\ln(1+y)-2(1+y)+\frac{1}{2}(1+y)^2+\frac{3}{2}\right]$.
fn chi<D: DualNum<f64> + Copy>(y: D) -> D {
    if y.re() < SERIES_LIMIT {
        // 3 sum_k (-y)^k / (k + 3)
        (0..SERIES_TERMS).rev().fold(D::zero(), |acc, k| {
            -acc * y + 3.0 / (k + 3) as f64
        })
    } else {
        (y.ln_1p() - y + y * y * 0.5) * 3.0 / y.powi(3)
    }
}

impl Ionic {
    /// Inverse Debye screening length in 1/Angstrom and the Bjerrum length in Angstrom.
    fn screening<D: DualNum<f64> + Copy>(&self, state: &StateHD<D>) -> Option<(D, f64)> {
        let ionic = self.parameters.ionic.as_ref()?;
        let lambda_b = bjerrum_length(state.temperature, ionic.dielc);
        let rho_z2 = state
            .partial_density
            .iter()
            .zip(ionic.z.iter())
            .fold(D::zero(), |acc, (&rho, &z)| acc + rho * z * z);
        let kappa = (rho_z2 * 4.0 * PI * lambda_b).sqrt();
        (kappa.re() != 0.0).then_some((kappa, lambda_b))
    }
}

impl<D: DualNum<f64> + Copy> HelmholtzEnergyDual<D> for Ionic {
    fn helmholtz_energy(&self, state: &StateHD<D>) -> D {
        let (Some((kappa, lambda_b)), Some(ionic)) =
            (self.screening(state), self.parameters.ionic.as_ref())
        else {
            return D::zero();
        };
        let sigma = &self.parameters.sigma;
        let sum = (0..sigma.len()).fold(D::zero(), |acc, i| {
            acc + state.molefracs[i] * ionic.z[i].powi(2) * chi(kappa * sigma[i])
        });
        -kappa * lambda_b / 3.0 * sum
    }
}

impl ResidualContribution for Ionic {
    fn compressibility(&self, state: &StateHD<f64>) -> f64 {
        let (Some((kappa, lambda_b)), Some(ionic)) =
            (self.screening(state), self.parameters.ionic.as_ref())
        else {
            return 0.0;
        };
        let sigma = &self.parameters.sigma;
        let sum: f64 = (0..sigma.len())
            .map(|i| {
                let y = kappa * sigma[i];
                let sigma_k = -2.0 * chi(y) + 3.0 / (1.0 + y);
                state.molefracs[i] * ionic.z[i].powi(2) * sigma_k
            })
            .sum();
        -kappa * lambda_b / 6.0 * sum
    }
}

impl fmt::Display for Ionic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ionic")
    }
}
