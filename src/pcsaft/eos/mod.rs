use super::parameters::PcSaftParameters;
use crate::solver::Converged;
use crate::state::{StateHD, BOLTZMANN, MOLAR_TO_NUMBER_DENSITY};
use ndarray::Array1;
use num_dual::{Dual64, DualNum};
use std::f64::consts::FRAC_PI_6;
use std::fmt;
use std::sync::Arc;

pub(crate) mod association;
pub(crate) mod dispersion;
pub(crate) mod hard_chain;
pub(crate) mod ionic;
pub(crate) mod polar;
use association::Association;
use dispersion::Dispersion;
use hard_chain::HardChain;
use ionic::Ionic;
use polar::Dipole;

/// Highest packing fraction used for the maximum density.
const MAX_ETA: f64 = 0.7405;

/// Reduced residual Helmholtz energy $\tilde a = A^\mathrm{res}/(NkT)$ of a
/// single contribution, evaluated for a generic dual number type.
pub trait HelmholtzEnergyDual<D: DualNum<f64>> {
    fn helmholtz_energy(&self, state: &StateHD<D>) -> D;
}

/// A term of the residual Helmholtz energy.
///
/// Besides the Helmholtz energy (required for real numbers and for
/// first-order dual numbers) every term provides its contribution to the
/// compressibility factor $Z_\mathrm{term}=\rho\frac{\partial\tilde a_\mathrm{term}}{\partial\rho}$.
pub trait ResidualContribution:
    HelmholtzEnergyDual<f64> + HelmholtzEnergyDual<Dual64> + fmt::Display + Send + Sync
{
    fn compressibility(&self, state: &StateHD<f64>) -> f64;
}

/// Customization options for the PC-SAFT equation of state.
#[derive(Copy, Clone, Debug)]
pub struct PcSaftOptions {
    /// Maximum number of iterations for the association site fractions.
    pub max_iter_assoc: usize,
    /// Tolerance (L1 norm of the site fraction update) for the association site fractions.
    pub tol_assoc: f64,
}

impl Default for PcSaftOptions {
    fn default() -> Self {
        Self {
            max_iter_assoc: 500,
            tol_assoc: 1e-9,
        }
    }
}

/// PC-SAFT equation of state.
///
/// All methods take the temperature in K, the molar density in mol/m³ and
/// the mole fractions of all components.
pub struct PcSaft {
    parameters: Arc<PcSaftParameters>,
    options: PcSaftOptions,
    contributions: Vec<Arc<dyn ResidualContribution>>,
    association: Option<Arc<Association>>,
}

impl PcSaft {
    pub fn new(parameters: Arc<PcSaftParameters>) -> Self {
        Self::with_options(parameters, PcSaftOptions::default())
    }

    pub fn with_options(parameters: Arc<PcSaftParameters>, options: PcSaftOptions) -> Self {
        let mut contributions: Vec<Arc<dyn ResidualContribution>> = Vec::with_capacity(5);
        contributions.push(Arc::new(HardChain {
            parameters: parameters.clone(),
        }));
        contributions.push(Arc::new(Dispersion {
            parameters: parameters.clone(),
        }));
        let association = parameters.association.is_some().then(|| {
            Arc::new(Association::new(
                parameters.clone(),
                options.max_iter_assoc,
                options.tol_assoc,
            ))
        });
        if let Some(association) = &association {
            contributions.push(association.clone());
        }
        if parameters.dipole.is_some() {
            contributions.push(Arc::new(Dipole {
                parameters: parameters.clone(),
            }));
        }
        if parameters.ionic.is_some() {
            contributions.push(Arc::new(Ionic {
                parameters: parameters.clone(),
            }));
        }

        Self {
            parameters,
            options,
            contributions,
            association,
        }
    }

    pub fn parameters(&self) -> &Arc<PcSaftParameters> {
        &self.parameters
    }

    pub fn options(&self) -> PcSaftOptions {
        self.options
    }

    /// Number of components.
    pub fn components(&self) -> usize {
        self.parameters.components()
    }

    /// The active contributions in evaluation order.
    pub fn contributions(&self) -> &[Arc<dyn ResidualContribution>] {
        &self.contributions
    }

    /// Compressibility factor $Z=\frac{p}{\rho kT}$.
    pub fn compressibility(&self, temperature: f64, density: f64, molefracs: &Array1<f64>) -> f64 {
        let state = StateHD::from_molar_density(temperature, density, molefracs);
        1.0 + self
            .contributions
            .iter()
            .map(|c| c.compressibility(&state))
            .sum::<f64>()
    }

    /// Ideal gas and residual contributions to the compressibility factor.
    pub fn compressibility_contributions(
        &self,
        temperature: f64,
        density: f64,
        molefracs: &Array1<f64>,
    ) -> Vec<(String, f64)> {
        let state = StateHD::from_molar_density(temperature, density, molefracs);
        let mut res = Vec::with_capacity(self.contributions.len() + 1);
        res.push(("Ideal gas".to_string(), 1.0));
        for c in self.contributions.iter() {
            res.push((c.to_string(), c.compressibility(&state)));
        }
        res
    }

    /// Reduced residual Helmholtz energy $\tilde a^\mathrm{res}=\frac{A^\mathrm{res}}{NkT}$.
    pub fn residual_helmholtz_energy(
        &self,
        temperature: f64,
        density: f64,
        molefracs: &Array1<f64>,
    ) -> f64 {
        let state = StateHD::from_molar_density(temperature, density, molefracs);
        self.contributions
            .iter()
            .map(|c| c.helmholtz_energy(&state))
            .sum()
    }

    /// Residual Helmholtz energy and its derivatives with respect to the
    /// mole fractions at constant number density.
    fn helmholtz_energy_composition_derivatives(
        &self,
        temperature: f64,
        density: f64,
        molefracs: &Array1<f64>,
    ) -> (f64, Array1<f64>) {
        let n = molefracs.len();
        let rho = Dual64::from(density * MOLAR_TO_NUMBER_DENSITY);
        let mut a_res = 0.0;
        let mut da_dx = Array1::zeros(n);
        for i in 0..n {
            let x = Array1::from_shape_fn(n, |j| {
                let xj = Dual64::from(molefracs[j]);
                if i == j {
                    xj.derivative()
                } else {
                    xj
                }
            });
            let state = StateHD::new(temperature, rho, x);
            let a = self
                .contributions
                .iter()
                .fold(Dual64::from(0.0), |acc, c| acc + c.helmholtz_energy(&state));
            a_res = a.re;
            da_dx[i] = a.eps;
        }
        (a_res, da_dx)
    }

    /// Reduced residual chemical potentials $\frac{\mu_i^\mathrm{res}}{kT}$ at constant
    /// temperature and volume.
    pub fn residual_chemical_potential(
        &self,
        temperature: f64,
        density: f64,
        molefracs: &Array1<f64>,
    ) -> Array1<f64> {
        let z = self.compressibility(temperature, density, molefracs);
        let (a_res, da_dx) =
            self.helmholtz_energy_composition_derivatives(temperature, density, molefracs);
        let sum_x_da_dx = molefracs.dot(&da_dx);
        da_dx.mapv(|da| a_res + (z - 1.0) + da - sum_x_da_dx)
    }

    /// Logarithmic fugacity coefficients $\ln\varphi_i=\frac{\mu_i^\mathrm{res}}{kT}-\ln Z$.
    pub fn ln_phi(&self, temperature: f64, density: f64, molefracs: &Array1<f64>) -> Array1<f64> {
        let ln_z = self.compressibility(temperature, density, molefracs).ln();
        self.residual_chemical_potential(temperature, density, molefracs) - ln_z
    }

    /// Fugacity coefficients $\varphi_i$.
    pub fn fugacity_coefficients(
        &self,
        temperature: f64,
        density: f64,
        molefracs: &Array1<f64>,
    ) -> Array1<f64> {
        self.ln_phi(temperature, density, molefracs).mapv(f64::exp)
    }

    /// Pressure in Pa.
    pub fn pressure(&self, temperature: f64, density: f64, molefracs: &Array1<f64>) -> f64 {
        self.compressibility(temperature, density, molefracs)
            * BOLTZMANN
            * temperature
            * density
            * MOLAR_TO_NUMBER_DENSITY
            * 1e30
    }

    /// Molar density in mol/m³ at the close packing limit of the segments.
    pub fn max_density(&self, molefracs: &Array1<f64>) -> f64 {
        let p = &self.parameters;
        let m3 = (molefracs * &p.m * &p.sigma.mapv(|s| s.powi(3))).sum();
        MAX_ETA / (FRAC_PI_6 * m3) / MOLAR_TO_NUMBER_DENSITY
    }

    /// Association site fractions ordered as `[X_A(0), X_B(0), X_A(1), ...]` for
    /// the associating components, or `None` if no component associates.
    pub fn site_fractions(
        &self,
        temperature: f64,
        density: f64,
        molefracs: &Array1<f64>,
    ) -> Option<Converged<Array1<f64>>> {
        let state = StateHD::from_molar_density(temperature, density, molefracs);
        self.association.as_ref().map(|a| a.site_fractions(&state))
    }
}

impl fmt::Display for PcSaft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PC-SAFT(")?;
        let names: Vec<_> = self.contributions.iter().map(|c| c.to_string()).collect();
        write!(f, "{})", names.join(", "))
    }
}
