use super::hard_chain::zeta;
use super::{HelmholtzEnergyDual, PcSaftParameters, ResidualContribution};
use crate::pcsaft::DipoleParameters;
use crate::state::StateHD;
use num_dual::DualNum;
use std::f64::consts::{FRAC_PI_3, PI};
use std::fmt;
use std::sync::Arc;

// Dipole parameters
pub const AD: [[f64; 3]; 5] = [
    [0.30435038064, 0.95346405973, -1.16100802773],
    [-0.13585877707, -1.83963831920, 4.52586067320],
    [1.44933285154, 2.01311801180, 0.97512223853],
    [0.35569769252, -7.37249576667, -12.2810377713],
    [-2.06533084541, 8.23741345333, 5.93975747420],
];

pub const BD: [[f64; 3]; 5] = [
    [0.21879385627, -0.58731641193, 3.48695755800],
    [-1.18964307357, 1.24891317047, -14.9159739347],
    [1.16268885692, -0.50852797392, 15.3720218600],
    [0.0; 3],
    [0.0; 3],
];

pub const CD: [[f64; 3]; 4] = [
    [-0.06467735252, -0.95208758351, -0.62609792333],
    [0.19758818347, 2.99242575222, 1.29246858189],
    [-0.80875619458, -2.38026356489, 1.65427830900],
    [0.69028490492, -0.27012609786, -3.43967436378],
];

pub const PI_SQ_43: f64 = 4.0 * PI * FRAC_PI_3;

/// Coefficients of the packing fraction power series of the pair integral $J_{2,ij}$.
fn pair_coefficients(mij1: f64, mij2: f64, eps_ij_t: f64) -> [f64; 5] {
    let mut c = [0.0; 5];
    for (l, c) in c.iter_mut().enumerate() {
        *c = AD[l][0]
            + mij1 * AD[l][1]
            + mij2 * AD[l][2]
            + eps_ij_t * (BD[l][0] + mij1 * BD[l][1] + mij2 * BD[l][2]);
    }
    c
}

/// Coefficients of the packing fraction power series of the triplet integral $J_{3,ijk}$.
fn triplet_coefficients(mijk1: f64, mijk2: f64) -> [f64; 4] {
    let mut c = [0.0; 4];
    for (l, c) in c.iter_mut().enumerate() {
        *c = CD[l][0] + mijk1 * CD[l][1] + mijk2 * CD[l][2];
    }
    c
}

/// Power series $\sum_lc_l\eta^l$.
fn series<D: DualNum<f64> + Copy>(c: &[f64], eta: D) -> D {
    c.iter()
        .rev()
        .fold(D::zero(), |acc, &c| acc * eta + c)
}

/// Packing fraction derivative of the power series $\eta\frac{\partial}{\partial\eta}\sum_lc_l\eta^l$.
fn series_derivative(c: &[f64], eta: f64) -> f64 {
    c.iter()
        .enumerate()
        .map(|(l, &c)| l as f64 * c * eta.powi(l as i32))
        .sum()
}

/// Dipole-dipole interactions (Gross and Vrabec, 2006).
pub struct Dipole {
    pub parameters: Arc<PcSaftParameters>,
}

/// Second and third order perturbation terms together with the weights of
/// their packing fraction derivatives.
struct Perturbation<D> {
    a2: D,
    a3: D,
    eta_da2: f64,
    eta_da3: f64,
}

impl Dipole {
    fn dipole_parameters(&self) -> Option<&DipoleParameters> {
        self.parameters.dipole.as_ref()
    }

    fn perturbation<D: DualNum<f64> + Copy>(&self, state: &StateHD<D>) -> Perturbation<D> {
        let mut res = Perturbation {
            a2: D::zero(),
            a3: D::zero(),
            eta_da2: 0.0,
            eta_da3: 0.0,
        };
        let Some(dp) = self.dipole_parameters() else {
            return res;
        };
        let p = &self.parameters;
        let t = state.temperature;
        let x = &state.molefracs;
        let d = p.hs_diameter(t);
        let eta = zeta(&p.m, &d, state)[3];

        // (eps_i / kT) sigma_i^3 mu2_i
        let mu2_term = dp
            .dipole_comp
            .iter()
            .zip(dp.mu2.iter())
            .map(|(&i, &mu2)| p.epsilon_k[i] / t * p.sigma[i].powi(3) * mu2)
            .collect::<Vec<_>>();

        let n = dp.len();
        for a in 0..n {
            let i = dp.dipole_comp[a];
            for b in 0..n {
                let j = dp.dipole_comp[b];
                let c2 = pair_coefficients(
                    dp.mij1[[a, b]],
                    dp.mij2[[a, b]],
                    dp.epsilon_k_ij[[a, b]] / t,
                );
                let w2 = x[i] * x[j] * (mu2_term[a] * mu2_term[b] / p.sigma_ij[[i, j]].powi(3));
                res.a2 -= w2 * series(&c2, eta);
                res.eta_da2 -= w2.re() * series_derivative(&c2, eta.re());
                for c in 0..n {
                    let k = dp.dipole_comp[c];
                    let c3 = triplet_coefficients(dp.mijk1[[a, b, c]], dp.mijk2[[a, b, c]]);
                    let w3 = x[i]
                        * x[j]
                        * x[k]
                        * (mu2_term[a] * mu2_term[b] * mu2_term[c]
                            / (p.sigma_ij[[i, j]] * p.sigma_ij[[i, k]] * p.sigma_ij[[j, k]]));
                    res.a3 -= w3 * series(&c3, eta);
                    res.eta_da3 -= w3.re() * series_derivative(&c3, eta.re());
                }
            }
        }
        let rho = state.density;
        res.a2 *= rho * PI;
        res.a3 *= rho * rho * PI_SQ_43;
        res.eta_da2 *= rho.re() * PI;
        res.eta_da3 *= rho.re().powi(2) * PI_SQ_43;
        res
    }
}

impl<D: DualNum<f64> + Copy> HelmholtzEnergyDual<D> for Dipole {
    fn helmholtz_energy(&self, state: &StateHD<D>) -> D {
        let Perturbation { a2, a3, .. } = self.perturbation(state);
        let result = a2 * a2 / (a2 - a3);
        if result.re().is_nan() {
            a2
        } else {
            result
        }
    }
}

impl ResidualContribution for Dipole {
    fn compressibility(&self, state: &StateHD<f64>) -> f64 {
        let Perturbation {
            a2,
            a3,
            eta_da2,
            eta_da3,
        } = self.perturbation(state);
        // density derivatives rho dA/drho of the perturbation terms
        let rho_da2 = a2 + eta_da2;
        let rho_da3 = 2.0 * a3 + eta_da3;
        let z = a2 * (rho_da2 * (a2 - 2.0 * a3) + a2 * rho_da3) / (a2 - a3).powi(2);
        if z.is_nan() {
            rho_da2
        } else {
            z
        }
    }
}

impl fmt::Display for Dipole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dipole")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcsaft::utils::{acetone_butane_parameters, acetone_parameters, dme_co2_parameters};
    use approx::assert_relative_eq;
    use ndarray::arr1;

    #[test]
    fn series_evaluation() {
        let c = [1.0, 2.0, 3.0];
        assert_relative_eq!(series(&c, 0.5), 1.0 + 1.0 + 0.75);
        assert_relative_eq!(series_derivative(&c, 0.5), 1.0 + 1.5);
    }

    #[test]
    fn dme_co2() {
        // one molecule of each component in 1000 Angstrom^3
        let dipole = Dipole {
            parameters: dme_co2_parameters(),
        };
        let n = 2.0;
        let s = StateHD::new(350.0, n / 1000.0, arr1(&[0.5, 0.5]));
        let a = dipole.helmholtz_energy(&s) * n;
        assert_relative_eq!(a, -1.35361827881345e-2, epsilon = 1e-6);
    }

    #[test]
    fn dipole_is_attractive() {
        let dipole = Dipole {
            parameters: acetone_parameters(),
        };
        let s = StateHD::new(300.0, 6e-3, arr1(&[1.0]));
        assert!(dipole.helmholtz_energy(&s) < 0.0);
        assert!(dipole.compressibility(&s) < 0.0);
    }

    #[test]
    fn pure_component_limit() {
        let pure = Dipole {
            parameters: acetone_parameters(),
        };
        let mix = Dipole {
            parameters: acetone_butane_parameters(),
        };
        let t = 300.0;
        let rho = 6e-3;
        let s = StateHD::new(t, rho, arr1(&[1.0]));
        let sm = StateHD::new(t, rho, arr1(&[1.0, 0.0]));
        assert_relative_eq!(
            pure.helmholtz_energy(&s),
            mix.helmholtz_energy(&sm),
            max_relative = 1e-14
        );
        assert_relative_eq!(pure.compressibility(&s), mix.compressibility(&sm), max_relative = 1e-14);
    }

    #[test]
    fn vanishes_without_dipolar_molecules() {
        let dipole = Dipole {
            parameters: acetone_butane_parameters(),
        };
        let s = StateHD::new(300.0, 6e-3, arr1(&[0.0, 1.0]));
        assert_eq!(dipole.helmholtz_energy(&s), 0.0);
        assert_eq!(dipole.compressibility(&s), 0.0);
    }
}
