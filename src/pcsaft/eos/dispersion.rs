use super::hard_chain::zeta;
use super::{HelmholtzEnergyDual, PcSaftParameters, ResidualContribution};
use crate::state::StateHD;
use num_dual::DualNum;
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

pub const A0: [f64; 7] = [
    0.91056314451539,
    0.63612814494991,
    2.68613478913903,
    -26.5473624914884,
    97.7592087835073,
    -159.591540865600,
    91.2977740839123,
];
pub const A1: [f64; 7] = [
    -0.30840169182720,
    0.18605311591713,
    -2.50300472586548,
    21.4197936296668,
    -65.2558853303492,
    83.3186804808856,
    -33.7469229297323,
];
pub const A2: [f64; 7] = [
    -0.09061483509767,
    0.45278428063920,
    0.59627007280101,
    -1.72418291311787,
    -4.13021125311661,
    13.7766318697211,
    -8.67284703679646,
];
pub const B0: [f64; 7] = [
    0.72409469413165,
    2.23827918609380,
    -4.00258494846342,
    -21.00357681484648,
    26.8556413626615,
    206.5513384066188,
    -355.60235612207947,
];
pub const B1: [f64; 7] = [
    -0.57554980753450,
    0.69950955214436,
    3.89256733895307,
    -17.21547164777212,
    192.6722644652495,
    -161.8264616487648,
    -165.2076934555607,
];
pub const B2: [f64; 7] = [
    0.09768831158356,
    -0.25575749816100,
    -9.15585615297321,
    20.64207597439724,
    -38.80443005206285,
    93.6267740770146,
    -29.66690558514725,
];

/// Dispersion (attractive) contribution.
pub struct Dispersion {
    pub parameters: Arc<PcSaftParameters>,
}

impl Dispersion {
    /// The double sums $\sum_{ij}x_ix_jm_im_j\left(\frac{\varepsilon_{ij}}{kT}\right)^n\sigma_{ij}^3$
    /// for $n=1,2$.
    fn mixing_rules<D: DualNum<f64> + Copy>(&self, state: &StateHD<D>) -> (D, D) {
        let p = &self.parameters;
        let x = &state.molefracs;
        let n = p.m.len();
        let mut m2es3 = D::zero();
        let mut m2e2s3 = D::zero();
        for i in 0..n {
            for j in 0..n {
                let eps_ij = p.epsilon_k_ij[[i, j]] / state.temperature;
                let f = p.m[i] * p.m[j] * eps_ij * p.sigma_ij[[i, j]].powi(3);
                m2es3 += x[i] * x[j] * f;
                m2e2s3 += x[i] * x[j] * f * eps_ij;
            }
        }
        (m2es3, m2e2s3)
    }
}

/// Coefficients of the power series in the packing fraction of the
/// dispersion integrals for the mean segment number `m`.
fn integral_coefficients<D: DualNum<f64> + Copy>(m: D, i: usize) -> (D, D) {
    let m1 = (m - 1.0) / m;
    let m2 = m1 * (m - 2.0) / m;
    let a = m1 * A1[i] + m2 * A2[i] + A0[i];
    let b = m1 * B1[i] + m2 * B2[i] + B0[i];
    (a, b)
}

/// Compressibility term $C_1$ of the hard-chain fluid.
fn c1<D: DualNum<f64> + Copy>(m: D, eta: D) -> D {
    (m * (eta * 8.0 - eta.powi(2) * 2.0) / (eta - 1.0).powi(4)
        + (-m + 1.0)
            * (eta * 20.0 - eta.powi(2) * 27.0 + eta.powi(3) * 12.0 - eta.powi(4) * 2.0)
            / ((eta - 1.0) * (eta - 2.0)).powi(2)
        + 1.0)
        .recip()
}

impl<D: DualNum<f64> + Copy> HelmholtzEnergyDual<D> for Dispersion {
    fn helmholtz_energy(&self, state: &StateHD<D>) -> D {
        let p = &self.parameters;
        let d = p.hs_diameter(state.temperature);
        let eta = zeta(&p.m, &d, state)[3];
        let m = (&state.molefracs * &p.m).sum();
        let (m2es3, m2e2s3) = self.mixing_rules(state);

        // I1, I2
        let mut i1 = D::zero();
        let mut i2 = D::zero();
        let mut eta_i = D::one();
        for i in 0..=6 {
            let (a, b) = integral_coefficients(m, i);
            i1 += a * eta_i;
            i2 += b * eta_i;
            eta_i *= eta;
        }

        -state.density * PI * (i1 * m2es3 * 2.0 + m * c1(m, eta) * i2 * m2e2s3)
    }
}

impl ResidualContribution for Dispersion {
    fn compressibility(&self, state: &StateHD<f64>) -> f64 {
        let p = &self.parameters;
        let d = p.hs_diameter(state.temperature);
        let eta = zeta(&p.m, &d, state)[3];
        let m = (&state.molefracs * &p.m).sum();
        let (m2es3, m2e2s3) = self.mixing_rules(state);

        // I2 and the packing fraction derivatives of eta*I1 and eta*I2
        let mut i2 = 0.0;
        let mut deta_i1 = 0.0;
        let mut deta_i2 = 0.0;
        for i in 0..=6 {
            let (a, b) = integral_coefficients(m, i);
            let eta_i = eta.powi(i as i32);
            i2 += b * eta_i;
            deta_i1 += a * (i + 1) as f64 * eta_i;
            deta_i2 += b * (i + 1) as f64 * eta_i;
        }

        let c1 = c1(m, eta);
        let c2 = -c1.powi(2)
            * (m * (-4.0 * eta.powi(2) + 20.0 * eta + 8.0) / (1.0 - eta).powi(5)
                + (1.0 - m) * (2.0 * eta.powi(3) + 12.0 * eta.powi(2) - 48.0 * eta + 40.0)
                    / ((1.0 - eta) * (2.0 - eta)).powi(3));

        -2.0 * PI * state.density * deta_i1 * m2es3
            - PI * state.density * m * (c1 * deta_i2 + c2 * eta * i2) * m2e2s3
    }
}

impl fmt::Display for Dispersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dispersion")
    }
}
