use super::{HelmholtzEnergyDual, PcSaftParameters, ResidualContribution};
use crate::state::StateHD;
use ndarray::Array1;
use num_dual::DualNum;
use std::f64::consts::FRAC_PI_6;
use std::fmt;
use std::sync::Arc;

/// Segment weighted moments $\sum_ix_im_id_i^k$ for $k=0\ldots 3$.
pub(crate) fn moments<D: DualNum<f64> + Copy>(
    m: &Array1<f64>,
    diameter: &Array1<f64>,
    molefracs: &Array1<D>,
) -> [D; 4] {
    let mut moments = [D::zero(); 4];
    for i in 0..diameter.len() {
        for (k, mk) in moments.iter_mut().enumerate() {
            *mk = *mk + molefracs[i] * (diameter[i].powi(k as i32) * m[i]);
        }
    }
    moments
}

/// Packing fractions $\zeta_k=\frac{\pi}{6}\rho\sum_ix_im_id_i^k$ for $k=0\ldots 3$.
pub(crate) fn zeta<D: DualNum<f64> + Copy>(
    m: &Array1<f64>,
    diameter: &Array1<f64>,
    state: &StateHD<D>,
) -> [D; 4] {
    moments(m, diameter, &state.molefracs).map(|mk| mk * state.density * FRAC_PI_6)
}

/// Contact value of the hard-sphere pair correlation function for
/// `dij = d_i d_j / (d_i + d_j)`.
pub(crate) fn rdf_contact<D: DualNum<f64> + Copy>(dij: f64, zeta2: D, zeta3: D) -> D {
    let frac_1mz3 = -(zeta3 - 1.0).recip();
    frac_1mz3
        + zeta2 * frac_1mz3.powi(2) * (dij * 3.0)
        + (zeta2 * frac_1mz3).powi(2) * frac_1mz3 * (dij.powi(2) * 2.0)
}

/// $\rho\frac{\partial g_{ij}}{\partial\rho}$ of the contact value.
pub(crate) fn rdf_contact_density_derivative(dij: f64, zeta2: f64, zeta3: f64) -> f64 {
    let frac_1mz3 = 1.0 / (1.0 - zeta3);
    zeta3 * frac_1mz3.powi(2)
        + dij * (3.0 * zeta2 * frac_1mz3.powi(2) + 6.0 * zeta2 * zeta3 * frac_1mz3.powi(3))
        + dij.powi(2)
            * (4.0 * zeta2.powi(2) * frac_1mz3.powi(3)
                + 6.0 * zeta2.powi(2) * zeta3 * frac_1mz3.powi(4))
}

/// Hard-sphere reference (BMCSL) and chain formation.
pub struct HardChain {
    pub parameters: Arc<PcSaftParameters>,
}

impl<D: DualNum<f64> + Copy> HelmholtzEnergyDual<D> for HardChain {
    fn helmholtz_energy(&self, state: &StateHD<D>) -> D {
        let p = &self.parameters;
        let d = p.hs_diameter(state.temperature);
        let [m0, m1, m2, m3] = moments(&p.m, &d, &state.molefracs);
        let zeta2 = m2 * state.density * FRAC_PI_6;
        let zeta3 = m3 * state.density * FRAC_PI_6;
        let frac_1mz3 = -(zeta3 - 1.0).recip();

        // hard spheres (BMCSL)
        let a_hs = m1 * zeta2 * frac_1mz3 * 3.0
            + m2.powi(2) * zeta2 * frac_1mz3.powi(2) / m3
            + (m2.powi(3) / m3.powi(2) - m0) * (-zeta3).ln_1p();

        // chain formation
        let c = (0..p.m.len()).fold(D::zero(), |acc, i| {
            let g = rdf_contact(d[i] * 0.5, zeta2, zeta3);
            acc + state.molefracs[i] * (p.m[i] - 1.0) * g.ln()
        });
        a_hs - c
    }
}

impl ResidualContribution for HardChain {
    fn compressibility(&self, state: &StateHD<f64>) -> f64 {
        let p = &self.parameters;
        let d = p.hs_diameter(state.temperature);
        let [m0, m1, m2, _] = moments(&p.m, &d, &state.molefracs);
        let [_, _, zeta2, zeta3] = zeta(&p.m, &d, state);
        let frac_1mz3 = 1.0 / (1.0 - zeta3);

        let z_hs = m0 * zeta3 * frac_1mz3
            + 3.0 * m1 * zeta2 * frac_1mz3.powi(2)
            + (3.0 - zeta3) * m2 * zeta2.powi(2) * frac_1mz3.powi(3);

        let z_chain: f64 = (0..p.m.len())
            .map(|i| {
                let dii = d[i] * 0.5;
                state.molefracs[i] * (p.m[i] - 1.0)
                    * rdf_contact_density_derivative(dii, zeta2, zeta3)
                    / rdf_contact(dii, zeta2, zeta3)
            })
            .sum();
        z_hs - z_chain
    }
}

impl fmt::Display for HardChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hard Chain")
    }
}
