//! Association contribution for the 2B scheme (one donor and one acceptor
//! site per associating molecule).
//!
//! Site fractions are stored in a flat vector ordered component-major and
//! site-minor, i.e. `[X_A(0), X_B(0), X_A(1), X_B(1), ...]` where the
//! component index refers to the position in the list of associating
//! components. Sites only bond to sites of the opposite kind.
use super::hard_chain::{rdf_contact, rdf_contact_density_derivative, zeta};
use super::{HelmholtzEnergyDual, PcSaftParameters, ResidualContribution};
use crate::errors::EosResult;
use crate::pcsaft::AssociationParameters;
use crate::solver::Converged;
use crate::state::StateHD;
use ndarray::{Array1, Array2};
use num_dual::linalg::LU;
use num_dual::DualNum;
use std::fmt;
use std::sync::Arc;

/// Number of association sites per molecule.
const SITES: usize = 2;

/// Fixed point iteration for the fraction of non-bonded association sites
/// and the linear system for their density derivative.
pub struct SiteFractionSolver {
    delta: Array2<f64>,
    density: f64,
    molefracs: Array1<f64>,
}

impl SiteFractionSolver {
    /// Create a solver from the association strengths (in Angstrom^3) of all pairs of
    /// associating components, the number density (in Angstrom^-3) and the
    /// mole fractions of the associating components.
    pub fn new(delta: Array2<f64>, density: f64, molefracs: Array1<f64>) -> Self {
        Self {
            delta,
            density,
            molefracs,
        }
    }

    /// Number of associating components.
    pub fn components(&self) -> usize {
        self.molefracs.len()
    }

    /// Analytic single-component estimate
    /// $X=\frac{-1+\sqrt{1+8\rho\Delta_{ii}}}{4\rho\Delta_{ii}}$ used for both sites.
    pub fn initial_guess(&self) -> Array1<f64> {
        Array1::from_shape_fn(self.components() * SITES, |k| {
            let i = k / SITES;
            let deltarho = self.density * self.delta[[i, i]];
            if deltarho > f64::EPSILON.sqrt() {
                (-1.0 + (1.0 + 8.0 * deltarho).sqrt()) / (4.0 * deltarho)
            } else {
                1.0 - 2.0 * deltarho
            }
        })
    }

    /// A single Jacobi-style update
    /// $X_{i\alpha}=\left(1+\rho\sum_jx_j\sum_{\beta\neq\alpha}X_{j\beta}\Delta_{ij}\right)^{-1}$.
    pub fn picard_step(&self, xa: &Array1<f64>) -> Array1<f64> {
        let n = self.components();
        Array1::from_shape_fn(n * SITES, |k| {
            let (i, site) = (k / SITES, k % SITES);
            let mut sum = 0.0;
            for j in 0..n {
                for other in (0..SITES).filter(|&s| s != site) {
                    sum += self.molefracs[j] * xa[j * SITES + other] * self.delta[[i, j]];
                }
            }
            1.0 / (1.0 + self.density * sum)
        })
    }

    /// Iterate the Picard update starting from [SiteFractionSolver::initial_guess]
    /// until the L1 norm of the change falls below `tol`.
    ///
    /// The last iterate is returned if `max_iter` is exhausted.
    pub fn solve(&self, max_iter: usize, tol: f64) -> Converged<Array1<f64>> {
        let mut xa = self.initial_guess();
        let mut residual = f64::INFINITY;
        for k in 1..=max_iter {
            let xa_new = self.picard_step(&xa);
            residual = (&xa_new - &xa).mapv(f64::abs).sum();
            xa = xa_new;
            if residual < tol {
                return Converged::new(xa, k, true, residual);
            }
            if !residual.is_finite() {
                return Converged::new(xa, k, false, residual);
            }
        }
        Converged::new(xa, max_iter, false, residual)
    }

    /// Density derivative $\frac{\partial X}{\partial\rho}$ of converged site fractions.
    ///
    /// `ddelta` contains the density derivatives $\rho\frac{\partial\Delta_{ij}}{\partial\rho}$
    /// of the association strengths.
    pub fn density_derivative(
        &self,
        xa: &Array1<f64>,
        ddelta: &Array2<f64>,
    ) -> EosResult<Array1<f64>> {
        let n = self.components();
        let rho = self.density;
        let mut a = Array2::eye(n * SITES);
        let mut b = Array1::zeros(n * SITES);
        for i in 0..n {
            for site in 0..SITES {
                let k = i * SITES + site;
                let xa2 = xa[k] * xa[k];
                let mut sum = 0.0;
                for j in 0..n {
                    for other in (0..SITES).filter(|&s| s != site) {
                        let l = j * SITES + other;
                        a[[k, l]] += xa2 * rho * self.molefracs[j] * self.delta[[i, j]];
                        sum += self.molefracs[j] * xa[l] * (self.delta[[i, j]] + ddelta[[i, j]]);
                    }
                }
                b[k] = -xa2 * sum;
            }
        }
        Ok(LU::new(a)?.solve(&b))
    }
}

/// Association contribution.
pub struct Association {
    parameters: Arc<PcSaftParameters>,
    max_iter: usize,
    tol: f64,
}

impl Association {
    pub fn new(parameters: Arc<PcSaftParameters>, max_iter: usize, tol: f64) -> Self {
        Self {
            parameters,
            max_iter,
            tol,
        }
    }

    fn association_parameters(&self) -> Option<&AssociationParameters> {
        self.parameters.association.as_ref()
    }

    /// Association strength
    /// $\Delta_{ij}=g_{jj}\left(e^{\varepsilon_{ij}^{AB}/kT}-1\right)\sigma_{ij}^3\kappa_{ij}^{AB}$
    /// with the contact value of the pure component $j$.
    fn association_strength<D: DualNum<f64> + Copy>(
        a: &AssociationParameters,
        temperature: f64,
        diameter: &Array1<f64>,
        zeta2: D,
        zeta3: D,
    ) -> Array2<D> {
        Array2::from_shape_fn([a.len(); 2], |(i, j)| {
            let g = rdf_contact(contact_diameter(a, diameter, j), zeta2, zeta3);
            g * ((a.epsilon_k_ab_ij[[i, j]] / temperature).exp_m1()
                * a.sigma3_ij[[i, j]]
                * a.kappa_ab_ij[[i, j]])
        })
    }

    /// $\rho\frac{\partial\Delta_{ij}}{\partial\rho}$ at constant temperature and composition.
    fn association_strength_density_derivative(
        a: &AssociationParameters,
        temperature: f64,
        diameter: &Array1<f64>,
        zeta2: f64,
        zeta3: f64,
    ) -> Array2<f64> {
        Array2::from_shape_fn([a.len(); 2], |(i, j)| {
            let dg = rdf_contact_density_derivative(contact_diameter(a, diameter, j), zeta2, zeta3);
            dg * (a.epsilon_k_ab_ij[[i, j]] / temperature).exp_m1()
                * a.sigma3_ij[[i, j]]
                * a.kappa_ab_ij[[i, j]]
        })
    }

    fn solver(
        &self,
        a: &AssociationParameters,
        state: &StateHD<f64>,
        diameter: &Array1<f64>,
    ) -> SiteFractionSolver {
        let [_, _, zeta2, zeta3] = zeta(&self.parameters.m, diameter, state);
        let delta = Self::association_strength(a, state.temperature, diameter, zeta2, zeta3);
        let molefracs = a.assoc_comp.mapv(|i| state.molefracs[i]);
        SiteFractionSolver::new(delta, state.density, molefracs)
    }

    /// Converged site fractions of the associating components.
    pub fn site_fractions(&self, state: &StateHD<f64>) -> Converged<Array1<f64>> {
        let Some(a) = self.association_parameters() else {
            return Converged::new(Array1::zeros(0), 0, true, 0.0);
        };
        let d = self.parameters.hs_diameter(state.temperature);
        self.solver(a, state, &d).solve(self.max_iter, self.tol)
    }
}

/// Contact diameter $\frac{d_j}{2}$ of the associating component `j`.
fn contact_diameter(a: &AssociationParameters, diameter: &Array1<f64>, j: usize) -> f64 {
    0.5 * diameter[a.assoc_comp[j]]
}

/// Newton step on $g_{i\alpha}=\frac{1}{X_{i\alpha}}-1-\rho\sum_jx_j\sum_{\beta\neq\alpha}\Delta_{ij}X_{j\beta}$.
///
/// Starting from converged real site fractions, a single step with dual
/// numbers yields their exact first derivatives.
fn newton_step<D: DualNum<f64> + Copy>(
    xa: &Array1<D>,
    delta: &Array2<D>,
    density: D,
    molefracs: &Array1<D>,
) -> EosResult<Array1<D>> {
    let n = molefracs.len();
    let mut g = Array1::zeros(n * SITES);
    let mut h = Array2::zeros((n * SITES, n * SITES));
    for i in 0..n {
        for site in 0..SITES {
            let k = i * SITES + site;
            let mut sum = D::zero();
            for j in 0..n {
                for other in (0..SITES).filter(|&s| s != site) {
                    let l = j * SITES + other;
                    let d = density * molefracs[j] * delta[[i, j]];
                    sum += d * xa[l];
                    h[[k, l]] -= d;
                }
            }
            g[k] = xa[k].recip() - 1.0 - sum;
            h[[k, k]] -= xa[k].powi(2).recip();
        }
    }
    let dx = LU::new(h)?.solve(&g);
    Ok(Array1::from_shape_fn(n * SITES, |k| xa[k] - dx[k]))
}

impl<D: DualNum<f64> + Copy> HelmholtzEnergyDual<D> for Association {
    fn helmholtz_energy(&self, state: &StateHD<D>) -> D {
        let Some(a) = self.association_parameters() else {
            return D::zero();
        };
        let d = self.parameters.hs_diameter(state.temperature);
        let [_, _, zeta2, zeta3] = zeta(&self.parameters.m, &d, state);
        let delta = Self::association_strength(a, state.temperature, &d, zeta2, zeta3);

        // site fractions from the real part of the state
        let state_re = StateHD::new(
            state.temperature,
            state.density.re(),
            state.molefracs.mapv(|x| x.re()),
        );
        let xa = self
            .solver(a, &state_re, &d)
            .solve(self.max_iter, self.tol)
            .value;

        let x = a.assoc_comp.mapv(|i| state.molefracs[i]);
        let Ok(xa) = newton_step(&xa.mapv(D::from), &delta, state.density, &x) else {
            return D::from(f64::NAN);
        };
        let mut f = D::zero();
        for (i, &xi) in x.iter().enumerate() {
            for site in 0..SITES {
                let xk = xa[i * SITES + site];
                f += xi * (xk.ln() - xk * 0.5 + 0.5);
            }
        }
        f
    }
}

impl ResidualContribution for Association {
    fn compressibility(&self, state: &StateHD<f64>) -> f64 {
        let Some(a) = self.association_parameters() else {
            return 0.0;
        };
        let d = self.parameters.hs_diameter(state.temperature);
        let [_, _, zeta2, zeta3] = zeta(&self.parameters.m, &d, state);
        let solver = self.solver(a, state, &d);
        let xa = solver.solve(self.max_iter, self.tol).value;
        let ddelta =
            Self::association_strength_density_derivative(a, state.temperature, &d, zeta2, zeta3);
        let Ok(dxa) = solver.density_derivative(&xa, &ddelta) else {
            return f64::NAN;
        };
        let mut z = 0.0;
        for (i, x) in solver.molefracs.iter().enumerate() {
            for site in 0..SITES {
                let k = i * SITES + site;
                z += x * (1.0 / xa[k] - 0.5) * state.density * dxa[k];
            }
        }
        z
    }
}

impl fmt::Display for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Association")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcsaft::utils::{water_methanol_parameters, water_parameters};
    use approx::assert_relative_eq;
    use ndarray::arr1;

    #[test]
    fn helmholtz_energy() {
        let assoc = Association::new(water_parameters(), 500, 1e-12);
        let t = 350.0;
        let rho = 1.23 / 41.248289328513216;
        let s = StateHD::new(t, rho, arr1(&[1.0]));
        assert_relative_eq!(assoc.helmholtz_energy(&s), -4.229878997054543, epsilon = 1e-8);
    }

    fn solver(assoc: &Association, state: &StateHD<f64>) -> SiteFractionSolver {
        let p = assoc.parameters.clone();
        let d = p.hs_diameter(state.temperature);
        assoc.solver(p.association.as_ref().unwrap(), state, &d)
    }

    #[test]
    fn pure_site_fractions() {
        // for a pure 2B fluid X_A = X_B = (sqrt(1 + 4 rho Delta) - 1) / (2 rho Delta)
        let assoc = Association::new(water_parameters(), 500, 1e-9);
        let s = StateHD::new(400.0, 0.005, arr1(&[1.0]));
        let solver = solver(&assoc, &s);
        let xa = assoc.site_fractions(&s);
        assert!(xa.converged);
        let deltarho = solver.delta[[0, 0]] * s.density;
        let analytic = ((1.0 + 4.0 * deltarho).sqrt() - 1.0) / (2.0 * deltarho);
        for &x in xa.value.iter() {
            assert!(x > 0.0 && x <= 1.0);
            assert_relative_eq!(x, analytic, max_relative = 1e-7);
            assert_relative_eq!(x, 1.0 / (1.0 + deltarho * x), epsilon = 1e-9);
        }
    }

    #[test]
    fn picard_fixed_point() {
        let assoc = Association::new(water_methanol_parameters(), 500, 1e-9);
        let s = StateHD::new(320.0, 0.02, arr1(&[0.4, 0.6]));
        let solver = solver(&assoc, &s);
        let xa = solver.solve(500, 1e-9);
        assert!(xa.converged);
        assert_eq!(xa.value.len(), 4);
        let step = solver.picard_step(&xa.value);
        assert_relative_eq!(step, xa.value, epsilon = 1e-9);
    }

    #[test]
    fn iteration_budget() {
        let assoc = Association::new(water_parameters(), 2, 1e-9);
        let s = StateHD::new(300.0, 0.03, arr1(&[1.0]));
        let xa = assoc.site_fractions(&s);
        assert!(!xa.converged);
        assert_eq!(xa.iterations, 2);
        assert!(xa.strict("site fractions").is_err());
    }

    #[test]
    fn density_derivative() {
        // compare to central finite differences of the converged site fractions
        let p = water_methanol_parameters();
        let assoc = Association::new(p.clone(), 500, 1e-14);
        let t = 320.0;
        let x = arr1(&[0.4, 0.6]);
        let rho = 0.02;
        let a = p.association.as_ref().unwrap();
        let d = p.hs_diameter(t);
        let xa_at = |rho: f64| {
            let s = StateHD::new(t, rho, x.clone());
            solver(&assoc, &s).solve(500, 1e-14).value
        };
        let s = StateHD::new(t, rho, x.clone());
        let [_, _, zeta2, zeta3] = zeta(&p.m, &d, &s);
        let ddelta = Association::association_strength_density_derivative(a, t, &d, zeta2, zeta3);
        let solver = solver(&assoc, &s);
        let dxa = solver.density_derivative(&xa_at(rho), &ddelta).unwrap();
        let h = 1e-7;
        let fd = (xa_at(rho + h) - xa_at(rho - h)) / (2.0 * h);
        assert_relative_eq!(dxa, fd, max_relative = 1e-5);
    }

    #[test]
    fn cross_association_strength() {
        // the cross association strength uses the contact value of the second component
        let p = water_methanol_parameters();
        let assoc = Association::new(p.clone(), 500, 1e-9);
        let t = 320.0;
        let s = StateHD::from_molar_density(t, 30000.0, &arr1(&[0.5, 0.5]));
        let d = p.hs_diameter(t);
        let [_, _, zeta2, zeta3] = zeta(&p.m, &d, &s);
        let delta = solver(&assoc, &s).delta;
        let g0 = rdf_contact(0.5 * d[0], zeta2, zeta3);
        let g1 = rdf_contact(0.5 * d[1], zeta2, zeta3);
        assert_relative_eq!(delta[[0, 1]] / delta[[1, 0]], g1 / g0, max_relative = 1e-14);
    }

    #[test]
    fn mixture_compressibility() {
        let assoc = Association::new(water_methanol_parameters(), 500, 1e-12);
        let s = StateHD::from_molar_density(320.0, 30000.0, &arr1(&[0.5, 0.5]));
        assert_relative_eq!(assoc.compressibility(&s), -2.3317438093, max_relative = 1e-7);
    }

    #[test]
    fn no_bonds_at_zero_density() {
        let assoc = Association::new(water_parameters(), 500, 1e-9);
        let s = StateHD::new(300.0, 0.0, arr1(&[1.0]));
        assert_eq!(assoc.site_fractions(&s).value, arr1(&[1.0, 1.0]));
        assert_eq!(assoc.helmholtz_energy(&s), 0.0);
        assert_eq!(assoc.compressibility(&s), 0.0);
    }
}
