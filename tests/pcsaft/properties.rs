use approx::assert_relative_eq;
use ndarray::*;
use pcsaft::parameter::{IdentifierOption, Parameter};
use pcsaft::pcsaft::{PcSaft, PcSaftParameters};
use pcsaft::{AVOGADRO, BOLTZMANN};
use std::error::Error;
use std::sync::Arc;

fn eos(substances: Vec<&str>) -> Result<PcSaft, Box<dyn Error>> {
    let params = PcSaftParameters::from_json(
        substances,
        "tests/pcsaft/test_parameters.json",
        Some("tests/pcsaft/binary_parameters.json"),
        IdentifierOption::Name,
    )?;
    Ok(PcSaft::new(Arc::new(params)))
}

#[test]
fn test_ideal_gas_limit() -> Result<(), Box<dyn Error>> {
    let saft = eos(vec!["propane", "butane"])?;
    let x = arr1(&[0.3, 0.7]);
    let t = 300.0;
    let rho = 1e-3;
    let p = saft.pressure(t, rho, &x);
    assert_relative_eq!(p, rho * AVOGADRO * BOLTZMANN * t, max_relative = 1e-6);
    let phi = saft.fugacity_coefficients(t, rho, &x);
    assert_relative_eq!(phi, arr1(&[1.0, 1.0]), epsilon = 1e-5);
    Ok(())
}

#[test]
fn test_contributions() -> Result<(), Box<dyn Error>> {
    let saft = eos(vec!["water", "acetone"])?;
    let x = arr1(&[0.4, 0.6]);
    let t = 320.0;
    let rho = 15000.0;
    let contributions = saft.compressibility_contributions(t, rho, &x);
    let names: Vec<_> = contributions.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec!["Ideal gas", "Hard Chain", "Dispersion", "Association", "Dipole"]
    );
    let z: f64 = contributions.iter().map(|(_, z)| z).sum();
    assert_relative_eq!(z, saft.compressibility(t, rho, &x), max_relative = 1e-12);
    Ok(())
}

#[test]
fn test_fugacity_coefficients_second_virial() -> Result<(), Box<dyn Error>> {
    // at low density ln(phi) = 2 B rho for a pure component and Z - 1 = B rho
    let saft = eos(vec!["methane"])?;
    let x = arr1(&[1.0]);
    let t = 300.0;
    let rho = 1.0;
    let b = (saft.compressibility(t, rho, &x) - 1.0) / rho;
    let ln_phi = saft.ln_phi(t, rho, &x)[0];
    assert_relative_eq!(ln_phi, 2.0 * b * rho, max_relative = 1e-3);
    // methane has a negative second virial coefficient at room temperature
    assert!(b < 0.0);
    Ok(())
}

#[test]
fn test_residual_chemical_potential_from_helmholtz_energy() -> Result<(), Box<dyn Error>> {
    // mu_i = d(n a_res)/dn_i at constant T and V
    let saft = eos(vec!["water", "methanol"])?;
    let t = 350.0;
    let v = 1e-4;
    let n = arr1(&[1.0, 2.0]);
    let mu = saft.residual_chemical_potential(t, n.sum() / v, &(&n / n.sum()));
    let h = 1e-6;
    for i in 0..2 {
        let mut n_p = n.clone();
        let mut n_m = n.clone();
        n_p[i] += h;
        n_m[i] -= h;
        let a = |n: &Array1<f64>| n.sum() * saft.residual_helmholtz_energy(t, n.sum() / v, &(n / n.sum()));
        let mu_fd = (a(&n_p) - a(&n_m)) / (2.0 * h);
        assert_relative_eq!(mu[i], mu_fd, max_relative = 1e-6);
    }
    Ok(())
}

#[test]
fn test_site_fractions() -> Result<(), Box<dyn Error>> {
    let saft = eos(vec!["water", "methanol"])?;
    let x = arr1(&[0.5, 0.5]);
    let xa = saft
        .site_fractions(400.0, 15000.0, &x)
        .expect("associating mixture")
        .strict("site fractions")?;
    assert_eq!(xa.len(), 4);
    assert!(xa.iter().all(|&xa| xa > 0.0 && xa < 1.0));
    // symmetric 2B sites
    assert_relative_eq!(xa[0], xa[1], max_relative = 1e-8);
    assert!(eos(vec!["propane"])?.site_fractions(300.0, 1000.0, &arr1(&[1.0])).is_none());
    Ok(())
}

#[test]
fn test_electrolyte_properties_are_finite() -> Result<(), Box<dyn Error>> {
    let saft = eos(vec!["water", "sodium", "chloride"])?;
    let x = arr1(&[0.96, 0.02, 0.02]);
    let t = 298.15;
    let rho = 53000.0;
    assert!(saft.compressibility(t, rho, &x).is_finite());
    let phi = saft.fugacity_coefficients(t, rho, &x);
    assert!(phi.iter().all(|phi| phi.is_finite()));
    // the ionic contribution lowers the chemical potential of the ions
    let contributions = saft.compressibility_contributions(t, rho, &x);
    let (name, z_ion) = &contributions[contributions.len() - 1];
    assert_eq!(name, "Ionic");
    assert!(*z_ion < 0.0);
    Ok(())
}

#[test]
fn test_max_density() -> Result<(), Box<dyn Error>> {
    let saft = eos(vec!["propane"])?;
    let x = arr1(&[1.0]);
    let rho_max = saft.max_density(&x);
    assert!(saft.compressibility(300.0, 0.9 * rho_max, &x).is_finite());
    Ok(())
}
