use approx::assert_relative_eq;
use ndarray::*;
use pcsaft::parameter::{IdentifierOption, Parameter};
use pcsaft::pcsaft::{PcSaft, PcSaftParameters};
use pcsaft::{EosError, Phase, SolverOptions, Verbosity};
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
fn test_liquid_and_vapor_roots() -> Result<(), Box<dyn Error>> {
    let saft = eos(vec!["butane"])?;
    let x = arr1(&[1.0]);
    let t = 250.0;
    let p = 2e4;
    let options = SolverOptions::default();
    let liquid = saft.density(t, p, &x, Phase::Liquid, options)?.strict("liquid")?;
    let vapor = saft.density(t, p, &x, Phase::Vapor, options)?.strict("vapor")?;
    assert!(liquid.density > 100.0 * vapor.density);
    assert_relative_eq!(liquid.pressure, p, max_relative = 1e-3);
    assert_relative_eq!(vapor.pressure, p, max_relative = 1e-3);
    Ok(())
}

#[test]
fn test_associating_mixture() -> Result<(), Box<dyn Error>> {
    let saft = eos(vec!["water", "methanol"])?;
    let x = arr1(&[0.5, 0.5]);
    let t = 320.0;
    let p = 1e5;
    let res = saft.density(t, p, &x, Phase::Liquid, SolverOptions::default())?;
    assert!(res.converged);
    assert_relative_eq!(saft.pressure(t, res.value.density, &x), p, max_relative = 1e-3);
    Ok(())
}

#[test]
fn test_iteration_output() -> Result<(), Box<dyn Error>> {
    let saft = eos(vec!["propane"])?;
    let options = SolverOptions::new().verbosity(Verbosity::Iter);
    let res = saft.density(300.0, 1e5, &arr1(&[1.0]), Phase::Vapor, options)?;
    assert!(res.converged);
    assert!(res.iterations > 1);
    assert!(res.residual < 1e-8);
    Ok(())
}

#[test]
fn test_strict_mode() -> Result<(), Box<dyn Error>> {
    let saft = eos(vec!["propane"])?;
    let options = SolverOptions::new().max_iter(3);
    let res = saft.density(250.0, 1e6, &arr1(&[1.0]), Phase::Liquid, options)?;
    // the last iterate is still available
    assert!(!res.converged);
    assert!(res.value.density.is_finite());
    assert!(matches!(res.strict("density"), Err(EosError::NotConverged(_))));
    Ok(())
}

#[test]
fn test_widened_vapor_bound() -> Result<(), Box<dyn Error>> {
    let saft = eos(vec!["methane"])?;
    let x = arr1(&[1.0]);
    let res = saft.density(300.0, 1e7, &x, Phase::Vapor, SolverOptions::default())?;
    assert!(res.value.widened_bounds);
    assert_relative_eq!(res.value.pressure, 1e7, max_relative = 1e-3);
    Ok(())
}
