use approx::assert_relative_eq;
use ndarray::*;
use pcsaft::parameter::{IdentifierOption, Parameter};
use pcsaft::pcsaft::{PcSaft, PcSaftParameters};
use pcsaft::{SolverOptions, RESIDUAL_SENTINEL};
use std::error::Error;
use std::sync::Arc;

fn propane_butane() -> Result<PcSaft, Box<dyn Error>> {
    let params = PcSaftParameters::from_json(
        vec!["propane", "butane"],
        "tests/pcsaft/test_parameters.json",
        None,
        IdentifierOption::Name,
    )?;
    Ok(PcSaft::new(Arc::new(params)))
}

/// Minimize the bubble point objective with a golden section search.
fn minimize<F: Fn(f64) -> f64>(f: F, mut a: f64, mut b: f64) -> f64 {
    let g = 0.5 * (5f64.sqrt() - 1.0);
    let mut c = b - g * (b - a);
    let mut d = a + g * (b - a);
    while (b - a).abs() > 1e-6 * a {
        if f(c) < f(d) {
            b = d;
        } else {
            a = c;
        }
        c = b - g * (b - a);
        d = a + g * (b - a);
    }
    0.5 * (a + b)
}

#[test]
fn test_bubble_point_minimization() -> Result<(), Box<dyn Error>> {
    let saft = propane_butane()?;
    let t = 280.0;
    let x = arr1(&[0.5, 0.5]);
    let y = arr1(&[0.5, 0.5]);
    let p = minimize(|p| saft.bubble_point_residual(t, p, &x, &y), 1e5, 1e6);
    let bp = saft
        .bubble_point(t, p, &x, &y, SolverOptions::default())?
        .strict("bubble point")?;
    assert!(bp.residual < 1e-8);
    // propane enriches in the vapor phase
    assert!(bp.vapor_molefracs[0] > x[0]);
    assert_relative_eq!(bp.vapor_molefracs.sum(), 1.0, max_relative = 1e-12);

    // the dew point of the vapor is the same pressure
    let dp = saft.dew_point(t, p, &bp.vapor_molefracs, &x, SolverOptions::default())?;
    assert_relative_eq!(dp.value.liquid_molefracs, x, epsilon = 1e-4);
    Ok(())
}

#[test]
fn test_ptz_residual_is_finite() -> Result<(), Box<dyn Error>> {
    let saft = propane_butane()?;
    let z = arr1(&[0.5, 0.5]);
    let r = saft.ptz_residual(280.0, 3e5, &z, 0.7, 1.0, 5e-3, &z);
    assert!(r.is_finite());
    assert!(r <= RESIDUAL_SENTINEL);
    Ok(())
}
