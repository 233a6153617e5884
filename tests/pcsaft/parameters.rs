use pcsaft::parameter::{IdentifierOption, Parameter, ParameterError};
use pcsaft::pcsaft::PcSaftParameters;
use std::error::Error;

#[test]
fn test_from_json() -> Result<(), Box<dyn Error>> {
    let params = PcSaftParameters::from_json(
        vec!["water", "methanol"],
        "tests/pcsaft/test_parameters.json",
        Some("tests/pcsaft/binary_parameters.json"),
        IdentifierOption::Name,
    )?;
    assert_eq!(params.components(), 2);
    assert_eq!(params.k_ij[[0, 1]], -0.025);
    assert_eq!(params.k_ij[[1, 0]], -0.025);
    assert_eq!(params.association.as_ref().map(|a| a.len()), Some(2));
    assert!(params.dipole.is_none());
    assert!(params.ionic.is_none());
    Ok(())
}

#[test]
fn test_from_json_by_cas() -> Result<(), Box<dyn Error>> {
    let params = PcSaftParameters::from_json(
        vec!["74-98-6", "106-97-8"],
        "tests/pcsaft/test_parameters.json",
        None,
        IdentifierOption::Cas,
    )?;
    assert_eq!(params.m[0], 2.001829);
    assert_eq!(params.m[1], 2.331586);
    Ok(())
}

#[test]
fn test_electrolyte_from_json() -> Result<(), Box<dyn Error>> {
    let params = PcSaftParameters::from_json(
        vec!["water", "sodium", "chloride"],
        "tests/pcsaft/test_parameters.json",
        None,
        IdentifierOption::Name,
    )?;
    assert!(!params.is_ion(0));
    assert!(params.is_ion(1));
    assert!(params.is_ion(2));
    // like ions do not interact through dispersion
    assert_eq!(params.epsilon_k_ij[[1, 1]], 0.0);
    assert!(params.epsilon_k_ij[[1, 2]] > 0.0);
    Ok(())
}

#[test]
fn test_missing_component() {
    let params = PcSaftParameters::from_json(
        vec!["propane", "unobtainium"],
        "tests/pcsaft/test_parameters.json",
        None,
        IdentifierOption::Name,
    );
    assert!(matches!(params, Err(ParameterError::ComponentsNotFound(_))));
}
