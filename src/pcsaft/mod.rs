//! Perturbed-Chain Statistical Associating Fluid Theory (PC-SAFT)
//!
//! [Gross et al. (2001)](https://doi.org/10.1021/ie0003887)
//!
//! Polar contributions follow [Gross and Vrabec (2006)](https://doi.org/10.1002/aic.10683),
//! electrolytes are described by a Debye-Hückel term as in ePC-SAFT
//! [Cameretti et al. (2005)](https://doi.org/10.1021/ie0488142).
mod eos;
mod parameters;

pub use eos::association::SiteFractionSolver;
pub use eos::{HelmholtzEnergyDual, PcSaft, PcSaftOptions, ResidualContribution};
pub use parameters::{
    AssociationParameters, DipoleParameters, IonicParameters, PcSaftBinaryRecord,
    PcSaftParameters, PcSaftRecord, DIELECTRIC_CONSTANT_WATER,
};

#[cfg(test)]
pub(crate) use parameters::utils;
