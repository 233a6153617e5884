use ndarray::Array1;
use num_dual::DualNum;

/// Avogadro constant in 1/mol
pub const AVOGADRO: f64 = 6.02214076e23;
/// Boltzmann constant in J/K
pub const BOLTZMANN: f64 = 1.380649e-23;
/// Elementary charge in C
pub const ELEMENTARY_CHARGE: f64 = 1.602176634e-19;
/// Vacuum permittivity in C^2/(J m)
pub const VACUUM_PERMITTIVITY: f64 = 8.8541878128e-12;

/// Conversion from molar density (mol/m^3) to number density (1/Angstrom^3).
pub(crate) const MOLAR_TO_NUMBER_DENSITY: f64 = AVOGADRO * 1e-30;

/// Thermodynamic state in reduced units that can be evaluated with
/// generalized dual numbers.
///
/// The temperature is kept real. The number density and the mole fractions
/// carry the dual parts, so that derivatives with respect to density or
/// composition can be obtained by seeding the respective quantity.
#[derive(Clone, Debug)]
pub struct StateHD<D> {
    /// temperature in Kelvin
    pub temperature: f64,
    /// total number density in Angstrom^-3
    pub density: D,
    /// mole fractions
    pub molefracs: Array1<D>,
    /// partial number densities in Angstrom^-3
    pub partial_density: Array1<D>,
}

impl<D: DualNum<f64> + Copy> StateHD<D> {
    /// Create a new `StateHD` for given temperature, number density and mole fractions.
    pub fn new(temperature: f64, density: D, molefracs: Array1<D>) -> Self {
        let partial_density = molefracs.mapv(|x| x * density);
        Self {
            temperature,
            density,
            molefracs,
            partial_density,
        }
    }
}

impl StateHD<f64> {
    /// Create a new `StateHD` from a molar density in mol/m^3.
    pub fn from_molar_density(temperature: f64, molar_density: f64, molefracs: &Array1<f64>) -> Self {
        Self::new(
            temperature,
            molar_density * MOLAR_TO_NUMBER_DENSITY,
            molefracs.clone(),
        )
    }

    /// Molar density in mol/m^3.
    pub fn molar_density(&self) -> f64 {
        self.density / MOLAR_TO_NUMBER_DENSITY
    }
}
