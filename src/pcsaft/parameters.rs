use crate::parameter::{Identifier, Parameter, ParameterError, PureRecord};
use ndarray::{Array, Array1, Array2, Array3};
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_6;

/// Conversion of the squared dipole moment from Debye^2/(K Angstrom^3)
/// to the reduced form used in the dipolar perturbation terms.
const DEBYE2_TO_REDUCED: f64 = 7242.702976750923;

/// Relative permittivity of water at 298.15 K, used if no other
/// dielectric constant is specified for an electrolyte system.
pub const DIELECTRIC_CONSTANT_WATER: f64 = 78.36;

/// PC-SAFT pure-component parameters.
#[derive(Serialize, Deserialize, Clone, Default, Debug)]
pub struct PcSaftRecord {
    /// Segment number
    pub m: f64,
    /// Segment diameter in units of Angstrom
    pub sigma: f64,
    /// Energetic parameter in units of Kelvin
    pub epsilon_k: f64,
    /// Dipole moment in units of Debye
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub mu: Option<f64>,
    /// Number of dipolar functional groups
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub dip_num: Option<f64>,
    /// Association volume parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub kappa_ab: Option<f64>,
    /// Association energy parameter in units of Kelvin
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub epsilon_k_ab: Option<f64>,
    /// Charge number
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub z: Option<f64>,
}

impl PcSaftRecord {
    pub fn new(
        m: f64,
        sigma: f64,
        epsilon_k: f64,
        mu: Option<f64>,
        dip_num: Option<f64>,
        kappa_ab: Option<f64>,
        epsilon_k_ab: Option<f64>,
        z: Option<f64>,
    ) -> PcSaftRecord {
        PcSaftRecord {
            m,
            sigma,
            epsilon_k,
            mu,
            dip_num,
            kappa_ab,
            epsilon_k_ab,
            z,
        }
    }
}

impl std::fmt::Display for PcSaftRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PcSaftRecord(m={}", self.m)?;
        write!(f, ", sigma={}", self.sigma)?;
        write!(f, ", epsilon_k={}", self.epsilon_k)?;
        if let Some(n) = &self.mu {
            write!(f, ", mu={}", n)?;
        }
        if let Some(n) = &self.dip_num {
            write!(f, ", dip_num={}", n)?;
        }
        if let Some(n) = &self.kappa_ab {
            write!(f, ", kappa_ab={}", n)?;
        }
        if let Some(n) = &self.epsilon_k_ab {
            write!(f, ", epsilon_k_ab={}", n)?;
        }
        if let Some(n) = &self.z {
            write!(f, ", z={}", n)?;
        }
        write!(f, ")")
    }
}

/// PC-SAFT binary interaction parameters.
#[derive(Serialize, Deserialize, Clone, Copy, Default, Debug)]
pub struct PcSaftBinaryRecord {
    /// Binary dispersion interaction parameter
    #[serde(skip_serializing_if = "f64::is_zero")]
    #[serde(default)]
    pub k_ij: f64,
}

impl From<f64> for PcSaftBinaryRecord {
    fn from(k_ij: f64) -> Self {
        Self { k_ij }
    }
}

impl From<PcSaftBinaryRecord> for f64 {
    fn from(binary_record: PcSaftBinaryRecord) -> Self {
        binary_record.k_ij
    }
}

impl std::fmt::Display for PcSaftBinaryRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PcSaftBinaryRecord(k_ij={})", self.k_ij)
    }
}

/// Parameters of the associating components (2B scheme).
///
/// All pair matrices are indexed by the position of the component in
/// `assoc_comp`, not by the component index.
pub struct AssociationParameters {
    /// Indices of the components with non-zero association energy
    pub assoc_comp: Array1<usize>,
    /// Cross association energies in units of Kelvin
    pub epsilon_k_ab_ij: Array2<f64>,
    /// Cross association volumes including the size correction
    pub kappa_ab_ij: Array2<f64>,
    /// Cubed segment diameters of the associating pairs
    pub sigma3_ij: Array2<f64>,
}

impl AssociationParameters {
    fn new(sigma: &Array1<f64>, kappa_ab: &Array1<f64>, epsilon_k_ab: &Array1<f64>) -> Option<Self> {
        let assoc_comp: Array1<usize> = epsilon_k_ab
            .iter()
            .enumerate()
            .filter_map(|(i, &e)| (e != 0.0).then_some(i))
            .collect();
        let n = assoc_comp.len();
        if n == 0 {
            return None;
        }

        let mut epsilon_k_ab_ij = Array2::zeros((n, n));
        let mut kappa_ab_ij = Array2::zeros((n, n));
        let mut sigma3_ij = Array2::zeros((n, n));
        for (a, &i) in assoc_comp.iter().enumerate() {
            for (b, &j) in assoc_comp.iter().enumerate() {
                let sigma_ij = 0.5 * (sigma[i] + sigma[j]);
                epsilon_k_ab_ij[[a, b]] = 0.5 * (epsilon_k_ab[i] + epsilon_k_ab[j]);
                kappa_ab_ij[[a, b]] =
                    (kappa_ab[i] * kappa_ab[j]).sqrt() * ((sigma[i] * sigma[j]).sqrt() / sigma_ij).powi(3);
                sigma3_ij[[a, b]] = sigma_ij.powi(3);
            }
        }
        Some(Self {
            assoc_comp,
            epsilon_k_ab_ij,
            kappa_ab_ij,
            sigma3_ij,
        })
    }

    /// Number of associating components.
    pub fn len(&self) -> usize {
        self.assoc_comp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assoc_comp.is_empty()
    }
}

/// Parameters of the dipolar components.
///
/// Pair and triplet quantities are indexed by the position of the
/// component in `dipole_comp`.
pub struct DipoleParameters {
    /// Indices of the components with non-zero dipole moment
    pub dipole_comp: Array1<usize>,
    /// Reduced squared dipole moments times the number of dipolar groups
    pub mu2: Array1<f64>,
    /// Dispersion energies used in the dipole integrals in units of Kelvin
    pub epsilon_k_ij: Array2<f64>,
    pub mij1: Array2<f64>,
    pub mij2: Array2<f64>,
    pub mijk1: Array3<f64>,
    pub mijk2: Array3<f64>,
}

impl DipoleParameters {
    fn new(
        m: &Array1<f64>,
        sigma: &Array1<f64>,
        epsilon_k: &Array1<f64>,
        mu: &Array1<f64>,
        dip_num: &Array1<f64>,
    ) -> Option<Self> {
        let dipole_comp: Array1<usize> = mu
            .iter()
            .enumerate()
            .filter_map(|(i, &mu)| (mu != 0.0).then_some(i))
            .collect();
        let n = dipole_comp.len();
        if n == 0 {
            return None;
        }

        let mu2 = dipole_comp.mapv(|i| {
            mu[i].powi(2) / (m[i] * epsilon_k[i] * sigma[i].powi(3)) * DEBYE2_TO_REDUCED * dip_num[i]
        });
        let mut epsilon_k_ij = Array2::zeros((n, n));
        let mut mij1 = Array2::zeros((n, n));
        let mut mij2 = Array2::zeros((n, n));
        let mut mijk1 = Array3::zeros((n, n, n));
        let mut mijk2 = Array3::zeros((n, n, n));
        for (a, &i) in dipole_comp.iter().enumerate() {
            for (b, &j) in dipole_comp.iter().enumerate() {
                epsilon_k_ij[[a, b]] = (epsilon_k[i] * epsilon_k[j]).sqrt();
                let mij = (m[i] * m[j]).sqrt().min(2.0);
                mij1[[a, b]] = (mij - 1.0) / mij;
                mij2[[a, b]] = mij1[[a, b]] * (mij - 2.0) / mij;
                for (c, &k) in dipole_comp.iter().enumerate() {
                    let mijk = (m[i] * m[j] * m[k]).cbrt().min(2.0);
                    mijk1[[a, b, c]] = (mijk - 1.0) / mijk;
                    mijk2[[a, b, c]] = mijk1[[a, b, c]] * (mijk - 2.0) / mijk;
                }
            }
        }
        Some(Self {
            dipole_comp,
            mu2,
            epsilon_k_ij,
            mij1,
            mij2,
            mijk1,
            mijk2,
        })
    }

    /// Number of dipolar components.
    pub fn len(&self) -> usize {
        self.dipole_comp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dipole_comp.is_empty()
    }
}

/// Parameters of the charged components.
pub struct IonicParameters {
    /// Charge numbers of all components (0 for neutral components)
    pub z: Array1<f64>,
    /// Relative permittivity of the medium
    pub dielc: f64,
}

impl IonicParameters {
    fn new(z: &Array1<f64>, dielc: f64) -> Option<Self> {
        z.iter().any(|&z| z != 0.0).then(|| Self {
            z: z.clone(),
            dielc,
        })
    }

    /// Whether component `i` carries a charge.
    pub fn is_charged(&self, i: usize) -> bool {
        self.z[i] != 0.0
    }
}

/// Parameter set required for the PC-SAFT equation of state.
///
/// The optional physics (association, dipoles, ions) is stored as [Option]
/// and is `None` if no component carries the respective parameters.
pub struct PcSaftParameters {
    pub m: Array1<f64>,
    pub sigma: Array1<f64>,
    pub epsilon_k: Array1<f64>,
    pub k_ij: Array2<f64>,
    pub sigma_ij: Array2<f64>,
    pub epsilon_k_ij: Array2<f64>,
    pub association: Option<AssociationParameters>,
    pub dipole: Option<DipoleParameters>,
    pub ionic: Option<IonicParameters>,
    pub pure_records: Vec<PureRecord<PcSaftRecord>>,
    pub binary_records: Option<Array2<PcSaftBinaryRecord>>,
}

impl Parameter for PcSaftParameters {
    type Pure = PcSaftRecord;
    type Binary = PcSaftBinaryRecord;

    fn from_records(
        pure_records: Vec<PureRecord<Self::Pure>>,
        binary_records: Option<Array2<Self::Binary>>,
    ) -> Result<Self, ParameterError> {
        Self::from_records_with_dielectric_constant(
            pure_records,
            binary_records,
            DIELECTRIC_CONSTANT_WATER,
        )
    }
}

impl PcSaftParameters {
    /// Creates parameters from records and the relative permittivity of the medium.
    pub fn from_records_with_dielectric_constant(
        pure_records: Vec<PureRecord<PcSaftRecord>>,
        binary_records: Option<Array2<PcSaftBinaryRecord>>,
        dielc: f64,
    ) -> Result<Self, ParameterError> {
        let n = pure_records.len();
        if let Some(br) = binary_records.as_ref() {
            if br.shape() != [n, n] {
                return Err(ParameterError::IncompatibleParameters(format!(
                    "expected {n}x{n} binary records, got {:?}",
                    br.shape()
                )));
            }
        }

        let mut m = Array::zeros(n);
        let mut sigma = Array::zeros(n);
        let mut epsilon_k = Array::zeros(n);
        let mut mu = Array::zeros(n);
        let mut dip_num = Array::zeros(n);
        let mut kappa_ab = Array::zeros(n);
        let mut epsilon_k_ab = Array::zeros(n);
        let mut z = Array::zeros(n);

        for (i, record) in pure_records.iter().enumerate() {
            let r = &record.model_record;
            m[i] = r.m;
            sigma[i] = r.sigma;
            epsilon_k[i] = r.epsilon_k;
            mu[i] = r.mu.unwrap_or(0.0);
            dip_num[i] = r.dip_num.unwrap_or(1.0);
            kappa_ab[i] = r.kappa_ab.unwrap_or(0.0);
            epsilon_k_ab[i] = r.epsilon_k_ab.unwrap_or(0.0);
            z[i] = r.z.unwrap_or(0.0);
        }

        let k_ij = binary_records
            .as_ref()
            .map(|br| br.map(|br| br.k_ij))
            .unwrap_or_else(|| Array2::zeros((n, n)));
        let mut sigma_ij = Array::zeros((n, n));
        let mut epsilon_k_ij = Array::zeros((n, n));
        for i in 0..n {
            for j in 0..n {
                sigma_ij[[i, j]] = 0.5 * (sigma[i] + sigma[j]);
                // no dispersive attraction between ions of equal sign
                if z[i] * z[j] <= 0.0 {
                    epsilon_k_ij[[i, j]] = (epsilon_k[i] * epsilon_k[j]).sqrt() * (1.0 - k_ij[[i, j]]);
                }
            }
        }

        let association = AssociationParameters::new(&sigma, &kappa_ab, &epsilon_k_ab);
        let dipole = DipoleParameters::new(&m, &sigma, &epsilon_k, &mu, &dip_num);
        let ionic = IonicParameters::new(&z, dielc);

        Ok(Self {
            m,
            sigma,
            epsilon_k,
            k_ij,
            sigma_ij,
            epsilon_k_ij,
            association,
            dipole,
            ionic,
            pure_records,
            binary_records,
        })
    }

    /// Creates parameters for non-polar, non-associating, neutral components
    /// from the segment number, segment diameter and dispersion energy.
    pub fn new(
        m: &Array1<f64>,
        sigma: &Array1<f64>,
        epsilon_k: &Array1<f64>,
    ) -> Result<Self, ParameterError> {
        let n = m.len();
        check_len("sigma", sigma, n)?;
        check_len("epsilon_k", epsilon_k, n)?;
        let pure_records = (0..n)
            .map(|i| {
                PureRecord::new(
                    Identifier::default(),
                    PcSaftRecord::new(m[i], sigma[i], epsilon_k[i], None, None, None, None, None),
                )
            })
            .collect();
        Self::from_records(pure_records, None)
    }

    /// Replace the binary interaction parameters.
    pub fn with_k_ij(self, k_ij: &Array2<f64>) -> Result<Self, ParameterError> {
        let n = self.m.len();
        if k_ij.shape() != [n, n] {
            return Err(ParameterError::IncompatibleParameters(format!(
                "expected {n}x{n} values for k_ij, got {:?}",
                k_ij.shape()
            )));
        }
        let dielc = self.dielectric_constant();
        let binary_records = k_ij.mapv(PcSaftBinaryRecord::from);
        Self::from_records_with_dielectric_constant(self.pure_records, Some(binary_records), dielc)
    }

    /// Add association energies (in K) and association volumes.
    ///
    /// Components with `e_assoc = 0` do not associate.
    pub fn with_association(
        self,
        e_assoc: &Array1<f64>,
        vol_a: &Array1<f64>,
    ) -> Result<Self, ParameterError> {
        let n = self.m.len();
        check_len("e_assoc", e_assoc, n)?;
        check_len("vol_a", vol_a, n)?;
        self.update_records(|i, r| {
            r.epsilon_k_ab = Some(e_assoc[i]);
            r.kappa_ab = Some(vol_a[i]);
        })
    }

    /// Add dipole moments (in Debye) and the number of dipolar groups.
    pub fn with_dipoles(
        self,
        dipm: &Array1<f64>,
        dip_num: &Array1<f64>,
    ) -> Result<Self, ParameterError> {
        let n = self.m.len();
        check_len("dipm", dipm, n)?;
        check_len("dip_num", dip_num, n)?;
        self.update_records(|i, r| {
            r.mu = Some(dipm[i]);
            r.dip_num = Some(dip_num[i]);
        })
    }

    /// Add charge numbers and the relative permittivity of the medium.
    pub fn with_ions(self, z: &Array1<f64>, dielc: f64) -> Result<Self, ParameterError> {
        let n = self.m.len();
        check_len("z", z, n)?;
        let mut pure_records = self.pure_records;
        for (r, &z) in pure_records.iter_mut().zip(z) {
            r.model_record.z = Some(z);
        }
        Self::from_records_with_dielectric_constant(pure_records, self.binary_records, dielc)
    }

    /// Replace the relative permittivity of the medium.
    pub fn with_dielectric_constant(self, dielc: f64) -> Result<Self, ParameterError> {
        Self::from_records_with_dielectric_constant(self.pure_records, self.binary_records, dielc)
    }

    fn update_records<F: Fn(usize, &mut PcSaftRecord)>(self, f: F) -> Result<Self, ParameterError> {
        let dielc = self.dielectric_constant();
        let mut pure_records = self.pure_records;
        for (i, r) in pure_records.iter_mut().enumerate() {
            f(i, &mut r.model_record);
        }
        Self::from_records_with_dielectric_constant(pure_records, self.binary_records, dielc)
    }

    fn dielectric_constant(&self) -> f64 {
        self.ionic
            .as_ref()
            .map_or(DIELECTRIC_CONSTANT_WATER, |ionic| ionic.dielc)
    }

    /// Number of components.
    pub fn components(&self) -> usize {
        self.m.len()
    }

    /// Whether component `i` is a non-volatile ion.
    pub fn is_ion(&self, i: usize) -> bool {
        self.ionic.as_ref().is_some_and(|ionic| ionic.is_charged(i))
    }

    /// The temperature dependent hard-sphere diameters in Angstrom.
    ///
    /// Ion diameters do not depend on temperature.
    pub fn hs_diameter(&self, temperature: f64) -> Array1<f64> {
        Array::from_shape_fn(self.m.len(), |i| {
            if self.is_ion(i) {
                self.sigma[i] * (1.0 - 0.12)
            } else {
                self.sigma[i] * (1.0 - 0.12 * (-3.0 * self.epsilon_k[i] / temperature).exp())
            }
        })
    }

    /// Segment weighted moments $\sum_i x_i m_i d_i^k$ for $k=0\ldots 3$.
    pub fn moments(&self, temperature: f64, molefracs: &Array1<f64>) -> [f64; 4] {
        let d = self.hs_diameter(temperature);
        let mut moments = [0.0; 4];
        for (k, mk) in moments.iter_mut().enumerate() {
            *mk = (0..d.len())
                .map(|i| molefracs[i] * self.m[i] * d[i].powi(k as i32))
                .sum();
        }
        moments
    }

    /// Molar density (mol/m^3) that corresponds to a given packing fraction.
    pub fn density_from_packing_fraction(
        &self,
        temperature: f64,
        molefracs: &Array1<f64>,
        eta: f64,
    ) -> f64 {
        let m3 = self.moments(temperature, molefracs)[3];
        eta / (FRAC_PI_6 * m3) / crate::state::MOLAR_TO_NUMBER_DENSITY
    }
}

fn check_len(name: &str, array: &Array1<f64>, n: usize) -> Result<(), ParameterError> {
    if array.len() != n {
        return Err(ParameterError::IncompatibleParameters(format!(
            "expected {n} values for {name}, got {}",
            array.len()
        )));
    }
    Ok(())
}

impl std::fmt::Display for PcSaftParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PcSaftParameters(")?;
        write!(f, "\n\tm={}", self.m)?;
        write!(f, "\n\tsigma={}", self.sigma)?;
        write!(f, "\n\tepsilon_k={}", self.epsilon_k)?;
        if !self.k_ij.iter().all(|k| k.is_zero()) {
            write!(f, "\n\tk_ij=\n{}", self.k_ij)?;
        }
        if let Some(a) = &self.association {
            write!(f, "\n\tassociating components={}", a.assoc_comp)?;
        }
        if let Some(d) = &self.dipole {
            write!(f, "\n\tdipolar components={}", d.dipole_comp)?;
        }
        if let Some(i) = &self.ionic {
            write!(f, "\n\tz={}", i.z)?;
            write!(f, "\n\tdielc={}", i.dielc)?;
        }
        write!(f, "\n)")
    }
}
