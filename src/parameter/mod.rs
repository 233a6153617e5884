//! Construction of model parameters from pure component and binary records,
//! either in memory or read from JSON files.
use indexmap::IndexMap;
use itertools::Itertools;
use ndarray::Array2;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

mod record;

pub use record::{BinaryRecord, Identifier, IdentifierOption, PureRecord};

/// Constructor methods for model parameters.
///
/// Implementors only provide [Parameter::from_records]. The remaining
/// constructors, including reading records from JSON files, are derived
/// from it.
pub trait Parameter: Sized {
    type Pure: Clone + DeserializeOwned;
    type Binary: Clone + DeserializeOwned + Default;

    /// Creates parameters from pure component records and an optional
    /// symmetric matrix of binary records.
    fn from_records(
        pure_records: Vec<PureRecord<Self::Pure>>,
        binary_records: Option<Array2<Self::Binary>>,
    ) -> Result<Self, ParameterError>;

    /// Creates parameters for a single component.
    fn new_pure(pure_record: PureRecord<Self::Pure>) -> Result<Self, ParameterError> {
        Self::from_records(vec![pure_record], None)
    }

    /// Creates parameters for a binary mixture.
    fn new_binary(
        pure_records: Vec<PureRecord<Self::Pure>>,
        binary_record: Option<Self::Binary>,
    ) -> Result<Self, ParameterError> {
        let binary_records = binary_record.map(|br| {
            let mut matrix = Array2::from_elem((2, 2), Self::Binary::default());
            matrix[[0, 1]] = br.clone();
            matrix[[1, 0]] = br;
            matrix
        });
        Self::from_records(pure_records, binary_records)
    }

    /// Creates parameters for `substances` from records stored in JSON files.
    ///
    /// The pure component file contains a list of [PureRecord]s, the
    /// optional binary file a list of [BinaryRecord]s. Pairs without a
    /// binary record use the default interaction parameters.
    fn from_json<P: AsRef<Path>>(
        substances: Vec<&str>,
        file_pure: P,
        file_binary: Option<P>,
        identifier_option: IdentifierOption,
    ) -> Result<Self, ParameterError> {
        let pure_records = read_pure_records(&substances, file_pure, identifier_option)?;
        let binary_records = match file_binary {
            Some(file) => {
                let records: Vec<BinaryRecord<Self::Binary>> = read_json(file)?;
                Some(binary_matrix(&pure_records, &records, identifier_option)?)
            }
            None => None,
        };
        Self::from_records(pure_records, binary_records)
    }
}

/// Error type for missing or inconsistent parameters and IO problems.
#[derive(Error, Debug)]
pub enum ParameterError {
    #[error(transparent)]
    FileIO(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error("The following component(s) were not found: {0}")]
    ComponentsNotFound(String),
    #[error("No identifier available for {0}.")]
    IdentifierNotFound(String),
    #[error("Incompatible parameters: {0}")]
    IncompatibleParameters(String),
}

fn read_json<T: DeserializeOwned, P: AsRef<Path>>(file: P) -> Result<T, ParameterError> {
    Ok(serde_json::from_reader(BufReader::new(File::open(file)?))?)
}

/// Pure component records of `substances` in the requested order.
///
/// If a file lists a component more than once, the first record is used.
fn read_pure_records<M: DeserializeOwned, P: AsRef<Path>>(
    substances: &[&str],
    file: P,
    identifier_option: IdentifierOption,
) -> Result<Vec<PureRecord<M>>, ParameterError> {
    if let Some(duplicate) = substances.iter().duplicates().next() {
        return Err(ParameterError::IncompatibleParameters(format!(
            "component {duplicate} was requested more than once"
        )));
    }

    let file_records: Vec<PureRecord<M>> = read_json(file)?;
    let mut available: IndexMap<String, PureRecord<M>> = IndexMap::new();
    for record in file_records {
        if let Some(id) = record.identifier.get(identifier_option) {
            available.entry(id.to_string()).or_insert(record);
        }
    }

    let missing: Vec<_> = substances
        .iter()
        .filter(|&&s| !available.contains_key(s))
        .collect();
    if !missing.is_empty() {
        return Err(ParameterError::ComponentsNotFound(missing.iter().join(", ")));
    }
    Ok(substances
        .iter()
        .filter_map(|&s| available.swap_remove(s))
        .collect())
}

/// Symmetric matrix of binary records ordered like `pure_records`.
///
/// Records that refer to components not contained in `pure_records` are ignored.
fn binary_matrix<M, B: Clone + Default>(
    pure_records: &[PureRecord<M>],
    binary_records: &[BinaryRecord<B>],
    identifier_option: IdentifierOption,
) -> Result<Array2<B>, ParameterError> {
    let ids = pure_records
        .iter()
        .map(|r| r.identifier.require(identifier_option))
        .collect::<Result<Vec<_>, _>>()?;
    let index = |id: Option<&str>| id.and_then(|id| ids.iter().position(|&i| i == id));

    let n = ids.len();
    let mut matrix = Array2::from_elem((n, n), B::default());
    for br in binary_records {
        let i = index(br.id1.get(identifier_option));
        let j = index(br.id2.get(identifier_option));
        if let (Some(i), Some(j)) = (i, j) {
            matrix[[i, j]] = br.model_record.clone();
            matrix[[j, i]] = br.model_record.clone();
        }
    }
    Ok(matrix)
}
