use super::ParameterError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field of the [Identifier] that is used to look up a component.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierOption {
    Cas,
    Name,
    Formula,
}

/// Names under which a component can be found in a parameter file.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Identifier {
    /// CAS registry number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cas: Option<String>,
    /// Common name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Chemical formula (or charge symbol for ions, e.g. "Na+")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl Identifier {
    /// Create a new identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pcsaft::parameter::{Identifier, IdentifierOption};
    /// let water = Identifier::new(Some("7732-18-5"), Some("water"), Some("H2O"));
    /// assert_eq!(water.get(IdentifierOption::Formula), Some("H2O"));
    /// ```
    pub fn new(cas: Option<&str>, name: Option<&str>, formula: Option<&str>) -> Self {
        Self {
            cas: cas.map(String::from),
            name: name.map(String::from),
            formula: formula.map(String::from),
        }
    }

    /// The identifier selected by `option`, if available.
    pub fn get(&self, option: IdentifierOption) -> Option<&str> {
        match option {
            IdentifierOption::Cas => self.cas.as_deref(),
            IdentifierOption::Name => self.name.as_deref(),
            IdentifierOption::Formula => self.formula.as_deref(),
        }
    }

    pub(super) fn require(&self, option: IdentifierOption) -> Result<&str, ParameterError> {
        self.get(option)
            .ok_or_else(|| ParameterError::IdentifierNotFound(format!("{option:?} of {self}")))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [("cas", &self.cas), ("name", &self.name), ("formula", &self.formula)];
        let ids: Vec<_> = fields
            .iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| format!("{key}={v}")))
            .collect();
        write!(f, "Identifier({})", ids.join(", "))
    }
}

/// Model parameters of a single component together with its identifier.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PureRecord<M> {
    pub identifier: Identifier,
    pub model_record: M,
}

impl<M> PureRecord<M> {
    pub fn new(identifier: Identifier, model_record: M) -> Self {
        Self {
            identifier,
            model_record,
        }
    }
}

impl<M: fmt::Display> fmt::Display for PureRecord<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PureRecord(\n\tidentifier={},\n\tmodel_record={},\n)",
            self.identifier, self.model_record
        )
    }
}

/// Interaction parameters of a pair of components.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BinaryRecord<B> {
    pub id1: Identifier,
    pub id2: Identifier,
    pub model_record: B,
}

impl<B> BinaryRecord<B> {
    pub fn new(id1: Identifier, id2: Identifier, model_record: B) -> Self {
        Self {
            id1,
            id2,
            model_record,
        }
    }
}

impl<B: fmt::Display> fmt::Display for BinaryRecord<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BinaryRecord(\n\tid1={},\n\tid2={},\n\tmodel_record={},\n)",
            self.id1, self.id2, self.model_record
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_lookup() {
        let id = Identifier::new(None, Some("chloride"), Some("Cl-"));
        assert_eq!(id.get(IdentifierOption::Name), Some("chloride"));
        assert_eq!(id.get(IdentifierOption::Cas), None);
        assert!(matches!(
            id.require(IdentifierOption::Cas),
            Err(ParameterError::IdentifierNotFound(_))
        ));
        assert_eq!(id.to_string(), "Identifier(name=chloride, formula=Cl-)");
    }

    #[test]
    fn deserialize_binary_record() {
        let json = r#"{
            "id1": {"name": "water"},
            "id2": {"cas": "67-56-1"},
            "model_record": {"k_ij": -0.025}
        }"#;
        #[derive(Deserialize)]
        struct KijRecord {
            k_ij: f64,
        }
        let record: BinaryRecord<KijRecord> =
            serde_json::from_str(json).expect("Unable to parse json.");
        assert_eq!(record.id2.cas.as_deref(), Some("67-56-1"));
        assert_eq!(record.model_record.k_ij, -0.025);
    }
}
