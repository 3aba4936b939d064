//! References to other records.
//!
//! The API returns foreign keys either as a bare id or, when the backend
//! populates the relation, as an embedded `{ _id, name }` object.

use serde::{Deserialize, Serialize};

/// Reference to another record, populated or not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Referencia {
    /// Bare object id
    Id(String),
    /// Populated relation carrying a display label
    Populado {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default, alias = "nome", alias = "titulo", skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl Referencia {
    /// Id of the referenced record, regardless of representation
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Populado { id, .. } => id,
        }
    }

    /// Human-readable label, falling back to the id
    pub fn label(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Populado { name: Some(name), .. } => name,
            Self::Populado { id, .. } => id,
        }
    }

    pub fn is(&self, id: &str) -> bool {
        self.id() == id
    }
}

impl From<&str> for Referencia {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl Default for Referencia {
    fn default() -> Self {
        Self::Id(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_and_populated_ids_compare_equal() {
        let bare: Referencia = serde_json::from_str("\"abc123\"").unwrap();
        let populated: Referencia =
            serde_json::from_str(r#"{"_id":"abc123","name":"Dra. Ana"}"#).unwrap();

        assert_eq!(bare.id(), "abc123");
        assert_eq!(populated.id(), "abc123");
        assert!(populated.is(bare.id()));
        assert_eq!(populated.label(), "Dra. Ana");
        assert_eq!(bare.label(), "abc123");
    }

    #[test]
    fn test_populated_accepts_nome_alias() {
        let r: Referencia = serde_json::from_str(r#"{"_id":"v1","nome":"Vítima 1"}"#).unwrap();
        assert_eq!(r.label(), "Vítima 1");
    }
}
