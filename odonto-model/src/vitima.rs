//! Victim records. Every victim belongs to exactly one case.

use serde::{Deserialize, Serialize};

use crate::reference::Referencia;
use crate::validation::{required, ValidationError};

pub const GENEROS: [&str; 3] = ["masculino", "feminino", "outro"];

pub const CORES_ETNIA: [&str; 5] = ["branca", "preta", "parda", "amarela", "indígena"];

/// A victim attached to a case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vitima {
    #[serde(rename = "_id")]
    pub id: String,
    /// Número de identificação cadavérica
    pub nic: String,
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub idade: Option<u32>,
    #[serde(default)]
    pub genero: String,
    #[serde(default)]
    pub cor_etnia: String,
    #[serde(default)]
    pub documento: String,
    #[serde(default)]
    pub endereco: String,
    pub caso: Referencia,
}

impl Vitima {
    /// Name for display, unidentified victims fall back to their NIC
    pub fn display_name(&self) -> String {
        if self.nome.trim().is_empty() {
            format!("Não identificada ({})", self.nic)
        } else {
            self.nome.clone()
        }
    }
}

/// Create payload for a victim.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NovaVitima {
    pub nic: String,
    pub nome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idade: Option<u32>,
    pub genero: String,
    pub cor_etnia: String,
    pub documento: String,
    pub endereco: String,
    pub caso: String,
}

impl NovaVitima {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required("nic", &self.nic)?;
        required("caso", &self.caso)?;
        if let Some(idade) = self.idade {
            if idade > 130 {
                return Err(ValidationError::Invalid {
                    field: "idade",
                    reason: format!("{idade} anos"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vitima_with_missing_optional_fields() {
        let v: Vitima =
            serde_json::from_str(r#"{"_id":"v1","nic":"NIC-7","caso":{"_id":"c1","titulo":"X"}}"#)
                .unwrap();
        assert_eq!(v.caso.id(), "c1");
        assert_eq!(v.idade, None);
        assert_eq!(v.display_name(), "Não identificada (NIC-7)");
    }

    #[test]
    fn test_nova_vitima_validation() {
        let mut nova = NovaVitima {
            nic: "NIC-1".to_string(),
            caso: "c1".to_string(),
            ..Default::default()
        };
        assert!(nova.validate().is_ok());
        nova.idade = Some(200);
        assert!(nova.validate().is_err());
        nova.idade = None;
        nova.nic.clear();
        assert_eq!(nova.validate(), Err(ValidationError::Required("nic")));
    }
}
