//! Audit trail entries. Read-only on the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reference::Referencia;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoricoEntry {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(with = "crate::date")]
    pub data: DateTime<Utc>,
    pub acao: String,
    pub usuario: Option<Referencia>,
    #[serde(default)]
    pub caso: Option<Referencia>,
    #[serde(default)]
    pub detalhes: String,
}

impl HistoricoEntry {
    pub fn usuario_label(&self) -> &str {
        self.usuario.as_ref().map(Referencia::label).unwrap_or("Sistema")
    }

    pub fn caso_label(&self) -> &str {
        self.caso.as_ref().map(Referencia::label).unwrap_or("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_with_populated_refs() {
        let json = r#"{
            "_id": "h1", "data": "2024-06-01T10:00:00Z", "acao": "Criou caso",
            "usuario": {"_id": "u1", "name": "Ana"}, "caso": {"_id": "c1", "titulo": "Acidente"}
        }"#;
        let e: HistoricoEntry = serde_json::from_str(json).unwrap();
        assert_eq!(e.usuario_label(), "Ana");
        assert_eq!(e.caso_label(), "Acidente");
        assert!(e.detalhes.is_empty());
    }

    #[test]
    fn test_entry_without_user() {
        let e: HistoricoEntry =
            serde_json::from_str(r#"{"data": "2024-06-01", "acao": "Backup", "usuario": null}"#)
                .unwrap();
        assert_eq!(e.usuario_label(), "Sistema");
        assert_eq!(e.caso_label(), "-");
    }
}
