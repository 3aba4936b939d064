//! Technical reports (laudos odontológicos).
//!
//! A laudo is immutable once created. It owns a copy of the victim's
//! odontogram taken at creation time, so later chart edits never reach it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::odontograma::Odontograma;
use crate::reference::Referencia;
use crate::validation::{required, ValidationError};

/// A stored report. Fields are read-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Laudo {
    #[serde(rename = "_id")]
    id: String,
    caso: Referencia,
    vitima: Referencia,
    parecer: String,
    #[serde(default)]
    observacoes: String,
    odontograma_snapshot: Odontograma,
    #[serde(default, with = "crate::date::option", skip_serializing_if = "Option::is_none")]
    criado_em: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    perito_responsavel: Option<Referencia>,
}

impl Laudo {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn caso(&self) -> &Referencia {
        &self.caso
    }

    pub fn vitima(&self) -> &Referencia {
        &self.vitima
    }

    pub fn parecer(&self) -> &str {
        &self.parecer
    }

    pub fn observacoes(&self) -> &str {
        &self.observacoes
    }

    pub fn odontograma_snapshot(&self) -> &Odontograma {
        &self.odontograma_snapshot
    }

    pub fn criado_em(&self) -> Option<DateTime<Utc>> {
        self.criado_em
    }

    pub fn perito_responsavel(&self) -> Option<&Referencia> {
        self.perito_responsavel.as_ref()
    }
}

/// Create payload. Building it copies the chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NovoLaudo {
    caso: String,
    vitima: String,
    parecer: String,
    observacoes: String,
    odontograma_snapshot: Odontograma,
}

impl NovoLaudo {
    pub fn new(
        caso_id: &str,
        vitima_id: &str,
        odontograma: &Odontograma,
        parecer: &str,
        observacoes: &str,
    ) -> Result<Self, ValidationError> {
        Self::check_fields(caso_id, vitima_id, parecer)?;
        Ok(Self {
            caso: caso_id.to_string(),
            vitima: vitima_id.to_string(),
            parecer: parecer.trim().to_string(),
            observacoes: observacoes.trim().to_string(),
            odontograma_snapshot: odontograma.clone(),
        })
    }

    /// Required-field checks that need no chart, run before fetching one
    pub fn check_fields(caso_id: &str, vitima_id: &str, parecer: &str) -> Result<(), ValidationError> {
        required("caso", caso_id)?;
        required("vitima", vitima_id)?;
        required("parecer", parecer)
    }

    pub fn odontograma_snapshot(&self) -> &Odontograma {
        &self.odontograma_snapshot
    }

    /// The stored report as acknowledged by the API
    pub fn into_laudo(self, id: String, criado_em: Option<DateTime<Utc>>) -> Laudo {
        Laudo {
            id,
            caso: Referencia::Id(self.caso),
            vitima: Referencia::Id(self.vitima),
            parecer: self.parecer,
            observacoes: self.observacoes,
            odontograma_snapshot: self.odontograma_snapshot,
            criado_em,
            perito_responsavel: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odontograma::{reset_odontogram, Condicao, TipoCondicao, TipoOdontograma};

    fn restauracao() -> Condicao {
        Condicao {
            tipo: TipoCondicao::Restauracao,
            faces: Vec::new(),
            descricao: "amálgama".to_string(),
            data_registro: None,
        }
    }

    #[test]
    fn test_snapshot_is_isolated_from_live_chart() {
        let mut live = reset_odontogram(TipoOdontograma::Adulto);
        live.add_condicao(16, restauracao()).unwrap();

        let laudo = NovoLaudo::new("c1", "v1", &live, "Compatível", "")
            .unwrap()
            .into_laudo("l1".to_string(), None);
        let frozen = laudo.odontograma_snapshot().clone();

        live.add_condicao(26, restauracao()).unwrap();
        live.observacoes_gerais = "revisado".to_string();
        live.dente_mut(16).unwrap().condicoes.clear();

        assert_eq!(laudo.odontograma_snapshot(), &frozen);
        assert_eq!(laudo.odontograma_snapshot().dente(16).unwrap().condicoes.len(), 1);
        assert!(laudo.odontograma_snapshot().dente(26).unwrap().condicoes.is_empty());
    }

    #[test]
    fn test_parecer_is_required() {
        let chart = reset_odontogram(TipoOdontograma::Infantil);
        assert_eq!(
            NovoLaudo::new("c1", "v1", &chart, "   ", "obs"),
            Err(ValidationError::Required("parecer"))
        );
    }

    #[test]
    fn test_field_checks_without_chart() {
        assert_eq!(
            NovoLaudo::check_fields("c1", "", "Parecer"),
            Err(ValidationError::Required("vitima"))
        );
        assert_eq!(
            NovoLaudo::check_fields("c1", "v1", ""),
            Err(ValidationError::Required("parecer"))
        );
        assert!(NovoLaudo::check_fields("c1", "v1", "Parecer").is_ok());
    }

    #[test]
    fn test_payload_wire_format() {
        let chart = reset_odontogram(TipoOdontograma::Infantil);
        let nl = NovoLaudo::new("c1", "v1", &chart, "Parecer", " nada ").unwrap();
        let json = serde_json::to_value(&nl).unwrap();
        assert_eq!(json["observacoes"], "nada");
        assert_eq!(json["odontogramaSnapshot"]["tipoOdontograma"], "infantil");
    }
}
