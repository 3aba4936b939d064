//! Case records and their lifecycle status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reference::Referencia;
use crate::validation::{required, ValidationError};

/// Case types offered by the creation form.
pub const TIPOS_CASO: [&str; 6] = [
    "Acidente",
    "Identificação de Vítima",
    "Exame Criminal",
    "Exumação",
    "Violência Doméstica",
    "Avaliação de Idade",
];

/// Case lifecycle status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CasoStatus {
    #[default]
    #[serde(rename = "em andamento")]
    EmAndamento,
    #[serde(rename = "finalizado")]
    Finalizado,
    #[serde(rename = "arquivado")]
    Arquivado,
}

impl CasoStatus {
    pub const ALL: [CasoStatus; 3] = [Self::EmAndamento, Self::Finalizado, Self::Arquivado];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmAndamento => "em andamento",
            Self::Finalizado => "finalizado",
            Self::Arquivado => "arquivado",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::EmAndamento => "Em andamento",
            Self::Finalizado => "Finalizado",
            Self::Arquivado => "Arquivado",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s)
    }
}

impl std::fmt::Display for CasoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geographic location of the case scene.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Localizacao {
    pub latitude: f64,
    pub longitude: f64,
}

/// A forensic investigation case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Caso {
    #[serde(rename = "_id")]
    pub id: String,
    pub titulo: String,
    pub tipo: String,
    #[serde(default)]
    pub descricao: String,
    #[serde(with = "crate::date")]
    pub data: DateTime<Utc>,
    #[serde(default)]
    pub status: CasoStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perito_responsavel: Option<Referencia>,
    #[serde(default)]
    pub local_do_caso: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localizacao: Option<Localizacao>,
    pub criado_por: Referencia,
}

impl Caso {
    pub fn is_finalizado(&self) -> bool {
        self.status == CasoStatus::Finalizado
    }

    /// Whether the session user with `user_id` created this case
    pub fn created_by(&self, user_id: &str) -> bool {
        self.criado_por.is(user_id)
    }

    /// Payload carrying this case's editable fields
    pub fn to_update(&self) -> NovoCaso {
        NovoCaso {
            titulo: self.titulo.clone(),
            tipo: self.tipo.clone(),
            descricao: self.descricao.clone(),
            data: self.data,
            status: self.status,
            perito_responsavel: self.perito_responsavel.as_ref().map(|r| r.id().to_string()),
            local_do_caso: self.local_do_caso.clone(),
            localizacao: self.localizacao,
        }
    }

    /// Apply an accepted update locally
    pub fn apply(&mut self, update: &NovoCaso) {
        self.titulo = update.titulo.clone();
        self.tipo = update.tipo.clone();
        self.descricao = update.descricao.clone();
        self.data = update.data;
        self.status = update.status;
        self.perito_responsavel = update.perito_responsavel.as_deref().map(Referencia::from);
        self.local_do_caso = update.local_do_caso.clone();
        self.localizacao = update.localizacao;
    }
}

/// Create / update payload for a case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NovoCaso {
    pub titulo: String,
    pub tipo: String,
    pub descricao: String,
    #[serde(with = "crate::date")]
    pub data: DateTime<Utc>,
    pub status: CasoStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perito_responsavel: Option<String>,
    pub local_do_caso: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localizacao: Option<Localizacao>,
}

impl NovoCaso {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required("titulo", &self.titulo)?;
        required("tipo", &self.tipo)?;
        required("localDoCaso", &self.local_do_caso)?;
        if let Some(loc) = self.localizacao {
            if !(-90.0..=90.0).contains(&loc.latitude) || !(-180.0..=180.0).contains(&loc.longitude)
            {
                return Err(ValidationError::Invalid {
                    field: "localizacao",
                    reason: "coordenadas fora do intervalo".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASO_JSON: &str = r#"{
        "_id": "c1",
        "titulo": "Acidente na BR-101",
        "tipo": "Acidente",
        "descricao": "Colisão",
        "data": "2024-05-01T00:00:00.000Z",
        "status": "em andamento",
        "peritoResponsavel": {"_id": "u2", "name": "Dr. Paulo"},
        "localDoCaso": "Recife",
        "criadoPor": "u2"
    }"#;

    #[test]
    fn test_caso_from_api_json() {
        let caso: Caso = serde_json::from_str(CASO_JSON).unwrap();
        assert_eq!(caso.status, CasoStatus::EmAndamento);
        assert!(caso.created_by("u2"));
        assert_eq!(caso.perito_responsavel.as_ref().unwrap().label(), "Dr. Paulo");
        assert!(caso.localizacao.is_none());
    }

    #[test]
    fn test_status_wire_values() {
        assert_eq!(
            serde_json::to_string(&CasoStatus::EmAndamento).unwrap(),
            "\"em andamento\""
        );
        assert_eq!(CasoStatus::parse("arquivado"), Some(CasoStatus::Arquivado));
        assert_eq!(CasoStatus::parse("aberto"), None);
    }

    #[test]
    fn test_update_round_trips_through_apply() {
        let mut caso: Caso = serde_json::from_str(CASO_JSON).unwrap();
        let mut update = caso.to_update();
        assert_eq!(update.perito_responsavel.as_deref(), Some("u2"));
        update.titulo = "Novo título".to_string();
        update.status = CasoStatus::Arquivado;
        caso.apply(&update);
        assert_eq!(caso.titulo, "Novo título");
        assert_eq!(caso.status, CasoStatus::Arquivado);
        assert!(caso.created_by("u2"));
    }

    #[test]
    fn test_validate_requires_title() {
        let caso: Caso = serde_json::from_str(CASO_JSON).unwrap();
        let mut update = caso.to_update();
        assert!(update.validate().is_ok());
        update.titulo = "  ".to_string();
        assert_eq!(update.validate(), Err(ValidationError::Required("titulo")));
        update.titulo = "ok".to_string();
        update.localizacao = Some(Localizacao { latitude: 120.0, longitude: 0.0 });
        assert!(matches!(
            update.validate(),
            Err(ValidationError::Invalid { field: "localizacao", .. })
        ));
    }
}
