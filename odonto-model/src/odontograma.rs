//! Dental charts (odontogramas) in FDI two-digit notation.
//!
//! The tooth set of a chart is fixed by its type: 32 permanent teeth for
//! `adulto`, 20 deciduous teeth for `infantil`. Arches are stored in the
//! order they are drawn, viewer's right quadrant first.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ADULTO_SUPERIOR: [[u8; 8]; 2] = [
    [18, 17, 16, 15, 14, 13, 12, 11],
    [21, 22, 23, 24, 25, 26, 27, 28],
];
const ADULTO_INFERIOR: [[u8; 8]; 2] = [
    [48, 47, 46, 45, 44, 43, 42, 41],
    [31, 32, 33, 34, 35, 36, 37, 38],
];
const INFANTIL_SUPERIOR: [[u8; 5]; 2] = [[55, 54, 53, 52, 51], [61, 62, 63, 64, 65]];
const INFANTIL_INFERIOR: [[u8; 5]; 2] = [[85, 84, 83, 82, 81], [71, 72, 73, 74, 75]];

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TipoOdontograma {
    #[default]
    Adulto,
    Infantil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arcada {
    Superior,
    Inferior,
}

impl TipoOdontograma {
    pub const ALL: [TipoOdontograma; 2] = [Self::Adulto, Self::Infantil];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adulto => "adulto",
            Self::Infantil => "infantil",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Adulto => "Adulto (permanente)",
            Self::Infantil => "Infantil (decídua)",
        }
    }

    /// Tooth numbers of one arch as `(right quadrant, left quadrant)`
    pub fn quadrants(&self, arcada: Arcada) -> (&'static [u8], &'static [u8]) {
        match (self, arcada) {
            (Self::Adulto, Arcada::Superior) => (&ADULTO_SUPERIOR[0], &ADULTO_SUPERIOR[1]),
            (Self::Adulto, Arcada::Inferior) => (&ADULTO_INFERIOR[0], &ADULTO_INFERIOR[1]),
            (Self::Infantil, Arcada::Superior) => (&INFANTIL_SUPERIOR[0], &INFANTIL_SUPERIOR[1]),
            (Self::Infantil, Arcada::Inferior) => (&INFANTIL_INFERIOR[0], &INFANTIL_INFERIOR[1]),
        }
    }

    /// Tooth numbers of one arch in drawing order
    pub fn arch_numbers(&self, arcada: Arcada) -> Vec<u8> {
        let (right, left) = self.quadrants(arcada);
        right.iter().chain(left.iter()).copied().collect()
    }

    pub fn tooth_count(&self) -> usize {
        match self {
            Self::Adulto => 32,
            Self::Infantil => 20,
        }
    }

    /// Every canonical tooth number of this chart type
    pub fn canonical_numbers(&self) -> Vec<u8> {
        let mut all = self.arch_numbers(Arcada::Superior);
        all.extend(self.arch_numbers(Arcada::Inferior));
        all
    }
}

/// Tooth surfaces
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Face {
    #[serde(rename = "M")]
    Mesial,
    #[serde(rename = "D")]
    Distal,
    #[serde(rename = "V")]
    Vestibular,
    #[serde(rename = "L")]
    Lingual,
    #[serde(rename = "O")]
    Oclusal,
}

impl Face {
    pub const ALL: [Face; 5] = [
        Self::Mesial,
        Self::Distal,
        Self::Vestibular,
        Self::Lingual,
        Self::Oclusal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Mesial => "Mesial",
            Self::Distal => "Distal",
            Self::Vestibular => "Vestibular",
            Self::Lingual => "Lingual/Palatina",
            Self::Oclusal => "Oclusal/Incisal",
        }
    }
}

/// Clinical finding recorded on a tooth
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TipoCondicao {
    Higido,
    Carie,
    Restauracao,
    Ausente,
    ExtracaoIndicada,
    Coroa,
    Implante,
    TratamentoCanal,
    Fratura,
    Protese,
}

impl TipoCondicao {
    pub const ALL: [TipoCondicao; 10] = [
        Self::Higido,
        Self::Carie,
        Self::Restauracao,
        Self::Ausente,
        Self::ExtracaoIndicada,
        Self::Coroa,
        Self::Implante,
        Self::TratamentoCanal,
        Self::Fratura,
        Self::Protese,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Higido => "Hígido",
            Self::Carie => "Cárie",
            Self::Restauracao => "Restauração",
            Self::Ausente => "Ausente",
            Self::ExtracaoIndicada => "Extração indicada",
            Self::Coroa => "Coroa",
            Self::Implante => "Implante",
            Self::TratamentoCanal => "Tratamento de canal",
            Self::Fratura => "Fratura",
            Self::Protese => "Prótese",
        }
    }

    /// Fill color used when this is a tooth's dominant condition
    pub fn color(&self) -> &'static str {
        match self {
            Self::Higido => "#4caf50",
            Self::Carie => "#f44336",
            Self::Restauracao => "#2196f3",
            Self::Ausente => "#9e9e9e",
            Self::ExtracaoIndicada => "#ff9800",
            Self::Coroa => "#ffc107",
            Self::Implante => "#607d8b",
            Self::TratamentoCanal => "#9c27b0",
            Self::Fratura => "#795548",
            Self::Protese => "#00bcd4",
        }
    }

    /// Wire value, also used as the form option value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Higido => "higido",
            Self::Carie => "carie",
            Self::Restauracao => "restauracao",
            Self::Ausente => "ausente",
            Self::ExtracaoIndicada => "extracao_indicada",
            Self::Coroa => "coroa",
            Self::Implante => "implante",
            Self::TratamentoCanal => "tratamento_canal",
            Self::Fratura => "fratura",
            Self::Protese => "protese",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condicao {
    pub tipo: TipoCondicao,
    #[serde(default)]
    pub faces: Vec<Face>,
    #[serde(default)]
    pub descricao: String,
    #[serde(default, with = "crate::date::option", skip_serializing_if = "Option::is_none")]
    pub data_registro: Option<DateTime<Utc>>,
}

/// How a tooth is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToothFill {
    /// Dominant (first) condition color
    Condition(&'static str),
    /// Present, nothing recorded
    Neutral,
    /// Marked absent, nothing recorded
    Absent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dente {
    pub numero: u8,
    #[serde(default = "default_presente")]
    pub presente: bool,
    #[serde(default)]
    pub condicoes: Vec<Condicao>,
    #[serde(default)]
    pub observacoes: String,
}

fn default_presente() -> bool {
    true
}

impl Dente {
    pub fn new(numero: u8) -> Self {
        Self {
            numero,
            presente: true,
            condicoes: Vec::new(),
            observacoes: String::new(),
        }
    }

    pub fn fill(&self) -> ToothFill {
        match self.condicoes.first() {
            Some(c) => ToothFill::Condition(c.tipo.color()),
            None if self.presente => ToothFill::Neutral,
            None => ToothFill::Absent,
        }
    }

    /// Absent, or carrying conditions or notes
    pub fn has_data(&self) -> bool {
        !self.presente || !self.condicoes.is_empty() || !self.observacoes.trim().is_empty()
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OdontogramaError {
    #[error("dente {0} repetido")]
    Duplicate(u8),
    #[error("dente {numero} não pertence a um odontograma {tipo:?}")]
    Foreign { numero: u8, tipo: TipoOdontograma },
    #[error("dente {0} está na arcada errada")]
    WrongArch(u8),
    #[error("dente {0} ausente do odontograma")]
    Missing(u8),
    #[error("dente {0} não encontrado")]
    UnknownTooth(u8),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Odontograma {
    pub tipo_odontograma: TipoOdontograma,
    #[serde(default)]
    pub arcada_superior: Vec<Dente>,
    #[serde(default)]
    pub arcada_inferior: Vec<Dente>,
    #[serde(default)]
    pub observacoes_gerais: String,
}

/// Fresh chart of the given type: every tooth present, nothing recorded.
pub fn reset_odontogram(tipo: TipoOdontograma) -> Odontograma {
    let arch = |arcada| {
        tipo.arch_numbers(arcada)
            .into_iter()
            .map(Dente::new)
            .collect::<Vec<_>>()
    };
    Odontograma {
        tipo_odontograma: tipo,
        arcada_superior: arch(Arcada::Superior),
        arcada_inferior: arch(Arcada::Inferior),
        observacoes_gerais: String::new(),
    }
}

impl Odontograma {
    pub fn arcada(&self, arcada: Arcada) -> &[Dente] {
        match arcada {
            Arcada::Superior => &self.arcada_superior,
            Arcada::Inferior => &self.arcada_inferior,
        }
    }

    pub fn dentes(&self) -> impl Iterator<Item = &Dente> {
        self.arcada_superior.iter().chain(self.arcada_inferior.iter())
    }

    pub fn dente(&self, numero: u8) -> Option<&Dente> {
        self.dentes().find(|d| d.numero == numero)
    }

    pub fn dente_mut(&mut self, numero: u8) -> Option<&mut Dente> {
        self.arcada_superior
            .iter_mut()
            .chain(self.arcada_inferior.iter_mut())
            .find(|d| d.numero == numero)
    }

    /// Record a condition on one tooth
    pub fn add_condicao(&mut self, numero: u8, condicao: Condicao) -> Result<(), OdontogramaError> {
        let dente = self
            .dente_mut(numero)
            .ok_or(OdontogramaError::UnknownTooth(numero))?;
        if condicao.tipo == TipoCondicao::Ausente {
            dente.presente = false;
        }
        dente.condicoes.push(condicao);
        Ok(())
    }

    /// Whether anything would be lost by reinitializing the chart
    pub fn has_recorded_data(&self) -> bool {
        !self.observacoes_gerais.trim().is_empty() || self.dentes().any(Dente::has_data)
    }

    /// Number of teeth with anything recorded
    pub fn recorded_teeth(&self) -> usize {
        self.dentes().filter(|d| d.has_data()).count()
    }

    /// Check the tooth set matches the canonical set for the chart type.
    pub fn validate(&self) -> Result<(), OdontogramaError> {
        let tipo = self.tipo_odontograma;
        let mut seen = HashSet::new();
        for arcada in [Arcada::Superior, Arcada::Inferior] {
            let expected = tipo.arch_numbers(arcada);
            for dente in self.arcada(arcada) {
                if !seen.insert(dente.numero) {
                    return Err(OdontogramaError::Duplicate(dente.numero));
                }
                if !expected.contains(&dente.numero) {
                    return Err(if tipo.canonical_numbers().contains(&dente.numero) {
                        OdontogramaError::WrongArch(dente.numero)
                    } else {
                        OdontogramaError::Foreign {
                            numero: dente.numero,
                            tipo,
                        }
                    });
                }
            }
        }
        match tipo.canonical_numbers().into_iter().find(|n| !seen.contains(n)) {
            Some(missing) => Err(OdontogramaError::Missing(missing)),
            None => Ok(()),
        }
    }
}

/// Outcome of asking to switch a chart's type
#[derive(Debug, Clone, PartialEq)]
pub enum TypeChange {
    /// Same type, nothing to do
    Unchanged,
    /// No recorded data, the reinitialized chart can replace the current one
    Applied(Odontograma),
    /// Recorded data would be discarded; the user must confirm first
    NeedsConfirmation,
}

pub fn request_type_change(current: &Odontograma, novo: TipoOdontograma) -> TypeChange {
    if current.tipo_odontograma == novo {
        TypeChange::Unchanged
    } else if current.has_recorded_data() {
        TypeChange::NeedsConfirmation
    } else {
        TypeChange::Applied(reset_odontogram(novo))
    }
}

/// Replacement chart once the user confirmed a destructive type switch.
pub fn confirm_type_change(novo: TipoOdontograma) -> Odontograma {
    reset_odontogram(novo)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carie() -> Condicao {
        Condicao {
            tipo: TipoCondicao::Carie,
            faces: vec![Face::Oclusal],
            descricao: String::new(),
            data_registro: None,
        }
    }

    #[test]
    fn test_adult_chart_has_32_canonical_teeth() {
        let chart = reset_odontogram(TipoOdontograma::Adulto);
        let numbers: HashSet<u8> = chart.dentes().map(|d| d.numero).collect();
        assert_eq!(chart.dentes().count(), 32);
        assert_eq!(numbers.len(), 32);
        for quadrant in 1..=4u8 {
            for pos in 1..=8u8 {
                assert!(numbers.contains(&(quadrant * 10 + pos)));
            }
        }
        assert!(chart.validate().is_ok());
    }

    #[test]
    fn test_child_chart_has_20_canonical_teeth() {
        let chart = reset_odontogram(TipoOdontograma::Infantil);
        let numbers: HashSet<u8> = chart.dentes().map(|d| d.numero).collect();
        assert_eq!(numbers.len(), 20);
        for quadrant in 5..=8u8 {
            for pos in 1..=5u8 {
                assert!(numbers.contains(&(quadrant * 10 + pos)));
            }
        }
        assert!(chart.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicates_and_foreign_codes() {
        let mut chart = reset_odontogram(TipoOdontograma::Infantil);
        chart.arcada_superior[0].numero = 51;
        assert_eq!(chart.validate(), Err(OdontogramaError::Duplicate(51)));

        let mut chart = reset_odontogram(TipoOdontograma::Infantil);
        chart.arcada_inferior[0].numero = 18;
        assert!(matches!(
            chart.validate(),
            Err(OdontogramaError::Foreign { numero: 18, .. })
        ));

        let mut chart = reset_odontogram(TipoOdontograma::Adulto);
        chart.arcada_inferior.pop();
        assert_eq!(chart.validate(), Err(OdontogramaError::Missing(38)));
    }

    #[test]
    fn test_fill_uses_first_condition() {
        let mut dente = Dente::new(11);
        assert_eq!(dente.fill(), ToothFill::Neutral);
        dente.presente = false;
        assert_eq!(dente.fill(), ToothFill::Absent);
        dente.condicoes.push(carie());
        dente.condicoes.push(Condicao {
            tipo: TipoCondicao::Coroa,
            ..carie()
        });
        assert_eq!(dente.fill(), ToothFill::Condition(TipoCondicao::Carie.color()));
    }

    #[test]
    fn test_type_switch_without_data_applies_immediately() {
        let chart = reset_odontogram(TipoOdontograma::Adulto);
        assert_eq!(
            request_type_change(&chart, TipoOdontograma::Adulto),
            TypeChange::Unchanged
        );
        match request_type_change(&chart, TipoOdontograma::Infantil) {
            TypeChange::Applied(novo) => assert_eq!(novo.dentes().count(), 20),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_type_switch_with_data_needs_confirmation() {
        let mut chart = reset_odontogram(TipoOdontograma::Adulto);
        chart.add_condicao(36, carie()).unwrap();
        let before = chart.clone();

        assert_eq!(
            request_type_change(&chart, TipoOdontograma::Infantil),
            TypeChange::NeedsConfirmation
        );
        // declining leaves the chart untouched
        assert_eq!(chart, before);

        let replaced = confirm_type_change(TipoOdontograma::Infantil);
        assert_eq!(replaced.tipo_odontograma, TipoOdontograma::Infantil);
        assert!(replaced.dentes().all(|d| d.condicoes.is_empty() && d.presente));
        assert!(replaced.validate().is_ok());
    }

    #[test]
    fn test_recorded_teeth_counts_only_teeth_with_data() {
        let mut chart = reset_odontogram(TipoOdontograma::Adulto);
        assert_eq!(chart.recorded_teeth(), 0);
        chart.add_condicao(36, carie()).unwrap();
        chart.add_condicao(36, carie()).unwrap();
        chart.dente_mut(11).unwrap().observacoes = "mobilidade".to_string();
        chart.dente_mut(48).unwrap().presente = false;
        chart.observacoes_gerais = "geral".to_string();
        assert_eq!(chart.recorded_teeth(), 3);
    }

    #[test]
    fn test_add_condicao_unknown_tooth() {
        let mut chart = reset_odontogram(TipoOdontograma::Infantil);
        assert_eq!(
            chart.add_condicao(18, carie()),
            Err(OdontogramaError::UnknownTooth(18))
        );
        chart
            .add_condicao(
                55,
                Condicao {
                    tipo: TipoCondicao::Ausente,
                    ..carie()
                },
            )
            .unwrap();
        assert!(!chart.dente(55).unwrap().presente);
        assert!(chart.has_recorded_data());
    }

    #[test]
    fn test_chart_from_api_json() {
        let json = r#"{
            "tipoOdontograma": "infantil",
            "arcadaSuperior": [{"numero": 55, "condicoes": [{"tipo": "carie", "faces": ["M", "O"]}]}],
            "arcadaInferior": []
        }"#;
        let chart: Odontograma = serde_json::from_str(json).unwrap();
        let dente = chart.dente(55).unwrap();
        assert!(dente.presente);
        assert_eq!(dente.condicoes[0].faces, vec![Face::Mesial, Face::Oclusal]);
        assert!(chart.validate().is_err());
    }
}
