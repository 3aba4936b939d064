//! Dashboard aggregates over the case list.

use std::collections::BTreeMap;

use odonto_model::{Caso, CasoStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseStats {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    pub by_tipo: BTreeMap<String, usize>,
    pub recent: Vec<Caso>,
}

const RECENT_LIMIT: usize = 5;

impl CaseStats {
    pub fn from_cases(cases: &[Caso]) -> Self {
        let mut by_status: BTreeMap<&'static str, usize> =
            CasoStatus::ALL.iter().map(|s| (s.label(), 0)).collect();
        let mut by_tipo = BTreeMap::new();
        for caso in cases {
            *by_status.entry(caso.status.label()).or_default() += 1;
            *by_tipo.entry(caso.tipo.clone()).or_default() += 1;
        }

        let mut recent = cases.to_vec();
        recent.sort_by(|a, b| b.data.cmp(&a.data));
        recent.truncate(RECENT_LIMIT);

        Self {
            total: cases.len(),
            by_status,
            by_tipo,
            recent,
        }
    }

    pub fn count(&self, status: CasoStatus) -> usize {
        self.by_status.get(status.label()).copied().unwrap_or(0)
    }

    /// Share of `count` in the total, in percent
    pub fn share(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caso(id: &str, tipo: &str, status: &str, data: &str) -> Caso {
        serde_json::from_value(serde_json::json!({
            "_id": id, "titulo": id, "tipo": tipo, "data": data,
            "status": status, "localDoCaso": "Recife", "criadoPor": "u1",
        }))
        .unwrap()
    }

    #[test]
    fn test_counts_and_recent() {
        let cases: Vec<Caso> = (1..=7)
            .map(|i| {
                caso(
                    &format!("c{i}"),
                    if i % 2 == 0 { "Acidente" } else { "Exumação" },
                    if i <= 4 { "em andamento" } else { "finalizado" },
                    &format!("2024-01-0{i}"),
                )
            })
            .collect();
        let stats = CaseStats::from_cases(&cases);

        assert_eq!(stats.total, 7);
        assert_eq!(stats.count(CasoStatus::EmAndamento), 4);
        assert_eq!(stats.count(CasoStatus::Finalizado), 3);
        assert_eq!(stats.count(CasoStatus::Arquivado), 0);
        assert_eq!(stats.by_tipo["Exumação"], 4);
        assert_eq!(stats.recent.len(), 5);
        assert_eq!(stats.recent[0].id, "c7");
    }

    #[test]
    fn test_empty_stats() {
        let stats = CaseStats::from_cases(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.share(0), 0.0);
        assert!(stats.recent.is_empty());
    }
}
