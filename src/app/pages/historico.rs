//! Histórico page (admin only): read-only audit trail.

use chrono::NaiveDate;
use dioxus::prelude::*;
use odonto_model::HistoricoEntry;

use crate::app::components::{EmptyMessage, ErrorBanner, Loading, Pagination};
use crate::app::context::use_app;
use crate::collection::{date_in_range, parse_date_input, text_contains, CollectionView, FilterSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricoFilters {
    /// Matches user, case and details
    pub texto: String,
    pub acao: String,
    pub de: Option<NaiveDate>,
    pub ate: Option<NaiveDate>,
}

impl FilterSet<HistoricoEntry> for HistoricoFilters {
    fn matches(&self, entry: &HistoricoEntry) -> bool {
        (text_contains(entry.usuario_label(), &self.texto)
            || text_contains(entry.caso_label(), &self.texto)
            || text_contains(&entry.detalhes, &self.texto))
            && text_contains(&entry.acao, &self.acao)
            && date_in_range(entry.data, self.de, self.ate)
    }

    fn is_active(&self) -> bool {
        !self.texto.trim().is_empty()
            || !self.acao.trim().is_empty()
            || self.de.is_some()
            || self.ate.is_some()
    }
}

/// Newest first
fn sorted(mut entries: Vec<HistoricoEntry>) -> Vec<HistoricoEntry> {
    entries.sort_by(|a, b| b.data.cmp(&a.data));
    entries
}

/// Distinct actions for the filter dropdown
fn distinct_actions(entries: &[HistoricoEntry]) -> Vec<String> {
    let mut actions: Vec<String> = entries.iter().map(|e| e.acao.clone()).collect();
    actions.sort();
    actions.dedup();
    actions
}

#[component]
pub fn Historico() -> Element {
    let ctx = use_app();
    let mut view = use_signal({
        let page_size = ctx.page_size();
        move || CollectionView::new(HistoricoFilters::default(), page_size)
    });
    let mut actions = use_signal(Vec::<String>::new);
    let mut error = use_signal(|| None::<String>);

    let backend = ctx.backend.clone();
    let load = use_callback(move |_: ()| {
        let backend = backend.clone();
        spawn(async move {
            match backend.list_historico().await {
                Ok(entries) => {
                    actions.set(distinct_actions(&entries));
                    view.write().set_items(sorted(entries));
                    error.set(None);
                }
                Err(e) => error.set(Some(e.to_string())),
            }
        });
    });
    use_hook(move || load.call(()));

    let current = view.read();
    let items = current.page_items();
    let empty = current.empty_state();
    let page = current.page();
    let page_count = current.page_count();
    let loaded = current.is_loaded();
    let filters = current.filters().clone();
    drop(current);
    let de_value = filters.de.map(|d| d.to_string()).unwrap_or_default();
    let ate_value = filters.ate.map(|d| d.to_string()).unwrap_or_default();

    rsx! {
        div { class: "flex items-center justify-between mb-4",
            h1 { class: "text-2xl font-bold", "Histórico" }
            button { class: "outline", r#type: "button", onclick: move |_| load.call(()), "Atualizar" }
        }

        if let Some(msg) = error() {
            ErrorBanner { message: msg, on_retry: move |_| load.call(()) }
        }

        div { class: "grid grid-cols-1 md:grid-cols-4 gap-2",
            input {
                r#type: "search",
                placeholder: "Buscar por usuário, caso ou detalhes",
                value: "{filters.texto}",
                oninput: move |e| view.write().update_filters(|f| f.texto = e.value()),
            }
            select {
                value: "{filters.acao}",
                onchange: move |e| view.write().update_filters(|f| f.acao = e.value()),
                option { value: "", "Todas as ações" }
                for acao in actions() {
                    option { key: "{acao}", value: "{acao}", "{acao}" }
                }
            }
            input {
                r#type: "date",
                title: "De",
                value: "{de_value}",
                onchange: move |e| view.write().update_filters(|f| f.de = parse_date_input(&e.value())),
            }
            input {
                r#type: "date",
                title: "Até",
                value: "{ate_value}",
                onchange: move |e| view.write().update_filters(|f| f.ate = parse_date_input(&e.value())),
            }
        }

        if !loaded && error().is_none() {
            Loading {}
        } else if let Some(state) = empty {
            EmptyMessage { state, noun: "registros".to_string() }
        } else {
            table { class: "striped",
                thead {
                    tr {
                        th { "Data" }
                        th { "Ação" }
                        th { "Usuário" }
                        th { "Caso" }
                        th { "Detalhes" }
                    }
                }
                tbody {
                    for entry in items {
                        tr { key: "{entry.id}",
                            td { {entry.data.format("%d/%m/%Y %H:%M").to_string()} }
                            td { "{entry.acao}" }
                            td { "{entry.usuario_label()}" }
                            td { "{entry.caso_label()}" }
                            td { "{entry.detalhes}" }
                        }
                    }
                }
            }
            Pagination { page, page_count, on_change: move |p| view.write().go_to(p) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, data: &str, acao: &str, usuario: &str) -> HistoricoEntry {
        serde_json::from_value(serde_json::json!({
            "_id": id, "data": data, "acao": acao,
            "usuario": {"_id": "x", "name": usuario}, "detalhes": ""
        }))
        .unwrap()
    }

    #[test]
    fn test_history_filters_and_order() {
        let entries = vec![
            entry("h1", "2024-01-01T08:00:00Z", "Criou caso", "Ana"),
            entry("h2", "2024-03-01T08:00:00Z", "Excluiu vítima", "Bruno"),
            entry("h3", "2024-02-01T08:00:00Z", "Criou caso", "Bruno"),
        ];
        assert_eq!(distinct_actions(&entries), vec!["Criou caso", "Excluiu vítima"]);

        let mut view = CollectionView::new(HistoricoFilters::default(), 10);
        view.set_items(sorted(entries));
        assert_eq!(view.page_items()[0].id, "h2");

        view.update_filters(|f| f.acao = "Criou caso".to_string());
        view.update_filters(|f| f.texto = "bruno".to_string());
        assert_eq!(view.filtered_count(), 1);

        view.update_filters(|f| f.de = NaiveDate::from_ymd_opt(2024, 2, 2));
        assert_eq!(view.empty_state(), Some(crate::collection::EmptyState::NoMatches));
    }
}
