//! Dashboard page: case totals, recent cases and service health.

use dioxus::prelude::*;
use odonto_model::CasoStatus;

use crate::app::components::{ErrorBanner, Loading, StatusBadge};
use crate::app::context::use_app;
use crate::app::Route;
use crate::auth::visible_cases;
use crate::stats::CaseStats;

/// Flatten the ML analysis payload into label/value rows
pub fn analysis_rows(value: &serde_json::Value) -> Vec<(String, String)> {
    let Some(map) = value.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter(|(key, _)| key.as_str() != "error")
        .map(|(key, v)| {
            let shown = match v {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => if *b { "sim" } else { "não" }.to_string(),
                other => other.to_string(),
            };
            (key.replace('_', " "), shown)
        })
        .collect()
}

#[component]
pub fn Dashboard() -> Element {
    let ctx = use_app();
    let user = ctx.user();

    let backend = ctx.backend.clone();
    let mut cases = use_resource(move || {
        let backend = backend.clone();
        async move { backend.list_casos().await }
    });

    let backend = ctx.backend.clone();
    let ping = use_resource(move || {
        let backend = backend.clone();
        async move { backend.protegido().await.is_ok() }
    });

    let backend = ctx.backend.clone();
    let analysis = use_resource(move || {
        let backend = backend.clone();
        async move { backend.analyze().await.ok() }
    });

    let Some(user) = user else {
        return rsx! { Loading {} };
    };

    let content = match &*cases.read() {
        None => rsx! { Loading {} },
        Some(Err(e)) => rsx! {
            ErrorBanner { message: e.to_string(), on_retry: move |_| cases.restart() }
        },
        Some(Ok(all)) => {
            let stats = CaseStats::from_cases(&visible_cases(&user, all.clone()));
            rsx! {
                div { class: "grid grid-cols-2 md:grid-cols-4 gap-4",
                    article { class: "text-center",
                        small { "Total de casos" }
                        p { class: "text-3xl font-bold", "{stats.total}" }
                    }
                    for status in CasoStatus::ALL {
                        article { key: "{status.as_str()}", class: "text-center",
                            small { "{status.label()}" }
                            p { class: "text-3xl font-bold", "{stats.count(status)}" }
                            small { {format!("{:.0}%", stats.share(stats.count(status)) * 100.0)} }
                        }
                    }
                }
                div { class: "grid md:grid-cols-2 gap-4",
                    article {
                        header { strong { "Casos por tipo" } }
                        if stats.by_tipo.is_empty() {
                            small { "Sem dados." }
                        }
                        for (tipo, count) in stats.by_tipo.iter() {
                            div { key: "{tipo}", class: "mb-2",
                                div { class: "flex justify-between",
                                    small { "{tipo}" }
                                    small { "{count}" }
                                }
                                div { class: "bar", style: format!("width:{}%;", stats.share(*count) * 100.0) }
                            }
                        }
                    }
                    article {
                        header { strong { "Casos recentes" } }
                        if stats.recent.is_empty() {
                            small { "Nenhum caso cadastrado." }
                        }
                        ul {
                            for caso in stats.recent.iter() {
                                li { key: "{caso.id}",
                                    Link { to: Route::VerCaso { id: caso.id.clone() }, "{caso.titulo}" }
                                    " "
                                    small { {caso.data.format("%d/%m/%Y").to_string()} }
                                    " "
                                    StatusBadge { status: caso.status }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    let api_online = *ping.read();
    let rows = analysis
        .read()
        .as_ref()
        .and_then(|v| v.as_ref().map(analysis_rows))
        .unwrap_or_default();

    rsx! {
        div { class: "flex items-center justify-between mb-4",
            h1 { class: "text-2xl font-bold", "Olá, {user.name}" }
            small {
                match api_online {
                    None => rsx! { "Verificando API..." },
                    Some(true) => rsx! { span { class: "status-ok", "✓ API conectada" } },
                    Some(false) => rsx! { span { class: "status-err", "✗ API indisponível" } },
                }
            }
        }
        {content}
        if !rows.is_empty() {
            article {
                header { strong { "Análise do modelo" } }
                table {
                    tbody {
                        for (label, value) in rows {
                            tr { key: "{label}",
                                th { "{label}" }
                                td { "{value}" }
                            }
                        }
                    }
                }
            }
        }
    }
}
