//! Banco de casos: read-only search across every case.

use dioxus::prelude::*;
use odonto_model::Caso;

use super::casos::{CasoFilterBar, CasoFilters};
use crate::app::components::{EmptyMessage, ErrorBanner, Loading, Pagination, StatusBadge};
use crate::app::context::use_app;
use crate::app::Route;
use crate::collection::CollectionView;

#[component]
pub fn BancoDeCasos() -> Element {
    let ctx = use_app();
    let mut view = use_signal({
        let page_size = ctx.page_size();
        move || CollectionView::<Caso, CasoFilters>::new(CasoFilters::default(), page_size)
    });
    let mut error = use_signal(|| None::<String>);

    let backend = ctx.backend.clone();
    let load = use_callback(move |_: ()| {
        let backend = backend.clone();
        spawn(async move {
            match backend.list_casos().await {
                Ok(all) => {
                    view.write().set_items(all);
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
    let counts = format!("{} de {} casos", current.filtered_count(), current.total());
    drop(current);

    rsx! {
        div { class: "flex items-center justify-between mb-4",
            h1 { class: "text-2xl font-bold", "Banco de casos" }
            button { class: "outline", r#type: "button", onclick: move |_| load.call(()), "Atualizar" }
        }

        if let Some(msg) = error() {
            ErrorBanner { message: msg, on_retry: move |_| load.call(()) }
        }

        CasoFilterBar { view }
        small { "{counts}" }

        if !loaded && error().is_none() {
            Loading {}
        } else if let Some(state) = empty {
            EmptyMessage { state, noun: "casos".to_string() }
        } else {
            table { class: "striped",
                thead {
                    tr {
                        th { "Título" }
                        th { "Tipo" }
                        th { "Data" }
                        th { "Perito responsável" }
                        th { "Criado por" }
                        th { "Status" }
                    }
                }
                tbody {
                    for caso in items {
                        tr { key: "{caso.id}",
                            td { Link { to: Route::VerCaso { id: caso.id.clone() }, "{caso.titulo}" } }
                            td { "{caso.tipo}" }
                            td { {caso.data.format("%d/%m/%Y").to_string()} }
                            td { {caso.perito_responsavel.as_ref().map(|p| p.label().to_string()).unwrap_or_else(|| "-".to_string())} }
                            td { {caso.criado_por.label().to_string()} }
                            td { StatusBadge { status: caso.status } }
                        }
                    }
                }
            }
            Pagination { page, page_count, on_change: move |p| view.write().go_to(p) }
        }
    }
}
