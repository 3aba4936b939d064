//! Banners, snackbars and placeholders for async page state.

use dioxus::prelude::*;
use odonto_model::CasoStatus;

use crate::collection::EmptyState;

/// Page-level error with an optional manual retry
#[component]
pub fn ErrorBanner(message: String, on_retry: Option<EventHandler<()>>) -> Element {
    rsx! {
        div { class: "banner-error flex items-center justify-between", role: "alert",
            span { "{message}" }
            if let Some(retry) = on_retry {
                button {
                    class: "secondary",
                    r#type: "button",
                    onclick: move |_| retry.call(()),
                    "Atualizar"
                }
            }
        }
    }
}

/// Transient notice; closed by the user
#[component]
pub fn Snackbar(message: String, on_close: EventHandler<()>) -> Element {
    rsx! {
        div { class: "snackbar flex items-center gap-3", role: "status",
            span { "{message}" }
            button {
                class: "outline contrast",
                r#type: "button",
                style: "padding:.1rem .5rem;margin:0;",
                onclick: move |_| on_close.call(()),
                "×"
            }
        }
    }
}

#[component]
pub fn Loading() -> Element {
    rsx! {
        p { aria_busy: "true", "Carregando..." }
    }
}

/// "Nothing here" vs "nothing matches"
#[component]
pub fn EmptyMessage(state: EmptyState, noun: String) -> Element {
    let message = state.message(&noun);
    rsx! {
        p { class: "text-center py-6", small { "{message}" } }
    }
}

/// Colored case status pill
#[component]
pub fn StatusBadge(status: CasoStatus) -> Element {
    let class = format!("badge badge-{}", status.as_str().replace(' ', "-"));
    rsx! {
        span { class, "{status.label()}" }
    }
}
