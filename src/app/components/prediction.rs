//! ML status prediction panel.

use dioxus::prelude::*;
use odonto_model::PredictionRequest;

use crate::app::context::use_app;
use crate::prediction::PredictionView;

#[component]
pub fn PredictionPanel(tipo: String, local_do_caso: String) -> Element {
    let ctx = use_app();
    let mut view = use_signal(|| PredictionView::Idle);

    let predict = move |_: MouseEvent| {
        let backend = ctx.backend.clone();
        let req = PredictionRequest {
            tipo: tipo.clone(),
            local_do_caso: local_do_caso.clone(),
        };
        view.set(PredictionView::Loading);
        spawn(async move {
            let result = backend.predict(&req).await;
            view.set(PredictionView::from_result(result));
        });
    };

    rsx! {
        article { id: "prediction",
            header { class: "flex items-center justify-between",
                strong { "Previsão de status (ML)" }
                button {
                    class: "outline",
                    r#type: "button",
                    disabled: matches!(*view.read(), PredictionView::Loading),
                    onclick: predict,
                    "Prever"
                }
            }
            match view() {
                PredictionView::Idle => rsx! {
                    small { "Estimativa do desfecho a partir do tipo e do local do caso." }
                },
                PredictionView::Loading => rsx! {
                    p { aria_busy: "true", "Consultando modelo..." }
                },
                PredictionView::Failed(message) => rsx! {
                    p { class: "status-err", "{message}" }
                },
                PredictionView::Ready { predicted, bars } => rsx! {
                    p { "Status previsto: " strong { "{predicted}" } }
                    for bar in bars {
                        div { key: "{bar.label}", class: "mb-2",
                            div { class: "flex justify-between",
                                small { "{bar.label}" }
                                small { {format!("{:.1}%", bar.width_percent())} }
                            }
                            div { class: "bar", style: format!("width:{}%;", bar.width_percent()) }
                        }
                    }
                },
            }
        }
    }
}
