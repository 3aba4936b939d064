use dioxus::prelude::*;

use crate::app::components::Head;
use crate::app::Route;

#[component]
pub fn NotFound(segments: Vec<String>) -> Element {
    let path = format!("/{}", segments.join("/"));
    rsx! {
        Head { title: "Página não encontrada".to_string() }
        main { class: "container py-8",
            h1 { "Página não encontrada" }
            p { "Nada em " code { "{path}" } "." }
            Link { to: Route::Dashboard {}, "Ir para o dashboard" }
        }
    }
}
