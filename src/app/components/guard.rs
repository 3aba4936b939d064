//! Access-denied panel shown when the role is outside a view's allow-list.

use dioxus::prelude::*;
use odonto_model::Role;

use crate::app::Route;

/// Human-readable list of the permitted roles
pub fn allowed_label(allowed: &[Role]) -> String {
    if allowed.is_empty() {
        return "qualquer usuário autenticado".to_string();
    }
    allowed
        .iter()
        .map(Role::label)
        .collect::<Vec<_>>()
        .join(", ")
}

#[component]
pub fn AccessDenied(role: Role, allowed: Vec<Role>) -> Element {
    let permitted = allowed_label(&allowed);
    rsx! {
        article { class: "max-w-xl mx-auto", id: "access-denied",
            header { h2 { "Acesso negado" } }
            p { "Seu perfil atual é " strong { "{role.label()}" } "." }
            p { "Esta página é restrita a: " strong { "{permitted}" } "." }
            footer {
                Link { to: Route::Dashboard {}, "Voltar ao dashboard" }
            }
        }
    }
}
