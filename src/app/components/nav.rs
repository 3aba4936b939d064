//! Sidebar navigation using Tailwind CSS.

use dioxus::prelude::*;
use odonto_model::{can_access, Role};

use crate::app::Route;

/// Sidebar entries in display order
fn entries() -> [(&'static str, &'static str, Route); 6] {
    [
        ("dashboard", "Dashboard", Route::Dashboard {}),
        ("casos", "Casos", Route::Casos {}),
        ("banco", "Banco de casos", Route::BancoDeCasos {}),
        ("usuarios", "Usuários", Route::Usuarios {}),
        ("historico", "Histórico", Route::Historico {}),
        ("ajustes", "Ajustes", Route::Ajustes {}),
    ]
}

/// Entries the role may open
pub fn visible_entries(role: Role) -> Vec<(&'static str, &'static str, Route)> {
    entries()
        .into_iter()
        .filter(|(_, _, route)| can_access(role, route.allowed_roles()))
        .collect()
}

#[derive(Props, Clone, PartialEq)]
pub struct SidebarProps {
    /// The currently active entry ID (e.g., "dashboard", "casos")
    pub active: String,
    pub role: Role,
}

/// Sidebar with mobile toggle. Only routes the role may open are listed.
#[component]
pub fn Sidebar(props: SidebarProps) -> Element {
    let mut menu_open = use_signal(|| false);

    let link_class = |id: &str| {
        if props.active == id {
            "block px-3 py-2 rounded-md text-sm font-medium text-white bg-gray-900"
        } else {
            "block px-3 py-2 rounded-md text-sm font-medium text-gray-300 hover:text-white hover:bg-gray-700"
        }
    };

    let list_class = if menu_open() {
        "block px-2 pt-2 pb-3 space-y-1"
    } else {
        "hidden lg:block px-2 pt-2 pb-3 space-y-1"
    };

    rsx! {
        nav { class: "bg-gray-800 lg:min-h-screen",
            div { class: "flex items-center justify-between h-16 px-4",
                Link { class: "text-white font-bold text-xl", to: Route::Dashboard {}, "OdontoLegal" }
                button {
                    class: "lg:hidden inline-flex items-center justify-center p-2 rounded-md text-gray-400 hover:text-white hover:bg-gray-700 focus:outline-none",
                    r#type: "button",
                    onclick: move |_| menu_open.toggle(),
                    span { class: "sr-only", "Menu" }
                    svg { class: "h-6 w-6", fill: "none", view_box: "0 0 24 24", stroke: "currentColor", "stroke-width": "2",
                        if menu_open() {
                            path { "stroke-linecap": "round", "stroke-linejoin": "round", d: "M6 18L18 6M6 6l12 12" }
                        } else {
                            path { "stroke-linecap": "round", "stroke-linejoin": "round", d: "M4 6h16M4 12h16M4 18h16" }
                        }
                    }
                }
            }
            div { class: list_class,
                for (id, label, route) in visible_entries(props.role) {
                    Link {
                        key: "{id}",
                        class: link_class(id),
                        to: route,
                        onclick: move |_| menu_open.set(false),
                        "{label}"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidebar_hides_admin_entries() {
        let ids = |role| {
            visible_entries(role)
                .into_iter()
                .map(|(id, _, _)| id)
                .collect::<Vec<_>>()
        };
        assert_eq!(
            ids(Role::Admin),
            vec!["dashboard", "casos", "banco", "usuarios", "historico", "ajustes"]
        );
        assert_eq!(ids(Role::Perito), vec!["dashboard", "casos", "banco", "ajustes"]);
        assert_eq!(ids(Role::Assistente), vec!["dashboard", "casos", "ajustes"]);
    }
}
