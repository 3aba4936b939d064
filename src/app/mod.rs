//! Dioxus fullstack application entry point.
//!
//! The root [`App`] component, the route table and the per-route role
//! allow-lists. Every route except `/login` renders inside [`Shell`], which
//! runs the session guard before showing the page.

use dioxus::prelude::*;
use odonto_model::Role;

pub mod api;
pub mod components;
pub mod context;
pub mod download;
pub mod pages;

use components::Shell;
use context::use_app_provider;
use pages::{
    Ajustes, BancoDeCasos, Casos, Dashboard, Historico, Login, Marcacoes, NotFound,
    OdontogramaEditor, Usuarios, VerCaso,
};

/// Root app component with routing
#[component]
pub fn App() -> Element {
    use_app_provider();

    rsx! {
        Router::<Route> {}
    }
}

const ALL_ROLES: &[Role] = &[];
const ADMIN_PERITO: &[Role] = &[Role::Admin, Role::Perito];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Application routes
#[derive(Clone, Routable, Debug, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[route("/login")]
    Login {},
    #[layout(Shell)]
        #[route("/")]
        Dashboard {},
        #[route("/casos")]
        Casos {},
        #[route("/casos/:id")]
        VerCaso { id: String },
        #[route("/casos/:caso_id/vitimas/:vitima_id/odontograma")]
        OdontogramaEditor { caso_id: String, vitima_id: String },
        #[route("/casos/:caso_id/vitimas/:vitima_id/marcacoes")]
        Marcacoes { caso_id: String, vitima_id: String },
        #[route("/banco-de-casos")]
        BancoDeCasos {},
        #[route("/usuarios")]
        Usuarios {},
        #[route("/historico")]
        Historico {},
        #[route("/ajustes")]
        Ajustes {},
    #[end_layout]
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

impl Route {
    /// Roles allowed to open the route. Empty means any signed-in user.
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Self::Login {} | Self::NotFound { .. } => ALL_ROLES,
            Self::Dashboard {} | Self::Casos {} | Self::VerCaso { .. } | Self::Ajustes {} => {
                ALL_ROLES
            }
            Self::OdontogramaEditor { .. } | Self::Marcacoes { .. } | Self::BancoDeCasos {} => {
                ADMIN_PERITO
            }
            Self::Usuarios {} | Self::Historico {} => ADMIN_ONLY,
        }
    }

    /// Whether the route renders inside the guarded shell
    pub fn is_guarded(&self) -> bool {
        !matches!(self, Self::Login {} | Self::NotFound { .. })
    }

    /// Sidebar id used to highlight the active entry
    pub fn nav_id(&self) -> &'static str {
        match self {
            Self::Dashboard {} => "dashboard",
            Self::Casos {}
            | Self::VerCaso { .. }
            | Self::OdontogramaEditor { .. }
            | Self::Marcacoes { .. } => "casos",
            Self::BancoDeCasos {} => "banco",
            Self::Usuarios {} => "usuarios",
            Self::Historico {} => "historico",
            Self::Ajustes {} => "ajustes",
            Self::Login {} | Self::NotFound { .. } => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odonto_model::can_access;

    #[test]
    fn test_role_table() {
        let usuarios = Route::Usuarios {};
        assert!(can_access(Role::Admin, usuarios.allowed_roles()));
        assert!(!can_access(Role::Perito, usuarios.allowed_roles()));
        assert!(!can_access(Role::Assistente, usuarios.allowed_roles()));

        let chart = Route::OdontogramaEditor {
            caso_id: "c1".into(),
            vitima_id: "v1".into(),
        };
        assert!(can_access(Role::Perito, chart.allowed_roles()));
        assert!(!can_access(Role::Assistente, chart.allowed_roles()));

        for role in Role::ALL {
            assert!(can_access(role, Route::Casos {}.allowed_roles()));
        }
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(
            Route::VerCaso { id: "abc".into() }.to_string(),
            "/casos/abc"
        );
        assert_eq!(
            Route::Marcacoes {
                caso_id: "c".into(),
                vitima_id: "v".into()
            }
            .to_string(),
            "/casos/c/vitimas/v/marcacoes"
        );
        assert_eq!(
            "/historico".parse::<Route>().ok(),
            Some(Route::Historico {})
        );
        assert!(!Route::Login {}.is_guarded());
    }
}
