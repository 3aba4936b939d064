//! Dioxus page components, one per route.

mod ajustes;
mod banco_de_casos;
mod casos;
mod dashboard;
mod historico;
mod login;
mod marcacoes;
mod not_found;
mod odontograma;
mod usuarios;
mod ver_caso;

pub use ajustes::Ajustes;
pub use banco_de_casos::BancoDeCasos;
pub use casos::{CasoFilters, Casos};
pub use dashboard::Dashboard;
pub use historico::{Historico, HistoricoFilters};
pub use login::Login;
pub use marcacoes::Marcacoes;
pub use not_found::NotFound;
pub use odontograma::OdontogramaEditor;
pub use usuarios::{UsuarioFilters, Usuarios};
pub use ver_caso::VerCaso;
