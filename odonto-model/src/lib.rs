//! Wire types and pure domain rules for the odonto-legal dashboard.
//!
//! Everything here mirrors the JSON exchanged with the case-management
//! REST API, plus the few rules the client must enforce on its own:
//! - [`role`] - user roles and the single capability check
//! - [`caso`] - cases and their lifecycle status
//! - [`vitima`] - victims attached to a case
//! - [`odontograma`] - FDI dental charts and type switching
//! - [`marcacao`] - anatomical markings with percentage coordinates
//! - [`laudo`] - immutable reports with an odontogram snapshot
//! - [`usuario`] - user accounts
//! - [`historico`] - audit trail entries
//! - [`predicao`] - ML status prediction payloads

pub mod caso;
mod date;
pub mod historico;
pub mod laudo;
pub mod marcacao;
pub mod odontograma;
pub mod predicao;
pub mod reference;
pub mod role;
pub mod usuario;
pub mod validation;
pub mod vitima;

pub use caso::{Caso, CasoStatus, Localizacao, NovoCaso, TIPOS_CASO};
pub use historico::HistoricoEntry;
pub use laudo::{Laudo, NovoLaudo};
pub use marcacao::{
    CategoriaImagem, Coordenadas, ImagemConfig, Lado, MarcacaoAnatomica, NovaMarcacao, Regiao,
    Tamanho, Vista, TIPOS_MARCACAO,
};
pub use odontograma::{
    confirm_type_change, request_type_change, reset_odontogram, Arcada, Condicao, Dente, Face,
    Odontograma, OdontogramaError, TipoCondicao, TipoOdontograma, ToothFill, TypeChange,
};
pub use predicao::{PredictionRequest, PredictionResponse};
pub use reference::Referencia;
pub use role::{can_access, Role};
pub use usuario::{NovoUsuario, Usuario};
pub use validation::ValidationError;
pub use vitima::{NovaVitima, Vitima, CORES_ETNIA, GENEROS};
