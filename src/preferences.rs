//! Display preferences (`configuracoes` in local storage).
//!
//! Saved locally only; nothing is synced to the server.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::session::SessionStorage;

pub const PREFERENCES_KEY: &str = "configuracoes";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tema {
    Claro,
    #[default]
    Escuro,
    Preto,
}

impl Tema {
    pub const ALL: [Tema; 3] = [Self::Claro, Self::Escuro, Self::Preto];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Claro => "Claro",
            Self::Escuro => "Escuro",
            Self::Preto => "Preto (OLED)",
        }
    }

    /// `data-theme` attribute value
    pub fn data_theme(&self) -> &'static str {
        match self {
            Self::Claro => "light",
            Self::Escuro | Self::Preto => "dark",
        }
    }

    pub fn is_black(&self) -> bool {
        matches!(self, Self::Preto)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuracoes {
    pub tema: Tema,
    pub itens_por_pagina: usize,
    pub notificacoes: bool,
    pub idioma: String,
}

impl Default for Configuracoes {
    fn default() -> Self {
        Self {
            tema: Tema::default(),
            itens_por_pagina: 10,
            notificacoes: true,
            idioma: "pt-BR".to_string(),
        }
    }
}

pub const PAGE_SIZE_OPTIONS: [usize; 4] = [5, 10, 25, 50];

impl Configuracoes {
    /// Stored preferences, defaults when missing or corrupted
    pub fn load(storage: &dyn SessionStorage) -> Self {
        let Some(raw) = storage.get(PREFERENCES_KEY) else {
            return Self::default();
        };
        match serde_json::from_str::<Self>(&raw) {
            Ok(mut prefs) => {
                if !PAGE_SIZE_OPTIONS.contains(&prefs.itens_por_pagina) {
                    prefs.itens_por_pagina = Self::default().itens_por_pagina;
                }
                prefs
            }
            Err(e) => {
                warn!("Ignoring corrupted preferences: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, storage: &dyn SessionStorage) {
        match serde_json::to_string(self) {
            Ok(json) => storage.set(PREFERENCES_KEY, &json),
            Err(e) => warn!("Failed to serialize preferences: {}", e),
        }
    }
}

/// Apply the theme to the document root
pub fn apply_theme(tema: Tema) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(root) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
        {
            let _ = root.set_attribute("data-theme", tema.data_theme());
            if tema.is_black() {
                let _ = root.set_attribute("data-variant", "black");
            } else {
                let _ = root.remove_attribute("data-variant");
            }
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = tema;
}

/// Runs before hydration so the stored theme applies without a flash.
pub const THEME_SCRIPT: &str = r#"
(function(){
    var t = 'escuro';
    try { t = (JSON.parse(localStorage.getItem('configuracoes') || '{}').tema) || 'escuro'; } catch (e) {}
    document.documentElement.setAttribute('data-theme', t === 'claro' ? 'light' : 'dark');
    if (t === 'preto') document.documentElement.setAttribute('data-variant', 'black');
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStorage;

    #[test]
    fn test_defaults_when_missing_or_corrupted() {
        let storage = MemoryStorage::new();
        assert_eq!(Configuracoes::load(&storage), Configuracoes::default());
        storage.set(PREFERENCES_KEY, "{oops");
        assert_eq!(Configuracoes::load(&storage), Configuracoes::default());
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let prefs = Configuracoes {
            tema: Tema::Preto,
            itens_por_pagina: 25,
            notificacoes: false,
            idioma: "pt-BR".to_string(),
        };
        prefs.save(&storage);
        assert_eq!(Configuracoes::load(&storage), prefs);
        assert!(storage.get(PREFERENCES_KEY).unwrap().contains("\"itensPorPagina\":25"));
    }

    #[test]
    fn test_partial_and_out_of_range_values() {
        let storage = MemoryStorage::new();
        storage.set(PREFERENCES_KEY, r#"{"tema": "claro", "itensPorPagina": 7}"#);
        let prefs = Configuracoes::load(&storage);
        assert_eq!(prefs.tema, Tema::Claro);
        assert_eq!(prefs.itens_por_pagina, 10);
        assert!(prefs.notificacoes);
    }
}
