//! User roles and the capability check every view goes through.

use serde::{Deserialize, Serialize};

/// Role carried by a session and by user accounts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Perito,
    Assistente,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Perito, Role::Assistente];

    /// Wire value ("admin", "perito", "assistente")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Perito => "perito",
            Self::Assistente => "assistente",
        }
    }

    /// Display label used in the UI
    pub fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Administrador",
            Self::Perito => "Perito",
            Self::Assistente => "Assistente",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "perito" => Some(Self::Perito),
            "assistente" => Some(Self::Assistente),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single authorization policy: is `current` one of `required`?
///
/// An empty `required` list means the view only needs a session.
pub fn can_access(current: Role, required: &[Role]) -> bool {
    required.is_empty() || required.contains(&current)
}
