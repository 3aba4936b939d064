//! User accounts. Only admins create, edit or delete them.

use serde::{Deserialize, Serialize};

use crate::role::Role;
use crate::validation::{required, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Usuario {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub matricula: String,
}

/// Create / update payload. `password` is only sent when set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NovoUsuario {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub matricula: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Default for NovoUsuario {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            role: Role::Assistente,
            matricula: String::new(),
            password: None,
        }
    }
}

impl From<&Usuario> for NovoUsuario {
    fn from(u: &Usuario) -> Self {
        Self {
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.role,
            matricula: u.matricula.clone(),
            password: None,
        }
    }
}

const MIN_PASSWORD_LEN: usize = 6;

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

impl NovoUsuario {
    /// Validate the form. New accounts must carry a password.
    pub fn validate(&self, creating: bool) -> Result<(), ValidationError> {
        required("name", &self.name)?;
        required("email", &self.email)?;
        if !looks_like_email(self.email.trim()) {
            return Err(ValidationError::Invalid {
                field: "email",
                reason: "formato inválido".to_string(),
            });
        }
        required("matricula", &self.matricula)?;
        match self.password.as_deref() {
            None | Some("") if creating => Err(ValidationError::Required("password")),
            Some(p) if !p.is_empty() && p.chars().count() < MIN_PASSWORD_LEN => {
                Err(ValidationError::Invalid {
                    field: "password",
                    reason: format!("mínimo de {MIN_PASSWORD_LEN} caracteres"),
                })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> NovoUsuario {
        NovoUsuario {
            name: "Ana".to_string(),
            email: "ana@pericia.gov.br".to_string(),
            role: Role::Perito,
            matricula: "12345".to_string(),
            password: Some("segredo1".to_string()),
        }
    }

    #[test]
    fn test_valid_form() {
        assert!(form().validate(true).is_ok());
    }

    #[test]
    fn test_password_required_only_on_create() {
        let mut f = form();
        f.password = None;
        assert_eq!(f.validate(true), Err(ValidationError::Required("password")));
        assert!(f.validate(false).is_ok());
        f.password = Some("123".to_string());
        assert!(f.validate(false).is_err());
    }

    #[test]
    fn test_password_length_counts_characters() {
        // five characters, ten bytes
        let short = NovoUsuario {
            password: Some("çãéíõ".to_string()),
            ..form()
        };
        assert!(matches!(
            short.validate(true),
            Err(ValidationError::Invalid { field: "password", .. })
        ));
        let long_enough = NovoUsuario {
            password: Some("çãéíõú".to_string()),
            ..form()
        };
        assert!(long_enough.validate(true).is_ok());
    }

    #[test]
    fn test_email_format() {
        for bad in ["ana", "ana@", "@x.com", "ana@x", "a b@x.com", "a@b@c.com"] {
            let mut f = form();
            f.email = bad.to_string();
            assert!(f.validate(true).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn test_update_payload_omits_password() {
        let u = Usuario {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            role: Role::Admin,
            matricula: "1".to_string(),
        };
        let json = serde_json::to_value(NovoUsuario::from(&u)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "admin");
    }
}
