//! Form validation errors raised before any request is issued.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("O campo \"{0}\" é obrigatório")]
    Required(&'static str),

    #[error("O campo \"{field}\" é inválido: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub(crate) fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}
