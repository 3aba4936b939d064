//! Case detail editing state machine.
//!
//! `Viewing → Editing → Saving → Viewing`. Entering edit mode snapshots the
//! case into a buffer; cancel drops the buffer; a failed save returns to
//! editing with the buffer intact.

use odonto_model::{Caso, CasoStatus, NovoCaso, ValidationError};
use thiserror::Error;

use crate::auth::can_edit_case;
use crate::session::SessionUser;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
    Viewing,
    Editing { buffer: NovoCaso, error: Option<String> },
    Saving { buffer: NovoCaso },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EditorError {
    #[error("Você não tem permissão para editar este caso")]
    NotAllowed,
    #[error("Operação indisponível no estado atual")]
    WrongState,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseEditor {
    caso: Caso,
    state: EditorState,
}

impl CaseEditor {
    pub fn new(caso: Caso) -> Self {
        Self {
            caso,
            state: EditorState::Viewing,
        }
    }

    /// The canonical record
    pub fn caso(&self) -> &Caso {
        &self.caso
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditorState::Editing { .. })
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.state, EditorState::Saving { .. })
    }

    pub fn buffer(&self) -> Option<&NovoCaso> {
        match &self.state {
            EditorState::Editing { buffer, .. } | EditorState::Saving { buffer } => Some(buffer),
            EditorState::Viewing => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            EditorState::Editing { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    pub fn can_edit(&self, user: &SessionUser) -> bool {
        can_edit_case(user, &self.caso)
    }

    pub fn begin_edit(&mut self, user: &SessionUser) -> Result<(), EditorError> {
        if !matches!(self.state, EditorState::Viewing) {
            return Err(EditorError::WrongState);
        }
        if !self.can_edit(user) {
            return Err(EditorError::NotAllowed);
        }
        self.state = EditorState::Editing {
            buffer: self.caso.to_update(),
            error: None,
        };
        Ok(())
    }

    /// Mutate the edit buffer
    pub fn edit(&mut self, change: impl FnOnce(&mut NovoCaso)) {
        if let EditorState::Editing { buffer, .. } = &mut self.state {
            change(buffer);
        }
    }

    pub fn cancel(&mut self) {
        if self.is_editing() {
            self.state = EditorState::Viewing;
        }
    }

    /// Validate and move to `Saving`, returning the payload to send.
    pub fn begin_save(&mut self) -> Result<NovoCaso, EditorError> {
        let EditorState::Editing { buffer, .. } = &self.state else {
            return Err(EditorError::WrongState);
        };
        if let Err(e) = buffer.validate() {
            let buffer = buffer.clone();
            self.state = EditorState::Editing {
                buffer,
                error: Some(e.to_string()),
            };
            return Err(e.into());
        }
        let buffer = buffer.clone();
        self.state = EditorState::Saving {
            buffer: buffer.clone(),
        };
        Ok(buffer)
    }

    /// The API accepted the update
    pub fn save_succeeded(&mut self, updated: Option<Caso>) {
        if let EditorState::Saving { buffer } = &self.state {
            match updated {
                Some(caso) => self.caso = caso,
                None => {
                    let buffer = buffer.clone();
                    self.caso.apply(&buffer);
                }
            }
            self.state = EditorState::Viewing;
        }
    }

    pub fn save_failed(&mut self, message: String) {
        if let EditorState::Saving { buffer } = &self.state {
            self.state = EditorState::Editing {
                buffer: buffer.clone(),
                error: Some(message),
            };
        }
    }

    /// A final report was issued: the case is closed for edits.
    pub fn finalize(&mut self) {
        self.caso.status = CasoStatus::Finalizado;
        self.state = EditorState::Viewing;
    }

    /// Replace the canonical record after a refetch
    pub fn replace(&mut self, caso: Caso) {
        self.caso = caso;
        self.state = EditorState::Viewing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odonto_model::Role;

    fn caso(criado_por: &str) -> Caso {
        serde_json::from_value(serde_json::json!({
            "_id": "c1",
            "titulo": "Identificação",
            "tipo": "Identificação de Vítima",
            "data": "2024-02-01",
            "status": "em andamento",
            "localDoCaso": "Olinda",
            "criadoPor": criado_por,
        }))
        .unwrap()
    }

    fn user(role: Role, id: &str) -> SessionUser {
        SessionUser {
            id: id.to_string(),
            name: String::new(),
            email: String::new(),
            role,
        }
    }

    #[test]
    fn test_edit_save_cycle() {
        let mut editor = CaseEditor::new(caso("p1"));
        editor.begin_edit(&user(Role::Perito, "p1")).unwrap();
        editor.edit(|b| b.titulo = "Identificação - revisado".to_string());

        let payload = editor.begin_save().unwrap();
        assert_eq!(payload.titulo, "Identificação - revisado");
        assert!(editor.is_saving());
        // canonical record untouched until the API confirms
        assert_eq!(editor.caso().titulo, "Identificação");

        editor.save_succeeded(None);
        assert_eq!(editor.state(), &EditorState::Viewing);
        assert_eq!(editor.caso().titulo, "Identificação - revisado");
    }

    #[test]
    fn test_cancel_discards_buffer() {
        let mut editor = CaseEditor::new(caso("p1"));
        editor.begin_edit(&user(Role::Admin, "a1")).unwrap();
        editor.edit(|b| b.descricao = "rascunho".to_string());
        editor.cancel();
        assert_eq!(editor.state(), &EditorState::Viewing);
        assert!(editor.caso().descricao.is_empty());
        assert!(editor.buffer().is_none());
    }

    #[test]
    fn test_failed_save_keeps_buffer() {
        let mut editor = CaseEditor::new(caso("p1"));
        editor.begin_edit(&user(Role::Admin, "a1")).unwrap();
        editor.edit(|b| b.local_do_caso = "Recife".to_string());
        editor.begin_save().unwrap();
        editor.save_failed("Falha de conexão".to_string());

        assert!(editor.is_editing());
        assert_eq!(editor.error(), Some("Falha de conexão"));
        assert_eq!(editor.buffer().unwrap().local_do_caso, "Recife");
        assert_eq!(editor.caso().local_do_caso, "Olinda");
    }

    #[test]
    fn test_invalid_buffer_is_not_sent() {
        let mut editor = CaseEditor::new(caso("p1"));
        editor.begin_edit(&user(Role::Admin, "a1")).unwrap();
        editor.edit(|b| b.titulo.clear());
        assert_eq!(
            editor.begin_save(),
            Err(EditorError::Invalid(ValidationError::Required("titulo")))
        );
        assert!(editor.is_editing());
        assert!(editor.error().is_some());
    }

    #[test]
    fn test_permissions_and_finalization() {
        let mut editor = CaseEditor::new(caso("p1"));
        assert_eq!(
            editor.begin_edit(&user(Role::Perito, "p2")),
            Err(EditorError::NotAllowed)
        );
        assert_eq!(
            editor.begin_edit(&user(Role::Assistente, "p1")),
            Err(EditorError::NotAllowed)
        );

        editor.finalize();
        assert!(editor.caso().is_finalizado());
        assert_eq!(
            editor.begin_edit(&user(Role::Admin, "a1")),
            Err(EditorError::NotAllowed)
        );
        assert_eq!(
            editor.begin_edit(&user(Role::Perito, "p1")),
            Err(EditorError::NotAllowed)
        );
    }
}
