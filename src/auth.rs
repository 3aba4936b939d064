//! Authorization policy
//!
//! Every role decision in the dashboard goes through this module: route
//! gating, the case edit predicate and per-user case visibility.

use chrono::{DateTime, Utc};
use odonto_model::{can_access, Caso, Role};
use tracing::{info, warn};

use crate::session::{decode_token_claims, Session, SessionStore, SessionUser};

/// What a guarded view should render.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    /// No usable session
    RedirectToLogin,
    /// Signed in, but the role is not in the view's allow-list
    AccessDenied { role: Role, allowed: Vec<Role> },
    Granted(Session),
}

/// Decide what a view gated by `allowed` renders for the stored session.
///
/// Corrupted or expired sessions are purged and treated as absent.
pub fn evaluate_guard(store: &SessionStore, allowed: &[Role], now: DateTime<Utc>) -> GuardOutcome {
    let session = match store.load() {
        Ok(Some(session)) => session,
        Ok(None) => return GuardOutcome::RedirectToLogin,
        Err(e) => {
            warn!("Discarding stored session: {}", e);
            store.clear();
            return GuardOutcome::RedirectToLogin;
        }
    };

    if decode_token_claims(&session.token).is_ok_and(|claims| claims.is_expired(now)) {
        info!(user = %session.user.id, "Session token expired");
        store.clear();
        return GuardOutcome::RedirectToLogin;
    }

    if can_access(session.user.role, allowed) {
        GuardOutcome::Granted(session)
    } else {
        GuardOutcome::AccessDenied {
            role: session.user.role,
            allowed: allowed.to_vec(),
        }
    }
}

/// Edit affordance for a case: admins, or the perito who created it,
/// and never once the case is finalized.
pub fn can_edit_case(user: &SessionUser, caso: &Caso) -> bool {
    if caso.is_finalizado() {
        return false;
    }
    match user.role {
        Role::Admin => true,
        Role::Perito => caso.created_by(&user.id),
        Role::Assistente => false,
    }
}

/// Reports can be issued by whoever may edit the case.
pub fn can_issue_report(user: &SessionUser, caso: &Caso) -> bool {
    can_edit_case(user, caso)
}

/// Only admins delete cases.
pub fn can_delete_case(user: &SessionUser) -> bool {
    user.role == Role::Admin
}

/// Cases a user works on: admins see everything, everyone else only
/// the cases they created.
pub fn visible_cases(user: &SessionUser, cases: Vec<Caso>) -> Vec<Caso> {
    match user.role {
        Role::Admin => cases,
        Role::Perito | Role::Assistente => cases
            .into_iter()
            .filter(|c| c.created_by(&user.id))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{make_token, perito_session};
    use crate::session::{MemoryStorage, SessionStorage, TOKEN_KEY, USER_KEY};
    use odonto_model::CasoStatus;

    fn store_with(session: &Session) -> SessionStore {
        let store = SessionStore::new(MemoryStorage::new());
        store.save(session);
        store
    }

    fn session_as(role: Role, id: &str) -> Session {
        let mut s = perito_session();
        s.user.role = role;
        s.user.id = id.to_string();
        s
    }

    fn caso(id: &str, criado_por: &str, status: CasoStatus) -> Caso {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "titulo": format!("Caso {id}"),
            "tipo": "Acidente",
            "data": "2024-01-10",
            "status": status,
            "localDoCaso": "Recife",
            "criadoPor": criado_por,
        }))
        .unwrap()
    }

    #[test]
    fn test_missing_session_redirects() {
        let store = SessionStore::new(MemoryStorage::new());
        assert_eq!(
            evaluate_guard(&store, &[], Utc::now()),
            GuardOutcome::RedirectToLogin
        );
    }

    #[test]
    fn test_roles_outside_allow_list_are_denied() {
        let allow_lists: [&[Role]; 3] = [
            &[Role::Admin],
            &[Role::Admin, Role::Perito],
            &[Role::Perito, Role::Assistente],
        ];
        for allowed in allow_lists {
            for role in Role::ALL {
                let store = store_with(&session_as(role, "u1"));
                let outcome = evaluate_guard(&store, allowed, Utc::now());
                if allowed.contains(&role) {
                    assert!(matches!(outcome, GuardOutcome::Granted(_)));
                } else {
                    assert_eq!(
                        outcome,
                        GuardOutcome::AccessDenied {
                            role,
                            allowed: allowed.to_vec()
                        }
                    );
                }
            }
        }
    }

    #[test]
    fn test_malformed_user_json_clears_session() {
        for garbage in ["{", "null", "[]", "{\"id\": 1}", "{\"id\":\"u\",\"role\":\"root\"}"] {
            let store = SessionStore::new(MemoryStorage::new());
            store.storage().set(TOKEN_KEY, "opaque-token");
            store.storage().set(USER_KEY, garbage);

            assert_eq!(
                evaluate_guard(&store, &[Role::Admin], Utc::now()),
                GuardOutcome::RedirectToLogin,
                "{garbage}"
            );
            assert!(store.storage().get(TOKEN_KEY).is_none());
            assert!(store.storage().get(USER_KEY).is_none());
        }
    }

    #[test]
    fn test_expired_token_is_purged() {
        let mut session = perito_session();
        session.token = make_token(serde_json::json!({"id": "u2", "role": "perito", "exp": 100}));
        let store = store_with(&session);
        assert_eq!(
            evaluate_guard(&store, &[], Utc::now()),
            GuardOutcome::RedirectToLogin
        );
        assert!(store.token().is_none());
    }

    #[test]
    fn test_edit_permission() {
        let admin = session_as(Role::Admin, "a1").user;
        let perito = session_as(Role::Perito, "p1").user;
        let assistente = session_as(Role::Assistente, "p1").user;

        let own = caso("c1", "p1", CasoStatus::EmAndamento);
        let other = caso("c2", "p9", CasoStatus::EmAndamento);
        let closed = caso("c3", "p1", CasoStatus::Finalizado);

        assert!(can_edit_case(&admin, &other));
        assert!(can_edit_case(&perito, &own));
        assert!(!can_edit_case(&perito, &other));
        assert!(!can_edit_case(&assistente, &own));
        assert!(!can_edit_case(&admin, &closed));
        assert!(!can_edit_case(&perito, &closed));
        assert!(can_delete_case(&admin));
        assert!(!can_delete_case(&perito));
    }

    #[test]
    fn test_case_visibility_by_creator() {
        let all = vec![
            caso("c1", "p1", CasoStatus::EmAndamento),
            caso("c2", "p2", CasoStatus::Arquivado),
        ];
        let admin = session_as(Role::Admin, "a1").user;
        let newcomer = session_as(Role::Perito, "p3").user;
        let owner = session_as(Role::Perito, "p2").user;

        assert_eq!(visible_cases(&admin, all.clone()).len(), 2);
        assert!(visible_cases(&newcomer, all.clone()).is_empty());
        let mine = visible_cases(&owner, all);
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "c2");
    }
}
