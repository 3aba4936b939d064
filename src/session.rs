//! Session store
//!
//! The session (bearer token + user profile) lives in browser local storage
//! under the `token` and `user` keys. Access goes through [`SessionStore`],
//! which wraps an injectable [`SessionStorage`] and notifies subscribers
//! whenever the session is written or cleared.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use odonto_model::Role;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Minimal key/value storage the session lives in.
pub trait SessionStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-process storage (SSR and tests)
#[derive(Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// window.localStorage
#[cfg(target_arch = "wasm32")]
pub struct BrowserStorage;

#[cfg(target_arch = "wasm32")]
impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

#[cfg(target_arch = "wasm32")]
impl SessionStorage for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage().and_then(|s| s.get_item(key).ok().flatten())
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = Self::storage() {
            if storage.set_item(key, value).is_err() {
                warn!(key, "localStorage write failed");
            }
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}

/// Authenticated user profile as returned by `/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}

/// Claims carried in the token payload segment.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TokenClaims {
    #[serde(alias = "_id", alias = "sub")]
    pub id: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.exp.is_some_and(|exp| exp <= now.timestamp())
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("stored user profile is corrupted: {0}")]
    CorruptedUser(#[from] serde_json::Error),

    #[error("malformed token: {0}")]
    MalformedToken(&'static str),
}

/// Decode (without verifying) the payload of a JWT.
pub fn decode_token_claims(token: &str) -> Result<TokenClaims, SessionError> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_sig), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(SessionError::MalformedToken("expected three segments"));
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| SessionError::MalformedToken("payload is not base64url"))?;
    serde_json::from_slice(&bytes).map_err(|_| SessionError::MalformedToken("payload is not JSON"))
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn(Session),
    SignedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&SessionEvent)>;

struct Inner {
    storage: Box<dyn SessionStorage>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_id: Cell<u64>,
}

/// Shared handle over the session slot. Cheap to clone.
#[derive(Clone)]
pub struct SessionStore {
    inner: Rc<Inner>,
}

impl PartialEq for SessionStore {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl SessionStore {
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self {
            inner: Rc::new(Inner {
                storage: Box::new(storage),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Store backed by local storage in the browser, memory elsewhere
    pub fn platform() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            Self::new(BrowserStorage)
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            Self::new(MemoryStorage::new())
        }
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .storage
            .get(TOKEN_KEY)
            .filter(|t| !t.trim().is_empty())
    }

    /// Read the stored session.
    ///
    /// A token without a stored profile falls back to the token's claims.
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let Some(token) = self.token() else {
            return Ok(None);
        };
        let user = match self.inner.storage.get(USER_KEY) {
            Some(raw) => serde_json::from_str::<SessionUser>(&raw)?,
            None => {
                let claims = decode_token_claims(&token)?;
                let role = claims
                    .role
                    .ok_or(SessionError::MalformedToken("token carries no role"))?;
                SessionUser {
                    id: claims.id,
                    name: claims.name.unwrap_or_default(),
                    email: claims.email.unwrap_or_default(),
                    role,
                }
            }
        };
        Ok(Some(Session { token, user }))
    }

    pub fn save(&self, session: &Session) {
        self.inner.storage.set(TOKEN_KEY, &session.token);
        match serde_json::to_string(&session.user) {
            Ok(json) => self.inner.storage.set(USER_KEY, &json),
            Err(e) => warn!("Failed to serialize session user: {}", e),
        }
        debug!(user = %session.user.id, role = %session.user.role, "Session saved");
        self.notify(&SessionEvent::SignedIn(session.clone()));
    }

    /// Remove both session keys and tell subscribers
    pub fn clear(&self) {
        self.inner.storage.remove(TOKEN_KEY);
        self.inner.storage.remove(USER_KEY);
        debug!("Session cleared");
        self.notify(&SessionEvent::SignedOut);
    }

    pub fn subscribe(&self, listener: impl Fn(&SessionEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.listeners.borrow_mut().retain(|(sid, _)| *sid != id);
    }

    /// Direct access to the underlying storage (preferences share it)
    pub fn storage(&self) -> &dyn SessionStorage {
        self.inner.storage.as_ref()
    }

    fn notify(&self, event: &SessionEvent) {
        // Snapshot so listeners may (un)subscribe while being called
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}
