//! Shared application context: API backend, session and preferences.
//!
//! Provided once at the app root; pages read it with [`use_app`].

use dioxus::prelude::*;
use tracing::{debug, warn};

use super::api::Backend;
use crate::config::ApiConfig;
use crate::http::{platform_transport, ApiClient};
use crate::preferences::Configuracoes;
use crate::session::{Session, SessionEvent, SessionStore, SessionUser};

#[derive(Clone)]
pub struct AppContext {
    pub backend: Backend,
    /// Mirror of the stored session; `None` when signed out
    pub session: Signal<Option<Session>>,
    /// Set once client storage has been read (never on SSR)
    pub ready: Signal<bool>,
    pub preferences: Signal<Configuracoes>,
}

impl AppContext {
    pub fn store(&self) -> &SessionStore {
        self.backend.client().session()
    }

    /// Re-read storage into the signals
    pub fn reload(&self) {
        let mut session = self.session;
        match self.store().load() {
            Ok(current) => session.set(current),
            Err(e) => {
                warn!("Stored session unreadable: {}", e);
                session.set(None);
            }
        }
        let mut preferences = self.preferences;
        preferences.set(Configuracoes::load(self.store().storage()));
    }

    pub fn save_preferences(&self, prefs: Configuracoes) {
        prefs.save(self.store().storage());
        crate::preferences::apply_theme(prefs.tema);
        let mut preferences = self.preferences;
        preferences.set(prefs);
    }

    /// Signed-in user, if any
    pub fn user(&self) -> Option<SessionUser> {
        self.session.read().as_ref().map(|s| s.user.clone())
    }

    pub fn logout(&self) {
        self.backend.logout();
    }

    pub fn page_size(&self) -> usize {
        self.preferences.peek().itens_por_pagina
    }
}

/// Build the context and keep the session signal in sync with the store.
pub fn use_app_provider() -> AppContext {
    let session = use_signal(|| None::<Session>);
    let ready = use_signal(|| false);
    let preferences = use_signal(Configuracoes::default);

    let ctx = use_context_provider(|| {
        let store = SessionStore::platform();
        let client = ApiClient::new(ApiConfig::from_build_env(), store, platform_transport());
        AppContext {
            backend: Backend::new(client),
            session,
            ready,
            preferences,
        }
    });

    let subscription = use_hook(|| {
        ctx.store().subscribe(move |event| {
            let mut session = session;
            match event {
                SessionEvent::SignedIn(s) => session.set(Some(s.clone())),
                SessionEvent::SignedOut => session.set(None),
            }
        })
    });

    let store = ctx.store().clone();
    use_drop(move || store.unsubscribe(subscription));

    // Client only: read local storage and follow other tabs
    let mounted = ctx.clone();
    use_effect(move || {
        mounted.reload();
        crate::preferences::apply_theme(mounted.preferences.peek().tema);
        let mut ready = mounted.ready;
        ready.set(true);
        debug!("Client session state loaded");

        #[cfg(target_arch = "wasm32")]
        listen_for_storage_changes(mounted.clone());
    });

    ctx
}

pub fn use_app() -> AppContext {
    use_context::<AppContext>()
}

/// Other tabs signing in or out show up as `storage` events.
#[cfg(target_arch = "wasm32")]
fn listen_for_storage_changes(ctx: AppContext) {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::<dyn FnMut(web_sys::StorageEvent)>::new(move |event: web_sys::StorageEvent| {
        let key = event.key();
        let relevant = key.as_deref().map_or(true, |k| {
            k == crate::session::TOKEN_KEY
                || k == crate::session::USER_KEY
                || k == crate::preferences::PREFERENCES_KEY
        });
        if relevant {
            ctx.reload();
        }
    });
    if window
        .add_event_listener_with_callback("storage", callback.as_ref().unchecked_ref())
        .is_err()
    {
        warn!("Could not listen for storage events");
    }
    callback.forget();
}
