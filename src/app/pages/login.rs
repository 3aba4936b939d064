//! Login page: exchanges credentials for a bearer token.

use dioxus::prelude::*;
use tracing::info;

use crate::app::components::Head;
use crate::app::context::use_app;
use crate::app::Route;

/// Inline check before any request is sent
pub fn validate_credentials(email: &str, password: &str) -> Result<(), &'static str> {
    if email.trim().is_empty() {
        return Err("Informe o e-mail.");
    }
    if password.is_empty() {
        return Err("Informe a senha.");
    }
    Ok(())
}

#[component]
pub fn Login() -> Element {
    let ctx = use_app();
    let nav = navigator();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);
    let mut submitting = use_signal(|| false);

    // Already signed in: straight to the dashboard
    let session = ctx.session;
    let ready = ctx.ready;
    use_effect(move || {
        if ready() && session.read().is_some() {
            let _ = nav.replace(Route::Dashboard {});
        }
    });

    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        if let Err(msg) = validate_credentials(&email(), &password()) {
            error.set(Some(msg.to_string()));
            return;
        }
        error.set(None);
        submitting.set(true);
        let backend = ctx.backend.clone();
        spawn(async move {
            match backend.login(&email(), &password()).await {
                Ok(session) => {
                    info!(user = %session.user.id, "Signed in");
                    password.set(String::new());
                    let _ = nav.replace(Route::Dashboard {});
                }
                Err(e) => error.set(Some(e.to_string())),
            }
            submitting.set(false);
        });
    };

    rsx! {
        Head { title: "Entrar".to_string() }
        main { class: "container max-w-md mx-auto py-16",
            article {
                header {
                    h1 { class: "text-2xl font-bold", "OdontoLegal" }
                    small { "Gestão de perícias odontolegais" }
                }
                form { onsubmit: submit,
                    if let Some(msg) = error() {
                        div { class: "banner-error", role: "alert", "{msg}" }
                    }
                    label { "E-mail"
                        input {
                            r#type: "email",
                            name: "email",
                            autocomplete: "username",
                            value: "{email}",
                            oninput: move |e| email.set(e.value()),
                        }
                    }
                    label { "Senha"
                        input {
                            r#type: "password",
                            name: "password",
                            autocomplete: "current-password",
                            value: "{password}",
                            oninput: move |e| password.set(e.value()),
                        }
                    }
                    button {
                        r#type: "submit",
                        disabled: submitting(),
                        aria_busy: if submitting() { "true" } else { "false" },
                        "Entrar"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_required() {
        assert_eq!(validate_credentials("  ", "x"), Err("Informe o e-mail."));
        assert_eq!(validate_credentials("a@b.com", ""), Err("Informe a senha."));
        assert!(validate_credentials("a@b.com", "x").is_ok());
    }
}
