//! Ajustes page: local display preferences.

use dioxus::prelude::*;

use crate::app::components::Snackbar;
use crate::app::context::use_app;
use crate::preferences::{Tema, PAGE_SIZE_OPTIONS};

const IDIOMAS: [(&str, &str); 3] = [
    ("pt-BR", "Português (Brasil)"),
    ("en-US", "English (US)"),
    ("es-ES", "Español"),
];

#[component]
pub fn Ajustes() -> Element {
    let ctx = use_app();
    let mut draft = use_signal(|| ctx.preferences.peek().clone());
    let mut notice = use_signal(|| None::<String>);

    // Preferences may change under us (theme switcher, other tabs)
    let preferences = ctx.preferences;
    use_effect(move || {
        draft.set(preferences());
    });

    let save_ctx = ctx.clone();
    let save = move |evt: FormEvent| {
        evt.prevent_default();
        save_ctx.save_preferences(draft());
        notice.set(Some("Preferências salvas neste navegador.".to_string()));
    };

    let d = draft();
    let user = ctx.user();

    rsx! {
        h1 { class: "text-2xl font-bold mb-4", "Ajustes" }

        if let Some(user) = user {
            article {
                header { strong { "Conta" } }
                p { "{user.name}" br {} small { "{user.email}" } }
                p { "Perfil: " strong { "{user.role.label()}" } }
            }
        }

        article {
            header {
                strong { "Preferências de exibição" }
                br {}
                small { "Salvas apenas neste navegador." }
            }
            form { onsubmit: save,
                fieldset {
                    legend { "Tema" }
                    for tema in Tema::ALL {
                        label { key: "{tema.label()}",
                            input {
                                r#type: "radio",
                                name: "tema",
                                checked: d.tema == tema,
                                onchange: move |_| draft.write().tema = tema,
                            }
                            "{tema.label()}"
                        }
                    }
                }
                label { "Itens por página"
                    select {
                        value: "{d.itens_por_pagina}",
                        onchange: move |e| {
                            if let Ok(n) = e.value().parse::<usize>() {
                                draft.write().itens_por_pagina = n;
                            }
                        },
                        for n in PAGE_SIZE_OPTIONS {
                            option { key: "{n}", value: "{n}", "{n}" }
                        }
                    }
                }
                label { "Idioma"
                    select {
                        value: "{d.idioma}",
                        onchange: move |e| draft.write().idioma = e.value(),
                        for (code, label) in IDIOMAS {
                            option { key: "{code}", value: code, "{label}" }
                        }
                    }
                }
                label {
                    input {
                        r#type: "checkbox",
                        role: "switch",
                        checked: d.notificacoes,
                        onchange: move |_| {
                            let mut prefs = draft.write();
                            prefs.notificacoes = !prefs.notificacoes;
                        },
                    }
                    "Notificações"
                }
                button { r#type: "submit", "Salvar" }
            }
        }

        if let Some(msg) = notice() {
            Snackbar { message: msg, on_close: move |_| notice.set(None) }
        }
    }
}
