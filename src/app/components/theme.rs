//! Theme switcher component for claro/escuro/preto modes.

use dioxus::prelude::*;

use crate::app::context::use_app;
use crate::preferences::Tema;

/// Theme switcher with light, dark, and black (OLED) options.
/// Persists through the `configuracoes` preferences.
#[component]
pub fn ThemeSwitcher() -> Element {
    let ctx = use_app();
    let current = ctx.preferences.read().tema;

    rsx! {
        div { class: "theme-switcher",
            for tema in Tema::ALL {
                button {
                    key: "{tema.label()}",
                    class: if current == tema { "active" } else { "" },
                    onclick: {
                        let ctx = ctx.clone();
                        move |_| {
                            let mut prefs = ctx.preferences.peek().clone();
                            prefs.tema = tema;
                            ctx.save_preferences(prefs);
                        }
                    },
                    "{tema.label()}"
                }
            }
        }
    }
}
