//! Modal confirmation for destructive or lossy actions.

use dioxus::prelude::*;

#[component]
pub fn ConfirmDialog(
    title: String,
    message: String,
    #[props(default = "Confirmar".to_string())] confirm_label: String,
    on_confirm: EventHandler<()>,
    on_cancel: EventHandler<()>,
) -> Element {
    rsx! {
        dialog { open: true,
            article {
                header { h3 { "{title}" } }
                p { "{message}" }
                footer {
                    button {
                        class: "secondary",
                        r#type: "button",
                        onclick: move |_| on_cancel.call(()),
                        "Cancelar"
                    }
                    button {
                        r#type: "button",
                        onclick: move |_| on_confirm.call(()),
                        "{confirm_label}"
                    }
                }
            }
        }
    }
}
