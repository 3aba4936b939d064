//! Usuários page (admin only): list, create, edit and delete accounts.

use dioxus::prelude::*;
use odonto_model::{NovoUsuario, Role, Usuario};
use tracing::info;

use crate::app::components::{
    ConfirmDialog, EmptyMessage, ErrorBanner, Loading, Pagination, Snackbar,
};
use crate::app::context::use_app;
use crate::collection::{equals, text_contains, CollectionView, FilterSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsuarioFilters {
    /// Matches name, e-mail and matrícula
    pub texto: String,
    pub role: Option<Role>,
}

impl FilterSet<Usuario> for UsuarioFilters {
    fn matches(&self, user: &Usuario) -> bool {
        (text_contains(&user.name, &self.texto)
            || text_contains(&user.email, &self.texto)
            || text_contains(&user.matricula, &self.texto))
            && equals(&user.role, self.role.as_ref())
    }

    fn is_active(&self) -> bool {
        !self.texto.trim().is_empty() || self.role.is_some()
    }
}

/// Which account the form is editing
#[derive(Debug, Clone, PartialEq)]
enum FormMode {
    Closed,
    Creating,
    Editing(String),
}

/// Drop an empty password so updates keep the current one
fn normalized(mut form: NovoUsuario) -> NovoUsuario {
    form.name = form.name.trim().to_string();
    form.email = form.email.trim().to_string();
    form.matricula = form.matricula.trim().to_string();
    if form.password.as_deref().is_some_and(str::is_empty) {
        form.password = None;
    }
    form
}

#[component]
pub fn Usuarios() -> Element {
    let ctx = use_app();
    let mut view = use_signal({
        let page_size = ctx.page_size();
        move || CollectionView::new(UsuarioFilters::default(), page_size)
    });
    let mut error = use_signal(|| None::<String>);
    let mut notice = use_signal(|| None::<String>);
    let mut mode = use_signal(|| FormMode::Closed);
    let mut form = use_signal(NovoUsuario::default);
    let mut form_error = use_signal(|| None::<String>);
    let mut saving = use_signal(|| false);
    let mut pending_delete = use_signal(|| None::<Usuario>);

    let backend = ctx.backend.clone();
    let load = use_callback(move |_: ()| {
        let backend = backend.clone();
        spawn(async move {
            match backend.list_users().await {
                Ok(users) => {
                    view.write().set_items(users);
                    error.set(None);
                }
                Err(e) => error.set(Some(e.to_string())),
            }
        });
    });
    use_hook(move || load.call(()));

    let own_id = ctx.user().map(|u| u.id).unwrap_or_default();

    let backend = ctx.backend.clone();
    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        let current_mode = mode();
        let creating = current_mode == FormMode::Creating;
        let payload = normalized(form());
        if let Err(e) = payload.validate(creating) {
            form_error.set(Some(e.to_string()));
            return;
        }
        form_error.set(None);
        saving.set(true);
        let backend = backend.clone();
        spawn(async move {
            let result = match &current_mode {
                FormMode::Editing(id) => backend.update_user(id, &payload).await,
                _ => backend.create_user(&payload).await,
            };
            match result {
                Ok(()) => {
                    info!(email = %payload.email, creating, "User saved");
                    mode.set(FormMode::Closed);
                    form.set(NovoUsuario::default());
                    notice.set(Some(if creating {
                        "Usuário criado.".to_string()
                    } else {
                        "Usuário atualizado.".to_string()
                    }));
                    load.call(());
                }
                Err(e) => form_error.set(Some(e.to_string())),
            }
            saving.set(false);
        });
    };

    let backend = ctx.backend.clone();
    let confirm_delete = move |_: ()| {
        let Some(user) = pending_delete.take() else {
            return;
        };
        let backend = backend.clone();
        spawn(async move {
            match backend.delete_user(&user.id).await {
                Ok(()) => {
                    notice.set(Some(format!("Usuário {} excluído.", user.name)));
                    load.call(());
                }
                Err(e) => error.set(Some(e.to_string())),
            }
        });
    };

    let current = view.read();
    let items = current.page_items();
    let empty = current.empty_state();
    let page = current.page();
    let page_count = current.page_count();
    let loaded = current.is_loaded();
    let filters = current.filters().clone();
    drop(current);
    let f = form();
    let password_value = f.password.clone().unwrap_or_default();
    let role_filter = filters.role.map(|r| r.as_str()).unwrap_or_default();

    rsx! {
        div { class: "flex items-center justify-between mb-4",
            h1 { class: "text-2xl font-bold", "Usuários" }
            div { class: "flex gap-2",
                button { class: "outline", r#type: "button", onclick: move |_| load.call(()), "Atualizar" }
                button {
                    r#type: "button",
                    onclick: move |_| {
                        form.set(NovoUsuario::default());
                        form_error.set(None);
                        mode.set(FormMode::Creating);
                    },
                    "Novo usuário"
                }
            }
        }

        if let Some(msg) = error() {
            ErrorBanner { message: msg, on_retry: move |_| load.call(()) }
        }

        if mode() != FormMode::Closed {
            article { id: "usuario-form",
                header {
                    strong { if mode() == FormMode::Creating { "Novo usuário" } else { "Editar usuário" } }
                }
                form { onsubmit: submit,
                    if let Some(msg) = form_error() {
                        div { class: "banner-error", role: "alert", "{msg}" }
                    }
                    div { class: "grid md:grid-cols-2 gap-2",
                        label { "Nome"
                            input { value: "{f.name}", oninput: move |e| form.write().name = e.value() }
                        }
                        label { "E-mail"
                            input { r#type: "email", value: "{f.email}", oninput: move |e| form.write().email = e.value() }
                        }
                        label { "Matrícula"
                            input { value: "{f.matricula}", oninput: move |e| form.write().matricula = e.value() }
                        }
                        label { "Perfil"
                            select {
                                value: f.role.as_str(),
                                onchange: move |e| {
                                    if let Some(role) = Role::parse(&e.value()) {
                                        form.write().role = role;
                                    }
                                },
                                for role in Role::ALL {
                                    option { key: "{role}", value: role.as_str(), "{role.label()}" }
                                }
                            }
                        }
                        label {
                            if mode() == FormMode::Creating { "Senha" } else { "Nova senha (opcional)" }
                            input {
                                r#type: "password",
                                autocomplete: "new-password",
                                value: "{password_value}",
                                oninput: move |e| form.write().password = Some(e.value()),
                            }
                        }
                    }
                    div { class: "flex gap-2",
                        button { r#type: "submit", disabled: saving(), "Salvar" }
                        button {
                            class: "secondary",
                            r#type: "button",
                            onclick: move |_| mode.set(FormMode::Closed),
                            "Cancelar"
                        }
                    }
                }
            }
        }

        div { class: "grid grid-cols-1 md:grid-cols-3 gap-2",
            input {
                r#type: "search",
                placeholder: "Buscar por nome, e-mail ou matrícula",
                value: "{filters.texto}",
                oninput: move |e| view.write().update_filters(|f| f.texto = e.value()),
            }
            select {
                value: role_filter,
                onchange: move |e| view.write().update_filters(|f| f.role = Role::parse(&e.value())),
                option { value: "", "Todos os perfis" }
                for role in Role::ALL {
                    option { key: "{role}", value: role.as_str(), "{role.label()}" }
                }
            }
        }

        if !loaded && error().is_none() {
            Loading {}
        } else if let Some(state) = empty {
            EmptyMessage { state, noun: "usuários".to_string() }
        } else {
            table { class: "striped",
                thead {
                    tr {
                        th { "Nome" }
                        th { "E-mail" }
                        th { "Matrícula" }
                        th { "Perfil" }
                        th { "" }
                    }
                }
                tbody {
                    for user in items {
                        tr { key: "{user.id}",
                            td { "{user.name}" }
                            td { "{user.email}" }
                            td { "{user.matricula}" }
                            td { "{user.role.label()}" }
                            td { class: "flex gap-2",
                                button {
                                    class: "outline",
                                    r#type: "button",
                                    onclick: {
                                        let user = user.clone();
                                        move |_| {
                                            form.set(NovoUsuario::from(&user));
                                            form_error.set(None);
                                            mode.set(FormMode::Editing(user.id.clone()));
                                        }
                                    },
                                    "Editar"
                                }
                                if user.id != own_id {
                                    button {
                                        class: "outline secondary",
                                        r#type: "button",
                                        onclick: {
                                            let user = user.clone();
                                            move |_| pending_delete.set(Some(user.clone()))
                                        },
                                        "Excluir"
                                    }
                                }
                            }
                        }
                    }
                }
            }
            Pagination { page, page_count, on_change: move |p| view.write().go_to(p) }
        }

        if let Some(user) = pending_delete() {
            ConfirmDialog {
                title: "Excluir usuário".to_string(),
                message: format!("Excluir a conta de {} ({})?", user.name, user.email),
                confirm_label: "Excluir".to_string(),
                on_confirm: confirm_delete,
                on_cancel: move |_| pending_delete.set(None),
            }
        }

        if let Some(msg) = notice() {
            Snackbar { message: msg, on_close: move |_| notice.set(None) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str, role: Role) -> Usuario {
        Usuario {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{id}@pericia.gov.br"),
            role,
            matricula: format!("M-{id}"),
        }
    }

    #[test]
    fn test_user_filters() {
        let mut view = CollectionView::new(UsuarioFilters::default(), 10);
        view.set_items(vec![
            user("u1", "Ana", Role::Admin),
            user("u2", "Bruno", Role::Perito),
            user("u3", "Carla", Role::Perito),
        ]);
        view.update_filters(|f| f.role = Some(Role::Perito));
        assert_eq!(view.filtered_count(), 2);
        view.update_filters(|f| f.texto = "m-u3".to_string());
        assert_eq!(view.page_items()[0].name, "Carla");
    }

    #[test]
    fn test_empty_password_is_dropped_on_update() {
        let form = NovoUsuario {
            name: " Ana ".to_string(),
            email: "ana@pericia.gov.br".to_string(),
            role: Role::Perito,
            matricula: "1".to_string(),
            password: Some(String::new()),
        };
        let payload = normalized(form);
        assert_eq!(payload.password, None);
        assert_eq!(payload.name, "Ana");
        assert!(payload.validate(false).is_ok());
        assert!(payload.validate(true).is_err());
    }
}
