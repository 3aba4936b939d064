//! Casos page: the user's cases with filters, creation and deletion.

use chrono::{NaiveDate, TimeZone, Utc};
use dioxus::prelude::*;
use odonto_model::{Caso, CasoStatus, Localizacao, NovoCaso, Role, ValidationError, TIPOS_CASO};
use tracing::info;

use crate::app::components::{
    ConfirmDialog, EmptyMessage, ErrorBanner, Loading, Pagination, Snackbar, StatusBadge,
};
use crate::app::context::use_app;
use crate::app::Route;
use crate::auth::{can_delete_case, visible_cases};
use crate::collection::{
    date_in_range, equals, parse_date_input, text_contains, CollectionView, FilterSet,
};

/// Filters shared by the case lists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CasoFilters {
    /// Matches título, local and descrição
    pub texto: String,
    pub status: Option<CasoStatus>,
    pub tipo: Option<String>,
    pub de: Option<NaiveDate>,
    pub ate: Option<NaiveDate>,
}

impl FilterSet<Caso> for CasoFilters {
    fn matches(&self, caso: &Caso) -> bool {
        (text_contains(&caso.titulo, &self.texto)
            || text_contains(&caso.local_do_caso, &self.texto)
            || text_contains(&caso.descricao, &self.texto))
            && equals(&caso.status, self.status.as_ref())
            && equals(&caso.tipo, self.tipo.as_ref())
            && date_in_range(caso.data, self.de, self.ate)
    }

    fn is_active(&self) -> bool {
        !self.texto.trim().is_empty()
            || self.status.is_some()
            || self.tipo.is_some()
            || self.de.is_some()
            || self.ate.is_some()
    }
}

/// Raw inputs of the new-case form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CasoForm {
    pub titulo: String,
    pub tipo: String,
    pub descricao: String,
    pub data: String,
    pub local_do_caso: String,
    pub latitude: String,
    pub longitude: String,
}

fn parse_coordinate(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| ValidationError::Invalid {
            field,
            reason: "informe um número".to_string(),
        })
}

impl CasoForm {
    /// Build the create payload; nothing is sent when this fails
    pub fn to_payload(&self, perito_responsavel: Option<String>) -> Result<NovoCaso, ValidationError> {
        if self.data.trim().is_empty() {
            return Err(ValidationError::Required("data"));
        }
        let day = parse_date_input(&self.data).ok_or_else(|| ValidationError::Invalid {
            field: "data",
            reason: "use o formato AAAA-MM-DD".to_string(),
        })?;
        let localizacao = match (self.latitude.trim(), self.longitude.trim()) {
            ("", "") => None,
            (lat, lon) => Some(Localizacao {
                latitude: parse_coordinate("latitude", lat)?,
                longitude: parse_coordinate("longitude", lon)?,
            }),
        };
        let payload = NovoCaso {
            titulo: self.titulo.trim().to_string(),
            tipo: self.tipo.clone(),
            descricao: self.descricao.trim().to_string(),
            data: Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN)),
            status: CasoStatus::EmAndamento,
            perito_responsavel,
            local_do_caso: self.local_do_caso.trim().to_string(),
            localizacao,
        };
        payload.validate()?;
        Ok(payload)
    }
}

/// Filter inputs bound to a case collection
#[component]
pub fn CasoFilterBar(view: Signal<CollectionView<Caso, CasoFilters>>) -> Element {
    let mut view = view;
    let filters = view.read().filters().clone();
    let status_value = filters.status.map(|s| s.as_str()).unwrap_or_default();
    let tipo_value = filters.tipo.clone().unwrap_or_default();
    let de_value = filters.de.map(|d| d.to_string()).unwrap_or_default();
    let ate_value = filters.ate.map(|d| d.to_string()).unwrap_or_default();

    rsx! {
        div { class: "grid grid-cols-1 md:grid-cols-5 gap-2",
            input {
                r#type: "search",
                placeholder: "Buscar por título, local ou descrição",
                value: "{filters.texto}",
                oninput: move |e| view.write().update_filters(|f| f.texto = e.value()),
            }
            select {
                value: "{status_value}",
                onchange: move |e| view.write().update_filters(|f| f.status = CasoStatus::parse(&e.value())),
                option { value: "", "Todos os status" }
                for status in CasoStatus::ALL {
                    option { key: "{status.as_str()}", value: status.as_str(), "{status.label()}" }
                }
            }
            select {
                value: "{tipo_value}",
                onchange: move |e| {
                    let value = e.value();
                    view.write().update_filters(|f| f.tipo = (!value.is_empty()).then_some(value));
                },
                option { value: "", "Todos os tipos" }
                for tipo in TIPOS_CASO {
                    option { key: "{tipo}", value: tipo, "{tipo}" }
                }
            }
            input {
                r#type: "date",
                title: "De",
                value: "{de_value}",
                onchange: move |e| view.write().update_filters(|f| f.de = parse_date_input(&e.value())),
            }
            input {
                r#type: "date",
                title: "Até",
                value: "{ate_value}",
                onchange: move |e| view.write().update_filters(|f| f.ate = parse_date_input(&e.value())),
            }
        }
    }
}

#[component]
pub fn Casos() -> Element {
    let ctx = use_app();
    let mut view = use_signal({
        let page_size = ctx.page_size();
        move || CollectionView::new(CasoFilters::default(), page_size)
    });
    let mut error = use_signal(|| None::<String>);
    let mut notice = use_signal(|| None::<String>);
    let mut show_form = use_signal(|| false);
    let mut form = use_signal(CasoForm::default);
    let mut form_error = use_signal(|| None::<String>);
    let mut saving = use_signal(|| false);
    let mut pending_delete = use_signal(|| None::<Caso>);

    let load_ctx = ctx.clone();
    let load = use_callback(move |_: ()| {
        let backend = load_ctx.backend.clone();
        let user = load_ctx.user();
        spawn(async move {
            match backend.list_casos().await {
                Ok(all) => {
                    let mine = user.map(|u| visible_cases(&u, all)).unwrap_or_default();
                    view.write().set_items(mine);
                    error.set(None);
                }
                Err(e) => error.set(Some(e.to_string())),
            }
        });
    });
    use_hook(move || load.call(()));

    let Some(user) = ctx.user() else {
        return rsx! { Loading {} };
    };
    let can_create = matches!(user.role, Role::Admin | Role::Perito);
    let can_delete = can_delete_case(&user);

    let create_ctx = ctx.clone();
    let creator_id = user.id.clone();
    let creator_role = user.role;
    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        let perito = (creator_role == Role::Perito).then(|| creator_id.clone());
        let payload = match form.read().to_payload(perito) {
            Ok(p) => p,
            Err(e) => {
                form_error.set(Some(e.to_string()));
                return;
            }
        };
        form_error.set(None);
        saving.set(true);
        let backend = create_ctx.backend.clone();
        spawn(async move {
            match backend.create_caso(&payload).await {
                Ok(_) => {
                    info!(titulo = %payload.titulo, "Case created");
                    form.set(CasoForm::default());
                    show_form.set(false);
                    notice.set(Some("Caso criado com sucesso.".to_string()));
                    load.call(());
                }
                Err(e) => form_error.set(Some(e.to_string())),
            }
            saving.set(false);
        });
    };

    let delete_ctx = ctx.clone();
    let confirm_delete = move |_: ()| {
        let Some(caso) = pending_delete.take() else {
            return;
        };
        let backend = delete_ctx.backend.clone();
        spawn(async move {
            match backend.delete_caso(&caso.id).await {
                Ok(()) => {
                    notice.set(Some(format!("Caso \"{}\" excluído.", caso.titulo)));
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
    let counts = format!("{} de {}", current.filtered_count(), current.total());
    drop(current);
    let f = form.read().clone();

    rsx! {
        div { class: "flex items-center justify-between mb-4",
            h1 { class: "text-2xl font-bold", "Casos" }
            div { class: "flex gap-2",
                button { class: "outline", r#type: "button", onclick: move |_| load.call(()), "Atualizar" }
                if can_create {
                    button { r#type: "button", onclick: move |_| show_form.toggle(),
                        if show_form() { "Fechar" } else { "Novo caso" }
                    }
                }
            }
        }

        if let Some(msg) = error() {
            ErrorBanner { message: msg, on_retry: move |_| load.call(()) }
        }

        if show_form() {
            article { id: "novo-caso",
                header { strong { "Novo caso" } }
                form { onsubmit: submit,
                    if let Some(msg) = form_error() {
                        div { class: "banner-error", role: "alert", "{msg}" }
                    }
                    div { class: "grid md:grid-cols-2 gap-2",
                        label { "Título"
                            input { value: "{f.titulo}", oninput: move |e| form.write().titulo = e.value() }
                        }
                        label { "Tipo"
                            select {
                                value: "{f.tipo}",
                                onchange: move |e| form.write().tipo = e.value(),
                                option { value: "", "Selecione" }
                                for tipo in TIPOS_CASO {
                                    option { key: "{tipo}", value: tipo, "{tipo}" }
                                }
                            }
                        }
                        label { "Data"
                            input { r#type: "date", value: "{f.data}", oninput: move |e| form.write().data = e.value() }
                        }
                        label { "Local do caso"
                            input { value: "{f.local_do_caso}", oninput: move |e| form.write().local_do_caso = e.value() }
                        }
                        label { "Latitude (opcional)"
                            input { value: "{f.latitude}", oninput: move |e| form.write().latitude = e.value() }
                        }
                        label { "Longitude (opcional)"
                            input { value: "{f.longitude}", oninput: move |e| form.write().longitude = e.value() }
                        }
                    }
                    label { "Descrição"
                        textarea { value: "{f.descricao}", oninput: move |e| form.write().descricao = e.value() }
                    }
                    button { r#type: "submit", disabled: saving(), aria_busy: if saving() { "true" } else { "false" }, "Salvar" }
                }
            }
        }

        CasoFilterBar { view }
        small { "{counts}" }

        if !loaded && error().is_none() {
            Loading {}
        } else if let Some(state) = empty {
            EmptyMessage { state, noun: "casos".to_string() }
        } else {
            table { class: "striped",
                thead {
                    tr {
                        th { "Título" }
                        th { "Tipo" }
                        th { "Data" }
                        th { "Local" }
                        th { "Status" }
                        th { "" }
                    }
                }
                tbody {
                    for caso in items {
                        tr { key: "{caso.id}",
                            td { Link { to: Route::VerCaso { id: caso.id.clone() }, "{caso.titulo}" } }
                            td { "{caso.tipo}" }
                            td { {caso.data.format("%d/%m/%Y").to_string()} }
                            td { "{caso.local_do_caso}" }
                            td { StatusBadge { status: caso.status } }
                            td {
                                if can_delete {
                                    button {
                                        class: "outline secondary",
                                        r#type: "button",
                                        onclick: {
                                            let caso = caso.clone();
                                            move |_| pending_delete.set(Some(caso.clone()))
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

        if let Some(caso) = pending_delete() {
            ConfirmDialog {
                title: "Excluir caso".to_string(),
                message: format!("Excluir \"{}\"? Esta ação não pode ser desfeita.", caso.titulo),
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

    fn caso(id: &str, titulo: &str, tipo: &str, data: &str, status: &str) -> Caso {
        serde_json::from_value(serde_json::json!({
            "_id": id, "titulo": titulo, "tipo": tipo, "data": data, "status": status,
            "localDoCaso": "Recife", "criadoPor": "u1"
        }))
        .unwrap()
    }

    #[test]
    fn test_filters_are_a_conjunction() {
        let cases = vec![
            caso("1", "Acidente BR-232", "Acidente", "2024-01-10", "em andamento"),
            caso("2", "Ossada", "Identificação", "2024-02-10", "finalizado"),
            caso("3", "Acidente moto", "Acidente", "2024-03-10", "finalizado"),
        ];
        let mut view = CollectionView::new(CasoFilters::default(), 10);
        view.set_items(cases);

        view.update_filters(|f| f.tipo = Some("Acidente".to_string()));
        assert_eq!(view.filtered_count(), 2);
        view.update_filters(|f| f.status = Some(CasoStatus::Finalizado));
        assert_eq!(view.page_items()[0].id, "3");
        view.update_filters(|f| f.ate = NaiveDate::from_ymd_opt(2024, 2, 28));
        assert_eq!(view.filtered_count(), 0);
        assert!(view.filters().is_active());
    }

    #[test]
    fn test_text_filter_matches_location() {
        let c = caso("1", "Ossada", "Identificação", "2024-02-10", "arquivado");
        let filters = CasoFilters {
            texto: "recife".to_string(),
            ..Default::default()
        };
        assert!(filters.matches(&c));
        assert!(!CasoFilters::default().is_active());
    }

    #[test]
    fn test_form_requires_fields_before_sending() {
        let mut form = CasoForm {
            titulo: "Caso".to_string(),
            tipo: "Acidente".to_string(),
            local_do_caso: "Olinda".to_string(),
            ..Default::default()
        };
        assert_eq!(form.to_payload(None), Err(ValidationError::Required("data")));

        form.data = "2024-05-01".to_string();
        form.latitude = "-8,05".to_string();
        assert!(matches!(
            form.to_payload(None),
            Err(ValidationError::Invalid { field: "longitude", .. })
        ));

        form.longitude = "-34.9".to_string();
        let payload = form.to_payload(Some("u2".to_string())).unwrap();
        assert_eq!(payload.status, CasoStatus::EmAndamento);
        assert_eq!(payload.perito_responsavel.as_deref(), Some("u2"));
        assert_eq!(payload.localizacao.unwrap().latitude, -8.05);
        assert_eq!(payload.data.date_naive().to_string(), "2024-05-01");
    }

    #[test]
    fn test_form_missing_title() {
        let form = CasoForm {
            data: "2024-05-01".to_string(),
            tipo: "Acidente".to_string(),
            ..Default::default()
        };
        assert_eq!(form.to_payload(None), Err(ValidationError::Required("titulo")));
    }
}
