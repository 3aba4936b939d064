//! Case detail: inline editing, victims, reports and prediction.

use chrono::{DateTime, TimeZone, Utc};
use dioxus::prelude::*;
use odonto_model::{
    CasoStatus, Laudo, NovaVitima, NovoCaso, NovoLaudo, Role, ValidationError, Vitima,
    CORES_ETNIA, GENEROS, TIPOS_CASO,
};
use tracing::{info, warn};

use crate::app::api::{IssueError, ReportFormat};
use crate::app::components::{
    ConfirmDialog, EmptyMessage, ErrorBanner, Loading, PredictionPanel, Snackbar, StatusBadge,
};
use crate::app::context::use_app;
use crate::app::download::save_file;
use crate::app::Route;
use crate::auth::can_issue_report;
use crate::case_editor::CaseEditor;
use crate::collection::{parse_date_input, EmptyState};

/// Raw inputs of the new-victim form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VitimaForm {
    pub nic: String,
    pub nome: String,
    pub idade: String,
    pub genero: String,
    pub cor_etnia: String,
    pub documento: String,
    pub endereco: String,
}

impl VitimaForm {
    pub fn to_payload(&self, caso_id: &str) -> Result<NovaVitima, ValidationError> {
        let idade = match self.idade.trim() {
            "" => None,
            raw => Some(raw.parse::<u32>().map_err(|_| ValidationError::Invalid {
                field: "idade",
                reason: "informe um número inteiro".to_string(),
            })?),
        };
        let payload = NovaVitima {
            nic: self.nic.trim().to_string(),
            nome: self.nome.trim().to_string(),
            idade,
            genero: self.genero.clone(),
            cor_etnia: self.cor_etnia.clone(),
            documento: self.documento.trim().to_string(),
            endereco: self.endereco.trim().to_string(),
            caso: caso_id.to_string(),
        };
        payload.validate()?;
        Ok(payload)
    }
}

/// `YYYY-MM-DD` for a date input
fn date_input_value(value: DateTime<Utc>) -> String {
    value.date_naive().to_string()
}

fn set_date(buffer: &mut NovoCaso, raw: &str) {
    if let Some(day) = parse_date_input(raw) {
        buffer.data = Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN));
    }
}

#[component]
pub fn VerCaso(id: String) -> Element {
    let ctx = use_app();
    let user = ctx.user();
    let mut editor = use_signal(|| None::<CaseEditor>);
    let mut load_error = use_signal(|| None::<String>);
    let mut notice = use_signal(|| None::<String>);

    let backend = ctx.backend.clone();
    let caso_id = id.clone();
    let load = use_callback(move |_: ()| {
        let backend = backend.clone();
        let caso_id = caso_id.clone();
        spawn(async move {
            match backend.get_caso(&caso_id).await {
                Ok(caso) => {
                    let current = editor.peek().as_ref().map(|e| e.is_editing()).unwrap_or(false);
                    if !current {
                        editor.set(Some(CaseEditor::new(caso)));
                    }
                    load_error.set(None);
                }
                Err(e) => load_error.set(Some(e.to_string())),
            }
        });
    });
    use_hook(move || load.call(()));

    let Some(current) = editor() else {
        return rsx! {
            if let Some(msg) = load_error() {
                ErrorBanner { message: msg, on_retry: move |_| load.call(()) }
            } else {
                Loading {}
            }
        };
    };
    let Some(user) = user else {
        return rsx! { Loading {} };
    };

    let caso = current.caso().clone();
    let can_edit = current.can_edit(&user);
    let can_report = can_issue_report(&user, &caso);
    let charts_allowed = matches!(user.role, Role::Admin | Role::Perito);

    let start_edit = {
        let user = user.clone();
        move |_: MouseEvent| {
            let mut result = Ok(());
            editor.with_mut(|e| {
                if let Some(e) = e.as_mut() {
                    result = e.begin_edit(&user);
                }
            });
            if let Err(e) = result {
                notice.set(Some(e.to_string()));
            }
        }
    };

    let backend = ctx.backend.clone();
    let caso_key = id.clone();
    let save = move |evt: FormEvent| {
        evt.prevent_default();
        let mut payload = None;
        editor.with_mut(|e| {
            if let Some(e) = e.as_mut() {
                payload = e.begin_save().ok();
            }
        });
        let Some(payload) = payload else {
            return;
        };
        let backend = backend.clone();
        let caso_key = caso_key.clone();
        spawn(async move {
            match backend.update_caso(&caso_key, &payload).await {
                Ok(updated) => {
                    info!(caso = %caso_key, "Case updated");
                    if let Some(e) = editor.write().as_mut() {
                        e.save_succeeded(updated);
                    }
                    notice.set(Some("Caso atualizado.".to_string()));
                }
                Err(err) => {
                    warn!(caso = %caso_key, "Case update failed: {err}");
                    if let Some(e) = editor.write().as_mut() {
                        e.save_failed(err.to_string());
                    };
                }
            }
        });
    };

    let edit = move |change: Box<dyn FnOnce(&mut NovoCaso)>| {
        let mut editor = editor;
        if let Some(e) = editor.write().as_mut() {
            e.edit(change);
        };
    };

    let on_finalized = move |_: ()| {
        if let Some(e) = editor.write().as_mut() {
            e.finalize();
        };
        notice.set(Some("Laudo emitido. O caso foi finalizado.".to_string()));
    };

    rsx! {
        div { class: "mb-4",
            Link { to: Route::Casos {}, "← Voltar aos casos" }
        }

        if let Some(buffer) = current.buffer().cloned() {
            article {
                header { strong { "Editar caso" } }
                form { onsubmit: save,
                    if let Some(msg) = current.error() {
                        div { class: "banner-error", role: "alert", "{msg}" }
                    }
                    label { "Título"
                        input {
                            value: "{buffer.titulo}",
                            oninput: move |e| { let v = e.value(); edit(Box::new(move |b: &mut NovoCaso| b.titulo = v)) },
                        }
                    }
                    div { class: "grid grid-cols-1 md:grid-cols-3 gap-2",
                        label { "Tipo"
                            select {
                                value: "{buffer.tipo}",
                                onchange: move |e| { let v = e.value(); edit(Box::new(move |b: &mut NovoCaso| b.tipo = v)) },
                                for tipo in TIPOS_CASO {
                                    option { key: "{tipo}", value: tipo, "{tipo}" }
                                }
                            }
                        }
                        label { "Status"
                            select {
                                value: buffer.status.as_str(),
                                onchange: move |e| {
                                    if let Some(status) = CasoStatus::parse(&e.value()) {
                                        edit(Box::new(move |b: &mut NovoCaso| b.status = status));
                                    }
                                },
                                for status in CasoStatus::ALL {
                                    option { key: "{status.as_str()}", value: status.as_str(), "{status.label()}" }
                                }
                            }
                        }
                        label { "Data"
                            input {
                                r#type: "date",
                                value: date_input_value(buffer.data),
                                onchange: move |e| { let v = e.value(); edit(Box::new(move |b: &mut NovoCaso| set_date(b, &v))) },
                            }
                        }
                    }
                    label { "Local"
                        input {
                            value: "{buffer.local_do_caso}",
                            oninput: move |e| { let v = e.value(); edit(Box::new(move |b: &mut NovoCaso| b.local_do_caso = v)) },
                        }
                    }
                    label { "Descrição"
                        textarea {
                            value: "{buffer.descricao}",
                            oninput: move |e| { let v = e.value(); edit(Box::new(move |b: &mut NovoCaso| b.descricao = v)) },
                        }
                    }
                    div { class: "flex gap-2",
                        button { r#type: "submit", disabled: current.is_saving(), "Salvar" }
                        button {
                            class: "secondary",
                            r#type: "button",
                            disabled: current.is_saving(),
                            onclick: move |_| {
                                if let Some(e) = editor.write().as_mut() {
                                    e.cancel();
                                };
                            },
                            "Cancelar"
                        }
                    }
                }
            }
        } else {
            article {
                header { class: "flex items-center justify-between",
                    div {
                        h1 { class: "text-2xl font-bold", "{caso.titulo}" }
                        StatusBadge { status: caso.status }
                    }
                    if can_edit {
                        button { class: "outline", r#type: "button", onclick: start_edit, "Editar" }
                    }
                }
                dl { class: "grid grid-cols-2 gap-2",
                    dt { "Tipo" }
                    dd { "{caso.tipo}" }
                    dt { "Data" }
                    dd { {caso.data.format("%d/%m/%Y").to_string()} }
                    dt { "Local" }
                    dd { "{caso.local_do_caso}" }
                    if let Some(loc) = caso.localizacao {
                        dt { "Coordenadas" }
                        dd { {format!("{:.5}, {:.5}", loc.latitude, loc.longitude)} }
                    }
                    dt { "Criado por" }
                    dd { "{caso.criado_por.label()}" }
                    if let Some(perito) = caso.perito_responsavel.as_ref() {
                        dt { "Perito responsável" }
                        dd { "{perito.label()}" }
                    }
                }
                p { "{caso.descricao}" }
                if caso.is_finalizado() {
                    small { "Caso finalizado: edição bloqueada." }
                }
            }
        }

        Vitimas { caso_id: id.clone(), can_edit, charts_allowed }

        Laudos { caso_id: id.clone(), update: caso.to_update(), can_report, on_finalized }

        RelatorioPanel { caso_id: id.clone() }

        PredictionPanel { tipo: caso.tipo.clone(), local_do_caso: caso.local_do_caso.clone() }

        if let Some(msg) = notice() {
            Snackbar { message: msg, on_close: move |_| notice.set(None) }
        }
    }
}

#[component]
fn Vitimas(caso_id: String, can_edit: bool, charts_allowed: bool) -> Element {
    let ctx = use_app();
    let mut vitimas = use_signal(|| None::<Vec<Vitima>>);
    let mut error = use_signal(|| None::<String>);
    let mut form = use_signal(VitimaForm::default);
    let mut form_error = use_signal(|| None::<String>);
    let mut show_form = use_signal(|| false);
    let mut pending_delete = use_signal(|| None::<Vitima>);

    let backend = ctx.backend.clone();
    let id = caso_id.clone();
    let load = use_callback(move |_: ()| {
        let backend = backend.clone();
        let id = id.clone();
        spawn(async move {
            match backend.list_vitimas(&id).await {
                Ok(list) => {
                    vitimas.set(Some(list));
                    error.set(None);
                }
                Err(e) => error.set(Some(e.to_string())),
            }
        });
    });
    use_hook(move || load.call(()));

    let backend = ctx.backend.clone();
    let id = caso_id.clone();
    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        let payload = match form.read().to_payload(&id) {
            Ok(p) => p,
            Err(e) => {
                form_error.set(Some(e.to_string()));
                return;
            }
        };
        form_error.set(None);
        let backend = backend.clone();
        spawn(async move {
            match backend.create_vitima(&payload).await {
                Ok(_) => {
                    info!(nic = %payload.nic, "Victim created");
                    form.set(VitimaForm::default());
                    show_form.set(false);
                    load.call(());
                }
                Err(e) => form_error.set(Some(e.to_string())),
            }
        });
    };

    let backend = ctx.backend.clone();
    let confirm_delete = move |_: ()| {
        let Some(vitima) = pending_delete.take() else {
            return;
        };
        let backend = backend.clone();
        spawn(async move {
            match backend.delete_vitima(&vitima.id).await {
                Ok(()) => load.call(()),
                Err(e) => error.set(Some(e.to_string())),
            }
        });
    };

    let f = form();

    rsx! {
        section { id: "vitimas",
            div { class: "flex items-center justify-between",
                h2 { class: "text-xl font-semibold", "Vítimas" }
                if can_edit {
                    button {
                        class: "outline",
                        r#type: "button",
                        onclick: move |_| show_form.set(!show_form()),
                        if show_form() { "Fechar" } else { "Nova vítima" }
                    }
                }
            }
            if let Some(msg) = error() {
                ErrorBanner { message: msg, on_retry: move |_| load.call(()) }
            }
            if show_form() {
                form { onsubmit: submit,
                    if let Some(msg) = form_error() {
                        div { class: "banner-error", role: "alert", "{msg}" }
                    }
                    div { class: "grid grid-cols-1 md:grid-cols-3 gap-2",
                        label { "NIC"
                            input { required: true, value: "{f.nic}", oninput: move |e| form.write().nic = e.value() }
                        }
                        label { "Nome"
                            input { value: "{f.nome}", oninput: move |e| form.write().nome = e.value() }
                        }
                        label { "Idade"
                            input { r#type: "number", min: "0", value: "{f.idade}", oninput: move |e| form.write().idade = e.value() }
                        }
                        label { "Gênero"
                            select {
                                value: "{f.genero}",
                                onchange: move |e| form.write().genero = e.value(),
                                option { value: "", "Não informado" }
                                for g in GENEROS {
                                    option { key: "{g}", value: g, "{g}" }
                                }
                            }
                        }
                        label { "Cor/etnia"
                            select {
                                value: "{f.cor_etnia}",
                                onchange: move |e| form.write().cor_etnia = e.value(),
                                option { value: "", "Não informada" }
                                for c in CORES_ETNIA {
                                    option { key: "{c}", value: c, "{c}" }
                                }
                            }
                        }
                        label { "Documento"
                            input { value: "{f.documento}", oninput: move |e| form.write().documento = e.value() }
                        }
                    }
                    label { "Endereço"
                        input { value: "{f.endereco}", oninput: move |e| form.write().endereco = e.value() }
                    }
                    button { r#type: "submit", "Adicionar vítima" }
                }
            }
            match vitimas() {
                None => rsx! { Loading {} },
                Some(list) if list.is_empty() => rsx! {
                    EmptyMessage { state: EmptyState::NoData, noun: "vítimas".to_string() }
                },
                Some(list) => rsx! {
                    table { class: "striped",
                        thead {
                            tr {
                                th { "NIC" }
                                th { "Nome" }
                                th { "Idade" }
                                th { "Gênero" }
                                th { "" }
                            }
                        }
                        tbody {
                            for vitima in list {
                                tr { key: "{vitima.id}",
                                    td { "{vitima.nic}" }
                                    td { "{vitima.display_name()}" }
                                    td { {vitima.idade.map(|i| i.to_string()).unwrap_or_else(|| "-".to_string())} }
                                    td { "{vitima.genero}" }
                                    td { class: "flex gap-2",
                                        if charts_allowed {
                                            Link {
                                                to: Route::OdontogramaEditor { caso_id: caso_id.clone(), vitima_id: vitima.id.clone() },
                                                "Odontograma"
                                            }
                                            Link {
                                                to: Route::Marcacoes { caso_id: caso_id.clone(), vitima_id: vitima.id.clone() },
                                                "Marcações"
                                            }
                                        }
                                        if can_edit {
                                            button {
                                                class: "outline secondary",
                                                r#type: "button",
                                                onclick: {
                                                    let vitima = vitima.clone();
                                                    move |_| pending_delete.set(Some(vitima.clone()))
                                                },
                                                "Excluir"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
            }
            if let Some(vitima) = pending_delete() {
                ConfirmDialog {
                    title: "Excluir vítima".to_string(),
                    message: format!("Excluir {} e todos os seus registros?", vitima.display_name()),
                    confirm_label: "Excluir".to_string(),
                    on_confirm: confirm_delete,
                    on_cancel: move |_| pending_delete.set(None),
                }
            }
        }
    }
}

#[component]
fn Laudos(caso_id: String, update: NovoCaso, can_report: bool, on_finalized: EventHandler<()>) -> Element {
    let ctx = use_app();
    let mut laudos = use_signal(|| None::<Vec<Laudo>>);
    let mut vitimas = use_signal(Vec::<Vitima>::new);
    let mut error = use_signal(|| None::<String>);
    let mut vitima_id = use_signal(String::new);
    let mut parecer = use_signal(String::new);
    let mut observacoes = use_signal(String::new);
    let mut form_error = use_signal(|| None::<String>);
    let mut issuing = use_signal(|| false);

    let backend = ctx.backend.clone();
    let id = caso_id.clone();
    let load = use_callback(move |_: ()| {
        let backend = backend.clone();
        let id = id.clone();
        spawn(async move {
            match backend.list_laudos(&id).await {
                Ok(list) => {
                    laudos.set(Some(list));
                    error.set(None);
                }
                Err(e) => error.set(Some(e.to_string())),
            }
            if let Ok(list) = backend.list_vitimas(&id).await {
                vitimas.set(list);
            }
        });
    });
    use_hook(move || load.call(()));

    let backend = ctx.backend.clone();
    let id = caso_id.clone();
    let issue = move |evt: FormEvent| {
        evt.prevent_default();
        let backend = backend.clone();
        let id = id.clone();
        let update = update.clone();
        let vid = vitima_id();
        let parecer_text = parecer();
        let obs = observacoes();
        if let Err(e) = NovoLaudo::check_fields(&id, &vid, &parecer_text) {
            form_error.set(Some(e.to_string()));
            return;
        }
        issuing.set(true);
        form_error.set(None);
        spawn(async move {
            match backend.issue_laudo(&update, &id, &vid, &parecer_text, &obs).await {
                Ok(_) => {
                    parecer.set(String::new());
                    observacoes.set(String::new());
                    on_finalized.call(());
                    load.call(());
                }
                Err(e @ IssueError::NotFinalized(_)) => {
                    parecer.set(String::new());
                    observacoes.set(String::new());
                    form_error.set(Some(e.to_string()));
                    load.call(());
                }
                Err(e) => form_error.set(Some(e.to_string())),
            }
            issuing.set(false);
        });
    };

    rsx! {
        section { id: "laudos", class: "mt-6",
            h2 { class: "text-xl font-semibold", "Laudos" }
            if let Some(msg) = error() {
                ErrorBanner { message: msg, on_retry: move |_| load.call(()) }
            }
            match laudos() {
                None => rsx! { Loading {} },
                Some(list) if list.is_empty() => rsx! {
                    EmptyMessage { state: EmptyState::NoData, noun: "laudos".to_string() }
                },
                Some(list) => rsx! {
                    for laudo in list {
                        details { key: "{laudo.id()}",
                            summary {
                                {format!(
                                    "Laudo - {} - {}",
                                    laudo.vitima().label(),
                                    laudo.criado_em().map(|d| d.format("%d/%m/%Y %H:%M").to_string()).unwrap_or_default()
                                )}
                            }
                            p { strong { "Parecer: " } "{laudo.parecer()}" }
                            if !laudo.observacoes().is_empty() {
                                p { strong { "Observações: " } "{laudo.observacoes()}" }
                            }
                            small {
                                {format!(
                                    "Odontograma {} com {} dentes com registros",
                                    laudo.odontograma_snapshot().tipo_odontograma.as_str(),
                                    laudo.odontograma_snapshot().recorded_teeth()
                                )}
                            }
                        }
                    }
                },
            }
            if can_report {
                form { onsubmit: issue,
                    h3 { class: "font-semibold", "Emitir laudo" }
                    if let Some(msg) = form_error() {
                        div { class: "banner-error", role: "alert", "{msg}" }
                    }
                    label { "Vítima"
                        select {
                            value: "{vitima_id}",
                            onchange: move |e| vitima_id.set(e.value()),
                            option { value: "", "Selecione" }
                            for v in vitimas() {
                                option { key: "{v.id}", value: "{v.id}", "{v.display_name()}" }
                            }
                        }
                    }
                    label { "Parecer"
                        textarea { value: "{parecer}", oninput: move |e| parecer.set(e.value()) }
                    }
                    label { "Observações"
                        textarea { value: "{observacoes}", oninput: move |e| observacoes.set(e.value()) }
                    }
                    small { "Emitir o laudo finaliza o caso e bloqueia novas edições." }
                    button { r#type: "submit", disabled: issuing(), "Emitir laudo" }
                }
            }
        }
    }
}

#[component]
fn RelatorioPanel(caso_id: String) -> Element {
    let ctx = use_app();
    let mut relatorio = use_signal(|| None::<crate::app::api::Relatorio>);
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let backend = ctx.backend.clone();
    let id = caso_id.clone();
    let generate = move |_: MouseEvent| {
        let backend = backend.clone();
        let id = id.clone();
        busy.set(true);
        spawn(async move {
            match backend.generate_relatorio(&id).await {
                Ok(r) => {
                    relatorio.set(Some(r));
                    error.set(None);
                }
                Err(e) => error.set(Some(e.to_string())),
            }
            busy.set(false);
        });
    };

    let backend = ctx.backend.clone();
    let id = caso_id.clone();
    let download = move |format: ReportFormat| {
        let backend = backend.clone();
        let id = id.clone();
        spawn(async move {
            let result = backend
                .download_relatorio(&id, format)
                .await
                .map_err(|e| e.to_string())
                .and_then(|resp| {
                    save_file(&format.file_name(&id), format.fallback_content_type(), &resp)
                });
            if let Err(e) = result {
                error.set(Some(e));
            }
        });
    };
    let download_pdf = download.clone();

    rsx! {
        section { id: "relatorio", class: "mt-6",
            div { class: "flex items-center justify-between",
                h2 { class: "text-xl font-semibold", "Relatório" }
                div { class: "flex gap-2",
                    button { class: "outline", r#type: "button", disabled: busy(), onclick: generate, "Gerar" }
                    button { class: "outline", r#type: "button", onclick: move |_| download_pdf(ReportFormat::Pdf), "PDF" }
                    button { class: "outline", r#type: "button", onclick: move |_| download(ReportFormat::Texto), "Texto" }
                }
            }
            if let Some(msg) = error() {
                div { class: "banner-error", role: "alert", "{msg}" }
            }
            if let Some(r) = relatorio() {
                article {
                    if !r.titulo.is_empty() {
                        header { strong { "{r.titulo}" } }
                    }
                    pre { style: "white-space:pre-wrap;", "{r.conteudo}" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_victim_form_parses_age() {
        let form = VitimaForm {
            nic: " NIC-7 ".to_string(),
            idade: "42".to_string(),
            ..Default::default()
        };
        let payload = form.to_payload("c1").unwrap();
        assert_eq!(payload.nic, "NIC-7");
        assert_eq!(payload.idade, Some(42));
        assert_eq!(payload.caso, "c1");

        let blank_age = VitimaForm {
            nic: "NIC-8".to_string(),
            ..Default::default()
        };
        assert_eq!(blank_age.to_payload("c1").unwrap().idade, None);
    }

    #[test]
    fn test_victim_form_rejects_bad_input() {
        let no_nic = VitimaForm::default();
        assert_eq!(no_nic.to_payload("c1"), Err(ValidationError::Required("nic")));

        let bad_age = VitimaForm {
            nic: "NIC-9".to_string(),
            idade: "quarenta".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            bad_age.to_payload("c1"),
            Err(ValidationError::Invalid { field: "idade", .. })
        ));
    }

    #[test]
    fn test_date_edit_keeps_buffer_on_garbage() {
        let original = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let mut buffer = NovoCaso {
            titulo: "t".to_string(),
            tipo: TIPOS_CASO[0].to_string(),
            descricao: String::new(),
            data: original,
            status: CasoStatus::EmAndamento,
            perito_responsavel: None,
            local_do_caso: "x".to_string(),
            localizacao: None,
        };
        set_date(&mut buffer, "não é data");
        assert_eq!(buffer.data, original);
        set_date(&mut buffer, "2024-06-15");
        assert_eq!(date_input_value(buffer.data), "2024-06-15");
        assert_eq!(
            crate::app::api::finalized(&buffer).status,
            CasoStatus::Finalizado
        );
    }
}
