//! Odontogram editor for one victim.
//!
//! A chart that was never saved starts as a fresh adult chart held locally
//! until the first save or the first recorded condition.

use dioxus::prelude::*;
use odonto_model::{
    confirm_type_change, request_type_change, reset_odontogram, Arcada, Condicao, Dente, Face,
    Odontograma, TipoCondicao, TipoOdontograma, ToothFill, TypeChange,
};
use tracing::{info, warn};

use crate::app::components::{ConfirmDialog, ErrorBanner, Loading, Snackbar};
use crate::app::context::use_app;
use crate::app::Route;

/// CSS class and inline style for a tooth button
pub fn tooth_appearance(dente: &Dente, selected: bool) -> (String, String) {
    let mut class = String::from("tooth");
    let style = match dente.fill() {
        ToothFill::Condition(color) => format!("background:{color};color:#fff;"),
        ToothFill::Neutral => String::new(),
        ToothFill::Absent => {
            class.push_str(" absent");
            String::new()
        }
    };
    if selected {
        class.push_str(" selected");
    }
    (class, style)
}

/// Form for a new condition on the selected tooth
#[derive(Debug, Clone, PartialEq)]
struct CondicaoForm {
    tipo: TipoCondicao,
    faces: Vec<Face>,
    descricao: String,
}

impl Default for CondicaoForm {
    fn default() -> Self {
        Self {
            tipo: TipoCondicao::Carie,
            faces: Vec::new(),
            descricao: String::new(),
        }
    }
}

impl CondicaoForm {
    fn toggle_face(&mut self, face: Face) {
        if let Some(pos) = self.faces.iter().position(|f| *f == face) {
            self.faces.remove(pos);
        } else {
            self.faces.push(face);
        }
    }

    fn to_condicao(&self) -> Condicao {
        Condicao {
            tipo: self.tipo,
            faces: self.faces.clone(),
            descricao: self.descricao.trim().to_string(),
            data_registro: Some(chrono::Utc::now()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ChartState {
    chart: Odontograma,
    /// Whether the API already holds a chart for this victim
    persisted: bool,
    dirty: bool,
}

impl ChartState {
    /// Conditions are appended server-side, so local edits must land first
    fn needs_save(&self) -> bool {
        !self.persisted || self.dirty
    }
}

/// Rebuilding the select under a new key drops a declined choice from the DOM
fn type_select_key(tipo: TipoOdontograma, generation: u32) -> String {
    format!("{}-{generation}", tipo.as_str())
}

#[component]
fn Arch(chart: Odontograma, arcada: Arcada, selected: Option<u8>, on_select: EventHandler<u8>) -> Element {
    let (right, left) = chart.tipo_odontograma.quadrants(arcada);
    let render = |numbers: &'static [u8]| {
        numbers
            .iter()
            .filter_map(|n| chart.dente(*n).cloned())
            .map(|dente| {
                let (class, style) = tooth_appearance(&dente, selected == Some(dente.numero));
                let numero = dente.numero;
                let title = dente
                    .condicoes
                    .iter()
                    .map(|c| c.tipo.label())
                    .collect::<Vec<_>>()
                    .join(", ");
                rsx! {
                    button {
                        key: "{numero}",
                        r#type: "button",
                        class,
                        style,
                        title,
                        onclick: move |_| on_select.call(numero),
                        "{numero}"
                    }
                }
            })
            .collect::<Vec<_>>()
    };
    let right_teeth = render(right);
    let left_teeth = render(left);

    rsx! {
        div { class: "arch my-2",
            {right_teeth.into_iter()}
            div { class: "arch-gap" }
            {left_teeth.into_iter()}
        }
    }
}

#[component]
pub fn OdontogramaEditor(caso_id: String, vitima_id: String) -> Element {
    let ctx = use_app();
    let mut state = use_signal(|| None::<ChartState>);
    let mut error = use_signal(|| None::<String>);
    let mut notice = use_signal(|| None::<String>);
    let mut selected = use_signal(|| None::<u8>);
    let mut form = use_signal(CondicaoForm::default);
    let mut pending_type = use_signal(|| None::<TipoOdontograma>);
    let mut type_select_gen = use_signal(|| 0u32);
    let mut busy = use_signal(|| false);

    let backend = ctx.backend.clone();
    let vid = vitima_id.clone();
    let load = use_callback(move |_: ()| {
        let backend = backend.clone();
        let vid = vid.clone();
        spawn(async move {
            match backend.get_odontograma(&vid).await {
                Ok(found) => {
                    let persisted = found.is_some();
                    let chart = found.unwrap_or_else(|| reset_odontogram(TipoOdontograma::Adulto));
                    if let Err(e) = chart.validate() {
                        warn!(vitima = %vid, "Stored chart is inconsistent: {}", e);
                    }
                    state.set(Some(ChartState {
                        chart,
                        persisted,
                        dirty: false,
                    }));
                    error.set(None);
                }
                Err(e) => error.set(Some(e.to_string())),
            }
        });
    });
    use_hook(move || load.call(()));

    let backend = ctx.backend.clone();
    let vid = vitima_id.clone();
    let save = move |_: MouseEvent| {
        let Some(current) = state() else {
            return;
        };
        if let Err(e) = current.chart.validate() {
            error.set(Some(format!("Odontograma inválido: {e}")));
            return;
        }
        busy.set(true);
        let backend = backend.clone();
        let vid = vid.clone();
        spawn(async move {
            match backend.save_odontograma(&vid, &current.chart).await {
                Ok(()) => {
                    info!(vitima = %vid, "Odontogram saved");
                    notice.set(Some("Odontograma salvo.".to_string()));
                    load.call(());
                }
                Err(e) => error.set(Some(e.to_string())),
            }
            busy.set(false);
        });
    };

    let backend = ctx.backend.clone();
    let vid = vitima_id.clone();
    let add_condition = move |evt: FormEvent| {
        evt.prevent_default();
        let (Some(current), Some(numero)) = (state(), selected()) else {
            return;
        };
        let condicao = form.read().to_condicao();
        // Validate locally before anything is sent
        let mut preview = current.chart.clone();
        if let Err(e) = preview.add_condicao(numero, condicao.clone()) {
            error.set(Some(e.to_string()));
            return;
        }
        busy.set(true);
        let backend = backend.clone();
        let vid = vid.clone();
        spawn(async move {
            let result = async {
                if current.needs_save() {
                    backend.save_odontograma(&vid, &current.chart).await?;
                }
                backend.add_condicao(&vid, numero, &condicao).await
            }
            .await;
            match result {
                Ok(()) => {
                    form.set(CondicaoForm::default());
                    load.call(());
                }
                Err(e) => error.set(Some(e.to_string())),
            }
            busy.set(false);
        });
    };

    let mut change_type = move |novo: TipoOdontograma| {
        let Some(current) = state() else {
            return;
        };
        match request_type_change(&current.chart, novo) {
            TypeChange::Unchanged => {}
            TypeChange::Applied(chart) => {
                selected.set(None);
                state.set(Some(ChartState {
                    chart,
                    dirty: true,
                    ..current
                }));
            }
            TypeChange::NeedsConfirmation => pending_type.set(Some(novo)),
        }
    };

    let Some(current) = state() else {
        return rsx! {
            if let Some(msg) = error() {
                ErrorBanner { message: msg, on_retry: move |_| load.call(()) }
            } else {
                Loading {}
            }
        };
    };

    let chart = current.chart.clone();
    let selected_tooth = selected().and_then(|n| chart.dente(n).cloned());
    let f = form();

    rsx! {
        div { class: "flex items-center justify-between mb-4",
            div {
                Link { to: Route::VerCaso { id: caso_id.clone() }, "← Voltar ao caso" }
                h1 { class: "text-2xl font-bold", "Odontograma" }
            }
            div { class: "flex gap-2 items-center",
                if current.dirty {
                    small { class: "status-err", "Alterações não salvas" }
                }
                button {
                    r#type: "button",
                    disabled: busy(),
                    aria_busy: if busy() { "true" } else { "false" },
                    onclick: save,
                    "Salvar"
                }
            }
        }

        if let Some(msg) = error() {
            ErrorBanner { message: msg, on_retry: move |_| load.call(()) }
        }

        label { "Tipo de odontograma"
            select {
                key: "{type_select_key(chart.tipo_odontograma, type_select_gen())}",
                value: chart.tipo_odontograma.as_str(),
                onchange: move |e| {
                    if let Some(novo) = TipoOdontograma::parse(&e.value()) {
                        change_type(novo);
                    }
                },
                for tipo in TipoOdontograma::ALL {
                    option { key: "{tipo.as_str()}", value: tipo.as_str(), "{tipo.label()}" }
                }
            }
        }

        article { id: "odontograma",
            small { "Arcada superior" }
            Arch { chart: chart.clone(), arcada: Arcada::Superior, selected: selected(), on_select: move |n| selected.set(Some(n)) }
            hr {}
            Arch { chart: chart.clone(), arcada: Arcada::Inferior, selected: selected(), on_select: move |n| selected.set(Some(n)) }
            small { "Arcada inferior" }
            div { class: "flex flex-wrap gap-3 mt-4",
                for tipo in TipoCondicao::ALL {
                    span { key: "{tipo.as_str()}", class: "flex items-center gap-1",
                        span { style: "display:inline-block;width:.8rem;height:.8rem;border-radius:2px;background:{tipo.color()};" }
                        small { "{tipo.label()}" }
                    }
                }
            }
        }

        if let Some(dente) = selected_tooth {
            article { id: "dente",
                header {
                    strong { "Dente {dente.numero}" }
                    if !dente.presente {
                        " "
                        small { "(ausente)" }
                    }
                }
                if dente.condicoes.is_empty() {
                    small { "Nenhuma condição registrada." }
                } else {
                    ul {
                        for (i, condicao) in dente.condicoes.iter().enumerate() {
                            li { key: "{i}",
                                strong { "{condicao.tipo.label()}" }
                                if !condicao.faces.is_empty() {
                                    {format!(" ({})", condicao.faces.iter().map(Face::label).collect::<Vec<_>>().join(", "))}
                                }
                                if !condicao.descricao.is_empty() {
                                    " - {condicao.descricao}"
                                }
                            }
                        }
                    }
                }
                form { onsubmit: add_condition,
                    div { class: "grid md:grid-cols-2 gap-2",
                        label { "Condição"
                            select {
                                value: f.tipo.as_str(),
                                onchange: move |e| {
                                    if let Some(tipo) = TipoCondicao::parse(&e.value()) {
                                        form.write().tipo = tipo;
                                    }
                                },
                                for tipo in TipoCondicao::ALL {
                                    option { key: "{tipo.as_str()}", value: tipo.as_str(), "{tipo.label()}" }
                                }
                            }
                        }
                        label { "Descrição"
                            input { value: "{f.descricao}", oninput: move |e| form.write().descricao = e.value() }
                        }
                    }
                    fieldset { class: "flex flex-wrap gap-3",
                        legend { "Faces" }
                        for face in Face::ALL {
                            label { key: "{face.label()}",
                                input {
                                    r#type: "checkbox",
                                    checked: f.faces.contains(&face),
                                    onchange: move |_| form.write().toggle_face(face),
                                }
                                "{face.label()}"
                            }
                        }
                    }
                    button { r#type: "submit", disabled: busy(), "Registrar condição" }
                }
            }
        }

        label { "Observações gerais"
            textarea {
                value: "{chart.observacoes_gerais}",
                oninput: move |e| {
                    if let Some(s) = state.write().as_mut() {
                        s.chart.observacoes_gerais = e.value();
                        s.dirty = true;
                    }
                },
            }
        }

        if let Some(novo) = pending_type() {
            ConfirmDialog {
                title: "Trocar tipo de odontograma".to_string(),
                message: format!(
                    "Mudar para {} apaga todas as condições e observações registradas. Continuar?",
                    novo.label()
                ),
                confirm_label: "Trocar e apagar".to_string(),
                on_confirm: move |_| {
                    pending_type.set(None);
                    selected.set(None);
                    if let Some(s) = state.write().as_mut() {
                        s.chart = confirm_type_change(novo);
                        s.dirty = true;
                    }
                },
                on_cancel: move |_| {
                    pending_type.set(None);
                    type_select_gen += 1;
                },
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

    #[test]
    fn test_tooth_appearance() {
        let mut dente = Dente::new(36);
        assert_eq!(tooth_appearance(&dente, false), ("tooth".to_string(), String::new()));

        dente.presente = false;
        assert_eq!(tooth_appearance(&dente, true).0, "tooth absent selected");

        dente.condicoes.push(Condicao {
            tipo: TipoCondicao::Carie,
            faces: vec![],
            descricao: String::new(),
            data_registro: None,
        });
        let (class, style) = tooth_appearance(&dente, false);
        assert_eq!(class, "tooth");
        assert!(style.contains(TipoCondicao::Carie.color()));
    }

    fn state(persisted: bool, dirty: bool) -> ChartState {
        ChartState {
            chart: reset_odontogram(TipoOdontograma::Adulto),
            persisted,
            dirty,
        }
    }

    #[test]
    fn test_unsaved_edits_are_saved_before_adding_condition() {
        assert!(state(false, false).needs_save());
        assert!(state(true, true).needs_save());
        assert!(!state(true, false).needs_save());
    }

    #[test]
    fn test_declined_type_switch_rebuilds_select() {
        let chart = state(true, false).chart;
        let shown = type_select_key(chart.tipo_odontograma, 0);
        assert!(shown.starts_with(TipoOdontograma::Adulto.as_str()));
        // Declining leaves the type alone but bumps the generation
        assert_ne!(type_select_key(chart.tipo_odontograma, 1), shown);
        assert_eq!(type_select_key(chart.tipo_odontograma, 0), shown);
    }

    #[test]
    fn test_condition_form_faces_toggle() {
        let mut form = CondicaoForm::default();
        form.toggle_face(Face::Oclusal);
        form.toggle_face(Face::Mesial);
        form.toggle_face(Face::Oclusal);
        assert_eq!(form.faces, vec![Face::Mesial]);
        form.descricao = "  lesão  ".to_string();
        let condicao = form.to_condicao();
        assert_eq!(condicao.descricao, "lesão");
        assert!(condicao.data_registro.is_some());
    }
}
