//! Anatomical marking editor for one victim.

use std::rc::Rc;

use dioxus::prelude::*;
use odonto_model::{
    CategoriaImagem, Coordenadas, ImagemConfig, Lado, MarcacaoAnatomica, NovaMarcacao, Regiao,
    Tamanho, Vista, TIPOS_MARCACAO,
};
use tracing::{debug, info};

use crate::app::components::{ConfirmDialog, EmptyMessage, ErrorBanner, Loading, Snackbar};
use crate::app::context::use_app;
use crate::app::Route;
use crate::collection::EmptyState;

#[derive(Debug, Clone, PartialEq)]
struct MarcacaoForm {
    tipo: String,
    regiao: String,
    descricao: String,
    cor: String,
    tamanho: Tamanho,
}

impl Default for MarcacaoForm {
    fn default() -> Self {
        Self {
            tipo: TIPOS_MARCACAO[0].to_string(),
            regiao: String::new(),
            descricao: String::new(),
            cor: "#e53935".to_string(),
            tamanho: Tamanho::default(),
        }
    }
}

impl MarcacaoForm {
    fn to_payload(
        &self,
        vitima_id: &str,
        imagem: ImagemConfig,
        coordenadas: Coordenadas,
    ) -> NovaMarcacao {
        let nome = imagem
            .categoria
            .regioes()
            .iter()
            .find(|(codigo, _)| *codigo == self.regiao)
            .map(|(_, nome)| nome.to_string())
            .unwrap_or_default();
        NovaMarcacao {
            vitima: vitima_id.to_string(),
            tipo: self.tipo.clone(),
            regiao: Regiao {
                codigo: self.regiao.clone(),
                nome,
            },
            descricao: self.descricao.trim().to_string(),
            cor: self.cor.clone(),
            tamanho: self.tamanho,
            coordenadas,
            imagem,
        }
    }
}

/// Inline style for an overlay dot
pub fn marker_style(marcacao: &MarcacaoAnatomica) -> String {
    let size = marcacao.tamanho.dot_px();
    format!(
        "{}width:{size}px;height:{size}px;background:{};",
        marcacao.coordenadas.css_position(),
        marcacao.cor
    )
}

#[component]
pub fn Marcacoes(caso_id: String, vitima_id: String) -> Element {
    let ctx = use_app();
    let mut markings = use_signal(|| None::<Vec<MarcacaoAnatomica>>);
    let mut error = use_signal(|| None::<String>);
    let mut notice = use_signal(|| None::<String>);
    let mut imagem = use_signal(ImagemConfig::default);
    let mut image_el = use_signal(|| None::<Rc<MountedData>>);
    let mut draft = use_signal(|| None::<Coordenadas>);
    let mut form = use_signal(MarcacaoForm::default);
    let mut form_error = use_signal(|| None::<String>);
    let mut saving = use_signal(|| false);
    let mut pending_delete = use_signal(|| None::<MarcacaoAnatomica>);

    let backend = ctx.backend.clone();
    let vid = vitima_id.clone();
    let load = use_callback(move |_: ()| {
        let backend = backend.clone();
        let vid = vid.clone();
        spawn(async move {
            match backend.list_marcacoes(&vid).await {
                Ok(list) => {
                    markings.set(Some(list));
                    error.set(None);
                }
                Err(e) => error.set(Some(e.to_string())),
            }
        });
    });
    use_hook(move || load.call(()));

    let place = move |evt: MouseEvent| {
        let point = evt.element_coordinates();
        let Some(mounted) = image_el() else {
            return;
        };
        spawn(async move {
            if let Ok(rect) = mounted.get_client_rect().await {
                let coords = Coordenadas::from_click(point.x, point.y, rect.width(), rect.height());
                debug!(x = coords.x(), y = coords.y(), "Marking position picked");
                draft.set(Some(coords));
            }
        });
    };

    let backend = ctx.backend.clone();
    let vid = vitima_id.clone();
    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        let Some(coords) = draft() else {
            form_error.set(Some("Clique na imagem para posicionar a marcação.".to_string()));
            return;
        };
        let payload = form.read().to_payload(&vid, imagem(), coords);
        if let Err(e) = payload.validate() {
            form_error.set(Some(e.to_string()));
            return;
        }
        form_error.set(None);
        saving.set(true);
        let backend = backend.clone();
        spawn(async move {
            match backend.create_marcacao(&payload).await {
                Ok(_) => {
                    info!(regiao = %payload.regiao.codigo, "Marking created");
                    draft.set(None);
                    form.with_mut(|f| {
                        f.descricao.clear();
                        f.regiao.clear();
                    });
                    notice.set(Some("Marcação registrada.".to_string()));
                    load.call(());
                }
                Err(e) => form_error.set(Some(e.to_string())),
            }
            saving.set(false);
        });
    };

    let backend = ctx.backend.clone();
    let confirm_delete = move |_: ()| {
        let Some(marcacao) = pending_delete.take() else {
            return;
        };
        let backend = backend.clone();
        spawn(async move {
            match backend.delete_marcacao(&marcacao.id).await {
                Ok(()) => {
                    notice.set(Some("Marcação excluída.".to_string()));
                    load.call(());
                }
                Err(e) => error.set(Some(e.to_string())),
            }
        });
    };

    let config = imagem();
    let all = markings();
    let on_image: Vec<MarcacaoAnatomica> = all
        .iter()
        .flatten()
        .filter(|m| m.imagem == config)
        .cloned()
        .collect();
    let f = form();
    let draft_style = draft().map(|c| {
        let size = f.tamanho.dot_px();
        format!(
            "{}width:{size}px;height:{size}px;background:{};opacity:.6;",
            c.css_position(),
            f.cor
        )
    });

    rsx! {
        div { class: "mb-4",
            Link { to: Route::VerCaso { id: caso_id.clone() }, "← Voltar ao caso" }
            h1 { class: "text-2xl font-bold", "Marcações anatômicas" }
        }

        if let Some(msg) = error() {
            ErrorBanner { message: msg, on_retry: move |_| load.call(()) }
        }

        div { class: "grid grid-cols-1 md:grid-cols-3 gap-2",
            label { "Imagem"
                select {
                    value: config.categoria.as_str(),
                    onchange: move |e| {
                        if let Some(categoria) = CategoriaImagem::parse(&e.value()) {
                            imagem.set(ImagemConfig::for_categoria(categoria));
                            draft.set(None);
                            form.write().regiao.clear();
                        }
                    },
                    for categoria in CategoriaImagem::ALL {
                        option { key: "{categoria.as_str()}", value: categoria.as_str(), "{categoria.label()}" }
                    }
                }
            }
            label { "Vista"
                select {
                    value: config.vista.as_str(),
                    onchange: move |e| {
                        if let Some(vista) = Vista::parse(&e.value()) {
                            let next = ImagemConfig { vista, ..imagem() }.normalized();
                            imagem.set(next);
                            draft.set(None);
                        }
                    },
                    for vista in config.categoria.vistas() {
                        option { key: "{vista.as_str()}", value: vista.as_str(), "{vista.label()}" }
                    }
                }
            }
            label { if config.categoria == CategoriaImagem::CorpoInteiro { "Sexo" } else { "Lado" }
                select {
                    value: config.lado.as_str(),
                    onchange: move |e| {
                        if let Some(lado) = Lado::parse(&e.value()) {
                            let next = ImagemConfig { lado, ..imagem() }.normalized();
                            imagem.set(next);
                            draft.set(None);
                        }
                    },
                    for lado in config.categoria.lados() {
                        option { key: "{lado.as_str()}", value: lado.as_str(), "{lado.label()}" }
                    }
                }
            }
        }

        div { class: "grid md:grid-cols-2 gap-4",
            div {
                div { class: "anatomy", id: "anatomy",
                    img {
                        src: config.image_path(),
                        alt: "{config.categoria.label()} - {config.vista.label()}",
                        draggable: "false",
                        onmounted: move |evt: MountedEvent| image_el.set(Some(evt.data())),
                        onclick: place,
                    }
                    for marcacao in on_image.iter() {
                        span {
                            key: "{marcacao.id}",
                            class: "marker",
                            style: marker_style(marcacao),
                            title: "{marcacao.tipo} - {marcacao.regiao.nome}",
                        }
                    }
                    if let Some(style) = draft_style {
                        span { class: "marker", style }
                    }
                }
                small { "Clique na imagem para posicionar uma nova marcação." }
            }

            article {
                header { strong { "Nova marcação" } }
                form { onsubmit: submit,
                    if let Some(msg) = form_error() {
                        div { class: "banner-error", role: "alert", "{msg}" }
                    }
                    if let Some(c) = draft() {
                        small { {format!("Posição: {:.2}% × {:.2}%", c.x(), c.y())} }
                    }
                    label { "Tipo"
                        select {
                            value: "{f.tipo}",
                            onchange: move |e| form.write().tipo = e.value(),
                            for tipo in TIPOS_MARCACAO {
                                option { key: "{tipo}", value: tipo, "{tipo}" }
                            }
                        }
                    }
                    label { "Região"
                        select {
                            value: "{f.regiao}",
                            onchange: move |e| form.write().regiao = e.value(),
                            option { value: "", "Selecione" }
                            for (codigo, nome) in config.categoria.regioes().iter() {
                                option { key: "{codigo}", value: *codigo, "{nome}" }
                            }
                        }
                    }
                    label { "Descrição"
                        textarea { value: "{f.descricao}", oninput: move |e| form.write().descricao = e.value() }
                    }
                    div { class: "grid grid-cols-2 gap-2",
                        label { "Cor"
                            input { r#type: "color", value: "{f.cor}", oninput: move |e| form.write().cor = e.value() }
                        }
                        label { "Tamanho"
                            select {
                                value: f.tamanho.as_str(),
                                onchange: move |e| {
                                    if let Some(t) = Tamanho::parse(&e.value()) {
                                        form.write().tamanho = t;
                                    }
                                },
                                for t in Tamanho::ALL {
                                    option { key: "{t.as_str()}", value: t.as_str(), "{t.label()}" }
                                }
                            }
                        }
                    }
                    button { r#type: "submit", disabled: saving(), "Registrar" }
                }
            }
        }

        h2 { class: "text-xl font-semibold mt-6", "Marcações registradas" }
        match all {
            None => rsx! { Loading {} },
            Some(list) if list.is_empty() => rsx! {
                EmptyMessage { state: EmptyState::NoData, noun: "marcações".to_string() }
            },
            Some(list) => rsx! {
                table { class: "striped",
                    thead {
                        tr {
                            th { "Tipo" }
                            th { "Região" }
                            th { "Imagem" }
                            th { "Posição" }
                            th { "Descrição" }
                            th { "" }
                        }
                    }
                    tbody {
                        for marcacao in list {
                            tr { key: "{marcacao.id}",
                                td {
                                    span { style: "display:inline-block;width:.7rem;height:.7rem;border-radius:50%;background:{marcacao.cor};" }
                                    " {marcacao.tipo}"
                                }
                                td { "{marcacao.regiao.nome}" }
                                td { "{marcacao.imagem.categoria.label()} / {marcacao.imagem.vista.label()} / {marcacao.imagem.lado.label()}" }
                                td { {format!("{:.1}%, {:.1}%", marcacao.coordenadas.x(), marcacao.coordenadas.y())} }
                                td { "{marcacao.descricao}" }
                                td {
                                    button {
                                        class: "outline secondary",
                                        r#type: "button",
                                        onclick: {
                                            let marcacao = marcacao.clone();
                                            move |_| pending_delete.set(Some(marcacao.clone()))
                                        },
                                        "Excluir"
                                    }
                                }
                            }
                        }
                    }
                }
            },
        }

        if let Some(marcacao) = pending_delete() {
            ConfirmDialog {
                title: "Excluir marcação".to_string(),
                message: format!("Excluir a marcação \"{}\" em {}?", marcacao.tipo, marcacao.regiao.nome),
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
