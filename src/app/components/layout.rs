//! Shell layout: header, sidebar, footer and the session guard.

use chrono::Utc;
use dioxus::prelude::*;
use odonto_model::Role;

use super::guard::AccessDenied;
use super::nav::Sidebar;
use super::theme::ThemeSwitcher;
use crate::app::context::use_app;
use crate::app::Route;
use crate::auth::{evaluate_guard, GuardOutcome};
use crate::preferences::THEME_SCRIPT;

/// CSS styles for the application (extends Pico CSS).
pub(crate) const CUSTOM_STYLES: &str = r#"
:root { --pico-font-size: 15px; }
.status-ok { color: var(--pico-ins-color); }
.status-err { color: var(--pico-del-color); }
small { color: var(--pico-muted-color); }
.shell { display: grid; grid-template-columns: 220px 1fr; min-height: 100vh; }
@media (max-width: 900px) { .shell { grid-template-columns: 1fr; } }
.banner-error { background: #c62828; color: #fff; padding: .75rem 1rem; border-radius: .25rem; margin-bottom: 1rem; }
.snackbar { position: fixed; bottom: 1.5rem; left: 50%; transform: translateX(-50%); padding: .75rem 1.25rem; border-radius: .25rem; background: #323232; color: #fff; z-index: 50; }
.badge { display: inline-block; padding: .1rem .5rem; border-radius: 999px; font-size: .75rem; }
.badge-em-andamento { background: #1565c0; color: #fff; }
.badge-finalizado { background: #2e7d32; color: #fff; }
.badge-arquivado { background: #616161; color: #fff; }
.bar { height: .6rem; background: var(--pico-primary-background); border-radius: .3rem; }
.tooth { width: 2.4rem; height: 2.8rem; border: 1px solid var(--pico-muted-border-color); border-radius: .3rem; display: flex; align-items: flex-end; justify-content: center; cursor: pointer; font-size: .7rem; }
.tooth.absent { background: repeating-linear-gradient(45deg, transparent, transparent 4px, #9e9e9e55 4px, #9e9e9e55 8px); opacity: .6; }
.tooth.selected { outline: 2px solid var(--pico-primary); }
.arch { display: flex; gap: .25rem; justify-content: center; }
.arch-gap { width: 1rem; }
.anatomy { position: relative; display: inline-block; max-width: 480px; width: 100%; cursor: crosshair; }
.anatomy img { width: 100%; display: block; }
.marker { position: absolute; border-radius: 50%; transform: translate(-50%, -50%); border: 2px solid #fff; }
/* Black theme (OLED) - extends dark theme */
[data-theme="dark"][data-variant="black"] {
    --pico-background-color: #000;
    --pico-card-background-color: #0a0a0a;
    --pico-card-sectioning-background-color: #0a0a0a;
    --pico-modal-overlay-background-color: rgba(0,0,0,.9);
    --pico-primary-background: #1a1a1a;
    --pico-secondary-background: #111;
    --pico-contrast-background: #0a0a0a;
    --pico-muted-border-color: #1a1a1a;
    --pico-form-element-background-color: #0a0a0a;
    --pico-table-border-color: #1a1a1a;
}
/* Theme switcher */
.theme-switcher { display: flex; gap: 0.25rem; }
.theme-switcher button { padding: 0.25rem 0.5rem; font-size: 0.8rem; margin: 0; }
.theme-switcher button.active { background: var(--pico-primary-background); color: var(--pico-primary-inverse); }
"#;

/// Document head shared by the shell and the login view
#[component]
pub fn Head(title: String) -> Element {
    let full_title = format!("{title} - OdontoLegal");
    rsx! {
        document::Title { "{full_title}" }
        document::Link { rel: "stylesheet", href: "https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.min.css" }
        document::Script { src: "https://cdn.tailwindcss.com" }
        document::Style { {CUSTOM_STYLES} }
        // Theme init runs immediately (no DOM needed) to prevent flash
        document::Script { {THEME_SCRIPT} }
    }
}

/// Layout for every guarded route.
#[component]
pub fn Shell() -> Element {
    let ctx = use_app();
    let route = use_route::<Route>();
    let nav = navigator();
    let mut outcome = use_signal(|| None::<GuardOutcome>);

    let guard_ctx = ctx.clone();
    use_effect(use_reactive!(|route| {
        // Re-run on sign-in/sign-out as well as navigation
        let _ = (guard_ctx.session)();
        if !(guard_ctx.ready)() {
            return;
        }
        let result = evaluate_guard(guard_ctx.store(), route.allowed_roles(), Utc::now());
        if result == GuardOutcome::RedirectToLogin {
            let _ = nav.replace(Route::Login {});
        }
        outcome.set(Some(result));
    }));

    let title = page_title(&route);
    let active = route.nav_id();
    let version = env!("CARGO_PKG_VERSION");

    let body = match outcome() {
        Some(GuardOutcome::Granted(session)) => rsx! {
            div { class: "shell",
                Sidebar { active: active.to_string(), role: session.user.role }
                div { class: "flex flex-col min-h-screen",
                    Header { name: session.user.name.clone(), role: session.user.role }
                    main { class: "container flex-1 py-4",
                        Outlet::<Route> {}
                    }
                    footer {
                        class: "container",
                        style: "display:flex;justify-content:space-between;align-items:center;",
                        small { "OdontoLegal v{version}" }
                        ThemeSwitcher {}
                    }
                }
            }
        },
        Some(GuardOutcome::AccessDenied { role, allowed }) => rsx! {
            main { class: "container py-8",
                AccessDenied { role, allowed }
            }
        },
        // Loading (SSR / before storage is read) or on the way to /login
        Some(GuardOutcome::RedirectToLogin) | None => rsx! {
            main { class: "container py-8",
                p { aria_busy: "true", "Carregando..." }
            }
        },
    };

    rsx! {
        Head { title }
        {body}
    }
}

fn page_title(route: &Route) -> String {
    match route {
        Route::Dashboard {} => "Dashboard",
        Route::Casos {} => "Casos",
        Route::VerCaso { .. } => "Caso",
        Route::OdontogramaEditor { .. } => "Odontograma",
        Route::Marcacoes { .. } => "Marcações anatômicas",
        Route::BancoDeCasos {} => "Banco de casos",
        Route::Usuarios {} => "Usuários",
        Route::Historico {} => "Histórico",
        Route::Ajustes {} => "Ajustes",
        Route::Login {} => "Entrar",
        Route::NotFound { .. } => "Página não encontrada",
    }
    .to_string()
}

/// Top bar with the signed-in user and logout
#[component]
fn Header(name: String, role: Role) -> Element {
    let ctx = use_app();
    let nav = navigator();
    let mut menu_open = use_signal(|| false);

    rsx! {
        header { class: "container flex items-center justify-end gap-4 py-2",
            div { class: "relative",
                button {
                    class: "outline secondary",
                    r#type: "button",
                    onclick: move |_| menu_open.toggle(),
                    "{name} "
                    small { "({role.label()})" }
                }
                if menu_open() {
                    article { class: "absolute right-0 z-10 p-3",
                        a { href: "#",
                            onclick: move |evt| {
                                evt.prevent_default();
                                ctx.logout();
                                menu_open.set(false);
                                let _ = nav.replace(Route::Login {});
                            },
                            "Sair"
                        }
                    }
                }
            }
        }
    }
}
