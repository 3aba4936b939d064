//! Shared UI components for the Dioxus fullstack web UI.

pub mod confirm;
pub mod feedback;
pub mod guard;
pub mod layout;
pub mod nav;
pub mod pagination;
pub mod prediction;
pub mod theme;

pub use confirm::ConfirmDialog;
pub use feedback::{EmptyMessage, ErrorBanner, Loading, Snackbar, StatusBadge};
pub use guard::AccessDenied;
pub use layout::{Head, Shell};
pub use nav::Sidebar;
pub use pagination::Pagination;
pub use prediction::PredictionPanel;
pub use theme::ThemeSwitcher;
