//! Odonto Dashboard - Rust Implementation
//!
//! Administrative web dashboard for a forensic odontology service.
//!
//! This library provides:
//! - Session handling with role-gated routes
//! - An HTTP client for the case-management REST API and the ML service
//! - Case, victim, odontogram, anatomical marking and report workflows
//! - Filtered, paginated collections for cases, users and the audit trail
//! - Web UI (Dioxus + Pico CSS + Tailwind CSS)

// =============================================================================
// Lints - Enforce code quality and consistency
// =============================================================================

// Deny truly dangerous patterns (these will fail the build)
#![deny(unsafe_code)]
#![deny(unused_must_use)]

// Dioxus UI app (shared between server SSR and WASM client)
pub mod app;

// Shared client core (compiled for both server and WASM)
pub mod auth;
pub mod case_editor;
pub mod collection;
pub mod config;
pub mod http;
pub mod prediction;
pub mod preferences;
pub mod session;
pub mod stats;
