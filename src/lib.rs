//! Libris Library Management System
//!
//! A Rust implementation of a library management back end, providing a REST
//! JSON API for the catalog, patrons, the borrowing ledger, reporting and an
//! AI chat assistant.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
