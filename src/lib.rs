//! LocEHPAD medical equipment loan tracking
//!
//! REST server for the equipment, location, category, user, cart and request
//! registries of nursing homes, plus a typed client ([`client`]) driving the
//! same API from the command line.

use std::sync::Arc;

pub mod api;
pub mod client;
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
