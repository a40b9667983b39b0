//! Book Library
//!
//! Client for a book catalog REST API: a generic resource client, a
//! persisted session store, form binding with required-field checks and a
//! router that gates pages on the session. A terminal front end drives
//! them the way the browser pages do.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod services;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared by the front end
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let services = services::Services::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }
}
