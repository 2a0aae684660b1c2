//! `redsheets` - Cyberpunk RED character, vehicle and crew sheets
//!
//! This library provides record storage in JSON collection files, the HTTP
//! surface for editing records and PDF export through an external converter.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod record;
pub mod render;
pub mod service;
pub mod store;
pub mod template;

use std::sync::Arc;

pub use config::Config;
pub use error::{Error, Result};
pub use http::{build_router, build_router_with_limit, AppState};
pub use logging::init_logging;
pub use record::{Kind, Record, RecordId};
pub use render::{PdfConverter, Renderer};
pub use service::{EntityService, Saved, Services};
pub use template::TemplateSet;

/// Wire up the application from configuration.
///
/// Opens (and creates if missing) the collection files under the configured
/// data directory, loads templates and locates the PDF converter.
///
/// # Errors
///
/// Returns an error if the data directory or a collection file cannot be
/// created, or a template override cannot be read.
pub fn build_state(config: &Config) -> Result<AppState> {
    let services = Services::open(config.data_dir())?;
    let templates = Arc::new(TemplateSet::load(config.renderer.templates_dir.as_deref())?);
    let renderer = Renderer::from_config(&config.renderer, Arc::clone(&templates));
    Ok(AppState::new(services, renderer, templates))
}
