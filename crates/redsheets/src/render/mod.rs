//! Printable sheet rendering.
//!
//! A [`Renderer`] fills a kind's sheet template from a record and hands the
//! markup to a [`PdfConverter`]. The converter is located once at startup;
//! when none is available every render fails immediately with
//! [`Error::RendererUnavailable`] and no conversion is attempted.

pub mod options;
pub mod wkhtmltopdf;

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::RendererConfig;
use crate::error::{Error, Result};
use crate::record::{Kind, Record};
use crate::template::{pdf_template, TemplateSet};

pub use options::{Margins, Orientation, PageOptions, PageSize};
pub use wkhtmltopdf::Wkhtmltopdf;

/// Turns HTML into PDF bytes.
#[async_trait]
pub trait PdfConverter: Send + Sync + Debug {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Convert a complete HTML document using the given page settings.
    async fn convert(&self, html: &str, options: &PageOptions) -> Result<Vec<u8>>;
}

/// Renders records to PDF.
#[derive(Debug, Clone)]
pub struct Renderer {
    templates: Arc<TemplateSet>,
    converter: Option<Arc<dyn PdfConverter>>,
}

impl Renderer {
    /// Create a renderer. `None` marks rendering as unavailable.
    #[must_use]
    pub fn new(templates: Arc<TemplateSet>, converter: Option<Arc<dyn PdfConverter>>) -> Self {
        Self {
            templates,
            converter,
        }
    }

    /// Create a renderer from configuration, locating `wkhtmltopdf`.
    #[must_use]
    pub fn from_config(config: &RendererConfig, templates: Arc<TemplateSet>) -> Self {
        if !config.enabled {
            info!("PDF rendering disabled by configuration");
            return Self::new(templates, None);
        }

        match wkhtmltopdf::locate(config.wkhtmltopdf_path.as_deref()) {
            Some(binary) => {
                info!("Using wkhtmltopdf at {}", binary.display());
                let converter = Wkhtmltopdf::new(binary, config.timeout());
                Self::new(templates, Some(Arc::new(converter)))
            }
            None => {
                warn!("wkhtmltopdf not found; PDF export is unavailable");
                Self::new(templates, None)
            }
        }
    }

    /// Whether a converter is configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.converter.is_some()
    }

    /// The filled-in sheet markup for a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind's template is missing.
    pub fn markup(&self, kind: Kind, record: &Record) -> Result<String> {
        self.templates.render(pdf_template(kind), record)
    }

    /// Render a record to PDF bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RendererUnavailable`] without doing any work if no
    /// converter is configured, otherwise any template or conversion error.
    pub async fn render(&self, kind: Kind, record: &Record) -> Result<Vec<u8>> {
        let converter = self.converter.as_ref().ok_or(Error::RendererUnavailable)?;
        let html = self.markup(kind, record)?;
        let options = PageOptions::for_kind(kind);

        debug!(
            "Rendering {} {} with {} ({})",
            kind,
            record.id_text().unwrap_or_default(),
            converter.name(),
            options.orientation
        );
        let pdf = converter.convert(&html, &options).await?;
        debug!("Rendered {} bytes", pdf.len());
        Ok(pdf)
    }
}
