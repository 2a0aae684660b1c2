//! HTML templates for pages and printable sheets.
//!
//! Templates are plain HTML with two kinds of placeholder:
//!
//! - `{{ path }}` is replaced by the HTML-escaped value at `path`
//! - `{{& path }}` is replaced by the value verbatim
//!
//! Paths are dotted (`stats.int`, `weapons.0.name`). A path that resolves to
//! nothing, or to `null`, renders as the empty string.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::{lookup_path, Kind, Record};

/// Landing page.
pub const INDEX: &str = "index.html";

/// Collection listing page.
pub const LIST: &str = "list.html";

const BUILTIN: &[(&str, &str)] = &[
    (INDEX, include_str!("../templates/index.html")),
    (LIST, include_str!("../templates/list.html")),
    ("character_form.html", include_str!("../templates/character_form.html")),
    ("vehicle_form.html", include_str!("../templates/vehicle_form.html")),
    ("crew_form.html", include_str!("../templates/crew_form.html")),
    ("character_pdf.html", include_str!("../templates/character_pdf.html")),
    ("vehicle_pdf.html", include_str!("../templates/vehicle_pdf.html")),
    ("crew_pdf.html", include_str!("../templates/crew_pdf.html")),
];

/// Name of the edit form template for `kind`.
#[must_use]
pub fn form_template(kind: Kind) -> &'static str {
    match kind {
        Kind::Character => "character_form.html",
        Kind::Vehicle => "vehicle_form.html",
        Kind::Crew => "crew_form.html",
    }
}

/// Name of the printable sheet template for `kind`.
#[must_use]
pub fn pdf_template(kind: Kind) -> &'static str {
    match kind {
        Kind::Character => "character_pdf.html",
        Kind::Vehicle => "vehicle_pdf.html",
        Kind::Crew => "crew_pdf.html",
    }
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{(&?)\s*([A-Za-z0-9_\-]+(?:\.[A-Za-z0-9_\-]+)*)\s*\}\}")
            .unwrap_or_else(|e| panic!("placeholder pattern is invalid: {e}"))
    })
}

/// Values a template can draw from.
pub trait Context {
    /// Resolve a dotted path.
    fn resolve(&self, path: &str) -> Option<&Value>;
}

impl Context for Map<String, Value> {
    fn resolve(&self, path: &str) -> Option<&Value> {
        lookup_path(self, path)
    }
}

impl Context for Record {
    fn resolve(&self, path: &str) -> Option<&Value> {
        self.lookup(path)
    }
}

/// Escape text for use in HTML element content and quoted attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Text a value renders as.
fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// A single parsed template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    source: String,
}

impl Template {
    /// Wrap template source.
    #[must_use]
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// The template's file name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fill every placeholder from `context`.
    #[must_use]
    pub fn render(&self, context: &impl Context) -> String {
        placeholder()
            .replace_all(&self.source, |caps: &Captures<'_>| {
                let raw = !caps[1].is_empty();
                let text = context.resolve(&caps[2]).map(display_value).unwrap_or_default();
                if raw {
                    text
                } else {
                    escape_html(&text)
                }
            })
            .into_owned()
    }
}

/// Every template the application uses, keyed by file name.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    templates: HashMap<String, Template>,
}

impl TemplateSet {
    /// The templates compiled into the binary.
    #[must_use]
    pub fn builtin() -> Self {
        let templates = BUILTIN
            .iter()
            .map(|(name, source)| ((*name).to_string(), Template::new(*name, *source)))
            .collect();
        Self { templates }
    }

    /// Built-in templates, with any same-named file in `dir` taking precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if an override file exists but cannot be read.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let mut set = Self::builtin();
        let Some(dir) = dir else {
            return Ok(set);
        };

        for (name, _) in BUILTIN {
            let path = dir.join(name);
            if !path.is_file() {
                debug!("No override for template {name} in {}", dir.display());
                continue;
            }
            let source = fs::read_to_string(&path).map_err(|e| Error::Template {
                name: (*name).to_string(),
                message: format!("{}: {e}", path.display()),
            })?;
            info!("Using template override {}", path.display());
            set.templates
                .insert((*name).to_string(), Template::new(*name, source));
        }
        Ok(set)
    }

    /// Look up a template by file name.
    ///
    /// # Errors
    ///
    /// Returns an error if no template has that name.
    pub fn get(&self, name: &str) -> Result<&Template> {
        self.templates.get(name).ok_or_else(|| Error::Template {
            name: name.to_string(),
            message: "no such template".to_string(),
        })
    }

    /// Render the named template against `context`.
    ///
    /// # Errors
    ///
    /// Returns an error if no template has that name.
    pub fn render(&self, name: &str, context: &impl Context) -> Result<String> {
        Ok(self.get(name)?.render(context))
    }
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::builtin()
    }
}
