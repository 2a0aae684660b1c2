//! Page settings handed to the PDF converter.

use std::fmt;

use serde::Serialize;

use crate::record::Kind;

/// Paper size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PageSize {
    /// ISO A4, 210 × 297 mm.
    #[default]
    A4,
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A4 => f.write_str("A4"),
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Orientation {
    /// Taller than wide.
    Portrait,
    /// Wider than tall.
    Landscape,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Portrait => f.write_str("Portrait"),
            Self::Landscape => f.write_str("Landscape"),
        }
    }
}

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Margins {
    /// Top margin.
    pub top: u32,
    /// Right margin.
    pub right: u32,
    /// Bottom margin.
    pub bottom: u32,
    /// Left margin.
    pub left: u32,
}

/// Everything the converter needs to lay out a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageOptions {
    /// Paper size.
    pub page_size: PageSize,
    /// Orientation.
    pub orientation: Orientation,
    /// Margins on all sides.
    pub margins: Margins,
    /// Text encoding of the input markup.
    pub encoding: &'static str,
    /// Emit a document outline.
    pub outline: bool,
    /// Let the converter shrink content to fit.
    pub smart_shrinking: bool,
    /// Apply `@media print` rules.
    pub print_media_type: bool,
    /// Suppress converter progress output.
    pub quiet: bool,
}

impl PageOptions {
    /// The fixed settings for a kind's printable sheet.
    ///
    /// Characters print landscape; vehicles and crews print portrait.
    #[must_use]
    pub fn for_kind(kind: Kind) -> Self {
        let orientation = match kind {
            Kind::Character => Orientation::Landscape,
            Kind::Vehicle | Kind::Crew => Orientation::Portrait,
        };
        Self {
            page_size: PageSize::A4,
            orientation,
            margins: Margins::default(),
            encoding: "UTF-8",
            outline: false,
            smart_shrinking: false,
            print_media_type: true,
            quiet: true,
        }
    }

    /// Command-line flags for `wkhtmltopdf`.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--page-size".to_string(),
            self.page_size.to_string(),
            "--orientation".to_string(),
            self.orientation.to_string(),
            "--margin-top".to_string(),
            format!("{}mm", self.margins.top),
            "--margin-right".to_string(),
            format!("{}mm", self.margins.right),
            "--margin-bottom".to_string(),
            format!("{}mm", self.margins.bottom),
            "--margin-left".to_string(),
            format!("{}mm", self.margins.left),
            "--encoding".to_string(),
            self.encoding.to_string(),
        ];
        args.push(if self.outline { "--outline" } else { "--no-outline" }.to_string());
        if self.quiet {
            args.push("--quiet".to_string());
        }
        if !self.smart_shrinking {
            args.push("--disable-smart-shrinking".to_string());
        }
        if self.print_media_type {
            args.push("--print-media-type".to_string());
        }
        args
    }
}
