//! `wkhtmltopdf` as an external converter process.
//!
//! The markup is written to the child's stdin and the PDF is read from its
//! stdout. A conversion that outlives the configured timeout is killed and
//! reported as [`Error::Timeout`].

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::{PageOptions, PdfConverter};
use crate::error::{Error, Result};

#[cfg(windows)]
const EXECUTABLE: &str = "wkhtmltopdf.exe";
#[cfg(not(windows))]
const EXECUTABLE: &str = "wkhtmltopdf";

#[cfg(windows)]
const PLATFORM_DEFAULT: &str = r"C:\Program Files\wkhtmltopdf\bin\wkhtmltopdf.exe";
#[cfg(not(windows))]
const PLATFORM_DEFAULT: &str = "/usr/local/bin/wkhtmltopdf";

/// Find the `wkhtmltopdf` binary.
///
/// An explicitly configured path is used as-is or not at all. Otherwise the
/// bundled `./wkhtmltopdf/bin/` copy, the platform install location and
/// finally `PATH` are tried in that order.
#[must_use]
pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH");
    locate_in(explicit, Path::new("."), path_var.as_deref())
}

fn locate_in(explicit: Option<&Path>, base_dir: &Path, path_var: Option<&OsStr>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.is_file().then(|| path.to_path_buf());
    }

    let bundled = base_dir.join("wkhtmltopdf").join("bin").join(EXECUTABLE);
    if bundled.is_file() {
        return Some(bundled);
    }

    let platform_default = PathBuf::from(PLATFORM_DEFAULT);
    if platform_default.is_file() {
        return Some(platform_default);
    }

    path_var.and_then(|paths| {
        std::env::split_paths(paths)
            .map(|dir| dir.join(EXECUTABLE))
            .find(|candidate| candidate.is_file())
    })
}

/// Converter backed by a `wkhtmltopdf` child process.
#[derive(Debug, Clone)]
pub struct Wkhtmltopdf {
    binary: PathBuf,
    timeout: Duration,
}

impl Wkhtmltopdf {
    /// Create a converter for the given binary.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait]
impl PdfConverter for Wkhtmltopdf {
    fn name(&self) -> &str {
        "wkhtmltopdf"
    }

    async fn convert(&self, html: &str, options: &PageOptions) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.binary)
            .args(options.to_args())
            .arg("-")
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::render(format!("failed to start {}: {e}", self.binary.display()))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::internal("wkhtmltopdf stdin was not captured"))?;
        let input = html.as_bytes().to_vec();
        let writer = tokio::spawn(async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        });

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| Error::render(e.to_string()))?,
            Err(_) => {
                return Err(Error::Timeout {
                    operation: format!("wkhtmltopdf after {}s", self.timeout.as_secs()),
                })
            }
        };

        if let Ok(Err(e)) = writer.await {
            debug!("Writing markup to wkhtmltopdf failed: {e}");
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::render(format!(
                "wkhtmltopdf exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(Error::render("wkhtmltopdf produced no output"));
        }
        Ok(output.stdout)
    }
}
