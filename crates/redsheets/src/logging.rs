//! Tracing setup for the server and the one-shot commands.
//!
//! `serve` logs to stdout with event targets, so request handling and store
//! writes can be told apart. `list`, `export` and `config` log to stderr
//! without targets and leave stdout to the command's own output.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much the process reports, chosen with `-q` / `-v` / `-vv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Startup, saves and deletes.
    #[default]
    Normal,
    /// Every request, plus rejected extractors.
    Verbose,
    /// Everything, including store reads.
    Trace,
}

impl Verbosity {
    /// Level applied to the `redsheets` target.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    /// Long-running server: stdout, with targets.
    Server,
    /// One-shot command: stderr, no targets.
    Command,
}

/// Default filter when `RUST_LOG` is unset.
///
/// Other crates stay at `warn`. From `Verbose` up, axum's extractor
/// rejections are shown too, which is where a malformed query or an
/// oversized body ends up.
#[must_use]
pub fn filter_directive(verbosity: Verbosity) -> String {
    let level = verbosity.level();
    match verbosity {
        Verbosity::Verbose | Verbosity::Trace => {
            format!("warn,redsheets={level},axum::rejection=trace")
        }
        Verbosity::Quiet | Verbosity::Normal => format!("warn,redsheets={level}"),
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` replaces the filter built from `verbosity`. Calling this more
/// than once keeps the first subscriber.
///
/// ```no_run
/// use redsheets::logging::{init_logging, LogOutput, Verbosity};
///
/// init_logging(Verbosity::Verbose, LogOutput::Server);
/// ```
pub fn init_logging(verbosity: Verbosity, output: LogOutput) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbosity)));

    let installed = match output {
        LogOutput::Server => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init(),
        LogOutput::Command => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };
    if installed.is_err() {
        tracing::debug!("Logging already initialised");
    }
}

/// Quiet subscriber for integration tests, captured by the test harness.
#[doc(hidden)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
