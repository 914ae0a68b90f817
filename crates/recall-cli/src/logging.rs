//! Tracing setup. Session output owns stdout, so logs go to stderr or a file.

use anyhow::{Result, anyhow};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

const QUIET_FILTER: &str = "recall_retrieval=warn,recall_cli=warn";
const VERBOSE_FILTER: &str = "recall_retrieval=info,recall_cli=info";

/// Default filter directives when `RUST_LOG` is unset
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose { VERBOSE_FILTER } else { QUIET_FILTER }
}

/// Install the global subscriber
///
/// # Errors
/// Returns an error if the log file cannot be opened or a subscriber is
/// already installed
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let writer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Arc::new(file))
        }
        None => BoxMakeWriter::new(io::stderr),
    };

    Registry::default()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose).into()))
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(log_file.is_none())
                .with_target(true)
                .with_level(true),
        )
        .try_init()
        .map_err(|error| anyhow!("Failed to initialize logging: {error}"))
}
