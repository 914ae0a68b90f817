//! Library interface for recall-cli
//!
//! Exposes configuration, logging and the interactive session for the
//! binary and for integration testing.
#![cfg_attr(
    test,
    allow(
        dead_code,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        reason = "Test allows"
    )
)]

pub mod config;
pub mod logging;
pub mod session;

pub use config::RecallConfig;
pub use session::{Input, Session, SessionOptions, SessionState, SessionSummary, is_exit_command};
