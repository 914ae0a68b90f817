//! Core types shared by the recall workspace.
//!
//! This crate provides the error type and the result alias used by the
//! retrieval library and the command-line front end.
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        reason = "Test allows"
    )
)]

/// Error types and result definitions.
pub mod error;

pub use error::{Error, Result};
