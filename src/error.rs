//! Error types for the console
//!
//! Every remote call resolves to a `PanelError`. Failures are local to one
//! operator action: they are surfaced to the caller and never corrupt the
//! panel's in-memory state.

use thiserror::Error;

/// Console-level error types
#[derive(Error, Debug)]
pub enum PanelError {
    /// Network failure before a usable response was received
    #[error("Backend unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    /// Backend rejected the request (non-2xx status or `success: false`)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Response body did not match the expected JSON envelope
    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),

    /// Operation requires human control of the conversation
    #[error("Human control required for conversation {0}")]
    ControlRequired(String),

    /// Operation requires an active conversation selection
    #[error("No conversation selected")]
    NoSelection,
}
