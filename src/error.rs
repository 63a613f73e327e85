//! Error taxonomy (spec.md §7).
//!
//! Retries are local to a single HTTP attempt loop ([`crate::fetcher`],
//! [`crate::view_driver`]); everything else surfaces at an operation
//! boundary (`stream_comments` / `download_backward` /
//! `list_programs_on`) as one of the variants below.

use thiserror::Error;

/// Errors surfaced to callers of the public API.
#[derive(Debug, Error)]
pub enum NdgrError {
    /// Malformed handle, unknown channel alias, or an attempt to stream an
    /// ended program. Not retried.
    #[error("invalid input: {0}")]
    Input(String),

    /// HTTP non-2xx, socket, TLS, or idle-timeout fault that survived its
    /// local retry budget.
    #[error("transport error: {0}")]
    Transport(String),

    /// Watch-page JSON missing required fields, two `Next` entries in one
    /// slice, an empty WebSocket URL where one was required, or a corrupt
    /// varint.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Timeshift activation required but the session lacks credentials, or
    /// the service rejected credentials.
    #[error("authentication error: {0}")]
    Auth(String),

    /// The operation was cancelled by the caller or by a supervisor handoff.
    /// Not a failure path — callers should treat this as a clean stop.
    #[error("operation cancelled")]
    Cancelled,
}

impl From<ndgr_protocol::FramingError> for NdgrError {
    fn from(e: ndgr_protocol::FramingError) -> Self {
        NdgrError::Protocol(e.to_string())
    }
}

impl From<reqwest::Error> for NdgrError {
    fn from(e: reqwest::Error) -> Self {
        NdgrError::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NdgrError>;
