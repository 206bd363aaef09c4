//! Error taxonomy for order strategies.
//!
//! Batch-level errors ([`StrategyError`]) stop a strategy before any order is
//! sent. Child-level errors ([`ChildSubmissionFailed`]) are recorded against
//! the single order that hit them and never abort the batch.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a venue gateway.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VenueError {
    /// The venue understood the request and refused it.
    #[error("venue rejected request (code {code}): {message}")]
    Api { code: i64, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for VenueError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            VenueError::Decode(err.to_string())
        } else {
            VenueError::Transport(err.to_string())
        }
    }
}

/// Errors that abort a whole strategy before any submission.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("reference price unavailable: {0}")]
    ReferenceUnavailable(#[source] VenueError),

    #[error("stop-loss rejected: {0}")]
    Rejected(String),
}

/// Classification of a failed child submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The venue refused the order.
    Rejected,
    Transport,
    Decode,
}

/// A single child order could not be placed.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ChildSubmissionFailed {
    pub kind: FailureKind,
    pub code: Option<i64>,
    pub message: String,
}

impl From<VenueError> for ChildSubmissionFailed {
    fn from(err: VenueError) -> Self {
        match err {
            VenueError::Api { code, message } => Self {
                kind: FailureKind::Rejected,
                code: Some(code),
                message,
            },
            VenueError::Transport(message) => Self {
                kind: FailureKind::Transport,
                code: None,
                message,
            },
            VenueError::Decode(message) => Self {
                kind: FailureKind::Decode,
                code: None,
                message,
            },
        }
    }
}

/// Result type alias for strategy preconditions.
pub type StrategyResult<T> = std::result::Result<T, StrategyError>;
