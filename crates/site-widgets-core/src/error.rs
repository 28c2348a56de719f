use std::time::Duration;

use thiserror::Error;

/// Coarse classification shared by every recoverable failure a widget can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    EndpointUnavailable,
    FullscreenDenied,
    StorageUnavailable,
}

/// Errors raised by tab-scoped storage.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("tab storage is unavailable: {0}")]
    Unavailable(String),

    #[error("stored chat history is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl StorageError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::StorageUnavailable
    }
}

/// Errors raised while talking to the chat endpoint.
#[derive(Error, Debug)]
pub enum EndpointError {
    #[error("chat endpoint request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("chat endpoint returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response format from chat endpoint: {0}")]
    InvalidResponse(String),

    #[error("chat endpoint did not answer within {0:?}")]
    TimedOut(Duration),
}

impl EndpointError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::EndpointUnavailable
    }
}

/// Reasons a submission is rejected before any request is issued.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    #[error("message is empty")]
    Empty,

    #[error("chat is collapsed")]
    Collapsed,

    #[error("a message is already being sent")]
    InFlight,
}

/// The platform refused to enter fullscreen.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("fullscreen request denied: {reason}")]
pub struct FullscreenDenied {
    pub reason: String,
}

impl FullscreenDenied {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::FullscreenDenied
    }
}
