//! Manager Errors
//!
//! Every failure a lifecycle operation can report maps to exactly one
//! [`ErrorKind`], so the host adapter (and the orchestrator behind it) can
//! branch on the kind instead of parsing messages.

use serde::Serialize;
use thiserror::Error;

/// Discriminant of a [`ManagerError`], serialized as a snake_case code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    InvalidResource,
    BackendUnreachable,
    ReservationFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::InvalidResource => "invalid_resource",
            Self::BackendUnreachable => "backend_unreachable",
            Self::ReservationFailed => "reservation_failed",
        }
    }
}

/// Error returned by catalog loading and the lifecycle operations
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Config or catalog source missing or malformed
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Resource unknown to the catalog or the resource index, or a malformed request
    #[error("invalid resource: {0}")]
    InvalidResource(String),
    /// Reservation backend could not be reached or answered with garbage
    #[error("reservation backend unreachable: {0}")]
    BackendUnreachable(String),
    /// Reservation backend explicitly reported a failure
    #[error("reservation failed: {0}")]
    ReservationFailed(String),
}

impl ManagerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::InvalidResource(_) => ErrorKind::InvalidResource,
            Self::BackendUnreachable(_) => ErrorKind::BackendUnreachable,
            Self::ReservationFailed(_) => ErrorKind::ReservationFailed,
        }
    }

    /// The message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Configuration(m)
            | Self::InvalidResource(m)
            | Self::BackendUnreachable(m)
            | Self::ReservationFailed(m) => m,
        }
    }
}

pub type Result<T> = std::result::Result<T, ManagerError>;
