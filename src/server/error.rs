//! Errors reported back to the connection that made a request.

use thiserror::Error;

/// Why a client request was rejected.
///
/// Every variant is advisory: it is sent to the requesting connection as an
/// `errorMsg` and never closes the connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Missing or malformed input, e.g. a blank username.
    #[error("{0}")]
    Validation(String),

    /// Unknown session id.
    #[error("{0}")]
    NotFound(String),

    /// Request clashes with the current session state.
    #[error("{0}")]
    Conflict(String),

    /// Sender lacks the role the request needs.
    #[error("{0}")]
    Unauthorized(String),

    /// Session is not ready for the request yet.
    #[error("{0}")]
    PreconditionFailed(String),
}

impl GameError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub(crate) fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub(crate) fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub(crate) fn precondition(msg: impl Into<String>) -> Self {
        Self::PreconditionFailed(msg.into())
    }
}
