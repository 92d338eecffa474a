//! Error model.

use thiserror::Error;

/// Result type of registration operations.
pub type EventResult<T> = Result<T, EventError>;

/// Result returned by callbacks, listeners and subscribers.
///
/// Handler failures are open-ended (whatever the host application does in a
/// callback), so they are carried as `anyhow::Error` and handed back to the
/// caller of `trigger` exactly as the handler produced them.
pub type HandlerResult = anyhow::Result<()>;

/// Library-level error.
///
/// Only argument validation lives here. Failures raised by handlers while an
/// event is dispatched are never converted into this type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    /// A registration was given a missing callback, an empty key or an empty
    /// key list.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl EventError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
