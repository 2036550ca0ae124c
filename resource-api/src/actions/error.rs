//! Action error types
//!
//! Handlers report failure through [`HandlerError`]; the dispatcher wraps
//! lookup and handler failures in [`DispatchError`] before folding them into
//! a failed [`ActionResult`](super::ActionResult).

use thiserror::Error;

/// Failure reported by an action handler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The action ran and failed
    #[error("{0}")]
    Failed(String),

    /// The supplied parameters were rejected before running
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// The domain system the action forwards to is unavailable
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

impl HandlerError {
    /// Create a generic failure
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Create an invalid parameters failure
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    /// Create an unavailable failure
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Result returned by every action handler
///
/// `Ok(Some(message))` reports success with a message, `Ok(None)` reports
/// success and lets the dispatcher use its default message.
pub type HandlerResult = Result<Option<String>, HandlerError>;

/// Why a dispatch did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No action with this name is available on the resource
    #[error("Unknown action '{action}' for {resource}")]
    UnknownAction {
        /// Requested action name
        action: String,
        /// The resource, as `collection/id`
        resource: String,
    },

    /// The action's handler failed
    #[error("{source}")]
    Handler {
        /// Requested action name
        action: String,
        /// The handler's error
        #[source]
        source: HandlerError,
    },
}

impl DispatchError {
    /// Name of the action the dispatch was for
    pub fn action(&self) -> &str {
        match self {
            Self::UnknownAction { action, .. } | Self::Handler { action, .. } => action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error_display() {
        assert_eq!(HandlerError::failed("disk full").to_string(), "disk full");
        assert_eq!(
            HandlerError::invalid_params("missing 'key1'").to_string(),
            "Invalid parameters: missing 'key1'"
        );
        assert_eq!(
            HandlerError::unavailable("automate engine down").to_string(),
            "Unavailable: automate engine down"
        );
    }

    #[test]
    fn test_dispatch_error_display() {
        let err = DispatchError::UnknownAction {
            action: "read".to_string(),
            resource: "vms/1".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown action 'read' for vms/1");
        assert_eq!(err.action(), "read");

        let err = DispatchError::Handler {
            action: "reboot".to_string(),
            source: HandlerError::failed("vm is powered off"),
        };
        assert_eq!(err.to_string(), "vm is powered off");
        assert_eq!(err.action(), "reboot");
    }
}
