use serde::Serialize;

/// Error taxonomy shared by every service in the order lifecycle engine.
///
/// Errors are raised at the point of detection and propagate unhandled to the
/// caller; this crate performs no retries and no silent recovery. The
/// transport layer (not part of this crate) maps these variants onto
/// status codes.
#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    /// Malformed or missing input (empty selection, zero quantity, ...).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Cart, order, product or combo absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Item exists but is not purchasable (out of stock, pending, inactive).
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// State machine rule violation.
    #[error("Invalid transition from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    /// Caller is neither the order's owner nor privileged.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Optimistic-version write lost a race with a concurrent writer.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Persistence call failed; unrecoverable for this request.
    #[error("Upstream storage error: {0}")]
    Upstream(String),
}

impl ServiceError {
    /// Convenience constructor used by the state machines.
    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_display() {
        let err = ServiceError::invalid_transition("Completed", "Pending");
        assert_eq!(
            err.to_string(),
            "Invalid transition from 'Completed' to 'Pending'"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = ServiceError::NotFound("Order 42 not found".to_string());
        assert_eq!(err.to_string(), "Not found: Order 42 not found");
    }
}
