/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Set mutation errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SetError {
    #[error("Allocation failed: set capacity of {limit} entries exhausted")]
    #[diagnostic(
        code(set::allocation_failure),
        help("Remove entries or raise UNIQSET_CAPACITY. Nothing was linked.")
    )]
    AllocationFailure { limit: usize },
}

/// Control-surface errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ControlError {
    #[error("Invalid input: {0}")]
    #[diagnostic(
        code(control::invalid_input),
        help("Write payloads are base-10 signed integers within the accepted length bound.")
    )]
    InvalidInput(String),

    #[error("Transfer failed: {0}")]
    #[diagnostic(
        code(control::transfer_fault),
        help("The payload could not be read from the caller. The set is unchanged.")
    )]
    TransferFault(String),

    #[error("Failed to register endpoint {name}: {reason}")]
    #[diagnostic(
        code(control::registration_failure),
        help("Check that the runtime directory exists and is writable. Any endpoint registered earlier in this startup has been unregistered.")
    )]
    RegistrationFailure { name: String, reason: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Set(#[from] SetError),
}

impl ControlError {
    /// Short machine-readable tag, used when mapping errors onto wire lines
    pub fn kind(&self) -> &'static str {
        match self {
            ControlError::InvalidInput(_) => "invalid_input",
            ControlError::TransferFault(_) => "transfer_fault",
            ControlError::RegistrationFailure { .. } => "registration_failure",
            ControlError::Set(SetError::AllocationFailure { .. }) => "allocation_failure",
        }
    }
}

/// Result type for control-surface operations
///
/// # Must Use
/// A failed operation leaves the set unchanged; callers must surface it
pub type Result<T> = std::result::Result<T, ControlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_error_serialization() {
        let error = SetError::AllocationFailure { limit: 8 };
        let json = serde_json::to_string(&error).unwrap();
        let deserialized: SetError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, deserialized);
    }

    #[test]
    fn test_control_error_serialization() {
        let error = ControlError::InvalidInput("not a number".into());
        let json = serde_json::to_string(&error).unwrap();
        let deserialized: ControlError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, deserialized);
    }

    #[test]
    fn test_control_error_from_set_error() {
        let error: ControlError = SetError::AllocationFailure { limit: 100 }.into();
        assert_eq!(error.kind(), "allocation_failure");
        assert!(matches!(error, ControlError::Set(_)));
    }

    #[test]
    fn test_error_display() {
        let error = ControlError::RegistrationFailure {
            name: "A".into(),
            reason: "address in use".into(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to register endpoint A: address in use"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            ControlError::InvalidInput(String::new()).kind(),
            "invalid_input"
        );
        assert_eq!(
            ControlError::TransferFault(String::new()).kind(),
            "transfer_fault"
        );
    }
}
