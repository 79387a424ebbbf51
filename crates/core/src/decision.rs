//! Review decision constants and validation functions.
//!
//! Defines the valid decision values a reviewer can record on a workflow
//! stage and provides validation helpers used by both the DB and API layers.

use crate::error::CoreError;

/// Reviewer approves the mockup at the current stage.
pub const DECISION_APPROVE: &str = "approve";

/// Reviewer sends the mockup back to its creator for changes.
pub const DECISION_REQUEST_CHANGES: &str = "request_changes";

/// All valid decision values.
pub const VALID_DECISIONS: &[&str] = &[DECISION_APPROVE, DECISION_REQUEST_CHANGES];

/// Maximum length for a decision note.
pub const MAX_DECISION_NOTE_LENGTH: usize = 2_000;

/// Validate that a decision string is one of the accepted values.
pub fn validate_decision(decision: &str) -> Result<(), CoreError> {
    if VALID_DECISIONS.contains(&decision) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid decision '{decision}'. Must be one of: {}",
            VALID_DECISIONS.join(", ")
        )))
    }
}

/// Validate an optional decision note's length.
pub fn validate_decision_note(note: &Option<String>) -> Result<(), CoreError> {
    if let Some(n) = note {
        if n.len() > MAX_DECISION_NOTE_LENGTH {
            return Err(CoreError::Validation(format!(
                "Decision note exceeds maximum length of {MAX_DECISION_NOTE_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_decisions_accepted() {
        assert!(validate_decision(DECISION_APPROVE).is_ok());
        assert!(validate_decision(DECISION_REQUEST_CHANGES).is_ok());
    }

    #[test]
    fn test_invalid_decision_rejected() {
        let result = validate_decision("reject");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid decision"));
    }

    #[test]
    fn test_empty_decision_rejected() {
        assert!(validate_decision("").is_err());
    }

    #[test]
    fn test_note_within_limit_accepted() {
        assert!(validate_decision_note(&Some("looks good".to_string())).is_ok());
        assert!(validate_decision_note(&None).is_ok());
    }

    #[test]
    fn test_note_over_limit_rejected() {
        let long = "x".repeat(MAX_DECISION_NOTE_LENGTH + 1);
        let result = validate_decision_note(&Some(long));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("maximum length"));
    }
}
