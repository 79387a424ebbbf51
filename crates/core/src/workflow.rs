//! Workflow definition validation.
//!
//! A workflow is an ordered list of named review stages owned by an
//! organization. These checks run at definition time (create/update); a
//! definition that passes them can never produce an invalid ledger, so the
//! engine itself does not re-validate stage lists.

use crate::error::CoreError;

/// Maximum length for a workflow or stage name.
pub const MAX_NAME_LENGTH: usize = 120;

/// One stage in a workflow definition, as submitted by an admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSpec {
    /// 1-based position in the workflow; must be unique and contiguous.
    pub stage_order: i32,
    pub name: String,
    /// Display color in `#RRGGBB` hex format.
    pub color: String,
}

/// Validate a workflow name.
pub fn validate_workflow_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Workflow name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Workflow name exceeds maximum length of {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate that a stage color is in hex format `#RRGGBB`.
pub fn validate_stage_color(color: &str) -> Result<(), CoreError> {
    if color.len() != 7 {
        return Err(CoreError::Validation(format!(
            "Invalid color '{color}'. Must be in #RRGGBB hex format"
        )));
    }

    if !color.starts_with('#') {
        return Err(CoreError::Validation(format!(
            "Invalid color '{color}'. Must start with '#'"
        )));
    }

    let hex_part = &color[1..];
    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::Validation(format!(
            "Invalid color '{color}'. Must contain only hex digits after '#'"
        )));
    }

    Ok(())
}

/// Validate a full stage list: non-empty, valid names and colors, and
/// stage orders forming a contiguous ascending sequence starting at 1.
pub fn validate_stages(stages: &[StageSpec]) -> Result<(), CoreError> {
    if stages.is_empty() {
        return Err(CoreError::Validation(
            "A workflow must define at least one stage".to_string(),
        ));
    }

    for (idx, stage) in stages.iter().enumerate() {
        let expected = (idx + 1) as i32;
        if stage.stage_order != expected {
            return Err(CoreError::Validation(format!(
                "Stage orders must be contiguous starting at 1; \
                 position {idx} has order {} (expected {expected})",
                stage.stage_order
            )));
        }

        if stage.name.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Stage {expected} must have a non-empty name"
            )));
        }
        if stage.name.len() > MAX_NAME_LENGTH {
            return Err(CoreError::Validation(format!(
                "Stage {expected} name exceeds maximum length of {MAX_NAME_LENGTH} characters"
            )));
        }

        validate_stage_color(&stage.color)?;
    }

    Ok(())
}

/// Validate an edit against the orders already referenced by in-progress
/// ledgers. Once any mockup has entered a stage, that stage (and everything
/// before it) may not be removed or reordered; appending new stages after
/// the highest referenced order is always allowed.
pub fn validate_stage_edit(
    new_stages: &[StageSpec],
    highest_referenced_order: Option<i32>,
) -> Result<(), CoreError> {
    validate_stages(new_stages)?;

    if let Some(highest) = highest_referenced_order {
        let new_max = new_stages.len() as i32;
        if new_max < highest {
            return Err(CoreError::Conflict(format!(
                "Cannot remove stages up to order {highest}: they are referenced \
                 by in-progress reviews"
            )));
        }
    }

    Ok(())
}
