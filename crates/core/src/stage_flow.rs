//! Quorum evaluation and stage-transition decisions.
//!
//! The approval workflow engine calls [`evaluate`] after every recorded
//! reviewer decision to determine what happens to the current stage. The
//! functions here are pure: counter adjustment, row locking, and stage
//! advancement are the engine's job (`mockdeck-workflow`), which keeps the
//! transition rules testable without a database.

use serde::Serialize;

use crate::decision::{DECISION_APPROVE, DECISION_REQUEST_CHANGES};
use crate::error::CoreError;

/// Outcome of evaluating a reviewer decision against the current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// The approval counted but quorum is not yet met; the stage stays in review.
    PartialApproval,
    /// Quorum met and a later stage exists; the mockup advances.
    StageAdvanced,
    /// Quorum met on the last stage; the mockup awaits final approval.
    AwaitingFinalApproval,
    /// A reviewer requested changes; the stage's counter resets.
    ChangesRequested,
}

/// True once a stage has collected enough distinct-reviewer approvals.
///
/// Judged at evaluation time: if the requirement was lowered below the
/// already-received count by a reassignment, the stage is satisfied. An
/// already-approved stage is never re-opened by a later raise.
pub fn quorum_satisfied(approvals_received: i32, approvals_required: i32) -> bool {
    approvals_received >= approvals_required
}

/// True for stages that close without any reviewer action.
///
/// A stage snapshotted with `approvals_required = 0` (no reviewers assigned)
/// must auto-approve at entry time, in the same tick that created it.
pub fn auto_approves_on_entry(approvals_required: i32) -> bool {
    approvals_required == 0
}

/// Decide the transition for a decision applied to the current stage.
///
/// `approvals_received` must already include the decision being evaluated
/// (the recorder adjusts the counter before calling in). `is_last_stage`
/// reports whether the stage's order is the highest in the mockup's
/// workflow snapshot.
pub fn evaluate(
    decision: &str,
    approvals_received: i32,
    approvals_required: i32,
    is_last_stage: bool,
) -> Result<TransitionKind, CoreError> {
    match decision {
        DECISION_REQUEST_CHANGES => Ok(TransitionKind::ChangesRequested),
        DECISION_APPROVE => {
            if !quorum_satisfied(approvals_received, approvals_required) {
                Ok(TransitionKind::PartialApproval)
            } else if is_last_stage {
                Ok(TransitionKind::AwaitingFinalApproval)
            } else {
                Ok(TransitionKind::StageAdvanced)
            }
        }
        other => Err(CoreError::Validation(format!(
            "Cannot evaluate unknown decision '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_approval_below_quorum() {
        let t = evaluate(DECISION_APPROVE, 1, 2, false).unwrap();
        assert_eq!(t, TransitionKind::PartialApproval);
    }

    #[test]
    fn test_stage_advances_at_quorum() {
        let t = evaluate(DECISION_APPROVE, 2, 2, false).unwrap();
        assert_eq!(t, TransitionKind::StageAdvanced);
    }

    #[test]
    fn test_last_stage_awaits_final_approval() {
        let t = evaluate(DECISION_APPROVE, 1, 1, true).unwrap();
        assert_eq!(t, TransitionKind::AwaitingFinalApproval);
    }

    #[test]
    fn test_changes_requested_wins_regardless_of_count() {
        // A rejection is a rejection even if quorum was technically reached.
        let t = evaluate(DECISION_REQUEST_CHANGES, 5, 2, false).unwrap();
        assert_eq!(t, TransitionKind::ChangesRequested);
    }

    #[test]
    fn test_over_satisfied_quorum_still_advances() {
        // Requirement was lowered mid-review; received > required is satisfied.
        let t = evaluate(DECISION_APPROVE, 3, 1, false).unwrap();
        assert_eq!(t, TransitionKind::StageAdvanced);
    }

    #[test]
    fn test_unknown_decision_is_an_error() {
        assert!(evaluate("flag", 1, 1, false).is_err());
    }

    #[test]
    fn test_zero_quorum_auto_approves() {
        assert!(auto_approves_on_entry(0));
        assert!(!auto_approves_on_entry(1));
    }

    #[test]
    fn test_quorum_satisfied_boundaries() {
        assert!(quorum_satisfied(2, 2));
        assert!(quorum_satisfied(3, 2));
        assert!(!quorum_satisfied(1, 2));
        assert!(quorum_satisfied(0, 0));
    }
}
