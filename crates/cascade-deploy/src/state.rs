//! Node state machine
//!
//! ```text
//! Pending -> Skipped
//! Pending -> Deploying -> Deployed
//! Pending -> Deploying -> Failed
//! Pending -> Blocked      (a dependency was skipped, failed, blocked or excluded)
//! Pending -> Excluded     (structurally undeployable)
//! ```
//!
//! Every state but `Pending` and `Deploying` is terminal.

use serde::{Deserialize, Serialize};

/// Deployment state of one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeState {
    /// Not yet visited
    Pending,
    /// Marked skip, never deployed
    Skipped,
    /// Deploy call in flight
    Deploying,
    /// Deployed successfully
    Deployed,
    /// Deploy call failed
    Failed,
    /// Not attempted because of a dependency or an abort
    Blocked,
    /// Cycle member or dangling reference
    Excluded,
}

impl NodeState {
    /// True once no further transition is allowed
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        allowed_transitions(self).is_empty()
    }

    /// True if dependents of a node in this state must not be deployed
    #[inline]
    #[must_use]
    pub fn blocks_dependents(self) -> bool {
        matches!(
            self,
            Self::Skipped | Self::Failed | Self::Blocked | Self::Excluded
        )
    }
}

/// Illegal state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal state transition {from:?} -> {to:?}")]
pub struct StateError {
    /// Current state
    pub from: NodeState,
    /// Requested state
    pub to: NodeState,
}

/// Validate a state transition
///
/// # Errors
/// [`StateError`] if `to` is not reachable from `from` in one step.
pub fn validate_transition(from: NodeState, to: NodeState) -> Result<(), StateError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(StateError { from, to })
    }
}

/// States reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: NodeState) -> &'static [NodeState] {
    use NodeState::{Blocked, Deployed, Deploying, Excluded, Failed, Pending, Skipped};
    match from {
        Pending => &[Skipped, Deploying, Blocked, Excluded],
        Deploying => &[Deployed, Failed],
        Skipped | Deployed | Failed | Blocked | Excluded => &[],
    }
}
