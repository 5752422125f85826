//! Deployment results
//!
//! A [`DeploymentReport`] is created fresh per run and never persisted.

use crate::error::{DeployError, DeploymentError};
use crate::state::NodeState;
use cascade_core::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Final outcome of one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// Deployed
    Success,
    /// Marked skip
    Skipped,
    /// Not attempted because a dependency was skipped or failed, or the run aborted
    FailedDependency,
    /// Deploy call failed
    Failed,
    /// Structurally undeployable
    Excluded,
}

impl Outcome {
    /// Outcome of a terminal state; `None` for `Pending` and `Deploying`
    #[must_use]
    pub fn from_state(state: NodeState) -> Option<Self> {
        match state {
            NodeState::Deployed => Some(Self::Success),
            NodeState::Skipped => Some(Self::Skipped),
            NodeState::Blocked => Some(Self::FailedDependency),
            NodeState::Failed => Some(Self::Failed),
            NodeState::Excluded => Some(Self::Excluded),
            NodeState::Pending | NodeState::Deploying => None,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Skipped => "skipped",
            Self::FailedDependency => "failed-dependency",
            Self::Failed => "failed",
            Self::Excluded => "excluded",
        })
    }
}

/// Result of one node
#[derive(Debug, Clone)]
pub struct NodeResult {
    /// Node
    pub coordinate: Coordinate,
    /// Outcome
    pub outcome: Outcome,
    /// Cause, for failed nodes
    pub error: Option<DeployError>,
}

/// Results and errors of one environment
#[derive(Debug, Clone, Default)]
pub struct EnvironmentReport {
    /// Node results, component by component in deployment order
    pub results: Vec<NodeResult>,
    /// Structural errors first, then deployment errors
    pub errors: Vec<DeploymentError>,
}

impl EnvironmentReport {
    /// Result of one node
    #[must_use]
    pub fn result(&self, coordinate: &Coordinate) -> Option<&NodeResult> {
        self.results.iter().find(|r| &r.coordinate == coordinate)
    }

    /// Outcome of one node
    #[must_use]
    pub fn outcome(&self, coordinate: &Coordinate) -> Option<Outcome> {
        self.result(coordinate).map(|r| r.outcome)
    }

    /// Number of nodes per outcome
    #[must_use]
    pub fn outcome_counts(&self) -> BTreeMap<Outcome, usize> {
        let mut counts = BTreeMap::new();
        for result in &self.results {
            *counts.entry(result.outcome).or_insert(0) += 1;
        }
        counts
    }

    /// True if the environment reported any error
    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Per-environment results of one run
#[derive(Debug, Clone, Default)]
pub struct DeploymentReport {
    /// Environment name -> report
    pub environments: BTreeMap<String, EnvironmentReport>,
}

impl DeploymentReport {
    /// Report of one environment
    #[inline]
    #[must_use]
    pub fn environment(&self, name: &str) -> Option<&EnvironmentReport> {
        self.environments.get(name)
    }

    /// True if any environment reported an error
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.environments.values().any(EnvironmentReport::has_errors)
    }

    /// Number of errors per environment, including environments without errors
    #[must_use]
    pub fn error_counts(&self) -> BTreeMap<String, usize> {
        self.environments
            .iter()
            .map(|(name, report)| (name.clone(), report.errors.len()))
            .collect()
    }

    /// Errors of every environment that has any
    #[must_use]
    pub fn into_errors(self) -> BTreeMap<String, Vec<DeploymentError>> {
        self.environments
            .into_iter()
            .filter(|(_, report)| report.has_errors())
            .map(|(name, report)| (name, report.errors))
            .collect()
    }
}
