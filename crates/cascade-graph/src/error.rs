//! Structural errors found while building a dependency graph
//!
//! Structural errors never abort construction. They mark the affected
//! objects undeployable and are reported alongside the graph.

use cascade_core::Coordinate;
use std::fmt::{self, Display, Formatter};

/// One dependency cycle
///
/// Members are the configuration objects of one strongly connected
/// component, in coordinate order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleError {
    members: Vec<Coordinate>,
}

impl CycleError {
    /// Create from the participating coordinates
    #[must_use]
    pub fn new(mut members: Vec<Coordinate>) -> Self {
        members.sort();
        members.dedup();
        Self { members }
    }

    /// Participating coordinates, sorted
    #[inline]
    #[must_use]
    pub fn members(&self) -> &[Coordinate] {
        &self.members
    }

    /// Check if `coordinate` is part of the cycle
    #[inline]
    #[must_use]
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.members.binary_search(coordinate).is_ok()
    }
}

impl Display for CycleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("dependency cycle between ")?;
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{member}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CycleError {}

/// Structural error of one environment's graph
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Objects depend on each other in a cycle
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// A reference points at an object that does not exist in the environment
    #[error("{referrer} references {target}, which is not defined in environment {environment}")]
    DanglingReference {
        /// Referencing object
        referrer: Coordinate,
        /// Missing target
        target: Coordinate,
        /// Environment
        environment: String,
    },

    /// Two objects share a coordinate; the first one is kept
    #[error("configuration {coordinate} is defined more than once in environment {environment}")]
    DuplicateCoordinate {
        /// Duplicated coordinate
        coordinate: Coordinate,
        /// Environment
        environment: String,
    },
}

impl GraphError {
    /// Coordinates made undeployable by this error
    #[must_use]
    pub fn affected(&self) -> Vec<&Coordinate> {
        match self {
            Self::Cycle(cycle) => cycle.members().iter().collect(),
            Self::DanglingReference { referrer, .. } => vec![referrer],
            Self::DuplicateCoordinate { .. } => Vec::new(),
        }
    }
}
