//! State bookkeeping for one component
//!
//! No edges cross component boundaries, so every dependency of a node is
//! tracked in the same [`StateTracker`].

use crate::state::{validate_transition, NodeState, StateError};
use cascade_core::{ConfigObject, Coordinate};
use cascade_graph::{Component, DependencyGraph};
use std::collections::HashMap;
use tracing::debug;

/// States of every node of one component
#[derive(Debug, Clone)]
pub struct StateTracker {
    states: HashMap<Coordinate, NodeState>,
}

impl StateTracker {
    /// Ordered nodes start `Pending`, excluded ones `Excluded`
    ///
    /// Excluded objects marked skip start `Skipped` instead.
    #[must_use]
    pub fn new(graph: &DependencyGraph, component: &Component) -> Self {
        let mut states: HashMap<Coordinate, NodeState> = component
            .order()
            .iter()
            .map(|c| (c.clone(), NodeState::Pending))
            .collect();
        states.extend(component.excluded().iter().map(|c| {
            let state = if graph.object(c).is_some_and(ConfigObject::skip) {
                NodeState::Skipped
            } else {
                NodeState::Excluded
            };
            (c.clone(), state)
        }));
        Self { states }
    }

    /// Current state, `None` for nodes outside the component
    #[inline]
    #[must_use]
    pub fn state(&self, coordinate: &Coordinate) -> Option<NodeState> {
        self.states.get(coordinate).copied()
    }

    /// Move `coordinate` to `to`
    ///
    /// # Errors
    /// [`StateError`] for illegal transitions or unknown nodes.
    pub fn transition(&mut self, coordinate: &Coordinate, to: NodeState) -> Result<(), StateError> {
        let Some(state) = self.states.get_mut(coordinate) else {
            return Err(StateError {
                from: NodeState::Pending,
                to,
            });
        };
        validate_transition(*state, to)?;
        debug!(coordinate = %coordinate, from = ?*state, to = ?to, "node transition");
        *state = to;
        Ok(())
    }

    /// True if any dependency of `coordinate` prevents deploying it
    ///
    /// Dependencies outside the component count as blocking.
    #[must_use]
    pub fn is_blocked(&self, graph: &DependencyGraph, coordinate: &Coordinate) -> bool {
        graph
            .dependencies_of(coordinate)
            .iter()
            .any(|dependency| self.state(dependency).map_or(true, NodeState::blocks_dependents))
    }

    /// Move every pending transitive dependent of `coordinate` to `Blocked`
    ///
    /// Returns the number of nodes blocked.
    pub fn block_dependents(&mut self, graph: &DependencyGraph, coordinate: &Coordinate) -> usize {
        let mut blocked = 0;
        for dependent in graph.transitive_dependents(coordinate) {
            if self.state(&dependent) == Some(NodeState::Pending)
                && self.transition(&dependent, NodeState::Blocked).is_ok()
            {
                blocked += 1;
            }
        }
        blocked
    }

    /// Move every pending node to `Blocked`
    pub fn block_pending(&mut self) -> usize {
        let mut blocked = 0;
        for state in self.states.values_mut() {
            if *state == NodeState::Pending {
                *state = NodeState::Blocked;
                blocked += 1;
            }
        }
        blocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_core::{ConfigKind, Parameter, ProjectDependencies};
    use cascade_graph::{decompose, GraphBuilder};

    fn c(id: &str) -> Coordinate {
        Coordinate::new("p", "t", id)
    }

    /// a <- b <- c, plus d depending on nothing in another component
    fn setup() -> (DependencyGraph, Vec<Component>) {
        let kind = ConfigKind::ClassicApi { api: "t".into() };
        let object = |id: &str| ConfigObject::new(c(id), kind.clone(), "dev");
        let objects = vec![
            object("a"),
            object("b").with_parameter("a", Parameter::reference(c("a"), "id")),
            object("c").with_parameter("b", Parameter::reference(c("b"), "id")),
            object("d"),
        ];
        let built = GraphBuilder::new().build_environment("dev", &objects, &ProjectDependencies::new());
        let components = decompose(&built.graph);
        (built.graph, components)
    }

    #[test]
    fn failure_blocks_transitive_dependents() {
        let (graph, components) = setup();
        let mut tracker = StateTracker::new(&graph, &components[0]);

        tracker.transition(&c("a"), NodeState::Deploying).unwrap();
        tracker.transition(&c("a"), NodeState::Failed).unwrap();
        assert_eq!(tracker.block_dependents(&graph, &c("a")), 2);

        assert_eq!(tracker.state(&c("b")), Some(NodeState::Blocked));
        assert_eq!(tracker.state(&c("c")), Some(NodeState::Blocked));
        assert_eq!(tracker.state(&c("d")), None);
    }

    #[test]
    fn blocked_check_reads_dependency_states() {
        let (graph, components) = setup();
        let mut tracker = StateTracker::new(&graph, &components[0]);

        assert!(!tracker.is_blocked(&graph, &c("a")));
        assert!(!tracker.is_blocked(&graph, &c("b")));

        tracker.transition(&c("a"), NodeState::Skipped).unwrap();
        assert!(tracker.is_blocked(&graph, &c("b")));
        assert!(!tracker.is_blocked(&graph, &c("c")));
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        let (graph, components) = setup();
        let mut tracker = StateTracker::new(&graph, &components[0]);

        assert!(tracker.transition(&c("a"), NodeState::Deployed).is_err());
        assert!(tracker.transition(&c("zzz"), NodeState::Deploying).is_err());
        assert_eq!(tracker.block_pending(), 3);
        assert!(tracker.transition(&c("a"), NodeState::Deploying).is_err());
    }

    #[test]
    fn skipped_cycle_members_start_skipped() {
        let kind = ConfigKind::ClassicApi { api: "t".into() };
        let objects = vec![
            ConfigObject::new(c("x"), kind.clone(), "dev")
                .with_parameter("y", Parameter::reference(c("y"), "id"))
                .with_skip(true),
            ConfigObject::new(c("y"), kind, "dev")
                .with_parameter("x", Parameter::reference(c("x"), "id")),
        ];
        let built = GraphBuilder::new().build_environment("dev", &objects, &ProjectDependencies::new());
        let components = decompose(&built.graph);
        let tracker = StateTracker::new(&built.graph, &components[0]);

        assert_eq!(tracker.state(&c("x")), Some(NodeState::Skipped));
        assert_eq!(tracker.state(&c("y")), Some(NodeState::Excluded));
    }
}
