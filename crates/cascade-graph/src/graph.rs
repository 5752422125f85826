//! Dependency graph of one environment
//!
//! Nodes are configuration objects. Declared project dependencies are
//! either materialized as object-to-object edges or routed through one
//! virtual gate node per project pair; queries look through gates, so
//! both representations answer identically.
//!
//! Edges are stored from dependency to dependent (deployment direction).

use cascade_core::{ConfigObject, Coordinate};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet};

/// How declared project dependencies become edges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ProjectDependencyMode {
    /// One gate node per project pair, O(n + m) edges
    #[default]
    Grouped,

    /// One edge per object pair, O(n * m) edges
    Materialized,
}

/// Node payload
#[derive(Debug, Clone)]
pub(crate) enum GraphNode {
    /// Configuration object
    Config(ConfigObject),

    /// Every object of `dependency` precedes every object of `dependent`
    Gate {
        dependent: String,
        dependency: String,
    },
}

impl GraphNode {
    pub(crate) fn coordinate(&self) -> Option<&Coordinate> {
        match self {
            Self::Config(object) => Some(object.coordinate()),
            Self::Gate { .. } => None,
        }
    }
}

/// Dependency graph of one environment
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    environment: String,
    mode: ProjectDependencyMode,
    graph: DiGraph<GraphNode, ()>,
    index: BTreeMap<Coordinate, NodeIndex>,
    undeployable: BTreeSet<Coordinate>,
}

impl DependencyGraph {
    pub(crate) fn new(environment: impl Into<String>, mode: ProjectDependencyMode) -> Self {
        Self {
            environment: environment.into(),
            mode,
            graph: DiGraph::new(),
            index: BTreeMap::new(),
            undeployable: BTreeSet::new(),
        }
    }

    /// Add an object; returns `None` if its coordinate is already present
    pub(crate) fn add_object(&mut self, object: ConfigObject) -> Option<NodeIndex> {
        if self.index.contains_key(object.coordinate()) {
            return None;
        }
        let coordinate = object.coordinate().clone();
        let idx = self.graph.add_node(GraphNode::Config(object));
        self.index.insert(coordinate, idx);
        Some(idx)
    }

    pub(crate) fn add_gate(&mut self, dependent: &str, dependency: &str) -> NodeIndex {
        self.graph.add_node(GraphNode::Gate {
            dependent: dependent.to_string(),
            dependency: dependency.to_string(),
        })
    }

    /// Add edge `dependency -> dependent`
    pub(crate) fn add_edge(&mut self, dependency: NodeIndex, dependent: NodeIndex) {
        self.graph.add_edge(dependency, dependent, ());
    }

    pub(crate) fn mark_undeployable(&mut self, coordinate: Coordinate) {
        self.undeployable.insert(coordinate);
    }

    #[inline]
    pub(crate) fn inner(&self) -> &DiGraph<GraphNode, ()> {
        &self.graph
    }

    #[inline]
    pub(crate) fn node_index(&self, coordinate: &Coordinate) -> Option<NodeIndex> {
        self.index.get(coordinate).copied()
    }

    #[inline]
    pub(crate) fn is_gate(&self, idx: NodeIndex) -> bool {
        matches!(self.graph.node_weight(idx), Some(GraphNode::Gate { .. }))
    }

    /// Environment name
    #[inline]
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Project dependency representation in use
    #[inline]
    #[must_use]
    pub fn mode(&self) -> ProjectDependencyMode {
        self.mode
    }

    /// Number of configuration objects
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    /// Number of distinct object-to-object dependencies, gates expanded
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.index
            .values()
            .map(|&idx| self.neighbor_configs(idx, Direction::Incoming).len())
            .sum()
    }

    /// Number of stored edges, gate edges counted individually
    #[inline]
    #[must_use]
    pub fn stored_edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of gate nodes
    #[must_use]
    pub fn gate_count(&self) -> usize {
        self.graph.node_count() - self.index.len()
    }

    /// Project pairs `(dependent, dependency)` represented by gate nodes
    #[must_use]
    pub fn gates(&self) -> Vec<(&str, &str)> {
        let mut gates: Vec<(&str, &str)> = self
            .graph
            .node_weights()
            .filter_map(|node| match node {
                GraphNode::Gate {
                    dependent,
                    dependency,
                } => Some((dependent.as_str(), dependency.as_str())),
                GraphNode::Config(_) => None,
            })
            .collect();
        gates.sort_unstable();
        gates
    }

    /// All coordinates, sorted
    pub fn coordinates(&self) -> impl Iterator<Item = &Coordinate> {
        self.index.keys()
    }

    /// Check if the graph has an object at `coordinate`
    #[inline]
    #[must_use]
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.index.contains_key(coordinate)
    }

    /// Object at `coordinate`
    #[must_use]
    pub fn object(&self, coordinate: &Coordinate) -> Option<&ConfigObject> {
        let idx = self.node_index(coordinate)?;
        match self.graph.node_weight(idx)? {
            GraphNode::Config(object) => Some(object),
            GraphNode::Gate { .. } => None,
        }
    }

    /// True if the object exists and no structural error affects it
    #[must_use]
    pub fn is_deployable(&self, coordinate: &Coordinate) -> bool {
        self.contains(coordinate) && !self.undeployable.contains(coordinate)
    }

    /// Objects marked undeployable by cycles or dangling references, sorted
    pub fn undeployable(&self) -> impl Iterator<Item = &Coordinate> {
        self.undeployable.iter()
    }

    /// Direct dependencies of `coordinate`
    #[must_use]
    pub fn dependencies_of(&self, coordinate: &Coordinate) -> BTreeSet<Coordinate> {
        self.node_index(coordinate)
            .map(|idx| self.neighbor_configs(idx, Direction::Incoming))
            .unwrap_or_default()
    }

    /// Direct dependents of `coordinate`
    #[must_use]
    pub fn dependents_of(&self, coordinate: &Coordinate) -> BTreeSet<Coordinate> {
        self.node_index(coordinate)
            .map(|idx| self.neighbor_configs(idx, Direction::Outgoing))
            .unwrap_or_default()
    }

    /// Every object that directly or indirectly depends on `coordinate`
    #[must_use]
    pub fn transitive_dependents(&self, coordinate: &Coordinate) -> BTreeSet<Coordinate> {
        let mut out = BTreeSet::new();
        let Some(start) = self.node_index(coordinate) else {
            return out;
        };

        let mut seen = BTreeSet::from([start]);
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            for next in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if !seen.insert(next) {
                    continue;
                }
                if let Some(c) = self.graph.node_weight(next).and_then(GraphNode::coordinate) {
                    if c != coordinate {
                        out.insert(c.clone());
                    }
                }
                stack.push(next);
            }
        }

        out
    }

    /// Configuration neighbours of `idx`, looking through gates
    fn neighbor_configs(&self, idx: NodeIndex, direction: Direction) -> BTreeSet<Coordinate> {
        let mut out = BTreeSet::new();
        for next in self.graph.neighbors_directed(idx, direction) {
            match self.graph.node_weight(next) {
                Some(GraphNode::Config(object)) => {
                    out.insert(object.coordinate().clone());
                }
                Some(GraphNode::Gate { .. }) => {
                    for beyond in self.graph.neighbors_directed(next, direction) {
                        if let Some(c) = self.graph.node_weight(beyond).and_then(GraphNode::coordinate)
                        {
                            out.insert(c.clone());
                        }
                    }
                }
                None => {}
            }
        }
        out
    }
}
