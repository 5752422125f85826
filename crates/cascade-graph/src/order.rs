//! Topological grouping
//!
//! [`decompose`] splits a graph into weakly connected components and orders
//! each with Kahn's algorithm. Ties are broken by coordinate order, so the
//! result depends only on the graph's content.
//!
//! Undeployable objects are left out of the order. Their outgoing edges do
//! not hold back dependents; those are blocked at deploy time instead.
//! Gate nodes are released as soon as their last dependency is ordered,
//! which makes the order identical to the materialized representation.

use crate::graph::DependencyGraph;
use cascade_core::Coordinate;
use petgraph::graph::NodeIndex;
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};
use tracing::warn;

/// One independently deployable part of a graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    index: usize,
    order: Vec<Coordinate>,
    excluded: Vec<Coordinate>,
}

impl Component {
    /// Position among the graph's components
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Deployable objects, dependencies first
    #[inline]
    #[must_use]
    pub fn order(&self) -> &[Coordinate] {
        &self.order
    }

    /// Objects that cannot be ordered, sorted
    #[inline]
    #[must_use]
    pub fn excluded(&self) -> &[Coordinate] {
        &self.excluded
    }

    /// Number of objects in the component
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len() + self.excluded.len()
    }

    /// True if the component has no objects
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if `coordinate` belongs to this component
    #[must_use]
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.order.contains(coordinate) || self.excluded.contains(coordinate)
    }

    /// Smallest coordinate of the component
    fn min_coordinate(&self) -> Option<&Coordinate> {
        self.order.iter().chain(&self.excluded).min()
    }
}

/// Split `graph` into ordered components
///
/// Components are sorted by their smallest coordinate.
#[must_use]
pub fn decompose(graph: &DependencyGraph) -> Vec<Component> {
    let inner = graph.inner();

    let mut sets = UnionFind::<usize>::new(inner.node_count());
    for edge in inner.edge_references() {
        sets.union(edge.source().index(), edge.target().index());
    }

    let mut groups: BTreeMap<usize, Vec<NodeIndex>> = BTreeMap::new();
    for idx in inner.node_indices() {
        groups.entry(sets.find(idx.index())).or_default().push(idx);
    }

    let mut components: Vec<Component> = groups
        .into_values()
        .filter_map(|nodes| order_component(graph, &nodes))
        .collect();

    components.sort_by(|a, b| a.min_coordinate().cmp(&b.min_coordinate()));
    for (i, component) in components.iter_mut().enumerate() {
        component.index = i;
    }
    components
}

/// Kahn's algorithm over one component; `None` if it holds only gates
fn order_component(graph: &DependencyGraph, nodes: &[NodeIndex]) -> Option<Component> {
    let inner = graph.inner();

    let removed = |idx: NodeIndex| -> bool {
        inner
            .node_weight(idx)
            .and_then(|node| node.coordinate())
            .is_some_and(|c| !graph.is_deployable(c))
    };

    let mut in_degree: BTreeMap<NodeIndex, usize> = BTreeMap::new();
    let mut excluded = Vec::new();
    for &idx in nodes {
        if removed(idx) {
            if let Some(c) = inner.node_weight(idx).and_then(|node| node.coordinate()) {
                excluded.push(c.clone());
            }
            continue;
        }
        let degree = inner
            .neighbors_directed(idx, Direction::Incoming)
            .filter(|&from| !removed(from))
            .count();
        in_degree.insert(idx, degree);
    }

    let mut ready: BinaryHeap<Reverse<(Coordinate, NodeIndex)>> = BinaryHeap::new();
    let mut gates: Vec<NodeIndex> = Vec::new();
    for (&idx, &degree) in &in_degree {
        if degree == 0 {
            enqueue(graph, idx, &mut ready, &mut gates);
        }
    }

    let mut order = Vec::with_capacity(in_degree.len());
    loop {
        // Gates are released before the next object is chosen
        let next = if let Some(gate) = gates.pop() {
            gate
        } else if let Some(Reverse((coordinate, idx))) = ready.pop() {
            order.push(coordinate);
            idx
        } else {
            break;
        };

        for to in inner.neighbors_directed(next, Direction::Outgoing) {
            if let Some(degree) = in_degree.get_mut(&to) {
                *degree = degree.saturating_sub(1);
                if *degree == 0 {
                    enqueue(graph, to, &mut ready, &mut gates);
                }
            }
        }
        in_degree.remove(&next);
    }

    // Anything left is on a cycle the builder missed
    for idx in in_degree.into_keys() {
        if let Some(c) = inner.node_weight(idx).and_then(|node| node.coordinate()) {
            warn!(
                environment = graph.environment(),
                coordinate = %c,
                "object could not be ordered, excluded"
            );
            excluded.push(c.clone());
        }
    }

    if order.is_empty() && excluded.is_empty() {
        return None;
    }
    excluded.sort();

    Some(Component {
        index: 0,
        order,
        excluded,
    })
}

fn enqueue(
    graph: &DependencyGraph,
    idx: NodeIndex,
    ready: &mut BinaryHeap<Reverse<(Coordinate, NodeIndex)>>,
    gates: &mut Vec<NodeIndex>,
) {
    if graph.is_gate(idx) {
        gates.push(idx);
    } else if let Some(c) = graph.inner().node_weight(idx).and_then(|node| node.coordinate()) {
        ready.push(Reverse((c.clone(), idx)));
    }
}
