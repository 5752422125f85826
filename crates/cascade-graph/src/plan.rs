//! Per-environment execution plans

use crate::builder::{BuiltGraph, GraphBuilder};
use crate::error::GraphError;
use crate::graph::DependencyGraph;
use crate::order::{decompose, Component};
use cascade_core::{dependencies_by_environment, objects_by_environment, Project};
use std::collections::BTreeMap;

/// Graph, ordered components and structural errors of one environment
#[derive(Debug, Clone)]
pub struct EnvironmentPlan {
    environment: String,
    graph: DependencyGraph,
    components: Vec<Component>,
    errors: Vec<GraphError>,
}

impl EnvironmentPlan {
    /// Decompose a built graph into a plan
    #[must_use]
    pub fn from_built(built: BuiltGraph) -> Self {
        let components = decompose(&built.graph);
        Self {
            environment: built.graph.environment().to_string(),
            graph: built.graph,
            components,
            errors: built.errors,
        }
    }

    /// Environment name
    #[inline]
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Dependency graph
    #[inline]
    #[must_use]
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Components sorted by smallest coordinate
    #[inline]
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Structural errors
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &[GraphError] {
        &self.errors
    }

    /// Number of objects in a deployable position
    #[must_use]
    pub fn deployable_count(&self) -> usize {
        self.components.iter().map(|c| c.order().len()).sum()
    }

    /// Split into graph, components and errors
    #[must_use]
    pub fn into_parts(self) -> (DependencyGraph, Vec<Component>, Vec<GraphError>) {
        (self.graph, self.components, self.errors)
    }
}

/// Build and decompose every environment the projects have objects in
#[must_use]
pub fn plan(projects: &[Project], builder: &GraphBuilder) -> BTreeMap<String, EnvironmentPlan> {
    let objects = objects_by_environment(projects);
    let dependencies = dependencies_by_environment(projects);

    builder
        .build(&objects, &dependencies)
        .into_iter()
        .map(|(environment, built)| (environment, EnvironmentPlan::from_built(built)))
        .collect()
}
