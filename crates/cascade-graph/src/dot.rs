//! Graphviz export
//!
//! Edges point from dependent to dependency. Skipped objects are dashed,
//! undeployable objects red. Output is sorted and stable.

use crate::graph::DependencyGraph;
use std::fmt::Write as _;

impl DependencyGraph {
    /// Render as a Graphviz digraph
    ///
    /// # Example
    /// ```
    /// use cascade_core::{ConfigKind, ConfigObject, Coordinate, ProjectDependencies};
    /// use cascade_graph::GraphBuilder;
    ///
    /// let objects = vec![ConfigObject::new(
    ///     Coordinate::new("p", "auto-tag", "t1"),
    ///     ConfigKind::ClassicApi { api: "auto-tag".into() },
    ///     "dev",
    /// )];
    /// let built = GraphBuilder::new().build_environment("dev", &objects, &ProjectDependencies::new());
    ///
    /// assert!(built.graph.to_dot().contains("\"p:auto-tag:t1\";"));
    /// ```
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = writeln!(out, "digraph {} {{", quote(&format!("dependency_graph_{}", self.environment())));

        for coordinate in self.coordinates() {
            let skipped = self.object(coordinate).is_some_and(cascade_core::ConfigObject::skip);
            let mut attributes = Vec::new();
            if skipped {
                attributes.push("style=dashed");
            }
            if !self.is_deployable(coordinate) {
                attributes.push("color=red");
            }

            let node = quote(&coordinate.to_string());
            if attributes.is_empty() {
                let _ = writeln!(out, "  {node};");
            } else {
                let _ = writeln!(out, "  {node} [{}];", attributes.join(", "));
            }
        }

        for coordinate in self.coordinates() {
            let from = quote(&coordinate.to_string());
            for dependency in self.dependencies_of(coordinate) {
                let _ = writeln!(out, "  {from} -> {};", quote(&dependency.to_string()));
            }
        }

        out.push_str("}\n");
        out
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
