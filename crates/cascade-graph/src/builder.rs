//! Dependency graph construction
//!
//! [`GraphBuilder`] assembles one [`DependencyGraph`] per environment:
//!
//! 1. one node per object, first object wins on duplicate coordinates
//! 2. one edge per extracted reference; dangling references are reported
//! 3. declared project dependencies, grouped or materialized
//! 4. Tarjan SCC cycle detection; cycle members become undeployable
//!
//! Structural errors never abort construction. Skipped objects never raise
//! one: their dangling references and cycles made only of skipped objects
//! are logged and dropped.

use crate::error::{CycleError, GraphError};
use crate::graph::{DependencyGraph, ProjectDependencyMode};
use cascade_core::{ConfigObject, ProjectDependencies, ReferenceExtractor, ReferencePolicy};
use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// Graph plus the structural errors found while building it
#[derive(Debug, Clone)]
pub struct BuiltGraph {
    /// The graph
    pub graph: DependencyGraph,

    /// Duplicates, dangling references and cycles, in that order
    pub errors: Vec<GraphError>,
}

/// Builds dependency graphs
///
/// # Example
/// ```
/// use cascade_core::{ConfigKind, ConfigObject, Coordinate, Parameter, ProjectDependencies};
/// use cascade_graph::GraphBuilder;
///
/// let kind = ConfigKind::ClassicApi { api: "auto-tag".into() };
/// let objects = vec![
///     ConfigObject::new(Coordinate::new("p", "auto-tag", "a"), kind.clone(), "dev"),
///     ConfigObject::new(Coordinate::new("p", "auto-tag", "b"), kind, "dev").with_parameter(
///         "a",
///         Parameter::reference(Coordinate::new("", "auto-tag", "a"), "id"),
///     ),
/// ];
///
/// let built = GraphBuilder::new().build_environment("dev", &objects, &ProjectDependencies::new());
/// assert!(built.errors.is_empty());
/// assert_eq!(built.graph.edge_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    extractor: ReferenceExtractor,
    mode: ProjectDependencyMode,
}

impl GraphBuilder {
    /// Builder with the default policy and grouped project dependencies
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different can-reference policy
    #[must_use]
    pub fn with_policy(mut self, policy: impl ReferencePolicy + 'static) -> Self {
        self.extractor = ReferenceExtractor::new(policy);
        self
    }

    /// Set project dependency representation
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: ProjectDependencyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Project dependency representation
    #[inline]
    #[must_use]
    pub fn mode(&self) -> ProjectDependencyMode {
        self.mode
    }

    /// Build one graph per environment
    ///
    /// Environments with dependencies but no objects produce no graph.
    #[must_use]
    pub fn build(
        &self,
        objects: &BTreeMap<String, Vec<ConfigObject>>,
        dependencies: &BTreeMap<String, ProjectDependencies>,
    ) -> BTreeMap<String, BuiltGraph> {
        let empty = ProjectDependencies::new();
        objects
            .iter()
            .map(|(environment, objects)| {
                let deps = dependencies.get(environment).unwrap_or(&empty);
                (
                    environment.clone(),
                    self.build_environment(environment, objects, deps),
                )
            })
            .collect()
    }

    /// Build the graph of one environment
    #[must_use]
    pub fn build_environment(
        &self,
        environment: &str,
        objects: &[ConfigObject],
        dependencies: &ProjectDependencies,
    ) -> BuiltGraph {
        let mut graph = DependencyGraph::new(environment, self.mode);
        let mut errors = Vec::new();

        // Stable sort keeps input order among duplicates
        let mut sorted: Vec<&ConfigObject> = objects.iter().collect();
        sorted.sort_by(|a, b| a.coordinate().cmp(b.coordinate()));

        let mut added = Vec::with_capacity(sorted.len());
        for object in sorted {
            if let Some(idx) = graph.add_object(object.clone()) {
                added.push((idx, object));
            } else {
                warn!(
                    environment,
                    coordinate = %object.coordinate(),
                    "duplicate configuration ignored"
                );
                errors.push(GraphError::DuplicateCoordinate {
                    coordinate: object.coordinate().clone(),
                    environment: environment.to_string(),
                });
            }
        }

        let mut edges: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();

        for &(idx, object) in &added {
            for target in self.extractor.extract(object) {
                if let Some(target_idx) = graph.node_index(&target) {
                    if edges.insert((target_idx, idx)) {
                        graph.add_edge(target_idx, idx);
                    }
                } else if object.skip() {
                    warn!(
                        environment,
                        coordinate = %object.coordinate(),
                        target = %target,
                        "dangling reference of skipped configuration ignored"
                    );
                } else {
                    warn!(
                        environment,
                        coordinate = %object.coordinate(),
                        target = %target,
                        "dangling reference"
                    );
                    graph.mark_undeployable(object.coordinate().clone());
                    errors.push(GraphError::DanglingReference {
                        referrer: object.coordinate().clone(),
                        target,
                        environment: environment.to_string(),
                    });
                }
            }
        }

        self.add_project_edges(&mut graph, &added, dependencies, &mut edges);

        errors.extend(detect_cycles(&mut graph).into_iter().map(GraphError::from));

        info!(
            environment,
            objects = graph.node_count(),
            dependencies = graph.stored_edge_count(),
            gates = graph.gate_count(),
            errors = errors.len(),
            "dependency graph built"
        );

        BuiltGraph { graph, errors }
    }

    fn add_project_edges(
        &self,
        graph: &mut DependencyGraph,
        added: &[(NodeIndex, &ConfigObject)],
        dependencies: &ProjectDependencies,
        edges: &mut HashSet<(NodeIndex, NodeIndex)>,
    ) {
        let mut members: BTreeMap<&str, Vec<NodeIndex>> = BTreeMap::new();
        for &(idx, object) in added {
            members.entry(object.project()).or_default().push(idx);
        }

        for (dependent, targets) in dependencies {
            let Some(dependents) = members.get(dependent.as_str()) else {
                debug!(
                    environment = graph.environment(),
                    project = %dependent,
                    "project has no objects, dependencies ignored"
                );
                continue;
            };

            for dependency in targets {
                if dependency == dependent {
                    continue;
                }
                let Some(dependencies) = members.get(dependency.as_str()) else {
                    warn!(
                        environment = graph.environment(),
                        project = %dependent,
                        dependency = %dependency,
                        "project dependency has no objects in environment, ignored"
                    );
                    continue;
                };

                match self.mode {
                    ProjectDependencyMode::Grouped => {
                        let gate = graph.add_gate(dependent, dependency);
                        for &from in dependencies {
                            graph.add_edge(from, gate);
                        }
                        for &to in dependents {
                            graph.add_edge(gate, to);
                        }
                    }
                    ProjectDependencyMode::Materialized => {
                        for &from in dependencies {
                            for &to in dependents {
                                if edges.insert((from, to)) {
                                    graph.add_edge(from, to);
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Find cycles and mark their members undeployable
///
/// Gate nodes take part in detection but are never reported, neither are
/// cycles whose members are all skipped.
fn detect_cycles(graph: &mut DependencyGraph) -> Vec<CycleError> {
    let mut cycles: Vec<CycleError> = tarjan_scc(graph.inner())
        .into_iter()
        .filter(|scc| {
            scc.len() > 1 || scc.iter().any(|&idx| graph.inner().contains_edge(idx, idx))
        })
        .map(|scc| {
            CycleError::new(
                scc.into_iter()
                    .filter_map(|idx| graph.inner().node_weight(idx))
                    .filter_map(|node| node.coordinate().cloned())
                    .collect(),
            )
        })
        .filter(|cycle| !cycle.members().is_empty())
        .collect();
    cycles.sort();

    for cycle in &cycles {
        warn!(
            environment = graph.environment(),
            members = cycle.members().len(),
            "{cycle}"
        );
        for member in cycle.members() {
            graph.mark_undeployable(member.clone());
        }
    }

    cycles.retain(|cycle| {
        cycle
            .members()
            .iter()
            .any(|member| graph.object(member).is_some_and(|object| !object.skip()))
    });
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_core::{ConfigKind, Coordinate, Parameter};
    use std::collections::BTreeSet;

    fn object(project: &str, config_type: &str, id: &str) -> ConfigObject {
        ConfigObject::new(
            Coordinate::new(project, config_type, id),
            ConfigKind::ClassicApi {
                api: config_type.into(),
            },
            "dev",
        )
    }

    fn refs(object: ConfigObject, targets: &[(&str, &str, &str)]) -> ConfigObject {
        targets
            .iter()
            .enumerate()
            .fold(object, |object, (i, (p, t, id))| {
                object.with_parameter(
                    format!("r{i}"),
                    Parameter::reference(Coordinate::new(*p, *t, *id), "id"),
                )
            })
    }

    fn c(project: &str, config_type: &str, id: &str) -> Coordinate {
        Coordinate::new(project, config_type, id)
    }

    #[test]
    fn reference_edges() {
        let objects = vec![
            object("p", "auto-tag", "t1"),
            refs(object("p", "dashboard", "d1"), &[("", "auto-tag", "t1")]),
        ];
        let built = GraphBuilder::new().build_environment("dev", &objects, &ProjectDependencies::new());

        assert!(built.errors.is_empty());
        assert_eq!(
            built.graph.dependencies_of(&c("p", "dashboard", "d1")),
            BTreeSet::from([c("p", "auto-tag", "t1")])
        );
    }

    #[test]
    fn dangling_reference_is_reported() {
        let objects = vec![refs(
            object("p", "dashboard", "d1"),
            &[("", "auto-tag", "missing")],
        )];
        let built = GraphBuilder::new().build_environment("dev", &objects, &ProjectDependencies::new());

        assert_eq!(built.errors.len(), 1);
        assert!(matches!(
            &built.errors[0],
            GraphError::DanglingReference { target, .. } if target == &c("p", "auto-tag", "missing")
        ));
        assert!(!built.graph.is_deployable(&c("p", "dashboard", "d1")));
    }

    #[test]
    fn duplicate_keeps_first() {
        let first = object("p", "auto-tag", "t1").with_template("first");
        let second = object("p", "auto-tag", "t1").with_template("second");
        let built = GraphBuilder::new().build_environment(
            "dev",
            &[first, second],
            &ProjectDependencies::new(),
        );

        assert_eq!(built.errors.len(), 1);
        assert_eq!(
            built
                .graph
                .object(&c("p", "auto-tag", "t1"))
                .map(ConfigObject::template),
            Some("first")
        );
    }

    #[test]
    fn project_dependency_expands_to_all_members() {
        let objects = vec![
            object("p1", "auto-tag", "a1"),
            object("p1", "auto-tag", "a2"),
            object("p2", "auto-tag", "b1"),
        ];
        let deps = ProjectDependencies::from([("p1".to_string(), BTreeSet::from(["p2".to_string()]))]);

        for mode in [ProjectDependencyMode::Grouped, ProjectDependencyMode::Materialized] {
            let built = GraphBuilder::new()
                .with_mode(mode)
                .build_environment("dev", &objects, &deps);

            assert!(built.errors.is_empty());
            assert_eq!(built.graph.edge_count(), 2);
            for id in ["a1", "a2"] {
                assert_eq!(
                    built.graph.dependencies_of(&c("p1", "auto-tag", id)),
                    BTreeSet::from([c("p2", "auto-tag", "b1")])
                );
            }
        }
    }

    #[test]
    fn unknown_and_self_project_dependencies_are_ignored() {
        let objects = vec![object("p1", "auto-tag", "a1")];
        let deps = ProjectDependencies::from([(
            "p1".to_string(),
            BTreeSet::from(["p1".to_string(), "ghost".to_string()]),
        )]);
        let built = GraphBuilder::new().build_environment("dev", &objects, &deps);

        assert!(built.errors.is_empty());
        assert_eq!(built.graph.stored_edge_count(), 0);
        assert_eq!(built.graph.gate_count(), 0);
    }

    #[test]
    fn cycle_is_reported_once() {
        let objects = vec![
            refs(object("p", "auto-tag", "x"), &[("", "auto-tag", "y")]),
            refs(object("p", "auto-tag", "y"), &[("", "auto-tag", "z")]),
            refs(object("p", "auto-tag", "z"), &[("", "auto-tag", "x")]),
            object("p", "auto-tag", "w"),
        ];
        let built = GraphBuilder::new().build_environment("dev", &objects, &ProjectDependencies::new());

        assert_eq!(built.errors.len(), 1);
        let GraphError::Cycle(cycle) = &built.errors[0] else {
            panic!("expected cycle");
        };
        assert_eq!(
            cycle.members(),
            &[
                c("p", "auto-tag", "x"),
                c("p", "auto-tag", "y"),
                c("p", "auto-tag", "z")
            ]
        );
        assert!(built.graph.is_deployable(&c("p", "auto-tag", "w")));
        assert!(!built.graph.is_deployable(&c("p", "auto-tag", "x")));
    }

    #[test]
    fn skipped_objects_raise_no_structural_errors() {
        let objects = vec![
            refs(object("p", "auto-tag", "s"), &[("", "auto-tag", "gone")]).with_skip(true),
            refs(object("p", "auto-tag", "x"), &[("", "auto-tag", "y")]).with_skip(true),
            refs(object("p", "auto-tag", "y"), &[("", "auto-tag", "x")]).with_skip(true),
            refs(object("p", "auto-tag", "after"), &[("", "auto-tag", "s")]),
        ];
        let built = GraphBuilder::new().build_environment("dev", &objects, &ProjectDependencies::new());

        assert!(built.errors.is_empty());
        assert!(built.graph.is_deployable(&c("p", "auto-tag", "s")));
        assert_eq!(
            built.graph.dependencies_of(&c("p", "auto-tag", "after")),
            BTreeSet::from([c("p", "auto-tag", "s")])
        );
        assert!(!built.graph.is_deployable(&c("p", "auto-tag", "x")));
    }

    #[test]
    fn cycle_with_one_active_member_is_reported() {
        let objects = vec![
            refs(object("p", "auto-tag", "x"), &[("", "auto-tag", "y")]).with_skip(true),
            refs(object("p", "auto-tag", "y"), &[("", "auto-tag", "x")]),
        ];
        let built = GraphBuilder::new().build_environment("dev", &objects, &ProjectDependencies::new());

        assert_eq!(built.errors.len(), 1);
        assert!(matches!(&built.errors[0], GraphError::Cycle(_)));
    }

    #[test]
    fn policy_excluded_links_do_not_form_cycles() {
        let objects = vec![
            refs(object("p", "dashboard", "d1"), &[("", "dashboard", "d2")]),
            refs(object("p", "dashboard", "d2"), &[("", "dashboard", "d1")]),
        ];
        let built = GraphBuilder::new().build_environment("dev", &objects, &ProjectDependencies::new());

        assert!(built.errors.is_empty());
        assert_eq!(built.graph.edge_count(), 0);
    }

    #[test]
    fn build_covers_every_environment() {
        let objects = BTreeMap::from([
            ("dev".to_string(), vec![object("p", "auto-tag", "a")]),
            ("prod".to_string(), vec![object("p", "auto-tag", "b")]),
        ]);
        let built = GraphBuilder::new().build(&objects, &BTreeMap::new());

        assert_eq!(built.len(), 2);
        assert!(built["prod"].graph.contains(&c("p", "auto-tag", "b")));
        assert_eq!(built["dev"].graph.environment(), "dev");
    }
}
