//! Deployment orchestration
//!
//! Execution phase of a run. The orchestrator only accepts
//! [`EnvironmentPlan`]s; all structural checks happened while planning.
//!
//! # Per environment
//! - structural errors of the plan open the environment's error list
//! - components run concurrently up to the configured bound; nodes of one
//!   component run strictly in their topological order
//! - a skipped or failed node blocks its transitive dependents; blocked
//!   nodes record no error
//! - without continue-on-error, the first failure abandons every node not
//!   yet attempted in that environment
//!
//! Environments never share state and run concurrently unless disabled.

use crate::cache::ListingCache;
use crate::client::ClientSet;
use crate::deployers::DeployContext;
use crate::entity::{EntityMap, ResolvedEntity};
use crate::error::{DeployError, DeploymentError};
use crate::options::DeployOptions;
use crate::registry::DeployerRegistry;
use crate::report::{DeploymentReport, EnvironmentReport, NodeResult, Outcome};
use crate::resolve::resolve_parameters;
use crate::state::NodeState;
use crate::tracker::StateTracker;
use cascade_core::{ConfigObject, Coordinate};
use cascade_graph::{Component, DependencyGraph, EnvironmentPlan};
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, debug_span, error, info, info_span, warn, Instrument};

/// Deploys planned environments through registered deployers
#[derive(Debug, Clone)]
pub struct Orchestrator {
    registry: Arc<DeployerRegistry>,
    options: DeployOptions,
}

/// Shared state of one environment's run
struct EnvironmentRun<'a> {
    environment: &'a str,
    graph: &'a DependencyGraph,
    clients: &'a ClientSet,
    cache: ListingCache,
    entities: EntityMap,
    aborted: AtomicBool,
}

/// Results and errors of one component
struct ComponentOutcome {
    results: Vec<NodeResult>,
    errors: Vec<DeploymentError>,
}

impl Orchestrator {
    /// Create orchestrator with default options
    #[must_use]
    pub fn new(registry: DeployerRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            options: DeployOptions::default(),
        }
    }

    /// Set options
    #[inline]
    #[must_use]
    pub fn with_options(mut self, options: DeployOptions) -> Self {
        self.options = options;
        self
    }

    /// Options in use
    #[inline]
    #[must_use]
    pub fn options(&self) -> &DeployOptions {
        &self.options
    }

    /// Deployer registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &DeployerRegistry {
        &self.registry
    }

    /// Deploy every planned environment
    ///
    /// The report has one entry per plan. An environment without a client
    /// set fails on its own without affecting the others.
    pub async fn deploy(
        &self,
        plans: &BTreeMap<String, EnvironmentPlan>,
        clients: &BTreeMap<String, ClientSet>,
    ) -> DeploymentReport {
        let runs = plans.iter().map(|(name, plan)| async move {
            let report = self.deploy_environment(plan, clients.get(name)).await;
            (name.clone(), report)
        });

        let reports: Vec<(String, EnvironmentReport)> = if self.options.parallel_environments {
            futures::future::join_all(runs).await
        } else {
            let mut reports = Vec::with_capacity(plans.len());
            for run in runs {
                reports.push(run.await);
            }
            reports
        };

        DeploymentReport {
            environments: reports.into_iter().collect(),
        }
    }

    /// Deploy one environment
    pub async fn deploy_environment(
        &self,
        plan: &EnvironmentPlan,
        clients: Option<&ClientSet>,
    ) -> EnvironmentReport {
        let environment = plan.environment();
        let span = info_span!("environment", environment);

        async move {
            let mut report = EnvironmentReport::default();
            report.errors.extend(
                plan.errors()
                    .iter()
                    .cloned()
                    .map(DeploymentError::Structural),
            );

            let Some(clients) = clients else {
                error!("no API clients configured, environment not deployed");
                report.errors.push(DeploymentError::Environment {
                    environment: environment.to_string(),
                    message: "no API clients configured".to_string(),
                });
                return report;
            };

            info!(
                components = plan.components().len(),
                objects = plan.graph().node_count(),
                "deploying environment"
            );

            let run = EnvironmentRun {
                environment,
                graph: plan.graph(),
                clients,
                cache: ListingCache::default(),
                entities: EntityMap::new(),
                aborted: AtomicBool::new(false),
            };

            let concurrency = self.options.component_concurrency();
            let outcomes: Vec<ComponentOutcome> = if concurrency > 1 {
                stream::iter(plan.components())
                    .map(|component| self.deploy_component(&run, component))
                    .buffered(concurrency)
                    .collect()
                    .await
            } else {
                let mut outcomes = Vec::with_capacity(plan.components().len());
                for component in plan.components() {
                    outcomes.push(self.deploy_component(&run, component).await);
                }
                outcomes
            };

            for outcome in outcomes {
                report.results.extend(outcome.results);
                report.errors.extend(outcome.errors);
            }

            info!(
                deployed = run.entities.len(),
                errors = report.errors.len(),
                "environment finished"
            );
            report
        }
        .instrument(span)
        .await
    }

    async fn deploy_component(&self, run: &EnvironmentRun<'_>, component: &Component) -> ComponentOutcome {
        let span = debug_span!("component", index = component.index());

        async move {
            let mut tracker = StateTracker::new(run.graph, component);
            let mut errors = Vec::new();
            let mut failures: HashMap<Coordinate, DeployError> = HashMap::new();

            for coordinate in component.order() {
                if run.aborted.load(Ordering::Acquire) {
                    let abandoned = tracker.block_pending();
                    if abandoned > 0 {
                        warn!(abandoned, "deployment aborted, remaining objects not attempted");
                    }
                    break;
                }
                if tracker.state(coordinate) != Some(NodeState::Pending) {
                    continue;
                }
                let Some(object) = run.graph.object(coordinate) else {
                    continue;
                };

                if object.skip() {
                    settle(&mut tracker, coordinate, NodeState::Skipped);
                    let blocked = tracker.block_dependents(run.graph, coordinate);
                    warn!(coordinate = %coordinate, blocked, "configuration skipped");
                    continue;
                }

                if tracker.is_blocked(run.graph, coordinate) {
                    settle(&mut tracker, coordinate, NodeState::Blocked);
                    tracker.block_dependents(run.graph, coordinate);
                    debug!(coordinate = %coordinate, "blocked by a dependency");
                    continue;
                }

                settle(&mut tracker, coordinate, NodeState::Deploying);
                match self.deploy_node(run, object).await {
                    Ok(entity) => {
                        run.entities.insert(entity);
                        settle(&mut tracker, coordinate, NodeState::Deployed);
                    }
                    Err(err) => {
                        error!(coordinate = %coordinate, error = %err, "deployment failed");
                        settle(&mut tracker, coordinate, NodeState::Failed);
                        tracker.block_dependents(run.graph, coordinate);
                        errors.push(DeploymentError::Deploy {
                            coordinate: coordinate.clone(),
                            error: err.clone(),
                        });
                        failures.insert(coordinate.clone(), err);
                        if !self.options.continue_on_error {
                            run.aborted.store(true, Ordering::Release);
                        }
                    }
                }
            }

            let results = component
                .order()
                .iter()
                .chain(component.excluded())
                .filter_map(|coordinate| {
                    let outcome = Outcome::from_state(tracker.state(coordinate)?)?;
                    Some(NodeResult {
                        coordinate: coordinate.clone(),
                        outcome,
                        error: failures.remove(coordinate),
                    })
                })
                .collect();

            ComponentOutcome { results, errors }
        }
        .instrument(span)
        .await
    }

    async fn deploy_node(
        &self,
        run: &EnvironmentRun<'_>,
        object: &ConfigObject,
    ) -> Result<ResolvedEntity, DeployError> {
        let kind = object.kind().tag();
        let deployer = self.registry.get(kind).ok_or(DeployError::NoDeployer(kind))?;
        let client = run.clients.get(kind).ok_or(DeployError::NoClient(kind))?;
        let properties = resolve_parameters(object, &run.entities)?;

        let ctx = DeployContext {
            environment: run.environment,
            client: client.as_ref(),
            cache: &run.cache,
            entities: &run.entities,
        };
        deployer.deploy(&ctx, object, properties).await
    }
}

fn settle(tracker: &mut StateTracker, coordinate: &Coordinate, to: NodeState) {
    if let Err(err) = tracker.transition(coordinate, to) {
        warn!(coordinate = %coordinate, error = %err, "unexpected state transition");
    }
}
