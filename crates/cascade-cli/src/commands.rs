//! Command implementations
//!
//! Each command renders its output into a `String`; `main` prints it and
//! maps errors to the exit status.

use anyhow::{bail, Context, Result};
use cascade_core::Project;
use cascade_deploy::{
    ClientSet, DeployOptions, DeployerRegistry, DeploymentReport, InMemoryClient, Orchestrator,
    Outcome,
};
use cascade_graph::{plan, EnvironmentPlan, GraphBuilder, ProjectDependencyMode};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Environment name -> plan
pub type Plans = BTreeMap<String, EnvironmentPlan>;

/// Plan every environment of `projects`
///
/// With a non-empty `selected`, only those environments are kept.
///
/// # Errors
/// A selected environment the manifest does not define.
pub fn build_plans(
    projects: &[Project],
    mode: ProjectDependencyMode,
    selected: &[String],
) -> Result<Plans> {
    let mut plans = plan(projects, &GraphBuilder::new().with_mode(mode));
    if selected.is_empty() {
        return Ok(plans);
    }

    if let Some(unknown) = selected.iter().find(|name| !plans.contains_key(*name)) {
        let known: Vec<&str> = plans.keys().map(String::as_str).collect();
        bail!(
            "unknown environment {unknown}, manifest defines: {}",
            known.join(", ")
        );
    }
    plans.retain(|name, _| selected.contains(name));
    Ok(plans)
}

/// True if any plan has structural errors
#[must_use]
pub fn has_structural_errors(plans: &Plans) -> bool {
    plans.values().any(|plan| !plan.errors().is_empty())
}

/// Render components, deployment order and structural errors
#[must_use]
pub fn render_plan(plans: &Plans) -> String {
    let mut out = String::new();
    for (name, plan) in plans {
        let _ = writeln!(
            out,
            "environment {name}: {} objects, {} components, {} errors",
            plan.graph().node_count(),
            plan.components().len(),
            plan.errors().len()
        );
        for component in plan.components() {
            let _ = writeln!(out, "  component {}", component.index());
            for (position, coordinate) in component.order().iter().enumerate() {
                let skipped = plan
                    .graph()
                    .object(coordinate)
                    .is_some_and(cascade_core::ConfigObject::skip);
                let marker = if skipped { " (skip)" } else { "" };
                let _ = writeln!(out, "    {}. {coordinate}{marker}", position + 1);
            }
            for coordinate in component.excluded() {
                let _ = writeln!(out, "    excluded: {coordinate}");
            }
        }
        for error in plan.errors() {
            let _ = writeln!(out, "  error: {error}");
        }
    }
    out
}

/// Write one `dependency_graph_<environment>.dot` per plan into `dir`
///
/// # Errors
/// The directory or a file cannot be written.
pub fn write_graphs(plans: &Plans, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(plans.len());
    for (name, plan) in plans {
        let path = dir.join(format!("dependency_graph_{name}.dot"));
        std::fs::write(&path, plan.graph().to_dot())
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(environment = %name, path = %path.display(), "dependency graph written");
        written.push(path);
    }
    Ok(written)
}

/// Deploy every plan against fresh in-memory clients
pub async fn dry_run(plans: &Plans, options: DeployOptions) -> DeploymentReport {
    let clients: BTreeMap<String, ClientSet> = plans
        .keys()
        .map(|name| {
            (
                name.clone(),
                ClientSet::uniform(Arc::new(InMemoryClient::new())),
            )
        })
        .collect();

    Orchestrator::new(DeployerRegistry::with_defaults())
        .with_options(options)
        .deploy(plans, &clients)
        .await
}

/// Render per-environment outcome and error counts
#[must_use]
pub fn render_report(report: &DeploymentReport) -> String {
    let mut out = String::new();
    for (name, env) in &report.environments {
        let counts = env.outcome_counts();
        let count = |outcome: Outcome| counts.get(&outcome).copied().unwrap_or(0);
        let _ = writeln!(
            out,
            "environment {name}: {} deployed, {} skipped, {} failed, {} not attempted, {} excluded, {} errors",
            count(Outcome::Success),
            count(Outcome::Skipped),
            count(Outcome::Failed),
            count(Outcome::FailedDependency),
            count(Outcome::Excluded),
            env.errors.len()
        );
        for error in &env.errors {
            let _ = writeln!(out, "  error: {error}");
        }
    }
    out
}
