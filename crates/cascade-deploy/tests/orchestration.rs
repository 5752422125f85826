//! Orchestrator behaviour across components and environments

use cascade_core::{ConfigKind, ConfigObject, Parameter};
use cascade_deploy::deployers::{ClassicApiDeployer, SettingsDeployer};
use cascade_deploy::{
    ClientSet, DeployError, DeployOptions, DeployerRegistry, DeploymentError, InMemoryClient,
    Orchestrator, Outcome,
};
use cascade_test_utils::{
    chain, coord, depends_on, memory_clients, object, plan_projects, project_with, registry_with,
    Recorder, ENV,
};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::sync::Arc;

fn orchestrator(recorder: &Arc<Recorder>, options: DeployOptions) -> Orchestrator {
    Orchestrator::new(registry_with(recorder)).with_options(options)
}

#[tokio::test]
async fn failure_aborts_the_rest_of_the_environment() {
    // a -> b -> c -> d, d deployed first
    let objects = chain("p", "t", &["d", "c", "b", "a"]);
    let plans = plan_projects(&[project_with("p", objects)]);
    let recorder = Recorder::new();
    recorder.fail(&coord("p", "t", "c"));

    let report = orchestrator(&recorder, DeployOptions::new())
        .deploy(&plans, &memory_clients(&[ENV]))
        .await;
    let env = report.environment(ENV).unwrap();

    assert_eq!(env.outcome(&coord("p", "t", "d")), Some(Outcome::Success));
    assert_eq!(env.outcome(&coord("p", "t", "c")), Some(Outcome::Failed));
    assert_eq!(env.outcome(&coord("p", "t", "b")), Some(Outcome::FailedDependency));
    assert_eq!(env.outcome(&coord("p", "t", "a")), Some(Outcome::FailedDependency));

    assert_eq!(env.errors.len(), 1);
    assert_eq!(env.errors[0].coordinate(), Some(&coord("p", "t", "c")));
    assert_eq!(recorder.calls(), vec![coord("p", "t", "d"), coord("p", "t", "c")]);
}

#[tokio::test]
async fn continue_on_error_keeps_independent_components_going() {
    let mut objects = chain("p", "t", &["x1", "x2"]);
    objects.extend(chain("p", "t", &["y1", "y2"]));
    let plans = plan_projects(&[project_with("p", objects)]);
    let recorder = Recorder::new();
    recorder.fail(&coord("p", "t", "x1"));

    let options = DeployOptions::new().with_continue_on_error(true);
    let report = orchestrator(&recorder, options)
        .deploy(&plans, &memory_clients(&[ENV]))
        .await;
    let env = report.environment(ENV).unwrap();

    assert_eq!(env.outcome(&coord("p", "t", "x1")), Some(Outcome::Failed));
    assert_eq!(env.outcome(&coord("p", "t", "x2")), Some(Outcome::FailedDependency));
    assert_eq!(env.outcome(&coord("p", "t", "y1")), Some(Outcome::Success));
    assert_eq!(env.outcome(&coord("p", "t", "y2")), Some(Outcome::Success));
    assert_eq!(env.errors.len(), 1);
    assert!(!recorder.was_called(&coord("p", "t", "x2")));
}

#[tokio::test]
async fn sequential_abort_leaves_later_components_untouched() {
    let mut objects = chain("p", "t", &["x1", "x2"]);
    objects.extend(chain("p", "t", &["y1", "y2"]));
    let plans = plan_projects(&[project_with("p", objects)]);
    let recorder = Recorder::new();
    recorder.fail(&coord("p", "t", "x1"));

    let report = orchestrator(&recorder, DeployOptions::new().sequential())
        .deploy(&plans, &memory_clients(&[ENV]))
        .await;
    let env = report.environment(ENV).unwrap();

    assert_eq!(env.outcome(&coord("p", "t", "y1")), Some(Outcome::FailedDependency));
    assert_eq!(env.outcome(&coord("p", "t", "y2")), Some(Outcome::FailedDependency));
    assert_eq!(env.errors.len(), 1);
    assert_eq!(recorder.calls(), vec![coord("p", "t", "x1")]);
}

#[tokio::test]
async fn parallel_abort_stops_components_started_later() {
    let mut objects = chain("p", "t", &["x1", "x2"]);
    objects.extend(chain("p", "t", &["y1", "y2"]));
    objects.extend(chain("p", "t", &["z1", "z2"]));
    let plans = plan_projects(&[project_with("p", objects)]);
    let recorder = Recorder::new();
    recorder.fail(&coord("p", "t", "x1"));

    let options = DeployOptions::new().with_max_concurrent_components(2);
    let report = orchestrator(&recorder, options)
        .deploy(&plans, &memory_clients(&[ENV]))
        .await;
    let env = report.environment(ENV).unwrap();

    assert_eq!(env.outcome(&coord("p", "t", "x1")), Some(Outcome::Failed));
    for id in ["x2", "y1", "y2", "z1", "z2"] {
        assert_eq!(
            env.outcome(&coord("p", "t", id)),
            Some(Outcome::FailedDependency),
            "{id}"
        );
    }
    assert_eq!(env.errors.len(), 1);
    assert_eq!(recorder.calls(), vec![coord("p", "t", "x1")]);
}

#[tokio::test]
async fn skipped_objects_never_fail_the_environment() {
    // dangling reference on a skipped object, and a cycle of skipped objects
    let s = depends_on(object("p", "t", "s"), &coord("p", "t", "gone")).with_skip(true);
    let after = depends_on(object("p", "t", "after"), &coord("p", "t", "s"));
    let x = depends_on(object("p", "t", "x"), &coord("p", "t", "y")).with_skip(true);
    let y = depends_on(object("p", "t", "y"), &coord("p", "t", "x")).with_skip(true);
    let plans = plan_projects(&[project_with("p", [s, after, x, y])]);
    assert!(plans[ENV].errors().is_empty());
    let recorder = Recorder::new();

    let report = orchestrator(&recorder, DeployOptions::new())
        .deploy(&plans, &memory_clients(&[ENV]))
        .await;
    let env = report.environment(ENV).unwrap();

    assert_eq!(env.outcome(&coord("p", "t", "s")), Some(Outcome::Skipped));
    assert_eq!(env.outcome(&coord("p", "t", "after")), Some(Outcome::FailedDependency));
    assert_eq!(env.outcome(&coord("p", "t", "x")), Some(Outcome::Skipped));
    assert_eq!(env.outcome(&coord("p", "t", "y")), Some(Outcome::Skipped));
    assert!(!report.has_errors());
    assert!(report.into_errors().is_empty());
    assert!(recorder.calls().is_empty());
}

#[tokio::test]
async fn skipped_objects_block_their_dependents_without_errors() {
    let t1 = object("p", "auto-tag", "t1").with_skip(true);
    let d2 = depends_on(object("p", "dashboard", "d2"), t1.coordinate());
    let d1 = object("p", "dashboard", "d1");
    let plans = plan_projects(&[project_with("p", [d1, t1, d2])]);
    let recorder = Recorder::new();

    let report = orchestrator(&recorder, DeployOptions::new())
        .deploy(&plans, &memory_clients(&[ENV]))
        .await;
    let env = report.environment(ENV).unwrap();

    assert_eq!(env.outcome(&coord("p", "auto-tag", "t1")), Some(Outcome::Skipped));
    assert_eq!(
        env.outcome(&coord("p", "dashboard", "d2")),
        Some(Outcome::FailedDependency)
    );
    assert_eq!(env.outcome(&coord("p", "dashboard", "d1")), Some(Outcome::Success));
    assert!(env.errors.is_empty());
    assert!(!report.has_errors());
    assert_eq!(recorder.calls(), vec![coord("p", "dashboard", "d1")]);
}

#[tokio::test]
async fn environment_without_clients_fails_alone() {
    let dev = object("p", "t", "a");
    let prod = ConfigObject::new(
        coord("p", "t", "a"),
        ConfigKind::ClassicApi { api: "t".into() },
        "prod",
    );
    let plans = plan_projects(&[project_with("p", [dev, prod])]);
    let recorder = Recorder::new();

    let report = orchestrator(&recorder, DeployOptions::new())
        .deploy(&plans, &memory_clients(&[ENV]))
        .await;

    assert!(!report.environment(ENV).unwrap().has_errors());
    let prod = report.environment("prod").unwrap();
    assert!(prod.results.is_empty());
    assert!(matches!(
        prod.errors.as_slice(),
        [DeploymentError::Environment { environment, .. }] if environment == "prod"
    ));
    assert_eq!(report.into_errors().keys().collect::<Vec<_>>(), vec!["prod"]);
}

#[tokio::test]
async fn structural_errors_lead_the_error_list() {
    let x = depends_on(object("p", "t", "x"), &coord("p", "t", "y"));
    let y = depends_on(object("p", "t", "y"), &coord("p", "t", "x"));
    let z = depends_on(object("p", "t", "z"), &coord("p", "t", "x"));
    let dangling = depends_on(object("p", "t", "orphan"), &coord("p", "t", "missing"));
    let w = object("p", "t", "w");
    let plans = plan_projects(&[project_with("p", [x, y, z, dangling, w])]);
    let recorder = Recorder::new();

    let report = orchestrator(&recorder, DeployOptions::new())
        .deploy(&plans, &memory_clients(&[ENV]))
        .await;
    let env = report.environment(ENV).unwrap();

    assert_eq!(env.errors.len(), 2);
    assert!(env.errors.iter().all(DeploymentError::is_structural));
    assert_eq!(env.outcome(&coord("p", "t", "x")), Some(Outcome::Excluded));
    assert_eq!(env.outcome(&coord("p", "t", "y")), Some(Outcome::Excluded));
    assert_eq!(env.outcome(&coord("p", "t", "orphan")), Some(Outcome::Excluded));
    assert_eq!(env.outcome(&coord("p", "t", "z")), Some(Outcome::FailedDependency));
    assert_eq!(env.outcome(&coord("p", "t", "w")), Some(Outcome::Success));
    assert_eq!(recorder.calls(), vec![coord("p", "t", "w")]);
}

#[tokio::test]
async fn duplicate_classic_names_fail_the_second_object() {
    let a = object("p", "auto-tag", "a").with_parameter("name", Parameter::value("shared"));
    let b = object("p", "auto-tag", "b").with_parameter("name", Parameter::value("shared"));
    let plans = plan_projects(&[project_with("p", [a, b])]);

    let options = DeployOptions::new().sequential().with_continue_on_error(true);
    let report = Orchestrator::new(DeployerRegistry::with_defaults())
        .with_options(options)
        .deploy(&plans, &memory_clients(&[ENV]))
        .await;
    let env = report.environment(ENV).unwrap();

    assert_eq!(env.outcome(&coord("p", "auto-tag", "a")), Some(Outcome::Success));
    let failed = env.result(&coord("p", "auto-tag", "b")).unwrap();
    assert_eq!(failed.outcome, Outcome::Failed);
    assert_eq!(
        failed.error,
        Some(DeployError::DuplicateName {
            api: "auto-tag".into(),
            name: "shared".into(),
            owner: coord("p", "auto-tag", "a"),
        })
    );
}

#[tokio::test]
async fn references_resolve_to_deployed_ids() {
    let tag = object("p", "auto-tag", "t1");
    let profile = ConfigObject::new(
        coord("p", "builtin:alerting.profile", "a1"),
        ConfigKind::Settings {
            schema_id: "builtin:alerting.profile".into(),
            schema_version: None,
        },
        ENV,
    )
    .with_template(r#"{"tag": "{{ .tag }}"}"#)
    .with_parameter("scope", Parameter::value("environment"))
    .with_parameter("tag", Parameter::reference(coord("", "auto-tag", "t1"), "id"));
    let plans = plan_projects(&[project_with("p", [profile, tag])]);

    let client = Arc::new(InMemoryClient::new());
    let clients = BTreeMap::from([(ENV.to_string(), ClientSet::uniform(client.clone()))]);
    let report = Orchestrator::new(DeployerRegistry::with_defaults())
        .deploy(&plans, &clients)
        .await;
    assert!(!report.has_errors());

    let tags = client.objects(&ClassicApiDeployer::endpoint("auto-tag"));
    let profiles = client.objects(&SettingsDeployer::endpoint("builtin:alerting.profile"));
    assert_eq!(tags.len(), 1);
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].payload["value"]["tag"], tags[0].id.as_str());
    assert_eq!(profiles[0].payload["scope"], "environment");
}

#[tokio::test]
async fn redeploying_updates_existing_objects() {
    let plans = plan_projects(&[project_with("p", [object("p", "auto-tag", "t1")])]);
    let client = Arc::new(InMemoryClient::new());
    let clients = BTreeMap::from([(ENV.to_string(), ClientSet::uniform(client.clone()))]);
    let orchestrator = Orchestrator::new(DeployerRegistry::with_defaults());

    orchestrator.deploy(&plans, &clients).await;
    orchestrator.deploy(&plans, &clients).await;

    assert_eq!(client.len(), 1);
    assert_eq!(client.upsert_calls(), 2);
}
