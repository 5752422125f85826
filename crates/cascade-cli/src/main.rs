use anyhow::{bail, Context, Result};
use cascade_cli::commands::{self, Plans};
use cascade_cli::logging::{self, LogFormat};
use cascade_cli::{command, manifest};
use cascade_deploy::DeployOptions;
use cascade_graph::ProjectDependencyMode;
use clap::ArgMatches;
use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let matches = command().get_matches();
    let format = if matches.get_flag("log-json") {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    logging::init(format);

    match matches.subcommand() {
        Some(("plan", args)) => {
            let plans = load_plans(args)?;
            print!("{}", commands::render_plan(&plans));
            Ok(exit_code(commands::has_structural_errors(&plans)))
        }
        Some(("graph", args)) => {
            let plans = load_plans(args)?;
            let dir = args
                .get_one::<PathBuf>("output")
                .context("output directory missing")?;
            for path in commands::write_graphs(&plans, dir)? {
                println!("{}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(("deploy", args)) => {
            if !args.get_flag("dry-run") {
                bail!("only --dry-run deployments are supported, no API clients are configured");
            }
            let plans = load_plans(args)?;

            let mut options = DeployOptions::from_env();
            if args.get_flag("continue-on-error") {
                options = options.with_continue_on_error(true);
            }
            if let Some(&max) = args.get_one::<usize>("concurrency") {
                options = options.with_max_concurrent_components(max);
            }
            if args.get_flag("sequential") {
                options = options.sequential();
            }

            let report = commands::dry_run(&plans, options).await;
            print!("{}", commands::render_report(&report));
            Ok(exit_code(report.has_errors()))
        }
        _ => Ok(ExitCode::SUCCESS),
    }
}

fn load_plans(args: &ArgMatches) -> Result<Plans> {
    let path = args
        .get_one::<PathBuf>("manifest")
        .context("manifest path missing")?;
    let projects = manifest::load(path)?;

    let selected: Vec<String> = args
        .get_many::<String>("environment")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let mode = if args.get_flag("materialized") {
        ProjectDependencyMode::Materialized
    } else {
        ProjectDependencyMode::Grouped
    };

    commands::build_plans(&projects, mode, &selected)
}

fn exit_code(has_errors: bool) -> ExitCode {
    if has_errors {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
