//! Cascade CLI (cascade-cli)
//!
//! Command-line boundary of the workspace: loads a project manifest, plans
//! every environment and either prints the plan, writes DOT graphs or runs
//! a dry-run deployment against in-memory clients.

use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

pub mod commands;
pub mod logging;
pub mod manifest;

/// Build the command-line definition
#[must_use]
pub fn command() -> Command {
    let manifest = || {
        Arg::new("manifest")
            .required(true)
            .value_parser(clap::value_parser!(PathBuf))
            .help("Path of the project manifest (YAML)")
    };
    let environments = || {
        Arg::new("environment")
            .short('e')
            .long("environment")
            .action(ArgAction::Append)
            .help("Restrict to this environment; may be repeated")
    };
    let materialized = || {
        Arg::new("materialized")
            .long("materialized")
            .action(ArgAction::SetTrue)
            .help("Add one edge per object pair for project dependencies")
    };

    Command::new("cascade")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Dependency-ordered deployment of configuration objects")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("plan")
                .about("Print components, deployment order and structural errors")
                .arg(manifest())
                .arg(environments())
                .arg(materialized()),
        )
        .subcommand(
            Command::new("graph")
                .about("Write one Graphviz file per environment")
                .arg(manifest())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .default_value(".")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Output directory"),
                )
                .arg(environments())
                .arg(materialized()),
        )
        .subcommand(
            Command::new("deploy")
                .about("Deploy in dependency order")
                .arg(manifest())
                .arg(environments())
                .arg(materialized())
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Deploy against in-memory clients"),
                )
                .arg(
                    Arg::new("continue-on-error")
                        .long("continue-on-error")
                        .action(ArgAction::SetTrue)
                        .help("Keep deploying an environment after a failure"),
                )
                .arg(
                    Arg::new("sequential")
                        .long("sequential")
                        .action(ArgAction::SetTrue)
                        .help("Deploy components and environments one at a time"),
                )
                .arg(
                    Arg::new("concurrency")
                        .long("concurrency")
                        .value_parser(clap::value_parser!(usize))
                        .help("Maximum number of components deployed at once"),
                ),
        )
}
