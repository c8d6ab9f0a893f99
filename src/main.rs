// src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use depsolver::{Command as PlanCommand, Constraint, PackageRef, PackageStore, Repository};
use std::fs;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser)]
#[command(name = "depsolver")]
#[command(author, version, about = "Dependency solver for versioned package repositories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a minimum-cost install/uninstall plan
    Solve {
        /// Repository JSON file (array of package records)
        repo: String,
        /// Initial state JSON file (array of package references)
        initial: String,
        /// Constraints JSON file (array of +range / -range strings)
        constraints: String,
        /// Stage the repository through a SQLite database file instead of
        /// an in-memory store
        #[arg(short, long)]
        db_path: Option<String>,
    },
    /// Judge whether a command sequence is valid
    Judge {
        /// Repository JSON file (array of package records)
        repo: String,
        /// Initial state JSON file (array of package references)
        initial: String,
        /// Commands JSON file (array of +name=version / -name=version)
        commands: String,
        /// Constraints JSON file (array of +range / -range strings)
        constraints: String,
    },
}

/// Load a JSON array of strings and parse each entry
fn load_strings<T>(path: &str, parse: impl Fn(&str) -> depsolver::Result<T>) -> Result<Vec<T>> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    let strings: Vec<String> =
        serde_json::from_str(&data).with_context(|| format!("parsing {}", path))?;
    strings
        .iter()
        .map(|s| parse(s).map_err(Into::into))
        .collect()
}

/// Load the repository, optionally staging it through the package store
fn load_repository(path: &str, db_path: Option<&str>) -> Result<Repository> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    let records: Vec<depsolver::RepoRecord> =
        serde_json::from_str(&data).with_context(|| format!("parsing {}", path))?;

    let mut store = match db_path {
        Some(p) => PackageStore::open(p)?,
        None => PackageStore::open_in_memory()?,
    };
    store.import(&records)?;
    let staged = store.records()?;
    info!(packages = staged.len(), "repository staged");

    Ok(Repository::from_records(&staged)?)
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            repo,
            initial,
            constraints,
            db_path,
        } => {
            let repository = load_repository(&repo, db_path.as_deref())?;
            let initial = load_strings(&initial, PackageRef::parse)?;
            let constraints = load_strings(&constraints, Constraint::parse)?;

            match depsolver::synthesize(&repository, &initial, &constraints) {
                Ok(plan) => {
                    println!("{}", serde_json::to_string_pretty(&plan.render())?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(depsolver::Error::Unsatisfiable) => {
                    eprintln!("no solution");
                    Ok(ExitCode::FAILURE)
                }
                Err(e) => Err(e.into()),
            }
        }
        Commands::Judge {
            repo,
            initial,
            commands,
            constraints,
        } => {
            let repository = load_repository(&repo, None)?;
            let initial = load_strings(&initial, PackageRef::parse)?;
            let commands = load_strings(&commands, PlanCommand::parse)?;
            let constraints = load_strings(&constraints, Constraint::parse)?;

            let verdict = depsolver::judge(&repository, &initial, &commands, &constraints);
            if verdict.valid {
                println!("valid");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("invalid");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
