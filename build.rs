// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("depsolver")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Depsolver Contributors")
        .about("Dependency solver for versioned package repositories")
        .subcommand_required(true)
        .subcommand(
            Command::new("solve")
                .about("Synthesize a minimum-cost install/uninstall plan")
                .arg(Arg::new("repo").required(true).help("Repository JSON file"))
                .arg(Arg::new("initial").required(true).help("Initial state JSON file"))
                .arg(Arg::new("constraints").required(true).help("Constraints JSON file"))
                .arg(
                    Arg::new("db_path")
                        .short('d')
                        .long("db-path")
                        .value_name("PATH")
                        .help("Stage the repository through a SQLite database file"),
                ),
        )
        .subcommand(
            Command::new("judge")
                .about("Judge whether a command sequence is valid")
                .arg(Arg::new("repo").required(true).help("Repository JSON file"))
                .arg(Arg::new("initial").required(true).help("Initial state JSON file"))
                .arg(Arg::new("commands").required(true).help("Commands JSON file"))
                .arg(Arg::new("constraints").required(true).help("Constraints JSON file")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("depsolver.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
