//! Repository automation tasks.

use std::process::{Command, exit};

use clap::{Parser, Subcommand};

/// Workspace task runner.
#[derive(Parser)]
#[command(name = "xtask")]
struct Cli {
    /// Task to run.
    #[command(subcommand)]
    task: Task,
}

/// Available tasks.
#[derive(Subcommand)]
enum Task {
    /// Run formatting, lints and the full test suite.
    Ci,
    /// Check formatting without applying changes.
    Fmt,
    /// Run clippy over all targets.
    Clippy,
    /// Run the test suite.
    Test,
}

fn main() {
    let cli = Cli::parse();
    let ok = match cli.task {
        Task::Ci => fmt() && clippy() && test(),
        Task::Fmt => fmt(),
        Task::Clippy => clippy(),
        Task::Test => test(),
    };
    if !ok {
        exit(1);
    }
}

/// Check formatting across the workspace.
fn fmt() -> bool {
    run("cargo", &["fmt", "--all", "--check"])
}

/// Run clippy with warnings denied.
fn clippy() -> bool {
    run(
        "cargo",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
}

/// Run every test in the workspace.
fn test() -> bool {
    run("cargo", &["test", "--workspace"])
}

/// Run a command, inheriting stdio, and report success.
fn run(program: &str, args: &[&str]) -> bool {
    println!("+ {program} {}", args.join(" "));
    Command::new(program)
        .args(args)
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
