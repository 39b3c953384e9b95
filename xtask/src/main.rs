use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for hdbridge")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Re-record reference images by running the tests in record mode
    UpdateSnapshots {
        /// Snapshot root, relative to each crate (default: `snapshots`)
        #[arg(long)]
        dir: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            fmt()?;
            clippy()?;
            test()?;
            doc()?;
        }
        Commands::Fmt => fmt()?,
        Commands::Clippy => clippy()?,
        Commands::Test => test()?,
        Commands::Doc => doc()?,
        Commands::UpdateSnapshots { dir } => update_snapshots(dir.as_deref())?,
    }

    Ok(())
}

/// Run `cargo <args>` with extra environment, failing on a non-zero exit.
fn cargo(args: &[&str], env: &[(&str, &str)]) -> Result<()> {
    println!("==> Running cargo {}", args.join(" "));
    let status = Command::new("cargo")
        .args(args)
        .envs(env.iter().copied())
        .status()?;
    if !status.success() {
        anyhow::bail!("cargo {} failed", args[0]);
    }
    Ok(())
}

fn fmt() -> Result<()> {
    cargo(&["fmt", "--all", "--", "--check"], &[])
}

fn clippy() -> Result<()> {
    cargo(
        &[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
        &[],
    )
}

fn test() -> Result<()> {
    cargo(&["test", "--workspace"], &[])
}

fn doc() -> Result<()> {
    cargo(&["doc", "--workspace", "--no-deps"], &[])
}

fn update_snapshots(dir: Option<&str>) -> Result<()> {
    let mut env = vec![("HDBRIDGE_UPDATE_SNAPSHOTS", "1")];
    if let Some(dir) = dir {
        env.push(("HDBRIDGE_SNAPSHOT_DIR", dir));
    }
    cargo(&["test", "--workspace"], &env)
}
