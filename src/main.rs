//! dirsnap - concurrent directory-tree snapshot and diff reporter.
//!
//! Usage:
//!   dirsnap <output-file> <dir1> [dir2 ... dir10]
//!   dirsnap --baseline old.json --save-snapshot new.json out.txt <dirs…>

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::{Context, Result};

use dirsnap_core::TreeSnapshot;
use dirsnap_report::{run_targets, RunOptions, RunSummary};

#[derive(Parser)]
#[command(
    name = "dirsnap",
    version,
    about = "Capture a point-in-time inventory of directory trees",
    long_about = "dirsnap walks each target directory in an isolated worker, \
                  capturing per-entry name, size, permissions, and mtime into \
                  a single appended textual report. One slow or failing tree \
                  never blocks the others."
)]
struct Cli {
    /// Output report file (appended to)
    output: PathBuf,

    /// Target directories, one worker each
    #[arg(required = true, num_args = 1..=10)]
    dirs: Vec<PathBuf>,

    /// Previous snapshot JSON to diff against
    #[arg(long)]
    baseline: Option<PathBuf>,

    /// Save this run's snapshot as JSON for later diffing
    #[arg(long)]
    save_snapshot: Option<PathBuf>,

    /// Per-directory entry cap (default 100)
    #[arg(long)]
    max_entries: Option<usize>,

    /// Recurse into directories reached through symlinks
    #[arg(long)]
    follow_symlinks: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let baseline = match cli.baseline {
        Some(ref path) => Some(load_baseline(path)?),
        None => None,
    };

    let opts = RunOptions {
        max_entries: cli.max_entries,
        follow_symlinks: cli.follow_symlinks,
        baseline,
        save_snapshot: cli.save_snapshot,
    };

    let summary = run_targets(cli.dirs, cli.output, opts)
        .await
        .context("Run failed before any worker could report")?;

    print_summary(&summary);

    Ok(if summary.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Load a previously saved snapshot baseline.
fn load_baseline(path: &PathBuf) -> Result<Vec<TreeSnapshot>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read baseline {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Baseline {} is not a valid snapshot", path.display()))
}

/// One line per worker outcome; failures go to stderr.
fn print_summary(summary: &RunSummary) {
    for outcome in &summary.outcomes {
        if outcome.succeeded {
            println!("ok    {}", outcome.target.display());
        } else {
            eprintln!(
                "fail  {} (exit {}): {}",
                outcome.target.display(),
                outcome.exit_code,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}
