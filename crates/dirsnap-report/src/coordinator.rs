//! Worker lifecycle: one isolated walker pipeline per target directory.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use dirsnap_core::{TreeSnapshot, WalkConfig};
use dirsnap_diff::diff_snapshots;
use dirsnap_walk::Walker;

use crate::error::ReportError;
use crate::format::render_report;
use crate::writer::{ReportHandle, ReportSink};

/// Worker exit codes surfaced in outcomes.
const EXIT_OK: i32 = 0;
const EXIT_ROOT_OPEN: i32 = 1;
const EXIT_WRITE: i32 = 2;
const EXIT_PANIC: i32 = 3;

/// Options shared by all workers of one run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Per-directory entry cap override (None = default).
    pub max_entries: Option<usize>,

    /// Recurse into directories reached through symlinks.
    pub follow_symlinks: bool,

    /// Trees from a previous run; enables diffing. Each worker picks
    /// the baseline tree whose root matches its own target.
    pub baseline: Option<Vec<TreeSnapshot>>,

    /// Where to save this run's trees as a future baseline.
    pub save_snapshot: Option<PathBuf>,
}

impl RunOptions {
    fn walk_config(&self, target: &PathBuf) -> Result<WalkConfig, String> {
        let mut builder = WalkConfig::builder();
        builder.root(target.clone()).follow_symlinks(self.follow_symlinks);
        if let Some(cap) = self.max_entries {
            builder.max_entries(cap);
        }
        builder.build().map_err(|e| e.to_string())
    }
}

/// Termination outcome of one worker.
#[derive(Debug, Clone)]
pub struct WorkerOutcome {
    /// Target directory the worker owned.
    pub target: PathBuf,
    /// Whether the worker's whole pipeline completed.
    pub succeeded: bool,
    /// Exit code (0 ok, 1 root open failure, 2 write failure, 3 panic).
    pub exit_code: i32,
    /// Failure detail when not succeeded.
    pub error: Option<String>,
}

impl WorkerOutcome {
    fn success(target: PathBuf) -> Self {
        Self {
            target,
            succeeded: true,
            exit_code: EXIT_OK,
            error: None,
        }
    }

    fn failure(target: PathBuf, exit_code: i32, error: impl Into<String>) -> Self {
        Self {
            target,
            succeeded: false,
            exit_code,
            error: Some(error.into()),
        }
    }
}

/// Outcomes of every worker in one run.
#[derive(Debug)]
pub struct RunSummary {
    /// One outcome per target, in spawn order.
    pub outcomes: Vec<WorkerOutcome>,
}

impl RunSummary {
    /// True only when every worker succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.succeeded)
    }

    /// Outcomes of failed workers.
    pub fn failures(&self) -> impl Iterator<Item = &WorkerOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded)
    }
}

/// Walk and report every target directory concurrently.
///
/// Launches one `spawn_blocking` worker per target, each running the
/// pipeline walk → optional diff → render → submit. Workers are
/// failure-isolated: one worker's failure (including a panic) never
/// cancels its siblings. Blocks until every worker has terminated and
/// the sink has drained, then returns all outcomes.
///
/// Only two failures are fatal to the whole run: the output artifact
/// cannot be opened, or the saved-snapshot file cannot be written.
pub async fn run_targets(
    targets: Vec<PathBuf>,
    output: PathBuf,
    opts: RunOptions,
) -> Result<RunSummary, ReportError> {
    let sink = ReportSink::open(&output)?;
    let opts = Arc::new(opts);

    let mut handles = Vec::with_capacity(targets.len());
    for target in targets {
        let handle = sink.handle();
        let opts = Arc::clone(&opts);
        let worker_target = target.clone();
        let join = tokio::task::spawn_blocking(move || run_worker(worker_target, &opts, handle));
        handles.push((target, join));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    let mut captured: Vec<TreeSnapshot> = Vec::new();

    // Wait-for-all barrier; a hung sibling delays only the summary.
    for (target, join) in handles {
        match join.await {
            Ok((outcome, tree)) => {
                if let Some(tree) = tree {
                    captured.push(tree);
                }
                outcomes.push(outcome);
            }
            Err(join_err) => {
                warn!(target = %target.display(), error = %join_err, "worker panicked");
                outcomes.push(WorkerOutcome::failure(
                    target,
                    EXIT_PANIC,
                    join_err.to_string(),
                ));
            }
        }
    }

    sink.close().await?;

    if let Some(ref path) = opts.save_snapshot {
        let json = serde_json::to_string_pretty(&captured)?;
        std::fs::write(path, json).map_err(|source| ReportError::SnapshotIo {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), trees = captured.len(), "saved snapshot baseline");
    }

    Ok(RunSummary { outcomes })
}

/// One worker's whole pipeline, run on a blocking thread.
fn run_worker(
    target: PathBuf,
    opts: &RunOptions,
    handle: ReportHandle,
) -> (WorkerOutcome, Option<TreeSnapshot>) {
    let config = match opts.walk_config(&target) {
        Ok(config) => config,
        Err(message) => {
            return (WorkerOutcome::failure(target, EXIT_ROOT_OPEN, message), None);
        }
    };

    let walker = match Walker::new(config) {
        Ok(walker) => walker,
        Err(err) => {
            // Inability to open the target root is the one walk error
            // that fails a worker.
            return (
                WorkerOutcome::failure(target, EXIT_ROOT_OPEN, err.to_string()),
                None,
            );
        }
    };

    let root = walker.root().to_path_buf();
    debug!(target = %root.display(), "worker walking");
    let tree = walker.collect_tree();

    let diff = opts
        .baseline
        .as_ref()
        .and_then(|trees| trees.iter().find(|t| t.root == root))
        .map(|old| diff_snapshots(old, &tree));

    let payload = render_report(&tree, diff.as_ref());

    match handle.submit_blocking(payload) {
        Ok(()) => (WorkerOutcome::success(target), Some(tree)),
        Err(err) => (
            WorkerOutcome::failure(target, EXIT_WRITE, err.to_string()),
            None,
        ),
    }
}
