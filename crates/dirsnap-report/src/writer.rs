//! Single-writer sink for the shared output artifact.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::ReportError;

/// One complete report payload plus its acknowledgement channel.
struct ReportJob {
    payload: String,
    ack: oneshot::Sender<Result<(), ReportError>>,
}

/// Handle used by workers to submit finished reports.
///
/// Cheap to clone; every clone feeds the same writer task.
#[derive(Clone)]
pub struct ReportHandle {
    tx: mpsc::Sender<ReportJob>,
}

impl ReportHandle {
    /// Submit one complete report and wait for the write to land.
    ///
    /// The payload is written as a single unit; writes from other
    /// workers never interleave with it. A failed write fails only the
    /// submitting worker.
    pub async fn submit(&self, payload: String) -> Result<(), ReportError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(ReportJob {
                payload,
                ack: ack_tx,
            })
            .await
            .map_err(|_| ReportError::SinkClosed)?;
        ack_rx.await.map_err(|_| ReportError::SinkClosed)?
    }

    /// Blocking variant of [`submit`](Self::submit) for use inside
    /// `spawn_blocking` workers.
    pub fn submit_blocking(&self, payload: String) -> Result<(), ReportError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .blocking_send(ReportJob {
                payload,
                ack: ack_tx,
            })
            .map_err(|_| ReportError::SinkClosed)?;
        ack_rx.blocking_recv().map_err(|_| ReportError::SinkClosed)?
    }
}

/// Dedicated writer task owning the append-only output file.
///
/// All workers share the artifact only through this task, so exclusive
/// access needs no cross-worker locking: the channel serializes whole
/// payloads, one `write_all` + flush each.
pub struct ReportSink {
    handle: ReportHandle,
    task: JoinHandle<Result<(), ReportError>>,
}

impl ReportSink {
    /// Open (or create) the output artifact and start the writer task.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| ReportError::Open {
                path: path.clone(),
                source,
            })?;

        let (tx, rx) = mpsc::channel(16);
        let task = tokio::task::spawn_blocking(move || writer_loop(file, &path, rx));

        Ok(Self {
            handle: ReportHandle { tx },
            task,
        })
    }

    /// Get a submission handle for a worker.
    pub fn handle(&self) -> ReportHandle {
        self.handle.clone()
    }

    /// Drop the sink's own handle and wait for the writer to drain.
    ///
    /// Returns once every outstanding payload has been written (or
    /// acknowledged as failed) and the file is closed.
    pub async fn close(self) -> Result<(), ReportError> {
        drop(self.handle);
        self.task.await.map_err(|_| ReportError::SinkClosed)?
    }
}

/// Drain jobs until all handles drop, acknowledging each write.
fn writer_loop(
    mut file: File,
    path: &Path,
    mut rx: mpsc::Receiver<ReportJob>,
) -> Result<(), ReportError> {
    while let Some(job) = rx.blocking_recv() {
        let result = write_payload(&mut file, &job.payload);
        if let Err(ref err) = result {
            warn!(path = %path.display(), error = %err, "report write failed");
        }
        // Worker may have panicked; nobody left to ack is fine.
        let _ = job.ack.send(result);
    }
    debug!(path = %path.display(), "report sink drained");
    file.sync_all()
        .map_err(|source| ReportError::Write { source })
}

fn write_payload(file: &mut File, payload: &str) -> Result<(), ReportError> {
    file.write_all(payload.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|source| ReportError::Write { source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_single_payload_written() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("report.txt");

        let sink = ReportSink::open(&out).unwrap();
        let handle = sink.handle();
        handle.submit("hello\nworld\n".to_string()).await.unwrap();
        sink.close().await.unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written, "hello\nworld\n");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_appends_to_existing_file() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("report.txt");
        std::fs::write(&out, "previous run\n").unwrap();

        let sink = ReportSink::open(&out).unwrap();
        sink.handle().submit("this run\n".to_string()).await.unwrap();
        sink.close().await.unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written, "previous run\nthis run\n");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_open_failure_is_typed() {
        let temp = TempDir::new().unwrap();
        let missing_dir = temp.path().join("no/such/dir/report.txt");
        match ReportSink::open(&missing_dir) {
            Err(ReportError::Open { .. }) => {}
            other => panic!("expected Open error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_blocking_submit_from_worker_thread() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("report.txt");

        let sink = ReportSink::open(&out).unwrap();
        let handle = sink.handle();
        tokio::task::spawn_blocking(move || handle.submit_blocking("from worker\n".to_string()))
            .await
            .unwrap()
            .unwrap();
        sink.close().await.unwrap();

        assert_eq!(std::fs::read_to_string(&out).unwrap(), "from worker\n");
    }
}
