//! Report writing and run coordination for dirsnap.
//!
//! This crate owns the shared output artifact and the worker lifecycle:
//!
//! - [`render_report`] serializes a walked tree (and optional diff)
//!   into the textual report format.
//! - [`ReportSink`] is a dedicated writer task fed complete report
//!   payloads over a channel, so concurrent workers never interleave
//!   output. One payload, one uninterleaved write.
//! - [`run_targets`] launches one failure-isolated worker per target
//!   directory, waits for all of them, and returns a [`RunSummary`]
//!   with every worker's outcome.

mod coordinator;
mod error;
mod format;
mod writer;

pub use coordinator::{run_targets, RunOptions, RunSummary, WorkerOutcome};
pub use error::ReportError;
pub use format::render_report;
pub use writer::{ReportHandle, ReportSink};

// Re-export core types for convenience
pub use dirsnap_core::{DirSnapshot, TreeSnapshot, WalkConfig};
pub use dirsnap_diff::{DiffReport, EntryChange};
