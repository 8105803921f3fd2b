//! Textual report rendering.

use std::fmt::Write as _;
use std::time::SystemTime;

use chrono::{DateTime, Local};

use dirsnap_core::{TreeSnapshot, WalkedEntry};
use dirsnap_diff::DiffReport;

/// Render a walked tree (and optional diff) into one report payload.
///
/// One block per directory level, depth-first, matching the walk order:
/// heading, rule, then one stanza per entry. The returned string is the
/// complete unit handed to the sink, so it always ends with a newline.
pub fn render_report(tree: &TreeSnapshot, diff: Option<&DiffReport>) -> String {
    let mut out = String::new();

    for dir in &tree.dirs {
        let _ = writeln!(out, "Snapshot of directory: {}", dir.path.display());
        out.push_str("---------------------------------\n");

        if dir.truncated {
            let _ = writeln!(out, "(listing truncated at {} entries)", dir.len());
        }

        let rel_dir = dir.path.strip_prefix(&tree.root).unwrap_or(&dir.path);

        for entry in &dir.entries {
            match entry {
                WalkedEntry::Entry(record) => {
                    let _ = writeln!(out, "Entry: {}", record.name);
                    let _ = writeln!(out, "Size: {} bytes", record.size);
                    let _ = writeln!(out, "Permissions: {}", record.mode_octal());
                    let _ = writeln!(
                        out,
                        "Last Modified: {}",
                        format_timestamp(record.modified)
                    );
                    if let Some(diff) = diff {
                        let rel = rel_dir.join(record.name.as_str());
                        if let Some(change) = diff.classify(&rel) {
                            let _ = writeln!(out, "Diff: {}", change.label());
                        }
                    }
                }
                WalkedEntry::Failed(failure) => {
                    let _ = writeln!(out, "Entry: {}", failure.name);
                    let _ = writeln!(out, "Error: {}: {}", failure.kind.label(), failure.message);
                }
                WalkedEntry::Cycle { name } => {
                    let _ = writeln!(out, "Entry: {}", name);
                    out.push_str("Cycle: already visited\n");
                }
            }
            out.push('\n');
        }
    }

    if let Some(diff) = diff {
        let mut removed: Vec<_> = diff.removed_paths().collect();
        if !removed.is_empty() {
            removed.sort();
            out.push_str("Removed since previous snapshot:\n");
            for path in removed {
                let _ = writeln!(out, "  {}", path.display());
            }
            out.push('\n');
        }
    }

    out
}

/// ctime-style local timestamp.
fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%a %b %e %H:%M:%S %Y")
        .to_string()
}
