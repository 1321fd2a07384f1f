//! Dated artifact files, one per located snapshot.

use git2::Repository;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::locate::{self, SnapshotInfo};
use super::CollateError;

/// Output file name for one snapshot of `filepath`: `{YYYYMMDD}_{basename}`.
pub fn artifact_name(snapshot: &SnapshotInfo, filepath: &str) -> String {
    let basename = filepath.rsplit('/').next().unwrap_or(filepath);
    format!("{}_{}", snapshot.day().format("%Y%m%d"), basename)
}

/// Write each snapshot's content to its dated artifact under `dest`.
///
/// Content is decoded as UTF-8 text. Existing artifacts are truncated and
/// overwritten without comment. Filesystem errors propagate unmodified;
/// artifacts already written stay on disk.
pub fn write_snapshots(
    repo: &Repository,
    filepath: &str,
    snapshots: &[SnapshotInfo],
    dest: &Path,
) -> Result<Vec<PathBuf>, CollateError> {
    let mut written = Vec::with_capacity(snapshots.len());

    for snapshot in snapshots {
        let content = locate::content_at(repo, &snapshot.commit, filepath)?;
        let text = String::from_utf8(content).map_err(|_| CollateError::NonUtf8Content {
            path: filepath.to_string(),
            commit: snapshot.short_hash().to_string(),
        })?;

        let out_path = dest.join(artifact_name(snapshot, filepath));
        std::fs::write(&out_path, text)?;
        debug!("wrote {}", out_path.display());
        written.push(out_path);
    }

    Ok(written)
}
