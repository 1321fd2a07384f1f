//! Temporal snapshot location using libgit2.
//!
//! Walks a repository's history backward day by day, resolving for each
//! cutoff the single most recent commit that last touched a file, so a date
//! range collapses to one snapshot per distinct commit instead of one per
//! calendar day.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use git2::{DiffOptions, Repository, Sort};
use std::path::Path;
use tracing::debug;

use super::CollateError;

/// Owned record of one located snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotInfo {
    /// Full commit hash
    pub commit: String,
    /// Commit timestamp in local time
    pub committed_at: NaiveDateTime,
    /// Author name
    pub author: String,
    /// Commit message (first line)
    pub summary: String,
}

impl SnapshotInfo {
    /// Local calendar day of the commit; names artifacts and advances the
    /// locate cursor, so both always agree.
    pub fn day(&self) -> NaiveDate {
        self.committed_at.date()
    }

    /// Short hash (12 characters)
    pub fn short_hash(&self) -> &str {
        &self.commit[..self.commit.len().min(12)]
    }
}

/// Locate the snapshots of `filepath` in effect across `[from, until]`.
///
/// Starts one day past `until` so the latest commit on `until` itself is
/// found, then repeatedly jumps the cursor to the day of the commit just
/// found. The final snapshot may predate `from`: it is the version in effect
/// at the start of the range. Results are ordered most recent first and hold
/// one entry per distinct commit.
pub fn locate(
    repo: &Repository,
    filepath: &str,
    from: NaiveDate,
    until: NaiveDate,
) -> Result<Vec<SnapshotInfo>, CollateError> {
    let mut snapshots: Vec<SnapshotInfo> = Vec::new();
    let mut cursor = until.succ_opt().unwrap_or(NaiveDate::MAX);

    while cursor > from {
        let cutoff = cursor.and_time(NaiveTime::MIN);
        match latest_touching_before(repo, filepath, cutoff)? {
            Some(snapshot) => {
                debug!(
                    "snapshot of {} at {}: {}",
                    filepath,
                    cutoff.date(),
                    snapshot.short_hash()
                );
                // The commit predates the cutoff, so this strictly decreases.
                cursor = snapshot.day();
                snapshots.push(snapshot);
            }
            None => break,
        }
    }

    if snapshots.is_empty() {
        return Err(CollateError::FileMissing {
            path: filepath.to_string(),
            from,
            until,
        });
    }
    Ok(snapshots)
}

/// Find the single most recent commit touching `filepath` strictly before
/// `cutoff`, or None once history is exhausted.
pub fn latest_touching_before(
    repo: &Repository,
    filepath: &str,
    cutoff: NaiveDateTime,
) -> Result<Option<SnapshotInfo>, CollateError> {
    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TIME)?;
    revwalk.push_head()?;

    for oid_result in revwalk {
        let oid = oid_result?;
        let commit = repo.find_commit(oid)?;

        if commit_local_datetime(&commit.time()) >= cutoff {
            continue;
        }
        if !touches_path(repo, &commit, filepath)? {
            continue;
        }
        return Ok(Some(extract_snapshot(&commit)));
    }

    Ok(None)
}

/// File content as stored in a snapshot commit's tree.
pub fn content_at(
    repo: &Repository,
    commit_hex: &str,
    filepath: &str,
) -> Result<Vec<u8>, CollateError> {
    let oid = git2::Oid::from_str(commit_hex)?;
    let commit = repo.find_commit(oid)?;
    let tree = commit.tree()?;
    let entry = tree.get_path(Path::new(filepath))?;
    let object = entry.to_object(repo)?;
    let blob = object.peel_to_blob()?;
    Ok(blob.content().to_vec())
}

/// Check if a commit changed the given path relative to its first parent.
fn touches_path(
    repo: &Repository,
    commit: &git2::Commit,
    filepath: &str,
) -> Result<bool, git2::Error> {
    let parent = commit.parent(0).ok();
    let tree = commit.tree()?;
    let parent_tree = parent.as_ref().map(|p| p.tree()).transpose()?;

    let mut diff_opts = DiffOptions::new();
    diff_opts.pathspec(filepath);

    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut diff_opts))?;

    Ok(diff.deltas().len() > 0)
}

fn extract_snapshot(commit: &git2::Commit) -> SnapshotInfo {
    let summary = commit
        .message()
        .unwrap_or("")
        .lines()
        .next()
        .unwrap_or("")
        .to_string();

    SnapshotInfo {
        commit: commit.id().to_string(),
        committed_at: commit_local_datetime(&commit.time()),
        author: commit.author().name().unwrap_or("Unknown").to_string(),
        summary,
    }
}

/// Convert a commit timestamp to a local naive datetime.
///
/// Every date comparison and every artifact name goes through this one
/// conversion, keeping cursor math and output naming consistent.
pub(crate) fn commit_local_datetime(time: &git2::Time) -> NaiveDateTime {
    match Local.timestamp_opt(time.seconds(), 0).single() {
        Some(dt) => dt.naive_local(),
        None => NaiveDateTime::default(),
    }
}
