//! Temporal file retrieval from git repositories.
//!
//! A [`Collator`] session ties one repository identity to one working copy.
//! The working copy is provisioned lazily on first use (explicit path, cache
//! hit with refresh, or credential-injected clone) and memoized for the rest
//! of the session, so repeated reads observe a fixed view of remote state.
//!
//! # Example
//!
//! ```rust,ignore
//! use gleaner::collate::{Collator, RepoIdentity};
//!
//! let identity = RepoIdentity::parse("https://github.com/foo/bar")?;
//! let mut collator = Collator::new(identity, Box::new(creds), "master");
//! let snapshots = collator.read("raw/foo/foo.json", from, until)?;
//! collator.write("raw/foo/foo.json", &snapshots, Path::new("."))?;
//! ```

mod artifacts;
mod identity;
mod locate;
mod provision;

pub use identity::RepoIdentity;
pub use locate::SnapshotInfo;

#[cfg(test)]
pub(crate) use locate::tests as test_repos;

use chrono::NaiveDate;
use git2::Repository;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while collating repository content
#[derive(Error, Debug)]
pub enum CollateError {
    #[error("{path} not found between {from} and {until}")]
    FileMissing {
        path: String,
        from: NaiveDate,
        until: NaiveDate,
    },

    #[error("{0} repository mismatch")]
    RepositoryMismatch(String),

    #[error("failed to clone {url}: {message}")]
    CloneFailed { url: String, message: String },

    #[error("failed to fetch from {remote}: {message}")]
    FetchFailed { remote: String, message: String },

    #[error("invalid repository url: {0}")]
    InvalidUrl(String),

    #[error("{path} at {commit} is not valid UTF-8 text")]
    NonUtf8Content { path: String, commit: String },

    #[error(transparent)]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CollateResult<T> = Result<T, CollateError>;

/// Resolves an authentication token for a repository host.
///
/// Implementations classify the host string and hand back the matching
/// token, or None to attempt anonymous access.
pub trait CredentialResolver {
    fn token_for(&self, host: &str) -> Option<String>;
}

/// One retrieval session against one repository.
pub struct Collator {
    identity: RepoIdentity,
    credentials: Box<dyn CredentialResolver>,
    branch: String,
    repo_path: Option<PathBuf>,
    cache_root: PathBuf,
    validate: bool,
    repo: Option<Repository>,
}

impl Collator {
    pub fn new(
        identity: RepoIdentity,
        credentials: Box<dyn CredentialResolver>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            credentials,
            branch: branch.into(),
            repo_path: None,
            cache_root: std::env::temp_dir().join("gleaner"),
            validate: true,
            repo: None,
        }
    }

    /// Use an existing local working copy instead of the managed cache.
    pub fn with_repo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.repo_path = Some(path.into());
        self
    }

    /// Root directory for managed working copies, keyed by org/name below it.
    pub fn with_cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache_root = root.into();
        self
    }

    /// Toggle origin identity validation.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Ensure a working copy exists and return its handle.
    ///
    /// An explicit path is opened once and never fetched. A memoized handle
    /// is re-validated (when enabled) and reused. Otherwise the cache path
    /// `{cache_root}/{org}/{name}` is either opened and refreshed, or
    /// populated by a fresh clone with the host's token in the URL.
    pub fn provision(&mut self) -> CollateResult<&Repository> {
        let mut repo = self.repo.take();
        if repo.is_none() {
            if let Some(path) = &self.repo_path {
                repo = Some(provision::open_local(path)?);
            }
        }
        if let Some(repo) = repo {
            if self.validate {
                provision::validate_origin(&repo, &self.identity)?;
            }
            return Ok(self.repo.insert(repo));
        }

        let local_path = self
            .cache_root
            .join(&self.identity.org)
            .join(&self.identity.name);

        let repo = if local_path.join(".git").is_dir() {
            debug!("reusing cached working copy at {}", local_path.display());
            let repo = provision::open_local(&local_path)?;
            provision::refresh(&repo, &self.branch)?;
            repo
        } else {
            let token = self.credentials.token_for(&self.identity.host);
            let url = self.identity.remote_url(token.as_deref());
            provision::clone_repo(&url, token.as_deref(), &self.branch, &local_path)?
        };

        Ok(self.repo.insert(repo))
    }

    /// Locate the snapshots of `filepath` in effect across `[from, until]`,
    /// most recent first. See [`SnapshotInfo`].
    pub fn read(
        &mut self,
        filepath: &str,
        from: NaiveDate,
        until: NaiveDate,
    ) -> CollateResult<Vec<SnapshotInfo>> {
        let repo = self.provision()?;
        locate::locate(repo, filepath, from, until)
    }

    /// Write each snapshot's content to a dated artifact under `dest`,
    /// returning the paths written.
    pub fn write(
        &mut self,
        filepath: &str,
        snapshots: &[SnapshotInfo],
        dest: &Path,
    ) -> CollateResult<Vec<PathBuf>> {
        let repo = self.provision()?;
        artifacts::write_snapshots(repo, filepath, snapshots, dest)
    }

    /// `read` then `write` in one step.
    pub fn collate(
        &mut self,
        filepath: &str,
        from: NaiveDate,
        until: NaiveDate,
        dest: &Path,
    ) -> CollateResult<Vec<PathBuf>> {
        let snapshots = self.read(filepath, from, until)?;
        self.write(filepath, &snapshots, dest)
    }

    /// Content of `filepath` as it stood on `day`, or None when no commit
    /// touches the file at or before that day.
    pub fn file_content(&mut self, filepath: &str, day: NaiveDate) -> CollateResult<Option<Vec<u8>>> {
        let snapshots = match self.read(filepath, day, day) {
            Ok(snapshots) => snapshots,
            Err(CollateError::FileMissing { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        let repo = self.provision()?;
        match snapshots.first() {
            Some(snapshot) => Ok(Some(locate::content_at(repo, &snapshot.commit, filepath)?)),
            None => Ok(None),
        }
    }

    pub fn identity(&self) -> &RepoIdentity {
        &self.identity
    }
}
