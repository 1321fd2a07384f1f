//! Working-copy provisioning: open, validate, refresh, clone.
//!
//! A provisioned repository is either an explicit local path supplied by the
//! caller, or a managed working copy under the cache root keyed by
//! organization/name. Clones embed the credential token in the transport
//! URL, which persists in the origin remote so later fetches stay
//! authenticated. Failures never leak the token: it is replaced by a
//! fixed-width mask before the error propagates.

use git2::Repository;
use std::path::Path;
use tracing::{debug, info, warn};

use super::identity::RepoIdentity;
use super::CollateError;

/// Fixed-width replacement for credential tokens in surfaced errors.
const TOKEN_MASK: &str = "**********";

/// Open an existing working copy. No fetch is performed.
pub fn open_local(path: &Path) -> Result<Repository, CollateError> {
    let repo = Repository::open(path)?;
    debug!("opened git repository at {:?}", repo.path());
    Ok(repo)
}

/// Confirm the working copy's origin remote resolves to the requested
/// identity, failing with a mismatch otherwise.
///
/// A missing origin remote also counts as a mismatch: the identity cannot
/// be confirmed.
pub fn validate_origin(repo: &Repository, identity: &RepoIdentity) -> Result<(), CollateError> {
    let matched = repo
        .find_remote("origin")
        .ok()
        .and_then(|remote| remote.url().map(|url| identity.matches_origin(url)))
        .unwrap_or(false);

    if !matched {
        return Err(CollateError::RepositoryMismatch(identity.to_string()));
    }
    Ok(())
}

/// Fetch `branch` from origin and fast-forward the local branch to it.
///
/// Origin keeps whatever URL it was cloned with, token included, so the
/// fetch needs no separate credentials. A diverged local branch is left on
/// the fetched state with a warning rather than merged.
pub fn refresh(repo: &Repository, branch: &str) -> Result<(), CollateError> {
    let mut remote = repo.find_remote("origin")?;
    let secret = remote.url().and_then(url_userinfo).map(str::to_string);

    remote.fetch(&[branch], None, None).map_err(|e| {
        let message = match &secret {
            Some(secret) => redact(e.message(), secret),
            None => e.message().to_string(),
        };
        CollateError::FetchFailed {
            remote: "origin".to_string(),
            message,
        }
    })?;
    debug!("fetched origin/{}", branch);

    let fetch_head = repo.find_reference("FETCH_HEAD")?;
    let fetch_commit = repo.reference_to_annotated_commit(&fetch_head)?;
    let (analysis, _) = repo.merge_analysis(&[&fetch_commit])?;

    if analysis.is_up_to_date() {
        debug!("{} already up to date", branch);
        return Ok(());
    }

    if analysis.is_fast_forward() {
        let refname = format!("refs/heads/{}", branch);
        let mut reference = repo.find_reference(&refname)?;
        reference.set_target(fetch_commit.id(), "fast-forward")?;
        repo.set_head(&refname)?;
        repo.checkout_head(Some(git2::build::CheckoutBuilder::new().force()))?;
        info!("fast-forwarded {} to {}", branch, fetch_commit.id());
    } else {
        warn!(
            "local {} has diverged from origin; keeping fetched objects without merging",
            branch
        );
    }

    Ok(())
}

/// Clone `url` at `branch` into `dest`.
///
/// On failure the error carries the URL and the underlying message with
/// `secret` masked out.
pub fn clone_repo(
    url: &str,
    secret: Option<&str>,
    branch: &str,
    dest: &Path,
) -> Result<Repository, CollateError> {
    let shown = match secret {
        Some(secret) => redact(url, secret),
        None => url.to_string(),
    };
    info!("cloning {} into {}", shown, dest.display());

    let mut builder = git2::build::RepoBuilder::new();
    builder.branch(branch);
    builder.clone(url, dest).map_err(|e| {
        let message = match secret {
            Some(secret) => redact(e.message(), secret),
            None => e.message().to_string(),
        };
        CollateError::CloneFailed {
            url: shown,
            message,
        }
    })
}

/// Replace every occurrence of `secret` with the fixed-width mask.
pub fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret, TOKEN_MASK)
}

/// User-info component of a transport URL, if any.
fn url_userinfo(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let (userinfo, _) = rest.split_once('@')?;
    if userinfo.is_empty() {
        None
    } else {
        Some(userinfo)
    }
}
