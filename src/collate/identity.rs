//! Repository identity parsing and origin matching.

use std::fmt;

use super::CollateError;

/// Identity of a remote repository, parsed from `scheme://host/org/name`.
///
/// Immutable after construction. The `org`/`name` pair keys the working-copy
/// cache and is what identity validation compares against a working copy's
/// origin remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoIdentity {
    pub scheme: String,
    pub host: String,
    pub org: String,
    pub name: String,
}

impl RepoIdentity {
    /// Parse an identity URL of the form `scheme://host/org/name`.
    ///
    /// A trailing `.git` on the repository name is accepted and stripped.
    pub fn parse(url: &str) -> Result<Self, CollateError> {
        let invalid = || CollateError::InvalidUrl(url.to_string());

        let (scheme, rest) = url.split_once("://").ok_or_else(invalid)?;
        let (host, path) = rest.split_once('/').ok_or_else(invalid)?;

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if scheme.is_empty() || host.is_empty() || segments.len() != 2 {
            return Err(invalid());
        }

        let name = segments[1].trim_end_matches(".git");
        if name.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            org: segments[0].to_string(),
            name: name.to_string(),
        })
    }

    /// Placeholder identity for a purely local working copy.
    ///
    /// Used when the caller operates on an explicit repository path and no
    /// remote identity exists to validate against.
    pub fn local() -> Self {
        Self {
            scheme: String::new(),
            host: String::new(),
            org: "local".to_string(),
            name: "local".to_string(),
        }
    }

    pub fn is_local(&self) -> bool {
        self.host.is_empty()
    }

    /// Transport URL for cloning, with the token embedded in the user-info
    /// component when one is available.
    pub fn remote_url(&self, token: Option<&str>) -> String {
        match token {
            Some(token) => format!(
                "{}://{}@{}/{}/{}.git",
                self.scheme, token, self.host, self.org, self.name
            ),
            None => format!(
                "{}://{}/{}/{}.git",
                self.scheme, self.host, self.org, self.name
            ),
        }
    }

    /// Whether an origin remote URL resolves to the same org/name pair.
    ///
    /// Handles both `https://host/org/name.git` and `git@host:org/name.git`
    /// forms.
    pub fn matches_origin(&self, origin_url: &str) -> bool {
        let trimmed = origin_url.trim_end_matches(".git");
        let mut parts = trimmed.rsplit('/');
        let name = parts.next().unwrap_or("");
        let org = parts.next().unwrap_or("");
        // The scp-like form puts the org after a colon: git@host:org
        let org = org.rsplit(':').next().unwrap_or(org);
        self.org == org && self.name == name
    }
}

impl fmt::Display for RepoIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_local() {
            write!(f, "local repository")
        } else {
            write!(f, "{}/{}", self.org, self.name)
        }
    }
}
