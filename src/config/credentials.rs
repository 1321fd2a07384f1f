//! Host credentials for gleaner
//!
//! Supports loading credentials from:
//! - Environment variables
//! - ~/.config/gleaner/credentials.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::collate::CredentialResolver;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Credentials {
    #[serde(default)]
    pub github: HostCredential,

    #[serde(default)]
    pub github_enterprise: HostCredential,

    #[serde(default)]
    pub bitbucket: HostCredential,

    #[serde(default)]
    pub gitlab: HostCredential,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HostCredential {
    /// Personal access token, sent as URL userinfo when cloning
    pub token: Option<String>,
}

impl Credentials {
    /// Load credentials from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. Credentials file (`path` if given, else ~/.config/gleaner/credentials.toml)
    ///
    /// A missing or unreadable file yields an empty store rather than an
    /// error, so anonymous use needs no setup.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut creds = Credentials::default();

        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::credentials_path(),
        };
        if let Some(file) = file.filter(|p| p.exists()) {
            match std::fs::read_to_string(&file) {
                Ok(content) => match toml::from_str::<Credentials>(&content) {
                    Ok(parsed) => creds = parsed,
                    Err(e) => warn!("ignoring malformed credentials file {}: {e}", file.display()),
                },
                Err(e) => warn!("could not read credentials file {}: {e}", file.display()),
            }
        }

        // Environment variables override everything
        if let Ok(token) = std::env::var("GLEANER_GITHUB_TOKEN") {
            creds.github.token = Some(token);
        }
        if let Ok(token) = std::env::var("GLEANER_GITHUB_ENTERPRISE_TOKEN") {
            creds.github_enterprise.token = Some(token);
        }
        if let Ok(token) = std::env::var("GLEANER_BITBUCKET_TOKEN") {
            creds.bitbucket.token = Some(token);
        }
        if let Ok(token) = std::env::var("GLEANER_GITLAB_TOKEN") {
            creds.gitlab.token = Some(token);
        }

        Ok(creds)
    }

    /// Get the default credentials file path
    pub fn credentials_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gleaner").join("credentials.toml"))
    }

    /// Classify a host and return its token.
    ///
    /// Hosts are matched by substring in a fixed order, so github.com takes
    /// the public entry while any other host containing "github" falls to
    /// the enterprise entry. Unmatched hosts get no token and cloning
    /// proceeds unauthenticated.
    pub fn token_for_host(&self, host: &str) -> Option<&str> {
        let entry = if host.contains("github.com") {
            &self.github
        } else if host.contains("github") {
            &self.github_enterprise
        } else if host.contains("bitbucket") {
            &self.bitbucket
        } else if host.contains("gitlab") {
            &self.gitlab
        } else {
            return None;
        };
        entry.token.as_deref()
    }
}

impl CredentialResolver for Credentials {
    fn token_for(&self, host: &str) -> Option<String> {
        self.token_for_host(host).map(str::to_string)
    }
}
