//! Configuration module for gleaner
//!
//! This module handles:
//! - Host credentials (credentials.toml)
//! - Environment variable overrides

mod credentials;

pub use credentials::{Credentials, HostCredential};
