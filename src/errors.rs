//! Typed error hierarchy for the `rh` CLI.
//!
//! Four enums cover the subsystems:
//! - `GithubError` - REST calls against the hosting service
//! - `ProvisionError` - the create-from-template workflow
//! - `PreflightError` - environment checks that gate a command
//! - `MaterializeError` - local template clone and rewrite
//!
//! Not every terminal path is an error: a declined confirmation or an
//! already existing repository end the command with [`Outcome`].

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// How a command finished when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The user answered "no" to the final confirmation.
    Declined,
    /// The command stopped early without doing anything harmful.
    Skipped(String),
}

/// Errors from the GitHub REST client.
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("GitHub API {method} {path} returned {status}: {message}")]
    Status {
        method: String,
        path: String,
        status: u16,
        message: String,
    },

    #[error("Failed to reach GitHub API ({path}): {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse GitHub API response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

impl GithubError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GithubError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The API's explanation for a non-2xx response.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            GithubError::Status { message, .. } => Some(message),
            _ => None,
        }
    }

    /// 404 is the only status the polling loops treat as "not ready yet".
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// 403, returned e.g. when the account plan does not support a feature.
    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }
}

/// Errors from the remote repository provisioning workflow.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Timeout waiting for {what} after {}s", waited.as_secs())]
    Timeout {
        what: &'static str,
        waited: Duration,
    },

    #[error("File {path} not found in the repository tree")]
    FileNotInTree { path: String },

    #[error("File {path} is not a valid JSON object: {reason}")]
    MalformedManifest { path: String, reason: String },

    #[error("Blob for {path} is not valid base64: {source}")]
    BlobEncoding {
        path: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Failed to encrypt secret {name}: {reason}")]
    Encryption { name: String, reason: String },

    #[error(transparent)]
    Github(#[from] GithubError),
}

impl ProvisionError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProvisionError::Timeout { .. })
    }
}

/// Environment checks that must pass before a command does any work.
#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("This script requires {0} to be installed")]
    MissingBinary(String),

    #[error("No GitHub token found. Add GITHUB_TOKEN=your-github-token to the .env file")]
    MissingToken,

    #[error("GitHub token is invalid. Use a GitHub classic personal access token with repo scope")]
    InvalidToken,

    #[error("No Internet connection")]
    Offline,

    #[error("SSH connection to {host} failed. Make sure your SSH key is added to your account")]
    SshUnavailable { host: String },

    #[error("Current directory {} is already a git repository", path.display())]
    AlreadyRepository { path: PathBuf },

    #[error("This is not a HubSpot CMS theme folder. Open a theme folder and run the command again")]
    NotATheme,

    #[error("This HubSpot theme is not compatible with this CLI: {reason}")]
    IncompatibleTheme { reason: String },
}

/// Errors from local template materialization.
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("Folder {} already exists", path.display())]
    FolderExists { path: PathBuf },

    #[error("git {args} failed: {stderr}")]
    GitFailed { args: String, stderr: String },

    #[error("Failed to run git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Failed to update {}: {reason}", path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error("Failed to remove template history at {}: {source}", path.display())]
    DetachHistory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
