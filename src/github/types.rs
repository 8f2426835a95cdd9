//! Request and response bodies for the GitHub REST endpoints used by `rh`.
//!
//! Only the fields the CLI reads are modelled; serde ignores the rest.

use serde::{Deserialize, Serialize};

/// Result of `GET /user` plus the token scopes reported in the
/// `x-oauth-scopes` response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub login: String,
    /// `None` when the header is absent (fine-grained or app tokens).
    pub scopes: Option<Vec<String>>,
}

impl TokenInfo {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes
            .as_ref()
            .is_some_and(|scopes| scopes.iter().any(|s| s == scope))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticatedUser {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    pub login: String,
}

/// A GitHub repository (subset of fields we care about).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub full_name: String,
    pub name: String,
    #[serde(default)]
    pub private: bool,
    pub html_url: String,
    pub default_branch: Option<String>,
}

/// One entry of `GET /repos/{owner}/{repo}/contents`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
}

/// Body of `POST /repos/{template_owner}/{template_repo}/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    pub owner: String,
    pub name: String,
    pub description: String,
    pub include_all_branches: bool,
    pub private: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitObject {
    pub sha: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub name: String,
    pub object: GitObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitTree {
    pub sha: String,
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

impl GitTree {
    /// Blob sha of the entry at `path`, if the tree lists one.
    pub fn blob_sha(&self, path: &str) -> Option<&str> {
        self.tree
            .iter()
            .find(|entry| entry.path == path)
            .and_then(|entry| entry.sha.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitBlob {
    pub sha: String,
    pub content: String,
    pub encoding: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBlob {
    pub content: String,
    pub encoding: String,
}

/// Mode of a regular, non-executable file.
pub const REGULAR_FILE_MODE: &str = "100644";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTreeEntry {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
}

impl NewTreeEntry {
    pub fn blob(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: REGULAR_FILE_MODE.to_string(),
            kind: "blob".to_string(),
            sha: sha.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTree {
    pub base_tree: String,
    pub tree: Vec<NewTreeEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCommit {
    pub message: String,
    pub tree: String,
    pub parents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefUpdate {
    pub sha: String,
    pub force: bool,
}

/// Response of the create-blob, create-tree and create-commit endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedObject {
    pub sha: String,
}

/// Repository Actions public key used to seal secrets.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicKey {
    pub key_id: String,
    /// Base64 encoded X25519 public key.
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncryptedSecret {
    pub encrypted_value: String,
    pub key_id: String,
}
