//! Multi-file commit through the Git database API.
//!
//! The branch head is read once. Every target blob is fetched, rewritten and
//! uploaded concurrently, then a single tree and commit are created on top of
//! that head and the branch ref is moved to the new commit. Concurrent
//! writers between the read and the ref update are not detected.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use futures::future::try_join_all;
use rh_common::RepoSlug;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::errors::ProvisionError;
use crate::github::GithubApi;
use crate::github::types::{NewBlob, NewCommit, NewTree, NewTreeEntry, RefUpdate};
use crate::manifest;

/// Snapshot of the branch taken before any write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitTreeUpdate {
    pub base_commit_sha: String,
    pub base_tree_sha: String,
    /// `(path, current blob sha)` for every file to rewrite.
    pub targets: Vec<(String, String)>,
}

/// Objects created by a committed [`GitTreeUpdate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeUpdateResult {
    pub new_blob_shas: Vec<String>,
    pub new_tree_sha: String,
    pub new_commit_sha: String,
}

pub fn commit_message(paths: &[&str]) -> String {
    format!("[TASK] update {} with new project info", paths.join(","))
}

/// Read the head of `branch` and resolve the blob of every path.
pub async fn read_tree_update(
    api: &dyn GithubApi,
    repo: &RepoSlug,
    branch: &str,
    paths: &[&str],
) -> Result<GitTreeUpdate, ProvisionError> {
    let head = api.get_ref(repo, &format!("heads/{}", branch)).await?;
    let base_commit_sha = head.object.sha;
    let tree = api.get_tree(repo, &base_commit_sha, true).await?;
    if tree.truncated {
        debug!(%repo, "recursive tree listing was truncated");
    }

    let targets = paths
        .iter()
        .map(|path| {
            tree.blob_sha(path)
                .map(|sha| (path.to_string(), sha.to_string()))
                .ok_or_else(|| ProvisionError::FileNotInTree {
                    path: path.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GitTreeUpdate {
        base_commit_sha,
        base_tree_sha: tree.sha,
        targets,
    })
}

/// Fetch one blob, apply the update-only merge and upload the result.
async fn rewrite_blob(
    api: &dyn GithubApi,
    repo: &RepoSlug,
    path: &str,
    sha: &str,
    changes: &Map<String, Value>,
) -> Result<NewTreeEntry, ProvisionError> {
    let blob = api.get_blob(repo, sha).await?;
    let content = decode_blob(path, &blob.content, &blob.encoding)?;
    let updated =
        manifest::update_existing(&content, changes).map_err(|reason| {
            ProvisionError::MalformedManifest {
                path: path.to_string(),
                reason,
            }
        })?;

    let created = api
        .create_blob(
            repo,
            &NewBlob {
                content: STANDARD.encode(updated.as_bytes()),
                encoding: "base64".to_string(),
            },
        )
        .await?;
    debug!(path, old = sha, new = %created.sha, "blob rewritten");
    Ok(NewTreeEntry::blob(path, created.sha))
}

/// Blob content as text. Base64 payloads from the API are line-wrapped.
fn decode_blob(path: &str, content: &str, encoding: &str) -> Result<String, ProvisionError> {
    let bytes = if encoding == "base64" {
        let compact: String = content.split_whitespace().collect();
        STANDARD
            .decode(compact)
            .map_err(|source| ProvisionError::BlobEncoding {
                path: path.to_string(),
                source,
            })?
    } else {
        content.as_bytes().to_vec()
    };
    String::from_utf8(bytes).map_err(|e| ProvisionError::MalformedManifest {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

/// Write the rewritten files on top of `update.base_commit_sha` and force
/// `branch` to the new commit.
pub async fn apply_tree_update(
    api: &dyn GithubApi,
    repo: &RepoSlug,
    branch: &str,
    update: &GitTreeUpdate,
    changes: &Map<String, Value>,
) -> Result<TreeUpdateResult, ProvisionError> {
    let entries = try_join_all(
        update
            .targets
            .iter()
            .map(|(path, sha)| rewrite_blob(api, repo, path, sha, changes)),
    )
    .await?;
    let new_blob_shas = entries.iter().map(|e| e.sha.clone()).collect();

    let paths: Vec<&str> = update.targets.iter().map(|(p, _)| p.as_str()).collect();
    let tree = api
        .create_tree(
            repo,
            &NewTree {
                base_tree: update.base_tree_sha.clone(),
                tree: entries,
            },
        )
        .await?;
    let commit = api
        .create_commit(
            repo,
            &NewCommit {
                message: commit_message(&paths),
                tree: tree.sha.clone(),
                parents: vec![update.base_commit_sha.clone()],
            },
        )
        .await?;
    api.update_ref(
        repo,
        &format!("heads/{}", branch),
        &RefUpdate {
            sha: commit.sha.clone(),
            force: true,
        },
    )
    .await?;

    info!(%repo, commit = %commit.sha, "files committed");
    Ok(TreeUpdateResult {
        new_blob_shas,
        new_tree_sha: tree.sha,
        new_commit_sha: commit.sha,
    })
}

/// Read-modify-write of `paths` on `branch` in one commit.
pub async fn commit_file_updates(
    api: &dyn GithubApi,
    repo: &RepoSlug,
    branch: &str,
    paths: &[&str],
    changes: &Map<String, Value>,
) -> Result<TreeUpdateResult, ProvisionError> {
    let update = read_tree_update(api, repo, branch, paths).await?;
    apply_tree_update(api, repo, branch, &update, changes).await
}
