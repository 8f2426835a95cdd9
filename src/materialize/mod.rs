//! Local project creation from a template repository.
//!
//! The template is cloned shallowly, its history is dropped and a fresh
//! repository is started with two commits: the template content as-is, then
//! the manifests rewritten with the project identity.

use std::path::{Path, PathBuf};

use rh_common::{DEFAULT_BRANCH, LocalPlan, RepoSlug, TRACKED_MANIFESTS};
use tracing::info;

use crate::errors::MaterializeError;
use crate::manifest;
use crate::provision::commit::commit_message;
use crate::ui::Step;
use crate::vcs::{Git, LogEntry};

pub const INITIAL_COMMIT: &str = "Initial commit";

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct Materialized {
    pub folder: PathBuf,
    /// Newest first: the manifest commit, then the initial commit.
    pub log: Vec<LogEntry>,
}

pub struct Materializer {
    git: Git,
    template_remote: Option<String>,
}

impl Materializer {
    /// Materialize into subfolders of `git`'s working directory.
    pub fn new(git: Git) -> Self {
        Self {
            git,
            template_remote: None,
        }
    }

    /// Clone templates from `{remote}/{name}` instead of GitHub over SSH.
    pub fn with_template_remote(mut self, remote: impl Into<String>) -> Self {
        self.template_remote = Some(remote.into());
        self
    }

    pub fn clone_url(&self, template: &RepoSlug) -> String {
        match &self.template_remote {
            Some(remote) => format!("{}/{}", remote.trim_end_matches('/'), template.name),
            None => template.ssh_url(),
        }
    }

    pub fn target_folder(&self, plan: &LocalPlan) -> PathBuf {
        self.git.dir().join(&plan.new_repo_name)
    }

    pub async fn materialize(&self, plan: &LocalPlan) -> Result<Materialized, MaterializeError> {
        let folder = self.target_folder(plan);
        if folder.exists() {
            return Err(MaterializeError::FolderExists { path: folder });
        }

        let url = self.clone_url(&plan.template());
        Step::run(
            format!("Clone {}", plan.template()),
            self.git.clone_shallow(&url, &plan.new_repo_name),
        )
        .await?;

        let repo = self.git.at(&folder);
        Step::run("Start new git history", async {
            detach_history(&folder)?;
            repo.init(DEFAULT_BRANCH).await?;
            repo.add_all().await?;
            repo.commit(INITIAL_COMMIT).await
        })
        .await?;

        let changes = manifest::identity_changes(&plan.new_repo_name, &plan.new_repo_label);
        Step::run(
            format!("Update [{}] and commit", TRACKED_MANIFESTS.join(",")),
            async {
                for path in TRACKED_MANIFESTS {
                    rewrite_manifest(&folder.join(path), &changes)?;
                }
                repo.add_all().await?;
                repo.commit(&commit_message(&TRACKED_MANIFESTS)).await
            },
        )
        .await?;

        let log = repo.log("-2").await?;
        info!(folder = %folder.display(), "local project created");
        Ok(Materialized { folder, log })
    }
}

fn detach_history(folder: &Path) -> Result<(), MaterializeError> {
    let git_dir = folder.join(".git");
    std::fs::remove_dir_all(&git_dir).map_err(|source| MaterializeError::DetachHistory {
        path: git_dir,
        source,
    })
}

fn rewrite_manifest(
    path: &Path,
    changes: &serde_json::Map<String, serde_json::Value>,
) -> Result<(), MaterializeError> {
    let manifest_error = |reason: String| MaterializeError::Manifest {
        path: path.to_path_buf(),
        reason,
    };
    let content = std::fs::read_to_string(path).map_err(|e| manifest_error(e.to_string()))?;
    let updated = manifest::update_existing(&content, changes).map_err(manifest_error)?;
    std::fs::write(path, updated).map_err(|e| manifest_error(e.to_string()))
}
