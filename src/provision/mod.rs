//! Hosted repository provisioning.
//!
//! [`Provisioner`] turns a confirmed [`ProvisioningPlan`] into a configured
//! repository on GitHub:
//!
//! 1. generate the repository from its template and wait until it is served
//!    and populated,
//! 2. apply [`REPOSITORY_SETTINGS`],
//! 3. protect the default branch (a 403 only warns),
//! 4. seed the Actions secrets when the plan asks for them,
//! 5. rewrite the tracked manifests in a single commit.
//!
//! Nothing is rolled back when a later step fails.

pub mod commit;
pub mod poll;
pub mod secrets;

use rh_common::{
    BRANCH_PROTECTION, BranchProtectionSettings, DEFAULT_BRANCH, ProvisioningPlan,
    REPOSITORY_SETTINGS, RepoSlug, RepositorySettings, TRACKED_MANIFESTS,
};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::errors::{GithubError, Outcome, ProvisionError};
use crate::github::GithubApi;
use crate::github::types::GenerateRequest;
use crate::manifest;
use crate::ui::Step;
use crate::ui::progress::print_line;

pub use commit::{GitTreeUpdate, TreeUpdateResult};
pub use poll::PollPolicy;

/// Result of the branch protection step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtectionOutcome {
    Applied,
    /// The account's plan does not allow protection; carries the API message.
    NotAvailable(String),
}

pub struct Provisioner<'a> {
    api: &'a dyn GithubApi,
    policy: PollPolicy,
    branch: &'a str,
}

impl<'a> Provisioner<'a> {
    pub fn new(api: &'a dyn GithubApi) -> Self {
        Self {
            api,
            policy: PollPolicy::default(),
            branch: DEFAULT_BRANCH,
        }
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// `GET /repos/{owner}/{repo}`: `false` on 404, other errors propagate.
    pub async fn repo_exists(&self, repo: &RepoSlug) -> Result<bool, GithubError> {
        match self.api.get_repo(repo).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Generate the plan's repository from its template and wait until it is
    /// queryable and has content. An existing repository is left untouched
    /// and reported as [`Outcome::Skipped`].
    pub async fn create_from_template(
        &self,
        plan: &ProvisioningPlan,
    ) -> Result<Outcome, ProvisionError> {
        let target = plan.target();
        if self.repo_exists(&target).await? {
            info!(%target, "repository already exists");
            return Ok(Outcome::Skipped("Repository already exists.".to_string()));
        }

        let request = GenerateRequest {
            owner: plan.new_repo_owner.clone(),
            name: plan.new_repo_name.clone(),
            description: plan.new_repo_label.clone(),
            include_all_branches: false,
            private: plan.is_private,
        };
        self.api
            .generate_from_template(&plan.template(), &request)
            .await?;
        debug!(%target, template = %plan.template(), "generation requested");

        poll::wait_for_repo(self.api, &target, self.policy).await?;
        poll::wait_for_content(self.api, &target, self.policy).await?;
        Ok(Outcome::Completed)
    }

    pub async fn apply_settings(
        &self,
        plan: &ProvisioningPlan,
        settings: &RepositorySettings,
    ) -> Result<(), ProvisionError> {
        self.api.update_repo(&plan.target(), settings).await?;
        Ok(())
    }

    pub async fn apply_branch_protection(
        &self,
        plan: &ProvisioningPlan,
        settings: &BranchProtectionSettings,
    ) -> Result<ProtectionOutcome, ProvisionError> {
        match self
            .api
            .protect_branch(&plan.target(), self.branch, settings)
            .await
        {
            Ok(()) => Ok(ProtectionOutcome::Applied),
            Err(e) if e.is_forbidden() => {
                let message = e.api_message().unwrap_or_default().to_string();
                warn!(%message, "branch protection not available");
                Ok(ProtectionOutcome::NotAvailable(message))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Seal and upload the plan's secrets. Does nothing unless
    /// `plan.is_secrets` is set.
    pub async fn seed_secrets(&self, plan: &ProvisioningPlan) -> Result<(), ProvisionError> {
        let Some(values) = plan.secrets.as_ref().filter(|_| plan.is_secrets) else {
            return Ok(());
        };
        let target = plan.target();
        let key = self.api.get_public_key(&target).await?;
        for (name, plaintext) in values.entries() {
            let encrypted = secrets::encrypt_secret(&key, name, plaintext)?;
            self.api.put_secret(&target, name, &encrypted).await?;
            debug!(%target, name, "secret stored");
        }
        Ok(())
    }

    pub async fn commit_file_updates(
        &self,
        repo: &RepoSlug,
        paths: &[&str],
        changes: &Map<String, Value>,
    ) -> Result<TreeUpdateResult, ProvisionError> {
        commit::commit_file_updates(self.api, repo, self.branch, paths, changes).await
    }

    /// Run every step for `plan`, each behind its own status line.
    pub async fn provision(&self, plan: &ProvisioningPlan) -> Result<Outcome, ProvisionError> {
        let step = Step::start("Create new repository from template");
        match self.create_from_template(plan).await {
            Ok(Outcome::Skipped(reason)) => {
                step.warn(&reason);
                return Ok(Outcome::Skipped(reason));
            }
            Ok(_) => step.succeed(),
            Err(e) => {
                step.fail();
                return Err(e);
            }
        }

        Step::run(
            "Update repository settings",
            self.apply_settings(plan, &REPOSITORY_SETTINGS),
        )
        .await?;

        let step = Step::start("Branch protection");
        match self.apply_branch_protection(plan, &BRANCH_PROTECTION).await {
            Ok(ProtectionOutcome::Applied) => step.succeed(),
            Ok(ProtectionOutcome::NotAvailable(message)) => {
                step.warn("Branch protection settings are not updated.");
                print_line(format!("  {}", message));
            }
            Err(e) => {
                step.fail();
                return Err(e);
            }
        }

        if plan.is_secrets {
            Step::run("Add repository secrets", self.seed_secrets(plan)).await?;
        }

        let changes = manifest::identity_changes(&plan.new_repo_name, &plan.new_repo_label);
        Step::run(
            format!("Update [{}] and commit", TRACKED_MANIFESTS.join(",")),
            self.commit_file_updates(&plan.target(), &TRACKED_MANIFESTS, &changes),
        )
        .await?;

        Ok(Outcome::Completed)
    }
}
