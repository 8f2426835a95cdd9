//! GitHub REST surface used by `rh init`.
//!
//! [`GithubApi`] lists every endpoint the provisioning workflow touches, so
//! the workflow can run against [`GithubClient`] in production and against a
//! recording mock in tests.

pub mod auth;
pub mod client;
#[cfg(test)]
pub mod testing;
pub mod types;

use async_trait::async_trait;
use rh_common::{BranchProtectionSettings, RepoSlug, RepositorySettings};

use crate::errors::GithubError;
use types::{
    ContentEntry, CreatedObject, EncryptedSecret, GenerateRequest, GitBlob, GitRef, GitTree,
    NewBlob, NewCommit, NewTree, Organization, PublicKey, RefUpdate, Repository, TokenInfo,
};

pub use client::GithubClient;

#[async_trait]
pub trait GithubApi: Send + Sync {
    /// `GET /user`
    async fn authenticated_user(&self) -> Result<TokenInfo, GithubError>;

    /// `GET /user/orgs`
    async fn list_orgs(&self) -> Result<Vec<Organization>, GithubError>;

    /// `GET /repos/{owner}/{repo}`
    async fn get_repo(&self, repo: &RepoSlug) -> Result<Repository, GithubError>;

    /// `GET /repos/{owner}/{repo}/contents`
    async fn list_contents(&self, repo: &RepoSlug) -> Result<Vec<ContentEntry>, GithubError>;

    /// `POST /repos/{template_owner}/{template_repo}/generate`
    async fn generate_from_template(
        &self,
        template: &RepoSlug,
        request: &GenerateRequest,
    ) -> Result<Repository, GithubError>;

    /// `PATCH /repos/{owner}/{repo}`
    async fn update_repo(
        &self,
        repo: &RepoSlug,
        settings: &RepositorySettings,
    ) -> Result<(), GithubError>;

    /// `PUT /repos/{owner}/{repo}/branches/{branch}/protection`
    async fn protect_branch(
        &self,
        repo: &RepoSlug,
        branch: &str,
        settings: &BranchProtectionSettings,
    ) -> Result<(), GithubError>;

    /// `GET /repos/{owner}/{repo}/git/ref/{ref}`, `reference` like `heads/master`.
    async fn get_ref(&self, repo: &RepoSlug, reference: &str) -> Result<GitRef, GithubError>;

    /// `GET /repos/{owner}/{repo}/git/trees/{sha}`
    async fn get_tree(
        &self,
        repo: &RepoSlug,
        sha: &str,
        recursive: bool,
    ) -> Result<GitTree, GithubError>;

    /// `GET /repos/{owner}/{repo}/git/blobs/{sha}`
    async fn get_blob(&self, repo: &RepoSlug, sha: &str) -> Result<GitBlob, GithubError>;

    /// `POST /repos/{owner}/{repo}/git/blobs`
    async fn create_blob(&self, repo: &RepoSlug, blob: &NewBlob)
    -> Result<CreatedObject, GithubError>;

    /// `POST /repos/{owner}/{repo}/git/trees`
    async fn create_tree(&self, repo: &RepoSlug, tree: &NewTree)
    -> Result<CreatedObject, GithubError>;

    /// `POST /repos/{owner}/{repo}/git/commits`
    async fn create_commit(
        &self,
        repo: &RepoSlug,
        commit: &NewCommit,
    ) -> Result<CreatedObject, GithubError>;

    /// `PATCH /repos/{owner}/{repo}/git/refs/{ref}`
    async fn update_ref(
        &self,
        repo: &RepoSlug,
        reference: &str,
        update: &RefUpdate,
    ) -> Result<(), GithubError>;

    /// `GET /repos/{owner}/{repo}/actions/secrets/public-key`
    async fn get_public_key(&self, repo: &RepoSlug) -> Result<PublicKey, GithubError>;

    /// `PUT /repos/{owner}/{repo}/actions/secrets/{secret_name}`
    async fn put_secret(
        &self,
        repo: &RepoSlug,
        name: &str,
        secret: &EncryptedSecret,
    ) -> Result<(), GithubError>;
}
