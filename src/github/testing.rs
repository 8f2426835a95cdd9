//! Recording mock of [`GithubApi`] for tests.
//!
//! `MockGithub` keeps an in-memory repository with a single branch head, a
//! flat tree of files and the Actions public key. Every call is recorded so
//! tests can assert which endpoints ran, and in which order.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use crypto_box::SecretKey;
use crypto_box::aead::OsRng;
use rh_common::{BranchProtectionSettings, RepoSlug, RepositorySettings};

use super::GithubApi;
use super::types::{
    ContentEntry, CreatedObject, EncryptedSecret, GenerateRequest, GitBlob, GitObject, GitRef,
    GitTree, NewBlob, NewCommit, NewTree, Organization, PublicKey, RefUpdate, Repository,
    TokenInfo, TreeEntry,
};
use crate::errors::GithubError;

pub const BASE_COMMIT: &str = "base-commit";
pub const BASE_TREE: &str = "base-tree";

/// Endpoints that change server-side state.
pub const MUTATING_METHODS: &[&str] = &[
    "generate_from_template",
    "update_repo",
    "protect_branch",
    "create_blob",
    "create_tree",
    "create_commit",
    "update_ref",
    "put_secret",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub method: &'static str,
    pub target: String,
}

struct MockState {
    calls: Vec<MockCall>,
    scopes: Option<Vec<String>>,
    user_status: Option<u16>,
    orgs: Vec<String>,
    exists: bool,
    generated: bool,
    repo_not_found_polls: usize,
    empty_content_polls: usize,
    never_ready: bool,
    polling_status: Option<u16>,
    update_status: Option<u16>,
    protect_status: Option<u16>,
    secret_status: Option<u16>,
    files: BTreeMap<String, String>,
    created_blobs: Vec<String>,
    created_trees: Vec<NewTree>,
    created_commits: Vec<NewCommit>,
    ref_updates: Vec<(String, RefUpdate)>,
    secrets: Vec<(String, EncryptedSecret)>,
}

pub struct MockGithub {
    state: Mutex<MockState>,
    secret_key: SecretKey,
}

impl Default for MockGithub {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGithub {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                calls: Vec::new(),
                scopes: Some(vec!["repo".to_string()]),
                user_status: None,
                orgs: Vec::new(),
                exists: false,
                generated: false,
                repo_not_found_polls: 0,
                empty_content_polls: 0,
                never_ready: false,
                polling_status: None,
                update_status: None,
                protect_status: None,
                secret_status: None,
                files: BTreeMap::new(),
                created_blobs: Vec::new(),
                created_trees: Vec::new(),
                created_commits: Vec::new(),
                ref_updates: Vec::new(),
                secrets: Vec::new(),
            }),
            secret_key: SecretKey::generate(&mut OsRng),
        }
    }

    fn with(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn with_scopes(self, scopes: Option<Vec<String>>) -> Self {
        self.with(|s| s.scopes = scopes)
    }

    pub fn with_user_status(self, status: u16) -> Self {
        self.with(|s| s.user_status = Some(status))
    }

    pub fn with_orgs(self, orgs: &[&str]) -> Self {
        self.with(|s| s.orgs = orgs.iter().map(|o| o.to_string()).collect())
    }

    /// The target repository exists before anything is generated.
    pub fn existing_repo(self) -> Self {
        self.with(|s| s.exists = true)
    }

    /// Answer 404 to `repo_polls` existence probes and an empty listing to
    /// `content_polls` content probes after generation.
    pub fn with_pending_polls(self, repo_polls: usize, content_polls: usize) -> Self {
        self.with(|s| {
            s.repo_not_found_polls = repo_polls;
            s.empty_content_polls = content_polls;
        })
    }

    /// The generated repository never becomes visible.
    pub fn never_ready(self) -> Self {
        self.with(|s| s.never_ready = true)
    }

    /// Existence probes after generation fail with this status.
    pub fn with_polling_status(self, status: u16) -> Self {
        self.with(|s| s.polling_status = Some(status))
    }

    pub fn with_update_status(self, status: u16) -> Self {
        self.with(|s| s.update_status = Some(status))
    }

    pub fn with_protect_status(self, status: u16) -> Self {
        self.with(|s| s.protect_status = Some(status))
    }

    pub fn with_secret_status(self, status: u16) -> Self {
        self.with(|s| s.secret_status = Some(status))
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.with(|s| {
            s.files.insert(path.to_string(), content.to_string());
        })
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn methods(&self) -> Vec<&'static str> {
        self.calls().into_iter().map(|c| c.method).collect()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls().iter().filter(|c| c.method == method).count()
    }

    pub fn mutating_calls(&self) -> Vec<MockCall> {
        self.calls()
            .into_iter()
            .filter(|c| MUTATING_METHODS.contains(&c.method))
            .collect()
    }

    /// Decoded contents of every blob created, in creation order.
    pub fn created_blobs(&self) -> Vec<String> {
        self.state.lock().unwrap().created_blobs.clone()
    }

    pub fn created_trees(&self) -> Vec<NewTree> {
        self.state.lock().unwrap().created_trees.clone()
    }

    pub fn created_commits(&self) -> Vec<NewCommit> {
        self.state.lock().unwrap().created_commits.clone()
    }

    pub fn ref_updates(&self) -> Vec<(String, RefUpdate)> {
        self.state.lock().unwrap().ref_updates.clone()
    }

    /// Decrypt a stored secret with the repository's private key.
    pub fn open_secret(&self, name: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        let (_, secret) = state.secrets.iter().find(|(n, _)| n == name)?;
        let sealed = STANDARD.decode(&secret.encrypted_value).ok()?;
        let plain = self.secret_key.unseal(&sealed).ok()?;
        String::from_utf8(plain).ok()
    }

    pub fn secret_key_ids(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.secrets.iter().map(|(_, s)| s.key_id.clone()).collect()
    }

    fn record(&self, method: &'static str, target: impl Into<String>) {
        self.state.lock().unwrap().calls.push(MockCall {
            method,
            target: target.into(),
        });
    }
}

fn status_error(method: &str, path: String, status: u16) -> GithubError {
    let message = match status {
        403 => "Upgrade to GitHub Pro or make this repository public to enable this feature.",
        404 => "Not Found",
        401 => "Bad credentials",
        _ => "Server Error",
    };
    GithubError::Status {
        method: method.to_string(),
        path,
        status,
        message: message.to_string(),
    }
}

fn fail_with(status: Option<u16>, method: &str, path: String) -> Result<(), GithubError> {
    match status {
        Some(status) => Err(status_error(method, path, status)),
        None => Ok(()),
    }
}

/// Wrap base64 at 60 columns like the blob endpoint does.
fn wrapped_base64(content: &str) -> String {
    let encoded = STANDARD.encode(content);
    encoded
        .as_bytes()
        .chunks(60)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

fn repository(repo: &RepoSlug) -> Repository {
    Repository {
        full_name: repo.to_string(),
        name: repo.name.clone(),
        private: false,
        html_url: repo.html_url(),
        default_branch: Some("master".to_string()),
    }
}

#[async_trait]
impl GithubApi for MockGithub {
    async fn authenticated_user(&self) -> Result<TokenInfo, GithubError> {
        self.record("authenticated_user", "/user");
        let state = self.state.lock().unwrap();
        if let Some(status) = state.user_status {
            return Err(status_error("GET", "/user".into(), status));
        }
        Ok(TokenInfo {
            login: "octocat".to_string(),
            scopes: state.scopes.clone(),
        })
    }

    async fn list_orgs(&self) -> Result<Vec<Organization>, GithubError> {
        self.record("list_orgs", "/user/orgs");
        let state = self.state.lock().unwrap();
        Ok(state
            .orgs
            .iter()
            .map(|login| Organization {
                login: login.clone(),
            })
            .collect())
    }

    async fn get_repo(&self, repo: &RepoSlug) -> Result<Repository, GithubError> {
        self.record("get_repo", repo.to_string());
        let mut state = self.state.lock().unwrap();
        let path = format!("/repos/{}", repo);
        if state.exists {
            return Ok(repository(repo));
        }
        if !state.generated || state.never_ready {
            return Err(status_error("GET", path, 404));
        }
        if let Some(status) = state.polling_status {
            return Err(status_error("GET", path, status));
        }
        if state.repo_not_found_polls > 0 {
            state.repo_not_found_polls -= 1;
            return Err(status_error("GET", path, 404));
        }
        Ok(repository(repo))
    }

    async fn list_contents(&self, repo: &RepoSlug) -> Result<Vec<ContentEntry>, GithubError> {
        self.record("list_contents", repo.to_string());
        let mut state = self.state.lock().unwrap();
        if state.empty_content_polls > 0 {
            state.empty_content_polls -= 1;
            return Ok(Vec::new());
        }
        let mut entries: Vec<ContentEntry> = state
            .files
            .keys()
            .map(|path| ContentEntry {
                name: path.rsplit('/').next().unwrap_or(path).to_string(),
                path: path.clone(),
                kind: "file".to_string(),
                sha: format!("blob-{}", path),
            })
            .collect();
        if entries.is_empty() {
            entries.push(ContentEntry {
                name: "README.md".into(),
                path: "README.md".into(),
                kind: "file".into(),
                sha: "readme".into(),
            });
        }
        Ok(entries)
    }

    async fn generate_from_template(
        &self,
        template: &RepoSlug,
        request: &GenerateRequest,
    ) -> Result<Repository, GithubError> {
        self.record(
            "generate_from_template",
            format!("{} -> {}/{}", template, request.owner, request.name),
        );
        self.state.lock().unwrap().generated = true;
        Ok(repository(&RepoSlug::new(&request.owner, &request.name)))
    }

    async fn update_repo(
        &self,
        repo: &RepoSlug,
        _settings: &RepositorySettings,
    ) -> Result<(), GithubError> {
        self.record("update_repo", repo.to_string());
        let status = self.state.lock().unwrap().update_status;
        fail_with(status, "PATCH", format!("/repos/{}", repo))
    }

    async fn protect_branch(
        &self,
        repo: &RepoSlug,
        branch: &str,
        _settings: &BranchProtectionSettings,
    ) -> Result<(), GithubError> {
        self.record("protect_branch", format!("{}@{}", repo, branch));
        let status = self.state.lock().unwrap().protect_status;
        fail_with(
            status,
            "PUT",
            format!("/repos/{}/branches/{}/protection", repo, branch),
        )
    }

    async fn get_ref(&self, repo: &RepoSlug, reference: &str) -> Result<GitRef, GithubError> {
        self.record("get_ref", format!("{}:{}", repo, reference));
        Ok(GitRef {
            name: format!("refs/{}", reference),
            object: GitObject {
                sha: BASE_COMMIT.to_string(),
                kind: "commit".to_string(),
            },
        })
    }

    async fn get_tree(
        &self,
        repo: &RepoSlug,
        sha: &str,
        _recursive: bool,
    ) -> Result<GitTree, GithubError> {
        self.record("get_tree", format!("{}:{}", repo, sha));
        let state = self.state.lock().unwrap();
        Ok(GitTree {
            sha: BASE_TREE.to_string(),
            tree: state
                .files
                .keys()
                .map(|path| TreeEntry {
                    path: path.clone(),
                    mode: "100644".to_string(),
                    kind: "blob".to_string(),
                    sha: Some(format!("blob-{}", path)),
                })
                .collect(),
            truncated: false,
        })
    }

    async fn get_blob(&self, repo: &RepoSlug, sha: &str) -> Result<GitBlob, GithubError> {
        self.record("get_blob", format!("{}:{}", repo, sha));
        let state = self.state.lock().unwrap();
        let content = state
            .files
            .iter()
            .find(|(path, _)| format!("blob-{}", path) == sha)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| status_error("GET", format!("/git/blobs/{}", sha), 404))?;
        Ok(GitBlob {
            sha: sha.to_string(),
            content: wrapped_base64(&content),
            encoding: "base64".to_string(),
        })
    }

    async fn create_blob(
        &self,
        repo: &RepoSlug,
        blob: &NewBlob,
    ) -> Result<CreatedObject, GithubError> {
        self.record("create_blob", repo.to_string());
        let decoded = STANDARD
            .decode(&blob.content)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default();
        let mut state = self.state.lock().unwrap();
        state.created_blobs.push(decoded);
        Ok(CreatedObject {
            sha: format!("new-blob-{}", state.created_blobs.len()),
        })
    }

    async fn create_tree(
        &self,
        repo: &RepoSlug,
        tree: &NewTree,
    ) -> Result<CreatedObject, GithubError> {
        self.record("create_tree", repo.to_string());
        self.state.lock().unwrap().created_trees.push(tree.clone());
        Ok(CreatedObject {
            sha: "new-tree".to_string(),
        })
    }

    async fn create_commit(
        &self,
        repo: &RepoSlug,
        commit: &NewCommit,
    ) -> Result<CreatedObject, GithubError> {
        self.record("create_commit", repo.to_string());
        self.state
            .lock()
            .unwrap()
            .created_commits
            .push(commit.clone());
        Ok(CreatedObject {
            sha: "new-commit".to_string(),
        })
    }

    async fn update_ref(
        &self,
        repo: &RepoSlug,
        reference: &str,
        update: &RefUpdate,
    ) -> Result<(), GithubError> {
        self.record("update_ref", format!("{}:{}", repo, reference));
        self.state
            .lock()
            .unwrap()
            .ref_updates
            .push((reference.to_string(), update.clone()));
        Ok(())
    }

    async fn get_public_key(&self, repo: &RepoSlug) -> Result<PublicKey, GithubError> {
        self.record("get_public_key", repo.to_string());
        Ok(PublicKey {
            key_id: "key-1".to_string(),
            key: STANDARD.encode(self.secret_key.public_key().as_bytes()),
        })
    }

    async fn put_secret(
        &self,
        repo: &RepoSlug,
        name: &str,
        secret: &EncryptedSecret,
    ) -> Result<(), GithubError> {
        self.record("put_secret", format!("{}:{}", repo, name));
        let mut state = self.state.lock().unwrap();
        if let Some(status) = state.secret_status {
            return Err(status_error(
                "PUT",
                format!("/repos/{}/actions/secrets/{}", repo, name),
                status,
            ));
        }
        state.secrets.push((name.to_string(), secret.clone()));
        Ok(())
    }
}
