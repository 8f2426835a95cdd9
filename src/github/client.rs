use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use rh_common::{BranchProtectionSettings, RepoSlug, RepositorySettings};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::GithubApi;
use super::types::{
    AuthenticatedUser, ContentEntry, CreatedObject, EncryptedSecret, GenerateRequest, GitBlob,
    GitRef, GitTree, NewBlob, NewCommit, NewTree, Organization, PublicKey, RefUpdate, Repository,
    TokenInfo,
};
use crate::config::GithubCredential;
use crate::errors::GithubError;

pub const GITHUB_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("rh-cli/", env!("CARGO_PKG_VERSION"));

/// Error body returned by the REST API on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Map a non-2xx response to [`GithubError::Status`]. The message is the
/// API's `message` field, or the status reason when the body is not JSON.
fn status_error(method: &Method, path: &str, status: StatusCode, body: &str) -> GithubError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
    GithubError::Status {
        method: method.to_string(),
        path: path.to_string(),
        status: status.as_u16(),
        message,
    }
}

/// `reqwest` backed implementation of [`GithubApi`].
///
/// Every request carries the bearer token it was built with.
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    credential: GithubCredential,
}

impl GithubClient {
    pub fn new(credential: GithubCredential) -> Result<Self, GithubError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(API_VERSION),
        );

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|source| GithubError::Transport {
                path: String::new(),
                source,
            })?;

        Ok(Self {
            http,
            base_url: GITHUB_API_URL.to_string(),
            credential,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(self.credential.expose())
    }

    /// Send the request and turn any non-2xx status into [`GithubError::Status`].
    async fn send(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response, GithubError> {
        debug!(%method, path, "github request");
        let response = build(self.request(method.clone(), path))
            .send()
            .await
            .map_err(|source| GithubError::Transport {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = status_error(&method, path, status, &body);
        debug!(error = %err, "github request failed");
        Err(err)
    }

    async fn json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<T, GithubError> {
        self.send(method, path, build)
            .await?
            .json::<T>()
            .await
            .map_err(|source| GithubError::Decode {
                path: path.to_string(),
                source,
            })
    }
}

#[async_trait]
impl GithubApi for GithubClient {
    async fn authenticated_user(&self) -> Result<TokenInfo, GithubError> {
        let path = "/user";
        let response = self.send(Method::GET, path, |r| r).await?;
        let scopes = response
            .headers()
            .get("x-oauth-scopes")
            .and_then(|v| v.to_str().ok())
            .map(parse_scopes);
        let user: AuthenticatedUser =
            response
                .json()
                .await
                .map_err(|source| GithubError::Decode {
                    path: path.to_string(),
                    source,
                })?;
        Ok(TokenInfo {
            login: user.login,
            scopes,
        })
    }

    async fn list_orgs(&self) -> Result<Vec<Organization>, GithubError> {
        self.json(Method::GET, "/user/orgs", |r| r.query(&[("per_page", "100")]))
            .await
    }

    async fn get_repo(&self, repo: &RepoSlug) -> Result<Repository, GithubError> {
        let path = format!("/repos/{}", repo);
        self.json(Method::GET, &path, |r| r).await
    }

    async fn list_contents(&self, repo: &RepoSlug) -> Result<Vec<ContentEntry>, GithubError> {
        let path = format!("/repos/{}/contents", repo);
        self.json(Method::GET, &path, |r| r).await
    }

    async fn generate_from_template(
        &self,
        template: &RepoSlug,
        request: &GenerateRequest,
    ) -> Result<Repository, GithubError> {
        let path = format!("/repos/{}/generate", template);
        self.json(Method::POST, &path, |r| r.json(request)).await
    }

    async fn update_repo(
        &self,
        repo: &RepoSlug,
        settings: &RepositorySettings,
    ) -> Result<(), GithubError> {
        let path = format!("/repos/{}", repo);
        self.send(Method::PATCH, &path, |r| r.json(settings))
            .await
            .map(drop)
    }

    async fn protect_branch(
        &self,
        repo: &RepoSlug,
        branch: &str,
        settings: &BranchProtectionSettings,
    ) -> Result<(), GithubError> {
        let path = format!("/repos/{}/branches/{}/protection", repo, branch);
        self.send(Method::PUT, &path, |r| r.json(settings))
            .await
            .map(drop)
    }

    async fn get_ref(&self, repo: &RepoSlug, reference: &str) -> Result<GitRef, GithubError> {
        let path = format!("/repos/{}/git/ref/{}", repo, reference);
        self.json(Method::GET, &path, |r| r).await
    }

    async fn get_tree(
        &self,
        repo: &RepoSlug,
        sha: &str,
        recursive: bool,
    ) -> Result<GitTree, GithubError> {
        let path = format!("/repos/{}/git/trees/{}", repo, sha);
        self.json(Method::GET, &path, |r| {
            if recursive {
                r.query(&[("recursive", "true")])
            } else {
                r
            }
        })
        .await
    }

    async fn get_blob(&self, repo: &RepoSlug, sha: &str) -> Result<GitBlob, GithubError> {
        let path = format!("/repos/{}/git/blobs/{}", repo, sha);
        self.json(Method::GET, &path, |r| r).await
    }

    async fn create_blob(
        &self,
        repo: &RepoSlug,
        blob: &NewBlob,
    ) -> Result<CreatedObject, GithubError> {
        let path = format!("/repos/{}/git/blobs", repo);
        self.json(Method::POST, &path, |r| r.json(blob)).await
    }

    async fn create_tree(
        &self,
        repo: &RepoSlug,
        tree: &NewTree,
    ) -> Result<CreatedObject, GithubError> {
        let path = format!("/repos/{}/git/trees", repo);
        self.json(Method::POST, &path, |r| r.json(tree)).await
    }

    async fn create_commit(
        &self,
        repo: &RepoSlug,
        commit: &NewCommit,
    ) -> Result<CreatedObject, GithubError> {
        let path = format!("/repos/{}/git/commits", repo);
        self.json(Method::POST, &path, |r| r.json(commit)).await
    }

    async fn update_ref(
        &self,
        repo: &RepoSlug,
        reference: &str,
        update: &RefUpdate,
    ) -> Result<(), GithubError> {
        let path = format!("/repos/{}/git/refs/{}", repo, reference);
        self.send(Method::PATCH, &path, |r| r.json(update))
            .await
            .map(drop)
    }

    async fn get_public_key(&self, repo: &RepoSlug) -> Result<PublicKey, GithubError> {
        let path = format!("/repos/{}/actions/secrets/public-key", repo);
        self.json(Method::GET, &path, |r| r).await
    }

    async fn put_secret(
        &self,
        repo: &RepoSlug,
        name: &str,
        secret: &EncryptedSecret,
    ) -> Result<(), GithubError> {
        let path = format!("/repos/{}/actions/secrets/{}", repo, name);
        self.send(Method::PUT, &path, |r| r.json(secret))
            .await
            .map(drop)
    }
}

/// Split the comma separated `x-oauth-scopes` header.
fn parse_scopes(header: &str) -> Vec<String> {
    header
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
