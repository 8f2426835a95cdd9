//! Token verification and owner discovery.

use anyhow::Result;
use tracing::debug;

use super::GithubApi;
use crate::errors::{GithubError, PreflightError};

/// Scope a classic personal access token needs for `rh init`.
pub const REQUIRED_SCOPE: &str = "repo";

/// Check the token against `GET /user` and return the login it belongs to.
///
/// Any rejection by the API, or a token without the `repo` scope, is a
/// terminal [`PreflightError::InvalidToken`]. Transport failures propagate
/// unchanged so they are not mistaken for a bad token.
pub async fn verify_token(api: &dyn GithubApi) -> Result<String> {
    let info = match api.authenticated_user().await {
        Ok(info) => info,
        Err(err @ GithubError::Status { .. }) => {
            debug!(error = %err, "token rejected");
            return Err(PreflightError::InvalidToken.into());
        }
        Err(err) => return Err(err.into()),
    };

    if !info.has_scope(REQUIRED_SCOPE) {
        debug!(login = %info.login, scopes = ?info.scopes, "token lacks repo scope");
        return Err(PreflightError::InvalidToken.into());
    }
    Ok(info.login)
}

/// Organisations the user belongs to, followed by the user's own login.
pub async fn list_owners(api: &dyn GithubApi, login: &str) -> Result<Vec<String>, GithubError> {
    let mut owners: Vec<String> = api
        .list_orgs()
        .await?
        .into_iter()
        .map(|org| org.login)
        .collect();
    owners.push(login.to_string());
    Ok(owners)
}
