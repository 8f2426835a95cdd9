//! Bounded polling for asynchronous repository generation.

use std::future::Future;
use std::time::Duration;

use rh_common::RepoSlug;
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::errors::{GithubError, ProvisionError};
use crate::github::GithubApi;

pub const POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const POLL_CEILING: Duration = Duration::from_secs(20);

/// Result of one polling attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Ready(T),
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub ceiling: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            ceiling: POLL_CEILING,
        }
    }
}

impl PollPolicy {
    /// Upper bound on attempts a single loop can make.
    pub fn max_attempts(&self) -> u32 {
        let interval = self.interval.as_millis().max(1);
        self.ceiling.as_millis().div_ceil(interval) as u32 + 1
    }
}

/// Call `probe` until it is ready.
///
/// A 404 or [`Probe::Pending`] waits one interval and tries again; any other
/// error is returned at once. The elapsed time is checked after each wait,
/// and past the ceiling the loop gives up with [`ProvisionError::Timeout`].
pub async fn poll_until<T, F, Fut>(
    what: &'static str,
    policy: PollPolicy,
    mut probe: F,
) -> Result<T, ProvisionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Probe<T>, GithubError>>,
{
    let started = Instant::now();
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match probe().await {
            Ok(Probe::Ready(value)) => {
                debug!(what, attempt, "ready");
                return Ok(value);
            }
            Ok(Probe::Pending) => debug!(what, attempt, "still empty"),
            Err(err) if err.is_not_found() => debug!(what, attempt, "not found yet"),
            Err(err) => return Err(err.into()),
        }

        sleep(policy.interval).await;
        if started.elapsed() > policy.ceiling {
            return Err(ProvisionError::Timeout {
                what,
                waited: policy.ceiling,
            });
        }
    }
}

/// Wait until `GET /repos/{owner}/{repo}` stops answering 404.
pub async fn wait_for_repo(
    api: &dyn GithubApi,
    repo: &RepoSlug,
    policy: PollPolicy,
) -> Result<(), ProvisionError> {
    poll_until("repository creation", policy, || async move {
        api.get_repo(repo).await.map(|_| Probe::Ready(()))
    })
    .await
}

/// Wait until the repository lists at least one file.
pub async fn wait_for_content(
    api: &dyn GithubApi,
    repo: &RepoSlug,
    policy: PollPolicy,
) -> Result<(), ProvisionError> {
    poll_until("repository to be populated", policy, || async move {
        let entries = api.list_contents(repo).await?;
        Ok(if entries.is_empty() {
            Probe::Pending
        } else {
            Probe::Ready(())
        })
    })
    .await
}
