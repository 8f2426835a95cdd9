use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::debug;

use super::LogEntry;
use crate::errors::MaterializeError;

pub const LOG_SEPARATOR: &str = "#@sep@#";
pub const LOG_FORMAT: &str = "%s#@sep@#%an#@sep@#%h#@sep@#%aI";

/// The `git` binary, run in a fixed working directory.
#[derive(Debug, Clone)]
pub struct Git {
    dir: PathBuf,
    envs: Vec<(String, String)>,
}

impl Git {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            envs: Vec::new(),
        }
    }

    /// Extra environment for every invocation (author identity in tests).
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Same settings, another working directory.
    pub fn at(&self, dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            envs: self.envs.clone(),
        }
    }

    /// Run `git <args>` and return trimmed stdout.
    pub async fn run(&self, args: &[&str]) -> Result<String, MaterializeError> {
        debug!(dir = %self.dir.display(), ?args, "git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.dir)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(MaterializeError::Spawn)?;

        if !output.status.success() {
            return Err(MaterializeError::GitFailed {
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub async fn clone_shallow(&self, url: &str, folder: &str) -> Result<(), MaterializeError> {
        self.run(&["clone", "--depth", "1", url, folder]).await.map(drop)
    }

    pub async fn init(&self, branch: &str) -> Result<(), MaterializeError> {
        let flag = format!("--initial-branch={}", branch);
        self.run(&["init", &flag]).await.map(drop)
    }

    pub async fn add_all(&self) -> Result<(), MaterializeError> {
        self.run(&["add", "."]).await.map(drop)
    }

    pub async fn commit(&self, message: &str) -> Result<(), MaterializeError> {
        self.run(&["commit", "-m", message]).await.map(drop)
    }

    pub async fn tag(&self, name: &str) -> Result<(), MaterializeError> {
        self.run(&["tag", name]).await.map(drop)
    }

    pub async fn push(&self, remote: &str, refspec: &str) -> Result<(), MaterializeError> {
        self.run(&["push", remote, refspec]).await.map(drop)
    }

    /// `git log` in the fixed separator format; `range` like `-2` or `v1.0..HEAD`.
    pub async fn log(&self, range: &str) -> Result<Vec<LogEntry>, MaterializeError> {
        let format = format!("--pretty=format:{}", LOG_FORMAT);
        let stdout = self.run(&["log", &format, range]).await?;
        Ok(parse_log(&stdout))
    }
}

/// Parse output of `git log --pretty=format:<LOG_FORMAT>`. Lines that do not
/// have all four fields are skipped.
pub fn parse_log(stdout: &str) -> Vec<LogEntry> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut fields = line.splitn(4, LOG_SEPARATOR);
            Some(LogEntry {
                subject: fields.next()?.to_string(),
                author: fields.next()?.to_string(),
                short_hash: fields.next()?.to_string(),
                date: fields.next()?.to_string(),
            })
        })
        .collect()
}

/// Author identity for commits made in tests and fresh machines.
#[cfg(test)]
pub(crate) fn test_git(dir: &Path) -> Git {
    Git::new(dir)
        .with_env("GIT_AUTHOR_NAME", "rh test")
        .with_env("GIT_AUTHOR_EMAIL", "rh@example.com")
        .with_env("GIT_COMMITTER_NAME", "rh test")
        .with_env("GIT_COMMITTER_EMAIL", "rh@example.com")
        .with_env("GIT_CONFIG_NOSYSTEM", "1")
}

#[cfg(test)]
pub(crate) fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}
