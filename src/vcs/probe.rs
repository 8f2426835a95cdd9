use std::path::Path;

use chrono::{DateTime, FixedOffset};
use git2::{
    BranchType, DescribeFormatOptions, DescribeOptions, Oid, Repository, Status, StatusOptions,
};
use serde::Serialize;
use tracing::debug;

use super::{LogEntry, RemoteUrl};

const LOG_LIMIT: usize = 100;

/// Read-only snapshot of the repository around the working directory.
///
/// Every field falls back to false/empty when the information is not
/// available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VcsStatus {
    pub is_repo: bool,
    pub is_root: bool,
    pub has_commits: bool,
    pub is_tag_on_head: bool,
    pub has_remote: bool,
    pub is_detached: bool,
    pub is_ahead: bool,
    pub is_behind: bool,
    pub ahead: usize,
    pub behind: usize,
    pub hash: String,
    pub branch: String,
    pub upstream: String,
    pub last_tag: String,
    pub staged_files: Vec<String>,
    pub changed_files: Vec<String>,
    pub remote: Option<RemoteUrl>,
    /// Commits since `last_tag`, newest first.
    pub log: Vec<LogEntry>,
}

/// Probe the repository containing `cwd`.
pub fn probe(cwd: &Path) -> VcsStatus {
    let mut status = VcsStatus::default();
    let Ok(repo) = Repository::discover(cwd) else {
        return status;
    };
    status.is_repo = true;
    status.is_root = is_root(&repo, cwd);
    if !status.is_root {
        return status;
    }

    let head = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let Some(head) = head else {
        debug!("repository has no commits");
        return status;
    };
    status.has_commits = true;
    status.is_tag_on_head = tags_pointing_at(&repo, head.id());
    status.hash = head
        .as_object()
        .short_id()
        .ok()
        .and_then(|b| b.as_str().map(str::to_string))
        .unwrap_or_default();
    status.is_detached = repo.head_detached().unwrap_or(false);
    status.branch = if status.is_detached {
        "HEAD".to_string()
    } else {
        repo.head()
            .ok()
            .and_then(|h| h.shorthand().map(str::to_string))
            .unwrap_or_default()
    };
    status.has_remote = repo.remotes().is_ok_and(|r| !r.is_empty());
    status.remote = repo
        .find_remote("origin")
        .ok()
        .and_then(|r| r.url().and_then(RemoteUrl::parse));

    if let Some((upstream, upstream_oid)) = upstream(&repo, &status.branch) {
        status.upstream = upstream;
        if let Ok((ahead, behind)) = repo.graph_ahead_behind(head.id(), upstream_oid) {
            status.ahead = ahead;
            status.behind = behind;
            status.is_ahead = ahead > 0;
            status.is_behind = behind > 0;
        }
    }

    let (staged, changed) = file_changes(&repo);
    status.staged_files = staged;
    status.changed_files = changed;
    status.last_tag = last_tag(&repo).unwrap_or_default();
    status.log = log_since(&repo, head.id(), &status.last_tag);
    status
}

fn is_root(repo: &Repository, cwd: &Path) -> bool {
    let Some(workdir) = repo.workdir() else {
        return false;
    };
    match (workdir.canonicalize(), cwd.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn tags_pointing_at(repo: &Repository, commit: Oid) -> bool {
    let Ok(names) = repo.tag_names(None) else {
        return false;
    };
    names.iter().flatten().any(|name| {
        repo.revparse_single(&format!("refs/tags/{}", name))
            .and_then(|obj| obj.peel_to_commit())
            .is_ok_and(|c| c.id() == commit)
    })
}

fn upstream(repo: &Repository, branch: &str) -> Option<(String, Oid)> {
    let local = repo.find_branch(branch, BranchType::Local).ok()?;
    let upstream = local.upstream().ok()?;
    let name = upstream.name().ok().flatten()?.to_string();
    let oid = upstream.get().target()?;
    Some((name, oid))
}

/// `(staged, changed)` paths, like `git diff --cached --name-only` and
/// `git diff --name-only`. Untracked files are in neither list.
fn file_changes(repo: &Repository) -> (Vec<String>, Vec<String>) {
    let mut opts = StatusOptions::new();
    opts.include_untracked(false).include_ignored(false);
    let Ok(statuses) = repo.statuses(Some(&mut opts)) else {
        return (Vec::new(), Vec::new());
    };

    let staged_mask = Status::INDEX_NEW
        | Status::INDEX_MODIFIED
        | Status::INDEX_DELETED
        | Status::INDEX_RENAMED
        | Status::INDEX_TYPECHANGE;
    let changed_mask =
        Status::WT_MODIFIED | Status::WT_DELETED | Status::WT_RENAMED | Status::WT_TYPECHANGE;

    let mut staged = Vec::new();
    let mut changed = Vec::new();
    for entry in statuses.iter() {
        let Some(path) = entry.path() else { continue };
        let flags = entry.status();
        if flags.intersects(staged_mask) {
            staged.push(path.to_string());
        }
        if flags.intersects(changed_mask) {
            changed.push(path.to_string());
        }
    }
    (staged, changed)
}

/// Nearest tag reachable from HEAD, like `git describe --abbrev=0 --tags`.
fn last_tag(repo: &Repository) -> Option<String> {
    let mut opts = DescribeOptions::new();
    opts.describe_tags();
    let describe = repo.describe(&opts).ok()?;
    let mut format = DescribeFormatOptions::new();
    format.abbreviated_size(0);
    describe.format(Some(&format)).ok()
}

fn log_since(repo: &Repository, head: Oid, last_tag: &str) -> Vec<LogEntry> {
    let Ok(mut walk) = repo.revwalk() else {
        return Vec::new();
    };
    if walk.push(head).is_err() {
        return Vec::new();
    }
    if !last_tag.is_empty() {
        let tagged = repo
            .revparse_single(&format!("refs/tags/{}", last_tag))
            .and_then(|o| o.peel_to_commit());
        if let Ok(tagged) = tagged {
            let _ = walk.hide(tagged.id());
        }
    }

    walk.flatten()
        .take(LOG_LIMIT)
        .filter_map(|oid| repo.find_commit(oid).ok())
        .map(|commit| {
            let author = commit.author();
            let short_hash = commit
                .as_object()
                .short_id()
                .ok()
                .and_then(|b| b.as_str().map(str::to_string))
                .unwrap_or_default();
            LogEntry {
                subject: commit.summary().unwrap_or_default().to_string(),
                author: author.name().unwrap_or_default().to_string(),
                short_hash,
                date: iso_date(commit.author().when()),
            }
        })
        .collect()
}

fn iso_date(time: git2::Time) -> String {
    FixedOffset::east_opt(time.offset_minutes() * 60)
        .and_then(|offset| {
            DateTime::from_timestamp(time.seconds(), 0).map(|utc| utc.with_timezone(&offset))
        })
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}
