//! Repository policy applied to every repository created by `rh init`.
//!
//! These are constants, not configuration. Field names follow the GitHub REST
//! request bodies so the structs serialize directly.

use serde::Serialize;

/// Owner of the template repositories.
pub const TEMPLATE_OWNER: &str = "Resultify";

/// Default branch of the templates and of generated repositories.
pub const DEFAULT_BRANCH: &str = "master";

/// JSON manifests whose identifier fields are rewritten after generation.
pub const TRACKED_MANIFESTS: [&str; 2] = ["package.json", "theme/theme.json"];

/// Body of `PATCH /repos/{owner}/{repo}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySettings {
    pub has_issues: bool,
    pub has_projects: bool,
    pub has_wiki: bool,
    pub allow_rebase_merge: bool,
    pub allow_squash_merge: bool,
    pub allow_merge_commit: bool,
    pub delete_branch_on_merge: bool,
    pub allow_update_branch: bool,
    pub squash_merge_commit_title: &'static str,
}

pub const REPOSITORY_SETTINGS: RepositorySettings = RepositorySettings {
    has_issues: true,
    has_projects: false,
    has_wiki: false,
    allow_rebase_merge: false,
    allow_squash_merge: true,
    allow_merge_commit: false,
    delete_branch_on_merge: true,
    allow_update_branch: true,
    squash_merge_commit_title: "PR_TITLE",
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredStatusChecks {
    pub strict: bool,
    pub contexts: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredReviews {
    pub dismiss_stale_reviews: bool,
    pub required_approving_review_count: u8,
    pub require_last_push_approval: bool,
}

/// Body of `PUT /repos/{owner}/{repo}/branches/{branch}/protection`.
///
/// `restrictions` is always sent, as `null`, because the endpoint requires
/// the key to be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchProtectionSettings {
    pub required_status_checks: RequiredStatusChecks,
    pub enforce_admins: bool,
    pub required_pull_request_reviews: RequiredReviews,
    pub restrictions: Option<()>,
    pub required_linear_history: bool,
    pub required_conversation_resolution: bool,
}

pub const BRANCH_PROTECTION: BranchProtectionSettings = BranchProtectionSettings {
    required_status_checks: RequiredStatusChecks {
        strict: true,
        contexts: &[
            "Node (18)",
            "Node (20)",
            "Check Commit Message",
            "Validate theme",
        ],
    },
    enforce_admins: false,
    required_pull_request_reviews: RequiredReviews {
        dismiss_stale_reviews: true,
        required_approving_review_count: 1,
        require_last_push_approval: true,
    },
    restrictions: None,
    required_linear_history: true,
    required_conversation_resolution: true,
};
