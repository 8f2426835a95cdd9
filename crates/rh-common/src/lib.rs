//! Shared domain types for the `rh` CLI.
//!
//! Nothing in this crate performs I/O. The root crate builds plans from
//! prompt answers and hands them, together with the policy constants, to the
//! provisioning and materialization code.

pub mod plan;
pub mod policy;

pub use plan::{LocalPlan, ProvisioningPlan, RepoSecrets, RepoSlug, TemplateVariant};
pub use policy::{
    BRANCH_PROTECTION, BranchProtectionSettings, DEFAULT_BRANCH, REPOSITORY_SETTINGS,
    RepositorySettings, RequiredReviews, RequiredStatusChecks, TEMPLATE_OWNER,
    TRACKED_MANIFESTS,
};
