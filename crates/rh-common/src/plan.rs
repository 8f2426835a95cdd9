use serde::{Deserialize, Serialize};
use std::fmt;

use crate::policy::TEMPLATE_OWNER;

/// `owner/name` coordinates of a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// SSH clone URL on github.com.
    pub fn ssh_url(&self) -> String {
        format!("git@github.com:{}/{}.git", self.owner, self.name)
    }

    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Child theme templates offered by `rh init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateVariant {
    NimblyLiteChild,
    NimblyProChild,
}

impl TemplateVariant {
    pub const ALL: [TemplateVariant; 2] = [Self::NimblyLiteChild, Self::NimblyProChild];

    /// Repository name of the template under [`TEMPLATE_OWNER`].
    pub fn repo_name(self) -> &'static str {
        match self {
            Self::NimblyLiteChild => "nimbly-lite-child",
            Self::NimblyProChild => "nimbly-pro-child",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::NimblyLiteChild => "Nimbly lite child",
            Self::NimblyProChild => "Nimbly pro child",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::NimblyLiteChild => "Nimbly Light child theme template",
            Self::NimblyProChild => "Nimbly Pro child theme template",
        }
    }

    /// Unavailable variants are still listed, but cannot be picked.
    pub fn is_available(self) -> bool {
        matches!(self, Self::NimblyLiteChild)
    }

    pub fn slug(self) -> RepoSlug {
        RepoSlug::new(TEMPLATE_OWNER, self.repo_name())
    }
}

/// Secret values seeded into the new repository's Actions secrets.
#[derive(Clone, PartialEq, Eq)]
pub struct RepoSecrets {
    pub portal_id: String,
    pub personal_access_key: String,
}

impl RepoSecrets {
    pub const PORTAL_ID_NAME: &'static str = "HUBSPOT_PORTAL_ID";
    pub const ACCESS_KEY_NAME: &'static str = "HUBSPOT_PERSONAL_ACCESS_KEY";

    /// `(secret name, plaintext)` pairs in upload order.
    pub fn entries(&self) -> [(&'static str, &str); 2] {
        [
            (Self::PORTAL_ID_NAME, self.portal_id.as_str()),
            (Self::ACCESS_KEY_NAME, self.personal_access_key.as_str()),
        ]
    }
}

impl fmt::Debug for RepoSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoSecrets")
            .field("portal_id", &self.portal_id)
            .field("personal_access_key", &"<redacted>")
            .finish()
    }
}

/// Everything needed to create a hosted repository from a template.
///
/// Built once from the prompt answers and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningPlan {
    pub new_repo_owner: String,
    pub new_repo_name: String,
    pub new_repo_label: String,
    pub template_repo_owner: String,
    pub template_repo_name: String,
    pub is_private: bool,
    pub is_secrets: bool,
    pub secrets: Option<RepoSecrets>,
}

impl ProvisioningPlan {
    pub fn new(
        owner: impl Into<String>,
        project: &str,
        template: TemplateVariant,
        year: i32,
        is_private: bool,
        secrets: Option<RepoSecrets>,
    ) -> Self {
        Self {
            new_repo_owner: owner.into(),
            new_repo_name: derive_repo_name(project, template, year),
            new_repo_label: derive_repo_label(project),
            template_repo_owner: TEMPLATE_OWNER.to_string(),
            template_repo_name: template.repo_name().to_string(),
            is_private,
            is_secrets: secrets.is_some(),
            secrets,
        }
    }

    pub fn target(&self) -> RepoSlug {
        RepoSlug::new(&self.new_repo_owner, &self.new_repo_name)
    }

    pub fn template(&self) -> RepoSlug {
        RepoSlug::new(&self.template_repo_owner, &self.template_repo_name)
    }
}

/// Plan for a purely local project created from a template clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPlan {
    pub new_repo_name: String,
    pub new_repo_label: String,
    pub template_repo_owner: String,
    pub template_repo_name: String,
}

impl LocalPlan {
    pub fn new(project: &str, template: TemplateVariant, year: i32) -> Self {
        Self {
            new_repo_name: derive_repo_name(project, template, year),
            new_repo_label: derive_repo_label(project),
            template_repo_owner: TEMPLATE_OWNER.to_string(),
            template_repo_name: template.repo_name().to_string(),
        }
    }

    pub fn template(&self) -> RepoSlug {
        RepoSlug::new(&self.template_repo_owner, &self.template_repo_name)
    }
}

/// `{project}-{template}-{year}`
pub fn derive_repo_name(project: &str, template: TemplateVariant, year: i32) -> String {
    format!("{}-{}-{}", project, template.repo_name(), year)
}

pub fn derive_repo_label(project: &str) -> String {
    format!("{} theme", project)
}
