//! Interactive questions asked by `rh init`.
//!
//! The flow functions talk to a [`Prompter`], so the same sequence runs
//! against the terminal ([`TerminalPrompter`]) or a scripted list of answers
//! in tests.

#[cfg(test)]
pub mod scripted;

use std::sync::LazyLock;

use anyhow::{Result, bail};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use regex::Regex;
use rh_common::{LocalPlan, ProvisioningPlan, RepoSecrets, TemplateVariant};
use thiserror::Error;

static PROJECT_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9-]*$").unwrap());
static PORTAL_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]*$").unwrap());
static ACCESS_KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]*$").unwrap());

/// The user backed out of a prompt (Esc).
#[derive(Debug, Error)]
#[error("Prompt cancelled")]
pub struct Cancelled;

/// One entry of a single-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub description: String,
    /// Shown, but cannot be picked.
    pub disabled: bool,
}

impl Choice {
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            disabled: false,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

pub type Validator<'a> = &'a dyn Fn(&str) -> Result<(), String>;

pub trait Prompter {
    /// Index of the chosen entry. Callers still check the entry is enabled.
    fn select(&mut self, message: &str, choices: &[Choice]) -> Result<usize>;

    fn input(&mut self, message: &str, validate: Validator<'_>) -> Result<String>;

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    /// Text shown before a question, such as the confirmation summary.
    fn note(&mut self, text: &str);
}

/// dialoguer on the controlling terminal.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Prompter for TerminalPrompter {
    fn select(&mut self, message: &str, choices: &[Choice]) -> Result<usize> {
        let items: Vec<String> = choices
            .iter()
            .map(|c| {
                if c.disabled {
                    format!("{} (unavailable)", c.label)
                } else {
                    format!("{} - {}", c.label, c.description)
                }
            })
            .collect();
        let default = choices.iter().position(|c| !c.disabled).unwrap_or(0);

        loop {
            let picked = Select::with_theme(&self.theme)
                .with_prompt(message)
                .items(&items)
                .default(default)
                .interact_opt()?;
            match picked {
                None => return Err(Cancelled.into()),
                Some(i) if choices[i].disabled => {
                    eprintln!("{} is not available yet", choices[i].label);
                }
                Some(i) => return Ok(i),
            }
        }
    }

    fn input(&mut self, message: &str, validate: Validator<'_>) -> Result<String> {
        let answer = Input::<String>::with_theme(&self.theme)
            .with_prompt(message)
            .validate_with(|s: &String| validate(s.as_str()))
            .interact_text()?;
        Ok(answer)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(default)
            .interact_opt()?;
        answer.ok_or_else(|| Cancelled.into())
    }

    fn note(&mut self, text: &str) {
        eprintln!("{}", text);
    }
}

/// Where `rh init` creates the new project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitTarget {
    GithubRepo,
    LocalRepo,
}

pub fn validate_project_name(input: &str) -> Result<(), String> {
    if input.is_empty() {
        return Err("Please enter a project name".to_string());
    }
    if !PROJECT_NAME_REGEX.is_match(input) {
        return Err("Please enter a valid project name in one word or with hyphens".to_string());
    }
    Ok(())
}

pub fn validate_portal_id(input: &str) -> Result<(), String> {
    if input.is_empty() {
        return Err("Please enter a HubSpot portal ID".to_string());
    }
    if !PORTAL_ID_REGEX.is_match(input) {
        return Err("Please enter a valid HubSpot portal ID (numbers only)".to_string());
    }
    Ok(())
}

pub fn validate_access_key(input: &str) -> Result<(), String> {
    if input.is_empty() {
        return Err("Please enter a HubSpot personal access key".to_string());
    }
    if !ACCESS_KEY_REGEX.is_match(input) {
        return Err(
            "Please enter a valid HubSpot personal access key (letters, numbers, - and _ only)"
                .to_string(),
        );
    }
    Ok(())
}

pub fn init_target(p: &mut dyn Prompter) -> Result<InitTarget> {
    let choices = [
        Choice::new(
            "GitHub repo based on template",
            "Create a new GitHub repo based on a GitHub hosted template",
        ),
        Choice::new(
            "Local repo based on template",
            "Create a new local repo based on a GitHub hosted template",
        ),
    ];
    Ok(match p.select("Initialize:", &choices)? {
        0 => InitTarget::GithubRepo,
        _ => InitTarget::LocalRepo,
    })
}

pub fn select_template(p: &mut dyn Prompter) -> Result<TemplateVariant> {
    let choices: Vec<Choice> = TemplateVariant::ALL
        .iter()
        .map(|t| Choice::new(t.display_name(), t.description()).disabled(!t.is_available()))
        .collect();
    let index = p.select("Choose template:", &choices)?;
    match TemplateVariant::ALL.get(index) {
        Some(t) if t.is_available() => Ok(*t),
        Some(t) => bail!("Template {} is not available", t.display_name()),
        None => bail!("No template selected"),
    }
}

/// Project identifier, lower-cased and trimmed.
pub fn project_name(p: &mut dyn Prompter) -> Result<String> {
    let raw = p.input("New project name:", &validate_project_name)?;
    validate_project_name(&raw).map_err(anyhow::Error::msg)?;
    Ok(raw.to_lowercase().trim().to_string())
}

pub fn select_owner(p: &mut dyn Prompter, owners: &[String]) -> Result<String> {
    if owners.is_empty() {
        bail!("No GitHub user/orgs found");
    }
    let choices: Vec<Choice> = owners
        .iter()
        .map(|o| Choice::new(o, "Repository owner to create the new repository"))
        .collect();
    let index = p.select("Select repo owner:", &choices)?;
    owners
        .get(index)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("No owner selected"))
}

pub fn collect_secrets(p: &mut dyn Prompter) -> Result<RepoSecrets> {
    let portal_id = p.input(&format!("{}:", RepoSecrets::PORTAL_ID_NAME), &validate_portal_id)?;
    let personal_access_key = p.input(
        &format!("{}:", RepoSecrets::ACCESS_KEY_NAME),
        &validate_access_key,
    )?;
    Ok(RepoSecrets {
        portal_id,
        personal_access_key,
    })
}

/// Questions for a hosted repository, in order: template, project name,
/// owner, visibility, secrets.
pub fn github_plan(p: &mut dyn Prompter, owners: &[String], year: i32) -> Result<ProvisioningPlan> {
    let template = select_template(p)?;
    let project = project_name(p)?;
    let owner = select_owner(p, owners)?;
    let is_private = p.confirm("Make the repository private?", false)?;
    let secrets = if p.confirm("Add secrets to the repository?", false)? {
        Some(collect_secrets(p)?)
    } else {
        None
    };
    Ok(ProvisioningPlan::new(
        owner, &project, template, year, is_private, secrets,
    ))
}

pub fn local_plan(p: &mut dyn Prompter, year: i32) -> Result<LocalPlan> {
    let template = select_template(p)?;
    let project = project_name(p)?;
    Ok(LocalPlan::new(&project, template, year))
}

pub fn remote_summary(plan: &ProvisioningPlan) -> String {
    format!(
        "You are about to create a new repository with the following settings:\n  \
         - Owner: {}\n  - Name: {}\n  - Private: {}\n  - Secrets: {}\n  \
         - Template owner: {}\n  - Template name: {}",
        plan.new_repo_owner,
        plan.new_repo_name,
        yes_no(plan.is_private),
        yes_no(plan.is_secrets),
        plan.template_repo_owner,
        plan.template_repo_name,
    )
}

pub fn local_summary(plan: &LocalPlan) -> String {
    format!(
        "You are about to create a new local repository with the following settings:\n  \
         - Folder: {}\n  - Label: {}\n  - Template owner: {}\n  - Template name: {}",
        plan.new_repo_name, plan.new_repo_label, plan.template_repo_owner, plan.template_repo_name,
    )
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Show `summary` and ask for the final go-ahead.
pub fn confirm_next_steps(p: &mut dyn Prompter, summary: &str) -> Result<bool> {
    p.note(summary);
    p.confirm("Confirm and continue?", false)
}
