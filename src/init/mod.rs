//! `rh init`: create a new theme project from a template.
//!
//! Two targets are offered. A hosted repository is generated and configured
//! on GitHub through [`Provisioner`]; a local repository is cloned and
//! re-initialised by [`Materializer`]. Both ask their questions, print a
//! summary and only act after an explicit confirmation.

use anyhow::Result;
use chrono::Datelike;
use console::style;
use tracing::info;

use crate::config::Settings;
use crate::context::LocalContext;
use crate::errors::Outcome;
use crate::github::auth::{list_owners, verify_token};
use crate::github::{GithubApi, GithubClient};
use crate::materialize::Materializer;
use crate::preflight::{Connectivity, SSH_HOST, require_not_repository, require_online};
use crate::prompts::{self, Cancelled, InitTarget, Prompter};
use crate::provision::{PollPolicy, Provisioner};
use crate::ui::Step;
use crate::ui::icons::{ARROW, SPARKLE};
use crate::ui::progress::print_line;

pub struct InitFlow<'a> {
    prompter: &'a mut dyn Prompter,
    net: &'a dyn Connectivity,
    year: i32,
    poll: PollPolicy,
}

impl<'a> InitFlow<'a> {
    pub fn new(prompter: &'a mut dyn Prompter, net: &'a dyn Connectivity) -> Self {
        Self {
            prompter,
            net,
            year: chrono::Local::now().year(),
            poll: PollPolicy::default(),
        }
    }

    /// Year used in new repository names.
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Ask for the target and run its flow. Backing out of a prompt counts as
    /// declining.
    pub async fn run(
        &mut self,
        ctx: &LocalContext,
        settings: &Settings,
        materializer: &Materializer,
    ) -> Result<Outcome> {
        let result = match prompts::init_target(self.prompter) {
            Ok(InitTarget::GithubRepo) => self.github(settings).await,
            Ok(InitTarget::LocalRepo) => self.local(ctx, materializer).await,
            Err(e) => Err(e),
        };
        declined_on_cancel(result)
    }

    async fn github(&mut self, settings: &Settings) -> Result<Outcome> {
        let credential = settings.require_credential()?.clone();
        Step::run("Check internet connection", require_online(self.net)).await?;
        let client = GithubClient::new(credential)?;
        self.remote(&client).await
    }

    /// Hosted flow against an already constructed API client.
    pub async fn remote(&mut self, api: &dyn GithubApi) -> Result<Outcome> {
        let login = Step::run("Check GitHub token", verify_token(api)).await?;
        let owners = list_owners(api, &login).await?;

        let plan = prompts::github_plan(self.prompter, &owners, self.year)?;
        if !prompts::confirm_next_steps(self.prompter, &prompts::remote_summary(&plan))? {
            info!("init declined");
            return Ok(Outcome::Declined);
        }

        let outcome = Provisioner::new(api)
            .with_poll_policy(self.poll)
            .provision(&plan)
            .await?;
        if outcome == Outcome::Completed {
            print_line(format!(
                "{}New repository: {}",
                SPARKLE,
                style(plan.target().html_url()).cyan()
            ));
        }
        Ok(outcome)
    }

    pub async fn local(
        &mut self,
        ctx: &LocalContext,
        materializer: &Materializer,
    ) -> Result<Outcome> {
        require_not_repository(ctx)?;
        Step::run("Check internet connection", require_online(self.net)).await?;
        Step::run("Check ssh connection", self.net.ssh(SSH_HOST)).await?;

        let plan = prompts::local_plan(self.prompter, self.year)?;
        if !prompts::confirm_next_steps(self.prompter, &prompts::local_summary(&plan))? {
            info!("init declined");
            return Ok(Outcome::Declined);
        }

        let done = materializer.materialize(&plan).await?;
        print_line(format!(
            "{}New local repository: {}",
            SPARKLE,
            style(done.folder.display()).cyan()
        ));
        for entry in &done.log {
            print_line(format!("  {}{} {}", ARROW, entry.short_hash, entry.subject));
        }
        Ok(Outcome::Completed)
    }
}

fn declined_on_cancel(result: Result<Outcome>) -> Result<Outcome> {
    match result {
        Err(e) if e.downcast_ref::<Cancelled>().is_some() => Ok(Outcome::Declined),
        other => other,
    }
}
