use anyhow::Result;
use rh::config::Settings;
use rh::context::LocalContext;
use rh::errors::Outcome;
use rh::init::InitFlow;
use rh::materialize::Materializer;
use rh::preflight::Network;
use rh::prompts::TerminalPrompter;
use rh::vcs::Git;

pub async fn cmd_init(ctx: &LocalContext, settings: &Settings) -> Result<()> {
    let mut prompter = TerminalPrompter::default();
    let materializer = Materializer::new(Git::new(&ctx.cwd.path));

    let outcome = InitFlow::new(&mut prompter, &Network)
        .run(ctx, settings, &materializer)
        .await?;

    if outcome == Outcome::Declined {
        eprintln!("Nothing was created.");
    }
    Ok(())
}
