use anyhow::Result;
use rh::browsers;
use rh::context::LocalContext;

pub async fn cmd_browsers(ctx: &LocalContext) -> Result<()> {
    print!("{}", browsers::report(&ctx.cwd.path).await?);
    Ok(())
}
