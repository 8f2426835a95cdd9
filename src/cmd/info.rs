use anyhow::Result;
use rh::context::LocalContext;
use rh::info::{render_debug, render_info};

pub fn cmd_info(ctx: &LocalContext) -> Result<()> {
    print!("{}", render_info(ctx));
    Ok(())
}

pub fn cmd_debug(ctx: &LocalContext, verbose: bool) -> Result<()> {
    eprintln!("{}", render_debug(ctx, verbose)?);
    Ok(())
}
