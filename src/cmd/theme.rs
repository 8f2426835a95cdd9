use anyhow::Result;
use rh::context::LocalContext;
use rh::theme::{self, ThemeTask};

/// Returns the exit code of the theme task.
pub async fn cmd_theme(task: ThemeTask, ctx: &LocalContext) -> Result<i32> {
    theme::run(task, ctx).await
}
