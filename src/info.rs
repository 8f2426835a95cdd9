//! Text for `rh info` and the debug dump.

use std::fmt::Write as _;

use anyhow::Result;
use console::style;

use crate::config::TOKEN_VAR;
use crate::context::LocalContext;
use crate::theme::ThemeTask;
use crate::vcs::VcsStatus;

/// Commands that make sense in the current folder.
pub fn available_commands(ctx: &LocalContext) -> Vec<String> {
    let mut commands = Vec::new();
    if ctx.has_env_key(TOKEN_VAR) {
        commands.push("rh init".to_string());
    }
    if ctx.is_theme() {
        commands.extend(ThemeTask::ALL.iter().map(|t| format!("rh {}", t.name())));
    }
    commands
}

fn repository_line(git: &VcsStatus) -> String {
    if !git.is_repo {
        return "not found".to_string();
    }
    let mut line = String::from("true");
    if git.is_detached {
        let _ = write!(line, " (detached at {})", git.hash);
    } else if !git.branch.is_empty() {
        let _ = write!(line, " (branch {}", git.branch);
        if git.is_ahead {
            let _ = write!(line, ", ahead {}", git.ahead);
        }
        if git.is_behind {
            let _ = write!(line, ", behind {}", git.behind);
        }
        line.push(')');
    }
    line
}

pub fn render_info(ctx: &LocalContext) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", style("Folder name:").bold(), ctx.cwd.base);
    let _ = writeln!(
        out,
        "{} {}",
        style("Git repository:").bold(),
        repository_line(&ctx.git)
    );
    if ctx.git.is_repo {
        if !ctx.git.last_tag.is_empty() {
            let _ = writeln!(out, "  last tag: {}", ctx.git.last_tag);
        }
        if !ctx.git.staged_files.is_empty() || !ctx.git.changed_files.is_empty() {
            let _ = writeln!(
                out,
                "  staged: {}, changed: {}",
                ctx.git.staged_files.len(),
                ctx.git.changed_files.len()
            );
        }
    }
    let _ = writeln!(
        out,
        "{} {}",
        style("HubSpotCMS theme:").bold(),
        ctx.theme_name().unwrap_or("not found")
    );

    let commands = available_commands(ctx);
    if !commands.is_empty() {
        let _ = writeln!(out, "\n{}", style("Possible commands to run:").bold());
        for command in commands {
            let _ = writeln!(out, "  {}", style(command).cyan());
        }
    }
    out
}

/// Short overview, or the whole context as JSON when `verbose`.
pub fn render_debug(ctx: &LocalContext, verbose: bool) -> Result<String> {
    if verbose {
        return Ok(serde_json::to_string_pretty(ctx)?);
    }
    let version = |v: &Option<String>| v.clone().unwrap_or_else(|| "not found".to_string());
    let mut out = String::new();
    let _ = writeln!(out, "{} v{}", ctx.cli.name, ctx.cli.version);
    let _ = writeln!(out, "git: {}", version(&ctx.system.git));
    let _ = writeln!(out, "node: {}", version(&ctx.system.node));
    let _ = writeln!(out, "npm: {}", version(&ctx.system.npm));
    let _ = writeln!(out, "cwd: {}", ctx.cwd.path.display());
    let _ = writeln!(
        out,
        "git: repo={} root={} branch={} hash={} remote={}",
        ctx.git.is_repo,
        ctx.git.is_root,
        ctx.git.branch,
        ctx.git.hash,
        ctx.git.remote.as_ref().map(|r| r.href.as_str()).unwrap_or("")
    );
    let _ = writeln!(out, "theme: {}", ctx.theme_name().unwrap_or("not found"));
    let _ = writeln!(out, "env: {}", ctx.env.join(", "));
    Ok(out)
}
