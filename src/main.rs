use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use rh::config::{EnvLayers, LOG_VAR, Settings, ensure_root_env_file};
use rh::context::LocalContext;
use rh::preflight::require_binary;
use rh::theme::ThemeTask;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "rh")]
#[command(about = "Development front-end for HubSpot CMS theme projects")]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Print the local context before running the command
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// More log output; with --debug, dump the full context as JSON
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Print version
    #[arg(short = 'V', long)]
    pub version: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show information about the current folder
    Info,
    /// Create a new theme project from a template
    Init,
    /// Show supported browsers and audience coverage
    Browsers,
    /// Upload theme files to HubSpot
    Upload,
    /// Clean the remote theme folder and upload
    #[command(name = "cleanUpload")]
    CleanUpload,
    /// Fetch theme files from HubSpot
    Fetch,
    /// Fetch modules from HubSpot
    #[command(name = "fetchModules")]
    FetchModules,
    /// Build the theme
    Build,
    /// Build and watch for changes
    Watch,
    /// Validate the theme
    Validate,
    /// Run lighthouse against the theme
    Lighthouse,
    /// Compile fields.js to fields.json
    Fields,
    /// Fetch HubDB tables from HubSpot
    #[command(name = "fetchDb")]
    FetchDb,
    /// Upload HubDB tables to HubSpot
    #[command(name = "uploadDb")]
    UploadDb,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_VAR)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "rh=debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn load_settings(cli: &Cli) -> Result<(PathBuf, Settings)> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let home = dirs::home_dir();
    if let Some(home) = &home {
        if let Err(e) = ensure_root_env_file(home) {
            warn!(error = %e, "could not create the per-user env file");
        }
    }
    let layers = EnvLayers::load(home.as_deref(), &cwd)?;
    Ok((cwd, Settings::resolve(&layers, cli.debug, cli.verbose)))
}

async fn run(cli: &Cli, cwd: &Path, settings: &Settings) -> Result<u8> {
    require_binary("git")?;
    let ctx = LocalContext::collect(cwd, settings);
    debug!(cwd = %cwd.display(), command = ?cli.command, "starting");

    if settings.debug {
        cmd::cmd_debug(&ctx, settings.verbose)?;
    }

    let Some(command) = &cli.command else {
        if !settings.debug {
            cmd::cmd_info(&ctx)?;
        }
        return Ok(0);
    };

    let task = match command {
        Commands::Info => return cmd::cmd_info(&ctx).map(|_| 0),
        Commands::Init => return cmd::cmd_init(&ctx, settings).await.map(|_| 0),
        Commands::Browsers => return cmd::cmd_browsers(&ctx).await.map(|_| 0),
        Commands::Upload => ThemeTask::Upload,
        Commands::CleanUpload => ThemeTask::CleanUpload,
        Commands::Fetch => ThemeTask::Fetch,
        Commands::FetchModules => ThemeTask::FetchModules,
        Commands::Build => ThemeTask::Build,
        Commands::Watch => ThemeTask::Watch,
        Commands::Validate => ThemeTask::Validate,
        Commands::Lighthouse => ThemeTask::Lighthouse,
        Commands::Fields => ThemeTask::Fields,
        Commands::FetchDb => ThemeTask::FetchDb,
        Commands::UploadDb => ThemeTask::UploadDb,
    };
    let code = cmd::cmd_theme(task, &ctx).await?;
    Ok(u8::try_from(code).unwrap_or(1))
}

fn report(e: anyhow::Error, debug_mode: bool) -> ExitCode {
    eprintln!("{} {}", style("Error:").bold().red(), e);
    if debug_mode {
        eprintln!("{:?}", e);
    }
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };
    if cli.version {
        println!("v{}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }
    init_tracing(cli.verbose);

    let (cwd, settings) = match load_settings(&cli) {
        Ok(loaded) => loaded,
        Err(e) => return report(e, cli.debug),
    };
    match run(&cli, &cwd, &settings).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => report(e, settings.debug),
    }
}
