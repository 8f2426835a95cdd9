//! Theme commands. Each one is a task of the npm theme library; rh checks
//! the folder and hands over to `node`.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::debug;

use crate::context::LocalContext;
use crate::errors::PreflightError;
use crate::manifest::THEME_LIB_PACKAGE;
use crate::preflight::{check_compatibility, require_binary, require_theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeTask {
    Build,
    Watch,
    Fetch,
    FetchModules,
    Upload,
    CleanUpload,
    Validate,
    Lighthouse,
    Fields,
    FetchDb,
    UploadDb,
}

impl ThemeTask {
    pub const ALL: [ThemeTask; 11] = [
        Self::Upload,
        Self::Fetch,
        Self::FetchModules,
        Self::Build,
        Self::Watch,
        Self::Validate,
        Self::Fields,
        Self::FetchDb,
        Self::UploadDb,
        Self::Lighthouse,
        Self::CleanUpload,
    ];

    /// Command name, which is also the library's entry point.
    pub fn name(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Watch => "watch",
            Self::Fetch => "fetch",
            Self::FetchModules => "fetchModules",
            Self::Upload => "upload",
            Self::CleanUpload => "cleanUpload",
            Self::Validate => "validate",
            Self::Lighthouse => "lighthouse",
            Self::Fields => "fields",
            Self::FetchDb => "fetchDb",
            Self::UploadDb => "uploadDb",
        }
    }

    /// `fetchDb` is how older themes get their data out, so it runs on any
    /// theme version.
    pub fn checks_compatibility(self) -> bool {
        self != Self::FetchDb
    }

    pub fn module(self) -> String {
        format!("{}/{}", THEME_LIB_PACKAGE, self.name())
    }

    /// ES module source passed to `node -e`.
    pub fn script(self) -> String {
        format!("await import('{}')", self.module())
    }
}

pub fn check(task: ThemeTask, ctx: &LocalContext) -> Result<(), PreflightError> {
    require_theme(ctx)?;
    if task.checks_compatibility() {
        check_compatibility(ctx.package.as_ref())?;
    }
    Ok(())
}

/// Run `task` in the theme folder and return node's exit code.
pub async fn run(task: ThemeTask, ctx: &LocalContext) -> Result<i32> {
    check(task, ctx)?;
    require_binary("node")?;

    debug!(task = task.name(), cwd = %ctx.cwd.path.display(), "delegating to node");
    let script = task.script();
    let status = Command::new("node")
        .args(["--input-type=module", "-e", script.as_str()])
        .current_dir(&ctx.cwd.path)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .with_context(|| format!("Failed to run node for {}", task.name()))?;
    Ok(status.code().unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::context::SystemInfo;
    use std::path::Path;
    use tempfile::tempdir;

    fn context(dir: &Path) -> LocalContext {
        LocalContext::with_system(dir, &Settings::default(), SystemInfo::default())
    }

    #[test]
    fn script_imports_the_library_entry_point() {
        assert_eq!(
            ThemeTask::FetchModules.script(),
            "await import('@resultify/hubspot-cms-lib/fetchModules')"
        );
        let names: Vec<&str> = ThemeTask::ALL.iter().map(|t| t.name()).collect();
        assert!(names.contains(&"cleanUpload"));
        assert_eq!(names.len(), 11);
    }

    #[test]
    fn empty_folder_is_not_a_theme() {
        let dir = tempdir().unwrap();
        let err = check(ThemeTask::Build, &context(dir.path())).unwrap_err();
        assert!(matches!(err, PreflightError::NotATheme));
    }

    #[test]
    fn fetch_db_skips_the_compatibility_check() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), r#"{"name":"old-theme"}"#).unwrap();
        let ctx = context(dir.path());

        assert!(check(ThemeTask::FetchDb, &ctx).is_ok());
        assert!(matches!(
            check(ThemeTask::UploadDb, &ctx),
            Err(PreflightError::IncompatibleTheme { .. })
        ));
    }

    #[test]
    fn compatible_theme_passes_every_check() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"name":"site","cmslib":{"theme":"theme"},"devDependencies":{"@resultify/hubspot-cms-lib":"^4.3.0"}}"#,
        )
        .unwrap();
        let ctx = context(dir.path());
        for task in ThemeTask::ALL {
            assert!(check(task, &ctx).is_ok(), "{}", task.name());
        }
    }
}
