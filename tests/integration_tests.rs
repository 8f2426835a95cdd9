//! Binary-level tests for rh.
//!
//! Every run gets its own HOME so the per-user env file lands in a temp
//! directory, and `GITHUB_TOKEN` is removed from the inherited environment.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

struct Sandbox {
    home: TempDir,
    work: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
            work: TempDir::new().unwrap(),
        }
    }

    fn rh(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("rh");
        cmd.current_dir(self.work.path())
            .env("HOME", self.home.path())
            .env_remove("GITHUB_TOKEN")
            .env_remove("RH_MODE")
            .env_remove("RH_LOG");
        cmd
    }
}

fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

// =============================================================================
// Argument handling
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn help_exits_zero() {
        Sandbox::new()
            .rh()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("fetchModules"));
    }

    #[test]
    fn version_prints_v_prefix() {
        Sandbox::new()
            .rh()
            .arg("--version")
            .assert()
            .success()
            .stdout(format!("v{}\n", env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn unknown_command_exits_one() {
        Sandbox::new().rh().arg("deploy").assert().code(1);
    }

    #[test]
    fn extra_arguments_exit_one() {
        Sandbox::new().rh().args(["info", "extra"]).assert().code(1);
    }
}

// =============================================================================
// info
// =============================================================================

mod info {
    use super::*;

    #[test]
    fn plain_folder() {
        if !git_available() {
            return;
        }
        let sandbox = Sandbox::new();
        sandbox
            .rh()
            .arg("info")
            .assert()
            .success()
            .stdout(predicate::str::contains("Folder name:"))
            .stdout(predicate::str::contains("HubSpotCMS theme: not found"))
            .stdout(predicate::str::contains("Possible commands").not());
    }

    #[test]
    fn default_command_is_info() {
        if !git_available() {
            return;
        }
        Sandbox::new()
            .rh()
            .assert()
            .success()
            .stdout(predicate::str::contains("Folder name:"));
    }

    #[test]
    fn theme_folder_with_token_lists_commands() {
        if !git_available() {
            return;
        }
        let sandbox = Sandbox::new();
        fs::create_dir_all(sandbox.work.path().join("theme")).unwrap();
        fs::write(
            sandbox.work.path().join("theme/theme.json"),
            r#"{"name": "acme-theme"}"#,
        )
        .unwrap();
        fs::write(sandbox.work.path().join(".env"), "GITHUB_TOKEN=ghp_test\n").unwrap();

        sandbox
            .rh()
            .arg("info")
            .assert()
            .success()
            .stdout(predicate::str::contains("HubSpotCMS theme: acme-theme"))
            .stdout(predicate::str::contains("rh init"))
            .stdout(predicate::str::contains("rh uploadDb"));
    }

    #[test]
    fn creates_the_per_user_env_file() {
        if !git_available() {
            return;
        }
        let sandbox = Sandbox::new();
        sandbox.rh().arg("info").assert().success();
        let env_file = sandbox.home.path().join(".rh/.env.root");
        assert!(env_file.exists());
        assert!(
            fs::read_to_string(env_file)
                .unwrap()
                .contains("GITHUB_TOKEN")
        );
    }

    #[test]
    fn debug_mode_replaces_default_info() {
        if !git_available() {
            return;
        }
        Sandbox::new()
            .rh()
            .args(["--debug", "--verbose"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Folder name:").not())
            .stderr(predicate::str::contains("\"cwd\""));
    }
}

// =============================================================================
// Theme commands
// =============================================================================

mod theme_commands {
    use super::*;

    #[test]
    fn outside_a_theme_fails() {
        if !git_available() {
            return;
        }
        Sandbox::new()
            .rh()
            .arg("build")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("not a HubSpot CMS theme"));
    }

    #[test]
    fn every_theme_command_checks_the_folder() {
        if !git_available() {
            return;
        }
        let sandbox = Sandbox::new();
        for name in [
            "upload",
            "cleanUpload",
            "fetch",
            "fetchModules",
            "build",
            "watch",
            "validate",
            "lighthouse",
            "fields",
            "fetchDb",
            "uploadDb",
        ] {
            sandbox
                .rh()
                .arg(name)
                .assert()
                .code(1)
                .stderr(predicate::str::contains("not a HubSpot CMS theme"));
        }
    }

    #[test]
    fn incompatible_theme_fails() {
        if !git_available() {
            return;
        }
        let sandbox = Sandbox::new();
        fs::write(
            sandbox.work.path().join("package.json"),
            r#"{"name": "old", "devDependencies": {"@resultify/hubspot-cms-lib": "^1.0.0"}}"#,
        )
        .unwrap();
        sandbox
            .rh()
            .arg("upload")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("not compatible"));
    }
}

// =============================================================================
// browsers
// =============================================================================

mod browsers {
    use super::*;

    #[test]
    fn folder_without_browserslistrc() {
        if !git_available() {
            return;
        }
        let sandbox = Sandbox::new();
        sandbox
            .rh()
            .arg("browsers")
            .assert()
            .success()
            .stdout(predicate::str::contains("No .browserslistrc found in"));
    }
}
