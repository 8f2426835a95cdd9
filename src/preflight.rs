//! Environment checks that gate a command.

use std::ffi::OsStr;
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::context::LocalContext;
use crate::errors::PreflightError;
use crate::manifest::PackageSummary;

/// Major version of the theme library this CLI drives.
pub const THEME_LIB_MAJOR: u64 = 4;

pub const SSH_HOST: &str = "git@github.com";
const ONLINE_PROBES: [(&str, u16); 2] = [("api.github.com", 443), ("github.com", 443)];
const ONLINE_TIMEOUT: Duration = Duration::from_secs(5);

static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)(?:\.\d+)*").unwrap());

/// True when `program --version` runs and exits successfully.
pub fn command_exists<S: AsRef<OsStr>>(program: S) -> bool {
    Command::new(program)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .arg("--version")
        .output()
        .map(|x| x.status.success())
        .unwrap_or_default()
}

pub fn require_binary(program: &str) -> Result<(), PreflightError> {
    if command_exists(program) {
        Ok(())
    } else {
        Err(PreflightError::MissingBinary(program.to_string()))
    }
}

/// First line of `program --version`, if it runs.
pub fn binary_version(program: &str) -> Option<String> {
    let output = Command::new(program)
        .arg("--version")
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
}

/// Network checks, behind a trait so init flows can be tested offline.
#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn online(&self) -> bool;

    /// `ssh -T` to `host` succeeds with key authentication.
    async fn ssh(&self, host: &str) -> Result<(), PreflightError>;
}

pub struct Network;

#[async_trait]
impl Connectivity for Network {
    async fn online(&self) -> bool {
        for (host, port) in ONLINE_PROBES {
            match timeout(ONLINE_TIMEOUT, TcpStream::connect((host, port))).await {
                Ok(Ok(_)) => return true,
                Ok(Err(e)) => debug!(host, error = %e, "connection failed"),
                Err(_) => debug!(host, "connection timed out"),
            }
        }
        false
    }

    async fn ssh(&self, host: &str) -> Result<(), PreflightError> {
        let output = tokio::process::Command::new("ssh")
            .args(["-T", "-o", "ConnectTimeout=5", "-o", "BatchMode=yes", host])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|_| PreflightError::MissingBinary("ssh".to_string()))?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if ssh_authenticated(output.status.success(), &stderr) {
            Ok(())
        } else {
            debug!(host, %stderr, "ssh check failed");
            Err(PreflightError::SshUnavailable {
                host: host.to_string(),
            })
        }
    }
}

/// GitHub closes `ssh -T` with status 1 even when the key is accepted.
fn ssh_authenticated(success: bool, stderr: &str) -> bool {
    success || stderr.contains("successfully authenticated")
}

pub async fn require_online(net: &dyn Connectivity) -> Result<(), PreflightError> {
    if net.online().await {
        Ok(())
    } else {
        Err(PreflightError::Offline)
    }
}

/// Local materialization must start outside any repository.
pub fn require_not_repository(ctx: &LocalContext) -> Result<(), PreflightError> {
    if ctx.git.is_repo {
        return Err(PreflightError::AlreadyRepository {
            path: ctx.cwd.path.clone(),
        });
    }
    Ok(())
}

pub fn require_theme(ctx: &LocalContext) -> Result<(), PreflightError> {
    if ctx.is_theme() {
        Ok(())
    } else {
        Err(PreflightError::NotATheme)
    }
}

/// Major version from a range like `^4.2.0` or `~4`.
pub fn coerce_major(range: &str) -> Option<u64> {
    VERSION_REGEX
        .captures(range)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// The theme must declare a `cmslib` section and depend on the theme
/// library with the same major version as [`THEME_LIB_MAJOR`].
pub fn check_compatibility(package: Option<&PackageSummary>) -> Result<(), PreflightError> {
    let incompatible = |reason: &str| PreflightError::IncompatibleTheme {
        reason: reason.to_string(),
    };
    let package = package.ok_or_else(|| incompatible("package.json not found"))?;
    if package.cmslib.is_none() {
        return Err(incompatible("package.json has no cmslib section"));
    }
    let range = package
        .theme_lib
        .as_deref()
        .ok_or_else(|| incompatible("theme library dependency not found"))?;
    match coerce_major(range) {
        Some(major) if major != THEME_LIB_MAJOR => Err(PreflightError::IncompatibleTheme {
            reason: format!(
                "theme uses version {} of the theme library, this CLI supports {}.x",
                range, THEME_LIB_MAJOR
            ),
        }),
        _ => Ok(()),
    }
}
