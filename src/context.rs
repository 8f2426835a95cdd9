//! Snapshot of everything rh knows about the current directory.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Settings;
use crate::manifest::{self, PackageSummary, ThemeSummary};
use crate::preflight::binary_version;
use crate::vcs::{self, VcsStatus};

#[derive(Debug, Clone, Serialize)]
pub struct CliInfo {
    pub name: String,
    pub version: String,
}

/// Tool versions; `None` when the binary is not installed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SystemInfo {
    pub git: Option<String>,
    pub node: Option<String>,
    pub npm: Option<String>,
}

impl SystemInfo {
    pub fn detect() -> Self {
        Self {
            git: binary_version("git"),
            node: binary_version("node"),
            npm: binary_version("npm"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CwdInfo {
    pub path: PathBuf,
    /// Parent directory.
    pub dir: PathBuf,
    /// Folder name.
    pub base: String,
}

impl CwdInfo {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            base: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LocalContext {
    pub cli: CliInfo,
    pub system: SystemInfo,
    pub cwd: CwdInfo,
    pub git: VcsStatus,
    pub package: Option<PackageSummary>,
    pub theme: Option<ThemeSummary>,
    /// Keys defined by the dotenv files, never their values.
    pub env: Vec<String>,
}

impl LocalContext {
    pub fn collect(cwd: &Path, settings: &Settings) -> Self {
        Self::with_system(cwd, settings, SystemInfo::detect())
    }

    pub fn with_system(cwd: &Path, settings: &Settings, system: SystemInfo) -> Self {
        Self {
            cli: CliInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            system,
            cwd: CwdInfo::new(cwd),
            git: vcs::probe(cwd),
            package: manifest::read_package(cwd),
            theme: manifest::read_theme(cwd),
            env: settings.env_keys.clone(),
        }
    }

    /// A theme folder has at least one of the two manifests.
    pub fn is_theme(&self) -> bool {
        self.package.is_some() || self.theme.is_some()
    }

    pub fn theme_name(&self) -> Option<&str> {
        self.theme.as_ref().and_then(|t| t.name.as_deref())
    }

    pub fn has_env_key(&self, key: &str) -> bool {
        self.env.iter().any(|k| k == key)
    }
}
