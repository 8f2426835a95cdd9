//! Environment layering and runtime settings.
//!
//! Values come from three layers, later ones winning: the process
//! environment, the per-user `~/.rh/.env.root` and the project-local `.env`.
//! The files are parsed with `dotenvy` into a map; the process environment
//! itself is never modified.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::errors::PreflightError;

pub const ROOT_ENV_DIR: &str = ".rh";
pub const ROOT_ENV_FILE: &str = ".env.root";
pub const PROJECT_ENV_FILE: &str = ".env";

pub const TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const MODE_VAR: &str = "RH_MODE";
pub const LOG_VAR: &str = "RH_LOG";

const ROOT_ENV_TEMPLATE: &str = "\
# Define a name of your HubSpot portal prefixed by hub_ and add the associated personal access key to it.
# hub_sandbox=personal-access-key-for-this-sandbox
# ...
# Add a GitHub (classic) Personal Access Token to work with some functions of the \"rh\" CLI
# Only full repo scope is required
# GITHUB_TOKEN=your-classic-personal-access-token
";

/// Bearer token for the GitHub API. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct GithubCredential(String);

impl GithubCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for GithubCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GithubCredential(***)")
    }
}

/// Path of the per-user dotenv file under `home`.
pub fn root_env_path(home: &Path) -> PathBuf {
    home.join(ROOT_ENV_DIR).join(ROOT_ENV_FILE)
}

/// Create `~/.rh/.env.root` with a commented template if it does not exist.
pub fn ensure_root_env_file(home: &Path) -> Result<PathBuf> {
    let path = root_env_path(home);
    if path.exists() {
        return Ok(path);
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    std::fs::write(&path, ROOT_ENV_TEMPLATE)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), "created user env file");
    Ok(path)
}

/// Merged view of the process environment and the dotenv files.
#[derive(Debug, Clone, Default)]
pub struct EnvLayers {
    values: BTreeMap<String, String>,
    file_keys: Vec<String>,
}

impl EnvLayers {
    /// Load the process environment, then `~/.rh/.env.root` (when a home
    /// directory is known and the file exists), then `<cwd>/.env`.
    pub fn load(home: Option<&Path>, cwd: &Path) -> Result<Self> {
        let mut files = Vec::new();
        if let Some(home) = home {
            files.push(root_env_path(home));
        }
        files.push(cwd.join(PROJECT_ENV_FILE));
        Self::from_parts(std::env::vars(), &files)
    }

    pub fn from_parts(
        process: impl IntoIterator<Item = (String, String)>,
        files: &[PathBuf],
    ) -> Result<Self> {
        let mut layers = Self {
            values: process.into_iter().collect(),
            file_keys: Vec::new(),
        };
        for file in files {
            for (key, value) in read_env_file(file)? {
                if !layers.file_keys.contains(&key) {
                    layers.file_keys.push(key.clone());
                }
                layers.values.insert(key, value);
            }
        }
        Ok(layers)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Keys defined by the dotenv files, in first-seen order.
    pub fn file_keys(&self) -> &[String] {
        &self.file_keys
    }
}

fn read_env_file(path: &Path) -> Result<Vec<(String, String)>> {
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    iter.collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Settings resolved once per invocation.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub credential: Option<GithubCredential>,
    pub debug: bool,
    pub verbose: bool,
    pub env_keys: Vec<String>,
}

impl Settings {
    pub fn resolve(layers: &EnvLayers, debug_flag: bool, verbose: bool) -> Self {
        let credential = layers
            .get(TOKEN_VAR)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(GithubCredential::new);
        let debug = debug_flag || layers.get(MODE_VAR) == Some("debug");
        Self {
            credential,
            debug,
            verbose,
            env_keys: layers.file_keys().to_vec(),
        }
    }

    pub fn require_credential(&self) -> Result<&GithubCredential, PreflightError> {
        self.credential.as_ref().ok_or(PreflightError::MissingToken)
    }
}
