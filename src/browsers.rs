//! `browsers`: supported browser ranges and audience coverage for the
//! project's `.browserslistrc`.
//!
//! The config is read here so the browsersl.ist link can be built without
//! node. Query resolution and coverage data come from the project's own
//! `browserslist` package, run through `node`.

use std::fmt::Write as _;
use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use console::style;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::preflight::require_binary;

pub const CONFIG_FILE: &str = ".browserslistrc";

const LINK_BASE: &str = "https://browsersl.ist/?results#q=";
const QUERIES_VAR: &str = "RH_BROWSERSLIST_QUERIES";
const NEWLINE_MARK: &str = "__NEWLINE__";

// Ranges come from the project config (which may pick an env section),
// coverage from the default queries.
const RESOLVE_SCRIPT: &str = "\
import browserslist from 'browserslist'
const queries = JSON.parse(process.env.RH_BROWSERSLIST_QUERIES)
const list = browserslist(queries)
console.log(JSON.stringify({
  browsers: browserslist(undefined, { path: process.cwd() }),
  global: browserslist.coverage(list),
  eu: browserslist.coverage(list, 'alt-EU'),
  se: browserslist.coverage(list, 'SE'),
}))
";

/// Display name, browserslist id, and whether a single version is shown
/// without a range.
const FAMILIES: [(&str, &str, bool); 7] = [
    ("Chrome", "chrome", false),
    ("Firefox", "firefox", false),
    ("iOS Safari", "ios_saf", false),
    ("Safari", "safari", false),
    ("Edge", "edge", false),
    ("Samsung", "samsung", true),
    ("Android Chrome", "and_chr", true),
];

/// What `browserslist` reports for a project.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Resolution {
    /// `"<id> <version>"` entries, newest first within each browser.
    pub browsers: Vec<String>,
    pub global: f64,
    pub eu: f64,
    pub se: f64,
}

/// Queries of the default section: lines before any `[section]` header or
/// under `[defaults]`. Comments start with `#`; commas separate queries
/// like newlines do.
pub fn default_queries(content: &str) -> Vec<String> {
    let mut in_defaults = true;
    let mut queries = Vec::new();
    for line in content.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.starts_with('[') && line.ends_with(']') {
            in_defaults = line[1..line.len() - 1]
                .split_whitespace()
                .any(|name| name == "defaults");
            continue;
        }
        if !in_defaults {
            continue;
        }
        queries.extend(
            line.split(',')
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
        );
    }
    queries
}

/// Read the default queries from `<cwd>/.browserslistrc`. `None` when the
/// file does not exist.
pub fn load_config(cwd: &Path) -> Result<Option<Vec<String>>> {
    let path = cwd.join(CONFIG_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Some(default_queries(&content)))
}

fn encode_uri(input: &str) -> String {
    const KEEP: &[u8] = b";,/?:@&=+$-_.!~*'()#";
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || KEEP.contains(&byte) {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{:02X}", byte);
        }
    }
    out
}

/// browsersl.ist link that opens the default queries, one per line.
pub fn compatibility_link(queries: &[String]) -> String {
    let joined = queries.join(NEWLINE_MARK).replace(' ', "+");
    let encoded = encode_uri(&joined).replace(NEWLINE_MARK, "%0A");
    format!("{}{}%0A", LINK_BASE, encoded)
}

fn version_of(entry: &str) -> &str {
    entry.split(' ').nth(1).unwrap_or_default()
}

/// One line per browser family: `"<name> <oldest>-<newest>"`.
pub fn supported_ranges(browsers: &[String]) -> Vec<String> {
    FAMILIES
        .iter()
        .map(|&(name, id, collapse)| {
            let mut matches = browsers
                .iter()
                .filter(|entry| entry.split(' ').next() == Some(id));
            let Some(newest) = matches.next() else {
                return format!("{} not supported", name);
            };
            let oldest = matches.last().unwrap_or(newest);
            if collapse && oldest == newest {
                format!("{} {}", name, version_of(newest))
            } else {
                format!("{} {}-{}", name, version_of(oldest), version_of(newest))
            }
        })
        .collect()
}

fn percent(value: f64) -> String {
    format!("{}%", value.ceil() as i64)
}

pub fn render_report(resolution: &Resolution, queries: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style("\nSupported browsers:").green());
    for line in supported_ranges(&resolution.browsers) {
        let _ = writeln!(out, "{}", line);
    }
    let _ = writeln!(out, "{}", style("\nAudience coverage:").bold());
    for (region, value) in [
        ("Global", resolution.global),
        ("Europe", resolution.eu),
        ("Sweden", resolution.se),
    ] {
        let _ = writeln!(out, "{}: {}", region, style(percent(value)).green());
    }
    let _ = writeln!(
        out,
        "\nClick to open the browser compatibility list:\n{}",
        style(compatibility_link(queries)).cyan()
    );
    out
}

/// Ask the project's `browserslist` for the supported entries and coverage.
pub async fn resolve(cwd: &Path, queries: &[String]) -> Result<Resolution> {
    require_binary("node")?;
    debug!(cwd = %cwd.display(), ?queries, "resolving browserslist");
    let output = Command::new("node")
        .args(["--input-type=module", "-e", RESOLVE_SCRIPT])
        .env(QUERIES_VAR, serde_json::to_string(queries)?)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()
        .await
        .context("Failed to run node for browserslist")?;
    if !output.status.success() {
        bail!("browserslist failed; is it installed in {}?", cwd.display());
    }
    serde_json::from_slice(&output.stdout).context("Unexpected browserslist output")
}

/// Full `browsers` output for `cwd`.
pub async fn report(cwd: &Path) -> Result<String> {
    let Some(queries) = load_config(cwd)? else {
        return Ok(format!("No {} found in {}\n", CONFIG_FILE, cwd.display()));
    };
    let resolution = resolve(cwd, &queries).await?;
    Ok(render_report(&resolution, &queries))
}
