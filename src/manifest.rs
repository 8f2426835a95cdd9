//! Theme manifests: `package.json` and `theme/theme.json`.
//!
//! Both the hosted commit routine and the local materializer rewrite the
//! manifests with [`update_existing`], which only replaces keys the file
//! already has.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

pub const PACKAGE_JSON: &str = "package.json";
pub const THEME_JSON: &str = "theme/theme.json";

/// npm package of the theme tooling the theme commands delegate to.
pub const THEME_LIB_PACKAGE: &str = "@resultify/hubspot-cms-lib";

/// Identifier values written into a new project's manifests.
pub fn identity_changes(name: &str, label: &str) -> Map<String, Value> {
    let mut changes = Map::new();
    changes.insert("name".to_string(), Value::String(name.to_string()));
    changes.insert("label".to_string(), Value::String(label.to_string()));
    changes
}

/// Replace the values of keys that already exist in `doc`. Keys of `changes`
/// missing from `doc` are skipped. Returns the keys that were written.
pub fn merge_existing(doc: &mut Value, changes: &Map<String, Value>) -> Vec<String> {
    let Some(object) = doc.as_object_mut() else {
        return Vec::new();
    };
    let mut updated = Vec::new();
    for (key, value) in changes {
        if let Some(slot) = object.get_mut(key) {
            *slot = value.clone();
            updated.push(key.clone());
        }
    }
    updated
}

/// Pretty JSON with two-space indentation and a trailing newline.
pub fn render(doc: &Value) -> serde_json::Result<String> {
    let mut out = serde_json::to_string_pretty(doc)?;
    out.push('\n');
    Ok(out)
}

/// Parse `content`, apply [`merge_existing`] and render the result.
pub fn update_existing(content: &str, changes: &Map<String, Value>) -> Result<String, String> {
    let mut doc: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    if !doc.is_object() {
        return Err("top-level value is not an object".to_string());
    }
    merge_existing(&mut doc, changes);
    render(&doc).map_err(|e| e.to_string())
}

/// Fields of the theme's `package.json` shown by `info` and used by the
/// compatibility check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackageSummary {
    pub name: Option<String>,
    pub version: Option<String>,
    pub engines_node: Option<String>,
    pub engines_npm: Option<String>,
    /// Version range of [`THEME_LIB_PACKAGE`] in `devDependencies` or `dependencies`.
    pub theme_lib: Option<String>,
    pub cmslib: Option<Value>,
}

impl PackageSummary {
    pub fn from_value(doc: &Value) -> Self {
        let text = |v: Option<&Value>| v.and_then(Value::as_str).map(str::to_string);
        let theme_lib = ["devDependencies", "dependencies"]
            .iter()
            .find_map(|section| text(doc.get(section).and_then(|d| d.get(THEME_LIB_PACKAGE))));
        Self {
            name: text(doc.get("name")),
            version: text(doc.get("version")),
            engines_node: text(doc.pointer("/engines/node")),
            engines_npm: text(doc.pointer("/engines/npm")),
            theme_lib,
            cmslib: doc.get("cmslib").cloned(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThemeSummary {
    pub name: Option<String>,
    pub label: Option<String>,
    pub version: Option<String>,
    pub parent_theme: Option<String>,
    pub hidden_modules: Option<Value>,
}

impl ThemeSummary {
    pub fn from_value(doc: &Value) -> Self {
        let text = |key: &str| doc.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            name: text("name"),
            label: text("label"),
            version: text("version"),
            parent_theme: text("extends"),
            hidden_modules: doc.get("hidden_modules").cloned(),
        }
    }
}

/// Parse a JSON file, or `None` when it is missing or unreadable.
pub fn read_json(path: &Path) -> Option<Value> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(doc) => Some(doc),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "ignoring unparsable manifest");
            None
        }
    }
}

pub fn read_package(dir: &Path) -> Option<PackageSummary> {
    read_json(&dir.join(PACKAGE_JSON)).map(|doc| PackageSummary::from_value(&doc))
}

pub fn read_theme(dir: &Path) -> Option<ThemeSummary> {
    read_json(&dir.join(THEME_JSON)).map(|doc| ThemeSummary::from_value(&doc))
}
