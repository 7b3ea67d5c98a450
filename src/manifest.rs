//! The package manifest (`pkgs.json`).
//!
//! The manifest is the committed half of the dependency model: direct
//! edges live here as `"[<namespace>:]<name>" -> revision` entries and must
//! stay in lockstep with the `refs/pkgs/<root>/HEAD/` namespace. Loading
//! tolerates (and drops) unknown keys; saving always emits the canonical
//! field order and dependency sort.

use std::path::Path;

use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Default manifest filename; `GIT_PKGS_JSON` overrides it.
pub const DEFAULT_MANIFEST_FILE: &str = "pkgs.json";

/// Typed manifest document. Field declaration order is the canonical
/// output order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub dependencies: IndexMap<String, String>,
    /// Routing patterns; order matters, first match wins.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub engines: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub config: IndexMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub scripts: IndexMap<String, String>,
}

/// Manifest key for a dependency: `name` or `namespace:name`.
pub fn dep_key(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("{ns}:{name}"),
        None => name.to_string(),
    }
}

/// Split a dependency key back into `(namespace, name)`.
pub fn split_dep_key(key: &str) -> (Option<&str>, &str) {
    match key.split_once(':') {
        Some((ns, name)) if !ns.is_empty() => (Some(ns), name),
        _ => (None, key),
    }
}

impl Manifest {
    /// Load a manifest; a missing file is an empty manifest, a malformed
    /// one is fatal.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Manifest::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&contents).map_err(|e| {
            Error::ManifestInvalid {
                path: path.display().to_string(),
                detail: e.to_string(),
            }
            .into()
        })
    }

    /// Parse manifest bytes (e.g. a blob read out of an orphan commit).
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            Error::ManifestInvalid {
                path: DEFAULT_MANIFEST_FILE.to_string(),
                detail: e.to_string(),
            }
            .into()
        })
    }

    /// Write canonical JSON atomically (write-then-rename in the target
    /// directory).
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let mut canonical = self.clone();
        canonical.sort_dependencies();
        let json = canonical.to_json();
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let tmp = tempfile::NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))
            .context("failed to create manifest temp file")?;
        std::fs::write(tmp.path(), json.as_bytes())
            .context("failed to write manifest temp file")?;
        tmp.persist(path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    /// Canonical serialized form.
    pub fn to_json(&self) -> String {
        let mut json =
            serde_json::to_string_pretty(self).expect("manifest serialization cannot fail");
        json.push('\n');
        json
    }

    /// Non-namespaced keys first, then namespaced, lexicographic within
    /// each block.
    pub fn sort_dependencies(&mut self) {
        self.dependencies
            .sort_by(|ka, _, kb, _| {
                let (ns_a, _) = split_dep_key(ka);
                let (ns_b, _) = split_dep_key(kb);
                ns_a.is_some().cmp(&ns_b.is_some()).then_with(|| ka.cmp(kb))
            });
    }

    /// Upsert a direct dependency edge.
    pub fn add_dep(&mut self, name: &str, rev: &str, namespace: Option<&str>) {
        self.dependencies
            .insert(dep_key(namespace, name), rev.to_string());
    }

    /// Remove a direct dependency edge; returns whether it was present.
    pub fn remove_dep(&mut self, name: &str, namespace: Option<&str>) -> bool {
        self.dependencies
            .shift_remove(&dep_key(namespace, name))
            .is_some()
    }

    /// The root package name, required by every graph operation.
    pub fn require_name(&self) -> anyhow::Result<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::NoPkgName.into())
    }

    /// Revision of a direct dependency, if recorded.
    pub fn dep_revision(&self, name: &str, namespace: Option<&str>) -> Option<&str> {
        self.dependencies
            .get(&dep_key(namespace, name))
            .map(String::as_str)
    }

    /// Every namespace in use: dependency keys plus path patterns.
    pub fn namespaces(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let keys = self
            .dependencies
            .keys()
            .chain(self.paths.keys())
            .filter_map(|key| split_dep_key(key).0);
        for ns in keys {
            if !out.iter().any(|seen| seen == ns) {
                out.push(ns.to_string());
            }
        }
        out
    }

    /// Direct dependencies as `(namespace, name, revision)`.
    pub fn direct_deps(&self) -> impl Iterator<Item = (Option<&str>, &str, &str)> {
        self.dependencies.iter().map(|(key, rev)| {
            let (ns, name) = split_dep_key(key);
            (ns, name, rev.as_str())
        })
    }

    /// Read a value by dotted path. Scalar fields respond to their own
    /// name; map fields (`dependencies`, `paths`, `engines`, `config`,
    /// `scripts`) take one trailing segment; `extra` descends arbitrarily.
    pub fn get(&self, path: &str) -> Option<String> {
        let (head, tail) = match path.split_once('.') {
            Some((head, tail)) => (head, Some(tail)),
            None => (path, None),
        };
        match (head, tail) {
            ("name", None) => self.name.clone(),
            ("description", None) => self.description.clone(),
            ("version", None) => self.version.clone(),
            ("author", None) => self.author.clone(),
            ("license", None) => self.license.clone(),
            ("repository", None) => self.repository.clone(),
            ("url", None) => self.url.clone(),
            ("homepage", None) => self.homepage.clone(),
            ("prefix", None) => self.prefix.clone(),
            ("dependencies", Some(key)) => self.dependencies.get(key).cloned(),
            ("paths", Some(key)) => self.paths.get(key).cloned(),
            ("engines", Some(key)) => self.engines.get(key).cloned(),
            ("scripts", Some(key)) => self.scripts.get(key).cloned(),
            ("config", Some(key)) => self.config.get(key).map(value_to_string),
            ("extra", Some(rest)) => {
                let mut node = self.extra.as_ref()?;
                for segment in rest.split('.') {
                    node = node.get(segment)?;
                }
                Some(value_to_string(node))
            }
            _ => None,
        }
    }

    /// Set a value by dotted path. Values are strings, except the literals
    /// `true`/`false` which become booleans in `Value`-typed slots. Setting
    /// an already-identical scalar is a no-op.
    pub fn set(&mut self, path: &str, value: &str) -> anyhow::Result<()> {
        let (head, tail) = match path.split_once('.') {
            Some((head, tail)) => (head, Some(tail)),
            None => (path, None),
        };
        match (head, tail) {
            ("name", None) => self.name = Some(value.to_string()),
            ("description", None) => self.description = Some(value.to_string()),
            ("version", None) => self.version = Some(value.to_string()),
            ("author", None) => self.author = Some(value.to_string()),
            ("license", None) => self.license = Some(value.to_string()),
            ("repository", None) => self.repository = Some(value.to_string()),
            ("url", None) => self.url = Some(value.to_string()),
            ("homepage", None) => self.homepage = Some(value.to_string()),
            ("prefix", None) => self.prefix = Some(value.to_string()),
            ("dependencies", Some(key)) => {
                self.dependencies.insert(key.to_string(), value.to_string());
            }
            ("paths", Some(key)) => {
                self.paths.insert(key.to_string(), value.to_string());
            }
            ("engines", Some(key)) => {
                self.engines.insert(key.to_string(), value.to_string());
            }
            ("scripts", Some(key)) => {
                self.scripts.insert(key.to_string(), value.to_string());
            }
            ("config", Some(key)) => {
                self.config.insert(key.to_string(), parse_scalar(value));
            }
            ("extra", Some(rest)) => {
                let root = self
                    .extra
                    .get_or_insert_with(|| Value::Object(serde_json::Map::new()));
                set_nested(root, rest, parse_scalar(value))?;
            }
            _ => {
                return Err(Error::BadArgs {
                    detail: format!("unknown manifest key: {path}"),
                }
                .into());
            }
        }
        Ok(())
    }
}

fn parse_scalar(value: &str) -> Value {
    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        other => Value::String(other.to_string()),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn set_nested(root: &mut Value, path: &str, value: Value) -> anyhow::Result<()> {
    let mut node = root;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let map = node.as_object_mut().ok_or_else(|| Error::BadArgs {
            detail: format!("manifest key {path} crosses a non-object value"),
        })?;
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return Ok(());
        }
        node = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }
    Ok(())
}
