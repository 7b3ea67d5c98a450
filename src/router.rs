//! Worktree placement for dependency snapshots.
//!
//! Routing decides where (or whether) an edge appears on disk. Patterns are
//! `[<namespace>:]<glob>` keys in the manifest's `paths` map, tried in
//! declaration order; the glob is applied to the full ref path so namespaces
//! participate in the match. The mapped value is a filesystem prefix, or the
//! literal `"false"` to record the edge without materializing it.

use std::path::PathBuf;

use glob::Pattern;

use crate::manifest::{Manifest, split_dep_key};
use crate::refs::{HEAD_SNAPSHOT, REF_ROOT};

/// Where an edge should live in the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Materialize at this path (relative to the repository root).
    Path(PathBuf),
    /// Record the ref but keep it out of the working copy.
    Skip,
}

#[derive(Debug, Clone)]
pub struct Router {
    root: String,
    prefix: String,
    /// `(pattern, mapped prefix)` in declaration order.
    patterns: Vec<(String, String)>,
    ref_suffix: Option<String>,
}

impl Router {
    pub fn new(
        root: &str,
        prefix: &str,
        manifest: &Manifest,
        ref_suffix: Option<String>,
    ) -> Self {
        Router {
            root: root.to_string(),
            prefix: prefix.to_string(),
            patterns: manifest
                .paths
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            ref_suffix,
        }
    }

    /// Route an edge key (`<pkg>` or `<ns>/<pkg>`, as it appears under the
    /// snapshot prefix).
    pub fn route(&self, edge_key: &str) -> Route {
        let key = self.strip_suffix(edge_key);

        if self.patterns.is_empty() {
            return Route::Path(PathBuf::from(&self.prefix).join(key));
        }

        let subject = format!("{REF_ROOT}/{}/{HEAD_SNAPSHOT}/{key}", self.root);
        for (raw_pattern, mapped) in &self.patterns {
            let (namespace, glob) = split_dep_key(raw_pattern);
            let effective = match namespace {
                Some(ns) => format!("{REF_ROOT}/{}/{HEAD_SNAPSHOT}/{ns}/{glob}", self.root),
                None => format!("{REF_ROOT}/{}/{HEAD_SNAPSHOT}/{glob}", self.root),
            };
            let pattern = match Pattern::new(&effective) {
                Ok(p) => p,
                Err(e) => {
                    log::debug!("ignoring unparsable path pattern {raw_pattern:?}: {e}");
                    continue;
                }
            };
            if !pattern.matches(&subject) {
                continue;
            }
            if mapped == "false" {
                return Route::Skip;
            }
            // The namespace directory is the pattern's concern, not the
            // checkout path's.
            let leaf = match namespace {
                Some(ns) => key
                    .strip_prefix(&format!("{ns}/"))
                    .unwrap_or(key),
                None => key,
            };
            return Route::Path(PathBuf::from(mapped).join(leaf));
        }

        Route::Path(PathBuf::from(&self.prefix).join(key))
    }

    /// Drop a constant trailing segment some ecosystems append to every
    /// package ref (`PKGS_REF_SUFFIX`).
    fn strip_suffix<'a>(&self, key: &'a str) -> &'a str {
        match &self.ref_suffix {
            Some(suffix) if !suffix.is_empty() => key
                .strip_suffix(suffix.as_str())
                .map(|rest| rest.strip_suffix('/').unwrap_or(rest))
                .unwrap_or(key),
            _ => key,
        }
    }
}
