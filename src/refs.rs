//! Typed ref names for the `refs/pkgs/` namespace.
//!
//! Every ref the tool reads or writes is built through [`PkgRef`] so the
//! layout lives in one place:
//!
//! ```text
//! refs/pkgs/<R>/HEAD/<pkg>          active edge of the root package
//! refs/pkgs/<R>/HEAD/<ns>/<pkg>     active edge inside namespace <ns>
//! refs/pkgs/<R>/<rev>/...           frozen snapshot of HEAD at release <rev>
//! refs/pkgs/<pkg>/<rev>/<pkg>       orphan commit for <pkg>@<rev>
//! refs/pkgs/<pkg>/<rev>/<dep>       transitive edge declared by <pkg>@<rev>
//! ```
//!
//! Package names may contain `/`, so refs are never re-parsed into segments
//! blindly; callers strip a known prefix and treat the remainder as the
//! edge key.

use std::fmt;

/// Root of the package ref namespace.
pub const REF_ROOT: &str = "refs/pkgs";

/// Snapshot name of the live (unreleased) graph.
pub const HEAD_SNAPSHOT: &str = "HEAD";

/// A fully formatted ref under `refs/pkgs/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PkgRef(String);

impl PkgRef {
    /// Active edge `refs/pkgs/<root>/HEAD[/<ns>]/<pkg>`.
    pub fn root_head(root: &str, namespace: Option<&str>, pkg: &str) -> Self {
        Self::edge(root, HEAD_SNAPSHOT, namespace, pkg)
    }

    /// Edge inside a snapshot, `refs/pkgs/<root>/<snapshot>[/<ns>]/<pkg>`.
    /// `HEAD` is itself a snapshot name, the live one.
    pub fn edge(root: &str, snapshot: &str, namespace: Option<&str>, pkg: &str) -> Self {
        match namespace {
            Some(ns) => PkgRef(format!("{REF_ROOT}/{root}/{snapshot}/{ns}/{pkg}")),
            None => PkgRef(format!("{REF_ROOT}/{root}/{snapshot}/{pkg}")),
        }
    }

    /// The orphan commit of `<pkg>@<rev>`: `refs/pkgs/<pkg>/<rev>/<pkg>`.
    pub fn orphan(pkg: &str, rev: &str) -> Self {
        PkgRef(format!("{REF_ROOT}/{pkg}/{rev}/{pkg}"))
    }

    /// Most recently imported revision of `<pkg>`: `refs/pkgs/<pkg>/HEAD/<pkg>`.
    pub fn pkg_head(pkg: &str) -> Self {
        Self::orphan(pkg, HEAD_SNAPSHOT)
    }

    /// Transitive edge declared by `<pkg>@<rev>`: `refs/pkgs/<pkg>/<rev>/<dep>`.
    pub fn transitive(pkg: &str, rev: &str, dep: &str) -> Self {
        PkgRef(format!("{REF_ROOT}/{pkg}/{rev}/{dep}"))
    }

    /// Iteration prefix for every edge of a snapshot (trailing slash).
    pub fn snapshot_prefix(root: &str, snapshot: &str) -> String {
        format!("{REF_ROOT}/{root}/{snapshot}/")
    }

    /// Iteration prefix for everything announced by `<pkg>@<rev>`.
    pub fn revision_prefix(pkg: &str, rev: &str) -> String {
        format!("{REF_ROOT}/{pkg}/{rev}/")
    }

    /// Iteration prefix for every revision of `<pkg>`.
    pub fn pkg_prefix(pkg: &str) -> String {
        format!("{REF_ROOT}/{pkg}/")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PkgRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PkgRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Strip a snapshot prefix from a full ref, yielding the edge key
/// (`<pkg>` or `<ns>/<pkg>`).
pub fn edge_key<'a>(refname: &'a str, root: &str, snapshot: &str) -> Option<&'a str> {
    refname
        .strip_prefix(REF_ROOT)?
        .strip_prefix('/')?
        .strip_prefix(root)?
        .strip_prefix('/')?
        .strip_prefix(snapshot)?
        .strip_prefix('/')
}

/// Split an edge key into `(namespace, package)` against a set of known
/// namespaces. Namespaces are single path segments introduced by
/// `add --namespace`; the known set comes from the manifest, which records
/// every namespace in use. A package whose first segment happens to collide
/// with a live namespace must be addressed through that namespace.
pub fn split_namespace<'a>(
    key: &'a str,
    known_namespaces: &[String],
) -> (Option<&'a str>, &'a str) {
    if let Some((head, rest)) = key.split_once('/') {
        if known_namespaces.iter().any(|ns| ns == head) {
            return (Some(head), rest);
        }
    }
    (None, key)
}

/// Last path segment of an edge key (the leaf a transitive ref names).
pub fn leaf(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
