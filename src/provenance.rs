//! Provenance trailers carried by every orphan commit.

use indexmap::IndexMap;

pub const TRAILER_NAME: &str = "git-pkgs-name";
pub const TRAILER_TYPE: &str = "git-pkgs-type";
pub const TRAILER_REVISION: &str = "git-pkgs-revision";
pub const TRAILER_COMMIT: &str = "git-pkgs-commit";
pub const TRAILER_URL: &str = "git-pkgs-url";

/// Where an imported snapshot came from, recorded as git trailers on the
/// orphan commit. `commit` is the origin commit the tree was taken from;
/// it is absent on release commits, which are their own origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub name: String,
    pub pkg_type: String,
    pub revision: String,
    pub commit: Option<String>,
    pub url: String,
}

impl Provenance {
    /// Trailer `(key, value)` pairs in canonical emission order.
    pub fn trailers(&self) -> Vec<(&'static str, &str)> {
        let mut out = vec![
            (TRAILER_NAME, self.name.as_str()),
            (TRAILER_TYPE, self.pkg_type.as_str()),
            (TRAILER_REVISION, self.revision.as_str()),
        ];
        if let Some(commit) = &self.commit {
            out.push((TRAILER_COMMIT, commit.as_str()));
        }
        out.push((TRAILER_URL, self.url.as_str()));
        out
    }

    /// Reconstruct provenance from a parsed trailer map. `None` when the
    /// commit carries no `git-pkgs-name` trailer (not an orphan of ours).
    pub fn from_trailers(trailers: &IndexMap<String, String>) -> Option<Self> {
        let name = trailers.get(TRAILER_NAME)?.clone();
        Some(Provenance {
            name,
            pkg_type: trailers.get(TRAILER_TYPE).cloned().unwrap_or_default(),
            revision: trailers.get(TRAILER_REVISION).cloned().unwrap_or_default(),
            commit: trailers.get(TRAILER_COMMIT).cloned(),
            url: trailers.get(TRAILER_URL).cloned().unwrap_or_default(),
        })
    }
}

/// Append trailers to a commit message, adding each `key: value` pair only
/// when that exact pair is not already present (the `addIfDifferent` policy,
/// which keeps repeated orphanizations from stacking duplicates).
pub fn append_trailers(message: &str, trailers: &[(&str, &str)]) -> String {
    let mut out = message.trim_end().to_string();

    let missing: Vec<_> = trailers
        .iter()
        .filter(|(key, value)| !has_trailer(&out, key, value))
        .collect();
    if missing.is_empty() {
        out.push('\n');
        return out;
    }

    // Separate the trailer block from the body unless the message already
    // ends in trailer-shaped lines.
    if !out.is_empty() && !ends_with_trailer_block(&out) {
        out.push('\n');
    }
    for (key, value) in missing {
        out.push('\n');
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
    }
    out.push('\n');
    out
}

fn has_trailer(message: &str, key: &str, value: &str) -> bool {
    message.lines().any(|line| {
        line.split_once(':')
            .map(|(k, v)| k.trim() == key && v.trim() == value)
            .unwrap_or(false)
    })
}

fn ends_with_trailer_block(message: &str) -> bool {
    message
        .lines()
        .last()
        .and_then(|line| line.split_once(": "))
        .map(|(key, _)| !key.is_empty() && !key.contains(' '))
        .unwrap_or(false)
}
