//! Parsers for git's machine-readable output.

use indexmap::IndexMap;

use super::{GitError, WorktreeInfo};

/// Parse `git version 2.43.0` (or `2.43.0.windows.1`) into a triple.
pub(crate) fn parse_git_version(output: &str) -> Option<(u32, u32, u32)> {
    let rest = output.trim().strip_prefix("git version ")?;
    let mut parts = rest.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    // Patch may be followed by platform suffixes; tolerate a missing one.
    let patch = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    Some((major, minor, patch))
}

/// Parse `for-each-ref --format='%(objectname) %(refname)'` output into
/// `(refname, sha)` pairs. Ref names cannot contain spaces, but the sha
/// leads anyway so the split is unambiguous.
pub(crate) fn parse_ref_listing(output: &str) -> Result<Vec<(String, String)>, GitError> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.split_once(' ')
                .map(|(sha, refname)| (refname.to_string(), sha.to_string()))
                .ok_or_else(|| GitError::parse(format!("malformed ref listing line: {line:?}")))
        })
        .collect()
}

/// Parse unfolded trailer lines (`key: value`). Later occurrences of a key
/// override earlier ones, matching git's "last trailer wins" reading.
pub(crate) fn parse_trailers(output: &str) -> IndexMap<String, String> {
    let mut trailers = IndexMap::new();
    for line in output.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            if !key.is_empty() {
                trailers.insert(key.to_string(), value.trim().to_string());
            }
        }
    }
    trailers
}

impl WorktreeInfo {
    /// Parse `worktree list --porcelain` output. Only the attributes the
    /// tool acts on are kept.
    pub(crate) fn parse_porcelain_list(output: &str) -> Vec<Self> {
        let mut worktrees = Vec::new();
        let mut current: Option<WorktreeInfo> = None;

        for line in output.lines() {
            if line.is_empty() {
                if let Some(wt) = current.take() {
                    worktrees.push(wt);
                }
                continue;
            }
            let (key, value) = match line.split_once(' ') {
                Some((k, v)) => (k, Some(v)),
                None => (line, None),
            };
            match (key, value, current.as_mut()) {
                ("worktree", Some(path), _) => {
                    if let Some(wt) = current.take() {
                        worktrees.push(wt);
                    }
                    current = Some(WorktreeInfo {
                        path: path.into(),
                        head: String::new(),
                        bare: false,
                        detached: false,
                    });
                }
                ("HEAD", Some(sha), Some(wt)) => wt.head = sha.to_string(),
                ("bare", None, Some(wt)) => wt.bare = true,
                ("detached", None, Some(wt)) => wt.detached = true,
                // branch, locked, prunable and future attributes are ignored.
                _ => {}
            }
        }
        if let Some(wt) = current {
            worktrees.push(wt);
        }
        worktrees
    }
}
