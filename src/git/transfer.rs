//! Fetch, push and clone.

use std::path::Path;

use anyhow::Context;

use crate::error::Error;

use super::repository::git_in;
use super::Repository;

/// Knobs for a fetch. `force` is on for every namespace fetch the tool
/// performs; conflict handling happens afterwards, on the local ref copies.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    pub depth: Option<u32>,
    pub force: bool,
    pub no_tags: bool,
    pub prune: bool,
}

impl Repository {
    /// Fetch refspecs from a remote URL (or name). A wildcard refspec that
    /// matches nothing on the remote is not an error.
    pub fn fetch(&self, url: &str, refspecs: &[&str], options: FetchOptions) -> anyhow::Result<()> {
        let mut args: Vec<String> = vec!["fetch".into()];
        if options.force {
            args.push("--force".into());
        }
        if options.no_tags {
            args.push("--no-tags".into());
        }
        if options.prune {
            args.push("--prune".into());
        }
        if let Some(depth) = options.depth {
            args.push(format!("--depth={depth}"));
        }
        args.push(url.to_string());
        args.extend(refspecs.iter().map(|s| s.to_string()));

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.output(&arg_refs)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::RemoteFailed {
                operation: format!("fetch from {url}"),
                detail: stderr.trim().to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Push refspecs to a remote.
    pub fn push(&self, remote: &str, refspecs: &[&str]) -> anyhow::Result<()> {
        let mut args = vec!["push", remote];
        args.extend_from_slice(refspecs);
        let output = self.output(&args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::RemoteFailed {
                operation: format!("push to {remote}"),
                detail: stderr.trim().to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Clone `url` into `directory` and open the result.
    pub fn clone_repo(url: &str, directory: &Path) -> anyhow::Result<Repository> {
        let parent = directory
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
        let target = directory.to_string_lossy();
        git_in(parent, &["clone", url, &target]).map_err(|e| {
            anyhow::Error::from(Error::RemoteFailed {
                operation: format!("clone of {url}"),
                detail: e.to_string(),
            })
        })?;
        Repository::discover(directory)
    }
}
