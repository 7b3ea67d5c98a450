//! Worktree management.
//!
//! Dependency snapshots are materialized as detached worktrees: the refs
//! under `refs/pkgs/` are not branches, so every checkout is `--detach`.

use std::path::Path;

use super::{Repository, WorktreeInfo};

impl Repository {
    /// List registered worktrees, including the main one.
    pub fn list_worktrees(&self) -> anyhow::Result<Vec<WorktreeInfo>> {
        let output = self.run(&["worktree", "list", "--porcelain"])?;
        Ok(WorktreeInfo::parse_porcelain_list(&output))
    }

    /// The registered worktree at `path`, if any. Comparison is lexical on
    /// the absolute path; the directory may have been deleted externally.
    pub fn worktree_at(&self, path: &Path) -> anyhow::Result<Option<WorktreeInfo>> {
        let wanted = self.absolute(path);
        Ok(self
            .list_worktrees()?
            .into_iter()
            .find(|wt| dunce::canonicalize(&wt.path).unwrap_or_else(|_| wt.path.clone()) == wanted))
    }

    /// Add a worktree at `path`, detached at `committish`.
    pub fn worktree_add(&self, path: &Path, committish: &str) -> anyhow::Result<()> {
        let path = self.absolute(path);
        let path_str = path.to_string_lossy().into_owned();
        self.run(&["worktree", "add", "--detach", &path_str, committish])?;
        Ok(())
    }

    /// Remove a worktree; `force` also discards untracked content.
    pub fn worktree_remove(&self, path: &Path, force: bool) -> anyhow::Result<()> {
        let path = self.absolute(path);
        let path_str = path.to_string_lossy().into_owned();
        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(&path_str);
        self.run(&args)?;
        Ok(())
    }

    /// Drop bookkeeping for worktrees whose directories are gone.
    pub fn worktree_prune(&self) -> anyhow::Result<()> {
        self.run(&["worktree", "prune"])?;
        Ok(())
    }

    /// Put a snapshot on disk at `path`: reuse the registered worktree when
    /// one is already there (a detached checkout inside it), otherwise add a
    /// fresh detached worktree.
    pub fn materialize_worktree(&self, path: &Path, sha: &str) -> anyhow::Result<()> {
        let abs = self.absolute(path);
        if let Some(existing) = self.worktree_at(&abs)? {
            if existing.head == sha {
                return Ok(());
            }
            self.run_in(&abs, &["checkout", "--detach", "--force", sha])?;
            return Ok(());
        }
        // A stale directory that is not a registered worktree blocks
        // `worktree add`, even with --force. Anything at a managed
        // checkout location is ours to replace.
        self.worktree_prune()?;
        if abs.exists() {
            std::fs::remove_dir_all(&abs)?;
        }
        if let Some(parent) = abs.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.worktree_add(&abs, sha)?;
        Ok(())
    }

    /// Tear down a materialized snapshot if it is registered at `path`.
    pub fn dematerialize_worktree(&self, path: &Path) -> anyhow::Result<()> {
        let abs = self.absolute(path);
        if self.worktree_at(&abs)?.is_some() {
            if abs.exists() {
                self.worktree_remove(&abs, true)?;
            } else {
                // The directory was deleted externally; only the
                // registration is left.
                self.worktree_prune()?;
            }
        }
        Ok(())
    }

    fn absolute(&self, path: &Path) -> std::path::PathBuf {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workdir().join(path)
        };
        dunce::canonicalize(&joined).unwrap_or(joined)
    }
}
