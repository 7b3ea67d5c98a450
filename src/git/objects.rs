//! Object-level reads and writes: trees, commits, blobs.

use std::path::Path;

use anyhow::Context;
use tempfile::TempDir;

use super::{GitError, Repository};

impl Repository {
    /// Full commit message (subject, body, trailers).
    pub fn commit_message(&self, sha: &str) -> anyhow::Result<String> {
        self.run(&["show", "-s", "--format=%B", sha])
    }

    /// Tree object a commit points at.
    pub fn commit_tree_of(&self, sha: &str) -> anyhow::Result<String> {
        let expr = format!("{sha}^{{tree}}");
        self.run(&["rev-parse", &expr])
    }

    /// Parent commit ids; empty for an orphan.
    pub fn commit_parents(&self, sha: &str) -> anyhow::Result<Vec<String>> {
        let output = self.run(&["show", "-s", "--format=%P", sha])?;
        Ok(output.split_whitespace().map(str::to_string).collect())
    }

    /// Author `(name, email)` of a commit.
    pub fn commit_author(&self, sha: &str) -> anyhow::Result<(String, String)> {
        let output = self.run(&["show", "-s", "--format=%an%n%ae", sha])?;
        let mut lines = output.lines();
        let name = lines.next().unwrap_or_default().to_string();
        let email = lines.next().unwrap_or_default().to_string();
        Ok((name, email))
    }

    /// Create a commit from an existing tree. No parents makes an orphan.
    /// The message goes through stdin so multi-paragraph bodies and trailer
    /// blocks survive untouched.
    pub fn commit_tree(
        &self,
        tree: &str,
        parents: &[&str],
        message: &str,
    ) -> anyhow::Result<String> {
        let mut args = vec!["commit-tree", tree];
        for parent in parents {
            args.push("-p");
            args.push(parent);
        }
        self.run_with_input(&args, message.as_bytes())
    }

    /// Read a blob at `<committish>:<path>`; `None` when absent.
    pub fn read_blob(&self, committish: &str, path: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let spec = format!("{committish}:{path}");
        let output = self.output(&["cat-file", "blob", &spec])?;
        if output.status.success() {
            Ok(Some(output.stdout))
        } else {
            Ok(None)
        }
    }

    /// Store bytes as a blob object.
    pub fn hash_object(&self, bytes: &[u8]) -> anyhow::Result<String> {
        self.run_with_input(&["hash-object", "-w", "--stdin"], bytes)
    }

    /// Build a tree object from a directory outside the repository, without
    /// touching the repository's own index or working copy. The directory
    /// is staged into an ephemeral index (removed on every exit path) and
    /// `extra_blobs` are layered on top at their in-tree paths.
    pub fn write_tree_from_dir(
        &self,
        dir: &Path,
        extra_blobs: &[(&str, &[u8])],
    ) -> anyhow::Result<String> {
        let dir = dunce::canonicalize(dir)
            .with_context(|| format!("failed to resolve {}", dir.display()))?;
        if dir.join(".git").exists() {
            return Err(GitError::parse(format!(
                "{} contains a .git entry; refusing to import it as a tree",
                dir.display()
            ))
            .into());
        }

        // The index file must not pre-exist (git rejects an empty one), so
        // reserve a directory and let git create the file inside it. The
        // commands run from inside `dir`, outside the repository, so the
        // git dir must be pinned explicitly.
        let scratch = TempDir::new().context("failed to create ephemeral index dir")?;
        let index_path = scratch.path().join("index").to_string_lossy().into_owned();
        let dir_str = dir.to_string_lossy().into_owned();
        let git_dir = self.git_dir().to_string_lossy().into_owned();
        let env: Vec<(&str, &str)> = vec![
            ("GIT_DIR", git_dir.as_str()),
            ("GIT_INDEX_FILE", index_path.as_str()),
            ("GIT_WORK_TREE", dir_str.as_str()),
        ];

        self.run_with_env(&dir, &env, &["add", "--all", "--force", "."])?;
        for (tree_path, bytes) in extra_blobs {
            let blob = self.hash_object(bytes)?;
            let cacheinfo = format!("100644,{blob},{tree_path}");
            self.run_with_env(&dir, &env, &["update-index", "--add", "--cacheinfo", &cacheinfo])?;
        }
        self.run_with_env(&dir, &env, &["write-tree"])
    }
}
