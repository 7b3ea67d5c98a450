//! Repository discovery and command execution.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use anyhow::{Context, bail};

use crate::error::Error;

use super::GitError;
use super::parse::parse_git_version;

/// Minimum git version: `update-ref --stdin` transactions, worktree
/// porcelain listings, trailer pretty-formats and shallow fetches all
/// behave as required from here on.
const MIN_GIT_VERSION: (u32, u32) = (2, 31);

/// Handle on one git repository. Owns no OS resources; cheap to clone.
///
/// All commands run with the working tree as their current directory, so
/// relative paths in arguments resolve the way a user at the repo root
/// would expect.
#[derive(Debug, Clone)]
pub struct Repository {
    workdir: PathBuf,
    git_dir: PathBuf,
}

impl Repository {
    /// Discover the repository containing `path`.
    pub fn discover(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let toplevel = git_in(&path, &["rev-parse", "--show-toplevel"])?;
        let workdir = dunce::canonicalize(PathBuf::from(toplevel.trim()))
            .context("failed to resolve repository working tree")?;
        let common_dir = git_in(&workdir, &["rev-parse", "--git-common-dir"])?;
        let git_dir = {
            let p = PathBuf::from(common_dir.trim());
            let abs = if p.is_relative() { workdir.join(p) } else { p };
            dunce::canonicalize(&abs).context("failed to resolve git directory")?
        };
        Ok(Repository { workdir, git_dir })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Fail when the installed git predates [`MIN_GIT_VERSION`].
    pub fn require_supported_git() -> anyhow::Result<()> {
        let output = Command::new("git")
            .arg("version")
            .output()
            .context("failed to execute git; is it installed?")?;
        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        let (major, minor, _) = parse_git_version(&text)
            .ok_or_else(|| GitError::parse(format!("unrecognized `git version` output: {text:?}")))?;
        if (major, minor) < MIN_GIT_VERSION {
            bail!(Error::GitVersion {
                found: format!("{major}.{minor}"),
                minimum: format!("{}.{}", MIN_GIT_VERSION.0, MIN_GIT_VERSION.1),
            });
        }
        Ok(())
    }

    /// Run a git command at the repository root and return trimmed stdout.
    pub fn run(&self, args: &[&str]) -> anyhow::Result<String> {
        let output = self.output(args)?;
        self.expect_success(args, &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    /// Run a git command inside another directory (e.g. a materialized
    /// worktree) and return trimmed stdout.
    pub fn run_in(&self, dir: &Path, args: &[&str]) -> anyhow::Result<String> {
        let output = self.output_with(dir, args, None, &[])?;
        self.expect_success(args, &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    /// Run a git command and report only whether it exited zero.
    pub fn run_check(&self, args: &[&str]) -> anyhow::Result<bool> {
        Ok(self.output(args)?.status.success())
    }

    /// Run a git command with bytes piped to stdin.
    pub fn run_with_input(&self, args: &[&str], input: &[u8]) -> anyhow::Result<String> {
        let output = self.output_with(&self.workdir, args, Some(input), &[])?;
        self.expect_success(args, &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    /// Run a git command with extra environment variables (ephemeral index
    /// files, alternate work trees).
    pub fn run_with_env(
        &self,
        dir: &Path,
        envs: &[(&str, &str)],
        args: &[&str],
    ) -> anyhow::Result<String> {
        let output = self.output_with(dir, args, None, envs)?;
        self.expect_success(args, &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    /// Run a git command and hand back the raw output for callers that
    /// inspect exit codes themselves.
    pub(super) fn output(&self, args: &[&str]) -> anyhow::Result<Output> {
        self.output_with(&self.workdir, args, None, &[])
    }

    fn output_with(
        &self,
        dir: &Path,
        args: &[&str],
        input: Option<&[u8]>,
        envs: &[(&str, &str)],
    ) -> anyhow::Result<Output> {
        log::debug!("$ git {}", args.join(" "));
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(dir);
        for (key, value) in envs {
            cmd.env(key, value);
        }
        if let Some(bytes) = input {
            cmd.stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
            let mut child = cmd
                .spawn()
                .with_context(|| format!("failed to spawn: git {}", args.join(" ")))?;
            child
                .stdin
                .take()
                .expect("stdin was piped")
                .write_all(bytes)
                .context("failed to write to git stdin")?;
            child
                .wait_with_output()
                .with_context(|| format!("failed to execute: git {}", args.join(" ")))
        } else {
            cmd.output()
                .with_context(|| format!("failed to execute: git {}", args.join(" ")))
        }
    }

    pub(super) fn expect_success(&self, args: &[&str], output: &Output) -> anyhow::Result<()> {
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        // Some git commands report errors on stdout (e.g. commit with
        // nothing to commit).
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = [stderr.trim(), stdout.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        Err(GitError::CommandFailed {
            command: format!("git {}", args.join(" ")),
            detail,
        }
        .into())
    }
}

/// Run git in a directory we do not have a [`Repository`] for yet
/// (discovery, clone bootstrap).
pub(super) fn git_in(dir: &Path, args: &[&str]) -> anyhow::Result<String> {
    log::debug!("$ git {}", args.join(" "));
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("failed to execute: git {}", args.join(" ")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::CommandFailed {
            command: format!("git {}", args.join(" ")),
            detail: stderr.trim().to_string(),
        }
        .into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
}
