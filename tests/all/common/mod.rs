//! Test harness: throwaway git repositories driven through the real
//! binary.
//!
//! Every repository lives in its own temp directory with an isolated git
//! environment (no user/system config, deterministic identity and
//! timestamps), so tests neither read nor touch the developer's setup and
//! can run in parallel.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Fixed timestamp for deterministic commits.
const TEST_DATE: &str = "2024-01-02T03:04:05Z";

pub struct TestRepo {
    _dir: TempDir,
    pub path: PathBuf,
    home: PathBuf,
}

impl TestRepo {
    /// A fresh repository with one commit on `main`.
    pub fn new(name: &str) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = dir.path().join("home");
        std::fs::create_dir(&home).unwrap();
        std::fs::write(home.join("gitconfig"), "").unwrap();
        let path = dir.path().join(name);
        std::fs::create_dir(&path).unwrap();

        let repo = TestRepo {
            _dir: dir,
            path,
            home,
        };
        repo.git(&["init", "-b", "main"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.write_file("README.md", &format!("# {name}\n"));
        repo.git(&["add", "."]);
        repo.git(&["commit", "-m", "initial commit"]);
        repo
    }

    /// A package repository with its manifest name configured and its own
    /// path recorded as the publishing URL (so orphans it releases carry a
    /// fetchable origin).
    pub fn pkg(name: &str) -> Self {
        let repo = Self::new(name);
        repo.pkgs_ok(&["config", "add", "name", name]);
        repo.pkgs_ok(&["config", "add", "url", &repo.url()]);
        repo
    }

    /// Local path usable as a fetch URL.
    pub fn url(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    fn apply_env(&self, cmd: &mut Command) {
        cmd.current_dir(&self.path)
            .env("HOME", &self.home)
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env("GIT_CONFIG_GLOBAL", self.home.join("gitconfig"))
            .env("GIT_AUTHOR_DATE", TEST_DATE)
            .env("GIT_COMMITTER_DATE", TEST_DATE)
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .env_remove("GIT_INDEX_FILE");
    }

    /// Run git, asserting success; returns stdout.
    pub fn git(&self, args: &[&str]) -> String {
        let mut cmd = Command::new("git");
        cmd.args(args);
        self.apply_env(&mut cmd);
        let output = cmd.output().expect("failed to spawn git");
        assert!(
            output.status.success(),
            "git {args:?} failed:\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
        String::from_utf8_lossy(&output.stdout).trim_end().to_string()
    }

    /// Run the git-pkgs binary, returning the raw output.
    pub fn pkgs(&self, args: &[&str]) -> Output {
        self.pkgs_with_env(args, &[])
    }

    /// Run the git-pkgs binary with extra environment variables.
    pub fn pkgs_with_env(&self, args: &[&str], envs: &[(&str, &str)]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_git-pkgs"));
        cmd.args(args);
        self.apply_env(&mut cmd);
        for (key, value) in envs {
            cmd.env(key, value);
        }
        cmd.output().expect("failed to spawn git-pkgs")
    }

    /// Run the binary and assert it succeeded; returns stdout.
    pub fn pkgs_ok(&self, args: &[&str]) -> String {
        let output = self.pkgs(args);
        assert!(
            output.status.success(),
            "git-pkgs {args:?} failed:\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
        String::from_utf8_lossy(&output.stdout).trim_end().to_string()
    }

    /// Run the binary and assert it failed; returns stderr.
    pub fn pkgs_err(&self, args: &[&str]) -> String {
        let output = self.pkgs(args);
        assert!(
            !output.status.success(),
            "git-pkgs {args:?} unexpectedly succeeded:\nstdout: {}",
            String::from_utf8_lossy(&output.stdout),
        );
        String::from_utf8_lossy(&output.stderr).trim_end().to_string()
    }

    pub fn write_file(&self, rel: &str, contents: &str) {
        let path = self.path.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    pub fn read_file(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path.join(rel)).unwrap()
    }

    /// Commit some content and cut a release in one step.
    pub fn release(&self, rev: &str) {
        self.write_file("src.txt", &format!("content at {rev}\n"));
        self.git(&["add", "."]);
        self.git(&["commit", "-m", &format!("work for {rev}")]);
        self.pkgs_ok(&["release", rev]);
    }

    pub fn rev_parse(&self, committish: &str) -> Option<String> {
        let mut cmd = Command::new("git");
        cmd.args(["rev-parse", "--verify", "--quiet", committish]);
        self.apply_env(&mut cmd);
        let output = cmd.output().expect("failed to spawn git");
        if output.status.success() {
            Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            None
        }
    }

    pub fn trailers(&self, committish: &str) -> HashMap<String, String> {
        let out = self.git(&["show", "-s", "--format=%(trailers:only,unfold)", committish]);
        out.lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect()
    }

    /// All refs under a prefix as `(refname, sha)`.
    pub fn refs(&self, prefix: &str) -> Vec<(String, String)> {
        let out = self.git(&["for-each-ref", "--format=%(objectname) %(refname)", prefix]);
        out.lines()
            .filter_map(|line| line.split_once(' '))
            .map(|(sha, refname)| (refname.to_string(), sha.to_string()))
            .collect()
    }

    /// HEAD edges of `root` as sorted `(edge key, revision)` pairs.
    pub fn head_edges(&self, root: &str) -> Vec<(String, String)> {
        self.snapshot_edges(root, "HEAD")
    }

    /// Snapshot edges of `root` at `rev` as sorted `(edge key, revision)`.
    pub fn snapshot_edges(&self, root: &str, rev: &str) -> Vec<(String, String)> {
        let prefix = format!("refs/pkgs/{root}/{rev}/");
        let mut edges: Vec<(String, String)> = self
            .refs(&prefix)
            .into_iter()
            .map(|(refname, sha)| {
                let key = refname.strip_prefix(&prefix).unwrap().to_string();
                let revision = self
                    .trailers(&sha)
                    .get("git-pkgs-revision")
                    .cloned()
                    .unwrap_or_default();
                (key, revision)
            })
            .collect();
        edges.sort();
        edges
    }

    /// Dependency map from the manifest on disk.
    pub fn manifest_deps(&self) -> Vec<(String, String)> {
        let manifest: serde_json::Value =
            serde_json::from_str(&self.read_file("pkgs.json")).unwrap();
        let mut deps: Vec<(String, String)> = manifest
            .get("dependencies")
            .and_then(|d| d.as_object())
            .map(|map| {
                map.iter()
                    .map(|(k, v)| (k.clone(), v.as_str().unwrap_or_default().to_string()))
                    .collect()
            })
            .unwrap_or_default();
        deps.sort();
        deps
    }

    /// Assert the orphan invariants over the whole `refs/pkgs/` namespace:
    /// every `refs/pkgs/<p>/<r>/<p>` names a parentless commit whose
    /// trailers read back `p` and `r`, and every edge points at a commit
    /// with a matching orphan ref.
    pub fn assert_orphan_integrity(&self) {
        for (refname, sha) in self.refs("refs/pkgs/") {
            let trailers = self.trailers(&sha);
            let name = trailers.get("git-pkgs-name").unwrap_or_else(|| {
                panic!("{refname} -> {sha} carries no git-pkgs-name trailer")
            });
            let revision = trailers
                .get("git-pkgs-revision")
                .unwrap_or_else(|| panic!("{refname} carries no git-pkgs-revision trailer"));

            let rest = refname.strip_prefix("refs/pkgs/").unwrap();
            if rest == format!("{name}/{revision}/{name}") {
                let parents = self.git(&["show", "-s", "--format=%P", &sha]);
                assert!(
                    parents.trim().is_empty(),
                    "orphan {refname} has parents: {parents}"
                );
            } else {
                // An edge: when the named package was imported as a root
                // here, its orphan ref must agree on the commit.
                let orphan = format!("refs/pkgs/{name}/{revision}/{name}");
                if let Some(orphan_sha) = self.rev_parse(&orphan) {
                    assert_eq!(
                        orphan_sha, sha,
                        "edge {refname} disagrees with orphan {orphan}"
                    );
                }
            }
        }
    }

    pub fn worktree_exists(&self, rel: &str) -> bool {
        self.path.join(rel).join(".git").exists()
    }
}

/// Leaf packages plus the two diamond parents:
/// `c` releases 1.0/1.1, `d` releases 1.0/1.1, `e@1.0 -> d@1.0`,
/// `a@1.0 -> c@1.0 + d@1.0`, `b@1.0 -> c@1.1 + d@1.1`.
pub struct Universe {
    pub app: TestRepo,
    pub a: TestRepo,
    pub b: TestRepo,
    pub c: TestRepo,
    pub d: TestRepo,
    pub e: TestRepo,
}

pub fn universe() -> Universe {
    let c = TestRepo::pkg("c");
    c.release("1.0");
    c.release("1.1");

    let d = TestRepo::pkg("d");
    d.release("1.0");
    d.release("1.1");

    let e = TestRepo::pkg("e");
    e.pkgs_ok(&["add", "d", "1.0", &d.url()]);
    e.release("1.0");

    let a = TestRepo::pkg("a");
    a.pkgs_ok(&["add", "c", "1.0", &c.url()]);
    a.pkgs_ok(&["add", "d", "1.0", &d.url()]);
    a.release("1.0");

    let b = TestRepo::pkg("b");
    b.pkgs_ok(&["add", "c", "1.1", &c.url()]);
    b.pkgs_ok(&["add", "d", "1.1", &d.url()]);
    b.release("1.0");

    let app = TestRepo::pkg("app");
    Universe { app, a, b, c, d, e }
}

/// Make a plain (non-git-pkgs) upstream with a tagged revision.
pub fn plain_upstream(name: &str, tag: &str) -> TestRepo {
    let repo = TestRepo::new(name);
    repo.write_file("lib.txt", &format!("{name} {tag}\n"));
    repo.git(&["add", "."]);
    repo.git(&["commit", "-m", &format!("{name} {tag}")]);
    repo.git(&["tag", tag]);
    repo
}

/// Bare repository usable as a push/clone remote.
pub fn bare_remote(parent: &TestRepo, name: &str) -> PathBuf {
    let path = parent.path.parent().unwrap().join(name);
    let status = Command::new("git")
        .args(["init", "--bare", "-b", "main"])
        .arg(&path)
        .env("HOME", parent.path.parent().unwrap().join("home"))
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .status()
        .expect("failed to spawn git");
    assert!(status.success(), "git init --bare failed");
    path
}

pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
