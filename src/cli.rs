//! Command-line surface.
//!
//! Options mirror the flat option model of the tool: flags that tune the
//! resolver (`--strategy`, `--namespace`, `--prefix`, ...) are global and
//! picked up by whichever command cares; positionals belong to the
//! subcommands. Defaults resolve later, in [`crate::context`].

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use git_pkgs::resolver::Strategy;

#[derive(Parser)]
#[command(name = "git-pkgs")]
#[command(display_name = "git pkgs")]
#[command(about = "Use any git repository as a package registry")]
#[command(version)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Working directory for this command
    #[arg(short = 'C', global = true, value_name = "path", help_heading = "Global Options")]
    pub directory: Option<PathBuf>,

    /// Manifest file (default: pkgs.json, or $GIT_PKGS_JSON)
    #[arg(short = 'c', long = "config", global = true, value_name = "file", help_heading = "Global Options")]
    pub config: Option<PathBuf>,

    /// Suppress per-edge report lines
    #[arg(short = 'q', long, global = true, help_heading = "Global Options")]
    pub quiet: bool,

    /// Show the git commands being run
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count, help_heading = "Global Options")]
    pub verbose: u8,

    /// Worktree prefix for dependencies without a path mapping
    #[arg(short = 'P', long, global = true, value_name = "dir")]
    pub prefix: Option<String>,

    /// Conflict strategy for competing revisions
    #[arg(short = 's', long, global = true, value_name = "strategy")]
    pub strategy: Option<Strategy>,

    /// Dependency group namespace
    #[arg(short = 'n', long, global = true, value_name = "ns")]
    pub namespace: Option<String>,

    /// Commit message for release
    #[arg(short = 'm', long, global = true, value_name = "msg")]
    pub message: Option<String>,

    /// Fetch depth for importing revisions
    #[arg(long, global = true, value_name = "n")]
    pub depth: Option<u32>,

    /// Override the recorded package name (add-dir)
    #[arg(long = "pkg-name", global = true, value_name = "name")]
    pub pkg_name: Option<String>,

    /// Override the recorded revision (add-dir)
    #[arg(long = "pkg-revision", global = true, value_name = "rev")]
    pub pkg_revision: Option<String>,

    /// Provenance type recorded on imports
    #[arg(long = "pkg-type", global = true, value_name = "type")]
    pub pkg_type: Option<String>,

    /// Provenance URL recorded on imports (add-dir)
    #[arg(long = "pkg-url", global = true, value_name = "url")]
    pub pkg_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a dependency from a git URL
    Add {
        /// Package name
        pkg: String,
        /// Revision to import (default: $PKGS_DEFAULT_REVISION or HEAD)
        rev: Option<String>,
        /// Git URL; reused from an earlier import when omitted
        url: Option<String>,
    },
    /// Add a dependency from a local directory
    AddDir {
        /// Package name
        pkg: String,
        /// Revision to record
        rev: String,
        /// Directory to import
        path: PathBuf,
    },
    /// Remove a direct dependency
    Remove {
        /// Package name
        pkg: String,
    },
    /// Freeze the current graph into a versioned snapshot and tag it
    Release {
        /// Release revision (becomes the tag and manifest version)
        rev: String,
    },
    /// Restore the graph and working tree of a released snapshot
    Checkout {
        /// Snapshot revision (or HEAD for the live graph)
        rev: String,
    },
    /// Print the dependency tree
    Tree {
        /// Snapshot to traverse (default: HEAD)
        rev: Option<String>,
    },
    /// Show the active edges of HEAD
    Status,
    /// Show provenance and known revisions of a package
    Show {
        /// Package name
        pkg: String,
    },
    /// List released snapshots
    LsReleases,
    /// Delete unreferenced refs of a package
    Prune {
        /// Package name
        pkg: String,
        /// Only prune this revision
        rev: Option<String>,
    },
    /// Fetch package refs and tags from a remote
    Fetch {
        /// Remote name (default: origin)
        remote: Option<String>,
        /// Fetch from every configured remote
        #[arg(long)]
        all: bool,
    },
    /// Push HEAD, the release tag and all package refs
    Push {
        /// Remote name (default: origin)
        remote: Option<String>,
        /// Push to every configured remote
        #[arg(long)]
        all: bool,
    },
    /// Fetch, fast-forward the current branch and re-materialize
    Pull {
        /// Remote name (default: origin)
        remote: Option<String>,
    },
    /// Clone a repository and check out its dependency graph
    Clone {
        /// Source URL
        url: String,
        /// Target directory
        directory: Option<PathBuf>,
    },
    /// Replay `add` for every package in a JSON document
    JsonImport {
        /// Input file (default: stdin)
        file: Option<PathBuf>,
    },
    /// Export the resolved graph as JSON
    JsonExport,
    /// Read or write manifest values
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Set a manifest value by dotted path (creates the manifest if needed)
    Add {
        /// Dotted key, e.g. `name` or `config.strategy`
        key: String,
        /// Value; the literals true/false become booleans
        value: String,
    },
    /// Read a manifest value by dotted path
    Get {
        /// Dotted key
        key: String,
    },
}
