//! Command-level error taxonomy.
//!
//! Raw git command failures are [`crate::git::GitError`]; the variants here
//! are the conditions the command surface reports with a dedicated message.
//! Everything travels through `anyhow`, and `main` prints a single
//! `fatal: <cause>` line.

#[derive(Debug)]
pub enum Error {
    /// A bad or missing argument the CLI parser cannot catch (unknown
    /// manifest key, no reusable URL on record).
    BadArgs { detail: String },
    /// Required root package name is unset.
    NoPkgName,
    /// Malformed manifest document.
    ManifestInvalid { path: String, detail: String },
    /// A ref that must exist is absent.
    RefMissing { refname: String },
    /// A fetch/push/clone against a remote failed.
    RemoteFailed { operation: String, detail: String },
    /// Underlying git is older than the minimum supported version.
    GitVersion { found: String, minimum: String },
    /// `remove` was invoked on a package that is not a direct dependency.
    NotDirectDep { pkg: String },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::BadArgs { detail } => {
                write!(f, "{detail}")
            }
            Error::NoPkgName => {
                write!(
                    f,
                    "no package name configured; run `git pkgs config add name <name>`"
                )
            }
            Error::ManifestInvalid { path, detail } => {
                write!(f, "invalid manifest {path}: {detail}")
            }
            Error::RefMissing { refname } => {
                write!(f, "ref not found: {refname}")
            }
            Error::RemoteFailed { operation, detail } => {
                write!(f, "{operation} failed: {detail}")
            }
            Error::GitVersion { found, minimum } => {
                write!(f, "git {found} is too old; {minimum} or newer is required")
            }
            Error::NotDirectDep { pkg } => {
                write!(
                    f,
                    "'{pkg}' is not a direct dependency; only packages listed in the manifest can be removed"
                )
            }
        }
    }
}

impl std::error::Error for Error {}
