//! Decentralized, git-native package management.
//!
//! Any git repository becomes its own package registry: release snapshots,
//! dependency edges and per-package provenance live in the `refs/pkgs/`
//! namespace, next to a `pkgs.json` manifest committed into the working
//! tree. Sharing is plain `git push` / `git fetch`; no central server.
//!
//! The crate is a library with a thin CLI on top (`git-pkgs`, also
//! reachable as `git pkgs`). The public modules mirror the architecture:
//! [`git`] wraps the git binary, [`manifest`] owns the document,
//! [`resolver`] owns every graph transition.

pub mod context;
pub mod error;
pub mod git;
pub mod manifest;
pub mod orphan;
pub mod output;
pub mod provenance;
pub mod refs;
pub mod resolver;
pub mod router;
pub mod version;
