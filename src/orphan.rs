//! Converting fetched revisions into provenance-carrying orphan commits.
//!
//! An orphan is a parentless commit whose tree is byte-identical to the
//! imported revision's tree and whose message gained the `git-pkgs-*`
//! trailers. Once a ref points at an orphan it is never rewritten for the
//! same `(name, revision)` pair, which is what makes repeated imports
//! converge.

use anyhow::Context;

use crate::error::Error;
use crate::git::Repository;
use crate::provenance::{Provenance, append_trailers};

/// Replace `refname` (currently naming any commit) with an orphan carrying
/// `provenance`. Returns the orphan's commit id. Skips the rewrite when the
/// ref already satisfies the orphan invariant for this revision.
pub fn orphanize(
    repo: &Repository,
    refname: &str,
    provenance: &Provenance,
) -> anyhow::Result<String> {
    let sha = repo
        .resolve(refname)?
        .ok_or_else(|| Error::RefMissing {
            refname: refname.to_string(),
        })?;

    if is_matching_orphan(repo, &sha, provenance)? {
        log::debug!("{refname} already orphanized at {sha}");
        return Ok(sha);
    }

    let tree = repo.commit_tree_of(&sha)?;
    let message = repo.commit_message(&sha)?;
    let message = append_trailers(&message, &provenance.trailers());
    let orphan = repo
        .commit_tree(&tree, &[], &message)
        .context("failed to create orphan commit")?;
    repo.update_ref(refname, &orphan)?;
    Ok(orphan)
}

/// Whether `sha` is already a parentless commit whose trailers match the
/// wanted name and revision.
pub fn is_matching_orphan(
    repo: &Repository,
    sha: &str,
    provenance: &Provenance,
) -> anyhow::Result<bool> {
    if !repo.commit_parents(sha)?.is_empty() {
        return Ok(false);
    }
    let trailers = repo.read_trailers(sha)?;
    Ok(Provenance::from_trailers(&trailers)
        .map(|found| found.name == provenance.name && found.revision == provenance.revision)
        .unwrap_or(false))
}
