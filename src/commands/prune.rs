//! `prune`: the only way orphan refs are garbage-collected.

use std::collections::HashSet;

use git_pkgs::context::Context;
use git_pkgs::git::{RefUpdate, Repository};
use git_pkgs::manifest::Manifest;
use git_pkgs::output::Output;
use git_pkgs::refs::PkgRef;

/// Delete refs under `refs/pkgs/<pkg>/[<rev>/]` whose commits are not
/// referenced by any snapshot of the root (HEAD included). Referenced
/// entries survive so released graphs stay checkout-able.
pub fn handle_prune(
    repo: &Repository,
    ctx: &Context,
    manifest: &Manifest,
    pkg: &str,
    rev: Option<&str>,
) -> anyhow::Result<()> {
    let root = manifest.require_name()?;

    let referenced: HashSet<String> = repo
        .iter_refs(&PkgRef::pkg_prefix(root))?
        .into_iter()
        .map(|(_, sha)| sha)
        .collect();

    let prefix = match rev {
        Some(rev) => PkgRef::revision_prefix(pkg, rev),
        None => PkgRef::pkg_prefix(pkg),
    };

    let out = Output::new(ctx.quiet);
    let mut deletions: Vec<RefUpdate> = Vec::new();
    for (refname, sha) in repo.iter_refs(&prefix)? {
        if referenced.contains(&sha) {
            continue;
        }
        out.action("prune", &refname);
        deletions.push(RefUpdate::Delete { refname });
    }
    repo.update_refs(&deletions)?;
    Ok(())
}
