//! `release` and `ls-releases`.

use git_pkgs::context::Context;
use git_pkgs::git::Repository;
use git_pkgs::manifest::Manifest;
use git_pkgs::output::Output;
use git_pkgs::refs::{HEAD_SNAPSHOT, PkgRef};
use git_pkgs::resolver::{KeepExisting, Resolver};
use git_pkgs::version::cmp_revisions;

pub fn handle_release(
    repo: &Repository,
    ctx: &Context,
    manifest: &mut Manifest,
    rev: &str,
) -> anyhow::Result<()> {
    let resolver = Resolver::new(repo, ctx, Output::new(ctx.quiet), &KeepExisting);
    resolver.release(manifest, rev)
}

pub fn handle_ls_releases(
    repo: &Repository,
    ctx: &Context,
    manifest: &Manifest,
) -> anyhow::Result<()> {
    let root = manifest.require_name()?;
    let prefix = PkgRef::pkg_prefix(root);
    let mut releases: Vec<String> = Vec::new();
    for (refname, _) in repo.iter_refs(&prefix)? {
        let Some(rest) = refname.strip_prefix(&prefix) else {
            continue;
        };
        let Some((snapshot, _)) = rest.split_once('/') else {
            continue;
        };
        if snapshot == HEAD_SNAPSHOT {
            continue;
        }
        if !releases.iter().any(|seen| seen == snapshot) {
            releases.push(snapshot.to_string());
        }
    }
    releases.sort_by(|a, b| cmp_revisions(a, b));

    let out = Output::new(ctx.quiet);
    for release in releases {
        out.line(release);
    }
    Ok(())
}
