//! `checkout`.

use git_pkgs::context::Context;
use git_pkgs::git::Repository;
use git_pkgs::manifest::Manifest;
use git_pkgs::output::Output;
use git_pkgs::resolver::{KeepExisting, Resolver};

pub fn handle_checkout(
    repo: &Repository,
    ctx: &Context,
    manifest: &Manifest,
    rev: &str,
) -> anyhow::Result<()> {
    let resolver = Resolver::new(repo, ctx, Output::new(ctx.quiet), &KeepExisting);
    resolver.checkout(manifest, rev)?;
    Ok(())
}
