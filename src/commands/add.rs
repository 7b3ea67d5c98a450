//! `add` and `add-dir`.

use std::path::Path;

use git_pkgs::context::Context;
use git_pkgs::git::Repository;
use git_pkgs::manifest::Manifest;
use git_pkgs::output::Output;
use git_pkgs::resolver::{PromptPolicy, Resolver};

pub fn handle_add(
    repo: &Repository,
    ctx: &Context,
    manifest: &mut Manifest,
    prompt: &dyn PromptPolicy,
    pkg: &str,
    rev: Option<&str>,
    url: Option<&str>,
) -> anyhow::Result<()> {
    let rev = rev.unwrap_or(&ctx.default_revision);
    let resolver = Resolver::new(repo, ctx, Output::new(ctx.quiet), prompt);
    resolver.add(manifest, pkg, rev, url)
}

#[allow(clippy::too_many_arguments)]
pub fn handle_add_dir(
    repo: &Repository,
    ctx: &Context,
    manifest: &mut Manifest,
    prompt: &dyn PromptPolicy,
    pkg: &str,
    rev: &str,
    path: &Path,
    pkg_type: Option<&str>,
    pkg_url: Option<&str>,
) -> anyhow::Result<()> {
    let resolver = Resolver::new(repo, ctx, Output::new(ctx.quiet), prompt);
    resolver.add_dir(manifest, pkg, rev, path, pkg_type, pkg_url)
}
