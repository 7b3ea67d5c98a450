//! `remove`.

use git_pkgs::context::Context;
use git_pkgs::git::Repository;
use git_pkgs::manifest::Manifest;
use git_pkgs::output::Output;
use git_pkgs::resolver::{PromptPolicy, Resolver};

pub fn handle_remove(
    repo: &Repository,
    ctx: &Context,
    manifest: &mut Manifest,
    prompt: &dyn PromptPolicy,
    pkg: &str,
) -> anyhow::Result<()> {
    let resolver = Resolver::new(repo, ctx, Output::new(ctx.quiet), prompt);
    resolver.remove(manifest, pkg)
}
