//! `config`: dotted-path access to the manifest. `config add name <name>`
//! is how a repository enters the system — the write creates the manifest.

use git_pkgs::context::Context;
use git_pkgs::git::Repository;
use git_pkgs::manifest::Manifest;
use git_pkgs::output::Output;

use crate::cli::ConfigCommand;

pub fn handle_config(
    repo: &Repository,
    ctx: &Context,
    manifest: &mut Manifest,
    action: &ConfigCommand,
) -> anyhow::Result<()> {
    match action {
        ConfigCommand::Add { key, value } => {
            manifest.set(key, value)?;
            manifest.save(&repo.workdir().join(&ctx.manifest_file))?;
        }
        ConfigCommand::Get { key } => {
            if let Some(value) = manifest.get(key) {
                Output::new(ctx.quiet).line(value);
            }
        }
    }
    Ok(())
}
