use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser};

use git_pkgs::context::{Context, Overrides, manifest_file};
use git_pkgs::git::Repository;
use git_pkgs::manifest::Manifest;
use git_pkgs::resolver::StdinPrompt;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{
    handle_add, handle_add_dir, handle_checkout, handle_clone, handle_config, handle_fetch,
    handle_json_export, handle_json_import, handle_ls_releases, handle_prune, handle_pull,
    handle_push, handle_release, handle_remove, handle_show, handle_status, handle_tree,
};

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose > 0 { "debug" } else { "off" }),
    )
    .format_timestamp(None)
    .format_target(false)
    .init();

    if let Err(e) = run(cli) {
        eprintln!("fatal: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    Repository::require_supported_git()?;

    // Two commands work without an existing repository.
    match &cli.command {
        Commands::Completions { shell } => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                "git-pkgs",
                &mut std::io::stdout(),
            );
            return Ok(());
        }
        Commands::Clone { url, directory } => {
            return handle_clone(url, directory.as_deref(), cli.quiet);
        }
        _ => {}
    }

    let base = cli.directory.clone().unwrap_or_else(|| PathBuf::from("."));
    let repo = Repository::discover(base)?;
    let file = manifest_file(cli.config.as_ref());
    let mut manifest = Manifest::load(&repo.workdir().join(&file))?;
    let ctx = Context::build(
        Overrides {
            quiet: cli.quiet,
            prefix: cli.prefix.clone(),
            strategy: cli.strategy,
            namespace: cli.namespace.clone(),
            message: cli.message.clone(),
            pkg_type: cli.pkg_type.clone(),
            depth: cli.depth,
        },
        &manifest,
        file,
    );
    let prompt = StdinPrompt;

    match cli.command {
        Commands::Add { pkg, rev, url } => handle_add(
            &repo,
            &ctx,
            &mut manifest,
            &prompt,
            &pkg,
            rev.as_deref(),
            url.as_deref(),
        ),
        Commands::AddDir { pkg, rev, path } => {
            let name = cli.pkg_name.as_deref().unwrap_or(&pkg);
            let rev = cli.pkg_revision.as_deref().unwrap_or(&rev);
            handle_add_dir(
                &repo,
                &ctx,
                &mut manifest,
                &prompt,
                name,
                rev,
                &path,
                cli.pkg_type.as_deref(),
                cli.pkg_url.as_deref(),
            )
        }
        Commands::Remove { pkg } => handle_remove(&repo, &ctx, &mut manifest, &prompt, &pkg),
        Commands::Release { rev } => handle_release(&repo, &ctx, &mut manifest, &rev),
        Commands::Checkout { rev } => handle_checkout(&repo, &ctx, &manifest, &rev),
        Commands::Tree { rev } => handle_tree(&repo, &ctx, &manifest, rev.as_deref()),
        Commands::Status => handle_status(&repo, &ctx, &manifest),
        Commands::Show { pkg } => handle_show(&repo, &ctx, &manifest, &pkg),
        Commands::LsReleases => handle_ls_releases(&repo, &ctx, &manifest),
        Commands::Prune { pkg, rev } => handle_prune(&repo, &ctx, &manifest, &pkg, rev.as_deref()),
        Commands::Fetch { remote, all } => handle_fetch(&repo, &ctx, remote.as_deref(), all),
        Commands::Push { remote, all } => {
            handle_push(&repo, &ctx, &manifest, remote.as_deref(), all)
        }
        Commands::Pull { remote } => handle_pull(&repo, &ctx, remote.as_deref()),
        Commands::JsonImport { file } => {
            handle_json_import(&repo, &ctx, &mut manifest, &prompt, file.as_deref())
        }
        Commands::JsonExport => handle_json_export(&repo, &ctx, &manifest),
        Commands::Config { action } => handle_config(&repo, &ctx, &mut manifest, &action),
        Commands::Clone { .. } | Commands::Completions { .. } => unreachable!("handled above"),
    }
}
