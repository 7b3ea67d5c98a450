//! `fetch`, `push`, `pull`, `clone`: moving the namespace between
//! repositories.

use std::path::{Path, PathBuf};

use git_pkgs::context::{Context, Overrides, manifest_file};
use git_pkgs::git::{FetchOptions, Repository};
use git_pkgs::manifest::Manifest;
use git_pkgs::output::Output;
use git_pkgs::provenance::Provenance;
use git_pkgs::refs::{HEAD_SNAPSHOT, PkgRef};
use git_pkgs::resolver::{KeepExisting, Resolver};

const PKGS_REFSPEC: &str = "refs/pkgs/*:refs/pkgs/*";
const TAGS_REFSPEC: &str = "refs/tags/*:refs/tags/*";

fn remotes_for(repo: &Repository, remote: Option<&str>, all: bool) -> anyhow::Result<Vec<String>> {
    if all {
        return repo.remotes();
    }
    Ok(vec![remote.unwrap_or("origin").to_string()])
}

pub fn handle_fetch(
    repo: &Repository,
    _ctx: &Context,
    remote: Option<&str>,
    all: bool,
) -> anyhow::Result<()> {
    for remote in remotes_for(repo, remote, all)? {
        repo.fetch(
            &remote,
            &[PKGS_REFSPEC, TAGS_REFSPEC],
            FetchOptions {
                force: true,
                ..FetchOptions::default()
            },
        )?;
    }
    Ok(())
}

/// Ship HEAD, the current release tag and the whole package namespace.
pub fn handle_push(
    repo: &Repository,
    _ctx: &Context,
    manifest: &Manifest,
    remote: Option<&str>,
    all: bool,
) -> anyhow::Result<()> {
    let mut refspecs: Vec<String> = vec!["HEAD".to_string(), PKGS_REFSPEC.to_string()];
    if let Some(version) = &manifest.version {
        let tag = format!("refs/tags/{version}");
        if repo.ref_exists(&tag)? {
            refspecs.push(format!("{tag}:{tag}"));
        }
    }
    let refspecs: Vec<&str> = refspecs.iter().map(String::as_str).collect();
    for remote in remotes_for(repo, remote, all)? {
        repo.push(&remote, &refspecs)?;
    }
    Ok(())
}

/// Fetch, fast-forward the current branch, then re-materialize the live
/// graph so the working tree matches the refs that just arrived.
pub fn handle_pull(
    repo: &Repository,
    ctx: &Context,
    remote: Option<&str>,
) -> anyhow::Result<()> {
    handle_fetch(repo, ctx, remote, false)?;
    repo.run(&["pull", "--ff-only", remote.unwrap_or("origin")])?;
    // The pull may have replaced the manifest; re-route from disk.
    let manifest = Manifest::load(&repo.workdir().join(&ctx.manifest_file))?;
    let resolver = Resolver::new(repo, ctx, Output::new(ctx.quiet), &KeepExisting);
    resolver.checkout(&manifest, HEAD_SNAPSHOT)?;
    Ok(())
}

/// Bootstrap a repository: clone, pull in the package namespace, configure
/// the root name from the cloned tip's trailers and check out HEAD.
pub fn handle_clone(url: &str, directory: Option<&Path>, quiet: bool) -> anyhow::Result<()> {
    let directory: PathBuf = match directory {
        Some(dir) => dir.to_path_buf(),
        None => PathBuf::from(
            url.trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or(url)
                .trim_end_matches(".git"),
        ),
    };
    let repo = Repository::clone_repo(url, &directory)?;
    repo.fetch(
        "origin",
        &[PKGS_REFSPEC],
        FetchOptions {
            force: true,
            ..FetchOptions::default()
        },
    )?;

    let file = manifest_file(None);
    let manifest_path = repo.workdir().join(&file);
    let mut manifest = Manifest::load(&manifest_path)?;

    // The tip commit knows which package owns this repository.
    if let Some(tip) = repo.resolve("HEAD")? {
        let trailers = repo.read_trailers(&tip)?;
        if let Some(p) = Provenance::from_trailers(&trailers) {
            if manifest.name.as_deref() != Some(p.name.as_str()) {
                manifest.name = Some(p.name.clone());
                manifest.save(&manifest_path)?;
            }
        }
    }

    if manifest.name.is_none() {
        // Nothing to materialize without a root; leave the plain clone.
        return Ok(());
    }

    let ctx = Context::build(
        Overrides {
            quiet,
            ..Overrides::default()
        },
        &manifest,
        file,
    );
    // A fresh clone has no HEAD edges of its own until the namespace fetch
    // above; skip checkout when the origin never used git-pkgs.
    let root = manifest.require_name()?;
    let head_prefix = PkgRef::snapshot_prefix(root, HEAD_SNAPSHOT);
    if repo.iter_refs(&head_prefix)?.is_empty() {
        return Ok(());
    }
    let resolver = Resolver::new(&repo, &ctx, Output::new(quiet), &KeepExisting);
    resolver.checkout(&manifest, HEAD_SNAPSHOT)?;
    Ok(())
}
