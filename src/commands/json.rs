//! `json-export` and `json-import`.

use std::io::Read;
use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;
use serde_json::json;

use git_pkgs::context::Context;
use git_pkgs::git::Repository;
use git_pkgs::manifest::Manifest;
use git_pkgs::output::Output;
use git_pkgs::provenance::Provenance;
use git_pkgs::refs::{HEAD_SNAPSHOT, PkgRef, edge_key, split_namespace};
use git_pkgs::resolver::{PromptPolicy, Resolver};

/// Print the resolved HEAD graph as one JSON document.
pub fn handle_json_export(
    repo: &Repository,
    ctx: &Context,
    manifest: &Manifest,
) -> anyhow::Result<()> {
    let root = manifest.require_name()?;
    let known = manifest.namespaces();
    let mirror = manifest
        .url
        .clone()
        .or_else(|| manifest.repository.clone())
        .or(repo.remote_url("origin")?)
        .unwrap_or_default();

    let mut packages = Vec::new();
    let prefix = PkgRef::snapshot_prefix(root, HEAD_SNAPSHOT);
    for (refname, sha) in repo.iter_refs(&prefix)? {
        let Some(key) = edge_key(&refname, root, HEAD_SNAPSHOT) else {
            continue;
        };
        let (namespace, name) = split_namespace(key, &known);
        if namespace.is_none() && name == root {
            continue;
        }
        let trailers = repo.read_trailers(&sha)?;
        let Some(p) = Provenance::from_trailers(&trailers) else {
            continue;
        };
        let (author, email) = repo.commit_author(&sha)?;
        let description = repo
            .read_blob(&sha, &ctx.manifest_file)?
            .and_then(|bytes| Manifest::from_bytes(&bytes).ok())
            .and_then(|m| m.description);
        packages.push(json!({
            "name": p.name,
            "revision": p.revision,
            "author": author,
            "email": email,
            "description": description,
            "snapshot": sha,
            "reference": p.commit,
            "url": p.url,
            "mirror": mirror,
        }));
    }

    let document = json!({
        "name": root,
        "revision": repo.describe()?,
        "packages": packages,
    });
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

#[derive(Debug, Deserialize)]
struct ImportDocument {
    #[serde(default)]
    packages: Vec<ImportPackage>,
}

#[derive(Debug, Deserialize)]
struct ImportPackage {
    name: String,
    revision: String,
    url: String,
}

/// Replay `add` for every package of an exported document.
pub fn handle_json_import(
    repo: &Repository,
    ctx: &Context,
    manifest: &mut Manifest,
    prompt: &dyn PromptPolicy,
    file: Option<&Path>,
) -> anyhow::Result<()> {
    let contents = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };
    let document: ImportDocument =
        serde_json::from_str(&contents).context("invalid import document")?;

    let resolver = Resolver::new(repo, ctx, Output::new(ctx.quiet), prompt);
    for package in &document.packages {
        resolver.add(
            manifest,
            &package.name,
            &package.revision,
            Some(&package.url),
        )?;
    }
    Ok(())
}
