//! `status` and `show`: projections over the HEAD namespace.

use git_pkgs::context::Context;
use git_pkgs::git::Repository;
use git_pkgs::manifest::{Manifest, dep_key};
use git_pkgs::output::Output;
use git_pkgs::provenance::Provenance;
use git_pkgs::refs::{HEAD_SNAPSHOT, PkgRef, edge_key, split_namespace};
use git_pkgs::router::{Route, Router};
use git_pkgs::version::cmp_revisions;

pub fn handle_status(
    repo: &Repository,
    ctx: &Context,
    manifest: &Manifest,
) -> anyhow::Result<()> {
    let root = manifest.require_name()?;
    let router = Router::new(root, &ctx.prefix, manifest, ctx.effective_ref_suffix());
    let known = manifest.namespaces();
    let out = Output::new(ctx.quiet);

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
        let revision = Provenance::from_trailers(&trailers)
            .map(|p| p.revision)
            .unwrap_or_default();
        let kind = if manifest.dep_revision(name, namespace).is_some() {
            "direct"
        } else {
            "transitive"
        };
        let location = match router.route(key) {
            Route::Path(path) => path.display().to_string(),
            Route::Skip => "-".to_string(),
        };
        out.line(format!(
            "{} {revision} {kind} {location}",
            dep_key(namespace, name)
        ));
    }
    Ok(())
}

pub fn handle_show(
    repo: &Repository,
    ctx: &Context,
    manifest: &Manifest,
    pkg: &str,
) -> anyhow::Result<()> {
    let root = manifest.require_name()?;
    let out = Output::new(ctx.quiet);

    let head_edge = PkgRef::root_head(root, ctx.namespace.as_deref(), pkg);
    if let Some(sha) = repo.resolve(head_edge.as_str())? {
        let trailers = repo.read_trailers(&sha)?;
        if let Some(p) = Provenance::from_trailers(&trailers) {
            out.line(format!("name: {}", p.name));
            out.line(format!("type: {}", p.pkg_type));
            out.line(format!("revision: {}", p.revision));
            if let Some(commit) = &p.commit {
                out.line(format!("commit: {commit}"));
            }
            out.line(format!("url: {}", p.url));
            out.line(format!("snapshot: {sha}"));
        }
    }

    // Every revision this repository has an orphan for.
    let prefix = PkgRef::pkg_prefix(pkg);
    let orphan_suffix = format!("/{pkg}");
    let mut revisions: Vec<String> = Vec::new();
    for (refname, _) in repo.iter_refs(&prefix)? {
        let Some(rest) = refname.strip_prefix(&prefix) else {
            continue;
        };
        let Some(rev) = rest.strip_suffix(&orphan_suffix) else {
            continue;
        };
        if rev == HEAD_SNAPSHOT || rev.is_empty() {
            continue;
        }
        if !revisions.iter().any(|seen| seen == rev) {
            revisions.push(rev.to_string());
        }
    }
    revisions.sort_by(|a, b| cmp_revisions(a, b));
    if !revisions.is_empty() {
        out.line(format!("revisions: {}", revisions.join(" ")));
    }
    Ok(())
}
