//! Dependency graph reconciliation.
//!
//! The resolver owns every transition of the `refs/pkgs/` namespace: adding
//! and removing edges, folding transitive edges into HEAD, releasing
//! snapshots and checking them out again. It works one level at a time:
//! each imported revision already carries the full frozen graph it was
//! released with (its transitive refs live under its own namespace), so a
//! fold only ever merges one dependency's announcements into HEAD.

mod strategy;
mod traverse;

pub use strategy::{Choice, KeepExisting, PromptPolicy, StdinPrompt, Strategy, pick};
pub use traverse::{TreeNode, traverse};

use std::path::PathBuf;

use anyhow::Context as _;

use crate::context::Context;
use crate::error::Error;
use crate::git::{FetchOptions, FetchRecord, RefUpdate, Repository};
use crate::manifest::Manifest;
use crate::orphan::orphanize;
use crate::output::Output;
use crate::provenance::Provenance;
use crate::refs::{HEAD_SNAPSHOT, PkgRef, edge_key};
use crate::router::{Route, Router};

pub struct Resolver<'a> {
    repo: &'a Repository,
    ctx: &'a Context,
    out: Output,
    prompt: &'a dyn PromptPolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(
        repo: &'a Repository,
        ctx: &'a Context,
        out: Output,
        prompt: &'a dyn PromptPolicy,
    ) -> Self {
        Resolver {
            repo,
            ctx,
            out,
            prompt,
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.repo.workdir().join(&self.ctx.manifest_file)
    }

    fn router(&self, root: &str, manifest: &Manifest) -> Router {
        Router::new(
            root,
            &self.ctx.prefix,
            manifest,
            self.ctx.effective_ref_suffix(),
        )
    }

    /// `add <pkg> <rev> [url]`: import a revision and reconcile its graph
    /// into HEAD.
    pub fn add(
        &self,
        manifest: &mut Manifest,
        pkg: &str,
        rev: &str,
        url: Option<&str>,
    ) -> anyhow::Result<()> {
        let root = manifest.require_name()?.to_string();
        let url = match url {
            Some(url) => url.to_string(),
            None => self.known_url(pkg)?,
        };

        // Bring over whatever graph the origin has already resolved for
        // this revision.
        let revision_glob = format!(
            "{0}*:{0}*",
            PkgRef::revision_prefix(pkg, rev)
        );
        self.repo.fetch(
            &url,
            &[&revision_glob],
            FetchOptions {
                force: true,
                no_tags: true,
                ..FetchOptions::default()
            },
        )?;

        let orphan_ref = PkgRef::orphan(pkg, rev);
        if self.needs_import(&orphan_ref, pkg, rev)? {
            // The origin has no orphan for this revision; take the tree
            // directly from the revision itself, shallow.
            let spec = format!("{rev}:{orphan_ref}");
            self.repo.fetch(
                &url,
                &[&spec],
                FetchOptions {
                    depth: Some(self.ctx.depth.unwrap_or(1)),
                    force: true,
                    no_tags: true,
                    ..FetchOptions::default()
                },
            )?;
            let fetched = self
                .repo
                .resolve(orphan_ref.as_str())?
                .ok_or_else(|| Error::RefMissing {
                    refname: orphan_ref.to_string(),
                })?;
            let provenance = Provenance {
                name: pkg.to_string(),
                pkg_type: self.ctx.pkg_type.clone(),
                revision: rev.to_string(),
                commit: Some(fetched),
                url: url.clone(),
            };
            orphanize(self.repo, orphan_ref.as_str(), &provenance)?;
        }

        let orphan_sha = self
            .repo
            .resolve(orphan_ref.as_str())?
            .ok_or_else(|| Error::RefMissing {
                refname: orphan_ref.to_string(),
            })?;
        self.repo
            .update_ref(PkgRef::pkg_head(pkg).as_str(), &orphan_sha)?;

        manifest.add_dep(pkg, rev, self.ctx.namespace.as_deref());
        self.fold(manifest, &root, pkg, rev)?;
        manifest.save(&self.manifest_path())?;
        Ok(())
    }

    /// `add-dir <pkg> <rev> <path>`: import a local directory as an orphan,
    /// optionally injecting a synthetic manifest, then reconcile like `add`.
    pub fn add_dir(
        &self,
        manifest: &mut Manifest,
        pkg: &str,
        rev: &str,
        dir: &std::path::Path,
        pkg_type: Option<&str>,
        url: Option<&str>,
    ) -> anyhow::Result<()> {
        let root = manifest.require_name()?.to_string();
        let url = url
            .map(str::to_string)
            .unwrap_or_else(|| dir.to_string_lossy().into_owned());

        let injected = self.ctx.import_config_json.as_deref();
        if let Some(json) = injected {
            // Fail before writing anything if the inline manifest is junk.
            Manifest::from_bytes(json.as_bytes())
                .context("PKGS_IMPORT_CONFIG_JSON is not a valid manifest")?;
        }
        let extra: Vec<(&str, &[u8])> = injected
            .map(|json| vec![(self.ctx.manifest_file.as_str(), json.as_bytes())])
            .unwrap_or_default();

        let tree = self.repo.write_tree_from_dir(dir, &extra)?;
        let provenance = Provenance {
            name: pkg.to_string(),
            pkg_type: pkg_type.unwrap_or(&self.ctx.pkg_type).to_string(),
            revision: rev.to_string(),
            commit: None,
            url,
        };
        let message = crate::provenance::append_trailers(
            &format!("Import {pkg} {rev}"),
            &provenance.trailers(),
        );
        let orphan = self.repo.commit_tree(&tree, &[], &message)?;

        let orphan_ref = PkgRef::orphan(pkg, rev);
        self.repo.update_ref(orphan_ref.as_str(), &orphan)?;
        self.repo
            .update_ref(PkgRef::pkg_head(pkg).as_str(), &orphan)?;

        manifest.add_dep(pkg, rev, self.ctx.namespace.as_deref());
        self.fold(manifest, &root, pkg, rev)?;
        manifest.save(&self.manifest_path())?;
        Ok(())
    }

    /// `remove <pkg>`: drop a direct edge and restore whatever its
    /// transitive closure is still needed for from the remaining parents.
    pub fn remove(&self, manifest: &mut Manifest, pkg: &str) -> anyhow::Result<()> {
        let root = manifest.require_name()?.to_string();
        let namespace = self.ctx.namespace.as_deref();

        let head_ref = PkgRef::root_head(&root, namespace, pkg);
        let head_sha = self
            .repo
            .resolve(head_ref.as_str())?
            .ok_or_else(|| Error::RefMissing {
                refname: head_ref.to_string(),
            })?;

        let trailers = self.repo.read_trailers(&head_sha)?;
        let provenance = Provenance::from_trailers(&trailers);
        let rev = provenance
            .as_ref()
            .map(|p| p.revision.clone())
            .unwrap_or_default();

        // Direct means: imported as a root (its own orphan ref names this
        // commit) and listed in the manifest.
        let orphan_matches = self
            .repo
            .resolve(PkgRef::orphan(pkg, &rev).as_str())?
            .map(|sha| sha == head_sha)
            .unwrap_or(false);
        if !orphan_matches || manifest.dep_revision(pkg, namespace).is_none() {
            return Err(Error::NotDirectDep {
                pkg: pkg.to_string(),
            }
            .into());
        }

        let router = self.router(&root, manifest);

        // Tear down every edge this package announced, the package itself
        // included.
        let announced_prefix = PkgRef::revision_prefix(pkg, &rev);
        let mut deleted: Vec<String> = Vec::new();
        for (refname, _) in self.repo.iter_refs(&announced_prefix)? {
            let Some(dep) = refname.strip_prefix(&announced_prefix) else {
                continue;
            };
            let head_dep = PkgRef::root_head(&root, namespace, dep);
            if self.repo.resolve(head_dep.as_str())?.is_none() {
                continue;
            }
            let key = match namespace {
                Some(ns) => format!("{ns}/{dep}"),
                None => dep.to_string(),
            };
            if let Route::Path(path) = router.route(&key) {
                self.repo.dematerialize_worktree(&path)?;
            }
            self.repo.delete_ref(head_dep.as_str())?;
            self.out.action("remove", dep);
            deleted.push(dep.to_string());
        }

        manifest.remove_dep(pkg, namespace);

        // Anything still needed comes back from the remaining parents,
        // through the ordinary conflict resolution.
        for dep in &deleted {
            let parents: Vec<(Option<String>, String, String)> = manifest
                .direct_deps()
                .map(|(ns, name, rev)| (ns.map(str::to_string), name.to_string(), rev.to_string()))
                .collect();
            for (parent_ns, parent, parent_rev) in parents {
                let candidate = PkgRef::transitive(&parent, &parent_rev, dep);
                if !self.repo.ref_exists(candidate.as_str())? {
                    continue;
                }
                let target = PkgRef::root_head(&root, parent_ns.as_deref(), dep);
                if let Some(record) = self.repo.copy_ref(candidate.as_str(), target.as_str())? {
                    self.resolve_record(manifest, &root, &record)?;
                }
            }
        }

        manifest.save(&self.manifest_path())?;
        Ok(())
    }

    /// `release <rev>`: freeze HEAD into a versioned snapshot and tag it.
    pub fn release(&self, manifest: &mut Manifest, rev: &str) -> anyhow::Result<()> {
        let root = manifest.require_name()?.to_string();
        manifest.version = Some(rev.to_string());
        manifest.save(&self.manifest_path())?;
        self.repo.run(&["add", "--", &self.ctx.manifest_file])?;

        let url = self.root_url(manifest)?;
        let commit_provenance = Provenance {
            name: root.clone(),
            pkg_type: self.ctx.pkg_type.clone(),
            revision: rev.to_string(),
            commit: None,
            url: url.clone(),
        };
        let subject = self
            .ctx
            .message
            .clone()
            .unwrap_or_else(|| format!("release: {root} {rev}"));
        let message =
            crate::provenance::append_trailers(&subject, &commit_provenance.trailers());
        self.repo
            .run(&["commit", "--allow-empty", "-m", &message])?;
        self.repo.tag(rev, "HEAD", true)?;
        let released = self
            .repo
            .resolve("HEAD")?
            .ok_or_else(|| Error::RefMissing {
                refname: "HEAD".to_string(),
            })?;

        // Snapshot the namespace in one atomic transaction.
        let head_prefix = PkgRef::snapshot_prefix(&root, HEAD_SNAPSHOT);
        let snap_prefix = PkgRef::snapshot_prefix(&root, rev);
        let mut updates: Vec<RefUpdate> = Vec::new();
        for (refname, sha) in self.repo.iter_refs(&head_prefix)? {
            if let Some(rest) = refname.strip_prefix(&head_prefix) {
                // The root's own entry is written below, freshly released.
                if rest == root {
                    continue;
                }
                updates.push(RefUpdate::Set {
                    refname: format!("{snap_prefix}{rest}"),
                    sha,
                });
            }
        }
        let root_entry = PkgRef::edge(&root, rev, None, &root);
        updates.push(RefUpdate::Set {
            refname: root_entry.to_string(),
            sha: released.clone(),
        });
        self.repo.update_refs(&updates)?;

        // The root's own entry becomes an orphan like any dependency's.
        let orphan_provenance = Provenance {
            commit: Some(released),
            ..commit_provenance
        };
        let orphan = orphanize(self.repo, root_entry.as_str(), &orphan_provenance)?;
        self.repo
            .update_ref(PkgRef::root_head(&root, None, &root).as_str(), &orphan)?;

        self.out.action("release", format!("{root} {rev}"));
        Ok(())
    }

    /// `checkout <rev>`: replace the HEAD namespace and working tree with a
    /// released snapshot. Returns the manifest as restored on disk.
    pub fn checkout(&self, manifest: &Manifest, rev: &str) -> anyhow::Result<Manifest> {
        let root = manifest.require_name()?.to_string();
        let snap_prefix = PkgRef::snapshot_prefix(&root, rev);
        if self.repo.iter_refs(&snap_prefix)?.is_empty() {
            return Err(Error::RefMissing {
                refname: format!("{snap_prefix}*"),
            }
            .into());
        }

        self.repo.run(&["checkout", rev])?;
        // The checkout may have replaced the manifest on disk; routing must
        // follow the restored document.
        let restored = Manifest::load(&self.manifest_path())?;
        let router = self.router(&root, &restored);

        let head_prefix = PkgRef::snapshot_prefix(&root, HEAD_SNAPSHOT);
        if rev != HEAD_SNAPSHOT {
            let mut deletions: Vec<RefUpdate> = Vec::new();
            for (refname, _) in self.repo.iter_refs(&head_prefix)? {
                let Some(key) = edge_key(&refname, &root, HEAD_SNAPSHOT) else {
                    continue;
                };
                if key != root {
                    if let Route::Path(path) = router.route(key) {
                        self.repo.dematerialize_worktree(&path)?;
                    }
                }
                deletions.push(RefUpdate::Delete { refname });
            }
            self.repo.update_refs(&deletions)?;
        }

        self.repo.copy_refs(&snap_prefix, &head_prefix)?;

        for (refname, sha) in self.repo.iter_refs(&head_prefix)? {
            let Some(key) = edge_key(&refname, &root, HEAD_SNAPSHOT) else {
                continue;
            };
            if key == root {
                continue;
            }
            if let Route::Path(path) = router.route(key) {
                self.repo.materialize_worktree(&path, &sha)?;
            }
        }
        Ok(restored)
    }

    /// Fold every edge announced by `<src_pkg>@<src_rev>` into HEAD.
    fn fold(
        &self,
        manifest: &mut Manifest,
        root: &str,
        src_pkg: &str,
        src_rev: &str,
    ) -> anyhow::Result<()> {
        let src_prefix = PkgRef::revision_prefix(src_pkg, src_rev);
        let head_prefix = PkgRef::snapshot_prefix(root, HEAD_SNAPSHOT);
        let dst_prefix = match &self.ctx.namespace {
            Some(ns) => format!("{head_prefix}{ns}/"),
            None => head_prefix,
        };
        let records = self.repo.copy_refs(&src_prefix, &dst_prefix)?;
        for record in &records {
            self.resolve_record(manifest, root, record)?;
        }
        Ok(())
    }

    /// Decide the fate of one copied edge against HEAD; the record is the
    /// incoming side.
    fn resolve_record(
        &self,
        manifest: &Manifest,
        root: &str,
        record: &FetchRecord,
    ) -> anyhow::Result<()> {
        let target = record.local_ref.as_str();
        let Some(full_key) = edge_key(target, root, HEAD_SNAPSHOT) else {
            return Ok(());
        };
        // Namespace directory aside, a dependency on the root itself is a
        // cycle back to us; drop it.
        let known = manifest.namespaces();
        let (_, bare_key) = crate::refs::split_namespace(full_key, &known);
        if bare_key == root {
            self.revert(record)?;
            return Ok(());
        }

        let incoming = self.edge_revision(&record.new)?.ok_or_else(|| {
            anyhow::anyhow!("{target} does not carry git-pkgs trailers")
        })?;
        let existing = match &record.old {
            Some(old) => self.edge_revision(old)?,
            None => None,
        };

        match pick(
            existing.as_deref(),
            &incoming,
            self.ctx.strategy,
            bare_key,
            self.prompt,
        ) {
            Choice::Existing => {
                let existing = existing.expect("existing choice implies an existing edge");
                if existing == incoming
                    && record.old.as_deref() != Some(record.new.as_str())
                {
                    self.out.warn(format!(
                        "{bare_key} {existing}: same revision, different snapshot; keeping the existing one"
                    ));
                }
                self.revert(record)?;
                self.out.action("keep", format!("{bare_key} {existing}"));
            }
            Choice::Incoming => {
                let verb = if existing.is_some() { "update" } else { "add" };
                self.out.action(verb, format!("{bare_key} {incoming}"));
                let router = self.router(root, manifest);
                if let Route::Path(path) = router.route(full_key) {
                    self.repo.materialize_worktree(&path, &record.new)?;
                }
            }
        }
        Ok(())
    }

    /// Undo a record's ref movement, restoring the pre-copy state of the
    /// target.
    fn revert(&self, record: &FetchRecord) -> anyhow::Result<()> {
        if !record.moved() {
            return Ok(());
        }
        match &record.old {
            Some(old) => self.repo.update_ref(&record.local_ref, old),
            None => self.repo.delete_ref(&record.local_ref),
        }
    }

    fn edge_revision(&self, sha: &str) -> anyhow::Result<Option<String>> {
        let trailers = self.repo.read_trailers(sha)?;
        Ok(Provenance::from_trailers(&trailers).map(|p| p.revision))
    }

    fn needs_import(&self, orphan_ref: &PkgRef, pkg: &str, rev: &str) -> anyhow::Result<bool> {
        let Some(sha) = self.repo.resolve(orphan_ref.as_str())? else {
            return Ok(true);
        };
        let trailers = self.repo.read_trailers(&sha)?;
        Ok(Provenance::from_trailers(&trailers)
            .map(|p| !(p.name == pkg && p.revision == rev))
            .unwrap_or(true))
    }

    /// URL reuse for `add` without an explicit URL: the most recently
    /// imported orphan of the package knows where it came from.
    fn known_url(&self, pkg: &str) -> anyhow::Result<String> {
        let mut candidates = vec![PkgRef::pkg_head(pkg).to_string()];
        candidates.extend(
            self.repo
                .iter_refs(&PkgRef::pkg_prefix(pkg))?
                .into_iter()
                .map(|(refname, _)| refname),
        );
        for refname in candidates {
            if let Some(sha) = self.repo.resolve(&refname)? {
                let trailers = self.repo.read_trailers(&sha)?;
                if let Some(p) = Provenance::from_trailers(&trailers) {
                    if p.name == pkg && !p.url.is_empty() {
                        return Ok(p.url);
                    }
                }
            }
        }
        Err(Error::BadArgs {
            detail: format!("no known url for '{pkg}'; pass one explicitly"),
        }
        .into())
    }

    /// The root package's own URL for provenance and export: manifest
    /// `url`, then `repository`, then the origin remote.
    fn root_url(&self, manifest: &Manifest) -> anyhow::Result<String> {
        if let Some(url) = manifest.url.clone().or_else(|| manifest.repository.clone()) {
            return Ok(url);
        }
        Ok(self.repo.remote_url("origin")?.unwrap_or_default())
    }
}
