//! Breadth-first dependency traversal for `tree`.
//!
//! Children of a node are read out of the manifest blob stored inside its
//! orphan commit; the traversal never touches the network. Cycles and
//! diamonds are broken by a visited set over package names: the first
//! appearance of a package expands, every later appearance is emitted as a
//! leaf with the `deduped` marker.

use std::collections::{HashSet, VecDeque};

use crate::git::Repository;
use crate::manifest::Manifest;
use crate::refs::{HEAD_SNAPSHOT, PkgRef};

/// One traversal line. `ancestry` is the colon-joined path from the root
/// down to this node, suitable as a stable key for downstream formatters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub ancestry: String,
    pub name: String,
    pub revision: String,
    pub deduped: bool,
}

impl TreeNode {
    pub fn depth(&self) -> usize {
        self.ancestry.matches(':').count()
    }
}

/// Walk the graph from `(root, rev)`. When `rev` is `HEAD` the root's
/// children come from the working-tree manifest (the live, unreleased
/// graph); released nodes always read the manifest frozen into their
/// orphan.
pub fn traverse(
    repo: &Repository,
    manifest_file: &str,
    working_manifest: &Manifest,
    root: &str,
    rev: &str,
) -> anyhow::Result<Vec<TreeNode>> {
    let mut nodes = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<TreeNode> = VecDeque::new();
    queue.push_back(TreeNode {
        ancestry: root.to_string(),
        name: root.to_string(),
        revision: rev.to_string(),
        deduped: false,
    });

    while let Some(mut node) = queue.pop_front() {
        node.deduped = !visited.insert(node.name.clone());
        let expand = !node.deduped;
        let ancestry = node.ancestry.clone();
        let name = node.name.clone();
        let revision = node.revision.clone();
        nodes.push(node);
        if !expand {
            continue;
        }

        let manifest = if name == root && revision == HEAD_SNAPSHOT {
            working_manifest.clone()
        } else {
            node_manifest(repo, manifest_file, &name, &revision)?
        };
        for (_, dep, dep_rev) in manifest.direct_deps() {
            queue.push_back(TreeNode {
                ancestry: format!("{ancestry}:{dep}"),
                name: dep.to_string(),
                revision: dep_rev.to_string(),
                deduped: false,
            });
        }
    }
    Ok(nodes)
}

fn node_manifest(
    repo: &Repository,
    manifest_file: &str,
    name: &str,
    rev: &str,
) -> anyhow::Result<Manifest> {
    let orphan = PkgRef::orphan(name, rev);
    if repo.resolve(orphan.as_str())?.is_none() {
        return Ok(Manifest::default());
    }
    match repo.read_blob(orphan.as_str(), manifest_file)? {
        Some(bytes) => Manifest::from_bytes(&bytes),
        None => Ok(Manifest::default()),
    }
}
