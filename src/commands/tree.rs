//! `tree`: traversal plus a thin glyph formatter.

use git_pkgs::context::Context;
use git_pkgs::git::Repository;
use git_pkgs::manifest::Manifest;
use git_pkgs::output::Output;
use git_pkgs::refs::HEAD_SNAPSHOT;
use git_pkgs::resolver::{TreeNode, traverse};

pub fn handle_tree(
    repo: &Repository,
    ctx: &Context,
    manifest: &Manifest,
    rev: Option<&str>,
) -> anyhow::Result<()> {
    let root = manifest.require_name()?;
    let rev = rev.unwrap_or(HEAD_SNAPSHOT);
    let nodes = traverse(repo, &ctx.manifest_file, manifest, root, rev)?;
    let out = Output::new(ctx.quiet);
    for line in render(&nodes) {
        out.line(line);
    }
    Ok(())
}

/// Render traversal nodes as a glyph tree. The traversal is breadth-first;
/// rendering regroups children under their ancestry key and walks
/// depth-first so siblings stay together.
fn render(nodes: &[TreeNode]) -> Vec<String> {
    let mut lines = Vec::new();
    let Some(root) = nodes.first() else {
        return lines;
    };
    lines.push(format!("{}@{}", root.name, root.revision));
    render_children(nodes, &root.ancestry, "", &mut lines);
    lines
}

fn render_children(nodes: &[TreeNode], parent: &str, indent: &str, lines: &mut Vec<String>) {
    let children: Vec<&TreeNode> = nodes
        .iter()
        .filter(|n| {
            n.ancestry
                .strip_prefix(parent)
                .and_then(|rest| rest.strip_prefix(':'))
                .map(|rest| !rest.contains(':'))
                .unwrap_or(false)
        })
        .collect();

    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let branch = if last { "└── " } else { "├── " };
        let marker = if child.deduped { " (deduped)" } else { "" };
        lines.push(format!(
            "{indent}{branch}{}@{}{marker}",
            child.name, child.revision
        ));
        let next_indent = format!("{indent}{}", if last { "    " } else { "│   " });
        render_children(nodes, &child.ancestry, &next_indent, lines);
    }
}
