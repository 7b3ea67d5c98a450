//! `tree`, `status`, `show`, `prune` projections.

use crate::common::universe;

#[test]
fn tree_prints_the_transitive_graph() {
    let u = universe();
    u.app.pkgs_ok(&["add", "a", "1.0", &u.a.url()]);

    let out = u.app.pkgs_ok(&["tree"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "app@HEAD");
    assert!(out.contains("a@1.0"), "missing a: {out}");
    assert!(out.contains("c@1.0"), "missing c: {out}");
    assert!(out.contains("d@1.0"), "missing d: {out}");
}

#[test]
fn tree_marks_reappearing_packages_as_deduped() {
    let u = universe();
    u.app.pkgs_ok(&["add", "a", "1.0", &u.a.url()]);
    u.app.pkgs_ok(&["add", "e", "1.0", &u.e.url()]);

    // d appears under both a and e; the second appearance is a deduped
    // leaf.
    let out = u.app.pkgs_ok(&["tree"]);
    assert_eq!(out.matches("d@1.0").count(), 2, "tree:\n{out}");
    assert_eq!(out.matches("(deduped)").count(), 1, "tree:\n{out}");
}

#[test]
fn tree_of_a_release_reads_the_frozen_manifest() {
    let u = universe();
    u.app.pkgs_ok(&["add", "c", "1.0", &u.c.url()]);
    u.app.pkgs_ok(&["release", "1.0"]);
    u.app.pkgs_ok(&["add", "d", "1.0", &u.d.url()]);

    let out = u.app.pkgs_ok(&["tree", "1.0"]);
    assert!(out.contains("c@1.0"), "tree:\n{out}");
    // d joined after the release; the frozen tree does not show it.
    assert!(!out.contains("d@1.0"), "tree:\n{out}");
}

#[test]
fn status_lists_edges_with_kind_and_location() {
    let u = universe();
    u.app.pkgs_ok(&["add", "a", "1.0", &u.a.url()]);

    let out = u.app.pkgs_ok(&["status"]);
    let mut lines: Vec<&str> = out.lines().collect();
    lines.sort_unstable();
    assert_eq!(
        lines,
        [
            "a 1.0 direct pkgs/a",
            "c 1.0 transitive pkgs/c",
            "d 1.0 transitive pkgs/d",
        ]
    );
}

#[test]
fn show_reports_provenance_and_revisions() {
    let u = universe();
    u.app.pkgs_ok(&["add", "c", "1.0", &u.c.url()]);
    u.app.pkgs_ok(&["add", "c", "1.1", &u.c.url()]);

    let out = u.app.pkgs_ok(&["show", "c"]);
    assert!(out.contains("name: c"), "show:\n{out}");
    assert!(out.contains("revision: 1.1"), "show:\n{out}");
    assert!(out.contains(&format!("url: {}", u.c.url())), "show:\n{out}");
    assert!(out.contains("revisions: 1.0 1.1"), "show:\n{out}");
}

#[test]
fn prune_deletes_only_unreferenced_refs() {
    let u = universe();
    u.app.pkgs_ok(&["add", "c", "1.0", &u.c.url()]);
    u.app.pkgs_ok(&["add", "c", "1.1", &u.c.url()]);

    // c@1.1 is the live edge; c@1.0 is only an import leftover.
    u.app.pkgs_ok(&["prune", "c"]);

    assert!(u.app.rev_parse("refs/pkgs/c/1.1/c").is_some());
    assert!(u.app.rev_parse("refs/pkgs/c/1.0/c").is_none());
}

#[test]
fn prune_of_a_single_revision_is_scoped() {
    let u = universe();
    u.app.pkgs_ok(&["add", "c", "1.0", &u.c.url()]);
    u.app.pkgs_ok(&["add", "c", "1.1", &u.c.url()]);
    u.app.pkgs_ok(&["add", "d", "1.0", &u.d.url()]);
    u.app.pkgs_ok(&["remove", "d"]);

    // Only c@1.0 is targeted; d's leftovers stay.
    u.app.pkgs_ok(&["prune", "c", "1.0"]);
    assert!(u.app.rev_parse("refs/pkgs/c/1.0/c").is_none());
    assert!(u.app.rev_parse("refs/pkgs/d/1.0/d").is_some());
}
