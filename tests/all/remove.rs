//! `remove`: direct-only, with substitution from remaining parents.

use crate::common::universe;

fn pairs(edges: &[(String, String)]) -> Vec<(&str, &str)> {
    edges.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}

#[test]
fn remove_with_substitution_from_the_other_parent() {
    let u = universe();
    u.app.pkgs_ok(&["add", "a", "1.0", &u.a.url()]);
    u.app.pkgs_ok(&["add", "b", "1.0", &u.b.url()]);

    u.app.pkgs_ok(&["remove", "a"]);

    // c and d survive via b's announcements, at b's revisions.
    assert_eq!(
        pairs(&u.app.head_edges("app")),
        [("b", "1.0"), ("c", "1.1"), ("d", "1.1")]
    );
    assert_eq!(u.app.manifest_deps(), [("b".to_string(), "1.0".to_string())]);
    assert!(!u.app.worktree_exists("pkgs/a"));
    assert!(u.app.worktree_exists("pkgs/c"));
    u.app.assert_orphan_integrity();
}

#[test]
fn remove_last_parent_drops_the_whole_closure() {
    let u = universe();
    u.app.pkgs_ok(&["add", "a", "1.0", &u.a.url()]);

    u.app.pkgs_ok(&["remove", "a"]);

    assert!(u.app.head_edges("app").is_empty());
    assert!(u.app.manifest_deps().is_empty());
    assert!(!u.app.worktree_exists("pkgs/a"));
    assert!(!u.app.worktree_exists("pkgs/c"));
    assert!(!u.app.worktree_exists("pkgs/d"));
}

#[test]
fn remove_refuses_transitive_dependencies() {
    let u = universe();
    u.app.pkgs_ok(&["add", "a", "1.0", &u.a.url()]);

    // c is in HEAD, but only transitively.
    let err = u.app.pkgs_err(&["remove", "c"]);
    assert!(err.contains("fatal:"), "unexpected stderr: {err}");
    assert!(err.contains("not a direct dependency"), "unexpected stderr: {err}");

    // Nothing changed.
    assert_eq!(
        pairs(&u.app.head_edges("app")),
        [("a", "1.0"), ("c", "1.0"), ("d", "1.0")]
    );
}

#[test]
fn remove_of_an_unknown_package_fails() {
    let u = universe();
    u.app.pkgs_ok(&["add", "c", "1.0", &u.c.url()]);
    let err = u.app.pkgs_err(&["remove", "nope"]);
    assert!(err.contains("fatal:"), "unexpected stderr: {err}");
}
