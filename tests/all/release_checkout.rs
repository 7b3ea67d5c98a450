//! `release`, `checkout`, `ls-releases`: snapshot round-trips.

use crate::common::universe;

fn pairs(edges: &[(String, String)]) -> Vec<(&str, &str)> {
    edges.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}

#[test]
fn release_freezes_head_and_tags() {
    let u = universe();
    u.app.pkgs_ok(&["add", "a", "1.0", &u.a.url()]);
    let head_before = u.app.head_edges("app");
    u.app.pkgs_ok(&["release", "1.0"]);

    // Snapshot closure: the released set is HEAD-before plus the root's
    // own entry.
    let mut expected = head_before;
    expected.push(("app".to_string(), "1.0".to_string()));
    expected.sort();
    assert_eq!(u.app.snapshot_edges("app", "1.0"), expected);

    // Tag and manifest version line up.
    assert!(u.app.rev_parse("refs/tags/1.0").is_some());
    let manifest: serde_json::Value =
        serde_json::from_str(&u.app.read_file("pkgs.json")).unwrap();
    assert_eq!(manifest["version"], "1.0");

    // The root's own entry is an orphan like any dependency's.
    u.app.assert_orphan_integrity();
}

#[test]
fn checkout_round_trip_restores_each_snapshot() {
    let u = universe();
    u.app.pkgs_ok(&["add", "a", "1.0", &u.a.url()]);
    u.app.pkgs_ok(&["add", "b", "1.0", &u.b.url()]);
    u.app.pkgs_ok(&["release", "1.0"]);
    let head_v1 = u.app.head_edges("app");
    let manifest_v1 = u.app.read_file("pkgs.json");

    // Checking out the live graph is a no-op.
    u.app.pkgs_ok(&["checkout", "HEAD"]);
    assert_eq!(u.app.head_edges("app"), head_v1);

    // Move forward: a@1.2 upgrades the direct edge.
    u.a.release("1.2");
    u.app.pkgs_ok(&["add", "a", "1.2", &u.a.url()]);
    u.app.pkgs_ok(&["release", "1.1"]);
    // Captured after the release so the root's own HEAD entry (rewritten
    // by every release) is part of the expectation.
    let head_v2 = u.app.head_edges("app");
    let manifest_v2 = u.app.read_file("pkgs.json");
    assert_ne!(head_v1, head_v2);

    // Back to 1.0: edges and manifest match exactly.
    u.app.pkgs_ok(&["checkout", "1.0"]);
    assert_eq!(u.app.head_edges("app"), head_v1);
    assert_eq!(u.app.read_file("pkgs.json"), manifest_v1);

    // And forward again.
    u.app.pkgs_ok(&["checkout", "1.1"]);
    assert_eq!(u.app.head_edges("app"), head_v2);
    assert_eq!(u.app.read_file("pkgs.json"), manifest_v2);
}

#[test]
fn checkout_rematerializes_worktrees() {
    let u = universe();
    u.app.pkgs_ok(&["add", "c", "1.0", &u.c.url()]);
    u.app.pkgs_ok(&["release", "1.0"]);
    u.app.pkgs_ok(&["add", "c", "1.1", &u.c.url()]);
    u.app.pkgs_ok(&["release", "1.1"]);

    u.app.pkgs_ok(&["checkout", "1.0"]);
    // The worktree content follows the snapshot.
    assert_eq!(u.app.read_file("pkgs/c/src.txt"), "content at 1.0\n");

    u.app.pkgs_ok(&["checkout", "1.1"]);
    assert_eq!(u.app.read_file("pkgs/c/src.txt"), "content at 1.1\n");
}

#[test]
fn checkout_of_an_unknown_snapshot_fails() {
    let u = universe();
    u.app.pkgs_ok(&["add", "c", "1.0", &u.c.url()]);
    let err = u.app.pkgs_err(&["checkout", "9.9"]);
    assert!(err.contains("fatal:"), "unexpected stderr: {err}");
    assert!(err.contains("refs/pkgs/app/9.9"), "unexpected stderr: {err}");
}

#[test]
fn ls_releases_sorts_by_version() {
    let u = universe();
    u.app.pkgs_ok(&["add", "c", "1.0", &u.c.url()]);
    u.app.pkgs_ok(&["release", "1.2"]);
    u.app.pkgs_ok(&["release", "1.10"]);
    u.app.pkgs_ok(&["release", "1.9"]);

    let out = u.app.pkgs_ok(&["ls-releases"]);
    let releases: Vec<&str> = out.lines().collect();
    assert_eq!(releases, ["1.2", "1.9", "1.10"]);
}
