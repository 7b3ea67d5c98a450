//! `json-export`/`json-import`, `config`, and repository-to-repository
//! sharing (`push`/`clone`).

use crate::common::{TestRepo, bare_remote, path_str, universe};

#[test]
fn json_export_import_round_trip() {
    let u = universe();
    u.app.pkgs_ok(&["add", "a", "1.0", &u.a.url()]);
    u.app.pkgs_ok(&["add", "b", "1.0", &u.b.url()]);

    let exported = u.app.pkgs_ok(&["json-export"]);
    let document: serde_json::Value = serde_json::from_str(&exported).unwrap();
    assert_eq!(document["name"], "app");
    let packages = document["packages"].as_array().unwrap();
    assert_eq!(packages.len(), 4, "export:\n{exported}");
    for package in packages {
        assert!(package["snapshot"].is_string());
        assert!(package["url"].is_string());
    }

    // Replaying the export on a fresh repository reconstructs the same
    // HEAD edge set.
    let app2 = TestRepo::pkg("app");
    app2.write_file("import.json", &exported);
    app2.pkgs_ok(&["json-import", "import.json"]);
    assert_eq!(app2.head_edges("app"), u.app.head_edges("app"));
}

#[test]
fn config_add_creates_the_manifest() {
    let repo = TestRepo::new("fresh");
    assert!(!repo.path.join("pkgs.json").exists());
    repo.pkgs_ok(&["config", "add", "name", "fresh"]);
    assert!(repo.path.join("pkgs.json").exists());
    assert_eq!(repo.pkgs_ok(&["config", "get", "name"]), "fresh");
}

#[test]
fn config_get_of_a_missing_key_prints_nothing() {
    let repo = TestRepo::pkg("app");
    assert_eq!(repo.pkgs_ok(&["config", "get", "description"]), "");
}

#[test]
fn malformed_manifest_is_fatal() {
    let repo = TestRepo::pkg("app");
    repo.write_file("pkgs.json", "{ definitely not json");
    let err = repo.pkgs_err(&["status"]);
    assert!(err.contains("fatal:"), "unexpected stderr: {err}");
    assert!(err.contains("invalid manifest"), "unexpected stderr: {err}");
}

#[test]
fn push_ships_head_tag_and_package_refs() {
    let u = universe();
    u.app.pkgs_ok(&["add", "a", "1.0", &u.a.url()]);
    u.app.pkgs_ok(&["release", "1.0"]);

    let remote = bare_remote(&u.app, "origin.git");
    u.app.git(&["remote", "add", "origin", &path_str(&remote)]);
    u.app.pkgs_ok(&["push"]);

    let refs = u.app.git(&[
        "ls-remote",
        &path_str(&remote),
    ]);
    assert!(refs.contains("refs/tags/1.0"), "remote refs:\n{refs}");
    assert!(refs.contains("refs/pkgs/app/1.0/a"), "remote refs:\n{refs}");
    assert!(refs.contains("refs/pkgs/app/HEAD/c"), "remote refs:\n{refs}");
}

#[test]
fn clone_bootstraps_name_and_worktrees() {
    let u = universe();
    u.app.pkgs_ok(&["add", "a", "1.0", &u.a.url()]);
    u.app.pkgs_ok(&["release", "1.0"]);

    let remote = bare_remote(&u.app, "origin.git");
    u.app.git(&["remote", "add", "origin", &path_str(&remote)]);
    u.app.pkgs_ok(&["push"]);

    // Clone into a sibling directory of the original checkout.
    let target = u.app.path.parent().unwrap().join("cloned");
    u.app.pkgs_ok(&["clone", &path_str(&remote), &path_str(&target)]);

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(target.join("pkgs.json")).unwrap()).unwrap();
    assert_eq!(manifest["name"], "app");
    // Dependencies were materialized from the fetched namespace.
    assert!(target.join("pkgs/a/.git").exists());
    assert!(target.join("pkgs/c/.git").exists());
}
