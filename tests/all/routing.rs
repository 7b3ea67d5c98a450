//! Namespaces and path routing end to end.

use crate::common::{TestRepo, universe};

#[test]
fn namespaced_path_routing_splits_dependency_groups() {
    let u = universe();
    u.app.pkgs_ok(&["config", "add", "paths.dev:*", "dev_pkgs"]);
    u.app.pkgs_ok(&["config", "add", "paths.*", "prod_pkgs"]);

    u.app.pkgs_ok(&["-n", "dev", "add", "c", "1.1", &u.c.url()]);
    u.app.pkgs_ok(&["add", "d", "1.0", &u.d.url()]);

    // The namespaced edge lands under the dev prefix, without the
    // namespace directory.
    assert!(u.app.worktree_exists("dev_pkgs/c"));
    assert!(!u.app.worktree_exists("dev_pkgs/dev/c"));
    assert!(u.app.worktree_exists("prod_pkgs/d"));

    // Refs carry the namespace directory; the manifest carries the
    // namespaced key.
    assert!(u.app.rev_parse("refs/pkgs/app/HEAD/dev/c").is_some());
    assert_eq!(
        u.app.manifest_deps(),
        [
            ("d".to_string(), "1.0".to_string()),
            ("dev:c".to_string(), "1.1".to_string()),
        ]
    );
}

#[test]
fn false_mapping_records_the_edge_without_a_worktree() {
    let u = universe();
    u.app.pkgs_ok(&["config", "add", "paths.hidden:*", "false"]);

    u.app.pkgs_ok(&["-n", "hidden", "add", "c", "1.0", &u.c.url()]);

    assert!(u.app.rev_parse("refs/pkgs/app/HEAD/hidden/c").is_some());
    assert!(!u.app.path.join("pkgs/c").exists());
    assert!(!u.app.path.join("hidden").exists());
}

#[test]
fn prefix_flag_overrides_the_default_location() {
    let u = universe();
    u.app.pkgs_ok(&["-P", "third_party", "add", "c", "1.0", &u.c.url()]);
    assert!(u.app.worktree_exists("third_party/c"));
}

#[test]
fn manifest_prefix_beats_environment_prefix() {
    let u = universe();
    u.app.pkgs_ok(&["config", "add", "prefix", "vendor"]);
    let output = u.app.pkgs_with_env(
        &["add", "c", "1.0", &u.c.url()],
        &[("PKGS_DEFAULT_PREFIX", "ignored")],
    );
    assert!(
        output.status.success(),
        "add failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(u.app.worktree_exists("vendor/c"));
    assert!(!u.app.path.join("ignored").exists());
}

#[test]
fn quiet_suppresses_report_lines() {
    let u = universe();
    let out = u.app.pkgs_ok(&["-q", "add", "c", "1.0", &u.c.url()]);
    assert!(out.is_empty(), "expected no output, got: {out}");

    let app2 = TestRepo::pkg("app2");
    let out = app2.pkgs_ok(&["add", "c", "1.0", &u.c.url()]);
    assert!(out.contains("[add] c 1.0"), "missing report line: {out}");
}
