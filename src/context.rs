//! Layered runtime configuration.
//!
//! Every tunable resolves once, at startup, through the same chain:
//! CLI flag, then manifest, then `PKGS_DEFAULT_*` environment, then the
//! hard-coded default. The result is one immutable [`Context`] threaded
//! through the commands; nothing re-reads the environment afterwards.

use std::path::PathBuf;
use std::str::FromStr;

use crate::manifest::{DEFAULT_MANIFEST_FILE, Manifest};
use crate::resolver::Strategy;

/// CLI-provided overrides, all optional.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub quiet: bool,
    pub prefix: Option<String>,
    pub strategy: Option<Strategy>,
    pub namespace: Option<String>,
    pub message: Option<String>,
    pub pkg_type: Option<String>,
    pub depth: Option<u32>,
}

/// Immutable per-invocation configuration.
#[derive(Debug, Clone)]
pub struct Context {
    pub quiet: bool,
    /// Manifest filename, relative to the repository root.
    pub manifest_file: String,
    pub prefix: String,
    pub strategy: Strategy,
    pub namespace: Option<String>,
    pub message: Option<String>,
    /// Revision used when a command omits one.
    pub default_revision: String,
    pub pkg_type: String,
    pub depth: Option<u32>,
    pub ref_suffix: Option<String>,
    pub strip_ref_suffix: bool,
    /// Inline manifest JSON injected into `add-dir` imports.
    pub import_config_json: Option<String>,
}

/// Resolve the manifest filename before the manifest itself can be loaded:
/// `--config` flag, then `GIT_PKGS_JSON`, then `pkgs.json`.
pub fn manifest_file(cli_config: Option<&PathBuf>) -> String {
    if let Some(path) = cli_config {
        return path.to_string_lossy().into_owned();
    }
    std::env::var("GIT_PKGS_JSON")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_MANIFEST_FILE.to_string())
}

impl Context {
    pub fn build(overrides: Overrides, manifest: &Manifest, manifest_file: String) -> Self {
        Self::build_with_env(overrides, manifest, manifest_file, |key| {
            std::env::var(key).ok().filter(|v| !v.is_empty())
        })
    }

    fn build_with_env(
        overrides: Overrides,
        manifest: &Manifest,
        manifest_file: String,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let prefix = overrides
            .prefix
            .or_else(|| manifest.prefix.clone())
            .or_else(|| env("PKGS_DEFAULT_PREFIX"))
            .unwrap_or_else(|| "pkgs".to_string());

        let strategy = overrides
            .strategy
            .or_else(|| {
                manifest
                    .get("config.strategy")
                    .and_then(|s| Strategy::from_str(&s).ok())
            })
            .or_else(|| {
                env("PKGS_DEFAULT_STRATEGY").and_then(|s| Strategy::from_str(&s).ok())
            })
            .unwrap_or(Strategy::Max);

        let default_revision = env("PKGS_DEFAULT_REVISION").unwrap_or_else(|| "HEAD".to_string());
        let pkg_type = overrides
            .pkg_type
            .or_else(|| env("PKGS_DEFAULT_TYPE"))
            .unwrap_or_else(|| "pkg".to_string());

        let ref_suffix = env("PKGS_REF_SUFFIX");
        let strip_ref_suffix = match env("PKGS_STRIP_REF_SUFFIX") {
            Some(flag) => !matches!(flag.as_str(), "0" | "false" | "no"),
            None => ref_suffix.is_some(),
        };

        Context {
            quiet: overrides.quiet,
            manifest_file,
            prefix,
            strategy,
            namespace: overrides.namespace,
            message: overrides.message,
            default_revision,
            pkg_type,
            depth: overrides.depth,
            ref_suffix,
            strip_ref_suffix,
            import_config_json: env("PKGS_IMPORT_CONFIG_JSON"),
        }
    }

    /// The suffix the router should strip, honoring the toggle.
    pub fn effective_ref_suffix(&self) -> Option<String> {
        if self.strip_ref_suffix {
            self.ref_suffix.clone()
        } else {
            None
        }
    }
}
