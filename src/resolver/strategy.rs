//! Conflict strategies for competing revisions of one edge.

use crate::version::{max_revision, min_revision};

/// How the resolver reconciles an existing edge with an incoming one.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    clap::ValueEnum,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Strategy {
    /// Version-sort maximum wins.
    Max,
    /// Version-sort minimum wins.
    Min,
    /// The existing edge wins.
    Keep,
    /// The incoming edge wins.
    Update,
    /// Ask; the answer defaults to the existing edge.
    Interactive,
}

/// Which side of a conflict survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Existing,
    Incoming,
}

/// Capability injected into the resolver for the `interactive` strategy, so
/// resolution is testable without a terminal.
pub trait PromptPolicy {
    fn choose(&self, pkg: &str, existing: &str, incoming: &str) -> Choice;
}

/// Non-interactive default: keep what is already resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepExisting;

impl PromptPolicy for KeepExisting {
    fn choose(&self, _pkg: &str, _existing: &str, _incoming: &str) -> Choice {
        Choice::Existing
    }
}

/// Reads one line from stdin; anything but `y`/`yes` keeps the existing
/// edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl PromptPolicy for StdinPrompt {
    fn choose(&self, pkg: &str, existing: &str, incoming: &str) -> Choice {
        use std::io::{BufRead, Write};
        eprint!("replace {pkg} {existing} with {incoming}? [y/N] ");
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return Choice::Existing;
        }
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Choice::Incoming,
            _ => Choice::Existing,
        }
    }
}

/// Pick the surviving revision for an edge.
///
/// Ties (`existing == incoming` as tokens) always keep the existing side,
/// so re-running a resolution never flips an edge to a different commit of
/// the same revision.
pub fn pick<'a>(
    existing: Option<&'a str>,
    incoming: &'a str,
    strategy: Strategy,
    pkg: &str,
    prompt: &dyn PromptPolicy,
) -> Choice {
    let Some(existing) = existing else {
        return Choice::Incoming;
    };
    if existing == incoming {
        return Choice::Existing;
    }
    let winner = match strategy {
        Strategy::Max => max_revision(existing, incoming),
        Strategy::Min => min_revision(existing, incoming),
        Strategy::Keep => existing,
        Strategy::Update => incoming,
        Strategy::Interactive => {
            return prompt.choose(pkg, existing, incoming);
        }
    };
    if winner == existing {
        Choice::Existing
    } else {
        Choice::Incoming
    }
}
