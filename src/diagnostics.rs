//! Non-fatal finding collector and fatal-error rendering.
//!
//! Reconciliation never hard-fails on operator input: a reference that
//! matches nothing is dropped, a group that resolves to nothing is omitted,
//! a duplicate canonical key keeps its first registrant. Each of those
//! outcomes is still worth telling the operator about, so the pipeline
//! threads a push-only `Diagnostics` sink through every stage and the CLI
//! prints the collected findings at the end.

use std::fmt;

use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// A single non-fatal finding from configuration resolution or reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The file-backed configuration was unusable and the local record took over.
    ConfigFallback {
        /// Why the file configuration was rejected.
        reason: String,
    },

    /// A separator-carrying group resolved to zero menu entries and was omitted.
    EmptyGroupDropped {
        /// The separator label, or an empty string for a plain separator.
        label: String,
    },

    /// Two runtime entries normalized to the same canonical key.
    KeyCollision {
        /// Slug of the later entry whose key was discarded.
        dropped: String,
        /// Slug of the first-registered entry that keeps the key.
        kept: String,
        /// The shared canonical key.
        key: String,
    },

    /// A configured reference matched no runtime menu entry.
    UnresolvedReference {
        /// The reference exactly as the operator wrote it.
        reference: String,
    },
}

impl fmt::Display for Diagnostic {
    /// One-line rendering used in `check` and `preview` output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Diagnostic::ConfigFallback { reason } => {
                write!(f, "config file unusable ({reason}), using local settings")
            },
            Diagnostic::EmptyGroupDropped { label } => {
                if label.is_empty() {
                    write!(f, "group with unlabeled separator has no visible menus, omitted")
                } else {
                    write!(f, "group `{label}` has no visible menus, omitted")
                }
            },
            Diagnostic::KeyCollision { key, kept, dropped } => {
                write!(f, "duplicate canonical key `{key}`: kept `{kept}`, ignoring `{dropped}`")
            },
            Diagnostic::UnresolvedReference { reference } => {
                write!(f, "reference `{reference}` matches no menu entry")
            },
        };
    }
}

/// Push-only collector threaded through the reconciliation pipeline.
#[derive(Debug, Default)]
pub struct Diagnostics {
    findings: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collector.
    pub fn new() -> Self {
        return Self { findings: Vec::new() };
    }

    /// Record one finding.
    pub fn push(&mut self, d: Diagnostic) {
        self.findings.push(d);
    }

    /// All findings in the order they were recorded.
    pub fn findings(&self) -> &[Diagnostic] {
        return &self.findings;
    }

    /// Count of unresolved-reference findings, used for the `check` exit code.
    pub fn unresolved_count(&self) -> usize {
        return self
            .findings()
            .iter()
            .filter(|d| return matches!(d, Diagnostic::UnresolvedReference { .. }))
            .count();
    }

    /// Print every finding to stderr, one `warning:` line each.
    pub fn print(&self) {
        for d in self.findings() {
            eprintln!("warning: {d}");
        }
        return;
    }
}

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and how to fix it.
/// Designed to be readable by both humans and LLM agents.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::SnapshotNotFound { path } => render_snapshot_not_found(&path.display().to_string()),
        Error::LocalSettingsCorrupt { path, reason } => {
            render_local_settings_corrupt(&path.display().to_string(), reason)
        },
        Error::UnknownSetting { name } => render_unknown_setting(name),
        _ => render_generic(e),
    }
}

fn render_generic(e: &Error) -> String {
    match e {
        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::Json(e) => format!("\
# Error: Invalid JSON

{e}
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    }
}

fn render_snapshot_not_found(path: &str) -> String {
    format!(
        "\
# Error: Menu Snapshot Not Found

`{path}` does not exist.

## Fix

Export the top-level menu from your site as a JSON array of entries:

    [{{\"slug\": \"index.php\", \"title\": \"Dashboard\"}}, ...]

then pass it with `--snapshot <path>`.
"
    )
}

fn render_local_settings_corrupt(path: &str, reason: &str) -> String {
    format!(
        "\
# Error: Settings Record Corrupt

`{path}` exists but cannot be parsed: {reason}

## Fix

Repair or delete the record. A minimal valid file:

    menu_order = \"\"
    accordion_enabled = false
    hide_unspecified = false
"
    )
}

fn render_unknown_setting(name: &str) -> String {
    format!(
        "\
# Error: Unknown Setting

`{name}` is not a toggle this tool manages.

## Fix

Use one of:

    menuorg set accordion on|off
    menuorg set hide-unspecified on|off
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_count_ignores_other_findings() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::UnresolvedReference { reference: "ghost.php".to_string() });
        diags.push(Diagnostic::EmptyGroupDropped { label: "Tools".to_string() });
        diags.push(Diagnostic::UnresolvedReference { reference: "other.php".to_string() });
        assert_eq!(diags.unresolved_count(), 2);
    }

    #[test]
    fn findings_keep_insertion_order() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::ConfigFallback { reason: "bad json".to_string() });
        diags.push(Diagnostic::KeyCollision {
            dropped: "b".to_string(),
            kept: "a".to_string(),
            key: "admin.php?page=x".to_string(),
        });
        assert!(matches!(diags.findings().first(), Some(Diagnostic::ConfigFallback { .. })));
        assert!(matches!(diags.findings().get(1), Some(Diagnostic::KeyCollision { .. })));
    }
}
