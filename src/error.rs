//! Crate-level error types for menuorg diagnostics.

use std::path::PathBuf;

/// All errors in menuorg carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the file, setting, or reason for failure.
///
/// Most findings in this tool are deliberately *not* errors: unresolvable
/// references, dropped groups, and key collisions flow through the
/// `diagnostics::Diagnostics` side channel instead, because the menu must stay
/// usable no matter what the configuration says.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON (de)serialization failed on a snapshot or payload.
    #[error("json: {0}")]
    Json(
        /// The wrapped serde_json error.
        #[from]
        serde_json::Error,
    ),

    /// The local settings record exists but cannot be parsed.
    #[error("settings record corrupt: {}: {reason}", path.display())]
    LocalSettingsCorrupt {
        /// Path to the malformed record.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// The menu snapshot file does not exist on disk.
    #[error("menu snapshot not found: {}", path.display())]
    SnapshotNotFound {
        /// Path to the missing snapshot.
        path: PathBuf,
    },

    /// The `set` command was given a key that is not a known toggle.
    #[error("unknown setting: `{name}` (expected `accordion` or `hide-unspecified`)")]
    UnknownSetting {
        /// Setting key that was not recognized.
        name: String,
    },
}
