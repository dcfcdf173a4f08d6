//! Configuration source resolution: file-backed settings take precedence
//! over the locally stored record.
//!
//! Exactly one source is authoritative per run. A `settings.json` that
//! exists, parses, and carries a `menu_order` array wins; any defect in it
//! is reported through the diagnostic side channel and the local record
//! takes over. A simply absent file is the normal local-mode case and is
//! not worth a diagnostic. The local record, in turn, is the operator's own
//! hand-written file: if it exists but cannot be parsed that is a hard
//! error, never a silent default.

use std::path::Path;

use serde::Deserialize;
use sha2::{Digest as _, Sha256};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::Error;

/// Which source won precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSource {
    /// The external `settings.json` is authoritative; the local record is
    /// read-only while it exists.
    File,
    /// The local record (or its defaults, when absent) is authoritative.
    Local,
}

/// The unified configuration record for one run. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Whether labeled separators collapse/expand their groups.
    pub accordion_enabled: bool,
    /// Whether entries not mentioned in the ordering are omitted entirely.
    pub hide_unspecified: bool,
    /// The line-oriented ordering text.
    pub ordering_text: String,
    /// Which source won.
    pub source: SettingsSource,
}

/// Raw shape of the file-backed configuration. `menu_order` must be an
/// array of lines; its absence or any other shape fails deserialization
/// and triggers the fallback.
#[derive(Debug, Deserialize)]
struct FileConfig {
    /// Accordion toggle, defaulting off.
    #[serde(default)]
    accordion_enabled: bool,
    /// Hide-unspecified toggle, defaulting off.
    #[serde(default)]
    hide_unspecified: bool,
    /// Ordering directives, one per element.
    menu_order: Vec<String>,
}

/// Raw shape of the local TOML record. Every field optional.
#[derive(Debug, Default, Deserialize)]
struct LocalRecord {
    /// Accordion toggle.
    #[serde(default)]
    accordion_enabled: bool,
    /// Hide-unspecified toggle.
    #[serde(default)]
    hide_unspecified: bool,
    /// Ordering text as one multiline string.
    #[serde(default)]
    menu_order: String,
}

impl Settings {
    /// Resolve the authoritative configuration, file first.
    ///
    /// # Errors
    ///
    /// Returns `Error::LocalSettingsCorrupt` if the local record exists but
    /// cannot be parsed, or `Error::Io` on unexpected read failures of it.
    /// File-config defects are never errors; they emit a `ConfigFallback`
    /// diagnostic and resolution continues with the local record.
    pub fn resolve(
        file_path: &Path,
        local_path: &Path,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, Error> {
        match load_file_config(file_path) {
            Ok(Some(config)) => {
                return Ok(Self {
                    accordion_enabled: config.accordion_enabled,
                    hide_unspecified: config.hide_unspecified,
                    ordering_text: config.menu_order.join("\n"),
                    source: SettingsSource::File,
                });
            },
            Ok(None) => {},
            Err(reason) => diagnostics.push(Diagnostic::ConfigFallback { reason }),
        }

        let record = load_local_record(local_path)?;
        return Ok(Self {
            accordion_enabled: record.accordion_enabled,
            hide_unspecified: record.hide_unspecified,
            ordering_text: record.menu_order,
            source: SettingsSource::Local,
        });
    }

    /// Content fingerprint of the resolved configuration: SHA-256 over a
    /// canonical JSON encoding of the three logical fields. Stale persisted
    /// accordion state is invalidated by comparing this value.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::json!({
            "accordion_enabled": self.accordion_enabled,
            "hide_unspecified": self.hide_unspecified,
            "menu_order": self.ordering_text,
        });
        let digest = Sha256::digest(canonical.to_string().as_bytes());
        return format!("{digest:x}");
    }
}

/// Load the file-backed configuration.
///
/// Ok(None) means the file is simply absent (quiet fallback); Err carries
/// a human-readable reason for the diagnostic when the file exists but is
/// unusable.
fn load_file_config(path: &Path) -> Result<Option<FileConfig>, String> {
    let content = match std::fs::read_to_string(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(format!("cannot read {}: {e}", path.display())),
        Ok(c) => c,
    };

    return match serde_json::from_str::<FileConfig>(&content) {
        Err(e) => Err(format!("invalid config in {}: {e}", path.display())),
        Ok(config) => Ok(Some(config)),
    };
}

/// Load the local record; absent file yields defaults.
///
/// # Errors
///
/// Returns `Error::LocalSettingsCorrupt` on parse failure, `Error::Io` on
/// read failures other than not-found.
fn load_local_record(path: &Path) -> Result<LocalRecord, Error> {
    let content = match std::fs::read_to_string(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(LocalRecord::default()),
        Err(e) => return Err(Error::Io(e)),
        Ok(c) => c,
    };

    return toml::from_str(&content).map_err(|e| {
        return Error::LocalSettingsCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };
    });
}

/// Flip one boolean toggle in the local record, preserving the file's
/// formatting and comments. Creates the file if it doesn't exist.
///
/// # Errors
///
/// Returns `Error::UnknownSetting` for an unrecognized key,
/// `Error::LocalSettingsCorrupt` if the record can't be parsed,
/// or `Error::Io` on read/write failures.
pub fn rewrite_local_flag(path: &Path, key: &str, value: bool) -> Result<(), Error> {
    let field = match key {
        "accordion" => "accordion_enabled",
        "hide-unspecified" => "hide_unspecified",
        _ => return Err(Error::UnknownSetting { name: key.to_string() }),
    };

    let content = match std::fs::read_to_string(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(Error::Io(e)),
        Ok(c) => c,
    };

    let mut doc: toml_edit::DocumentMut = content.parse().map_err(|e: toml_edit::TomlError| {
        return Error::LocalSettingsCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };
    })?;

    doc[field] = toml_edit::value(value);
    std::fs::write(path, doc.to_string())?;
    return Ok(());
}
