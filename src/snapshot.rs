//! Menu snapshot input: the host's live top-level menu, exported as JSON.
//!
//! The snapshot is read-only to the pipeline and enumerated in its original
//! order, which is also the tiebreak order for unspecified entries.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One top-level menu entry as the host registered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// True when the entry was registered by a third-party plugin and is
    /// addressed through the admin dispatcher rather than by its own file.
    #[serde(default)]
    pub plugin_page: bool,
    /// The host-internal identifier (`$menu[*][2]` in wp-admin terms).
    pub slug: String,
    /// Display title for preview output.
    #[serde(default)]
    pub title: String,
}

impl MenuEntry {
    /// Derive the externally addressable path the way the host's own menu
    /// rendering would: plugin-registered pages go through the dispatcher
    /// (`admin.php?page=<slug>`), built-in pages are addressed directly.
    pub fn admin_href(&self) -> String {
        if self.plugin_page {
            return format!("admin.php?page={}", self.slug);
        }
        return self.slug.clone();
    }
}

/// The full ordered collection of top-level entries for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuSnapshot {
    /// Entries in the host's original registration order.
    pub entries: Vec<MenuEntry>,
}

impl MenuSnapshot {
    /// Parse a snapshot from JSON content: either a bare array of entries
    /// or an object with an `entries` field.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the content parses as neither shape.
    pub fn parse(content: &str) -> Result<Self, Error> {
        if let Ok(entries) = serde_json::from_str::<Vec<MenuEntry>>(content) {
            return Ok(Self { entries });
        }
        return Ok(serde_json::from_str::<Self>(content)?);
    }

    /// Read and parse a snapshot from disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::SnapshotNotFound` if the file doesn't exist,
    /// `Error::Io` for other read failures, or `Error::Json` for bad content.
    pub fn read(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::SnapshotNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content);
    }
}
