//! Accordion state machine for collapsible menu groups.
//!
//! Runs on the client against pre-resolved group markers; nothing here
//! re-derives group membership by DOM matching. Storage and layout
//! recalculation are injected capabilities, so the whole machine is
//! deterministic under test with no browser.
//!
//! Lifecycle per page load: read the persisted blob (discarded wholesale on
//! fingerprint mismatch, group ids are positional and not stable across
//! configuration edits), derive each panel's initial mode, then serve
//! activation events until the page goes away. `frame()` is the
//! animation-frame tick: it releases the re-entrancy guard and fires at most
//! one pending layout signal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::rebuild::Panel;

/// Persistence capability: one origin-scoped storage slot holding the
/// serialized state blob. Best-effort: `save` reports failure but callers
/// never treat it as fatal.
pub trait StateStore {
    /// Read the stored blob, or None if absent/unreadable.
    fn load(&mut self) -> Option<String>;
    /// Write the blob. Returns false on failure (quota, storage disabled).
    fn save(&mut self, blob: &str) -> bool;
}

/// Layout-recalculation capability (the host window's resize broadcast).
pub trait LayoutSignal {
    /// Deliver one layout-recalculation signal.
    fn fire(&mut self);
}

/// How a panel activation arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// A keyboard event, carrying the DOM `event.key` value.
    Key(String),
    /// A pointer click or tap.
    Pointer,
}

/// Current mode of one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelMode {
    /// Hidden members, collapsed separator.
    Collapsed,
    /// Visible members.
    Expanded,
    /// Visible members, and the mode cannot change: the group contains the
    /// current request's location.
    LockedExpanded,
}

/// Result of one activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The toggle applied; carries the new mode.
    Applied(
        /// Mode after the toggle.
        PanelMode,
    ),
    /// A toggle is already in flight this frame; input ignored.
    Guarded,
    /// The key is not an activation key (`Enter` or space); input ignored.
    InertKey,
    /// The panel is locked open; input ignored.
    Locked,
    /// No panel with that id.
    UnknownPanel,
}

/// Persisted value for one panel. Only non-locked modes are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StoredState {
    /// Panel was collapsed.
    Collapsed,
    /// Panel was expanded.
    Expanded,
}

/// The single JSON blob kept in storage.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StateBlob {
    /// Fingerprint of the configuration the states belong to.
    config_hash: String,
    /// Panel states keyed by separator id.
    states: BTreeMap<String, StoredState>,
}

/// One panel's runtime record.
#[derive(Debug)]
struct PanelRuntime {
    /// Separator id from the rebuilt menu.
    id: String,
    /// Whether the panel is locked open this page load.
    locked: bool,
    /// Current mode.
    mode: PanelMode,
}

/// The accordion controller for one page load.
pub struct Accordion<S: StateStore, L: LayoutSignal> {
    /// Fingerprint of the active configuration.
    config_hash: String,
    /// Re-entrancy guard: set by a toggle, cleared by the next frame tick.
    guard: bool,
    /// Panels in menu order.
    panels: Vec<PanelRuntime>,
    /// Whether a layout signal is pending for the next frame tick.
    /// Cancel-and-replace: at most one is ever queued.
    pending_layout: bool,
    /// Injected layout capability.
    signal: L,
    /// Injected storage capability.
    store: S,
}

impl<S: StateStore, L: LayoutSignal> Accordion<S, L> {
    /// Build the machine and derive each panel's initial mode, in priority
    /// order: locked panels are forced open (and immediately persisted as
    /// expanded, so leaving the page later doesn't resurface a stale
    /// collapse); otherwise a stored `collapsed` is restored; otherwise
    /// expanded. Schedules one initial layout signal.
    pub fn new(store: S, signal: L, config_hash: &str, panels: &[Panel]) -> Self {
        let mut machine = Self {
            config_hash: config_hash.to_string(),
            guard: false,
            panels: Vec::with_capacity(panels.len()),
            pending_layout: true,
            signal,
            store,
        };

        let stored = machine.load_blob();
        let mut forced: Vec<String> = Vec::new();

        for panel in panels {
            let mode = if panel.locked {
                forced.push(panel.id.clone());
                PanelMode::LockedExpanded
            } else if stored.states.get(&panel.id) == Some(&StoredState::Collapsed) {
                PanelMode::Collapsed
            } else {
                PanelMode::Expanded
            };
            machine.panels.push(PanelRuntime {
                id: panel.id.clone(),
                locked: panel.locked,
                mode,
            });
        }

        for id in forced {
            machine.persist(&id, StoredState::Expanded);
        }

        return machine;
    }

    /// Handle one activation event on a panel.
    pub fn activate(&mut self, id: &str, activation: &Activation) -> Outcome {
        if let Activation::Key(key) = activation
            && key != "Enter"
            && key != " "
        {
            return Outcome::InertKey;
        }

        let Some(panel) = self.panels.iter_mut().find(|p| return p.id == id) else {
            return Outcome::UnknownPanel;
        };

        if panel.locked {
            return Outcome::Locked;
        }

        if self.guard {
            return Outcome::Guarded;
        }

        // Separator and members flip in lockstep: the mode is the single
        // source of truth, so a partial flip cannot exist.
        let (mode, stored) = match panel.mode {
            PanelMode::Collapsed => (PanelMode::Expanded, StoredState::Expanded),
            PanelMode::Expanded => (PanelMode::Collapsed, StoredState::Collapsed),
            PanelMode::LockedExpanded => return Outcome::Locked,
        };
        panel.mode = mode;
        self.guard = true;
        self.pending_layout = true;

        let id = id.to_string();
        self.persist(&id, stored);

        return Outcome::Applied(mode);
    }

    /// Animation-frame tick: release the re-entrancy guard and fire at most
    /// one pending layout signal.
    pub fn frame(&mut self) {
        self.guard = false;
        if self.pending_layout {
            self.signal.fire();
            self.pending_layout = false;
        }
        return;
    }

    /// Current mode of a panel.
    pub fn mode(&self, id: &str) -> Option<PanelMode> {
        return self.panels.iter().find(|p| return p.id == id).map(|p| return p.mode);
    }

    /// The `aria-expanded` value for a panel: true unless collapsed.
    pub fn aria_expanded(&self, id: &str) -> Option<bool> {
        return self.mode(id).map(|mode| return mode != PanelMode::Collapsed);
    }

    /// Read and validate the stored blob. A missing, unparseable, or
    /// fingerprint-mismatched blob is an empty one, a deliberate full
    /// reset, never a per-key merge.
    fn load_blob(&mut self) -> StateBlob {
        let Some(raw) = self.store.load() else {
            return StateBlob::default();
        };
        let Ok(blob) = serde_json::from_str::<StateBlob>(&raw) else {
            return StateBlob::default();
        };
        if blob.config_hash != self.config_hash {
            return StateBlob::default();
        }
        return blob;
    }

    /// Read-modify-write one panel's stored state. Reloading first keeps
    /// unrelated panels' states intact even if another writer touched the
    /// blob since init. Write failure is swallowed: the in-memory mode has
    /// already flipped, it just won't survive a reload.
    fn persist(&mut self, id: &str, state: StoredState) {
        let mut blob = self.load_blob();
        blob.config_hash = self.config_hash.clone();
        blob.states.insert(id.to_string(), state);

        let Ok(serialized) = serde_json::to_string(&blob) else {
            return;
        };
        let _ = self.store.save(&serialized);
        return;
    }
}
