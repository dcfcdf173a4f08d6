//! Core CLI commands: check, preview, simulate, export, scaffold, hash, set.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::accordion::{Accordion, Activation, LayoutSignal, Outcome, PanelMode, StateStore};
use crate::diagnostics::Diagnostics;
use crate::error::Error;
use crate::groups;
use crate::parser;
use crate::rebuild::{self, ReorderedMenu, Slot};
use crate::reconcile::{self, ResolvedGroup, RuntimeIndex};
use crate::settings::{self, Settings, SettingsSource};
use crate::snapshot::MenuSnapshot;

/// Paths to the input files the pipeline commands read.
pub struct Inputs<'a> {
    /// The file-backed configuration (`settings.json`).
    pub config: &'a Path,
    /// The local settings record (`.menuorg.toml`).
    pub local: &'a Path,
    /// The exported menu snapshot.
    pub snapshot: &'a Path,
}

/// Everything the front half of the pipeline produces: resolved settings,
/// the snapshot, and the groups with members reconciled to runtime slugs.
struct Resolved {
    /// Reconciled groups in configured order, not yet filtered.
    groups: Vec<ResolvedGroup>,
    /// Canonical key index over the snapshot.
    index: RuntimeIndex,
    /// The authoritative configuration.
    settings: Settings,
    /// The host menu as exported.
    snapshot: MenuSnapshot,
}

/// Run settings resolution, parsing, grouping, and reconciliation.
///
/// # Errors
///
/// Returns errors from settings resolution or snapshot reading.
fn resolve_inputs(inputs: &Inputs, diagnostics: &mut Diagnostics) -> Result<Resolved, Error> {
    let settings = Settings::resolve(inputs.config, inputs.local, diagnostics)?;
    let snapshot = MenuSnapshot::read(inputs.snapshot)?;

    let tokens = parser::parse(&settings.ordering_text);
    let grouped = groups::build(&tokens);
    let index = RuntimeIndex::build(&snapshot, diagnostics);
    let resolved = reconcile::resolve(&grouped, &index, diagnostics);

    return Ok(Resolved { groups: resolved, index, settings, snapshot });
}

/// Validate the configuration against the snapshot and report findings.
///
/// # Errors
///
/// Returns errors from settings resolution or snapshot reading.
pub fn check(inputs: &Inputs) -> Result<ExitCode, Error> {
    let mut diagnostics = Diagnostics::new();
    let resolved = resolve_inputs(inputs, &mut diagnostics)?;
    let menu = rebuild::reorder(
        &resolved.groups,
        &resolved.snapshot,
        None,
        resolved.settings.hide_unspecified,
        &mut diagnostics,
    );

    diagnostics.print();

    // Exit code priority: unresolved references (1) > clean (0). Fatal
    // errors exit 2 from main.
    let unresolved = diagnostics.unresolved_count();
    if unresolved > 0 {
        println!("{unresolved} unresolved references");
        return Ok(ExitCode::from(1));
    }

    let slots = menu.slots.len();
    let panels = menu.panels().len();
    println!("menu order OK: {slots} slots, {panels} accordion groups");
    return Ok(ExitCode::SUCCESS);
}

/// Print the reordered menu the way it would render, one slot per line.
///
/// # Errors
///
/// Returns errors from settings resolution or snapshot reading.
pub fn preview(inputs: &Inputs, current: Option<&str>) -> Result<(), Error> {
    let mut diagnostics = Diagnostics::new();
    let resolved = resolve_inputs(inputs, &mut diagnostics)?;

    let current_slug =
        current.and_then(|loc| return reconcile::resolve_current(loc, &resolved.index));

    let menu = rebuild::reorder(
        &resolved.groups,
        &resolved.snapshot,
        current_slug.as_deref(),
        resolved.settings.hide_unspecified,
        &mut diagnostics,
    );

    diagnostics.print();

    let specified: HashSet<&str> = resolved
        .groups
        .iter()
        .flat_map(|group| return group.members.iter().map(String::as_str))
        .collect();
    print_menu(&menu, &specified);
    return Ok(());
}

/// Render one reordered menu to stdout, marking entries the configuration
/// never mentioned.
fn print_menu(menu: &ReorderedMenu, specified: &HashSet<&str>) {
    for slot in &menu.slots {
        match slot {
            Slot::Entry { slug, title, .. } => {
                let marker = if specified.contains(slug.as_str()) { "" } else { "  *" };
                if title.is_empty() {
                    println!("  {slug}{marker}");
                } else {
                    println!("  {slug}  {title}{marker}");
                }
            },
            Slot::Separator { id, locked, style } => {
                let label = match style {
                    None => String::new(),
                    Some(s) => s.text.clone(),
                };
                let marker = if *locked { " [current]" } else { "" };
                if label.is_empty() {
                    println!("----- ({id}){marker}");
                } else {
                    println!("----- {label} ({id}){marker}");
                }
            },
        }
    }
    return;
}

/// Storage capability backed by a plain file, standing in for the
/// browser's origin-scoped storage slot.
struct FileStore {
    /// Where the state blob lives.
    path: PathBuf,
}

impl StateStore for FileStore {
    fn load(&mut self) -> Option<String> {
        return std::fs::read_to_string(&self.path).ok();
    }

    fn save(&mut self, blob: &str) -> bool {
        return std::fs::write(&self.path, blob).is_ok();
    }
}

/// The CLI has no layout to recalculate; signals go nowhere.
struct NullSignal;

impl LayoutSignal for NullSignal {
    fn fire(&mut self) {}
}

/// Drive the accordion state machine against the rebuilt menu, persisting
/// panel states to a local file across invocations. `--toggle` activates
/// one panel before printing; panel states survive between runs until the
/// configuration fingerprint changes.
///
/// # Errors
///
/// Returns errors from settings resolution or snapshot reading.
pub fn simulate(
    inputs: &Inputs,
    state_path: &Path,
    toggle: Option<&str>,
    key: Option<&str>,
    current: Option<&str>,
) -> Result<(), Error> {
    let mut diagnostics = Diagnostics::new();
    let resolved = resolve_inputs(inputs, &mut diagnostics)?;

    if !resolved.settings.accordion_enabled {
        eprintln!("accordion is disabled; enable it with `menuorg set accordion on`");
        return Ok(());
    }

    let current_slug =
        current.and_then(|loc| return reconcile::resolve_current(loc, &resolved.index));
    let menu = rebuild::reorder(
        &resolved.groups,
        &resolved.snapshot,
        current_slug.as_deref(),
        resolved.settings.hide_unspecified,
        &mut diagnostics,
    );
    diagnostics.print();

    let panels = menu.panels();
    let fingerprint = resolved.settings.fingerprint();
    let store = FileStore { path: state_path.to_path_buf() };
    let mut machine = Accordion::new(store, NullSignal, &fingerprint, &panels);
    machine.frame();

    if let Some(id) = toggle {
        let activation = match key {
            None => Activation::Pointer,
            Some(k) => Activation::Key(k.to_string()),
        };
        let outcome = match machine.activate(id, &activation) {
            Outcome::Applied(PanelMode::Collapsed) => "collapsed",
            Outcome::Applied(_) => "expanded",
            Outcome::Guarded => "ignored (toggle already in flight)",
            Outcome::InertKey => "ignored (not an activation key)",
            Outcome::Locked => "ignored (panel is locked open)",
            Outcome::UnknownPanel => "ignored (no such panel)",
        };
        machine.frame();
        eprintln!("toggle {id}: {outcome}");
    }

    for panel in &panels {
        let mode = match machine.mode(&panel.id) {
            None | Some(PanelMode::Expanded) => "expanded",
            Some(PanelMode::Collapsed) => "collapsed",
            Some(PanelMode::LockedExpanded) => "locked",
        };
        let aria = machine.aria_expanded(&panel.id).unwrap_or(true);
        println!("{}  {mode}  aria-expanded={aria}", panel.id);
    }
    return Ok(());
}

/// Emit the bootstrap payload the accordion runtime consumes, as JSON.
///
/// # Errors
///
/// Returns errors from settings resolution, snapshot reading, or JSON
/// serialization.
pub fn export(inputs: &Inputs) -> Result<(), Error> {
    let mut diagnostics = Diagnostics::new();
    let resolved = resolve_inputs(inputs, &mut diagnostics)?;

    let fingerprint = resolved.settings.fingerprint();
    let payload = rebuild::bootstrap_payload(
        &resolved.groups,
        &resolved.snapshot,
        &fingerprint,
        &mut diagnostics,
    );

    diagnostics.print();
    println!("{}", serde_json::to_string_pretty(&payload)?);
    return Ok(());
}

/// Print an ordering scaffold from the snapshot: one reference per entry,
/// in the addressable form the reconciler accepts, skipping the host's own
/// separator rows.
///
/// # Errors
///
/// Returns errors from snapshot reading.
pub fn scaffold(snapshot_path: &Path) -> Result<(), Error> {
    let snapshot = MenuSnapshot::read(snapshot_path)?;
    for entry in &snapshot.entries {
        if entry.slug.is_empty() || entry.slug.starts_with("separator") {
            continue;
        }
        println!("{}", entry.admin_href());
    }
    return Ok(());
}

/// Print the fingerprint of the resolved configuration.
///
/// # Errors
///
/// Returns errors from settings resolution.
pub fn hash(config: &Path, local: &Path) -> Result<(), Error> {
    let mut diagnostics = Diagnostics::new();
    let settings = Settings::resolve(config, local, &mut diagnostics)?;
    diagnostics.print();

    let source = match settings.source {
        SettingsSource::File => "file",
        SettingsSource::Local => "local",
    };
    println!("{}  ({source})", settings.fingerprint());
    return Ok(());
}

/// Flip one local settings toggle.
///
/// # Errors
///
/// Returns errors from key validation or local record I/O.
pub fn set(local: &Path, key: &str, value: bool) -> Result<(), Error> {
    settings::rewrite_local_flag(local, key, value)?;
    let state = if value { "on" } else { "off" };
    eprintln!("set {key} {state}");
    return Ok(());
}
