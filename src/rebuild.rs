//! Group filter and menu rebuilder: turn resolved groups plus the runtime
//! snapshot into the final ordered slot sequence.
//!
//! This is a pure function over borrowed inputs: nothing here mutates the
//! snapshot, and the caller owns the one narrow boundary where the result
//! is written anywhere.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::groups::Separator;
use crate::parser::{SeparatorStyle, validate_color};
use crate::reconcile::{ResolvedGroup, canonicalize};
use crate::snapshot::{MenuEntry, MenuSnapshot};

/// One row of the final menu. Position is the slot's index: strictly
/// increasing from zero, no gaps, no duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// A real menu entry.
    Entry {
        /// Separator id of the accordion group this entry belongs to, when
        /// the entry sits under a labeled separator. Plain separators and
        /// unspecified entries carry no group.
        group: Option<String>,
        /// The runtime slug.
        slug: String,
        /// Display title from the snapshot.
        title: String,
    },
    /// A synthesized divider row.
    Separator {
        /// Stable per-position identifier (`separator-group-<n>` for labeled,
        /// `separator-custom-<n>` for plain).
        id: String,
        /// True when this group contains the current request's location:
        /// the separator cannot be collapsed.
        locked: bool,
        /// Style of a labeled separator; None for a plain rule.
        style: Option<SeparatorStyle>,
    },
}

/// An accordion-eligible panel derived from the rebuilt menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    /// The labeled separator's id.
    pub id: String,
    /// Whether the panel is locked open.
    pub locked: bool,
}

/// The rebuilt menu in final order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderedMenu {
    /// Slots in output order.
    pub slots: Vec<Slot>,
}

impl ReorderedMenu {
    /// The accordion-eligible panels, in menu order: labeled separators only.
    pub fn panels(&self) -> Vec<Panel> {
        return self
            .slots
            .iter()
            .filter_map(|slot| {
                let Slot::Separator { id, locked, style: Some(_) } = slot else {
                    return None;
                };
                return Some(Panel { id: id.clone(), locked: *locked });
            })
            .collect();
    }
}

/// Drop separator-carrying groups whose members all failed to resolve.
/// The separator-less leading group is never dropped on that basis.
pub fn filter_groups(
    groups: &[ResolvedGroup],
    diagnostics: &mut Diagnostics,
) -> Vec<ResolvedGroup> {
    return groups
        .iter()
        .filter(|group| {
            if group.separator.is_none() || !group.members.is_empty() {
                return true;
            }
            let label = group
                .separator
                .as_ref()
                .map(Separator::label)
                .unwrap_or("")
                .to_string();
            diagnostics.push(Diagnostic::EmptyGroupDropped { label });
            return false;
        })
        .cloned()
        .collect();
}

/// Produce the final ordered menu: filtered groups first (separators
/// interleaved with their resolved members), then, unless
/// `hide_unspecified`, every runtime entry no group consumed, in original
/// relative order.
///
/// Deterministic over its inputs and idempotent: identical inputs always
/// yield identical output.
pub fn reorder(
    groups: &[ResolvedGroup],
    snapshot: &MenuSnapshot,
    current: Option<&str>,
    hide_unspecified: bool,
    diagnostics: &mut Diagnostics,
) -> ReorderedMenu {
    let surviving = filter_groups(groups, diagnostics);

    let by_slug: HashMap<&str, &MenuEntry> = snapshot
        .entries
        .iter()
        .map(|entry| return (entry.slug.as_str(), entry))
        .collect();

    let mut slots = Vec::new();
    let mut consumed: HashSet<&str> = HashSet::new();
    // Labeled and plain separators number independently, so inserting a
    // plain rule never renumbers the accordion groups around it.
    let mut labeled_count: usize = 0;
    let mut plain_count: usize = 0;

    for group in &surviving {
        let mut group_id = None;

        if let Some(separator) = &group.separator {
            let locked = is_locked(separator, &group.members, current);
            let (id, style) = match separator {
                Separator::Labeled(style) => {
                    labeled_count = labeled_count.saturating_add(1);
                    let id = format!("separator-group-{labeled_count}");
                    group_id = Some(id.clone());
                    (id, Some(style.clone()))
                },
                Separator::Plain => {
                    plain_count = plain_count.saturating_add(1);
                    (format!("separator-custom-{plain_count}"), None)
                },
            };
            slots.push(Slot::Separator { id, locked, style });
        }

        for slug in &group.members {
            let Some(entry) = by_slug.get(slug.as_str()) else {
                continue;
            };
            // A slug configured twice is consumed once, at its first position.
            if !consumed.insert(entry.slug.as_str()) {
                continue;
            }
            slots.push(Slot::Entry {
                group: group_id.clone(),
                slug: entry.slug.clone(),
                title: entry.title.clone(),
            });
        }
    }

    if !hide_unspecified {
        for entry in &snapshot.entries {
            if consumed.contains(entry.slug.as_str()) {
                continue;
            }
            slots.push(Slot::Entry {
                group: None,
                slug: entry.slug.clone(),
                title: entry.title.clone(),
            });
        }
    }

    return ReorderedMenu { slots };
}

/// A group is locked when its labeled separator's members contain the
/// current location. Plain separators are never interactive, never locked.
fn is_locked(separator: &Separator, members: &[String], current: Option<&str>) -> bool {
    if !matches!(separator, Separator::Labeled(_)) {
        return false;
    }
    let Some(current) = current else {
        return false;
    };
    return members.iter().any(|slug| return slug == current);
}

/// The bootstrap data handed from server to client at page-load time:
/// configuration fingerprint plus the accordion groups, members expressed
/// as canonical admin-relative hrefs for the legacy DOM-matching path.
#[derive(Debug, Serialize)]
pub struct BootstrapPayload {
    /// Fingerprint of the authoritative configuration.
    pub config_hash: String,
    /// Accordion-eligible groups in menu order.
    pub groups: Vec<PayloadGroup>,
}

/// One accordion group in the bootstrap payload.
#[derive(Debug, Serialize)]
pub struct PayloadGroup {
    /// Validated icon color, empty when unset or rejected.
    pub icon_color: String,
    /// Canonical hrefs of the group's members.
    pub members: Vec<String>,
    /// The labeled separator's id.
    pub separator_id: String,
}

/// Build the client bootstrap payload from the filtered groups. Separator
/// numbering follows the same rule as `reorder`, so ids line up with the
/// rebuilt menu.
pub fn bootstrap_payload(
    groups: &[ResolvedGroup],
    snapshot: &MenuSnapshot,
    config_hash: &str,
    diagnostics: &mut Diagnostics,
) -> BootstrapPayload {
    let surviving = filter_groups(groups, diagnostics);

    let by_slug: HashMap<&str, &MenuEntry> = snapshot
        .entries
        .iter()
        .map(|entry| return (entry.slug.as_str(), entry))
        .collect();

    let mut payload_groups = Vec::new();
    let mut labeled_count: usize = 0;

    for group in &surviving {
        let Some(Separator::Labeled(style)) = &group.separator else {
            continue;
        };
        labeled_count = labeled_count.saturating_add(1);

        let members = group
            .members
            .iter()
            .filter_map(|slug| return by_slug.get(slug.as_str()))
            .map(|entry| return canonicalize(&entry.admin_href()))
            .collect();

        let icon_color = style
            .icon
            .as_deref()
            .and_then(validate_color)
            .unwrap_or_default();

        payload_groups.push(PayloadGroup {
            icon_color,
            members,
            separator_id: format!("separator-group-{labeled_count}"),
        });
    }

    return BootstrapPayload {
        config_hash: config_hash.to_string(),
        groups: payload_groups,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::build;
    use crate::parser::parse;
    use crate::reconcile::{RuntimeIndex, resolve};
    use crate::snapshot::MenuEntry;

    fn snapshot(slugs: &[&str]) -> MenuSnapshot {
        return MenuSnapshot {
            entries: slugs
                .iter()
                .map(|slug| {
                    return MenuEntry {
                        plugin_page: false,
                        slug: (*slug).to_string(),
                        title: (*slug).to_string(),
                    };
                })
                .collect(),
        };
    }

    fn pipeline(
        text: &str,
        snapshot: &MenuSnapshot,
        current: Option<&str>,
        hide_unspecified: bool,
    ) -> ReorderedMenu {
        let mut diagnostics = Diagnostics::new();
        let index = RuntimeIndex::build(snapshot, &mut diagnostics);
        let resolved = resolve(&build(&parse(text)), &index, &mut diagnostics);
        return reorder(&resolved, snapshot, current, hide_unspecified, &mut diagnostics);
    }

    fn slot_names(menu: &ReorderedMenu) -> Vec<String> {
        return menu
            .slots
            .iter()
            .map(|slot| {
                return match slot {
                    Slot::Entry { slug, .. } => slug.clone(),
                    Slot::Separator { id, .. } => id.clone(),
                };
            })
            .collect();
    }

    #[test]
    fn unspecified_entries_append_in_original_order() {
        // Scenario A.
        let snap = snapshot(&["index.php", "edit.php", "tools.php", "plugins.php"]);
        let menu = pipeline("index.php\nseparator: Group1\nedit.php\ntools.php", &snap, None, false);
        assert_eq!(
            slot_names(&menu),
            vec!["index.php", "separator-group-1", "edit.php", "tools.php", "plugins.php"]
        );
    }

    #[test]
    fn hide_unspecified_omits_unconsumed_entries() {
        // Scenario B.
        let snap = snapshot(&["index.php", "edit.php", "tools.php", "plugins.php"]);
        let menu = pipeline("index.php\nseparator: Group1\nedit.php\ntools.php", &snap, None, true);
        assert_eq!(
            slot_names(&menu),
            vec!["index.php", "separator-group-1", "edit.php", "tools.php"]
        );
    }

    #[test]
    fn unresolvable_reference_only_drops_itself() {
        // Scenario C.
        let snap = snapshot(&["index.php", "edit.php", "tools.php"]);
        let menu =
            pipeline("separator: G\nedit.php\ndoes-not-exist.php\ntools.php", &snap, None, true);
        assert_eq!(slot_names(&menu), vec!["separator-group-1", "edit.php", "tools.php"]);
    }

    #[test]
    fn empty_groups_are_dropped_and_numbering_skips_them() {
        let snap = snapshot(&["a.php", "b.php"]);
        let menu = pipeline("separator: Ghost\nmissing.php\nseparator: Real\na.php", &snap, None, true);
        // The ghost group vanishes entirely; the surviving separator is group 1.
        assert_eq!(slot_names(&menu), vec!["separator-group-1", "a.php"]);
    }

    #[test]
    fn plain_separators_use_the_custom_id_form() {
        let snap = snapshot(&["a.php", "b.php"]);
        let menu = pipeline("a.php\nseparator\nb.php", &snap, None, true);
        assert_eq!(slot_names(&menu), vec!["a.php", "separator-custom-1", "b.php"]);
        // Plain separator members carry no group annotation.
        assert!(matches!(menu.slots.get(2), Some(Slot::Entry { group: None, .. })));
    }

    #[test]
    fn members_under_labeled_separator_carry_its_group_id() {
        let snap = snapshot(&["a.php"]);
        let menu = pipeline("separator: S\na.php", &snap, None, true);
        assert!(matches!(
            menu.slots.get(1),
            Some(Slot::Entry { group: Some(id), .. }) if id == "separator-group-1"
        ));
    }

    #[test]
    fn current_location_locks_its_separator_only() {
        let snap = snapshot(&["a.php", "b.php"]);
        let menu = pipeline("separator: S1\na.php\nseparator: S2\nb.php", &snap, Some("b.php"), true);
        let panels = menu.panels();
        assert_eq!(
            panels,
            vec![
                Panel { id: "separator-group-1".to_string(), locked: false },
                Panel { id: "separator-group-2".to_string(), locked: true },
            ]
        );
    }

    #[test]
    fn labeled_and_plain_separators_number_independently() {
        let snap = snapshot(&["a.php", "b.php", "c.php"]);
        let text = "separator: S1\na.php\nseparator\nb.php\nseparator: S2\nc.php";
        let menu = pipeline(text, &snap, None, true);
        assert_eq!(
            slot_names(&menu),
            vec![
                "separator-group-1",
                "a.php",
                "separator-custom-1",
                "b.php",
                "separator-group-2",
                "c.php",
            ]
        );
    }

    #[test]
    fn payload_ids_survive_an_interleaved_plain_separator() {
        let snap = snapshot(&["a.php", "b.php"]);
        let mut diagnostics = Diagnostics::new();
        let index = RuntimeIndex::build(&snap, &mut diagnostics);
        let resolved = resolve(
            &build(&parse("separator\na.php\nseparator: S\nb.php")),
            &index,
            &mut diagnostics,
        );

        let menu = reorder(&resolved, &snap, None, true, &mut diagnostics);
        let payload = bootstrap_payload(&resolved, &snap, "h", &mut diagnostics);

        // The plain rule does not shift the labeled group's number, and the
        // payload id matches the rebuilt menu's.
        assert!(slot_names(&menu).contains(&"separator-group-1".to_string()));
        let Some(group) = payload.groups.first() else { panic!("missing group") };
        assert_eq!(group.separator_id, "separator-group-1");
    }

    #[test]
    fn duplicate_reference_is_consumed_once() {
        let snap = snapshot(&["a.php", "b.php"]);
        let menu = pipeline("a.php\na.php\nb.php", &snap, None, true);
        assert_eq!(slot_names(&menu), vec!["a.php", "b.php"]);
    }

    #[test]
    fn reorder_is_deterministic_and_idempotent() {
        let snap = snapshot(&["x.php", "y.php", "z.php"]);
        let text = "separator: G\ny.php\nx.php";
        let first = pipeline(text, &snap, None, false);
        let second = pipeline(text, &snap, None, false);
        assert_eq!(first, second);
    }

    #[test]
    fn payload_ids_match_rebuilt_menu_and_hrefs_are_canonical() {
        let snap = MenuSnapshot {
            entries: vec![
                MenuEntry { plugin_page: false, slug: "index.php".to_string(), title: String::new() },
                MenuEntry { plugin_page: true, slug: "filemgr".to_string(), title: String::new() },
            ],
        };
        let mut diagnostics = Diagnostics::new();
        let index = RuntimeIndex::build(&snap, &mut diagnostics);
        let resolved = resolve(
            &build(&parse("index.php\nseparator: Plugins|#fff|#333|#333|#666\nfilemgr")),
            &index,
            &mut diagnostics,
        );
        let payload = bootstrap_payload(&resolved, &snap, "abc123", &mut diagnostics);

        assert_eq!(payload.config_hash, "abc123");
        assert_eq!(payload.groups.len(), 1);
        let Some(group) = payload.groups.first() else { panic!("missing group") };
        assert_eq!(group.separator_id, "separator-group-1");
        assert_eq!(group.members, vec!["admin.php?page=filemgr"]);
        assert_eq!(group.icon_color, "#666");
    }

    #[test]
    fn payload_rejects_unsafe_icon_colors() {
        let snap = snapshot(&["a.php"]);
        let mut diagnostics = Diagnostics::new();
        let index = RuntimeIndex::build(&snap, &mut diagnostics);
        let resolved = resolve(
            &build(&parse("separator: S|#fff|#333|#333|expression(alert(1))\na.php")),
            &index,
            &mut diagnostics,
        );
        let payload = bootstrap_payload(&resolved, &snap, "h", &mut diagnostics);
        let Some(group) = payload.groups.first() else { panic!("missing group") };
        assert_eq!(group.icon_color, "");
    }
}
