//! Identifier reconciliation: map operator-written references onto the
//! runtime menu's internal slugs.
//!
//! Operators have historically written references in four forms (bare slug,
//! dispatcher query `admin.php?page=x`, path-with-extension page values,
//! and full URLs), while the runtime's internal slug is yet another thing:
//! a plugin page's slug is not its addressable path. Both sides are pushed
//! through the *same* normalization function into one canonical key space.
//! Splitting that normalization in two is a known defect class (the matching
//! bug here was historically fixed by unifying it), so `canonicalize` is the
//! only door.

use std::collections::HashMap;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::groups::{Group, Separator};
use crate::snapshot::MenuSnapshot;

/// Normalize a reference or derived href into the canonical
/// "admin-relative path + query" key used for matching.
///
/// - full URLs lose scheme and host, keeping path + query
/// - anything under a `/wp-admin/` path segment is taken relative to it
/// - a leading `/` or `wp-admin/` prefix is stripped
/// - bare slugs (no `.php`, no `?`, no `/`) become `admin.php?page=<slug>`
/// - page values of the `dir/file.php` form (slash + extension, no query)
///   also become `admin.php?page=<value>`; plugin pages registered under a
///   path are addressed through the dispatcher
///
/// Idempotent: applying it to its own output changes nothing.
pub fn canonicalize(reference: &str) -> String {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut value = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        strip_scheme_and_host(trimmed)
    } else {
        trimmed.to_string()
    };

    value = value.trim_start_matches('/').to_string();
    if let Some(rest) = value.strip_prefix("wp-admin/") {
        value = rest.to_string();
    }

    let has_extension = value.contains(".php");
    let has_query = value.contains('?');
    let has_slash = value.contains('/');
    let is_dispatcher = value.starts_with("admin.php");

    if !has_extension && !has_query && !has_slash && !is_dispatcher {
        return format!("admin.php?page={value}");
    }

    if has_slash && has_extension && !has_query && !is_dispatcher {
        return format!("admin.php?page={value}");
    }

    return value;
}

/// Reduce a full URL to its admin-relative path plus query string.
fn strip_scheme_and_host(url: &str) -> String {
    let rest = match url.split_once("://") {
        None => url,
        Some((_, rest)) => rest,
    };

    // Everything before the first `/` or `?` is the host.
    let path_and_query = match rest.find(['/', '?']) {
        None => "",
        Some(idx) => rest.get(idx..).unwrap_or(""),
    };

    let (path, query) = match path_and_query.split_once('?') {
        None => (path_and_query, ""),
        Some((p, q)) => (p, q),
    };

    let path = match path.find("/wp-admin/") {
        None => path.trim_start_matches('/'),
        Some(idx) => path.get(idx.saturating_add("/wp-admin/".len())..).unwrap_or(""),
    };

    if query.is_empty() {
        return path.to_string();
    }
    return format!("{path}?{query}");
}

/// Canonical key → runtime slug, built once per reordering pass.
#[derive(Debug)]
pub struct RuntimeIndex {
    by_key: HashMap<String, String>,
}

impl RuntimeIndex {
    /// Index every runtime entry by the canonical key of its derived href.
    /// First-registered entry wins on collision; later duplicates are
    /// reported through the diagnostic side channel, never fatal.
    pub fn build(snapshot: &MenuSnapshot, diagnostics: &mut Diagnostics) -> Self {
        let mut by_key: HashMap<String, String> = HashMap::new();

        for entry in &snapshot.entries {
            if entry.slug.is_empty() {
                continue;
            }
            let key = canonicalize(&entry.admin_href());
            if key.is_empty() {
                continue;
            }
            match by_key.get(&key) {
                Some(kept) => {
                    diagnostics.push(Diagnostic::KeyCollision {
                        dropped: entry.slug.clone(),
                        kept: kept.clone(),
                        key,
                    });
                },
                None => {
                    by_key.insert(key, entry.slug.clone());
                },
            }
        }

        return Self { by_key };
    }

    /// Resolve one reference to a runtime slug, if any entry matches.
    pub fn lookup(&self, reference: &str) -> Option<&str> {
        let key = canonicalize(reference);
        if key.is_empty() {
            return None;
        }
        return self.by_key.get(&key).map(String::as_str);
    }
}

/// A group whose members have been resolved to concrete runtime slugs.
/// Unmatched references are already gone; whether a zero-member group
/// survives is the rebuilder's decision, not ours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGroup {
    /// Matched runtime slugs, in configured order.
    pub members: Vec<String>,
    /// The opening divider, carried through unchanged.
    pub separator: Option<Separator>,
}

/// Resolve every group's members against the runtime index. Misses are
/// dropped silently from the group but recorded as diagnostics.
pub fn resolve(
    groups: &[Group],
    index: &RuntimeIndex,
    diagnostics: &mut Diagnostics,
) -> Vec<ResolvedGroup> {
    return groups
        .iter()
        .map(|group| {
            let mut members = Vec::with_capacity(group.members.len());
            for reference in &group.members {
                match index.lookup(reference) {
                    Some(slug) => members.push(slug.to_string()),
                    None => diagnostics.push(Diagnostic::UnresolvedReference {
                        reference: reference.clone(),
                    }),
                }
            }
            return ResolvedGroup { members, separator: group.separator.clone() };
        })
        .collect();
}

/// Resolve the current request location through the same canonical path as
/// every other reference, so any accepted written form works.
pub fn resolve_current(location: &str, index: &RuntimeIndex) -> Option<String> {
    return index.lookup(location).map(str::to_string);
}
