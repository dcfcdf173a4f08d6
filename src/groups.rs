//! Group builder: fold the token stream into ordered separator-delimited groups.

use crate::parser::{SeparatorStyle, Token};

/// The divider that opens a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Separator {
    /// A divider with display text and style parameters.
    Labeled(
        /// The separator's parsed style.
        SeparatorStyle,
    ),
    /// An unlabeled horizontal rule.
    Plain,
}

impl Separator {
    /// The display label, empty for plain separators.
    pub fn label(&self) -> &str {
        return match self {
            Separator::Labeled(style) => &style.text,
            Separator::Plain => "",
        };
    }
}

/// An ordered run of menu references under one separator. The first group of
/// a configuration may carry no separator (a leading run of references);
/// every other group starts at exactly one separator token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// References in source order, still in operator-written form.
    pub members: Vec<String>,
    /// The opening divider, or None for the leading separator-less group.
    pub separator: Option<Separator>,
}

impl Group {
    /// A group is materialized only if it has a separator or members.
    fn is_empty(&self) -> bool {
        return self.separator.is_none() && self.members.is_empty();
    }
}

/// Fold tokens into groups. Boundaries occur exactly at separator tokens;
/// source order is preserved: concatenating each group's members reproduces
/// the token stream's menu references in order.
pub fn build(tokens: &[Token]) -> Vec<Group> {
    let mut groups = Vec::new();
    let mut current = Group { members: Vec::new(), separator: None };

    for token in tokens {
        match token {
            Token::LabeledSeparator(style) => {
                close_group(&mut groups, &mut current, Separator::Labeled(style.clone()));
            },
            Token::PlainSeparator => {
                close_group(&mut groups, &mut current, Separator::Plain);
            },
            Token::MenuReference { raw } => {
                current.members.push(raw.clone());
            },
        }
    }

    if !current.is_empty() {
        groups.push(current);
    }

    return groups;
}

/// Push the accumulator if non-empty and start a new group at `separator`.
fn close_group(groups: &mut Vec<Group>, current: &mut Group, separator: Separator) {
    let next = Group { members: Vec::new(), separator: Some(separator) };
    let previous = std::mem::replace(current, next);
    if !previous.is_empty() {
        groups.push(previous);
    }
    return;
}
