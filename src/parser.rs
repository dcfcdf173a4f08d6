//! Line-oriented parser for the menu ordering grammar.
//!
//! One directive per line:
//!
//! - `#...` or blank: comment, ignored
//! - `separator`: plain divider
//! - `separator: <text>[|<bg>[|<fg>[|<border>[|<icon>]]]]`: labeled divider
//! - anything else: a menu reference in whatever form the operator typed
//!
//! The grammar is permissive: no line is ever a parse error. Text that
//! matches no special form is a menu reference, and reconciliation decides
//! later whether it points at anything.

use std::sync::LazyLock;

use regex::Regex;

/// Hex color forms accepted in separator style slots: #RGB, #RRGGBB, #RRGGBBAA.
static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^#(?:[0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$")
        .expect("valid regex");
});

/// Display parameters of a labeled separator, pipe-delimited in the source
/// text in fixed order. Every slot after the label is optional and unvalidated
/// here; `validate_color` is applied at emission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeparatorStyle {
    /// Background color slot (part 1).
    pub background: Option<String>,
    /// Left-border color slot (part 3).
    pub border: Option<String>,
    /// Accordion icon color slot (part 4).
    pub icon: Option<String>,
    /// The label text. May be empty: a bare `separator:` still produces a
    /// labeled separator with no visible text.
    pub text: String,
    /// Text color slot (part 2).
    pub text_color: Option<String>,
}

/// One parsed directive from the ordering text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A divider with display text and optional style parameters.
    LabeledSeparator(
        /// The parsed style slots.
        SeparatorStyle,
    ),
    /// An identifier as written by the operator: bare slug, query form,
    /// path-with-extension form, or full URL.
    MenuReference {
        /// The raw trimmed line.
        raw: String,
    },
    /// An unlabeled divider.
    PlainSeparator,
}

/// Parse ordering text into tokens. Blank lines and `#` comments produce
/// no token; everything else produces exactly one.
pub fn parse(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("separator:") {
            tokens.push(Token::LabeledSeparator(parse_style(rest)));
            continue;
        }

        if line == "separator" {
            tokens.push(Token::PlainSeparator);
            continue;
        }

        tokens.push(Token::MenuReference { raw: line.to_string() });
    }

    return tokens;
}

/// Split the text after `separator:` into label + up to four color slots.
fn parse_style(rest: &str) -> SeparatorStyle {
    let mut parts = rest.splitn(5, '|');

    let text = parts.next().unwrap_or("").trim().to_string();
    let background = next_slot(&mut parts);
    let text_color = next_slot(&mut parts);
    let border = next_slot(&mut parts);
    let icon = next_slot(&mut parts);

    return SeparatorStyle { background, border, icon, text, text_color };
}

/// Take the next pipe-delimited slot, trimmed; absent or empty slots are None.
fn next_slot<'a, I: Iterator<Item = &'a str>>(parts: &mut I) -> Option<String> {
    let part = parts.next()?.trim();
    if part.is_empty() {
        return None;
    }
    return Some(part.to_string());
}

/// Validate a color slot against the safe subset: hex forms or the
/// `transparent` / `inherit` / `currentcolor` keywords (matched
/// case-insensitively, returned lowercased). Anything else is discarded:
/// style slots end up inside generated CSS, so unknown values never pass
/// through verbatim.
pub fn validate_color(color: &str) -> Option<String> {
    if color.is_empty() {
        return None;
    }

    if HEX_COLOR.is_match(color) {
        return Some(color.to_string());
    }

    let lowered = color.to_lowercase();
    if matches!(lowered.as_str(), "transparent" | "inherit" | "currentcolor") {
        return Some(lowered);
    }

    return None;
}
