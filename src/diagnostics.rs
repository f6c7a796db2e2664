//! Expansion of value reference tokens in FMU log messages.
//!
//! FMI 1.0 units refer to variables in log messages by type tag and value reference, e.g.
//! `"#r12# must be positive"`, and escape a literal `#` as `##`. [`format`] replaces each
//! reference with the variable name, or `?` when no variable matches.

use std::fmt::Display;

use crate::descriptor::VariableEntry;

/// Maximum length in bytes of an expanded message. Longer output is truncated.
pub const MAX_MESSAGE_LEN: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedKind {
    /// A `#` without a closing `#`
    Unterminated,
    /// The text between the tag and the closing `#` is not a value reference
    InvalidValueReference,
}

impl Display for MalformedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedKind::Unterminated => write!(f, "unmatched '#'"),
            MalformedKind::InvalidValueReference => write!(f, "illegal value reference"),
        }
    }
}

/// A token that stopped expansion. Never fatal; reported alongside the partial text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at byte {position}")]
pub struct MalformedToken {
    /// Byte offset of the opening `#` in the input
    pub position: usize,
    pub kind: MalformedKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Formatted {
    pub text: String,
    pub notes: Vec<MalformedToken>,
}

/// Name of the first variable declared with the given tag and value reference.
pub fn lookup(variables: &[VariableEntry], tag: char, value_reference: u32) -> Option<&str> {
    variables
        .iter()
        .find(|var| {
            var.value_reference == value_reference
                && var.scalar_type.is_some_and(|ty| ty.tag() == tag)
        })
        .map(|var| var.name.as_str())
}

fn parse_value_reference(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Append as much of `s` as fits; returns `false` once the output is full.
fn push_bounded(out: &mut String, s: &str) -> bool {
    let room = MAX_MESSAGE_LEN - out.len();
    if s.len() <= room {
        out.push_str(s);
        true
    } else {
        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        out.push_str(&s[..cut]);
        false
    }
}

/// Expand `##` and `#<tag><vr>#` tokens in `message`.
///
/// A malformed token ends expansion: the `#` is kept, the rest of the input is dropped and a
/// [`MalformedToken`] note is recorded.
pub fn format(message: &str, variables: &[VariableEntry]) -> Formatted {
    let mut out = String::with_capacity(message.len().min(MAX_MESSAGE_LEN));
    let mut notes = Vec::new();
    let mut offset = 0;

    while let Some(i) = message[offset..].find('#') {
        let hash = offset + i;
        if !push_bounded(&mut out, &message[offset..hash]) {
            return Formatted { text: out, notes };
        }

        let body_start = hash + 1;
        let Some(len) = message[body_start..].find('#') else {
            push_bounded(&mut out, "#");
            notes.push(MalformedToken {
                position: hash,
                kind: MalformedKind::Unterminated,
            });
            return Formatted { text: out, notes };
        };

        let body = &message[body_start..body_start + len];
        let mut chars = body.chars();
        let replacement = match chars.next() {
            // ##
            None => "#",
            Some(tag) => match parse_value_reference(chars.as_str()) {
                Some(vr) => lookup(variables, tag, vr).unwrap_or("?"),
                None => {
                    push_bounded(&mut out, "#");
                    notes.push(MalformedToken {
                        position: hash,
                        kind: MalformedKind::InvalidValueReference,
                    });
                    return Formatted { text: out, notes };
                }
            },
        };

        if !push_bounded(&mut out, replacement) {
            return Formatted { text: out, notes };
        }
        offset = body_start + len + 1;
    }

    push_bounded(&mut out, &message[offset..]);
    Formatted { text: out, notes }
}
