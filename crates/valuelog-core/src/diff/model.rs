//! Structured change records produced by the diff engine.
//!
//! Each [`Change`] renders (via `Display`) to exactly one bracket-delimited
//! token; a diff string is the concatenation of its changes with no
//! separator. JSON payloads are stored pre-rendered so that a change can
//! outlive the trees it was computed from.

use std::fmt;

/// One difference between two captured trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// `[nil to J]`
    FromNil { after: String },
    /// `[J to nil]`
    ToNil { before: String },
    /// `[type change K1 -> K2: J1 -> J2]`
    TypeChange {
        before_kind: &'static str,
        after_kind: &'static str,
        before: String,
        after: String,
    },
    /// `[a->b]` for numbers, bools and byte runs; text sides arrive quoted.
    Scalar { before: String, after: String },
    /// `[new key "k": J]`
    NewKey { key: String, value: String },
    /// `[delete key "k" was J]`
    DeleteKey { key: String, value: String },
    /// `[k: J1 -> J2]`
    KeyChanged {
        key: String,
        before: String,
        after: String,
    },
    /// `[insert[j]: J]`
    Insert { index: usize, value: String },
    /// `[remove[i]: J]`
    Remove { index: usize, value: String },
    /// `[replace[j]: SUB]`; `changes` is never empty.
    Replace { index: usize, changes: Vec<Change> },
    /// `[append[j]: J]`
    Append { index: usize, value: String },
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::FromNil { after } => write!(f, "[nil to {}]", after),
            Change::ToNil { before } => write!(f, "[{} to nil]", before),
            Change::TypeChange {
                before_kind,
                after_kind,
                before,
                after,
            } => write!(
                f,
                "[type change {} -> {}: {} -> {}]",
                before_kind, after_kind, before, after
            ),
            Change::Scalar { before, after } => write!(f, "[{}->{}]", before, after),
            Change::NewKey { key, value } => write!(f, "[new key \"{}\": {}]", key, value),
            Change::DeleteKey { key, value } => {
                write!(f, "[delete key \"{}\" was {}]", key, value)
            }
            Change::KeyChanged { key, before, after } => {
                write!(f, "[{}: {} -> {}]", key, before, after)
            }
            Change::Insert { index, value } => write!(f, "[insert[{}]: {}]", index, value),
            Change::Remove { index, value } => write!(f, "[remove[{}]: {}]", index, value),
            Change::Replace { index, changes } => {
                write!(f, "[replace[{}]: ", index)?;
                for change in changes {
                    write!(f, "{}", change)?;
                }
                f.write_str("]")
            }
            Change::Append { index, value } => write!(f, "[append[{}]: {}]", index, value),
        }
    }
}

/// Concatenate changes into the diff string; `""` means no difference.
pub fn render_changes(changes: &[Change]) -> String {
    let mut out = String::new();
    for change in changes {
        out.push_str(&change.to_string());
    }
    out
}
