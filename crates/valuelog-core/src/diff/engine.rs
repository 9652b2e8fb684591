//! Type-directed comparator over captured trees.
//!
//! The entry point is [`diff_changes`]; [`diff`] renders its output to the
//! token string.

use std::collections::{BTreeMap, BTreeSet};

use crate::capture::{ByteRun, CapturedValue, Number};
use crate::diff::model::{render_changes, Change};

/// Diff two captured trees into the token string; `""` means no observable
/// difference.
pub fn diff(a: &CapturedValue, b: &CapturedValue) -> String {
    render_changes(&diff_changes(a, b))
}

/// Diff two captured trees into structured changes.
pub fn diff_changes(a: &CapturedValue, b: &CapturedValue) -> Vec<Change> {
    let mut out = Vec::new();
    diff_value(a, b, &mut out);
    out
}

fn diff_value(a: &CapturedValue, b: &CapturedValue, out: &mut Vec<Change>) {
    match (a, b) {
        (CapturedValue::Null, CapturedValue::Null) => {}
        (CapturedValue::Null, _) => out.push(Change::FromNil {
            after: b.to_string(),
        }),
        (_, CapturedValue::Null) => out.push(Change::ToNil {
            before: a.to_string(),
        }),
        (CapturedValue::Object(left), CapturedValue::Object(right)) => diff_map(left, right, out),
        (CapturedValue::Array(left), CapturedValue::Array(right)) => {
            diff_array(left, right, out)
        }
        (CapturedValue::Number(left), CapturedValue::Number(right)) => {
            out.extend(number_change(left, right))
        }
        (CapturedValue::Text(left), CapturedValue::Text(right)) => {
            if left != right {
                out.push(Change::Scalar {
                    before: format!("\"{}\"", left),
                    after: format!("\"{}\"", right),
                });
            }
        }
        (CapturedValue::Bool(left), CapturedValue::Bool(right)) => {
            if left != right {
                out.push(Change::Scalar {
                    before: left.to_string(),
                    after: right.to_string(),
                });
            }
        }
        (CapturedValue::Bytes(left), CapturedValue::Bytes(right)) => {
            out.extend(bytes_change(left, right))
        }
        // a byte run is indistinguishable from the text or array it encodes as
        (CapturedValue::Bytes(run), _) => diff_value(&run.rendered(), b, out),
        (_, CapturedValue::Bytes(run)) => diff_value(a, &run.rendered(), out),
        _ => out.push(Change::TypeChange {
            before_kind: a.kind_name(),
            after_kind: b.kind_name(),
            before: a.to_string(),
            after: b.to_string(),
        }),
    }
}

/// Integers compare exactly; as soon as one side is a float both sides are
/// compared as `f64` and rendered with six decimals.
fn number_change(a: &Number, b: &Number) -> Option<Change> {
    match (a.integer_parts(), b.integer_parts()) {
        (Some(left), Some(right)) => (left != right).then(|| Change::Scalar {
            before: a.to_string(),
            after: b.to_string(),
        }),
        _ => {
            let (left, right) = (a.as_f64(), b.as_f64());
            (left != right).then(|| Change::Scalar {
                before: format!("{:.6}", left),
                after: format!("{:.6}", right),
            })
        }
    }
}

fn bytes_change(a: &ByteRun, b: &ByteRun) -> Option<Change> {
    (a.as_bytes() != b.as_bytes()).then(|| Change::Scalar {
        before: CapturedValue::Bytes(a.clone()).to_string(),
        after: CapturedValue::Bytes(b.clone()).to_string(),
    })
}

fn diff_map(
    a: &BTreeMap<String, CapturedValue>,
    b: &BTreeMap<String, CapturedValue>,
    out: &mut Vec<Change>,
) {
    let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
    for key in keys {
        match (a.get(key), b.get(key)) {
            (None, Some(value)) => out.push(Change::NewKey {
                key: key.clone(),
                value: value.to_string(),
            }),
            (Some(value), None) => out.push(Change::DeleteKey {
                key: key.clone(),
                value: value.to_string(),
            }),
            (Some(left), Some(right)) => {
                if !diff_changes(left, right).is_empty() {
                    out.push(Change::KeyChanged {
                        key: key.clone(),
                        before: left.to_string(),
                        after: right.to_string(),
                    });
                }
            }
            (None, None) => {}
        }
    }
}

/// Greedy two-cursor alignment with one element of lookahead. On a
/// mismatch the insertion reading wins over the deletion reading, which
/// wins over replacement.
fn diff_array(a: &[CapturedValue], b: &[CapturedValue], out: &mut Vec<Change>) {
    // elements are equal when their JSON renderings are
    let left: Vec<String> = a.iter().map(ToString::to_string).collect();
    let right: Vec<String> = b.iter().map(ToString::to_string).collect();

    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if left[i] == right[j] {
            i += 1;
            j += 1;
        } else if right.get(j + 1) == Some(&left[i]) {
            out.push(Change::Insert {
                index: j,
                value: right[j].clone(),
            });
            j += 1;
        } else if left.get(i + 1) == Some(&right[j]) {
            out.push(Change::Remove {
                index: i,
                value: left[i].clone(),
            });
            i += 1;
        } else {
            let mut changes = diff_changes(&a[i], &b[j]);
            if changes.is_empty() {
                changes.push(Change::Scalar {
                    before: left[i].clone(),
                    after: right[j].clone(),
                });
            }
            out.push(Change::Replace { index: j, changes });
            i += 1;
            j += 1;
        }
    }
    for (index, value) in left.iter().enumerate().skip(i) {
        out.push(Change::Remove {
            index,
            value: value.clone(),
        });
    }
    for (index, value) in right.iter().enumerate().skip(j) {
        out.push(Change::Append {
            index,
            value: value.clone(),
        });
    }
}
