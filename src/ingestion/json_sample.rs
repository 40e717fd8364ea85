//! Sample-object tree builder.
//!
//! Reduces a JSON sample document to a field tree: object entries become
//! nodes, nested objects become branches, an array contributes a single
//! representative element, and scalars become leaves whose titles carry a
//! short value preview.

use serde_json::Value;

use crate::error::ImportResult;
use crate::limits::ImportLimits;
use crate::types::{sanitize_key, SchemaNode};

use super::split_bom;

/// Longest value preview embedded in a leaf title, in characters.
const MAX_HINT_CHARS: usize = 30;
/// Characters kept before the ellipsis when a preview is clipped.
const CLIPPED_HINT_CHARS: usize = 27;

/// Build a field tree from the bytes of a JSON sample document.
///
/// A top-level object contributes one root node per entry, in document order.
/// Any other top-level value (scalar, array, empty object) is built under the
/// fallback name `root`. Subtrees nested beyond `max_depth` and leaves beyond
/// `max_leaves` are dropped silently.
///
/// Node keys are full dotted paths of sanitized segments; the representative
/// element of an array at `path` is keyed `path.0`.
pub fn tree_from_json_sample(bytes: &[u8], limits: &ImportLimits) -> ImportResult<Vec<SchemaNode>> {
    let (_, body) = split_bom(bytes);
    let sample: Value = serde_json::from_slice(body)?;

    let mut roots = Vec::new();
    let mut leaves = 0usize;
    match &sample {
        Value::Object(entries) if !entries.is_empty() => {
            for (name, value) in entries {
                let seg = sanitize_key(name);
                build_node(&mut roots, value, &seg, &seg, 1, limits, &mut leaves);
            }
        }
        other => build_node(&mut roots, other, "root", "root", 0, limits, &mut leaves),
    }
    Ok(roots)
}

/// Append the node for `value` to `siblings`, recursing into children.
///
/// `path` is the full sanitized key of this node, `seg` the display segment
/// used in its title. Does nothing once `depth` or the leaf budget runs out.
fn build_node(
    siblings: &mut Vec<SchemaNode>,
    value: &Value,
    path: &str,
    seg: &str,
    depth: usize,
    limits: &ImportLimits,
    leaves: &mut usize,
) {
    if depth >= limits.max_depth || *leaves >= limits.max_leaves {
        return;
    }
    match value {
        Value::Object(entries) => {
            if entries.is_empty() {
                push_leaf(siblings, seg, path, "(empty object)", leaves);
                return;
            }
            let mut children = Vec::new();
            for (name, child) in entries {
                let child_seg = sanitize_key(name);
                let child_path = format!("{path}.{child_seg}");
                build_node(&mut children, child, &child_path, &child_seg, depth + 1, limits, leaves);
            }
            if children.is_empty() {
                return;
            }
            siblings.push(SchemaNode::branch(format!("{seg} (object)"), path, children));
        }
        Value::Array(items) => {
            if items.is_empty() {
                push_leaf(siblings, seg, path, "(empty array)", leaves);
                return;
            }
            if let Some(first @ Value::Object(_)) = items.first() {
                let mut children = Vec::new();
                let child_path = format!("{path}.0");
                let child_seg = format!("{seg}[0]");
                build_node(&mut children, first, &child_path, &child_seg, depth + 1, limits, leaves);
                if children.is_empty() {
                    return;
                }
                siblings.push(SchemaNode::branch(format!("{seg} (array)"), path, children));
            } else {
                push_leaf(siblings, seg, path, &scalar_hint(value), leaves);
            }
        }
        scalar => push_leaf(siblings, seg, path, &scalar_hint(scalar), leaves),
    }
}

fn push_leaf(siblings: &mut Vec<SchemaNode>, seg: &str, path: &str, hint: &str, leaves: &mut usize) {
    let title = if hint.is_empty() {
        seg.to_string()
    } else {
        format!("{seg} • {}", clip_hint(hint))
    };
    siblings.push(SchemaNode::leaf(title, path));
    *leaves += 1;
}

/// Preview text for a leaf value: strings show unquoted, everything else in
/// its compact JSON form (`null` included).
fn scalar_hint(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn clip_hint(hint: &str) -> String {
    if hint.chars().count() > MAX_HINT_CHARS {
        let kept: String = hint.chars().take(CLIPPED_HINT_CHARS).collect();
        format!("{kept}…")
    } else {
        hint.to_string()
    }
}
