//! Core data model for sanitized uploads.
//!
//! Uploads reduce to two shapes: flat [`SanitizedRecord`] rows from spreadsheet
//! mapping specs, and a [`SchemaNode`] field tree from schema artifacts (JSON
//! samples, XSD definitions, CSV headers, spreadsheet field specs).

use serde::{Deserialize, Serialize};

use crate::error::ImportResult;

/// One sanitized mapping row from a spreadsheet field spec.
///
/// Every field is already trimmed and truncated when the record is built, and
/// there are no mutators: a record that exists passed sanitization. The row
/// sanitizer is the only producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedRecord {
    source: String,
    target: String,
    note: String,
}

impl SanitizedRecord {
    /// Create a record from already-sanitized parts.
    pub fn new(source: impl Into<String>, target: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            note: note.into(),
        }
    }

    /// Source field name. Never empty.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Target field name. Never empty.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Free-text mapping note; may be empty.
    pub fn note(&self) -> &str {
        &self.note
    }
}

/// One node of the uniform field tree built from any upload format.
///
/// The serialized shape is a compatibility contract with the storage layer and
/// the mapping UI: `title`, `key`, `children` (omitted when empty), `isLeaf`,
/// in that order. A node is a leaf exactly when it has no children. Keys are
/// unique along any root-to-node path but not globally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Human-readable label; may embed a value or type hint.
    pub title: String,
    /// Dotted path identifier restricted to `[A-Za-z0-9_.]`.
    pub key: String,
    /// Child nodes, in input order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SchemaNode>,
    /// True exactly when the node has no children.
    #[serde(rename = "isLeaf")]
    pub is_leaf: bool,
}

impl SchemaNode {
    /// Create a terminal field node.
    pub fn leaf(title: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            key: key.into(),
            children: Vec::new(),
            is_leaf: true,
        }
    }

    /// Create a grouping node over `children`.
    pub fn branch(title: impl Into<String>, key: impl Into<String>, children: Vec<SchemaNode>) -> Self {
        debug_assert!(!children.is_empty(), "a branch node requires at least one child");
        Self {
            title: title.into(),
            key: key.into(),
            children,
            is_leaf: false,
        }
    }
}

/// Replace every character outside `[A-Za-z0-9_.]` with `_`.
///
/// Applied to each path segment before it becomes part of a node key, so
/// downstream consumers can treat keys as safe identifiers.
pub fn sanitize_key(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '.' { c } else { '_' })
        .collect()
}

/// Count mappable terminal fields across a forest of root nodes.
///
/// Pure walk with no ceilings of its own; the tree is already bounded by
/// construction. Returns 0 for an empty forest. Callers needing a non-zero
/// denominator (percentage coverage) must apply their own floor.
pub fn count_leaves(nodes: &[SchemaNode]) -> usize {
    nodes
        .iter()
        .map(|node| usize::from(node.is_leaf) + count_leaves(&node.children))
        .sum()
}

/// Serialize a built tree to the JSON shape stored and consumed by the
/// mapping UI: an array of nodes carrying `title`, `key`, `children` (only
/// for branches), and `isLeaf`.
pub fn tree_to_json(nodes: &[SchemaNode]) -> ImportResult<String> {
    Ok(serde_json::to_string(nodes)?)
}

#[cfg(test)]
mod tests {
    use super::{count_leaves, sanitize_key, tree_to_json, SchemaNode};

    fn sample_forest() -> Vec<SchemaNode> {
        vec![
            SchemaNode::branch(
                "claim (object)",
                "claim",
                vec![
                    SchemaNode::leaf("id • 1", "claim.id"),
                    SchemaNode::branch(
                        "member (object)",
                        "claim.member",
                        vec![SchemaNode::leaf("first", "claim.member.first")],
                    ),
                ],
            ),
            SchemaNode::leaf("status", "status"),
        ]
    }

    #[test]
    fn sanitize_key_keeps_word_chars_and_dots() {
        assert_eq!(sanitize_key("claim.member_id"), "claim.member_id");
        assert_eq!(sanitize_key("order total ($)"), "order_total____");
        assert_eq!(sanitize_key("übung"), "_bung");
        assert_eq!(sanitize_key(""), "");
    }

    #[test]
    fn count_leaves_walks_the_whole_forest() {
        assert_eq!(count_leaves(&sample_forest()), 3);
        assert_eq!(count_leaves(&[]), 0);
    }

    #[test]
    fn leaves_serialize_without_a_children_field() {
        let json = tree_to_json(&[SchemaNode::leaf("status", "status")]).unwrap();
        assert_eq!(json, r#"[{"title":"status","key":"status","isLeaf":true}]"#);
    }

    #[test]
    fn missing_children_deserialize_as_empty() {
        let node: SchemaNode =
            serde_json::from_str(r#"{"title":"status","key":"status","isLeaf":true}"#).unwrap();
        assert!(node.children.is_empty());
        assert!(node.is_leaf);
    }
}
