//! Integration tests for the XML schema-definition tree builder.

use schema_intake::ingestion::xsd::tree_from_xsd;
use schema_intake::limits::ImportLimits;
use schema_intake::types::{count_leaves, SchemaNode};

const NESTED_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="claim">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="id" type="xs:string"/>
        <xs:element name="member">
          <xs:complexType>
            <xs:sequence>
              <xs:element name="first" type="xs:string"/>
              <xs:element name="last" type="xs:string"/>
            </xs:sequence>
          </xs:complexType>
        </xs:element>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

const FLAT_XSD: &str = r#"<?xml version="1.0"?><xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"><xs:element name="one"/><xs:element name="two"/><xs:element name="three"/><xs:element name="four"/></xs:schema>"#;

fn build(xml: &str) -> Vec<SchemaNode> {
    tree_from_xsd(xml.as_bytes(), &ImportLimits::default()).unwrap()
}

fn utf16_with_bom(text: &str, bom: [u8; 2], to_bytes: fn(u16) -> [u8; 2]) -> Vec<u8> {
    let mut out = bom.to_vec();
    out.extend(text.encode_utf16().flat_map(to_bytes));
    out
}

#[test]
fn nested_declarations_become_branches() {
    let tree = build(NESTED_XSD);

    assert_eq!(tree.len(), 1);
    let claim = &tree[0];
    assert_eq!(claim.title, "claim");
    assert_eq!(claim.key, "claim");
    assert!(!claim.is_leaf);

    assert_eq!(claim.children.len(), 2);
    let id = &claim.children[0];
    assert_eq!(id.title, "id");
    assert_eq!(id.key, "claim.id");
    assert!(id.is_leaf);

    let member = &claim.children[1];
    assert_eq!(member.key, "claim.member");
    assert!(!member.is_leaf);
    assert_eq!(member.children[0].key, "claim.member.first");
    assert_eq!(member.children[1].key, "claim.member.last");

    assert_eq!(count_leaves(&tree), 3);
}

#[test]
fn element_matching_ignores_namespace_prefix_and_case() {
    let tree = build(
        r#"<ROOT><ELEMENT name="a"/><foo:Element name="b"/><notanelement name="c"/></ROOT>"#,
    );

    let keys: Vec<&str> = tree.iter().map(|node| node.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b"]);
}

#[test]
fn ref_only_elements_declare_nothing() {
    let tree = build(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"><xs:element ref="elsewhere"/><xs:element name="local"/></xs:schema>"#,
    );

    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].key, "local");
}

#[test]
fn entity_escapes_in_names_are_resolved() {
    let tree = build(
        r#"<schema><element name="a&amp;b"/></schema>"#,
    );

    assert_eq!(tree[0].title, "a&b");
    assert_eq!(tree[0].key, "a_b");
}

#[test]
fn schema_without_declarations_yields_the_fallback_leaf() {
    let tree = build("<note><to>somebody</to></note>");

    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].title, "schema");
    assert_eq!(tree[0].key, "root");
    assert!(tree[0].is_leaf);
}

#[test]
fn declarations_past_the_depth_ceiling_are_dropped() {
    let limits = ImportLimits {
        max_depth: 2,
        ..ImportLimits::default()
    };
    let tree = tree_from_xsd(NESTED_XSD.as_bytes(), &limits).unwrap();

    // Everything under `claim` is out of budget, so it finishes childless.
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].key, "claim");
    assert!(tree[0].is_leaf);
}

#[test]
fn leaves_past_the_budget_are_dropped() {
    let limits = ImportLimits {
        max_leaves: 2,
        ..ImportLimits::default()
    };
    let tree = tree_from_xsd(FLAT_XSD.as_bytes(), &limits).unwrap();

    let keys: Vec<&str> = tree.iter().map(|node| node.key.as_str()).collect();
    assert_eq!(keys, vec!["one", "two"]);
}

#[test]
fn utf16_le_with_bom_is_decoded() {
    let bytes = utf16_with_bom(FLAT_XSD, [0xFF, 0xFE], u16::to_le_bytes);
    let tree = tree_from_xsd(&bytes, &ImportLimits::default()).unwrap();

    assert_eq!(tree.len(), 4);
    assert_eq!(tree[0].key, "one");
}

#[test]
fn utf16_be_with_bom_is_decoded() {
    let bytes = utf16_with_bom(FLAT_XSD, [0xFE, 0xFF], u16::to_be_bytes);
    let tree = tree_from_xsd(&bytes, &ImportLimits::default()).unwrap();

    assert_eq!(tree.len(), 4);
}

#[test]
fn bomless_utf16_le_is_detected_from_the_prolog() {
    let bytes: Vec<u8> = FLAT_XSD.encode_utf16().flat_map(u16::to_le_bytes).collect();
    let tree = tree_from_xsd(&bytes, &ImportLimits::default()).unwrap();

    assert_eq!(tree.len(), 4);
}

#[test]
fn junk_before_the_prolog_is_skipped() {
    let mut bytes = b"\xef\xbb\xbf".to_vec();
    bytes.extend_from_slice(b"-- export log --\n<?xml version=\"1.0\"?><schema><element name=\"a\"/></schema>");
    let tree = tree_from_xsd(&bytes, &ImportLimits::default()).unwrap();

    assert_eq!(tree[0].key, "a");
}

#[test]
fn junk_before_a_prologless_document_is_skipped() {
    let tree = build("saved from editor <schema><element name=\"a\"/></schema>");

    assert_eq!(tree[0].key, "a");
}

#[test]
fn mismatched_tags_are_a_parse_failure() {
    let err = tree_from_xsd(
        b"<xs:schema><xs:element name=\"a\"></wrong></xs:schema>",
        &ImportLimits::default(),
    )
    .unwrap_err();

    assert!(err.to_string().contains("parse failure"), "got: {err}");
}
