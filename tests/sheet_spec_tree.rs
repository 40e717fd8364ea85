//! Integration tests for the workbook field-spec tree builder.

use rust_xlsxwriter::Workbook;
use schema_intake::ingestion::sheet_spec::tree_from_sheet_spec;
use schema_intake::limits::ImportLimits;
use schema_intake::types::SchemaNode;

fn spec_workbook(header: &[&str], rows: &[&[&str]]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();
    for (col, cell) in header.iter().enumerate() {
        ws.write_string(0, col as u16, *cell).unwrap();
    }
    for (i, row) in rows.iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            ws.write_string((i + 1) as u32, col as u16, *cell).unwrap();
        }
    }
    workbook.save_to_buffer().unwrap()
}

fn titles(tree: &[SchemaNode]) -> Vec<&str> {
    tree.iter().map(|node| node.title.as_str()).collect()
}

#[test]
fn rows_become_leaves_titled_with_present_parts() {
    let bytes = spec_workbook(
        &["Field Name", "Data Type", "Requirement"],
        &[
            &["member_id", "string", "required"],
            &["plan", "varchar", ""],
            &["group", "", ""],
        ],
    );

    let tree = tree_from_sheet_spec(&bytes, &ImportLimits::default()).unwrap();

    assert_eq!(
        titles(&tree),
        vec!["member_id • string • required", "plan • varchar", "group"]
    );
    assert!(tree.iter().all(|node| node.is_leaf));
    assert_eq!(tree[0].key, "member_id");
}

#[test]
fn short_header_forms_match_exactly() {
    let bytes = spec_workbook(&["name", "type"], &[&["claim_id", "integer"]]);

    let tree = tree_from_sheet_spec(&bytes, &ImportLimits::default()).unwrap();

    assert_eq!(titles(&tree), vec!["claim_id • integer"]);
}

#[test]
fn requirement_column_matches_required_wording() {
    let bytes = spec_workbook(&["Field", "Required?"], &[&["id", "yes"]]);

    let tree = tree_from_sheet_spec(&bytes, &ImportLimits::default()).unwrap();

    assert_eq!(titles(&tree), vec!["id • yes"]);
}

#[test]
fn datatype_precedes_requirement_regardless_of_column_order() {
    let bytes = spec_workbook(
        &["Field", "Requirement", "Type"],
        &[&["id", "optional", "long"]],
    );

    let tree = tree_from_sheet_spec(&bytes, &ImportLimits::default()).unwrap();

    assert_eq!(titles(&tree), vec!["id • long • optional"]);
}

#[test]
fn first_matching_header_wins() {
    let bytes = spec_workbook(
        &["Field", "Field Description"],
        &[&["id", "primary identifier"]],
    );

    let tree = tree_from_sheet_spec(&bytes, &ImportLimits::default()).unwrap();

    assert_eq!(titles(&tree), vec!["id"]);
}

#[test]
fn unmatched_headers_fall_back_to_the_first_column() {
    let bytes = spec_workbook(&["Col A", "Col B"], &[&["alpha", "beta"], &["gamma", "delta"]]);

    let tree = tree_from_sheet_spec(&bytes, &ImportLimits::default()).unwrap();

    assert_eq!(titles(&tree), vec!["alpha", "gamma"]);
}

#[test]
fn header_scan_stops_at_the_column_cap() {
    let limits = ImportLimits {
        max_columns: 2,
        ..ImportLimits::default()
    };
    let bytes = spec_workbook(&["a", "b", "Field Name"], &[&["x", "y", "z"]]);

    let tree = tree_from_sheet_spec(&bytes, &limits).unwrap();

    // The real name column sits past the cap, so the default first column is used.
    assert_eq!(titles(&tree), vec!["x"]);
}

#[test]
fn blank_names_are_skipped_and_leaves_are_capped() {
    let limits = ImportLimits {
        max_leaves: 2,
        ..ImportLimits::default()
    };
    let bytes = spec_workbook(
        &["Field Name"],
        &[&["one"], &["   "], &["two"], &["three"]],
    );

    let tree = tree_from_sheet_spec(&bytes, &limits).unwrap();

    assert_eq!(titles(&tree), vec!["one", "two"]);
}

#[test]
fn keys_are_sanitized_but_titles_keep_the_raw_name() {
    let bytes = spec_workbook(&["Field Name"], &[&["Member ID"]]);

    let tree = tree_from_sheet_spec(&bytes, &ImportLimits::default()).unwrap();

    assert_eq!(tree[0].title, "Member ID");
    assert_eq!(tree[0].key, "Member_ID");
}

#[test]
fn numeric_cells_render_without_a_trailing_zero() {
    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();
    ws.write_string(0, 0, "Field Name").unwrap();
    ws.write_string(0, 1, "Data Type").unwrap();
    ws.write_number(1, 0, 42.0).unwrap();
    ws.write_string(1, 1, "int").unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let tree = tree_from_sheet_spec(&bytes, &ImportLimits::default()).unwrap();

    assert_eq!(titles(&tree), vec!["42 • int"]);
    assert_eq!(tree[0].key, "42");
}

#[test]
fn workbook_without_content_yields_an_empty_forest() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet();
    let bytes = workbook.save_to_buffer().unwrap();

    let tree = tree_from_sheet_spec(&bytes, &ImportLimits::default()).unwrap();

    assert!(tree.is_empty());
}

#[test]
fn header_only_workbook_yields_an_empty_forest() {
    let bytes = spec_workbook(&["Field Name", "Data Type"], &[]);

    let tree = tree_from_sheet_spec(&bytes, &ImportLimits::default()).unwrap();

    assert!(tree.is_empty());
}
