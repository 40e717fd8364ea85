//! Tabular field-spec tree builder.
//!
//! Handles the common analyst artifact of a workbook listing one field per
//! row, with columns for the field name, datatype, and requirement level.
//! Every listed field becomes one root leaf.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use crate::error::ImportResult;
use crate::guard::{scan_archive_ratios, ArchiveRatioGuard};
use crate::limits::ImportLimits;
use crate::types::{sanitize_key, SchemaNode};

use super::sheet::cell_to_text;

/// Build a flat field tree from a workbook field spec.
///
/// Screens the archive at the ambient ratio threshold, then reads the first
/// sheet. The first non-empty row is the header; columns are resolved by
/// case-insensitive substring match among the first `max_columns` cells:
///
/// - field name: contains `field`, or equals `name` (defaults to the first
///   column when nothing matches)
/// - datatype (optional): contains `datatype` or `data type`, or equals `type`
/// - requirement (optional): contains `requirement` or `required`
///
/// Each following row with a non-empty field name becomes a root leaf titled
/// `name • datatype • requirement` (present parts only), keyed by the
/// sanitized name, up to `max_leaves`. A workbook with no sheet or no content
/// yields an empty forest.
pub fn tree_from_sheet_spec(bytes: &[u8], limits: &ImportLimits) -> ImportResult<Vec<SchemaNode>> {
    let ratio_guard = ArchiveRatioGuard::current();
    scan_archive_ratios(bytes, ratio_guard.min_ratio())?;

    let mut workbook = Xlsx::new(Cursor::new(bytes))?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Ok(Vec::new());
    };
    let range = workbook.worksheet_range(&sheet)?;

    let rows: Vec<&[Data]> = range.rows().collect();
    let Some(header_idx) = rows
        .iter()
        .position(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
    else {
        return Ok(Vec::new());
    };
    let header = rows[header_idx];

    let mut field_col = None;
    let mut datatype_col = None;
    let mut requirement_col = None;
    for (idx, cell) in header.iter().take(limits.max_columns).enumerate() {
        let text = cell_to_text(cell);
        let lower = text.trim().to_ascii_lowercase();
        if field_col.is_none() && (lower.contains("field") || lower == "name") {
            field_col = Some(idx);
        }
        if datatype_col.is_none()
            && (lower.contains("datatype") || lower.contains("data type") || lower == "type")
        {
            datatype_col = Some(idx);
        }
        if requirement_col.is_none() && (lower.contains("requirement") || lower.contains("required")) {
            requirement_col = Some(idx);
        }
    }
    let field_col = field_col.unwrap_or(0);

    let mut roots = Vec::new();
    for row in rows.iter().skip(header_idx + 1) {
        if roots.len() >= limits.max_leaves {
            break;
        }
        let name = row.get(field_col).map(cell_to_text).unwrap_or_default();
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let mut title = name.to_string();
        for col in [datatype_col, requirement_col].into_iter().flatten() {
            let extra = row.get(col).map(cell_to_text).unwrap_or_default();
            let extra = extra.trim();
            if !extra.is_empty() {
                title.push_str(" • ");
                title.push_str(extra);
            }
        }
        roots.push(SchemaNode::leaf(title, sanitize_key(name)));
    }
    Ok(roots)
}
