//! Spreadsheet row sanitizer for mapping-spec uploads.
//!
//! Reads the first sheet of an OOXML workbook and reduces it to trimmed,
//! truncated [`SanitizedRecord`]s. The workbook bytes are already size-capped
//! by the caller; this module adds the archive-ratio screen and the cell-level
//! sanitization rules.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use crate::error::{ImportError, ImportResult};
use crate::guard::{scan_archive_ratios, ArchiveRatioGuard};
use crate::limits::ImportLimits;
use crate::types::SanitizedRecord;

const COL_SOURCE: &str = "Source Field";
const COL_TARGET: &str = "Target Field";
const COL_NOTE: &str = "Business Logic";
const COL_NOTE_ALT: &str = "Mapping Logic";

/// Extract sanitized mapping records from workbook bytes.
///
/// Behavior:
/// - Holds the strict archive-ratio threshold for the whole parse and screens
///   the container's central directory before decompressing anything
/// - Reads the first sheet only; a workbook with no sheet or no non-empty row
///   yields `Ok(vec![])`
/// - Resolves `Source Field`, `Business Logic` (alternate `Mapping Logic`),
///   and `Target Field` among the first `max_columns` header cells by
///   case-insensitive match; missing columns are a schema mismatch
/// - Processes at most `max_rows` data rows in sheet order, trimming and
///   truncating every cell to `max_field_length` characters
/// - Skips rows that are entirely empty and rows missing source or target;
///   the note may be empty
///
/// Formula cells contribute their last cached value only (the workbook engine
/// here never evaluates); error and valueless cells read as empty text.
pub fn records_from_sheet(bytes: &[u8], limits: &ImportLimits) -> ImportResult<Vec<SanitizedRecord>> {
    let ratio_guard = ArchiveRatioGuard::strict();
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

    let source_col = find_column(header, limits.max_columns, &[COL_SOURCE]);
    let note_col = find_column(header, limits.max_columns, &[COL_NOTE, COL_NOTE_ALT]);
    let target_col = find_column(header, limits.max_columns, &[COL_TARGET]);
    let (Some(source_col), Some(note_col), Some(target_col)) = (source_col, note_col, target_col)
    else {
        return Err(ImportError::SchemaMismatch {
            message: format!(
                "sheet must have columns {COL_SOURCE:?}, {COL_NOTE:?} (or {COL_NOTE_ALT:?}), and {COL_TARGET:?}"
            ),
        });
    };

    let mut records = Vec::new();
    for row in rows.iter().skip(header_idx + 1).take(limits.max_rows) {
        let source = sanitize_cell(row.get(source_col), limits.max_field_length);
        let target = sanitize_cell(row.get(target_col), limits.max_field_length);
        let note = sanitize_cell(row.get(note_col), limits.max_field_length);

        if source.is_empty() && target.is_empty() && note.is_empty() {
            continue;
        }
        if source.is_empty() || target.is_empty() {
            continue;
        }
        records.push(SanitizedRecord::new(source, target, note));
    }
    Ok(records)
}

/// Locate a header cell matching one of `names`, searching only the first
/// `max_columns` cells. Matching is case-insensitive on trimmed text.
fn find_column(header: &[Data], max_columns: usize, names: &[&str]) -> Option<usize> {
    header.iter().take(max_columns).position(|cell| {
        let text = cell_to_text(cell);
        let trimmed = text.trim();
        names.iter().any(|name| trimmed.eq_ignore_ascii_case(name))
    })
}

fn sanitize_cell(cell: Option<&Data>, max_field_length: usize) -> String {
    let text = cell.map(cell_to_text).unwrap_or_default();
    truncate_chars(text.trim(), max_field_length).to_string()
}

/// Cut `s` after `max_chars` characters, on a character boundary.
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Render a cell as plain text. Whole-number floats print without a fraction;
/// error and empty cells read as the empty string.
pub(crate) fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
        Data::Empty => String::new(),
    }
}
