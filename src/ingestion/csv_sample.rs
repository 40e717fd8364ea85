//! Delimited-text tree builder.
//!
//! Only the header line of a CSV/TSV upload matters here: each header cell
//! becomes one root leaf. The rest of the file is ignored.

use csv::ReaderBuilder;

use crate::error::ImportResult;
use crate::limits::ImportLimits;
use crate::types::{sanitize_key, SchemaNode};

use super::split_bom;

/// Build a flat field tree from the header line of a delimited-text upload.
///
/// The first line with non-whitespace content is the header. The delimiter is
/// tab when that line contains one, comma otherwise; cells are split with a
/// real CSV reader so quoted cells containing the delimiter hold together.
/// Blank cells get positional `field_{n}` placeholders (1-based). At most
/// `max_leaves` leaves are produced; a file with no content yields an empty
/// forest.
pub fn tree_from_csv_sample(bytes: &[u8], limits: &ImportLimits) -> ImportResult<Vec<SchemaNode>> {
    let (_, body) = split_bom(bytes);
    let text = String::from_utf8_lossy(body);
    let Some(line) = text.split(['\r', '\n']).find(|l| !l.trim().is_empty()) else {
        return Ok(Vec::new());
    };

    let delimiter = if line.contains('\t') { b'\t' } else { b',' };
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_reader(line.as_bytes());

    let mut roots = Vec::new();
    if let Some(record) = reader.records().next() {
        let record = record?;
        for (idx, cell) in record.iter().take(limits.max_leaves).enumerate() {
            let trimmed = cell.trim();
            let title = if trimmed.is_empty() {
                format!("field_{}", idx + 1)
            } else {
                trimmed.to_string()
            };
            let key = sanitize_key(&title);
            roots.push(SchemaNode::leaf(title, key));
        }
    }
    Ok(roots)
}
