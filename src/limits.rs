//! Resource ceilings applied to every upload.

/// Hard ceilings for a single upload.
///
/// Supplied by the caller's configuration layer; every parser and builder in
/// this crate honors these and never reads or produces beyond them. Hitting a
/// row/depth/leaf ceiling truncates the result silently; hitting the byte
/// ceiling fails the upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportLimits {
    /// Maximum bytes read from the upload stream.
    pub max_bytes: u64,
    /// Maximum data rows taken from a spreadsheet; rows beyond this are ignored.
    pub max_rows: usize,
    /// Maximum header cells scanned when resolving named columns.
    pub max_columns: usize,
    /// Maximum characters kept per sanitized field value.
    pub max_field_length: usize,
    /// Maximum nesting depth retained in a schema tree.
    pub max_depth: usize,
    /// Maximum leaves retained in a schema tree.
    pub max_leaves: usize,
}

impl Default for ImportLimits {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024,
            max_rows: 10_000,
            max_columns: 32,
            max_field_length: 500,
            max_depth: 20,
            max_leaves: 2_000,
        }
    }
}
