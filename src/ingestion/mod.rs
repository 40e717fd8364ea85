//! Upload validation, sanitization, and tree-building entrypoints.
//!
//! Most callers should use [`import_schema_tree`] / [`import_records`] (from
//! [`unified`]), which run the full pipeline over an untrusted stream:
//!
//! - pre-parse validation ([`validate`])
//! - bounded buffering through the byte-ceiling guard
//! - dispatch to a tree builder or the row sanitizer
//! - optional outcome reporting to an [`UploadObserver`]
//!
//! Format-specific functions are also available for callers that already hold
//! the upload bytes, under:
//! - [`json_sample`]
//! - [`xsd`]
//! - [`csv_sample`]
//! - [`sheet_spec`]
//! - [`sheet`] (the record sanitizer)

pub mod csv_sample;
pub mod json_sample;
pub mod observability;
pub mod sheet;
pub mod sheet_spec;
pub mod unified;
pub mod validate;
pub mod xsd;

pub use observability::{
    CompositeObserver, FileObserver, ImportSeverity, ImportStats, StdErrObserver, UploadContext,
    UploadObserver,
};
pub use unified::{
    import_records, import_records_from_path, import_schema_tree, import_schema_tree_from_path,
    ImportOperation, ImportOptions, SchemaFormat,
};
pub use validate::{validate_upload, FormatFamily, UploadMeta};

/// Byte-order mark found at the front of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ByteOrderMark {
    Utf8,
    Utf16Be,
    Utf16Le,
}

/// Split a leading BOM off `bytes`, if one is present.
///
/// Text parsers downstream choke on BOM bytes, so every text-format builder
/// runs its input through this first.
pub(crate) fn split_bom(bytes: &[u8]) -> (Option<ByteOrderMark>, &[u8]) {
    if let Some(rest) = bytes.strip_prefix(b"\xef\xbb\xbf") {
        (Some(ByteOrderMark::Utf8), rest)
    } else if let Some(rest) = bytes.strip_prefix(b"\xfe\xff") {
        (Some(ByteOrderMark::Utf16Be), rest)
    } else if let Some(rest) = bytes.strip_prefix(b"\xff\xfe") {
        (Some(ByteOrderMark::Utf16Le), rest)
    } else {
        (None, bytes)
    }
}
