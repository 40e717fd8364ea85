//! Unified import entrypoints.
//!
//! Most callers should use [`import_schema_tree`] or [`import_records`],
//! which run the whole pipeline over an untrusted stream: pre-parse
//! validation, bounded buffering, format dispatch, and optional outcome
//! reporting.
//!
//! - [`import_schema_tree`] builds the uniform field tree for any
//!   [`SchemaFormat`].
//! - [`import_records`] sanitizes a mapping-spec workbook into rows.
//! - The `_from_path` variants take a filesystem path and derive the
//!   [`UploadMeta`] from file metadata.
//! - If an [`super::observability::UploadObserver`] is provided,
//!   success/failure/alerts are reported to it.

use std::fmt;
use std::fs::{self, File};
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;

use crate::error::{ImportError, ImportResult};
use crate::guard::read_all_bounded;
use crate::limits::ImportLimits;
use crate::types::{count_leaves, SanitizedRecord, SchemaNode};

use super::observability::{ImportSeverity, ImportStats, UploadContext, UploadObserver};
use super::validate::{validate_upload, FormatFamily, UploadMeta};
use super::{csv_sample, json_sample, sheet, sheet_spec, xsd};

/// Supported schema-artifact formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    /// JSON sample document.
    JsonSample,
    /// XML schema definition.
    Xsd,
    /// Delimited-text header line.
    CsvSample,
    /// Workbook field spec (one field per row).
    SheetSpec,
}

impl SchemaFormat {
    /// The format family the upload validator checks this format against.
    pub fn family(&self) -> &'static FormatFamily {
        match self {
            Self::JsonSample => &FormatFamily::SAMPLE_OBJECT,
            Self::Xsd => &FormatFamily::SCHEMA_DEFINITION,
            Self::CsvSample => &FormatFamily::DELIMITED_TEXT,
            Self::SheetSpec => &FormatFamily::SPREADSHEET,
        }
    }
}

/// What an upload is being imported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOperation {
    /// Mapping-spec workbook sanitized into records.
    Records,
    /// Schema artifact built into a field tree.
    Tree(SchemaFormat),
}

impl ImportOperation {
    /// Short label used in observer log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Records => "records",
            Self::Tree(SchemaFormat::JsonSample) => "json_sample",
            Self::Tree(SchemaFormat::Xsd) => "xsd",
            Self::Tree(SchemaFormat::CsvSample) => "csv_sample",
            Self::Tree(SchemaFormat::SheetSpec) => "sheet_spec",
        }
    }
}

/// Options controlling unified import behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ImportOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn UploadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ImportSeverity,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: ImportSeverity::Critical,
        }
    }
}

impl fmt::Debug for ImportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

/// Import a schema artifact from an untrusted stream into a field tree.
///
/// Pipeline, in order:
///
/// 1. [`validate_upload`] checks filename, declared size, extension, and (for
///    workbook formats) the container signature; nothing else runs if it
///    rejects.
/// 2. The stream is buffered through the byte-ceiling guard; the signature
///    bytes consumed during validation are stitched back in front, so the
///    source is read exactly once.
/// 3. The buffered bytes are handed to the builder for `format`.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with a leaf count
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >=
///   `options.alert_at_or_above`
///
/// # Examples
///
/// ## JSON sample
///
/// ```no_run
/// use std::fs::File;
///
/// use schema_intake::ingestion::{import_schema_tree, ImportOptions, SchemaFormat, UploadMeta};
/// use schema_intake::limits::ImportLimits;
/// use schema_intake::types::count_leaves;
///
/// # fn main() -> Result<(), schema_intake::ImportError> {
/// let file = File::open("sample.json")?;
/// let meta = UploadMeta::new("sample.json", file.metadata()?.len());
///
/// let tree = import_schema_tree(
///     file,
///     &meta,
///     SchemaFormat::JsonSample,
///     &ImportLimits::default(),
///     &ImportOptions::default(),
/// )?;
/// println!("leaves={}", count_leaves(&tree));
/// # Ok(())
/// # }
/// ```
///
/// ## XSD with tightened ceilings
///
/// ```no_run
/// use std::fs::File;
///
/// use schema_intake::ingestion::{import_schema_tree, ImportOptions, SchemaFormat, UploadMeta};
/// use schema_intake::limits::ImportLimits;
///
/// # fn main() -> Result<(), schema_intake::ImportError> {
/// let limits = ImportLimits {
///     max_bytes: 2 * 1024 * 1024,
///     max_depth: 10,
///     ..Default::default()
/// };
///
/// let file = File::open("claims.xsd")?;
/// let meta = UploadMeta::new("claims.xsd", file.metadata()?.len());
/// let tree = import_schema_tree(file, &meta, SchemaFormat::Xsd, &limits, &ImportOptions::default())?;
/// println!("roots={}", tree.len());
/// # Ok(())
/// # }
/// ```
///
/// ## Observability (stderr logging + alert threshold)
///
/// ```no_run
/// use std::sync::Arc;
///
/// use schema_intake::ingestion::{
///     import_schema_tree_from_path, ImportOptions, ImportSeverity, SchemaFormat, StdErrObserver,
/// };
/// use schema_intake::limits::ImportLimits;
///
/// # fn main() -> Result<(), schema_intake::ImportError> {
/// let opts = ImportOptions {
///     observer: Some(Arc::new(StdErrObserver)),
///     alert_at_or_above: ImportSeverity::Critical,
/// };
///
/// // Missing files are treated as Critical and will trigger `on_alert` at this threshold.
/// let _err = import_schema_tree_from_path(
///     "does_not_exist.json",
///     SchemaFormat::JsonSample,
///     &ImportLimits::default(),
///     &opts,
/// )
/// .unwrap_err();
/// # Ok(())
/// # }
/// ```
pub fn import_schema_tree<R: Read>(
    source: R,
    meta: &UploadMeta,
    format: SchemaFormat,
    limits: &ImportLimits,
    options: &ImportOptions,
) -> ImportResult<Vec<SchemaNode>> {
    let ctx = UploadContext {
        filename: meta.filename.clone(),
        operation: ImportOperation::Tree(format),
    };
    let result = run_tree_import(source, meta, format, limits);
    report(options, &ctx, &result, |tree| ImportStats {
        rows: 0,
        leaves: count_leaves(tree),
    });
    result
}

/// Import a mapping-spec workbook from an untrusted stream into sanitized
/// records.
///
/// Same pipeline as [`import_schema_tree`], dispatching to the row sanitizer
/// instead of a tree builder.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
///
/// use schema_intake::ingestion::{import_records, ImportOptions, UploadMeta};
/// use schema_intake::limits::ImportLimits;
///
/// # fn main() -> Result<(), schema_intake::ImportError> {
/// let file = File::open("mapping_spec.xlsx")?;
/// let meta = UploadMeta::new("mapping_spec.xlsx", file.metadata()?.len());
///
/// let records = import_records(file, &meta, &ImportLimits::default(), &ImportOptions::default())?;
/// println!("rows={}", records.len());
/// # Ok(())
/// # }
/// ```
pub fn import_records<R: Read>(
    source: R,
    meta: &UploadMeta,
    limits: &ImportLimits,
    options: &ImportOptions,
) -> ImportResult<Vec<SanitizedRecord>> {
    let ctx = UploadContext {
        filename: meta.filename.clone(),
        operation: ImportOperation::Records,
    };
    let result = run_records_import(source, meta, limits);
    report(options, &ctx, &result, |records| ImportStats {
        rows: records.len(),
        leaves: 0,
    });
    result
}

/// [`import_schema_tree`] for a filesystem path.
///
/// The [`UploadMeta`] is derived from the path's file name and on-disk size;
/// a missing or unreadable file surfaces as [`ImportError::Io`].
pub fn import_schema_tree_from_path(
    path: impl AsRef<Path>,
    format: SchemaFormat,
    limits: &ImportLimits,
    options: &ImportOptions,
) -> ImportResult<Vec<SchemaNode>> {
    let path = path.as_ref();
    let ctx = UploadContext {
        filename: path.display().to_string(),
        operation: ImportOperation::Tree(format),
    };
    let result = meta_for_path(path).and_then(|meta| {
        let file = File::open(path)?;
        run_tree_import(file, &meta, format, limits)
    });
    report(options, &ctx, &result, |tree| ImportStats {
        rows: 0,
        leaves: count_leaves(tree),
    });
    result
}

/// [`import_records`] for a filesystem path.
pub fn import_records_from_path(
    path: impl AsRef<Path>,
    limits: &ImportLimits,
    options: &ImportOptions,
) -> ImportResult<Vec<SanitizedRecord>> {
    let path = path.as_ref();
    let ctx = UploadContext {
        filename: path.display().to_string(),
        operation: ImportOperation::Records,
    };
    let result = meta_for_path(path).and_then(|meta| {
        let file = File::open(path)?;
        run_records_import(file, &meta, limits)
    });
    report(options, &ctx, &result, |records| ImportStats {
        rows: records.len(),
        leaves: 0,
    });
    result
}

fn run_tree_import<R: Read>(
    mut source: R,
    meta: &UploadMeta,
    format: SchemaFormat,
    limits: &ImportLimits,
) -> ImportResult<Vec<SchemaNode>> {
    let head = validate_upload(&mut source, meta, format.family(), limits)?;
    let bytes = buffer_upload(head, source, limits)?;
    match format {
        SchemaFormat::JsonSample => json_sample::tree_from_json_sample(&bytes, limits),
        SchemaFormat::Xsd => xsd::tree_from_xsd(&bytes, limits),
        SchemaFormat::CsvSample => csv_sample::tree_from_csv_sample(&bytes, limits),
        SchemaFormat::SheetSpec => sheet_spec::tree_from_sheet_spec(&bytes, limits),
    }
}

fn run_records_import<R: Read>(
    mut source: R,
    meta: &UploadMeta,
    limits: &ImportLimits,
) -> ImportResult<Vec<SanitizedRecord>> {
    let head = validate_upload(&mut source, meta, &FormatFamily::SPREADSHEET, limits)?;
    let bytes = buffer_upload(head, source, limits)?;
    sheet::records_from_sheet(&bytes, limits)
}

/// Buffer the remaining stream behind the signature bytes the validator
/// already consumed, bounded to `max_bytes` in total.
fn buffer_upload<R: Read>(head: Vec<u8>, source: R, limits: &ImportLimits) -> ImportResult<Vec<u8>> {
    let bytes = read_all_bounded(Cursor::new(head).chain(source), limits.max_bytes)?;
    if bytes.is_empty() {
        return Err(ImportError::Rejected {
            reason: "file content is empty".to_string(),
        });
    }
    Ok(bytes)
}

fn meta_for_path(path: &Path) -> ImportResult<UploadMeta> {
    let declared_size = fs::metadata(path)?.len();
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    Ok(UploadMeta::new(filename, declared_size))
}

fn report<T>(
    options: &ImportOptions,
    ctx: &UploadContext,
    result: &ImportResult<T>,
    stats: impl FnOnce(&T) -> ImportStats,
) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    match result {
        Ok(value) => obs.on_success(ctx, stats(value)),
        Err(e) => {
            let severity = severity_for_error(e);
            obs.on_failure(ctx, severity, e);
            if severity >= options.alert_at_or_above {
                obs.on_alert(ctx, severity, e);
            }
        }
    }
}

fn severity_for_error(e: &ImportError) -> ImportSeverity {
    match e {
        ImportError::Io(_) => ImportSeverity::Critical,
        ImportError::ResourceExceeded { .. } => ImportSeverity::Critical,
        ImportError::Rejected { .. } => ImportSeverity::Warning,
        ImportError::SchemaMismatch { .. } => ImportSeverity::Error,
        ImportError::Csv(err) => match err.kind() {
            csv::ErrorKind::Io(_) => ImportSeverity::Critical,
            _ => ImportSeverity::Error,
        },
        ImportError::Workbook(_) | ImportError::Archive(_) | ImportError::Json(_) | ImportError::Xml(_) => {
            ImportSeverity::Error
        }
    }
}
