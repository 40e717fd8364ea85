//! Pre-parse upload validation.
//!
//! Cheap checks run in a fixed order before any byte of the payload reaches a
//! parser: presence, declared size, filename extension, and (for ZIP-backed
//! formats) the container signature. The first failing check rejects the
//! upload; later checks never run.

use std::io::{self, Read};

use crate::error::{ImportError, ImportResult};
use crate::guard::BoundedReader;
use crate::limits::ImportLimits;

/// First bytes of every ZIP local file header.
const ZIP_MAGIC: [u8; 2] = *b"PK";

/// Client-declared facts about an upload, untrusted until checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMeta {
    /// Filename as submitted by the client.
    pub filename: String,
    /// Payload size as declared by the client, in bytes.
    pub declared_size: u64,
}

impl UploadMeta {
    /// Describe an upload from its declared filename and size.
    pub fn new(filename: impl Into<String>, declared_size: u64) -> Self {
        Self {
            filename: filename.into(),
            declared_size,
        }
    }
}

/// The family of file formats an upload endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatFamily {
    /// Short label used in rejection reasons.
    pub label: &'static str,
    /// Accepted filename extensions, lowercase, without the dot.
    pub extensions: &'static [&'static str],
    /// Whether the payload is a ZIP container whose signature is checked.
    pub archive_backed: bool,
}

impl FormatFamily {
    /// JSON sample objects.
    pub const SAMPLE_OBJECT: Self = Self {
        label: "sample object",
        extensions: &["json"],
        archive_backed: false,
    };

    /// XML schema definitions.
    pub const SCHEMA_DEFINITION: Self = Self {
        label: "schema definition",
        extensions: &["xsd", "xml"],
        archive_backed: false,
    };

    /// Delimited text headers.
    pub const DELIMITED_TEXT: Self = Self {
        label: "delimited text",
        extensions: &["csv", "tsv"],
        archive_backed: false,
    };

    /// OOXML workbooks, used by both the record sanitizer and the tabular
    /// field-spec builder.
    pub const SPREADSHEET: Self = Self {
        label: "spreadsheet",
        extensions: &["xlsx", "xlsm"],
        archive_backed: true,
    };

    fn accepts(&self, filename: &str) -> bool {
        let Some((_, ext)) = filename.rsplit_once('.') else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        self.extensions.contains(&ext.as_str())
    }

    fn expected_extensions(&self) -> String {
        self.extensions
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Run the ordered pre-parse checks against an upload.
///
/// Checks, in order:
/// 1. a filename and a non-zero declared size are present
/// 2. the declared size fits `limits.max_bytes`
/// 3. the filename extension (case-insensitive) belongs to `family`
/// 4. for archive-backed families, the stream starts with the ZIP signature,
///    read through a [`BoundedReader`] capped at the signature length
///
/// Any failure returns [`ImportError::Rejected`] before a parser sees a single
/// payload byte. On success the bytes consumed by check 4 are returned so a
/// single-pass source can be stitched back together with
/// [`io::Read::chain`](std::io::Read::chain); for non-archive families the
/// returned head is empty.
pub fn validate_upload<R: Read>(
    source: &mut R,
    meta: &UploadMeta,
    family: &FormatFamily,
    limits: &ImportLimits,
) -> ImportResult<Vec<u8>> {
    if meta.filename.trim().is_empty() || meta.declared_size == 0 {
        return Err(ImportError::Rejected {
            reason: "no file provided".to_string(),
        });
    }
    if meta.declared_size > limits.max_bytes {
        return Err(ImportError::Rejected {
            reason: format!(
                "declared size {} exceeds the {} byte limit",
                meta.declared_size, limits.max_bytes
            ),
        });
    }
    if !family.accepts(&meta.filename) {
        return Err(ImportError::Rejected {
            reason: format!(
                "only {} files are accepted for {} uploads",
                family.expected_extensions(),
                family.label
            ),
        });
    }
    if !family.archive_backed {
        return Ok(Vec::new());
    }

    let mut head = [0u8; ZIP_MAGIC.len()];
    let mut filled = 0;
    let mut guarded = BoundedReader::new(&mut *source, head.len() as u64);
    while filled < head.len() {
        match guarded.read(&mut head[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    if filled < head.len() || head != ZIP_MAGIC {
        return Err(ImportError::Rejected {
            reason: "file does not appear to be a valid OOXML (ZIP) container".to_string(),
        });
    }
    Ok(head.to_vec())
}
