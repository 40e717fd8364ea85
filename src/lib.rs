//! `schema-intake` hardens the upload path of a schema-mapping service: analysts
//! submit untrusted schema artifacts, and each is either reduced to sanitized
//! mapping records or converted into one uniform hierarchical field tree.
//!
//! The primary entrypoints are [`ingestion::import_schema_tree`] and
//! [`ingestion::import_records`], which validate, buffer, and parse an upload
//! stream in one call (with `_from_path` variants for files on disk).
//!
//! ## What you can import
//!
//! **Into a field tree** (one [`types::SchemaNode`] forest, whatever the source):
//!
//! - **JSON samples** (`.json`): object entries become nodes, nested objects
//!   branches, arrays a representative element
//! - **XML schema definitions** (`.xsd`, `.xml`): nested `element` declarations
//! - **Delimited-text headers** (`.csv`, `.tsv`): one leaf per header cell
//! - **Workbook field specs** (`.xlsx`, `.xlsm`): one leaf per listed field
//!
//! **Into sanitized records:**
//!
//! - **Mapping-spec workbooks**: `.xlsx`, `.xlsm` with `Source Field`,
//!   `Business Logic` (or `Mapping Logic`), and `Target Field` columns, each
//!   row trimmed and truncated into a [`types::SanitizedRecord`]
//!
//! Uploads are hostile until proven otherwise. Every import runs the same
//! gauntlet: ordered pre-parse validation (presence, declared size, extension,
//! container signature), a byte ceiling that fails instead of truncating, and,
//! for workbook formats, an archive screen that rejects decompression bombs
//! before any entry is inflated. Ceilings come from a caller-supplied
//! [`limits::ImportLimits`]; truncation to those ceilings is never an error.
//!
//! ## Quick examples: import an upload
//!
//! ```no_run
//! use std::fs::File;
//!
//! use schema_intake::ingestion::{import_schema_tree, ImportOptions, SchemaFormat, UploadMeta};
//! use schema_intake::limits::ImportLimits;
//! use schema_intake::types::count_leaves;
//!
//! # fn main() -> Result<(), schema_intake::ImportError> {
//! let file = File::open("claims_sample.json")?;
//! let meta = UploadMeta::new("claims_sample.json", file.metadata()?.len());
//!
//! let tree = import_schema_tree(
//!     file,
//!     &meta,
//!     SchemaFormat::JsonSample,
//!     &ImportLimits::default(),
//!     &ImportOptions::default(),
//! )?;
//! println!("mappable fields: {}", count_leaves(&tree));
//! # Ok(())
//! # }
//! ```
//!
//! ```no_run
//! use std::fs::File;
//!
//! use schema_intake::ingestion::{import_records, ImportOptions, UploadMeta};
//! use schema_intake::limits::ImportLimits;
//!
//! # fn main() -> Result<(), schema_intake::ImportError> {
//! let file = File::open("mapping_spec.xlsx")?;
//! let meta = UploadMeta::new("mapping_spec.xlsx", file.metadata()?.len());
//!
//! let records = import_records(file, &meta, &ImportLimits::default(), &ImportOptions::default())?;
//! for r in &records {
//!     println!("{} -> {}", r.source(), r.target());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: unified import entrypoints, the upload validator,
//!   format-specific builders, and outcome observers
//! - [`guard`]: byte-ceiling stream guard and archive-ratio screening
//! - [`types`]: sanitized records, the field tree, key sanitization, leaf
//!   counting, and the serialized tree contract
//! - [`limits`]: the ceilings applied to every upload
//! - [`error`]: error types used across imports
//!
//! ## Tree example (in-memory bytes)
//!
//! Builders are plain functions of bytes for callers that already buffered an
//! upload:
//!
//! ```rust
//! use schema_intake::ingestion::json_sample::tree_from_json_sample;
//! use schema_intake::limits::ImportLimits;
//! use schema_intake::types::{count_leaves, tree_to_json};
//!
//! let sample = br#"{"claim":{"id":123,"tags":[]}}"#;
//! let tree = tree_from_json_sample(sample, &ImportLimits::default()).unwrap();
//!
//! // `claim` is a root branch; `id` and `tags` are its leaves.
//! assert_eq!(count_leaves(&tree), 2);
//! let json = tree_to_json(&tree).unwrap();
//! assert!(json.contains(r#""key":"claim.id""#));
//! ```

pub mod error;
pub mod guard;
pub mod ingestion;
pub mod limits;
pub mod types;

pub use error::{ImportError, ImportResult};
