//! Resource ceilings applied to untrusted uploads before any parser runs.
//!
//! Two independent guards:
//!
//! - [`BoundedReader`] / [`read_all_bounded`] cap how many bytes a stream may
//!   deliver, failing on the first excess byte instead of truncating silently
//! - [`ArchiveRatioGuard`] / [`scan_archive_ratios`] reject ZIP containers
//!   whose declared compression ratios look like a decompression bomb

pub mod bounded;
pub mod inflate;

pub use bounded::{read_all_bounded, BoundedReader, ByteCeilingExceeded};
pub use inflate::{
    current_min_inflate_ratio, scan_archive_ratios, ArchiveRatioGuard, DEFAULT_MIN_INFLATE_RATIO,
    RATIO_GRACE_BYTES, STRICT_MIN_INFLATE_RATIO,
};
