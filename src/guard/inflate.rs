//! Decompression-ratio screening for archive-backed uploads.
//!
//! OOXML workbooks are ZIP archives, and a hostile archive can declare a few
//! kilobytes that inflate to gigabytes. Two pieces defend against that:
//!
//! - a process-wide minimum inflate ratio (compressed : uncompressed) held in
//!   a mutex, tightened to a strict value for the duration of each archive
//!   parse by [`ArchiveRatioGuard`];
//! - [`scan_archive_ratios`], which walks the archive's central directory and
//!   rejects the upload before any entry is decompressed.

use std::io::Cursor;
use std::sync::{Mutex, MutexGuard, PoisonError};

use zip::ZipArchive;

use crate::error::{ImportError, ImportResult};

/// Minimum inflate ratio in effect outside any parse window.
pub const DEFAULT_MIN_INFLATE_RATIO: f64 = 0.01;

/// Minimum inflate ratio installed while an archive-backed upload is parsed.
pub const STRICT_MIN_INFLATE_RATIO: f64 = 0.02;

/// Entries declaring at most this many uncompressed bytes are exempt from the
/// ratio check; small workbook parts routinely compress far below any sane
/// floor.
pub const RATIO_GRACE_BYTES: u64 = 100 * 1024;

static MIN_INFLATE_RATIO: Mutex<f64> = Mutex::new(DEFAULT_MIN_INFLATE_RATIO);

fn lock_ratio() -> MutexGuard<'static, f64> {
    // A panicking parse restores the value in ArchiveRatioGuard::drop before
    // the poison flag is set, so the stored ratio is trustworthy either way.
    MIN_INFLATE_RATIO.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The process-wide minimum inflate ratio at this instant.
///
/// Blocks while an [`ArchiveRatioGuard`] holds the threshold.
pub fn current_min_inflate_ratio() -> f64 {
    *lock_ratio()
}

/// Holds the ratio threshold for the duration of one archive parse.
///
/// Owning the guard owns the mutex, so archive-backed parses are serialized
/// process-wide and a tightened threshold can never leak into a concurrent
/// parse. Dropping the guard restores the previous value, on success, error,
/// and panic unwind alike.
#[derive(Debug)]
pub struct ArchiveRatioGuard {
    slot: MutexGuard<'static, f64>,
    prev: f64,
}

impl ArchiveRatioGuard {
    /// Acquire the threshold and tighten it to [`STRICT_MIN_INFLATE_RATIO`].
    pub fn strict() -> Self {
        let mut slot = lock_ratio();
        let prev = *slot;
        *slot = STRICT_MIN_INFLATE_RATIO;
        Self { slot, prev }
    }

    /// Acquire the threshold at its current value, without tightening it.
    pub fn current() -> Self {
        let slot = lock_ratio();
        let prev = *slot;
        Self { slot, prev }
    }

    /// The minimum inflate ratio in force while this guard lives.
    pub fn min_ratio(&self) -> f64 {
        *self.slot
    }
}

impl Drop for ArchiveRatioGuard {
    fn drop(&mut self) {
        // Runs before the MutexGuard field is released.
        *self.slot = self.prev;
    }
}

/// Walk the central directory of `bytes` and reject any entry whose declared
/// sizes fall below `min_ratio`.
///
/// Entries at or below [`RATIO_GRACE_BYTES`] of declared uncompressed size are
/// skipped. Nothing is decompressed; the check reads declared sizes only,
/// which the zip layer later enforces during the real parse.
pub fn scan_archive_ratios(bytes: &[u8], min_ratio: f64) -> ImportResult<()> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        let uncompressed = entry.size();
        if uncompressed <= RATIO_GRACE_BYTES {
            continue;
        }
        let compressed = entry.compressed_size();
        if (compressed as f64) < (uncompressed as f64) * min_ratio {
            return Err(ImportError::ResourceExceeded {
                message: format!(
                    "archive entry {:?} declares an inflate ratio below {} ({} bytes compressed, {} uncompressed)",
                    entry.name(),
                    min_ratio,
                    compressed,
                    uncompressed
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{mpsc, Arc};
    use std::thread;

    use super::{
        current_min_inflate_ratio, ArchiveRatioGuard, DEFAULT_MIN_INFLATE_RATIO,
        STRICT_MIN_INFLATE_RATIO,
    };

    #[test]
    fn strict_guard_tightens_then_restores() {
        {
            let guard = ArchiveRatioGuard::strict();
            assert_eq!(guard.min_ratio(), STRICT_MIN_INFLATE_RATIO);
        }
        assert_eq!(current_min_inflate_ratio(), DEFAULT_MIN_INFLATE_RATIO);
    }

    #[test]
    fn current_guard_holds_without_tightening() {
        let guard = ArchiveRatioGuard::current();
        assert_eq!(guard.min_ratio(), DEFAULT_MIN_INFLATE_RATIO);
    }

    #[test]
    fn panic_while_held_still_restores() {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let _guard = ArchiveRatioGuard::strict();
            panic!("parse blew up");
        }));
        assert!(outcome.is_err());
        assert_eq!(current_min_inflate_ratio(), DEFAULT_MIN_INFLATE_RATIO);
    }

    #[test]
    fn readers_wait_out_a_held_guard() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        let (held_tx, held_rx) = mpsc::channel();

        let holder = thread::spawn(move || {
            let guard = ArchiveRatioGuard::strict();
            held_tx.send(()).unwrap();
            assert_eq!(guard.min_ratio(), STRICT_MIN_INFLATE_RATIO);
            flag.store(true, Ordering::SeqCst);
        });

        held_rx.recv().unwrap();
        // Blocks until the holder drops its guard, so the tightened value is
        // never observable from outside the critical section.
        let ratio = current_min_inflate_ratio();
        assert!(finished.load(Ordering::SeqCst));
        assert_eq!(ratio, DEFAULT_MIN_INFLATE_RATIO);
        holder.join().unwrap();
    }
}
