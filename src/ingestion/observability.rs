use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ImportError;

use super::unified::ImportOperation;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ImportSeverity {
    /// Informational event.
    Info,
    /// A rejected upload (bad name, size, extension, or signature).
    Warning,
    /// The upload parsed wrong or did not match the expected shape.
    Error,
    /// A tripped resource ceiling or an infrastructure failure.
    Critical,
}

/// Context about one upload attempt.
#[derive(Debug, Clone)]
pub struct UploadContext {
    /// Filename (or path) the upload was submitted under.
    pub filename: String,
    /// What was being imported.
    pub operation: ImportOperation,
}

/// Minimal stats reported on a successful import.
///
/// `rows` counts sanitized records, `leaves` counts tree leaves; the field
/// not applicable to the operation is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    /// Number of sanitized records produced.
    pub rows: usize,
    /// Number of leaves in the produced field tree.
    pub leaves: usize,
}

/// Observer interface for upload outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait UploadObserver: Send + Sync {
    /// Called when an import succeeds.
    fn on_success(&self, _ctx: &UploadContext, _stats: ImportStats) {}

    /// Called when an import fails.
    fn on_failure(&self, _ctx: &UploadContext, _severity: ImportSeverity, _error: &ImportError) {}

    /// Called when an import failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &UploadContext, severity: ImportSeverity, error: &ImportError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn UploadObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn UploadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl UploadObserver for CompositeObserver {
    fn on_success(&self, ctx: &UploadContext, stats: ImportStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &UploadContext, severity: ImportSeverity, error: &ImportError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &UploadContext, severity: ImportSeverity, error: &ImportError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs upload events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl UploadObserver for StdErrObserver {
    fn on_success(&self, ctx: &UploadContext, stats: ImportStats) {
        eprintln!(
            "[intake][ok] op={} file={} rows={} leaves={}",
            ctx.operation.label(),
            ctx.filename,
            stats.rows,
            stats.leaves
        );
    }

    fn on_failure(&self, ctx: &UploadContext, severity: ImportSeverity, error: &ImportError) {
        eprintln!(
            "[intake][{:?}] op={} file={} err={}",
            severity,
            ctx.operation.label(),
            ctx.filename,
            error
        );
    }

    fn on_alert(&self, ctx: &UploadContext, severity: ImportSeverity, error: &ImportError) {
        eprintln!(
            "[ALERT][intake][{:?}] op={} file={} err={}",
            severity,
            ctx.operation.label(),
            ctx.filename,
            error
        );
    }
}

/// Appends upload events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl UploadObserver for FileObserver {
    fn on_success(&self, ctx: &UploadContext, stats: ImportStats) {
        self.append_line(&format!(
            "{} ok op={} file={} rows={} leaves={}",
            unix_ts(),
            ctx.operation.label(),
            ctx.filename,
            stats.rows,
            stats.leaves
        ));
    }

    fn on_failure(&self, ctx: &UploadContext, severity: ImportSeverity, error: &ImportError) {
        self.append_line(&format!(
            "{} fail severity={:?} op={} file={} err={}",
            unix_ts(),
            severity,
            ctx.operation.label(),
            ctx.filename,
            error
        ));
    }

    fn on_alert(&self, ctx: &UploadContext, severity: ImportSeverity, error: &ImportError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} op={} file={} err={}",
            unix_ts(),
            severity,
            ctx.operation.label(),
            ctx.filename,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
