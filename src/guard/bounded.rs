//! Byte-ceiling enforcement for untrusted streams.

use std::error::Error as StdError;
use std::fmt;
use std::io::{self, Read};

use crate::error::{ImportError, ImportResult};

/// Payload carried inside the [`io::Error`] raised when a stream runs past
/// its byte ceiling. [`read_all_bounded`] surfaces it as
/// [`ImportError::ResourceExceeded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteCeilingExceeded {
    /// The ceiling that was exceeded, in bytes.
    pub limit: u64,
}

impl fmt::Display for ByteCeilingExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input exceeds the {} byte ceiling", self.limit)
    }
}

impl StdError for ByteCeilingExceeded {}

/// A [`Read`] adapter that never yields more than `limit` bytes.
///
/// Unlike [`io::Take`], hitting the ceiling is an error, not a silent EOF: a
/// source holding more than `limit` bytes fails with an [`io::Error`] whose
/// payload is [`ByteCeilingExceeded`], while a source of exactly `limit` bytes
/// reads through to a clean EOF. Excess is detected on the read that would
/// first deliver it, so a bulk read over an oversized source fails immediately
/// instead of handing back a truncated prefix.
///
/// Only bytes actually delivered count against the ceiling; declared lengths
/// are never trusted.
#[derive(Debug)]
pub struct BoundedReader<R> {
    inner: R,
    limit: u64,
    remaining: u64,
}

impl<R> BoundedReader<R> {
    /// Wrap `inner`, allowing at most `limit` bytes to be read through.
    pub fn new(inner: R, limit: u64) -> Self {
        Self {
            inner,
            limit,
            remaining: limit,
        }
    }

    /// The ceiling this reader enforces, in bytes.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Bytes delivered so far.
    pub fn consumed(&self) -> u64 {
        self.limit - self.remaining
    }
}

impl<R: Read> BoundedReader<R> {
    /// Confirm the source is exhausted now that the allowance is spent.
    ///
    /// Pulls a single byte: EOF means the source fit exactly, anything else is
    /// the first excess byte.
    fn ensure_exhausted(&mut self) -> io::Result<()> {
        let mut probe = [0u8; 1];
        loop {
            match self.inner.read(&mut probe) {
                Ok(0) => return Ok(()),
                Ok(_) => {
                    return Err(io::Error::other(ByteCeilingExceeded { limit: self.limit }));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.remaining == 0 {
            // Allowance already spent: the caller wants more, so the stream
            // must end here.
            self.ensure_exhausted()?;
            return Ok(0);
        }

        let want = self.remaining.min(buf.len() as u64) as usize;
        let n = self.inner.read(&mut buf[..want])?;
        self.remaining -= n as u64;

        // The caller asked for more than the allowance and the allowance is
        // now spent: any byte still in the source belongs to this bulk read
        // and must trip the ceiling now, not on a later call.
        if self.remaining == 0 && want < buf.len() {
            self.ensure_exhausted()?;
        }
        Ok(n)
    }
}

/// Buffer an entire upload through a [`BoundedReader`].
///
/// Returns the full contents when the source holds at most `max_bytes` bytes,
/// [`ImportError::ResourceExceeded`] when it holds more, and
/// [`ImportError::Io`] for ordinary read failures.
pub fn read_all_bounded<R: Read>(source: R, max_bytes: u64) -> ImportResult<Vec<u8>> {
    let mut guarded = BoundedReader::new(source, max_bytes);
    let mut bytes = Vec::new();
    match guarded.read_to_end(&mut bytes) {
        Ok(_) => Ok(bytes),
        Err(e) => Err(map_ceiling_trip(e)),
    }
}

fn map_ceiling_trip(e: io::Error) -> ImportError {
    match e.get_ref().and_then(|inner| inner.downcast_ref::<ByteCeilingExceeded>()) {
        Some(trip) => ImportError::ResourceExceeded {
            message: trip.to_string(),
        },
        None => ImportError::Io(e),
    }
}
