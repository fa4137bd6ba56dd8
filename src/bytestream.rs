//! Markable byte stream adapter.
//!
//! Wraps any [`std::io::Read`] source with `mark`/`reset` replay semantics
//! similar to `java.io.BufferedInputStream`, which the frame extractor relies
//! on to speculatively read a declared-length record, and to fall back to a
//! byte-by-byte terminator scan if the declared length turns out to be wrong.

use std::io::Read;

use crate::error::{MarcError, Result};

/// A `Read` adapter that supports bounded mark/reset replay.
///
/// Call [`ByteStream::mark`] before a tentative read of up to `limit` bytes.
/// If the tentative read doesn't pan out, [`ByteStream::reset`] rewinds the
/// stream back to the mark and the same bytes will be yielded again by
/// subsequent reads. Reading more than `limit` bytes past a mark without
/// calling `reset` invalidates the mark; a later `reset` call then fails with
/// [`MarcError::MarkExpired`].
pub struct ByteStream<R: Read> {
    inner: R,
    /// Bytes read from `inner` since the active mark, retained for replay.
    replay: Vec<u8>,
    /// Current read position within `replay`. Equal to `replay.len()` except
    /// while replaying after a `reset()`.
    pos: usize,
    /// Byte bound passed to the most recent `mark()` call, or `None` if unmarked.
    limit: Option<usize>,
    /// Bytes consumed from `inner` since the active mark (for limit enforcement).
    consumed_since_mark: usize,
    /// True once `inner` has reported EOF.
    eof: bool,
}

impl<R: Read> ByteStream<R> {
    /// Wrap a reader in a new, unmarked `ByteStream`.
    pub fn new(inner: R) -> Self {
        ByteStream {
            inner,
            replay: Vec::new(),
            pos: 0,
            limit: None,
            consumed_since_mark: 0,
            eof: false,
        }
    }

    /// Mark the current position, buffering up to `limit` subsequent bytes
    /// for possible replay via [`ByteStream::reset`].
    ///
    /// Replaces any previously active mark. Bytes already consumed before
    /// the current position are dropped; bytes still pending replay (if
    /// `mark` is called again before fully replaying a prior `reset`) are
    /// kept as the start of the new window.
    pub fn mark(&mut self, limit: usize) {
        self.replay.drain(0..self.pos);
        self.pos = 0;
        self.limit = Some(limit);
        self.consumed_since_mark = 0;
    }

    /// Rewind to the most recent [`ByteStream::mark`] call.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::MarkExpired`] if no mark is active, or if more
    /// than the marked `limit` bytes have been consumed since the mark.
    pub fn reset(&mut self) -> Result<()> {
        let limit = self
            .limit
            .ok_or(MarcError::MarkExpired { limit: 0 })?;
        if self.consumed_since_mark > limit {
            return Err(MarcError::MarkExpired { limit });
        }
        self.pos = 0;
        Ok(())
    }

    /// Read a single byte, or `Ok(None)` at end of stream.
    ///
    /// # Errors
    ///
    /// Propagates IO errors from the underlying reader.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.read_up_to(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }

    /// Read exactly `buf.len()` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::UnexpectedEof`] if the stream ends before `buf`
    /// is filled, or propagates an underlying IO error.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read_up_to(&mut buf[filled..])?;
            if n == 0 {
                return Err(MarcError::UnexpectedEof(format!(
                    "expected {} bytes, got {}",
                    buf.len(),
                    filled
                )));
            }
            filled += n;
        }
        Ok(())
    }

    /// True once the underlying source has been exhausted and no replay
    /// bytes remain buffered.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.eof && self.pos >= self.replay.len()
    }

    fn read_up_to(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if self.pos < self.replay.len() {
            let n = (self.replay.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.replay[self.pos..self.pos + n]);
            self.pos += n;
            return Ok(n);
        }

        if self.eof {
            return Ok(0);
        }

        let n = self.inner.read(buf)?;
        if n == 0 {
            self.eof = true;
            return Ok(0);
        }

        if self.limit.is_some() {
            self.consumed_since_mark += n;
            self.replay.extend_from_slice(&buf[..n]);
            self.pos += n;
        }

        Ok(n)
    }
}

impl<R: Read> std::fmt::Debug for ByteStream<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteStream")
            .field("replay_len", &self.replay.len())
            .field("pos", &self.pos)
            .field("limit", &self.limit)
            .field("eof", &self.eof)
            .finish()
    }
}
