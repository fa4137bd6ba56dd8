//! Reading MARC records from binary streams.
//!
//! This module provides [`MarcReader`] for reading ISO 2709 formatted MARC
//! records from any source that implements [`std::io::Read`]. It ties the
//! [`ByteStream`] adapter, the frame extractor, the directory/field decoder,
//! and the permissive policy layer together behind an iterator-style surface.
//!
//! # Examples
//!
//! ```
//! use marc21::MarcReader;
//! use std::io::Cursor;
//!
//! let data: Vec<u8> = Vec::new();
//! let cursor = Cursor::new(data);
//! let mut reader = MarcReader::new(cursor);
//!
//! while let Some(record) = reader.read_record()? {
//!     println!("Record type: {}", record.leader.record_type);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::HashSet;
use std::io::Read;

use crate::bytestream::ByteStream;
use crate::charset::DefaultEncoding;
use crate::decoder::{self, DecodeOptions};
use crate::error::Result;
use crate::formats::FormatReader;
use crate::frame;
use crate::policy::{Diagnostic, PolicyContext, PolicyMode};
use crate::record::{Field, Record};

const RECORD_TERMINATOR: u8 = 0x1D;

/// Options controlling [`MarcReader`]'s behavior.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Enable the permissive policy layer's repairs; when `false`, the first
    /// structural anomaly terminates iteration with an `Err`.
    pub permissive: bool,
    /// Force every record's text to UTF-8 regardless of the leader's
    /// declared character coding.
    pub to_utf_8: bool,
    /// Encoding fed to the charset converter when the leader doesn't declare
    /// UTF-8.
    pub default_encoding: DefaultEncoding,
    /// When set, records that look like continuations of the previous record
    /// (no "001" of their own, or a matching one) have their fields tagged
    /// in this set absorbed into the preceding record and are themselves
    /// suppressed from iteration.
    pub combine_partials: Option<HashSet<String>>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            permissive: false,
            to_utf_8: false,
            default_encoding: DefaultEncoding::Utf8,
            combine_partials: None,
        }
    }
}

/// Reader for ISO 2709 binary MARC format.
///
/// `MarcReader` reads one MARC record at a time from any source implementing
/// [`std::io::Read`]. Records are fully parsed and returned as [`Record`]
/// instances.
#[derive(Debug)]
pub struct MarcReader<R: Read> {
    stream: ByteStream<R>,
    config: ReaderConfig,
    records_read: usize,
    diagnostics: Vec<Diagnostic>,
    /// Buffered result for the non-destructive [`MarcReader::has_next`] peek.
    peeked: Option<Result<Record>>,
    /// A record already extracted and decoded while looking ahead for
    /// `combine_partials` continuations, waiting for the next `advance()`.
    lookahead: Option<Record>,
}

impl<R: Read> MarcReader<R> {
    /// Create a new MARC reader with default (strict) configuration.
    pub fn new(reader: R) -> Self {
        MarcReader {
            stream: ByteStream::new(reader),
            config: ReaderConfig::default(),
            records_read: 0,
            diagnostics: Vec::new(),
            peeked: None,
            lookahead: None,
        }
    }

    /// Replace this reader's configuration.
    #[must_use]
    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Convenience builder enabling permissive mode.
    #[must_use]
    pub fn permissive(mut self) -> Self {
        self.config.permissive = true;
        self
    }

    /// Diagnostics accumulated for the most recently emitted record (cleared
    /// at the start of the `read_record`/`has_next` call that produced it).
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Non-destructive peek: `true` if another record (or a pending error)
    /// is available without consuming it. Buffers the result for the next
    /// `read_record` call.
    pub fn has_next(&mut self) -> bool {
        if self.peeked.is_some() {
            return true;
        }
        match self.advance() {
            Ok(Some(record)) => {
                self.peeked = Some(Ok(record));
                true
            }
            Ok(None) => false,
            Err(e) => {
                self.peeked = Some(Err(e));
                true
            }
        }
    }

    /// Read a single MARC record.
    ///
    /// Returns `Ok(Some(record))` if a record was successfully read,
    /// `Ok(None)` at a clean end of stream, or `Err` if reading failed in a
    /// way the active policy mode does not recover from.
    ///
    /// # Errors
    ///
    /// In strict mode, returns the first structural or I/O error
    /// encountered. In permissive mode, a structural anomaly is repaired or
    /// skipped and recorded via [`Self::diagnostics`] instead of failing the
    /// whole stream; only a failure from which no later record can be found
    /// propagates, and then as a clean end of stream rather than an error.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        if let Some(result) = self.peeked.take() {
            return result.map(Some);
        }
        self.advance()
    }

    fn policy_mode(&self) -> PolicyMode {
        if self.config.permissive {
            PolicyMode::Permissive
        } else {
            PolicyMode::Strict
        }
    }

    /// Produce the next record to yield, absorbing any `combine_partials`
    /// continuations along the way. Clears and repopulates `diagnostics` for
    /// the record(s) this call consumes.
    fn advance(&mut self) -> Result<Option<Record>> {
        self.diagnostics.clear();

        let mut record = match self.lookahead.take() {
            Some(record) => record,
            None => match self.extract_and_decode_one()? {
                None => return Ok(None),
                Some(record) => record,
            },
        };

        if let Some(tags) = self.config.combine_partials.clone() {
            loop {
                let candidate = match self.extract_and_decode_one()? {
                    None => break,
                    Some(candidate) => candidate,
                };
                if is_continuation(&record, &candidate) {
                    let absorbed: Vec<Field> = candidate
                        .all_fields()
                        .filter(|f| tags.contains(f.tag()))
                        .cloned()
                        .collect();
                    record.absorb_fields(absorbed);
                } else {
                    self.lookahead = Some(candidate);
                    break;
                }
            }
        }

        self.records_read += 1;
        Ok(Some(record))
    }

    /// Extract and decode exactly one record from the stream, retrying past
    /// structural failures in permissive mode by resyncing to the next
    /// record terminator. Returns `Ok(None)` at a clean end of stream, or
    /// once a failure can no longer be resynced past.
    fn extract_and_decode_one(&mut self) -> Result<Option<Record>> {
        loop {
            let mut policy = PolicyContext::new(self.policy_mode());
            let raw = match frame::extract_record(&mut self.stream, &mut policy) {
                Ok(None) => {
                    self.diagnostics.extend(policy.take_diagnostics());
                    return Ok(None);
                }
                Ok(Some(raw)) => raw,
                Err(e) => {
                    self.diagnostics.extend(policy.take_diagnostics());
                    if self.config.permissive {
                        return if self.resync()? { continue } else { Ok(None) };
                    }
                    return Err(e);
                }
            };

            let options = DecodeOptions {
                to_utf_8: self.config.to_utf_8,
                default_encoding: self.config.default_encoding,
            };
            match decoder::decode(&raw, options, &mut policy) {
                Ok(record) => {
                    self.diagnostics.extend(policy.take_diagnostics());
                    return Ok(Some(record));
                }
                Err(e) => {
                    self.diagnostics.extend(policy.take_diagnostics());
                    if self.config.permissive {
                        return if self.resync()? { continue } else { Ok(None) };
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Skip forward to just past the next record terminator, so the next
    /// `extract_record` call starts at a fresh record. Uses the stream's own
    /// mark/reset so a window can be scanned with `memchr` instead of
    /// checking one byte at a time, while still stopping exactly at the
    /// terminator rather than overconsuming into the next record.
    ///
    /// Returns `Ok(false)` if the stream ends before a terminator is found.
    fn resync(&mut self) -> Result<bool> {
        const WINDOW: usize = 4096;
        loop {
            self.stream.mark(WINDOW);
            let mut buf = vec![0u8; WINDOW];
            let filled = read_partial(&mut self.stream, &mut buf)?;
            if filled == 0 {
                return Ok(false);
            }
            if let Some(p) = memchr::memchr(RECORD_TERMINATOR, &buf[..filled]) {
                self.stream.reset()?;
                let mut consumed = vec![0u8; p + 1];
                self.stream.read_exact(&mut consumed)?;
                return Ok(true);
            }
            if filled < WINDOW {
                return Ok(false);
            }
        }
    }
}

/// Read up to `buf.len()` bytes, returning how many were read before EOF
/// (mirrors the frame extractor's own partial-read helper).
fn read_partial<S: Read>(stream: &mut ByteStream<S>, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read_byte()? {
            Some(b) => {
                buf[filled] = b;
                filled += 1;
            }
            None => break,
        }
    }
    Ok(filled)
}

/// Heuristic for whether `candidate` is a continuation of `primary`: it has
/// no "001" of its own, or its "001" matches `primary`'s.
fn is_continuation(primary: &Record, candidate: &Record) -> bool {
    match candidate.get_control_number() {
        None => true,
        Some(id) => Some(id) == primary.get_control_number(),
    }
}

impl<R: Read> Iterator for MarcReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl<R: Read + std::fmt::Debug> FormatReader for MarcReader<R> {
    fn read_record(&mut self) -> Result<Option<Record>> {
        MarcReader::read_record(self)
    }

    fn records_read(&self) -> Option<usize> {
        Some(self.records_read)
    }
}
