//! Error types for MARC operations.
//!
//! This module provides the [`MarcError`] type for all MARC library operations
//! and the [`Result`] convenience type.

use thiserror::Error;

/// Error type for all MARC library operations.
///
/// Represents the structural failure modes a permissive ISO 2709 reader can
/// encounter: framing anomalies in the byte stream, malformed leaders and
/// directories, and the generic catch-alls retained for conditions that don't
/// warrant their own variant.
#[derive(Error, Debug)]
pub enum MarcError {
    /// Record ended before a complete 24-byte leader could be read.
    #[error("Truncated leader: got {0} of 24 bytes")]
    TruncatedLeader(usize),

    /// Stream ended without producing a usable record.
    #[error("Unexpected end of stream: {0}")]
    UnexpectedEof(String),

    /// Leader length or base-address fields were not ASCII digits, or failed
    /// the structural bounds check (length >= 24, base address >= 24).
    #[error("Malformed leader: {0}")]
    MalformedLeader(String),

    /// Record declared a length but a record terminator turned up earlier.
    #[error("Declared length too long: {0}")]
    StatedLengthTooLong(String),

    /// Record declared a length but a record terminator turned up later, or
    /// not at all (when not also `MissingTerminator`).
    #[error("Declared length too short: {0}")]
    StatedLengthTooShort(String),

    /// No record terminator (0x1D) was found before the stream ended.
    #[error("Missing record terminator: {0}")]
    MissingTerminator(String),

    /// The directory's entries could not be aligned with the expected base
    /// address even after scanning for the nearest field terminator.
    #[error("Directory misaligned: {0}")]
    DirectoryMisaligned(String),

    /// Invalid or malformed MARC record structure not covered by a more
    /// specific variant.
    #[error("Invalid MARC record: {0}")]
    InvalidRecord(String),

    /// Invalid field structure (e.g. a data field too short to hold its two
    /// indicator bytes).
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// Bytes could not be converted from the declared or configured charset.
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// `ByteStream::reset()` was called after the replay buffer's `mark`
    /// bound had already been exceeded.
    #[error("Mark expired: replay buffer exceeded its {limit}-byte bound")]
    MarkExpired {
        /// The limit passed to the most recent `mark()` call.
        limit: usize,
    },

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Convenience type alias for [`std::result::Result`] with [`MarcError`].
pub type Result<T> = std::result::Result<T, MarcError>;
