//! `RawRecord`: an owned, undecoded byte buffer for exactly one ISO 2709
//! record, plus a lazily-computed identifier.

use crate::leader::Leader;

const FIELD_TERMINATOR: u8 = 0x1E;
const RECORD_TERMINATOR: u8 = 0x1D;

/// One record's raw bytes (Leader through Record Terminator, inclusive).
///
/// The control-number identifier is computed by walking the directory
/// structurally rather than decoding the whole record, since the directory
/// and its lengths are pure ASCII digits and need no charset conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    bytes: Vec<u8>,
}

impl RawRecord {
    /// Wrap a byte buffer as a `RawRecord`. Does not validate structure;
    /// callers that need a validated leader should parse one separately.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        RawRecord { bytes }
    }

    /// The record's raw bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume this `RawRecord`, returning its owned byte buffer.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// True if the buffer's last byte is the Record Terminator.
    #[must_use]
    pub fn has_terminator(&self) -> bool {
        self.bytes.last() == Some(&RECORD_TERMINATOR)
    }

    /// The trimmed data of the "001" control field, if present, computed by
    /// a direct structural walk over the directory and data area (no full
    /// decode, no charset conversion, since directory/control-field bytes
    /// are pure ASCII digits for "001").
    #[must_use]
    pub fn control_number(&self) -> Option<String> {
        let leader = Leader::from_bytes(&self.bytes).ok()?;
        let base = leader.data_base_address as usize;
        if base < 24 || base > self.bytes.len() {
            return None;
        }
        let entry_width = leader.directory_entry_width();
        if entry_width <= 3 {
            return None;
        }
        let length_width = leader.length_of_length as usize;
        let start_width = leader.length_of_starting_position as usize;

        let directory = &self.bytes[24..base.saturating_sub(1).max(24)];
        let mut pos = 0;
        while pos + entry_width <= directory.len() {
            let entry = &directory[pos..pos + entry_width];
            pos += entry_width;
            let tag = &entry[0..3];
            if tag != b"001" {
                continue;
            }
            let length_bytes = &entry[3..3 + length_width];
            let start_bytes = &entry[3 + length_width..3 + length_width + start_width];
            let field_length = ascii_digits_to_usize(length_bytes)?;
            let start = ascii_digits_to_usize(start_bytes)?;
            let field_start = base + start;
            let field_end = field_start + field_length;
            if field_end > self.bytes.len() || field_start > field_end {
                return None;
            }
            let mut field = &self.bytes[field_start..field_end];
            if field.last() == Some(&FIELD_TERMINATOR) {
                field = &field[..field.len() - 1];
            }
            return Some(String::from_utf8_lossy(field).trim().to_string());
        }
        None
    }

    /// Byte-concatenate `self` followed by `other`, keeping `self`'s
    /// identifier as the combined record's identifier.
    #[must_use]
    pub fn combine(&self, other: &RawRecord) -> RawRecord {
        let mut bytes = Vec::with_capacity(self.bytes.len() + other.bytes.len());
        bytes.extend_from_slice(&self.bytes);
        bytes.extend_from_slice(&other.bytes);
        RawRecord { bytes }
    }
}

fn ascii_digits_to_usize(bytes: &[u8]) -> Option<usize> {
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(bytes).ok()?.parse().ok()
}
