//! MARC record leader parsing and manipulation.
//!
//! The MARC leader is a 24-byte fixed-length field at the start of every MARC record.
//! It contains metadata describing the record's structure, content type, and encoding.
//!
//! # Structure
//!
//! - Positions 0-4: Record length (5 digits)
//! - Position 5: Record status
//! - Position 6: Record type (a = language material, c = music, etc.)
//! - Position 7: Bibliographic level (m = monograph, s = serial, etc.)
//! - Position 8: Type of control
//! - Position 9: Character coding (space = MARC-8, a = UTF-8)
//! - Position 10: Indicator count (usually 2)
//! - Position 11: Subfield code count (usually 2)
//! - Positions 12-16: Base address of data (5 digits)
//! - Positions 17-19: Encoding level, cataloging form, multipart level
//! - Position 20: Length of the "length of field" directory-entry subfield (usually 4)
//! - Position 21: Length of the "starting character position" directory-entry subfield (usually 5)
//! - Position 22: Length of the "implementation defined" directory-entry subfield (usually 0)
//! - Position 23: Undefined, reserved by the standard

use crate::error::{MarcError, Result};

/// MARC Leader - 24 bytes at the start of every MARC record.
///
/// Contains metadata about the record structure and content.
/// All MARC records must begin with exactly 24 bytes of leader information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leader {
    /// Record length (5 digits) - positions 0-4
    pub record_length: u32,
    /// Record status (1 char) - position 5
    pub record_status: char,
    /// Type of record (1 char) - position 6
    pub record_type: char,
    /// Bibliographic level (1 char) - position 7
    pub bibliographic_level: char,
    /// Type of control (1 char) - position 8
    pub control_record_type: char,
    /// Character coding scheme (1 char) - position 9
    pub character_coding: char,
    /// Indicator count (1 digit) - position 10 (usually 2)
    pub indicator_count: u8,
    /// Subfield code count (1 digit) - position 11 (usually 2)
    pub subfield_code_count: u8,
    /// Base address of data (5 digits) - positions 12-16
    pub data_base_address: u32,
    /// Encoding level (1 char) - position 17
    pub encoding_level: char,
    /// Cataloging form (1 char) - position 18
    pub cataloging_form: char,
    /// Multipart resource record level (1 char) - position 19
    pub multipart_level: char,
    /// Length of the "length of field" directory-entry subfield - position 20
    pub length_of_length: u8,
    /// Length of the "starting character position" directory-entry subfield - position 21
    pub length_of_starting_position: u8,
    /// Length of the "implementation defined" directory-entry subfield - position 22
    pub length_of_implementation_defined: u8,
    /// Undefined, reserved by the standard - position 23
    pub undefined: char,
}

/// Width, in bytes, of a directory entry's tag subfield. Fixed by the
/// standard, unlike the leader's three variable entry-map lengths.
const DIRECTORY_TAG_WIDTH: usize = 3;

impl Leader {
    /// Get valid values for a specific leader position (MARC 21 spec reference).
    ///
    /// # Arguments
    ///
    /// * `position` - The leader position (5-19)
    ///
    /// # Returns
    ///
    /// A vector of tuples containing (value, description) for valid values at that position.
    /// Returns `None` for unknown positions.
    #[must_use]
    pub fn valid_values_at_position(position: usize) -> Option<Vec<(&'static str, &'static str)>> {
        match position {
            5 => Some(vec![
                ("a", "Increase in encoding level"),
                ("c", "Corrected or revised"),
                ("d", "Deleted"),
                ("n", "New"),
                ("p", "Increase in encoding level from prepublication"),
            ]),
            6 => Some(vec![
                ("a", "Language material"),
                ("c", "Notated music"),
                ("d", "Manuscript notated music"),
                ("e", "Cartographic material"),
                ("f", "Manuscript cartographic material"),
                ("g", "Projected medium"),
                ("i", "Nonmusical sound recording"),
                ("j", "Musical sound recording"),
                ("k", "Two-dimensional nonprojectable graphic"),
                ("m", "Computer file"),
                ("o", "Kit"),
                ("p", "Mixed materials"),
                (
                    "r",
                    "Three-dimensional artifact or naturally occurring object",
                ),
                ("t", "Manuscript language material"),
            ]),
            7 => Some(vec![
                ("a", "Monographic component part"),
                ("b", "Serial component part"),
                ("c", "Collection"),
                ("d", "Subunit"),
                ("i", "Integrating resource"),
                ("m", "Monograph/Item"),
                ("s", "Serial"),
            ]),
            8 => Some(vec![("#", "No specified type"), ("a", "Archival")]),
            9 => Some(vec![(" ", "MARC-8"), ("a", "UCS/Unicode")]),
            17 => Some(vec![
                (" ", "Full level"),
                ("1", "Full level, material not examined"),
                ("2", "Less-than-full level, material not examined"),
                ("3", "Abbreviated level"),
                ("4", "Core level"),
                ("5", "Partial (preliminary) level"),
                ("7", "Minimal level"),
                ("8", "Prepublication level"),
                ("u", "Unknown"),
                ("z", "Not applicable"),
            ]),
            18 => Some(vec![
                (" ", "Non-ISBD"),
                ("a", "AACR 2"),
                ("c", "ISBD punctuation omitted"),
                ("i", "ISBD punctuation included"),
                ("n", "Non-ISBD punctuation omitted"),
                ("u", "Unknown"),
            ]),
            19 => Some(vec![
                (" ", "Not specified or not applicable"),
                ("a", "Set"),
                ("b", "Part with independent title"),
                ("c", "Part with dependent title"),
            ]),
            _ => None,
        }
    }

    /// Get description for a specific value at a leader position.
    #[must_use]
    pub fn describe_value(position: usize, value: &str) -> Option<&'static str> {
        Self::valid_values_at_position(position).and_then(|values| {
            values
                .into_iter()
                .find(|(v, _)| *v == value)
                .map(|(_, desc)| desc)
        })
    }

    /// Check if a value is valid for a specific leader position.
    ///
    /// If the position has no defined valid values, any value is considered valid.
    #[must_use]
    pub fn is_valid_value(position: usize, value: &str) -> bool {
        match Self::valid_values_at_position(position) {
            Some(values) => values.iter().any(|(v, _)| *v == value),
            None => true,
        }
    }

    /// Width in bytes of one directory entry under this leader's declared
    /// entry-map sizes: 3 (fixed tag width) + `length_of_length` +
    /// `length_of_starting_position` + `length_of_implementation_defined`.
    #[must_use]
    pub fn directory_entry_width(&self) -> usize {
        DIRECTORY_TAG_WIDTH
            + self.length_of_length as usize
            + self.length_of_starting_position as usize
            + self.length_of_implementation_defined as usize
    }

    /// Parse a leader from 24 bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are invalid or too short.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 24 {
            return Err(MarcError::MalformedLeader(format!(
                "Leader must be at least 24 bytes, got {}",
                bytes.len()
            )));
        }

        let record_length = parse_digits(&bytes[0..5])?;
        let record_status = bytes[5] as char;
        let record_type = bytes[6] as char;
        let bibliographic_level = bytes[7] as char;
        let control_record_type = bytes[8] as char;
        let character_coding = bytes[9] as char;

        let indicator_count = digit_at(bytes, 10)?;
        let subfield_code_count = digit_at(bytes, 11)?;

        let data_base_address = parse_digits(&bytes[12..17])?;
        let encoding_level = bytes[17] as char;
        let cataloging_form = bytes[18] as char;
        let multipart_level = bytes[19] as char;
        let length_of_length = digit_at(bytes, 20)?;
        let length_of_starting_position = digit_at(bytes, 21)?;
        let length_of_implementation_defined = digit_at(bytes, 22)?;
        let undefined = bytes[23] as char;

        Ok(Leader {
            record_length,
            record_status,
            record_type,
            bibliographic_level,
            control_record_type,
            character_coding,
            indicator_count,
            subfield_code_count,
            data_base_address,
            encoding_level,
            cataloging_form,
            multipart_level,
            length_of_length,
            length_of_starting_position,
            length_of_implementation_defined,
            undefined,
        })
    }

    /// Validate that the leader is suitable for binary record reading.
    ///
    /// Checks that `record_length` and `data_base_address` are at least 24,
    /// which is required before performing arithmetic on these fields during
    /// binary ISO 2709 parsing, and that `record_length` fits the standard's
    /// 5-digit field.
    ///
    /// # Errors
    ///
    /// Returns an error if `record_length` or `data_base_address` is less
    /// than 24, or if `record_length` exceeds 99999.
    pub fn validate_for_reading(&self) -> Result<()> {
        if self.record_length < 24 {
            return Err(MarcError::MalformedLeader(format!(
                "Record length must be at least 24, got {}",
                self.record_length
            )));
        }
        if self.record_length > 99_999 {
            return Err(MarcError::MalformedLeader(format!(
                "Record length must not exceed 99999, got {}",
                self.record_length
            )));
        }
        if self.data_base_address < 24 {
            return Err(MarcError::MalformedLeader(format!(
                "Base address of data must be at least 24, got {}",
                self.data_base_address
            )));
        }
        Ok(())
    }

    /// Serialize leader to a 24-byte array.
    ///
    /// # Errors
    ///
    /// Returns an error if the leader values are invalid for serialization
    /// (record length or base address too large to fit their 5-digit fields).
    pub fn as_bytes(&self) -> Result<Vec<u8>> {
        if self.record_length > 99_999 {
            return Err(MarcError::InvalidRecord(format!(
                "Record length {} exceeds 5-digit field width",
                self.record_length
            )));
        }
        if self.data_base_address > 99_999 {
            return Err(MarcError::InvalidRecord(format!(
                "Base address {} exceeds 5-digit field width",
                self.data_base_address
            )));
        }

        let mut bytes = Vec::with_capacity(24);
        bytes.extend_from_slice(format!("{:05}", self.record_length).as_bytes());
        bytes.push(self.record_status as u8);
        bytes.push(self.record_type as u8);
        bytes.push(self.bibliographic_level as u8);
        bytes.push(self.control_record_type as u8);
        bytes.push(self.character_coding as u8);
        bytes.push(b'0' + self.indicator_count);
        bytes.push(b'0' + self.subfield_code_count);
        bytes.extend_from_slice(format!("{:05}", self.data_base_address).as_bytes());
        bytes.push(self.encoding_level as u8);
        bytes.push(self.cataloging_form as u8);
        bytes.push(self.multipart_level as u8);
        bytes.push(b'0' + self.length_of_length);
        bytes.push(b'0' + self.length_of_starting_position);
        bytes.push(b'0' + self.length_of_implementation_defined);
        bytes.push(self.undefined as u8);

        Ok(bytes)
    }

    /// A leader with standard MARC21 entry-map sizes (4/5/0) and blank
    /// content-describing positions, suitable as a starting point for
    /// building a new record before the writer fills in length and base
    /// address.
    #[must_use]
    pub fn default_marc21() -> Self {
        Leader {
            record_length: 0,
            record_status: 'n',
            record_type: 'a',
            bibliographic_level: 'm',
            control_record_type: ' ',
            character_coding: 'a',
            indicator_count: 2,
            subfield_code_count: 2,
            data_base_address: 0,
            encoding_level: ' ',
            cataloging_form: 'a',
            multipart_level: ' ',
            length_of_length: 4,
            length_of_starting_position: 5,
            length_of_implementation_defined: 0,
            undefined: '0',
        }
    }
}

/// Parse a single ASCII digit at `position` into `u8`.
fn digit_at(bytes: &[u8], position: usize) -> Result<u8> {
    (bytes[position] as char).to_digit(10).map_or_else(
        || {
            Err(MarcError::MalformedLeader(format!(
                "Invalid digit at leader position {position}: '{}'",
                bytes[position] as char
            )))
        },
        |d| {
            u8::try_from(d).map_err(|_| {
                MarcError::MalformedLeader(format!("Digit at position {position} out of range"))
            })
        },
    )
}

/// Parse a 5-digit ASCII number from bytes.
fn parse_digits(bytes: &[u8]) -> Result<u32> {
    if bytes.len() != 5 {
        return Err(MarcError::MalformedLeader(format!(
            "Expected 5-digit field, got {} bytes",
            bytes.len()
        )));
    }

    let mut result = 0u32;
    for &byte in bytes {
        if byte.is_ascii_digit() {
            result = result * 10 + u32::from(byte - b'0');
        } else {
            return Err(MarcError::MalformedLeader(format!(
                "Invalid numeric field: expected digits, got byte {}",
                byte as char
            )));
        }
    }
    Ok(result)
}
