//! Writing MARC records to binary format.
//!
//! This module provides [`MarcWriter`] for serializing [`Record`] instances
//! to ISO 2709 binary format that can be written to any destination
//! implementing [`std::io::Write`].
//!
//! # Examples
//!
//! ```
//! use marc21::{MarcWriter, Record, Field, Leader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut record = Record::new(Leader::default_marc21());
//! record.add_field(Field::control("001", "12345"));
//! record.add_field(Field::data("245", '1', '0', vec![('a', "Title".to_string())]));
//!
//! let mut buffer = Vec::new();
//! let mut writer = MarcWriter::new(&mut buffer);
//! writer.write_record(&record)?;
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```

use crate::error::{MarcError, Result};
use crate::formats::FormatWriter;
use crate::record::{Field, Record};
use std::io::Write;

const FIELD_TERMINATOR: u8 = 0x1E;
const SUBFIELD_DELIMITER: u8 = 0x1F;
const RECORD_TERMINATOR: u8 = 0x1D;

/// Writer for ISO 2709 binary MARC format.
///
/// `MarcWriter` serializes [`Record`] instances to ISO 2709 binary format.
/// Records are written one at a time to any destination implementing
/// [`std::io::Write`].
#[derive(Debug)]
pub struct MarcWriter<W: Write> {
    writer: W,
    records_written: usize,
    finished: bool,
}

impl<W: Write> MarcWriter<W> {
    /// Create a new MARC writer.
    pub fn new(writer: W) -> Self {
        MarcWriter {
            writer,
            records_written: 0,
            finished: false,
        }
    }

    /// Write a single MARC record.
    ///
    /// Serializes the record's fields (control fields, then data fields, in
    /// the order [`Record::all_fields`] yields them) and leader to ISO 2709
    /// binary bytes, using the leader's own entry-map widths rather than
    /// assuming the standard 4/5/0 split, so a record whose leader declares
    /// non-standard widths round-trips faithfully.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer has already been finished, if a
    /// field's length or position overflows the leader's declared digit
    /// widths, or if the underlying write fails.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.finished {
            return Err(MarcError::InvalidRecord(
                "Cannot write to a finished writer".to_string(),
            ));
        }

        let length_width = record.leader.length_of_length as usize;
        let start_width = record.leader.length_of_starting_position as usize;
        let impl_width = record.leader.length_of_implementation_defined as usize;

        let mut data_area = Vec::new();
        let mut directory = Vec::new();
        let mut current_position = 0usize;

        for field in record.all_fields() {
            let field_data = encode_field(field);
            let field_length = field_data.len();

            directory.extend_from_slice(field.tag().as_bytes());
            push_fixed_digits(&mut directory, field_length, length_width)?;
            push_fixed_digits(&mut directory, current_position, start_width)?;
            for _ in 0..impl_width {
                directory.push(b'0');
            }

            data_area.extend_from_slice(&field_data);
            current_position += field_length;
        }

        directory.push(FIELD_TERMINATOR);

        let base_address = 24 + directory.len();
        let record_length = base_address + data_area.len() + 1;

        let mut leader = record.leader.clone();
        leader.record_length = u32::try_from(record_length)
            .map_err(|_| MarcError::InvalidRecord("Record length exceeds 5-digit field".to_string()))?;
        leader.data_base_address = u32::try_from(base_address)
            .map_err(|_| MarcError::InvalidRecord("Base address exceeds 5-digit field".to_string()))?;

        let leader_bytes = leader.as_bytes()?;
        self.writer.write_all(&leader_bytes)?;
        self.writer.write_all(&directory)?;
        self.writer.write_all(&data_area)?;
        self.writer.write_all(&[RECORD_TERMINATOR])?;

        self.records_written += 1;
        Ok(())
    }

    /// Flush the writer and mark it as finished.
    ///
    /// After calling `finish`, no more records can be written.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing the underlying writer fails.
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.finished = true;
        Ok(())
    }

    /// Returns the number of records written so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }
}

fn encode_field(field: &Field) -> Vec<u8> {
    let mut bytes = Vec::new();
    match field {
        Field::Control { data, .. } => {
            bytes.extend_from_slice(data.as_bytes());
        }
        Field::Data {
            indicator1,
            indicator2,
            subfields,
            ..
        } => {
            bytes.push(*indicator1 as u8);
            bytes.push(*indicator2 as u8);
            for subfield in subfields {
                bytes.push(SUBFIELD_DELIMITER);
                bytes.push(subfield.code as u8);
                bytes.extend_from_slice(subfield.value.as_bytes());
            }
        }
    }
    bytes.push(FIELD_TERMINATOR);
    bytes
}

/// Push `value` as `width` ASCII digits, zero-padded. Errors if `value`
/// doesn't fit in `width` digits.
fn push_fixed_digits(out: &mut Vec<u8>, value: usize, width: usize) -> Result<()> {
    let rendered = format!("{value:0width$}", width = width);
    if rendered.len() != width {
        return Err(MarcError::InvalidRecord(format!(
            "value {value} does not fit in a {width}-digit directory field"
        )));
    }
    out.extend_from_slice(rendered.as_bytes());
    Ok(())
}

impl<W: Write + std::fmt::Debug> FormatWriter for MarcWriter<W> {
    fn write_record(&mut self, record: &Record) -> Result<()> {
        MarcWriter::write_record(self, record)
    }

    fn finish(&mut self) -> Result<()> {
        MarcWriter::finish(self)
    }

    fn records_written(&self) -> Option<usize> {
        Some(self.records_written)
    }
}
