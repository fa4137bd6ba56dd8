//! Tests for the permissive framing-recovery behavior of `MarcReader`:
//! declared lengths that disagree with the actual terminator position,
//! truncated streams, and a stream mixing valid and malformed records.
//!
//! Records are assembled in memory (via `MarcWriter` for valid ones, and by
//! direct byte manipulation for deliberately malformed ones) rather than
//! depending on binary fixture files on disk.

use marc21::{DiagnosticKind, Field, Leader, MarcReader, MarcWriter, Record};
use std::io::Cursor;

const RECORD_TERMINATOR: u8 = 0x1D;
const FIELD_TERMINATOR: u8 = 0x1E;

fn sample_record(control_number: &str) -> Record {
    let mut record = Record::new(Leader::default_marc21());
    record.add_field(Field::control("001", control_number));
    record.add_field(Field::data(
        "245",
        '1',
        '0',
        vec![('a', format!("Title for {control_number}"))],
    ));
    record
}

fn encode_one(record: &Record) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut writer = MarcWriter::new(&mut buffer);
    writer.write_record(record).unwrap();
    writer.finish().unwrap();
    buffer
}

fn overwrite_declared_length(mut bytes: Vec<u8>, declared: usize) -> Vec<u8> {
    let digits = format!("{declared:05}");
    bytes[0..5].copy_from_slice(digits.as_bytes());
    bytes
}

/// A 24-byte leader declaring a record of `record_length` bytes total, with
/// a base address of `base_address` (the directory is assumed to consist of
/// nothing but its own terminator at `base_address - 1`).
fn minimal_leader(record_length: usize, base_address: usize) -> Vec<u8> {
    format!("{record_length:05}nam a22{base_address:05}   4500").into_bytes()
}

/// A record that is nothing but a leader, an empty directory (just its
/// terminator), and a record terminator - no fields at all.
fn minimum_size_record() -> Vec<u8> {
    let base_address = 25; // 24-byte leader + 1-byte directory terminator
    let record_length = base_address + 1; // + record terminator
    let mut bytes = minimal_leader(record_length, base_address);
    bytes.push(FIELD_TERMINATOR);
    bytes.push(RECORD_TERMINATOR);
    bytes
}

/// A record whose leader declares a non-digit length, immediately followed
/// by a record terminator so a permissive resync finds something right away.
fn malformed_record_bytes() -> Vec<u8> {
    let mut bytes = b"XXXXXnam a22000001114500".to_vec();
    assert_eq!(bytes.len(), 24);
    bytes.push(RECORD_TERMINATOR);
    bytes
}

#[test]
fn minimum_size_record_decodes_with_no_fields() {
    let bytes = minimum_size_record();
    let mut reader = MarcReader::new(Cursor::new(bytes));

    let record = reader.read_record().unwrap().unwrap();
    assert_eq!(record.get_control_number(), None);
    assert_eq!(record.all_fields().count(), 0);
    assert!(reader.read_record().unwrap().is_none());
}

#[test]
fn declared_length_longer_than_actual_resyncs_to_the_real_terminator() {
    let mut bytes = encode_one(&sample_record("100"));
    let real_len = bytes.len();
    bytes = overwrite_declared_length(bytes, real_len + 20);
    bytes.extend(std::iter::repeat(b'Z').take(20));

    let mut reader = MarcReader::new(Cursor::new(bytes)).permissive();
    let record = reader.read_record().unwrap().unwrap();
    assert_eq!(record.get_control_number(), Some("100"));
    assert!(reader
        .diagnostics()
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::StatedLengthTooLong)));
}

#[test]
fn declared_length_shorter_than_actual_extends_and_resumes_at_the_next_record() {
    let first = encode_one(&sample_record("200"));
    let real_len = first.len();
    assert!(
        real_len > 60,
        "sample record must be long enough that 2x the truncated declared length still covers it"
    );
    let truncated_first = overwrite_declared_length(first, real_len - 20);

    let mut bytes = truncated_first;
    bytes.extend(encode_one(&sample_record("201")));

    let mut reader = MarcReader::new(Cursor::new(bytes)).permissive();

    let first_record = reader.read_record().unwrap().unwrap();
    assert_eq!(first_record.get_control_number(), Some("200"));
    assert!(reader
        .diagnostics()
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::StatedLengthTooShort)));

    let second_record = reader.read_record().unwrap().unwrap();
    assert_eq!(second_record.get_control_number(), Some("201"));

    assert!(reader.read_record().unwrap().is_none());
}

#[test]
fn missing_terminator_before_eof_propagates_as_an_error_in_strict_mode() {
    let mut bytes = encode_one(&sample_record("300"));
    bytes.pop(); // drop the trailing record terminator, never replaced
    let real_len = bytes.len() + 1; // leader still declares a terminator that won't arrive
    bytes = overwrite_declared_length(bytes, real_len);

    let mut reader = MarcReader::new(Cursor::new(bytes));
    assert!(reader.read_record().is_err());
}

#[test]
fn missing_terminator_before_eof_ends_iteration_cleanly_in_permissive_mode() {
    let mut bytes = encode_one(&sample_record("300"));
    bytes.pop();
    let real_len = bytes.len() + 1;
    bytes = overwrite_declared_length(bytes, real_len);

    let mut reader = MarcReader::new(Cursor::new(bytes)).permissive();
    assert_eq!(reader.read_record().unwrap(), None);
}

#[test]
fn permissive_mode_skips_a_malformed_record_amid_valid_ones() {
    let mut bytes = encode_one(&sample_record("1"));
    bytes.extend(encode_one(&sample_record("2")));
    bytes.extend(malformed_record_bytes());
    bytes.extend(encode_one(&sample_record("3")));
    bytes.extend(encode_one(&sample_record("4")));

    let mut reader = MarcReader::new(Cursor::new(bytes)).permissive();
    let mut ids = Vec::new();
    while let Some(record) = reader.read_record().unwrap() {
        ids.push(record.get_control_number().unwrap().to_string());
    }

    assert_eq!(ids, vec!["1", "2", "3", "4"]);
}

#[test]
fn strict_mode_stops_at_the_first_malformed_record() {
    let mut bytes = encode_one(&sample_record("1"));
    bytes.extend(malformed_record_bytes());
    bytes.extend(encode_one(&sample_record("2")));

    let mut reader = MarcReader::new(Cursor::new(bytes));
    let first = reader.read_record().unwrap().unwrap();
    assert_eq!(first.get_control_number(), Some("1"));
    assert!(reader.read_record().is_err());
}
