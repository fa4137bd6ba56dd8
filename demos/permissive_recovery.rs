//! Reading a batch of records where one record in the middle has a bad
//! declared length, using permissive mode to recover and keep going.

use marc21::{DiagnosticKind, Field, Leader, MarcReader, MarcWriter, Record};
use std::io::Cursor;

fn sample_record(control_number: &str, title: &str) -> Record {
    let mut record = Record::new(Leader::default_marc21());
    record.add_field(Field::control("001", control_number));
    record.add_field(Field::data("245", '1', '0', vec![('a', title.to_string())]));
    record
}

fn encode_one(record: &Record) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut writer = MarcWriter::new(&mut buffer);
    writer.write_record(record).unwrap();
    writer.finish().unwrap();
    buffer
}

fn main() {
    let mut stream = encode_one(&sample_record("1", "First record"));
    let second = encode_one(&sample_record("2", "Second record"));

    // Corrupt the second record's declared length so it's 20 bytes longer
    // than what's actually there, then pad the stream so the frame
    // extractor can still read that many bytes before resyncing.
    let mut corrupted_second = second;
    let real_len = corrupted_second.len();
    let inflated = format!("{:05}", real_len + 20);
    corrupted_second[0..5].copy_from_slice(inflated.as_bytes());
    corrupted_second.extend(std::iter::repeat(b'Z').take(20));

    stream.extend(corrupted_second);
    stream.extend(encode_one(&sample_record("3", "Third record")));

    let mut reader = MarcReader::new(Cursor::new(stream)).permissive();
    while let Some(record) = reader.read_record().unwrap() {
        println!("Read record {:?}", record.get_control_number());
        for diagnostic in reader.diagnostics() {
            if diagnostic.kind == DiagnosticKind::StatedLengthTooLong {
                println!("  recovered from a misstated length: {}", diagnostic.message);
            }
        }
    }
}
