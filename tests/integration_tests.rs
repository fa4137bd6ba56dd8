//! End-to-end reader/writer tests exercising `MarcReader`/`MarcWriter`
//! together over records built in memory, rather than binary fixture files.

use marc21::{Field, Leader, MarcReader, MarcWriter, Record};
use std::io::Cursor;

fn book_record() -> Record {
    let mut record = Record::new(Leader::default_marc21());
    record.add_field(Field::control("001", "ocm12345678"));
    record.add_field(Field::control("008", "920101s1992    nyu           000 0 eng d"));
    record.add_field(Field::data(
        "100",
        '1',
        ' ',
        vec![('a', "Doe, Jane.".to_string())],
    ));
    record.add_field(Field::data(
        "245",
        '1',
        '0',
        vec![
            ('a', "A simple book /".to_string()),
            ('c', "Jane Doe.".to_string()),
        ],
    ));
    record.add_field(Field::data(
        "650",
        ' ',
        '0',
        vec![('a', "Fiction.".to_string())],
    ));
    record
}

fn music_score_record() -> Record {
    let mut record = Record::new(Leader::default_marc21());
    record.add_field(Field::control("001", "ocm99999999"));
    record.add_field(Field::data(
        "245",
        '0',
        '0',
        vec![('a', "Piano concerto no. 2 /".to_string())],
    ));
    record.add_field(Field::data(
        "650",
        ' ',
        '0',
        vec![('a', "Concertos (Piano)".to_string())],
    ));
    record
}

fn encode(records: &[Record]) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut writer = MarcWriter::new(&mut buffer);
        for record in records {
            writer.write_record(record).unwrap();
        }
        writer.finish().unwrap();
    }
    buffer
}

#[test]
fn reads_a_single_record_and_its_fields() {
    let bytes = encode(&[book_record()]);
    let mut reader = MarcReader::new(Cursor::new(bytes));

    let record = reader.read_record().unwrap().unwrap();
    assert_eq!(record.get_control_number(), Some("ocm12345678"));

    let title = record.get_field("245").unwrap();
    assert_eq!(title.get_subfield('a'), Some("A simple book /"));
    assert_eq!(title.get_subfield('c'), Some("Jane Doe."));

    assert!(reader.read_record().unwrap().is_none());
}

#[test]
fn reads_a_record_with_only_control_fields_and_one_data_field() {
    let bytes = encode(&[music_score_record()]);
    let mut reader = MarcReader::new(Cursor::new(bytes));

    let record = reader.read_record().unwrap().unwrap();
    assert_eq!(record.get_control_number(), Some("ocm99999999"));
    assert!(record.get_field("100").is_none());
    assert_eq!(
        record.get_field("650").unwrap().get_subfield('a'),
        Some("Concertos (Piano)")
    );
}

#[test]
fn reads_multiple_records_in_order() {
    let bytes = encode(&[book_record(), music_score_record()]);
    let mut reader = MarcReader::new(Cursor::new(bytes));

    let first = reader.read_record().unwrap().unwrap();
    let second = reader.read_record().unwrap().unwrap();
    assert_eq!(first.get_control_number(), Some("ocm12345678"));
    assert_eq!(second.get_control_number(), Some("ocm99999999"));
    assert!(reader.read_record().unwrap().is_none());
}

#[test]
fn iterator_interface_yields_results_in_order() {
    let bytes = encode(&[book_record(), music_score_record()]);
    let reader = MarcReader::new(Cursor::new(bytes));

    let ids: Vec<String> = reader
        .map(|r| r.unwrap().get_control_number().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["ocm12345678", "ocm99999999"]);
}

#[test]
fn repeated_tags_preserve_insertion_order() {
    let mut record = Record::new(Leader::default_marc21());
    record.add_field(Field::control("001", "1"));
    for subject in ["History", "Fiction", "Biography"] {
        record.add_field(Field::data("650", ' ', '0', vec![('a', subject.to_string())]));
    }

    let bytes = encode(&[record]);
    let mut reader = MarcReader::new(Cursor::new(bytes));
    let decoded = reader.read_record().unwrap().unwrap();

    let subjects: Vec<&str> = decoded
        .get_fields("650")
        .into_iter()
        .map(|f| f.get_subfield('a').unwrap())
        .collect();
    assert_eq!(subjects, vec!["History", "Fiction", "Biography"]);
}

#[test]
fn control_number_field_is_always_first_among_control_fields() {
    let mut record = Record::new(Leader::default_marc21());
    record.add_field(Field::control("008", "fixed-length data"));
    record.add_field(Field::control("001", "z1"));

    let bytes = encode(&[record]);
    let mut reader = MarcReader::new(Cursor::new(bytes));
    let decoded = reader.read_record().unwrap().unwrap();

    let control_tags: Vec<&str> = decoded
        .all_fields()
        .filter(|f| f.is_control())
        .map(marc21::Field::tag)
        .collect();
    assert_eq!(control_tags, vec!["001", "008"]);
}

#[test]
fn find_matches_fields_whose_canonical_string_matches_the_pattern() {
    let bytes = encode(&[book_record()]);
    let mut reader = MarcReader::new(Cursor::new(bytes));
    let record = reader.read_record().unwrap().unwrap();

    let pattern = regex::Regex::new(r"Fiction").unwrap();
    let matches = record.find(&pattern);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].tag(), "650");
}

#[test]
fn display_impl_renders_leader_and_fields() {
    let mut record = Record::new(Leader::default_marc21());
    record.add_field(Field::control("001", "1"));
    record.add_field(Field::data("245", '1', '0', vec![('a', "Title".to_string())]));

    let rendered = record.to_string();
    assert!(rendered.contains("001 1"));
    assert!(rendered.contains("245 10$aTitle"));
}

#[test]
fn round_trips_through_writer_and_reader_unchanged() {
    let original = book_record();
    let bytes = encode(&[original.clone()]);
    let mut reader = MarcReader::new(Cursor::new(bytes));
    let decoded = reader.read_record().unwrap().unwrap();

    assert_eq!(decoded.get_control_number(), original.get_control_number());
    for tag in ["008", "100", "245", "650"] {
        let original_field = original.get_field(tag).unwrap();
        let decoded_field = decoded.get_field(tag).unwrap();
        assert_eq!(decoded_field.canonical_string(), original_field.canonical_string());
    }
}
