//! Reading MARC records and querying fields.
//!
//! Demonstrates building a record in memory, writing it to ISO 2709 bytes,
//! reading it back, and using the query surface (`get_field`, `get_fields`,
//! `find`) to pull specific information out of it.

use marc21::{Field, Leader, MarcReader, MarcWriter, Record};
use regex::Regex;
use std::io::Cursor;

fn main() {
    let record = create_sample_record();

    let mut buffer = Vec::new();
    {
        let mut writer = MarcWriter::new(&mut buffer);
        writer.write_record(&record).unwrap();
        writer.finish().unwrap();
    }

    let mut reader = MarcReader::new(Cursor::new(buffer));
    let record = reader.read_record().unwrap().unwrap();

    println!("=== Basic Field Access ===\n");
    basic_field_access(&record);

    println!("\n=== Filtering by Indicator ===\n");
    filter_by_indicator(&record);

    println!("\n=== Regex Search ===\n");
    regex_search(&record);
}

fn create_sample_record() -> Record {
    let mut record = Record::new(Leader::default_marc21());
    record.add_field(Field::control("001", "ocm12345678"));
    record.add_field(Field::control(
        "008",
        "200101s2020    xxu||||||||||||||||eng||",
    ));
    record.add_field(Field::data(
        "245",
        '1',
        '0',
        vec![
            ('a', "Advanced Rust patterns /".to_string()),
            ('c', "Jane Smith.".to_string()),
        ],
    ));
    record.add_field(Field::data(
        "650",
        ' ',
        '0',
        vec![('a', "Rust (Computer program language)".to_string())],
    ));
    record.add_field(Field::data(
        "650",
        ' ',
        '1',
        vec![('a', "Software engineering.".to_string())],
    ));
    record.add_field(Field::data(
        "700",
        '1',
        ' ',
        vec![
            ('a', "Jones, Bob,".to_string()),
            ('e', "editor.".to_string()),
        ],
    ));
    record
}

fn basic_field_access(record: &Record) {
    println!("Control number: {:?}", record.get_control_number());

    if let Some(title) = record.get_field("245") {
        for subfield in title.subfields() {
            println!("  ${}: {}", subfield.code, subfield.value);
        }
    }

    let subjects = record.get_fields("650");
    println!("Subject (650) fields: {}", subjects.len());
    for field in &subjects {
        if let Some(value) = field.get_subfield('a') {
            println!("  {value}");
        }
    }
}

fn filter_by_indicator(record: &Record) {
    let lcsh_subjects: Vec<_> = record
        .get_fields("650")
        .into_iter()
        .filter(|f| matches!(f, Field::Data { indicator2, .. } if *indicator2 == '0'))
        .collect();
    println!("LCSH subjects (indicator2 = '0'): {}", lcsh_subjects.len());
    for field in lcsh_subjects {
        if let Some(value) = field.get_subfield('a') {
            println!("  {value}");
        }
    }
}

fn regex_search(record: &Record) {
    let pattern = Regex::new(r"engineering").unwrap();
    for field in record.find(&pattern) {
        println!("Matched: {field}");
    }
}
