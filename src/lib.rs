#![warn(missing_docs)]

//! A Rust library for reading MARC21 bibliographic records from the ISO 2709
//! binary format, tolerant of the framing and encoding anomalies real-world
//! MARC data accumulates.
//!
//! ## Quick Start
//!
//! ### Reading MARC Records
//!
//! ```no_run
//! use marc21::MarcReader;
//! use std::fs::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = File::open("records.mrc")?;
//! let mut reader = MarcReader::new(file).permissive();
//!
//! while let Some(record) = reader.read_record()? {
//!     if let Some(title) = record.get_field("245").and_then(|f| f.get_subfield('a')) {
//!         println!("Title: {title}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Creating and Writing MARC Records
//!
//! ```
//! use marc21::{MarcWriter, Record, Field, Leader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut record = Record::new(Leader::default_marc21());
//! record.add_field(Field::control("001", "12345"));
//! record.add_field(Field::data("245", '1', '0', vec![('a', "Test Title".to_string())]));
//!
//! let mut buffer = Vec::new();
//! {
//!     let mut writer = MarcWriter::new(&mut buffer);
//!     writer.write_record(&record)?;
//!     writer.finish()?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`record`] — Core MARC record structures (`Record`, `Field`, `Subfield`)
//! - [`leader`] — MARC record leader (24-byte header)
//! - [`reader`] — Reading MARC records from binary data streams, in strict or permissive mode
//! - [`writer`] — Writing MARC records to binary format
//! - [`formats`] — Format-agnostic `Reader`/`Writer` traits and ISO 2709 support
//! - [`bytestream`] — Markable byte stream adapter used by the frame extractor
//! - [`frame`] — Pulls one record's raw bytes off a stream, tolerating framing anomalies
//! - [`boundary_scanner`] — `memchr`-accelerated record terminator scanning over a buffer
//! - [`decoder`] — Decodes a record's directory and fields from its raw bytes
//! - [`charset`] — Pluggable byte-to-Unicode conversion (UTF-8, Latin-1, best-guess)
//! - [`policy`] — The permissive policy layer: diagnostics instead of hard failures
//! - [`raw_record`] — An undecoded record's raw bytes plus a structurally-derived identifier
//! - [`error`] — Error types and the crate's result type

pub mod boundary_scanner;
pub mod bytestream;
pub mod charset;
pub mod decoder;
pub mod error;
/// Format-agnostic `Reader`/`Writer` traits, with ISO 2709 as the only
/// format implemented in this crate.
pub mod formats;
pub mod frame;
pub mod leader;
pub mod policy;
pub mod raw_record;
/// Core MARC record structures (`Record`, `Field`, `Subfield`).
pub mod record;
pub mod reader;
pub mod writer;

pub use charset::{BuiltinConverter, CharsetConverter, ConversionResult, DefaultEncoding};
pub use error::{MarcError, Result};
pub use formats::{Format, FormatReader, FormatReaderExt, FormatWriter, RecordIterator};
pub use leader::Leader;
pub use policy::{Diagnostic, DiagnosticKind, PolicyContext, PolicyMode, Severity};
pub use raw_record::RawRecord;
pub use reader::{MarcReader, ReaderConfig};
pub use record::{Field, Record, Subfield};
pub use writer::MarcWriter;
