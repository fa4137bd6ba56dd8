//! Directory/field decoder: turns a [`RawRecord`] plus its [`Leader`] into a
//! decoded [`Record`], splitting the data area into control and data fields
//! via the directory, and data fields further into indicators and subfields.

use crate::charset::{BuiltinConverter, CharsetConverter, DefaultEncoding};
use crate::error::{MarcError, Result};
use crate::leader::Leader;
use crate::policy::{Diagnostic, DiagnosticKind, PolicyContext, Severity};
use crate::raw_record::RawRecord;
use crate::record::{Field, Record};

const FIELD_TERMINATOR: u8 = 0x1E;
const SUBFIELD_DELIMITER: u8 = 0x1F;

/// Options controlling how the decoder resolves field bytes to Unicode text.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Force conversion to UTF-8 regardless of the leader's declared encoding.
    pub to_utf_8: bool,
    /// Encoding to feed the converter when the leader doesn't declare UTF-8.
    pub default_encoding: DefaultEncoding,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            to_utf_8: false,
            default_encoding: DefaultEncoding::Utf8,
        }
    }
}

/// Decode a [`RawRecord`] into a [`Record`], consulting `policy` for every
/// repairable anomaly named in the directory/field decoding rules.
///
/// # Errors
///
/// Returns a typed [`MarcError`] for any anomaly the active [`PolicyContext`]
/// treats as fatal (always for [`crate::policy::Severity::Fatal`], and for
/// `MajorError` in strict mode).
pub fn decode(raw: &RawRecord, options: DecodeOptions, policy: &mut PolicyContext) -> Result<Record> {
    let bytes = raw.bytes();
    let leader = Leader::from_bytes(bytes)?;
    leader.validate_for_reading()?;

    let converter = BuiltinConverter;
    let mut encoding = if leader.character_coding == 'a' {
        DefaultEncoding::Utf8
    } else {
        options.default_encoding
    };
    if options.default_encoding == DefaultEncoding::BestGuess {
        encoding = DefaultEncoding::BestGuess;
    }
    if encoding == DefaultEncoding::BestGuess {
        policy.note(Diagnostic::new(
            Severity::Info,
            DiagnosticKind::EncodingGuessed,
            format!(
                "leader declares character coding '{}'; best-guess heuristic used instead",
                leader.character_coding
            ),
        ));
    }

    let base = resolve_base_address(bytes, &leader, policy)?;
    let entries = scan_directory(bytes, &leader, base, policy)?;

    let mut record_leader = leader.clone();
    let mut record = Record::new(record_leader.clone());

    for entry in &entries {
        let field_start = base + entry.start_position;
        let field_end = field_start + entry.field_length;
        if field_end > bytes.len() || field_start > field_end {
            policy.report(
                Diagnostic::new(
                    Severity::MajorError,
                    DiagnosticKind::DirectoryMisaligned,
                    format!(
                        "field {} claims range [{field_start}, {field_end}) outside record bounds",
                        entry.tag
                    ),
                )
                .with_tag(entry.tag.clone()),
                MarcError::DirectoryMisaligned(format!(
                    "field {} out of bounds",
                    entry.tag
                )),
            )?;
            continue;
        }

        let mut field_bytes = &bytes[field_start..field_end];
        if field_bytes.last() != Some(&FIELD_TERMINATOR) {
            policy.note(
                Diagnostic::new(
                    Severity::MinorError,
                    DiagnosticKind::MissingFieldTerminator,
                    format!("field {} missing trailing field terminator", entry.tag),
                )
                .with_tag(entry.tag.clone()),
            );
        } else {
            field_bytes = &field_bytes[..field_bytes.len() - 1];
        }

        if is_control_tag(&entry.tag) {
            let converted = converter.convert(field_bytes, encoding);
            record.add_field(Field::control(entry.tag.clone(), converted.text));
        } else {
            let field = decode_data_field(&entry.tag, field_bytes, &converter, encoding, policy)?;
            record.add_field(field);
        }
    }

    if options.to_utf_8 {
        record_leader.character_coding = 'a';
        record.leader = record_leader;
    }

    Ok(record)
}

struct DirectoryEntry {
    tag: String,
    field_length: usize,
    start_position: usize,
}

fn is_control_tag(tag: &str) -> bool {
    tag.len() == 3 && tag.bytes().all(|b| b.is_ascii_digit()) && tag <= "009"
}

/// Resolve `leader.data_base_address`, falling back to scanning for the
/// nearest field terminator if the stated value disagrees with where the
/// directory actually ends.
fn resolve_base_address(bytes: &[u8], leader: &Leader, policy: &mut PolicyContext) -> Result<usize> {
    let stated = leader.data_base_address as usize;
    if stated >= 24 && stated <= bytes.len() && bytes.get(stated.saturating_sub(1)) == Some(&FIELD_TERMINATOR) {
        return Ok(stated);
    }

    // Scan for the directory's terminator: search forward from position 24.
    let found = bytes[24..]
        .iter()
        .position(|&b| b == FIELD_TERMINATOR)
        .map(|p| 24 + p + 1);

    match found {
        Some(corrected) => {
            policy.note(Diagnostic::new(
                Severity::Info,
                DiagnosticKind::BaseAddressCorrected,
                format!("leader declared base address {stated}, corrected to {corrected}"),
            ));
            Ok(corrected)
        }
        None => {
            let diag = Diagnostic::new(
                Severity::MajorError,
                DiagnosticKind::DirectoryMisaligned,
                "no field terminator found; cannot locate end of directory".to_string(),
            );
            policy.report(
                diag,
                MarcError::DirectoryMisaligned("could not locate directory terminator".to_string()),
            )?;
            // Permissive mode: fall back to the stated value even though it's
            // suspect, so the caller still gets a best-effort decode.
            Ok(stated.max(24))
        }
    }
}

fn scan_directory(
    bytes: &[u8],
    leader: &Leader,
    base: usize,
    policy: &mut PolicyContext,
) -> Result<Vec<DirectoryEntry>> {
    let entry_width = leader.directory_entry_width();
    let length_width = leader.length_of_length as usize;
    let start_width = leader.length_of_starting_position as usize;

    if entry_width <= 3 || base < 24 || base > bytes.len() {
        return Ok(Vec::new());
    }

    let directory_end = base - 1; // position of the directory's field terminator
    let directory = &bytes[24..directory_end.min(bytes.len())];

    let mut entries = Vec::new();
    let mut pos = 0;
    while pos + entry_width <= directory.len() {
        let chunk = &directory[pos..pos + entry_width];
        pos += entry_width;

        let tag_bytes = &chunk[0..3];
        let tag = String::from_utf8_lossy(tag_bytes).to_string();
        if !tag_bytes.iter().all(u8::is_ascii_digit) {
            policy.note(
                Diagnostic::new(
                    Severity::Typo,
                    DiagnosticKind::NonNumericTag,
                    format!("non-numeric directory tag '{tag}' preserved literally"),
                )
                .with_tag(tag.clone()),
            );
        }

        let length_bytes = &chunk[3..3 + length_width];
        let start_bytes = &chunk[3 + length_width..3 + length_width + start_width];

        let field_length = match ascii_digits_to_usize(length_bytes) {
            Some(n) => n,
            None => {
                policy.report(
                    Diagnostic::new(
                        Severity::MajorError,
                        DiagnosticKind::DirectoryMisaligned,
                        format!("field {tag} has a non-numeric length entry"),
                    )
                    .with_tag(tag.clone()),
                    MarcError::DirectoryMisaligned(format!("field {tag} length not numeric")),
                )?;
                continue;
            }
        };
        let start_position = match ascii_digits_to_usize(start_bytes) {
            Some(n) => n,
            None => {
                policy.report(
                    Diagnostic::new(
                        Severity::MajorError,
                        DiagnosticKind::DirectoryMisaligned,
                        format!("field {tag} has a non-numeric start position"),
                    )
                    .with_tag(tag.clone()),
                    MarcError::DirectoryMisaligned(format!("field {tag} start not numeric")),
                )?;
                continue;
            }
        };

        entries.push(DirectoryEntry {
            tag,
            field_length,
            start_position,
        });
    }

    Ok(entries)
}

fn ascii_digits_to_usize(bytes: &[u8]) -> Option<usize> {
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

fn decode_data_field(
    tag: &str,
    field_bytes: &[u8],
    converter: &BuiltinConverter,
    encoding: DefaultEncoding,
    policy: &mut PolicyContext,
) -> Result<Field> {
    if field_bytes.len() < 2 {
        policy.report(
            Diagnostic::new(
                Severity::MajorError,
                DiagnosticKind::NonStandardIndicator,
                format!("field {tag} is too short to hold two indicator bytes"),
            )
            .with_tag(tag.to_string()),
            MarcError::InvalidField(format!("field {tag} too short for indicators")),
        )?;
        return Ok(Field::data(tag.to_string(), ' ', ' ', std::iter::empty()));
    }

    let indicator1 = field_bytes[0] as char;
    let indicator2 = field_bytes[1] as char;
    for (pos, indicator) in [(0, indicator1), (1, indicator2)] {
        if !(indicator == ' ' || indicator.is_ascii_digit() || indicator.is_ascii_lowercase()) {
            policy.note(
                Diagnostic::new(
                    Severity::Typo,
                    DiagnosticKind::NonStandardIndicator,
                    format!("field {tag} indicator{} byte '{indicator}' is non-standard", pos + 1),
                )
                .with_tag(tag.to_string()),
            );
        }
    }

    let subfield_bytes = &field_bytes[2..];
    let mut subfields = Vec::new();
    let mut pos = 0;
    while pos < subfield_bytes.len() {
        if subfield_bytes[pos] != SUBFIELD_DELIMITER {
            // Stray bytes before the first delimiter; skip to the next one.
            pos += 1;
            continue;
        }
        pos += 1;
        if pos >= subfield_bytes.len() {
            break;
        }
        let code = subfield_bytes[pos] as char;
        pos += 1;
        let start = pos;
        while pos < subfield_bytes.len() && subfield_bytes[pos] != SUBFIELD_DELIMITER {
            pos += 1;
        }
        let converted = converter.convert(&subfield_bytes[start..pos], encoding);
        subfields.push((code, converted.text));
    }

    Ok(Field::data(tag.to_string(), indicator1, indicator2, subfields))
}
