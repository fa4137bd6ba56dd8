//! Frame extractor: pulls exactly one record's raw bytes off a
//! [`ByteStream`], tolerating framing anomalies between the declared leader
//! length and the actual position of the record terminator.

use crate::bytestream::ByteStream;
use crate::error::{MarcError, Result};
use crate::policy::{Diagnostic, DiagnosticKind, PolicyContext, Severity};
use crate::raw_record::RawRecord;
use std::io::Read;

const RECORD_TERMINATOR: u8 = 0x1D;
const LEADER_LENGTH: usize = 24;

/// Extract the next record's bytes from `stream`.
///
/// Returns `Ok(None)` on a clean end of stream (zero bytes available for the
/// leader). Every other failure path returns a typed [`MarcError`]; success
/// paths that required a repair report a [`Diagnostic`] to `policy` but still
/// return the record.
///
/// # Errors
///
/// Returns [`MarcError::TruncatedLeader`] if 1-23 bytes remain, propagates
/// [`MarcError::MalformedLeader`] if the length field isn't ASCII digits, and
/// surfaces [`MarcError::StatedLengthTooLong`], [`MarcError::StatedLengthTooShort`],
/// [`MarcError::MissingTerminator`], or [`MarcError::UnexpectedEof`] per the
/// anomaly encountered. In strict mode these framing anomalies are fatal for
/// the record; in permissive mode they are repaired and noted as diagnostics.
pub fn extract_record<R: Read>(
    stream: &mut ByteStream<R>,
    policy: &mut PolicyContext,
) -> Result<Option<RawRecord>> {
    stream.mark(LEADER_LENGTH);
    let mut leader_buf = [0u8; LEADER_LENGTH];
    let leader_bytes_read = read_partial(stream, &mut leader_buf)?;

    if leader_bytes_read == 0 {
        return Ok(None);
    }
    if leader_bytes_read < LEADER_LENGTH {
        return Err(MarcError::TruncatedLeader(leader_bytes_read));
    }

    let length = parse_declared_length(&leader_buf)?;

    stream.reset()?;
    stream.mark(length.saturating_mul(2).max(LEADER_LENGTH));

    let mut buf = vec![0u8; length];
    match stream.read_exact(&mut buf) {
        Ok(()) => handle_full_read(stream, buf, length, policy),
        Err(MarcError::UnexpectedEof(_)) => handle_short_stream(stream, length, policy),
        Err(other) => Err(other),
    }
}

/// Read up to `buf.len()` bytes, returning how many were actually read
/// before EOF (rather than failing like `read_exact` would).
fn read_partial<R: Read>(stream: &mut ByteStream<R>, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read_byte()? {
            Some(b) => {
                buf[filled] = b;
                filled += 1;
            }
            None => break,
        }
    }
    Ok(filled)
}

fn parse_declared_length(leader_buf: &[u8; LEADER_LENGTH]) -> Result<usize> {
    let digits = &leader_buf[0..5];
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(MarcError::MalformedLeader(format!(
            "record length field is not ASCII digits: {:?}",
            String::from_utf8_lossy(digits)
        )));
    }
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| MarcError::MalformedLeader("unparseable record length".to_string()))
}

/// Case A: `read_exact` of the declared length succeeded.
fn handle_full_read<R: Read>(
    stream: &mut ByteStream<R>,
    buf: Vec<u8>,
    length: usize,
    policy: &mut PolicyContext,
) -> Result<Option<RawRecord>> {
    if buf[length - 1] == RECORD_TERMINATOR {
        return Ok(Some(RawRecord::new(buf)));
    }

    match buf.iter().position(|&b| b == RECORD_TERMINATOR) {
        Some(p) if p < length - 1 => {
            // Declared length too long: re-read exactly p + 1 bytes.
            stream.reset()?;
            let mut corrected = vec![0u8; p + 1];
            stream.read_exact(&mut corrected)?;
            let diag = Diagnostic::new(
                Severity::MajorError,
                DiagnosticKind::StatedLengthTooLong,
                format!("declared length {length} but terminator found at offset {p}"),
            );
            policy.report(
                diag,
                MarcError::StatedLengthTooLong(format!(
                    "declared length {length} but terminator found at offset {p}"
                )),
            )?;
            Ok(Some(RawRecord::new(corrected)))
        }
        Some(_) => unreachable!("terminator at buf[length - 1] handled above"),
        None => {
            // Declared length too short: keep reading until a terminator or EOF.
            stream.reset()?;
            let mut extended = vec![0u8; length];
            stream.read_exact(&mut extended)?;
            loop {
                match stream.read_byte()? {
                    Some(b) => {
                        extended.push(b);
                        if b == RECORD_TERMINATOR {
                            let diag = Diagnostic::new(
                                Severity::MajorError,
                                DiagnosticKind::StatedLengthTooShort,
                                format!(
                                    "declared length {length} but terminator found at offset {}",
                                    extended.len() - 1
                                ),
                            );
                            policy.report(
                                diag,
                                MarcError::StatedLengthTooShort(format!(
                                    "declared length {length} but terminator found at offset {}",
                                    extended.len() - 1
                                )),
                            )?;
                            return Ok(Some(RawRecord::new(extended)));
                        }
                    }
                    None => {
                        let diag = Diagnostic::new(
                            Severity::Fatal,
                            DiagnosticKind::MissingTerminator,
                            "stream ended before a record terminator was found".to_string(),
                        );
                        policy.report(
                            diag,
                            MarcError::MissingTerminator(format!(
                                "declared length {length}, stream ended after {} bytes",
                                extended.len()
                            )),
                        )?;
                        unreachable!("report() returns Err for Fatal severity");
                    }
                }
            }
        }
    }
}

/// Case B: `read_exact` of the declared length hit EOF partway through.
fn handle_short_stream<R: Read>(
    stream: &mut ByteStream<R>,
    length: usize,
    policy: &mut PolicyContext,
) -> Result<Option<RawRecord>> {
    stream.reset()?;
    let mut buf = Vec::new();
    while let Some(b) = stream.read_byte()? {
        buf.push(b);
        if b == RECORD_TERMINATOR {
            policy.note(Diagnostic::new(
                Severity::MinorError,
                DiagnosticKind::TruncatedDeclaredLength,
                format!(
                    "declared length {length} but stream only had {} bytes before the terminator",
                    buf.len()
                ),
            ));
            return Ok(Some(RawRecord::new(buf)));
        }
    }
    Err(MarcError::UnexpectedEof(format!(
        "declared length {length}, stream ended after {} bytes with no record terminator",
        buf.len()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyMode;
    use std::io::Cursor;

    fn record_bytes(body_len_claim: usize, body: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(format!("{body_len_claim:05}").as_bytes());
        bytes.extend_from_slice(b"nam a2200123   4500");
        debug_assert_eq!(bytes.len(), LEADER_LENGTH);
        bytes.extend_from_slice(body);
        bytes
    }

    #[test]
    fn test_clean_eof_returns_none() {
        let mut stream = ByteStream::new(Cursor::new(Vec::<u8>::new()));
        let mut policy = PolicyContext::new(PolicyMode::Permissive);
        let result = extract_record(&mut stream, &mut policy).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_truncated_leader_errors() {
        let mut stream = ByteStream::new(Cursor::new(b"short".to_vec()));
        let mut policy = PolicyContext::new(PolicyMode::Permissive);
        let err = extract_record(&mut stream, &mut policy).unwrap_err();
        assert!(matches!(err, MarcError::TruncatedLeader(5)));
    }

    #[test]
    fn test_exact_length_with_terminator_succeeds() {
        let body = vec![b'x'; 10];
        let mut full_body = body.clone();
        full_body.push(RECORD_TERMINATOR);
        let total_len = LEADER_LENGTH + full_body.len();
        let bytes = record_bytes(total_len, &full_body);

        let mut stream = ByteStream::new(Cursor::new(bytes));
        let mut policy = PolicyContext::new(PolicyMode::Permissive);
        let record = extract_record(&mut stream, &mut policy).unwrap().unwrap();
        assert_eq!(record.bytes().last(), Some(&RECORD_TERMINATOR));
        assert!(policy.diagnostics().is_empty());
    }

    #[test]
    fn test_declared_length_too_long_resyncs() {
        // Declare a length longer than where the terminator actually is.
        let mut full_body = vec![b'x'; 5];
        full_body.push(RECORD_TERMINATOR);
        full_body.extend_from_slice(b"garbage-that-should-not-be-read");
        let declared_total = LEADER_LENGTH + 5 + 1 + 20; // too long, but within stream bounds
        let bytes = record_bytes(declared_total, &full_body);

        let mut stream = ByteStream::new(Cursor::new(bytes));
        let mut policy = PolicyContext::new(PolicyMode::Permissive);
        let record = extract_record(&mut stream, &mut policy).unwrap().unwrap();
        assert_eq!(record.bytes().last(), Some(&RECORD_TERMINATOR));
        assert!(policy
            .diagnostics()
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::StatedLengthTooLong)));
    }

    #[test]
    fn test_declared_length_too_short_extends() {
        let mut full_body = vec![b'x'; 20];
        full_body.push(RECORD_TERMINATOR);
        let declared_total = LEADER_LENGTH + 5; // much shorter than actual
        let bytes = record_bytes(declared_total, &full_body);

        let mut stream = ByteStream::new(Cursor::new(bytes));
        let mut policy = PolicyContext::new(PolicyMode::Permissive);
        let record = extract_record(&mut stream, &mut policy).unwrap().unwrap();
        assert_eq!(record.bytes().last(), Some(&RECORD_TERMINATOR));
        assert!(policy
            .diagnostics()
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::StatedLengthTooShort)));
    }

    #[test]
    fn test_missing_terminator_before_eof_is_fatal() {
        let full_body = vec![b'x'; 10]; // no terminator anywhere
        let declared_total = LEADER_LENGTH + 5;
        let bytes = record_bytes(declared_total, &full_body);

        let mut stream = ByteStream::new(Cursor::new(bytes));
        let mut policy = PolicyContext::new(PolicyMode::Permissive);
        let err = extract_record(&mut stream, &mut policy).unwrap_err();
        assert!(matches!(err, MarcError::MissingTerminator(_)));
    }

    #[test]
    fn test_short_stream_with_terminator_truncates() {
        let mut full_body = vec![b'x'; 5];
        full_body.push(RECORD_TERMINATOR);
        // Declare a length far larger than what the stream can actually deliver.
        let declared_total = LEADER_LENGTH + 500;
        let bytes = record_bytes(declared_total, &full_body);

        let mut stream = ByteStream::new(Cursor::new(bytes));
        let mut policy = PolicyContext::new(PolicyMode::Permissive);
        let record = extract_record(&mut stream, &mut policy).unwrap().unwrap();
        assert_eq!(record.bytes().last(), Some(&RECORD_TERMINATOR));
        assert!(policy
            .diagnostics()
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::TruncatedDeclaredLength)));
    }

    #[test]
    fn test_short_stream_without_terminator_errors() {
        let full_body = vec![b'x'; 5]; // no terminator, stream just ends
        let declared_total = LEADER_LENGTH + 500;
        let bytes = record_bytes(declared_total, &full_body);

        let mut stream = ByteStream::new(Cursor::new(bytes));
        let mut policy = PolicyContext::new(PolicyMode::Permissive);
        let err = extract_record(&mut stream, &mut policy).unwrap_err();
        assert!(matches!(err, MarcError::UnexpectedEof(_)));
    }

    #[test]
    fn test_declared_length_too_long_is_fatal_in_strict_mode() {
        let mut full_body = vec![b'x'; 5];
        full_body.push(RECORD_TERMINATOR);
        full_body.extend_from_slice(b"garbage-that-should-not-be-read");
        let declared_total = LEADER_LENGTH + 5 + 1 + 20;
        let bytes = record_bytes(declared_total, &full_body);

        let mut stream = ByteStream::new(Cursor::new(bytes));
        let mut policy = PolicyContext::new(PolicyMode::Strict);
        let err = extract_record(&mut stream, &mut policy).unwrap_err();
        assert!(matches!(err, MarcError::StatedLengthTooLong(_)));
        assert!(policy
            .diagnostics()
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::StatedLengthTooLong)));
    }

    #[test]
    fn test_declared_length_too_short_is_fatal_in_strict_mode() {
        let mut full_body = vec![b'x'; 20];
        full_body.push(RECORD_TERMINATOR);
        let declared_total = LEADER_LENGTH + 5;
        let bytes = record_bytes(declared_total, &full_body);

        let mut stream = ByteStream::new(Cursor::new(bytes));
        let mut policy = PolicyContext::new(PolicyMode::Strict);
        let err = extract_record(&mut stream, &mut policy).unwrap_err();
        assert!(matches!(err, MarcError::StatedLengthTooShort(_)));
        assert!(policy
            .diagnostics()
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::StatedLengthTooShort)));
    }
}
