//! Charset converter interface: the external-collaborator contract for
//! turning field bytes into Unicode text.
//!
//! Full MARC-8/ANSEL table data is out of scope; [`DefaultEncoding::Marc8`]
//! is a documented best-effort passthrough rather than a real MARC-8 decoder.
//! Callers needing exact MARC-8 fidelity should implement [`CharsetConverter`]
//! themselves and plug it into the reader.

use encoding_rs::WINDOWS_1252;

/// Which built-in decoding strategy a [`CharsetConverter`] should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultEncoding {
    /// MARC-8: treated as a best-effort Latin-1-ish passthrough. A deliberate
    /// simplification; the full MARC-8 escape-sequence table is out of scope.
    Marc8,
    /// ISO 8859-1 (Latin-1), decoded via `encoding_rs`.
    Iso8859_1,
    /// UTF-8.
    #[default]
    Utf8,
    /// Try UTF-8 and ISO 8859-1, keep whichever yields fewer replacement
    /// characters.
    BestGuess,
}

/// The result of converting a field's raw bytes to Unicode text.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    /// The decoded text.
    pub text: String,
    /// Count of bytes that could not be mapped and were replaced with U+FFFD.
    pub replacement_count: usize,
}

/// A pluggable byte-to-Unicode converter for field data.
///
/// Built-in implementations cover UTF-8, ISO 8859-1, and a best-guess
/// heuristic between the two. A converter backed by real MARC-8 tables is
/// free to implement this trait externally.
pub trait CharsetConverter {
    /// Convert `bytes` to Unicode text under the given default encoding.
    fn convert(&self, bytes: &[u8], default_encoding: DefaultEncoding) -> ConversionResult;
}

/// The converter shipped with this crate: UTF-8, Latin-1, a Latin-1-ish
/// MARC-8 passthrough, and a best-guess chooser between UTF-8 and Latin-1.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinConverter;

impl BuiltinConverter {
    fn decode_utf8(bytes: &[u8]) -> ConversionResult {
        match std::str::from_utf8(bytes) {
            Ok(s) => ConversionResult {
                text: s.to_string(),
                replacement_count: 0,
            },
            Err(_) => {
                let text = String::from_utf8_lossy(bytes).into_owned();
                let replacement_count = text.chars().filter(|&c| c == '\u{FFFD}').count();
                ConversionResult {
                    text,
                    replacement_count,
                }
            }
        }
    }

    fn decode_latin1(bytes: &[u8]) -> ConversionResult {
        let (cow, _, had_errors) = WINDOWS_1252.decode(bytes);
        let text = cow.into_owned();
        let replacement_count = if had_errors {
            text.chars().filter(|&c| c == '\u{FFFD}').count()
        } else {
            0
        };
        ConversionResult {
            text,
            replacement_count,
        }
    }
}

impl CharsetConverter for BuiltinConverter {
    fn convert(&self, bytes: &[u8], default_encoding: DefaultEncoding) -> ConversionResult {
        match default_encoding {
            DefaultEncoding::Utf8 => Self::decode_utf8(bytes),
            // Most MARC-8 text is 7-bit ASCII outside of its escape sequences
            // and diacritic combining characters; a Latin-1 decode is a
            // reasonable best-effort stand-in for the bytes this crate can
            // see without the full table.
            DefaultEncoding::Marc8 | DefaultEncoding::Iso8859_1 => Self::decode_latin1(bytes),
            DefaultEncoding::BestGuess => {
                let utf8 = Self::decode_utf8(bytes);
                if utf8.replacement_count == 0 {
                    return utf8;
                }
                let latin1 = Self::decode_latin1(bytes);
                if latin1.replacement_count <= utf8.replacement_count {
                    latin1
                } else {
                    utf8
                }
            }
        }
    }
}
