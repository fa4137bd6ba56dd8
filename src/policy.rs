//! Permissive policy layer: detects and optionally repairs structural
//! anomalies in framing and decoding, emitting structured diagnostics instead
//! of always failing the record.

use crate::error::{MarcError, Result};

/// How severe a detected anomaly is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Purely informational; no repair was necessary.
    Info,
    /// A minor, fully-repaired anomaly.
    MinorError,
    /// A significant anomaly; strict mode treats this as fatal for the record.
    MajorError,
    /// Always fatal, regardless of mode.
    Fatal,
    /// Cosmetic oddity (e.g. a non-standard indicator byte) worth surfacing
    /// but never fatal.
    Typo,
}

/// The specific recoverable condition a [`Diagnostic`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Record terminator found before the declared length ended.
    StatedLengthTooLong,
    /// Record terminator found after the declared length, or not at all.
    StatedLengthTooShort,
    /// No record terminator could be found before end of stream.
    MissingTerminator,
    /// `read_exact` hit EOF partway through a declared-length read.
    TruncatedDeclaredLength,
    /// Leader's base address didn't line up with the directory's actual end.
    BaseAddressCorrected,
    /// Directory's terminator wasn't where the base address said it would be.
    DirectoryMisaligned,
    /// A directory entry's tag wasn't 3 ASCII digits.
    NonNumericTag,
    /// A field's data was missing its trailing field terminator.
    MissingFieldTerminator,
    /// A data field's indicator bytes were outside `{space, digit}`.
    NonStandardIndicator,
    /// Charset conversion used the best-guess heuristic rather than a
    /// leader-declared encoding.
    EncodingGuessed,
}

/// One recorded anomaly: what kind, how severe, and where it occurred.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// How severe the anomaly is.
    pub severity: Severity,
    /// The field tag involved, or `None` if not field-specific.
    pub tag: Option<String>,
    /// The subfield code involved, or `None` if not subfield-specific.
    pub subfield_code: Option<char>,
    /// Which recoverable condition this is.
    pub kind: DiagnosticKind,
    /// A human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// Build a diagnostic not tied to any particular field or subfield.
    #[must_use]
    pub fn new(severity: Severity, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            tag: None,
            subfield_code: None,
            kind,
            message: message.into(),
        }
    }

    /// Attach the field tag this diagnostic pertains to.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Attach the subfield code this diagnostic pertains to.
    #[must_use]
    pub fn with_subfield_code(mut self, code: char) -> Self {
        self.subfield_code = Some(code);
        self
    }
}

/// Whether the policy layer should attempt repairs (permissive) or fail fast
/// on the first major anomaly (strict).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyMode {
    /// Fail the record on the first `MajorError` or `Fatal` condition.
    #[default]
    Strict,
    /// Repair what can be repaired; only `Fatal` conditions abort the record.
    Permissive,
}

/// Accumulates diagnostics for one record and decides, per [`PolicyMode`],
/// whether an anomaly aborts the record.
#[derive(Debug, Default)]
pub struct PolicyContext {
    mode: PolicyMode,
    diagnostics: Vec<Diagnostic>,
}

impl PolicyContext {
    /// Start a fresh context in the given mode.
    #[must_use]
    pub fn new(mode: PolicyMode) -> Self {
        PolicyContext {
            mode,
            diagnostics: Vec::new(),
        }
    }

    /// True if repairs should be attempted rather than failing fast.
    #[must_use]
    pub fn is_permissive(&self) -> bool {
        self.mode == PolicyMode::Permissive
    }

    /// All diagnostics recorded so far, in the order they were reported.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Take and clear the accumulated diagnostics, e.g. at the start of a new record.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Report an anomaly. Returns `Err` if this anomaly should abort the
    /// current record under the active mode: `Fatal` always aborts; anything
    /// `MajorError` or worse aborts in strict mode; everything else is
    /// recorded and execution continues.
    ///
    /// # Errors
    ///
    /// Returns `error` unchanged when the diagnostic's severity means the
    /// record cannot continue.
    pub fn report(&mut self, diagnostic: Diagnostic, error: MarcError) -> Result<()> {
        let must_abort = diagnostic.severity == Severity::Fatal
            || (self.mode == PolicyMode::Strict
                && matches!(diagnostic.severity, Severity::MajorError | Severity::Fatal));
        self.diagnostics.push(diagnostic);
        if must_abort {
            Err(error)
        } else {
            Ok(())
        }
    }

    /// Report an anomaly that is never fatal (informational, typo, or
    /// already-repaired minor error) and continue unconditionally.
    pub fn note(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
