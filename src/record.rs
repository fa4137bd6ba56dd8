//! MARC bibliographic record structures and operations.
//!
//! This module provides the core record types for working with MARC
//! bibliographic records:
//! - [`Record`] — the leader plus an ordered collection of fields
//! - [`Field`] — a tagged control or data field
//! - [`Subfield`] — a code/value pair within a data field
//!
//! # Examples
//!
//! ```
//! use marc21::{Record, Field, Leader};
//!
//! let mut record = Record::new(Leader::default_marc21());
//! record.add_field(Field::control("001", "12345"));
//! record.add_field(
//!     Field::data("245", '1', '0', vec![('a', "Title".to_string())]),
//! );
//!
//! assert_eq!(record.get_control_number(), Some("12345"));
//! ```

use regex::Regex;
use smallvec::SmallVec;
use std::fmt;

use crate::leader::Leader;

/// A subfield within a data field: a single-byte code and its text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subfield {
    /// Subfield code (single character, following the `0x1F` delimiter).
    pub code: char,
    /// Subfield value.
    pub value: String,
}

impl Subfield {
    /// Build a new subfield.
    pub fn new(code: char, value: impl Into<String>) -> Self {
        Subfield {
            code,
            value: value.into(),
        }
    }
}

/// A MARC field: either a control field (tag "001"-"009", data only) or a
/// data field (tag "010"-"999", two indicators plus one or more subfields).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// A control field: tag "001"-"009".
    Control {
        /// 3-character tag.
        tag: String,
        /// Field data.
        data: String,
    },
    /// A data field: tag "010"-"999".
    Data {
        /// 3-character tag.
        tag: String,
        /// First indicator byte.
        indicator1: char,
        /// Second indicator byte.
        indicator2: char,
        /// The field's subfields, in order.
        subfields: SmallVec<[Subfield; 4]>,
    },
}

impl Field {
    /// Build a control field.
    pub fn control(tag: impl Into<String>, data: impl Into<String>) -> Self {
        Field::Control {
            tag: tag.into(),
            data: data.into(),
        }
    }

    /// Build a data field from an iterable of `(code, value)` pairs.
    pub fn data(
        tag: impl Into<String>,
        indicator1: char,
        indicator2: char,
        subfields: impl IntoIterator<Item = (char, String)>,
    ) -> Self {
        Field::Data {
            tag: tag.into(),
            indicator1,
            indicator2,
            subfields: subfields
                .into_iter()
                .map(|(code, value)| Subfield::new(code, value))
                .collect(),
        }
    }

    /// This field's tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Field::Control { tag, .. } | Field::Data { tag, .. } => tag,
        }
    }

    /// True if this is a control field (tag "001"-"009").
    #[must_use]
    pub fn is_control(&self) -> bool {
        matches!(self, Field::Control { .. })
    }

    /// This field's subfields, empty for control fields.
    #[must_use]
    pub fn subfields(&self) -> &[Subfield] {
        match self {
            Field::Control { .. } => &[],
            Field::Data { subfields, .. } => subfields,
        }
    }

    /// The first subfield value for `code`, if any. Control fields never match.
    #[must_use]
    pub fn get_subfield(&self, code: char) -> Option<&str> {
        self.subfields()
            .iter()
            .find(|s| s.code == code)
            .map(|s| s.value.as_str())
    }

    /// All subfield values for `code`, in order.
    pub fn get_subfield_values(&self, code: char) -> impl Iterator<Item = &str> {
        self.subfields()
            .iter()
            .filter(move |s| s.code == code)
            .map(|s| s.value.as_str())
    }

    /// Append a subfield to a data field. No-op on control fields.
    pub fn add_subfield(&mut self, code: char, value: impl Into<String>) {
        if let Field::Data { subfields, .. } = self {
            subfields.push(Subfield::new(code, value));
        }
    }

    /// The canonical stringification used by `Record`'s `Display` impl:
    /// `"TAG DATA"` for control fields, `"TAG IJ$cDATA$cDATA..."` for data
    /// fields, where `$c` is a literal `$` followed by the subfield code.
    #[must_use]
    pub fn canonical_string(&self) -> String {
        match self {
            Field::Control { tag, data } => format!("{tag} {data}"),
            Field::Data {
                tag,
                indicator1,
                indicator2,
                subfields,
            } => {
                let mut s = format!("{tag} {indicator1}{indicator2}");
                for sf in subfields {
                    s.push('$');
                    s.push(sf.code);
                    s.push_str(&sf.value);
                }
                s
            }
        }
    }

    /// True if this field's canonical stringification matches `pattern`.
    #[must_use]
    pub fn matches(&self, pattern: &Regex) -> bool {
        pattern.is_match(&self.canonical_string())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_string())
    }
}

/// A parsed tag, used to dispatch between the control and data field lists.
enum TagClass {
    /// Control field tag ("001"-"009").
    Control,
    /// Data field tag ("010"-"999").
    Data,
}

/// Classify a 3-character tag. Returns `None` for tags that don't parse as
/// 3 ASCII digits; callers treat that as "no match" rather than an error,
/// mirroring the donor crate's numeric-tag dispatch.
fn classify_tag(tag: &str) -> Option<TagClass> {
    if tag.len() != 3 || !tag.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if tag <= "009" {
        Some(TagClass::Control)
    } else {
        Some(TagClass::Data)
    }
}

/// A MARC bibliographic record: a leader plus an ordered collection of
/// fields.
///
/// Control fields and data fields are tracked separately to guarantee the
/// iteration-order invariant (control fields first, "001" always leading,
/// then data fields, both in insertion order) without relying on a single
/// tag-grouped map, which cannot preserve true interleaved insertion order
/// across differing tags.
#[derive(Debug, Clone)]
pub struct Record {
    /// Record leader (24 bytes).
    pub leader: Leader,
    control_fields: Vec<Field>,
    data_fields: Vec<Field>,
}

impl Record {
    /// Create a new, empty record with the given leader.
    #[must_use]
    pub fn new(leader: Leader) -> Self {
        Record {
            leader,
            control_fields: Vec::new(),
            data_fields: Vec::new(),
        }
    }

    /// Add a field to the record.
    ///
    /// If `field` is a control field tagged "001", it replaces any existing
    /// "001" control field and is placed first among the control fields.
    /// Otherwise it's appended to the matching list (control or data) in
    /// insertion order.
    pub fn add_field(&mut self, field: Field) {
        if field.is_control() && field.tag() == "001" {
            self.control_fields.retain(|f| f.tag() != "001");
            self.control_fields.insert(0, field);
            return;
        }
        if field.is_control() {
            self.control_fields.push(field);
        } else {
            self.data_fields.push(field);
        }
    }

    /// Remove a field by identity (its position, compared by value).
    /// No-op if the field isn't present.
    pub fn remove_field(&mut self, field: &Field) {
        if let Some(pos) = self.control_fields.iter().position(|f| f == field) {
            self.control_fields.remove(pos);
            return;
        }
        if let Some(pos) = self.data_fields.iter().position(|f| f == field) {
            self.data_fields.remove(pos);
        }
    }

    /// The data of the "001" control field, trimmed, or `None` if absent.
    #[must_use]
    pub fn get_control_number(&self) -> Option<&str> {
        self.control_fields
            .first()
            .filter(|f| f.tag() == "001")
            .map(|f| match f {
                Field::Control { data, .. } => data.trim(),
                Field::Data { .. } => unreachable!("001 is always a control field"),
            })
    }

    /// The first field with the given 3-character tag, consulting the
    /// control or data list per the tag's numeric class. Tags that don't
    /// parse as 3 ASCII digits yield `None` rather than an error.
    #[must_use]
    pub fn get_field(&self, tag: &str) -> Option<&Field> {
        match classify_tag(tag)? {
            TagClass::Control => self.control_fields.iter().find(|f| f.tag() == tag),
            TagClass::Data => self.data_fields.iter().find(|f| f.tag() == tag),
        }
    }

    /// All fields with the given 3-character tag, in insertion order.
    pub fn get_fields(&self, tag: &str) -> Vec<&Field> {
        match classify_tag(tag) {
            Some(TagClass::Control) => {
                self.control_fields.iter().filter(|f| f.tag() == tag).collect()
            }
            Some(TagClass::Data) => self.data_fields.iter().filter(|f| f.tag() == tag).collect(),
            None => Vec::new(),
        }
    }

    /// All fields whose tag is in `tags`, concatenated in the given tag order.
    pub fn get_fields_for_tags<'a, I>(&self, tags: I) -> Vec<&Field>
    where
        I: IntoIterator<Item = &'a str>,
    {
        tags.into_iter().flat_map(|tag| self.get_fields(tag)).collect()
    }

    /// All fields in canonical order: control fields ("001" first), then data fields.
    pub fn all_fields(&self) -> impl Iterator<Item = &Field> {
        self.control_fields.iter().chain(self.data_fields.iter())
    }

    /// Fields whose canonical stringification matches `pattern`, scanning
    /// control fields then data fields.
    pub fn find<'a>(&'a self, pattern: &'a Regex) -> impl Iterator<Item = &'a Field> {
        self.all_fields().filter(move |f| f.matches(pattern))
    }

    /// Fields with the given tag whose canonical stringification matches `pattern`.
    pub fn find_tag<'a>(&'a self, tag: &'a str, pattern: &'a Regex) -> Vec<&'a Field> {
        self.get_fields(tag)
            .into_iter()
            .filter(|f| f.matches(pattern))
            .collect()
    }

    /// Append `other`'s fields after this record's own fields; used to
    /// implement `combine_partials` linking continuation fields back onto
    /// their originating record.
    pub fn absorb_fields(&mut self, other: impl IntoIterator<Item = Field>) {
        for field in other {
            if field.is_control() {
                self.control_fields.push(field);
            } else {
                self.data_fields.push(field);
            }
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "LEADER {:05}", self.leader.record_length)?;
        for field in self.all_fields() {
            writeln!(f, "{field}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_leader() -> Leader {
        Leader::default_marc21()
    }

    #[test]
    fn test_add_field_and_get_control_number() {
        let mut record = Record::new(sample_leader());
        record.add_field(Field::control("001", " 12345 "));
        assert_eq!(record.get_control_number(), Some("12345"));
    }

    #[test]
    fn test_001_always_first_and_unique() {
        let mut record = Record::new(sample_leader());
        record.add_field(Field::control("003", "OCoLC"));
        record.add_field(Field::control("001", "first"));
        record.add_field(Field::control("001", "replacement"));

        let tags: Vec<&str> = record.all_fields().map(Field::tag).collect();
        assert_eq!(tags[0], "001");
        assert_eq!(record.get_control_number(), Some("replacement"));
        assert_eq!(
            record.get_fields("001").len(),
            1,
            "only one 001 control field should survive"
        );
    }

    #[test]
    fn test_all_fields_order_control_then_data() {
        let mut record = Record::new(sample_leader());
        record.add_field(Field::data("245", '1', '0', vec![('a', "Title".to_string())]));
        record.add_field(Field::control("001", "1"));
        record.add_field(Field::control("008", "bar"));

        let tags: Vec<&str> = record.all_fields().map(Field::tag).collect();
        assert_eq!(tags, vec!["001", "008", "245"]);
    }

    #[test]
    fn test_get_field_dispatches_by_tag_class() {
        let mut record = Record::new(sample_leader());
        record.add_field(Field::control("008", "data"));
        record.add_field(Field::data("245", '1', '0', vec![('a', "Title".to_string())]));

        assert!(record.get_field("008").is_some());
        assert!(record.get_field("245").is_some());
        assert!(record.get_field("650").is_none());
    }

    #[test]
    fn test_non_numeric_tag_yields_no_match_not_error() {
        let record = Record::new(sample_leader());
        assert!(record.get_field("abc").is_none());
        assert!(record.get_fields("abc").is_empty());
    }

    #[test]
    fn test_remove_field() {
        let mut record = Record::new(sample_leader());
        let field = Field::data("650", ' ', '0', vec![('a', "Subject".to_string())]);
        record.add_field(field.clone());
        assert_eq!(record.get_fields("650").len(), 1);
        record.remove_field(&field);
        assert!(record.get_fields("650").is_empty());
    }

    #[test]
    fn test_canonical_string_control_field() {
        let field = Field::control("001", "12345");
        assert_eq!(field.canonical_string(), "001 12345");
    }

    #[test]
    fn test_canonical_string_data_field() {
        let field = Field::data(
            "245",
            '1',
            '0',
            vec![('a', "Title".to_string()), ('c', "Author".to_string())],
        );
        assert_eq!(field.canonical_string(), "245 10$aTitle$cAuthor");
    }

    #[test]
    fn test_find_with_regex() {
        let mut record = Record::new(sample_leader());
        record.add_field(Field::data("650", ' ', '0', vec![('a', "Fiction".to_string())]));
        record.add_field(Field::data("650", ' ', '0', vec![('a', "History".to_string())]));

        let pattern = Regex::new("Fiction").unwrap();
        let found: Vec<&Field> = record.find(&pattern).collect();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_zero_length_control_field_is_valid() {
        let mut record = Record::new(sample_leader());
        record.add_field(Field::control("007", ""));
        assert_eq!(record.get_field("007").map(Field::tag), Some("007"));
    }

    #[test]
    fn test_zero_subfield_data_field_is_valid() {
        let mut record = Record::new(sample_leader());
        record.add_field(Field::data("590", ' ', ' ', std::iter::empty()));
        assert!(record.get_field("590").is_some());
    }

    #[test]
    fn test_display_matches_canonical_form() {
        let mut record = Record::new(sample_leader());
        record.add_field(Field::control("001", "1"));
        let rendered = record.to_string();
        assert!(rendered.starts_with("LEADER "));
        assert!(rendered.contains("001 1"));
    }
}
