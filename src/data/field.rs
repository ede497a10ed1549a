// src/data/field.rs

//! Implements [`RawField`], one token of a record as lexed by the
//! [token scanner].
//!
//! [token scanner]: crate::readers::tokenizer

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use ::bstr::ByteSlice;

use crate::data::datetime::{
    timestamp_from_str,
    DateTimeL,
    DateTimeLOpt,
};
#[cfg(any(debug_assertions, test))]
use crate::debug::printers::buffer_to_String_noraw;
use crate::error::MalformedReason;
use crate::readers::tokenizer::tokenize_nested;

/// A bare numeric literal: optional sign, digits, optional decimal point and
/// fraction digits.
///
/// The literal text is kept as written so no precision is lost; callers
/// choose the numeric type with [`as_i64`] or [`as_f64`].
///
/// [`as_i64`]: Decimal::as_i64
/// [`as_f64`]: Decimal::as_f64
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Decimal(String);

impl Decimal {
    /// Is `bytes` a numeric literal as described for [`Decimal`]?
    pub fn is_literal(bytes: &[u8]) -> bool {
        let digits = match bytes.first() {
            Some(b'+') | Some(b'-') => &bytes[1..],
            _ => bytes,
        };
        let mut seen_digit = false;
        let mut seen_point = false;
        for b in digits.iter() {
            match b {
                b'0'..=b'9' => seen_digit = true,
                b'.' if !seen_point => seen_point = true,
                _ => return false,
            }
        }

        seen_digit
    }

    /// Create a `Decimal` from `literal`; `None` if it is not a numeric
    /// literal.
    pub fn from_literal(literal: &str) -> Option<Decimal> {
        match Decimal::is_literal(literal.as_bytes()) {
            true => Some(Decimal(String::from(literal))),
            false => None,
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The literal as an integer; `None` if it has a fractional part or does
    /// not fit.
    pub fn as_i64(&self) -> Option<i64> {
        self.0.trim_start_matches('+').parse::<i64>().ok()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.0.parse::<f64>().ok()
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unexpanded nested `{ ... }` field.
///
/// Holds a shared pointer to the bytes of the enclosing record and the range
/// of this field within them, braces included. Nothing inside is tokenized
/// until [`fields`] is called, so large payloads that are never inspected
/// cost one bracket-matching pass only.
///
/// [`fields`]: NestedSpan::fields
#[derive(Clone)]
pub struct NestedSpan {
    source: Arc<[u8]>,
    range: Range<usize>,
}

impl NestedSpan {
    pub(crate) fn new(
        source: Arc<[u8]>,
        range: Range<usize>,
    ) -> NestedSpan {
        debug_assert!(range.end <= source.len(), "range {:?} beyond source len {}", range, source.len());
        NestedSpan { source, range }
    }

    /// The raw bytes of this nested field, braces included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.source[self.range.clone()]
    }

    /// Tokenize the inside of this nested field.
    ///
    /// Nested fields within are again returned unexpanded.
    pub fn fields(&self) -> Result<Vec<RawField>, MalformedReason> {
        tokenize_nested(&self.source, self.range.clone())
    }

    /// Length in bytes, braces included.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Clippy recommends `fn is_empty` since there is a `len()`.
    /// A well-formed nested field always has at least its two braces.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

impl PartialEq for NestedSpan {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for NestedSpan {}

impl fmt::Debug for NestedSpan {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        #[cfg(any(debug_assertions, test))]
        let text = buffer_to_String_noraw(self.as_bytes());
        #[cfg(not(any(debug_assertions, test)))]
        let text = self.as_bytes().to_str_lossy();
        f.debug_struct("NestedSpan")
            .field("range", &self.range)
            .field("text", &text)
            .finish()
    }
}

/// One decoded token of a record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RawField {
    /// Empty field, e.g. between two commas.
    Nil,
    /// Quoted string with `""` unescaped, or a bare non-numeric token.
    Text(String),
    /// Bare numeric literal.
    Number(Decimal),
    /// Bare 14-digit literal that is a valid date and time.
    Timestamp(DateTimeL),
    /// Nested `{ ... }`, kept unexpanded.
    Nested(NestedSpan),
}

impl RawField {
    /// Helper for tests and callers building rows by hand.
    pub fn text(s: &str) -> RawField {
        RawField::Text(String::from(s))
    }

    pub const fn is_nil(&self) -> bool {
        matches!(self, RawField::Nil)
    }

    /// The text of a `Text` field, or the literal of a `Number` field.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawField::Text(s) => Some(s.as_str()),
            RawField::Number(d) => Some(d.as_str()),
            _ => None,
        }
    }

    /// An integer from a `Number`, or from a `Text` holding exactly an
    /// integer (the producer quotes some numeric fields).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawField::Number(d) => d.as_i64(),
            RawField::Text(s) => s.parse::<i64>().ok(),
            _ => None,
        }
    }

    /// A datetime from a `Timestamp`, or from a `Text` or `Number` holding a
    /// valid 14-digit timestamp.
    pub fn as_timestamp(&self) -> DateTimeLOpt {
        match self {
            RawField::Timestamp(dt) => Some(*dt),
            RawField::Text(s) => timestamp_from_str(s),
            RawField::Number(d) => timestamp_from_str(d.as_str()),
            _ => None,
        }
    }

    pub const fn as_nested(&self) -> Option<&NestedSpan> {
        match self {
            RawField::Nested(span) => Some(span),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    pub const fn kind_str(&self) -> &'static str {
        match self {
            RawField::Nil => "Nil",
            RawField::Text(_) => "Text",
            RawField::Number(_) => "Number",
            RawField::Timestamp(_) => "Timestamp",
            RawField::Nested(_) => "Nested",
        }
    }
}

impl fmt::Display for RawField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RawField::Nil => Ok(()),
            RawField::Text(s) => f.write_str(s),
            RawField::Number(d) => write!(f, "{}", d),
            RawField::Timestamp(dt) => write!(f, "{}", dt),
            RawField::Nested(span) => write!(f, "{}", span.as_bytes().to_str_lossy()),
        }
    }
}
