// src/readers/tokenizer.rs

//! The token scanner: lexes the bytes of one record into [`RawField`]s.
//!
//! ## Grammar
//!
//! A record is an outer brace pair `{ ... }` of comma-separated fields.
//! A field is one of:
//!
//! * empty, e.g. `{1,,3}` → [`RawField::Nil`]
//! * a double-quoted run, `""` escapes a quote → [`RawField::Text`]
//! * a bare numeric literal, `-12`, `3.50` → [`RawField::Number`]
//! * a bare 14-digit `YYYYMMDDhhmmss` → [`RawField::Timestamp`]
//! * any other bare run, e.g. a GUID or `I` → [`RawField::Text`]
//! * a nested `{ ... }` → [`RawField::Nested`], left unexpanded
//!
//! Whitespace between tokens is ignored. Between records, whitespace,
//! commas and a UTF-8 BOM are ignored.
//!
//! Scanning is a single forward pass with one byte of lookahead. Commas
//! inside a nested field belong to the nested field; a nested field is
//! only bracket-matched (quote aware) until a caller asks for its
//! [`fields`].
//!
//! The scanner knows nothing about files, dictionaries, or what a field
//! means.
//!
//! [`fields`]: crate::data::field::NestedSpan::fields

use std::ops::Range;
use std::sync::Arc;

use ::bstr::ByteSlice;
use ::memchr::{
    memchr,
    memchr3,
    memmem,
};
#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

use crate::common::{
    ResultS3,
    BOM_UTF8,
};
use crate::data::datetime::{
    timestamp_from_bytes,
    TIMESTAMP_LEN,
};
use crate::data::field::{
    Decimal,
    NestedSpan,
    RawField,
};
use crate::error::MalformedReason;

/// Typical count of top-level fields; avoids regrowing the `Vec` for
/// event records.
const FIELDS_CAPACITY: usize = 20;

/// One complete record found by [`scan_record`].
#[derive(Clone, Debug, PartialEq)]
pub struct ScannedRecord {
    /// The bytes of the record, outer braces included. Shared by every
    /// [`NestedSpan`] of the record.
    pub source: Arc<[u8]>,
    /// The top-level fields in order.
    pub fields: Vec<RawField>,
    /// Index of the opening brace within the scanned buffer.
    pub start: usize,
    /// Index immediately past the closing brace within the scanned buffer.
    pub end: usize,
}

/// Failure of [`scan_record`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanError {
    /// Index within the scanned buffer where the bad record begins.
    pub start: usize,
    pub reason: MalformedReason,
}

/// A typed [`ResultS3`] for [`scan_record`].
///
/// * `Found` a complete record.
/// * `Done` when the buffer holds only record separators.
/// * `Err` for a grammar violation, or for running out of bytes mid-record
///   (see [`MalformedReason::is_incomplete`]).
pub type ResultScan = ResultS3<ScannedRecord, ScanError>;

/// Intermediate token; a nested field is a range until the record's shared
/// buffer exists.
enum Token {
    Field(RawField),
    Nested(Range<usize>),
}

#[inline(always)]
const fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}

#[inline(always)]
fn skip_whitespace(
    buf: &[u8],
    mut at: usize,
) -> usize {
    while at < buf.len() && is_whitespace(buf[at]) {
        at += 1;
    }

    at
}

/// Return the index of the first byte at or after `at` that is not a record
/// separator (whitespace, `,`, or a UTF-8 BOM).
pub fn skip_separators(
    buf: &[u8],
    mut at: usize,
) -> usize {
    while at < buf.len() {
        match buf[at] {
            b',' => at += 1,
            b if is_whitespace(b) => at += 1,
            0xEF if buf[at..].starts_with(&BOM_UTF8) => at += BOM_UTF8.len(),
            _ => break,
        }
    }

    at
}

/// Bytes that begin a record at the start of a line.
pub const RECORD_LINE_START: &[u8] = b"\n{";

/// Does a record ending at `end` end where the producer ends records: followed
/// by `,` and the next `{`, or by a line break and nothing more?
pub fn ends_at_record_boundary(
    buf: &[u8],
    end: usize,
) -> bool {
    let at: usize = skip_whitespace(buf, end);
    match buf.get(at) {
        Some(b',') => matches!(buf.get(skip_whitespace(buf, at + 1)), Some(b'{') | None),
        Some(_) => false,
        None => memchr(b'\n', &buf[end..]).is_some(),
    }
}

/// Find the start of a complete record that begins a line after `from`.
///
/// A span that runs to the end of the bytes yet holds such a record was not
/// cut short by the producer; one of its braces or quotes is never closed.
pub fn find_later_record(
    buf: &[u8],
    from: usize,
) -> Option<usize> {
    let mut at: usize = from;
    while let Some(n) = buf
        .get(at..)
        .and_then(|rest| memmem::find(rest, RECORD_LINE_START))
    {
        let start: usize = at + n + 1;
        if let ResultScan::Found(record) = scan_record(&buf[start..]) {
            if ends_at_record_boundary(buf, start + record.end) {
                defñ!("record at {}", start);
                return Some(start);
            }
        }
        at = start;
    }

    None
}

/// Return the index immediately past the closing quote of the quoted run
/// opening at `at`, and whether the run holds an escaped `""`.
fn skip_quoted(
    buf: &[u8],
    at: usize,
) -> Result<(usize, bool), MalformedReason> {
    debug_assert_eq!(buf.get(at), Some(&b'"'));
    let mut escaped = false;
    let mut i = at + 1;
    loop {
        let quote = match memchr(b'"', &buf[i..]) {
            Some(n) => i + n,
            None => return Err(MalformedReason::UnterminatedString),
        };
        match buf.get(quote + 1) {
            Some(b'"') => {
                escaped = true;
                i = quote + 2;
            }
            // cannot tell `"` from the first half of `""` yet
            None => return Err(MalformedReason::UnterminatedString),
            Some(_) => return Ok((quote + 1, escaped)),
        }
    }
}

/// Scan the quoted run opening at `at`, return the unescaped text and the
/// index past the closing quote.
fn scan_quoted(
    buf: &[u8],
    at: usize,
) -> Result<(String, usize), MalformedReason> {
    let (end, escaped) = skip_quoted(buf, at)?;
    let raw: &[u8] = &buf[at + 1..end - 1];
    let text: String = match escaped {
        true => raw.replace(b"\"\"", b"\"").to_str_lossy().into_owned(),
        false => raw.to_str_lossy().into_owned(),
    };

    Ok((text, end))
}

/// Bracket-match the nested field opening at `at`, return the index past its
/// closing brace. Quoted runs are skipped so braces inside text do not count.
fn scan_nested(
    buf: &[u8],
    at: usize,
) -> Result<usize, MalformedReason> {
    debug_assert_eq!(buf.get(at), Some(&b'{'));
    let mut depth: usize = 0;
    let mut i = at;
    while let Some(n) = memchr3(b'{', b'}', b'"', &buf[i..]) {
        i += n;
        match buf[i] {
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {
                (i, _) = skip_quoted(buf, i)?;
            }
        }
    }

    Err(MalformedReason::UnexpectedEof)
}

/// Return the index past the bare token starting at `at`.
fn scan_bare(
    buf: &[u8],
    mut at: usize,
) -> usize {
    while at < buf.len() {
        match buf[at] {
            b',' | b'}' | b'{' | b'"' => break,
            b if is_whitespace(b) => break,
            _ => at += 1,
        }
    }

    at
}

/// Classify a bare token.
fn bare_to_field(bytes: &[u8]) -> RawField {
    if bytes.len() == TIMESTAMP_LEN {
        if let Some(dt) = timestamp_from_bytes(bytes) {
            return RawField::Timestamp(dt);
        }
    }
    let text = bytes.to_str_lossy();
    match Decimal::from_literal(&text) {
        Some(decimal) => RawField::Number(decimal),
        None => RawField::Text(text.into_owned()),
    }
}

/// Scan the fields of the record whose opening brace is at `open`.
///
/// Returns the tokens and the index past the closing brace. Nested token
/// ranges are indexes into `buf`.
fn scan_fields(
    buf: &[u8],
    open: usize,
) -> Result<(Vec<Token>, usize), MalformedReason> {
    debug_assert_eq!(buf.get(open), Some(&b'{'));
    let mut tokens: Vec<Token> = Vec::with_capacity(FIELDS_CAPACITY);
    let mut at: usize = open + 1;
    // no field seen yet; `{}` has zero fields but `{,}` has two
    let mut first = true;
    loop {
        at = skip_whitespace(buf, at);
        let byte: u8 = match buf.get(at) {
            Some(byte) => *byte,
            None => return Err(MalformedReason::UnexpectedEof),
        };
        match byte {
            b',' => {
                tokens.push(Token::Field(RawField::Nil));
                first = false;
                at += 1;
                continue;
            }
            b'}' => {
                if !first {
                    tokens.push(Token::Field(RawField::Nil));
                }
                return Ok((tokens, at + 1));
            }
            b'"' => {
                let (text, end) = scan_quoted(buf, at)?;
                tokens.push(Token::Field(RawField::Text(text)));
                at = end;
            }
            b'{' => {
                let end = scan_nested(buf, at)?;
                tokens.push(Token::Nested(at..end));
                at = end;
            }
            _ => {
                let end = scan_bare(buf, at);
                tokens.push(Token::Field(bare_to_field(&buf[at..end])));
                at = end;
            }
        }
        first = false;
        // after a field comes `,` or `}`
        at = skip_whitespace(buf, at);
        match buf.get(at) {
            Some(b',') => at += 1,
            Some(b'}') => return Ok((tokens, at + 1)),
            Some(byte) => {
                return Err(MalformedReason::UnexpectedByte {
                    byte: *byte,
                    index: at - open,
                });
            }
            None => return Err(MalformedReason::UnexpectedEof),
        }
    }
}

/// Turn tokens into fields; nested ranges are rebased by `base` onto
/// `source`.
fn tokens_to_fields(
    tokens: Vec<Token>,
    source: &Arc<[u8]>,
    base: usize,
) -> Vec<RawField> {
    tokens
        .into_iter()
        .map(|token| match token {
            Token::Field(field) => field,
            Token::Nested(range) => {
                RawField::Nested(NestedSpan::new(source.clone(), range.start - base..range.end - base))
            }
        })
        .collect()
}

/// Scan the first record in `buf`.
///
/// Leading record separators are skipped. On success, [`ScannedRecord::end`]
/// is the offset immediately past the record's closing brace, where the
/// next scan should begin.
///
/// Pure function of `buf`; scanning the same bytes twice gives the same
/// result.
pub fn scan_record(buf: &[u8]) -> ResultScan {
    let start: usize = skip_separators(buf, 0);
    match buf.get(start) {
        None => {
            defñ!("Done; {} separator bytes", start);
            return ResultScan::Done;
        }
        Some(b'{') => {}
        Some(b'}') => {
            return ResultScan::Err(ScanError {
                start,
                reason: MalformedReason::UnbalancedBraces,
            });
        }
        Some(byte) => {
            return ResultScan::Err(ScanError {
                start,
                reason: MalformedReason::UnexpectedByte {
                    byte: *byte,
                    index: 0,
                },
            });
        }
    }
    match scan_fields(buf, start) {
        Ok((tokens, end)) => {
            let source: Arc<[u8]> = Arc::from(&buf[start..end]);
            let fields: Vec<RawField> = tokens_to_fields(tokens, &source, start);
            defñ!("Found record [{}‥{}) {} fields", start, end, fields.len());

            ResultScan::Found(ScannedRecord {
                source,
                fields,
                start,
                end,
            })
        }
        Err(reason) => {
            defñ!("Err at {}: {}", start, reason);

            ResultScan::Err(ScanError { start, reason })
        }
    }
}

/// Tokenize a span that holds exactly one complete record, optionally
/// surrounded by separators.
pub fn tokenize(span: &[u8]) -> Result<Vec<RawField>, MalformedReason> {
    match scan_record(span) {
        ResultScan::Found(record) => {
            let rest: usize = skip_separators(span, record.end);
            match span.get(rest) {
                None => Ok(record.fields),
                Some(b'}') => Err(MalformedReason::UnbalancedBraces),
                Some(byte) => Err(MalformedReason::UnexpectedByte {
                    byte: *byte,
                    index: rest - record.start,
                }),
            }
        }
        ResultScan::Done => Err(MalformedReason::UnexpectedEof),
        ResultScan::Err(err) => Err(err.reason),
    }
}

/// Expand the nested field at `range` of `source`.
///
/// Fields nested further are returned as spans of the same `source`.
pub(crate) fn tokenize_nested(
    source: &Arc<[u8]>,
    range: Range<usize>,
) -> Result<Vec<RawField>, MalformedReason> {
    // limit the scan to the nested span so it cannot run into its siblings
    let buf: &[u8] = &source[..range.end];
    let (tokens, end) = scan_fields(buf, range.start)?;
    debug_assert_eq!(end, range.end, "nested span was bracket-matched to {}", range.end);

    Ok(tokens_to_fields(tokens, source, 0))
}
