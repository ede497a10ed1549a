// src/error.rs

//! The [`Error`] type for _evloglib_.
//!
//! Not every failure to find something is an `Error`:
//!
//! * a dictionary code without a matching entry resolves to `None`
//!   (an unknown reference).
//! * seeking past the last known record returns `false`.
//! * a stale reference store is reloaded transparently; only a failing
//!   reload surfaces as [`Error::StaleReferenceStore`].
//!
//! [`Error::MalformedRecord`] and [`Error::IoFault`] are kept apart so a
//! caller may retry transient I/O faults while treating structurally bad data
//! differently. A `MalformedRecord` with reason
//! [`MalformedReason::UnexpectedEof`] at the end of the newest file means
//! "no more data yet"; see [`Error::is_truncated`].

use std::io;
use std::num::ParseIntError;

use ::thiserror::Error;

use crate::common::{
    FPath,
    FileOffset,
};

/// Why a record could not be tokenized or decoded.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum MalformedReason {
    /// The bytes ended inside a record; the producer may still be writing.
    #[error("unexpected end of data inside a record")]
    UnexpectedEof,
    /// A quoted string is never closed.
    #[error("unterminated quoted string")]
    UnterminatedString,
    /// A closing brace without a matching opening brace, or an opening brace
    /// never closed before the records that follow it.
    #[error("unbalanced braces")]
    UnbalancedBraces,
    /// A quoted string never closed before the records that follow it.
    #[error("unbalanced quotes")]
    UnbalancedQuotes,
    /// A byte that cannot appear at this point of the grammar.
    #[error("unexpected byte {byte:#04x} at record index {index}")]
    UnexpectedByte { byte: u8, index: usize },
    /// Too few or too many top-level fields for the expected record shape.
    #[error("expected {min}..={max} fields, found {found}")]
    FieldCount { min: usize, max: usize, found: usize },
    /// A field is present but holds an unusable value.
    #[error("field {index} ({name}): {detail}")]
    FieldValue { index: usize, name: &'static str, detail: String },
}

impl MalformedReason {
    /// Did the bytes run out before the record ended?
    ///
    /// When scanning a growing file this is not a defect of the record; more
    /// bytes may complete it.
    pub const fn is_incomplete(&self) -> bool {
        matches!(self, MalformedReason::UnexpectedEof | MalformedReason::UnterminatedString)
    }
}

/// Errors of _evloglib_.
#[derive(Debug, Error)]
pub enum Error {
    /// Grammar violation or unexpected truncation of one record.
    #[error("malformed record in {path:?} at offset {offset}: {reason}")]
    MalformedRecord {
        path: FPath,
        offset: FileOffset,
        reason: MalformedReason,
    },
    /// The reference file was replaced and reloading it failed.
    #[error("reference file {path:?} changed and could not be reloaded: {source}")]
    StaleReferenceStore {
        path: FPath,
        #[source]
        source: io::Error,
    },
    /// File missing, permission denied, file locked by the producer, etc.
    #[error("I/O fault for {path:?}: {source}")]
    IoFault {
        path: FPath,
        #[source]
        source: io::Error,
    },
    /// A textual dictionary code that is not exactly an integer.
    #[error("invalid dictionary code {text:?}: {source}")]
    InvalidCode {
        text: String,
        #[source]
        source: ParseIntError,
    },
    /// A persisted cursor position that cannot be deserialized.
    #[error("invalid cursor state: {0}")]
    InvalidCursor(#[from] serde_json::Error),
    /// A path that names neither a log directory, a reference file, nor a
    /// data file.
    #[error("unsupported log path {0:?}")]
    UnsupportedPath(FPath),
}

/// `Result` with the _evloglib_ [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Helper to wrap an `io::Error` with the path it happened on.
    pub fn io(path: &FPath, source: io::Error) -> Error {
        Error::IoFault {
            path: path.clone(),
            source,
        }
    }

    /// Is this a [`MalformedRecord`](Error::MalformedRecord) of any reason?
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedRecord { .. })
    }

    /// Is this a record cut short by the end of the file?
    ///
    /// For the newest data file this means "no more data yet"; retrying
    /// after the producer appends more bytes will succeed.
    pub const fn is_truncated(&self) -> bool {
        match self {
            Error::MalformedRecord { reason, .. } => reason.is_incomplete(),
            _ => false,
        }
    }

    /// Is this an [`IoFault`](Error::IoFault) or a failed reload?
    pub const fn is_io(&self) -> bool {
        matches!(self, Error::IoFault { .. } | Error::StaleReferenceStore { .. })
    }
}
