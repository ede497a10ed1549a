// src/data/event.rs

//! Implements [`EventRow`], one decoded event record, and the small closed
//! code tables [`Severity`] and [`TransactionStatus`].

use std::fmt;

use crate::common::Code;
use crate::data::datetime::{
    DateTimeL,
    DateTimeLOpt,
};
use crate::data::field::RawField;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// code tables
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Importance of an event.
///
/// Unrecognized codes map to `Unknown`; mapping never fails.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum Severity {
    #[default]
    Unknown = 0,
    Information = 1,
    Warning = 2,
    Error = 3,
    Note = 4,
}

impl Severity {
    /// Map the single-character code `I`, `W`, `E`, `N`.
    pub const fn from_char(c: char) -> Severity {
        match c {
            'I' => Severity::Information,
            'W' => Severity::Warning,
            'E' => Severity::Error,
            'N' => Severity::Note,
            _ => Severity::Unknown,
        }
    }

    /// Map a code as written in a record, ignoring surrounding whitespace;
    /// anything but exactly one known character is `Unknown`.
    pub fn from_code(code: &str) -> Severity {
        let mut chars = code.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Severity::from_char(c),
            _ => Severity::Unknown,
        }
    }

    /// Map the underlying numeric value.
    pub const fn from_i64(value: i64) -> Severity {
        match value {
            1 => Severity::Information,
            2 => Severity::Warning,
            3 => Severity::Error,
            4 => Severity::Note,
            _ => Severity::Unknown,
        }
    }

    /// The single-character code; `None` for `Unknown`.
    pub const fn as_char(&self) -> Option<char> {
        match self {
            Severity::Information => Some('I'),
            Severity::Warning => Some('W'),
            Severity::Error => Some('E'),
            Severity::Note => Some('N'),
            Severity::Unknown => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Outcome of the transaction an event belongs to.
///
/// Unrecognized codes map to `Unknown`; mapping never fails.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum TransactionStatus {
    #[default]
    Unknown = 0,
    Unfinished = 1,
    NotApplicable = 2,
    Committed = 3,
    RolledBack = 4,
}

impl TransactionStatus {
    /// Map the single-character code `R`, `N`, `U`, `C`.
    pub const fn from_char(c: char) -> TransactionStatus {
        match c {
            'R' => TransactionStatus::Unfinished,
            'N' => TransactionStatus::NotApplicable,
            'U' => TransactionStatus::Committed,
            'C' => TransactionStatus::RolledBack,
            _ => TransactionStatus::Unknown,
        }
    }

    pub fn from_code(code: &str) -> TransactionStatus {
        let mut chars = code.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => TransactionStatus::from_char(c),
            _ => TransactionStatus::Unknown,
        }
    }

    pub const fn from_i64(value: i64) -> TransactionStatus {
        match value {
            1 => TransactionStatus::Unfinished,
            2 => TransactionStatus::NotApplicable,
            3 => TransactionStatus::Committed,
            4 => TransactionStatus::RolledBack,
            _ => TransactionStatus::Unknown,
        }
    }

    pub const fn as_char(&self) -> Option<char> {
        match self {
            TransactionStatus::Unfinished => Some('R'),
            TransactionStatus::NotApplicable => Some('N'),
            TransactionStatus::Committed => Some('U'),
            TransactionStatus::RolledBack => Some('C'),
            TransactionStatus::Unknown => None,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EventRow
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Count of positional fields of an [`EventRow`].
pub const EVENT_ROW_FIELDS: usize = 17;

/// One decoded event record, dictionary codes not yet resolved.
///
/// Field meaning is determined by position within the record, see
/// [`RecordDecoder`]. An empty code field decodes as code `0`.
///
/// [`RecordDecoder`]: crate::readers::recorddecoder::RecordDecoder
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EventRow {
    pub timestamp: DateTimeL,
    pub transaction_status_code: String,
    pub transaction_date: DateTimeLOpt,
    pub transaction_id: i64,
    pub user_code: Code,
    pub computer_code: Code,
    pub application_code: Code,
    pub event_code: Code,
    pub severity_code: String,
    pub comment: String,
    pub metadata_code: Code,
    pub data_presentation: String,
    pub data: RawField,
    pub work_server_code: Code,
    pub primary_port_code: Code,
    pub secondary_port_code: Code,
    pub session: i64,
    /// Trailing fields of newer record versions, beyond the positional
    /// fields above.
    pub extra: Vec<RawField>,
}

impl EventRow {
    pub fn severity(&self) -> Severity {
        Severity::from_code(&self.severity_code)
    }

    pub fn transaction_status(&self) -> TransactionStatus {
        TransactionStatus::from_code(&self.transaction_status_code)
    }
}

/// An [`EventRow`] with every dictionary code joined to the display name of
/// its entry. A code with no entry has name `None`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedEvent {
    pub row: EventRow,
    pub severity: Severity,
    pub transaction_status: TransactionStatus,
    pub user: Option<String>,
    pub computer: Option<String>,
    pub application: Option<String>,
    pub event: Option<String>,
    pub metadata: Option<String>,
    pub work_server: Option<String>,
    pub primary_port: Option<String>,
    pub secondary_port: Option<String>,
}

impl fmt::Display for ResolvedEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let unknown = |name: &Option<String>, code: Code| -> String {
            match name {
                Some(name) => name.clone(),
                None => format!("#{}", code),
            }
        };
        write!(
            f,
            "{} {} [{}] {} {} {}: {}",
            self.row.timestamp,
            self.severity,
            unknown(&self.event, self.row.event_code),
            unknown(&self.user, self.row.user_code),
            unknown(&self.computer, self.row.computer_code),
            unknown(&self.application, self.row.application_code),
            self.row.comment,
        )
    }
}
