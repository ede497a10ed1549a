// src/readers/hooks.rs

//! Implements [`ReaderHooks`], caller callbacks invoked synchronously by an
//! [`EventLogReader`] at fixed points of reading.
//!
//! ```text
//! before_read_file ─┬─ before_read_event ── after_read_event ─┬─ after_read_file
//!                   └───────────────── on_error ──────────────┘
//! ```
//!
//! [`EventLogReader`]: crate::readers::eventlogreader::EventLogReader

use std::borrow::Cow;
use std::fmt;

use ::bstr::ByteSlice;

use crate::common::{
    EventNumber,
    FPath,
};
use crate::data::event::EventRow;
use crate::error::Error;

/// A data file is about to be opened.
#[derive(Debug)]
pub struct BeforeReadFile<'a> {
    pub path: &'a FPath,
}

/// A data file was read to its end and the reader moves to the next file.
#[derive(Debug)]
pub struct AfterReadFile<'a> {
    pub path: &'a FPath,
}

/// A record was found and is about to be decoded.
#[derive(Debug)]
pub struct BeforeReadEvent<'a> {
    /// The raw bytes of the record.
    pub source_data: &'a [u8],
    /// The number the record gets if it decodes.
    pub event_number: EventNumber,
}

impl BeforeReadEvent<'_> {
    pub fn source_text(&self) -> Cow<'_, str> {
        self.source_data.to_str_lossy()
    }
}

/// A record was decoded.
#[derive(Debug)]
pub struct AfterReadEvent<'a> {
    pub row: &'a EventRow,
    pub event_number: EventNumber,
}

/// Reading failed.
#[derive(Debug)]
pub struct OnError<'a> {
    pub error: &'a Error,
    /// The raw bytes of the record, when the record could be framed.
    pub source_data: Option<&'a [u8]>,
}

/// What the reader does after a [`MalformedRecord`].
///
/// I/O faults are always returned to the caller regardless.
///
/// [`MalformedRecord`]: crate::error::Error::MalformedRecord
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ErrorAction {
    /// Skip to the next record boundary and keep reading.
    #[default]
    Skip,
    /// Return the error from the read call.
    Abort,
}

pub type BeforeReadFileFn = Box<dyn FnMut(&BeforeReadFile<'_>)>;
pub type AfterReadFileFn = Box<dyn FnMut(&AfterReadFile<'_>)>;
pub type BeforeReadEventFn = Box<dyn FnMut(&BeforeReadEvent<'_>)>;
pub type AfterReadEventFn = Box<dyn FnMut(&AfterReadEvent<'_>)>;
pub type OnErrorFn = Box<dyn FnMut(&OnError<'_>) -> ErrorAction>;

/// The callbacks of one reader. Every callback is optional.
///
/// ```ignore
/// let hooks = ReaderHooks::default()
///     .on_after_read_event(|args| println!("{} {}", args.event_number, args.row.comment))
///     .on_error(|_args| ErrorAction::Abort);
/// ```
#[derive(Default)]
pub struct ReaderHooks {
    before_read_file: Option<BeforeReadFileFn>,
    after_read_file: Option<AfterReadFileFn>,
    before_read_event: Option<BeforeReadEventFn>,
    after_read_event: Option<AfterReadEventFn>,
    on_error: Option<OnErrorFn>,
}

impl fmt::Debug for ReaderHooks {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("ReaderHooks")
            .field("before_read_file", &self.before_read_file.is_some())
            .field("after_read_file", &self.after_read_file.is_some())
            .field("before_read_event", &self.before_read_event.is_some())
            .field("after_read_event", &self.after_read_event.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl ReaderHooks {
    pub fn on_before_read_file(
        mut self,
        f: impl FnMut(&BeforeReadFile<'_>) + 'static,
    ) -> Self {
        self.before_read_file = Some(Box::new(f));
        self
    }

    pub fn on_after_read_file(
        mut self,
        f: impl FnMut(&AfterReadFile<'_>) + 'static,
    ) -> Self {
        self.after_read_file = Some(Box::new(f));
        self
    }

    pub fn on_before_read_event(
        mut self,
        f: impl FnMut(&BeforeReadEvent<'_>) + 'static,
    ) -> Self {
        self.before_read_event = Some(Box::new(f));
        self
    }

    pub fn on_after_read_event(
        mut self,
        f: impl FnMut(&AfterReadEvent<'_>) + 'static,
    ) -> Self {
        self.after_read_event = Some(Box::new(f));
        self
    }

    pub fn on_error(
        mut self,
        f: impl FnMut(&OnError<'_>) -> ErrorAction + 'static,
    ) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub(crate) fn before_read_file(
        &mut self,
        path: &FPath,
    ) {
        if let Some(f) = self.before_read_file.as_mut() {
            f(&BeforeReadFile { path });
        }
    }

    pub(crate) fn after_read_file(
        &mut self,
        path: &FPath,
    ) {
        if let Some(f) = self.after_read_file.as_mut() {
            f(&AfterReadFile { path });
        }
    }

    pub(crate) fn before_read_event(
        &mut self,
        source_data: &[u8],
        event_number: EventNumber,
    ) {
        if let Some(f) = self.before_read_event.as_mut() {
            f(&BeforeReadEvent {
                source_data,
                event_number,
            });
        }
    }

    pub(crate) fn after_read_event(
        &mut self,
        row: &EventRow,
        event_number: EventNumber,
    ) {
        if let Some(f) = self.after_read_event.as_mut() {
            f(&AfterReadEvent { row, event_number });
        }
    }

    /// Ask the caller what to do about `error`; [`ErrorAction::Skip`] if no
    /// callback is set.
    pub(crate) fn on_error_action(
        &mut self,
        error: &Error,
        source_data: Option<&[u8]>,
    ) -> ErrorAction {
        match self.on_error.as_mut() {
            Some(f) => f(&OnError { error, source_data }),
            None => ErrorAction::default(),
        }
    }
}
