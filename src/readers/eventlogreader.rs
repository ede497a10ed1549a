// src/readers/eventlogreader.rs

//! Implements an [`EventLogReader`], the driver of reading an event log:
//! the records of every data file, in order, as [`EventRow`]s, with
//! dictionary codes resolved through a [`ReferenceStore`].
//!
//! An `EventLogReader` drives a [`RecordReader`] for the current data file,
//! a [`RecordDecoder`], a [`FileSet`] for rotation and a [`CursorManager`]
//! for positions.
//!
//! Reading is resumable: [`get_position`] returns a [`CursorState`] that a
//! new reader takes with [`set_position`] to continue with exactly the same
//! records.
//!
//! [`get_position`]: EventLogReader::get_position
//! [`set_position`]: EventLogReader::set_position

use std::fmt;
use std::num::ParseIntError;
use std::path::Path;

#[allow(unused_imports)]
use ::si_trace_print::{
    def1n,
    def1o,
    def1x,
    def1ñ,
    defn,
    defo,
    defx,
    defñ,
};

use crate::common::{
    Code,
    Count,
    EventNumber,
    FPath,
    ResultS3,
    REFERENCE_FILE_EXTENSION,
    REFERENCE_FILE_NAME,
    DATA_FILE_EXTENSION,
};
#[allow(unused_imports)]
use crate::debug::printers::{
    de_err,
    de_wrn,
};
use crate::data::event::{
    EventRow,
    ResolvedEvent,
};
use crate::data::position::{
    CursorState,
    FingerprintCheck,
};
use crate::data::reference::{
    DictionaryEntry,
    DictionaryKind,
    ReferenceLayout,
};
use crate::error::{
    Error,
    Result,
};
use crate::readers::blockreader::{
    BlockSz,
    BLOCKSZ_DEF,
};
use crate::readers::cursor::{
    CursorManager,
    SeekPlan,
    VISITED_INDEX_STRIDE_DEF,
};
use crate::readers::fileset::FileSet;
use crate::readers::hooks::{
    ErrorAction,
    ReaderHooks,
};
use crate::readers::recorddecoder::{
    RecordDecoder,
    RecordLayout,
};
use crate::readers::recordreader::{
    RecordAt,
    RecordReader,
};
use crate::readers::referencestore::ReferenceStore;
use crate::readers::tokenizer::ScannedRecord;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Settings of an [`EventLogReader`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReaderConfig {
    /// Bytes read from a file at a time.
    pub blocksz: BlockSz,
    /// Accepted field count of event records.
    pub record_layout: RecordLayout,
    /// Field layouts of reference records.
    pub reference_layout: ReferenceLayout,
    /// Every how many records a position is kept for seeking backward.
    pub visited_index_stride: EventNumber,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            blocksz: BLOCKSZ_DEF,
            record_layout: RecordLayout::default(),
            reference_layout: ReferenceLayout::default(),
            visited_index_stride: VISITED_INDEX_STRIDE_DEF,
        }
    }
}

/// What an event log path names, decided once at open.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LogSource {
    /// A log directory, or its reference file: the reference file and every
    /// data file of the directory, rotated.
    Reference {
        directory: FPath,
        reference_path: FPath,
    },
    /// One data file, with the reference file beside it; no rotation.
    Data {
        data_path: FPath,
        reference_path: FPath,
    },
}

/// The directory of `path`; `.` for a bare file name.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn path_to_fpath(path: &Path) -> FPath {
    path.to_string_lossy().into_owned()
}

impl LogSource {
    /// Decide what `path` names.
    ///
    /// * a directory, or a `*.lgf` file: [`LogSource::Reference`]
    /// * a `*.lgp` file: [`LogSource::Data`]
    /// * anything else: [`Error::UnsupportedPath`]
    pub fn detect(path: &FPath) -> Result<LogSource> {
        def1n!("({:?})", path);
        let std_path = Path::new(path);
        if std_path.is_dir() {
            let source = LogSource::Reference {
                directory: path.clone(),
                reference_path: path_to_fpath(&std_path.join(REFERENCE_FILE_NAME)),
            };
            def1x!("return {:?}", source);
            return Ok(source);
        }
        let extension: Option<&str> = std_path
            .extension()
            .and_then(|ext| ext.to_str());
        let source = match extension {
            Some(ext) if ext.eq_ignore_ascii_case(REFERENCE_FILE_EXTENSION) => LogSource::Reference {
                directory: path_to_fpath(parent_dir(std_path)),
                reference_path: path.clone(),
            },
            Some(ext) if ext.eq_ignore_ascii_case(DATA_FILE_EXTENSION) => LogSource::Data {
                data_path: path.clone(),
                reference_path: path_to_fpath(&parent_dir(std_path).join(REFERENCE_FILE_NAME)),
            },
            _ => {
                def1x!("return UnsupportedPath");
                return Err(Error::UnsupportedPath(path.clone()));
            }
        };
        def1x!("return {:?}", source);

        Ok(source)
    }

    pub const fn reference_path(&self) -> &FPath {
        match self {
            LogSource::Reference { reference_path, .. } => reference_path,
            LogSource::Data { reference_path, .. } => reference_path,
        }
    }

    pub fn file_set(&self) -> FileSet {
        match self {
            LogSource::Reference { directory, .. } => FileSet::Directory {
                dir: directory.clone(),
            },
            LogSource::Data { data_path, .. } => FileSet::Single {
                path: data_path.clone(),
            },
        }
    }
}

/// A dictionary code given as an integer, or as text that is exactly an
/// integer.
pub trait ToCode {
    fn to_code(&self) -> Result<Code>;
}

impl ToCode for Code {
    fn to_code(&self) -> Result<Code> {
        Ok(*self)
    }
}

impl ToCode for i32 {
    fn to_code(&self) -> Result<Code> {
        Ok(Code::from(*self))
    }
}

impl ToCode for u32 {
    fn to_code(&self) -> Result<Code> {
        Ok(Code::from(*self))
    }
}

impl ToCode for str {
    fn to_code(&self) -> Result<Code> {
        self.parse::<Code>()
            .map_err(|source: ParseIntError| Error::InvalidCode {
                text: String::from(self),
                source,
            })
    }
}

impl ToCode for &str {
    fn to_code(&self) -> Result<Code> {
        (**self).to_code()
    }
}

impl ToCode for String {
    fn to_code(&self) -> Result<Code> {
        self.as_str().to_code()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EventLogReader
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Counters of an [`EventLogReader`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SummaryEventLogReader {
    /// Records returned by `read_next` and `seek`.
    pub events_read: Count,
    /// Malformed records skipped.
    pub malformed_skipped: Count,
    /// Data files opened.
    pub files_opened: Count,
    /// Full loads of the reference file.
    pub reference_reloads: Count,
    /// Incremental loads of the reference file.
    pub reference_refreshes: Count,
    /// Reference records skipped; unknown tags or malformed.
    pub reference_skipped: Count,
    /// Dictionary entries currently loaded.
    pub dictionary_entries: Count,
    /// Bytes read from the current data file.
    pub bytes_read: Count,
    /// Resynchronizations after a grammar error in the current data file.
    pub resyncs: Count,
}

impl fmt::Display for SummaryEventLogReader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "events read         : {}", self.events_read)?;
        writeln!(f, "malformed skipped   : {}", self.malformed_skipped)?;
        writeln!(f, "files opened        : {}", self.files_opened)?;
        writeln!(f, "reference reloads   : {}", self.reference_reloads)?;
        writeln!(f, "reference refreshes : {}", self.reference_refreshes)?;
        writeln!(f, "reference skipped   : {}", self.reference_skipped)?;
        writeln!(f, "dictionary entries  : {}", self.dictionary_entries)?;
        writeln!(f, "bytes read          : {}", self.bytes_read)?;
        write!(f, "resyncs             : {}", self.resyncs)
    }
}

/// Reads the events of one event log.
///
/// All operations are synchronous and need `&mut self`; one reader is not
/// shared between threads. Independent readers of the same log do not share
/// state.
///
/// _XXX: not a rust "Reader"; does not implement trait [`Read`]._
///
/// [`Read`]: std::io::Read
pub struct EventLogReader {
    source: LogSource,
    config: ReaderConfig,
    hooks: ReaderHooks,
    files: FileSet,
    references: ReferenceStore,
    decoder: RecordDecoder,
    cursor: CursorManager,
    /// The open data file; `None` until the next read opens it.
    recordreader: Option<RecordReader>,
    /// The row most recently returned.
    current_row: Option<EventRow>,
    events_read: Count,
    malformed_skipped: Count,
    files_opened: Count,
}

impl fmt::Debug for EventLogReader {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("EventLogReader")
            .field("source", &self.source)
            .field("cursor", &self.cursor.current())
            .field("recordreader", &self.recordreader)
            .field("references", &self.references)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// What the internal read loop found.
enum Step {
    Row(EventRow),
    End,
}

impl EventLogReader {
    /// Open the event log at `path` with the default [`ReaderConfig`] and no
    /// hooks. See [`LogSource::detect`].
    pub fn open(path: &FPath) -> Result<EventLogReader> {
        EventLogReader::with_config(LogSource::detect(path)?, ReaderConfig::default(), ReaderHooks::default())
    }

    /// Create a reader of `source` and load its reference file.
    ///
    /// No data file is opened until the first read.
    pub fn with_config(
        source: LogSource,
        config: ReaderConfig,
        hooks: ReaderHooks,
    ) -> Result<EventLogReader> {
        def1n!("({:?}, {:?})", source, config);
        let references = ReferenceStore::new(source.reference_path().clone(), config.reference_layout, config.blocksz);
        let mut reader = EventLogReader {
            files: source.file_set(),
            source,
            config,
            hooks,
            references,
            decoder: RecordDecoder::new(config.record_layout),
            cursor: CursorManager::new(config.visited_index_stride),
            recordreader: None,
            current_row: None,
            events_read: 0,
            malformed_skipped: 0,
            files_opened: 0,
        };
        if let Err(err) = reader.references.load_or_refresh() {
            def1x!("return Err {}", err);
            return Err(err);
        }
        def1x!();

        Ok(reader)
    }

    pub const fn source(&self) -> &LogSource {
        &self.source
    }

    pub const fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub const fn references(&self) -> &ReferenceStore {
        &self.references
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // reading
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Open the data file at the cursor, or the first data file.
    ///
    /// `Ok(false)` if there is no data file.
    fn ensure_open(
        &mut self,
        notify: bool,
    ) -> Result<bool> {
        if self.recordreader.is_some() {
            return Ok(true);
        }
        let path: FPath = match self.cursor.file_path() {
            Some(path) => path.clone(),
            None => match self.files.advance_to_next_file(None)? {
                Some(path) => {
                    self.cursor.set_file(path.clone(), 0);
                    path
                }
                None => {
                    defñ!("no data files");
                    return Ok(false);
                }
            },
        };
        if notify {
            self.hooks.before_read_file(&path);
        }
        let recordreader = RecordReader::new(path, self.cursor.byte_offset(), self.config.blocksz)?;
        self.files_opened += 1;
        self.recordreader = Some(recordreader);

        Ok(true)
    }

    /// Move to the data file after the current one.
    ///
    /// `Ok(false)` if there is none yet; the current file stays open.
    fn rotate(
        &mut self,
        notify: bool,
    ) -> Result<bool> {
        let current: Option<FPath> = self.cursor.file_path().cloned();
        let next: FPath = match self.files.advance_to_next_file(current.as_ref())? {
            Some(next) => next,
            None => return Ok(false),
        };
        defñ!("{:?} → {:?}", current, next);
        if notify {
            if let Some(current) = current.as_ref() {
                self.hooks.after_read_file(current);
            }
        }
        self.recordreader = None;
        self.cursor.set_file(next, 0);

        Ok(true)
    }

    fn current_file_has_successor(&self) -> Result<bool> {
        match self.cursor.file_path() {
            Some(path) => self.files.has_file_after(path),
            None => Ok(false),
        }
    }

    /// Read the next record.
    ///
    /// With `notify`, hooks are called and the `on_error` hook decides about
    /// malformed records; without, malformed records are skipped.
    ///
    /// With `within_file`, the end of the current data file is `Step::End`
    /// and there is no rotation.
    fn read_step(
        &mut self,
        notify: bool,
        within_file: bool,
    ) -> Result<Step> {
        loop {
            if !self.ensure_open(notify)? {
                return Ok(Step::End);
            }
            let result = match self.recordreader.as_mut() {
                Some(recordreader) => recordreader.next_record(),
                None => return Ok(Step::End),
            };
            match result {
                ResultS3::Found(RecordAt {
                    record: ScannedRecord { source, fields, .. },
                    offset,
                    end,
                }) => {
                    let event_number: EventNumber = self.cursor.logical_event_number() + 1;
                    if notify {
                        self.hooks.before_read_event(&source, event_number);
                    }
                    match self.decoder.decode_fields(fields) {
                        Ok(row) => {
                            self.cursor.advance(end);
                            if notify {
                                self.hooks.after_read_event(&row, event_number);
                            }
                            return Ok(Step::Row(row));
                        }
                        Err(reason) => {
                            // the record was framed; continue after it
                            self.cursor.skip_to(end);
                            let err = Error::MalformedRecord {
                                path: self.cursor.file_path().cloned().unwrap_or_default(),
                                offset,
                                reason,
                            };
                            de_wrn!("{}", err);
                            self.malformed_skipped += 1;
                            if notify && self.hooks.on_error_action(&err, Some(&source[..])) == ErrorAction::Abort {
                                return Err(err);
                            }
                        }
                    }
                }
                ResultS3::Done => {
                    if let Some(recordreader) = self.recordreader.as_ref() {
                        self.cursor.skip_to(recordreader.offset());
                    }
                    if within_file || !self.rotate(notify)? {
                        return Ok(Step::End);
                    }
                }
                ResultS3::Err(err) if err.is_truncated() => {
                    if let Some(recordreader) = self.recordreader.as_ref() {
                        self.cursor.skip_to(recordreader.offset());
                    }
                    // a newer file means the producer abandoned this record
                    if self.current_file_has_successor()? {
                        de_wrn!("{}; continue with the next file", err);
                        self.malformed_skipped += 1;
                        if notify && self.hooks.on_error_action(&err, None) == ErrorAction::Abort {
                            return Err(err);
                        }
                        if within_file {
                            return Ok(Step::End);
                        }
                        self.rotate(notify)?;
                        continue;
                    }
                    return Err(err);
                }
                ResultS3::Err(err) if err.is_malformed() => {
                    if let Some(recordreader) = self.recordreader.as_ref() {
                        self.cursor.skip_to(recordreader.offset());
                    }
                    self.malformed_skipped += 1;
                    if notify && self.hooks.on_error_action(&err, None) == ErrorAction::Abort {
                        return Err(err);
                    }
                    if let Some(recordreader) = self.recordreader.as_mut() {
                        recordreader.skip_malformed()?;
                        self.cursor.skip_to(recordreader.offset());
                    }
                }
                ResultS3::Err(err) => {
                    if notify {
                        // I/O faults are returned whatever the hook answers
                        self.hooks.on_error_action(&err, None);
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Return the next event, `Ok(None)` at the end of the last data file.
    ///
    /// `Err` with [`Error::is_truncated`] means the newest data file ends
    /// inside a record the producer is still writing; the position is left
    /// at that record and a later call returns it once complete.
    ///
    /// A malformed record is passed to the `on_error` hook. On
    /// [`ErrorAction::Skip`] reading continues after it. On
    /// [`ErrorAction::Abort`] the error is returned; the position is after
    /// a record with bad field values, or at a record with bad grammar.
    pub fn read_next(&mut self) -> Result<Option<EventRow>> {
        defn!("event {}", self.cursor.logical_event_number());
        match self.read_step(true, false)? {
            Step::Row(row) => {
                self.events_read += 1;
                self.current_row = Some(row.clone());
                defx!("return event {}", self.cursor.logical_event_number());

                Ok(Some(row))
            }
            Step::End => {
                defx!("return None");

                Ok(None)
            }
        }
    }

    /// The row most recently returned by [`read_next`], or positioned on by
    /// [`seek`].
    ///
    /// [`read_next`]: Self::read_next
    /// [`seek`]: Self::seek
    pub const fn current_row(&self) -> Option<&EventRow> {
        self.current_row.as_ref()
    }

    /// Position on event number `n`; [`current_row`] is then record `n` and
    /// [`read_next`] returns record `n + 1`.
    ///
    /// Returns `false` if there is no record `n` (yet), and leaves the
    /// position at the end of the known records. `seek(0)` returns `false`
    /// and does not move.
    ///
    /// [`current_row`]: Self::current_row
    /// [`read_next`]: Self::read_next
    pub fn seek(
        &mut self,
        n: EventNumber,
    ) -> Result<bool> {
        defn!("({}) from {}", n, self.cursor.logical_event_number());
        if n == 0 {
            defx!("return false");
            return Ok(false);
        }
        match self
            .cursor
            .plan_seek(n, self.current_row.is_some())
        {
            SeekPlan::Stay => {
                defx!("return true; already on {}", n);
                return Ok(true);
            }
            SeekPlan::Forward => {}
            SeekPlan::FromLocation {
                event_number,
                location,
            } => {
                defo!("resume from visited {} {:?}", event_number, location);
                self.recordreader = None;
                self.current_row = None;
                self.cursor.jump(event_number, location);
            }
            SeekPlan::FromStart => {
                defo!("resume from start");
                self.recordreader = None;
                self.current_row = None;
                self.cursor.reset();
            }
        }
        while self.cursor.logical_event_number() < n {
            match self.read_step(false, false) {
                Ok(Step::Row(row)) => {
                    if self.cursor.logical_event_number() == n {
                        self.events_read += 1;
                        self.current_row = Some(row);
                    }
                }
                Ok(Step::End) => {
                    defx!("return false; end at {}", self.cursor.logical_event_number());
                    self.current_row = None;
                    return Ok(false);
                }
                Err(err) if err.is_truncated() => {
                    defx!("return false; truncated at {}", self.cursor.logical_event_number());
                    self.current_row = None;
                    return Ok(false);
                }
                Err(err) => {
                    defx!("return Err {}", err);
                    return Err(err);
                }
            }
        }
        defx!("return true");

        Ok(true)
    }

    /// The current position, for [`set_position`](Self::set_position) now or
    /// in a later process.
    pub fn get_position(&self) -> CursorState {
        let mut state: CursorState = self.cursor.current();
        state.reference_fingerprint = self.references.fingerprint().copied();

        state
    }

    /// Continue reading at `state`, taken by [`get_position`] of this or
    /// another reader of the same log. Nothing is read until the next
    /// [`read_next`].
    ///
    /// If the reference file changed since `state` was taken the
    /// dictionaries are refreshed, or reloaded if it was replaced.
    ///
    /// [`get_position`]: Self::get_position
    /// [`read_next`]: Self::read_next
    pub fn set_position(
        &mut self,
        state: CursorState,
    ) -> Result<()> {
        defn!("({:?})", state);
        if state.reference_fingerprint.as_ref() != self.references.fingerprint() {
            match state.reference_fingerprint.as_ref() {
                Some(fingerprint) => match fingerprint.check_file(self.references.path()) {
                    Ok(FingerprintCheck::Replaced) => {
                        self.references.reload_stale()?;
                    }
                    Ok(_) => {
                        self.references.load_or_refresh()?;
                    }
                    Err(err) => return Err(Error::io(self.references.path(), err)),
                },
                // taken before the first load; the next lookup loads
                None => {}
            }
        }
        self.recordreader = None;
        self.current_row = None;
        self.cursor.restore(state);
        defx!();

        Ok(())
    }

    /// Back to before the first record of the first data file.
    pub fn reset(&mut self) {
        defñ!();
        self.recordreader = None;
        self.current_row = None;
        self.cursor.reset();
    }

    /// Count the records of every data file, by reading and discarding them.
    ///
    /// Malformed records are not counted. A record cut short at the end of
    /// the newest file is not counted. The position is unchanged.
    pub fn count(&mut self) -> Result<Count> {
        defn!();
        let saved: CursorState = self.cursor.current();
        let saved_row: Option<EventRow> = self.current_row.take();
        self.recordreader = None;
        self.cursor.reset();
        let mut count: Count = 0;
        let result: Result<Count> = loop {
            match self.read_step(false, false) {
                Ok(Step::Row(_)) => count += 1,
                Ok(Step::End) => break Ok(count),
                Err(err) if err.is_truncated() => break Ok(count),
                Err(err) => break Err(err),
            }
        };
        self.recordreader = None;
        self.cursor.restore(saved);
        self.current_row = saved_row;
        defx!("return {:?}", result);

        result
    }

    /// Move to the start of the next data file without returning the rest
    /// of the current one.
    ///
    /// The passed records are read quietly, without hooks, and numbered, so
    /// event numbers stay the same as for a reader that read every record
    /// and [`seek`] keeps working.
    ///
    /// Returns `false` if there is no next data file yet; the position is
    /// then unchanged.
    ///
    /// [`seek`]: Self::seek
    pub fn advance_file(&mut self) -> Result<bool> {
        defn!("({:?})", self.cursor.file_path());
        if !self.ensure_open(false)? {
            defx!("return false; no data files");
            return Ok(false);
        }
        if !self.current_file_has_successor()? {
            defx!("return false; no next data file");
            return Ok(false);
        }
        loop {
            match self.read_step(false, true) {
                Ok(Step::Row(_)) => {}
                Ok(Step::End) => break,
                // abandoned by the producer
                Err(err) if err.is_truncated() => break,
                Err(err) => {
                    defx!("return Err {}", err);
                    return Err(err);
                }
            }
        }
        let moved: bool = self.rotate(true)?;
        if moved {
            self.current_row = None;
        }
        defx!("return {} at {}", moved, self.cursor.logical_event_number());

        Ok(moved)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // dictionaries
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Bring the dictionaries up to date with the reference file. Returns
    /// the `Count` of new entries.
    pub fn refresh_references(&mut self) -> Result<Count> {
        self.references.load_or_refresh()
    }

    fn get_by_code(
        &mut self,
        kind: DictionaryKind,
        code: &(impl ToCode + ?Sized),
    ) -> Result<Option<&DictionaryEntry>> {
        let code: Code = code.to_code()?;
        self.refresh_references()?;

        Ok(self.references.resolve(kind, code))
    }

    /// The Users entry of `code`; `Ok(None)` if there is none.
    ///
    /// `code` is an integer or text that is exactly an integer; other text
    /// is [`Error::InvalidCode`].
    pub fn get_user_by_code(
        &mut self,
        code: &(impl ToCode + ?Sized),
    ) -> Result<Option<&DictionaryEntry>> {
        self.get_by_code(DictionaryKind::Users, code)
    }

    pub fn get_computer_by_code(
        &mut self,
        code: &(impl ToCode + ?Sized),
    ) -> Result<Option<&DictionaryEntry>> {
        self.get_by_code(DictionaryKind::Computers, code)
    }

    pub fn get_application_by_code(
        &mut self,
        code: &(impl ToCode + ?Sized),
    ) -> Result<Option<&DictionaryEntry>> {
        self.get_by_code(DictionaryKind::Applications, code)
    }

    pub fn get_event_by_code(
        &mut self,
        code: &(impl ToCode + ?Sized),
    ) -> Result<Option<&DictionaryEntry>> {
        self.get_by_code(DictionaryKind::Events, code)
    }

    pub fn get_metadata_by_code(
        &mut self,
        code: &(impl ToCode + ?Sized),
    ) -> Result<Option<&DictionaryEntry>> {
        self.get_by_code(DictionaryKind::Metadata, code)
    }

    pub fn get_work_server_by_code(
        &mut self,
        code: &(impl ToCode + ?Sized),
    ) -> Result<Option<&DictionaryEntry>> {
        self.get_by_code(DictionaryKind::WorkServers, code)
    }

    pub fn get_primary_port_by_code(
        &mut self,
        code: &(impl ToCode + ?Sized),
    ) -> Result<Option<&DictionaryEntry>> {
        self.get_by_code(DictionaryKind::PrimaryPorts, code)
    }

    pub fn get_secondary_port_by_code(
        &mut self,
        code: &(impl ToCode + ?Sized),
    ) -> Result<Option<&DictionaryEntry>> {
        self.get_by_code(DictionaryKind::SecondaryPorts, code)
    }

    /// Join every code of `row` to the display name of its entry.
    pub fn resolve_row(
        &mut self,
        row: &EventRow,
    ) -> Result<ResolvedEvent> {
        self.refresh_references()?;
        let references = &self.references;
        let name = |kind: DictionaryKind, code: Code| references.resolve_name(kind, code);

        Ok(ResolvedEvent {
            severity: row.severity(),
            transaction_status: row.transaction_status(),
            user: name(DictionaryKind::Users, row.user_code),
            computer: name(DictionaryKind::Computers, row.computer_code),
            application: name(DictionaryKind::Applications, row.application_code),
            event: name(DictionaryKind::Events, row.event_code),
            metadata: name(DictionaryKind::Metadata, row.metadata_code),
            work_server: name(DictionaryKind::WorkServers, row.work_server_code),
            primary_port: name(DictionaryKind::PrimaryPorts, row.primary_port_code),
            secondary_port: name(DictionaryKind::SecondaryPorts, row.secondary_port_code),
            row: row.clone(),
        })
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // lifecycle
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    pub fn summary(&self) -> SummaryEventLogReader {
        SummaryEventLogReader {
            events_read: self.events_read,
            malformed_skipped: self.malformed_skipped,
            files_opened: self.files_opened,
            reference_reloads: self.references.count_reloads,
            reference_refreshes: self.references.count_refreshes,
            reference_skipped: self.references.count_skipped,
            dictionary_entries: self.references.len() as Count,
            bytes_read: self
                .recordreader
                .as_ref()
                .map_or(0, RecordReader::count_bytes),
            resyncs: self
                .recordreader
                .as_ref()
                .map_or(0, RecordReader::count_resyncs),
        }
    }

    /// Close the open data file and drop the dictionaries and the visited
    /// index. The position is kept; a later read reopens what it needs.
    pub fn close(&mut self) {
        defñ!();
        self.recordreader = None;
        self.current_row = None;
        self.references.clear();
        self.cursor.clear_index();
    }
}

impl Drop for EventLogReader {
    fn drop(&mut self) {
        self.close();
    }
}
