// src/readers/recordreader.rs
// … ‥

//! Implements a [`RecordReader`], the driver of deriving complete records
//! from a file using a [`BlockReader`] and the [token scanner].
//!
//! [token scanner]: crate::readers::tokenizer

use crate::common::{
    Count,
    FPath,
    FileOffset,
    ResultS3,
};
use crate::error::{
    Error,
    MalformedReason,
    Result,
};
use crate::readers::blockreader::{
    BlockReader,
    BlockSz,
    ResultS3ReadBlock,
};
use crate::readers::tokenizer::{
    find_later_record,
    scan_record,
    RECORD_LINE_START,
    ResultScan,
    ScannedRecord,
};

use std::fmt;

use ::memchr::memchr;
use ::memchr::memmem;
#[allow(unused_imports)]
use ::si_trace_print::{
    def1n,
    def1o,
    def1x,
    defn,
    defo,
    defx,
    defñ,
};

/// A complete record and where it sits in the file.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordAt {
    pub record: ScannedRecord,
    /// File offset of the record's opening brace.
    pub offset: FileOffset,
    /// File offset immediately past the record's closing brace.
    pub end: FileOffset,
}

/// A typed [`ResultS3`] for [`RecordReader::next_record`].
///
/// * `Found` the next complete record.
/// * `Done` at the end of file with nothing but record separators left.
/// * `Err` [`Error::MalformedRecord`] or [`Error::IoFault`]. A record cut
///   short by the end of file is `MalformedRecord` with an incomplete
///   reason (see [`Error::is_truncated`]), and is not consumed. A record
///   whose brace or quote is never closed, so that it runs over complete
///   records to the end of file, is [`MalformedReason::UnbalancedBraces`] or
///   [`MalformedReason::UnbalancedQuotes`]; pass it with
///   [`RecordReader::skip_malformed`].
pub type ResultS3RecordFind = ResultS3<RecordAt, Error>;

/// A `RecordReader` reads forward from a file offset, one record per call to
/// [`next_record`].
///
/// At file offset 0 any producer header, the bytes before the first `{`,
/// is skipped.
///
/// _XXX: not a rust "Reader"; does not implement trait [`Read`]._
///
/// [`next_record`]: RecordReader::next_record
/// [`Read`]: std::io::Read
pub struct RecordReader {
    blockreader: BlockReader,
    /// The file header has not been skipped yet.
    header_pending: bool,
    /// The last `read_block` reached the end of the file.
    eof: bool,
    /// `Count` of records returned.
    count_records: Count,
    /// `Count` of resynchronizations after a grammar error.
    count_resyncs: Count,
}

impl fmt::Debug for RecordReader {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("RecordReader")
            .field("blockreader", &self.blockreader)
            .field("header_pending", &self.header_pending)
            .field("eof", &self.eof)
            .field("records", &self.count_records)
            .field("resyncs", &self.count_resyncs)
            .finish()
    }
}

/// Implements the `RecordReader`.
impl RecordReader {
    pub fn new(
        path: FPath,
        offset: FileOffset,
        blocksz: BlockSz,
    ) -> Result<RecordReader> {
        def1n!("({:?}, {}, {})", path, offset, blocksz);
        let blockreader = match BlockReader::new(path.clone(), offset, blocksz) {
            Ok(val) => val,
            Err(err) => {
                def1x!("return Err {}", err);
                return Err(Error::io(&path, err));
            }
        };
        def1x!();

        Ok(RecordReader {
            blockreader,
            header_pending: offset == 0,
            eof: false,
            count_records: 0,
            count_resyncs: 0,
        })
    }

    pub const fn path(&self) -> &FPath {
        self.blockreader.path()
    }

    /// File offset of the next unread byte. After a `Found` this is the
    /// offset immediately past the returned record. After a truncated
    /// record this is the offset of that record.
    pub const fn offset(&self) -> FileOffset {
        self.blockreader.offset()
    }

    /// Continue reading at file offset `offset`.
    pub fn seek(
        &mut self,
        offset: FileOffset,
    ) -> Result<()> {
        self.blockreader
            .seek(offset)
            .map_err(|err| Error::io(self.blockreader.path(), err))?;
        self.header_pending = offset == 0;
        self.eof = false;

        Ok(())
    }

    fn malformed(
        &self,
        offset: FileOffset,
        reason: MalformedReason,
    ) -> Error {
        Error::MalformedRecord {
            path: self.path().clone(),
            offset,
            reason,
        }
    }

    /// Read another block. `Ok(false)` at end of file.
    fn read_more(&mut self) -> Result<bool> {
        match self.blockreader.read_block() {
            ResultS3ReadBlock::Found(_) => {
                self.eof = false;
                Ok(true)
            }
            ResultS3ReadBlock::Done => {
                self.eof = true;
                Ok(false)
            }
            ResultS3ReadBlock::Err(err) => Err(Error::io(self.path(), err)),
        }
    }

    /// Skip the bytes before the first `{` of the file.
    ///
    /// Returns `Ok(false)` if the end of file came first; the header is
    /// then still pending.
    fn skip_header(&mut self) -> Result<bool> {
        loop {
            let buffer: &[u8] = self.blockreader.buffer();
            match memchr(b'{', buffer) {
                Some(at) => {
                    defñ!("skip header of {} bytes", at);
                    self.blockreader.consume(at);
                    self.header_pending = false;
                    return Ok(true);
                }
                None => {
                    let len = buffer.len();
                    self.blockreader.consume(len);
                    if !self.read_more()? {
                        return Ok(false);
                    }
                }
            }
        }
    }

    /// Find the next record.
    ///
    /// Scanning is restarted from the record start each time more bytes are
    /// needed, so a record cut short by the end of file is found complete
    /// once the producer has appended the rest of it.
    pub fn next_record(&mut self) -> ResultS3RecordFind {
        defn!("({:?}) offset {}", self.path(), self.offset());
        if self.header_pending {
            match self.skip_header() {
                Ok(true) => {}
                Ok(false) => {
                    defx!("return Done; header only");
                    return ResultS3RecordFind::Done;
                }
                Err(err) => {
                    defx!("return Err {}", err);
                    return ResultS3RecordFind::Err(err);
                }
            }
        }
        loop {
            let offset: FileOffset = self.blockreader.offset();
            match scan_record(self.blockreader.buffer()) {
                ResultScan::Found(record) => {
                    let start = record.start;
                    let end = record.end;
                    self.blockreader.consume(end);
                    self.count_records += 1;
                    let record_at = RecordAt {
                        record,
                        offset: offset + start as FileOffset,
                        end: offset + end as FileOffset,
                    };
                    defx!("return Found [{}‥{})", record_at.offset, record_at.end);

                    return ResultS3RecordFind::Found(record_at);
                }
                ResultScan::Done => {
                    let len = self.blockreader.buffer().len();
                    self.blockreader.consume(len);
                    match self.read_more() {
                        Ok(true) => {}
                        Ok(false) => {
                            defx!("return Done");
                            return ResultS3RecordFind::Done;
                        }
                        Err(err) => {
                            defx!("return Err {}", err);
                            return ResultS3RecordFind::Err(err);
                        }
                    }
                }
                ResultScan::Err(err) if err.reason.is_incomplete() => {
                    // keep the partial record buffered, drop what precedes it
                    self.blockreader.consume(err.start);
                    match self.read_more() {
                        Ok(true) => {}
                        Ok(false) => {
                            let reason: MalformedReason = match find_later_record(self.blockreader.buffer(), 1) {
                                // the open span swallowed complete records
                                Some(_at) => {
                                    defo!("complete record at +{} after the open span", _at);
                                    match err.reason {
                                        MalformedReason::UnterminatedString => MalformedReason::UnbalancedQuotes,
                                        _ => MalformedReason::UnbalancedBraces,
                                    }
                                }
                                None => err.reason,
                            };
                            let err = self.malformed(self.offset(), reason);
                            defx!("return Err {}", err);
                            return ResultS3RecordFind::Err(err);
                        }
                        Err(err) => {
                            defx!("return Err {}", err);
                            return ResultS3RecordFind::Err(err);
                        }
                    }
                }
                ResultScan::Err(err) => {
                    self.blockreader.consume(err.start);
                    let err = self.malformed(self.offset(), err.reason);
                    defx!("return Err {}", err);

                    return ResultS3RecordFind::Err(err);
                }
            }
        }
    }

    /// Skip a malformed record: advance to the next line that begins with
    /// `{`.
    ///
    /// Returns `Ok(false)` if the end of file came first; everything up to
    /// the end of file was skipped.
    pub fn skip_malformed(&mut self) -> Result<bool> {
        defn!("({:?}) offset {}", self.path(), self.offset());
        self.count_resyncs += 1;
        // the bad record starts at `buffer[0]`; search past it
        let mut from: usize = 1;
        loop {
            let buffer: &[u8] = self.blockreader.buffer();
            match buffer
                .get(from..)
                .and_then(|rest| memmem::find(rest, RECORD_LINE_START))
            {
                Some(at) => {
                    // keep the `{`
                    self.blockreader.consume(from + at + 1);
                    defx!("return true; resync at {}", self.offset());
                    return Ok(true);
                }
                None => {
                    // a trailing `\n` may pair with a `{` not yet read
                    let keep: usize = match buffer.last() {
                        Some(b'\n') => 1,
                        _ => 0,
                    };
                    let len = buffer.len();
                    self.blockreader.consume(len - keep);
                    from = 0;
                    if !self.read_more()? {
                        let len = self.blockreader.buffer().len();
                        self.blockreader.consume(len);
                        defx!("return false; end of file at {}", self.offset());
                        return Ok(false);
                    }
                }
            }
        }
    }

    pub const fn count_records(&self) -> Count {
        self.count_records
    }

    pub const fn count_resyncs(&self) -> Count {
        self.count_resyncs
    }

    pub const fn count_bytes(&self) -> Count {
        self.blockreader.count_bytes()
    }
}
