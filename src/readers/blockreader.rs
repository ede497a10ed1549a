// src/readers/blockreader.rs
// … ‥

//! Implements [`BlockReader`], the driver of reading bytes from a file.

#[doc(hidden)]
use crate::common::{
    Count,
    FPath,
    File,
    FileOffset,
    FileOpenOptions,
    ResultS3,
};

use std::fmt;
use std::io::prelude::Read;
use std::io::{
    Result,
    Seek,
    SeekFrom,
};

#[allow(unused_imports)]
use ::more_asserts::{
    assert_ge,
    assert_le,
    debug_assert_ge,
    debug_assert_le,
};
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

/// Block Size in bytes.
pub type BlockSz = u64;

/// A [`ResultS3`] for [`BlockReader::read_block`].
///
/// * `Found` count of bytes appended to the buffer.
/// * `Done` at end of file; bytes appended later by another process are
///   returned by a later call.
///
/// [`ResultS3`]: crate::common::ResultS3
pub type ResultS3ReadBlock = ResultS3<usize, std::io::Error>;

/// Minimum Block Size (inclusive).
pub const BLOCKSZ_MIN: BlockSz = 1;

/// Maximum Block Size (inclusive).
pub const BLOCKSZ_MAX: BlockSz = 0xFFFFFF;

/// Default Block Size.
pub const BLOCKSZ_DEF: BlockSz = 0xFFFF;

/// A `BlockReader` reads a file forward in blocks of `blocksz` bytes into a
/// buffer of bytes not yet consumed by the caller.
///
/// The file may grow while it is read; reaching the end of file is not
/// final. A `BlockReader` does not know about records, only bytes `u8`.
///
/// _XXX: not a rust "Reader"; does not implement trait [`Read`]._
///
/// [`Read`]: std::io::Read
pub struct BlockReader {
    /// Path to the file.
    path: FPath,
    /// The file handle.
    file: File,
    /// Standard read size in bytes.
    blocksz: BlockSz,
    /// Bytes read. Bytes before `start` were consumed.
    buffer: Vec<u8>,
    /// Index into `buffer` of the first unconsumed byte.
    start: usize,
    /// File offset of `buffer[start]`.
    offset: FileOffset,
    /// `Count` of bytes read from the file.
    count_bytes: Count,
    /// `Count` of successful non-empty reads.
    count_blocks: Count,
}

impl fmt::Debug for BlockReader {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("BlockReader")
            .field("path", &self.path)
            .field("blocksz", &self.blocksz)
            .field("offset", &self.offset)
            .field("buffered", &self.buffer().len())
            .field("bytes read", &self.count_bytes)
            .field("blocks read", &self.count_blocks)
            .finish()
    }
}

/// Implements the `BlockReader`.
impl BlockReader {
    /// Create a new `BlockReader` positioned at file offset `offset`.
    pub fn new(
        path: FPath,
        offset: FileOffset,
        blocksz: BlockSz,
    ) -> Result<BlockReader> {
        def1n!("({:?}, {}, {})", path, offset, blocksz);
        assert_ge!(blocksz, BLOCKSZ_MIN, "Block Size {} is too small", blocksz);
        assert_le!(blocksz, BLOCKSZ_MAX, "Block Size {} is too big", blocksz);

        let mut open_options = FileOpenOptions::new();
        let file: File = match open_options
            .read(true)
            .open(&path)
        {
            Ok(val) => val,
            Err(err) => {
                def1x!("return Err {}", err);
                return Err(err);
            }
        };
        let mut blockreader = BlockReader {
            path,
            file,
            blocksz,
            buffer: Vec::with_capacity(blocksz as usize),
            start: 0,
            offset: 0,
            count_bytes: 0,
            count_blocks: 0,
        };
        if offset != 0 {
            blockreader.seek(offset)?;
        }
        def1x!("return {:?}", blockreader);

        Ok(blockreader)
    }

    pub const fn path(&self) -> &FPath {
        &self.path
    }

    /// File offset of the first byte of [`buffer`](Self::buffer).
    pub const fn offset(&self) -> FileOffset {
        self.offset
    }

    /// The bytes read and not yet consumed.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer[self.start..]
    }

    /// Mark the first `n` bytes of [`buffer`](Self::buffer) as consumed.
    pub fn consume(
        &mut self,
        n: usize,
    ) {
        debug_assert_le!(n, self.buffer().len(), "consume {} beyond buffered bytes", n);
        self.start += n;
        self.offset += n as FileOffset;
        if self.start == self.buffer.len() {
            self.buffer.clear();
            self.start = 0;
        }
    }

    /// Drop buffered bytes and continue reading at file offset `offset`.
    pub fn seek(
        &mut self,
        offset: FileOffset,
    ) -> Result<()> {
        defñ!("({})", offset);
        self.file.seek(SeekFrom::Start(offset))?;
        self.buffer.clear();
        self.start = 0;
        self.offset = offset;

        Ok(())
    }

    /// Read the next block of the file and append it to the buffer.
    pub fn read_block(&mut self) -> ResultS3ReadBlock {
        defn!("({:?}) offset {} buffered {}", self.path, self.offset, self.buffer().len());
        // move unconsumed bytes to the front before the buffer grows
        if self.start != 0 {
            self.buffer.drain(..self.start);
            self.start = 0;
        }
        let len_before: usize = self.buffer.len();
        match (&self.file)
            .take(self.blocksz)
            .read_to_end(&mut self.buffer)
        {
            Ok(0) => {
                defx!("return Done");

                ResultS3ReadBlock::Done
            }
            Ok(n) => {
                debug_assert_eq!(len_before + n, self.buffer.len());
                self.count_bytes += n as Count;
                self.count_blocks += 1;
                defx!("return Found({})", n);

                ResultS3ReadBlock::Found(n)
            }
            Err(err) => {
                self.buffer.truncate(len_before);
                defx!("return Err({})", err);

                ResultS3ReadBlock::Err(err)
            }
        }
    }

    /// `Count` of bytes read from the file.
    pub const fn count_bytes(&self) -> Count {
        self.count_bytes
    }
}
