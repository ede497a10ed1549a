// src/data/position.rs

//! Implements [`CursorState`], the resumable position of a reader, and
//! [`Fingerprint`], the staleness stamp of the reference file.

use std::fs::File;
use std::io::Read;

use ::serde::{
    Deserialize,
    Serialize,
};
#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};
use ::xxhash_rust::xxh3::xxh3_64;

use crate::common::{
    EventNumber,
    FPath,
    FileOffset,
    FileSz,
};
use crate::data::datetime::systemtime_to_nanos;
use crate::error::Result;

/// Bytes at the start of a file hashed into a [`Fingerprint`].
pub const FINGERPRINT_PREFIX_SZ: FileSz = 4096;

/// Cheap heuristic identity of a file's content at one moment.
///
/// Not a cryptographic guarantee: a rewrite that keeps length, modified
/// time and the hashed prefix goes unnoticed.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// File length in bytes.
    pub len: FileSz,
    /// Modified time, nanoseconds since the Unix epoch.
    pub mtime_nanos: u64,
    /// Count of leading bytes hashed, `min(len, FINGERPRINT_PREFIX_SZ)`.
    pub prefix_len: FileSz,
    /// xxh3 hash of the leading `prefix_len` bytes.
    pub prefix_hash: u64,
}

/// How a file relates to an earlier [`Fingerprint`] of it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FingerprintCheck {
    /// Length and modified time are unchanged.
    Same,
    /// Not shorter, and the earlier prefix is unchanged: bytes were appended
    /// (possibly none).
    Appended,
    /// Shorter, or the earlier prefix changed: the file was replaced.
    Replaced,
}

/// Read up to `len` leading bytes of `file` and hash them.
fn hash_prefix(
    file: &mut File,
    len: FileSz,
) -> std::io::Result<(FileSz, u64)> {
    let mut buf: Vec<u8> = Vec::with_capacity(len as usize);
    file.by_ref()
        .take(len)
        .read_to_end(&mut buf)?;

    Ok((buf.len() as FileSz, xxh3_64(&buf)))
}

impl Fingerprint {
    /// Fingerprint the file at `path` as it is now.
    pub fn of_file(path: &FPath) -> std::io::Result<Fingerprint> {
        let mut file = File::open(path)?;
        let metadata = file.metadata()?;
        let len: FileSz = metadata.len();
        let mtime_nanos: u64 = systemtime_to_nanos(&metadata.modified()?);
        let (prefix_len, prefix_hash) = hash_prefix(&mut file, len.min(FINGERPRINT_PREFIX_SZ))?;
        defñ!("{:?} len {} prefix_len {} prefix_hash {:016x}", path, len, prefix_len, prefix_hash);

        Ok(Fingerprint {
            len,
            mtime_nanos,
            prefix_len,
            prefix_hash,
        })
    }

    /// Compare the file at `path` as it is now against `self`.
    pub fn check_file(
        &self,
        path: &FPath,
    ) -> std::io::Result<FingerprintCheck> {
        let mut file = File::open(path)?;
        let metadata = file.metadata()?;
        let len: FileSz = metadata.len();
        let mtime_nanos: u64 = systemtime_to_nanos(&metadata.modified()?);
        if len == self.len && mtime_nanos == self.mtime_nanos {
            return Ok(FingerprintCheck::Same);
        }
        if len < self.len {
            defñ!("{:?} shrank {} → {}", path, self.len, len);
            return Ok(FingerprintCheck::Replaced);
        }
        let (prefix_len, prefix_hash) = hash_prefix(&mut file, self.prefix_len)?;
        if prefix_len != self.prefix_len || prefix_hash != self.prefix_hash {
            defñ!("{:?} prefix changed", path);
            return Ok(FingerprintCheck::Replaced);
        }

        Ok(FingerprintCheck::Appended)
    }
}

/// The resumable position of a reader.
///
/// Persist it with [`to_json`] and hand it back to [`set_position`] to
/// continue reading exactly where a previous reader stopped.
///
/// [`to_json`]: CursorState::to_json
/// [`set_position`]: crate::readers::eventlogreader::EventLogReader::set_position
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CursorState {
    /// The data file of the next unread record; `None` before any file was
    /// opened.
    pub file_path: Option<FPath>,
    /// Offset within `file_path` of the next unread record.
    pub byte_offset: FileOffset,
    /// Number of the last record returned; `0` before the first.
    pub logical_event_number: EventNumber,
    /// The reference file's [`Fingerprint`] when this position was taken.
    pub reference_fingerprint: Option<Fingerprint>,
}

impl CursorState {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<CursorState> {
        Ok(serde_json::from_str(json)?)
    }
}
