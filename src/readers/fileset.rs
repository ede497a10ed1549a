// src/readers/fileset.rs

//! Implements the [`FileSet`], finding and ordering the data files of an
//! event log.
//!
//! A log directory holds the reference file `1Cv8.lgf` and data files named
//! for the timestamp of their first record, e.g. `20230101120000.lgp`. The
//! producer starts a new data file while a reader may be reading, so the
//! directory is rescanned each time the next file is needed.

use std::io::{
    Error as IoError,
    ErrorKind,
};
use std::path::Path;

#[allow(unused_imports)]
use ::si_trace_print::{
    dpfn,
    dpfo,
    dpfx,
    defn,
    defo,
    defx,
    defñ,
};
use ::walkdir::WalkDir;

use crate::common::{
    FPath,
    FPaths,
    DATA_FILE_EXTENSION,
};
use crate::data::datetime::{
    timestamp_from_str,
    DateTimeL,
};
#[allow(unused_imports)]
use crate::debug::printers::de_wrn;
use crate::error::{
    Error,
    Result,
};

/// Ordering key of a data file: the start timestamp in its name, then the
/// path.
type DataFileKey = (DateTimeL, FPath);

/// The ordering key of `path` if it names a data file, `YYYYMMDDhhmmss.lgp`.
pub fn data_file_key(path: &Path) -> Option<DataFileKey> {
    let extension = path.extension()?.to_str()?;
    if !extension.eq_ignore_ascii_case(DATA_FILE_EXTENSION) {
        return None;
    }
    let start: DateTimeL = timestamp_from_str(path.file_stem()?.to_str()?)?;

    Some((start, FPath::from(path.to_str()?)))
}

/// Data files of `dir`, ordered by the start timestamp in their names.
///
/// `*.lgp` files whose name is not a timestamp are ignored. Subdirectories
/// are not searched.
pub fn scan_data_files(dir: &FPath) -> Result<FPaths> {
    dpfn!("({:?})", dir);
    if !Path::new(dir).is_dir() {
        let err = IoError::new(ErrorKind::NotFound, "not a directory");
        dpfx!("return Err {}", err);
        return Err(Error::io(dir, err));
    }
    let mut keys: Vec<DataFileKey> = Vec::new();
    for entry in WalkDir::new(dir.as_str())
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(val) => val,
            Err(_err) => {
                de_wrn!("WalkDir({:?}) {}", dir, _err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        match data_file_key(entry.path()) {
            Some(key) => {
                dpfo!("data file {:?}", key.1);
                keys.push(key);
            }
            None => {
                dpfo!("ignore {:?}", entry.path());
            }
        }
    }
    keys.sort();
    let paths: FPaths = keys
        .into_iter()
        .map(|(_start, path)| path)
        .collect();
    dpfx!("return {} files", paths.len());

    Ok(paths)
}

/// The data files of one event log.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FileSet {
    /// Every data file of a log directory, rotated in timestamp order.
    Directory { dir: FPath },
    /// A single data file; no rotation.
    Single { path: FPath },
}

impl FileSet {
    /// The ordered data files as they are now.
    pub fn files(&self) -> Result<FPaths> {
        match self {
            FileSet::Directory { dir } => scan_data_files(dir),
            FileSet::Single { path } => Ok(vec![path.clone()]),
        }
    }

    /// The data file following `current`, or the first data file if
    /// `current` is `None`.
    ///
    /// `None` at the end of the known files; the reader is caught up to the
    /// live tail.
    pub fn advance_to_next_file(
        &self,
        current: Option<&FPath>,
    ) -> Result<Option<FPath>> {
        defn!("({:?})", current);
        let files: FPaths = self.files()?;
        let next: Option<FPath> = match current {
            None => files.into_iter().next(),
            Some(current) => match files.iter().position(|path| path == current) {
                Some(at) => files.into_iter().nth(at + 1),
                // `current` is gone or was never a data file; order by key
                None => match data_file_key(Path::new(current)) {
                    Some(key_current) => files
                        .into_iter()
                        .find(|path| match data_file_key(Path::new(path)) {
                            Some(key) => key > key_current,
                            None => false,
                        }),
                    None => None,
                },
            },
        };
        defx!("return {:?}", next);

        Ok(next)
    }

    /// Is there a data file after `current`?
    pub fn has_file_after(
        &self,
        current: &FPath,
    ) -> Result<bool> {
        Ok(self
            .advance_to_next_file(Some(current))?
            .is_some())
    }
}
