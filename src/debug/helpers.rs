// src/debug/helpers.rs

//! Miscellaneous helper functions for testing: temporary log files and log
//! directories.

use crate::common::{
    EventNumber,
    FPath,
    FileOpenOptions,
};

use std::fs::File;
use std::path::Path;

#[allow(unused_imports)] // XXX: clippy wrongly marks this as unused
use std::io::Write; // for `NamedTempFile.write_all`

extern crate filetime;

extern crate lazy_static;
use lazy_static::lazy_static;

extern crate rand;
use rand::seq::SliceRandom; // brings in `shuffle`

extern crate si_trace_print;
use si_trace_print::{dpfo, dpfñ};

extern crate tempfile;

#[doc(hidden)]
pub use tempfile::NamedTempFile;
#[doc(hidden)]
pub use tempfile::TempDir;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// temporary file helper functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// NamedTempFile instances default to this file name prefix.
///
/// See <https://github.com/Stebalien/tempfile/issues/183>.
pub const STR_TEMPFILE_PREFIX: &str = "tmp-evlog-test-";

lazy_static! {
    pub static ref STRING_TEMPFILE_PREFIX: String = String::from(STR_TEMPFILE_PREFIX);
}

/// Small helper function for copying `NamedTempFile` path to a `FPath`.
pub fn ntf_fpath(ntf: &NamedTempFile) -> FPath {
    FPath::from(ntf.path().to_str().unwrap())
}

/// Small helper function for a `Path` to a `FPath`.
pub fn path_to_fpath(path: &Path) -> FPath {
    FPath::from(path.to_str().unwrap())
}

/// Testing helper function to write a `[u8]` to a temporary file with a
/// specific suffix, e.g. `.lgp`.
pub fn create_temp_file_bytes_with_suffix(
    data: &[u8],
    suffix: &str,
) -> NamedTempFile {
    let mut ntf = match tempfile::Builder::new()
        // use known prefix for easier cleanup
        .prefix::<str>(&STRING_TEMPFILE_PREFIX)
        .suffix(suffix)
        .tempfile()
    {
        Ok(val) => val,
        Err(err) => {
            panic!("tempfile::Builder::new()..tempfile() return Err {}", err);
        }
    };
    match ntf.write_all(data) {
        Ok(_) => {}
        Err(err) => {
            panic!("NamedTempFile::write_all() return Err {}", err);
        }
    }

    ntf
}

/// Testing helper function to write a `str` to a temporary file.
pub fn create_temp_file(data: &str) -> NamedTempFile {
    create_temp_file_bytes_with_suffix(data.as_bytes(), "")
}

/// Testing helper function to write a `[u8]` to a temporary file.
pub fn create_temp_file_bytes(data: &[u8]) -> NamedTempFile {
    create_temp_file_bytes_with_suffix(data, "")
}

/// Create a temporary directory
pub fn create_temp_dir() -> TempDir {
    dpfñ!();
    tempfile::Builder::new()
        .prefix::<str>(&STRING_TEMPFILE_PREFIX)
        .tempdir()
        .unwrap()
}

/// Testing helper to write `data` to file `name` within `tempdir`, replacing
/// any prior content. Returns the path of the file.
pub fn create_file_in_tmpdir(
    tempdir: &TempDir,
    name: &str,
    data: &[u8],
) -> FPath {
    let path = tempdir.path().join(name);
    dpfo!("File::create({:?})", path);
    let mut file: File = match File::create(&path) {
        Ok(f) => f,
        Err(err) => panic!("File::create({:?}) Error {:?}", path, err),
    };
    file.write_all(data).unwrap();

    path_to_fpath(path.as_path())
}

/// Testing helper to append `data` to an existing file, the way the producer
/// appends records to a live log.
pub fn append_to_file(
    path: &FPath,
    data: &[u8],
) {
    dpfo!("append {} bytes to {:?}", data.len(), path);
    let mut file: File = match FileOpenOptions::new()
        .append(true)
        .open(path)
    {
        Ok(f) => f,
        Err(err) => panic!("open({:?}) for append Error {:?}", path, err),
    };
    file.write_all(data).unwrap();
}

/// Testing helper to overwrite a file entirely.
pub fn rewrite_file(
    path: &FPath,
    data: &[u8],
) {
    dpfo!("rewrite {} bytes to {:?}", data.len(), path);
    std::fs::write(path, data).unwrap();
}

/// Testing helper to set the modified time of a file to `unix_seconds`.
///
/// File systems with coarse timestamps may give two quick writes the same
/// modified time; tests that depend on a change of modified time set it
/// explicitly.
pub fn set_mtime(
    path: &FPath,
    unix_seconds: i64,
) {
    let ft = filetime::FileTime::from_unix_time(unix_seconds, 0);
    filetime::set_file_mtime(path, ft).unwrap();
}

/// Testing helper to shuffle event numbers, for seeking in random order.
pub fn randomize(v_: &mut [EventNumber]) {
    let mut rng = rand::rng();
    v_.shuffle(&mut rng);
}
