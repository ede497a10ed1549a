// src/tests/common.rs

//! Common data for tests: reference records, event records, and temporary
//! log directories built from them.

#![allow(non_upper_case_globals)]

use crate::common::{
    Code,
    FPath,
};
use crate::debug::helpers::{
    create_file_in_tmpdir,
    create_temp_dir,
    path_to_fpath,
    TempDir,
};

use ::lazy_static::lazy_static;

/// Producer header of both file kinds: BOM, format line, GUID line, blank
/// line.
pub const FILE_HEADER: &str = "\u{FEFF}1CV8LOG(ver 2.0)\n3f2bfa5a-1c72-4a1e-a8a0-1f4e8d3c7a10\n\n";

pub const REFERENCE_NAME: &str = "1Cv8.lgf";

pub const DATA_NAME_1: &str = "20230101000000.lgp";
pub const DATA_NAME_2: &str = "20230102000000.lgp";
pub const DATA_NAME_3: &str = "20230103000000.lgp";

/// Code-first reference records, one of every dictionary plus one unknown
/// tag.
pub const REFERENCE_RECORDS: [&str; 10] = [
    r#"{1,12,"Admin",bd1e0b8e-4b3e-4ffb-9d39-fc2e0bba7a90}"#,
    r#"{1,13,"Operator"}"#,
    r#"{2,5,"SRV01"}"#,
    r#"{3,3,"1CV8C"}"#,
    r#"{4,7,"_$Session$_.Start"}"#,
    r#"{5,100,dd8b9e8d-0e0a-4a53-9c1c-0a2f3e4d5c6b,"Catalog.Items"}"#,
    r#"{6,1,"srv-app-01"}"#,
    r#"{7,1541,"1541"}"#,
    r#"{8,1560,"1560"}"#,
    r#"{11,1,{0,0}}"#,
];

/// Entries loaded from [`REFERENCE_RECORDS`]; the unknown tag is skipped.
pub const REFERENCE_ENTRIES: usize = 9;

/// The event record of the usage example.
pub const EVENT_RECORD_EXAMPLE: &str =
    r#"{"20230101120000","N","20230101120000",0,12,5,3,7,"I","Logged in",100,"","",0,0,0,1}"#;

/// An event record with the given values; other fields as
/// [`EVENT_RECORD_EXAMPLE`].
pub fn event_record(
    timestamp: &str,
    user: Code,
    event: Code,
    severity: &str,
    comment: &str,
) -> String {
    format!(
        r#"{{{},"N",{},0,{},5,3,{},"{}","{}",100,"",{{"S","{}"}},1,1541,1560,1}}"#,
        timestamp,
        timestamp,
        user,
        event,
        severity,
        comment.replace('"', "\"\""),
        comment.replace('"', "\"\""),
    )
}

/// Event records numbered from `first`: comment `"event N"`, one second
/// apart.
pub fn event_records(
    first: usize,
    count: usize,
) -> Vec<String> {
    (first..first + count)
        .map(|n| {
            let timestamp = format!("20230101{:02}{:02}{:02}", (n / 3600) % 24, (n / 60) % 60, n % 60);
            event_record(&timestamp, 12, 7, "I", &format!("event {}", n))
        })
        .collect()
}

/// A file as the producer writes it: header, then records separated by
/// `,` and a line break.
pub fn file_text(records: &[String]) -> String {
    let mut text = String::from(FILE_HEADER);
    for (i, record) in records.iter().enumerate() {
        if i != 0 {
            text.push_str(",\r\n");
        }
        text.push_str(record);
    }
    if !records.is_empty() {
        text.push_str("\r\n");
    }

    text
}

/// Bytes to append one more record to a file written by [`file_text`].
pub fn appended_text(record: &str) -> String {
    format!(",\r\n{}\r\n", record)
}

pub fn reference_text() -> String {
    let records: Vec<String> = REFERENCE_RECORDS
        .iter()
        .map(|record| String::from(*record))
        .collect();

    file_text(&records)
}

/// A temporary log directory. Removed when dropped.
pub struct LogDir {
    pub tempdir: TempDir,
    pub dir: FPath,
    pub reference: FPath,
}

impl LogDir {
    /// Write data file `name` holding `records`.
    pub fn write_data_file(
        &self,
        name: &str,
        records: &[String],
    ) -> FPath {
        create_file_in_tmpdir(&self.tempdir, name, file_text(records).as_bytes())
    }

    /// Path of file `name` within the directory.
    pub fn path(
        &self,
        name: &str,
    ) -> FPath {
        path_to_fpath(&self.tempdir.path().join(name))
    }
}

/// A log directory with [`reference_text`] and the given data files.
pub fn create_log_dir(data_files: &[(&str, Vec<String>)]) -> LogDir {
    let tempdir = create_temp_dir();
    let dir = path_to_fpath(tempdir.path());
    let reference = create_file_in_tmpdir(&tempdir, REFERENCE_NAME, reference_text().as_bytes());
    let logdir = LogDir {
        tempdir,
        dir,
        reference,
    };
    for (name, records) in data_files.iter() {
        logdir.write_data_file(name, records);
    }

    logdir
}

lazy_static! {
    /// 10 events in the first data file, 5 in the second.
    pub static ref RECORDS_FILE_1: Vec<String> = event_records(1, 10);
    pub static ref RECORDS_FILE_2: Vec<String> = event_records(11, 5);
}

/// A log directory of two data files, [`RECORDS_FILE_1`] and
/// [`RECORDS_FILE_2`].
pub fn create_log_dir_2files() -> LogDir {
    create_log_dir(&[(DATA_NAME_1, RECORDS_FILE_1.clone()), (DATA_NAME_2, RECORDS_FILE_2.clone())])
}
