// src/tests/fileset_tests.rs

//! tests for `fileset.rs`

#![allow(non_snake_case)]

use std::path::Path;

use crate::common::FPath;
use crate::data::datetime::timestamp_from_str;
use crate::debug::helpers::{
    create_file_in_tmpdir,
    create_temp_dir,
    path_to_fpath,
};
use crate::readers::fileset::{
    data_file_key,
    scan_data_files,
    FileSet,
};
use crate::tests::common::{
    create_log_dir,
    event_records,
    DATA_NAME_1,
    DATA_NAME_2,
    DATA_NAME_3,
};

use ::test_case::test_case;

#[test_case("20230101000000.lgp", Some("20230101000000"); "data file")]
#[test_case("/var/log/1c/20231231235959.lgp", Some("20231231235959"); "data file with dir")]
#[test_case("20230101000000.LGP", Some("20230101000000"); "upper case extension")]
#[test_case("1Cv8.lgf", None; "reference file")]
#[test_case("20230101000000.lgx", None; "other extension")]
#[test_case("backup.lgp", None; "not a timestamp")]
#[test_case("20231301000000.lgp", None; "bad month")]
#[test_case("20230101000000", None; "no extension")]
fn test_data_file_key(
    path: &str,
    expect: Option<&str>,
) {
    let key = data_file_key(Path::new(path));
    match expect {
        Some(ts) => {
            let (start, key_path) = key.unwrap();
            assert_eq!(start, timestamp_from_str(ts).unwrap());
            assert_eq!(key_path, FPath::from(path));
        }
        None => assert!(key.is_none(), "{:?}", key),
    }
}

#[test]
fn test_scan_data_files_order() {
    // written out of order
    let logdir = create_log_dir(&[
        (DATA_NAME_3, event_records(1, 1)),
        (DATA_NAME_1, event_records(2, 1)),
        (DATA_NAME_2, event_records(3, 1)),
    ]);
    create_file_in_tmpdir(&logdir.tempdir, "notes.txt", b"x");
    create_file_in_tmpdir(&logdir.tempdir, "old.lgp", b"x");
    std::fs::create_dir(logdir.tempdir.path().join("20230104000000.lgp")).unwrap();
    let files = scan_data_files(&logdir.dir).unwrap();
    assert_eq!(files, vec![logdir.path(DATA_NAME_1), logdir.path(DATA_NAME_2), logdir.path(DATA_NAME_3)]);
}

#[test]
fn test_scan_data_files_empty() {
    let logdir = create_log_dir(&[]);
    assert!(scan_data_files(&logdir.dir).unwrap().is_empty());
}

#[test]
fn test_scan_data_files_not_dir() {
    let tmpdir = create_temp_dir();
    let dir: FPath = path_to_fpath(&tmpdir.path().join("missing"));
    assert!(scan_data_files(&dir).unwrap_err().is_io());
}

#[test]
fn test_FileSet_Single() {
    let fileset = FileSet::Single {
        path: FPath::from("/x/20230101000000.lgp"),
    };
    assert_eq!(fileset.files().unwrap(), vec![FPath::from("/x/20230101000000.lgp")]);
    assert_eq!(
        fileset.advance_to_next_file(None).unwrap(),
        Some(FPath::from("/x/20230101000000.lgp"))
    );
    assert_eq!(
        fileset
            .advance_to_next_file(Some(&FPath::from("/x/20230101000000.lgp")))
            .unwrap(),
        None
    );
    assert!(!fileset
        .has_file_after(&FPath::from("/x/20230101000000.lgp"))
        .unwrap());
}

#[test]
fn test_FileSet_Directory_advance() {
    let logdir = create_log_dir(&[(DATA_NAME_1, event_records(1, 1)), (DATA_NAME_2, event_records(2, 1))]);
    let fileset = FileSet::Directory {
        dir: logdir.dir.clone(),
    };
    let first = fileset.advance_to_next_file(None).unwrap();
    assert_eq!(first, Some(logdir.path(DATA_NAME_1)));
    let second = fileset
        .advance_to_next_file(first.as_ref())
        .unwrap();
    assert_eq!(second, Some(logdir.path(DATA_NAME_2)));
    assert!(fileset
        .has_file_after(&logdir.path(DATA_NAME_1))
        .unwrap());
    assert_eq!(fileset.advance_to_next_file(second.as_ref()).unwrap(), None);
}

/// A data file created after the scan is found by the next advance.
#[test]
fn test_FileSet_Directory_new_file() {
    let logdir = create_log_dir(&[(DATA_NAME_1, event_records(1, 1))]);
    let fileset = FileSet::Directory {
        dir: logdir.dir.clone(),
    };
    let first = logdir.path(DATA_NAME_1);
    assert!(!fileset.has_file_after(&first).unwrap());
    logdir.write_data_file(DATA_NAME_2, &event_records(2, 1));
    assert_eq!(fileset.advance_to_next_file(Some(&first)).unwrap(), Some(logdir.path(DATA_NAME_2)));
}

/// The current file was removed; the next is chosen by timestamp.
#[test]
fn test_FileSet_Directory_current_removed() {
    let logdir = create_log_dir(&[
        (DATA_NAME_1, event_records(1, 1)),
        (DATA_NAME_2, event_records(2, 1)),
        (DATA_NAME_3, event_records(3, 1)),
    ]);
    let fileset = FileSet::Directory {
        dir: logdir.dir.clone(),
    };
    std::fs::remove_file(logdir.path(DATA_NAME_2)).unwrap();
    assert_eq!(
        fileset
            .advance_to_next_file(Some(&logdir.path(DATA_NAME_2)))
            .unwrap(),
        Some(logdir.path(DATA_NAME_3))
    );
    // not a data file name, no order to follow
    assert_eq!(
        fileset
            .advance_to_next_file(Some(&logdir.path("other.txt")))
            .unwrap(),
        None
    );
}
