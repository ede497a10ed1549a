// src/tests/hooks_tests.rs

//! tests for `hooks.rs`

#![allow(non_snake_case)]

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use crate::readers::eventlogreader::{
    EventLogReader,
    LogSource,
    ReaderConfig,
};
use crate::readers::hooks::{
    ErrorAction,
    ReaderHooks,
};
use crate::tests::common::{
    create_log_dir,
    event_record,
    event_records,
    LogDir,
    DATA_NAME_1,
    DATA_NAME_2,
};

type Calls = Rc<RefCell<Vec<String>>>;

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned()
}

/// Hooks that log every call to `calls`; `on_error` answers `action`.
fn logging_hooks(
    calls: &Calls,
    action: ErrorAction,
) -> ReaderHooks {
    let c1 = calls.clone();
    let c2 = calls.clone();
    let c3 = calls.clone();
    let c4 = calls.clone();
    let c5 = calls.clone();
    ReaderHooks::default()
        .on_before_read_file(move |args| {
            c1.borrow_mut()
                .push(format!("before_read_file {}", file_name(args.path)))
        })
        .on_after_read_file(move |args| {
            c2.borrow_mut()
                .push(format!("after_read_file {}", file_name(args.path)))
        })
        .on_before_read_event(move |args| {
            assert!(args.source_text().starts_with('{'));
            c3.borrow_mut()
                .push(format!("before_read_event {}", args.event_number))
        })
        .on_after_read_event(move |args| {
            c4.borrow_mut()
                .push(format!("after_read_event {} {}", args.event_number, args.row.comment))
        })
        .on_error(move |args| {
            c5.borrow_mut().push(format!(
                "on_error malformed={} source={}",
                args.error.is_malformed(),
                args.source_data.is_some()
            ));
            action
        })
}

fn open_reader(
    logdir: &LogDir,
    hooks: ReaderHooks,
) -> EventLogReader {
    let source = LogSource::detect(&logdir.dir).unwrap();
    EventLogReader::with_config(source, ReaderConfig::default(), hooks).unwrap()
}

/// An event record of 16 fields; framed but not decodable.
fn short_record() -> String {
    let record = event_record("20230101000009", 12, 7, "E", "short");
    let mut short = String::from(record.strip_suffix(",1}").unwrap());
    short.push('}');

    short
}

#[test]
fn test_hooks_order() {
    let logdir = create_log_dir(&[(DATA_NAME_1, event_records(1, 2)), (DATA_NAME_2, event_records(3, 1))]);
    let calls: Calls = Calls::default();
    let mut reader = open_reader(&logdir, logging_hooks(&calls, ErrorAction::Skip));
    while reader.read_next().unwrap().is_some() {}
    let expect: Vec<String> = [
        "before_read_file 20230101000000.lgp",
        "before_read_event 1",
        "after_read_event 1 event 1",
        "before_read_event 2",
        "after_read_event 2 event 2",
        "after_read_file 20230101000000.lgp",
        "before_read_file 20230102000000.lgp",
        "before_read_event 3",
        "after_read_event 3 event 3",
    ]
    .iter()
    .map(|s| String::from(*s))
    .collect();
    assert_eq!(*calls.borrow(), expect);
}

/// Reading quietly, as `seek` and `count` do, calls no hooks.
#[test]
fn test_hooks_not_called_by_seek_count() {
    let logdir = create_log_dir(&[(DATA_NAME_1, event_records(1, 3))]);
    let calls: Calls = Calls::default();
    let mut reader = open_reader(&logdir, logging_hooks(&calls, ErrorAction::Skip));
    assert_eq!(reader.count().unwrap(), 3);
    assert!(reader.seek(2).unwrap());
    assert!(calls.borrow().is_empty());
}

/// Records passed by `advance_file` are read quietly; only the file hooks
/// are called.
#[test]
fn test_hooks_advance_file() {
    let logdir = create_log_dir(&[(DATA_NAME_1, event_records(1, 3)), (DATA_NAME_2, event_records(4, 1))]);
    let calls: Calls = Calls::default();
    let mut reader = open_reader(&logdir, logging_hooks(&calls, ErrorAction::Skip));
    assert_eq!(reader.read_next().unwrap().unwrap().comment, "event 1");
    assert!(reader.advance_file().unwrap());
    assert_eq!(reader.read_next().unwrap().unwrap().comment, "event 4");
    let expect: Vec<String> = [
        "before_read_file 20230101000000.lgp",
        "before_read_event 1",
        "after_read_event 1 event 1",
        "after_read_file 20230101000000.lgp",
        "before_read_file 20230102000000.lgp",
        "before_read_event 4",
        "after_read_event 4 event 4",
    ]
    .iter()
    .map(|s| String::from(*s))
    .collect();
    assert_eq!(*calls.borrow(), expect);
}

#[test]
fn test_hooks_malformed_skip() {
    let records = vec![
        event_records(1, 1).remove(0),
        short_record(),
        event_records(2, 1).remove(0),
    ];
    let logdir = create_log_dir(&[(DATA_NAME_1, records)]);
    let calls: Calls = Calls::default();
    let mut reader = open_reader(&logdir, logging_hooks(&calls, ErrorAction::Skip));
    assert_eq!(reader.read_next().unwrap().unwrap().comment, "event 1");
    assert_eq!(reader.read_next().unwrap().unwrap().comment, "event 2");
    assert!(reader.read_next().unwrap().is_none());
    let calls = calls.borrow();
    assert!(calls.contains(&String::from("on_error malformed=true source=true")));
    // the skipped record is not numbered
    assert!(calls.contains(&String::from("after_read_event 2 event 2")));
    assert_eq!(reader.summary().malformed_skipped, 1);
}

#[test]
fn test_hooks_malformed_abort() {
    let records = vec![
        event_records(1, 1).remove(0),
        short_record(),
        event_records(2, 1).remove(0),
    ];
    let logdir = create_log_dir(&[(DATA_NAME_1, records)]);
    let calls: Calls = Calls::default();
    let mut reader = open_reader(&logdir, logging_hooks(&calls, ErrorAction::Abort));
    assert_eq!(reader.read_next().unwrap().unwrap().comment, "event 1");
    let err = reader.read_next().unwrap_err();
    assert!(err.is_malformed(), "{:?}", err);
    // the position is past the bad record
    assert_eq!(reader.read_next().unwrap().unwrap().comment, "event 2");
    assert_eq!(reader.get_position().logical_event_number, 2);
}

/// A record with bad grammar can not be framed; no source is passed.
#[test]
fn test_hooks_malformed_grammar() {
    let records = vec![
        event_records(1, 1).remove(0),
        String::from("{1 2}"),
        event_records(2, 1).remove(0),
    ];
    let logdir = create_log_dir(&[(DATA_NAME_1, records)]);
    let calls: Calls = Calls::default();
    let mut reader = open_reader(&logdir, logging_hooks(&calls, ErrorAction::Skip));
    assert_eq!(reader.read_next().unwrap().unwrap().comment, "event 1");
    assert_eq!(reader.read_next().unwrap().unwrap().comment, "event 2");
    assert!(calls
        .borrow()
        .contains(&String::from("on_error malformed=true source=false")));
}

#[test]
fn test_hooks_malformed_grammar_abort() {
    let records = vec![String::from("{1 2}"), event_records(1, 1).remove(0)];
    let logdir = create_log_dir(&[(DATA_NAME_1, records)]);
    let calls: Calls = Calls::default();
    let mut reader = open_reader(&logdir, logging_hooks(&calls, ErrorAction::Abort));
    assert!(reader.read_next().unwrap_err().is_malformed());
    assert_eq!(reader.get_position().logical_event_number, 0);
}

#[test]
fn test_ReaderHooks_default_debug() {
    let hooks = ReaderHooks::default().on_error(|_args| ErrorAction::Abort);
    let s = format!("{:?}", hooks);
    assert!(s.contains("on_error: true"), "{}", s);
    assert!(s.contains("before_read_file: false"), "{}", s);
    assert_eq!(ErrorAction::default(), ErrorAction::Skip);
}
