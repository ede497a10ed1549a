// src/tests/referencestore_tests.rs

//! tests for `referencestore.rs`

#![allow(non_snake_case)]

use crate::common::{
    Count,
    FPath,
};
use crate::data::reference::{
    DictionaryKind,
    ReferenceLayout,
};
use crate::debug::helpers::{
    append_to_file,
    create_file_in_tmpdir,
    create_temp_dir,
    rewrite_file,
    set_mtime,
    TempDir,
};
use crate::error::Error;
use crate::readers::blockreader::BLOCKSZ_DEF;
use crate::readers::referencestore::ReferenceStore;
use crate::tests::common::{
    appended_text,
    file_text,
    reference_text,
    REFERENCE_ENTRIES,
    REFERENCE_NAME,
};

use ::test_case::test_case;

fn new_store(
    data: &str,
    blocksz: u64,
) -> (TempDir, FPath, ReferenceStore) {
    let tmpdir = create_temp_dir();
    let path = create_file_in_tmpdir(&tmpdir, REFERENCE_NAME, data.as_bytes());
    set_mtime(&path, 1_600_000_000);
    let store = ReferenceStore::new(path.clone(), ReferenceLayout::default(), blocksz);

    (tmpdir, path, store)
}

#[test_case(1; "blocksz 1")]
#[test_case(13; "blocksz 13")]
#[test_case(BLOCKSZ_DEF; "blocksz default")]
fn test_ReferenceStore_load(blocksz: u64) {
    let (_tmpdir, _path, mut store) = new_store(&reference_text(), blocksz);
    assert!(store.is_empty());
    assert!(store.fingerprint().is_none());
    let count: Count = store.load_or_refresh().unwrap();
    assert_eq!(count, REFERENCE_ENTRIES as Count);
    assert_eq!(store.len(), REFERENCE_ENTRIES);
    assert!(store.fingerprint().is_some());
    assert_eq!(store.count_skipped, 1);
    assert_eq!(store.resolve_name(DictionaryKind::Users, 12), Some(String::from("Admin")));
    assert_eq!(store.resolve_name(DictionaryKind::Users, 13), Some(String::from("Operator")));
    assert_eq!(store.resolve_name(DictionaryKind::Computers, 5), Some(String::from("SRV01")));
    assert_eq!(store.resolve_name(DictionaryKind::Applications, 3), Some(String::from("1CV8C")));
    assert_eq!(store.resolve_name(DictionaryKind::Events, 7), Some(String::from("_$Session$_.Start")));
    assert_eq!(store.resolve_name(DictionaryKind::Metadata, 100), Some(String::from("Catalog.Items")));
    assert_eq!(store.resolve_name(DictionaryKind::WorkServers, 1), Some(String::from("srv-app-01")));
    assert_eq!(store.resolve_name(DictionaryKind::PrimaryPorts, 1541), Some(String::from("1541")));
    assert_eq!(store.resolve_name(DictionaryKind::SecondaryPorts, 1560), Some(String::from("1560")));
    assert_eq!(store.entries(DictionaryKind::Users).len(), 2);
}

/// A code without an entry is not an error.
#[test]
fn test_ReferenceStore_unknown_code() {
    let (_tmpdir, _path, mut store) = new_store(&reference_text(), BLOCKSZ_DEF);
    store.load_or_refresh().unwrap();
    assert!(store.resolve(DictionaryKind::Users, 99).is_none());
    assert!(store.resolve(DictionaryKind::Computers, 12).is_none());
    assert_eq!(store.resolve_name(DictionaryKind::Users, -1), None);
}

#[test]
fn test_ReferenceStore_unchanged_no_reload() {
    let (_tmpdir, _path, mut store) = new_store(&reference_text(), BLOCKSZ_DEF);
    store.load_or_refresh().unwrap();
    assert_eq!(store.load_or_refresh().unwrap(), 0);
    assert_eq!(store.count_reloads, 1);
    assert_eq!(store.count_refreshes, 0);
}

/// Appended entries are loaded incrementally; existing entries stay.
#[test]
fn test_ReferenceStore_refresh_appended() {
    let (_tmpdir, path, mut store) = new_store(&reference_text(), BLOCKSZ_DEF);
    store.load_or_refresh().unwrap();
    let offset0 = store.last_loaded_offset();
    append_to_file(&path, appended_text(r#"{1,14,"Auditor"}"#).as_bytes());
    set_mtime(&path, 1_600_000_010);
    assert_eq!(store.load_or_refresh().unwrap(), 1);
    assert_eq!(store.count_reloads, 1);
    assert_eq!(store.count_refreshes, 1);
    assert!(store.last_loaded_offset() > offset0);
    assert_eq!(store.resolve_name(DictionaryKind::Users, 14), Some(String::from("Auditor")));
    assert_eq!(store.resolve_name(DictionaryKind::Users, 12), Some(String::from("Admin")));
    assert_eq!(store.len(), REFERENCE_ENTRIES + 1);
}

/// A record cut short is left for the next refresh.
#[test]
fn test_ReferenceStore_refresh_truncated_tail() {
    let (_tmpdir, path, mut store) = new_store(&reference_text(), BLOCKSZ_DEF);
    store.load_or_refresh().unwrap();
    append_to_file(&path, b",\r\n{1,15,\"Half");
    set_mtime(&path, 1_600_000_010);
    assert_eq!(store.load_or_refresh().unwrap(), 0);
    assert!(store.resolve(DictionaryKind::Users, 15).is_none());
    append_to_file(&path, b" Done\"}\r\n");
    set_mtime(&path, 1_600_000_020);
    assert_eq!(store.load_or_refresh().unwrap(), 1);
    assert_eq!(store.resolve_name(DictionaryKind::Users, 15), Some(String::from("Half Done")));
}

/// A replaced file is reloaded from the start.
#[test]
fn test_ReferenceStore_replaced() {
    let (_tmpdir, path, mut store) = new_store(&reference_text(), BLOCKSZ_DEF);
    store.load_or_refresh().unwrap();
    let records = vec![String::from(r#"{1,12,"Renamed"}"#)];
    rewrite_file(&path, file_text(&records).as_bytes());
    set_mtime(&path, 1_600_000_010);
    assert_eq!(store.load_or_refresh().unwrap(), 1);
    assert_eq!(store.count_reloads, 2);
    assert_eq!(store.len(), 1);
    assert_eq!(store.resolve_name(DictionaryKind::Users, 12), Some(String::from("Renamed")));
    assert!(store.resolve(DictionaryKind::Computers, 5).is_none());
}

/// The first entry for a code wins.
#[test]
fn test_ReferenceStore_duplicate_code() {
    let records = vec![String::from(r#"{2,5,"First"}"#), String::from(r#"{2,5,"Second"}"#)];
    let (_tmpdir, _path, mut store) = new_store(&file_text(&records), BLOCKSZ_DEF);
    store.load_or_refresh().unwrap();
    assert_eq!(store.resolve_name(DictionaryKind::Computers, 5), Some(String::from("First")));
    assert_eq!(store.entries(DictionaryKind::Computers).len(), 2);
}

/// Malformed records are skipped, loading continues.
#[test]
fn test_ReferenceStore_malformed_skipped() {
    let data = format!(
        "{}{{1,12,\"Admin\"}},\r\n{{1,x,\"Bad code\"}},\r\n{{2,5 6,\"Bad grammar\"}},\r\n{{2,6,\"SRV02\"}}\r\n",
        file_text(&[])
    );
    let (_tmpdir, _path, mut store) = new_store(&data, BLOCKSZ_DEF);
    assert_eq!(store.load_or_refresh().unwrap(), 2);
    assert_eq!(store.count_skipped, 2);
    assert_eq!(store.resolve_name(DictionaryKind::Computers, 6), Some(String::from("SRV02")));
}

#[test]
fn test_ReferenceStore_missing_file() {
    let tmpdir = create_temp_dir();
    let path: FPath = crate::debug::helpers::path_to_fpath(&tmpdir.path().join(REFERENCE_NAME));
    let mut store = ReferenceStore::new(path, ReferenceLayout::default(), BLOCKSZ_DEF);
    match store.load_or_refresh() {
        Err(Error::IoFault { .. }) => {}
        result => panic!("unexpected {:?}", result),
    }
}

/// The file vanished after a load; the refresh fails, the loaded entries
/// stay.
#[test]
fn test_ReferenceStore_removed_after_load() {
    let (_tmpdir, path, mut store) = new_store(&reference_text(), BLOCKSZ_DEF);
    store.load_or_refresh().unwrap();
    std::fs::remove_file(&path).unwrap();
    assert!(store.load_or_refresh().unwrap_err().is_io());
    assert_eq!(store.len(), REFERENCE_ENTRIES);
}

#[test]
fn test_ReferenceStore_clear() {
    let (_tmpdir, _path, mut store) = new_store(&reference_text(), BLOCKSZ_DEF);
    store.load_or_refresh().unwrap();
    store.clear();
    assert!(store.is_empty());
    assert_eq!(store.last_loaded_offset(), 0);
    assert!(store.fingerprint().is_none());
    assert_eq!(store.load_or_refresh().unwrap(), REFERENCE_ENTRIES as Count);
}
