// src/tests/recorddecoder_tests.rs

//! tests for `recorddecoder.rs`

#![allow(non_snake_case)]

use crate::data::datetime::timestamp_from_str;
use crate::data::field::RawField;
use crate::error::MalformedReason;
use crate::readers::recorddecoder::{
    RecordDecoder,
    RecordLayout,
};
use crate::tests::common::{
    event_record,
    EVENT_RECORD_EXAMPLE,
};

use ::test_case::test_case;

#[test]
fn test_RecordDecoder_example() {
    let row = RecordDecoder::default()
        .decode(EVENT_RECORD_EXAMPLE.as_bytes())
        .unwrap();
    let dt = timestamp_from_str("20230101120000").unwrap();
    assert_eq!(row.timestamp, dt);
    assert_eq!(row.transaction_status_code, "N");
    assert_eq!(row.transaction_date, Some(dt));
    assert_eq!(row.transaction_id, 0);
    assert_eq!(row.user_code, 12);
    assert_eq!(row.computer_code, 5);
    assert_eq!(row.application_code, 3);
    assert_eq!(row.event_code, 7);
    assert_eq!(row.severity_code, "I");
    assert_eq!(row.comment, "Logged in");
    assert_eq!(row.metadata_code, 100);
    assert_eq!(row.data_presentation, "");
    assert_eq!(row.data, RawField::text(""));
    assert_eq!(row.work_server_code, 0);
    assert_eq!(row.primary_port_code, 0);
    assert_eq!(row.secondary_port_code, 0);
    assert_eq!(row.session, 1);
    assert!(row.extra.is_empty());
}

#[test]
fn test_RecordDecoder_bare_fields() {
    let record = event_record("20230101120001", 13, 7, "E", "said \"no\"");
    let row = RecordDecoder::default()
        .decode(record.as_bytes())
        .unwrap();
    assert_eq!(row.timestamp, timestamp_from_str("20230101120001").unwrap());
    assert_eq!(row.user_code, 13);
    assert_eq!(row.comment, "said \"no\"");
    assert_eq!(row.work_server_code, 1);
    assert_eq!(row.primary_port_code, 1541);
    assert_eq!(row.secondary_port_code, 1560);
    let data = row.data.as_nested().unwrap().fields().unwrap();
    assert_eq!(data, vec![RawField::text("S"), RawField::text("said \"no\"")]);
}

#[test]
fn test_RecordDecoder_nil_codes_are_zero() {
    let row = RecordDecoder::default()
        .decode(b"{20230101120000,,,,,,,,,,,,,,,,}")
        .unwrap();
    assert_eq!(row.user_code, 0);
    assert_eq!(row.session, 0);
    assert_eq!(row.transaction_date, None);
    assert_eq!(row.comment, "");
    assert_eq!(row.data, RawField::Nil);
}

#[test_case(b"{20230101120000,,,,,,,,,,,,,,,}", 16; "16 fields")]
#[test_case(b"{20230101120000,,,,,,,,,,,,,,,,,}", 18; "18 fields")]
#[test_case(b"{}", 0; "no fields")]
fn test_RecordDecoder_field_count(
    data: &[u8],
    found: usize,
) {
    assert_eq!(
        RecordDecoder::default().decode(data),
        Err(MalformedReason::FieldCount {
            min: 17,
            max: 17,
            found
        })
    );
}

#[test]
fn test_RecordDecoder_platform_v8_3_extra() {
    let decoder = RecordDecoder::new(RecordLayout::PLATFORM_V8_3);
    let row = decoder
        .decode(b"{20230101120000,,,,,,,,,,,,,,,,,7,{0}}")
        .unwrap();
    assert_eq!(row.extra.len(), 2);
    assert_eq!(row.extra[0].as_i64(), Some(7));
    assert!(decoder
        .decode(b"{20230101120000,,,,,,,,,,,,,,,,,,,}")
        .is_err());
    assert!(RecordLayout::PLATFORM_V8_3.accepts(17));
    assert!(!RecordLayout::EXACT.accepts(18));
}

#[test_case(b"{x,,,,,,,,,,,,,,,,}", 0, "timestamp"; "timestamp not a date")]
#[test_case(b"{20230101120000,,,,abc,,,,,,,,,,,,}", 4, "user_code"; "user code text")]
#[test_case(b"{20230101120000,,,,1.5,,,,,,,,,,,,}", 4, "user_code"; "user code fraction")]
#[test_case(b"{20230101120000,,,,,,,,,,,,,,,,x}", 16, "session"; "session text")]
fn test_RecordDecoder_field_value(
    data: &[u8],
    index: usize,
    name: &str,
) {
    match RecordDecoder::default().decode(data) {
        Ok(row) => panic!("unexpected {:?}", row),
        Err(MalformedReason::FieldValue {
            index: index_,
            name: name_,
            ..
        }) => {
            assert_eq!(index_, index);
            assert_eq!(name_, name);
        }
        Err(err) => panic!("unexpected {:?}", err),
    }
}

#[test]
fn test_RecordDecoder_grammar_error() {
    assert_eq!(RecordDecoder::default().decode(b"{1,\"a"), Err(MalformedReason::UnterminatedString));
}
