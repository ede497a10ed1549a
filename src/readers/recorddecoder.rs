// src/readers/recorddecoder.rs

//! Implements the [`RecordDecoder`], mapping the fields of one data file
//! record positionally onto an [`EventRow`].
//!
//! ## Record layout
//!
//! | index | field                     | token                              |
//! |-------|---------------------------|------------------------------------|
//! | 0     | `timestamp`               | `Timestamp` (or quoted)            |
//! | 1     | `transaction_status_code` | `Text`, one of `R` `N` `U` `C`     |
//! | 2     | `transaction_date`        | `Timestamp`, anything else is none |
//! | 3     | `transaction_id`          | `Number`                           |
//! | 4     | `user_code`               | `Number`                           |
//! | 5     | `computer_code`           | `Number`                           |
//! | 6     | `application_code`        | `Number`                           |
//! | 7     | `event_code`              | `Number`                           |
//! | 8     | `severity_code`           | `Text`, one of `I` `W` `E` `N`     |
//! | 9     | `comment`                 | `Text`                             |
//! | 10    | `metadata_code`           | `Number`                           |
//! | 11    | `data_presentation`       | `Text`                             |
//! | 12    | `data`                    | any, often `Nested`                |
//! | 13    | `work_server_code`        | `Number`                           |
//! | 14    | `primary_port_code`       | `Number`                           |
//! | 15    | `secondary_port_code`     | `Number`                           |
//! | 16    | `session`                 | `Number`                           |
//!
//! An empty (`Nil`) code or number field decodes as `0`. Fields beyond
//! index 16, accepted by some [`RecordLayout`]s, are kept in
//! [`EventRow::extra`].

use crate::data::datetime::{
    timestamp_to_string,
    DateTimeL,
};
use crate::data::event::{
    EventRow,
    EVENT_ROW_FIELDS,
};
use crate::data::field::RawField;
use crate::error::MalformedReason;
use crate::readers::tokenizer::tokenize;

use ::bstr::ByteSlice;
#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

/// Accepted count of top-level fields of an event record.
///
/// Producer versions differ in how many trailing fields they write.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RecordLayout {
    pub min_fields: usize,
    pub max_fields: usize,
}

impl RecordLayout {
    /// Exactly the 17 positional fields of an [`EventRow`].
    pub const EXACT: RecordLayout = RecordLayout {
        min_fields: EVENT_ROW_FIELDS,
        max_fields: EVENT_ROW_FIELDS,
    };

    /// Platform 8.3 producers append up to two more fields.
    pub const PLATFORM_V8_3: RecordLayout = RecordLayout {
        min_fields: EVENT_ROW_FIELDS,
        max_fields: EVENT_ROW_FIELDS + 2,
    };

    pub const fn accepts(
        &self,
        count: usize,
    ) -> bool {
        self.min_fields <= count && count <= self.max_fields
    }
}

impl Default for RecordLayout {
    fn default() -> Self {
        RecordLayout::EXACT
    }
}

/// Decodes records into [`EventRow`]s. Stateless apart from its
/// [`RecordLayout`]; decoding the same bytes twice gives the same result.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordDecoder {
    layout: RecordLayout,
}

fn field_value(
    index: usize,
    name: &'static str,
    detail: String,
) -> MalformedReason {
    MalformedReason::FieldValue {
        index,
        name,
        detail,
    }
}

fn decode_timestamp(
    field: &RawField,
    index: usize,
    name: &'static str,
) -> Result<DateTimeL, MalformedReason> {
    match field.as_timestamp() {
        Some(dt) => Ok(dt),
        None => Err(field_value(index, name, format!("expected a timestamp, found {} {:?}", field.kind_str(), field.to_string()))),
    }
}

/// An integer field; `Nil` is `0`.
fn decode_i64(
    field: &RawField,
    index: usize,
    name: &'static str,
) -> Result<i64, MalformedReason> {
    if field.is_nil() {
        return Ok(0);
    }
    match field.as_i64() {
        Some(value) => Ok(value),
        None => Err(field_value(index, name, format!("expected an integer, found {} {:?}", field.kind_str(), field.to_string()))),
    }
}

/// Any field as text; never fails.
fn decode_text(field: RawField) -> String {
    match field {
        RawField::Nil => String::new(),
        RawField::Text(s) => s,
        RawField::Number(d) => d.to_string(),
        RawField::Timestamp(dt) => timestamp_to_string(&dt),
        RawField::Nested(span) => span.as_bytes().to_str_lossy().into_owned(),
    }
}

impl RecordDecoder {
    pub const fn new(layout: RecordLayout) -> RecordDecoder {
        RecordDecoder { layout }
    }

    pub const fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// Tokenize `span`, holding exactly one record, and decode it.
    pub fn decode(
        &self,
        span: &[u8],
    ) -> Result<EventRow, MalformedReason> {
        let fields = tokenize(span)?;

        self.decode_fields(fields)
    }

    /// Decode the top-level fields of one record.
    pub fn decode_fields(
        &self,
        mut fields: Vec<RawField>,
    ) -> Result<EventRow, MalformedReason> {
        defn!("({} fields)", fields.len());
        if !self.layout.accepts(fields.len()) {
            defx!("field count {}", fields.len());
            return Err(MalformedReason::FieldCount {
                min: self.layout.min_fields,
                max: self.layout.max_fields,
                found: fields.len(),
            });
        }
        let extra: Vec<RawField> = fields.split_off(EVENT_ROW_FIELDS.min(fields.len()));
        let found = fields.len();
        let positional: [RawField; EVENT_ROW_FIELDS] = match fields.try_into() {
            Ok(val) => val,
            Err(_) => {
                return Err(MalformedReason::FieldCount {
                    min: EVENT_ROW_FIELDS,
                    max: EVENT_ROW_FIELDS,
                    found,
                });
            }
        };
        let [
            f_timestamp,
            f_transaction_status,
            f_transaction_date,
            f_transaction_id,
            f_user,
            f_computer,
            f_application,
            f_event,
            f_severity,
            f_comment,
            f_metadata,
            f_data_presentation,
            f_data,
            f_work_server,
            f_primary_port,
            f_secondary_port,
            f_session,
        ] = positional;

        let row = EventRow {
            timestamp: decode_timestamp(&f_timestamp, 0, "timestamp")?,
            transaction_status_code: decode_text(f_transaction_status),
            transaction_date: f_transaction_date.as_timestamp(),
            transaction_id: decode_i64(&f_transaction_id, 3, "transaction_id")?,
            user_code: decode_i64(&f_user, 4, "user_code")?,
            computer_code: decode_i64(&f_computer, 5, "computer_code")?,
            application_code: decode_i64(&f_application, 6, "application_code")?,
            event_code: decode_i64(&f_event, 7, "event_code")?,
            severity_code: decode_text(f_severity),
            comment: decode_text(f_comment),
            metadata_code: decode_i64(&f_metadata, 10, "metadata_code")?,
            data_presentation: decode_text(f_data_presentation),
            data: f_data,
            work_server_code: decode_i64(&f_work_server, 13, "work_server_code")?,
            primary_port_code: decode_i64(&f_primary_port, 14, "primary_port_code")?,
            secondary_port_code: decode_i64(&f_secondary_port, 15, "secondary_port_code")?,
            session: decode_i64(&f_session, 16, "session")?,
            extra,
        };
        defx!();

        Ok(row)
    }
}
