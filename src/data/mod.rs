// src/data/mod.rs

//! The `data` module is specialized data containers for tokens
//! ([`RawField`]s), decoded events ([`EventRow`]s), dictionary entries
//! ([`DictionaryEntry`]s) and reader positions ([`CursorState`]s).
//!
//! ## Definitions of data
//!
//! ### Record
//!
//! A "record" is a sequence of bytes in a file that:
//!
//! * begins with an opening brace `{`, after any record separators
//!   (whitespace, commas, a byte order mark).
//! * ends with the matching closing brace `}`.
//!
//! A record is tokenized into [`RawField`]s by the [token scanner].
//!
//! ### Event
//!
//! An "event" is a record of a data file (`*.lgp`). Its fields are
//! positional; an event is represented by an [`EventRow`].
//!
//! ### Dictionary entry
//!
//! A "dictionary entry" is a record of the reference file (`1Cv8.lgf`).
//! Its first field is a tag naming the dictionary. An entry is represented
//! by a [`DictionaryEntry`].
//!
//! _The "Readers" are not rust "Readers"; "_Reader_" structs do not implement
//! the trait [`Read`]. These are "readers" in an informal sense._
//!
//! Also see [_Overview of readers_].
//!
//! [_Overview of readers_]: crate::readers
//! [token scanner]: crate::readers::tokenizer
//! [`RawField`]: crate::data::field::RawField
//! [`EventRow`]: crate::data::event::EventRow
//! [`DictionaryEntry`]: crate::data::reference::DictionaryEntry
//! [`CursorState`]: crate::data::position::CursorState
//! [`Read`]: std::io::Read

pub mod datetime;
pub mod event;
pub mod field;
pub mod position;
pub mod reference;
