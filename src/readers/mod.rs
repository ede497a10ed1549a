// src/readers/mod.rs

//! "Readers" for _evloglib_.
//!
//! ## Overview of readers
//!
//! * An [`EventLogReader`] drives a [`RecordReader`] to derive [`EventRow`s],
//!   and a [`ReferenceStore`] to resolve their dictionary codes.
//! * A `RecordReader` drives a [`BlockReader`] and the [token scanner] to
//!   derive records.
//! * A `BlockReader` only handles `u8` bytes.
//!
//! <br/>
//!
//! * A [`FileSet`] finds and orders the data files of a log directory.
//! * A [`CursorManager`] tracks the resumable position and the visited index
//!   used by seeking.
//! * [`ReaderHooks`] are caller callbacks invoked at fixed points of reading.
//!
//! <br/>
//!
//! Also see [_Definitions of data_].
//!
//! _These are not rust "Readers"; these structs do not implement the trait
//! [`Read`]. These are "readers" in an informal sense._
//!
//! [_Definitions of data_]: crate::data
//! [`Read`]: std::io::Read
//! [`EventRow`s]: crate::data::event::EventRow
//! [`BlockReader`]: crate::readers::blockreader::BlockReader
//! [`RecordReader`]: crate::readers::recordreader::RecordReader
//! [`EventLogReader`]: crate::readers::eventlogreader::EventLogReader
//! [`ReferenceStore`]: crate::readers::referencestore::ReferenceStore
//! [`FileSet`]: crate::readers::fileset::FileSet
//! [`CursorManager`]: crate::readers::cursor::CursorManager
//! [`ReaderHooks`]: crate::readers::hooks::ReaderHooks
//! [token scanner]: crate::readers::tokenizer

pub mod blockreader;
pub mod cursor;
pub mod eventlogreader;
pub mod fileset;
pub mod hooks;
pub mod recorddecoder;
pub mod recordreader;
pub mod referencestore;
pub mod tokenizer;
