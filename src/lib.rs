// src/lib.rs

//! _evloglib_ incrementally reads the append-only event log of a
//! transactional application platform: a reference file of dictionaries,
//! `1Cv8.lgf`, plus rotated data files, `*.lgp`, of brace-delimited records.
//!
//! Start with [`EventLogReader`].
//!
//! [`EventLogReader`]: crate::readers::eventlogreader::EventLogReader

pub mod common;
pub mod data;
pub mod debug;
pub mod error;
pub mod readers;
#[cfg(test)]
pub mod tests;
