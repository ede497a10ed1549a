// src/readers/cursor.rs

//! Implements the [`CursorManager`], which tracks the resumable position of
//! an [`EventLogReader`] and the [`VisitedIndex`] that makes seeking
//! backward cheaper than rereading from the first record.
//!
//! [`EventLogReader`]: crate::readers::eventlogreader::EventLogReader

use std::collections::BTreeMap;

#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

use crate::common::{
    EventNumber,
    FPath,
    FileOffset,
};
use crate::data::position::CursorState;

/// Default stride of the [`VisitedIndex`].
pub const VISITED_INDEX_STRIDE_DEF: EventNumber = 64;

/// Where reading continues after a given count of returned records.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RecordLocation {
    pub file_path: FPath,
    pub byte_offset: FileOffset,
}

/// Sparse map from logical event number `k` to the [`RecordLocation`] of
/// record `k + 1`, populated while reading.
///
/// Only every `stride`-th event number is kept. Grows for the lifetime of
/// the reader.
#[derive(Clone, Debug)]
pub struct VisitedIndex {
    stride: EventNumber,
    locations: BTreeMap<EventNumber, RecordLocation>,
}

impl VisitedIndex {
    pub fn new(stride: EventNumber) -> VisitedIndex {
        VisitedIndex {
            stride: stride.max(1),
            locations: BTreeMap::new(),
        }
    }

    pub const fn stride(&self) -> EventNumber {
        self.stride
    }

    /// Remember `location` for `event_number` if it falls on the stride.
    pub fn record(
        &mut self,
        event_number: EventNumber,
        location: &RecordLocation,
    ) {
        if event_number % self.stride == 0 && !self.locations.contains_key(&event_number) {
            defñ!("{} → {:?}", event_number, location);
            self.locations
                .insert(event_number, location.clone());
        }
    }

    /// The largest remembered event number `<= event_number`, and its
    /// location.
    pub fn floor(
        &self,
        event_number: EventNumber,
    ) -> Option<(EventNumber, &RecordLocation)> {
        self.locations
            .range(..=event_number)
            .next_back()
            .map(|(k, location)| (*k, location))
    }

    pub fn get(
        &self,
        event_number: EventNumber,
    ) -> Option<&RecordLocation> {
        self.locations.get(&event_number)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn clear(&mut self) {
        self.locations.clear();
    }
}

/// How to reach event number `n` from the current position.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SeekPlan {
    /// Already positioned on `n`.
    Stay,
    /// Read forward from the current position.
    Forward,
    /// Jump to `location`, positioned after `event_number` records, then read
    /// forward.
    FromLocation {
        event_number: EventNumber,
        location: RecordLocation,
    },
    /// Reset to the first record, then read forward.
    FromStart,
}

/// Tracks the [`CursorState`] of a reader as records are returned.
#[derive(Clone, Debug)]
pub struct CursorManager {
    state: CursorState,
    index: VisitedIndex,
}

impl CursorManager {
    pub fn new(stride: EventNumber) -> CursorManager {
        CursorManager {
            state: CursorState::default(),
            index: VisitedIndex::new(stride),
        }
    }

    /// A copy of the current position.
    pub fn current(&self) -> CursorState {
        self.state.clone()
    }

    pub const fn file_path(&self) -> Option<&FPath> {
        self.state.file_path.as_ref()
    }

    pub const fn byte_offset(&self) -> FileOffset {
        self.state.byte_offset
    }

    /// Number of the last record returned; `0` before the first.
    pub const fn logical_event_number(&self) -> EventNumber {
        self.state.logical_event_number
    }

    pub const fn index(&self) -> &VisitedIndex {
        &self.index
    }

    /// Take `state` as the current position. Nothing is read.
    ///
    /// The visited index is dropped if `state` disagrees with it, e.g. a
    /// position saved by a reader of a different file set.
    pub fn restore(
        &mut self,
        state: CursorState,
    ) {
        defn!("({:?})", state);
        if let Some(file_path) = state.file_path.as_ref() {
            let location = RecordLocation {
                file_path: file_path.clone(),
                byte_offset: state.byte_offset,
            };
            match self.index.get(state.logical_event_number) {
                Some(known) if known != &location => {
                    defo!("visited index disagrees, clear");
                    self.index.clear();
                }
                _ => {}
            }
        }
        self.state = state;
        defx!();
    }

    /// A record ending at `next_offset` of the current file was returned.
    pub fn advance(
        &mut self,
        next_offset: FileOffset,
    ) {
        self.state.logical_event_number += 1;
        self.state.byte_offset = next_offset;
        if let Some(file_path) = self.state.file_path.as_ref() {
            let location = RecordLocation {
                file_path: file_path.clone(),
                byte_offset: next_offset,
            };
            self.index
                .record(self.state.logical_event_number, &location);
        }
    }

    /// Bytes up to `offset` of the current file were skipped without
    /// returning a record.
    pub fn skip_to(
        &mut self,
        offset: FileOffset,
    ) {
        self.state.byte_offset = offset;
    }

    /// Continue in file `file_path` at `offset`.
    pub fn set_file(
        &mut self,
        file_path: FPath,
        offset: FileOffset,
    ) {
        defñ!("({:?}, {})", file_path, offset);
        self.state.file_path = Some(file_path);
        self.state.byte_offset = offset;
    }

    /// Continue at `location`, `event_number` records having been returned.
    pub fn jump(
        &mut self,
        event_number: EventNumber,
        location: RecordLocation,
    ) {
        defñ!("({}, {:?})", event_number, location);
        self.state.file_path = Some(location.file_path);
        self.state.byte_offset = location.byte_offset;
        self.state.logical_event_number = event_number;
    }

    /// Back to before the first record of the first file. The visited index
    /// is kept.
    pub fn reset(&mut self) {
        defñ!();
        self.state.file_path = None;
        self.state.byte_offset = 0;
        self.state.logical_event_number = 0;
    }

    /// Drop the visited index, e.g. after records were skipped without
    /// being numbered.
    pub fn clear_index(&mut self) {
        self.index.clear();
    }

    /// Plan how to reach event number `n`.
    ///
    /// Forward seeks read on. Backward seeks resume from the nearest visited
    /// location at or before record `n`, or from the start.
    pub fn plan_seek(
        &self,
        n: EventNumber,
        positioned_on_current: bool,
    ) -> SeekPlan {
        let current = self.state.logical_event_number;
        if n == current && positioned_on_current {
            return SeekPlan::Stay;
        }
        if n > current {
            return SeekPlan::Forward;
        }
        // position after `n - 1` records so the next read returns record `n`
        match self.index.floor(n.saturating_sub(1)) {
            Some((event_number, location)) => SeekPlan::FromLocation {
                event_number,
                location: location.clone(),
            },
            None => SeekPlan::FromStart,
        }
    }
}
