// src/readers/referencestore.rs

//! Implements the [`ReferenceStore`], the in-memory dictionaries of the
//! reference file and their incremental reload.

use std::collections::HashMap;
use std::fmt;

#[allow(unused_imports)]
use ::si_trace_print::{
    def1n,
    def1o,
    def1x,
    defn,
    defo,
    defx,
    defñ,
};

use crate::common::{
    Code,
    Count,
    FPath,
    FileOffset,
    ResultS3,
};
#[allow(unused_imports)]
use crate::debug::printers::{
    de_err,
    de_wrn,
};
use crate::data::field::RawField;
use crate::data::position::{
    Fingerprint,
    FingerprintCheck,
};
use crate::data::reference::{
    DictionaryEntry,
    DictionaryKind,
    ReferenceLayout,
    DICTIONARY_KINDS,
};
use crate::error::{
    Error,
    MalformedReason,
    Result,
};
use crate::readers::blockreader::BlockSz;
use crate::readers::recordreader::RecordReader;

/// Decode one reference record.
///
/// Returns `Ok(None)` for a record whose tag names a dictionary that is not
/// kept.
pub fn decode_entry(
    mut fields: Vec<RawField>,
    layout: &ReferenceLayout,
) -> std::result::Result<Option<DictionaryEntry>, MalformedReason> {
    let tag: i64 = match fields.first().and_then(RawField::as_i64) {
        Some(tag) => tag,
        None if fields.is_empty() => {
            return Err(MalformedReason::FieldCount {
                min: 1,
                max: usize::MAX,
                found: 0,
            });
        }
        None => {
            return Err(MalformedReason::FieldValue {
                index: 0,
                name: "tag",
                detail: format!("expected an integer, found {:?}", fields[0].to_string()),
            });
        }
    };
    let kind = match DictionaryKind::from_tag(tag) {
        Some(kind) => kind,
        None => return Ok(None),
    };
    let dictionary_layout = layout.get(kind);
    fields.remove(0);
    if fields.len() < dictionary_layout.min_fields || fields.len() <= dictionary_layout.code_at {
        return Err(MalformedReason::FieldCount {
            min: 1 + dictionary_layout.min_fields,
            max: usize::MAX,
            found: 1 + fields.len(),
        });
    }
    let code: Code = match fields[dictionary_layout.code_at].as_i64() {
        Some(code) => code,
        None => {
            return Err(MalformedReason::FieldValue {
                index: 1 + dictionary_layout.code_at,
                name: "code",
                detail: format!("expected an integer, found {:?}", fields[dictionary_layout.code_at].to_string()),
            });
        }
    };

    Ok(Some(DictionaryEntry::new(kind, code, fields, dictionary_layout)))
}

/// The dictionaries of one reference file.
///
/// Entries are only ever appended: a refresh reads the bytes appended since
/// the last load. If the file was replaced rather than appended to (it
/// shrank, or its leading bytes changed) every dictionary is reloaded.
///
/// Lookups are exact matches by code. The first entry loaded for a code
/// wins.
pub struct ReferenceStore {
    path: FPath,
    layout: ReferenceLayout,
    blocksz: BlockSz,
    entries: [Vec<DictionaryEntry>; DICTIONARY_KINDS],
    /// code → index into `entries`, per kind
    codes: [HashMap<Code, usize>; DICTIONARY_KINDS],
    /// Offset up to which the file has been consumed. Only grows, except
    /// for a full reload.
    last_loaded_offset: FileOffset,
    /// `Fingerprint` taken at the last successful load.
    fingerprint: Option<Fingerprint>,
    /// `Count` of full loads.
    pub(crate) count_reloads: Count,
    /// `Count` of incremental loads.
    pub(crate) count_refreshes: Count,
    /// `Count` of records skipped; unknown tags or malformed.
    pub(crate) count_skipped: Count,
}

impl fmt::Debug for ReferenceStore {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("ReferenceStore")
            .field("path", &self.path)
            .field("entries", &self.len())
            .field("last_loaded_offset", &self.last_loaded_offset)
            .field("fingerprint", &self.fingerprint)
            .field("reloads", &self.count_reloads)
            .field("refreshes", &self.count_refreshes)
            .field("skipped", &self.count_skipped)
            .finish()
    }
}

impl ReferenceStore {
    /// Create an empty store for the reference file at `path`. Nothing is
    /// read until [`load_or_refresh`](Self::load_or_refresh).
    pub fn new(
        path: FPath,
        layout: ReferenceLayout,
        blocksz: BlockSz,
    ) -> ReferenceStore {
        ReferenceStore {
            path,
            layout,
            blocksz,
            entries: std::array::from_fn(|_| Vec::new()),
            codes: std::array::from_fn(|_| HashMap::new()),
            last_loaded_offset: 0,
            fingerprint: None,
            count_reloads: 0,
            count_refreshes: 0,
            count_skipped: 0,
        }
    }

    pub const fn path(&self) -> &FPath {
        &self.path
    }

    /// The `Fingerprint` of the reference file at the last load; `None`
    /// before the first load.
    pub const fn fingerprint(&self) -> Option<&Fingerprint> {
        self.fingerprint.as_ref()
    }

    pub const fn last_loaded_offset(&self) -> FileOffset {
        self.last_loaded_offset
    }

    /// Bring the dictionaries up to date with the reference file.
    ///
    /// Returns the `Count` of new entries.
    ///
    /// * unchanged since the last load: nothing is read.
    /// * appended to: entries from the bytes after `last_loaded_offset` are
    ///   appended; existing entries are unchanged.
    /// * replaced: every dictionary is reloaded. A failing reload is
    ///   [`Error::StaleReferenceStore`].
    pub fn load_or_refresh(&mut self) -> Result<Count> {
        defn!("({:?})", self.path);
        let check: FingerprintCheck = match &self.fingerprint {
            None => {
                let count = self.reload()?;
                defx!("first load {} entries", count);
                return Ok(count);
            }
            Some(fingerprint) => match fingerprint.check_file(&self.path) {
                Ok(check) => check,
                Err(err) => {
                    defx!("check_file Err {}", err);
                    return Err(Error::io(&self.path, err));
                }
            },
        };
        defo!("{:?}", check);
        let count = match check {
            FingerprintCheck::Same => 0,
            FingerprintCheck::Appended => {
                self.count_refreshes += 1;
                self.load_from(self.last_loaded_offset)?
            }
            FingerprintCheck::Replaced => self.reload_stale()?,
        };
        defx!("return {}", count);

        Ok(count)
    }

    /// Drop every entry and load the reference file from the start.
    pub fn reload(&mut self) -> Result<Count> {
        def1n!("({:?})", self.path);
        self.clear();
        self.count_reloads += 1;
        let count = self.load_from(0);
        def1x!("{:?}", count);

        count
    }

    /// [`reload`](Self::reload) after the file was found replaced.
    pub(crate) fn reload_stale(&mut self) -> Result<Count> {
        match self.reload() {
            Ok(count) => Ok(count),
            Err(Error::IoFault { path, source }) => Err(Error::StaleReferenceStore { path, source }),
            Err(err) => Err(err),
        }
    }

    /// Load entries from the records at and after `offset`.
    ///
    /// A record cut short by the end of file is left for a later refresh.
    fn load_from(
        &mut self,
        offset: FileOffset,
    ) -> Result<Count> {
        defn!("({:?}, {})", self.path, offset);
        // taken before reading; bytes appended meanwhile are found by the next
        // refresh
        let fingerprint = Fingerprint::of_file(&self.path).map_err(|err| Error::io(&self.path, err))?;
        let mut recordreader = RecordReader::new(self.path.clone(), offset, self.blocksz)?;
        let mut count: Count = 0;
        loop {
            match recordreader.next_record() {
                ResultS3::Found(record_at) => {
                    match decode_entry(record_at.record.fields, &self.layout) {
                        Ok(Some(entry)) => {
                            self.insert(entry);
                            count += 1;
                        }
                        Ok(None) => {
                            defo!("skip unknown tag at {}", record_at.offset);
                            self.count_skipped += 1;
                        }
                        Err(_reason) => {
                            de_wrn!("{:?} skip reference record at {}: {}", self.path, record_at.offset, _reason);
                            self.count_skipped += 1;
                        }
                    }
                    self.last_loaded_offset = record_at.end;
                }
                ResultS3::Done => {
                    self.last_loaded_offset = recordreader.offset();
                    break;
                }
                ResultS3::Err(err) if err.is_truncated() => {
                    defo!("truncated tail at {}", recordreader.offset());
                    self.last_loaded_offset = recordreader.offset();
                    break;
                }
                ResultS3::Err(err) if err.is_malformed() => {
                    de_wrn!("{}", err);
                    self.count_skipped += 1;
                    recordreader.skip_malformed()?;
                    self.last_loaded_offset = recordreader.offset();
                }
                ResultS3::Err(err) => {
                    defx!("return Err {}", err);
                    return Err(err);
                }
            }
        }
        self.fingerprint = Some(fingerprint);
        defx!("loaded {} entries, last_loaded_offset {}", count, self.last_loaded_offset);

        Ok(count)
    }

    fn insert(
        &mut self,
        entry: DictionaryEntry,
    ) {
        let index = entry.kind.index();
        let position = self.entries[index].len();
        self.codes[index]
            .entry(entry.code)
            .or_insert(position);
        self.entries[index].push(entry);
    }

    /// Exact-match lookup; `None` for a code without an entry.
    pub fn resolve(
        &self,
        kind: DictionaryKind,
        code: Code,
    ) -> Option<&DictionaryEntry> {
        let index = kind.index();
        let position = self.codes[index].get(&code)?;

        self.entries[index].get(*position)
    }

    /// The display name of the entry for `code`.
    pub fn resolve_name(
        &self,
        kind: DictionaryKind,
        code: Code,
    ) -> Option<String> {
        self.resolve(kind, code)?
            .name()
            .map(String::from)
    }

    /// Every entry of one dictionary in load order.
    pub fn entries(
        &self,
        kind: DictionaryKind,
    ) -> &[DictionaryEntry] {
        &self.entries[kind.index()]
    }

    /// `Count` of entries of every dictionary.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry; the next [`load_or_refresh`] reloads from the start.
    ///
    /// [`load_or_refresh`]: Self::load_or_refresh
    pub fn clear(&mut self) {
        for entries in self.entries.iter_mut() {
            entries.clear();
            entries.shrink_to_fit();
        }
        for codes in self.codes.iter_mut() {
            codes.clear();
            codes.shrink_to_fit();
        }
        self.last_loaded_offset = 0;
        self.fingerprint = None;
    }
}
