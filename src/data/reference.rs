// src/data/reference.rs

//! Implements [`DictionaryEntry`], one interned entity of the reference file,
//! and the per-dictionary field layouts used to decode them.
//!
//! A reference record is `{tag, <layout fields>}`. The tag selects the
//! [`DictionaryKind`]; the [`DictionaryLayout`] of that kind names which of
//! the following fields holds the `code`, the display name and an optional
//! UUID. Layouts differ between producer versions so they are configurable.

use std::fmt;

use crate::common::Code;
use crate::data::field::RawField;

/// The dictionaries of the reference file.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum DictionaryKind {
    Users,
    Computers,
    Applications,
    Events,
    Metadata,
    WorkServers,
    PrimaryPorts,
    SecondaryPorts,
}

/// Count of [`DictionaryKind`] variants.
pub const DICTIONARY_KINDS: usize = 8;

impl DictionaryKind {
    pub const ALL: [DictionaryKind; DICTIONARY_KINDS] = [
        DictionaryKind::Users,
        DictionaryKind::Computers,
        DictionaryKind::Applications,
        DictionaryKind::Events,
        DictionaryKind::Metadata,
        DictionaryKind::WorkServers,
        DictionaryKind::PrimaryPorts,
        DictionaryKind::SecondaryPorts,
    ];

    /// The first field of a reference record of this kind.
    pub const fn tag(&self) -> i64 {
        match self {
            DictionaryKind::Users => 1,
            DictionaryKind::Computers => 2,
            DictionaryKind::Applications => 3,
            DictionaryKind::Events => 4,
            DictionaryKind::Metadata => 5,
            DictionaryKind::WorkServers => 6,
            DictionaryKind::PrimaryPorts => 7,
            DictionaryKind::SecondaryPorts => 8,
        }
    }

    /// `None` for tags of dictionaries this library does not keep.
    pub const fn from_tag(tag: i64) -> Option<DictionaryKind> {
        match tag {
            1 => Some(DictionaryKind::Users),
            2 => Some(DictionaryKind::Computers),
            3 => Some(DictionaryKind::Applications),
            4 => Some(DictionaryKind::Events),
            5 => Some(DictionaryKind::Metadata),
            6 => Some(DictionaryKind::WorkServers),
            7 => Some(DictionaryKind::PrimaryPorts),
            8 => Some(DictionaryKind::SecondaryPorts),
            _ => None,
        }
    }

    /// Dense index in `0..DICTIONARY_KINDS`.
    pub const fn index(&self) -> usize {
        (self.tag() - 1) as usize
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            DictionaryKind::Users => "Users",
            DictionaryKind::Computers => "Computers",
            DictionaryKind::Applications => "Applications",
            DictionaryKind::Events => "Events",
            DictionaryKind::Metadata => "Metadata",
            DictionaryKind::WorkServers => "WorkServers",
            DictionaryKind::PrimaryPorts => "PrimaryPorts",
            DictionaryKind::SecondaryPorts => "SecondaryPorts",
        }
    }
}

impl fmt::Display for DictionaryKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field positions of one dictionary kind, counted from the field after the
/// tag.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DictionaryLayout {
    /// Fewest fields after the tag a record must have.
    pub min_fields: usize,
    pub code_at: usize,
    pub name_at: Option<usize>,
    pub uuid_at: Option<usize>,
}

impl DictionaryLayout {
    /// `[code, name]`
    pub const CODE_NAME: DictionaryLayout = DictionaryLayout {
        min_fields: 2,
        code_at: 0,
        name_at: Some(1),
        uuid_at: None,
    };

    /// `[name, code]`
    pub const NAME_CODE: DictionaryLayout = DictionaryLayout {
        min_fields: 2,
        code_at: 1,
        name_at: Some(0),
        uuid_at: None,
    };

    /// `[uuid, name, code]`
    pub const UUID_NAME_CODE: DictionaryLayout = DictionaryLayout {
        min_fields: 3,
        code_at: 2,
        name_at: Some(1),
        uuid_at: Some(0),
    };

    /// Index within [`DictionaryEntry::fields`] of layout position `at`, the
    /// `code` having been removed.
    const fn entry_index(
        &self,
        at: usize,
    ) -> usize {
        if at > self.code_at {
            at - 1
        } else {
            at
        }
    }
}

/// The [`DictionaryLayout`] of every [`DictionaryKind`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReferenceLayout {
    layouts: [DictionaryLayout; DICTIONARY_KINDS],
}

impl ReferenceLayout {
    /// Code-last layouts as written by platform 8.x producers, e.g.
    /// `{1,bd1e0b8e-4b3e-4ffb-9d39-fc2e0bba7a90,"Admin",12}`.
    pub const fn platform_v8() -> ReferenceLayout {
        ReferenceLayout {
            layouts: [
                DictionaryLayout::UUID_NAME_CODE,
                DictionaryLayout::NAME_CODE,
                DictionaryLayout::NAME_CODE,
                DictionaryLayout::NAME_CODE,
                DictionaryLayout::UUID_NAME_CODE,
                DictionaryLayout::NAME_CODE,
                DictionaryLayout::NAME_CODE,
                DictionaryLayout::NAME_CODE,
            ],
        }
    }

    pub const fn get(
        &self,
        kind: DictionaryKind,
    ) -> &DictionaryLayout {
        &self.layouts[kind.index()]
    }

    pub fn set(
        &mut self,
        kind: DictionaryKind,
        layout: DictionaryLayout,
    ) {
        self.layouts[kind.index()] = layout;
    }
}

/// Code-first layouts: `code` is the first field after the tag, e.g.
/// `{1,12,"Admin"}`.
///
/// * Users `[code, name, uuid]`, the uuid optional
/// * Metadata `[code, uuid, name]`
/// * all others `[code, name]`
impl Default for ReferenceLayout {
    fn default() -> Self {
        let users = DictionaryLayout {
            min_fields: 2,
            code_at: 0,
            name_at: Some(1),
            uuid_at: Some(2),
        };
        let metadata = DictionaryLayout {
            min_fields: 3,
            code_at: 0,
            name_at: Some(2),
            uuid_at: Some(1),
        };
        let mut layout = ReferenceLayout {
            layouts: [DictionaryLayout::CODE_NAME; DICTIONARY_KINDS],
        };
        layout.set(DictionaryKind::Users, users);
        layout.set(DictionaryKind::Metadata, metadata);

        layout
    }
}

/// One entry of a dictionary.
///
/// `fields` holds every field of the reference record except the tag and
/// the `code`, in order. Immutable once loaded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DictionaryEntry {
    pub kind: DictionaryKind,
    pub code: Code,
    pub fields: Vec<RawField>,
    name_at: Option<usize>,
    uuid_at: Option<usize>,
}

impl DictionaryEntry {
    /// Create an entry from the fields of a reference record after its tag.
    ///
    /// Caller has checked `fields.len() >= layout.min_fields` and extracted
    /// `code` from `fields[layout.code_at]`.
    pub fn new(
        kind: DictionaryKind,
        code: Code,
        mut fields: Vec<RawField>,
        layout: &DictionaryLayout,
    ) -> DictionaryEntry {
        if layout.code_at < fields.len() {
            fields.remove(layout.code_at);
        }
        DictionaryEntry {
            kind,
            code,
            fields,
            name_at: layout.name_at.map(|at| layout.entry_index(at)),
            uuid_at: layout.uuid_at.map(|at| layout.entry_index(at)),
        }
    }

    fn field_str(
        &self,
        at: Option<usize>,
    ) -> Option<&str> {
        self.fields.get(at?)?.as_str()
    }

    /// The display name; the port number for port dictionaries.
    pub fn name(&self) -> Option<&str> {
        self.field_str(self.name_at)
    }

    pub fn uuid(&self) -> Option<&str> {
        self.field_str(self.uuid_at)
    }
}

impl fmt::Display for DictionaryEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}#{} {:?}", self.kind, self.code, self.name().unwrap_or_default())
    }
}
