//! Domain models shared by the sequencer, the song pool, the SQLite store and
//! the TUI. These types stay light-weight data holders; the sequencer owns the
//! only interesting invariant (song ordinals), everything else is plumbing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a setlist entry. It never changes while the entry
/// moves around, which is what lets the pick-up/drop gesture refer to entries
/// by id instead of by a position that may have shifted in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl EntryId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub(crate) fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Variant tag of a setlist entry. Songs carry their 1-based ordinal among
/// songs only; announcements never consume a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Song { order: u32 },
    Announcement,
}

/// One row of the setlist: either a song or a spoken MC segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetlistEntry {
    pub id: EntryId,
    pub kind: EntryKind,
    /// Song title or announcement text, already trimmed.
    pub content: String,
}

impl SetlistEntry {
    pub fn is_song(&self) -> bool {
        matches!(self.kind, EntryKind::Song { .. })
    }

    /// Ordinal among songs, `0` for announcements.
    pub fn order(&self) -> u32 {
        match self.kind {
            EntryKind::Song { order } => order,
            EntryKind::Announcement => 0,
        }
    }

    /// Line shown in the setlist pane and on the exported sheet.
    pub fn display_line(&self) -> String {
        match self.kind {
            EntryKind::Song { order } => format!("{order}. {}", self.content),
            EntryKind::Announcement => format!("-- MC: {} --", self.content),
        }
    }
}

/// Flat record used by the session cache. The shape follows the JSON the web
/// front-end kept in session storage (`type` is `song` or `mc`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct StoredEntry {
    pub(crate) id: String,
    #[serde(rename = "type")]
    pub(crate) kind: StoredKind,
    pub(crate) content: String,
    #[serde(default)]
    pub(crate) order: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum StoredKind {
    Song,
    Mc,
}

impl From<&SetlistEntry> for StoredEntry {
    fn from(entry: &SetlistEntry) -> Self {
        let (prefix, kind) = if entry.is_song() {
            ("song", StoredKind::Song)
        } else {
            ("mc", StoredKind::Mc)
        };
        Self {
            id: format!("{prefix}_{}", entry.id.raw()),
            kind,
            content: entry.content.clone(),
            order: entry.order(),
        }
    }
}

impl StoredEntry {
    /// Convert back into a live entry. Ids that do not carry a numeric suffix
    /// (hand-edited caches) are rejected; the stored `order` is discarded
    /// because the sequencer renumbers everything it restores.
    pub(crate) fn into_entry(self) -> Option<SetlistEntry> {
        let raw = self
            .id
            .rsplit('_')
            .next()
            .and_then(|suffix| suffix.parse::<u64>().ok())?;
        let kind = match self.kind {
            StoredKind::Song => EntryKind::Song { order: 0 },
            StoredKind::Mc => EntryKind::Announcement,
        };
        let content = self.content.trim().to_string();
        if content.is_empty() {
            return None;
        }
        Some(SetlistEntry {
            id: EntryId::new(raw),
            kind,
            content,
        })
    }
}

/// A song the band can pick from when building a setlist. While a write is
/// still queued for the store the id is provisional (negative).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSong {
    pub id: i64,
    pub title: String,
    pub band_id: i64,
}

impl PoolSong {
    pub fn is_pending(&self) -> bool {
        self.id < 0
    }
}

/// Band profile owned by one user scope. The logo is an opaque reference
/// (path or URL) that only the exported sheet ever looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Band {
    pub id: i64,
    pub name: String,
    pub logo: Option<String>,
    pub user_scope: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Show information printed above the setlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub event_title: String,
}
