//! Session-scoped cache of the setlist being edited and its event details.
//!
//! Files are keyed by the user scope (`setlist_<scope>.json`,
//! `event_<scope>.json`) so several people sharing a machine do not see each
//! other's drafts. Writes go through a temp file and a rename.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::models::{EventDetails, SetlistEntry, StoredEntry};
use crate::sequencer::SetlistSink;

/// Where the current session is mirrored.
pub trait SessionStore {
    fn save_setlist(&self, entries: &[SetlistEntry]) -> Result<()>;
    fn load_setlist(&self) -> Result<Vec<SetlistEntry>>;
    fn save_details(&self, details: &EventDetails) -> Result<()>;
    fn load_details(&self) -> Result<EventDetails>;
}

#[derive(Debug, Clone)]
pub struct JsonSessionStore {
    dir: PathBuf,
    scope: String,
}

impl JsonSessionStore {
    pub fn new(dir: impl Into<PathBuf>, scope: &str) -> Self {
        Self {
            dir: dir.into(),
            scope: scope.to_string(),
        }
    }

    fn setlist_path(&self) -> PathBuf {
        self.dir.join(format!("setlist_{}.json", self.scope))
    }

    fn details_path(&self) -> PathBuf {
        self.dir.join(format!("event_{}.json", self.scope))
    }

    fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir).context("failed to create session directory")?;
        let payload = serde_json::to_vec_pretty(value).context("failed to encode session")?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, payload)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| format!("failed to replace {}", path.display()))?;
        debug!(path = %path.display(), "session saved");
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        let value = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to decode {}", path.display()))?;
        Ok(Some(value))
    }
}

impl SessionStore for JsonSessionStore {
    fn save_setlist(&self, entries: &[SetlistEntry]) -> Result<()> {
        let stored: Vec<StoredEntry> = entries.iter().map(StoredEntry::from).collect();
        self.write_json(&self.setlist_path(), &stored)
    }

    fn load_setlist(&self) -> Result<Vec<SetlistEntry>> {
        let stored: Vec<StoredEntry> = self.read_json(&self.setlist_path())?.unwrap_or_default();
        let total = stored.len();
        let entries: Vec<SetlistEntry> = stored
            .into_iter()
            .filter_map(StoredEntry::into_entry)
            .collect();
        if entries.len() != total {
            warn!(
                dropped = total - entries.len(),
                "skipped unreadable setlist entries"
            );
        }
        Ok(entries)
    }

    fn save_details(&self, details: &EventDetails) -> Result<()> {
        self.write_json(&self.details_path(), details)
    }

    fn load_details(&self) -> Result<EventDetails> {
        Ok(self.read_json(&self.details_path())?.unwrap_or_default())
    }
}

impl SetlistSink for JsonSessionStore {
    fn setlist_changed(&mut self, entries: &[SetlistEntry]) -> Result<()> {
        self.save_setlist(entries)
    }
}

/// Load the cached setlist, treating a broken cache as an empty one.
pub fn restore_setlist(store: &dyn SessionStore) -> Vec<SetlistEntry> {
    store.load_setlist().unwrap_or_else(|err| {
        warn!("failed to restore setlist: {err:#}");
        Vec::new()
    })
}

/// Load cached event details, treating a broken cache as empty.
pub fn restore_details(store: &dyn SessionStore) -> EventDetails {
    store.load_details().unwrap_or_else(|err| {
        warn!("failed to restore event details: {err:#}");
        EventDetails::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::Sequencer;

    #[test]
    fn missing_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path(), "alice");
        assert!(store.load_setlist().unwrap().is_empty());
        assert_eq!(store.load_details().unwrap(), EventDetails::default());
    }

    #[test]
    fn sequencer_mutations_are_mirrored() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path(), "alice");
        let mut seq = Sequencer::new().with_sink(Box::new(store.clone()));
        seq.append_song("A");
        seq.append_announcement("intro");
        let b = seq.append_song("B").unwrap();
        let a = seq.entries()[0].id;
        seq.move_entry(b.id, a);

        let restored = store.load_setlist().unwrap();
        assert_eq!(restored.len(), 3);
        assert_eq!(restored[0].content, "B");
        assert_eq!(restored[1].content, "A");
        assert_eq!(restored[2].content, "intro");

        let mut fresh = Sequencer::new();
        fresh.restore(restored);
        assert_eq!(fresh.entries(), seq.entries());
    }

    #[test]
    fn scopes_do_not_share_files() {
        let dir = tempfile::tempdir().unwrap();
        let alice = JsonSessionStore::new(dir.path(), "alice");
        let bob = JsonSessionStore::new(dir.path(), "bob");
        let mut seq = Sequencer::new().with_sink(Box::new(alice));
        seq.append_song("A");
        assert!(bob.load_setlist().unwrap().is_empty());
    }

    #[test]
    fn corrupt_cache_restores_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("setlist_alice.json"), "{not json").unwrap();
        let store = JsonSessionStore::new(dir.path(), "alice");
        assert!(store.load_setlist().is_err());
        assert!(restore_setlist(&store).is_empty());
    }

    #[test]
    fn cache_with_clashing_suffixes_restores_unique_ids() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("setlist_alice.json"),
            r#"[
                {"id":"song_3","type":"song","content":"A","order":1},
                {"id":"mc_3","type":"mc","content":"intro","order":0},
                {"id":"song_4","type":"song","content":"B","order":2}
            ]"#,
        )
        .unwrap();
        let store = JsonSessionStore::new(dir.path(), "alice");
        let mut seq = Sequencer::new();
        seq.restore(restore_setlist(&store));

        let intro = seq.entries()[1].id;
        assert_ne!(intro, seq.entries()[0].id);
        seq.remove(seq.entries()[0].id);
        assert_eq!(seq.entries()[0].id, intro);
        assert_eq!(seq.entries()[0].content, "intro");
        assert_eq!(seq.entries()[1].order(), 1);
    }

    #[test]
    fn event_details_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path(), "alice");
        let details = EventDetails {
            date: "2026-10-31".to_string(),
            venue: "The Basement".to_string(),
            event_title: "Halloween Bash".to_string(),
        };
        store.save_details(&details).unwrap();
        assert_eq!(restore_details(&store), details);
    }
}
