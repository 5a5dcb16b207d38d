//! The band's song pool: an optimistic local list mirrored to the store
//! through a write-behind queue.
//!
//! Adds and removals show up in [`SongPool::list`] immediately. The matching
//! store writes are queued and only happen when [`SongPool::flush`] runs,
//! which the front-end does once per event-loop tick. A failed write is
//! logged and dropped; the caller then reloads the list with
//! [`SongPool::refresh`] so it matches the store again.

use std::collections::VecDeque;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::models::PoolSong;

/// The authoritative song storage for a band.
pub trait SongStore {
    fn list(&self, band_id: i64) -> Result<Vec<PoolSong>>;
    fn add(&self, band_id: i64, title: &str) -> Result<PoolSong>;
    fn remove(&self, band_id: i64, title: &str) -> Result<()>;
}

/// A store write waiting to be flushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolWrite {
    Add { title: String },
    Remove { title: String },
}

/// Outcome of one flush, mostly for the status line and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    pub written: usize,
    pub failed: usize,
}

pub struct SongPool {
    band_id: i64,
    songs: Vec<PoolSong>,
    pending: VecDeque<PoolWrite>,
    next_provisional: i64,
}

impl SongPool {
    pub fn new(band_id: i64, songs: Vec<PoolSong>) -> Self {
        Self {
            band_id,
            songs,
            pending: VecDeque::new(),
            next_provisional: -1,
        }
    }

    /// Load the pool from the store. A failing store yields an empty pool so
    /// the session stays usable.
    pub fn load(band_id: i64, store: &dyn SongStore) -> Self {
        let songs = store.list(band_id).unwrap_or_else(|err| {
            warn!("failed to load songs for band {band_id}: {err:#}");
            Vec::new()
        });
        Self::new(band_id, songs)
    }

    pub fn band_id(&self) -> i64 {
        self.band_id
    }

    pub fn list(&self) -> &[PoolSong] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn contains(&self, title: &str) -> bool {
        self.songs.iter().any(|song| song.title == title)
    }

    /// Add a song locally and queue the store write. Blank titles and exact
    /// duplicates are ignored.
    pub fn add(&mut self, title: &str) -> Option<PoolSong> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        if self.contains(title) {
            warn!("song already in pool: {title}");
            return None;
        }

        let song = PoolSong {
            id: self.next_provisional,
            title: title.to_string(),
            band_id: self.band_id,
        };
        self.next_provisional -= 1;
        self.songs.push(song.clone());
        self.pending.push_back(PoolWrite::Add {
            title: song.title.clone(),
        });
        Some(song)
    }

    /// Remove every local song with `title` and queue the store delete.
    pub fn remove(&mut self, title: &str) -> bool {
        let before = self.songs.len();
        self.songs.retain(|song| song.title != title);
        if self.songs.len() == before {
            return false;
        }
        self.pending.push_back(PoolWrite::Remove {
            title: title.to_string(),
        });
        true
    }

    /// Drain the queue into `store`, in the order the writes were made.
    pub fn flush(&mut self, store: &dyn SongStore) -> FlushReport {
        let mut report = FlushReport::default();
        while let Some(write) = self.pending.pop_front() {
            let outcome = match &write {
                PoolWrite::Add { title } => store.add(self.band_id, title).map(|stored| {
                    if let Some(local) = self.songs.iter_mut().find(|s| s.title == stored.title) {
                        local.id = stored.id;
                    }
                }),
                PoolWrite::Remove { title } => store.remove(self.band_id, title),
            };
            match outcome {
                Ok(()) => {
                    debug!(?write, "song pool write stored");
                    report.written += 1;
                }
                Err(err) => {
                    warn!(?write, "song pool write failed: {err:#}");
                    report.failed += 1;
                }
            }
        }
        if report.written + report.failed > 0 {
            info!(
                written = report.written,
                failed = report.failed,
                "flushed song pool"
            );
        }
        report
    }

    /// Replace the local list with the store's view. Queued writes are
    /// flushed first so they are not lost.
    pub fn refresh(&mut self, store: &dyn SongStore) -> Result<()> {
        self.flush(store);
        self.songs = store.list(self.band_id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use anyhow::anyhow;

    use super::*;

    #[derive(Default)]
    struct MemoryStore {
        rows: RefCell<Vec<PoolSong>>,
        fail_adds: bool,
    }

    impl SongStore for MemoryStore {
        fn list(&self, band_id: i64) -> Result<Vec<PoolSong>> {
            Ok(self
                .rows
                .borrow()
                .iter()
                .filter(|s| s.band_id == band_id)
                .cloned()
                .collect())
        }

        fn add(&self, band_id: i64, title: &str) -> Result<PoolSong> {
            if self.fail_adds {
                return Err(anyhow!("offline"));
            }
            let mut rows = self.rows.borrow_mut();
            let song = PoolSong {
                id: rows.len() as i64 + 100,
                title: title.to_string(),
                band_id,
            };
            rows.push(song.clone());
            Ok(song)
        }

        fn remove(&self, band_id: i64, title: &str) -> Result<()> {
            self.rows
                .borrow_mut()
                .retain(|s| !(s.band_id == band_id && s.title == title));
            Ok(())
        }
    }

    #[test]
    fn add_is_visible_before_flush() {
        let mut pool = SongPool::new(1, Vec::new());
        let song = pool.add(" Intro ").unwrap();
        assert!(song.is_pending());
        assert_eq!(pool.list()[0].title, "Intro");
        assert_eq!(pool.pending(), 1);
    }

    #[test]
    fn duplicates_and_blanks_are_ignored() {
        let mut pool = SongPool::new(1, Vec::new());
        pool.add("A");
        assert!(pool.add("A").is_none());
        assert!(pool.add("  ").is_none());
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.pending(), 1);
    }

    #[test]
    fn flush_replaces_provisional_ids() {
        let store = MemoryStore::default();
        let mut pool = SongPool::new(1, Vec::new());
        pool.add("A");
        pool.add("B");
        let report = pool.flush(&store);
        assert_eq!(report, FlushReport { written: 2, failed: 0 });
        assert!(pool.list().iter().all(|s| !s.is_pending()));
        assert_eq!(store.list(1).unwrap().len(), 2);
    }

    #[test]
    fn failed_writes_keep_local_state() {
        let store = MemoryStore {
            fail_adds: true,
            ..MemoryStore::default()
        };
        let mut pool = SongPool::new(1, Vec::new());
        pool.add("A");
        let report = pool.flush(&store);
        assert_eq!(report.failed, 1);
        assert_eq!(pool.pending(), 0);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn refresh_after_failed_add_drops_the_provisional_song() {
        let store = MemoryStore {
            fail_adds: true,
            ..MemoryStore::default()
        };
        let mut pool = SongPool::load(1, &store);
        pool.add("A");
        assert_eq!(pool.flush(&store).failed, 1);
        pool.refresh(&store).unwrap();
        assert!(pool.is_empty());
        assert_eq!(pool.pending(), 0);
    }

    #[test]
    fn remove_then_flush_deletes_from_store() {
        let store = MemoryStore::default();
        let mut pool = SongPool::load(1, &store);
        pool.add("A");
        pool.flush(&store);
        assert!(pool.remove("A"));
        assert!(!pool.remove("A"));
        pool.refresh(&store).unwrap();
        assert!(pool.is_empty());
    }
}
