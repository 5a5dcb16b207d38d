//! The setlist sequencer: an ordered list of songs and MC announcements with
//! dense per-song ordinals.
//!
//! Every structural mutation funnels through [`Sequencer::commit`], which runs
//! the single renumbering pass and then notifies the attached sink. The sink
//! is told *after* the in-memory list changed; a failing sink is logged and
//! otherwise ignored, so nothing here can fail beyond the documented no-ops.

use std::collections::HashSet;

use anyhow::Result;
use tracing::{debug, warn};

use crate::models::{EntryId, EntryKind, SetlistEntry};

/// Receives the full sequence after each successful mutation.
pub trait SetlistSink {
    fn setlist_changed(&mut self, entries: &[SetlistEntry]) -> Result<()>;
}

/// Walk the sequence once and hand out `1..=N` to songs in list order.
/// Announcements are skipped and keep whatever they carry.
pub fn renumber(entries: &mut [SetlistEntry]) {
    let mut counter = 0u32;
    for entry in entries.iter_mut() {
        if let EntryKind::Song { order } = &mut entry.kind {
            counter += 1;
            *order = counter;
        }
    }
}

#[derive(Default)]
pub struct Sequencer {
    entries: Vec<SetlistEntry>,
    next_id: u64,
    sink: Option<Box<dyn SetlistSink>>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the persistence sink that mirrors every committed change.
    pub fn with_sink(mut self, sink: Box<dyn SetlistSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replace the sequence with entries loaded at session start. Ids are
    /// kept, ordinals recomputed, and fresh ids continue after the highest
    /// restored one. A repeated id is replaced by a fresh one so ids stay
    /// unique. Restoring does not echo back to the sink.
    pub fn restore(&mut self, mut entries: Vec<SetlistEntry>) {
        renumber(&mut entries);
        self.next_id = entries
            .iter()
            .map(|entry| entry.id.raw() + 1)
            .max()
            .unwrap_or(0)
            .max(self.next_id);

        let mut seen = HashSet::with_capacity(entries.len());
        for entry in entries.iter_mut() {
            if !seen.insert(entry.id) {
                let fresh = self.allocate_id();
                warn!(duplicate = %entry.id, %fresh, "restored setlist repeats an entry id");
                entry.id = fresh;
                seen.insert(fresh);
            }
        }
        debug!(count = entries.len(), "restored setlist");
        self.entries = entries;
    }

    pub fn entries(&self) -> &[SetlistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn song_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_song()).count()
    }

    pub fn get(&self, id: EntryId) -> Option<&SetlistEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// Append a song. Returns `None` without touching the list when the
    /// trimmed title is empty.
    pub fn append_song(&mut self, title: &str) -> Option<SetlistEntry> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let order = self.song_count() as u32 + 1;
        let entry = SetlistEntry {
            id: self.allocate_id(),
            kind: EntryKind::Song { order },
            content: title.to_string(),
        };
        self.entries.push(entry.clone());
        self.commit();
        Some(entry)
    }

    /// Append an MC announcement. Empty text is ignored.
    pub fn append_announcement(&mut self, text: &str) -> Option<SetlistEntry> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let entry = SetlistEntry {
            id: self.allocate_id(),
            kind: EntryKind::Announcement,
            content: text.to_string(),
        };
        self.entries.push(entry.clone());
        self.commit();
        Some(entry)
    }

    /// Remove the entry with `id` and return it as it was before removal.
    pub fn remove(&mut self, id: EntryId) -> Option<SetlistEntry> {
        let index = self.position(id)?;
        let removed = self.entries.remove(index);
        self.commit();
        Some(removed)
    }

    /// Take the entry `source` out and reinsert it at the index `target`
    /// occupied. Equal ids or an unknown id leave the list untouched.
    pub fn move_entry(&mut self, source: EntryId, target: EntryId) -> &[SetlistEntry] {
        if source == target {
            return &self.entries;
        }
        let (Some(from), Some(to)) = (self.position(source), self.position(target)) else {
            return &self.entries;
        };
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        self.commit();
        &self.entries
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.entries.clear();
        self.commit();
    }

    fn allocate_id(&mut self) -> EntryId {
        let id = EntryId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn commit(&mut self) {
        renumber(&mut self.entries);
        if let Some(sink) = self.sink.as_mut() {
            if let Err(err) = sink.setlist_changed(&self.entries) {
                warn!("failed to persist setlist: {err:#}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use anyhow::anyhow;

    use super::*;

    #[derive(Clone, Default)]
    struct Recorder {
        snapshots: Rc<RefCell<Vec<Vec<SetlistEntry>>>>,
        fail: bool,
    }

    impl SetlistSink for Recorder {
        fn setlist_changed(&mut self, entries: &[SetlistEntry]) -> Result<()> {
            self.snapshots.borrow_mut().push(entries.to_vec());
            if self.fail {
                Err(anyhow!("disk full"))
            } else {
                Ok(())
            }
        }
    }

    fn song_orders(seq: &Sequencer) -> Vec<u32> {
        seq.entries()
            .iter()
            .filter(|entry| entry.is_song())
            .map(SetlistEntry::order)
            .collect()
    }

    #[test]
    fn append_song_numbers_after_existing_songs() {
        let mut seq = Sequencer::new();
        seq.append_song("A");
        seq.append_announcement("hello");
        let entry = seq.append_song("  B  ").unwrap();
        assert_eq!(entry.kind, EntryKind::Song { order: 2 });
        assert_eq!(entry.content, "B");
    }

    #[test]
    fn empty_input_is_rejected() {
        let mut seq = Sequencer::new();
        assert!(seq.append_song("").is_none());
        assert!(seq.append_song("   ").is_none());
        assert!(seq.append_announcement("").is_none());
        assert!(seq.append_announcement("\t").is_none());
        assert!(seq.is_empty());
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut seq = Sequencer::new();
        seq.append_song("A");
        let before = seq.entries().to_vec();
        assert!(seq.remove(EntryId::new(99)).is_none());
        assert_eq!(seq.entries(), before.as_slice());
    }

    #[test]
    fn remove_renumbers_following_songs() {
        let mut seq = Sequencer::new();
        let a = seq.append_song("A").unwrap();
        seq.append_announcement("mc");
        seq.append_song("B");
        seq.append_song("C");
        let removed = seq.remove(a.id).unwrap();
        assert_eq!(removed.content, "A");
        assert_eq!(removed.order(), 1);
        assert_eq!(song_orders(&seq), vec![1, 2]);
        assert_eq!(seq.entries()[0].kind, EntryKind::Announcement);
    }

    #[test]
    fn move_to_later_position_shifts_others_up() {
        let mut seq = Sequencer::new();
        let a = seq.append_song("A").unwrap();
        seq.append_song("B");
        let c = seq.append_song("C").unwrap();
        seq.move_entry(a.id, c.id);
        let titles: Vec<_> = seq.entries().iter().map(|e| e.content.as_str()).collect();
        assert_eq!(titles, vec!["B", "C", "A"]);
        assert_eq!(song_orders(&seq), vec![1, 2, 3]);
    }

    #[test]
    fn move_noops_leave_everything_unchanged() {
        let mut seq = Sequencer::new();
        let a = seq.append_song("A").unwrap();
        seq.append_announcement("mc");
        seq.append_song("B");
        let before = seq.entries().to_vec();
        seq.move_entry(a.id, a.id);
        assert_eq!(seq.entries(), before.as_slice());
        seq.move_entry(a.id, EntryId::new(404));
        assert_eq!(seq.entries(), before.as_slice());
        seq.move_entry(EntryId::new(404), a.id);
        assert_eq!(seq.entries(), before.as_slice());
    }

    #[test]
    fn renumber_is_idempotent() {
        let mut seq = Sequencer::new();
        seq.append_announcement("open");
        seq.append_song("A");
        seq.append_song("B");
        let mut entries = seq.entries().to_vec();
        renumber(&mut entries);
        let once = entries.clone();
        renumber(&mut entries);
        assert_eq!(entries, once);
        assert_eq!(entries, seq.entries());
    }

    #[test]
    fn sink_sees_every_mutation_but_not_noops() {
        let recorder = Recorder::default();
        let snapshots = recorder.snapshots.clone();
        let mut seq = Sequencer::new().with_sink(Box::new(recorder));
        let a = seq.append_song("A").unwrap();
        seq.append_song("");
        seq.append_announcement("mc");
        seq.remove(EntryId::new(42));
        seq.remove(a.id);
        let snapshots = snapshots.borrow();
        assert_eq!(snapshots.len(), 3);
        assert_eq!(snapshots[2].len(), 1);
    }

    #[test]
    fn failing_sink_does_not_roll_back() {
        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let mut seq = Sequencer::new().with_sink(Box::new(recorder));
        seq.append_song("A");
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn restore_renumbers_and_continues_ids() {
        let mut seq = Sequencer::new();
        seq.restore(vec![
            SetlistEntry {
                id: EntryId::new(5),
                kind: EntryKind::Song { order: 9 },
                content: "A".to_string(),
            },
            SetlistEntry {
                id: EntryId::new(2),
                kind: EntryKind::Song { order: 0 },
                content: "B".to_string(),
            },
        ]);
        assert_eq!(song_orders(&seq), vec![1, 2]);
        let fresh = seq.append_announcement("mc").unwrap();
        assert_eq!(fresh.id, EntryId::new(6));
    }

    #[test]
    fn restore_gives_repeated_ids_fresh_ones() {
        let entry = |id, kind, content: &str| SetlistEntry {
            id: EntryId::new(id),
            kind,
            content: content.to_string(),
        };
        let mut seq = Sequencer::new();
        seq.restore(vec![
            entry(3, EntryKind::Song { order: 1 }, "A"),
            entry(3, EntryKind::Announcement, "intro"),
            entry(4, EntryKind::Song { order: 2 }, "B"),
        ]);
        let ids: Vec<_> = seq.entries().iter().map(|entry| entry.id).collect();
        assert_eq!(ids, vec![EntryId::new(3), EntryId::new(5), EntryId::new(4)]);

        let removed = seq.remove(EntryId::new(3)).unwrap();
        assert_eq!(removed.content, "A");
        assert_eq!(seq.entries()[0].content, "intro");
        assert_eq!(seq.append_song("C").unwrap().id, EntryId::new(6));
    }

    #[test]
    fn clear_empties_the_list() {
        let mut seq = Sequencer::new();
        seq.append_song("A");
        seq.clear();
        assert!(seq.is_empty());
        assert_eq!(seq.song_count(), 0);
    }
}
