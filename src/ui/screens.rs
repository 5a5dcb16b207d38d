use crate::models::{EntryId, PoolSong, SetlistEntry};

/// Clamp `selected + offset` into `0..len`.
fn shifted(selected: usize, offset: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let new = selected as isize + offset;
    new.clamp(0, len as isize - 1) as usize
}

/// Left pane: the band's song pool with an optional search filter.
#[derive(Default)]
pub(crate) struct PoolPane {
    pub(crate) filtered_songs: Vec<PoolSong>,
    pub(crate) filter: Option<String>,
    pub(crate) selected: usize,
}

impl PoolPane {
    /// Rebuild the visible list from the pool's current contents.
    pub(crate) fn sync(&mut self, songs: &[PoolSong]) {
        self.filtered_songs = match &self.filter {
            Some(q) if !q.trim().is_empty() => {
                let ql = q.to_lowercase();
                songs
                    .iter()
                    .filter(|s| s.title.to_lowercase().contains(&ql))
                    .cloned()
                    .collect()
            }
            _ => songs.to_vec(),
        };
        self.ensure_in_bounds();
    }

    pub(crate) fn set_filter(&mut self, filter: Option<String>, songs: &[PoolSong]) {
        self.filter = filter;
        self.sync(songs);
    }

    pub(crate) fn current_song(&self) -> Option<&PoolSong> {
        self.filtered_songs.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = shifted(self.selected, offset, self.filtered_songs.len());
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.filtered_songs.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.filtered_songs.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.filtered_songs.len() {
            self.selected = self.filtered_songs.len() - 1;
        }
    }
}

/// Right pane: cursor over the setlist plus the entry currently picked up.
///
/// While something is picked up the cursor marks the drop target; the
/// setlist itself is not touched until the drop.
#[derive(Default)]
pub(crate) struct SetlistPane {
    pub(crate) selected: usize,
    pub(crate) picked: Option<EntryId>,
}

impl SetlistPane {
    pub(crate) fn current_id(&self, entries: &[SetlistEntry]) -> Option<EntryId> {
        entries.get(self.selected).map(|entry| entry.id)
    }

    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        self.selected = shifted(self.selected, offset, len);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    pub(crate) fn is_dragging(&self) -> bool {
        self.picked.is_some()
    }

    /// Start a drag from the entry under the cursor.
    pub(crate) fn pick_up(&mut self, entries: &[SetlistEntry]) -> Option<EntryId> {
        self.picked = self.current_id(entries);
        self.picked
    }

    /// Finish the drag: returns `(source, target)` for the sequencer.
    pub(crate) fn drop_target(&mut self, entries: &[SetlistEntry]) -> Option<(EntryId, EntryId)> {
        let source = self.picked.take()?;
        let target = self.current_id(entries)?;
        Some((source, target))
    }

    pub(crate) fn cancel_drag(&mut self) -> bool {
        self.picked.take().is_some()
    }

    /// Keep the cursor on `id` after the list changed under it.
    pub(crate) fn follow(&mut self, id: EntryId, entries: &[SetlistEntry]) {
        if let Some(index) = entries.iter().position(|entry| entry.id == id) {
            self.selected = index;
        }
    }

    pub(crate) fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

/// Read-only preview of the sheet that export would write.
pub(crate) struct PreviewScreen {
    pub(crate) lines: Vec<String>,
    pub(crate) scroll: u16,
}

impl PreviewScreen {
    pub(crate) fn new(lines: Vec<String>) -> Self {
        Self { lines, scroll: 0 }
    }

    pub(crate) fn scroll_by(&mut self, delta: isize) {
        let max = self.lines.len().saturating_sub(1) as isize;
        self.scroll = (self.scroll as isize + delta).clamp(0, max) as u16;
    }
}
