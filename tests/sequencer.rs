use std::cell::RefCell;
use std::rc::Rc;

use anyhow::anyhow;
use proptest::prelude::*;
use setlist_builder::session::restore_setlist;
use setlist_builder::{
    renumber, EntryKind, JsonSessionStore, Sequencer, SessionStore, SetlistEntry, SetlistSink,
};

fn snapshot(seq: &Sequencer) -> Vec<(String, Option<u32>)> {
    seq.entries()
        .iter()
        .map(|entry| {
            let order = match entry.kind {
                EntryKind::Song { order } => Some(order),
                EntryKind::Announcement => None,
            };
            (entry.content.clone(), order)
        })
        .collect()
}

fn song(title: &str, order: u32) -> (String, Option<u32>) {
    (title.to_string(), Some(order))
}

fn mc(text: &str) -> (String, Option<u32>) {
    (text.to_string(), None)
}

fn assert_dense(seq: &Sequencer) {
    let orders: Vec<u32> = seq
        .entries()
        .iter()
        .filter_map(|entry| match entry.kind {
            EntryKind::Song { order } => Some(order),
            EntryKind::Announcement => None,
        })
        .collect();
    let expected: Vec<u32> = (1..=orders.len() as u32).collect();
    assert_eq!(orders, expected);
}

/// One user action against the sequencer. Indices are reduced modulo the
/// current length so every generated step lands on a real entry.
#[derive(Debug, Clone)]
enum Op {
    Song(String),
    Mc(String),
    Remove(usize),
    Move(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z ]{0,8}".prop_map(Op::Song),
        "[a-z ]{0,8}".prop_map(Op::Mc),
        any::<usize>().prop_map(Op::Remove),
        (any::<usize>(), any::<usize>()).prop_map(|(from, to)| Op::Move(from, to)),
    ]
}

fn apply(seq: &mut Sequencer, op: &Op) {
    match op {
        Op::Song(title) => {
            seq.append_song(title);
        }
        Op::Mc(text) => {
            seq.append_announcement(text);
        }
        Op::Remove(index) if !seq.is_empty() => {
            let id = seq.entries()[index % seq.len()].id;
            seq.remove(id);
        }
        Op::Move(from, to) if !seq.is_empty() => {
            let source = seq.entries()[from % seq.len()].id;
            let target = seq.entries()[to % seq.len()].id;
            seq.move_entry(source, target);
        }
        _ => {}
    }
}

proptest! {
    #[test]
    fn song_orders_stay_dense_under_any_operations(ops in prop::collection::vec(op(), 0..80)) {
        let mut seq = Sequencer::new();
        for op in &ops {
            apply(&mut seq, op);
            assert_dense(&seq);
        }
    }

    #[test]
    fn renumbering_is_idempotent_from_any_starting_orders(
        ops in prop::collection::vec(op(), 0..40),
        noise in prop::collection::vec(any::<u32>(), 40),
    ) {
        let mut seq = Sequencer::new();
        for op in &ops {
            apply(&mut seq, op);
        }
        let mut entries: Vec<SetlistEntry> = seq.entries().to_vec();
        for (entry, garbage) in entries.iter_mut().zip(&noise) {
            if let EntryKind::Song { order } = &mut entry.kind {
                *order = *garbage;
            }
        }
        renumber(&mut entries);
        let once = entries.clone();
        renumber(&mut entries);
        prop_assert_eq!(&entries, &once);
        prop_assert_eq!(once.as_slice(), seq.entries());
    }

    #[test]
    fn remove_keeps_the_others_in_order(
        ops in prop::collection::vec(op(), 1..40),
        pick in any::<usize>(),
    ) {
        let mut seq = Sequencer::new();
        for op in &ops {
            apply(&mut seq, op);
        }
        prop_assume!(!seq.is_empty());
        let victim = seq.entries()[pick % seq.len()].id;
        let expected: Vec<_> = seq
            .entries()
            .iter()
            .filter(|entry| entry.id != victim)
            .map(|entry| entry.id)
            .collect();
        seq.remove(victim);
        let remaining: Vec<_> = seq.entries().iter().map(|entry| entry.id).collect();
        prop_assert_eq!(remaining, expected);
    }
}

#[test]
fn move_onto_itself_or_a_missing_entry_is_a_no_op() {
    let mut seq = Sequencer::new();
    let a = seq.append_song("A").unwrap();
    let gone = seq.append_announcement("gone").unwrap();
    seq.append_song("B");
    seq.remove(gone.id);
    let before = snapshot(&seq);

    seq.move_entry(a.id, a.id);
    assert_eq!(snapshot(&seq), before);
    seq.move_entry(a.id, gone.id);
    assert_eq!(snapshot(&seq), before);
    seq.move_entry(gone.id, a.id);
    assert_eq!(snapshot(&seq), before);
}

#[test]
fn remove_keeps_relative_order() {
    let mut seq = Sequencer::new();
    let ids: Vec<_> = ["1", "2", "3", "4", "5"]
        .iter()
        .map(|title| seq.append_song(title).unwrap().id)
        .collect();
    let removed = seq.remove(ids[2]).unwrap();
    assert_eq!(removed.content, "3");
    assert_eq!(removed.order(), 3);
    let titles: Vec<_> = seq.entries().iter().map(|e| e.content.as_str()).collect();
    assert_eq!(titles, ["1", "2", "4", "5"]);
    assert!(seq.remove(ids[2]).is_none());
}

#[test]
fn blank_input_is_rejected() {
    let mut seq = Sequencer::new();
    assert!(seq.append_song("").is_none());
    assert!(seq.append_song("   ").is_none());
    assert!(seq.append_announcement("").is_none());
    assert!(seq.is_empty());
}

#[test]
fn drag_and_remove_walkthrough() {
    let mut seq = Sequencer::new();
    let a = seq.append_song("A").unwrap();
    assert_eq!(snapshot(&seq), vec![song("A", 1)]);
    let intro = seq.append_announcement("intro").unwrap();
    let b = seq.append_song("B").unwrap();
    assert_eq!(b.order(), 2);

    // B is lifted out and dropped where A sat; A and the MC shift down.
    seq.move_entry(b.id, a.id);
    assert_eq!(
        snapshot(&seq),
        vec![song("B", 1), song("A", 2), mc("intro")]
    );

    seq.remove(intro.id);
    assert_eq!(snapshot(&seq), vec![song("B", 1), song("A", 2)]);
}

struct FailingSink {
    calls: Rc<RefCell<usize>>,
}

impl SetlistSink for FailingSink {
    fn setlist_changed(&mut self, _entries: &[SetlistEntry]) -> anyhow::Result<()> {
        *self.calls.borrow_mut() += 1;
        Err(anyhow!("disk full"))
    }
}

#[test]
fn sink_failure_never_rolls_back() {
    let calls = Rc::new(RefCell::new(0));
    let mut seq = Sequencer::new().with_sink(Box::new(FailingSink {
        calls: Rc::clone(&calls),
    }));
    seq.append_song("A");
    seq.append_song("B");
    seq.append_song("");
    assert_eq!(seq.len(), 2);
    assert_eq!(*calls.borrow(), 2);
}

#[test]
fn session_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonSessionStore::new(dir.path(), "alice");

    let mut seq = Sequencer::new().with_sink(Box::new(store.clone()));
    seq.append_song("A");
    seq.append_announcement("hello");
    let b = seq.append_song("B").unwrap();
    seq.move_entry(b.id, seq.entries()[0].id);
    let expected = snapshot(&seq);

    let mut restored = Sequencer::new();
    restored.restore(restore_setlist(&store));
    assert_eq!(snapshot(&restored), expected);

    // New ids never collide with restored ones.
    let c = restored.append_song("C").unwrap();
    assert!(restored.entries()[..3].iter().all(|entry| entry.id != c.id));

    let other = JsonSessionStore::new(dir.path(), "bob");
    assert!(other.load_setlist().unwrap().is_empty());
}
