//! Core library surface for the setlist builder TUI.
//!
//! The sequencer is the heart of it: an ordered list of songs and MC
//! announcements whose song numbers are recomputed after every change. The
//! rest wires that list to a band's song pool in SQLite, a per-user session
//! cache on disk, and a text sheet exporter.
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod pool;
pub mod sequencer;
pub mod session;
pub mod ui;

/// Persistence entry points used by `main.rs` to open the embedded store.
pub use db::ensure_schema;

/// Domain types other layers manipulate.
pub use models::{Band, EntryId, EntryKind, EventDetails, PoolSong, SetlistEntry};

pub use config::Config;
pub use context::SessionContext;
pub use export::{ExportParams, SetlistRenderer, SheetRenderer};
pub use pool::{SongPool, SongStore};
pub use sequencer::{renumber, Sequencer, SetlistSink};
pub use session::{JsonSessionStore, SessionStore};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
