//! Persistence module split across logical submodules. The embedded SQLite
//! database stands in for the hosted backend: one band per user scope and
//! that band's song pool.

mod bands;
mod connection;
mod songs;

pub use bands::{create_band, fetch_band, update_band};
pub use connection::{ensure_schema, open_in_memory};
pub use songs::{create_song, delete_song, fetch_songs};
