use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, Error as SqlError, ErrorCode};

use crate::models::PoolSong;
use crate::pool::SongStore;

/// Fetch a band's songs in the order they were added, which is the order the
/// pool list shows them.
pub fn fetch_songs(conn: &Connection, band_id: i64) -> Result<Vec<PoolSong>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, title, band_id
             FROM songs
             WHERE band_id = ?1
             ORDER BY created_at, id",
        )
        .context("failed to prepare songs query")?;

    let songs = stmt
        .query_map([band_id], |row| {
            Ok(PoolSong {
                id: row.get(0)?,
                title: row.get(1)?,
                band_id: row.get(2)?,
            })
        })
        .context("failed to iterate songs")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect songs")?;

    Ok(songs)
}

/// Insert a song for a band. We echo the hydrated struct so callers can
/// swap the provisional id without re-querying.
pub fn create_song(conn: &Connection, band_id: i64, title: &str) -> Result<PoolSong> {
    conn.execute(
        "INSERT INTO songs (title, band_id) VALUES (?1, ?2)",
        params![title, band_id],
    )
    .map_err(|err| map_unique_constraint(err, title))
    .context("failed to insert song")?;

    Ok(PoolSong {
        id: conn.last_insert_rowid(),
        title: title.to_string(),
        band_id,
    })
}

/// Delete a band's song by title, the key the pool works with.
pub fn delete_song(conn: &Connection, band_id: i64, title: &str) -> Result<()> {
    let deleted = conn
        .execute(
            "DELETE FROM songs WHERE band_id = ?1 AND title = ?2",
            params![band_id, title],
        )
        .context("failed to delete song")?;

    if deleted == 0 {
        Err(anyhow!("Song not found"))
    } else {
        Ok(())
    }
}

fn map_unique_constraint(err: SqlError, title: &str) -> anyhow::Error {
    if matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    ) {
        anyhow!("Song {title} already exists.")
    } else {
        err.into()
    }
}

impl SongStore for Connection {
    fn list(&self, band_id: i64) -> Result<Vec<PoolSong>> {
        fetch_songs(self, band_id)
    }

    fn add(&self, band_id: i64, title: &str) -> Result<PoolSong> {
        create_song(self, band_id, title)
    }

    fn remove(&self, band_id: i64, title: &str) -> Result<()> {
        delete_song(self, band_id, title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_band, open_in_memory};
    use crate::pool::SongPool;

    #[test]
    fn songs_are_listed_in_insert_order() {
        let conn = open_in_memory().unwrap();
        let band = create_band(&conn, "alice", "Band", None).unwrap();
        create_song(&conn, band.id, "Zebra").unwrap();
        create_song(&conn, band.id, "Apple").unwrap();
        let titles: Vec<_> = fetch_songs(&conn, band.id)
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["Zebra", "Apple"]);
    }

    #[test]
    fn duplicate_title_is_a_friendly_error() {
        let conn = open_in_memory().unwrap();
        let band = create_band(&conn, "alice", "Band", None).unwrap();
        create_song(&conn, band.id, "A").unwrap();
        let err = create_song(&conn, band.id, "A").unwrap_err();
        assert!(format!("{err:#}").contains("already exists"));
    }

    #[test]
    fn delete_missing_song_errors() {
        let conn = open_in_memory().unwrap();
        let band = create_band(&conn, "alice", "Band", None).unwrap();
        assert!(delete_song(&conn, band.id, "nope").is_err());
    }

    #[test]
    fn pool_reconciles_with_a_song_added_elsewhere() {
        let conn = open_in_memory().unwrap();
        let band = create_band(&conn, "alice", "Band", None).unwrap();
        let mut pool = SongPool::load(band.id, &conn);
        create_song(&conn, band.id, "A").unwrap();

        pool.add("A");
        let report = pool.flush(&conn);
        assert_eq!(report.failed, 1);
        pool.refresh(&conn).unwrap();

        let stored = fetch_songs(&conn, band.id).unwrap();
        assert_eq!(pool.list(), stored.as_slice());
        assert!(!pool.list()[0].is_pending());
    }

    #[test]
    fn pool_flushes_into_sqlite() {
        let conn = open_in_memory().unwrap();
        let band = create_band(&conn, "alice", "Band", None).unwrap();
        let mut pool = SongPool::load(band.id, &conn);
        pool.add("Opener");
        pool.add("Closer");
        pool.remove("Opener");
        let report = pool.flush(&conn);
        assert_eq!(report.failed, 0);
        let stored = fetch_songs(&conn, band.id).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, pool.list()[0].id);
    }
}
