use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, Error as SqlError, ErrorCode, OptionalExtension};

use crate::models::Band;

/// Look up the band owned by `scope`. Most scopes have exactly one band; a
/// fresh scope has none until the profile form is saved.
pub fn fetch_band(conn: &Connection, scope: &str) -> Result<Option<Band>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, logo, user_scope, created_at, updated_at
             FROM bands WHERE user_scope = ?1",
        )
        .context("failed to prepare band query")?;

    stmt.query_row([scope], |row| {
        Ok(Band {
            id: row.get(0)?,
            name: row.get(1)?,
            logo: row.get(2)?,
            user_scope: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    })
    .optional()
    .context("failed to load band")
}

/// Insert the band for `scope` and return it freshly read back so the
/// timestamps come from the database.
pub fn create_band(conn: &Connection, scope: &str, name: &str, logo: Option<&str>) -> Result<Band> {
    conn.execute(
        "INSERT INTO bands (name, logo, user_scope) VALUES (?1, ?2, ?3)",
        params![name, logo, scope],
    )
    .map_err(|err| map_unique_constraint(err, scope))
    .context("failed to insert band")?;

    fetch_band(conn, scope)?.ok_or_else(|| anyhow!("Band vanished after insert"))
}

/// Update name and logo. Surfaces an error when nothing was updated so the
/// UI can say so instead of silently continuing.
pub fn update_band(conn: &Connection, id: i64, name: &str, logo: Option<&str>) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE bands SET name = ?1, logo = ?2, updated_at = CURRENT_TIMESTAMP WHERE id = ?3",
            params![name, logo, id],
        )
        .context("failed to update band")?;

    if updated == 0 {
        Err(anyhow!("Band not found"))
    } else {
        Ok(())
    }
}

fn map_unique_constraint(err: SqlError, scope: &str) -> anyhow::Error {
    if matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    ) {
        anyhow!("A band already exists for {scope}.")
    } else {
        err.into()
    }
}
