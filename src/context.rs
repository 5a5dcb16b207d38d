//! Per-session context handed to the front-end: who is editing and which
//! band they belong to. The sequencer never sees it.

use anyhow::{anyhow, Result};
use rusqlite::Connection;
use tracing::info;

use crate::db::{create_band, fetch_band, update_band};
use crate::models::Band;

/// Upper bound on band name length, counted in characters.
pub const MAX_BAND_NAME: usize = 100;
/// Name printed when no band profile exists yet.
pub const FALLBACK_BAND_NAME: &str = "No Band Name";

pub struct SessionContext {
    scope: String,
    band: Option<Band>,
}

impl SessionContext {
    pub fn new(scope: impl Into<String>, band: Option<Band>) -> Self {
        Self {
            scope: scope.into(),
            band,
        }
    }

    /// Resolve the band for `scope` from the store.
    pub fn load(conn: &Connection, scope: &str) -> Result<Self> {
        let band = fetch_band(conn, scope)?;
        Ok(Self::new(scope, band))
    }

    pub fn band(&self) -> Option<&Band> {
        self.band.as_ref()
    }

    pub fn band_id(&self) -> Option<i64> {
        self.band.as_ref().map(|band| band.id)
    }

    pub fn band_name(&self) -> &str {
        self.band
            .as_ref()
            .map(|band| band.name.as_str())
            .unwrap_or(FALLBACK_BAND_NAME)
    }

    pub fn logo(&self) -> Option<&str> {
        self.band.as_ref().and_then(|band| band.logo.as_deref())
    }

    /// Create or update the band profile. Returns `true` when the band was
    /// created, which means the song pool has to be attached.
    pub fn save_band(&mut self, conn: &Connection, name: &str, logo: Option<&str>) -> Result<bool> {
        let name = validate_band_name(name)?;
        let logo = logo.map(str::trim).filter(|logo| !logo.is_empty());
        let created = match &self.band {
            Some(band) => {
                update_band(conn, band.id, &name, logo)?;
                false
            }
            None => {
                create_band(conn, &self.scope, &name, logo)?;
                true
            }
        };
        self.band = fetch_band(conn, &self.scope)?;
        info!(scope = %self.scope, created, "band profile saved");
        Ok(created)
    }
}

/// Trim and check a band name.
pub fn validate_band_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("Band name is required."));
    }
    if name.chars().count() > MAX_BAND_NAME {
        return Err(anyhow!(
            "Band name must be at most {MAX_BAND_NAME} characters."
        ));
    }
    Ok(name.to_string())
}
