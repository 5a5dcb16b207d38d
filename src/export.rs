//! Export: collect everything the printed sheet needs into one flat value and
//! hand it to a renderer.
//!
//! The shipped [`SheetRenderer`] writes a plain-text sheet laid out like the
//! printed setlist (logo or band name, date, event, venue, then one line per
//! entry). Output goes to a temp file first so a failed write never leaves a
//! half-written sheet behind.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::context::SessionContext;
use crate::error::ExportError;
use crate::models::{EventDetails, SetlistEntry};

/// Everything the renderer needs, detached from live state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportParams {
    pub band_name: String,
    pub logo: Option<String>,
    pub date: String,
    pub venue: String,
    pub event_title: String,
    pub entries: Vec<SetlistEntry>,
}

impl ExportParams {
    pub fn assemble(
        context: &SessionContext,
        details: &EventDetails,
        entries: &[SetlistEntry],
    ) -> Self {
        Self {
            band_name: context.band_name().to_string(),
            logo: context.logo().map(str::to_string),
            date: details.date.trim().to_string(),
            venue: details.venue.trim().to_string(),
            event_title: details.event_title.trim().to_string(),
            entries: entries.to_vec(),
        }
    }

    /// Required-field check before rendering.
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.entries.is_empty() {
            return Err(ExportError::EmptySetlist);
        }
        if self.date.is_empty() {
            return Err(ExportError::MissingField("date"));
        }
        if self.event_title.is_empty() {
            return Err(ExportError::MissingField("event title"));
        }
        if self.venue.is_empty() {
            return Err(ExportError::MissingField("venue"));
        }
        Ok(())
    }
}

/// Opaque handle to a rendered sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
}

pub trait SetlistRenderer {
    fn render(&self, params: &ExportParams) -> Result<Artifact, ExportError>;
}

pub struct SheetRenderer {
    out_dir: PathBuf,
}

impl SheetRenderer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    fn file_name(params: &ExportParams) -> String {
        let stem: String = format!("{} {}", params.date, params.event_title)
            .chars()
            .map(|ch| if ch.is_alphanumeric() { ch } else { '-' })
            .collect();
        let stem = stem.trim_matches('-');
        if stem.is_empty() {
            "setlist.txt".to_string()
        } else {
            format!("setlist-{stem}.txt")
        }
    }
}

/// Lay out the sheet line by line.
pub fn sheet_lines(params: &ExportParams) -> Vec<String> {
    let header = match &params.logo {
        Some(logo) => format!("[logo: {logo}]"),
        None => params.band_name.clone(),
    };
    let mut lines = vec![
        header,
        params.date.clone(),
        params.event_title.clone(),
        params.venue.clone(),
        String::new(),
    ];
    lines.extend(params.entries.iter().map(SetlistEntry::display_line));
    lines
}

fn write_atomically(path: &Path, contents: &str) -> Result<(), ExportError> {
    let tmp = path.with_extension("txt.tmp");
    let wrap = |source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };
    fs::write(&tmp, contents).map_err(wrap)?;
    fs::rename(&tmp, path).map_err(|source| {
        let _ = fs::remove_file(&tmp);
        ExportError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}

impl SetlistRenderer for SheetRenderer {
    fn render(&self, params: &ExportParams) -> Result<Artifact, ExportError> {
        params.validate()?;
        fs::create_dir_all(&self.out_dir).map_err(|source| ExportError::Write {
            path: self.out_dir.clone(),
            source,
        })?;
        let path = self.out_dir.join(Self::file_name(params));
        let mut contents = sheet_lines(params).join("\n");
        contents.push('\n');
        write_atomically(&path, &contents)?;
        info!(path = %path.display(), entries = params.entries.len(), "setlist exported");
        Ok(Artifact { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::Sequencer;

    fn params() -> ExportParams {
        let mut seq = Sequencer::new();
        seq.append_song("Opener");
        seq.append_announcement("thanks for coming");
        seq.append_song("Closer");
        let details = EventDetails {
            date: "2026-10-31".to_string(),
            venue: "The Basement".to_string(),
            event_title: "Halloween Bash".to_string(),
        };
        ExportParams::assemble(&SessionContext::new("alice", None), &details, seq.entries())
    }

    #[test]
    fn sheet_uses_band_name_without_logo() {
        let lines = sheet_lines(&params());
        assert_eq!(lines[0], "No Band Name");
        assert_eq!(lines[2], "Halloween Bash");
        assert_eq!(
            &lines[5..],
            &["1. Opener", "-- MC: thanks for coming --", "2. Closer"]
        );
    }

    #[test]
    fn missing_venue_is_reported() {
        let mut params = params();
        params.venue.clear();
        assert!(matches!(
            params.validate(),
            Err(ExportError::MissingField("venue"))
        ));
    }

    #[test]
    fn empty_setlist_is_not_exported() {
        let mut params = params();
        params.entries.clear();
        let dir = tempfile::tempdir().unwrap();
        let err = SheetRenderer::new(dir.path()).render(&params).unwrap_err();
        assert!(matches!(err, ExportError::EmptySetlist));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn render_writes_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = SheetRenderer::new(dir.path()).render(&params()).unwrap();
        assert_eq!(
            artifact.path.file_name().unwrap(),
            "setlist-2026-10-31-Halloween-Bash.txt"
        );
        let written = fs::read_to_string(&artifact.path).unwrap();
        assert!(written.ends_with("2. Closer\n"));
    }
}
