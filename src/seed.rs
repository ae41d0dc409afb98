//! Bulk import of catalog records from JSON.
//!
//! The file holds an array of catalog drafts in the same shape the
//! `POST /api/movies` endpoint accepts. Entries that fail validation are
//! skipped and reported; the rest are imported.

use std::path::Path;

use anyhow::{Context, Result};
use marquee_common::{Error, MovieDraft};
use marquee_db::queries::movies;
use rusqlite::Connection;

/// Outcome of an import.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub imported: usize,
    /// `(index in the input, reason)` for every rejected entry.
    pub skipped: Vec<(usize, String)>,
}

/// Parse a JSON array of drafts.
pub fn parse_drafts(json: &str) -> Result<Vec<MovieDraft>> {
    serde_json::from_str(json).context("Seed file must be a JSON array of catalog records")
}

/// Import drafts one by one. Database failures abort; validation failures skip.
pub fn import_drafts(conn: &Connection, drafts: Vec<MovieDraft>) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for (index, draft) in drafts.into_iter().enumerate() {
        let title = draft.title.clone().unwrap_or_default();
        match movies::create_movie(conn, draft) {
            Ok(movie) => {
                tracing::debug!(movie_id = %movie.id, title = %movie.title, "Seeded record");
                report.imported += 1;
            }
            Err(Error::InvalidInput(reason)) => {
                tracing::warn!(index, title = %title, reason = %reason, "Skipping seed entry");
                report.skipped.push((index, reason));
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to import seed entry {}", index))
            }
        }
    }

    tracing::info!(
        imported = report.imported,
        skipped = report.skipped.len(),
        "Seed import finished"
    );
    Ok(report)
}

/// Read `path` and import its records.
pub fn import_file(conn: &Connection, path: &Path) -> Result<SeedReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file: {:?}", path))?;
    let drafts = parse_drafts(&content)?;
    import_drafts(conn, drafts)
}
