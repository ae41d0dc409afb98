//! Catalog records.
//!
//! A [`MovieRecord`] is the full document for either a movie (playable through
//! `movie_links`) or a series (playable through `seasons`). JSON field names are
//! camelCase to match the web client.
//!
//! [`MovieDraft`] is the write-side shape: every field optional so that the same
//! payload serves creation (validated by [`MovieDraft::into_record`]) and partial
//! updates (merged by [`MovieDraft::apply_to`]).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Category, Error, MovieId, Result};

/// A named source link for a movie (e.g. "Server 1").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieLink {
    pub link: String,
    #[serde(default)]
    pub source: String,
}

/// A subtitle file attached to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleLink {
    pub link: String,
    pub language: String,
}

/// A playable link for an episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoLink {
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub episode_number: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub video_links: Vec<VideoLink>,
    /// Runtime in minutes.
    #[serde(default)]
    pub duration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub season_number: u32,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

/// A stored catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    pub id: MovieId,
    pub title: String,
    /// Poster image URL.
    pub image: String,
    pub description: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub genre: Vec<String>,
    pub cast: Vec<String>,
    pub director: Vec<String>,
    pub imdb_rating: Option<f64>,
    pub release_date: Option<NaiveDate>,
    pub quality: Option<String>,
    /// Runtime in minutes (movies only).
    pub duration: Option<u32>,
    pub movie_links: Vec<MovieLink>,
    pub subtitles: Vec<SubtitleLink>,
    pub seasons: Vec<Season>,
    pub upload_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MovieRecord {
    /// Total number of episodes across all seasons.
    pub fn episode_count(&self) -> usize {
        self.seasons.iter().map(|s| s.episodes.len()).sum()
    }
}

/// Create/update payload. Absent fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDraft {
    pub title: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub category: Option<Category>,
    pub genre: Option<Vec<String>>,
    pub cast: Option<Vec<String>>,
    pub director: Option<Vec<String>>,
    pub imdb_rating: Option<f64>,
    pub release_date: Option<NaiveDate>,
    pub quality: Option<String>,
    pub duration: Option<u32>,
    pub movie_links: Option<Vec<MovieLink>>,
    pub subtitles: Option<Vec<SubtitleLink>>,
    pub seasons: Option<Vec<Season>>,
}

fn required_text(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl MovieDraft {
    /// Build a new record, rejecting drafts without the required fields.
    ///
    /// Required: non-blank `title`, `image` and `description`, plus `genre` and
    /// `movieLinks` present (either may be an empty list; series carry their
    /// links in `seasons`). Category defaults to movie.
    pub fn into_record(self, id: MovieId, now: DateTime<Utc>) -> Result<MovieRecord> {
        let (Some(title), Some(image), Some(description), Some(genre), Some(movie_links)) = (
            required_text(self.title),
            required_text(self.image),
            required_text(self.description),
            self.genre,
            self.movie_links,
        ) else {
            return Err(Error::invalid_input("Missing required fields"));
        };

        validate_rating(self.imdb_rating)?;

        Ok(MovieRecord {
            id,
            title,
            image,
            description,
            category: self.category.unwrap_or(Category::Movie),
            genre,
            cast: self.cast.unwrap_or_default(),
            director: self.director.unwrap_or_default(),
            imdb_rating: self.imdb_rating,
            release_date: self.release_date,
            quality: self.quality,
            duration: self.duration,
            movie_links,
            subtitles: self.subtitles.unwrap_or_default(),
            seasons: self.seasons.unwrap_or_default(),
            upload_date: now,
            updated_at: now,
        })
    }

    /// Merge the supplied fields into an existing record.
    ///
    /// Blank strings for required text fields are rejected so an update can never
    /// produce a record that creation would refuse.
    pub fn apply_to(self, record: &mut MovieRecord, now: DateTime<Utc>) -> Result<()> {
        for (name, value) in [
            ("title", &self.title),
            ("image", &self.image),
            ("description", &self.description),
        ] {
            if matches!(value, Some(s) if s.trim().is_empty()) {
                return Err(Error::invalid_input(format!("Field '{}' cannot be empty", name)));
            }
        }
        validate_rating(self.imdb_rating)?;

        if let Some(v) = self.title {
            record.title = v;
        }
        if let Some(v) = self.image {
            record.image = v;
        }
        if let Some(v) = self.description {
            record.description = v;
        }
        if let Some(v) = self.category {
            record.category = v;
        }
        if let Some(v) = self.genre {
            record.genre = v;
        }
        if let Some(v) = self.cast {
            record.cast = v;
        }
        if let Some(v) = self.director {
            record.director = v;
        }
        if self.imdb_rating.is_some() {
            record.imdb_rating = self.imdb_rating;
        }
        if self.release_date.is_some() {
            record.release_date = self.release_date;
        }
        if self.quality.is_some() {
            record.quality = self.quality;
        }
        if self.duration.is_some() {
            record.duration = self.duration;
        }
        if let Some(v) = self.movie_links {
            record.movie_links = v;
        }
        if let Some(v) = self.subtitles {
            record.subtitles = v;
        }
        if let Some(v) = self.seasons {
            record.seasons = v;
        }
        record.updated_at = now;
        Ok(())
    }
}

fn validate_rating(rating: Option<f64>) -> Result<()> {
    match rating {
        Some(r) if !(0.0..=10.0).contains(&r) => Err(Error::invalid_input(format!(
            "imdbRating must be between 0 and 10, got {}",
            r
        ))),
        _ => Ok(()),
    }
}
