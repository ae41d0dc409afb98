//! Catalog queries.
//!
//! Movies and series share one table. List-valued fields (genre, cast,
//! director, links, subtitles, seasons) are stored as JSON text and decoded on
//! read; a malformed JSON column is reported as a row conversion error rather
//! than silently dropped.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use marquee_common::{Category, Error, MovieDraft, MovieId, MovieRecord, Result, SortKey, SortOrder};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use serde::de::DeserializeOwned;

use super::{conversion_error, parse_timestamp};

const MOVIE_COLUMNS: &str = "id, title, image, description, category, genre, cast_members, director,
     imdb_rating, release_date, quality, duration_minutes, movie_links, subtitles, seasons,
     upload_date, updated_at";

/// Filter options for catalog listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovieFilter {
    /// Restrict to movies or series.
    pub category: Option<Category>,
}

/// Sort options for catalog listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortOptions {
    pub key: SortKey,
    pub order: SortOrder,
}

/// Offset/limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u32,
    pub limit: u32,
}

impl Pagination {
    /// Window for a 1-based page number. Page 0 is treated as page 1.
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            offset: page.saturating_sub(1).saturating_mul(limit),
            limit,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::page(1, 20)
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    // Fixed width keeps lexical and chronological order identical.
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn json_column<T: DeserializeOwned>(row: &rusqlite::Row, column: usize) -> rusqlite::Result<T> {
    let text: String = row.get(column)?;
    serde_json::from_str(&text).map_err(|e| conversion_error(column, e))
}

fn parse_movie_row(row: &rusqlite::Row) -> rusqlite::Result<MovieRecord> {
    let id: String = row.get(0)?;
    let category: String = row.get(4)?;
    let release_date: Option<String> = row.get(9)?;
    let upload_date: String = row.get(15)?;
    let updated_at: String = row.get(16)?;

    Ok(MovieRecord {
        id: id.parse().map_err(|e| conversion_error(0, e))?,
        title: row.get(1)?,
        image: row.get(2)?,
        description: row.get(3)?,
        category: category.parse().map_err(|e: String| conversion_error(4, e))?,
        genre: json_column(row, 5)?,
        cast: json_column(row, 6)?,
        director: json_column(row, 7)?,
        imdb_rating: row.get(8)?,
        release_date: release_date
            .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
            .transpose()
            .map_err(|e| conversion_error(9, e))?,
        quality: row.get(10)?,
        duration: row.get(11)?,
        movie_links: json_column(row, 12)?,
        subtitles: json_column(row, 13)?,
        seasons: json_column(row, 14)?,
        upload_date: parse_timestamp(15, &upload_date)?,
        updated_at: parse_timestamp(16, &updated_at)?,
    })
}

fn write_movie(conn: &Connection, sql: &str, movie: &MovieRecord) -> Result<usize> {
    conn.execute(
        sql,
        rusqlite::named_params! {
            ":id": movie.id.to_string(),
            ":title": &movie.title,
            ":image": &movie.image,
            ":description": &movie.description,
            ":category": movie.category.to_string(),
            ":genre": to_json(&movie.genre)?,
            ":cast_members": to_json(&movie.cast)?,
            ":director": to_json(&movie.director)?,
            ":imdb_rating": movie.imdb_rating,
            ":release_date": movie.release_date.map(|d| d.format("%Y-%m-%d").to_string()),
            ":quality": &movie.quality,
            ":duration_minutes": movie.duration,
            ":movie_links": to_json(&movie.movie_links)?,
            ":subtitles": to_json(&movie.subtitles)?,
            ":seasons": to_json(&movie.seasons)?,
            ":upload_date": format_timestamp(&movie.upload_date),
            ":updated_at": format_timestamp(&movie.updated_at),
        },
    )
    .map_err(|e| Error::database(e.to_string()))
}

/// Validate a draft and store it as a new catalog record.
///
/// # Returns
///
/// * `Ok(MovieRecord)` - The stored record with a fresh ID and timestamps
/// * `Err(Error::InvalidInput)` - If required fields are missing
pub fn create_movie(conn: &Connection, draft: MovieDraft) -> Result<MovieRecord> {
    let now = Utc::now().trunc_subsecs(6);
    let movie = draft.into_record(MovieId::new(), now)?;
    insert_movie(conn, &movie)?;

    tracing::debug!(movie_id = %movie.id, title = %movie.title, "Created catalog record");
    Ok(movie)
}

/// Store an already-built record as-is, keeping its ID and timestamps.
pub fn insert_movie(conn: &Connection, movie: &MovieRecord) -> Result<()> {
    write_movie(
        conn,
        "INSERT INTO movies (id, title, image, description, category, genre, cast_members,
             director, imdb_rating, release_date, quality, duration_minutes, movie_links,
             subtitles, seasons, upload_date, updated_at)
         VALUES (:id, :title, :image, :description, :category, :genre, :cast_members,
             :director, :imdb_rating, :release_date, :quality, :duration_minutes, :movie_links,
             :subtitles, :seasons, :upload_date, :updated_at)",
        movie,
    )
    .map(|_| ())
}

/// Get a catalog record by ID.
///
/// # Returns
///
/// * `Ok(Some(MovieRecord))` - The record if found
/// * `Ok(None)` - If no record has that ID
/// * `Err(Error)` - If a database error occurs
pub fn get_movie(conn: &Connection, id: MovieId) -> Result<Option<MovieRecord>> {
    let result = conn.query_row(
        &format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = :id"),
        rusqlite::named_params! { ":id": id.to_string() },
        parse_movie_row,
    );

    match result {
        Ok(movie) => Ok(Some(movie)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Merge the supplied fields of `draft` into an existing record.
///
/// Returns `Ok(None)` when the record does not exist. `upload_date` is
/// preserved and `updated_at` is bumped.
pub fn update_movie(
    conn: &Connection,
    id: MovieId,
    draft: MovieDraft,
) -> Result<Option<MovieRecord>> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    let Some(mut movie) = get_movie(&tx, id)? else {
        return Ok(None);
    };
    draft.apply_to(&mut movie, Utc::now().trunc_subsecs(6))?;

    write_movie(
        &tx,
        "UPDATE movies SET title = :title, image = :image, description = :description,
             category = :category, genre = :genre, cast_members = :cast_members,
             director = :director, imdb_rating = :imdb_rating, release_date = :release_date,
             quality = :quality, duration_minutes = :duration_minutes,
             movie_links = :movie_links, subtitles = :subtitles, seasons = :seasons,
             upload_date = :upload_date, updated_at = :updated_at
         WHERE id = :id",
        &movie,
    )?;
    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    tracing::debug!(movie_id = %id, "Updated catalog record");
    Ok(Some(movie))
}

/// Delete a catalog record.
///
/// Returns `Ok(false)` when no record with that ID existed.
pub fn delete_movie(conn: &Connection, id: MovieId) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "DELETE FROM movies WHERE id = :id",
            rusqlite::named_params! { ":id": id.to_string() },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows_affected > 0)
}

fn where_clause(filter: &MovieFilter) -> &'static str {
    if filter.category.is_some() {
        " WHERE category = :category"
    } else {
        ""
    }
}

/// List catalog records with filtering, sorting and pagination.
///
/// Ties on the sort key fall back to upload date and then ID so pages never
/// overlap.
pub fn list_movies(
    conn: &Connection,
    filter: &MovieFilter,
    sort: &SortOptions,
    pagination: &Pagination,
) -> Result<Vec<MovieRecord>> {
    let mut query = format!("SELECT {MOVIE_COLUMNS} FROM movies");
    query.push_str(where_clause(filter));

    let direction = if sort.order.is_descending() {
        "DESC"
    } else {
        "ASC"
    };
    match sort.key {
        SortKey::UploadDate => {
            query.push_str(&format!(" ORDER BY upload_date {direction}, id {direction}"))
        }
        SortKey::ReleaseDate => query.push_str(&format!(
            " ORDER BY release_date {direction}, upload_date {direction}, id {direction}"
        )),
    }
    query.push_str(" LIMIT :limit OFFSET :offset");

    let mut stmt = conn
        .prepare(&query)
        .map_err(|e| Error::database(e.to_string()))?;

    let category = filter.category.map(|c| c.to_string());
    let mut params: Vec<(&str, &dyn rusqlite::ToSql)> = vec![
        (":limit", &pagination.limit),
        (":offset", &pagination.offset),
    ];
    if let Some(ref category) = category {
        params.push((":category", category));
    }

    let movies = stmt
        .query_map(&*params, parse_movie_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(movies)
}

/// Count catalog records matching `filter`.
pub fn count_movies(conn: &Connection, filter: &MovieFilter) -> Result<u64> {
    let query = format!("SELECT COUNT(*) FROM movies{}", where_clause(filter));

    let category = filter.category.map(|c| c.to_string());
    let mut params: Vec<(&str, &dyn rusqlite::ToSql)> = vec![];
    if let Some(ref category) = category {
        params.push((":category", category));
    }

    let count: i64 = conn
        .query_row(&query, &*params, |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(count as u64)
}

/// Escape LIKE wildcards so user input matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Registers `fold_case(text)`, a Unicode-aware lowercase for search.
///
/// SQLite's own `LIKE` only folds ASCII letters.
fn register_fold_case(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )
}

/// Case-insensitive title substring search.
///
/// Case folding covers non-ASCII letters as well, so "éclair" finds "Éclair".
pub fn search_movies(conn: &Connection, term: &str, limit: u32) -> Result<Vec<MovieRecord>> {
    register_fold_case(conn).map_err(|e| Error::database(e.to_string()))?;

    let mut stmt = conn
        .prepare(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies
             WHERE fold_case(title) LIKE :pattern ESCAPE '\\'
             ORDER BY title COLLATE NOCASE ASC
             LIMIT :limit"
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let movies = stmt
        .query_map(
            rusqlite::named_params! {
                ":pattern": like_pattern(&term.to_lowercase()),
                ":limit": limit,
            },
            parse_movie_row,
        )
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(movies)
}

/// Most recently uploaded records, optionally excluding one.
pub fn suggest_movies(
    conn: &Connection,
    exclude: Option<MovieId>,
    limit: u32,
) -> Result<Vec<MovieRecord>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies
             WHERE (:exclude IS NULL OR id != :exclude)
             ORDER BY upload_date DESC, id DESC
             LIMIT :limit"
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let movies = stmt
        .query_map(
            rusqlite::named_params! {
                ":exclude": exclude.map(|id| id.to_string()),
                ":limit": limit,
            },
            parse_movie_row,
        )
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(movies)
}
