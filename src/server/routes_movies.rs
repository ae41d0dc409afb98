//! Catalog API routes.
//!
//! Reads are public. Writes are registered separately by [`admin_routes`] so the
//! caller can put them behind the admin session guard.

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use marquee_common::{
    resolve_source, Category, MediaSource, MovieDraft, MovieId, MovieRecord, SortKey, SortOrder,
    SourceSelection,
};
use marquee_db::{
    pool::get_conn,
    queries::movies::{self, MovieFilter, Pagination, SortOptions},
};
use marquee_player::PlayerConfig;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::error::AppError;
use super::AppContext;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;
const SEARCH_MIN_CHARS: usize = 3;
const SEARCH_LIMIT: u32 = 20;
const DEFAULT_SUGGESTIONS: u32 = 10;

/// Public catalog routes.
pub fn catalog_routes() -> Router<AppContext> {
    Router::new()
        .route("/movies", get(list_movies))
        .route("/movies/search", get(search_movies))
        .route("/movies/suggestions", get(suggest_movies))
        .route("/movies/:id", get(get_movie))
        .route("/movies/:id/source", get(get_source))
        .route("/player/config", get(player_config))
}

/// Catalog writes. Callers layer the admin guard on top.
pub fn admin_routes() -> Router<AppContext> {
    Router::new()
        .route("/movies", post(create_movie))
        .route("/movies/:id", put(update_movie).delete(delete_movie))
}

// ============================================================================
// Request/Response types
// ============================================================================

/// Raw listing parameters. Parsed leniently so bad values fall back to
/// defaults instead of failing the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMoviesQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub cat: Option<String>,
}

impl ListMoviesQuery {
    fn filter(&self) -> MovieFilter {
        MovieFilter {
            category: self.cat.as_deref().and_then(Category::parse_lenient),
        }
    }

    fn sort(&self) -> SortOptions {
        SortOptions {
            key: self
                .sort_by
                .as_deref()
                .map(SortKey::parse_lenient)
                .unwrap_or_default(),
            order: self
                .order
                .as_deref()
                .map(SortOrder::parse_lenient)
                .unwrap_or_default(),
        }
    }

    fn pagination(&self) -> Pagination {
        let page = positive_or(self.page.as_deref(), DEFAULT_PAGE);
        let limit = positive_or(self.limit.as_deref(), DEFAULT_LIMIT).min(MAX_LIMIT);
        Pagination::page(page, limit)
    }
}

/// Parse a positive integer, falling back to `default` for anything else.
fn positive_or(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieListResponse {
    pub movies: Vec<MovieRecord>,
    pub total_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    pub exclude: Option<String>,
    pub limit: Option<String>,
}

fn parse_movie_id(raw: &str) -> Result<MovieId, AppError> {
    MovieId::from_str(raw.trim()).map_err(|_| AppError::bad_request("Invalid movie id"))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/movies
async fn list_movies(
    State(ctx): State<AppContext>,
    Query(params): Query<ListMoviesQuery>,
) -> Result<Json<MovieListResponse>, AppError> {
    let filter = params.filter();
    let sort = params.sort();
    let pagination = params.pagination();

    let conn = get_conn(&ctx.db)?;
    let movies = movies::list_movies(&conn, &filter, &sort, &pagination)?;
    let total_count = movies::count_movies(&conn, &filter)?;

    Ok(Json(MovieListResponse {
        movies,
        total_count,
    }))
}

/// GET /api/movies/search
async fn search_movies(
    State(ctx): State<AppContext>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<MovieRecord>>, AppError> {
    let term = params.q.trim();
    if term.chars().count() < SEARCH_MIN_CHARS {
        return Ok(Json(Vec::new()));
    }

    let conn = get_conn(&ctx.db)?;
    let results = movies::search_movies(&conn, term, SEARCH_LIMIT)?;
    tracing::debug!(term, results = results.len(), "Catalog search");
    Ok(Json(results))
}

/// GET /api/movies/suggestions
async fn suggest_movies(
    State(ctx): State<AppContext>,
    Query(params): Query<SuggestionsQuery>,
) -> Result<Json<Vec<MovieRecord>>, AppError> {
    let exclude = match params.exclude.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(raw) => Some(parse_movie_id(raw)?),
        None => None,
    };
    let limit = positive_or(params.limit.as_deref(), DEFAULT_SUGGESTIONS).min(MAX_LIMIT);

    let conn = get_conn(&ctx.db)?;
    Ok(Json(movies::suggest_movies(&conn, exclude, limit)?))
}

/// GET /api/movies/:id
async fn get_movie(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<MovieRecord>, AppError> {
    let id = parse_movie_id(&id)?;
    let conn = get_conn(&ctx.db)?;
    movies::get_movie(&conn, id)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Movie"))
}

/// GET /api/movies/:id/source
async fn get_source(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Query(selection): Query<SourceSelection>,
) -> Result<Response, AppError> {
    let id = parse_movie_id(&id)?;
    let conn = get_conn(&ctx.db)?;
    let movie = movies::get_movie(&conn, id)?.ok_or_else(|| AppError::not_found("Movie"))?;

    match resolve_source(&movie, &selection) {
        Some(source) => Ok(Json::<MediaSource>(source).into_response()),
        None => {
            tracing::debug!(movie_id = %id, ?selection, "Selection has no playable link");
            // The player renders disabled on this response.
            Ok((
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "No playable source" })),
            )
                .into_response())
        }
    }
}

/// POST /api/movies
async fn create_movie(
    State(ctx): State<AppContext>,
    Json(draft): Json<MovieDraft>,
) -> Result<impl IntoResponse, AppError> {
    let conn = get_conn(&ctx.db)?;
    let movie = movies::create_movie(&conn, draft)?;
    tracing::info!(movie_id = %movie.id, title = %movie.title, "Catalog record created");
    Ok((StatusCode::CREATED, Json(movie)))
}

/// PUT /api/movies/:id
async fn update_movie(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(draft): Json<MovieDraft>,
) -> Result<Json<MovieRecord>, AppError> {
    let id = parse_movie_id(&id)?;
    let conn = get_conn(&ctx.db)?;
    let movie = movies::update_movie(&conn, id, draft)?.ok_or_else(|| AppError::not_found("Movie"))?;
    tracing::info!(movie_id = %id, "Catalog record updated");
    Ok(Json(movie))
}

/// DELETE /api/movies/:id
async fn delete_movie(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_movie_id(&id)?;
    let conn = get_conn(&ctx.db)?;
    if movies::delete_movie(&conn, id)? {
        tracing::info!(movie_id = %id, "Catalog record deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Movie"))
    }
}

/// GET /api/player/config
async fn player_config(State(ctx): State<AppContext>) -> Json<PlayerConfig> {
    Json(ctx.config.player.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>) -> ListMoviesQuery {
        ListMoviesQuery {
            page: page.map(String::from),
            limit: limit.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_pagination_defaults() {
        assert_eq!(query(None, None).pagination(), Pagination::page(1, 20));
    }

    #[test]
    fn test_pagination_falls_back_on_bad_values() {
        assert_eq!(query(Some("0"), Some("0")).pagination(), Pagination::page(1, 20));
        assert_eq!(query(Some("abc"), Some("-5")).pagination(), Pagination::page(1, 20));
    }

    #[test]
    fn test_limit_is_capped() {
        let p = query(Some("2"), Some("500")).pagination();
        assert_eq!(p.limit, 100);
        assert_eq!(p.offset, 100);
    }

    #[test]
    fn test_sort_and_filter_parse_leniently() {
        let q = ListMoviesQuery {
            sort_by: Some("releaseDate".into()),
            order: Some("asc".into()),
            cat: Some("documentary".into()),
            ..Default::default()
        };
        let sort = q.sort();
        assert_eq!(sort.key, SortKey::ReleaseDate);
        assert_eq!(sort.order, SortOrder::Asc);
        assert!(q.filter().category.is_none());

        let q = ListMoviesQuery {
            cat: Some("series".into()),
            ..Default::default()
        };
        assert_eq!(q.filter().category, Some(Category::Series));
        assert_eq!(q.sort().key, SortKey::UploadDate);
        assert_eq!(q.sort().order, SortOrder::Desc);
    }

    #[test]
    fn test_parse_movie_id() {
        assert!(parse_movie_id("not-a-uuid").is_err());
        let id = MovieId::new();
        assert_eq!(parse_movie_id(&id.to_string()).unwrap(), id);
    }
}
