//! Integration tests for the public catalog routes.

mod common;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use common::{movie_draft, TestHarness};
use marquee_common::{Category, MovieId, MovieRecord};
use marquee_db::queries::movies;

/// Insert `count` records one minute apart, oldest first.
fn seed_catalog(h: &TestHarness, count: usize) -> Vec<MovieRecord> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let mut draft = movie_draft(&format!("Title {i:02}"));
            draft.release_date = NaiveDate::from_ymd_opt(2000 + (count - i) as i32, 1, 1);
            if i % 2 == 1 {
                draft.category = Some(Category::Series);
            }
            let record = draft
                .into_record(MovieId::new(), base + Duration::minutes(i as i64))
                .unwrap();
            movies::insert_movie(&h.conn(), &record).unwrap();
            record
        })
        .collect()
}

fn titles(json: &serde_json::Value) -> Vec<String> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn root_and_health() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "Streaming Movie App API");

    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn list_defaults_newest_first() {
    let (h, addr) = TestHarness::with_server().await;
    seed_catalog(&h, 25);

    let resp = reqwest::get(format!("http://{addr}/api/movies")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();

    assert_eq!(json["totalCount"], 25);
    let page = titles(&json["movies"]);
    assert_eq!(page.len(), 20);
    assert_eq!(page[0], "Title 24");
    assert_eq!(page[19], "Title 05");
}

#[tokio::test]
async fn list_second_page_and_ascending() {
    let (h, addr) = TestHarness::with_server().await;
    seed_catalog(&h, 25);

    let json: serde_json::Value = reqwest::get(format!("http://{addr}/api/movies?page=2"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let page = titles(&json["movies"]);
    assert_eq!(page.len(), 5);
    assert_eq!(page[4], "Title 00");

    let json: serde_json::Value =
        reqwest::get(format!("http://{addr}/api/movies?order=asc&limit=3"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    assert_eq!(titles(&json["movies"]), vec!["Title 00", "Title 01", "Title 02"]);
}

#[tokio::test]
async fn list_sorts_by_release_date() {
    let (h, addr) = TestHarness::with_server().await;
    seed_catalog(&h, 4);

    // Release years run opposite to upload order.
    let json: serde_json::Value =
        reqwest::get(format!("http://{addr}/api/movies?sortBy=releaseDate"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    assert_eq!(
        titles(&json["movies"]),
        vec!["Title 00", "Title 01", "Title 02", "Title 03"]
    );
}

#[tokio::test]
async fn list_filters_by_category() {
    let (h, addr) = TestHarness::with_server().await;
    seed_catalog(&h, 6);

    let json: serde_json::Value = reqwest::get(format!("http://{addr}/api/movies?cat=series"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["totalCount"], 3);
    for movie in json["movies"].as_array().unwrap() {
        assert_eq!(movie["type"], "series");
    }

    // Unknown categories are ignored rather than rejected.
    let json: serde_json::Value = reqwest::get(format!("http://{addr}/api/movies?cat=anime"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["totalCount"], 6);
}

#[tokio::test]
async fn list_bad_paging_values_fall_back() {
    let (h, addr) = TestHarness::with_server().await;
    seed_catalog(&h, 3);

    let resp = reqwest::get(format!("http://{addr}/api/movies?page=abc&limit=0"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["movies"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn get_movie_by_id() {
    let (h, addr) = TestHarness::with_server().await;
    let movie = h.create_movie("Inception");

    let resp = reqwest::get(format!("http://{addr}/api/movies/{}", movie.id))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["id"], movie.id.to_string());
    assert_eq!(json["title"], "Inception");
    assert_eq!(json["movieLinks"][0]["source"], "Server 1");
}

#[tokio::test]
async fn get_movie_missing_and_malformed() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/api/movies/{}", MovieId::new()))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "Movie not found");

    let resp = reqwest::get(format!("http://{addr}/api/movies/not-an-id"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn search_requires_three_characters() {
    let (h, addr) = TestHarness::with_server().await;
    h.create_movie("The Matrix");
    h.create_movie("Matrix Reloaded");
    h.create_movie("Inception");

    let json: serde_json::Value = reqwest::get(format!("http://{addr}/api/movies/search?q=ma"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json, serde_json::json!([]));

    let json: serde_json::Value =
        reqwest::get(format!("http://{addr}/api/movies/search?q=MATRIX"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    assert_eq!(titles(&json), vec!["Matrix Reloaded", "The Matrix"]);
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
    let (h, addr) = TestHarness::with_server().await;
    h.create_movie("100% Wolf");
    h.create_movie("1000 Ways");

    let json: serde_json::Value =
        reqwest::get(format!("http://{addr}/api/movies/search?q=100%25"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    assert_eq!(titles(&json), vec!["100% Wolf"]);
}

#[tokio::test]
async fn suggestions_exclude_current() {
    let (h, addr) = TestHarness::with_server().await;
    let seeded = seed_catalog(&h, 12);
    let current = &seeded[11];

    let json: serde_json::Value = reqwest::get(format!(
        "http://{addr}/api/movies/suggestions?exclude={}",
        current.id
    ))
    .await
    .unwrap()
    .json()
    .await
    .unwrap();
    let list = titles(&json);
    assert_eq!(list.len(), 10);
    assert!(!list.contains(&current.title));
    assert_eq!(list[0], "Title 10");

    let json: serde_json::Value =
        reqwest::get(format!("http://{addr}/api/movies/suggestions?limit=2"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    assert_eq!(titles(&json), vec!["Title 11", "Title 10"]);
}

#[tokio::test]
async fn player_config_is_exposed() {
    let (_h, addr) = TestHarness::with_server().await;

    let json: serde_json::Value = reqwest::get(format!("http://{addr}/api/player/config"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["idle_timeout_ms"], 3000);
    assert_eq!(json["mobile_breakpoint"], 768);
}
