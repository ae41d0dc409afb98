//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, a config and the
//! full [`AppContext`]. The [`TestHarness::with_server`] constructor starts
//! Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;

use marquee::config::Config;
use marquee::server::{create_router, AppContext};
use marquee_common::{MovieDraft, MovieLink, MovieRecord};
use marquee_db::pool::{get_conn, init_memory_pool, DbPool, PooledConnection};
use marquee_db::queries::{admins, movies};

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
}

impl TestHarness {
    /// Create a new harness with default configuration and in-memory DB.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration and in-memory DB.
    pub fn with_config(config: Config) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let ctx = AppContext::new(config, db.clone());
        Self { ctx, db }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::with_server_config(Config::default()).await
    }

    /// Start an Axum server with custom config on a random port.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        let harness = Self::with_config(config);
        let app = create_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> PooledConnection {
        get_conn(&self.db).expect("failed to get db connection")
    }

    /// Create an admin with a cheap bcrypt cost.
    pub fn create_admin(&self, username: &str, password: &str) {
        let hash = bcrypt::hash(password, 4).expect("failed to hash password");
        admins::create_admin(&self.conn(), username, &hash).expect("failed to create admin");
    }

    /// Insert a movie with one source link.
    pub fn create_movie(&self, title: &str) -> MovieRecord {
        movies::create_movie(&self.conn(), movie_draft(title)).expect("failed to create movie")
    }
}

/// A complete, valid draft for a movie.
pub fn movie_draft(title: &str) -> MovieDraft {
    let slug = title.to_lowercase().replace(' ', "-");
    MovieDraft {
        title: Some(title.to_string()),
        image: Some(format!("https://img.example/{slug}.jpg")),
        description: Some(format!("{title} description")),
        genre: Some(vec!["Drama".to_string()]),
        movie_links: Some(vec![MovieLink {
            link: format!("https://cdn.example/{slug}.mp4"),
            source: "Server 1".to_string(),
        }]),
        ..Default::default()
    }
}

/// Log in and return the bearer token.
pub async fn login(addr: SocketAddr, username: &str, password: &str) -> String {
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/admin/login"))
        .json(&serde_json::json!({
            "username": username,
            "password": password,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    json["token"].as_str().expect("login returned no token").to_string()
}
