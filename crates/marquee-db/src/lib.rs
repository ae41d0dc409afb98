//! Marquee-DB: database schema, migrations, and query operations
//!
//! This crate stores the streaming catalog and admin accounts in SQLite using
//! rusqlite with r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models for tables without a shared record type
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use marquee_db::pool::{init_pool, get_conn};
//! use marquee_db::queries::admins;
//!
//! let pool = init_pool("/var/lib/marquee/marquee.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let admin = admins::create_admin(&conn, "admin", "$2b$12$hash").unwrap();
//! println!("Created admin: {}", admin.username);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
