//! Rust models for tables that have no shared record type.
//!
//! Catalog rows map straight onto [`marquee_common::MovieRecord`]; only the
//! admin table needs a crate-local model because its password hash must never
//! leave the server.

use chrono::{DateTime, Utc};
use marquee_common::AdminId;

/// Admin account model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub id: AdminId,
    pub username: String,
    /// bcrypt hash of the password.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
