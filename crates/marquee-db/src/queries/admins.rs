//! Admin account queries.

use chrono::Utc;
use marquee_common::{AdminId, Error, Result};
use rusqlite::Connection;

use super::{conversion_error, parse_timestamp};
use crate::models::Admin;

const ADMIN_COLUMNS: &str = "id, username, password_hash, created_at";

fn parse_admin_row(row: &rusqlite::Row) -> rusqlite::Result<Admin> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(3)?;

    Ok(Admin {
        id: id.parse().map_err(|e| conversion_error(0, e))?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: parse_timestamp(3, &created_at)?,
    })
}

/// Create a new admin account.
///
/// # Arguments
///
/// * `conn` - Database connection
/// * `username` - Unique login name
/// * `password_hash` - bcrypt hash of the password
///
/// # Returns
///
/// * `Ok(Admin)` - The created admin
/// * `Err(Error::InvalidInput)` - If the username is blank or already taken
pub fn create_admin(conn: &Connection, username: &str, password_hash: &str) -> Result<Admin> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::invalid_input("Username cannot be empty"));
    }

    let admin = Admin {
        id: AdminId::new(),
        username: username.to_string(),
        password_hash: password_hash.to_string(),
        created_at: Utc::now(),
    };

    conn.execute(
        "INSERT INTO admins (id, username, password_hash, created_at)
         VALUES (:id, :username, :password_hash, :created_at)",
        rusqlite::named_params! {
            ":id": admin.id.to_string(),
            ":username": &admin.username,
            ":password_hash": &admin.password_hash,
            ":created_at": admin.created_at.to_rfc3339(),
        },
    )
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            Error::invalid_input(format!("Admin '{}' already exists", username))
        } else {
            Error::database(e.to_string())
        }
    })?;

    tracing::info!(admin_id = %admin.id, username = %admin.username, "Created admin account");
    Ok(admin)
}

/// Look up an admin by login name.
pub fn get_admin_by_username(conn: &Connection, username: &str) -> Result<Option<Admin>> {
    let result = conn.query_row(
        &format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE username = :username"),
        rusqlite::named_params! { ":username": username },
        parse_admin_row,
    );

    match result {
        Ok(admin) => Ok(Some(admin)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all admins ordered by username.
pub fn list_admins(conn: &Connection) -> Result<Vec<Admin>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins ORDER BY username"
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let admins = stmt
        .query_map([], parse_admin_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(admins)
}

/// Delete an admin account.
///
/// Returns `Ok(false)` when no admin with that ID existed.
pub fn delete_admin(conn: &Connection, id: AdminId) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "DELETE FROM admins WHERE id = :id",
            rusqlite::named_params! { ":id": id.to_string() },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows_affected > 0)
}
