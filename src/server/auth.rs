//! Admin authentication: login, logout, session lookup and the guard for
//! catalog writes.
//!
//! Sessions live server-side in a [`SessionStore`] held by the [`AppContext`].
//! A session is created only by a successful login and removed by logout or
//! expiry; clients present its token as `Authorization: Bearer <token>`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeader,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use marquee_common::{AdminId, Error};
use marquee_db::{models::Admin, pool::get_conn, queries::admins};
use serde::{Deserialize, Serialize};

use super::error::AppError;
use super::AppContext;

/// An authenticated admin session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub admin_id: AdminId,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Thread-safe store of live admin sessions, keyed by token.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, AdminSession>>,
    ttl: chrono::Duration,
}

impl SessionStore {
    /// Create a store whose sessions last `timeout_hours`.
    pub fn new(timeout_hours: u64) -> Self {
        // Capped at ten years so the addition below cannot overflow.
        let hours = i64::try_from(timeout_hours).unwrap_or(i64::MAX).min(87_600);
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl: chrono::Duration::hours(hours),
        }
    }

    /// Start a session for `admin` and return its token.
    pub fn create(&self, admin: &Admin) -> (String, AdminSession) {
        let token = generate_session_token();
        let session = AdminSession {
            admin_id: admin.id,
            username: admin.username.clone(),
            expires_at: Utc::now() + self.ttl,
        };
        self.sessions.insert(token.clone(), session.clone());

        tracing::info!(admin_id = %admin.id, username = %admin.username, "Admin session created");
        (token, session)
    }

    /// Look up a live session. Expired sessions are dropped on sight.
    pub fn validate(&self, token: &str) -> Option<AdminSession> {
        let session = self.sessions.get(token)?.clone();
        if session.is_valid_at(Utc::now()) {
            Some(session)
        } else {
            self.sessions.remove(token);
            None
        }
    }

    /// End a session. Returns `false` if the token was unknown.
    pub fn revoke(&self, token: &str) -> bool {
        match self.sessions.remove(token) {
            Some((_, session)) => {
                tracing::info!(username = %session.username, "Admin session ended");
                true
            }
            None => false,
        }
    }

    /// Drop every expired session, returning how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.is_valid_at(now));
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::debug!(removed, "Removed expired admin sessions");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    #[cfg(test)]
    fn insert_raw(&self, token: &str, session: AdminSession) {
        self.sessions.insert(token.to_string(), session);
    }
}

/// Periodically purge expired sessions.
pub fn start_cleanup_task(store: SessionStore, interval_secs: u64) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            store.cleanup_expired();
        }
    })
}

/// Login request payload
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl LoginResponse {
    fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            token: None,
            expires_at: None,
        }
    }
}

/// POST /api/admin/login
pub async fn login(
    State(ctx): State<AppContext>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<LoginResponse>)> {
    let lookup = get_conn(&ctx.db)
        .and_then(|conn| admins::get_admin_by_username(&conn, payload.username.trim()));

    let admin = match lookup {
        Ok(admin) => admin,
        Err(e) => {
            tracing::error!(error = %e, "Admin lookup failed during login");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(LoginResponse::failure("Login failed")),
            ));
        }
    };

    let verified = admin.filter(|a| {
        bcrypt::verify(&payload.password, &a.password_hash).unwrap_or_else(|e| {
            tracing::warn!(username = %a.username, error = %e, "Stored password hash is unusable");
            false
        })
    });

    match verified {
        Some(admin) => {
            let (token, session) = ctx.sessions.create(&admin);
            Ok(Json(LoginResponse {
                success: true,
                message: "Admin login successful".to_string(),
                token: Some(token),
                expires_at: Some(session.expires_at),
            }))
        }
        None => {
            tracing::debug!(username = %payload.username, "Rejected admin login");
            Err((
                StatusCode::UNAUTHORIZED,
                Json(LoginResponse::failure("Invalid credentials")),
            ))
        }
    }
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// POST /api/admin/logout
pub async fn logout(
    State(ctx): State<AppContext>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Json<LogoutResponse> {
    if let Some(TypedHeader(auth)) = bearer {
        ctx.sessions.revoke(auth.token());
    }
    Json(LogoutResponse { success: true })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    pub username: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// GET /api/admin/session
pub async fn session_status(
    State(ctx): State<AppContext>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Json<SessionStatusResponse> {
    let session = bearer.and_then(|TypedHeader(auth)| ctx.sessions.validate(auth.token()));

    Json(SessionStatusResponse {
        authenticated: session.is_some(),
        username: session.as_ref().map(|s| s.username.clone()),
        expires_at: session.map(|s| s.expires_at),
    })
}

/// Reject requests without a live admin session.
///
/// On success the [`AdminSession`] is added to the request extensions.
pub async fn require_admin(
    State(ctx): State<AppContext>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if !ctx.config.auth.require_admin_session {
        return Ok(next.run(request).await);
    }

    let session = bearer
        .and_then(|TypedHeader(auth)| ctx.sessions.validate(auth.token()))
        .ok_or(AppError(Error::Unauthorized))?;

    tracing::debug!(username = %session.username, path = %request.uri().path(), "Admin request");
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Generate a bcrypt password hash
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

/// Generate an unguessable session token (32 random bytes, URL-safe base64).
pub fn generate_session_token() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    URL_SAFE_NO_PAD.encode(bytes)
}
