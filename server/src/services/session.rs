//! Session validation.
//!
//! ARCHITECTURE
//! ============
//! Sign-in happens at an external auth provider, which writes `users` and
//! `sessions` rows. This server only reads them: a request is authenticated
//! when its `session_token` cookie names an unexpired session.

use sqlx::PgPool;

/// User row returned from session validation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, sqlx::FromRow)]
pub struct SessionUser {
    /// Opaque user identifier issued by the auth provider.
    pub id: String,
    pub name: String,
}

/// Validate a session token and return the associated user.
///
/// # Errors
///
/// Returns a database error if the lookup fails.
pub async fn validate_session(pool: &PgPool, token: &str) -> Result<Option<SessionUser>, sqlx::Error> {
    sqlx::query_as::<_, SessionUser>(
        r"SELECT u.id, u.name
          FROM sessions s
          JOIN users u ON u.id = s.user_id
          WHERE s.token = $1 AND s.expires_at > now()",
    )
    .bind(token)
    .fetch_optional(pool)
    .await
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
