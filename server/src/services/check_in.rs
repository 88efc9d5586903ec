//! Check-in service: a user's visits to a court.

#[cfg(test)]
#[path = "check_in_test.rs"]
mod check_in_test;

use model::{CheckIn, CheckInPatch};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum CheckInError {
    #[error("check-in not found: {0}")]
    NotFound(Uuid),
    #[error("court not found: {0}")]
    CourtNotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CheckInRow {
    pub id: Uuid,
    pub court_id: Uuid,
    pub user_id: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<CheckInRow> for CheckIn {
    fn from(row: CheckInRow) -> Self {
        Self {
            id: row.id,
            court_id: row.court_id,
            user_id: row.user_id,
            title: row.title,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CHECK_IN_COLUMNS: &str = "id, court_id, user_id, title, notes, created_at, updated_at";

/// The caller's check-ins at `court_id`, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_check_ins(pool: &PgPool, court_id: Uuid, user_id: &str) -> Result<Vec<CheckIn>, CheckInError> {
    let rows = sqlx::query_as::<_, CheckInRow>(&format!(
        "SELECT {CHECK_IN_COLUMNS} FROM check_ins
         WHERE court_id = $1 AND user_id = $2 ORDER BY created_at DESC"
    ))
    .bind(court_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(CheckIn::from).collect())
}

/// # Errors
///
/// Returns `NotFound` unless the caller owns a check-in with this id.
pub async fn get_check_in(pool: &PgPool, id: Uuid, user_id: &str) -> Result<CheckIn, CheckInError> {
    sqlx::query_as::<_, CheckInRow>(&format!(
        "SELECT {CHECK_IN_COLUMNS} FROM check_ins WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .map(CheckIn::from)
    .ok_or(CheckInError::NotFound(id))
}

/// Record a visit to `court_id`. The court's play count is not touched;
/// callers bump it separately.
///
/// # Errors
///
/// Returns `CourtNotFound` if the court does not exist.
pub async fn create_check_in(pool: &PgPool, court_id: Uuid, user_id: &str) -> Result<CheckIn, CheckInError> {
    let row = sqlx::query_as::<_, CheckInRow>(&format!(
        "INSERT INTO check_ins (id, court_id, user_id)
         SELECT $1, c.id, $3 FROM courts c WHERE c.id = $2
         RETURNING {CHECK_IN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(court_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(CheckInError::CourtNotFound(court_id))?;

    tracing::info!(check_in_id = %row.id, %court_id, %user_id, "check-in created");
    Ok(row.into())
}

/// # Errors
///
/// Returns `NotFound` unless the caller owns a check-in with this id.
pub async fn update_check_in(
    pool: &PgPool,
    id: Uuid,
    user_id: &str,
    patch: &CheckInPatch,
) -> Result<CheckIn, CheckInError> {
    sqlx::query_as::<_, CheckInRow>(&format!(
        "UPDATE check_ins SET
             title = COALESCE($3, title),
             notes = COALESCE($4, notes),
             updated_at = now()
         WHERE id = $1 AND user_id = $2
         RETURNING {CHECK_IN_COLUMNS}"
    ))
    .bind(id)
    .bind(user_id)
    .bind(&patch.title)
    .bind(&patch.notes)
    .fetch_optional(pool)
    .await?
    .map(CheckIn::from)
    .ok_or(CheckInError::NotFound(id))
}
