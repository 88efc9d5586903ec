//! Court service: CRUD over the `courts` table.
//!
//! DESIGN
//! ======
//! Courts are listed and edited per owner. A single court read joins in the
//! caller's own check-ins so the detail view needs one request. Updates are
//! partial: absent patch fields keep their stored value.
//!
//! ERROR HANDLING
//! ==============
//! Payloads are validated before any SQL runs. An update that matches no
//! row owned by the caller reports `NotFound`; the route layer does not
//! distinguish "absent" from "owned by someone else".

#[cfg(test)]
#[path = "court_test.rs"]
mod court_test;

use model::{Court, CourtPatch, CourtWithCheckIns, NewCourt, ValidationError};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::services::check_in::CheckInRow;

#[derive(Debug, thiserror::Error)]
pub enum CourtError {
    #[error("court not found: {0}")]
    NotFound(Uuid),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Row shape of the `courts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CourtRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub play_count: i64,
    pub image: Option<String>,
    pub user_id: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<CourtRow> for Court {
    fn from(row: CourtRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            latitude: row.latitude,
            longitude: row.longitude,
            play_count: row.play_count,
            image: row.image,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COURT_COLUMNS: &str =
    "id, name, description, latitude, longitude, play_count, image, user_id, created_at, updated_at";

/// Courts owned by `user_id`, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_courts(pool: &PgPool, user_id: &str) -> Result<Vec<Court>, CourtError> {
    let rows = sqlx::query_as::<_, CourtRow>(&format!(
        "SELECT {COURT_COLUMNS} FROM courts WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Court::from).collect())
}

/// One court with the caller's check-ins at it, newest first.
///
/// # Errors
///
/// Returns `NotFound` if no court has this id.
pub async fn get_court(pool: &PgPool, id: Uuid, user_id: &str) -> Result<CourtWithCheckIns, CourtError> {
    let court = sqlx::query_as::<_, CourtRow>(&format!("SELECT {COURT_COLUMNS} FROM courts WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(CourtError::NotFound(id))?;

    let check_ins = sqlx::query_as::<_, CheckInRow>(
        "SELECT id, court_id, user_id, title, notes, created_at, updated_at
         FROM check_ins WHERE court_id = $1 AND user_id = $2 ORDER BY created_at DESC",
    )
    .bind(id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(CourtWithCheckIns { court: court.into(), check_ins: check_ins.into_iter().map(Into::into).collect() })
}

/// Create a court owned by `user_id` with a zero play count.
///
/// # Errors
///
/// Returns `Invalid` for a bad payload, or a database error.
pub async fn create_court(pool: &PgPool, user_id: &str, new: &NewCourt) -> Result<Court, CourtError> {
    new.validate()?;
    let row = sqlx::query_as::<_, CourtRow>(&format!(
        "INSERT INTO courts (id, name, description, latitude, longitude, user_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {COURT_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(new.name.trim())
    .bind(&new.description)
    .bind(new.latitude)
    .bind(new.longitude)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    tracing::info!(court_id = %row.id, %user_id, "court created");
    Ok(row.into())
}

/// Apply `patch` to a court owned by `user_id`.
///
/// # Errors
///
/// Returns `Invalid` for a bad patch and `NotFound` when the caller owns no
/// court with this id.
pub async fn update_court(pool: &PgPool, id: Uuid, user_id: &str, patch: &CourtPatch) -> Result<Court, CourtError> {
    patch.validate()?;
    let row = sqlx::query_as::<_, CourtRow>(&format!(
        "UPDATE courts SET
             name = COALESCE($3, name),
             description = COALESCE($4, description),
             latitude = COALESCE($5, latitude),
             longitude = COALESCE($6, longitude),
             play_count = COALESCE($7, play_count),
             image = COALESCE($8, image),
             updated_at = now()
         WHERE id = $1 AND user_id = $2
         RETURNING {COURT_COLUMNS}"
    ))
    .bind(id)
    .bind(user_id)
    .bind(patch.name.as_deref().map(str::trim))
    .bind(&patch.description)
    .bind(patch.latitude)
    .bind(patch.longitude)
    .bind(patch.play_count)
    .bind(&patch.image)
    .fetch_optional(pool)
    .await?
    .ok_or(CourtError::NotFound(id))?;

    tracing::debug!(court_id = %id, play_count = row.play_count, "court updated");
    Ok(row.into())
}
