// ABOUTME: Append-only review status history
// ABOUTME: The current status is the newest row, with insertion order breaking timestamp ties

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::debug;

use sentinel_core::{
    format_timestamp, generate_id, require_non_empty, require_storable_timestamp,
    truncate_to_micros,
};
use sentinel_storage::{read_timestamp, SqlxResultExt, StorageError, StorageResult};

use crate::storage::ReviewStorage;
use crate::types::{ReviewStatus, ReviewStatusKind};

const STATUS_COLUMNS: &str = "id, review_request_id, status, created_at";

impl ReviewStorage {
    /// Append a status to the history of a review request.
    ///
    /// `at` must fall within years 0000 to 9999 so that stored times sort as text.
    pub async fn append_status(
        &self,
        review_request_id: &str,
        status: ReviewStatusKind,
        at: DateTime<Utc>,
    ) -> StorageResult<ReviewStatus> {
        require_non_empty("review request id", review_request_id)?;
        require_storable_timestamp("status time", &at)?;

        let mut conn = self.pool.acquire().await.context("acquiring connection")?;
        insert_status(&mut *conn, review_request_id, status, at, "appending status").await
    }

    /// The status of the newest history row.
    ///
    /// Fails with `NotFound` when the review request has no history at all.
    pub async fn current_status(&self, review_request_id: &str) -> StorageResult<ReviewStatus> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM review_statuses
             WHERE review_request_id = ?
             ORDER BY created_at DESC, seq DESC
             LIMIT 1",
            STATUS_COLUMNS
        ))
        .bind(review_request_id)
        .fetch_optional(&self.pool)
        .await
        .context("loading current status")?;

        match row {
            Some(row) => row_to_status(&row),
            None => Err(StorageError::NotFound(format!(
                "status history for review request {}",
                review_request_id
            ))),
        }
    }

    /// Full status history, oldest first
    pub async fn status_history(&self, review_request_id: &str) -> StorageResult<Vec<ReviewStatus>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM review_statuses
             WHERE review_request_id = ?
             ORDER BY created_at ASC, seq ASC",
            STATUS_COLUMNS
        ))
        .bind(review_request_id)
        .fetch_all(&self.pool)
        .await
        .context("loading status history")?;

        rows.iter().map(row_to_status).collect()
    }
}

pub(crate) async fn insert_status(
    conn: &mut SqliteConnection,
    review_request_id: &str,
    status: ReviewStatusKind,
    at: DateTime<Utc>,
    operation: &str,
) -> StorageResult<ReviewStatus> {
    let entry = ReviewStatus {
        id: generate_id(),
        review_request_id: review_request_id.to_string(),
        status,
        created_at: truncate_to_micros(at),
    };

    debug!(
        "Review request {} is now {}",
        entry.review_request_id,
        entry.status.as_str()
    );

    sqlx::query(
        "INSERT INTO review_statuses (id, review_request_id, status, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&entry.id)
    .bind(&entry.review_request_id)
    .bind(entry.status.as_str())
    .bind(format_timestamp(entry.created_at))
    .execute(&mut *conn)
    .await
    .context(operation)?;

    Ok(entry)
}

pub(crate) fn parse_status(raw: String) -> StorageResult<ReviewStatusKind> {
    ReviewStatusKind::parse(&raw).ok_or(StorageError::Corrupt {
        column: "status",
        value: raw,
    })
}

fn row_to_status(row: &SqliteRow) -> StorageResult<ReviewStatus> {
    Ok(ReviewStatus {
        id: row.try_get("id").context("decoding status")?,
        review_request_id: row.try_get("review_request_id").context("decoding status")?,
        status: parse_status(row.try_get("status").context("decoding status")?)?,
        created_at: read_timestamp(row, "created_at")?,
    })
}
