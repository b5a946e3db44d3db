// ABOUTME: Review request storage layer using SQLite
// ABOUTME: Atomic creation of a request with its messages, tool requests and initial status

use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use sentinel_core::{format_timestamp, generate_id, now, require_document, require_non_empty};
use sentinel_storage::{
    read_json, read_optional_timestamp, read_timestamp, SqlxResultExt, StorageError,
    StorageResult,
};

use crate::status::{insert_status, parse_status};
use crate::types::{
    Message, Review, ReviewFilter, ReviewRequestCreateInput, ReviewStatus, ReviewStatusKind,
    ToolRequest,
};

/// Review requests joined with the newest row of their status history
const REVIEW_SELECT: &str = "SELECT rr.id, rr.run_id, rr.task_state, rr.created_at,
        rs.id AS status_id, rs.status AS status, rs.created_at AS status_created_at
    FROM review_requests rr
    LEFT JOIN review_statuses rs ON rs.seq = (
        SELECT seq FROM review_statuses
        WHERE review_request_id = rr.id
        ORDER BY created_at DESC, seq DESC
        LIMIT 1
    )";

const REVIEW_FILTER: &str = "WHERE (? IS NULL OR rr.run_id = ?) AND (? IS NULL OR rs.status = ?)";

pub(crate) const TOOL_REQUEST_COLUMNS: &str =
    "tr.id, tr.review_request_id, tr.tool_id, tr.message_id, tr.arguments, tr.position";

/// Proposal with its arguments already serialized
struct PreparedProposal<'a> {
    role: &'a str,
    content: &'a str,
    tool_id: &'a str,
    arguments: String,
}

#[derive(Clone)]
pub struct ReviewStorage {
    pub(crate) pool: SqlitePool,
}

impl ReviewStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a review request with all of its children, or nothing at all.
    ///
    /// Messages are inserted first so each tool request can reference the
    /// message at the same position. The request starts out `pending`.
    pub async fn create_review_request(
        &self,
        input: &ReviewRequestCreateInput,
    ) -> StorageResult<String> {
        require_non_empty("run id", &input.run_id)?;
        require_document("task state", &input.task_state)?;

        let mut proposals = Vec::with_capacity(input.proposals.len());
        for proposal in &input.proposals {
            require_non_empty("message role", &proposal.message.role)?;
            require_non_empty("tool id", &proposal.tool_id)?;
            require_document("tool arguments", &proposal.arguments)?;

            proposals.push(PreparedProposal {
                role: &proposal.message.role,
                content: &proposal.message.content,
                tool_id: &proposal.tool_id,
                arguments: serde_json::to_string(&proposal.arguments)?,
            });
        }
        let task_state = serde_json::to_string(&input.task_state)?;

        let review_id = generate_id();
        let created_at = now();

        let mut tx = self.pool.begin().await.context("starting transaction")?;

        let mut message_ids = Vec::with_capacity(proposals.len());
        for proposal in &proposals {
            let message_id = generate_id();
            sqlx::query("INSERT INTO messages (id, role, content) VALUES (?, ?, ?)")
                .bind(&message_id)
                .bind(proposal.role)
                .bind(proposal.content)
                .execute(&mut *tx)
                .await
                .context("inserting message")?;
            message_ids.push(message_id);
        }

        sqlx::query(
            "INSERT INTO review_requests (id, run_id, task_state, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&review_id)
        .bind(&input.run_id)
        .bind(&task_state)
        .bind(format_timestamp(created_at))
        .execute(&mut *tx)
        .await
        .context("inserting review request")?;

        for (position, (proposal, message_id)) in proposals.iter().zip(&message_ids).enumerate() {
            sqlx::query(
                "INSERT INTO tool_requests (id, review_request_id, tool_id, message_id, arguments, position)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(generate_id())
            .bind(&review_id)
            .bind(proposal.tool_id)
            .bind(message_id)
            .bind(&proposal.arguments)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .context("inserting tool request")?;
        }

        insert_status(
            &mut *tx,
            &review_id,
            ReviewStatusKind::Pending,
            created_at,
            "inserting initial status",
        )
        .await?;

        tx.commit().await.context("committing review request")?;

        info!(
            "Created review request {} for run {} with {} tool requests",
            review_id,
            input.run_id,
            proposals.len()
        );
        Ok(review_id)
    }

    /// Optionally replace the task state and append a new status, atomically
    pub async fn update_review(
        &self,
        id: &str,
        task_state: Option<&Value>,
        status: ReviewStatusKind,
    ) -> StorageResult<ReviewStatus> {
        let task_state = match task_state {
            Some(state) => {
                require_document("task state", state)?;
                Some(serde_json::to_string(state)?)
            }
            None => None,
        };

        let mut tx = self.pool.begin().await.context("starting transaction")?;

        if let Some(state) = &task_state {
            let updated = sqlx::query("UPDATE review_requests SET task_state = ? WHERE id = ?")
                .bind(state)
                .bind(id)
                .execute(&mut *tx)
                .await
                .context("updating task state")?
                .rows_affected();
            if updated == 0 {
                return Err(StorageError::NotFound(format!("review request {}", id)));
            }
        }

        // Without a task state the status insert is the first write; its
        // foreign key doubles as the existence check.
        let entry = match insert_status(&mut *tx, id, status, now(), "appending status").await {
            Err(StorageError::Reference { .. }) => {
                return Err(StorageError::NotFound(format!("review request {}", id)))
            }
            other => other?,
        };
        tx.commit().await.context("committing review update")?;

        Ok(entry)
    }

    // ==================== Read projections ====================

    /// Get a review request with its current status
    pub async fn get_review(&self, id: &str) -> StorageResult<Option<Review>> {
        let row = sqlx::query(&format!("{} WHERE rr.id = ?", REVIEW_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("loading review")?;

        row.as_ref().map(row_to_review).transpose()
    }

    /// List review requests, newest first
    pub async fn list_reviews(&self, filter: &ReviewFilter) -> StorageResult<Vec<Review>> {
        let status = filter.status.map(|s| s.as_str());
        debug!("Listing reviews with filter {:?}", filter);

        let rows = sqlx::query(&format!(
            "{} {} ORDER BY rr.created_at DESC, rr.rowid DESC LIMIT ? OFFSET ?",
            REVIEW_SELECT, REVIEW_FILTER
        ))
        .bind(filter.run_id.as_deref())
        .bind(filter.run_id.as_deref())
        .bind(status)
        .bind(status)
        .bind(filter.limit.unwrap_or(-1))
        .bind(filter.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await
        .context("listing reviews")?;

        rows.iter().map(row_to_review).collect()
    }

    /// Count review requests matching a filter, ignoring its limit and offset
    pub async fn count_reviews(&self, filter: &ReviewFilter) -> StorageResult<i64> {
        let status = filter.status.map(|s| s.as_str());

        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM ({} {})",
            REVIEW_SELECT, REVIEW_FILTER
        ))
        .bind(filter.run_id.as_deref())
        .bind(filter.run_id.as_deref())
        .bind(status)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .context("counting reviews")?;

        Ok(count)
    }

    /// Tool requests of a review request in submission order
    pub async fn list_review_tool_requests(
        &self,
        review_request_id: &str,
    ) -> StorageResult<Vec<ToolRequest>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM tool_requests tr WHERE tr.review_request_id = ? ORDER BY tr.position ASC",
            TOOL_REQUEST_COLUMNS
        ))
        .bind(review_request_id)
        .fetch_all(&self.pool)
        .await
        .context("listing tool requests")?;

        rows.iter().map(row_to_tool_request).collect()
    }

    /// Messages of a review request in submission order
    pub async fn list_review_messages(&self, review_request_id: &str) -> StorageResult<Vec<Message>> {
        let rows = sqlx::query(
            "SELECT m.id, m.role, m.content FROM messages m
             JOIN tool_requests tr ON tr.message_id = m.id
             WHERE tr.review_request_id = ?
             ORDER BY tr.position ASC",
        )
        .bind(review_request_id)
        .fetch_all(&self.pool)
        .await
        .context("listing messages")?;

        rows.iter().map(row_to_message).collect()
    }
}

fn row_to_review(row: &SqliteRow) -> StorageResult<Review> {
    let id: String = row.try_get("id").context("decoding review")?;

    let status_id: Option<String> = row.try_get("status_id").context("decoding review")?;
    let status_kind: Option<String> = row.try_get("status").context("decoding review")?;
    let status_created_at = read_optional_timestamp(row, "status_created_at")?;

    let status = match (status_id, status_kind, status_created_at) {
        (Some(status_id), Some(kind), Some(created_at)) => Some(ReviewStatus {
            id: status_id,
            review_request_id: id.clone(),
            status: parse_status(kind)?,
            created_at,
        }),
        _ => None,
    };

    Ok(Review {
        id,
        run_id: row.try_get("run_id").context("decoding review")?,
        task_state: read_json(row, "task_state")?,
        status,
        created_at: read_timestamp(row, "created_at")?,
    })
}

fn row_to_message(row: &SqliteRow) -> StorageResult<Message> {
    Ok(Message {
        id: row.try_get("id").context("decoding message")?,
        role: row.try_get("role").context("decoding message")?,
        content: row.try_get("content").context("decoding message")?,
    })
}

pub(crate) fn row_to_tool_request(row: &SqliteRow) -> StorageResult<ToolRequest> {
    Ok(ToolRequest {
        id: row.try_get("id").context("decoding tool request")?,
        review_request_id: row.try_get("review_request_id").context("decoding tool request")?,
        tool_id: row.try_get("tool_id").context("decoding tool request")?,
        message_id: row.try_get("message_id").context("decoding tool request")?,
        arguments: read_json(row, "arguments")?,
        position: row.try_get("position").context("decoding tool request")?,
    })
}
