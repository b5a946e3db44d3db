// ABOUTME: Review result storage
// ABOUTME: Decisions recorded against individual tool requests of a review request

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::debug;

use sentinel_core::{format_timestamp, generate_id, now, require_non_empty};
use sentinel_storage::{read_timestamp, SqlxResultExt, StorageError, StorageResult};

use crate::storage::{row_to_tool_request, ReviewStorage, TOOL_REQUEST_COLUMNS};
use crate::types::{Decision, ReviewResult, ReviewResultCreateInput};

impl ReviewStorage {
    /// Record a decision for one tool request of a review request
    pub async fn record_review_result(
        &self,
        input: &ReviewResultCreateInput,
    ) -> StorageResult<ReviewResult> {
        require_non_empty("review request id", &input.review_request_id)?;
        require_non_empty("tool request id", &input.tool_request_id)?;

        let id = generate_id();
        let created_at = now();

        debug!(
            "Recording {} for tool request {}",
            input.decision.as_str(),
            input.tool_request_id
        );

        let mut tx = self.pool.begin().await.context("starting transaction")?;

        sqlx::query(
            "INSERT INTO review_results (id, review_request_id, tool_request_id, decision, reasoning, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&input.review_request_id)
        .bind(&input.tool_request_id)
        .bind(input.decision.as_str())
        .bind(&input.reasoning)
        .bind(format_timestamp(created_at))
        .execute(&mut *tx)
        .await
        .context("inserting review result")?;

        // Dropping the transaction discards the insert above.
        let row = sqlx::query(&format!(
            "SELECT {} FROM tool_requests tr WHERE tr.id = ? AND tr.review_request_id = ?",
            TOOL_REQUEST_COLUMNS
        ))
        .bind(&input.tool_request_id)
        .bind(&input.review_request_id)
        .fetch_optional(&mut *tx)
        .await
        .context("loading tool request")?;

        let tool_request = match row {
            Some(row) => row_to_tool_request(&row)?,
            None => {
                return Err(StorageError::Reference {
                    operation: "recording review result".to_string(),
                    message: format!(
                        "tool request {} does not belong to review request {}",
                        input.tool_request_id, input.review_request_id
                    ),
                })
            }
        };

        let result = ReviewResult {
            id,
            review_request_id: input.review_request_id.clone(),
            decision: input.decision,
            reasoning: input.reasoning.clone(),
            created_at,
            tool_request,
        };

        tx.commit().await.context("committing review result")?;
        Ok(result)
    }

    /// Results of a review request with the tool request each one decides,
    /// in the order they were recorded
    pub async fn list_review_results(
        &self,
        review_request_id: &str,
    ) -> StorageResult<Vec<ReviewResult>> {
        let rows = sqlx::query(
            "SELECT res.id AS result_id, res.decision, res.reasoning, res.created_at,
                    tr.id, tr.review_request_id, tr.tool_id, tr.message_id, tr.arguments, tr.position
             FROM review_results res
             JOIN tool_requests tr ON tr.id = res.tool_request_id
             WHERE res.review_request_id = ?
             ORDER BY res.created_at ASC, res.rowid ASC",
        )
        .bind(review_request_id)
        .fetch_all(&self.pool)
        .await
        .context("listing review results")?;

        rows.iter().map(row_to_result).collect()
    }
}

fn row_to_result(row: &SqliteRow) -> StorageResult<ReviewResult> {
    let raw_decision: String = row.try_get("decision").context("decoding review result")?;
    let decision = Decision::parse(&raw_decision).ok_or(StorageError::Corrupt {
        column: "decision",
        value: raw_decision,
    })?;

    let tool_request = row_to_tool_request(row)?;

    Ok(ReviewResult {
        id: row.try_get("result_id").context("decoding review result")?,
        review_request_id: tool_request.review_request_id.clone(),
        decision,
        reasoning: row.try_get("reasoning").context("decoding review result")?,
        created_at: read_timestamp(row, "created_at")?,
        tool_request,
    })
}
