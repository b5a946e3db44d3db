// ABOUTME: Tool and supervisor storage layer using SQLite
// ABOUTME: Resolve-or-create by logical key, run and supervisor associations, read projections

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use sentinel_core::{format_timestamp, generate_id, now, require_document, require_non_empty};
use sentinel_storage::{
    read_json, read_timestamp, with_retry, SqlxResultExt, StorageError, StorageResult,
};

use crate::types::{Supervisor, SupervisorCreateInput, SupervisorType, Tool, ToolCreateInput};

const TOOL_COLUMNS: &str = "t.id, t.name, t.description, t.attributes, t.created_at";
const SUPERVISOR_COLUMNS: &str = "s.id, s.description, s.type, s.code, s.created_at";

/// A validated tool with its attributes in stored form
struct ToolKey {
    name: String,
    description: String,
    attributes: String,
}

impl ToolKey {
    fn prepare(input: &ToolCreateInput) -> StorageResult<Self> {
        require_non_empty("tool name", &input.name)?;
        require_non_empty("tool description", &input.description)?;
        require_document("tool attributes", &input.attributes)?;

        Ok(Self {
            name: input.name.clone(),
            description: input.description.clone(),
            attributes: serde_json::to_string(&input.attributes)?,
        })
    }
}

#[derive(Clone)]
pub struct ToolStorage {
    pool: SqlitePool,
}

impl ToolStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== Tools ====================

    /// Return the id of the tool with this exact (name, description,
    /// attributes), creating it if it does not exist yet
    pub async fn resolve_or_create_tool(&self, input: &ToolCreateInput) -> StorageResult<String> {
        let key = ToolKey::prepare(input)?;
        let key = &key;

        with_retry("resolving tool", move || async move {
            let mut tx = self.pool.begin().await.context("starting transaction")?;
            let id = resolve_tool(&mut *tx, key).await?;
            tx.commit().await.context("committing tool")?;
            Ok(id)
        })
        .await
    }

    pub async fn create_tool(&self, input: &ToolCreateInput) -> StorageResult<String> {
        self.resolve_or_create_tool(input).await
    }

    /// Get a tool by ID
    pub async fn get_tool(&self, id: &str) -> StorageResult<Option<Tool>> {
        let row = sqlx::query(&format!("SELECT {} FROM tools t WHERE t.id = ?", TOOL_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("loading tool")?;

        row.as_ref().map(row_to_tool).transpose()
    }

    pub async fn list_tools(&self) -> StorageResult<Vec<Tool>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM tools t ORDER BY t.created_at ASC, t.id ASC",
            TOOL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("listing tools")?;

        rows.iter().map(row_to_tool).collect()
    }

    /// Tools attached to a run
    pub async fn list_run_tools(&self, run_id: &str) -> StorageResult<Vec<Tool>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM tools t
             JOIN run_tools rt ON rt.tool_id = t.id
             WHERE rt.run_id = ?
             ORDER BY t.created_at ASC, t.id ASC",
            TOOL_COLUMNS
        ))
        .bind(run_id)
        .fetch_all(&self.pool)
        .await
        .context("listing run tools")?;

        rows.iter().map(row_to_tool).collect()
    }

    /// Tools attached to any run of a project, each listed once
    pub async fn list_project_tools(&self, project_id: &str) -> StorageResult<Vec<Tool>> {
        let rows = sqlx::query(&format!(
            "SELECT DISTINCT {} FROM tools t
             JOIN run_tools rt ON rt.tool_id = t.id
             JOIN runs r ON r.id = rt.run_id
             WHERE r.project_id = ?
             ORDER BY t.created_at ASC, t.id ASC",
            TOOL_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .context("listing project tools")?;

        rows.iter().map(row_to_tool).collect()
    }

    // ==================== Run associations ====================

    /// Resolve the tool and associate it with the run in one transaction.
    /// Attaching the same tool twice is a no-op.
    pub async fn attach_tool_to_run(
        &self,
        run_id: &str,
        input: &ToolCreateInput,
    ) -> StorageResult<String> {
        require_non_empty("run id", run_id)?;
        let key = ToolKey::prepare(input)?;
        let key = &key;

        with_retry("attaching tool to run", move || async move {
            let mut tx = self.pool.begin().await.context("starting transaction")?;
            let tool_id = resolve_tool(&mut *tx, key).await?;

            sqlx::query(
                "INSERT INTO run_tools (run_id, tool_id) VALUES (?, ?)
                 ON CONFLICT(run_id, tool_id) DO NOTHING",
            )
            .bind(run_id)
            .bind(&tool_id)
            .execute(&mut *tx)
            .await
            .context("inserting run tool")?;

            tx.commit().await.context("committing run tool")?;
            Ok(tool_id)
        })
        .await
    }

    // ==================== Supervisors ====================

    /// Return the id of the supervisor with this code, creating it if needed.
    /// An existing supervisor keeps its original description and type.
    pub async fn resolve_or_create_supervisor(
        &self,
        input: &SupervisorCreateInput,
    ) -> StorageResult<String> {
        require_non_empty("supervisor code", &input.code)?;

        with_retry("resolving supervisor", move || async move {
            let mut tx = self.pool.begin().await.context("starting transaction")?;
            let id = resolve_supervisor(&mut *tx, input).await?;
            tx.commit().await.context("committing supervisor")?;
            Ok(id)
        })
        .await
    }

    pub async fn create_supervisor(&self, input: &SupervisorCreateInput) -> StorageResult<String> {
        self.resolve_or_create_supervisor(input).await
    }

    /// Get a supervisor by ID
    pub async fn get_supervisor(&self, id: &str) -> StorageResult<Option<Supervisor>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM supervisors s WHERE s.id = ?",
            SUPERVISOR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("loading supervisor")?;

        row.as_ref().map(row_to_supervisor).transpose()
    }

    pub async fn list_supervisors(&self) -> StorageResult<Vec<Supervisor>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM supervisors s ORDER BY s.created_at ASC, s.id ASC",
            SUPERVISOR_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("listing supervisors")?;

        rows.iter().map(row_to_supervisor).collect()
    }

    /// Associate an existing supervisor with an existing tool
    pub async fn attach_supervisor_to_tool(
        &self,
        supervisor_id: &str,
        tool_id: &str,
    ) -> StorageResult<()> {
        require_non_empty("supervisor id", supervisor_id)?;
        require_non_empty("tool id", tool_id)?;

        debug!("Attaching supervisor {} to tool {}", supervisor_id, tool_id);

        sqlx::query(
            "INSERT INTO tool_supervisors (tool_id, supervisor_id) VALUES (?, ?)
             ON CONFLICT(tool_id, supervisor_id) DO NOTHING",
        )
        .bind(tool_id)
        .bind(supervisor_id)
        .execute(&self.pool)
        .await
        .context("inserting tool supervisor")?;

        Ok(())
    }

    pub async fn list_tool_supervisors(&self, tool_id: &str) -> StorageResult<Vec<Supervisor>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM supervisors s
             JOIN tool_supervisors ts ON ts.supervisor_id = s.id
             WHERE ts.tool_id = ?
             ORDER BY s.created_at ASC, s.id ASC",
            SUPERVISOR_COLUMNS
        ))
        .bind(tool_id)
        .fetch_all(&self.pool)
        .await
        .context("listing tool supervisors")?;

        rows.iter().map(row_to_supervisor).collect()
    }
}

// Resolvers write before they read: a deferred transaction that starts with a
// read cannot wait on the busy timeout when it later upgrades to a write.

async fn resolve_tool(conn: &mut SqliteConnection, key: &ToolKey) -> StorageResult<String> {
    let candidate = generate_id();

    let inserted = sqlx::query(
        "INSERT INTO tools (id, name, description, attributes, created_at) VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(name, description, attributes) DO NOTHING",
    )
    .bind(&candidate)
    .bind(&key.name)
    .bind(&key.description)
    .bind(&key.attributes)
    .bind(format_timestamp(now()))
    .execute(&mut *conn)
    .await
    .context("inserting tool")?
    .rows_affected();

    if inserted > 0 {
        debug!("Created tool '{}' with ID {}", key.name, candidate);
        return Ok(candidate);
    }

    sqlx::query_scalar("SELECT id FROM tools WHERE name = ? AND description = ? AND attributes = ?")
        .bind(&key.name)
        .bind(&key.description)
        .bind(&key.attributes)
        .fetch_one(&mut *conn)
        .await
        .context("looking up tool")
}

async fn resolve_supervisor(
    conn: &mut SqliteConnection,
    input: &SupervisorCreateInput,
) -> StorageResult<String> {
    let candidate = generate_id();

    let inserted = sqlx::query(
        "INSERT INTO supervisors (id, description, type, code, created_at) VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(code) DO NOTHING",
    )
    .bind(&candidate)
    .bind(&input.description)
    .bind(input.supervisor_type.as_str())
    .bind(&input.code)
    .bind(format_timestamp(now()))
    .execute(&mut *conn)
    .await
    .context("inserting supervisor")?
    .rows_affected();

    if inserted > 0 {
        debug!("Created {} with ID {}", input.supervisor_type.as_str(), candidate);
        return Ok(candidate);
    }

    sqlx::query_scalar("SELECT id FROM supervisors WHERE code = ?")
        .bind(&input.code)
        .fetch_one(&mut *conn)
        .await
        .context("looking up supervisor")
}

fn row_to_tool(row: &SqliteRow) -> StorageResult<Tool> {
    Ok(Tool {
        id: row.try_get("id").context("decoding tool")?,
        name: row.try_get("name").context("decoding tool")?,
        description: row.try_get("description").context("decoding tool")?,
        attributes: read_json(row, "attributes")?,
        created_at: read_timestamp(row, "created_at")?,
    })
}

fn row_to_supervisor(row: &SqliteRow) -> StorageResult<Supervisor> {
    let raw_type: String = row.try_get("type").context("decoding supervisor")?;
    let supervisor_type = SupervisorType::parse(&raw_type).ok_or_else(|| StorageError::Corrupt {
        column: "type",
        value: raw_type.clone(),
    })?;

    Ok(Supervisor {
        id: row.try_get("id").context("decoding supervisor")?,
        description: row.try_get("description").context("decoding supervisor")?,
        supervisor_type,
        code: row.try_get("code").context("decoding supervisor")?,
        created_at: read_timestamp(row, "created_at")?,
    })
}
