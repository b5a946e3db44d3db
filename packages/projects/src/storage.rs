// ABOUTME: Project and run storage layer using SQLite
// ABOUTME: Create-once records with caller-supplied identities and simple listings

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use sentinel_core::{
    format_timestamp, now, require_non_empty, require_storable_timestamp, truncate_to_micros,
};
use sentinel_storage::{read_timestamp, SqlxResultExt, StorageResult};

use crate::types::{Project, ProjectCreateInput, Run, RunCreateInput};

pub struct ProjectStorage {
    pool: SqlitePool,
}

impl ProjectStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== Projects ====================

    /// Create a project with the caller's identity
    pub async fn create_project(&self, input: ProjectCreateInput) -> StorageResult<Project> {
        require_non_empty("project id", &input.id)?;
        require_non_empty("project name", &input.name)?;
        if let Some(at) = &input.created_at {
            require_storable_timestamp("project created_at", at)?;
        }

        let project = Project {
            id: input.id,
            name: input.name,
            created_at: input.created_at.map(truncate_to_micros).unwrap_or_else(now),
        };

        debug!("Creating project '{}' with ID {}", project.name, project.id);

        sqlx::query("INSERT INTO projects (id, name, created_at) VALUES (?, ?, ?)")
            .bind(&project.id)
            .bind(&project.name)
            .bind(format_timestamp(project.created_at))
            .execute(&self.pool)
            .await
            .context("inserting project")?;

        Ok(project)
    }

    /// Get a project by ID
    pub async fn get_project(&self, id: &str) -> StorageResult<Option<Project>> {
        let row = sqlx::query("SELECT id, name, created_at FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("loading project")?;

        row.as_ref().map(row_to_project).transpose()
    }

    /// List all projects, newest first
    pub async fn list_projects(&self) -> StorageResult<Vec<Project>> {
        let rows = sqlx::query("SELECT id, name, created_at FROM projects ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .context("listing projects")?;

        rows.iter().map(row_to_project).collect()
    }

    // ==================== Runs ====================

    /// Create a run inside an existing project
    pub async fn create_run(&self, input: RunCreateInput) -> StorageResult<Run> {
        require_non_empty("run id", &input.id)?;
        require_non_empty("project id", &input.project_id)?;
        if let Some(at) = &input.created_at {
            require_storable_timestamp("run created_at", at)?;
        }

        let run = Run {
            id: input.id,
            project_id: input.project_id,
            created_at: input.created_at.map(truncate_to_micros).unwrap_or_else(now),
        };

        debug!("Creating run {} for project {}", run.id, run.project_id);

        sqlx::query("INSERT INTO runs (id, project_id, created_at) VALUES (?, ?, ?)")
            .bind(&run.id)
            .bind(&run.project_id)
            .bind(format_timestamp(run.created_at))
            .execute(&self.pool)
            .await
            .context("inserting run")?;

        Ok(run)
    }

    /// Get a run, scoped to its project
    pub async fn get_run(&self, project_id: &str, run_id: &str) -> StorageResult<Option<Run>> {
        let row = sqlx::query(
            "SELECT id, project_id, created_at FROM runs WHERE id = ? AND project_id = ?",
        )
        .bind(run_id)
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await
        .context("loading run")?;

        row.as_ref().map(row_to_run).transpose()
    }

    /// List the runs of a project in creation order
    pub async fn list_runs(&self, project_id: &str) -> StorageResult<Vec<Run>> {
        let rows = sqlx::query(
            "SELECT id, project_id, created_at FROM runs WHERE project_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .context("listing runs")?;

        rows.iter().map(row_to_run).collect()
    }
}

fn row_to_project(row: &SqliteRow) -> StorageResult<Project> {
    Ok(Project {
        id: row.try_get("id").context("decoding project")?,
        name: row.try_get("name").context("decoding project")?,
        created_at: read_timestamp(row, "created_at")?,
    })
}

fn row_to_run(row: &SqliteRow) -> StorageResult<Run> {
    Ok(Run {
        id: row.try_get("id").context("decoding run")?,
        project_id: row.try_get("project_id").context("decoding run")?,
        created_at: read_timestamp(row, "created_at")?,
    })
}
