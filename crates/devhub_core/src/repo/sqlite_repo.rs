//! SQLite table snapshot repository.
//!
//! # Responsibility
//! - Persist one row per project in the `projects` table.
//! - Translate between snake_case columns and the in-memory model.
//!
//! # Invariants
//! - Save replaces every row inside one immediate transaction.
//! - Load order is `sort_order ASC, id ASC`, mirroring collection order.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::migrations::latest_version;
use crate::db::{open_db, open_db_in_memory};
use crate::model::collection::ProjectCollection;
use crate::model::project::Project;
use crate::model::task::Task;
use crate::repo::snapshot_repo::{RepoError, RepoResult, SnapshotRepository};
use chrono::{DateTime, SecondsFormat, Utc};
use log::info;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

const PROJECT_COLUMNS: [&str; 8] = [
    "id",
    "name",
    "description",
    "tasks_json",
    "is_default",
    "is_deleted",
    "created_at",
    "sort_order",
];

/// SQLite-backed snapshot repository owning its connection.
pub struct SqliteSnapshotRepository {
    conn: Connection,
}

impl SqliteSnapshotRepository {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_projects_connection_ready(&conn)?;
        Ok(Self { conn })
    }

    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::try_new(open_db(path)?)
    }

    pub fn open_in_memory() -> RepoResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Borrowed connection for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl SnapshotRepository for SqliteSnapshotRepository {
    fn load_snapshot(&self) -> RepoResult<ProjectCollection> {
        let started_at = Instant::now();
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                name,
                description,
                tasks_json,
                is_default,
                is_deleted,
                created_at
             FROM projects
             ORDER BY sort_order ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }

        info!(
            "event=snapshot_load module=repo backend=sqlite status=ok projects={} duration_ms={}",
            projects.len(),
            started_at.elapsed().as_millis()
        );
        Ok(ProjectCollection::from_projects(projects))
    }

    fn save_snapshot(&self, snapshot: &ProjectCollection) -> RepoResult<()> {
        let started_at = Instant::now();
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM projects;", [])?;

        for (index, project) in snapshot.iter().enumerate() {
            let tasks_json = serde_json::to_string(&project.tasks)?;
            tx.execute(
                "INSERT INTO projects (
                    id,
                    name,
                    description,
                    tasks_json,
                    is_default,
                    is_deleted,
                    created_at,
                    sort_order
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                params![
                    project.id.to_string(),
                    project.name.as_str(),
                    project.description.as_str(),
                    tasks_json,
                    bool_to_int(project.is_default),
                    bool_to_int(project.is_deleted),
                    project
                        .created_at
                        .to_rfc3339_opts(SecondsFormat::Millis, true),
                    index as i64,
                ],
            )?;
        }

        tx.commit()?;
        info!(
            "event=snapshot_save module=repo backend=sqlite status=ok projects={} duration_ms={}",
            snapshot.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{id_text}` in projects.id")))?;

    let tasks_text: String = row.get("tasks_json")?;
    let tasks: Vec<Task> = serde_json::from_str(&tasks_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid task tree in projects.tasks_json for {id}: {err}"))
    })?;

    let created_text: String = row.get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_text)
        .map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid timestamp `{created_text}` in projects.created_at"
            ))
        })?
        .with_timezone(&Utc);

    Ok(Project {
        id,
        name: row.get("name")?,
        description: row.get("description")?,
        tasks,
        is_default: parse_flag(row.get("is_default")?, "projects.is_default")?,
        is_deleted: parse_flag(row.get("is_deleted")?, "projects.is_deleted")?,
        created_at,
    })
}

fn parse_flag(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn ensure_projects_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "projects")? {
        return Err(RepoError::MissingRequiredTable("projects"));
    }

    for column in PROJECT_COLUMNS {
        if !table_has_column(conn, "projects", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "projects",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
