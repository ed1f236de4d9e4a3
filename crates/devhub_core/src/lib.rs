//! Core domain logic for Dev Hub.
//! This crate is the single source of truth for task-tree invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod tree;

pub use config::{open_store, ConfigError, CoreConfig, StoreBackend};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::collection::{ProjectCollection, RepairReport};
pub use model::project::{Project, ProjectId, ProjectPatch};
pub use model::task::{Task, TaskId};
pub use repo::json_repo::JsonFileSnapshotRepository;
pub use repo::snapshot_repo::{RepoError, RepoResult, SnapshotRepository};
pub use repo::sqlite_repo::SqliteSnapshotRepository;
pub use service::project_store::{ProjectStore, StoreError, StoreResult};
pub use service::task_action::{apply_task_action, AppliedAction, TaskAction, NEW_SUBTASK_TEXT};
pub use tree::visibility::{visible_rows, visible_tasks, VisibilityOptions, VisibleRow};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
