//! Snapshot repository contract and shared error type.

use crate::db::DbError;
use crate::model::collection::ProjectCollection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Result type used by snapshot repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from durable snapshot reads and writes.
#[derive(Debug)]
pub enum RepoError {
    /// File-system failure on the snapshot path.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Snapshot bytes are not a valid project collection.
    Serialization(serde_json::Error),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "snapshot io failed at `{}`: {source}", path.display())
            }
            Self::Serialization(err) => write!(f, "invalid snapshot json: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "snapshot repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "snapshot repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "snapshot repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted snapshot data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialization(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable storage for the whole project collection.
pub trait SnapshotRepository {
    /// Returns the current full collection, empty when nothing was saved yet.
    fn load_snapshot(&self) -> RepoResult<ProjectCollection>;
    /// Replaces the entire durable collection with `snapshot`.
    fn save_snapshot(&self, snapshot: &ProjectCollection) -> RepoResult<()>;
    /// Short backend label used in log events.
    fn backend_name(&self) -> &'static str;
}

impl<R: SnapshotRepository + ?Sized> SnapshotRepository for Box<R> {
    fn load_snapshot(&self) -> RepoResult<ProjectCollection> {
        (**self).load_snapshot()
    }

    fn save_snapshot(&self, snapshot: &ProjectCollection) -> RepoResult<()> {
        (**self).save_snapshot(snapshot)
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}
