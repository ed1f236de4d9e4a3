//! Flat JSON file snapshot repository.
//!
//! # Responsibility
//! - Persist the project collection as one pretty-printed JSON array.
//! - Bootstrap an empty `[]` file on first load.
//!
//! # Invariants
//! - Writes are atomic: temp file in the target directory, then rename.
//! - A corrupt file is reported, never silently overwritten.

use crate::model::collection::ProjectCollection;
use crate::repo::snapshot_repo::{RepoError, RepoResult, SnapshotRepository};
use log::{error, info};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

const EMPTY_SNAPSHOT: &str = "[]";

/// JSON-file-backed snapshot repository.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotRepository {
    path: PathBuf,
}

impl JsonFileSnapshotRepository {
    /// Creates a repository for `path`. Nothing is touched until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> RepoError {
        RepoError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn ensure_parent_dir(&self) -> RepoResult<()> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                std::fs::create_dir_all(dir).map_err(|err| self.io_error(err))
            }
            _ => Ok(()),
        }
    }

    fn write_atomic(&self, content: &[u8]) -> RepoResult<()> {
        self.ensure_parent_dir()?;
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|err| self.io_error(err))?;
        tmp.write_all(content).map_err(|err| self.io_error(err))?;
        tmp.flush().map_err(|err| self.io_error(err))?;
        tmp.persist(&self.path).map_err(|err| self.io_error(err.error))?;
        Ok(())
    }
}

impl SnapshotRepository for JsonFileSnapshotRepository {
    fn load_snapshot(&self) -> RepoResult<ProjectCollection> {
        let started_at = Instant::now();
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.write_atomic(EMPTY_SNAPSHOT.as_bytes())?;
                info!(
                    "event=snapshot_load module=repo backend=json status=ok created_empty=true duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                return Ok(ProjectCollection::new());
            }
            Err(err) => return Err(self.io_error(err)),
        };

        let snapshot: ProjectCollection = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!(
                    "event=snapshot_load module=repo backend=json status=error error_code=invalid_json line={} column={}",
                    err.line(),
                    err.column()
                );
                return Err(err.into());
            }
        };

        info!(
            "event=snapshot_load module=repo backend=json status=ok projects={} duration_ms={}",
            snapshot.len(),
            started_at.elapsed().as_millis()
        );
        Ok(snapshot)
    }

    fn save_snapshot(&self, snapshot: &ProjectCollection) -> RepoResult<()> {
        let started_at = Instant::now();
        let body = serde_json::to_string_pretty(snapshot)?;
        self.write_atomic(body.as_bytes())?;
        info!(
            "event=snapshot_save module=repo backend=json status=ok projects={} bytes={} duration_ms={}",
            snapshot.len(),
            body.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "json"
    }
}
