//! Project store use-case service.
//!
//! # Responsibility
//! - Hold the in-memory project collection for one editing session.
//! - Expose project CRUD and typed task actions.
//! - Persist the whole snapshot after every effective mutation.
//!
//! # Invariants
//! - Mutations run through `&mut self`; two edits never interleave.
//! - The in-memory snapshot is updated before the save and kept on save
//!   failure; `reload` re-fetches the authoritative copy.
//! - Unknown project ids are silent no-ops and skip persistence.
//! - Loaded snapshots are repaired, never rejected, for invariant breaks.

use crate::model::collection::{reassign_duplicate_ids, ProjectCollection, RepairReport};
use crate::model::project::{Project, ProjectId, ProjectPatch};
use crate::model::task::TaskId;
use crate::repo::snapshot_repo::{RepoError, SnapshotRepository};
use crate::service::task_action::{apply_task_action, TaskAction};
use crate::tree::mutate::count_tasks;
use crate::tree::normalize::normalize;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::mem;

/// Result type used by store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Durable load or save failed. In-memory state is unchanged by the failure.
    Persistence(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence(err) => write!(f, "project snapshot persistence failed: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Persistence(value)
    }
}

/// Session-scoped project store over one persistence adapter.
pub struct ProjectStore<R: SnapshotRepository> {
    repo: R,
    snapshot: ProjectCollection,
}

impl<R: SnapshotRepository> ProjectStore<R> {
    /// Loads and repairs the snapshot from `repo`.
    pub fn open(repo: R) -> StoreResult<Self> {
        let mut snapshot = repo.load_snapshot().map_err(|err| {
            error!(
                "event=store_open module=store status=error backend={} error={}",
                repo.backend_name(),
                err
            );
            StoreError::from(err)
        })?;
        let report = snapshot.repair();
        log_repair(&report);
        info!(
            "event=store_open module=store status=ok backend={} projects={}",
            repo.backend_name(),
            snapshot.len()
        );
        Ok(Self { repo, snapshot })
    }

    /// Re-fetches the authoritative snapshot, discarding in-memory edits.
    ///
    /// On failure the current in-memory snapshot is kept.
    pub fn reload(&mut self) -> StoreResult<RepairReport> {
        let mut snapshot = self.repo.load_snapshot()?;
        let report = snapshot.repair();
        log_repair(&report);
        self.snapshot = snapshot;
        info!(
            "event=store_reload module=store status=ok projects={}",
            self.snapshot.len()
        );
        Ok(report)
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Current in-memory snapshot.
    pub fn snapshot(&self) -> &ProjectCollection {
        &self.snapshot
    }

    /// All projects in display order, trash included.
    pub fn projects(&self) -> &[Project] {
        self.snapshot.as_slice()
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.snapshot.get(id)
    }

    /// Projects listed in the sidebar.
    pub fn active_projects(&self) -> impl Iterator<Item = &Project> {
        self.snapshot.iter().filter(|project| project.is_active())
    }

    /// Projects listed in the trash view.
    pub fn trashed_projects(&self) -> impl Iterator<Item = &Project> {
        self.snapshot.iter().filter(|project| !project.is_active())
    }

    /// Picks the project a fresh session should open.
    ///
    /// The active default wins; otherwise the first project, unless it sits
    /// in the trash.
    pub fn default_selection(&self) -> Option<ProjectId> {
        if let Some(project) = self.active_projects().find(|project| project.is_default) {
            return Some(project.id);
        }
        self.snapshot
            .iter()
            .next()
            .filter(|project| project.is_active())
            .map(|project| project.id)
    }

    /// Creates an empty project and returns its id.
    ///
    /// Blank names are ignored and return `Ok(None)` without persisting.
    pub fn create_project(&mut self, name: &str) -> StoreResult<Option<ProjectId>> {
        if name.trim().is_empty() {
            return Ok(None);
        }
        let project = Project::new(name);
        let id = project.id;
        self.snapshot.push(project);
        self.persist("project_create")?;
        info!("event=project_create module=store status=ok project_id={id}");
        Ok(Some(id))
    }

    /// Merges `patch` into project `id`. Returns `false` for unknown ids.
    ///
    /// Task trees supplied through the patch get fresh ids for repeated nodes
    /// and are normalized on the way in. An empty patch skips the save.
    pub fn update_project(&mut self, id: ProjectId, mut patch: ProjectPatch) -> StoreResult<bool> {
        let Some(project) = self.snapshot.get_mut(id) else {
            return Ok(false);
        };
        if patch.is_empty() {
            return Ok(true);
        }
        let mut reassigned = 0;
        if let Some(mut tasks) = patch.tasks.take() {
            reassigned = reassign_duplicate_ids(&mut tasks);
            patch.tasks = Some(normalize(tasks));
        }
        project.apply_patch(patch);
        self.persist("project_update")?;
        info!(
            "event=project_update module=store status=ok project_id={id} task_ids_reassigned={reassigned}"
        );
        Ok(true)
    }

    /// Makes `id` the single default project.
    pub fn set_default(&mut self, id: ProjectId) -> StoreResult<bool> {
        if !self.snapshot.set_default(id) {
            return Ok(false);
        }
        self.persist("project_set_default")?;
        info!("event=project_set_default module=store status=ok project_id={id}");
        Ok(true)
    }

    /// Moves project `id` to the trash.
    ///
    /// Clearing a UI selection that points at it is the caller's job.
    pub fn soft_delete(&mut self, id: ProjectId) -> StoreResult<bool> {
        let Some(project) = self.snapshot.get_mut(id) else {
            return Ok(false);
        };
        project.soft_delete();
        self.persist("project_soft_delete")?;
        info!("event=project_soft_delete module=store status=ok project_id={id}");
        Ok(true)
    }

    /// Brings project `id` back from the trash.
    pub fn restore(&mut self, id: ProjectId) -> StoreResult<bool> {
        let Some(project) = self.snapshot.get_mut(id) else {
            return Ok(false);
        };
        project.restore();
        self.persist("project_restore")?;
        info!("event=project_restore module=store status=ok project_id={id}");
        Ok(true)
    }

    /// Removes project `id` and its tree for good.
    pub fn permanent_delete(&mut self, id: ProjectId) -> StoreResult<bool> {
        let Some(removed) = self.snapshot.remove(id) else {
            return Ok(false);
        };
        self.persist("project_permanent_delete")?;
        info!(
            "event=project_permanent_delete module=store status=ok project_id={id} tasks={}",
            count_tasks(&removed.tasks)
        );
        Ok(true)
    }

    /// Applies one task action to project `project_id` and persists.
    ///
    /// Returns the id of the inserted task for insert actions that found
    /// their target. Unknown projects are a no-op returning `Ok(None)`.
    pub fn task_action(
        &mut self,
        project_id: ProjectId,
        action: TaskAction,
    ) -> StoreResult<Option<TaskId>> {
        let Some(project) = self.snapshot.get_mut(project_id) else {
            return Ok(None);
        };
        let kind = action.kind();
        let applied = apply_task_action(mem::take(&mut project.tasks), action);
        project.tasks = applied.tasks;
        let tasks = count_tasks(&project.tasks);
        self.persist("task_action")?;
        info!(
            "event=task_action module=store status=ok project_id={project_id} kind={kind} tasks={tasks}"
        );
        Ok(applied.created)
    }

    fn persist(&self, operation: &'static str) -> StoreResult<()> {
        match self.repo.save_snapshot(&self.snapshot) {
            Ok(()) => Ok(()),
            Err(err) => {
                error!(
                    "event=snapshot_save module=store status=error operation={} backend={} error={}",
                    operation,
                    self.repo.backend_name(),
                    err
                );
                Err(err.into())
            }
        }
    }
}

fn log_repair(report: &RepairReport) {
    if report.is_clean() {
        return;
    }
    warn!(
        "event=snapshot_repair module=store status=ok duplicate_projects={} defaults_cleared={} task_ids_reassigned={} renormalized={}",
        report.duplicate_projects_dropped,
        report.defaults_cleared,
        report.task_ids_reassigned,
        report.projects_renormalized
    );
}
