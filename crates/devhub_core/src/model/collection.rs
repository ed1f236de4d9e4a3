//! Project collection snapshot.
//!
//! # Responsibility
//! - Hold the full set of projects persisted as one snapshot.
//! - Provide keyed lookup with stable, insertion-ordered iteration.
//! - Repair invariant violations found in untrusted snapshots.
//!
//! # Invariants
//! - Project ids are unique within the collection.
//! - Iteration order is the order projects were added or loaded.

use crate::model::project::{Project, ProjectId};
use crate::model::task::{Task, TaskId};
use crate::tree::normalize::{is_normalized, normalize};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Full Project collection; the unit of persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectCollection {
    projects: Vec<Project>,
}

/// Summary of fixes applied by [`ProjectCollection::repair`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Later projects sharing an id with an earlier one.
    pub duplicate_projects_dropped: usize,
    /// Default flags cleared because an earlier project already held it.
    pub defaults_cleared: usize,
    /// Tasks given a fresh id because the id was already used in the tree.
    pub task_ids_reassigned: usize,
    /// Projects whose derived completion flags disagreed with their children.
    pub projects_renormalized: usize,
}

impl RepairReport {
    /// Returns whether the snapshot needed no repair.
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

impl ProjectCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps loaded projects as-is; call [`Self::repair`] for untrusted input.
    pub fn from_projects(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Project> {
        self.projects.iter()
    }

    pub fn as_slice(&self) -> &[Project] {
        &self.projects
    }

    pub fn into_projects(self) -> Vec<Project> {
        self.projects
    }

    pub fn get(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    pub fn get_mut(&mut self, id: ProjectId) -> Option<&mut Project> {
        self.projects.iter_mut().find(|project| project.id == id)
    }

    pub fn contains(&self, id: ProjectId) -> bool {
        self.get(id).is_some()
    }

    /// Appends a project. Returns `false` and leaves the collection unchanged
    /// when the id is already present.
    pub fn push(&mut self, project: Project) -> bool {
        if self.contains(project.id) {
            return false;
        }
        self.projects.push(project);
        true
    }

    /// Removes and returns the project with `id`.
    pub fn remove(&mut self, id: ProjectId) -> Option<Project> {
        let index = self.projects.iter().position(|project| project.id == id)?;
        Some(self.projects.remove(index))
    }

    /// Makes `id` the only default project.
    ///
    /// Returns `false` without touching any flag when `id` is unknown.
    pub fn set_default(&mut self, id: ProjectId) -> bool {
        if !self.contains(id) {
            return false;
        }
        for project in &mut self.projects {
            project.is_default = project.id == id;
        }
        true
    }

    /// Returns the project currently flagged as default, if any.
    pub fn default_project(&self) -> Option<&Project> {
        self.projects.iter().find(|project| project.is_default)
    }

    /// Repairs invariant violations in place instead of rejecting the snapshot.
    ///
    /// - Duplicate project ids: first seen wins, later ones are dropped.
    /// - Multiple defaults: first seen keeps the flag.
    /// - Duplicate task ids inside one tree: later nodes get fresh ids.
    /// - Inconsistent non-leaf completion: tree is re-normalized.
    pub fn repair(&mut self) -> RepairReport {
        let mut report = RepairReport::default();

        let mut seen_projects = HashSet::new();
        let before = self.projects.len();
        self.projects.retain(|project| seen_projects.insert(project.id));
        report.duplicate_projects_dropped = before - self.projects.len();

        let mut default_seen = false;
        for project in &mut self.projects {
            if project.is_default {
                if default_seen {
                    project.is_default = false;
                    report.defaults_cleared += 1;
                }
                default_seen = true;
            }

            report.task_ids_reassigned += reassign_duplicate_ids(&mut project.tasks);

            if !is_normalized(&project.tasks) {
                project.tasks = normalize(std::mem::take(&mut project.tasks));
                report.projects_renormalized += 1;
            }
        }

        report
    }
}

impl<'a> IntoIterator for &'a ProjectCollection {
    type Item = &'a Project;
    type IntoIter = std::slice::Iter<'a, Project>;

    fn into_iter(self) -> Self::IntoIter {
        self.projects.iter()
    }
}

/// Gives a fresh id to every node whose id already appeared earlier in the
/// pre-order walk of `tasks`. Returns how many nodes were renamed.
pub(crate) fn reassign_duplicate_ids(tasks: &mut [Task]) -> usize {
    reassign_duplicates_in(tasks, &mut HashSet::new())
}

fn reassign_duplicates_in(tasks: &mut [Task], seen: &mut HashSet<TaskId>) -> usize {
    let mut reassigned = 0;
    for task in tasks {
        if !seen.insert(task.id) {
            let mut fresh = Uuid::new_v4();
            while !seen.insert(fresh) {
                fresh = Uuid::new_v4();
            }
            task.id = fresh;
            reassigned += 1;
        }
        reassigned += reassign_duplicates_in(&mut task.subtasks, seen);
    }
    reassigned
}
