//! Project domain model.
//!
//! # Responsibility
//! - Define one project: metadata, notes and its root task sequence.
//! - Provide lifecycle helpers for soft-delete semantics.
//! - Define merge-style partial updates (`ProjectPatch`).
//!
//! # Invariants
//! - `id` and `created_at` never change after creation.
//! - `is_deleted` is the source of truth for trash state.

use crate::model::task::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of one project.
pub type ProjectId = Uuid;

/// One tracked project with its checklist and free-text notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Free-form documentation/notes body.
    #[serde(default)]
    pub description: String,
    /// Root task sequence in display order.
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub is_default: bool,
    /// Soft delete tombstone; deleted projects live in the trash view.
    #[serde(default)]
    pub is_deleted: bool,
    /// Serialized as RFC 3339 to match the external schema. Required on load
    /// so the original creation time is never replaced.
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Creates an empty, non-default, active project with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates an empty project with a caller-provided id.
    pub fn with_id(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            tasks: Vec::new(),
            is_default: false,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    /// Marks this project as softly deleted.
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    /// Clears the soft delete flag.
    pub fn restore(&mut self) {
        self.is_deleted = false;
    }

    /// Returns whether this project should be listed outside the trash.
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    /// Merges every field present in `patch` into this project.
    pub fn apply_patch(&mut self, patch: ProjectPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(tasks) = patch.tasks {
            self.tasks = tasks;
        }
    }
}

/// Partial update for user-editable project fields.
///
/// `None` leaves the field untouched. Flags and identity are changed only
/// through dedicated store operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tasks: Option<Vec<Task>>,
}

impl ProjectPatch {
    pub fn name(value: impl Into<String>) -> Self {
        Self {
            name: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn description(value: impl Into<String>) -> Self {
        Self {
            description: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn tasks(value: Vec<Task>) -> Self {
        Self {
            tasks: Some(value),
            ..Self::default()
        }
    }

    /// Returns whether applying this patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.tasks.is_none()
    }
}
