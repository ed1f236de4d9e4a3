//! Task tree node model.
//!
//! # Responsibility
//! - Define the recursive checklist node owned by a project.
//!
//! # Invariants
//! - `id` is assigned at creation and never changes.
//! - A node with children derives `is_completed` from them after
//!   normalization; only leaves hold independent completion state.
//! - Children are owned directly; there is no parent back-reference.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of one task node.
pub type TaskId = Uuid;

/// One checklist item with its ordered subtasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique within the owning project's tree.
    pub id: TaskId,
    /// Display text. May be empty.
    pub text: String,
    /// Completion flag. Derived for non-leaf nodes.
    pub is_completed: bool,
    /// Ordered children; order defines render and traversal order.
    #[serde(default)]
    pub subtasks: Vec<Task>,
    /// UI-only expansion state; never affects tree semantics.
    #[serde(default)]
    pub is_expanded: bool,
}

impl Task {
    /// Creates an incomplete, expanded leaf with a generated id.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), text)
    }

    /// Creates an incomplete, expanded leaf with a caller-provided id.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(id: TaskId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            is_completed: false,
            subtasks: Vec::new(),
            is_expanded: true,
        }
    }

    /// Returns whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.subtasks.is_empty()
    }
}
