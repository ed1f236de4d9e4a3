//! Typed task actions and their dispatch onto tree transforms.
//!
//! # Invariants
//! - Every action variant carries exactly the fields it needs.
//! - Completion-affecting actions (toggle, delete, every insert) end with a
//!   full normalization pass; text and expansion edits do not.
//! - Unknown target ids leave the tree unchanged.

use crate::model::task::{Task, TaskId};
use crate::tree::mutate::{contains_task, delete_task, insert_child, insert_sibling, update_task};
use crate::tree::normalize::{cascade_toggle, normalize};

/// Display text given to a task created by [`TaskAction::AddSubtask`].
pub const NEW_SUBTASK_TEXT: &str = "New Subtask";

/// One checklist edit requested by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    /// Flip completion and cascade it to the subtree.
    Toggle { id: TaskId },
    /// Replace display text.
    EditText { id: TaskId, text: String },
    /// Remove the task and its subtree.
    Delete { id: TaskId },
    /// Append a new child under `parent_id`.
    AddSubtask { parent_id: TaskId },
    /// Flip UI expansion state.
    ToggleExpand { id: TaskId },
    /// Append a new root task.
    AddRoot { text: String },
    /// Insert an empty task right after `ref_id`.
    AddSibling { ref_id: TaskId },
}

impl TaskAction {
    /// Stable label used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Toggle { .. } => "toggle",
            Self::EditText { .. } => "text",
            Self::Delete { .. } => "delete",
            Self::AddSubtask { .. } => "add_sub",
            Self::ToggleExpand { .. } => "expand",
            Self::AddRoot { .. } => "add",
            Self::AddSibling { .. } => "add_sibling",
        }
    }

    /// Returns whether the action may change derived completion flags.
    pub fn affects_completion(&self) -> bool {
        !matches!(self, Self::EditText { .. } | Self::ToggleExpand { .. })
    }
}

/// Result of applying one action to a root sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedAction {
    pub tasks: Vec<Task>,
    /// Id of the inserted task, when the action inserted one.
    pub created: Option<TaskId>,
}

/// Applies `action` to `tasks` and returns the new tree.
///
/// Actions that may change completion end with a full normalization pass.
pub fn apply_task_action(tasks: Vec<Task>, action: TaskAction) -> AppliedAction {
    let renormalize = action.affects_completion();
    let (tasks, created) = dispatch(tasks, action);
    AppliedAction {
        tasks: if renormalize { normalize(tasks) } else { tasks },
        created,
    }
}

fn dispatch(tasks: Vec<Task>, action: TaskAction) -> (Vec<Task>, Option<TaskId>) {
    match action {
        TaskAction::Toggle { id } => (cascade_toggle(tasks, id), None),
        TaskAction::EditText { id, text } => {
            let tasks = update_task(tasks, id, move |mut task| {
                task.text = text;
                task
            });
            (tasks, None)
        }
        TaskAction::Delete { id } => (delete_task(tasks, id), None),
        TaskAction::AddSubtask { parent_id } => {
            if !contains_task(&tasks, parent_id) {
                return (tasks, None);
            }
            let child = Task::new(NEW_SUBTASK_TEXT);
            let created = child.id;
            (insert_child(tasks, parent_id, child), Some(created))
        }
        TaskAction::ToggleExpand { id } => {
            let tasks = update_task(tasks, id, |mut task| {
                task.is_expanded = !task.is_expanded;
                task
            });
            (tasks, None)
        }
        TaskAction::AddRoot { text } => {
            let root = Task::new(text);
            let created = root.id;
            let mut tasks = tasks;
            tasks.push(root);
            (tasks, Some(created))
        }
        TaskAction::AddSibling { ref_id } => {
            if !contains_task(&tasks, ref_id) {
                return (tasks, None);
            }
            let sibling = Task::new("");
            let created = sibling.id;
            (insert_sibling(tasks, ref_id, sibling), Some(created))
        }
    }
}
