//! Completion status normalizer and cascading toggle.
//!
//! # Responsibility
//! - Recompute every non-leaf completion flag from its children.
//! - Toggle a node and force its whole subtree to the new flag.
//!
//! # Invariants
//! - Post-order walk: children settle before their parent is recomputed.
//! - Leaf flags pass through unchanged.
//! - `normalize(normalize(t)) == normalize(t)`.

use crate::model::task::{Task, TaskId};
use crate::tree::mutate::update_task;
use std::mem;

/// Re-derives every non-leaf completion flag bottom-up.
pub fn normalize(tasks: Vec<Task>) -> Vec<Task> {
    tasks.into_iter().map(normalize_task).collect()
}

fn normalize_task(mut task: Task) -> Task {
    if task.subtasks.is_empty() {
        return task;
    }
    task.subtasks = normalize(mem::take(&mut task.subtasks));
    task.is_completed = task.subtasks.iter().all(|child| child.is_completed);
    task
}

/// Returns whether every non-leaf flag already equals the AND of its children.
pub fn is_normalized(tasks: &[Task]) -> bool {
    tasks.iter().all(|task| {
        task.subtasks.is_empty()
            || (is_normalized(&task.subtasks)
                && task.is_completed == task.subtasks.iter().all(|child| child.is_completed))
    })
}

/// Sets `completed` on `task` and every descendant.
pub fn set_subtree_completion(task: &mut Task, completed: bool) {
    task.is_completed = completed;
    for child in &mut task.subtasks {
        set_subtree_completion(child, completed);
    }
}

/// Flips `target` and forces the new flag onto its descendants.
///
/// Ancestors are left stale; callers normalize afterwards.
pub fn cascade_toggle(tasks: Vec<Task>, target: TaskId) -> Vec<Task> {
    update_task(tasks, target, |mut task| {
        let next = !task.is_completed;
        set_subtree_completion(&mut task, next);
        task
    })
}

/// Flips `target` and cascades the new flag to its descendants, then
/// re-normalizes the whole tree so ancestors re-derive.
pub fn toggle_task(tasks: Vec<Task>, target: TaskId) -> Vec<Task> {
    normalize(cascade_toggle(tasks, target))
}
