//! Node locator and structural mutators.
//!
//! # Responsibility
//! - Find a node by id anywhere in a root sequence.
//! - Update, delete, insert-child and insert-sibling by id.
//!
//! # Invariants
//! - Every function is total over ids: unknown id returns input unchanged.
//! - Sibling order of untouched nodes is preserved.
//! - Completion flags are not re-derived here; see `tree::normalize`.

use crate::model::task::{Task, TaskId};
use std::mem;

/// Replaces the node `target` with `update(node)`.
///
/// The node's children are left alone unless `update` changes them.
pub fn update_task<F>(tasks: Vec<Task>, target: TaskId, update: F) -> Vec<Task>
where
    F: FnOnce(Task) -> Task,
{
    let mut pending = Some(update);
    update_in(tasks, target, &mut pending)
}

fn update_in<F>(tasks: Vec<Task>, target: TaskId, pending: &mut Option<F>) -> Vec<Task>
where
    F: FnOnce(Task) -> Task,
{
    tasks
        .into_iter()
        .map(|mut task| {
            if task.id == target {
                return match pending.take() {
                    Some(update) => update(task),
                    None => task,
                };
            }
            if pending.is_some() && !task.subtasks.is_empty() {
                task.subtasks = update_in(mem::take(&mut task.subtasks), target, pending);
            }
            task
        })
        .collect()
}

/// Removes the subtree rooted at `target` from whichever sequence holds it.
pub fn delete_task(tasks: Vec<Task>, target: TaskId) -> Vec<Task> {
    tasks
        .into_iter()
        .filter(|task| task.id != target)
        .map(|mut task| {
            if !task.subtasks.is_empty() {
                task.subtasks = delete_task(mem::take(&mut task.subtasks), target);
            }
            task
        })
        .collect()
}

/// Appends `child` to `parent`'s subtasks and expands the parent.
pub fn insert_child(tasks: Vec<Task>, parent: TaskId, child: Task) -> Vec<Task> {
    update_task(tasks, parent, move |mut node| {
        node.subtasks.push(child);
        node.is_expanded = true;
        node
    })
}

/// Inserts `sibling` right after `reference` in the sequence containing it.
///
/// Each level is scanned before recursing into its children.
pub fn insert_sibling(tasks: Vec<Task>, reference: TaskId, sibling: Task) -> Vec<Task> {
    let mut pending = Some(sibling);
    insert_sibling_in(tasks, reference, &mut pending)
}

fn insert_sibling_in(
    mut tasks: Vec<Task>,
    reference: TaskId,
    pending: &mut Option<Task>,
) -> Vec<Task> {
    if let Some(index) = tasks.iter().position(|task| task.id == reference) {
        if let Some(sibling) = pending.take() {
            tasks.insert(index + 1, sibling);
        }
        return tasks;
    }

    for task in &mut tasks {
        if pending.is_none() {
            break;
        }
        if !task.subtasks.is_empty() {
            task.subtasks = insert_sibling_in(mem::take(&mut task.subtasks), reference, pending);
        }
    }
    tasks
}

/// Finds a node by id with a pre-order depth-first walk.
pub fn find_task(tasks: &[Task], target: TaskId) -> Option<&Task> {
    for task in tasks {
        if task.id == target {
            return Some(task);
        }
        if let Some(found) = find_task(&task.subtasks, target) {
            return Some(found);
        }
    }
    None
}

/// Returns whether any node in the tree has id `target`.
pub fn contains_task(tasks: &[Task], target: TaskId) -> bool {
    find_task(tasks, target).is_some()
}

/// Counts every node at every depth.
pub fn count_tasks(tasks: &[Task]) -> usize {
    tasks
        .iter()
        .map(|task| 1 + count_tasks(&task.subtasks))
        .sum()
}

/// Counts completed nodes at every depth.
pub fn count_completed(tasks: &[Task]) -> usize {
    tasks
        .iter()
        .map(|task| usize::from(task.is_completed) + count_completed(&task.subtasks))
        .sum()
}

/// Collects every id in pre-order.
pub fn collect_ids(tasks: &[Task]) -> Vec<TaskId> {
    let mut ids = Vec::new();
    collect_ids_into(tasks, &mut ids);
    ids
}

fn collect_ids_into(tasks: &[Task], ids: &mut Vec<TaskId>) {
    for task in tasks {
        ids.push(task.id);
        collect_ids_into(&task.subtasks, ids);
    }
}
