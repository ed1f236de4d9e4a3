//! Read-only visibility projection for task lists.
//!
//! Decides which nodes a checklist view renders when completed items are
//! hidden. A completed node is hidden only in blind mode with
//! `show_completed` off, and never while its parent is still open.

use crate::model::task::{Task, TaskId};

/// View switches that affect which tasks are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityOptions {
    pub show_completed: bool,
    pub blind_mode: bool,
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            show_completed: false,
            blind_mode: true,
        }
    }
}

/// One rendered row in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow<'a> {
    pub task: &'a Task,
    /// 0 for root tasks.
    pub depth: usize,
}

impl VisibleRow<'_> {
    pub fn id(&self) -> TaskId {
        self.task.id
    }
}

/// Returns a filtered copy of the tree; hidden nodes drop their subtree.
///
/// Expansion state is ignored here; collapsed nodes keep their children.
pub fn visible_tasks(tasks: &[Task], options: VisibilityOptions) -> Vec<Task> {
    filter_level(tasks, true, 0, options)
}

fn filter_level(
    tasks: &[Task],
    parent_completed: bool,
    depth: usize,
    options: VisibilityOptions,
) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| is_visible(task, parent_completed, depth, options))
        .map(|task| Task {
            subtasks: filter_level(&task.subtasks, task.is_completed, depth + 1, options),
            ..task.clone()
        })
        .collect()
}

/// Flattens the tree into rendered rows, descending only into expanded nodes.
///
/// Row order is the keyboard focus order of the checklist.
pub fn visible_rows(tasks: &[Task], options: VisibilityOptions) -> Vec<VisibleRow<'_>> {
    let mut rows = Vec::new();
    push_rows(tasks, true, 0, options, &mut rows);
    rows
}

fn push_rows<'a>(
    tasks: &'a [Task],
    parent_completed: bool,
    depth: usize,
    options: VisibilityOptions,
    rows: &mut Vec<VisibleRow<'a>>,
) {
    for task in tasks {
        if !is_visible(task, parent_completed, depth, options) {
            continue;
        }
        rows.push(VisibleRow { task, depth });
        if task.is_expanded {
            push_rows(&task.subtasks, task.is_completed, depth + 1, options, rows);
        }
    }
}

fn is_visible(
    task: &Task,
    parent_completed: bool,
    depth: usize,
    options: VisibilityOptions,
) -> bool {
    let should_hide = !options.show_completed && task.is_completed;
    let force_show = depth > 0 && !parent_completed;
    !(should_hide && !force_show && options.blind_mode)
}
