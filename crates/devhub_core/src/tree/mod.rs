//! Pure task-tree transforms.
//!
//! # Responsibility
//! - Locate nodes by id with explicit depth-first walks.
//! - Apply update/insert/delete transforms that return a new tree.
//! - Re-derive non-leaf completion flags bottom-up.
//!
//! # Invariants
//! - Transforms consume the old root sequence and never alias it.
//! - An absent target id is a no-op, never an error.
//! - Trees own their children; no transform relies on parent links.

pub mod mutate;
pub mod normalize;
pub mod visibility;
