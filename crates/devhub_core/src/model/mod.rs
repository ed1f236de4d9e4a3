//! Domain model for Dev Hub projects and their task trees.
//!
//! # Responsibility
//! - Define the canonical `Task` / `Project` shapes shared by tree logic,
//!   store orchestration and persistence adapters.
//! - Own the camelCase wire schema through serde attributes.
//!
//! # Invariants
//! - Task ids are unique across one project's whole tree.
//! - At most one project in a collection carries `is_default = true`.
//! - Project deletion is a soft tombstone unless removed permanently.

pub mod collection;
pub mod project;
pub mod task;
