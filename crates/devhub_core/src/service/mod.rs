//! Store use-case services.
//!
//! # Responsibility
//! - Orchestrate tree transforms and persistence into project-level APIs.
//! - Keep UI-facing callers decoupled from storage details.

pub mod project_store;
pub mod task_action;
