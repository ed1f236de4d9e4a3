//! Persistence adapters for the project collection snapshot.
//!
//! # Responsibility
//! - Define the snapshot-in/snapshot-out contract used by the store.
//! - Keep file and SQL details out of store orchestration.
//!
//! # Invariants
//! - `save_snapshot` replaces the whole durable collection; no deltas.
//! - `load_snapshot` on an empty backend returns an empty collection.
//! - Field naming translation stays inside each adapter.

pub mod json_repo;
pub mod snapshot_repo;
pub mod sqlite_repo;
