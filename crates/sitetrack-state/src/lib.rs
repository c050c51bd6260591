//! Hierarchical selection-state contexts for the sitetrack client.
//!
//! Each context is a cheap `Clone` handle over shared state, rehydrated
//! from its snapshot at construction and persisted write-through after
//! every mutation. In-memory state is committed for readers before the
//! durable write confirms; a failed persist is logged, never surfaced to
//! the mutator. Every lookup is total: a miss returns `None`, not an
//! error.

mod design_forms;
mod location;
mod project;
mod session;

pub use design_forms::DesignFormStore;
pub use location::LocationContext;
pub use project::ProjectContext;
pub use session::SessionContext;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a context mutex, recovering from poisoning. Context state stays
/// valid across a panicking writer because every mutation is a single
/// field-level assignment.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
