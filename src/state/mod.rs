//! State management module
//!
//! This module contains the application state and the snapshot type that
//! every intent responds with and that gets persisted.

pub mod app_state;
pub mod snapshot;

// Re-export main types
pub use app_state::AppState;
pub use snapshot::TimerSnapshot;
