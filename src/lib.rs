//! Tomato Timer - a state-managed HTTP server backing a Pomodoro popup
//!
//! The timer core lives in [`timer`]: a pure state machine advancing a
//! work/break cycle one second at a time. The surrounding service exposes
//! the user intents as a small HTTP API, persists a snapshot on every
//! committed change and survives host suspend/reload with only the
//! forward wall-clock projections recomputed.

pub mod api;
pub mod config;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::{AppState, TimerSnapshot};
pub use storage::StateStore;
pub use timer::TimerMachine;
pub use utils::signals::shutdown_signal;
