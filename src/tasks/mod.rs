//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod tick;

// Re-export main functions
pub use tick::tick_driver_task;
