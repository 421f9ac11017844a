//! The run clock: aggregate counters plus the transition ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ledger::Ledger;
use super::phase::Phase;

/// Everything a run has accumulated so far.
///
/// Owned exclusively by the state machine; intent handlers and the tick
/// driver mutate it only through the machine's transition operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunClock {
    /// Wall-clock instant of the first Start action
    pub start_time: Option<DateTime<Utc>>,
    /// Projected finish; recomputed on every resume
    pub end_time: Option<DateTime<Utc>>,
    /// Seconds actually ticked across the whole run
    pub total_seconds: u64,
    /// Completed work/short-break cycles within the current session
    pub cycles_done: u64,
    /// Completed sessions within the run
    pub sessions_done: u64,
    pub history: Ledger,
}

impl RunClock {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            start_time: None,
            end_time: None,
            total_seconds: 0,
            cycles_done: 0,
            sessions_done: 0,
            history: Ledger::new(created_at),
        }
    }

    pub fn current_phase(&self) -> Phase {
        self.history.current_phase()
    }
}
