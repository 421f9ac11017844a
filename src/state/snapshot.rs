//! The serializable timer snapshot
//!
//! One document carrying the full run clock, the settings and the derived
//! scratch fields. It is both the wire shape every intent responds with
//! and the record the persistence gateway stores. Timestamps serialize as
//! RFC 3339 and come back as proper instants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{DerivedProgress, Phase, RunClock, Settings, SettingsFloor, TimerMachine};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub clock: RunClock,
    pub settings: Settings,
    pub is_active: bool,
    pub current_phase: Phase,
    pub is_finished: bool,
    /// Seconds ticked in the current phase
    pub phase_elapsed_seconds: u64,
    pub progress: DerivedProgress,
    /// Projected wall-clock start of the next break, while working
    pub next_break: Option<DateTime<Utc>>,
    /// Seconds left in the current break, while resting
    pub remaining_rest_seconds: u64,
    /// Per-field minimums for settings inputs
    pub settings_floor: SettingsFloor,
}

impl TimerSnapshot {
    pub fn of(machine: &TimerMachine) -> Self {
        Self {
            clock: machine.clock().clone(),
            settings: machine.settings().clone(),
            is_active: machine.is_running(),
            current_phase: machine.current_phase(),
            is_finished: machine.is_finished(),
            phase_elapsed_seconds: machine.phase_elapsed(),
            progress: machine.progress(),
            next_break: machine.next_break(),
            remaining_rest_seconds: machine.remaining_rest(),
            settings_floor: machine.settings_floor(),
        }
    }

    /// Rebuild the machine this snapshot was taken from
    pub fn into_machine(self) -> TimerMachine {
        TimerMachine::restore(
            self.settings,
            self.clock,
            self.is_active,
            self.phase_elapsed_seconds,
            self.next_break,
            self.remaining_rest_seconds,
            self.progress,
        )
    }
}
