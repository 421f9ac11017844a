//! Phase and ledger action enumerations

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the Pomodoro run
///
/// `Init` is the only start state; `Finished` is terminal and accepts no
/// further ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Init,
    Work,
    Rest,
    Finished,
}

impl Phase {
    /// Check whether this phase accepts ticks
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Finished)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Init => write!(f, "init"),
            Phase::Work => write!(f, "work"),
            Phase::Rest => write!(f, "rest"),
            Phase::Finished => write!(f, "finished"),
        }
    }
}

/// User action recorded alongside a ledger entry
///
/// Automatic phase rollovers carry no action; only user-driven toggles do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerAction {
    Start,
    Resume,
    Paused,
}
