//! Timer core
//!
//! The pure Pomodoro logic: settings, durations, the transition ledger,
//! the run clock, derived progress, and the state machine that ties them
//! together. Everything here is synchronous and takes explicit instants,
//! so it is driven identically by the tick task and by tests.

pub mod clock;
pub mod duration;
pub mod ledger;
pub mod machine;
pub mod phase;
pub mod progress;
pub mod settings;

pub use clock::RunClock;
pub use ledger::{HistoryEntry, Ledger};
pub use machine::{TimerMachine, ToggleOutcome};
pub use phase::{LedgerAction, Phase};
pub use progress::DerivedProgress;
pub use settings::{Settings, SettingsFloor, SettingsPatch};
