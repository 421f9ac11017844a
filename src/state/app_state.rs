//! Main application state management

use std::sync::Mutex;

use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::storage::StateStore;
use crate::timer::{SettingsPatch, TimerMachine, ToggleOutcome};

use super::TimerSnapshot;

/// How a commit touches the persistence gateway
enum Persistence {
    Save,
    Clear,
}

/// Application state owning the timer machine
///
/// The machine lives behind one mutex; the tick task and the intent
/// handlers are its only mutators, and every mutation commits in a single
/// lock scope, persists the resulting snapshot and publishes it.
#[derive(Debug)]
pub struct AppState {
    machine: Mutex<TimerMachine>,
    store: StateStore,
    /// Snapshot fan-out for passive observers (open popups)
    snapshot_tx: broadcast::Sender<TimerSnapshot>,
    /// Gate for the tick driver: true while the machine is running
    running_tx: watch::Sender<bool>,
    /// Keep the receiver alive to prevent channel closure
    _running_rx: watch::Receiver<bool>,
}

impl AppState {
    pub fn new(machine: TimerMachine, store: StateStore) -> Self {
        let (snapshot_tx, _) = broadcast::channel(100);
        let (running_tx, running_rx) = watch::channel(machine.is_running());

        Self {
            machine: Mutex::new(machine),
            store,
            snapshot_tx,
            running_tx,
            _running_rx: running_rx,
        }
    }

    /// Subscribe to every committed snapshot
    pub fn subscribe(&self) -> broadcast::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Watch the running flag that gates the tick driver
    pub fn running_watch(&self) -> watch::Receiver<bool> {
        self.running_tx.subscribe()
    }

    /// Read the current snapshot without mutating anything
    pub fn snapshot(&self) -> Result<TimerSnapshot, String> {
        self.machine
            .lock()
            .map(|machine| TimerSnapshot::of(&machine))
            .map_err(|e| format!("Failed to lock timer machine: {}", e))
    }

    /// Apply one mutation to the machine and commit the result
    fn mutate<F, R>(&self, mutator: F) -> Result<(TimerSnapshot, R), String>
    where
        F: FnOnce(&mut TimerMachine) -> R,
    {
        self.mutate_with(Persistence::Save, mutator)
    }

    fn mutate_with<F, R>(
        &self,
        persistence: Persistence,
        mutator: F,
    ) -> Result<(TimerSnapshot, R), String>
    where
        F: FnOnce(&mut TimerMachine) -> R,
    {
        let mut machine = self
            .machine
            .lock()
            .map_err(|e| format!("Failed to lock timer machine: {}", e))?;

        let outcome = mutator(&mut machine);
        let snapshot = TimerSnapshot::of(&machine);

        // Commit while still holding the lock: the running flag gates the
        // tick driver and the store is the reload source of truth, so
        // snapshots must land in mutation order.
        self.commit(&snapshot, persistence);
        drop(machine);

        Ok((snapshot, outcome))
    }

    fn commit(&self, snapshot: &TimerSnapshot, persistence: Persistence) {
        // Only a genuine flip should wake the tick driver
        self.running_tx.send_if_modified(|running| {
            if *running != snapshot.is_active {
                *running = snapshot.is_active;
                true
            } else {
                false
            }
        });

        let stored = match persistence {
            Persistence::Save => self.store.save(snapshot),
            Persistence::Clear => self.store.clear(),
        };
        if let Err(e) = stored {
            // The in-memory state stays authoritative; the next commit
            // retries the flush.
            warn!("Failed to update persisted snapshot: {}", e);
        }

        // No receivers just means no popup is open right now
        let _ = self.snapshot_tx.send(snapshot.clone());
    }

    /// Handle the toggle intent
    pub fn toggle(&self) -> Result<TimerSnapshot, String> {
        let (snapshot, outcome) = self.mutate(|machine| machine.toggle(Utc::now()))?;
        match outcome {
            ToggleOutcome::Started => info!("Timer started"),
            ToggleOutcome::Paused => info!("Timer paused"),
            ToggleOutcome::Resumed => info!("Timer resumed"),
            ToggleOutcome::Stale => info!("Stale toggle after finish, ignored"),
        }
        Ok(snapshot)
    }

    /// Handle the settings update intent
    pub fn update_settings(&self, patch: SettingsPatch) -> Result<TimerSnapshot, String> {
        let (snapshot, _) = self.mutate(|machine| machine.update_settings(&patch))?;
        info!(
            "Settings now {}min work, {}min/{}min breaks, {}x{}",
            snapshot.settings.work_minutes,
            snapshot.settings.short_break_minutes,
            snapshot.settings.long_break_minutes,
            snapshot.settings.cycles_per_session,
            snapshot.settings.sessions_total,
        );
        Ok(snapshot)
    }

    /// Handle the delete-all intent: back to defaults, with no record
    /// left in the store. The fresh state persists again on its next
    /// change.
    pub fn reset(&self) -> Result<TimerSnapshot, String> {
        let (snapshot, _) =
            self.mutate_with(Persistence::Clear, |machine| machine.reset(Utc::now()))?;
        Ok(snapshot)
    }

    /// Advance the machine by one tick. Called only by the tick driver.
    pub fn advance_tick(&self) -> Result<TimerSnapshot, String> {
        let (snapshot, _) = self.mutate(|machine| machine.tick(Utc::now()))?;
        Ok(snapshot)
    }

    /// Flush the current snapshot synchronously, for shutdown
    pub fn flush(&self) -> Result<(), String> {
        let snapshot = self.snapshot()?;
        self.store
            .save(&snapshot)
            .map_err(|e| format!("Failed to flush snapshot: {}", e))
    }
}
