//! The timer state machine
//!
//! Owns the run clock and drives every phase transition. The tick driver
//! calls [`TimerMachine::tick`] once per second while the machine is
//! running; intent handlers call [`TimerMachine::toggle`],
//! [`TimerMachine::update_settings`] and [`TimerMachine::reset`]. Nothing
//! else mutates the clock.
//!
//! Elapsed time within a phase is a tick counter reset at each transition,
//! never a wall-clock subtraction, so pausing can neither lose nor
//! double-count seconds. Wall-clock instants are used only for the
//! human-readable projections (end of run, next break) and are
//! re-projected forward on resume.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use super::clock::RunClock;
use super::duration::{format_duration, session_duration_secs, total_run_duration_secs};
use super::phase::{LedgerAction, Phase};
use super::progress::DerivedProgress;
use super::settings::{Settings, SettingsFloor, SettingsPatch};

/// Outcome of a toggle intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Started,
    Paused,
    Resumed,
    /// Toggle received after Finished; ignored
    Stale,
}

#[derive(Debug, Clone)]
pub struct TimerMachine {
    settings: Settings,
    clock: RunClock,
    running: bool,
    /// Seconds ticked in the current phase
    phase_elapsed: u64,
    /// Projected wall-clock start of the next break, shown while working
    next_break: Option<DateTime<Utc>>,
    /// Seconds left in the current break, shown while resting
    remaining_rest: u64,
    progress: DerivedProgress,
}

impl TimerMachine {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            settings: Settings::default(),
            clock: RunClock::new(created_at),
            running: false,
            phase_elapsed: 0,
            next_break: None,
            remaining_rest: 0,
            progress: DerivedProgress::default(),
        }
    }

    /// Rebuild a machine from persisted parts
    pub fn restore(
        settings: Settings,
        clock: RunClock,
        running: bool,
        phase_elapsed: u64,
        next_break: Option<DateTime<Utc>>,
        remaining_rest: u64,
        progress: DerivedProgress,
    ) -> Self {
        let mut machine = Self {
            settings,
            clock,
            running,
            phase_elapsed,
            next_break,
            remaining_rest,
            progress,
        };
        // A finished run never ticks again, whatever the stored flag said
        if machine.clock.current_phase().is_terminal() {
            machine.running = false;
        }
        machine
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn clock(&self) -> &RunClock {
        &self.clock
    }

    pub fn current_phase(&self) -> Phase {
        self.clock.current_phase()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_finished(&self) -> bool {
        self.clock.current_phase().is_terminal()
    }

    pub fn phase_elapsed(&self) -> u64 {
        self.phase_elapsed
    }

    pub fn next_break(&self) -> Option<DateTime<Utc>> {
        self.next_break
    }

    pub fn remaining_rest(&self) -> u64 {
        self.remaining_rest
    }

    pub fn progress(&self) -> DerivedProgress {
        self.progress
    }

    /// Whether the current Rest is the long break closing a session
    pub fn in_long_break(&self) -> bool {
        self.clock.current_phase() == Phase::Rest
            && self.clock.cycles_done >= self.settings.cycles_per_session.saturating_sub(1)
    }

    /// Minimum values a settings edit may take right now
    pub fn settings_floor(&self) -> SettingsFloor {
        SettingsFloor::for_position(
            self.clock.current_phase(),
            self.phase_elapsed,
            self.in_long_break(),
            self.clock.cycles_done,
            self.clock.sessions_done,
        )
    }

    /// Advance one second of elapsed time, then settle the phase.
    ///
    /// Ignored unless the machine is running; Finished is absorbing.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if !self.running || self.is_finished() {
            return;
        }
        self.phase_elapsed += 1;
        self.clock.total_seconds += 1;
        self.evaluate(now);
    }

    /// Settle the current phase against its elapsed seconds.
    ///
    /// Idempotent at constant elapsed time: a transition resets the phase
    /// counter, so settling again appends nothing and counts nothing.
    pub(crate) fn evaluate(&mut self, now: DateTime<Utc>) {
        let work_secs = self.settings.work_minutes * 60;
        let short_secs = self.settings.short_break_minutes * 60;
        let long_secs = self.settings.long_break_minutes * 60;
        let t = self.phase_elapsed;

        match self.clock.current_phase() {
            Phase::Work => {
                if t >= work_secs {
                    debug!("Work interval complete, entering rest");
                    self.clock.history.append(Phase::Rest, now, None);
                    self.phase_elapsed = 0;
                    self.next_break = Some(now + Duration::seconds(work_secs as i64));
                }
            }
            Phase::Rest if !self.in_long_break() => {
                if t >= short_secs {
                    debug!("Short break complete, starting next cycle");
                    self.clock.history.append(Phase::Work, now, None);
                    self.clock.cycles_done += 1;
                    self.phase_elapsed = 0;
                    self.next_break = Some(now + Duration::seconds(work_secs as i64));
                    self.remaining_rest = 0;
                } else {
                    self.remaining_rest = short_secs - t;
                }
            }
            Phase::Rest => {
                if self.clock.sessions_done >= self.settings.sessions_total.saturating_sub(1) {
                    info!("Final session complete, run finished");
                    self.clock.history.append(Phase::Finished, now, None);
                    self.running = false;
                    self.remaining_rest = 0;
                    return;
                }
                if t >= long_secs {
                    debug!("Long break complete, starting next session");
                    self.clock.history.append(Phase::Work, now, None);
                    self.clock.cycles_done = 0;
                    self.clock.sessions_done += 1;
                    self.phase_elapsed = 0;
                    self.next_break = Some(now + Duration::seconds(work_secs as i64));
                    self.remaining_rest = 0;
                } else {
                    self.remaining_rest = long_secs - t;
                }
            }
            Phase::Init | Phase::Finished => return,
        }

        self.progress = DerivedProgress::compute(
            &self.clock,
            &self.settings,
            self.phase_elapsed,
            self.in_long_break(),
        );
    }

    /// Handle the toggle intent: start from Init, pause while running,
    /// resume while paused. A toggle after Finished is a no-op.
    pub fn toggle(&mut self, now: DateTime<Utc>) -> ToggleOutcome {
        if self.is_finished() {
            debug!("Toggle ignored, run already finished");
            return ToggleOutcome::Stale;
        }

        if self.clock.current_phase() == Phase::Init {
            let total = total_run_duration_secs(&self.settings);
            self.clock.start_time = Some(now);
            self.clock.end_time = Some(now + Duration::seconds(total as i64));
            self.clock
                .history
                .append(Phase::Work, now, Some(LedgerAction::Start));
            self.next_break =
                Some(now + Duration::seconds((self.settings.work_minutes * 60) as i64));
            self.running = true;
            info!(
                "Run started: {} sessions of {} cycles, projected {}",
                self.settings.sessions_total,
                self.settings.cycles_per_session,
                format_duration(total as i64)
            );
            return ToggleOutcome::Started;
        }

        if self.running {
            let phase = self.clock.current_phase();
            self.clock
                .history
                .append(phase, now, Some(LedgerAction::Paused));
            self.running = false;
            info!("Paused in {} at {}s into the phase", phase, self.phase_elapsed);
            return ToggleOutcome::Paused;
        }

        // Resuming. Already-elapsed seconds are preserved exactly; only the
        // forward projections move. The end time is re-derived from what is
        // still owed rather than shifted, which also absorbs any settings
        // edits made while paused.
        let phase = self.clock.current_phase();
        let pause_gap = now - self.clock.history.last_transition_time();
        self.clock
            .history
            .append(phase, now, Some(LedgerAction::Resume));
        self.reproject_end(now);
        if phase == Phase::Work {
            if let Some(next_break) = self.next_break {
                self.next_break = Some(next_break + pause_gap);
            }
        }
        self.running = true;
        info!(
            "Resumed in {} after a {}s pause",
            phase,
            pause_gap.num_seconds()
        );
        ToggleOutcome::Resumed
    }

    /// Apply a settings patch. Edits while running are ignored; while
    /// paused each field is clamped up to its floor.
    pub fn update_settings(&mut self, patch: &SettingsPatch) {
        if self.running {
            debug!("Settings edit ignored while the timer is running");
            return;
        }
        let floor = self.settings_floor();
        self.settings.apply(patch, &floor);
        self.progress = DerivedProgress::compute(
            &self.clock,
            &self.settings,
            self.phase_elapsed,
            self.in_long_break(),
        );
    }

    /// Reset everything to defaults, back to Init
    pub fn reset(&mut self, now: DateTime<Utc>) {
        info!("Resetting run and settings to defaults");
        *self = TimerMachine::new(now);
    }

    /// Reconcile projections after the hosting process was suspended and
    /// reloaded mid-run. Elapsed counters are exactly what was flushed;
    /// only the wall-clock projections are recomputed forward.
    pub fn reconcile_after_reload(&mut self, now: DateTime<Utc>) {
        if !self.running || self.is_finished() {
            return;
        }
        self.reproject_end(now);
        if self.clock.current_phase() == Phase::Work {
            let remaining =
                (self.settings.work_minutes * 60).saturating_sub(self.phase_elapsed);
            self.next_break = Some(now + Duration::seconds(remaining as i64));
        }
        info!(
            "Reconciled after reload: {} elapsed, projected end {:?}",
            format_duration(self.clock.total_seconds as i64),
            self.clock.end_time
        );
    }

    fn reproject_end(&mut self, now: DateTime<Utc>) {
        let total = total_run_duration_secs(&self.settings);
        let remaining = total.saturating_sub(self.clock.total_seconds);
        self.clock.end_time = Some(now + Duration::seconds(remaining as i64));
    }

    /// Seconds one session lasts under the current settings
    pub fn session_duration_secs(&self) -> u64 {
        session_duration_secs(&self.settings)
    }
}
