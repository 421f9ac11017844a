//! Derived progress percentages

use serde::{Deserialize, Serialize};

use super::clock::RunClock;
use super::duration::session_duration_secs;
use super::phase::Phase;
use super::settings::Settings;

/// The three display percentages, each clamped to [0, 100].
///
/// Recomputed from the run clock on every tick; never used for phase
/// completion checks, which compare raw elapsed seconds instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedProgress {
    pub phase_percent: f64,
    pub session_percent: f64,
    pub total_percent: f64,
}

impl DerivedProgress {
    /// Compute progress given the phase-elapsed tick counter `t`.
    ///
    /// `long_break` distinguishes the two flavors of Rest; during a long
    /// break the session percent is forced to 0 because the next session
    /// has not started accumulating.
    pub fn compute(clock: &RunClock, settings: &Settings, t: u64, long_break: bool) -> Self {
        let phase_duration = match clock.current_phase() {
            Phase::Work => settings.work_minutes * 60,
            Phase::Rest if long_break => settings.long_break_minutes * 60,
            Phase::Rest => settings.short_break_minutes * 60,
            Phase::Init | Phase::Finished => 0,
        };

        let phase_percent = if phase_duration == 0 {
            0.0
        } else {
            clamp_percent(t as f64 / phase_duration as f64 * 100.0)
        };

        Self {
            phase_percent,
            session_percent: if long_break {
                0.0
            } else {
                session_percent(clock, settings)
            },
            total_percent: total_percent(clock),
        }
    }
}

/// Share of the projected run duration already ticked. Guarded against
/// absent bounds: before the first Start this is 0, never NaN.
fn total_percent(clock: &RunClock) -> f64 {
    let (start, end) = match (clock.start_time, clock.end_time) {
        (Some(start), Some(end)) => (start, end),
        _ => return 0.0,
    };
    let run_seconds = (end - start).num_seconds();
    if run_seconds <= 0 {
        return 0.0;
    }
    clamp_percent(clock.total_seconds as f64 / run_seconds as f64 * 100.0)
}

fn session_percent(clock: &RunClock, settings: &Settings) -> f64 {
    let session_secs = session_duration_secs(settings);
    if session_secs == 0 {
        return 0.0;
    }
    let completed_blocks =
        clock.sessions_done * (session_secs + settings.long_break_minutes * 60);
    let time_in_session = clock.total_seconds.saturating_sub(completed_blocks);
    clamp_percent(time_in_session as f64 / session_secs as f64 * 100.0)
}

fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::phase::LedgerAction;
    use chrono::{DateTime, Duration, Utc};

    fn t0() -> DateTime<Utc> {
        "2026-01-05T09:00:00Z".parse().unwrap()
    }

    fn working_clock(total_seconds: u64) -> RunClock {
        let mut clock = RunClock::new(t0());
        clock.history.append(Phase::Work, t0(), Some(LedgerAction::Start));
        clock.start_time = Some(t0());
        clock.end_time = Some(t0() + Duration::seconds(7500));
        clock.total_seconds = total_seconds;
        clock
    }

    #[test]
    fn total_percent_is_zero_without_bounds() {
        let clock = RunClock::new(t0());
        let progress = DerivedProgress::compute(&clock, &Settings::default(), 0, false);
        assert_eq!(progress.total_percent, 0.0);
        assert!(!progress.total_percent.is_nan());
    }

    #[test]
    fn phase_percent_tracks_work_interval() {
        let settings = Settings::default();
        let clock = working_clock(750);
        let progress = DerivedProgress::compute(&clock, &settings, 750, false);
        // 750s of a 1500s work interval
        assert!((progress.phase_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn total_percent_tracks_projected_run() {
        let settings = Settings::default();
        let clock = working_clock(1875);
        let progress = DerivedProgress::compute(&clock, &settings, 0, false);
        // 1875 of 7500 projected seconds
        assert!((progress.total_percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn session_percent_is_forced_zero_during_long_break() {
        let settings = Settings::default();
        let mut clock = working_clock(3000);
        clock.history.append(Phase::Rest, t0(), None);
        let progress = DerivedProgress::compute(&clock, &settings, 10, true);
        assert_eq!(progress.session_percent, 0.0);
    }

    #[test]
    fn session_percent_skips_completed_blocks() {
        let settings = Settings {
            work_minutes: 1,
            short_break_minutes: 1,
            long_break_minutes: 1,
            cycles_per_session: 2,
            sessions_total: 2,
        };
        // session = 2*60 + 1*60 = 180s, block = 180 + 60 = 240s
        let mut clock = working_clock(240 + 90);
        clock.sessions_done = 1;
        let progress = DerivedProgress::compute(&clock, &settings, 30, false);
        assert!((progress.session_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn session_percent_caps_at_hundred() {
        let settings = Settings::default();
        let clock = working_clock(1_000_000);
        let progress = DerivedProgress::compute(&clock, &settings, 0, false);
        assert_eq!(progress.session_percent, 100.0);
    }
}
