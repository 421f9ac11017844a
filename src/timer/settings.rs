//! Timer settings, partial updates and the clamping validator

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::phase::Phase;

/// Durations and counts configuring a Pomodoro run
///
/// All fields are positive integers. Edits go through [`Settings::apply`]
/// so they can never fall below what the run has already consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Length of one work interval in minutes
    pub work_minutes: u64,
    /// Length of the short break between cycles in minutes
    pub short_break_minutes: u64,
    /// Length of the long break between sessions in minutes
    pub long_break_minutes: u64,
    /// Work/short-break cycles per session
    pub cycles_per_session: u64,
    /// Sessions in a whole run
    pub sessions_total: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            cycles_per_session: 4,
            sessions_total: 4,
        }
    }
}

/// Partial settings update carried by an UPDATE_SETTINGS intent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub work_minutes: Option<u64>,
    pub short_break_minutes: Option<u64>,
    pub long_break_minutes: Option<u64>,
    pub cycles_per_session: Option<u64>,
    pub sessions_total: Option<u64>,
}

impl SettingsPatch {
    /// Build a patch from an arbitrary JSON body.
    ///
    /// Unknown fields and non-numeric values are dropped silently; a bad
    /// settings edit is never an error the caller sees.
    pub fn from_value(body: &Value) -> Self {
        let field = |name: &str| body.get(name).and_then(Value::as_u64);
        Self {
            work_minutes: field("workMinutes"),
            short_break_minutes: field("shortBreakMinutes"),
            long_break_minutes: field("longBreakMinutes"),
            cycles_per_session: field("cyclesPerSession"),
            sessions_total: field("sessionsTotal"),
        }
    }
}

/// Lowest value each settings field may take, given how far the run
/// has already progressed. Shipped in the snapshot so the popup can
/// set input minimums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsFloor {
    pub work_minutes: u64,
    pub short_break_minutes: u64,
    pub long_break_minutes: u64,
    pub cycles_per_session: u64,
    pub sessions_total: u64,
}

impl SettingsFloor {
    /// Derive the floors from the run position.
    ///
    /// The duration field backing the current phase may not drop below the
    /// minutes already elapsed in it, otherwise the next evaluation would
    /// complete the phase retroactively. Counts may not drop below what is
    /// already completed plus the block in progress.
    pub fn for_position(
        phase: Phase,
        phase_elapsed_secs: u64,
        long_break: bool,
        cycles_done: u64,
        sessions_done: u64,
    ) -> Self {
        let elapsed_minutes = phase_elapsed_secs.div_ceil(60).max(1);
        let mut floor = Self {
            work_minutes: 1,
            short_break_minutes: 1,
            long_break_minutes: 1,
            cycles_per_session: cycles_done + 1,
            sessions_total: sessions_done + 1,
        };
        match phase {
            Phase::Work => floor.work_minutes = elapsed_minutes,
            Phase::Rest if long_break => floor.long_break_minutes = elapsed_minutes,
            Phase::Rest => floor.short_break_minutes = elapsed_minutes,
            Phase::Init | Phase::Finished => {}
        }
        floor
    }
}

impl Default for SettingsFloor {
    fn default() -> Self {
        Self {
            work_minutes: 1,
            short_break_minutes: 1,
            long_break_minutes: 1,
            cycles_per_session: 1,
            sessions_total: 1,
        }
    }
}

impl Settings {
    /// Apply a patch, clamping every edited field up to its floor.
    ///
    /// The validator never rejects: an out-of-range value is silently
    /// corrected to the minimum permissible one.
    pub fn apply(&mut self, patch: &SettingsPatch, floor: &SettingsFloor) {
        if let Some(v) = patch.work_minutes {
            self.work_minutes = v.max(floor.work_minutes);
        }
        if let Some(v) = patch.short_break_minutes {
            self.short_break_minutes = v.max(floor.short_break_minutes);
        }
        if let Some(v) = patch.long_break_minutes {
            self.long_break_minutes = v.max(floor.long_break_minutes);
        }
        if let Some(v) = patch.cycles_per_session {
            self.cycles_per_session = v.max(floor.cycles_per_session);
        }
        if let Some(v) = patch.sessions_total {
            self.sessions_total = v.max(floor.sessions_total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_from_value_ignores_junk_fields() {
        let body = json!({
            "workMinutes": 30,
            "shortBreakMinutes": "not a number",
            "cyclesPerSession": -2,
            "somethingElse": true,
        });
        let patch = SettingsPatch::from_value(&body);
        assert_eq!(patch.work_minutes, Some(30));
        assert_eq!(patch.short_break_minutes, None);
        assert_eq!(patch.cycles_per_session, None);
        assert_eq!(patch.sessions_total, None);
    }

    #[test]
    fn apply_clamps_to_floor() {
        let mut settings = Settings::default();
        // 10 minutes already worked in the current interval
        let floor = SettingsFloor::for_position(Phase::Work, 600, false, 0, 0);
        settings.apply(
            &SettingsPatch {
                work_minutes: Some(5),
                ..SettingsPatch::default()
            },
            &floor,
        );
        assert_eq!(settings.work_minutes, 10);
    }

    #[test]
    fn apply_keeps_valid_edits() {
        let mut settings = Settings::default();
        let floor = SettingsFloor::default();
        settings.apply(
            &SettingsPatch {
                work_minutes: Some(50),
                sessions_total: Some(2),
                ..SettingsPatch::default()
            },
            &floor,
        );
        assert_eq!(settings.work_minutes, 50);
        assert_eq!(settings.sessions_total, 2);
        assert_eq!(settings.short_break_minutes, 5);
    }

    #[test]
    fn zero_is_clamped_to_one() {
        let mut settings = Settings::default();
        settings.apply(
            &SettingsPatch {
                cycles_per_session: Some(0),
                ..SettingsPatch::default()
            },
            &SettingsFloor::default(),
        );
        assert_eq!(settings.cycles_per_session, 1);
    }

    #[test]
    fn floor_tracks_completed_counts() {
        let floor = SettingsFloor::for_position(Phase::Rest, 30, false, 2, 1);
        assert_eq!(floor.cycles_per_session, 3);
        assert_eq!(floor.sessions_total, 2);
        assert_eq!(floor.short_break_minutes, 1);
    }

    #[test]
    fn floor_rounds_partial_minutes_up() {
        let floor = SettingsFloor::for_position(Phase::Work, 601, false, 0, 0);
        assert_eq!(floor.work_minutes, 11);
    }
}
