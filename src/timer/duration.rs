//! Pure duration arithmetic over the timer settings

use super::settings::Settings;

/// Seconds in one session: all work intervals plus the short breaks
/// between them. The long break after a session is not part of it.
pub fn session_duration_secs(settings: &Settings) -> u64 {
    settings.cycles_per_session * settings.work_minutes * 60
        + settings.cycles_per_session.saturating_sub(1) * settings.short_break_minutes * 60
}

/// Seconds in a whole run: every session plus the long breaks between
/// sessions. There is no long break after the final session.
pub fn total_run_duration_secs(settings: &Settings) -> u64 {
    session_duration_secs(settings) * settings.sessions_total
        + settings.sessions_total.saturating_sub(1) * settings.long_break_minutes * 60
}

/// Format a number of seconds as zero-padded "HH:MM:SS".
///
/// Negative input is a contract violation; it clamps to zero rather than
/// producing negative components.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hrs, mins, secs)
}
