//! Append-only history of phase transitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::phase::{LedgerAction, Phase};

/// One recorded transition: the phase entered, when, and the user action
/// (if any) that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub phase: Phase,
    pub at: DateTime<Utc>,
    pub action: Option<LedgerAction>,
}

/// The ordered transition history of a run
///
/// Construction guarantees a first `(Init, creation time, None)` entry, so
/// `current_phase` never needs a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<HistoryEntry>,
}

impl Ledger {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            entries: vec![HistoryEntry {
                phase: Phase::Init,
                at: created_at,
                action: None,
            }],
        }
    }

    /// Phase of the last entry. The constructor invariant makes the
    /// history non-empty for the whole life of the ledger.
    pub fn current_phase(&self) -> Phase {
        self.entries.last().map(|e| e.phase).unwrap_or(Phase::Init)
    }

    /// Instant of the most recent transition
    pub fn last_transition_time(&self) -> DateTime<Utc> {
        self.entries
            .last()
            .map(|e| e.at)
            .unwrap_or_else(Utc::now)
    }

    /// Record a transition at `at`.
    ///
    /// The state machine only appends on genuine transitions; a repeated
    /// `(phase, None)` pair would be a no-op entry and is dropped.
    pub fn append(&mut self, phase: Phase, at: DateTime<Utc>, action: Option<LedgerAction>) {
        if action.is_none() {
            if let Some(last) = self.entries.last() {
                if last.action.is_none() && last.phase == phase {
                    warn!("Dropping no-op ledger entry for phase {}", phase);
                    return;
                }
            }
        }
        self.entries.push(HistoryEntry { phase, at, action });
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        "2026-01-05T09:00:00Z".parse().unwrap()
    }

    #[test]
    fn new_ledger_starts_in_init() {
        let ledger = Ledger::new(t0());
        assert_eq!(ledger.current_phase(), Phase::Init);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.entries()[0].action, None);
        assert_eq!(ledger.last_transition_time(), t0());
    }

    #[test]
    fn append_advances_current_phase() {
        let mut ledger = Ledger::new(t0());
        ledger.append(Phase::Work, t0(), Some(LedgerAction::Start));
        assert_eq!(ledger.current_phase(), Phase::Work);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn duplicate_automatic_entries_are_dropped() {
        let mut ledger = Ledger::new(t0());
        ledger.append(Phase::Work, t0(), Some(LedgerAction::Start));
        ledger.append(Phase::Rest, t0(), None);
        ledger.append(Phase::Rest, t0(), None);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn pause_resume_in_same_phase_is_not_a_duplicate() {
        let mut ledger = Ledger::new(t0());
        ledger.append(Phase::Work, t0(), Some(LedgerAction::Start));
        ledger.append(Phase::Work, t0(), Some(LedgerAction::Paused));
        ledger.append(Phase::Work, t0(), Some(LedgerAction::Resume));
        assert_eq!(ledger.len(), 4);
    }

    #[test]
    fn timestamps_round_trip_as_instants() {
        let mut ledger = Ledger::new(t0());
        ledger.append(Phase::Work, t0() + chrono::Duration::seconds(5), None);
        let encoded = serde_json::to_string(&ledger).unwrap();
        let decoded: Ledger = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, ledger);
        assert_eq!(
            decoded.last_transition_time(),
            t0() + chrono::Duration::seconds(5)
        );
    }
}
