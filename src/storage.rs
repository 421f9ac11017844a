//! State persistence gateway
//!
//! One keyed record: the full timer snapshot as a JSON file. Loading is
//! forgiving by contract: a missing or corrupt file falls back to a fresh
//! default state, never a crash.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, warn};

use crate::state::TimerSnapshot;

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted snapshot, if there is a usable one.
    ///
    /// Absent file is the normal first-run case; a corrupt file is logged
    /// and discarded. Either way the caller starts from defaults.
    pub fn load(&self) -> Option<TimerSnapshot> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("No persisted snapshot at {}, starting fresh", self.path.display());
                return None;
            }
            Err(err) => {
                warn!("Failed to read snapshot {}: {}", self.path.display(), err);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(
                    "Discarding corrupt snapshot {}: {}",
                    self.path.display(),
                    err
                );
                None
            }
        }
    }

    /// Durably store the snapshot. Writes a sibling temp file and renames
    /// it into place so a crash mid-write cannot corrupt the record.
    pub fn save(&self, snapshot: &TimerSnapshot) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }

        let encoded = serde_json::to_string(snapshot).context("encoding snapshot")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, encoded).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }

    /// Remove the persisted snapshot, for the delete-all intent
    pub fn clear(&self) -> anyhow::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}
