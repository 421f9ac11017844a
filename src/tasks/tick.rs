//! One-second tick driver background task

use std::{sync::Arc, time::Duration};

use tokio::time::{sleep, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Background task that advances the timer machine once per second while
/// it is running.
///
/// The running flag is a watch channel owned by [`AppState`]; pausing or
/// finishing flips it and cancels the interval in the same select round,
/// so no queued tick can apply after a stop. While the machine is idle
/// the task parks on the watch channel and costs nothing.
pub async fn tick_driver_task(state: Arc<AppState>) {
    info!("Starting tick driver task");

    let mut running_rx = state.running_watch();

    loop {
        // Park until the machine starts running
        while !*running_rx.borrow() {
            if running_rx.changed().await.is_err() {
                return;
            }
        }

        debug!("Tick driver active");
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first interval tick completes immediately; consume it so the
        // first counted second is a real second
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match state.advance_tick() {
                        Ok(snapshot) => {
                            if snapshot.is_finished {
                                info!("Run finished, tick driver stopping");
                                break;
                            }
                        }
                        Err(e) => {
                            error!("Failed to advance tick: {}", e);
                            sleep(Duration::from_secs(1)).await;
                        }
                    }
                }

                changed = running_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    if !*running_rx.borrow() {
                        debug!("Pause observed, stopping tick driver immediately");
                        break;
                    }
                }
            }
        }
    }
}
