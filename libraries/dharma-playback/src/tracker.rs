//! Progress tracker
//!
//! Saves the playback position of the signed-in user on a fixed interval and
//! reads it back when a track is loaded. Saves are fire-and-forget: a failure
//! is logged and the next tick simply tries again with newer data.

use crate::resolver::ProgressLookup;
use async_trait::async_trait;
use dharma_core::{PersistenceGateway, TrackId, UserId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Interval between automatic saves
pub const DEFAULT_SAVE_INTERVAL: Duration = Duration::from_secs(5);

/// What the player is doing right now, as seen by the tracker
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackSnapshot {
    pub user_id: Option<UserId>,
    pub track_id: Option<TrackId>,
    pub current_time: f64,
}

impl PlaybackSnapshot {
    /// The (user, track, seconds) triple to persist, if there is one
    pub fn saveable(&self) -> Option<(UserId, TrackId, f64)> {
        match (self.user_id, self.track_id) {
            (Some(user), Some(track)) if self.current_time > 0.0 => {
                Some((user, track, self.current_time))
            }
            _ => None,
        }
    }
}

/// Periodic progress persistence
#[derive(Clone)]
pub struct ProgressTracker {
    gateway: Arc<dyn PersistenceGateway>,
    interval: Duration,
}

impl ProgressTracker {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            gateway,
            interval: DEFAULT_SAVE_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Saved offset for (user, track); 0 when missing or unreadable
    pub async fn restore(&self, user_id: UserId, track_id: TrackId) -> f64 {
        match self.gateway.get_progress(user_id, track_id).await {
            Ok(seconds) => seconds,
            Err(e) => {
                tracing::warn!(user = %user_id, track = %track_id, error = %e, "Failed to load saved progress");
                0.0
            }
        }
    }

    /// Persist one position; returns whether it was stored
    pub async fn save(&self, user_id: UserId, track_id: TrackId, seconds: f64) -> bool {
        match self.gateway.save_progress(user_id, track_id, seconds).await {
            Ok(()) => {
                tracing::trace!(user = %user_id, track = %track_id, seconds, "Progress saved");
                true
            }
            Err(e) => {
                tracing::warn!(user = %user_id, track = %track_id, error = %e, "Failed to save progress");
                false
            }
        }
    }

    /// Lookup bound to one user, for restoring on track load
    pub fn for_user(&self, user_id: UserId) -> SavedProgress {
        SavedProgress {
            tracker: self.clone(),
            user_id,
        }
    }

    /// Save the latest snapshot every interval until the sender is dropped.
    ///
    /// The first save happens one full interval after spawning.
    pub fn spawn(&self, mut snapshots: watch::Receiver<PlaybackSnapshot>) -> JoinHandle<()> {
        let tracker = self.clone();

        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + tracker.interval;
            let mut ticker = tokio::time::interval_at(start, tracker.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let snapshot = *snapshots.borrow();
                        if let Some((user, track, seconds)) = snapshot.saveable() {
                            tracker.save(user, track, seconds).await;
                        }
                    }
                    changed = snapshots.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }

            tracing::debug!("Progress tracker stopped");
        })
    }
}

/// [`ProgressTracker`] restoring positions for a single user
#[derive(Clone)]
pub struct SavedProgress {
    tracker: ProgressTracker,
    user_id: UserId,
}

#[async_trait]
impl ProgressLookup for SavedProgress {
    async fn saved_position(&self, track_id: TrackId) -> f64 {
        self.tracker.restore(self.user_id, track_id).await
    }
}
