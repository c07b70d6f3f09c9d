//! Background task that advances the cursor while playback runs.

use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;

use crate::SharedDashboard;

pub struct PlaybackDriver {
    dashboard: SharedDashboard,
    frame: Duration,
}

impl PlaybackDriver {
    pub fn new(dashboard: SharedDashboard, frame: Duration) -> Self {
        Self {
            dashboard,
            frame: frame.max(Duration::from_millis(1)),
        }
    }

    /// Wait for playback to start, tick until it stops, repeat.
    ///
    /// Runs for as long as the dashboard publishes snapshots.
    pub async fn run(self) {
        let mut updates = self.dashboard.read().await.subscribe();
        loop {
            let playing = updates.borrow_and_update().playing;
            if playing {
                self.play().await;
            }
            if updates.changed().await.is_err() {
                break;
            }
        }
        tracing::debug!("Playback driver stopped");
    }

    /// Tick every frame until the dashboard reports playback stopped.
    async fn play(&self) {
        tracing::debug!(frame_ms = self.frame.as_millis() as u64, "Playback started");
        let mut interval = tokio::time::interval(self.frame);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if !self.dashboard.write().await.tick(Instant::now()) {
                break;
            }
        }
        tracing::debug!("Playback paused");
    }
}
