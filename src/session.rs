use crate::{config::SessionConfig, counter::RepCompleted};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Snapshot of workout progress handed to UI collaborators.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub total_reps: u32,
    pub current_set: u32,
    pub total_sets: u32,
    pub reps_per_set: u32,
    pub active_seconds: u64,
    pub pose_detected: bool,
}

impl SessionState {
    /// Repetitions counted toward the current set.
    pub fn reps_in_set(&self) -> u32 {
        self.total_reps.saturating_sub(
            self.current_set
                .saturating_sub(1)
                .saturating_mul(self.reps_per_set),
        )
    }

    /// Full sets worth of repetitions counted so far.
    pub fn sets_completed(&self) -> u32 {
        self.total_reps.checked_div(self.reps_per_set).unwrap_or(0)
    }

    pub fn is_complete(&self) -> bool {
        self.total_reps >= self.total_sets.saturating_mul(self.reps_per_set)
    }

    /// Active time as `HH:MM:SS`.
    pub fn active_time(&self) -> String {
        let secs = self.active_seconds;
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Presence {
    since: Instant,
    last_seen: Instant,
}

#[derive(Debug, Clone)]
pub struct SessionTracker {
    config: SessionConfig,
    total_reps: u32,
    current_set: u32,
    pose_detected: bool,
    banked: Duration,
    presence: Option<Presence>,
}

impl SessionTracker {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            total_reps: 0,
            current_set: 1,
            pose_detected: false,
            banked: Duration::default(),
            presence: None,
        }
    }

    /// A pose was detected in the frame captured at `at`.
    pub fn observe_presence(&mut self, at: Instant) {
        self.pose_detected = true;
        let presence = self.presence.get_or_insert(Presence {
            since: at,
            last_seen: at,
        });
        presence.last_seen = presence.last_seen.max(at);
    }

    /// No pose in the frame captured at `at`.
    ///
    /// The running stretch is banked up to the last frame that had a pose,
    /// so the gap itself never accrues.
    pub fn observe_absence(&mut self, at: Instant) {
        self.pose_detected = false;
        if let Some(Presence { since, last_seen }) = self.presence.take() {
            self.banked += last_seen - since;
            debug!(
                message = "pose lost",
                banked_secs = self.banked.as_secs(),
                lag = ?at.saturating_duration_since(last_seen)
            );
        }
    }

    /// A zero `reps_per_set` never completes a set.
    pub fn record_rep(&mut self, RepCompleted(count): RepCompleted) {
        self.total_reps = self.total_reps.saturating_add(1);

        let SessionConfig {
            total_sets,
            reps_per_set,
        } = self.config;

        if self.total_reps.checked_rem(reps_per_set) == Some(0) {
            info!(
                message = "set complete",
                set = self.total_reps / reps_per_set,
                total_sets,
                counter = count
            );
            if self.current_set < total_sets {
                self.current_set += 1;
            }
        }
    }

    pub fn active(&self) -> Duration {
        self.banked
            + self
                .presence
                .map_or_else(Duration::default, |Presence { since, last_seen }| {
                    last_seen - since
                })
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            total_reps: self.total_reps,
            current_set: self.current_set,
            total_sets: self.config.total_sets,
            reps_per_set: self.config.reps_per_set,
            active_seconds: self.active().as_secs(),
            pose_detected: self.pose_detected,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }
}
