//! Bilateral knee-angle repetition counter.
//!
//! The counter is a two-state hysteresis machine: both knees bending to the
//! descend threshold moves it to [`RepPhase::Descended`], both knees
//! extending past the ascend threshold moves it back to
//! [`RepPhase::Waiting`] and completes one repetition. No time-based
//! debouncing is applied, so a single noisy frame can still flip the phase.

use crate::{
    angle::{self, require_confident},
    config::Thresholds,
    error::Unavailable,
    pose::{constants::KNEE_REGION, KeypointFrame, KeypointKind::*},
};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepPhase {
    Waiting,
    Descended,
}

/// Emitted once per completed down-up cycle, carrying the new count.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct RepCompleted(pub u32);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct KneeAngles {
    pub left: f32,
    pub right: f32,
}

impl KneeAngles {
    pub fn depth_percent(&self) -> f32 {
        angle::squat_depth(self.left, self.right)
    }
}

/// Knee angles, provided every hip, knee and ankle is trusted.
pub fn knee_angles(frame: &KeypointFrame, threshold: f32) -> Result<KneeAngles, Unavailable> {
    require_confident(frame, &KNEE_REGION, threshold)?;
    Ok(KneeAngles {
        left: angle::joint_angle(frame, LeftHip, LeftKnee, LeftAnkle, threshold)?,
        right: angle::joint_angle(frame, RightHip, RightKnee, RightAnkle, threshold)?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepCounter {
    phase: RepPhase,
    count: u32,
}

impl Default for RepCounter {
    fn default() -> Self {
        Self {
            phase: RepPhase::Waiting,
            count: 0,
        }
    }
}

impl RepCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> RepPhase {
        self.phase
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Gate on the knee region, then advance the state machine.
    ///
    /// A frame that cannot produce both knee angles leaves the counter
    /// untouched.
    pub fn observe(
        &mut self,
        frame: &KeypointFrame,
        thresholds: &Thresholds,
    ) -> Result<(KneeAngles, Option<RepCompleted>), Unavailable> {
        let knees = knee_angles(frame, thresholds.confidence_threshold)?;
        Ok((knees, self.update(knees, thresholds)))
    }

    pub fn update(&mut self, knees: KneeAngles, thresholds: &Thresholds) -> Option<RepCompleted> {
        let KneeAngles { left, right } = knees;

        match self.phase {
            RepPhase::Waiting
                if left <= thresholds.descend_threshold
                    && right <= thresholds.descend_threshold =>
            {
                self.phase = RepPhase::Descended;
                debug!(message = "descended", left, right);
                None
            }
            RepPhase::Descended
                if left > thresholds.ascend_threshold && right > thresholds.ascend_threshold =>
            {
                self.phase = RepPhase::Waiting;
                self.count += 1;
                debug!(message = "rep completed", count = self.count, left, right);
                Some(RepCompleted(self.count))
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
