//! Squat form checks on the 2D keypoints.
//!
//! Each check runs only when every joint it reads scores above the
//! confidence threshold; a check that cannot run reports nothing.

use crate::{
    angle::require_confident,
    config::FormTolerances,
    pose::{KeypointFrame, KeypointKind::*},
};
use serde::Serialize;
use tracing::trace;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormFault {
    HipsUneven,
    ShouldersUneven,
    LeftKneeForward,
    RightKneeForward,
}

/// Every fault present in `frame`, in declaration order.
pub fn form_faults(
    frame: &KeypointFrame,
    tolerances: &FormTolerances,
    threshold: f32,
) -> Vec<FormFault> {
    let checks = [
        (
            FormFault::HipsUneven,
            [LeftHip, RightHip],
            tilt(
                frame[LeftHip].point.y(),
                frame[RightHip].point.y(),
                tolerances.hip_tilt_tolerance,
            ),
        ),
        (
            FormFault::ShouldersUneven,
            [LeftShoulder, RightShoulder],
            tilt(
                frame[LeftShoulder].point.y(),
                frame[RightShoulder].point.y(),
                tolerances.shoulder_tilt_tolerance,
            ),
        ),
        (
            FormFault::LeftKneeForward,
            [LeftKnee, LeftAnkle],
            frame[LeftKnee].point.x() - frame[LeftAnkle].point.x()
                > tolerances.knee_forward_tolerance,
        ),
        (
            FormFault::RightKneeForward,
            [RightKnee, RightAnkle],
            frame[RightKnee].point.x() - frame[RightAnkle].point.x()
                > tolerances.knee_forward_tolerance,
        ),
    ];

    checks
        .iter()
        .filter(|(fault, joints, failed)| match require_confident(frame, joints, threshold) {
            Ok(()) => *failed,
            Err(reason) => {
                trace!(message = "form check skipped", ?fault, %reason);
                false
            }
        })
        .map(|&(fault, _, _)| fault)
        .collect()
}

fn tilt(a: f32, b: f32, tolerance: f32) -> bool {
    (a - b).abs() > tolerance
}
