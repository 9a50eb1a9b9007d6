//! Turns the model's raw joint list into a complete [`KeypointFrame`].

use crate::{
    error::Unavailable,
    pose::{
        Keypoint, KeypointFrame,
        KeypointKind::{self, *},
        Keypoints, RawKeypoint, RawPose, NUM_KEYPOINTS, NUM_MODEL_KEYPOINTS,
    },
};
use num_traits::FromPrimitive;
use tracing::{trace, warn};

/// Build a frame from the first detected pose.
///
/// Missing or invalid joints are kept as zero-score keypoints so that the
/// synthesized anchors can always be derived; consumers reject them through
/// their confidence threshold.
pub fn build(poses: &[RawPose]) -> Result<KeypointFrame, Unavailable> {
    let pose = poses.first().ok_or(Unavailable::NoPose)?;

    if pose.keypoints.len() != NUM_MODEL_KEYPOINTS {
        warn!(
            message = "discarding malformed pose",
            expected = NUM_MODEL_KEYPOINTS,
            got = pose.keypoints.len()
        );
        return Err(Unavailable::NoPose);
    }

    let mut keypoints: Keypoints = [Keypoint::default(); NUM_KEYPOINTS];

    for (i, raw) in pose.keypoints.iter().enumerate() {
        keypoints[i] = raw.as_ref().map_or_else(Keypoint::default, |raw| {
            validate(raw).unwrap_or_else(|| {
                trace!(
                    message = "invalid joint estimate",
                    kind = ?KeypointKind::from_usize(i),
                    ?raw
                );
                Keypoint::default()
            })
        });
    }

    synthesize(&mut keypoints);

    Ok(KeypointFrame::from_keypoints(keypoints))
}

fn validate(&RawKeypoint { x, y, score }: &RawKeypoint) -> Option<Keypoint> {
    Keypoint::new(x, y, score).ok()
}

fn synthesize(keypoints: &mut Keypoints) {
    let get = |kind: KeypointKind| keypoints[kind.idx()];

    let (left_shoulder, right_shoulder) = (get(LeftShoulder), get(RightShoulder));
    let (left_hip, right_hip) = (get(LeftHip), get(RightHip));

    let shoulder_score = left_shoulder.score.min(right_shoulder.score);
    let hip_score = left_hip.score.min(right_hip.score);

    let mid_shoulder = left_shoulder.point.midpoint(right_shoulder.point);
    let mid_hip = left_hip.point.midpoint(right_hip.point);

    keypoints[MidShoulder.idx()] = Keypoint {
        point: mid_shoulder,
        score: shoulder_score,
    };
    keypoints[UpperSpine.idx()] = Keypoint {
        point: mid_shoulder.lerp(mid_hip, 1.0 / 3.0),
        score: shoulder_score,
    };
    keypoints[LowerSpine.idx()] = Keypoint {
        point: mid_shoulder.lerp(mid_hip, 2.0 / 3.0),
        score: hip_score,
    };
    keypoints[MidHip.idx()] = Keypoint {
        point: mid_hip,
        score: hip_score,
    };
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const EPS: f32 = 1e-3;

    /// A standing figure in image coordinates (y grows downward) with every
    /// joint at `score`.
    pub(crate) fn standing_pose(score: f32) -> RawPose {
        let joints: [(f32, f32); NUM_MODEL_KEYPOINTS] = [
            (100.0, 20.0),  // nose
            (95.0, 15.0),   // left eye
            (105.0, 15.0),  // right eye
            (90.0, 18.0),   // left ear
            (110.0, 18.0),  // right ear
            (80.0, 50.0),   // left shoulder
            (120.0, 50.0),  // right shoulder
            (75.0, 80.0),   // left elbow
            (125.0, 80.0),  // right elbow
            (72.0, 110.0),  // left wrist
            (128.0, 110.0), // right wrist
            (88.0, 140.0),  // left hip
            (112.0, 140.0), // right hip
            (88.0, 200.0),  // left knee
            (112.0, 200.0), // right knee
            (88.0, 260.0),  // left ankle
            (112.0, 260.0), // right ankle
        ];
        RawPose {
            keypoints: joints
                .iter()
                .map(|&(x, y)| Some(RawKeypoint { x, y, score }))
                .collect(),
            score: Some(score),
        }
    }

    #[test]
    fn no_pose_without_detections() {
        assert_eq!(build(&[]), Err(Unavailable::NoPose));
    }

    #[test]
    fn malformed_pose_is_no_pose() {
        let mut pose = standing_pose(0.9);
        pose.keypoints.truncate(12);
        assert_eq!(build(&[pose]), Err(Unavailable::NoPose));
    }

    #[test]
    fn only_first_pose_is_used() {
        let first = standing_pose(0.9);
        let second = standing_pose(0.1);
        let frame = build(&[first, second]).unwrap();
        assert_approx_eq!(frame[Nose].score, 0.9, EPS);
    }

    #[test]
    fn model_joints_are_copied() {
        let frame = build(&[standing_pose(0.8)]).unwrap();
        assert_approx_eq!(frame[LeftKnee].point.x(), 88.0, EPS);
        assert_approx_eq!(frame[LeftKnee].point.y(), 200.0, EPS);
        assert_approx_eq!(frame[RightAnkle].score, 0.8, EPS);
    }

    #[test]
    fn anchors_are_synthesized() {
        let frame = build(&[standing_pose(0.8)]).unwrap();

        assert_approx_eq!(frame[MidShoulder].point.x(), 100.0, EPS);
        assert_approx_eq!(frame[MidShoulder].point.y(), 50.0, EPS);
        assert_approx_eq!(frame[MidHip].point.x(), 100.0, EPS);
        assert_approx_eq!(frame[MidHip].point.y(), 140.0, EPS);
        assert_approx_eq!(frame[UpperSpine].point.y(), 80.0, EPS);
        assert_approx_eq!(frame[LowerSpine].point.y(), 110.0, EPS);
    }

    #[test]
    fn anchor_scores_take_the_pair_minimum() {
        let mut pose = standing_pose(0.9);
        pose.keypoints[LeftShoulder.idx()].as_mut().unwrap().score = 0.3;
        pose.keypoints[RightHip.idx()].as_mut().unwrap().score = 0.6;
        let frame = build(&[pose]).unwrap();

        assert_approx_eq!(frame[MidShoulder].score, 0.3, EPS);
        assert_approx_eq!(frame[UpperSpine].score, 0.3, EPS);
        assert_approx_eq!(frame[LowerSpine].score, 0.6, EPS);
        assert_approx_eq!(frame[MidHip].score, 0.6, EPS);
    }

    #[test]
    fn mid_hip_score_is_min_of_hips() {
        for &(left, right) in &[(0.0, 1.0), (0.7, 0.2), (0.5, 0.5), (1.0, 0.99)] {
            let mut pose = standing_pose(0.9);
            pose.keypoints[LeftHip.idx()].as_mut().unwrap().score = left;
            pose.keypoints[RightHip.idx()].as_mut().unwrap().score = right;
            let frame = build(&[pose]).unwrap();
            assert_approx_eq!(frame[MidHip].score, f32::min(left, right), EPS);
        }
    }

    #[test]
    fn missing_joints_become_zero_score() {
        let mut pose = standing_pose(0.9);
        pose.keypoints[LeftShoulder.idx()] = None;
        pose.keypoints[RightHip.idx()] = Some(RawKeypoint {
            x: f32::NAN,
            y: 1.0,
            score: 0.9,
        });
        let frame = build(&[pose]).unwrap();

        assert_approx_eq!(frame[LeftShoulder].score, 0.0, EPS);
        assert_approx_eq!(frame[RightHip].score, 0.0, EPS);
        assert_approx_eq!(frame[MidShoulder].score, 0.0, EPS);
        assert_approx_eq!(frame[MidHip].score, 0.0, EPS);
        assert_eq!(frame.confident_count(0.5), 15);
    }
}
