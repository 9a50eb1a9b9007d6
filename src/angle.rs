use crate::{
    error::Unavailable,
    pose::{KeypointFrame, KeypointKind, Point},
};

const KNEE_SUM_DEEP: f32 = 220.0;
const KNEE_SUM_STANDING: f32 = 340.0;

/// Angle in degrees at `vertex` between the segments to `a` and `c`.
///
/// Returns `None` when either segment has zero length.
pub fn angle_at(a: Point, vertex: Point, c: Point) -> Option<f32> {
    let v1 = a - vertex;
    let v2 = c - vertex;
    let denominator = v1.norm() * v2.norm();
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }
    // rounding can push the cosine just past ±1
    let cos = (v1.dot(v2) / denominator).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// Deviation of the hip-to-shoulder line from vertical, in degrees.
///
/// Measured against the vertical projection of the hip center up to shoulder
/// height, so a mirrored camera gives the same value.
pub fn torso_lean(shoulder_center: Point, hip_center: Point) -> Option<f32> {
    let vertical_ref = Point::new(hip_center.x(), shoulder_center.y()).ok()?;
    angle_at(shoulder_center, hip_center, vertical_ref)
}

/// Angle at `vertex`, if all three joints score above `threshold`.
pub fn joint_angle(
    frame: &KeypointFrame,
    a: KeypointKind,
    vertex: KeypointKind,
    c: KeypointKind,
    threshold: f32,
) -> Result<f32, Unavailable> {
    require_confident(frame, &[a, vertex, c], threshold)?;
    angle_at(frame[a].point, frame[vertex].point, frame[c].point)
        .ok_or(Unavailable::DegenerateAngle)
}

/// Torso lean from the synthesized shoulder and hip centers.
pub fn frame_torso_lean(frame: &KeypointFrame, threshold: f32) -> Result<f32, Unavailable> {
    use KeypointKind::{MidHip, MidShoulder};

    require_confident(frame, &[MidShoulder, MidHip], threshold)?;
    torso_lean(frame[MidShoulder].point, frame[MidHip].point).ok_or(Unavailable::DegenerateAngle)
}

/// Squat depth as a percentage: 0 standing straight, 100 at full depth.
pub fn squat_depth(left_knee: f32, right_knee: f32) -> f32 {
    let sum = left_knee + right_knee;
    let depth = (KNEE_SUM_STANDING - sum) / (KNEE_SUM_STANDING - KNEE_SUM_DEEP);
    (depth * 100.0).clamp(0.0, 100.0)
}

pub(crate) fn require_confident(
    frame: &KeypointFrame,
    kinds: &[KeypointKind],
    threshold: f32,
) -> Result<(), Unavailable> {
    match kinds
        .iter()
        .find(|&&kind| !frame[kind].is_confident(threshold))
    {
        Some(&kind) => Err(Unavailable::LowConfidence(kind)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const EPS: f32 = 1e-3;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y).unwrap()
    }

    mod angle_at_tests {
        use super::*;

        #[test]
        fn right_angle() {
            let angle = angle_at(p(1.0, 0.0), p(0.0, 0.0), p(0.0, 1.0)).unwrap();
            assert_approx_eq!(angle, 90.0, EPS);
        }

        #[test]
        fn straight_line() {
            assert_approx_eq!(
                angle_at(p(0.0, -1.0), p(0.0, 0.0), p(0.0, 2.0)).unwrap(),
                180.0,
                EPS
            );
        }

        #[test]
        fn folded() {
            let angle = angle_at(p(2.0, 0.0), p(0.0, 0.0), p(5.0, 0.0)).unwrap();
            assert_approx_eq!(angle, 0.0, EPS);
        }

        #[test]
        fn symmetric_and_bounded() {
            let triangles = [
                (p(1.0, 2.0), p(3.0, 4.0), p(-2.0, 7.5)),
                (p(10.0, 0.0), p(0.0, 0.0), p(1.0, 1.0)),
                (p(-3.0, -3.0), p(0.5, 0.25), p(4.0, -1.0)),
                (p(100.0, 140.0), p(100.0, 200.0), p(140.0, 230.0)),
            ];
            for &(a, vertex, c) in &triangles {
                let forward = angle_at(a, vertex, c).unwrap();
                let backward = angle_at(c, vertex, a).unwrap();
                assert_approx_eq!(forward, backward, 1e-4);
                assert!((0.0..=180.0).contains(&forward));
            }
        }

        #[test]
        fn degenerate_segments() {
            let vertex = p(1.0, 1.0);
            assert!(angle_at(vertex, vertex, p(2.0, 3.0)).is_none());
            assert!(angle_at(p(2.0, 3.0), vertex, vertex).is_none());
        }
    }

    mod torso_lean_tests {
        use super::*;

        #[test]
        fn upright() {
            let lean = torso_lean(p(100.0, 50.0), p(100.0, 150.0)).unwrap();
            assert_approx_eq!(lean, 0.0, EPS);
        }

        #[test]
        fn forty_five_degrees_either_side() {
            let right = torso_lean(p(150.0, 50.0), p(100.0, 100.0)).unwrap();
            let left = torso_lean(p(50.0, 50.0), p(100.0, 100.0)).unwrap();
            assert_approx_eq!(right, 45.0, EPS);
            assert_approx_eq!(left, 45.0, EPS);
        }

        #[test]
        fn horizontal_torso_is_degenerate() {
            assert!(torso_lean(p(50.0, 100.0), p(100.0, 100.0)).is_none());
        }
    }

    mod squat_depth_tests {
        use super::*;

        #[test]
        fn endpoints() {
            assert_approx_eq!(squat_depth(170.0, 170.0), 0.0, EPS);
            assert_approx_eq!(squat_depth(110.0, 110.0), 100.0, EPS);
            assert_approx_eq!(squat_depth(140.0, 140.0), 50.0, EPS);
        }

        #[test]
        fn clamped() {
            assert_approx_eq!(squat_depth(180.0, 180.0), 0.0, EPS);
            assert_approx_eq!(squat_depth(60.0, 60.0), 100.0, EPS);
        }
    }

    mod gated_tests {
        use super::*;
        use crate::frame::{build, tests::standing_pose};
        use KeypointKind::*;

        #[test]
        fn standing_knee_is_straight() {
            let frame = build(&[standing_pose(0.9)]).unwrap();
            assert_approx_eq!(
                joint_angle(&frame, LeftHip, LeftKnee, LeftAnkle, 0.5).unwrap(),
                180.0,
                EPS
            );
            assert_approx_eq!(frame_torso_lean(&frame, 0.5).unwrap(), 0.0, EPS);
        }

        #[test]
        fn low_confidence_names_the_joint() {
            let mut pose = standing_pose(0.9);
            pose.keypoints[LeftKnee.idx()].as_mut().unwrap().score = 0.5;
            let frame = build(&[pose]).unwrap();
            assert_eq!(
                joint_angle(&frame, LeftHip, LeftKnee, LeftAnkle, 0.5),
                Err(Unavailable::LowConfidence(LeftKnee))
            );
        }

        #[test]
        fn low_confidence_torso() {
            let mut pose = standing_pose(0.9);
            pose.keypoints[RightShoulder.idx()].as_mut().unwrap().score = 0.2;
            let frame = build(&[pose]).unwrap();
            assert_eq!(
                frame_torso_lean(&frame, 0.5),
                Err(Unavailable::LowConfidence(MidShoulder))
            );
        }

        #[test]
        fn collapsed_knee_is_degenerate() {
            let mut pose = standing_pose(0.9);
            let hip = pose.keypoints[LeftHip.idx()].unwrap();
            pose.keypoints[LeftKnee.idx()] = Some(hip);
            let frame = build(&[pose]).unwrap();
            assert_eq!(
                joint_angle(&frame, LeftHip, LeftKnee, LeftAnkle, 0.5),
                Err(Unavailable::DegenerateAngle)
            );
        }
    }
}
