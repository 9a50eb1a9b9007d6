use crate::error::Error;
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Index, Mul, Sub};

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    num_derive::FromPrimitive,
)]
#[serde(rename_all = "snake_case")]
pub enum KeypointKind {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    // synthesized anchors
    MidShoulder,
    UpperSpine,
    LowerSpine,
    MidHip,
}

impl KeypointKind {
    #[inline]
    pub const fn idx(self) -> usize {
        self as usize
    }

    pub fn is_synthesized(self) -> bool {
        self.idx() >= NUM_MODEL_KEYPOINTS
    }
}

/// Number of joints the pose model reports per pose.
pub const NUM_MODEL_KEYPOINTS: usize = 17;

/// Model joints plus the four synthesized anchors.
pub const NUM_KEYPOINTS: usize = NUM_MODEL_KEYPOINTS + 4;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Result<Self, Error> {
        Ok(Self {
            x: NotNan::new(x)
                .map_err(|e| Error::ConstructNotNan(e, x))?
                .into_inner(),
            y: NotNan::new(y)
                .map_err(|e| Error::ConstructNotNan(e, y))?
                .into_inner(),
        })
    }

    #[inline]
    pub fn x(self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(self) -> f32 {
        self.y
    }

    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn norm(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// The point a fraction `t` of the way from `self` to `other`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }

    pub fn midpoint(self, other: Self) -> Self {
        self.lerp(other, 0.5)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::Output {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct Keypoint {
    #[serde(flatten)]
    pub point: Point,
    pub score: f32,
}

impl Keypoint {
    /// Validate a model estimate. Scores outside [0, 1] are clamped.
    pub fn new(x: f32, y: f32, score: f32) -> Result<Self, Error> {
        let score = NotNan::new(score)
            .map_err(|e| Error::ConstructNotNan(e, score))?
            .into_inner();
        Ok(Self {
            point: Point::new(x, y)?,
            score: score.clamp(0.0, 1.0),
        })
    }

    #[inline]
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.score > threshold
    }
}

/// A single joint estimate as the pose model reports it.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
pub struct RawKeypoint {
    pub x: f32,
    pub y: f32,
    pub score: f32,
}

/// One detected body, in model joint order.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawPose {
    pub keypoints: Vec<Option<RawKeypoint>>,
    #[serde(default)]
    pub score: Option<f32>,
}

pub type Keypoints = [Keypoint; NUM_KEYPOINTS];

/// A fully populated frame: the model joints plus the synthesized anchors.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct KeypointFrame {
    keypoints: Keypoints,
}

impl KeypointFrame {
    pub(crate) fn from_keypoints(keypoints: Keypoints) -> Self {
        Self { keypoints }
    }

    pub fn keypoints(&self) -> &Keypoints {
        &self.keypoints
    }

    /// Number of model joints whose score passes `threshold`.
    pub fn confident_count(&self, threshold: f32) -> usize {
        self.keypoints[..NUM_MODEL_KEYPOINTS]
            .iter()
            .filter(|keypoint| keypoint.is_confident(threshold))
            .count()
    }
}

impl Index<KeypointKind> for KeypointFrame {
    type Output = Keypoint;

    fn index(&self, kind: KeypointKind) -> &Self::Output {
        &self.keypoints[kind.idx()]
    }
}

pub mod constants {
    use crate::pose::KeypointKind::{self, *};

    pub type Edge = (KeypointKind, KeypointKind);

    /// Joints the knee angles are computed from.
    pub const KNEE_REGION: [KeypointKind; 6] =
        [LeftHip, RightHip, LeftKnee, RightKnee, LeftAnkle, RightAnkle];

    /// Limb segments that are always drawn in the safe color.
    pub const CORE_EDGES: [Edge; 12] = [
        (LeftShoulder, LeftElbow),
        (LeftShoulder, MidShoulder),
        (RightShoulder, MidShoulder),
        (LeftElbow, LeftWrist),
        (RightShoulder, RightElbow),
        (RightElbow, RightWrist),
        (LeftHip, LeftKnee),
        (LeftKnee, LeftAnkle),
        (RightHip, RightKnee),
        (RightKnee, RightAnkle),
        (RightHip, MidHip),
        (LeftHip, MidHip),
    ];

    /// Synthesized spine, colored by posture risk.
    pub const SPINE_EDGES: [Edge; 3] = [
        (MidShoulder, UpperSpine),
        (UpperSpine, LowerSpine),
        (LowerSpine, MidHip),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use num_traits::FromPrimitive;

    #[test]
    fn kinds_round_trip_through_indices() {
        for i in 0..NUM_KEYPOINTS {
            let kind = KeypointKind::from_usize(i).unwrap();
            assert_eq!(kind.idx(), i);
            assert_eq!(kind.is_synthesized(), i >= 17);
        }
        assert!(KeypointKind::from_usize(NUM_KEYPOINTS).is_none());
    }

    #[test]
    fn nan_coordinates_are_rejected() {
        assert!(Point::new(f32::NAN, 1.0).is_err());
        assert!(Keypoint::new(1.0, 1.0, f32::NAN).is_err());
    }

    #[test]
    fn scores_are_clamped() {
        assert_approx_eq!(Keypoint::new(0.0, 0.0, 1.5).unwrap().score, 1.0);
        assert_approx_eq!(Keypoint::new(0.0, 0.0, -0.1).unwrap().score, 0.0);
    }

    #[test]
    fn lerp_thirds() {
        let a = Point::new(0.0, 0.0).unwrap();
        let b = Point::new(3.0, 6.0).unwrap();
        let third = a.lerp(b, 1.0 / 3.0);
        assert_approx_eq!(third.x(), 1.0);
        assert_approx_eq!(third.y(), 2.0);
        assert_approx_eq!(a.midpoint(b).y(), 3.0);
    }

    #[test]
    fn raw_pose_ignores_keypoint_names() {
        let raw: RawKeypoint =
            serde_json::from_str(r#"{"x": 1.0, "y": 2.0, "score": 0.9, "name": "nose"}"#).unwrap();
        assert_eq!(
            raw,
            RawKeypoint {
                x: 1.0,
                y: 2.0,
                score: 0.9
            }
        );
    }
}
