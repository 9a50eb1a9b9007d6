use crate::{
    config::Thresholds,
    pose::{
        constants::{Edge, CORE_EDGES, SPINE_EDGES},
        KeypointFrame, KeypointKind,
    },
};
use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Normal,
    Caution,
    Danger,
}

/// Classify a torso lean in degrees. Each band is closed on its upper side.
pub fn classify(lean: f32, thresholds: &Thresholds) -> RiskLevel {
    if lean <= thresholds.orange_threshold {
        RiskLevel::Normal
    } else if lean <= thresholds.red_threshold {
        RiskLevel::Caution
    } else {
        RiskLevel::Danger
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentColor {
    Safe,
    Caution,
    Danger,
}

impl From<RiskLevel> for SegmentColor {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Normal => Self::Safe,
            RiskLevel::Caution => Self::Caution,
            RiskLevel::Danger => Self::Danger,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub from: KeypointKind,
    pub to: KeypointKind,
    pub color: SegmentColor,
}

/// Every skeleton segment with the color it is drawn in at `level`.
///
/// Limb segments stay safe; only the synthesized spine carries the risk.
pub fn segment_colors(level: RiskLevel) -> impl Iterator<Item = Segment> {
    let core: &'static [Edge] = &CORE_EDGES;
    let spine: &'static [Edge] = &SPINE_EDGES;
    let paint = |color: SegmentColor| move |&(from, to): &Edge| Segment { from, to, color };

    core.iter()
        .map(paint(SegmentColor::Safe))
        .chain(spine.iter().map(paint(level.into())))
}

/// The colored segments whose endpoints both score above `threshold`.
pub fn visible_segments(frame: &KeypointFrame, level: RiskLevel, threshold: f32) -> Vec<Segment> {
    segment_colors(level)
        .filter(|segment| {
            frame[segment.from].is_confident(threshold) && frame[segment.to].is_confident(threshold)
        })
        .collect()
}
