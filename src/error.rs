use crate::pose::KeypointKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to construct NotNan from f32: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f32),

    #[error("failed to open pose records at {1:?}")]
    OpenPoseRecords(#[source] std::io::Error, std::path::PathBuf),

    #[error("failed to read pose record at line {1}")]
    ReadPoseRecord(#[source] std::io::Error, usize),

    #[error("failed to parse pose record at line {1}")]
    ParsePoseRecord(#[source] serde_json::Error, usize),

    #[error("failed to emit processed frame {1}")]
    EmitEvent(#[source] serde_json::Error, usize),

    #[error("failed to write processed frame {1}")]
    WriteEvent(#[source] std::io::Error, usize),

    #[error("confidence threshold must be within [0, 1], got {0}")]
    ConfidenceThresholdOutOfRange(f32),

    #[error("knee angle threshold must be within (0, 180], got {0}")]
    KneeThresholdOutOfRange(f32),

    #[error("ascend threshold {ascend} must not be below descend threshold {descend}")]
    AscendBelowDescend { descend: f32, ascend: f32 },

    #[error("orange threshold {orange} must be below red threshold {red}")]
    OrangeNotBelowRed { orange: f32, red: f32 },

    #[error("form tolerance must be a non-negative pixel distance, got {0}")]
    FormToleranceOutOfRange(f32),

    #[error("reps per set must be at least 1")]
    ZeroRepsPerSet,

    #[error("total sets must be at least 1")]
    ZeroTotalSets,
}

/// Why a per-frame measurement could not be produced.
///
/// None of these are faults: the pipeline skips whatever depends on the
/// missing measurement and carries on with the next frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unavailable {
    #[error("no pose detected")]
    NoPose,

    #[error("angle is undefined for a zero-length segment")]
    DegenerateAngle,

    #[error("confidence of {0:?} is at or below threshold")]
    LowConfidence(KeypointKind),
}
