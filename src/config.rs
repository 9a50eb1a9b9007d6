use crate::error::Error;

const DEFAULT_CONFIDENCE_THRESHOLD: &str = "0.5";
const DEFAULT_DESCEND_THRESHOLD: &str = "130";
const DEFAULT_ASCEND_THRESHOLD: &str = "130";
const DEFAULT_ORANGE_THRESHOLD: &str = "30";
const DEFAULT_RED_THRESHOLD: &str = "50";
const DEFAULT_TOTAL_SETS: &str = "3";
const DEFAULT_REPS_PER_SET: &str = "3";
const DEFAULT_HIP_TILT_TOLERANCE: &str = "20";
const DEFAULT_SHOULDER_TILT_TOLERANCE: &str = "20";
const DEFAULT_KNEE_FORWARD_TOLERANCE: &str = "0";

/// Angle and confidence cutoffs shared by the counter and the classifier.
#[derive(Debug, Clone, Copy, PartialEq, structopt::StructOpt)]
pub struct Thresholds {
    /// Minimum keypoint score (exclusive) trusted for geometry.
    #[structopt(short, long, default_value = DEFAULT_CONFIDENCE_THRESHOLD)]
    pub confidence_threshold: f32,

    /// Both knees at or below this angle (degrees) start a rep.
    #[structopt(long, default_value = DEFAULT_DESCEND_THRESHOLD)]
    pub descend_threshold: f32,

    /// Both knees above this angle (degrees) complete a rep.
    #[structopt(long, default_value = DEFAULT_ASCEND_THRESHOLD)]
    pub ascend_threshold: f32,

    /// Torso lean (degrees) above which posture is flagged as a caution.
    #[structopt(long, default_value = DEFAULT_ORANGE_THRESHOLD)]
    pub orange_threshold: f32,

    /// Torso lean (degrees) above which posture is flagged as dangerous.
    #[structopt(long, default_value = DEFAULT_RED_THRESHOLD)]
    pub red_threshold: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD.parse().unwrap(),
            descend_threshold: DEFAULT_DESCEND_THRESHOLD.parse().unwrap(),
            ascend_threshold: DEFAULT_ASCEND_THRESHOLD.parse().unwrap(),
            orange_threshold: DEFAULT_ORANGE_THRESHOLD.parse().unwrap(),
            red_threshold: DEFAULT_RED_THRESHOLD.parse().unwrap(),
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), Error> {
        let &Self {
            confidence_threshold,
            descend_threshold,
            ascend_threshold,
            orange_threshold,
            red_threshold,
        } = self;

        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(Error::ConfidenceThresholdOutOfRange(confidence_threshold));
        }
        for &threshold in &[descend_threshold, ascend_threshold] {
            if !(threshold > 0.0 && threshold <= 180.0) {
                return Err(Error::KneeThresholdOutOfRange(threshold));
            }
        }
        if ascend_threshold < descend_threshold {
            return Err(Error::AscendBelowDescend {
                descend: descend_threshold,
                ascend: ascend_threshold,
            });
        }
        if !(orange_threshold < red_threshold) {
            return Err(Error::OrangeNotBelowRed {
                orange: orange_threshold,
                red: red_threshold,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, structopt::StructOpt)]
pub struct SessionConfig {
    /// Number of sets in the workout.
    #[structopt(long, default_value = DEFAULT_TOTAL_SETS)]
    pub total_sets: u32,

    /// Repetitions that make up one set.
    #[structopt(long, default_value = DEFAULT_REPS_PER_SET)]
    pub reps_per_set: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            total_sets: DEFAULT_TOTAL_SETS.parse().unwrap(),
            reps_per_set: DEFAULT_REPS_PER_SET.parse().unwrap(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.total_sets == 0 {
            return Err(Error::ZeroTotalSets);
        }
        if self.reps_per_set == 0 {
            return Err(Error::ZeroRepsPerSet);
        }
        Ok(())
    }
}

/// Pixel tolerances for the form checks.
#[derive(Debug, Clone, Copy, PartialEq, structopt::StructOpt)]
pub struct FormTolerances {
    /// Vertical gap (pixels) between the hips above which they are uneven.
    #[structopt(long, default_value = DEFAULT_HIP_TILT_TOLERANCE)]
    pub hip_tilt_tolerance: f32,

    /// Vertical gap (pixels) between the shoulders above which they are uneven.
    #[structopt(long, default_value = DEFAULT_SHOULDER_TILT_TOLERANCE)]
    pub shoulder_tilt_tolerance: f32,

    /// Horizontal distance (pixels) a knee may travel past its ankle.
    #[structopt(long, default_value = DEFAULT_KNEE_FORWARD_TOLERANCE)]
    pub knee_forward_tolerance: f32,
}

impl Default for FormTolerances {
    fn default() -> Self {
        Self {
            hip_tilt_tolerance: DEFAULT_HIP_TILT_TOLERANCE.parse().unwrap(),
            shoulder_tilt_tolerance: DEFAULT_SHOULDER_TILT_TOLERANCE.parse().unwrap(),
            knee_forward_tolerance: DEFAULT_KNEE_FORWARD_TOLERANCE.parse().unwrap(),
        }
    }
}

impl FormTolerances {
    pub fn validate(&self) -> Result<(), Error> {
        for &tolerance in &[
            self.hip_tilt_tolerance,
            self.shoulder_tilt_tolerance,
            self.knee_forward_tolerance,
        ] {
            if !(tolerance >= 0.0 && tolerance.is_finite()) {
                return Err(Error::FormToleranceOutOfRange(tolerance));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, structopt::StructOpt)]
pub struct Config {
    #[structopt(flatten)]
    pub thresholds: Thresholds,

    #[structopt(flatten)]
    pub session: SessionConfig,

    #[structopt(flatten)]
    pub form: FormTolerances,
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        self.thresholds.validate()?;
        self.session.validate()?;
        self.form.validate()
    }
}
