use crate::{
    angle,
    config::Config,
    counter::{RepCompleted, RepCounter},
    error::{Error, Unavailable},
    form::{self, FormFault},
    frame,
    pose::{KeypointFrame, RawPose},
    risk::{self, RiskLevel, Segment},
    session::{SessionState, SessionTracker},
};
use serde::Serialize;
use std::time::Instant;
use tracing::trace;

/// One pose-estimation result, stamped with the time its frame was captured.
#[derive(Debug, Clone)]
pub struct Tick {
    pub at: Instant,
    pub poses: Vec<RawPose>,
}

impl Tick {
    pub fn no_pose(at: Instant) -> Self {
        Self { at, poses: vec![] }
    }
}

/// Everything derived from one frame, for rendering and UI consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameProcessed {
    pub frame_num: usize,
    pub frame: Option<KeypointFrame>,
    /// Model joints scoring above the confidence threshold.
    pub visible_keypoints: usize,
    pub left_knee_angle: Option<f32>,
    pub right_knee_angle: Option<f32>,
    pub depth_percent: Option<f32>,
    pub torso_lean: Option<f32>,
    pub risk_level: Option<RiskLevel>,
    pub segments: Vec<Segment>,
    pub form_faults: Vec<FormFault>,
    pub rep_event: Option<RepCompleted>,
    pub session: SessionState,
}

/// All mutable per-session state, owned by a single controller.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
    counter: RepCounter,
    session: SessionTracker,
    frame_num: usize,
}

impl Pipeline {
    /// Fails if `config` does not validate.
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            config,
            counter: RepCounter::new(),
            session: SessionTracker::new(config.session),
            frame_num: 0,
        })
    }

    pub fn counter(&self) -> &RepCounter {
        &self.counter
    }

    pub fn session(&self) -> SessionState {
        self.session.state()
    }

    pub fn frame_num(&self) -> usize {
        self.frame_num
    }

    pub fn process(&mut self, Tick { at, poses }: Tick) -> FrameProcessed {
        self.frame_num += 1;
        let frame_num = self.frame_num;
        let thresholds = self.config.thresholds;

        let frame = match frame::build(&poses) {
            Ok(frame) => frame,
            Err(reason) => {
                trace!(frame_num, %reason);
                self.session.observe_absence(at);
                return FrameProcessed {
                    frame_num,
                    frame: None,
                    visible_keypoints: 0,
                    left_knee_angle: None,
                    right_knee_angle: None,
                    depth_percent: None,
                    torso_lean: None,
                    risk_level: None,
                    segments: vec![],
                    form_faults: vec![],
                    rep_event: None,
                    session: self.session.state(),
                };
            }
        };

        self.session.observe_presence(at);

        let (knees, rep_event) = match self.counter.observe(&frame, &thresholds) {
            Ok((knees, rep_event)) => (Some(knees), rep_event),
            Err(reason) => {
                skipped(frame_num, "rep counter", reason);
                (None, None)
            }
        };
        if let Some(rep) = rep_event {
            self.session.record_rep(rep);
        }

        let torso_lean = angle::frame_torso_lean(&frame, thresholds.confidence_threshold)
            .map_err(|reason| skipped(frame_num, "posture classifier", reason))
            .ok();
        let risk_level = torso_lean.map(|lean| risk::classify(lean, &thresholds));
        let segments = risk::visible_segments(
            &frame,
            risk_level.unwrap_or(RiskLevel::Normal),
            thresholds.confidence_threshold,
        );
        let form_faults =
            form::form_faults(&frame, &self.config.form, thresholds.confidence_threshold);

        FrameProcessed {
            frame_num,
            visible_keypoints: frame.confident_count(thresholds.confidence_threshold),
            frame: Some(frame),
            left_knee_angle: knees.map(|knees| knees.left),
            right_knee_angle: knees.map(|knees| knees.right),
            depth_percent: knees.map(|knees| knees.depth_percent()),
            torso_lean,
            risk_level,
            segments,
            form_faults,
            rep_event,
            session: self.session.state(),
        }
    }

    /// Clear the counter and the session; the configuration is kept.
    pub fn reset(&mut self) {
        self.counter.reset();
        self.session.reset();
        self.frame_num = 0;
    }
}

fn skipped(frame_num: usize, stage: &'static str, reason: Unavailable) {
    trace!(message = "skipped", frame_num, stage, %reason);
}
