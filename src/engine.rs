use crate::{
    config::Config,
    error::Error,
    pipeline::{FrameProcessed, Pipeline, Tick},
    pose::RawPose,
};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};
use tracing::{info, warn};

/// Output of one pose-model invocation.
#[derive(Debug, Clone)]
pub struct Detection {
    /// When the frame the model ran on was captured.
    pub at: Instant,
    pub poses: Vec<RawPose>,
}

impl From<Detection> for Tick {
    fn from(Detection { at, poses }: Detection) -> Self {
        Self { at, poses }
    }
}

/// Anything that can produce pose-model results, one frame at a time.
pub trait PoseEstimator {
    /// The next result, or `Ok(None)` once the source is exhausted.
    fn estimate(&mut self) -> Result<Option<Detection>, Error>;
}

impl<E> PoseEstimator for &mut E
where
    E: PoseEstimator + ?Sized,
{
    fn estimate(&mut self) -> Result<Option<Detection>, Error> {
        (**self).estimate()
    }
}

/// Halts a running [`Engine`] from another thread.
///
/// The engine checks the flag before asking the estimator for each frame, so
/// a stop takes effect once the estimate in flight returns. An estimator
/// blocked on its input, such as a replay reading an idle stdin, holds the
/// stop until that input arrives or closes.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        !self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Copy, Clone, Default)]
pub struct Timing {
    pub inference: Duration,
    pub processing: Duration,
}

pub struct Engine<E> {
    estimator: E,
    pipeline: Pipeline,
    running: Arc<AtomicBool>,
    timing: Timing,
}

impl<E> Engine<E>
where
    E: PoseEstimator,
{
    pub fn new(estimator: E, config: Config) -> Result<Self, Error> {
        Ok(Self {
            estimator,
            pipeline: Pipeline::new(config)?,
            running: Arc::new(AtomicBool::new(true)),
            timing: Default::default(),
        })
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.running.clone())
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Pull one result from the estimator and push it through the pipeline.
    ///
    /// Returns `None` once the estimator is exhausted. A failed estimate is
    /// processed as a frame without a pose.
    pub fn step(&mut self) -> Option<FrameProcessed> {
        let start_inference = Instant::now();
        let estimate = self.estimator.estimate();
        self.timing.inference += start_inference.elapsed();

        let tick = match estimate {
            Ok(Some(detection)) => Tick::from(detection),
            Ok(None) => return None,
            Err(error) => {
                warn!(
                    message = "pose estimation failed",
                    frame_num = self.pipeline.frame_num() + 1,
                    error = ?error
                );
                Tick::no_pose(Instant::now())
            }
        };

        let start_processing = Instant::now();
        let processed = self.pipeline.process(tick);
        self.timing.processing += start_processing.elapsed();
        Some(processed)
    }

    /// Process frames until the estimator runs dry or the engine is stopped,
    /// handing each result to `on_frame`.
    ///
    /// Returns the number of frames delivered.
    pub fn run<F, S>(&mut self, mut on_frame: F) -> Result<usize, S>
    where
        F: FnMut(FrameProcessed) -> Result<(), S>,
    {
        let mut nframes = 0;

        while self.running.load(Ordering::SeqCst) {
            match self.step() {
                Some(processed) => {
                    on_frame(processed)?;
                    nframes += 1;
                }
                None => break,
            }
        }

        let session = self.pipeline.session();
        info!(
            message = "engine finished",
            nframes,
            stopped = !self.running.load(Ordering::SeqCst),
            total_reps = session.total_reps,
            complete = session.is_complete(),
            active_time = %session.active_time(),
            inference = ?self.timing.inference,
            processing = ?self.timing.processing
        );
        Ok(nframes)
    }

    /// Start a fresh session. The estimator and stop state are untouched.
    pub fn reset(&mut self) {
        self.pipeline.reset();
        self.timing = Default::default();
    }
}
