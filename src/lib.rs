//! Squat repetition counting and posture risk classification from 2D pose
//! estimates.
//!
//! Each pose-model result flows through [`frame::build`], which adds the
//! synthesized spine anchors, then the knee-angle [`counter`], the
//! [`session`] tracker, the torso-lean [`risk`] classifier and the [`form`]
//! checks. The [`pipeline::Pipeline`] owns all of that state;
//! [`engine::Engine`] drives it from any [`engine::PoseEstimator`].
//!
//! ```ignore
//! use squat_pose::{config::Config, engine::Engine, replay::ReplayEstimator};
//!
//! let mut engine = Engine::new(ReplayEstimator::open("session.jsonl")?, Config::default())?;
//! engine.run(|processed| {
//!     if let Some(rep) = processed.rep_event {
//!         println!("rep {}", rep.0);
//!     }
//!     Ok::<_, anyhow::Error>(())
//! })?;
//! ```

pub mod angle;
pub mod config;
pub mod counter;
pub mod engine;
pub mod error;
pub mod form;
pub mod frame;
pub mod pipeline;
pub mod pose;
pub mod replay;
pub mod risk;
pub mod session;

pub use engine::{Detection, Engine, PoseEstimator, StopHandle};
pub use error::{Error, Unavailable};
pub use pipeline::{FrameProcessed, Pipeline};
