use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use squat_pose::{
    config::Config, engine::Engine, error::Error, pipeline::FrameProcessed,
    replay::ReplayEstimator,
};
use std::{
    io::{self, Write},
    path::PathBuf,
    sync::mpsc::sync_channel,
};
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;

#[derive(structopt::StructOpt)]
struct Opt {
    /// JSON Lines file of recorded pose-model output; `-` reads stdin.
    #[structopt(default_value = "-", parse(from_os_str))]
    input: PathBuf,

    /// Replay records at the pace of their timestamps.
    #[structopt(short, long)]
    realtime: bool,

    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    #[structopt(short, long, default_value = "1000")]
    queue_size: usize,

    #[structopt(short, long)]
    show_progress: bool,

    #[structopt(flatten)]
    config: Config,
}

fn progress_message(processed: &FrameProcessed) -> String {
    let session = processed.session;
    let posture = match processed.risk_level {
        Some(level) => format!("{:?}", level).to_lowercase(),
        None => "-".to_owned(),
    };
    format!(
        "set {}/{} | reps {}/{} | depth {:>3.0}% | posture {} | joints {:>2} | active {}",
        session.current_set,
        session.total_sets,
        session.reps_in_set(),
        session.reps_per_set,
        processed.depth_percent.unwrap_or(0.0),
        posture,
        processed.visible_keypoints,
        session.active_time(),
    )
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .with(opt.log_level),
    )?;

    let estimator = ReplayEstimator::open(&opt.input)
        .context("failed opening pose records")?
        .realtime(opt.realtime);
    let mut engine = Engine::new(estimator, opt.config).context("invalid configuration")?;

    let stop = engine.stop_handle();
    ctrlc::set_handler(move || stop.stop()).context("failed setting Ctrl-C handler")?;

    let pb_session = if opt.show_progress {
        Some(
            ProgressBar::new_spinner().with_style(
                ProgressStyle::default_spinner()
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                    .template("{prefix:.bold.dim} {spinner} {wide_msg}"),
            ),
        )
    } else {
        None
    };

    let (frames_tx, frames_rx) = sync_channel(opt.queue_size);

    let (nframes, session) = crossbeam::thread::scope(|scope| -> Result<_> {
        let engine_thread = scope.spawn(move |_| {
            let nframes = engine
                .run(|processed| frames_tx.send(processed))
                .context("output thread hung up")?;
            Ok::<_, anyhow::Error>((nframes, engine.pipeline().session()))
        });

        let output_thread = scope.spawn(move |_| {
            let stdout = io::stdout();
            let mut out = stdout.lock();

            for processed in frames_rx {
                let frame_num = processed.frame_num;
                serde_json::to_writer(&mut out, &processed)
                    .map_err(|e| Error::EmitEvent(e, frame_num))?;
                writeln!(out).map_err(|e| Error::WriteEvent(e, frame_num))?;

                if let Some(pb_session) = pb_session.as_ref() {
                    pb_session.set_message(progress_message(&processed));
                    pb_session.inc(1);
                }
            }

            out.flush().context("failed flushing stdout")?;
            if let Some(pb_session) = pb_session {
                pb_session.finish_and_clear();
            }
            Ok::<_, anyhow::Error>(())
        });

        let engine_result = engine_thread
            .join()
            .map_err(|_| anyhow!("engine thread panicked"))?;
        output_thread
            .join()
            .map_err(|_| anyhow!("output thread panicked"))??;
        engine_result
    })
    .map_err(|_| anyhow!("failed joining scoped threads"))??;

    info!(
        message = "session summary",
        nframes,
        total_reps = session.total_reps,
        sets_completed = session.sets_completed(),
        complete = session.is_complete(),
        active_time = %session.active_time()
    );

    Ok(())
}
