//! Headless driver for dotrail.
//!
//! Runs a session for a fixed number of frames and logs what the trail
//! batches would upload. Useful for profiling and for checking a config or
//! preset without a renderer.
//!
//! ```text
//! dotrail [config.json] [frames]
//! ```
//!
//! Set `RUST_LOG=dotrail=debug` for per-commit logging.

use dotrail::{PresetCompiler, Session, SessionConfig, Time};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_FRAMES: u64 = 600;
const REPORT_EVERY: u64 = 60;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            info!(path, "loading configuration");
            SessionConfig::load(&path)?
        }
        None => SessionConfig::default(),
    };
    let frames = match args.next() {
        Some(frames) => frames.parse::<u64>()?,
        None => DEFAULT_FRAMES,
    };

    let mut session = Session::new(PresetCompiler::new(), &config)?;
    let mut time = Time::new(config.steps_per_second);
    time.set_fixed_delta(Some(1.0 / 60.0));

    info!(frames, steps_per_second = config.steps_per_second, "running");

    for frame in 1..=frames {
        let report = session.tick(time.update());

        if frame % REPORT_EVERY == 0 || frame == frames {
            let points = session.points().last_stats();
            let shapes = session.shapes().last_stats();
            info!(
                frame,
                live = report.live,
                history = session.history().len(),
                points = points.written,
                points_dropped = points.dropped,
                shapes = shapes.written,
                shapes_dropped = shapes.dropped,
                bytes = session.points().as_bytes().len() + session.shapes().as_bytes().len(),
                "frame"
            );
        }
    }

    info!(
        commits = session.history().commits(),
        dropped = session.history().dropped(),
        "done"
    );
    Ok(())
}
