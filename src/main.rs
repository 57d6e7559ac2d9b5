//! Face guidance application replaying detector output through the engine.

use anyhow::{Context, Result};
use clap::Parser;
use face_guidance::{
    app::{AppConfig, GuidanceApp, ReplaySource},
    config::Config,
};
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Recorded detector output to replay (YAML)
    #[arg(short, long, required_unless_present = "print_config")]
    replay: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Pixel tolerance around the frame centre
    #[arg(short, long)]
    tolerance: Option<i32>,

    /// Consecutive centred frames before the face counts as stable
    #[arg(short, long)]
    stable_frames: Option<u32>,

    /// Seconds between spoken instructions
    #[arg(long)]
    speech_delay: Option<f64>,

    /// Speech backend (none, log, espeak, say, command:<program>)
    #[arg(long)]
    voice_backend: Option<String>,

    /// Start with voice output disabled
    #[arg(long)]
    no_voice: bool,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Milliseconds between processed frames
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Replay as fast as possible
    #[arg(long)]
    fast: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Face Guidance");

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    // Command line overrides
    if let Some(tolerance) = args.tolerance {
        config.guidance.tolerance = tolerance;
    }
    if let Some(stable_frames) = args.stable_frames {
        config.guidance.stable_frames = stable_frames;
    }
    if let Some(delay) = args.speech_delay {
        config.guidance.speech_delay_secs = delay;
    }
    if let Some(backend) = args.voice_backend {
        config.speech.backend = backend;
    }
    if args.no_voice {
        config.speech.enabled = false;
    }
    if let Some(interval) = args.interval_ms {
        config.host.frame_interval_ms = interval;
    }

    config.validate().context("Invalid configuration")?;

    if args.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let replay = args.replay.context("No recording given")?;
    let source = ReplaySource::from_file(&replay).with_context(|| format!("Failed to open {replay}"))?;
    info!("Replaying {} frames", source.len());

    let app_config = AppConfig {
        config,
        max_frames: args.max_frames,
        unpaced: args.fast,
    };

    // Create and run application
    let mut app = GuidanceApp::new(app_config, Box::new(source))?;
    let summary = app.run()?;
    let speech = app.finish()?;

    info!(
        "Processed {} frames ({} skipped), {} announcements, {} spoken, {} failed",
        summary.frames_processed,
        summary.frames_failed,
        summary.announcement_count,
        speech.delivered,
        speech.failed
    );

    Ok(())
}
