//! Host loop driving the guidance engine.
//!
//! Detectors and capture live outside the crate; they are represented by a
//! [`FrameSource`]. The loop pulls one sample per tick, hands it to the
//! engine and paces itself to the configured frame interval. Source failures
//! are logged and the frame skipped so a flaky camera never stops guidance.

use crate::{
    config::Config,
    constants::RECENT_ANNOUNCEMENTS,
    engine::{DisplayState, GuidanceEngine},
    frame::{mean_brightness_bgr, FaceBox, FrameSample, HandLandmarks, Landmark, RelativeBox},
    metrics::MetricsSnapshot,
    notification::{create_synthesizer, ChannelStats, NotificationChannel},
    Error, Result,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{
    collections::VecDeque,
    path::Path,
    thread,
    time::{Duration, Instant},
};

/// Supplier of per-frame detector output
pub trait FrameSource {
    /// Produce the next sample stamped with `timestamp`, or `None` at the end
    /// of the stream
    ///
    /// # Errors
    ///
    /// Returns an error if this frame could not be read; later frames may
    /// still succeed.
    fn next_frame(&mut self, timestamp: f64) -> Result<Option<FrameSample>>;
}

/// One frame of a recorded detector session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Face box in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face: Option<FaceBox>,
    /// Face box as fractions of the frame size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_relative: Option<RelativeBox>,
    /// Extended finger count of the detected hand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingers: Option<u8>,
    /// Raw landmarks of the detected hand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand_landmarks: Option<Vec<Landmark>>,
    /// Mean grayscale intensity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    /// Raw BGR8 pixels to derive brightness from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixels_bgr: Option<Vec<u8>>,
    /// Number of consecutive frames this entry stands for
    #[serde(default = "default_repeat")]
    pub repeat: usize,
}

const fn default_repeat() -> usize {
    1
}

impl RecordedFrame {
    /// Build the engine input for this recorded frame
    ///
    /// # Errors
    ///
    /// Returns an error if the hand landmarks are incomplete or no
    /// brightness can be derived.
    pub fn to_sample(&self, timestamp: f64) -> Result<FrameSample> {
        let mut sample = FrameSample::new(self.width, self.height, self.brightness()?, timestamp);

        sample.face_box = self
            .face
            .or_else(|| self.face_relative.map(|r| r.to_pixels(self.width, self.height)));

        sample.hand_finger_extended_count = match &self.hand_landmarks {
            Some(points) => Some(
                HandLandmarks::new(points.clone())
                    .map_err(|e| Error::FrameSource(e.to_string()))?
                    .extended_finger_count(),
            ),
            None => self.fingers,
        };

        Ok(sample)
    }

    fn brightness(&self) -> Result<f64> {
        if let Some(brightness) = self.brightness {
            return Ok(brightness);
        }
        let pixels = self
            .pixels_bgr
            .as_deref()
            .ok_or_else(|| Error::FrameSource("Frame has neither brightness nor pixels".to_string()))?;
        mean_brightness_bgr(pixels)
            .ok_or_else(|| Error::FrameSource(format!("Invalid BGR buffer of {} bytes", pixels.len())))
    }
}

#[derive(Debug, Deserialize)]
struct Recording {
    frames: Vec<RecordedFrame>,
}

/// Replays a YAML recording of detector output
pub struct ReplaySource {
    frames: Vec<RecordedFrame>,
    index: usize,
    emitted: usize,
}

impl ReplaySource {
    /// Wrap recorded frames
    #[must_use]
    pub const fn new(frames: Vec<RecordedFrame>) -> Self {
        Self {
            frames,
            index: 0,
            emitted: 0,
        }
    }

    /// Load a recording from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening recording: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        Self::from_yaml(&content)
    }

    /// Parse a recording from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let recording: Recording = serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse recording: {}", e)))?;

        Ok(Self::new(recording.frames))
    }

    /// Total frames the recording expands to
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.iter().map(|f| f.repeat).sum()
    }

    /// Whether the recording holds no frames
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self, timestamp: f64) -> Result<Option<FrameSample>> {
        while let Some(frame) = self.frames.get(self.index) {
            if self.emitted < frame.repeat {
                self.emitted += 1;
                return frame.to_sample(timestamp).map(Some);
            }
            self.index += 1;
            self.emitted = 0;
        }
        Ok(None)
    }
}

/// In-memory frame source; `Err` entries simulate read failures
pub struct ScriptedSource {
    frames: VecDeque<std::result::Result<FrameSample, String>>,
}

impl ScriptedSource {
    /// Script the given samples and failures in order
    #[must_use]
    pub fn new(frames: Vec<std::result::Result<FrameSample, String>>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    /// Script the given samples only
    #[must_use]
    pub fn from_samples(samples: Vec<FrameSample>) -> Self {
        Self::new(samples.into_iter().map(Ok).collect())
    }
}

impl FrameSource for ScriptedSource {
    fn next_frame(&mut self, timestamp: f64) -> Result<Option<FrameSample>> {
        match self.frames.pop_front() {
            None => Ok(None),
            Some(Ok(mut sample)) => {
                sample.timestamp = timestamp;
                Ok(Some(sample))
            }
            Some(Err(reason)) => Err(Error::FrameSource(reason)),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Engine, speech and host settings
    pub config: Config,
    /// Stop after this many processed frames
    pub max_frames: Option<u64>,
    /// Process as fast as possible instead of at the frame interval
    pub unpaced: bool,
}

/// Result of a finished run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Frames handed to the engine
    pub frames_processed: u64,
    /// Frames skipped after a source failure
    pub frames_failed: u64,
    /// Metrics after the last frame
    pub metrics: MetricsSnapshot,
    /// Display state of the last frame
    pub last_display: Option<DisplayState>,
    /// Messages queued for speech over the whole run
    pub announcement_count: u64,
    /// Most recent queued messages, oldest first
    pub announcements: Vec<String>,
}

/// Main application struct
pub struct GuidanceApp {
    config: AppConfig,
    engine: GuidanceEngine,
    source: Box<dyn FrameSource>,
    started: Instant,
}

impl GuidanceApp {
    /// Create the application, starting the speech worker
    ///
    /// # Errors
    ///
    /// Returns an error for invalid configuration, an unknown speech backend
    /// or if the worker thread cannot be started.
    pub fn new(config: AppConfig, source: Box<dyn FrameSource>) -> Result<Self> {
        info!("Initializing face guidance application");
        config.config.validate()?;

        let speech = &config.config.speech;
        let synthesizer = create_synthesizer(&speech.backend, speech.rate, speech.volume)?;
        let channel = NotificationChannel::spawn(synthesizer, speech.enabled)?;
        let engine = GuidanceEngine::new(&config.config, channel)?;

        Ok(Self::with_engine(config, engine, source))
    }

    /// Create the application around an existing engine
    #[must_use]
    pub fn with_engine(config: AppConfig, engine: GuidanceEngine, source: Box<dyn FrameSource>) -> Self {
        Self {
            config,
            engine,
            source,
            started: Instant::now(),
        }
    }

    /// Run the main application loop until the source ends
    ///
    /// The speech worker is asked to stop on return but not waited for; use
    /// [`finish`](Self::finish) to drain it.
    ///
    /// # Errors
    ///
    /// Returns an error when the source fails more often in a row than
    /// allowed.
    pub fn run(&mut self) -> Result<RunSummary> {
        info!("Starting main application loop");

        let host = self.config.config.host.clone();
        let interval = Duration::from_millis(host.frame_interval_ms);
        let summary_interval = Duration::from_secs_f64(host.summary_interval_secs);

        let mut frames_processed = 0_u64;
        let mut frames_failed = 0_u64;
        let mut consecutive_failures = 0_u32;
        let mut last_display = None;
        let mut announcement_count = 0_u64;
        let mut announcements = VecDeque::with_capacity(RECENT_ANNOUNCEMENTS);
        let mut last_summary = Instant::now();

        loop {
            if self.config.max_frames.is_some_and(|max| frames_processed >= max) {
                info!("Frame limit reached");
                break;
            }

            let tick = Instant::now();
            let timestamp = self.elapsed_secs();
            match self.source.next_frame(timestamp) {
                Ok(Some(sample)) => {
                    consecutive_failures = 0;
                    let now = self.elapsed_secs();
                    let outcome = self.engine.process_frame(&sample, now);
                    frames_processed += 1;

                    if last_summary.elapsed() >= summary_interval {
                        info!("{}", outcome.metrics);
                        last_summary = Instant::now();
                    }
                    for text in outcome.announcements {
                        announcement_count += 1;
                        if announcements.len() == RECENT_ANNOUNCEMENTS {
                            announcements.pop_front();
                        }
                        announcements.push_back(text);
                    }
                    last_display = Some(outcome.display);
                }
                Ok(None) => {
                    info!("End of frame source reached");
                    break;
                }
                Err(e) => {
                    frames_failed += 1;
                    consecutive_failures += 1;
                    warn!("Failed to read frame, skipping: {}", e);
                    if consecutive_failures >= host.max_consecutive_failures {
                        self.engine.notifications().shutdown();
                        return Err(Error::FrameSource(format!(
                            "{consecutive_failures} consecutive frame failures, last: {e}"
                        )));
                    }
                }
            }

            if !self.config.unpaced {
                if let Some(remaining) = interval.checked_sub(tick.elapsed()) {
                    thread::sleep(remaining);
                }
            }
        }

        let metrics = self.engine.metrics();
        info!("{}", metrics);
        info!("Application shutting down after {} frames", frames_processed);
        self.engine.notifications().shutdown();

        Ok(RunSummary {
            frames_processed,
            frames_failed,
            metrics,
            last_display,
            announcement_count,
            announcements: announcements.into(),
        })
    }

    /// Wait for the speech worker to drain and return its counters
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread panicked.
    pub fn finish(&mut self) -> Result<ChannelStats> {
        self.engine.shutdown()?;
        let stats = self.engine.notifications().stats();
        debug!("Speech worker finished: {:?}", stats);
        Ok(stats)
    }

    /// The engine driven by this application
    #[must_use]
    pub const fn engine(&self) -> &GuidanceEngine {
        &self.engine
    }

    fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDING: &str = r#"
frames:
  - { width: 640, height: 480, brightness: 120.0, repeat: 2 }
  - width: 640
    height: 480
    face_relative: { xmin: 0.4, ymin: 0.4, width: 0.2, height: 0.2 }
    fingers: 2
    brightness: 120.0
  - width: 640
    height: 480
    face: { x: 0, y: 0, w: 50, h: 50 }
    pixels_bgr: [255, 255, 255, 0, 0, 0]
"#;

    #[test]
    fn test_replay_expands_repeats() {
        let mut source = ReplaySource::from_yaml(RECORDING).unwrap();
        assert_eq!(source.len(), 4);

        let mut samples = Vec::new();
        while let Some(sample) = source.next_frame(samples.len() as f64).unwrap() {
            samples.push(sample);
        }
        assert_eq!(samples.len(), 4);
        assert!(samples[0].face_box.is_none());
        assert_eq!(samples[2].face_box, Some(FaceBox::new(256, 192, 128, 96)));
        assert_eq!(samples[2].hand_finger_extended_count, Some(2));
        assert_eq!(samples[3].face_box, Some(FaceBox::new(0, 0, 50, 50)));
        assert!((samples[3].brightness - 127.5).abs() < 1e-9);
        assert_eq!(samples[3].timestamp, 3.0);
    }

    #[test]
    fn test_frame_without_brightness_is_an_error() {
        let mut source = ReplaySource::from_yaml("frames:\n  - { width: 10, height: 10 }\n").unwrap();
        assert!(matches!(source.next_frame(0.0), Err(Error::FrameSource(_))));
        assert!(source.next_frame(0.0).unwrap().is_none());
    }

    #[test]
    fn test_scripted_source_stamps_samples() {
        let mut source = ScriptedSource::new(vec![
            Ok(FrameSample::new(640, 480, 100.0, 99.0)),
            Err("camera unplugged".to_string()),
        ]);
        assert_eq!(source.next_frame(1.5).unwrap().unwrap().timestamp, 1.5);
        assert!(source.next_frame(2.0).is_err());
        assert!(source.next_frame(2.5).unwrap().is_none());
    }

    #[test]
    fn test_summary_keeps_only_recent_announcements() {
        // Alternating open hand and fist toggles tracking on every frame.
        let samples = (0..250)
            .map(|i| FrameSample::new(640, 480, 120.0, 0.0).with_fingers(if i % 2 == 0 { 5 } else { 0 }))
            .collect();
        let mut config = AppConfig {
            unpaced: true,
            ..AppConfig::default()
        };
        config.config.speech.backend = "none".to_string();

        let mut app = GuidanceApp::new(config, Box::new(ScriptedSource::from_samples(samples))).unwrap();
        let summary = app.run().unwrap();
        app.finish().unwrap();

        assert_eq!(summary.announcement_count, 250);
        assert_eq!(summary.announcements.len(), RECENT_ANNOUNCEMENTS);
        assert_eq!(summary.announcements.first().map(String::as_str), Some("Tracking paused"));
        assert_eq!(summary.announcements.last().map(String::as_str), Some("Tracking resumed"));
    }
}
