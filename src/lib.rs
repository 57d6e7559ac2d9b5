//! Real-time face positioning guidance.
//!
//! This library turns per-frame detector output into guidance for a user who
//! is positioning their face in a camera frame:
//! - directional instructions and a centering indicator
//! - gesture control (open hand pauses tracking, fist resumes it)
//! - a debounced low-light advisory
//! - throttled, deduplicated voice notifications delivered off the frame loop
//! - rolling frame rate, accuracy and latency metrics
//!
//! Face and hand detection, camera capture, rendering and audio synthesis
//! stay outside the crate. Detectors hand over a [`frame::FrameSample`] per
//! frame and speech goes through a [`notification::SpeechSynthesizer`].
//!
//! # Examples
//!
//! ## Processing Frames
//!
//! ```no_run
//! use face_guidance::{
//!     config::Config,
//!     engine::GuidanceEngine,
//!     frame::{FaceBox, FrameSample},
//!     notification::{LogSynthesizer, NotificationChannel},
//! };
//!
//! # fn main() -> face_guidance::Result<()> {
//! let channel = NotificationChannel::spawn(Box::new(LogSynthesizer), true)?;
//! let mut engine = GuidanceEngine::new(&Config::default(), channel)?;
//!
//! // A face right of centre in a 640x480 frame
//! let sample = FrameSample::new(640, 480, 110.0, 0.0).with_face(FaceBox::new(420, 190, 100, 100));
//! let outcome = engine.process_frame(&sample, 0.012);
//!
//! println!("{} ({})", outcome.display.text, outcome.display.indicator.color_hex());
//! println!("{}", outcome.metrics);
//!
//! engine.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Gesture Control
//!
//! ```no_run
//! use face_guidance::gesture::GestureController;
//!
//! # fn main() {
//! let mut gestures = GestureController::default();
//!
//! // Open hand pauses tracking
//! assert_eq!(gestures.update(5), Some(false));
//!
//! // Ambiguous poses change nothing
//! assert_eq!(gestures.update(3), None);
//!
//! // Fist resumes tracking
//! assert_eq!(gestures.update(0), Some(true));
//! # }
//! ```
//!
//! ## Replaying Recorded Detector Output
//!
//! ```no_run
//! use face_guidance::app::{AppConfig, GuidanceApp, ReplaySource};
//!
//! # fn main() -> face_guidance::Result<()> {
//! let source = ReplaySource::from_file("session.yaml")?;
//! let mut app = GuidanceApp::new(AppConfig::default(), Box::new(source))?;
//!
//! let summary = app.run()?;
//! println!("{} frames, {}", summary.frames_processed, summary.metrics);
//!
//! app.finish()?;
//! # Ok(())
//! # }
//! ```

/// Detector output types and brightness helpers
pub mod frame;

/// Directional guidance and centering state machine
pub mod guidance;

/// Hand gesture tracking control
pub mod gesture;

/// Debounced lighting advisory
pub mod lighting;

/// Asynchronous speech notification channel
pub mod notification;

/// Rolling runtime metrics
pub mod metrics;

/// Per-frame engine tying the components together
pub mod engine;

/// Host loop and frame sources
pub mod app;

/// Error types and result handling
pub mod error;

/// Constants used throughout the engine
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
