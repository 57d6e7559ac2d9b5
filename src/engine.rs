//! Per-frame guidance pipeline.
//!
//! [`GuidanceEngine::process_frame`] runs the components in a fixed order:
//! gestures may flip tracking, guidance evaluates the face while tracking is
//! on, the lighting monitor samples on its own schedule, announcements are
//! queued for the speech worker and finally the frame is recorded in the
//! metrics. The call never blocks on speech.

use crate::{
    config::Config,
    constants::{MSG_LIGHTING_OVERLAY, MSG_TRACKING_PAUSED},
    frame::FrameSample,
    gesture::GestureController,
    guidance::{DirectionResult, GuidanceStateMachine},
    lighting::LightingMonitor,
    metrics::{MetricsAggregator, MetricsSnapshot},
    notification::NotificationChannel,
    Result,
};
use log::{debug, warn};

/// Categorical colour of the status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// No face detected
    Neutral,
    /// Tracking paused by gesture
    Paused,
    /// Face centred and stable
    Centered,
    /// Face present but not (yet) centred
    OffCenter,
}

impl Indicator {
    /// Hex colour used by the renderer
    #[must_use]
    pub const fn color_hex(self) -> &'static str {
        match self {
            Self::Neutral => "#555",
            Self::Paused => "#ff3333",
            Self::Centered => "#28a745",
            Self::OffCenter => "#ffc107",
        }
    }
}

/// What the renderer should show for a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    /// Instruction or status text
    pub text: String,
    /// Status indicator colour
    pub indicator: Indicator,
    /// Whether face tracking is active
    pub tracking_enabled: bool,
    /// Whether the low-light warning is active
    pub lighting_warning: bool,
}

impl DisplayState {
    fn new(direction: Option<&DirectionResult>, lighting_warning: bool) -> Self {
        let (text, indicator) = match direction {
            None => (MSG_TRACKING_PAUSED.to_string(), Indicator::Paused),
            Some(d @ DirectionResult::NoFaceDetected) => (d.text(), Indicator::Neutral),
            Some(d @ DirectionResult::Centered) => (d.text(), Indicator::Centered),
            Some(other) => (other.text(), Indicator::OffCenter),
        };
        Self {
            text,
            indicator,
            tracking_enabled: direction.is_some(),
            lighting_warning,
        }
    }

    /// Overlay text for the lighting warning, if active
    #[must_use]
    pub const fn lighting_overlay(&self) -> Option<&'static str> {
        if self.lighting_warning {
            Some(MSG_LIGHTING_OVERLAY)
        } else {
            None
        }
    }
}

/// Everything produced by processing one frame
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    /// Guidance result, `None` while tracking is paused
    pub direction: Option<DirectionResult>,
    /// Renderer state
    pub display: DisplayState,
    /// Messages queued for speech during this frame, in queue order
    pub announcements: Vec<String>,
    /// Metrics after this frame
    pub metrics: MetricsSnapshot,
}

/// Real-time guidance engine
pub struct GuidanceEngine {
    gesture: GestureController,
    guidance: GuidanceStateMachine,
    lighting: LightingMonitor,
    metrics: MetricsAggregator,
    notifications: NotificationChannel,
    reset_on_pause: bool,
}

impl GuidanceEngine {
    /// Create an engine from validated configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &Config, notifications: NotificationChannel) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            gesture: GestureController::new(
                config.gesture.open_hand_min_fingers,
                config.gesture.closed_hand_max_fingers,
            ),
            guidance: GuidanceStateMachine::new(
                config.guidance.tolerance,
                config.guidance.stable_frames,
                config.guidance.speech_delay_secs,
            ),
            lighting: LightingMonitor::new(config.lighting.low_light_threshold, config.lighting.check_interval_secs),
            metrics: MetricsAggregator::new(config.metrics.history_capacity, config.metrics.latency_smoothing),
            notifications,
            reset_on_pause: config.guidance.reset_on_pause,
        })
    }

    /// Process one frame of detector output.
    ///
    /// `now` is the time processing finished, on the same clock as
    /// `sample.timestamp`.
    pub fn process_frame(&mut self, sample: &FrameSample, now: f64) -> FrameOutcome {
        let mut announcements = Vec::new();

        if let Some(count) = sample.hand_finger_extended_count {
            if let Some(enabled) = self.gesture.update(count) {
                if !enabled && self.reset_on_pause {
                    self.guidance.reset_center_count();
                }
                announcements.push(GestureController::announcement(enabled).to_string());
            }
        }

        let direction = self
            .gesture
            .tracking_enabled()
            .then(|| self.guidance.process(sample.face_box.as_ref(), sample.center()));

        if let Some(change) = self.lighting.check(sample.brightness, now) {
            announcements.push(change.message().to_string());
        }

        if let Some(text) = direction.as_ref().and_then(|d| self.guidance.announcement(d, now)) {
            self.metrics.record_response((now - sample.timestamp) * 1000.0);
            announcements.push(text);
        }

        for text in &announcements {
            if let Err(e) = self.notifications.enqueue(text.as_str()) {
                warn!("Dropping notification {text:?}: {e}");
            }
        }

        let face_detected = direction.as_ref().map_or(false, DirectionResult::has_face);
        let metrics = self.metrics.record(sample.timestamp, now, face_detected);
        let display = DisplayState::new(direction.as_ref(), self.lighting.warning());

        debug!(
            "Frame {}: {:?} [{:?}] centred for {} frames",
            metrics.total_frames,
            display.text,
            display.indicator,
            self.guidance.center_count()
        );

        FrameOutcome {
            direction,
            display,
            announcements,
            metrics,
        }
    }

    /// Whether face tracking is active
    #[must_use]
    pub const fn tracking_enabled(&self) -> bool {
        self.gesture.tracking_enabled()
    }

    /// Consecutive centred frames
    #[must_use]
    pub const fn center_count(&self) -> u32 {
        self.guidance.center_count()
    }

    /// Whether the low-light warning is active
    #[must_use]
    pub const fn lighting_warning(&self) -> bool {
        self.lighting.warning()
    }

    /// Last announced instruction
    #[must_use]
    pub fn last_direction(&self) -> &str {
        self.guidance.last_direction()
    }

    /// Current metric values
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Metric aggregator, for history statistics
    #[must_use]
    pub const fn metrics_aggregator(&self) -> &MetricsAggregator {
        &self.metrics
    }

    /// The notification channel
    #[must_use]
    pub const fn notifications(&self) -> &NotificationChannel {
        &self.notifications
    }

    /// Flip voice output and return the new state
    pub fn toggle_voice(&self) -> bool {
        self.notifications.toggle()
    }

    /// Stop the speech worker and wait for it to finish its queue
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread panicked.
    pub fn shutdown(&mut self) -> Result<()> {
        self.notifications.join()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{frame::FaceBox, notification::SilentSynthesizer};

    fn engine(config: &Config) -> GuidanceEngine {
        let channel = NotificationChannel::spawn(Box::new(SilentSynthesizer), true).unwrap();
        GuidanceEngine::new(config, channel).unwrap()
    }

    fn centred(t: f64) -> FrameSample {
        FrameSample::new(640, 480, 120.0, t).with_face(FaceBox::new(270, 190, 100, 100))
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.guidance.stable_frames = 0;
        let channel = NotificationChannel::spawn(Box::new(SilentSynthesizer), true).unwrap();
        assert!(GuidanceEngine::new(&config, channel).is_err());
    }

    #[test]
    fn test_display_states() {
        let mut engine = engine(&Config::default());

        let outcome = engine.process_frame(&FrameSample::new(640, 480, 120.0, 0.0), 0.01);
        assert_eq!(outcome.display.indicator, Indicator::Neutral);
        assert_eq!(outcome.display.text, "No Face Detected");

        let off = FrameSample::new(640, 480, 120.0, 0.1).with_face(FaceBox::new(0, 0, 100, 100));
        let outcome = engine.process_frame(&off, 0.11);
        assert_eq!(outcome.display.indicator, Indicator::OffCenter);
        assert_eq!(outcome.display.text, "Move Right Move Up");

        let outcome = engine.process_frame(&centred(0.2), 0.21);
        assert_eq!(outcome.display.indicator, Indicator::OffCenter);
        assert_eq!(outcome.display.text, "");

        let paused = centred(0.3).with_fingers(5);
        let outcome = engine.process_frame(&paused, 0.31);
        assert_eq!(outcome.display.indicator, Indicator::Paused);
        assert_eq!(outcome.display.text, "Tracking paused");
        assert!(outcome.direction.is_none());
        assert_eq!(outcome.announcements, vec!["Tracking paused"]);
    }

    #[test]
    fn test_paused_frames_do_not_count_detections() {
        let mut engine = engine(&Config::default());
        engine.process_frame(&centred(0.0).with_fingers(5), 0.01);
        let outcome = engine.process_frame(&centred(0.1), 0.11);
        assert_eq!(outcome.metrics.total_frames, 2);
        assert_eq!(outcome.metrics.detected_frames, 0);
    }

    #[test]
    fn test_center_count_frozen_while_paused_by_default() {
        let mut engine = engine(&Config::default());
        for i in 0..3 {
            engine.process_frame(&centred(f64::from(i) * 0.03), f64::from(i) * 0.03);
        }
        engine.process_frame(&centred(0.1).with_fingers(5), 0.1);
        assert_eq!(engine.center_count(), 3);

        engine.process_frame(&centred(0.2).with_fingers(0), 0.2);
        assert_eq!(engine.center_count(), 4);
    }

    #[test]
    fn test_center_count_reset_on_pause_when_configured() {
        let mut config = Config::default();
        config.guidance.reset_on_pause = true;
        let mut engine = engine(&config);
        for i in 0..3 {
            engine.process_frame(&centred(f64::from(i) * 0.03), f64::from(i) * 0.03);
        }
        engine.process_frame(&centred(0.1).with_fingers(5), 0.1);
        assert_eq!(engine.center_count(), 0);
    }

    #[test]
    fn test_lighting_overlay() {
        let mut engine = engine(&Config::default());
        let dark = FrameSample::new(640, 480, 12.0, 0.0);
        let outcome = engine.process_frame(&dark, 0.01);
        assert_eq!(outcome.display.lighting_overlay(), Some("Lighting Too Low"));
        assert_eq!(
            outcome.announcements,
            vec!["Lighting too low. Please increase brightness."]
        );
        assert!(engine.lighting_warning());
    }

    #[test]
    fn test_indicator_colors() {
        assert_eq!(Indicator::Neutral.color_hex(), "#555");
        assert_eq!(Indicator::Paused.color_hex(), "#ff3333");
        assert_eq!(Indicator::Centered.color_hex(), "#28a745");
        assert_eq!(Indicator::OffCenter.color_hex(), "#ffc107");
    }
}
