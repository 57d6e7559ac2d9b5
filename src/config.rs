//! Configuration management for the face guidance engine

use crate::{
    constants::{
        DEFAULT_CLOSED_HAND_MAX_FINGERS, DEFAULT_FRAME_INTERVAL_MS, DEFAULT_HISTORY_CAPACITY,
        DEFAULT_LATENCY_SMOOTHING, DEFAULT_LIGHT_CHECK_DELAY_SECS, DEFAULT_LOW_LIGHT_THRESHOLD,
        DEFAULT_OPEN_HAND_MIN_FINGERS, DEFAULT_SPEECH_DELAY_SECS, DEFAULT_SPEECH_RATE, DEFAULT_SPEECH_VOLUME,
        DEFAULT_STABLE_FRAMES, DEFAULT_TOLERANCE,
    },
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Centering guidance configuration
    pub guidance: GuidanceConfig,

    /// Hand gesture configuration
    pub gesture: GestureConfig,

    /// Lighting advisory configuration
    pub lighting: LightingConfig,

    /// Voice output configuration
    pub speech: SpeechConfig,

    /// Runtime metrics configuration
    pub metrics: MetricsConfig,

    /// Host loop configuration
    pub host: HostConfig,
}

/// Centering guidance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceConfig {
    /// Pixel radius around the frame centre that counts as centred
    pub tolerance: i32,

    /// Consecutive centred frames before the face is declared stable
    pub stable_frames: u32,

    /// Minimum seconds between spoken instructions
    pub speech_delay_secs: f64,

    /// Restart the centering count when tracking is paused
    pub reset_on_pause: bool,
}

/// Hand gesture thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Extended fingers at or above which tracking pauses
    pub open_hand_min_fingers: u8,

    /// Extended fingers at or below which tracking resumes
    pub closed_hand_max_fingers: u8,
}

/// Lighting advisory parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Mean grayscale intensity (0-255) below which lighting is too low
    pub low_light_threshold: f64,

    /// Seconds between brightness checks
    pub check_interval_secs: f64,
}

/// Voice output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Speak notifications at startup
    pub enabled: bool,

    /// Speech backend (none, log, espeak, say, command:<program>)
    pub backend: String,

    /// Words per minute
    pub rate: u32,

    /// Volume (0.0-1.0)
    pub volume: f64,
}

/// Runtime metrics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Samples kept per metric history
    pub history_capacity: usize,

    /// Weight of the previous value in the latency moving average
    pub latency_smoothing: f64,
}

/// Host loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Milliseconds between processed frames
    pub frame_interval_ms: u64,

    /// Frame source failures in a row before the loop gives up
    pub max_consecutive_failures: u32,

    /// Seconds between logged metric summaries
    pub summary_interval_secs: f64,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            stable_frames: DEFAULT_STABLE_FRAMES,
            speech_delay_secs: DEFAULT_SPEECH_DELAY_SECS,
            reset_on_pause: false,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            open_hand_min_fingers: DEFAULT_OPEN_HAND_MIN_FINGERS,
            closed_hand_max_fingers: DEFAULT_CLOSED_HAND_MAX_FINGERS,
        }
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            low_light_threshold: DEFAULT_LOW_LIGHT_THRESHOLD,
            check_interval_secs: DEFAULT_LIGHT_CHECK_DELAY_SECS,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: "log".to_string(),
            rate: DEFAULT_SPEECH_RATE,
            volume: DEFAULT_SPEECH_VOLUME,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            latency_smoothing: DEFAULT_LATENCY_SMOOTHING,
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            max_consecutive_failures: 30,
            summary_interval_secs: 1.0,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Serialize configuration to YAML text
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_yaml()?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Validate guidance
        if self.guidance.tolerance <= 0 {
            return Err(Error::ConfigError("Tolerance must be greater than 0".to_string()));
        }
        if self.guidance.stable_frames == 0 {
            return Err(Error::ConfigError("Stable frames must be greater than 0".to_string()));
        }
        if !is_non_negative(self.guidance.speech_delay_secs) {
            return Err(Error::ConfigError("Speech delay must be a non-negative number".to_string()));
        }

        // Validate gestures
        if self.gesture.open_hand_min_fingers > 5 {
            return Err(Error::ConfigError(
                "Open hand threshold cannot exceed 5 fingers".to_string(),
            ));
        }
        if self.gesture.closed_hand_max_fingers >= self.gesture.open_hand_min_fingers {
            return Err(Error::ConfigError(
                "Closed hand threshold must be below the open hand threshold".to_string(),
            ));
        }

        // Validate lighting
        if !(0.0..=255.0).contains(&self.lighting.low_light_threshold) {
            return Err(Error::ConfigError(
                "Low light threshold must be between 0 and 255".to_string(),
            ));
        }
        if !is_non_negative(self.lighting.check_interval_secs) {
            return Err(Error::ConfigError(
                "Lighting check interval must be a non-negative number".to_string(),
            ));
        }

        // Validate speech
        if !(0.0..=1.0).contains(&self.speech.volume) {
            return Err(Error::ConfigError("Volume must be between 0.0 and 1.0".to_string()));
        }
        if self.speech.rate == 0 {
            return Err(Error::ConfigError("Speech rate must be greater than 0".to_string()));
        }

        // Validate metrics
        if self.metrics.history_capacity == 0 {
            return Err(Error::ConfigError(
                "History capacity must be greater than 0".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.metrics.latency_smoothing) {
            return Err(Error::ConfigError(
                "Latency smoothing must be in [0.0, 1.0)".to_string(),
            ));
        }

        // Validate host loop
        if self.host.frame_interval_ms == 0 {
            return Err(Error::ConfigError("Frame interval must be greater than 0".to_string()));
        }
        if !is_non_negative(self.host.summary_interval_secs) {
            return Err(Error::ConfigError(
                "Summary interval must be a non-negative number".to_string(),
            ));
        }

        Ok(())
    }
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Face Guidance Configuration

# Centering guidance
guidance:
  tolerance: 70
  stable_frames: 7
  speech_delay_secs: 1.5
  reset_on_pause: false

# Hand gestures (open hand pauses, fist resumes)
gesture:
  open_hand_min_fingers: 4
  closed_hand_max_fingers: 1

# Lighting advisory
lighting:
  low_light_threshold: 60.0
  check_interval_secs: 3.0

# Voice output
speech:
  enabled: true
  backend: "log"
  rate: 150
  volume: 0.9

# Runtime metrics
metrics:
  history_capacity: 50
  latency_smoothing: 0.9

# Host loop
host:
  frame_interval_ms: 30
  max_consecutive_failures: 30
  summary_interval_secs: 1.0
"#;
