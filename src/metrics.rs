//! Rolling runtime metrics for the guidance loop.
//!
//! Frame rate, detection accuracy, smoothed latency and the delay between
//! frame capture and a spoken instruction are tracked here. Each value also
//! lands in a fixed-capacity history so a dashboard can chart the most recent
//! window.

use crate::constants::{DEFAULT_HISTORY_CAPACITY, DEFAULT_LATENCY_SMOOTHING};
use std::collections::VecDeque;
use std::fmt;

/// Fixed-capacity FIFO of metric samples, oldest first
#[derive(Debug, Clone)]
pub struct BoundedHistory {
    capacity: usize,
    values: VecDeque<f64>,
}

impl BoundedHistory {
    /// Create an empty history
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a sample, evicting the oldest one when full
    pub fn push(&mut self, value: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Number of stored samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no sample has been stored yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Maximum number of samples kept
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent sample
    #[must_use]
    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Samples in insertion order
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Copy of the samples in insertion order
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    /// Summary over the current window
    #[must_use]
    pub fn stats(&self) -> Option<Statistics> {
        if self.values.is_empty() {
            return None;
        }
        Some(Statistics::from_window(&self.values))
    }

    /// Drop all samples
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Statistical summary of a history window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Mean value of the data
    pub mean: f64,
    /// Standard deviation of the data
    pub std_dev: f64,
    /// Minimum value in the window
    pub min: f64,
    /// Maximum value in the window
    pub max: f64,
    /// Range (max - min) of the data
    pub range: f64,
}

impl Statistics {
    #[allow(clippy::cast_precision_loss)]
    fn from_window(data: &VecDeque<f64>) -> Self {
        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        let min = data.iter().copied().fold(f64::INFINITY, f64::min);
        let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
            range: max - min,
        }
    }
}

/// The four charted metric series
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricHistories {
    /// Frame rate samples
    pub fps: Vec<f64>,
    /// Tracking accuracy samples in percent
    pub accuracy: Vec<f64>,
    /// Smoothed latency samples in milliseconds
    pub latency_ms: Vec<f64>,
    /// Response efficiency samples in milliseconds
    pub response_efficiency_ms: Vec<f64>,
}

/// Metric values after the most recent frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    /// Instantaneous frame rate, zero until two frames have been seen
    pub fps: f64,
    /// Share of frames with a tracked face, in percent
    pub accuracy: f64,
    /// Smoothed processing latency in milliseconds
    pub latency_ms: f64,
    /// Delay between frame capture and the last spoken instruction
    pub response_efficiency_ms: f64,
    /// Frames recorded since the engine started
    pub total_frames: u64,
    /// Frames in which a face was tracked
    pub detected_frames: u64,
    /// Bounded histories, oldest sample first
    pub history: MetricHistories,
}

impl fmt::Display for MetricsSnapshot {
    #[allow(clippy::cast_possible_truncation)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tracking Accuracy: {:.1}%   FPS: {}   Latency: {:.1} ms   Response Efficiency: {:.1} ms",
            self.accuracy, self.fps as i64, self.latency_ms, self.response_efficiency_ms
        )
    }
}

/// Aggregates per-frame timings into rolling metrics
#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    smoothing: f64,
    previous_timestamp: Option<f64>,
    fps: f64,
    avg_latency_ms: f64,
    response_efficiency_ms: f64,
    total_frames: u64,
    detected_frames: u64,
    fps_history: BoundedHistory,
    accuracy_history: BoundedHistory,
    latency_history: BoundedHistory,
    response_history: BoundedHistory,
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY, DEFAULT_LATENCY_SMOOTHING)
    }
}

impl MetricsAggregator {
    /// Create an aggregator.
    ///
    /// `smoothing` is the weight kept from the previous latency average; the
    /// new sample gets `1 - smoothing`.
    #[must_use]
    pub fn new(history_capacity: usize, smoothing: f64) -> Self {
        Self {
            smoothing,
            previous_timestamp: None,
            fps: 0.0,
            avg_latency_ms: 0.0,
            response_efficiency_ms: 0.0,
            total_frames: 0,
            detected_frames: 0,
            fps_history: BoundedHistory::new(history_capacity),
            accuracy_history: BoundedHistory::new(history_capacity),
            latency_history: BoundedHistory::new(history_capacity),
            response_history: BoundedHistory::new(history_capacity),
        }
    }

    /// Remember how long the last spoken instruction took to produce
    pub fn record_response(&mut self, response_ms: f64) {
        self.response_efficiency_ms = response_ms;
    }

    /// Record one processed frame and return the updated metrics
    pub fn record(&mut self, frame_start: f64, frame_end: f64, face_detected: bool) -> MetricsSnapshot {
        self.total_frames += 1;
        if face_detected {
            self.detected_frames += 1;
        }

        if let Some(previous) = self.previous_timestamp {
            let elapsed = frame_end - previous;
            // Two frames stamped at the same instant keep the last rate.
            if elapsed > 0.0 {
                self.fps = 1.0 / elapsed;
            }
        }
        self.previous_timestamp = Some(frame_end);

        let instant_latency_ms = (frame_end - frame_start) * 1000.0;
        self.avg_latency_ms = self.smoothing * self.avg_latency_ms + (1.0 - self.smoothing) * instant_latency_ms;

        let accuracy = self.accuracy();
        self.fps_history.push(self.fps);
        self.accuracy_history.push(accuracy);
        self.latency_history.push(self.avg_latency_ms);
        self.response_history.push(self.response_efficiency_ms);

        self.snapshot()
    }

    /// Detected frames over total frames in percent, zero before any frame
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn accuracy(&self) -> f64 {
        if self.total_frames == 0 {
            return 0.0;
        }
        self.detected_frames as f64 / self.total_frames as f64 * 100.0
    }

    /// Current metric values without recording a frame
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            fps: self.fps,
            accuracy: self.accuracy(),
            latency_ms: self.avg_latency_ms,
            response_efficiency_ms: self.response_efficiency_ms,
            total_frames: self.total_frames,
            detected_frames: self.detected_frames,
            history: MetricHistories {
                fps: self.fps_history.to_vec(),
                accuracy: self.accuracy_history.to_vec(),
                latency_ms: self.latency_history.to_vec(),
                response_efficiency_ms: self.response_history.to_vec(),
            },
        }
    }

    /// Frame rate history
    #[must_use]
    pub const fn fps_history(&self) -> &BoundedHistory {
        &self.fps_history
    }

    /// Accuracy history
    #[must_use]
    pub const fn accuracy_history(&self) -> &BoundedHistory {
        &self.accuracy_history
    }

    /// Latency history
    #[must_use]
    pub const fn latency_history(&self) -> &BoundedHistory {
        &self.latency_history
    }

    /// Response efficiency history
    #[must_use]
    pub const fn response_history(&self) -> &BoundedHistory {
        &self.response_history
    }
}
