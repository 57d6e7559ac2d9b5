//! Debounced low-light advisory.

use crate::constants::{DEFAULT_LIGHT_CHECK_DELAY_SECS, DEFAULT_LOW_LIGHT_THRESHOLD, MSG_LIGHTING_LOW, MSG_LIGHTING_OK};
use log::info;

/// Change of the lighting advisory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryChange {
    /// Brightness dropped below the threshold
    Raised,
    /// Brightness recovered
    Cleared,
}

impl AdvisoryChange {
    /// Spoken message for this change
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Raised => MSG_LIGHTING_LOW,
            Self::Cleared => MSG_LIGHTING_OK,
        }
    }
}

/// Samples brightness on its own schedule and toggles a warning
#[derive(Debug, Clone)]
pub struct LightingMonitor {
    threshold: f64,
    check_delay: f64,
    last_check: Option<f64>,
    warning: bool,
}

impl Default for LightingMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_LOW_LIGHT_THRESHOLD, DEFAULT_LIGHT_CHECK_DELAY_SECS)
    }
}

impl LightingMonitor {
    /// Create a monitor; the first call to [`check`](Self::check) always samples
    #[must_use]
    pub const fn new(threshold: f64, check_delay: f64) -> Self {
        Self {
            threshold,
            check_delay,
            last_check: None,
            warning: false,
        }
    }

    /// Whether a brightness sample is due at `now`
    #[must_use]
    pub fn is_due(&self, now: f64) -> bool {
        self.last_check.map_or(true, |last| now - last > self.check_delay)
    }

    /// Sample brightness if the check interval has passed.
    ///
    /// Calls inside the interval are ignored and do not restart it.
    pub fn check(&mut self, brightness: f64, now: f64) -> Option<AdvisoryChange> {
        if !self.is_due(now) {
            return None;
        }
        self.last_check = Some(now);

        if brightness < self.threshold {
            if !self.warning {
                self.warning = true;
                info!("Low light detected (brightness {brightness:.1})");
                return Some(AdvisoryChange::Raised);
            }
        } else if self.warning {
            self.warning = false;
            info!("Lighting recovered (brightness {brightness:.1})");
            return Some(AdvisoryChange::Cleared);
        }
        None
    }

    /// Whether the low-light warning is active
    #[must_use]
    pub const fn warning(&self) -> bool {
        self.warning
    }

    /// Time of the last brightness sample
    #[must_use]
    pub const fn last_check(&self) -> Option<f64> {
        self.last_check
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_check_samples_immediately() {
        let mut monitor = LightingMonitor::default();
        assert_eq!(monitor.check(20.0, 0.0), Some(AdvisoryChange::Raised));
        assert!(monitor.warning());
    }

    #[test]
    fn test_checks_inside_interval_are_ignored() {
        let mut monitor = LightingMonitor::default();
        monitor.check(100.0, 0.0);
        assert_eq!(monitor.check(10.0, 1.0), None);
        assert_eq!(monitor.check(10.0, 3.0), None);
        assert!(!monitor.warning());
        // Ignored calls do not restart the interval.
        assert_eq!(monitor.check(10.0, 3.01), Some(AdvisoryChange::Raised));
        assert_eq!(monitor.last_check(), Some(3.01));
    }

    #[test]
    fn test_warning_clears_when_bright_again() {
        let mut monitor = LightingMonitor::default();
        monitor.check(10.0, 0.0);
        assert_eq!(monitor.check(10.0, 4.0), None);
        assert_eq!(monitor.check(60.0, 8.0), Some(AdvisoryChange::Cleared));
        assert!(!monitor.warning());
    }

    #[test]
    fn test_bright_frames_never_warn() {
        let mut monitor = LightingMonitor::default();
        for i in 0..20 {
            assert_eq!(monitor.check(60.0 + f64::from(i), f64::from(i) * 3.5), None);
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(AdvisoryChange::Raised.message(), "Lighting too low. Please increase brightness.");
        assert_eq!(AdvisoryChange::Cleared.message(), "Lighting is okay.");
    }
}
