//! Hand-gesture control of the tracking state.
//!
//! An open hand pauses tracking and a closed hand resumes it. Finger counts
//! between the two thresholds leave the state untouched so an ambiguous pose
//! cannot make tracking flicker.

use crate::constants::{
    DEFAULT_CLOSED_HAND_MAX_FINGERS, DEFAULT_OPEN_HAND_MIN_FINGERS, MSG_TRACKING_PAUSED, MSG_TRACKING_RESUMED,
};
use log::info;

/// Converts extended-finger counts into tracking on/off transitions
#[derive(Debug, Clone)]
pub struct GestureController {
    open_hand_min: u8,
    closed_hand_max: u8,
    tracking_enabled: bool,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(DEFAULT_OPEN_HAND_MIN_FINGERS, DEFAULT_CLOSED_HAND_MAX_FINGERS)
    }
}

impl GestureController {
    /// Create a controller with tracking enabled
    #[must_use]
    pub const fn new(open_hand_min: u8, closed_hand_max: u8) -> Self {
        Self {
            open_hand_min,
            closed_hand_max,
            tracking_enabled: true,
        }
    }

    /// Feed the finger count of the most recent hand.
    ///
    /// Returns the new tracking state only when it changed.
    pub fn update(&mut self, finger_extended_count: u8) -> Option<bool> {
        if finger_extended_count >= self.open_hand_min {
            if self.tracking_enabled {
                self.tracking_enabled = false;
                info!("Open hand detected ({finger_extended_count} fingers), tracking paused");
                return Some(false);
            }
        } else if finger_extended_count <= self.closed_hand_max && !self.tracking_enabled {
            self.tracking_enabled = true;
            info!("Closed hand detected ({finger_extended_count} fingers), tracking resumed");
            return Some(true);
        }
        None
    }

    /// Whether face tracking is currently active
    #[must_use]
    pub const fn tracking_enabled(&self) -> bool {
        self.tracking_enabled
    }

    /// Message announcing a transition to `enabled`
    #[must_use]
    pub const fn announcement(enabled: bool) -> &'static str {
        if enabled {
            MSG_TRACKING_RESUMED
        } else {
            MSG_TRACKING_PAUSED
        }
    }
}
