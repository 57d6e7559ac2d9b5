//! Directional guidance towards the frame centre.
//!
//! Each frame the face centre is compared with the reference point. Offsets
//! beyond the tolerance produce independent horizontal and vertical
//! corrections; a face that stays inside the tolerance for enough consecutive
//! frames is reported as centred. Spoken feedback is deduplicated and
//! throttled so the user hears each new instruction once.

use crate::{
    constants::{
        DEFAULT_SPEECH_DELAY_SECS, DEFAULT_STABLE_FRAMES, DEFAULT_TOLERANCE, MSG_CENTERED, MSG_MOVE_DOWN,
        MSG_MOVE_LEFT, MSG_MOVE_RIGHT, MSG_MOVE_UP, MSG_NO_FACE,
    },
    frame::{FaceBox, Point},
};
use log::debug;

/// Single corrective instruction.
///
/// Horizontal instructions refer to the mirrored preview, so a face right of
/// centre in camera coordinates is told to move left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// Face is right of centre in the camera image
    MoveLeft,
    /// Face is left of centre in the camera image
    MoveRight,
    /// Face is below centre
    MoveUp,
    /// Face is above centre
    MoveDown,
}

impl Correction {
    /// Instruction text
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MoveLeft => MSG_MOVE_LEFT,
            Self::MoveRight => MSG_MOVE_RIGHT,
            Self::MoveUp => MSG_MOVE_UP,
            Self::MoveDown => MSG_MOVE_DOWN,
        }
    }
}

/// Outcome of evaluating one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectionResult {
    /// No face in the frame
    NoFaceDetected,
    /// Face outside the tolerance on at least one axis
    OffCenter {
        horizontal: Option<Correction>,
        vertical: Option<Correction>,
    },
    /// Face inside the tolerance but not yet for long enough
    Settling { centered_frames: u32 },
    /// Face inside the tolerance for at least the required frames
    Centered,
}

impl DirectionResult {
    /// Display and speech text; blank while settling
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::NoFaceDetected => MSG_NO_FACE.to_string(),
            Self::OffCenter { horizontal, vertical } => horizontal
                .iter()
                .chain(vertical.iter())
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            Self::Settling { .. } => String::new(),
            Self::Centered => MSG_CENTERED.to_string(),
        }
    }

    /// Whether a face was present
    #[must_use]
    pub const fn has_face(&self) -> bool {
        !matches!(self, Self::NoFaceDetected)
    }
}

/// Centering state and speech throttling for the guidance loop
#[derive(Debug, Clone)]
pub struct GuidanceStateMachine {
    tolerance: i32,
    stable_frames: u32,
    speech_delay: f64,
    center_count: u32,
    last_direction: String,
    last_speech_time: Option<f64>,
}

impl Default for GuidanceStateMachine {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE, DEFAULT_STABLE_FRAMES, DEFAULT_SPEECH_DELAY_SECS)
    }
}

impl GuidanceStateMachine {
    /// Create a state machine
    #[must_use]
    pub const fn new(tolerance: i32, stable_frames: u32, speech_delay: f64) -> Self {
        Self {
            tolerance,
            stable_frames,
            speech_delay,
            center_count: 0,
            last_direction: String::new(),
            last_speech_time: None,
        }
    }

    /// Evaluate the face position for one frame
    pub fn process(&mut self, face: Option<&FaceBox>, reference: Point) -> DirectionResult {
        let Some(face) = face else {
            self.center_count = 0;
            return DirectionResult::NoFaceDetected;
        };

        let center = face.center();
        // Offsets of arbitrary detector boxes can exceed the i32 range.
        let dx = i64::from(center.x) - i64::from(reference.x);
        let dy = i64::from(center.y) - i64::from(reference.y);
        let tolerance = i64::from(self.tolerance);

        let horizontal = (dx.abs() > tolerance).then(|| {
            if dx > 0 {
                Correction::MoveLeft
            } else {
                Correction::MoveRight
            }
        });
        let vertical = (dy.abs() > tolerance).then(|| {
            if dy > 0 {
                Correction::MoveDown
            } else {
                Correction::MoveUp
            }
        });

        if horizontal.is_some() || vertical.is_some() {
            self.center_count = 0;
            debug!("Face off centre by ({dx}, {dy})");
            return DirectionResult::OffCenter { horizontal, vertical };
        }

        self.center_count = self.center_count.saturating_add(1);
        if self.center_count >= self.stable_frames {
            DirectionResult::Centered
        } else {
            DirectionResult::Settling {
                centered_frames: self.center_count,
            }
        }
    }

    /// Decide whether `direction` should be spoken at `now`.
    ///
    /// Returns the text to announce and records it as the last spoken
    /// instruction. Missing faces and blank settling frames are never spoken.
    pub fn announcement(&mut self, direction: &DirectionResult, now: f64) -> Option<String> {
        let text = direction.text();
        if !direction.has_face() || text.is_empty() || text == self.last_direction {
            return None;
        }
        if let Some(last) = self.last_speech_time {
            if now - last < self.speech_delay {
                return None;
            }
        }
        self.last_direction.clone_from(&text);
        self.last_speech_time = Some(now);
        Some(text)
    }

    /// Forget the centering progress
    pub fn reset_center_count(&mut self) {
        self.center_count = 0;
    }

    /// Consecutive frames the face has stayed centred
    #[must_use]
    pub const fn center_count(&self) -> u32 {
        self.center_count
    }

    /// Last announced instruction
    #[must_use]
    pub fn last_direction(&self) -> &str {
        &self.last_direction
    }

    /// Time of the last announcement
    #[must_use]
    pub const fn last_speech_time(&self) -> Option<f64> {
        self.last_speech_time
    }

    /// Pixel tolerance around the reference point
    #[must_use]
    pub const fn tolerance(&self) -> i32 {
        self.tolerance
    }
}
