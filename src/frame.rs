//! Per-frame detector outputs consumed by the guidance engine.
//!
//! The detectors themselves live outside this crate. They hand over a
//! [`FrameSample`] once per processed frame: an optional face box, an
//! optional count of extended fingers and the mean brightness of the frame.

use crate::{
    constants::{FINGER_TIP_INDICES, HAND_LANDMARK_COUNT, LUMA_WEIGHTS_BGR},
    Error, Result,
};
use serde::{Deserialize, Serialize};

/// Integer pixel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position, growing to the right
    pub x: i32,
    /// Vertical position, growing downward
    pub y: i32,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Face bounding box in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceBox {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Box width
    #[serde(alias = "w")]
    pub width: i32,
    /// Box height
    #[serde(alias = "h")]
    pub height: i32,
}

impl FaceBox {
    /// Create a new face box
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Convert a detector box given as fractions of the frame size.
    ///
    /// Coordinates are truncated towards zero, matching how detectors that
    /// report relative boxes are usually mapped back onto the frame.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_relative(xmin: f64, ymin: f64, width: f64, height: f64, frame_width: u32, frame_height: u32) -> Self {
        let fw = f64::from(frame_width);
        let fh = f64::from(frame_height);
        Self {
            x: (xmin * fw) as i32,
            y: (ymin * fh) as i32,
            width: (width * fw) as i32,
            height: (height * fh) as i32,
        }
    }

    /// Integer centre of the box, saturating at the `i32` range
    #[must_use]
    pub const fn center(&self) -> Point {
        Point::new(self.x.saturating_add(self.width / 2), self.y.saturating_add(self.height / 2))
    }
}

/// Face box expressed as fractions of the frame size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativeBox {
    /// Left edge as a fraction of the frame width
    pub xmin: f64,
    /// Top edge as a fraction of the frame height
    pub ymin: f64,
    /// Width as a fraction of the frame width
    pub width: f64,
    /// Height as a fraction of the frame height
    pub height: f64,
}

impl RelativeBox {
    /// Map onto a frame of the given size
    #[must_use]
    pub fn to_pixels(&self, frame_width: u32, frame_height: u32) -> FaceBox {
        FaceBox::from_relative(self.xmin, self.ymin, self.width, self.height, frame_width, frame_height)
    }
}

/// Single hand landmark in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Normalized horizontal position
    pub x: f32,
    /// Normalized vertical position, growing downward
    pub y: f32,
}

/// The 21 landmarks of one detected hand
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    points: Vec<Landmark>,
}

impl HandLandmarks {
    /// Wrap detector landmarks.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 21 landmarks are supplied.
    pub fn new(points: Vec<Landmark>) -> Result<Self> {
        if points.len() < HAND_LANDMARK_COUNT {
            return Err(Error::InvalidInput(format!(
                "Expected {HAND_LANDMARK_COUNT} hand landmarks, got {}",
                points.len()
            )));
        }
        Ok(Self { points })
    }

    /// Count fingers whose tip sits above the joint two landmarks below it
    #[must_use]
    pub fn extended_finger_count(&self) -> u8 {
        let count = FINGER_TIP_INDICES
            .iter()
            .filter(|&&tip| self.points[tip].y < self.points[tip - 2].y)
            .count();
        // At most five tips are inspected.
        count as u8
    }

    /// Raw landmarks
    #[must_use]
    pub fn points(&self) -> &[Landmark] {
        &self.points
    }
}

/// Everything the detectors observed in one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSample {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Dominant face, if any
    pub face_box: Option<FaceBox>,
    /// Extended fingers of the most recently observed hand, if any
    pub hand_finger_extended_count: Option<u8>,
    /// Mean grayscale intensity on a 0-255 scale
    pub brightness: f64,
    /// Capture time in seconds, on the same clock as the engine's `now`
    pub timestamp: f64,
}

impl FrameSample {
    /// Create an empty sample with no detections
    #[must_use]
    pub const fn new(width: u32, height: u32, brightness: f64, timestamp: f64) -> Self {
        Self {
            width,
            height,
            face_box: None,
            hand_finger_extended_count: None,
            brightness,
            timestamp,
        }
    }

    /// Attach a detected face
    #[must_use]
    pub const fn with_face(mut self, face: FaceBox) -> Self {
        self.face_box = Some(face);
        self
    }

    /// Attach a detected hand summarised by its finger count
    #[must_use]
    pub const fn with_fingers(mut self, count: u8) -> Self {
        self.hand_finger_extended_count = Some(count);
        self
    }

    /// Attach a detected hand given by its landmarks
    #[must_use]
    pub fn with_hand(mut self, hand: &HandLandmarks) -> Self {
        self.hand_finger_extended_count = Some(hand.extended_finger_count());
        self
    }

    /// Reference point the face should be moved to
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn center(&self) -> Point {
        Point::new((self.width / 2) as i32, (self.height / 2) as i32)
    }
}

/// Mean intensity of a single-channel 8-bit buffer
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_brightness_luma(pixels: &[u8]) -> Option<f64> {
    if pixels.is_empty() {
        return None;
    }
    let sum: u64 = pixels.iter().map(|&p| u64::from(p)).sum();
    Some(sum as f64 / pixels.len() as f64)
}

/// Mean grayscale intensity of an interleaved BGR8 buffer
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_brightness_bgr(pixels: &[u8]) -> Option<f64> {
    if pixels.is_empty() || pixels.len() % 3 != 0 {
        return None;
    }
    let [wb, wg, wr] = LUMA_WEIGHTS_BGR;
    let total: f64 = pixels
        .chunks_exact(3)
        .map(|px| wb * f64::from(px[0]) + wg * f64::from(px[1]) + wr * f64::from(px[2]))
        .sum();
    Some(total / (pixels.len() / 3) as f64)
}
