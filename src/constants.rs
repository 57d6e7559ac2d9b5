//! Constants used throughout the engine

/// Pixel radius around the frame centre that still counts as centred
pub const DEFAULT_TOLERANCE: i32 = 70;

/// Consecutive centred frames required before declaring the face stable
pub const DEFAULT_STABLE_FRAMES: u32 = 7;

/// Minimum seconds between two spoken direction changes
pub const DEFAULT_SPEECH_DELAY_SECS: f64 = 1.5;

/// Seconds between two lighting checks
pub const DEFAULT_LIGHT_CHECK_DELAY_SECS: f64 = 3.0;

/// Mean grayscale intensity (0-255) below which lighting is too low
pub const DEFAULT_LOW_LIGHT_THRESHOLD: f64 = 60.0;

/// Extended fingers at or above which the hand counts as open
pub const DEFAULT_OPEN_HAND_MIN_FINGERS: u8 = 4;

/// Extended fingers at or below which the hand counts as closed
pub const DEFAULT_CLOSED_HAND_MAX_FINGERS: u8 = 1;

/// Capacity of each metric history buffer
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Most recent announcements kept in a run summary
pub const RECENT_ANNOUNCEMENTS: usize = 100;

/// Weight of the previous value in the latency moving average
pub const DEFAULT_LATENCY_SMOOTHING: f64 = 0.9;

/// Host loop cadence
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 30;

/// Speech defaults
pub const DEFAULT_SPEECH_RATE: u32 = 150;
pub const DEFAULT_SPEECH_VOLUME: f64 = 0.9;

/// Landmark layout of a detected hand
pub const HAND_LANDMARK_COUNT: usize = 21;
pub const FINGER_TIP_INDICES: [usize; 5] = [4, 8, 12, 16, 20];

/// BT.601 luma weights in BGR order
pub const LUMA_WEIGHTS_BGR: [f64; 3] = [0.114, 0.587, 0.299];

/// Spoken and displayed messages
pub const MSG_NO_FACE: &str = "No Face Detected";
pub const MSG_CENTERED: &str = "Centered[OK]";
pub const MSG_MOVE_LEFT: &str = "Move Left";
pub const MSG_MOVE_RIGHT: &str = "Move Right";
pub const MSG_MOVE_UP: &str = "Move Up";
pub const MSG_MOVE_DOWN: &str = "Move Down";
pub const MSG_TRACKING_PAUSED: &str = "Tracking paused";
pub const MSG_TRACKING_RESUMED: &str = "Tracking resumed";
pub const MSG_LIGHTING_LOW: &str = "Lighting too low. Please increase brightness.";
pub const MSG_LIGHTING_OK: &str = "Lighting is okay.";
pub const MSG_LIGHTING_OVERLAY: &str = "Lighting Too Low";
