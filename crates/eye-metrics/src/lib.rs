//! Eye metrics
//!
//! Pure geometry and calibration for driver focus scoring:
//! - Eye Aspect Ratio (EAR) from six eye landmarks
//! - Piecewise-linear EAR-to-focus-percent calibration

pub mod calibration;
pub mod geometry;

pub use calibration::{map_ear_to_focus_percent, EAR_CLOSED_THRESHOLD};
pub use geometry::{eye_aspect_ratio, eye_points, Point2};

/// Landmark indices of the left eye in the face-mesh point array.
///
/// Ordering is anatomical: outer corner, two upper lid points, inner corner,
/// two lower lid points, so that indices (1,5) and (2,4) form the vertical
/// pairs and (0,3) the horizontal pair used by the EAR formula.
pub const LEFT_EYE_LANDMARKS: [usize; 6] = [362, 380, 374, 263, 386, 385];

/// Landmark indices of the right eye in the face-mesh point array.
pub const RIGHT_EYE_LANDMARKS: [usize; 6] = [33, 159, 158, 133, 153, 145];
