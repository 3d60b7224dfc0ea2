//! EAR geometry

use serde::{Deserialize, Serialize};

/// A single 2D landmark in normalized [0,1] image coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// EAR value returned for malformed input ("eyes fully open").
pub const EAR_OPEN_DEFAULT: f64 = 1.0;

/// Compute the Eye Aspect Ratio from six ordered eye landmarks.
///
/// `(|p1-p5| + |p2-p4|) / (2 * |p0-p3|)` — two vertical lid distances over
/// twice the horizontal corner distance. Lower values mean more closed eyes.
/// Anything but exactly six points yields the fully-open default so that
/// downstream code always receives a finite number.
pub fn eye_aspect_ratio(eye: &[Point2]) -> f64 {
    if eye.len() != 6 {
        return EAR_OPEN_DEFAULT;
    }

    let a = eye[1].distance(&eye[5]);
    let b = eye[2].distance(&eye[4]);
    let c = eye[0].distance(&eye[3]);

    if c == 0.0 {
        return EAR_OPEN_DEFAULT;
    }

    (a + b) / (2.0 * c)
}

/// Pick the six landmarks of one eye out of a full face-mesh point array.
///
/// Returns an empty vec when the mesh is too short, which
/// [`eye_aspect_ratio`] then treats as malformed input.
pub fn eye_points(mesh: &[Point2], indices: &[usize; 6]) -> Vec<Point2> {
    if indices.iter().any(|&i| i >= mesh.len()) {
        return Vec::new();
    }
    indices.iter().map(|&i| mesh[i]).collect()
}
