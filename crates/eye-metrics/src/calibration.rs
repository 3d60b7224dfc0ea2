//! EAR-to-focus calibration
//!
//! Three-segment piecewise-linear mapping over fixed anchor EAR values.
//! Anchors were fitted against recorded driving sessions: 0.20 maps to 0%,
//! 0.27 to 25%, 0.35 to 50%, 0.40 to 100%.

/// EAR below this is treated as closed eyes (maps to 0% and also drives the
/// immediate eyes-closed signal).
pub const EAR_CLOSED_THRESHOLD: f64 = 0.2;

/// Anchor mapped to 25% focus.
pub const EAR_LEVEL_1: f64 = 0.27;

/// Anchor mapped to 50% focus.
pub const EAR_LEVEL_2: f64 = 0.35;

/// EAR at or above this maps to 100% focus.
pub const EAR_FULLY_OPEN: f64 = 0.4;

/// Map an averaged EAR value onto a 0-100 focus percentage.
///
/// Linear interpolation within each segment, rounded to the nearest
/// integer. Non-finite input maps to 100 (treated as "no usable signal",
/// the same policy as a lost face).
pub fn map_ear_to_focus_percent(ear: f64) -> u8 {
    if !ear.is_finite() {
        return 100;
    }
    if ear >= EAR_FULLY_OPEN {
        return 100;
    }
    if ear <= EAR_CLOSED_THRESHOLD {
        return 0;
    }

    let percent = if ear < EAR_LEVEL_1 {
        // 0% to 25%
        let span = EAR_LEVEL_1 - EAR_CLOSED_THRESHOLD;
        25.0 * (ear - EAR_CLOSED_THRESHOLD) / span
    } else if ear < EAR_LEVEL_2 {
        // 25% to 50%
        let span = EAR_LEVEL_2 - EAR_LEVEL_1;
        25.0 + 25.0 * (ear - EAR_LEVEL_1) / span
    } else {
        // 50% to 100%
        let span = EAR_FULLY_OPEN - EAR_LEVEL_2;
        50.0 + 50.0 * (ear - EAR_LEVEL_2) / span
    };

    percent.round() as u8
}
