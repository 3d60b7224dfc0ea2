//! Synthetic landmark traces
//!
//! Builds face-mesh frames with a chosen Eye Aspect Ratio, used by the
//! demo binary (no camera required) and by controller tests.

use eye_metrics::{Point2, LEFT_EYE_LANDMARKS, RIGHT_EYE_LANDMARKS};

/// Number of points in a face-mesh frame.
const MESH_POINTS: usize = 478;

/// Build a full face-mesh point array whose two eyes both measure `ear`.
///
/// The eye corners sit 0.1 apart horizontally and the lid points are
/// placed so the two vertical distances average to `ear * 0.1`.
pub fn synthetic_mesh(ear: f64) -> Vec<Point2> {
    let mut mesh = vec![Point2::default(); MESH_POINTS];
    let lid_gap = ear * 0.1;

    for indices in [&LEFT_EYE_LANDMARKS, &RIGHT_EYE_LANDMARKS] {
        mesh[indices[0]] = Point2::new(0.0, 0.5);
        mesh[indices[3]] = Point2::new(0.1, 0.5);
        mesh[indices[1]] = Point2::new(0.03, 0.5 + lid_gap / 2.0);
        mesh[indices[5]] = Point2::new(0.03, 0.5 - lid_gap / 2.0);
        mesh[indices[2]] = Point2::new(0.07, 0.5 + lid_gap / 2.0);
        mesh[indices[4]] = Point2::new(0.07, 0.5 - lid_gap / 2.0);
    }
    mesh
}

/// One step of a scripted drive: frame offset in ms and the EAR to show,
/// `None` meaning no face on that frame.
pub type TraceStep = (u64, Option<f64>);

/// A short scripted drive: attentive cruising, a blink, a drowsy spell
/// deep enough to trip the critical alert, a glance away from the camera,
/// then recovery.
pub fn demo_trace() -> Vec<TraceStep> {
    let mut steps = Vec::new();
    let frame_ms = 100;
    let mut t = 0;

    let mut phase = |steps: &mut Vec<TraceStep>, count: usize, ear: Option<f64>| {
        for _ in 0..count {
            steps.push((t, ear));
            t += frame_ms;
        }
    };

    phase(&mut steps, 25, Some(0.38)); // attentive
    phase(&mut steps, 2, Some(0.08)); // blink
    phase(&mut steps, 25, Some(0.38)); // attentive
    phase(&mut steps, 45, Some(0.23)); // drowsy spell
    phase(&mut steps, 12, None); // face lost
    phase(&mut steps, 30, Some(0.37)); // recovery

    steps
}
