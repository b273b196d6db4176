//! Synthetic landmark sets for canned poses.
//!
//! Used by the keyboard simulator in place of a detection model, and by
//! tests that need realistic-looking geometry. Coordinates are in pixels
//! with y growing downward.

use crate::landmarks::{face, FaceLandmarks, HandLandmarks, Point};

// ════════════════════════════════════════════════════════════════════════════
// Hands
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandPose {
    /// Open hand, fingers up.
    Relaxed,
    /// Thumb and index tips touching, other fingers up.
    Ok,
    /// Fist with the thumb pointing up.
    ThumbsUp,
}

// Offsets from the wrist in palm-span units (wrist → middle knuckle ≈ 1).
const RELAXED: [(f32, f32); 21] = [
    ( 0.00,  0.00),
    (-0.30, -0.20), (-0.50, -0.40), (-0.65, -0.55), (-0.80, -0.70),
    (-0.25, -0.95), (-0.27, -1.30), (-0.28, -1.50), (-0.29, -1.70),
    ( 0.00, -1.00), ( 0.00, -1.40), ( 0.00, -1.62), ( 0.00, -1.85),
    ( 0.22, -0.95), ( 0.24, -1.30), ( 0.25, -1.50), ( 0.26, -1.70),
    ( 0.42, -0.85), ( 0.46, -1.10), ( 0.48, -1.22), ( 0.50, -1.35),
];

const OK_SIGN: [(f32, f32); 21] = [
    ( 0.00,  0.00),
    (-0.30, -0.20), (-0.45, -0.40), (-0.50, -0.60), (-0.45, -0.78),
    (-0.25, -0.95), (-0.35, -1.20), (-0.45, -1.00), (-0.43, -0.82),
    ( 0.00, -1.00), ( 0.00, -1.40), ( 0.00, -1.62), ( 0.00, -1.85),
    ( 0.22, -0.95), ( 0.24, -1.30), ( 0.25, -1.50), ( 0.26, -1.70),
    ( 0.42, -0.85), ( 0.46, -1.10), ( 0.48, -1.22), ( 0.50, -1.35),
];

const THUMBS_UP: [(f32, f32); 21] = [
    ( 0.00,  0.00),
    (-0.35, -0.30), (-0.45, -0.55), (-0.50, -0.85), (-0.52, -1.15),
    (-0.25, -0.75), (-0.25, -0.90), (-0.20, -0.70), (-0.20, -0.60),
    ( 0.00, -0.80), ( 0.00, -0.95), ( 0.02, -0.75), ( 0.02, -0.62),
    ( 0.20, -0.75), ( 0.20, -0.88), ( 0.20, -0.70), ( 0.20, -0.60),
    ( 0.38, -0.68), ( 0.38, -0.78), ( 0.37, -0.62), ( 0.36, -0.55),
];

/// A hand in `pose` with its wrist at `wrist` and a palm span of `scale` px.
pub fn hand(pose: HandPose, wrist: Point, scale: f32) -> HandLandmarks {
    let table = match pose {
        HandPose::Relaxed  => &RELAXED,
        HandPose::Ok       => &OK_SIGN,
        HandPose::ThumbsUp => &THUMBS_UP,
    };
    let points = table.iter()
        .map(|&(dx, dy)| Point::new(wrist.x + dx * scale, wrist.y + dy * scale))
        .collect();
    HandLandmarks::from_table(points)
}

// ════════════════════════════════════════════════════════════════════════════
// Faces
// ════════════════════════════════════════════════════════════════════════════

/// Expression knobs for a synthetic face.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FacePose {
    pub smile:      bool,
    /// Lift the left brow only (the classifier looks for asymmetry).
    pub brow_raise: bool,
    /// Target iris offset inside each eye box, [-1, 1] per axis.
    pub gaze:       (f32, f32),
}

/// A refined (478-point) face mesh centred on `center`, `scale` px wide.
pub fn face(pose: &FacePose, center: Point, scale: f32) -> FaceLandmarks {
    let s = scale;
    let mut pts: Vec<Point> = (0..face::REFINED_COUNT)
        .map(|i| {
            // Unused mesh points trace the face oval.
            let a = i as f32 / face::MIN_COUNT as f32 * std::f32::consts::TAU;
            Point::new(center.x + 0.45 * s * a.cos(), center.y + 0.6 * s * a.sin())
        })
        .collect();

    // ── eyes ──────────────────────────────────────────────────────────────
    let eye_y = center.y - 0.1 * s;
    let tilt  = 0.02 * s;
    pts[face::LEFT_EYE_OUTER]  = Point::new(center.x - 0.3 * s, eye_y + tilt);
    pts[face::LEFT_EYE_INNER]  = Point::new(center.x - 0.1 * s, eye_y - tilt);
    pts[face::RIGHT_EYE_OUTER] = Point::new(center.x + 0.3 * s, eye_y + tilt);
    pts[face::RIGHT_EYE_INNER] = Point::new(center.x + 0.1 * s, eye_y - tilt);

    // ── irises ────────────────────────────────────────────────────────────
    let (gx, gy) = pose.gaze;
    for (eye_x, iris) in [(center.x - 0.2 * s, face::LEFT_IRIS), (center.x + 0.2 * s, face::RIGHT_IRIS)] {
        let c = Point::new(eye_x + gx * 0.1 * s, eye_y + gy * tilt);
        let r = 0.015 * s;
        let ring = [(0.0, 0.0), (r, 0.0), (-r, 0.0), (0.0, r), (0.0, -r)];
        for (&i, (dx, dy)) in iris.iter().zip(ring) {
            pts[i] = Point::new(c.x + dx, c.y + dy);
        }
    }

    // ── brows ─────────────────────────────────────────────────────────────
    let level  = 0.12 * s;
    let raised = if pose.brow_raise { 0.2 * s } else { level };
    pts[face::LEFT_BROW]  = Point::new(center.x - 0.2 * s, eye_y - raised);
    pts[face::RIGHT_BROW] = Point::new(center.x + 0.2 * s, eye_y - level);

    // ── mouth ─────────────────────────────────────────────────────────────
    let mouth_y = center.y + 0.3 * s;
    let (w, h) = if pose.smile { (0.45 * s, 0.15 * s) } else { (0.3 * s, 0.2 * s) };
    pts[face::MOUTH_LEFT]  = Point::new(center.x - w / 2.0, mouth_y);
    pts[face::MOUTH_RIGHT] = Point::new(center.x + w / 2.0, mouth_y);
    pts[face::UPPER_LIP]   = Point::new(center.x, mouth_y - h / 2.0);
    pts[face::LOWER_LIP]   = Point::new(center.x, mouth_y + h / 2.0);

    FaceLandmarks::from_mesh(pts)
}
