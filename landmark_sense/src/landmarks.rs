//! Landmark sets as delivered by the external detection model.
//!
//! Indices are a fixed contract with the landmark source (21-point hand
//! skeleton, 468/478-point face mesh with optional iris refinement).

use crate::error::LandmarkError;

// ════════════════════════════════════════════════════════════════════════════
// Point
// ════════════════════════════════════════════════════════════════════════════

/// A single landmark. `z` is carried through but unused by the 2D heuristics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y, z: 0.0 }
    }

    pub const fn with_z(x: f32, y: f32, z: f32) -> Self {
        Point { x, y, z }
    }

    /// Planar Euclidean distance.
    pub fn dist(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::with_z(
            (self.x + other.x) * 0.5,
            (self.y + other.y) * 0.5,
            (self.z + other.z) * 0.5,
        )
    }

    pub fn scaled(&self, k: f32) -> Point {
        Point::with_z(self.x * k, self.y * k, self.z * k)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Index contracts
// ════════════════════════════════════════════════════════════════════════════

/// Hand skeleton indices.
pub mod hand {
    pub const WRIST:      usize = 0;
    pub const THUMB_MCP:  usize = 2;
    pub const THUMB_TIP:  usize = 4;
    pub const INDEX_PIP:  usize = 6;
    pub const INDEX_TIP:  usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_PIP:   usize = 14;
    pub const RING_TIP:   usize = 16;
    pub const PINKY_PIP:  usize = 18;
    pub const PINKY_TIP:  usize = 20;

    /// (tip, pip) for the four non-thumb fingers.
    pub const FINGERS: [(usize, usize); 4] = [
        (INDEX_TIP,  INDEX_PIP),
        (MIDDLE_TIP, MIDDLE_PIP),
        (RING_TIP,   RING_PIP),
        (PINKY_TIP,  PINKY_PIP),
    ];

    pub const COUNT: usize = 21;
}

/// Face mesh indices.
pub mod face {
    pub const UPPER_LIP:       usize = 13;
    pub const LOWER_LIP:       usize = 14;
    pub const MOUTH_LEFT:      usize = 61;
    pub const MOUTH_RIGHT:     usize = 291;
    pub const LEFT_EYE_OUTER:  usize = 33;
    pub const LEFT_EYE_INNER:  usize = 133;
    pub const RIGHT_EYE_OUTER: usize = 263;
    pub const RIGHT_EYE_INNER: usize = 362;
    pub const LEFT_BROW:       usize = 105;
    pub const RIGHT_BROW:      usize = 334;

    pub const LEFT_IRIS:  [usize; 5] = [468, 469, 470, 471, 472];
    pub const RIGHT_IRIS: [usize; 5] = [473, 474, 475, 476, 477];

    /// Minimum mesh size (no iris refinement).
    pub const MIN_COUNT:     usize = 468;
    /// Mesh size with iris refinement.
    pub const REFINED_COUNT: usize = 478;
}

// ════════════════════════════════════════════════════════════════════════════
// HandLandmarks
// ════════════════════════════════════════════════════════════════════════════

/// One detected hand, in pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: Vec<Point>,
}

impl HandLandmarks {
    pub fn new(points: Vec<Point>) -> Result<Self, LandmarkError> {
        if points.len() < hand::COUNT {
            return Err(LandmarkError::TooFewPoints {
                kind:     "hand",
                expected: hand::COUNT,
                actual:   points.len(),
            });
        }
        Ok(HandLandmarks { points })
    }

    pub(crate) fn from_table(points: Vec<Point>) -> Self {
        debug_assert!(points.len() >= hand::COUNT);
        HandLandmarks { points }
    }

    pub fn points(&self) -> &[Point] { &self.points }

    /// Landmark at a contract index. Always present for `i < 21`.
    pub fn point(&self, i: usize) -> Point { self.points[i] }

    /// Integer mean of all points.
    pub fn center(&self) -> (i32, i32) {
        let n = self.points.len() as f32;
        let (sx, sy) = self.points.iter()
            .fold((0.0f32, 0.0f32), |(sx, sy), p| (sx + p.x, sy + p.y));
        ((sx / n) as i32, (sy / n) as i32)
    }

    /// Every coordinate multiplied by `k`.
    pub fn scaled(&self, k: f32) -> Self {
        HandLandmarks { points: self.points.iter().map(|p| p.scaled(k)).collect() }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FaceLandmarks
// ════════════════════════════════════════════════════════════════════════════

/// One detected face mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceLandmarks {
    points: Vec<Point>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<Point>) -> Result<Self, LandmarkError> {
        if points.len() < face::MIN_COUNT {
            return Err(LandmarkError::TooFewPoints {
                kind:     "face",
                expected: face::MIN_COUNT,
                actual:   points.len(),
            });
        }
        Ok(FaceLandmarks { points })
    }

    pub(crate) fn from_mesh(points: Vec<Point>) -> Self {
        debug_assert!(points.len() >= face::MIN_COUNT);
        FaceLandmarks { points }
    }

    pub fn points(&self) -> &[Point] { &self.points }

    /// Landmark at `i`, if the mesh has it (iris points are optional).
    pub fn get(&self, i: usize) -> Option<Point> {
        self.points.get(i).copied()
    }

    /// Whether the iris refinement points are present.
    pub fn has_iris(&self) -> bool {
        self.points.len() >= face::REFINED_COUNT
    }

    /// Scale normalized (0..1) coordinates into a `width × height` image.
    pub fn to_pixels(&self, width: f32, height: f32) -> Self {
        FaceLandmarks {
            points: self.points.iter()
                .map(|p| Point::with_z(p.x * width, p.y * height, p.z))
                .collect(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Frame
// ════════════════════════════════════════════════════════════════════════════

/// Everything the landmark source produced for one video frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub hands: Vec<HandLandmarks>,
    pub face:  Option<FaceLandmarks>,
}

impl Frame {
    pub fn new(hands: Vec<HandLandmarks>, face: Option<FaceLandmarks>) -> Self {
        Frame { hands, face }
    }

    pub fn empty() -> Self { Frame::default() }

    /// Only the first detected hand drives reactions.
    pub fn primary_hand(&self) -> Option<&HandLandmarks> {
        self.hands.first()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_rejects_short_sets() {
        let err = HandLandmarks::new(vec![Point::default(); 20]).unwrap_err();
        assert_eq!(err, LandmarkError::TooFewPoints { kind: "hand", expected: 21, actual: 20 });
    }

    #[test]
    fn face_accepts_unrefined_mesh() {
        let f = FaceLandmarks::new(vec![Point::default(); 468]).unwrap();
        assert!(!f.has_iris());
        assert_eq!(f.get(468), None);
    }

    #[test]
    fn hand_center_is_truncated_mean() {
        let mut pts = vec![Point::new(10.0, 20.0); 21];
        pts[0] = Point::new(31.0, 41.0);
        let h = HandLandmarks::new(pts).unwrap();
        // x mean = (10*20 + 31) / 21 = 11.0, y mean = (20*20 + 41) / 21 = 21.0
        assert_eq!(h.center(), (11, 21));
    }

    #[test]
    fn to_pixels_scales_each_axis() {
        let mut pts = vec![Point::new(0.5, 0.5); 468];
        pts[1] = Point::new(0.25, 1.0);
        let f = FaceLandmarks::new(pts).unwrap().to_pixels(640.0, 480.0);
        assert_eq!(f.get(1), Some(Point::new(160.0, 480.0)));
    }

    #[test]
    fn primary_hand_is_first() {
        let a = HandLandmarks::new(vec![Point::new(1.0, 1.0); 21]).unwrap();
        let b = HandLandmarks::new(vec![Point::new(2.0, 2.0); 21]).unwrap();
        let frame = Frame::new(vec![a.clone(), b], None);
        assert_eq!(frame.primary_hand(), Some(&a));
        assert!(Frame::empty().primary_hand().is_none());
    }
}
