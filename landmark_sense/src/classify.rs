//! Single-frame geometric heuristics.
//!
//! Every function here is pure: one landmark set in, one signal out.
//! Degenerate spans are floored before division and missing landmarks
//! degrade to a neutral answer, so nothing in this module can fail.

use crate::landmarks::{face, hand, FaceLandmarks, HandLandmarks, Point};

// ════════════════════════════════════════════════════════════════════════════
// Thresholds
// ════════════════════════════════════════════════════════════════════════════

/// OK holds when thumb↔index distance is below this fraction of the palm span.
pub const OK_RATIO:          f32 = 0.5;
/// Thumb tip must sit this many pixels above the thumb base.
pub const THUMB_MARGIN_PX:   f32 = 6.0;
/// Mouth width/height ratio above which the face counts as smiling.
pub const SMILE_RATIO:       f32 = 1.8;
/// One brow gap must exceed the other by this factor.
pub const BROW_ASYMMETRY:    f32 = 1.2;
/// ...and the larger gap must exceed this absolute floor.
pub const BROW_MIN_GAP_PX:   f32 = 8.0;

/// Keeps the eye-box half extents away from zero.
const EYE_BOX_EPSILON: f32 = 1e-5;

// ════════════════════════════════════════════════════════════════════════════
// Semantic state
// ════════════════════════════════════════════════════════════════════════════

/// Gesture state of the primary hand for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HandState {
    pub ok_gesture: bool,
    pub thumbs_up:  bool,
    pub center:     (i32, i32),
}

/// Expression state of the face for one frame.
///
/// `gaze_offset` is the smoothed value; everything else is single-frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FaceState {
    pub smiling:       bool,
    pub eyebrow_raise: bool,
    pub mouth_center:  (i32, i32),
    pub gaze_offset:   (f32, f32),
}

// ════════════════════════════════════════════════════════════════════════════
// Hand heuristics
// ════════════════════════════════════════════════════════════════════════════

/// Thumb-tip to index-tip distance normalised by the palm span
/// (wrist → middle knuckle, floored at 1).
pub fn ok_distance(h: &HandLandmarks) -> f32 {
    let palm = h.point(hand::WRIST).dist(&h.point(hand::MIDDLE_MCP)).max(1.0);
    h.point(hand::THUMB_TIP).dist(&h.point(hand::INDEX_TIP)) / palm
}

pub fn is_ok_gesture(h: &HandLandmarks) -> bool {
    ok_distance(h) < OK_RATIO
}

/// A finger is folded when its tip hangs below (larger y than) its PIP joint.
pub fn finger_folded(h: &HandLandmarks, tip: usize, pip: usize) -> bool {
    h.point(tip).y > h.point(pip).y
}

pub fn is_thumbs_up(h: &HandLandmarks) -> bool {
    let thumb_up = h.point(hand::THUMB_TIP).y < h.point(hand::THUMB_MCP).y - THUMB_MARGIN_PX;
    thumb_up && hand::FINGERS.iter().all(|&(tip, pip)| finger_folded(h, tip, pip))
}

pub fn classify_hand(h: &HandLandmarks) -> HandState {
    HandState {
        ok_gesture: is_ok_gesture(h),
        thumbs_up:  is_thumbs_up(h),
        center:     h.center(),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Face heuristics
// ════════════════════════════════════════════════════════════════════════════

/// Smile measurement with the mouth anchor used for overlays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Smile {
    pub smiling: bool,
    pub ratio:   f32,
    pub anchor:  (i32, i32),
}

pub fn detect_smile(f: &FaceLandmarks) -> Smile {
    let (Some(left), Some(right), Some(upper), Some(lower)) = (
        f.get(face::MOUTH_LEFT),
        f.get(face::MOUTH_RIGHT),
        f.get(face::UPPER_LIP),
        f.get(face::LOWER_LIP),
    ) else {
        return Smile { smiling: false, ratio: 0.0, anchor: (0, 0) };
    };

    let width  = left.dist(&right);
    let height = upper.dist(&lower).max(1.0);
    let ratio  = width / height;
    let anchor = (
        ((left.x + right.x) * 0.5) as i32,
        ((upper.y + lower.y) * 0.5) as i32,
    );
    Smile { smiling: ratio > SMILE_RATIO, ratio, anchor }
}

/// Vertical gap between an eye's center line and its brow, floored at 1.
fn brow_gap(f: &FaceLandmarks, outer: usize, inner: usize, brow: usize) -> Option<f32> {
    let eye_y = (f.get(outer)?.y + f.get(inner)?.y) * 0.5;
    Some((eye_y - f.get(brow)?.y).max(1.0))
}

/// One brow lifted noticeably higher than the other.
pub fn is_eyebrow_raised(f: &FaceLandmarks) -> bool {
    let left  = brow_gap(f, face::LEFT_EYE_OUTER,  face::LEFT_EYE_INNER,  face::LEFT_BROW);
    let right = brow_gap(f, face::RIGHT_EYE_OUTER, face::RIGHT_EYE_INNER, face::RIGHT_BROW);
    let (Some(left), Some(right)) = (left, right) else { return false };

    (left / right > BROW_ASYMMETRY && left > BROW_MIN_GAP_PX)
        || (right / left > BROW_ASYMMETRY && right > BROW_MIN_GAP_PX)
}

fn iris_centroid(f: &FaceLandmarks, iris: &[usize; 5]) -> Option<Point> {
    let mut sx = 0.0;
    let mut sy = 0.0;
    for &i in iris {
        let p = f.get(i)?;
        sx += p.x;
        sy += p.y;
    }
    Some(Point::new(sx / 5.0, sy / 5.0))
}

/// Iris offset inside one eye's corner box, each axis in units of half the box.
fn eye_offset(f: &FaceLandmarks, a: usize, b: usize, iris: &[usize; 5]) -> Option<(f32, f32)> {
    let p0 = f.get(a)?;
    let p1 = f.get(b)?;
    let center = p0.midpoint(&p1);
    let half_w = ((p1.x - p0.x).abs() + EYE_BOX_EPSILON) * 0.5;
    let half_h = ((p1.y - p0.y).abs() + EYE_BOX_EPSILON) * 0.5;
    let c = iris_centroid(f, iris)?;
    Some(((c.x - center.x) / half_w, (c.y - center.y) / half_h))
}

fn gaze_inner(f: &FaceLandmarks) -> Option<(f32, f32)> {
    let (lx, ly) = eye_offset(f, face::LEFT_EYE_OUTER,  face::LEFT_EYE_INNER,  &face::LEFT_IRIS)?;
    let (rx, ry) = eye_offset(f, face::RIGHT_EYE_OUTER, face::RIGHT_EYE_INNER, &face::RIGHT_IRIS)?;
    let gx = ((lx + rx) * 0.5).clamp(-1.0, 1.0);
    let gy = ((ly + ry) * 0.5).clamp(-1.0, 1.0);
    (gx.is_finite() && gy.is_finite()).then_some((gx, gy))
}

/// Raw (unsmoothed) gaze in [-1, 1]². `(0, 0)` whenever the iris points are
/// missing or the geometry is unusable.
pub fn raw_gaze(f: &FaceLandmarks) -> (f32, f32) {
    gaze_inner(f).unwrap_or((0.0, 0.0))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
