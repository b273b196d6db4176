//! Per-frame perception pass: classify, then smooth.

use tracing::trace;

use crate::classify::{self, FaceState, HandState};
use crate::landmarks::Frame;
use crate::smooth::GazeSmoother;

/// Semantic state for one frame. `None` means "not detected this frame".
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Percept {
    pub hand: Option<HandState>,
    pub face: Option<FaceState>,
}

/// Owns the cross-frame smoothing state for one perception session.
#[derive(Debug, Default)]
pub struct Perception {
    gaze: GazeSmoother,
}

impl Perception {
    pub fn new() -> Self { Perception::default() }

    pub fn with_smoother(gaze: GazeSmoother) -> Self { Perception { gaze } }

    /// Classify one frame. The gaze filter only advances on frames with a face.
    pub fn process(&mut self, frame: &Frame) -> Percept {
        let hand = frame.primary_hand().map(classify::classify_hand);

        let face = frame.face.as_ref().map(|f| {
            let smile = classify::detect_smile(f);
            FaceState {
                smiling:       smile.smiling,
                eyebrow_raise: classify::is_eyebrow_raised(f),
                mouth_center:  smile.anchor,
                gaze_offset:   self.gaze.update(classify::raw_gaze(f)),
            }
        });

        trace!(?hand, ?face, "frame classified");
        Percept { hand, face }
    }

    /// Current smoothed gaze, even on frames without a face.
    pub fn gaze(&self) -> (f32, f32) { self.gaze.value() }
}
