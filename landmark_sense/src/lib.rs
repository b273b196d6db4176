//! # landmark_sense
//!
//! Turns per-frame hand and face landmark sets into semantic state.
//!
//! ## Signals
//!
//! | Signal | Source | Rule |
//! |---|---|---|
//! | OK gesture | hand | thumb-tip ↔ index-tip distance / palm span < 0.5 |
//! | Thumbs-up | hand | thumb tip > 6 px above its base, other four fingers folded |
//! | Smile | face | mouth width / mouth height > 1.8 |
//! | Eyebrow raise | face | one brow gap > 1.2 × the other and > 8 px |
//! | Gaze | face | iris centroid offset inside the eye box, averaged, EMA-smoothed |
//!
//! Classification itself is stateless ([`classify`]); the only cross-frame
//! state is the gaze EMA held by [`Perception`].
//!
//! ```rust
//! use landmark_sense::{synth, Frame, Perception, Point};
//!
//! let hand = synth::hand(synth::HandPose::ThumbsUp, Point::new(320.0, 400.0), 100.0);
//! let mut perception = Perception::new();
//! let percept = perception.process(&Frame::new(vec![hand], None));
//! assert!(percept.hand.unwrap().thumbs_up);
//! ```

pub mod classify;
pub mod error;
pub mod landmarks;
pub mod perception;
pub mod smooth;
pub mod synth;

pub use classify::{FaceState, HandState};
pub use error::LandmarkError;
pub use landmarks::{FaceLandmarks, Frame, HandLandmarks, Point};
pub use perception::{Percept, Perception};
pub use smooth::{Ema, GazeSmoother, GAZE_ALPHA};
