//! Error types for landmark_sense

use thiserror::Error;

/// Errors raised while building landmark sets.
///
/// Classification never fails; only construction validates its input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LandmarkError {
    #[error("{kind} landmark set needs at least {expected} points, got {actual}")]
    TooFewPoints {
        kind:     &'static str,
        expected: usize,
        actual:   usize,
    },
}
