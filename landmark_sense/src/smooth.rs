//! Temporal smoothing.
//!
//! Gaze is the only continuously smoothed signal: an exponential moving
//! average per axis, `s' = s·(1−α) + x·α`. It starts at the origin and is
//! never reset; a few frames of real input wash out any stale value.

use num_traits::Float;

/// Smoothing factor for gaze.
pub const GAZE_ALPHA: f32 = 0.35;

// ════════════════════════════════════════════════════════════════════════════
// Ema
// ════════════════════════════════════════════════════════════════════════════

/// Scalar exponential moving average.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ema<T> {
    alpha: T,
    value: T,
}

impl<T: Float> Ema<T> {
    /// `alpha` is clamped to [0, 1]; the filter starts at zero.
    pub fn new(alpha: T) -> Self {
        Self::with_initial(alpha, T::zero())
    }

    pub fn with_initial(alpha: T, initial: T) -> Self {
        Ema { alpha: alpha.max(T::zero()).min(T::one()), value: initial }
    }

    /// Fold one raw sample in and return the new smoothed value.
    pub fn update(&mut self, raw: T) -> T {
        self.value = self.value * (T::one() - self.alpha) + raw * self.alpha;
        self.value
    }

    pub fn value(&self) -> T { self.value }
    pub fn alpha(&self) -> T { self.alpha }
}

// ════════════════════════════════════════════════════════════════════════════
// GazeSmoother
// ════════════════════════════════════════════════════════════════════════════

/// Independent EMAs on the two gaze axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GazeSmoother {
    x: Ema<f32>,
    y: Ema<f32>,
}

impl Default for GazeSmoother {
    fn default() -> Self { GazeSmoother::new(GAZE_ALPHA) }
}

impl GazeSmoother {
    pub fn new(alpha: f32) -> Self {
        GazeSmoother { x: Ema::new(alpha), y: Ema::new(alpha) }
    }

    pub fn update(&mut self, raw: (f32, f32)) -> (f32, f32) {
        (self.x.update(raw.0), self.y.update(raw.1))
    }

    pub fn value(&self) -> (f32, f32) {
        (self.x.value(), self.y.value())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_update_moves_alpha_of_the_way() {
        let mut e = Ema::new(0.35f64);
        assert!((e.update(1.0) - 0.35).abs() < 1e-12);
    }

    #[test]
    fn alpha_is_clamped() {
        assert_eq!(Ema::new(1.7f32).alpha(), 1.0);
        assert_eq!(Ema::new(-0.2f32).alpha(), 0.0);
    }

    #[test]
    fn never_reaches_target_in_finite_steps() {
        let mut e = Ema::new(0.35f64);
        for _ in 0..20 { e.update(1.0); }
        assert!(e.value() < 1.0);
    }

    #[test]
    fn gaze_axes_are_independent() {
        let mut g = GazeSmoother::default();
        let (x, y) = g.update((1.0, -1.0));
        assert!((x - 0.35).abs() < 1e-6);
        assert!((y + 0.35).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn error_shrinks_geometrically(g in -1.0f64..1.0, n in 1usize..60) {
            let alpha = GAZE_ALPHA as f64;
            let mut e = Ema::new(alpha);
            for _ in 0..n { e.update(g); }
            let expected = g.abs() * (1.0 - alpha).powi(n as i32);
            prop_assert!(((e.value() - g).abs() - expected).abs() < 1e-9);
        }
    }
}
