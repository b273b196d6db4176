//! Blink timer.
//!
//! Two-state machine driven by wall-clock time: wait a random 2–5 s, close
//! the eyes for 120 ms, repeat. Time is always passed in so tests can step
//! it deterministically.

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::debug;

pub const BLINK_DURATION: Duration = Duration::from_millis(120);
pub const MIN_INTERVAL:   Duration = Duration::from_secs(2);
pub const MAX_INTERVAL:   Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlinkPhase {
    Waiting,
    Blinking,
}

#[derive(Clone, Copy, Debug)]
pub struct BlinkTimer {
    phase:              BlinkPhase,
    next_transition_at: Instant,
}

/// Uniform draw from the blink interval range.
pub fn draw_interval<R: Rng + ?Sized>(rng: &mut R) -> Duration {
    let secs = rng.gen_range(MIN_INTERVAL.as_secs_f32()..=MAX_INTERVAL.as_secs_f32());
    Duration::from_secs_f32(secs)
}

impl BlinkTimer {
    pub fn new<R: Rng + ?Sized>(now: Instant, rng: &mut R) -> Self {
        BlinkTimer { phase: BlinkPhase::Waiting, next_transition_at: now + draw_interval(rng) }
    }

    /// Advance to `now`. At most one transition happens per call, so a long
    /// stall produces one short blink rather than a burst.
    /// Returns whether the phase changed.
    pub fn update<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) -> bool {
        if now < self.next_transition_at {
            return false;
        }
        match self.phase {
            BlinkPhase::Waiting => {
                self.phase = BlinkPhase::Blinking;
                self.next_transition_at = now + BLINK_DURATION;
                debug!("blink start");
            }
            BlinkPhase::Blinking => {
                self.phase = BlinkPhase::Waiting;
                let wait = draw_interval(rng);
                self.next_transition_at = now + wait;
                debug!(next_in_ms = wait.as_millis() as u64, "blink end");
            }
        }
        true
    }

    pub fn phase(&self) -> BlinkPhase { self.phase }
    pub fn is_blinking(&self) -> bool { self.phase == BlinkPhase::Blinking }
    pub fn next_transition_at(&self) -> Instant { self.next_transition_at }
}
