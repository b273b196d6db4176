//! Rate-limited feedback for detected gestures and expressions.
//!
//! | Channel | Source | Cooldown | EN | RO |
//! |---|---|---|---|---|
//! | OK | hand | 2.5 s | "OK!" | "OK!" |
//! | Thumbs-up | hand | 2.5 s | "Nice!" | "Bravo!" |
//! | Smile | face | 3.0 s | "Nice smile!" | "Frumos zâmbet!" |
//! | Eyebrow raise | face | 3.0 s | "Hmm?" | "Interesant!" |
//!
//! Channels are level-triggered: a pose held longer than the cooldown fires
//! again once per cooldown period.

use std::time::{Duration, Instant};

use tracing::info;

use landmark_sense::{FaceState, HandState};

use crate::lang::Lang;

pub const HAND_COOLDOWN: Duration = Duration::from_millis(2500);
pub const FACE_COOLDOWN: Duration = Duration::from_millis(3000);

// ════════════════════════════════════════════════════════════════════════════
// Channel
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Ok,
    ThumbsUp,
    Smile,
    EyebrowRaise,
}

impl Channel {
    /// Evaluation (and emission) order within a frame.
    pub const ALL: [Channel; 4] = [Channel::Ok, Channel::ThumbsUp, Channel::Smile, Channel::EyebrowRaise];

    fn index(self) -> usize {
        match self {
            Channel::Ok           => 0,
            Channel::ThumbsUp     => 1,
            Channel::Smile        => 2,
            Channel::EyebrowRaise => 3,
        }
    }

    pub fn is_hand(self) -> bool {
        matches!(self, Channel::Ok | Channel::ThumbsUp)
    }

    pub fn phrase(self, lang: Lang) -> &'static str {
        match (self, lang) {
            (Channel::Ok, _)                      => "OK!",
            (Channel::ThumbsUp, Lang::En)         => "Nice!",
            (Channel::ThumbsUp, Lang::Ro)         => "Bravo!",
            (Channel::Smile, Lang::En)            => "Nice smile!",
            (Channel::Smile, Lang::Ro)            => "Frumos zâmbet!",
            (Channel::EyebrowRaise, Lang::En)     => "Hmm?",
            (Channel::EyebrowRaise, Lang::Ro)     => "Interesant!",
        }
    }

    pub fn history_line(self) -> &'static str {
        match self {
            Channel::Ok           => "Gesture: OK",
            Channel::ThumbsUp     => "Gesture: Thumbs-Up",
            Channel::Smile        => "Gesture: Smile",
            Channel::EyebrowRaise => "Gesture: Eyebrow raise",
        }
    }

    /// Whether this channel's condition holds on the given frame.
    pub fn active(self, hand: Option<&HandState>, face: Option<&FaceState>) -> bool {
        match self {
            Channel::Ok           => hand.is_some_and(|h| h.ok_gesture),
            Channel::ThumbsUp     => hand.is_some_and(|h| h.thumbs_up),
            Channel::Smile        => face.is_some_and(|f| f.smiling),
            Channel::EyebrowRaise => face.is_some_and(|f| f.eyebrow_raise),
        }
    }
}

/// One feedback event to speak and record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reaction {
    pub channel: Channel,
    pub phrase:  &'static str,
    pub history: &'static str,
}

// ════════════════════════════════════════════════════════════════════════════
// ReactionScheduler
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct ReactionScheduler {
    hand_cooldown: Duration,
    face_cooldown: Duration,
    last_fired:    [Option<Instant>; 4],
}

impl Default for ReactionScheduler {
    fn default() -> Self { ReactionScheduler::new(HAND_COOLDOWN, FACE_COOLDOWN) }
}

impl ReactionScheduler {
    pub fn new(hand_cooldown: Duration, face_cooldown: Duration) -> Self {
        ReactionScheduler { hand_cooldown, face_cooldown, last_fired: [None; 4] }
    }

    pub fn cooldown(&self, channel: Channel) -> Duration {
        if channel.is_hand() { self.hand_cooldown } else { self.face_cooldown }
    }

    pub fn last_fired(&self, channel: Channel) -> Option<Instant> {
        self.last_fired[channel.index()]
    }

    /// Reactions due on this frame, in channel order.
    ///
    /// A channel fires when its condition holds and strictly more than its
    /// cooldown has passed since it last fired (or it never has). Firing
    /// stamps the channel with `now`, whatever the caller then does with it.
    pub fn evaluate(
        &mut self,
        now:  Instant,
        hand: Option<&HandState>,
        face: Option<&FaceState>,
        lang: Lang,
    ) -> Vec<Reaction> {
        let mut out = Vec::new();
        for channel in Channel::ALL {
            if !channel.active(hand, face) {
                continue;
            }
            let cooldown = self.cooldown(channel);
            let slot = &mut self.last_fired[channel.index()];
            let due = match *slot {
                None       => true,
                Some(last) => now.saturating_duration_since(last) > cooldown,
            };
            if due {
                *slot = Some(now);
                let reaction = Reaction {
                    channel,
                    phrase:  channel.phrase(lang),
                    history: channel.history_line(),
                };
                info!(?channel, phrase = reaction.phrase, "reaction");
                out.push(reaction);
            }
        }
        out
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_hand() -> HandState { HandState { ok_gesture: true, ..Default::default() } }
    fn both_hand() -> HandState { HandState { ok_gesture: true, thumbs_up: true, center: (0, 0) } }
    fn expressive() -> FaceState {
        FaceState { smiling: true, eyebrow_raise: true, ..Default::default() }
    }

    #[test]
    fn first_detection_fires_immediately() {
        let mut s = ReactionScheduler::default();
        let out = s.evaluate(Instant::now(), Some(&ok_hand()), None, Lang::En);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].phrase, "OK!");
        assert_eq!(out[0].history, "Gesture: OK");
    }

    #[test]
    fn emission_order_is_fixed() {
        let mut s = ReactionScheduler::default();
        let out = s.evaluate(Instant::now(), Some(&both_hand()), Some(&expressive()), Lang::Ro);
        let channels: Vec<_> = out.iter().map(|r| r.channel).collect();
        assert_eq!(channels, Channel::ALL.to_vec());
        assert_eq!(out[1].phrase, "Bravo!");
        assert_eq!(out[2].phrase, "Frumos zâmbet!");
        assert_eq!(out[3].phrase, "Interesant!");
    }

    #[test]
    fn cooldown_boundary_is_strict() {
        let t0 = Instant::now();
        let mut s = ReactionScheduler::default();
        s.evaluate(t0, Some(&ok_hand()), None, Lang::En);
        assert!(s.evaluate(t0 + HAND_COOLDOWN, Some(&ok_hand()), None, Lang::En).is_empty());
        let later = t0 + HAND_COOLDOWN + Duration::from_millis(1);
        assert_eq!(s.evaluate(later, Some(&ok_hand()), None, Lang::En).len(), 1);
    }

    #[test]
    fn held_gesture_refires_once_per_cooldown() {
        // 10 s of frames every 100 ms → fires at 0, 2.6, 5.2, 7.8 s.
        let t0 = Instant::now();
        let mut s = ReactionScheduler::default();
        let fired: usize = (0..100)
            .map(|i| s.evaluate(t0 + Duration::from_millis(i * 100), Some(&ok_hand()), None, Lang::En).len())
            .sum();
        assert_eq!(fired, 4);
    }

    #[test]
    fn channels_are_independent() {
        let t0 = Instant::now();
        let mut s = ReactionScheduler::default();
        s.evaluate(t0, Some(&ok_hand()), None, Lang::En);
        let out = s.evaluate(t0 + Duration::from_millis(100), Some(&both_hand()), None, Lang::En);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].channel, Channel::ThumbsUp);
    }

    #[test]
    fn face_channels_use_the_longer_cooldown() {
        let t0 = Instant::now();
        let mut s = ReactionScheduler::default();
        let smile = FaceState { smiling: true, ..Default::default() };
        s.evaluate(t0, None, Some(&smile), Lang::En);
        let at = t0 + Duration::from_millis(2800);
        assert!(s.evaluate(at, None, Some(&smile), Lang::En).is_empty());
        assert_eq!(s.last_fired(Channel::Smile), Some(t0));
    }

    #[test]
    fn absent_inputs_fire_nothing() {
        let mut s = ReactionScheduler::default();
        assert!(s.evaluate(Instant::now(), None, None, Lang::En).is_empty());
        assert_eq!(s.last_fired(Channel::Ok), None);
    }
}
