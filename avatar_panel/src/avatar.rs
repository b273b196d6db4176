//! The reactive avatar.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │          ▄▄▄▄▄▄▄▄            │
//! │        ▄█ hair   █▄          │
//! │       ( ◉  ‾‾  ◉  )          │   brows lift on eyebrow_raise
//! │       (     |      )         │   eyes follow gaze, blink on a timer
//! │       (   \___/    )    👍   │   mouth: speaking > smile > neutral
//! │         ‾‾‾‾‾‾‾‾‾      OK    │   hand glyphs at a fixed anchor
//! │ ┌──────────────────────────┐ │
//! │ │ speech bubble (2 lines)  │ │
//! │ └──────────────────────────┘ │
//! └──────────────────────────────┘
//! ```
//!
//! The avatar owns only its animation clocks (blink, mouth phase); every
//! per-frame input arrives in an [`AvatarState`] and every colour in a
//! [`Theme`].

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use landmark_sense::{FaceState, HandState};

use crate::blink::BlinkTimer;
use crate::canvas::{Canvas, Painter};
use crate::theme::{Rgb, Theme};

/// Speech bubble wrap width, in characters.
pub const WRAP_WIDTH: usize = 28;
/// Lines of speech actually rendered.
pub const MAX_BUBBLE_LINES: usize = 2;
/// Mouth phase advance per rendered frame while speaking.
pub const SPEAK_PHASE_STEP: f32 = 0.22;

const HAIR:        Rgb = Rgb(80, 46, 32);
const HAIR_STROKE: Rgb = Rgb(50, 30, 20);
const SHADOW:      Rgb = Rgb(210, 190, 180);
const INK:         Rgb = Rgb(30, 30, 30);
const CLOSED_EYE:  Rgb = Rgb(40, 40, 40);
const SCLERA_RIM:  Rgb = Rgb(180, 180, 180);
const IRIS:        Rgb = Rgb(210, 140, 110);
const PUPIL:       Rgb = Rgb(20, 20, 20);
const NOSE:        Rgb = Rgb(120, 120, 120);
const NOSE_TIP:    Rgb = Rgb(100, 100, 100);
const MOUTH_OPEN:  Rgb = Rgb(120, 60, 40);
const MOUTH_SMILE: Rgb = Rgb(40, 120, 40);
const MOUTH_FLAT:  Rgb = Rgb(60, 60, 60);
const OK_GREEN:    Rgb = Rgb(90, 210, 90);
const BUBBLE_TEXT: Rgb = Rgb(20, 20, 20);

// ════════════════════════════════════════════════════════════════════════════
// AvatarState
// ════════════════════════════════════════════════════════════════════════════

/// Everything the avatar reacts to on one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AvatarState {
    pub smile:         bool,
    pub eyebrow_raise: bool,
    pub ok:            bool,
    pub thumbs_up:     bool,
    pub gaze:          (f32, f32),
    pub speech:        Option<String>,
}

impl AvatarState {
    /// Mirror the user's detected state. Absent hand/face means neutral.
    pub fn from_perception(
        hand:   Option<HandState>,
        face:   Option<FaceState>,
        speech: Option<String>,
    ) -> Self {
        let hand = hand.unwrap_or_default();
        let face = face.unwrap_or_default();
        AvatarState {
            smile:         face.smiling,
            eyebrow_raise: face.eyebrow_raise,
            ok:            hand.ok_gesture,
            thumbs_up:     hand.thumbs_up,
            gaze:          face.gaze_offset,
            speech,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Speaking phase
// ════════════════════════════════════════════════════════════════════════════

/// Mouth oscillator, advanced once per rendered frame while speaking.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpeakingPhase {
    phase: f32,
}

impl SpeakingPhase {
    pub fn start(&mut self) { self.phase = 0.0; }

    /// Step the phase and return the new mouth amplitude.
    pub fn advance(&mut self) -> f32 {
        self.phase += SPEAK_PHASE_STEP;
        self.amplitude()
    }

    /// Vertical mouth radius as a fraction of head radius, in [0.35, 0.60].
    pub fn amplitude(&self) -> f32 {
        0.35 + 0.25 * self.phase.sin().abs()
    }

    pub fn phase(&self) -> f32 { self.phase }
}

// ════════════════════════════════════════════════════════════════════════════
// Word wrap
// ════════════════════════════════════════════════════════════════════════════

/// Greedy word wrap: a word joins the current line unless that would push it
/// past `width` characters. Words longer than `width` get a line of their
/// own. Never yields an empty line.
pub fn wrap_speech(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line  = String::new();
    for word in text.split_whitespace() {
        let len = line.chars().count();
        if len > 0 && len + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

// ════════════════════════════════════════════════════════════════════════════
// Avatar
// ════════════════════════════════════════════════════════════════════════════

pub struct Avatar<R = StdRng> {
    blink:    BlinkTimer,
    speaking: bool,
    mouth:    SpeakingPhase,
    rng:      R,
}

impl Avatar<StdRng> {
    pub fn new() -> Self {
        Avatar::with_rng(StdRng::from_entropy(), Instant::now())
    }
}

impl Default for Avatar<StdRng> {
    fn default() -> Self { Avatar::new() }
}

impl<R: Rng> Avatar<R> {
    /// Avatar with an injected RNG (blink intervals) and start time.
    pub fn with_rng(mut rng: R, now: Instant) -> Self {
        let blink = BlinkTimer::new(now, &mut rng);
        Avatar { blink, speaking: false, mouth: SpeakingPhase::default(), rng }
    }

    /// Starting to speak restarts the mouth oscillation.
    pub fn set_speaking(&mut self, speaking: bool) {
        if speaking {
            self.mouth.start();
        }
        if speaking != self.speaking {
            debug!(speaking, "avatar speaking changed");
        }
        self.speaking = speaking;
    }

    pub fn is_speaking(&self) -> bool { self.speaking }
    pub fn is_blinking(&self) -> bool { self.blink.is_blinking() }
    pub fn blink(&self) -> &BlinkTimer { &self.blink }
    pub fn mouth(&self) -> SpeakingPhase { self.mouth }

    /// Render into `dest` at `(x, y, w, h)` using the current time.
    pub fn draw<'c>(
        &mut self,
        dest:  &'c mut Canvas,
        x: i32, y: i32, w: i32, h: i32,
        state: &AvatarState,
        theme: &Theme,
    ) -> &'c mut Canvas {
        self.draw_at(Instant::now(), dest, x, y, w, h, state, theme)
    }

    /// Render as of `now`. A rectangle with no area after clipping leaves
    /// both `dest` and the animation clocks untouched.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_at<'c>(
        &mut self,
        now:   Instant,
        dest:  &'c mut Canvas,
        x: i32, y: i32, w: i32, h: i32,
        state: &AvatarState,
        theme: &Theme,
    ) -> &'c mut Canvas {
        if let Some(mut p) = dest.painter_in(x, y, w, h) {
            self.blink.update(now, &mut self.rng);
            self.paint(&mut p, state, theme);
        }
        dest
    }

    fn paint(&mut self, p: &mut Painter<'_>, state: &AvatarState, theme: &Theme) {
        let (w, h) = (p.width(), p.height());

        // ── panel ─────────────────────────────────────────────────────────
        p.clear(theme.panel_bg.to_argb());
        p.stroke_rect(0, 0, w, h, 2, theme.panel_stroke.to_argb());

        // ── head ──────────────────────────────────────────────────────────
        let r  = (w.min(h) as f32 * 0.32) as i32;
        let cx = w / 2;
        let cy = h / 2 + 10;
        let rf = |k: f32| (r as f32 * k) as i32;

        p.circle(cx + 2, cy + 2, r + 2, 1, SHADOW.to_argb());
        p.fill_circle(cx, cy, r, theme.face_fill.to_argb());
        p.circle(cx, cy, r, 2, theme.face_stroke.to_argb());

        let hair_cy = cy - rf(0.35);
        p.fill_ellipse(cx, hair_cy, rf(0.95), rf(0.65), HAIR.to_argb());
        p.ellipse_arc(cx, hair_cy, rf(0.95), rf(0.65), 0.0, 360.0, 2, HAIR_STROKE.to_argb());

        // ── eyes ──────────────────────────────────────────────────────────
        let eye_dx = rf(0.45);
        let eye_y  = cy - rf(0.18);
        let eye_r  = rf(0.11).max(3);
        let gaze   = (state.gaze.0.clamp(-1.0, 1.0), state.gaze.1.clamp(-1.0, 1.0));
        let closed = self.blink.is_blinking();
        for ex in [cx - eye_dx, cx + eye_dx] {
            draw_eye(p, ex, eye_y, eye_r, closed, gaze);
        }

        // ── brows ─────────────────────────────────────────────────────────
        let lift = if state.eyebrow_raise { 6 } else { 0 };
        for ex in [cx - eye_dx, cx + eye_dx] {
            p.line(
                ex - eye_r, eye_y - rf(0.25) - lift,
                ex + eye_r, eye_y - rf(0.27) - lift,
                3, INK.to_argb(),
            );
        }

        // ── nose ──────────────────────────────────────────────────────────
        p.line(cx, cy - rf(0.05), cx, cy + rf(0.08), 2, NOSE.to_argb());
        p.fill_circle(cx, cy + rf(0.1), 2, NOSE_TIP.to_argb());

        // ── mouth ─────────────────────────────────────────────────────────
        let my = cy + rf(0.18);
        if self.speaking {
            let amp = self.mouth.advance();
            p.ellipse_arc(cx, my, rf(0.40), rf(amp), 0.0, 360.0, 4, MOUTH_OPEN.to_argb());
        } else if state.smile {
            p.ellipse_arc(cx, my, rf(0.48), rf(0.38), 15.0, 165.0, 4, MOUTH_SMILE.to_argb());
        } else {
            p.line(cx - rf(0.35), my, cx + rf(0.35), my, 3, MOUTH_FLAT.to_argb());
        }

        // ── hand glyphs ───────────────────────────────────────────────────
        let hx = w - rf(1.6);
        let hy = (h as f32 * 0.58) as i32;
        if state.thumbs_up {
            draw_thumbs_up(p, hx, hy, 1.2, theme.accent.to_argb());
        }
        if state.ok {
            draw_ok(p, hx - 24, hy, 1.2, OK_GREEN.to_argb());
        }

        // ── speech bubble ─────────────────────────────────────────────────
        if let Some(text) = state.speech.as_deref().filter(|t| !t.trim().is_empty()) {
            let (bx, by, bw, bh) = (10, h - 70, w - 20, 60);
            p.fill_rect(bx, by, bw, bh, theme.bubble_fill.to_argb());
            p.stroke_rect(bx, by, bw, bh, 2, theme.bubble_stroke.to_argb());
            let mut ty = by + 14;
            for line in wrap_speech(text, WRAP_WIDTH).iter().take(MAX_BUBBLE_LINES) {
                p.text(line, bx + 10, ty, 2, BUBBLE_TEXT.to_argb());
                ty += 22;
            }
        }
    }
}

// ── Part helpers ─────────────────────────────────────────────────────────

fn draw_eye(p: &mut Painter<'_>, cx: i32, cy: i32, r: i32, closed: bool, gaze: (f32, f32)) {
    if closed {
        p.line(cx - r, cy, cx + r, cy, 2, CLOSED_EYE.to_argb());
        return;
    }
    let (sx, sy) = ((r as f32 * 1.4) as i32, r);
    p.fill_ellipse(cx, cy, sx, sy, Rgb::WHITE.to_argb());
    p.ellipse_arc(cx, cy, sx, sy, 0.0, 360.0, 1, SCLERA_RIM.to_argb());

    let ix = cx + (gaze.0 * r as f32) as i32;
    let iy = cy + (gaze.1 * r as f32) as i32;
    let rf = |k: f32| (r as f32 * k) as i32;
    p.fill_circle(ix, iy, rf(0.9), IRIS.to_argb());
    p.fill_circle(ix, iy, rf(0.5), PUPIL.to_argb());
    p.fill_circle(ix - rf(0.3), iy - rf(0.3), rf(0.2).max(1), Rgb::WHITE.to_argb());
}

fn draw_thumbs_up(p: &mut Painter<'_>, x: i32, y: i32, scale: f32, color: u32) {
    let s = |v: i32| (v as f32 * scale) as i32;
    p.stroke_rect(x + s(10), y + s(20), s(40), s(40), 2, color);
    p.stroke_rect(x + s(45), y + s(5), s(15), s(25), 2, color);
    for dy in [22, 32, 42] {
        p.line(x + s(20), y + s(dy), x + s(42), y + s(dy), 2, color);
    }
}

fn draw_ok(p: &mut Painter<'_>, x: i32, y: i32, scale: f32, color: u32) {
    let s = |v: i32| (v as f32 * scale) as i32;
    p.circle(x + s(35), y + s(35), s(12), 2, color);
    p.line(x + s(20), y + s(20), x + s(30), y + s(30), 2, color);
    p.line(x + s(35), y + s(35), x + s(50), y + s(15), 2, color);
    for dy in [45, 55, 65] {
        p.line(x + s(50), y + s(dy), x + s(65), y + s(dy), 2, color);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const BG: u32 = 0xFF00_0000;

    fn avatar(t0: Instant) -> Avatar<StdRng> {
        Avatar::with_rng(StdRng::seed_from_u64(42), t0)
    }

    fn render(av: &mut Avatar<StdRng>, now: Instant, state: &AvatarState) -> Canvas {
        let mut c = Canvas::new(320, 240, BG);
        av.draw_at(now, &mut c, 0, 0, 320, 240, state, &Theme::default());
        c
    }

    #[test]
    fn wrap_is_greedy_at_width() {
        let lines = wrap_speech("the quick brown fox jumps over the lazy dog again", 28);
        assert_eq!(lines, vec!["the quick brown fox jumps", "over the lazy dog again"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 28));
    }

    #[test]
    fn wrap_never_emits_empty_lines() {
        let long = "x".repeat(40);
        let lines = wrap_speech(&format!("{long} tail"), 28);
        assert_eq!(lines, vec![long, "tail".to_string()]);
        assert!(wrap_speech("   ", 28).is_empty());
    }

    #[test]
    fn speaking_phase_steps_and_resets() {
        let mut m = SpeakingPhase::default();
        let a = m.advance();
        assert!((m.phase() - SPEAK_PHASE_STEP).abs() < 1e-6);
        assert!((a - (0.35 + 0.25 * 0.22f32.sin())).abs() < 1e-6);
        m.start();
        assert_eq!(m.phase(), 0.0);
    }

    #[test]
    fn amplitude_stays_in_band() {
        let mut m = SpeakingPhase::default();
        for _ in 0..200 {
            let a = m.advance();
            assert!((0.35..=0.60 + 1e-6).contains(&a));
        }
    }

    #[test]
    fn zero_area_is_a_no_op() {
        let t0 = Instant::now();
        let mut av = avatar(t0);
        let before = *av.blink();
        let mut c = Canvas::new(64, 64, BG);
        let late = t0 + Duration::from_secs(30);
        av.draw_at(late, &mut c, 10, 10, 0, 40, &AvatarState::default(), &Theme::default());
        assert!(c.pixels().iter().all(|&p| p == BG));
        assert_eq!(av.blink().next_transition_at(), before.next_transition_at());
    }

    #[test]
    fn drawing_stays_inside_rect() {
        let t0 = Instant::now();
        let mut av = avatar(t0);
        let mut c = Canvas::new(200, 200, BG);
        let state = AvatarState { ok: true, thumbs_up: true, speech: Some("hi".into()), ..Default::default() };
        av.draw_at(t0, &mut c, 150, 150, 120, 120, &state, &Theme::default());
        for y in 0..200 {
            for x in 0..200 {
                if x < 150 || y < 150 {
                    assert_eq!(c.pixel(x, y), Some(BG), "({x},{y})");
                }
            }
        }
    }

    #[test]
    fn smile_changes_the_mouth() {
        let t0 = Instant::now();
        let neutral = render(&mut avatar(t0), t0, &AvatarState::default());
        let smiling = render(&mut avatar(t0), t0, &AvatarState { smile: true, ..Default::default() });
        assert_ne!(neutral, smiling);
    }

    #[test]
    fn gaze_moves_the_irises() {
        let t0 = Instant::now();
        let left  = render(&mut avatar(t0), t0, &AvatarState { gaze: (-1.0, 0.0), ..Default::default() });
        let right = render(&mut avatar(t0), t0, &AvatarState { gaze: (1.0, 0.0), ..Default::default() });
        assert_ne!(left, right);
    }

    #[test]
    fn blink_closes_the_eyes() {
        let t0 = Instant::now();
        let mut av = avatar(t0);
        let open = render(&mut av, t0, &AvatarState::default());
        let at = av.blink().next_transition_at();
        let closed = render(&mut av, at, &AvatarState::default());
        assert!(av.is_blinking());
        assert_ne!(open, closed);
        render(&mut av, at + Duration::from_millis(120), &AvatarState::default());
        assert!(!av.is_blinking());
    }

    #[test]
    fn speaking_advances_once_per_frame() {
        let t0 = Instant::now();
        let mut av = avatar(t0);
        av.set_speaking(true);
        for _ in 0..3 {
            render(&mut av, t0, &AvatarState::default());
        }
        assert!((av.mouth().phase() - 3.0 * SPEAK_PHASE_STEP).abs() < 1e-5);
        av.set_speaking(true);
        assert_eq!(av.mouth().phase(), 0.0);
    }

    #[test]
    fn from_perception_defaults_to_neutral() {
        let s = AvatarState::from_perception(None, None, None);
        assert_eq!(s, AvatarState::default());
        let hand = HandState { thumbs_up: true, ..Default::default() };
        let s = AvatarState::from_perception(Some(hand), None, Some("hey".into()));
        assert!(s.thumbs_up && !s.ok);
        assert_eq!(s.speech.as_deref(), Some("hey"));
    }
}
