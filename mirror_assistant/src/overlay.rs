//! Camera-view overlays: landmark dots, per-gesture markers and the HUD.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ LANG: EN | VOICE: ON | H: HELP               │  ← HUD bar
//! │══════════════════════════════════════════════│  ← accent underline
//! │ help lines…                      ┌─────────┐ │
//! │                                  │ avatar  │ │
//! │        · · face · ·              └─────────┘ │
//! │   (OK)    ◡ smile                            │
//! │ ASSISTANT: HMM?                              │
//! └──────────────────────────────────────────────┘
//! ```

use avatar_panel::{Painter, Rgb, Theme};
use landmark_sense::{FaceState, Frame, HandState};

use crate::lang::Lang;

/// Camera backdrop when no video is available.
pub const CAMERA_BG: u32 = 0xFF1A1A2E;

const HAND_DOT:   u32 = 0xFFAADDFF;
const FACE_DOT:   u32 = 0xFF5A6078;
const OK_COLOR:   Rgb = Rgb(0, 255, 0);
const THUMB_COLOR: Rgb = Rgb(255, 200, 0);
const SMILE_COLOR: Rgb = Rgb(255, 0, 255);
const BROW_COLOR: Rgb = Rgb(255, 255, 0);

const HUD_TOP:    i32 = 8;
const HUD_BOTTOM: i32 = 60;

pub const HELP_LINES: [&str; 6] = [
    "ESC/Q: QUIT | P: SCREENSHOT | V: VOICE | A: AVATAR | T: THEME",
    "L: LANGUAGE AUTO/RO/EN | H: HELP",
    "HOLD O=OK U=THUMBS-UP S=SMILE B=BROW, ARROWS=GAZE, X/Z=HAND/FACE",
    "SAY: SCREENSHOT | OPEN YOUTUBE | PLAY [TITLE]",
    "     GOOGLE [TERM] | YOUTUBE [TERM] | OPEN [SITE]",
    "     SET THEME TO DARK/LIGHT | ACCENT #RRGGBB",
];

/// Status line shown in the HUD bar.
pub fn status_line(lang: Lang, voice_on: bool) -> String {
    format!("Lang: {} | Voice: {} | H: help", lang.tag(), if voice_on { "ON" } else { "OFF" })
}

pub fn draw_landmarks(p: &mut Painter<'_>, frame: &Frame) {
    if let Some(face) = &frame.face {
        for pt in face.points() {
            p.fill_rect(pt.x as i32, pt.y as i32, 2, 2, FACE_DOT);
        }
    }
    for hand in &frame.hands {
        let pts = hand.points();
        for pair in pts.windows(2) {
            p.line(pair[0].x as i32, pair[0].y as i32, pair[1].x as i32, pair[1].y as i32, 1, FACE_DOT);
        }
        for pt in pts {
            p.fill_circle(pt.x as i32, pt.y as i32, 3, HAND_DOT);
        }
    }
}

/// Row offset of the OK label above the hand centre.
const OK_LABEL_DY:    i32 = -40;
/// Row offset of the thumbs-up label, one text row above the OK label.
const THUMBS_LABEL_DY: i32 = -70;

/// `(x + dx, y + dy)` without overflowing for far-off landmarks.
fn shifted((x, y): (i32, i32), dx: i32, dy: i32) -> (i32, i32) {
    (x.saturating_add(dx), y.saturating_add(dy))
}

/// Markers for whatever is active on this frame, independent of cooldowns.
pub fn draw_reactions(p: &mut Painter<'_>, hand: Option<&HandState>, face: Option<&FaceState>) {
    if let Some(h) = hand {
        let (x, y) = h.center;
        if h.ok_gesture {
            p.circle(x, y, 22, 3, OK_COLOR.to_argb());
            let (lx, ly) = shifted(h.center, -60, OK_LABEL_DY);
            p.text("ASSISTANT: OK!", lx, ly, 2, OK_COLOR.to_argb());
        }
        if h.thumbs_up {
            let (bx, by) = shifted(h.center, -20, -20);
            p.stroke_rect(bx, by, 40, 40, 3, THUMB_COLOR.to_argb());
            let (lx, ly) = shifted(h.center, -80, THUMBS_LABEL_DY);
            p.text("ASSISTANT: THUMBS UP", lx, ly, 2, THUMB_COLOR.to_argb());
        }
    }
    if let Some(f) = face {
        if f.smiling {
            let (ax, ay) = shifted(f.mouth_center, 0, 10);
            p.ellipse_arc(ax, ay, 35, 18, 10.0, 170.0, 3, SMILE_COLOR.to_argb());
            let (lx, ly) = shifted(f.mouth_center, -50, 40);
            p.text("ASSISTANT: :)", lx, ly, 2, SMILE_COLOR.to_argb());
        }
        if f.eyebrow_raise {
            p.text("ASSISTANT: HMM?", 20, p.height() - 20, 2, BROW_COLOR.to_argb());
        }
    }
}

/// Status bar with accent underline, plus the help block when enabled.
pub fn draw_hud(p: &mut Painter<'_>, lang: Lang, voice_on: bool, help_on: bool, theme: &Theme) {
    let w = p.width();
    p.fill_rect(HUD_TOP, HUD_TOP, w - 2 * HUD_TOP, HUD_BOTTOM - HUD_TOP, theme.hud_bg.to_argb());
    p.text(&status_line(lang, voice_on), 20, 26, 3, theme.accent.to_argb());
    p.line(HUD_TOP, HUD_BOTTOM, w - HUD_TOP, HUD_BOTTOM, 3, theme.accent.to_argb());

    if help_on {
        let mut y = HUD_BOTTOM + 20;
        for line in HELP_LINES {
            p.text(line, 20, y, 2, theme.hud_text.to_argb());
            y += 16;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use avatar_panel::Canvas;

    #[test]
    fn status_line_reflects_state() {
        assert_eq!(status_line(Lang::Ro, false), "Lang: RO | Voice: OFF | H: help");
        assert_eq!(status_line(Lang::En, true), "Lang: EN | Voice: ON | H: help");
    }

    #[test]
    fn hud_paints_accent_underline() {
        let theme = Theme::default();
        let mut c = Canvas::new(400, 300, CAMERA_BG);
        draw_hud(&mut c.painter().unwrap(), Lang::En, true, false, &theme);
        assert_eq!(c.pixel(200, HUD_BOTTOM as usize), Some(theme.accent.to_argb()));
        assert_eq!(c.pixel(200, 250), Some(CAMERA_BG));
    }

    #[test]
    fn ok_marker_draws_ring_at_hand_center() {
        let mut c = Canvas::new(300, 300, CAMERA_BG);
        let hand = HandState { ok_gesture: true, thumbs_up: false, center: (150, 150) };
        draw_reactions(&mut c.painter().unwrap(), Some(&hand), None);
        assert_eq!(c.pixel(172, 150), Some(OK_COLOR.to_argb()));
        assert_eq!(c.pixel(150, 150), Some(CAMERA_BG));
    }

    #[test]
    fn markers_near_edges_are_clipped() {
        let mut c = Canvas::new(50, 50, CAMERA_BG);
        let hand = HandState { ok_gesture: true, thumbs_up: true, center: (0, 0) };
        let face = FaceState { smiling: true, eyebrow_raise: true, ..Default::default() };
        draw_reactions(&mut c.painter().unwrap(), Some(&hand), Some(&face));
    }

    #[test]
    fn ok_and_thumbs_labels_use_separate_rows() {
        let color_rows = |c: &Canvas, color: u32| -> Vec<usize> {
            (0..c.height())
                .filter(|&y| (0..c.width()).any(|x| c.pixel(x, y) == Some(color)))
                .collect()
        };
        let mut c = Canvas::new(400, 300, CAMERA_BG);
        let hand = HandState { ok_gesture: true, thumbs_up: true, center: (200, 200) };
        draw_reactions(&mut c.painter().unwrap(), Some(&hand), None);

        // Only the labels reach above the ring and the box.
        let label_band = |rows: Vec<usize>| -> Vec<usize> {
            rows.into_iter().filter(|&y| y < 200 - 22).collect()
        };
        let ok_rows     = label_band(color_rows(&c, OK_COLOR.to_argb()));
        let thumbs_rows = label_band(color_rows(&c, THUMB_COLOR.to_argb()));
        assert!(!ok_rows.is_empty() && !thumbs_rows.is_empty());
        assert!(thumbs_rows.iter().all(|y| !ok_rows.contains(y)));
        assert!(thumbs_rows.iter().max() < ok_rows.iter().min());
    }

    #[test]
    fn far_off_markers_do_not_overflow() {
        let mut c = Canvas::new(120, 90, CAMERA_BG);
        let far = (1e10 as i32, 1e10 as i32);
        let hand = HandState { ok_gesture: true, thumbs_up: true, center: far };
        let face = FaceState { smiling: true, mouth_center: far, ..Default::default() };
        draw_reactions(&mut c.painter().unwrap(), Some(&hand), Some(&face));
        assert!(c.pixels().iter().all(|&px| px == CAMERA_BG));
    }

    #[test]
    fn every_overlay_string_has_glyphs() {
        let labels = ["ASSISTANT: OK!", "ASSISTANT: THUMBS UP", "ASSISTANT: :)", "ASSISTANT: HMM?"];
        let status = [status_line(Lang::Ro, true), status_line(Lang::En, false)];
        let all = HELP_LINES.iter().chain(labels.iter()).copied().chain(status.iter().map(String::as_str));
        for line in all {
            assert!(line.chars().all(avatar_panel::has_glyph), "{line}");
        }
    }

    #[test]
    fn nothing_active_draws_nothing() {
        let mut c = Canvas::new(100, 100, CAMERA_BG);
        draw_reactions(&mut c.painter().unwrap(), Some(&HandState::default()), Some(&FaceState::default()));
        assert!(c.pixels().iter().all(|&px| px == CAMERA_BG));
    }
}
