//! Colour themes.
//!
//! A [`Theme`] is an immutable value. Switching mode or accent produces a
//! new theme; whoever owns the "current" theme swaps it and passes it to the
//! renderer on the next frame.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    #[error("invalid hex colour {0:?} (expected #RGB or #RRGGBB)")]
    InvalidHex(String),

    #[error("unknown theme mode {0:?} (expected dark or light)")]
    UnknownMode(String),
}

// ════════════════════════════════════════════════════════════════════════════
// Rgb
// ════════════════════════════════════════════════════════════════════════════

/// 8-bit colour in red, green, blue order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Packed `0xFFRRGGBB`, the framebuffer's pixel format.
    pub const fn to_argb(self) -> u32 {
        0xFF00_0000 | (self.0 as u32) << 16 | (self.1 as u32) << 8 | self.2 as u32
    }

    pub const fn from_argb(c: u32) -> Rgb {
        Rgb((c >> 16) as u8, (c >> 8) as u8, c as u8)
    }

    /// Parse `#RRGGBB` or the short `#RGB` form; the `#` is optional.
    pub fn from_hex(s: &str) -> Result<Rgb, ThemeError> {
        let bad = || ThemeError::InvalidHex(s.to_string());
        let body = s.trim().trim_start_matches('#');
        if !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }
        let full: String = match body.len() {
            3 => body.chars().flat_map(|c| [c, c]).collect(),
            6 => body.to_string(),
            _ => return Err(bad()),
        };
        let channel = |i: usize| u8::from_str_radix(&full[i..i + 2], 16).map_err(|_| bad());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ── HSV helpers ──────────────────────────────────────────────────────────

fn rgb_to_hsv(c: Rgb) -> (f32, f32, f32) {
    let r = c.0 as f32 / 255.0;
    let g = c.1 as f32 / 255.0;
    let b = c.2 as f32 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let d   = max - min;
    let h = if d == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / d).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / d + 2.0)
    } else {
        60.0 * ((r - g) / d + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { d / max };
    (h, s, max)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let h  = h.rem_euclid(360.0);
    let hi = (h / 60.0) as u32;
    let f  = h / 60.0 - hi as f32;
    let p  = v * (1.0 - s);
    let q  = v * (1.0 - s * f);
    let t  = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match hi {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Rgb((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

/// Lighter (more value, less saturation) and darker shades of an accent.
pub fn derive_shades(accent: Rgb) -> (Rgb, Rgb) {
    let (h, s, v) = rgb_to_hsv(accent);
    let light = hsv_to_rgb(h, (s * 0.85).max(0.0), (v * 1.25 + 0.05).min(1.0));
    let dark  = hsv_to_rgb(h, s, (v * 0.65).max(0.0));
    (light, dark)
}

// ════════════════════════════════════════════════════════════════════════════
// ThemeMode
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn name(self) -> &'static str {
        match self {
            ThemeMode::Dark  => "dark",
            ThemeMode::Light => "light",
        }
    }

    pub fn toggled(self) -> ThemeMode {
        match self {
            ThemeMode::Dark  => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }
}

impl FromStr for ThemeMode {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dark"  => Ok(ThemeMode::Dark),
            "light" => Ok(ThemeMode::Light),
            other   => Err(ThemeError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Theme
// ════════════════════════════════════════════════════════════════════════════

/// Brand accent used when nothing else is configured.
pub const DEFAULT_ACCENT: Rgb = Rgb(0x00, 0x66, 0xFF);

/// Every named colour the renderers read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub mode:          ThemeMode,
    pub accent:        Rgb,
    pub accent_light:  Rgb,
    pub accent_dark:   Rgb,
    pub hud_bg:        Rgb,
    pub hud_text:      Rgb,
    pub panel_bg:      Rgb,
    pub panel_stroke:  Rgb,
    pub face_fill:     Rgb,
    pub face_stroke:   Rgb,
    pub bubble_fill:   Rgb,
    pub bubble_stroke: Rgb,
}

impl Default for Theme {
    fn default() -> Self { Theme::new(ThemeMode::Dark, DEFAULT_ACCENT) }
}

impl Theme {
    pub fn new(mode: ThemeMode, accent: Rgb) -> Self {
        let (accent_light, accent_dark) = derive_shades(accent);
        let base = Theme {
            mode,
            accent,
            accent_light,
            accent_dark,
            hud_bg:        Rgb(56, 32, 26),
            hud_text:      Rgb::WHITE,
            panel_bg:      Rgb(56, 32, 26),
            panel_stroke:  Rgb(210, 190, 180),
            face_fill:     Rgb(255, 242, 230),
            face_stroke:   Rgb(200, 180, 170),
            bubble_fill:   Rgb::WHITE,
            bubble_stroke: Rgb(120, 100, 90),
        };
        match mode {
            ThemeMode::Dark  => base,
            ThemeMode::Light => Theme {
                hud_bg:        Rgb(245, 245, 245),
                hud_text:      Rgb(20, 20, 20),
                panel_bg:      Rgb(255, 248, 245),
                face_fill:     Rgb::WHITE,
                bubble_stroke: Rgb(170, 150, 140),
                ..base
            },
        }
    }

    /// Same accent, different mode.
    pub fn with_mode(&self, mode: ThemeMode) -> Theme {
        Theme::new(mode, self.accent)
    }

    /// Same mode, different accent (shades re-derived).
    pub fn with_accent(&self, accent: Rgb) -> Theme {
        Theme::new(self.mode, accent)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_long_and_short_forms() {
        assert_eq!(Rgb::from_hex("#0066FF").unwrap(), Rgb(0, 0x66, 0xFF));
        assert_eq!(Rgb::from_hex("0066ff").unwrap(), Rgb(0, 0x66, 0xFF));
        assert_eq!(Rgb::from_hex("#f0a").unwrap(), Rgb(0xFF, 0x00, 0xAA));
    }

    #[test]
    fn hex_rejects_garbage() {
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#GG0000").is_err());
        assert!(Rgb::from_hex("").is_err());
    }

    #[test]
    fn hex_round_trips_through_display() {
        assert_eq!(Rgb(18, 52, 86).to_string(), "#123456");
    }

    #[test]
    fn argb_is_opaque() {
        assert_eq!(Rgb(1, 2, 3).to_argb(), 0xFF01_0203);
        assert_eq!(Rgb::from_argb(0xFF01_0203), Rgb(1, 2, 3));
    }

    #[test]
    fn shades_bracket_the_accent() {
        let accent = DEFAULT_ACCENT;
        let (light, dark) = derive_shades(accent);
        let sum = |c: Rgb| c.0 as u32 + c.1 as u32 + c.2 as u32;
        assert!(sum(light) > sum(accent));
        assert!(sum(dark) < sum(accent));
    }

    #[test]
    fn grey_accent_stays_grey() {
        let (light, dark) = derive_shades(Rgb(100, 100, 100));
        assert_eq!(light.0, light.1);
        assert_eq!(dark.1, dark.2);
    }

    #[test]
    fn mode_switch_keeps_accent() {
        let t = Theme::default().with_accent(Rgb(200, 10, 10));
        let light = t.with_mode(ThemeMode::Light);
        assert_eq!(light.accent, Rgb(200, 10, 10));
        assert_eq!(light.mode, ThemeMode::Light);
        assert_ne!(light.panel_bg, t.panel_bg);
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("LIGHT".parse::<ThemeMode>().unwrap(), ThemeMode::Light);
        assert!("sepia".parse::<ThemeMode>().is_err());
    }
}
