//! # avatar_panel
//!
//! A software-rendered avatar that mirrors the user's gestures and
//! expressions, blinks on its own, and moves its mouth while speaking.
//!
//! ## Reactions
//!
//! | Input | Avatar |
//! |---|---|
//! | `smile` | curved smile instead of a flat mouth |
//! | `eyebrow_raise` | both brows lifted 6 px |
//! | `gaze` | irises shifted by `gaze × eye radius` |
//! | `thumbs_up` | thumbs-up glyph in the accent colour |
//! | `ok` | green OK glyph beside it |
//! | `speech` | two-line speech bubble |
//! | speaking | oscillating open mouth (overrides smile) |
//!
//! Rendering targets a plain [`Canvas`] of `0xAARRGGBB` pixels, so the panel
//! can be composed into any window buffer or saved as an image.

pub mod avatar;
pub mod blink;
pub mod canvas;
pub mod theme;

pub use avatar::{wrap_speech, Avatar, AvatarState, SpeakingPhase};
pub use blink::{BlinkPhase, BlinkTimer};
pub use canvas::{blend, has_glyph, Canvas, Painter, Rect};
pub use theme::{Rgb, Theme, ThemeError, ThemeMode, DEFAULT_ACCENT};
