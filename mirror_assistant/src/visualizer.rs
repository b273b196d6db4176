//! Software-rendered window using `minifb`.
//!
//! | Key | Action |
//! |---|---|
//! | Esc / Q | quit |
//! | O / U / S / B (held) | simulate OK, thumbs-up, smile, eyebrow raise |
//! | ← → ↑ ↓ (held) | simulate gaze |
//! | X / Z | hide or show the simulated hand / face |
//! | V | voice feedback on/off |
//! | H | help overlay on/off |
//! | A | avatar panel on/off |
//! | T | dark / light theme |
//! | L | language lock: auto → RO → EN → auto |
//! | P | screenshot |

use std::sync::mpsc::Sender;
use std::time::Duration;

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use avatar_panel::Canvas;

use crate::error::{AssistantError, Result};
use crate::source::{SimInput, SimKey};

/// One-shot actions the app handles itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Quit,
    ToggleVoice,
    ToggleHelp,
    ToggleAvatar,
    ToggleTheme,
    CycleLanguage,
    Screenshot,
}

const POSE_KEYS: [(Key, SimKey); 10] = [
    (Key::O,     SimKey::OkSign),
    (Key::U,     SimKey::ThumbsUp),
    (Key::S,     SimKey::Smile),
    (Key::B,     SimKey::BrowRaise),
    (Key::Left,  SimKey::GazeLeft),
    (Key::Right, SimKey::GazeRight),
    (Key::Up,    SimKey::GazeUp),
    (Key::Down,  SimKey::GazeDown),
    (Key::X,     SimKey::ToggleHand),
    (Key::Z,     SimKey::ToggleFace),
];

const CONTROL_KEYS: [(Key, Control); 8] = [
    (Key::Escape, Control::Quit),
    (Key::Q,      Control::Quit),
    (Key::V,      Control::ToggleVoice),
    (Key::H,      Control::ToggleHelp),
    (Key::A,      Control::ToggleAvatar),
    (Key::T,      Control::ToggleTheme),
    (Key::L,      Control::CycleLanguage),
    (Key::P,      Control::Screenshot),
];

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    width:  usize,
    height: usize,
    sim_tx: Sender<SimInput>,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>, width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(
            "Mirror Assistant",
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| AssistantError::Window(e.to_string()))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer { window, width, height, sim_tx })
    }

    pub fn size(&self) -> (usize, usize) { (self.width, self.height) }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Forward pose key transitions to the simulator and return the
    /// one-shot controls pressed since the last poll.
    pub fn poll_input(&mut self) -> Vec<Control> {
        if !self.window.is_open() {
            return vec![Control::Quit];
        }

        for (key, sim) in POSE_KEYS {
            if self.window.is_key_pressed(key, KeyRepeat::No) {
                let _ = self.sim_tx.send(SimInput::KeyDown(sim));
            }
            if self.window.is_key_released(key) {
                let _ = self.sim_tx.send(SimInput::KeyUp(sim));
            }
        }

        CONTROL_KEYS
            .iter()
            .filter(|(key, _)| self.window.is_key_pressed(*key, KeyRepeat::No))
            .map(|&(_, control)| control)
            .collect()
    }

    /// Blit a composed frame. The canvas must match the window size.
    pub fn present(&mut self, frame: &Canvas) -> Result<()> {
        self.window
            .update_with_buffer(frame.pixels(), frame.width(), frame.height())
            .map_err(|e| AssistantError::Window(e.to_string()))
    }
}
