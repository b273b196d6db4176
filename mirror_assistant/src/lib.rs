//! # mirror_assistant
//!
//! A desktop assistant that watches the user's hand and face landmarks,
//! answers gestures and expressions with short spoken phrases, takes voice
//! commands, and mirrors the user on an animated avatar panel.
//!
//! ## Reactions
//!
//! | Detected | Says (EN / RO) | Cooldown |
//! |---|---|---|
//! | OK sign | "OK!" / "OK!" | 2.5 s |
//! | Thumbs-up | "Nice!" / "Bravo!" | 2.5 s |
//! | Smile | "Nice smile!" / "Frumos zâmbet!" | 3.0 s |
//! | Eyebrow raise | "Hmm?" / "Interesant!" | 3.0 s |
//!
//! ## Voice commands
//!
//! Screenshot, open YouTube, play music, Google / YouTube search, open a
//! site, switch theme, set the accent colour. Anything else gets a short
//! greeting back in the speaker's language.
//!
//! ## Simulation keyboard shortcuts
//!
//! | Key | Effect |
//! |---|---|
//! | `O` `U` `S` `B` (hold) | OK, thumbs-up, smile, eyebrow raise |
//! | arrows (hold) | gaze |
//! | `X` / `Z` | hide/show hand, face |
//! | `V` `H` `A` `T` | voice, help, avatar, theme |
//! | `L` | language lock auto → RO → EN |
//! | `P` | screenshot |
//! | `Esc` / `Q` | quit |
//!
//! Typed lines on stdin stand in for recognized speech.

pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod history;
pub mod lang;
pub mod overlay;
pub mod reactions;
pub mod source;
pub mod speech;
pub mod visualizer;

pub use app::AppState;
pub use commands::{parse_command, Command, CommandCenter, CommandHost, UrlOpener};
pub use config::{Args, AssistantConfig};
pub use error::{AssistantError, Result};
pub use history::History;
pub use lang::{Lang, LanguageMode};
pub use reactions::{Channel, Reaction, ReactionScheduler};
pub use speech::{Listener, Phrase, Recognizer, Speaker, SpeechEngine};
