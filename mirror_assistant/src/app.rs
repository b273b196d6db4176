//! Top-level orchestration.
//!
//! `AppState` owns everything the frame loop touches: perception and
//! smoothing state, the reaction scheduler, the avatar, the current theme,
//! history, and handles to the speech workers. [`run`] wires it to the
//! window and the landmark source.
//!
//! ```text
//!  window keys ──► SimLandmarkSource ──Frame──► handle_frame ──► Speaker
//!       │                                           │              │
//!       └──Control──► handle_control                ▼              ▼
//!  Listener ──Phrase──► handle_phrase ──► CommandCenter      SpeakingEvent
//!                                                   │              │
//!                                 compose ◄─────────┴──────────────┘
//! ```

use std::sync::mpsc::TryRecvError;
use std::sync::mpsc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use avatar_panel::{Avatar, AvatarState, Canvas, Rgb, Theme, ThemeMode};
use landmark_sense::{Frame, Percept, Perception};

use crate::commands::{CommandCenter, CommandHost, SystemBrowser, UrlOpener};
use crate::config::AssistantConfig;
use crate::error::Result;
use crate::history::History;
use crate::lang::Lang;
use crate::overlay::{self, CAMERA_BG};
use crate::reactions::{Reaction, ReactionScheduler};
use crate::source::{spawn_landmark_source, SimLandmarkSource};
use crate::speech::{ConsoleVoice, Listener, Phrase, Speaker, SpeakingEvent, StdinRecognizer};
use crate::visualizer::{Control, Visualizer};

pub const EN_REPLIES: [&str; 3] = ["Hello!", "Hi!", "Hey there!"];
pub const RO_REPLIES: [&str; 3] = ["Salut!", "Bună!", "Salutare!"];

/// Avatar panel inset from the window's top-right corner.
const PANEL_MARGIN: i32 = 12;

// ════════════════════════════════════════════════════════════════════════════
// Command host over the session's state
// ════════════════════════════════════════════════════════════════════════════

/// Borrows the pieces of `AppState` a voice command may touch.
struct SessionHost<'a> {
    frame:   Option<&'a Canvas>,
    opener:  &'a dyn UrlOpener,
    theme:   &'a mut Theme,
    history: &'a mut History,
}

impl CommandHost for SessionHost<'_> {
    fn frame(&self) -> Option<&Canvas> { self.frame }

    fn open_url(&mut self, url: &str) -> Result<()> {
        self.opener.open(url)
    }

    fn apply_theme(&mut self, mode: ThemeMode) {
        *self.theme = self.theme.with_mode(mode);
    }

    fn apply_accent(&mut self, accent: Rgb) {
        *self.theme = self.theme.with_accent(accent);
    }

    fn log(&mut self, msg: &str) {
        info!("{msg}");
        self.history.push(msg);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── per-frame pipeline ───────────────────────────────────────────────
    perception: Perception,
    scheduler:  ReactionScheduler,
    percept:    Percept,
    last_frame: Option<Frame>,

    // ── presentation ─────────────────────────────────────────────────────
    avatar:          Avatar,
    theme:           Theme,
    avatar_fraction: f32,
    composed:        Option<Canvas>,
    bubble:          Option<String>,

    // ── voice I/O ────────────────────────────────────────────────────────
    speaker:  Speaker,
    listener: Option<Listener>,
    commands: CommandCenter,
    opener:   Box<dyn UrlOpener>,
    rng:      StdRng,

    // ── toggles ──────────────────────────────────────────────────────────
    pub voice_on:  bool,
    pub help_on:   bool,
    pub avatar_on: bool,
    lang_lock:     Option<Lang>,
    current_lang:  Lang,

    pub history: History,
}

impl AppState {
    pub fn new(
        cfg:      &AssistantConfig,
        speaker:  Speaker,
        listener: Option<Listener>,
        opener:   Box<dyn UrlOpener>,
        rng:      StdRng,
    ) -> Result<Self> {
        let lang_lock = cfg.language.lock();
        Ok(AppState {
            perception: Perception::new(),
            scheduler:  ReactionScheduler::new(cfg.hand_cooldown(), cfg.face_cooldown()),
            percept:    Percept::default(),
            last_frame: None,

            avatar:          Avatar::new(),
            theme:           cfg.initial_theme()?,
            avatar_fraction: cfg.avatar_fraction(),
            composed:        None,
            bubble:          None,

            speaker,
            listener,
            commands: CommandCenter::new(&cfg.captures_dir),
            opener,
            rng,

            voice_on:     cfg.voice_enabled,
            help_on:      cfg.help_overlay,
            avatar_on:    cfg.avatar_enabled,
            lang_lock,
            current_lang: lang_lock.unwrap_or_default(),

            history: History::new(),
        })
    }

    pub fn theme(&self) -> &Theme { &self.theme }
    pub fn percept(&self) -> &Percept { &self.percept }
    pub fn bubble(&self) -> Option<&str> { self.bubble.as_deref() }
    pub fn language_lock(&self) -> Option<Lang> { self.lang_lock }
    pub fn is_speaking(&self) -> bool { self.avatar.is_speaking() }

    /// Language for reactions: the lock if set, else the last reply's.
    pub fn working_lang(&self) -> Lang {
        self.lang_lock.unwrap_or(self.current_lang)
    }

    // ── frames ───────────────────────────────────────────────────────────

    /// Classify one frame and emit any due reactions. History and cooldown
    /// stamps update whether or not voice is on.
    pub fn handle_frame(&mut self, frame: &Frame, now: Instant) -> Vec<Reaction> {
        let percept = self.perception.process(frame);
        let reactions = self.scheduler.evaluate(
            now,
            percept.hand.as_ref(),
            percept.face.as_ref(),
            self.working_lang(),
        );
        for r in &reactions {
            if self.voice_on {
                self.speaker.speak(r.phrase);
            }
            self.history.push(r.history);
        }
        self.percept = percept;
        self.last_frame = Some(frame.clone());
        reactions
    }

    // ── speech ───────────────────────────────────────────────────────────

    /// Handle one recognized utterance: a command if it parses as one,
    /// otherwise a small-talk reply. Returns the reply, if any.
    pub fn handle_phrase(&mut self, phrase: Phrase) -> Option<&'static str> {
        self.history.push(format!("User said: {}", phrase.text));

        let mut host = SessionHost {
            frame:   self.composed.as_ref(),
            opener:  &*self.opener,
            theme:   &mut self.theme,
            history: &mut self.history,
        };
        if self.commands.dispatch(&phrase.text, &mut host) {
            return None;
        }

        let replies = match phrase.lang {
            Lang::Ro => &RO_REPLIES,
            Lang::En => &EN_REPLIES,
        };
        let reply = replies[self.rng.gen_range(0..replies.len())];
        if self.voice_on {
            self.speaker.speak(reply);
        }
        self.bubble = Some(reply.to_string());
        self.history.push(format!("Assistant: {reply}"));
        self.current_lang = phrase.lang;
        info!(lang = %phrase.lang, reply, "small talk");
        Some(reply)
    }

    /// Drain recognized phrases from the listener, if one is running.
    pub fn pump_phrases(&mut self) {
        let phrases = match &self.listener {
            Some(l) => l.drain_phrases(),
            None    => return,
        };
        for phrase in phrases {
            self.handle_phrase(phrase);
        }
    }

    /// Mirror the speaker's Started/Finished events onto the avatar mouth.
    pub fn pump_speech(&mut self) {
        for event in self.speaker.drain_events() {
            self.avatar.set_speaking(event == SpeakingEvent::Started);
        }
    }

    // ── controls ─────────────────────────────────────────────────────────

    /// Apply a window control. Returns false when the app should quit.
    pub fn handle_control(&mut self, control: Control) -> bool {
        match control {
            Control::Quit => return false,
            Control::ToggleVoice => {
                self.voice_on = !self.voice_on;
                info!(voice = self.voice_on, "voice toggled");
            }
            Control::ToggleHelp   => self.help_on = !self.help_on,
            Control::ToggleAvatar => self.avatar_on = !self.avatar_on,
            Control::ToggleTheme => {
                self.theme = self.theme.with_mode(self.theme.mode.toggled());
                info!(theme = %self.theme.mode, "theme toggled");
            }
            Control::CycleLanguage => {
                self.lang_lock = match self.lang_lock {
                    None           => Some(Lang::Ro),
                    Some(Lang::Ro) => Some(Lang::En),
                    Some(Lang::En) => None,
                };
                if let Some(l) = &self.listener {
                    l.set_language_lock(self.lang_lock);
                }
                info!(lock = ?self.lang_lock, "language lock");
            }
            Control::Screenshot => {
                let msg = match self.composed.as_ref().map(|c| self.commands.take_screenshot(c)) {
                    None          => "No frame to capture.".to_string(),
                    Some(Ok(p))   => format!("Screenshot -> {}", p.display()),
                    Some(Err(e))  => {
                        warn!(error = %e, "screenshot failed");
                        format!("Screenshot failed: {e}")
                    }
                };
                self.history.push(msg);
            }
        }
        true
    }

    // ── rendering ────────────────────────────────────────────────────────

    /// Render the overlays, HUD and avatar panel into a `width × height`
    /// frame. The result is kept as the screenshot source.
    pub fn compose(&mut self, width: usize, height: usize, now: Instant) -> &Canvas {
        let mut canvas = match self.composed.take() {
            Some(c) if c.width() == width && c.height() == height => c,
            _ => Canvas::new(width, height, CAMERA_BG),
        };
        canvas.fill(CAMERA_BG);

        let lang = self.working_lang();
        let (hand, face) = (self.percept.hand, self.percept.face);
        if let Some(mut p) = canvas.painter() {
            if let Some(frame) = &self.last_frame {
                overlay::draw_landmarks(&mut p, frame);
            }
            overlay::draw_reactions(&mut p, hand.as_ref(), face.as_ref());
            overlay::draw_hud(&mut p, lang, self.voice_on, self.help_on, &self.theme);
        }

        if self.avatar_on {
            let panel_w = (width as f32 * self.avatar_fraction) as i32;
            let panel_h = height as i32 / 2;
            let x = width as i32 - panel_w - PANEL_MARGIN;
            let state = AvatarState::from_perception(hand, face, self.bubble.clone());
            self.avatar.draw_at(now, &mut canvas, x, PANEL_MARGIN, panel_w, panel_h, &state, &self.theme);
        }

        self.composed.insert(canvas)
    }

    /// Stop both workers; bounded by their stop timeouts.
    pub fn shutdown(&mut self) {
        info!("shutting down");
        if let Some(l) = &mut self.listener {
            l.stop();
        }
        self.speaker.stop();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Main loop
// ════════════════════════════════════════════════════════════════════════════

pub fn run(cfg: AssistantConfig) -> Result<()> {
    let (width, height) = (cfg.window_width, cfg.window_height);

    // ── Sim landmark channel ──────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel();
    let frames = spawn_landmark_source(SimLandmarkSource::new(sim_rx, width, height));

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(sim_tx, width, height)?;

    // ── Speech workers ────────────────────────────────────────────────────
    let speaker = Speaker::spawn(ConsoleVoice::default())?;
    let listener = match StdinRecognizer::spawn().and_then(|r| Listener::spawn(r, cfg.language)) {
        Ok(l)  => Some(l),
        Err(e) => {
            warn!(error = %e, "speech input unavailable");
            None
        }
    };

    let mut app = AppState::new(&cfg, speaker, listener, Box::new(SystemBrowser), StdRng::from_entropy())?;
    info!(width, height, "assistant running");

    // ── Main loop ─────────────────────────────────────────────────────────
    'frame: while vis.is_open() {
        // 1. Window controls
        for control in vis.poll_input() {
            if !app.handle_control(control) {
                break 'frame;
            }
        }

        // 2. Drain landmark frames
        loop {
            match frames.try_recv() {
                Ok(frame) => { app.handle_frame(&frame, Instant::now()); }
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => break 'frame,
            }
        }

        // 3. Speech in and out
        app.pump_phrases();
        app.pump_speech();

        // 4. Render
        let canvas = app.compose(width, height, Instant::now());
        vis.present(canvas)?;
    }

    app.shutdown();
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
