//! Landmark sources: anything that produces a [`Frame`] per video frame.
//!
//! The public interface is a stream of frames delivered over an `mpsc`
//! channel. Consumers don't care whether frames came from a detection model
//! or from the keyboard simulator.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use landmark_sense::synth::{self, FacePose, HandPose};
use landmark_sense::{Frame, Point};

/// Frame interval of the simulator (~30 fps).
pub const SIM_FRAME_PERIOD: Duration = Duration::from_millis(33);

/// Gaze magnitude while an arrow key is held.
const SIM_GAZE: f32 = 0.8;

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait: unified interface for model and simulator
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver landmark [`Frame`]s over a channel.
pub trait LandmarkSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<Frame>);
}

/// Spawn a landmark source on its own thread and return the receiving end.
pub fn spawn_landmark_source<S: LandmarkSource>(source: S) -> Receiver<Frame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// Simulation input
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    KeyDown(SimKey),
    KeyUp(SimKey),
}

/// Simulated pose keys (mapped from window keys).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    OkSign,     // O (held)
    ThumbsUp,   // U (held)
    Smile,      // S (held)
    BrowRaise,  // B (held)
    GazeLeft,   // ←
    GazeRight,  // →
    GazeUp,     // ↑
    GazeDown,   // ↓
    ToggleHand, // X
    ToggleFace, // Z
}

/// Pose state accumulated from key transitions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimPose {
    pub ok:         bool,
    pub thumbs_up:  bool,
    pub smile:      bool,
    pub brow_raise: bool,
    pub gaze:       (f32, f32),
    pub show_hand:  bool,
    pub show_face:  bool,
}

impl Default for SimPose {
    fn default() -> Self {
        SimPose {
            ok:         false,
            thumbs_up:  false,
            smile:      false,
            brow_raise: false,
            gaze:       (0.0, 0.0),
            show_hand:  true,
            show_face:  true,
        }
    }
}

impl SimPose {
    pub fn apply(&mut self, input: SimInput) {
        let (key, down) = match input {
            SimInput::KeyDown(k) => (k, true),
            SimInput::KeyUp(k)   => (k, false),
        };
        let axis = if down { SIM_GAZE } else { 0.0 };
        match key {
            SimKey::OkSign     => self.ok = down,
            SimKey::ThumbsUp   => self.thumbs_up = down,
            SimKey::Smile      => self.smile = down,
            SimKey::BrowRaise  => self.brow_raise = down,
            SimKey::GazeLeft   => self.gaze.0 = -axis,
            SimKey::GazeRight  => self.gaze.0 = axis,
            SimKey::GazeUp     => self.gaze.1 = -axis,
            SimKey::GazeDown   => self.gaze.1 = axis,
            SimKey::ToggleHand if down => self.show_hand = !self.show_hand,
            SimKey::ToggleFace if down => self.show_face = !self.show_face,
            SimKey::ToggleHand | SimKey::ToggleFace => {}
        }
    }

    pub fn hand_pose(&self) -> HandPose {
        if self.thumbs_up {
            HandPose::ThumbsUp
        } else if self.ok {
            HandPose::Ok
        } else {
            HandPose::Relaxed
        }
    }

    /// Synthetic landmarks for this pose in a `width × height` camera view.
    pub fn frame(&self, width: usize, height: usize) -> Frame {
        let (w, h) = (width as f32, height as f32);
        let span = w.min(h);
        let hands = if self.show_hand {
            let wrist = Point::new(w * 0.22, h * 0.92);
            vec![synth::hand(self.hand_pose(), wrist, span * 0.18)]
        } else {
            Vec::new()
        };
        let face = self.show_face.then(|| {
            let pose = FacePose { smile: self.smile, brow_raise: self.brow_raise, gaze: self.gaze };
            synth::face(&pose, Point::new(w * 0.42, h * 0.48), span * 0.45)
        });
        Frame::new(hands, face)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkSource: keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Landmark source driven by [`SimInput`] events from the window.
///
/// Emits one frame per [`SIM_FRAME_PERIOD`] regardless of input rate, and
/// stops when the input side hangs up.
pub struct SimLandmarkSource {
    rx:     Receiver<SimInput>,
    pose:   SimPose,
    width:  usize,
    height: usize,
    period: Duration,
}

impl SimLandmarkSource {
    pub fn new(rx: Receiver<SimInput>, width: usize, height: usize) -> Self {
        SimLandmarkSource { rx, pose: SimPose::default(), width, height, period: SIM_FRAME_PERIOD }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }
}

impl LandmarkSource for SimLandmarkSource {
    fn run(mut self: Box<Self>, tx: Sender<Frame>) {
        let mut next = Instant::now();
        loop {
            let wait = next.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(wait) {
                Ok(input) => {
                    debug!(?input, "sim input");
                    self.pose.apply(input);
                }
                Err(RecvTimeoutError::Timeout) => {
                    if tx.send(self.pose.frame(self.width, self.height)).is_err() {
                        return;
                    }
                    next = Instant::now() + self.period;
                }
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
