//! Background speech workers.
//!
//! [`Speaker`] owns a synthesis thread fed by a queue; it reports
//! [`SpeakingEvent`]s back so the avatar can move its mouth. [`Listener`]
//! owns a recognition thread that delivers [`Phrase`]s. Both talk to the
//! frame loop over `mpsc` channels only.
//!
//! Shutdown is cooperative and bounded: raise the stop flag, enqueue a
//! sentinel, then wait at most [`STOP_TIMEOUT`] for the thread to report
//! that it has exited. A thread still blocked inside an engine after that
//! is detached.

use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{AssistantError, Result};
use crate::lang::{resolve_lang, Lang, LanguageMode};

/// Longest `stop()` waits for a worker to exit.
pub const STOP_TIMEOUT: Duration = Duration::from_millis(1500);
/// How often an idle speaker re-checks its stop flag.
const QUEUE_POLL: Duration = Duration::from_millis(500);
/// Recognizer listen window per cycle.
pub const LISTEN_TIMEOUT: Duration = Duration::from_secs(1);

// ════════════════════════════════════════════════════════════════════════════
// Worker: shared thread lifecycle
// ════════════════════════════════════════════════════════════════════════════

struct Worker {
    name:    &'static str,
    stop:    Arc<AtomicBool>,
    done_rx: Receiver<()>,
    handle:  Option<JoinHandle<()>>,
}

impl Worker {
    fn spawn<F>(name: &'static str, body: F) -> Result<Self>
    where
        F: FnOnce(Arc<AtomicBool>) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let (done_tx, done_rx) = mpsc::channel();
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                body(flag);
                let _ = done_tx.send(());
            })?;
        info!(worker = name, "started");
        Ok(Worker { name, stop, done_rx, handle: Some(handle) })
    }

    fn stopping(&self) -> bool { self.stop.load(Ordering::Relaxed) }

    fn stop(&mut self) {
        let Some(handle) = self.handle.take() else { return };
        self.stop.store(true, Ordering::Relaxed);
        match self.done_rx.recv_timeout(STOP_TIMEOUT) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if handle.join().is_err() {
                    warn!(worker = self.name, "worker panicked");
                }
                info!(worker = self.name, "stopped");
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(worker = self.name, "did not stop in time; detaching");
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Speaker
// ════════════════════════════════════════════════════════════════════════════

/// A text-to-speech backend. `say` blocks until the utterance is finished.
pub trait SpeechEngine: Send + 'static {
    fn say(&mut self, text: &str) -> Result<()>;
}

enum SpeakerMsg {
    Say(String),
    Shutdown,
}

/// Emitted around every utterance, whether or not the engine succeeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeakingEvent {
    Started,
    Finished,
}

pub struct Speaker {
    tx:     Sender<SpeakerMsg>,
    events: Receiver<SpeakingEvent>,
    worker: Worker,
}

impl Speaker {
    pub fn spawn<E: SpeechEngine>(engine: E) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let (event_tx, events) = mpsc::channel();
        let worker = Worker::spawn("speaker", move |stop| speaker_loop(engine, rx, event_tx, stop))?;
        Ok(Speaker { tx, events, worker })
    }

    /// Queue an utterance. Blank text is ignored.
    pub fn speak(&self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        let _ = self.tx.send(SpeakerMsg::Say(text.to_string()));
    }

    /// Drain pending speaking events (non-blocking).
    pub fn drain_events(&self) -> Vec<SpeakingEvent> {
        self.events.try_iter().collect()
    }

    pub fn stop(&mut self) {
        if self.worker.handle.is_some() {
            let _ = self.tx.send(SpeakerMsg::Shutdown);
        }
        self.worker.stop();
    }

    pub fn is_stopped(&self) -> bool { self.worker.stopping() }
}

impl Drop for Speaker {
    fn drop(&mut self) { self.stop(); }
}

fn speaker_loop<E: SpeechEngine>(
    mut engine: E,
    rx:         Receiver<SpeakerMsg>,
    events:     Sender<SpeakingEvent>,
    stop:       Arc<AtomicBool>,
) {
    while !stop.load(Ordering::Relaxed) {
        match rx.recv_timeout(QUEUE_POLL) {
            Ok(SpeakerMsg::Say(text)) => {
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                let _ = events.send(SpeakingEvent::Started);
                if let Err(e) = engine.say(&text) {
                    warn!(error = %e, "speech engine failed");
                }
                let _ = events.send(SpeakingEvent::Finished);
            }
            Ok(SpeakerMsg::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => continue,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Listener
// ════════════════════════════════════════════════════════════════════════════

/// A speech-to-text backend. Returns `Ok(None)` when nothing was heard
/// within `timeout`.
pub trait Recognizer: Send + 'static {
    fn listen(&mut self, timeout: Duration) -> Result<Option<String>>;
}

/// One recognized utterance and its language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Phrase {
    pub text: String,
    pub lang: Lang,
}

/// Language lock shared with the listener thread.
#[derive(Clone, Debug, Default)]
struct LangLock(Arc<AtomicU8>);

impl LangLock {
    fn set(&self, lang: Option<Lang>) {
        let v = match lang {
            None           => 0,
            Some(Lang::Ro) => 1,
            Some(Lang::En) => 2,
        };
        self.0.store(v, Ordering::Relaxed);
    }

    fn get(&self) -> Option<Lang> {
        match self.0.load(Ordering::Relaxed) {
            1 => Some(Lang::Ro),
            2 => Some(Lang::En),
            _ => None,
        }
    }
}

pub struct Listener {
    phrases: Receiver<Phrase>,
    lock:    LangLock,
    worker:  Worker,
}

impl Listener {
    pub fn spawn<R: Recognizer>(recognizer: R, mode: LanguageMode) -> Result<Self> {
        let (tx, phrases) = mpsc::channel();
        let lock = LangLock::default();
        lock.set(mode.lock());
        let shared = lock.clone();
        let worker = Worker::spawn("listener", move |stop| listener_loop(recognizer, tx, shared, stop))?;
        Ok(Listener { phrases, lock, worker })
    }

    pub fn set_language_lock(&self, lang: Option<Lang>) {
        self.lock.set(lang);
        info!(lock = ?lang, "language lock changed");
    }

    pub fn language_lock(&self) -> Option<Lang> { self.lock.get() }

    /// Drain recognized phrases (non-blocking).
    pub fn drain_phrases(&self) -> Vec<Phrase> {
        self.phrases.try_iter().collect()
    }

    pub fn stop(&mut self) { self.worker.stop(); }
}

impl Drop for Listener {
    fn drop(&mut self) { self.stop(); }
}

fn listener_loop<R: Recognizer>(
    mut recognizer: R,
    tx:             Sender<Phrase>,
    lock:           LangLock,
    stop:           Arc<AtomicBool>,
) {
    while !stop.load(Ordering::Relaxed) {
        match recognizer.listen(LISTEN_TIMEOUT) {
            Ok(Some(text)) if !text.trim().is_empty() => {
                let lang = resolve_lang(lock.get(), &text);
                debug!(%text, ?lang, "heard");
                if tx.send(Phrase { text, lang }).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "recognition failed"),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Console backends
// ════════════════════════════════════════════════════════════════════════════

/// Prints utterances and holds "speaking" for a time proportional to their
/// length, so lip-sync can be seen without a synthesizer.
#[derive(Clone, Copy, Debug)]
pub struct ConsoleVoice {
    per_word: Duration,
}

impl Default for ConsoleVoice {
    fn default() -> Self { ConsoleVoice { per_word: Duration::from_millis(250) } }
}

impl ConsoleVoice {
    pub fn new(per_word: Duration) -> Self { ConsoleVoice { per_word } }

    pub fn duration_for(&self, text: &str) -> Duration {
        let words = text.split_whitespace().count().max(1) as u32;
        self.per_word * words
    }
}

impl SpeechEngine for ConsoleVoice {
    fn say(&mut self, text: &str) -> Result<()> {
        println!("  🔊 {text}");
        thread::sleep(self.duration_for(text));
        Ok(())
    }
}

/// Treats each line typed on stdin as a recognized utterance.
pub struct StdinRecognizer {
    lines:  Receiver<String>,
    closed: bool,
}

impl StdinRecognizer {
    /// Start the blocking stdin reader thread.
    pub fn spawn() -> Result<Self> {
        let (tx, lines) = mpsc::channel();
        thread::Builder::new()
            .name("stdin".to_string())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    match line {
                        Ok(l) => {
                            if tx.send(l).is_err() { return; }
                        }
                        Err(_) => return,
                    }
                }
            })?;
        Ok(StdinRecognizer { lines, closed: false })
    }
}

impl Recognizer for StdinRecognizer {
    fn listen(&mut self, timeout: Duration) -> Result<Option<String>> {
        if self.closed {
            thread::sleep(timeout);
            return Ok(None);
        }
        match self.lines.recv_timeout(timeout) {
            Ok(line) => Ok(Some(line)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                self.closed = true;
                Err(AssistantError::Recognition("stdin closed".to_string()))
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Instant;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl SpeechEngine for Recorder {
        fn say(&mut self, text: &str) -> Result<()> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct Failing;
    impl SpeechEngine for Failing {
        fn say(&mut self, _text: &str) -> Result<()> {
            Err(AssistantError::Speech("no audio device".into()))
        }
    }

    struct Stuck;
    impl SpeechEngine for Stuck {
        fn say(&mut self, _text: &str) -> Result<()> {
            thread::sleep(Duration::from_secs(5));
            Ok(())
        }
    }

    struct Script(VecDeque<Result<Option<String>>>);
    impl Recognizer for Script {
        fn listen(&mut self, _timeout: Duration) -> Result<Option<String>> {
            match self.0.pop_front() {
                Some(r) => r,
                None => {
                    thread::sleep(Duration::from_millis(10));
                    Ok(None)
                }
            }
        }
    }

    fn wait_for<T>(mut poll: impl FnMut() -> Vec<T>, n: usize) -> Vec<T> {
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut out = Vec::new();
        while out.len() < n && Instant::now() < deadline {
            out.extend(poll());
            thread::sleep(Duration::from_millis(5));
        }
        out
    }

    #[test]
    fn speaker_brackets_each_utterance() {
        let rec = Recorder::default();
        let mut sp = Speaker::spawn(rec.clone()).unwrap();
        sp.speak("Nice!");
        sp.speak("   ");
        let events = wait_for(|| sp.drain_events(), 2);
        assert_eq!(events, vec![SpeakingEvent::Started, SpeakingEvent::Finished]);
        sp.stop();
        assert_eq!(*rec.0.lock().unwrap(), vec!["Nice!".to_string()]);
    }

    #[test]
    fn engine_failure_still_finishes() {
        let mut sp = Speaker::spawn(Failing).unwrap();
        sp.speak("hello");
        let events = wait_for(|| sp.drain_events(), 2);
        assert_eq!(events.last(), Some(&SpeakingEvent::Finished));
        sp.stop();
    }

    #[test]
    fn stop_is_bounded_when_engine_hangs() {
        let mut sp = Speaker::spawn(Stuck).unwrap();
        sp.speak("long");
        wait_for(|| sp.drain_events(), 1);
        let t0 = Instant::now();
        sp.stop();
        assert!(t0.elapsed() < STOP_TIMEOUT + Duration::from_millis(500));
    }

    #[test]
    fn idle_speaker_stops_promptly() {
        let mut sp = Speaker::spawn(Recorder::default()).unwrap();
        let t0 = Instant::now();
        sp.stop();
        assert!(t0.elapsed() < Duration::from_millis(600));
        sp.stop();
    }

    #[test]
    fn listener_tags_language_and_skips_errors() {
        let script = Script(VecDeque::from(vec![
            Ok(Some("salut".to_string())),
            Err(AssistantError::Recognition("noise".into())),
            Ok(None),
            Ok(Some("hello".to_string())),
        ]));
        let mut l = Listener::spawn(script, LanguageMode::Auto).unwrap();
        let phrases = wait_for(|| l.drain_phrases(), 2);
        l.stop();
        assert_eq!(phrases, vec![
            Phrase { text: "salut".into(), lang: Lang::Ro },
            Phrase { text: "hello".into(), lang: Lang::En },
        ]);
    }

    #[test]
    fn listener_honours_lock() {
        let script = Script(VecDeque::from(vec![Ok(Some("salut".to_string()))]));
        let mut l = Listener::spawn(script, LanguageMode::En).unwrap();
        assert_eq!(l.language_lock(), Some(Lang::En));
        let phrases = wait_for(|| l.drain_phrases(), 1);
        l.stop();
        assert_eq!(phrases[0].lang, Lang::En);
    }

    #[test]
    fn console_voice_scales_with_words() {
        let v = ConsoleVoice::new(Duration::from_millis(100));
        assert_eq!(v.duration_for("one two three"), Duration::from_millis(300));
        assert_eq!(v.duration_for(""), Duration::from_millis(100));
    }
}
