//! End-to-end: synthetic landmark frames through perception, the reaction
//! scheduler, speech and the composed frame.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use mirror_assistant::source::{SimInput, SimKey, SimPose};
use mirror_assistant::speech::Phrase;
use mirror_assistant::{AppState, AssistantConfig, Lang, Result, Speaker, SpeechEngine, UrlOpener};

#[derive(Clone, Default)]
struct Transcript(Arc<Mutex<Vec<String>>>);

impl SpeechEngine for Transcript {
    fn say(&mut self, text: &str) -> Result<()> {
        self.0.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

impl UrlOpener for Transcript {
    fn open(&self, url: &str) -> Result<()> {
        self.0.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

fn spoken(t: &Transcript, n: usize) -> Vec<String> {
    for _ in 0..400 {
        let v = t.0.lock().unwrap().clone();
        if v.len() >= n {
            return v;
        }
        thread::sleep(Duration::from_millis(5));
    }
    t.0.lock().unwrap().clone()
}

fn assistant(cfg: AssistantConfig) -> (AppState, Transcript, Transcript) {
    let voice = Transcript::default();
    let browser = Transcript::default();
    let speaker = Speaker::spawn(voice.clone()).unwrap();
    let app = AppState::new(&cfg, speaker, None, Box::new(browser.clone()), StdRng::seed_from_u64(1)).unwrap();
    (app, voice, browser)
}

#[test]
fn held_smile_refires_after_face_cooldown() {
    let (mut app, voice, _) = assistant(AssistantConfig::default());
    let mut pose = SimPose::default();
    pose.apply(SimInput::KeyDown(SimKey::Smile));

    // 7 s of frames at 10 fps → fires at 0, 3.1, 6.2 s.
    let t0 = Instant::now();
    let mut fired = 0;
    for i in 0..70 {
        fired += app.handle_frame(&pose.frame(640, 480), t0 + Duration::from_millis(i * 100)).len();
    }
    assert_eq!(fired, 3);
    assert_eq!(spoken(&voice, 3), vec!["Nice smile!"; 3]);
    assert_eq!(app.history.len(), 3);
}

#[test]
fn gestures_follow_the_conversation_language() {
    let (mut app, voice, _) = assistant(AssistantConfig::default());
    app.handle_phrase(Phrase { text: "salut".into(), lang: Lang::Ro });

    let mut pose = SimPose::default();
    pose.apply(SimInput::KeyDown(SimKey::ThumbsUp));
    let out = app.handle_frame(&pose.frame(640, 480), Instant::now());

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].phrase, "Bravo!");
    assert_eq!(spoken(&voice, 2).last().map(String::as_str), Some("Bravo!"));
}

#[test]
fn voice_screenshot_writes_the_composed_frame() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = AssistantConfig { captures_dir: dir.path().to_path_buf(), ..AssistantConfig::default() };
    let (mut app, _, _) = assistant(cfg);

    let mut pose = SimPose::default();
    pose.apply(SimInput::KeyDown(SimKey::OkSign));
    app.handle_frame(&pose.frame(480, 320), Instant::now());
    app.compose(480, 320, Instant::now());

    assert!(app.handle_phrase(Phrase { text: "Fă un screenshot".into(), lang: Lang::Ro }).is_none());
    let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().path()).collect();
    assert_eq!(files.len(), 1);
    let img = image::open(&files[0]).unwrap();
    assert_eq!((img.width(), img.height()), (480, 320));
    assert!(app.history.last().unwrap().contains("Screenshot saved: "));
}

#[test]
fn site_command_opens_normalized_url() {
    let (mut app, voice, browser) = assistant(AssistantConfig::default());
    app.handle_phrase(Phrase { text: "open github".into(), lang: Lang::En });
    assert_eq!(*browser.0.lock().unwrap(), vec!["https://github.com".to_string()]);
    app.shutdown();
    assert!(voice.0.lock().unwrap().is_empty());
}

#[test]
fn face_leaving_the_frame_does_not_reset_cooldown() {
    let (mut app, _, _) = assistant(AssistantConfig::default());
    let mut pose = SimPose::default();
    pose.apply(SimInput::KeyDown(SimKey::BrowRaise));
    let t0 = Instant::now();
    assert_eq!(app.handle_frame(&pose.frame(640, 480), t0).len(), 1);

    pose.apply(SimInput::KeyDown(SimKey::ToggleFace));
    assert!(app.handle_frame(&pose.frame(640, 480), t0 + Duration::from_secs(1)).is_empty());
    pose.apply(SimInput::KeyDown(SimKey::ToggleFace));
    assert!(app.handle_frame(&pose.frame(640, 480), t0 + Duration::from_secs(2)).is_empty());
    assert_eq!(app.handle_frame(&pose.frame(640, 480), t0 + Duration::from_millis(3100)).len(), 1);
}
