//! Voice command parsing and dispatch.
//!
//! Utterances are lower-cased and trimmed, then matched against command
//! families in a fixed priority order; the first match wins:
//!
//! | # | Command | Trigger |
//! |---|---|---|
//! | 1 | screenshot | contains "screenshot", "fa un screenshot", "salvează imaginea", … |
//! | 2 | open YouTube | contains "open youtube" / "deschide youtube" |
//! | 3 | play music | prefix "play ", "muzica ", "pune melodia ", … |
//! | 4 | Google / YouTube search | prefix "google ", "search ", "cauta pe youtube ", … |
//! | 5 | open site | prefix "open ", "deschide ", "go to ", … |
//! | 6 | theme | prefix "set theme to ", "schimbă tema în ", "tema ", … |
//! | 7 | accent | contains "accent" and a `#rrggbb` token |
//!
//! Greetings and anything else fall through unconsumed, leaving the phrase
//! to small talk.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::OnceLock;

use chrono::Local;
use image::RgbImage;
use regex::Regex;
use tracing::{info, warn};

use avatar_panel::{Canvas, Rgb, ThemeMode};

use crate::error::{AssistantError, Result};

// ════════════════════════════════════════════════════════════════════════════
// Vocabulary
// ════════════════════════════════════════════════════════════════════════════

const SCREENSHOT_KEYWORDS: [&str; 8] = [
    "screenshot", "screen shot", "take a screenshot",
    "fa un screenshot", "fă un screenshot", "fa screenshot",
    "salveaza imaginea", "salvează imaginea",
];
const YOUTUBE_HOME_KEYWORDS: [&str; 2] = ["open youtube", "deschide youtube"];
const MUSIC_PREFIXES: [&str; 5] = ["muzica ", "muzică ", "pune melodia ", "play music ", "play "];
const GOOGLE_PREFIXES: [&str; 7] = [
    "cauta pe google ", "caută pe google ", "căutare google ",
    "google ", "search google ", "search for ", "search ",
];
const YOUTUBE_PREFIXES: [&str; 4] = ["cauta pe youtube ", "caută pe youtube ", "youtube ", "search youtube "];
// Longer prefixes first so "open site x" opens x, not "site x".
const SITE_PREFIXES: [&str; 6] = [
    "deschide pagina ", "deschide site ", "deschide ",
    "open site ", "open ", "go to ",
];
const SITE_EXCLUDED: [&str; 3] = ["youtube", "muzica", "google"];
const THEME_PREFIXES: [&str; 7] = [
    "schimba tema in ", "schimbă tema în ",
    "seteaza tema pe ", "setează tema pe ",
    "set theme to ", "switch theme to ", "tema ",
];

// ════════════════════════════════════════════════════════════════════════════
// Command
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Screenshot,
    OpenYoutube,
    PlayMusic(String),
    GoogleSearch(String),
    YoutubeSearch(String),
    OpenSite(String),
    SetTheme(ThemeMode),
    SetAccent(Rgb),
}

/// Non-empty remainder after the first matching prefix.
fn strip_any<'t>(t: &'t str, prefixes: &[&str]) -> Option<&'t str> {
    prefixes.iter()
        .filter_map(|p| t.strip_prefix(p))
        .map(str::trim)
        .find(|rest| !rest.is_empty())
}

fn theme_word(word: &str) -> Option<ThemeMode> {
    match word {
        "dark" | "intunecat" | "întunecat" | "noapte" => Some(ThemeMode::Dark),
        "light" | "luminos" | "zi" | "alb"            => Some(ThemeMode::Light),
        _ => None,
    }
}

fn accent_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)#([0-9a-f]{6})").ok()).as_ref()
}

/// Recognize a command in an utterance, or `None` to leave it to small talk.
pub fn parse_command(text: &str) -> Option<Command> {
    let lowered = text.to_lowercase();
    let t = lowered.trim();
    if t.is_empty() {
        return None;
    }

    if SCREENSHOT_KEYWORDS.iter().any(|k| t.contains(k)) {
        return Some(Command::Screenshot);
    }
    if YOUTUBE_HOME_KEYWORDS.iter().any(|k| t.contains(k)) {
        return Some(Command::OpenYoutube);
    }
    if let Some(title) = strip_any(t, &MUSIC_PREFIXES) {
        return Some(Command::PlayMusic(title.to_string()));
    }
    if let Some(q) = strip_any(t, &GOOGLE_PREFIXES) {
        return Some(Command::GoogleSearch(q.to_string()));
    }
    if let Some(q) = strip_any(t, &YOUTUBE_PREFIXES) {
        return Some(Command::YoutubeSearch(q.to_string()));
    }
    if let Some(site) = strip_any(t, &SITE_PREFIXES) {
        if !SITE_EXCLUDED.iter().any(|x| site.starts_with(x)) {
            return Some(Command::OpenSite(site.to_string()));
        }
    }
    if let Some(mode) = THEME_PREFIXES.iter()
        .filter_map(|p| t.strip_prefix(p))
        .find_map(|rest| theme_word(rest.trim()))
    {
        return Some(Command::SetTheme(mode));
    }
    if t.contains("accent") {
        if let Some(accent) = accent_regex()
            .and_then(|re| re.captures(t))
            .and_then(|c| c.get(0))
            .and_then(|m| Rgb::from_hex(m.as_str()).ok())
        {
            return Some(Command::SetAccent(accent));
        }
    }
    None
}

// ════════════════════════════════════════════════════════════════════════════
// URLs
// ════════════════════════════════════════════════════════════════════════════

pub const YOUTUBE_HOME: &str = "https://www.youtube.com/";

/// Form-style query encoding: spaces become `+`.
pub fn quote_plus(s: &str) -> String {
    urlencoding::encode(s.trim()).replace("%20", "+")
}

pub fn youtube_search_url(query: &str) -> String {
    format!("https://www.youtube.com/results?search_query={}", quote_plus(query))
}

pub fn google_search_url(query: &str) -> String {
    format!("https://www.google.com/search?q={}", quote_plus(query))
}

/// `"github"` → `https://github.com`, `"docs.rs"` → `https://docs.rs`;
/// explicit schemes are kept. `None` for blank input.
pub fn normalize_site(site: &str) -> Option<String> {
    let u = site.trim().to_lowercase();
    if u.is_empty() {
        return None;
    }
    if u.starts_with("http://") || u.starts_with("https://") {
        return Some(u);
    }
    let host = if u.contains('.') { u } else { format!("{u}.com") };
    Some(format!("https://{host}"))
}

// ════════════════════════════════════════════════════════════════════════════
// Host seam
// ════════════════════════════════════════════════════════════════════════════

/// Side effects a command can have on the running application.
pub trait CommandHost {
    /// The most recently composed frame, if any.
    fn frame(&self) -> Option<&Canvas>;
    fn open_url(&mut self, url: &str) -> Result<()>;
    fn apply_theme(&mut self, mode: ThemeMode);
    fn apply_accent(&mut self, accent: Rgb);
    /// User-visible log line (history and log pane).
    fn log(&mut self, msg: &str);
}

/// Opens URLs somewhere a user can see them.
pub trait UrlOpener: Send {
    fn open(&self, url: &str) -> Result<()>;
}

/// The platform's default browser, via its "open" helper.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemBrowser;

impl UrlOpener for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = process::Command::new("cmd");
            c.args(["/C", "start", ""]);
            c
        } else if cfg!(target_os = "macos") {
            process::Command::new("open")
        } else {
            process::Command::new("xdg-open")
        };
        cmd.arg(url)
            .stdout(process::Stdio::null())
            .stderr(process::Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(|e| AssistantError::Browser { url: url.to_string(), reason: e.to_string() })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CommandCenter
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct CommandCenter {
    captures_dir: PathBuf,
}

impl CommandCenter {
    pub fn new(captures_dir: impl Into<PathBuf>) -> Self {
        CommandCenter { captures_dir: captures_dir.into() }
    }

    pub fn captures_dir(&self) -> &Path { &self.captures_dir }

    /// Parse and execute. Returns whether the utterance was a command.
    pub fn dispatch(&self, text: &str, host: &mut dyn CommandHost) -> bool {
        let Some(cmd) = parse_command(text) else { return false };
        info!(?cmd, "voice command");
        self.execute(cmd, host);
        true
    }

    pub fn execute(&self, cmd: Command, host: &mut dyn CommandHost) {
        match cmd {
            Command::Screenshot => {
                let saved = match host.frame() {
                    None        => None,
                    Some(frame) => Some(self.take_screenshot(frame)),
                };
                match saved {
                    None            => host.log("Screenshot: no frame available."),
                    Some(Ok(path))  => host.log(&format!("Screenshot saved: {}", path.display())),
                    Some(Err(e))    => {
                        warn!(error = %e, "screenshot failed");
                        host.log(&format!("Screenshot failed: {e}"));
                    }
                }
            }
            Command::OpenYoutube => {
                open_logged(host, YOUTUBE_HOME, "Opening YouTube.".to_string());
            }
            Command::PlayMusic(title) | Command::YoutubeSearch(title) => {
                open_logged(host, &youtube_search_url(&title), format!("Searching YouTube: {title}"));
            }
            Command::GoogleSearch(q) => {
                open_logged(host, &google_search_url(&q), format!("Searching Google: {q}"));
            }
            Command::OpenSite(site) => {
                if let Some(url) = normalize_site(&site) {
                    open_logged(host, &url, format!("Opening site: {site}"));
                }
            }
            Command::SetTheme(mode) => {
                host.apply_theme(mode);
                host.log(&format!("Theme -> {mode}"));
            }
            Command::SetAccent(accent) => {
                host.apply_accent(accent);
                host.log(&format!("Accent -> {accent}"));
            }
        }
    }

    /// Write `frame` as `screenshot_YYYYmmdd_HHMMSS.png` under the captures
    /// directory, creating it if needed. Returns the written path.
    pub fn take_screenshot(&self, frame: &Canvas) -> Result<PathBuf> {
        fs::create_dir_all(&self.captures_dir)?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let mut path = self.captures_dir.join(format!("screenshot_{stamp}.png"));
        let mut n = 1;
        while path.exists() {
            path = self.captures_dir.join(format!("screenshot_{stamp}_{n}.png"));
            n += 1;
        }
        canvas_to_image(frame).save(&path)?;
        info!(path = %path.display(), "screenshot saved");
        Ok(path)
    }
}

fn open_logged(host: &mut dyn CommandHost, url: &str, msg: String) {
    match host.open_url(url) {
        Ok(())  => host.log(&msg),
        Err(e)  => {
            warn!(error = %e, "cannot open url");
            host.log(&format!("Cannot open {url}"));
        }
    }
}

/// Drop the alpha byte and reorder into an RGB image.
pub fn canvas_to_image(canvas: &Canvas) -> RgbImage {
    RgbImage::from_fn(canvas.width() as u32, canvas.height() as u32, |x, y| {
        let px = canvas.pixel(x as usize, y as usize).unwrap_or(0);
        let Rgb(r, g, b) = Rgb::from_argb(px);
        image::Rgb([r, g, b])
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
