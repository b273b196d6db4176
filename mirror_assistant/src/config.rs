//! Runtime configuration: TOML file, then command-line overrides.
//!
//! ```toml
//! language         = "auto"     # auto | ro | en
//! voice_enabled    = true
//! theme            = "dark"     # dark | light
//! accent           = "#0066FF"
//! avatar_width_pct = 28.0       # clamped to 18..=45
//! captures_dir     = "captures"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};

use avatar_panel::{Rgb, Theme, ThemeMode};

use crate::error::{AssistantError, Result};
use crate::lang::LanguageMode;

pub const MIN_AVATAR_PCT: f32 = 18.0;
pub const MAX_AVATAR_PCT: f32 = 45.0;
/// Longest accepted reaction cooldown (one hour).
pub const MAX_COOLDOWN_SECS: f32 = 3600.0;

// ════════════════════════════════════════════════════════════════════════════
// Command line
// ════════════════════════════════════════════════════════════════════════════

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "mirror_assistant", version, about = "Gesture-reactive avatar assistant")]
pub struct Args {
    /// TOML configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Listener language
    #[arg(long, value_enum)]
    pub lang: Option<LanguageMode>,

    /// Colour theme (dark or light)
    #[arg(long)]
    pub theme: Option<ThemeMode>,

    /// Accent colour as #RRGGBB
    #[arg(long)]
    pub accent: Option<String>,

    /// Start with spoken feedback off
    #[arg(long)]
    pub no_voice: bool,

    /// Skip the config file and use defaults
    #[arg(long)]
    pub quick: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// AssistantConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub language:           LanguageMode,
    pub voice_enabled:      bool,
    pub help_overlay:       bool,
    pub avatar_enabled:     bool,
    pub theme:              ThemeMode,
    pub accent:             String,
    pub avatar_width_pct:   f32,
    pub captures_dir:       PathBuf,
    pub window_width:       usize,
    pub window_height:      usize,
    pub log_level:          String,
    pub hand_cooldown_secs: f32,
    pub face_cooldown_secs: f32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        AssistantConfig {
            language:           LanguageMode::Auto,
            voice_enabled:      true,
            help_overlay:       true,
            avatar_enabled:     true,
            theme:              ThemeMode::Dark,
            accent:             "#0066FF".to_string(),
            avatar_width_pct:   28.0,
            captures_dir:       PathBuf::from("captures"),
            window_width:       960,
            window_height:      640,
            log_level:          "info".to_string(),
            hand_cooldown_secs: 2.5,
            face_cooldown_secs: 3.0,
        }
    }
}

impl AssistantConfig {
    /// Read and validate a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| AssistantError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: AssistantConfig = toml::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// File (unless `--quick`) plus flag overrides, validated.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut cfg = match (&args.config, args.quick) {
            (Some(path), false) => AssistantConfig::load(path)?,
            _ => AssistantConfig::default(),
        };
        cfg.apply_args(args);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(lang) = args.lang {
            self.language = lang;
        }
        if let Some(theme) = args.theme {
            self.theme = theme;
        }
        if let Some(accent) = &args.accent {
            self.accent = accent.clone();
        }
        if args.no_voice {
            self.voice_enabled = false;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(AssistantError::InvalidConfig(msg));

        if self.window_width < 160 || self.window_height < 120 {
            return invalid(format!(
                "window {}x{} is too small (min 160x120)",
                self.window_width, self.window_height
            ));
        }
        if self.window_width > 7680 || self.window_height > 4320 {
            return invalid("window too large (max 7680x4320)".to_string());
        }
        if !self.avatar_width_pct.is_finite() {
            return invalid("avatar_width_pct must be a number".to_string());
        }
        for (name, secs) in [("hand", self.hand_cooldown_secs), ("face", self.face_cooldown_secs)] {
            if !secs.is_finite() || !(0.0..=MAX_COOLDOWN_SECS).contains(&secs) {
                return invalid(format!("{name}_cooldown_secs must be within 0..={MAX_COOLDOWN_SECS}"));
            }
        }
        if self.log_level.trim().is_empty() {
            return invalid("log_level must not be empty".to_string());
        }
        Rgb::from_hex(&self.accent)?;
        Ok(())
    }

    /// Avatar panel width as a fraction of the window, within 18–45 %.
    pub fn avatar_fraction(&self) -> f32 {
        self.avatar_width_pct.clamp(MIN_AVATAR_PCT, MAX_AVATAR_PCT) / 100.0
    }

    pub fn initial_theme(&self) -> Result<Theme> {
        Ok(Theme::new(self.theme, Rgb::from_hex(&self.accent)?))
    }

    pub fn hand_cooldown(&self) -> Duration { cooldown(self.hand_cooldown_secs) }
    pub fn face_cooldown(&self) -> Duration { cooldown(self.face_cooldown_secs) }
}

/// Seconds to a `Duration`, capped at [`MAX_COOLDOWN_SECS`]; negative is zero.
fn cooldown(secs: f32) -> Duration {
    Duration::try_from_secs_f32(secs.min(MAX_COOLDOWN_SECS)).unwrap_or(Duration::ZERO)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let cfg = AssistantConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.hand_cooldown(), Duration::from_millis(2500));
        assert_eq!(cfg.face_cooldown(), Duration::from_secs(3));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "language = \"ro\"\ntheme = \"light\"\naccent = \"#FF8800\"").unwrap();
        let cfg = AssistantConfig::load(f.path()).unwrap();
        assert_eq!(cfg.language, LanguageMode::Ro);
        assert_eq!(cfg.theme, ThemeMode::Light);
        assert!(cfg.voice_enabled);
        assert_eq!(cfg.initial_theme().unwrap().accent, Rgb(0xFF, 0x88, 0x00));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AssistantConfig::load(Path::new("/nonexistent/assistant.toml")).unwrap_err();
        assert!(matches!(err, AssistantError::ConfigIo { .. }));
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "voice_enabled = \"maybe\"").unwrap();
        let err = AssistantConfig::load(f.path()).unwrap_err();
        assert!(matches!(err, AssistantError::ConfigParse(_)));
    }

    #[test]
    fn bad_accent_is_rejected() {
        let cfg = AssistantConfig { accent: "blue".into(), ..AssistantConfig::default() };
        assert!(matches!(cfg.validate(), Err(AssistantError::Theme(_))));
    }

    #[test]
    fn tiny_window_is_rejected() {
        let cfg = AssistantConfig { window_width: 10, ..AssistantConfig::default() };
        assert!(matches!(cfg.validate(), Err(AssistantError::InvalidConfig(_))));
    }

    #[test]
    fn huge_cooldown_is_rejected_and_never_panics() {
        let cfg = AssistantConfig { hand_cooldown_secs: 1e30, ..AssistantConfig::default() };
        assert!(matches!(cfg.validate(), Err(AssistantError::InvalidConfig(_))));
        assert_eq!(cfg.hand_cooldown(), Duration::from_secs(3600));

        let cfg = AssistantConfig { face_cooldown_secs: -1.0, ..AssistantConfig::default() };
        assert!(matches!(cfg.validate(), Err(AssistantError::InvalidConfig(_))));
        assert_eq!(cfg.face_cooldown(), Duration::ZERO);

        let edge = AssistantConfig { face_cooldown_secs: MAX_COOLDOWN_SECS, ..AssistantConfig::default() };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn flags_override_file() {
        let args = Args {
            lang: Some(LanguageMode::En),
            theme: Some(ThemeMode::Light),
            accent: Some("#123456".into()),
            no_voice: true,
            quick: true,
            ..Args::default()
        };
        let cfg = AssistantConfig::from_args(&args).unwrap();
        assert_eq!(cfg.language, LanguageMode::En);
        assert_eq!(cfg.theme, ThemeMode::Light);
        assert_eq!(cfg.accent, "#123456");
        assert!(!cfg.voice_enabled);
    }

    #[test]
    fn avatar_width_is_clamped() {
        let wide = AssistantConfig { avatar_width_pct: 90.0, ..AssistantConfig::default() };
        assert!((wide.avatar_fraction() - 0.45).abs() < 1e-6);
        let narrow = AssistantConfig { avatar_width_pct: 1.0, ..AssistantConfig::default() };
        assert!((narrow.avatar_fraction() - 0.18).abs() < 1e-6);
    }

    #[test]
    fn args_parse_from_command_line() {
        let args = Args::parse_from(["mirror_assistant", "--lang", "ro", "--theme", "light", "--no-voice"]);
        assert_eq!(args.lang, Some(LanguageMode::Ro));
        assert_eq!(args.theme, Some(ThemeMode::Light));
        assert!(args.no_voice);
    }
}
