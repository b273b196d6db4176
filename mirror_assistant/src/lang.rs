//! Working language: Romanian or English.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Ro,
    #[default]
    En,
}

impl Lang {
    /// Two-letter tag, upper case, as shown in the HUD.
    pub fn tag(self) -> &'static str {
        match self {
            Lang::Ro => "RO",
            Lang::En => "EN",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ro" => Ok(Lang::Ro),
            "en" => Ok(Lang::En),
            other => Err(format!("unknown language {other:?}")),
        }
    }
}

/// Listener language setting: a fixed language, or per-phrase detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMode {
    #[default]
    Auto,
    Ro,
    En,
}

impl LanguageMode {
    /// The locked language, if any.
    pub fn lock(self) -> Option<Lang> {
        match self {
            LanguageMode::Auto => None,
            LanguageMode::Ro   => Some(Lang::Ro),
            LanguageMode::En   => Some(Lang::En),
        }
    }
}

const RO_MARKERS: [&str; 12] = [
    "salut", "buna", "bună", "captura", "ecran", "deschide",
    "youtube", "muzica", "căutare", "cauta", "accent", "tema",
];
const RO_DIACRITICS: &str = "ăâîșşțţ";

/// Best-guess language of a recognized phrase.
///
/// Any Romanian marker word or diacritic wins; everything else is English.
pub fn detect_lang(text: &str) -> Lang {
    let t = text.to_lowercase();
    if RO_MARKERS.iter().any(|m| t.contains(m)) || t.chars().any(|c| RO_DIACRITICS.contains(c)) {
        Lang::Ro
    } else {
        Lang::En
    }
}

/// Language for a phrase: the lock when set, else detection.
pub fn resolve_lang(lock: Option<Lang>, text: &str) -> Lang {
    lock.unwrap_or_else(|| detect_lang(text))
}
