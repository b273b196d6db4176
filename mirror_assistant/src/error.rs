//! Error type for the assistant binary and its workers.

use std::io;
use std::path::PathBuf;

use avatar_panel::ThemeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("cannot read config {path}: {source}")]
    ConfigIo {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Theme(#[from] ThemeError),

    #[error("window error: {0}")]
    Window(String),

    #[error("screenshot encode failed: {0}")]
    Screenshot(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("speech synthesis failed: {0}")]
    Speech(String),

    #[error("speech recognition failed: {0}")]
    Recognition(String),

    #[error("cannot open {url}: {reason}")]
    Browser { url: String, reason: String },
}

pub type Result<T> = std::result::Result<T, AssistantError>;
