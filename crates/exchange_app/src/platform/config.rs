use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use exchange_core::Translations;
use exchange_engine::{MarkupSelectors, PollSchedule, TransportSettings, DEFAULT_POLL_FREQUENCY};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILENAME: &str = "exchange.ron";

/// Settings supplied once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub poll_url: String,
    pub reply_url: String,
    pub status_url: String,
    pub token: String,
    /// Below 1000 this is seconds, otherwise milliseconds.
    pub poll_frequency: u64,
    pub markup_path: Option<PathBuf>,
    /// Encoding label for the markup file; otherwise taken from the document.
    pub markup_charset: Option<String>,
    pub exchange_selector: String,
    pub translations: Translations,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poll_url: String::new(),
            reply_url: String::new(),
            status_url: String::new(),
            token: String::new(),
            poll_frequency: DEFAULT_POLL_FREQUENCY,
            markup_path: None,
            markup_charset: None,
            exchange_selector: MarkupSelectors::default().exchange,
            translations: Translations::default(),
            log_file: None,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_frequency == 0 {
            bail!("poll_frequency must be greater than zero");
        }
        if self.exchange_selector.trim().is_empty() {
            bail!("exchange_selector must not be empty");
        }
        Ok(())
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            reply_url: self.reply_url.clone(),
            status_url: self.status_url.clone(),
            token: self.token.clone(),
            ..TransportSettings::default()
        }
    }

    /// `None` when no poll endpoint is configured.
    pub fn poll_schedule(&self) -> Option<PollSchedule> {
        if self.poll_url.trim().is_empty() {
            return None;
        }
        Some(PollSchedule::new(self.poll_url.clone(), self.poll_frequency))
    }

    pub fn markup_selectors(&self) -> MarkupSelectors {
        MarkupSelectors {
            exchange: self.exchange_selector.clone(),
            ..MarkupSelectors::default()
        }
    }
}

/// Loads the RON config at `path`. Returns `Ok(None)` when the file does not exist.
pub fn load_config(path: &Path) -> anyhow::Result<Option<AppConfig>> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config {:?}", path));
        }
    };

    let config: AppConfig =
        ron::from_str(&content).with_context(|| format!("failed to parse config {:?}", path))?;
    config.validate()?;
    Ok(Some(config))
}
