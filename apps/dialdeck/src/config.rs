//! # Configuration
//!
//! Optional TOML configuration for the deck. Every key has a default, so
//! running without a file behaves like the built-in deck.
//!
//! ```toml
//! palette = ["#FF6B6B", "#4ECDC4"]
//!
//! [shuffle]
//! steps = 20
//! base_delay_ms = 40
//! delay_step_ms = 20
//!
//! [dialer]
//! program = "xdg-open"
//!
//! [seed]
//! builtin = true
//! file = "contacts.csv"
//! ```

use dialdeck_core::primitives::{SHUFFLE_BASE_DELAY_MS, SHUFFLE_DELAY_STEP_MS, SHUFFLE_STEPS};
use dialdeck_core::{DialdeckError, Palette, ShuffleSchedule};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Maximum size of a configuration file (64 KB).
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

/// `[shuffle]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShuffleSection {
    pub steps: usize,
    pub base_delay_ms: u64,
    pub delay_step_ms: u64,
}

impl Default for ShuffleSection {
    fn default() -> Self {
        Self {
            steps: SHUFFLE_STEPS,
            base_delay_ms: SHUFFLE_BASE_DELAY_MS,
            delay_step_ms: SHUFFLE_DELAY_STEP_MS,
        }
    }
}

/// `[dialer]` section. Without a program, calls are only logged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DialerSection {
    pub program: Option<String>,
}

/// `[seed]` section: what the store holds at start-up.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedSection {
    pub builtin: bool,
    pub file: Option<PathBuf>,
}

impl Default for SeedSection {
    fn default() -> Self {
        Self {
            builtin: true,
            file: None,
        }
    }
}

/// Whole configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeckConfig {
    pub palette: Option<Vec<String>>,
    pub shuffle: ShuffleSection,
    pub dialer: DialerSection,
    pub seed: SeedSection,
}

impl DeckConfig {
    /// Load from `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, DialdeckError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let metadata = std::fs::metadata(path).map_err(|e| {
            DialdeckError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(DialdeckError::Config(format!(
                "Config file {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            DialdeckError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(text: &str) -> Result<Self, DialdeckError> {
        let config: Self = toml::from_str(text).map_err(|e| DialdeckError::Config(e.to_string()))?;
        config.schedule()?;
        config.palette()?;
        Ok(config)
    }

    /// The shuffle schedule this configuration describes.
    pub fn schedule(&self) -> Result<ShuffleSchedule, DialdeckError> {
        ShuffleSchedule::new(
            self.shuffle.steps,
            self.shuffle.base_delay_ms,
            self.shuffle.delay_step_ms,
        )
    }

    /// The palette this configuration describes.
    pub fn palette(&self) -> Result<Palette, DialdeckError> {
        match &self.palette {
            Some(colors) => Palette::new(colors.clone()),
            None => Ok(Palette::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = DeckConfig::from_toml("").expect("parse");
        assert_eq!(config.schedule().expect("schedule"), ShuffleSchedule::default());
        assert_eq!(config.palette().expect("palette"), Palette::default());
        assert!(config.seed.builtin);
        assert!(config.dialer.program.is_none());
    }

    #[test]
    fn sections_override_defaults() {
        let text = r##"
palette = ["#000000"]

[shuffle]
steps = 5
base_delay_ms = 10

[dialer]
program = "xdg-open"

[seed]
builtin = false
file = "people.csv"
"##;
        let config = DeckConfig::from_toml(text).expect("parse");
        let schedule = config.schedule().expect("schedule");
        assert_eq!(schedule.steps, 5);
        assert_eq!(schedule.base_delay_ms, 10);
        assert_eq!(schedule.delay_step_ms, SHUFFLE_DELAY_STEP_MS);
        assert_eq!(config.palette().expect("palette").colors(), ["#000000"]);
        assert_eq!(config.dialer.program.as_deref(), Some("xdg-open"));
        assert!(!config.seed.builtin);
        assert_eq!(config.seed.file, Some(PathBuf::from("people.csv")));
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(matches!(
            DeckConfig::from_toml("palette = []"),
            Err(DialdeckError::Config(_))
        ));
        assert!(matches!(
            DeckConfig::from_toml("[shuffle]\nsteps = 0"),
            Err(DialdeckError::Config(_))
        ));
        assert!(matches!(
            DeckConfig::from_toml("[shuffle]\nsteps = 4000000000"),
            Err(DialdeckError::Config(_))
        ));
        assert!(matches!(
            DeckConfig::from_toml("[shuffle]\nspeed = 3"),
            Err(DialdeckError::Config(_))
        ));
    }

    #[test]
    fn missing_path_uses_defaults() {
        let config = DeckConfig::load(None).expect("defaults");
        assert!(config.palette.is_none());
    }
}
