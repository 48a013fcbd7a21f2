//! Launch settings
//!
//! Read from a JSON file named by `ARCADE_SETTINGS`, then overridden by
//! `ARCADE_TITLE` and `ARCADE_SEED`. Bad values are logged and ignored.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Environment variable naming a JSON settings file
pub const SETTINGS_PATH_VAR: &str = "ARCADE_SETTINGS";
/// Environment override for the title
pub const TITLE_VAR: &str = "ARCADE_TITLE";
/// Environment override for the RNG seed
pub const SEED_VAR: &str = "ARCADE_SEED";

/// Which game to launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Title {
    #[default]
    Shooter,
    Platformer,
    Snake,
}

impl Title {
    pub fn as_str(&self) -> &'static str {
        match self {
            Title::Shooter => "shooter",
            Title::Platformer => "platformer",
            Title::Snake => "snake",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "shooter" | "galaga" => Some(Title::Shooter),
            "platformer" | "scroller" => Some(Title::Platformer),
            "snake" => Some(Title::Snake),
            _ => None,
        }
    }
}

/// Launch settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Game to run
    pub title: Title,
    /// Fixed RNG seed; a time-derived seed is used when absent
    pub seed: Option<u64>,
    /// How long a terminal key press counts as held (ms)
    pub key_hold_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: Title::Shooter,
            seed: None,
            key_hold_ms: 120,
        }
    }
}

impl Settings {
    /// Load from the settings file (if any) and apply environment overrides
    pub fn load() -> Self {
        let mut settings = match std::env::var(SETTINGS_PATH_VAR) {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok());

        if let Err(e) = settings.validate() {
            log::warn!("Invalid settings ({}), using defaults", e);
            return Self::default();
        }
        settings
    }

    /// Read a JSON settings file, falling back to defaults
    pub fn from_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Could not parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Apply `ARCADE_TITLE` / `ARCADE_SEED` style overrides from a lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(title) = lookup(TITLE_VAR) {
            match Title::from_str(&title) {
                Some(parsed) => self.title = parsed,
                None => log::warn!("Invalid {} '{}', using {}", TITLE_VAR, title, self.title.as_str()),
            }
        }

        if let Some(seed) = lookup(SEED_VAR) {
            match seed.trim().parse::<u64>() {
                Ok(parsed) => self.seed = Some(parsed),
                Err(_) => log::warn!("Invalid {} '{}', ignoring", SEED_VAR, seed),
            }
        }
    }

    /// Validate after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.key_hold_ms == 0 {
            return Err("key_hold_ms must be at least 1".to_string());
        }
        if self.key_hold_ms > 1000 {
            return Err("key_hold_ms cannot exceed 1000".to_string());
        }
        Ok(())
    }

    /// Seed to run with: the configured one, or one derived from the clock
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0x5eed)
        })
    }
}
