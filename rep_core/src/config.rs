//! Configuration file support for repcount.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/repcount/config.toml`.

use crate::catalog::build_default_catalog;
use crate::{Catalog, Error, ExerciseDefinition, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub feedback: FeedbackConfig,

    /// User-defined exercises, added on top of the built-in catalog
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exercises: Vec<ExerciseDefinition>,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Pose tracking configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Landmarks below this visibility are treated as occluded
    #[serde(default = "default_min_visibility")]
    pub min_visibility: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            min_visibility: default_min_visibility(),
        }
    }
}

/// Which feedback messages are read aloud
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default)]
    pub speak_stage_changes: bool,

    #[serde(default = "default_true")]
    pub speak_reps: bool,

    #[serde(default = "default_true")]
    pub speak_form_errors: bool,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            speak_stage_changes: false,
            speak_reps: true,
            speak_form_errors: true,
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("repcount")
}

fn default_min_visibility() -> f64 {
    crate::angles::DEFAULT_MIN_VISIBILITY
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("repcount").join("config.toml")
    }

    /// Check values that serde cannot express
    pub fn validate(&self) -> Result<()> {
        let v = self.tracking.min_visibility;
        if !(0.0..=1.0).contains(&v) {
            return Err(Error::Config(format!(
                "tracking.min_visibility must be within 0..=1, got {}",
                v
            )));
        }
        Ok(())
    }

    /// Built-in catalog extended with the configured exercises
    pub fn catalog(&self) -> Result<Catalog> {
        let mut catalog = build_default_catalog();
        catalog.extend_with(self.exercises.iter().cloned())?;
        Ok(catalog)
    }
}
