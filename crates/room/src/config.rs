use std::path::{Path, PathBuf};

use roomspace_grab::GrabTuning;
use roomspace_interact::{InteractionTuning, InteractorTuning};
use roomspace_replicate::ReplicationTuning;
use roomspace_schedule::DoorTuning;
use roomspace_seating::SeatTuning;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Room tuning. Every section falls back to defaults, so a config file only
/// needs the values it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    pub grab: GrabTuning,
    pub seats: SeatTuning,
    pub doors: DoorTuning,
    pub replication: ReplicationTuning,
    pub interaction: InteractionTuning,
}

impl RoomConfig {
    /// Parse a configuration; missing sections keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!(path = %path.display(), "room config loaded");
        Ok(config)
    }

    /// Render the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// The sections a participant-side interactor needs.
    pub fn interactor_tuning(&self) -> InteractorTuning {
        InteractorTuning {
            interaction: self.interaction.clone(),
            grab: self.grab.clone(),
            door: self.doors.clone(),
        }
    }
}
