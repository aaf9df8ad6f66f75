use crate::engine::DEFAULT_SAMPLES_PER_FRQ;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where the external tools live and how to call them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// The resampler executable.
    pub resampler_path: PathBuf,
    /// The frequency analyzer executable.
    pub frq_generator_path: PathBuf,
    /// A sample of pure silence, used to fill gaps between notes.
    pub silence_path: PathBuf,
    /// Samples per value in generated frq files.
    pub samples_per_frq: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resampler_path: PathBuf::from("assets/resampler"),
            frq_generator_path: PathBuf::from("assets/frq0003gen"),
            silence_path: PathBuf::from("assets/silence.wav"),
            samples_per_frq: DEFAULT_SAMPLES_PER_FRQ,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("samples_per_frq must be positive, got {0}")]
    BadSamplesPerFrq(i32),
}

impl EngineConfig {
    /// Loads a JSON config. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.samples_per_frq <= 0 {
            return Err(ConfigError::BadSamplesPerFrq(self.samples_per_frq));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.samples_per_frq, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"resampler_path": "/opt/tn_fnds"}"#).unwrap();
        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(
            config,
            EngineConfig {
                resampler_path: PathBuf::from("/opt/tn_fnds"),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            EngineConfig::from_file(&dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(EngineConfig::from_file(&path), Err(ConfigError::Parse { .. })));

        std::fs::write(&path, r#"{"samples_per_frq": 0}"#).unwrap();
        assert!(matches!(
            EngineConfig::from_file(&path),
            Err(ConfigError::BadSamplesPerFrq(0))
        ));
    }
}
