use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::shared::constants;

/// Folder layout and defaults for the `run` pipeline.
///
/// Loaded from a JSON file (`framesift.config` by default). A missing file is
/// fine, every field has a default; a malformed file is an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub video_dir: PathBuf,
    pub frames_dir: PathBuf,
    pub filtered_dir: PathBuf,
    pub frame_interval: u64,
    pub model_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            video_dir: PathBuf::from("videos"),
            frames_dir: PathBuf::from("extracted_frames"),
            filtered_dir: PathBuf::from("filtered_frames"),
            frame_interval: 1,
            model_path: PathBuf::from("models/yolov8m.onnx"),
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(constants::CONFIG_FILE));

        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Malformed config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_config_yields_defaults() {
        let path = std::env::temp_dir().join(format!(
            "framesift-config-{}-missing.json",
            std::process::id()
        ));
        let cfg = Config::load(Some(&path)).unwrap();
        assert_eq!(cfg.frame_interval, 1);
        assert_eq!(cfg.video_dir, PathBuf::from("videos"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let path = std::env::temp_dir().join(format!(
            "framesift-config-{}-partial.json",
            std::process::id()
        ));
        fs::write(&path, r#"{ "frame_interval": 30 }"#).unwrap();

        let cfg = Config::load(Some(&path)).unwrap();
        assert_eq!(cfg.frame_interval, 30);
        assert_eq!(cfg.filtered_dir, PathBuf::from("filtered_frames"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let path = std::env::temp_dir().join(format!(
            "framesift-config-{}-broken.json",
            std::process::id()
        ));
        fs::write(&path, "{ not json").unwrap();

        assert!(Config::load(Some(&path)).is_err());

        let _ = fs::remove_file(&path);
    }
}
