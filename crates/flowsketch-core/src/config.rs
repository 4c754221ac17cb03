//! Editor configuration.

use crate::notation::ImportLayout;
use crate::storage::{FileStore, StorageResult};
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunable editor behaviour. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Key that must be held to pan by dragging the empty canvas.
    pub pan_key: String,
    /// Offset of a duplicated node from its original.
    pub duplicate_offset: Vec2,
    /// Column x of nodes created by notation import.
    pub import_x: f64,
    /// y of the first imported node.
    pub import_base_y: f64,
    /// Vertical distance between imported nodes.
    pub import_step: f64,
    /// Hit radius of connection handles.
    pub handle_radius: f64,
    /// Whether new nodes start in score mode.
    pub score_new_nodes: bool,
    /// Where diagrams are stored. `None` means the platform default.
    pub storage_dir: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let layout = ImportLayout::default();
        Self {
            pan_key: "Space".to_string(),
            duplicate_offset: crate::graph::DUPLICATE_OFFSET,
            import_x: layout.x,
            import_base_y: layout.base_y,
            import_step: layout.step,
            handle_radius: crate::geometry::HANDLE_HIT_RADIUS,
            score_new_nodes: false,
            storage_dir: None,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn import_layout(&self) -> ImportLayout {
        ImportLayout {
            x: self.import_x,
            base_y: self.import_base_y,
            step: self.import_step,
        }
    }

    /// Configured storage directory, or the platform default.
    pub fn storage_dir(&self) -> StorageResult<PathBuf> {
        match &self.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => FileStore::default_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.pan_key, "Space");
        assert_eq!(config.duplicate_offset, Vec2::new(20.0, 20.0));
        assert_eq!(config.import_x, 250.0);
        assert_eq!(config.import_base_y, 50.0);
        assert_eq!(config.import_step, 120.0);
        assert_eq!(config.handle_radius, 8.0);
        assert!(!config.score_new_nodes);
    }

    #[test]
    fn test_partial_json() {
        let config = EditorConfig::from_json(r#"{"pan_key": "Alt", "score_new_nodes": true}"#).unwrap();
        assert_eq!(config.pan_key, "Alt");
        assert!(config.score_new_nodes);
        assert_eq!(config.import_step, 120.0);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            EditorConfig::from_json("{pan_key"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"storage_dir": "/tmp/diagrams"}"#).unwrap();
        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.storage_dir().unwrap(), PathBuf::from("/tmp/diagrams"));

        let missing = EditorConfig::load(dir.path().join("absent.json"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
