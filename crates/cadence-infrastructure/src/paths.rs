//! Path resolution for Cadence configuration and cache files.
//!
//! ```text
//! ~/.config/cadence/           # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/cadence/      # Data directory
//! └── cache/                   # File-backed local cache (one file per slot)
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "cadence";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for Cadence.
pub struct CadencePaths;

impl CadencePaths {
    /// Returns the configuration directory (e.g. `~/.config/cadence/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the data directory (e.g. `~/.local/share/cadence/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the default directory of the file-backed local cache.
    pub fn cache_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("cache"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file() {
        let Ok(config_file) = CadencePaths::config_file() else {
            return;
        };
        assert!(config_file.ends_with("cadence/config.toml"));
    }

    #[test]
    fn test_cache_dir_under_data_dir() {
        let (Ok(cache_dir), Ok(data_dir)) = (CadencePaths::cache_dir(), CadencePaths::data_dir())
        else {
            return;
        };
        assert!(cache_dir.ends_with("cache"));
        assert!(cache_dir.starts_with(&data_dir));
    }
}
