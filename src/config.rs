//! Archive limits and packing configuration
//!
//! Limits are enforced on every entry added to an [`Archive`](crate::Archive)
//! and on every archive parsed back from disk. A [`Config`] bundles the limits
//! with a compression level and can be loaded from a TOML file:
//!
//! ```toml
//! max_path_length = 128
//! max_files = 2048
//! max_content_length = 67108864
//! compression_level = 18
//! ```

use crate::archive::LEVEL_HIGH;
use crate::error::{FoldpackError, Result};
use serde::Deserialize;
use std::path::Path;

/// Default maximum stored path length in bytes
pub const DEFAULT_MAX_PATH_LENGTH: usize = 128;

/// Hard ceiling for the path length (stored in a single byte)
pub const PATH_LENGTH_CEILING: usize = 255;

/// Default maximum number of entries per archive
pub const DEFAULT_MAX_FILES: usize = 2048;

/// Default maximum total content size (the format's `u32` length field)
pub const DEFAULT_MAX_CONTENT_LENGTH: u64 = u32::MAX as u64;

/// Per-archive size limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_path_length: usize,
    pub max_files: usize,
    /// Total content bytes an archive may hold; also bounds decompression
    pub max_content_length: u64,
}

impl Limits {
    /// Build validated limits
    pub fn new(max_path_length: usize, max_files: usize) -> Result<Self> {
        let limits = Self {
            max_path_length,
            max_files,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
        };
        limits.validate()?;
        Ok(limits)
    }

    /// Same limits with a different content size cap
    pub fn with_max_content_length(self, max_content_length: u64) -> Result<Self> {
        let limits = Self {
            max_content_length,
            ..self
        };
        limits.validate()?;
        Ok(limits)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_path_length == 0 || self.max_path_length > PATH_LENGTH_CEILING {
            return Err(FoldpackError::InvalidConfig(format!(
                "max_path_length must be between 1 and {}, got {}",
                PATH_LENGTH_CEILING, self.max_path_length
            )));
        }
        if self.max_files == 0 || self.max_files > u32::MAX as usize {
            return Err(FoldpackError::InvalidConfig(format!(
                "max_files must be between 1 and {}, got {}",
                u32::MAX,
                self.max_files
            )));
        }
        if self.max_content_length > DEFAULT_MAX_CONTENT_LENGTH {
            return Err(FoldpackError::InvalidConfig(format!(
                "max_content_length must be at most {}, got {}",
                DEFAULT_MAX_CONTENT_LENGTH, self.max_content_length
            )));
        }
        Ok(())
    }

    /// Fail with `PathTooLong` if `path` does not fit
    pub fn check_path(&self, path: &str) -> Result<()> {
        if path.len() > self.max_path_length {
            return Err(FoldpackError::PathTooLong {
                path: path.to_string(),
                length: path.len(),
                max: self.max_path_length,
            });
        }
        Ok(())
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            max_files: DEFAULT_MAX_FILES,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
        }
    }
}

/// Packing configuration (limits plus compression level)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub limits: Limits,
    pub compression_level: i32,
}

impl Config {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.limits.validate()?;
        let range = zstd::compression_level_range();
        if !range.contains(&self.compression_level) {
            return Err(FoldpackError::InvalidConfig(format!(
                "compression_level {} outside supported range {}..={}",
                self.compression_level,
                range.start(),
                range.end()
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            compression_level: LEVEL_HIGH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_path_length, 128);
        assert_eq!(limits.max_files, 2048);
        assert_eq!(limits.max_content_length, u32::MAX as u64);
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn test_content_length_cap() {
        let limits = Limits::default().with_max_content_length(1024).unwrap();
        assert_eq!(limits.max_content_length, 1024);
        assert_eq!(limits.max_files, DEFAULT_MAX_FILES);
        assert!(matches!(
            Limits::default().with_max_content_length(u32::MAX as u64 + 1),
            Err(FoldpackError::InvalidConfig(_))
        ));

        let config = Config::from_toml_str("max_content_length = 4096\n").unwrap();
        assert_eq!(config.limits.max_content_length, 4096);
    }

    #[test]
    fn test_path_length_ceiling() {
        assert!(Limits::new(255, 10).is_ok());
        assert!(matches!(
            Limits::new(256, 10),
            Err(FoldpackError::InvalidConfig(_))
        ));
        assert!(Limits::new(0, 10).is_err());
        assert!(Limits::new(10, 0).is_err());
    }

    #[test]
    fn test_check_path() {
        let limits = Limits::new(5, 1).unwrap();
        assert!(limits.check_path("abcde").is_ok());
        match limits.check_path("abcdef") {
            Err(FoldpackError::PathTooLong { length, max, .. }) => {
                assert_eq!(length, 6);
                assert_eq!(max, 5);
            }
            other => panic!("Expected PathTooLong, got: {:?}", other),
        }
    }

    #[test]
    fn test_config_from_toml() {
        let config = Config::from_toml_str(
            "max_path_length = 200\nmax_files = 10\ncompression_level = 3\n",
        )
        .unwrap();
        assert_eq!(config.limits.max_path_length, 200);
        assert_eq!(config.limits.max_files, 10);
        assert_eq!(config.compression_level, 3);
    }

    #[test]
    fn test_config_defaults_for_missing_keys() {
        let config = Config::from_toml_str("max_files = 4\n").unwrap();
        assert_eq!(config.limits.max_path_length, DEFAULT_MAX_PATH_LENGTH);
        assert_eq!(config.limits.max_files, 4);
        assert_eq!(config.limits.max_content_length, DEFAULT_MAX_CONTENT_LENGTH);
        assert_eq!(config.compression_level, LEVEL_HIGH);
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(matches!(
            Config::from_toml_str("max_path_length = 300\n"),
            Err(FoldpackError::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::from_toml_str("compression_level = 99\n"),
            Err(FoldpackError::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::from_toml_str("max_files = \"many\"\n"),
            Err(FoldpackError::Toml(_))
        ));
    }
}
