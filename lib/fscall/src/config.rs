use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// Tunables for the filesystem calls.
///
/// Loaded from TOML, every key is optional:
///
/// ```toml
/// writer_buffer_size = 4096
/// copy_buffer_size = 131072
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FsCallConfig {
    /// Capacity of the buffer in front of every file writer.
    pub writer_buffer_size: usize,
    /// Chunk size used when streaming file content.
    pub copy_buffer_size: usize,
}

impl Default for FsCallConfig {
    fn default() -> Self {
        Self {
            writer_buffer_size: 4 * 1024,
            copy_buffer_size: 128 * 1024,
        }
    }
}

impl FsCallConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&s)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.writer_buffer_size == 0 {
            return Err(ConfigError::Zero("writer_buffer_size"));
        }
        if self.copy_buffer_size == 0 {
            return Err(ConfigError::Zero("copy_buffer_size"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(FsCallConfig::from_toml_str("").unwrap(), FsCallConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = FsCallConfig::from_toml_str("writer_buffer_size = 16").unwrap();
        assert_eq!(config.writer_buffer_size, 16);
        assert_eq!(config.copy_buffer_size, FsCallConfig::default().copy_buffer_size);
    }

    #[test]
    fn rejects_zero_and_unknown_keys() {
        assert!(matches!(
            FsCallConfig::from_toml_str("copy_buffer_size = 0"),
            Err(ConfigError::Zero("copy_buffer_size"))
        ));
        assert!(matches!(
            FsCallConfig::from_toml_str("buffer = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fscall.toml");
        std::fs::write(&path, "copy_buffer_size = 512\n").unwrap();
        assert_eq!(FsCallConfig::from_path(&path).unwrap().copy_buffer_size, 512);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            FsCallConfig::from_path(&missing),
            Err(ConfigError::Read { .. })
        ));
    }
}
