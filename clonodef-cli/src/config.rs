//! Configuration handling for the clonodef CLI
//!
//! Supports loading configuration from clonodef.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use clonodef_core::fasta::BULK_KEY_COLUMN;
use clonodef_core::model::DEFAULT_TITLE;
use clonodef_core::NumberingScheme;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CliError;

pub const DEFAULT_CONFIG_FILE: &str = "clonodef.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub block: BlockConfig,
    #[serde(default)]
    pub numbering: NumberingConfig,
    #[serde(default)]
    pub fasta: FastaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Block title shown when no UI state is supplied
    #[serde(default = "default_title")]
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberingConfig {
    /// Numbering scheme used when --scheme is not given
    #[serde(default = "default_scheme")]
    pub scheme: NumberingScheme,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastaConfig {
    /// Key column of assembling-feature tables
    #[serde(default = "default_key_column")]
    pub key_column: String,
}

fn default_title() -> String { DEFAULT_TITLE.to_string() }
fn default_scheme() -> NumberingScheme { NumberingScheme::Imgt }
fn default_key_column() -> String { BULK_KEY_COLUMN.to_string() }

impl Default for BlockConfig {
    fn default() -> Self {
        Self { title: default_title() }
    }
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self { scheme: default_scheme() }
    }
}

impl Default for FastaConfig {
    fn default() -> Self {
        Self { key_column: default_key_column() }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    log::info!("Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            CliError::config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("Failed to serialize default configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::format_error_with_suggestions;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.block.title, "Redefine Clonotypes");
        assert_eq!(config.numbering.scheme, NumberingScheme::Imgt);
        assert_eq!(config.fasta.key_column, "clonotypeKey");
    }

    #[test]
    fn test_config_roundtrip() -> Result<()> {
        let mut config = Config::default();
        config.numbering.scheme = NumberingScheme::Chothia;
        let temp_file = NamedTempFile::new()?;

        config.save_to_file(temp_file.path())?;
        let loaded_config = Config::load_from_file(temp_file.path())?;

        assert_eq!(config.block.title, loaded_config.block.title);
        assert_eq!(loaded_config.numbering.scheme, NumberingScheme::Chothia);
        assert_eq!(config.fasta.key_column, loaded_config.fasta.key_column);

        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> Result<()> {
        let config: Config = toml::from_str("[numbering]\nscheme = \"kabat\"\n")?;
        assert_eq!(config.numbering.scheme, NumberingScheme::Kabat);
        assert_eq!(config.block.title, "Redefine Clonotypes");
        Ok(())
    }

    #[test]
    fn test_invalid_file_is_a_config_error() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        write!(temp_file, "[numbering]\nscheme = \"martin\"\n")?;

        let err = Config::load(Some(temp_file.path())).unwrap_err();
        let cli_err = err.downcast_ref::<CliError>().expect("config errors are CliErrors");
        assert!(matches!(cli_err, CliError::Config { .. }));
        assert!(format_error_with_suggestions(cli_err).contains("clonodef.toml"));
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_is_a_config_error() {
        let err = Config::load(Some(Path::new("/no/such/clonodef.toml"))).unwrap_err();
        assert!(matches!(err.downcast_ref::<CliError>(), Some(CliError::Config { .. })));
    }

    #[test]
    fn test_example_toml_generation() -> Result<()> {
        let example = Config::example_toml()?;
        assert!(example.contains("[block]"));
        assert!(example.contains("[numbering]"));
        assert!(example.contains("[fasta]"));
        Ok(())
    }
}
