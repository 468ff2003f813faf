use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates a configuration file
///
/// # Returns
///
/// * `Ok(Config)` - The validated configuration
/// * `Err(ConfigError)` - The file is unreadable, is not valid TOML, or fails validation
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_hash(path).map(|(config, _)| config)
}

/// Parses and validates configuration text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Hex SHA-256 digest of configuration text
pub fn config_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Hashes a configuration file without parsing it
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    Ok(config_hash(&std::fs::read_to_string(path)?))
}

/// Loads a configuration together with the hash of the exact bytes parsed
///
/// The file is read once, so the hash logged at startup always describes
/// the settings the run uses.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, config_hash(&content)))
}
