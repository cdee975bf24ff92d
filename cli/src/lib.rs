use preprocessing::PreprocessConfig;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// Load a run configuration from a JSON file.
pub fn load_config_json<P: AsRef<Path>>(path: P) -> Result<PreprocessConfig, ConfigFileError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load a run configuration from a TOML file.
pub fn load_config_toml<P: AsRef<Path>>(path: P) -> Result<PreprocessConfig, ConfigFileError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Auto-detect the file format and load a run configuration.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PreprocessConfig, ConfigFileError> {
    let path_ref = path.as_ref();
    match path_ref.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => load_config_toml(path),
        Some("json") => load_config_json(path),
        _ => Err(ConfigFileError::UnsupportedFileFormat),
    }
}

/// Write a default configuration skeleton for hand editing.
pub fn write_default_config<P: AsRef<Path>>(path: P) -> Result<(), ConfigFileError> {
    let content = serde_json::to_string_pretty(&PreprocessConfig::default())?;
    fs::write(path, content)?;
    Ok(())
}
