use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PreprocessError, Result};

/// Run configuration, loaded once at process start and immutable thereafter.
///
/// Field names keep the external JSON contract of the render driver's
/// `config.json`, camelCase keys included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreprocessConfig {
    /// Root of the rendered capture tree.
    pub root_path_data: PathBuf,
    /// Output root for sub-images and manifests.
    pub folder_pre_processing: PathBuf,
    /// Number of crop windows sampled per frame.
    pub nb_sub_divide_image: u32,
    /// Crop window height in pixels.
    pub sub_height_image: u32,
    /// Crop window width in pixels.
    pub sub_width_image: u32,
    /// Share of sample groups assigned to training, in percent.
    pub percentage_training: u32,
    /// Share of sample groups assigned to validation, in percent.
    pub percentage_validation: u32,
    /// Selects the rename-only mode for real captures instead of the
    /// full pipeline.
    #[serde(rename = "isRealData")]
    pub is_real_data: bool,
    /// Root of the real capture tree, used only in rename-only mode.
    #[serde(rename = "pathRealData")]
    pub path_real_data: PathBuf,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            root_path_data: PathBuf::from("data"),
            folder_pre_processing: PathBuf::from("pre_processing"),
            nb_sub_divide_image: 4,
            sub_height_image: 256,
            sub_width_image: 256,
            percentage_training: 70,
            percentage_validation: 20,
            is_real_data: false,
            path_real_data: PathBuf::from("real_data"),
        }
    }
}

impl PreprocessConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Check the invariants a run depends on.
    pub fn validate(&self) -> Result<()> {
        if self.percentage_training + self.percentage_validation > 100 {
            return Err(PreprocessError::InvalidConfig {
                details: format!(
                    "training ({}) + validation ({}) percentages exceed 100",
                    self.percentage_training, self.percentage_validation
                ),
            });
        }
        if self.nb_sub_divide_image == 0 {
            return Err(PreprocessError::InvalidConfig {
                details: "nb_sub_divide_image must be at least 1".to_string(),
            });
        }
        if self.sub_height_image == 0 || self.sub_width_image == 0 {
            return Err(PreprocessError::InvalidConfig {
                details: "crop dimensions must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}
