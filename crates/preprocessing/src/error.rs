use std::path::PathBuf;

use thiserror::Error;

use crate::types::Modality;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Failed to load or save image: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Directory traversal error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Data folder does not exist: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Not enough sample groups for a training/validation/test split: found {found}, need at least 3")]
    NotEnoughGroups { found: usize },

    #[error("Crop {crop_width}x{crop_height} does not fit strictly inside source {source_width}x{source_height}")]
    CropExceedsSource {
        crop_width: u32,
        crop_height: u32,
        source_width: u32,
        source_height: u32,
    },

    #[error("Capture folder path too short to carry a group key: {path}")]
    MalformedCapturePath { path: PathBuf },

    #[error("File name carries no configuration label: {name}")]
    MalformedFileName { name: String },

    #[error("Capture folder {folder} has no {modality} file")]
    MissingModality { modality: Modality, folder: PathBuf },

    #[error("Capture folder {folder} has more than one {modality} file")]
    DuplicateModality { modality: Modality, folder: PathBuf },

    #[error("Depth raster is {depth_width}x{depth_height} but ground truth is {mask_width}x{mask_height}")]
    DimensionMismatch {
        depth_width: u32,
        depth_height: u32,
        mask_width: u32,
        mask_height: u32,
    },

    #[error("Configuration validation failed: {details}")]
    InvalidConfig { details: String },
}

pub type Result<T> = std::result::Result<T, PreprocessError>;
