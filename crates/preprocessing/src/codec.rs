//! Thin adapter over the imaging stack: PNG decode/encode, rectangular
//! crops, and the fixed-threshold edge pass used on object-index crops.

use std::path::Path;

use image::{DynamicImage, GrayImage};

use crate::error::Result;
use crate::types::CropWindow;

/// Fixed Canny thresholds for the coarse object-index outline.
pub const CANNY_LOW: f32 = 0.0;
pub const CANNY_HIGH: f32 = 200.0;

/// Decode an image from disk, keeping its native channel layout and depth.
pub fn load(path: &Path) -> Result<DynamicImage> {
    Ok(image::open(path)?)
}

/// Decode an image from disk as a single-channel 8-bit intensity buffer.
pub fn load_gray(path: &Path) -> Result<GrayImage> {
    Ok(image::open(path)?.to_luma8())
}

/// Encode an image to disk; the format follows the path extension.
pub fn save(path: &Path, image: &DynamicImage) -> Result<()> {
    image.save(path)?;
    Ok(())
}

/// Slice a rectangular region out of an image.
pub fn crop(image: &DynamicImage, window: &CropWindow) -> DynamicImage {
    image.crop_imm(window.col, window.row, window.width, window.height)
}

/// Coarse outline of an object-index raster via Canny edge detection.
pub fn edge_outline(image: &DynamicImage) -> DynamicImage {
    DynamicImage::ImageLuma8(imageproc::edges::canny(
        &image.to_luma8(),
        CANNY_LOW,
        CANNY_HIGH,
    ))
}
