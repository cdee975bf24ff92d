//! Contour derivation: turns a filled segmentation mask into a thin object
//! boundary map, using depth discontinuities to tell true object edges from
//! mask staircase artifacts.

use std::path::Path;

use image::{GrayImage, Luma};
use tracing::debug;

use crate::codec;
use crate::error::{PreprocessError, Result};

/// Masks with fewer foreground pixels than this are rejected as near-empty.
pub const MIN_FOREGROUND_PIXELS: usize = 25;
/// Masks within this many pixels of fully foreground are rejected as
/// near-full.
pub const NEAR_FULL_MARGIN: usize = 1000;

/// Whether a depth/ground-truth pair produced a usable contour raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContourOutcome {
    /// The contour raster was written over the depth file.
    Derived,
    /// The mask was near-empty or near-full; nothing was written.
    Degenerate,
}

/// Derive a contour raster from a depth/ground-truth pair of identical
/// dimensions, rewriting the depth file in place on success. The ground
/// truth file is never touched.
pub fn derive_contours(depth_path: &Path, ground_truth_path: &Path) -> Result<ContourOutcome> {
    let mask = codec::load_gray(ground_truth_path)?;
    let depth = codec::load_gray(depth_path)?;
    if mask.dimensions() != depth.dimensions() {
        return Err(PreprocessError::DimensionMismatch {
            depth_width: depth.width(),
            depth_height: depth.height(),
            mask_width: mask.width(),
            mask_height: mask.height(),
        });
    }
    match refine_edges(&mask, &depth) {
        Some(edges) => {
            edges.save(depth_path)?;
            Ok(ContourOutcome::Derived)
        }
        None => {
            debug!(
                mask = %ground_truth_path.display(),
                "degenerate mask, dropping sample"
            );
            Ok(ContourOutcome::Degenerate)
        }
    }
}

/// Core of the derivation, pure in-memory. Returns `None` for degenerate
/// masks.
///
/// Every foreground pixel of the original mask is visited in row-major
/// order; for each of its four axis-aligned neighbors whose depth differs
/// from the pixel's own, the neighbor is promoted to full intensity and the
/// pixel itself cleared in a working copy. The per-direction foreground test
/// reads that working copy, not the original mask, so a direction can
/// observe a center already cleared earlier in the same pass.
pub fn refine_edges(mask: &GrayImage, depth: &GrayImage) -> Option<GrayImage> {
    let (width, height) = mask.dimensions();
    let total = (width as usize) * (height as usize);

    let mut foreground = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if mask.get_pixel(x, y).0[0] > 0 {
                foreground.push((x, y));
            }
        }
    }
    if foreground.len() > total.saturating_sub(NEAR_FULL_MARGIN) {
        return None;
    }
    if foreground.len() < MIN_FOREGROUND_PIXELS {
        return None;
    }

    let mut edges = mask.clone();
    for &(x, y) in &foreground {
        let mut neighbors = [None; 4];
        if y >= 1 {
            neighbors[0] = Some((x, y - 1));
        }
        if y + 1 < height {
            neighbors[1] = Some((x, y + 1));
        }
        if x >= 1 {
            neighbors[2] = Some((x - 1, y));
        }
        if x + 1 < width {
            neighbors[3] = Some((x + 1, y));
        }
        for (nx, ny) in neighbors.into_iter().flatten() {
            if edges.get_pixel(x, y).0[0] > 0
                && depth.get_pixel(nx, ny).0[0] != depth.get_pixel(x, y).0[0]
            {
                edges.put_pixel(nx, ny, Luma([255]));
                edges.put_pixel(x, y, Luma([0]));
            }
        }
    }
    Some(edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with_foreground(count: usize) -> GrayImage {
        let mut mask = GrayImage::new(100, 100);
        let mut remaining = count;
        'fill: for y in 0..100 {
            for x in 0..100 {
                if remaining == 0 {
                    break 'fill;
                }
                mask.put_pixel(x, y, Luma([200]));
                remaining -= 1;
            }
        }
        mask
    }

    fn flat_depth() -> GrayImage {
        GrayImage::from_pixel(100, 100, Luma([90]))
    }

    #[test]
    fn near_empty_threshold_is_inclusive() {
        assert!(refine_edges(&mask_with_foreground(25), &flat_depth()).is_some());
        assert!(refine_edges(&mask_with_foreground(24), &flat_depth()).is_none());
    }

    #[test]
    fn near_full_threshold_is_inclusive() {
        assert!(refine_edges(&mask_with_foreground(100 * 100 - 1000), &flat_depth()).is_some());
        assert!(refine_edges(&mask_with_foreground(100 * 100 - 999), &flat_depth()).is_none());
    }

    #[test]
    fn flat_depth_leaves_the_mask_unchanged() {
        let mask = mask_with_foreground(30);
        let edges = refine_edges(&mask, &flat_depth()).unwrap();
        assert_eq!(edges, mask);
    }

    #[test]
    fn depth_steps_promote_the_neighbor_and_clear_the_center() {
        // Foreground strip on row 10 spanning a depth step between columns
        // 19 and 20, plus a far block to clear the near-empty threshold.
        let mut mask = GrayImage::new(100, 100);
        for x in 10..36 {
            mask.put_pixel(x, 10, Luma([200]));
        }
        for y in 30..35 {
            for x in 30..36 {
                mask.put_pixel(x, y, Luma([200]));
            }
        }
        let mut depth = GrayImage::from_pixel(100, 100, Luma([5]));
        for y in 0..100 {
            for x in 20..100 {
                depth.put_pixel(x, y, Luma([9]));
            }
        }

        let edges = refine_edges(&mask, &depth).unwrap();
        assert_eq!(edges.get_pixel(19, 10).0[0], 255);
        assert_eq!(edges.get_pixel(20, 10).0[0], 0);
        assert_eq!(edges.get_pixel(18, 10).0[0], 200);
        assert_eq!(edges.get_pixel(21, 10).0[0], 200);
        // The far block sits in constant depth and stays as it was.
        assert_eq!(edges.get_pixel(32, 32).0[0], 200);
    }

    #[test]
    fn cleared_center_suppresses_later_directions() {
        // Two adjacent foreground pixels across two depth steps: processing
        // (10,10) clears it and re-promotes (11,10); processing (11,10)
        // re-promotes (10,10) via its left check and clears itself, after
        // which its right check sees a cleared center and does nothing, so
        // (12,10) is never promoted. A pass reading the original mask
        // instead of the working copy would light it up.
        let mut mask = GrayImage::new(100, 100);
        mask.put_pixel(10, 10, Luma([200]));
        mask.put_pixel(11, 10, Luma([200]));
        for y in 30..35 {
            for x in 30..36 {
                mask.put_pixel(x, y, Luma([200]));
            }
        }
        let mut depth = GrayImage::new(100, 100);
        for y in 0..100 {
            for x in 0..100 {
                let value = if x <= 10 {
                    1
                } else if x == 11 {
                    2
                } else {
                    3
                };
                depth.put_pixel(x, y, Luma([value]));
            }
        }

        let edges = refine_edges(&mask, &depth).unwrap();
        assert_eq!(edges.get_pixel(10, 10).0[0], 255);
        assert_eq!(edges.get_pixel(11, 10).0[0], 0);
        assert_eq!(edges.get_pixel(12, 10).0[0], 0);
    }

    #[test]
    fn derivation_rewrites_depth_and_leaves_ground_truth_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let depth_path = tmp.path().join("depth.png");
        let mask_path = tmp.path().join("mask.png");

        let mask = mask_with_foreground(40);
        let mut depth = GrayImage::from_pixel(100, 100, Luma([5]));
        for y in 0..100 {
            depth.put_pixel(0, y, Luma([9]));
        }
        depth.save(&depth_path).unwrap();
        mask.save(&mask_path).unwrap();

        let outcome = derive_contours(&depth_path, &mask_path).unwrap();
        assert_eq!(outcome, ContourOutcome::Derived);

        let rewritten = image::open(&depth_path).unwrap().to_luma8();
        assert_eq!(rewritten, refine_edges(&mask, &depth).unwrap());
        let untouched = image::open(&mask_path).unwrap().to_luma8();
        assert_eq!(untouched, mask);
    }

    #[test]
    fn degenerate_masks_leave_the_depth_file_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let depth_path = tmp.path().join("depth.png");
        let mask_path = tmp.path().join("mask.png");

        let depth = flat_depth();
        depth.save(&depth_path).unwrap();
        mask_with_foreground(5).save(&mask_path).unwrap();

        let outcome = derive_contours(&depth_path, &mask_path).unwrap();
        assert_eq!(outcome, ContourOutcome::Degenerate);
        assert_eq!(image::open(&depth_path).unwrap().to_luma8(), depth);
    }

    #[test]
    fn mismatched_dimensions_are_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let depth_path = tmp.path().join("depth.png");
        let mask_path = tmp.path().join("mask.png");
        GrayImage::new(10, 10).save(&depth_path).unwrap();
        mask_with_foreground(30).save(&mask_path).unwrap();

        assert!(matches!(
            derive_contours(&depth_path, &mask_path),
            Err(PreprocessError::DimensionMismatch { .. })
        ));
    }
}
