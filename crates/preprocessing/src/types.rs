use std::collections::BTreeMap;
use std::path::PathBuf;

use rand::Rng;

use crate::error::{PreprocessError, Result};

/// One raster modality of a captured frame, recognised by a filename
/// substring. Classification happens once, at discovery time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Modality {
    Depth,
    ObjectIndex,
    Image,
}

impl Modality {
    /// Classify a file by name. The substring checks run in the same order
    /// the render driver names its outputs, so a `distance_map` file is never
    /// mistaken for an `_image` one.
    pub fn classify(file_name: &str) -> Option<Modality> {
        if file_name.contains("distance_map") {
            Some(Modality::Depth)
        } else if file_name.contains("object_index") {
            Some(Modality::ObjectIndex)
        } else if file_name.contains("_image") {
            Some(Modality::Image)
        } else {
            None
        }
    }

    /// Output subfolder this modality is persisted under.
    pub fn subfolder(self) -> &'static str {
        match self {
            Modality::Depth => "depth",
            Modality::ObjectIndex => "ground_truth",
            Modality::Image => "images",
        }
    }
}

/// Aligned file paths for one augmentation variant of one crop window.
/// All three files carry the identical geometric transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentedTriple {
    pub depth: PathBuf,
    pub image: PathBuf,
    pub ground_truth: PathBuf,
}

/// One randomly placed rectangular sub-region, applied identically across
/// the three modalities of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub row: u32,
    pub col: u32,
    pub height: u32,
    pub width: u32,
}

impl CropWindow {
    /// Sample a top-left offset uniformly such that the window fits inside
    /// the source. The window must be strictly smaller than the source on
    /// both axes.
    pub fn sample<R: Rng>(
        rng: &mut R,
        source_width: u32,
        source_height: u32,
        width: u32,
        height: u32,
    ) -> Result<CropWindow> {
        if height >= source_height || width >= source_width {
            return Err(PreprocessError::CropExceedsSource {
                crop_width: width,
                crop_height: height,
                source_width,
                source_height,
            });
        }
        Ok(CropWindow {
            row: rng.gen_range(0..source_height - height),
            col: rng.gen_range(0..source_width - width),
            height,
            width,
        })
    }

    /// Whether this window fits inside an image of the given dimensions.
    pub fn fits(&self, source_width: u32, source_height: u32) -> bool {
        self.col + self.width <= source_width && self.row + self.height <= source_height
    }
}

/// Augmented triples accumulated during discovery, keyed by output group.
/// A whole group moves into a single dataset split, never across two.
#[derive(Debug, Default)]
pub struct SampleGroups {
    groups: BTreeMap<PathBuf, Vec<Vec<AugmentedTriple>>>,
}

impl SampleGroups {
    /// Merge the per-window triple lists of one processed frame into the
    /// group they belong to.
    pub fn insert(&mut self, key: PathBuf, windows: Vec<Vec<AugmentedTriple>>) {
        self.groups.entry(key).or_default().extend(windows);
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &PathBuf> {
        self.groups.keys()
    }

    pub fn get(&self, key: &PathBuf) -> Option<&Vec<Vec<AugmentedTriple>>> {
        self.groups.get(key)
    }
}

/// One of the three dataset splits, in manifest order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum SplitKind {
    Training,
    Validation,
    Test,
}

impl SplitKind {
    /// Manifest file name for this split.
    pub fn manifest_name(self) -> String {
        format!("{self}.txt")
    }
}
