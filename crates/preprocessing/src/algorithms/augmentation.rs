//! Sub-image extraction and augmentation: aligned crops across the three
//! modalities of a frame, persisted in eight deterministic variants each.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView};
use rand::Rng;
use strum::IntoEnumIterator;
use tracing::debug;

use crate::codec;
use crate::config::PreprocessConfig;
use crate::error::{PreprocessError, Result};
use crate::naming::{FileNamer, configuration_label};
use crate::types::{AugmentedTriple, CropWindow, Modality};

/// The full augmentation set: the dihedral symmetries of the crop,
/// indexed 0-7 by declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Augmentation {
    Identity,
    FlipVertical,
    FlipHorizontal,
    FlipBoth,
    Rotate90,
    Rotate180,
    Rotate270,
    Transpose,
}

impl Augmentation {
    pub const COUNT: usize = 8;

    /// Apply this variant's geometric transform. Rotations are exact
    /// quarter-turn raster rotations, so rectangular crops swap dimensions.
    pub fn apply(self, image: &DynamicImage) -> DynamicImage {
        match self {
            Augmentation::Identity => image.clone(),
            Augmentation::FlipVertical => image.flipv(),
            Augmentation::FlipHorizontal => image.fliph(),
            Augmentation::FlipBoth => image.flipv().fliph(),
            Augmentation::Rotate90 => image.rotate90(),
            Augmentation::Rotate180 => image.rotate180(),
            Augmentation::Rotate270 => image.rotate270(),
            Augmentation::Transpose => image.rotate90().fliph(),
        }
    }
}

/// The three modality files of one capture folder, classified once.
#[derive(Debug)]
struct FrameFiles {
    depth: String,
    image: String,
    ground_truth: String,
}

impl FrameFiles {
    fn classify(folder: &Path, file_names: &[String]) -> Result<FrameFiles> {
        let mut depth = None;
        let mut image = None;
        let mut ground_truth = None;
        for name in file_names {
            let Some(modality) = Modality::classify(name) else {
                continue;
            };
            let slot = match modality {
                Modality::Depth => &mut depth,
                Modality::ObjectIndex => &mut ground_truth,
                Modality::Image => &mut image,
            };
            if slot.is_some() {
                return Err(PreprocessError::DuplicateModality {
                    modality,
                    folder: folder.to_path_buf(),
                });
            }
            *slot = Some(name.clone());
        }
        let require = |slot: Option<String>, modality| {
            slot.ok_or_else(|| PreprocessError::MissingModality {
                modality,
                folder: folder.to_path_buf(),
            })
        };
        Ok(FrameFiles {
            depth: require(depth, Modality::Depth)?,
            image: require(image, Modality::Image)?,
            ground_truth: require(ground_truth, Modality::ObjectIndex)?,
        })
    }
}

/// Output group key of a capture folder: the hour-level timestamp segment,
/// a fixed six-character substring at a fixed offset from the path end.
pub fn capture_hour_key(path: &Path) -> Result<String> {
    let text = path.to_string_lossy();
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < 24 {
        return Err(PreprocessError::MalformedCapturePath {
            path: path.to_path_buf(),
        });
    }
    Ok(chars[chars.len() - 24..chars.len() - 18].iter().collect())
}

/// Extract `nb_sub_divide_image` aligned crop windows from one ready frame
/// and persist every augmentation variant of each, returning the output
/// group path and one triple list per window, aligned by variant index.
pub fn subdivide_frame<R: Rng>(
    frame_dir: &Path,
    file_names: &[String],
    config: &PreprocessConfig,
    namer: &mut FileNamer,
    rng: &mut R,
) -> Result<(PathBuf, Vec<Vec<AugmentedTriple>>)> {
    let key = capture_hour_key(frame_dir)?;
    let group_root = config.folder_pre_processing.join(&key);
    for modality in Modality::iter() {
        fs::create_dir_all(group_root.join(modality.subfolder()))?;
    }

    let frame = FrameFiles::classify(frame_dir, file_names)?;
    let sources = [
        (Modality::Depth, frame.depth),
        (Modality::Image, frame.image),
        (Modality::ObjectIndex, frame.ground_truth),
    ];
    let mut loaded = Vec::with_capacity(sources.len());
    for (modality, name) in sources {
        let label = configuration_label(&name)
            .ok_or_else(|| PreprocessError::MalformedFileName { name: name.clone() })?
            .to_string();
        let image = codec::load(&frame_dir.join(&name))?;
        loaded.push((modality, label, image));
    }
    let (template_width, template_height) = loaded
        .iter()
        .find(|(modality, _, _)| *modality == Modality::Image)
        .map(|(_, _, image)| (image.width(), image.height()))
        .ok_or_else(|| PreprocessError::MissingModality {
            modality: Modality::Image,
            folder: frame_dir.to_path_buf(),
        })?;

    let mut windows = Vec::with_capacity(config.nb_sub_divide_image as usize);
    for _ in 0..config.nb_sub_divide_image {
        let window = CropWindow::sample(
            rng,
            template_width,
            template_height,
            config.sub_width_image,
            config.sub_height_image,
        )?;
        debug!(
            row = window.row,
            col = window.col,
            folder = %frame_dir.display(),
            "sampled crop window"
        );

        let mut depth_paths = Vec::with_capacity(Augmentation::COUNT);
        let mut image_paths = Vec::with_capacity(Augmentation::COUNT);
        let mut ground_truth_paths = Vec::with_capacity(Augmentation::COUNT);
        for (modality, label, source) in &loaded {
            if !window.fits(source.width(), source.height()) {
                return Err(PreprocessError::CropExceedsSource {
                    crop_width: window.width,
                    crop_height: window.height,
                    source_width: source.width(),
                    source_height: source.height(),
                });
            }
            let cropped = codec::crop(source, &window);
            let prepared = match modality {
                Modality::ObjectIndex => codec::edge_outline(&cropped),
                _ => cropped,
            };
            let bucket = match modality {
                Modality::Depth => &mut depth_paths,
                Modality::Image => &mut image_paths,
                Modality::ObjectIndex => &mut ground_truth_paths,
            };
            for augmentation in Augmentation::iter() {
                let variant = augmentation.apply(&prepared);
                let path = group_root
                    .join(modality.subfolder())
                    .join(namer.next_name(label));
                codec::save(&path, &variant)?;
                bucket.push(path);
            }
        }

        let triples = depth_paths
            .into_iter()
            .zip(image_paths)
            .zip(ground_truth_paths)
            .map(|((depth, image), ground_truth)| AugmentedTriple {
                depth,
                image,
                ground_truth,
            })
            .collect();
        windows.push(triples);
    }

    Ok((group_root, windows))
}
