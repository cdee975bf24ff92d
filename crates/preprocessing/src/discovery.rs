//! Capture-tree discovery: walks the rendered output tree, propagates
//! readiness from sentinel marker files, and feeds every ready frame folder
//! through the augmentation engine. Also hosts the rename-only mode for
//! real captures.

use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::algorithms::subdivide_frame;
use crate::config::PreprocessConfig;
use crate::error::{PreprocessError, Result};
use crate::naming::FileNamer;
use crate::types::{Modality, SampleGroups};

/// Marker file the render driver writes once every modality of a capture is
/// finalized. Readiness propagates from the folder holding it to all of its
/// descendants.
pub const SENTINEL_FILE: &str = "OK.txt";

/// Path fragment marking real-capture folders to leave untouched.
pub const EXCLUDE_TAG: &str = "EXCLUDE";

fn file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Walk the capture tree, subdividing every frame folder inside a ready
/// subtree, and accumulate the resulting triples per output group.
pub fn discover_ready_frames<R: Rng>(
    config: &PreprocessConfig,
    namer: &mut FileNamer,
    rng: &mut R,
) -> Result<SampleGroups> {
    let root = &config.root_path_data;
    if !root.exists() {
        return Err(PreprocessError::RootNotFound { path: root.clone() });
    }

    let mut groups = SampleGroups::default();
    let mut ready_root: Option<PathBuf> = None;
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();
        if let Some(current) = &ready_root {
            if !dir.starts_with(current) {
                ready_root = None;
            }
        }
        let names = file_names(dir)?;
        match &ready_root {
            // Only strict descendants of the ready root carry frames; the
            // ready root itself holds the sentinel.
            Some(current) if dir != current.as_path() => {
                if names.iter().any(|name| Modality::classify(name).is_some()) {
                    info!(folder = %dir.display(), "processing ready capture folder");
                    let (group_key, windows) =
                        subdivide_frame(dir, &names, config, namer, rng)?;
                    groups.insert(group_key, windows);
                }
            }
            Some(_) => {}
            None => {
                if names.iter().any(|name| name == SENTINEL_FILE) {
                    debug!(folder = %dir.display(), "found completion sentinel");
                    ready_root = Some(dir.to_path_buf());
                }
            }
        }
    }
    Ok(groups)
}

/// Rename-only mode for real captures: stamp every file with the
/// configuration label carried by its folder name, skipping excluded
/// folders.
pub fn rename_real_captures(root: &Path) -> Result<usize> {
    if !root.exists() {
        return Err(PreprocessError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut renamed = 0;
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();
        let dir_text = dir.to_string_lossy().into_owned();
        if dir_text.contains(EXCLUDE_TAG) {
            info!(folder = %dir.display(), "skipping excluded folder");
            continue;
        }
        let names = file_names(dir)?;
        if names.is_empty() {
            continue;
        }
        let label = dir_text
            .split('_')
            .nth(1)
            .ok_or_else(|| PreprocessError::MalformedCapturePath {
                path: dir.to_path_buf(),
            })?
            .to_string();
        for name in names {
            let stem = Path::new(&name)
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned();
            let renamed_name = format!("{stem}_{label}_.png");
            fs::rename(dir.join(&name), dir.join(&renamed_name))?;
            renamed += 1;
        }
    }
    Ok(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn write_frame(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        let mut rgb = RgbImage::new(50, 50);
        let mut depth = GrayImage::new(50, 50);
        let mut index = GrayImage::new(50, 50);
        for y in 0..50 {
            for x in 0..50 {
                rgb.put_pixel(x, y, Rgb([x as u8, y as u8, 10]));
                depth.put_pixel(x, y, Luma([if x < 25 { 50 } else { 150 }]));
                index.put_pixel(x, y, Luma([if x > 4 && y > 4 { 220 } else { 0 }]));
            }
        }
        rgb.save(dir.join("0001_cap_1_image_.png")).unwrap();
        depth.save(dir.join("0001_cap_1_distance_map_.png")).unwrap();
        index.save(dir.join("0001_cap_1_object_index_.png")).unwrap();
    }

    fn test_config(root: &Path) -> PreprocessConfig {
        PreprocessConfig {
            root_path_data: root.join("data"),
            folder_pre_processing: root.join("out"),
            nb_sub_divide_image: 1,
            sub_height_image: 20,
            sub_width_image: 20,
            ..PreprocessConfig::default()
        }
    }

    #[test]
    fn missing_root_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());
        let mut rng = StdRng::seed_from_u64(1);
        let mut namer = FileNamer::new(&mut rng);
        assert!(matches!(
            discover_ready_frames(&config, &mut namer, &mut rng),
            Err(PreprocessError::RootNotFound { .. })
        ));
    }

    #[test]
    fn readiness_propagates_from_the_sentinel_downward() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());
        let done = config.root_path_data.join("done");
        fs::create_dir_all(&done).unwrap();
        fs::write(done.join(SENTINEL_FILE), "").unwrap();
        // Two levels below the sentinel.
        write_frame(&done.join("grp001").join("2022-04-12-163055"));
        // A sibling subtree with frames but no sentinel anywhere.
        write_frame(
            &config
                .root_path_data
                .join("pending")
                .join("grp009")
                .join("2022-04-12-170000"),
        );

        let mut rng = StdRng::seed_from_u64(2);
        let mut namer = FileNamer::new(&mut rng);
        let groups = discover_ready_frames(&config, &mut namer, &mut rng).unwrap();
        assert_eq!(groups.len(), 1);
        let key = config.folder_pre_processing.join("grp001");
        assert_eq!(groups.get(&key).unwrap().len(), 1);
        assert_eq!(groups.get(&key).unwrap()[0].len(), 8);
    }

    #[test]
    fn frames_from_the_same_hour_share_a_group() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());
        let done = config.root_path_data.join("done");
        fs::create_dir_all(&done).unwrap();
        fs::write(done.join(SENTINEL_FILE), "").unwrap();
        write_frame(&done.join("grp001").join("2022-04-12-163055"));
        write_frame(&done.join("grp001").join("2022-04-12-163059"));

        let mut rng = StdRng::seed_from_u64(3);
        let mut namer = FileNamer::new(&mut rng);
        let groups = discover_ready_frames(&config, &mut namer, &mut rng).unwrap();
        assert_eq!(groups.len(), 1);
        let key = config.folder_pre_processing.join("grp001");
        assert_eq!(groups.get(&key).unwrap().len(), 2);
    }

    #[test]
    fn an_empty_tree_yields_no_groups() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());
        fs::create_dir_all(&config.root_path_data).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let mut namer = FileNamer::new(&mut rng);
        let groups = discover_ready_frames(&config, &mut namer, &mut rng).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn rename_mode_stamps_the_folder_label() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("real");
        let capture = root.join("capture_3");
        fs::create_dir_all(&capture).unwrap();
        fs::write(capture.join("shot.png"), "x").unwrap();
        let excluded = root.join("capture_9_EXCLUDE");
        fs::create_dir_all(&excluded).unwrap();
        fs::write(excluded.join("shot.png"), "x").unwrap();

        let renamed = rename_real_captures(&root).unwrap();
        assert_eq!(renamed, 1);
        assert!(capture.join("shot_3_.png").exists());
        assert!(excluded.join("shot.png").exists());
    }

    #[test]
    fn rename_mode_requires_the_root() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            rename_real_captures(&tmp.path().join("missing")),
            Err(PreprocessError::RootNotFound { .. })
        ));
    }
}
