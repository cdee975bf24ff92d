//! Dataset partitioning and manifest writing: shuffles sample groups into
//! training/validation/test blocks, filters each triple through contour
//! derivation, and serializes the survivors.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::SliceRandom;
use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::algorithms::{ContourOutcome, derive_contours};
use crate::config::PreprocessConfig;
use crate::error::{PreprocessError, Result};
use crate::naming::configuration_label;
use crate::types::{AugmentedTriple, SampleGroups, SplitKind};

/// Group counts per split. Training and test are floored shares of the
/// total; validation absorbs the rounding remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitCounts {
    pub training: usize,
    pub validation: usize,
    pub test: usize,
}

impl SplitCounts {
    pub fn from_percentages(total: usize, percentage_training: u32, percentage_validation: u32) -> Self {
        let percentage_test =
            100u32.saturating_sub(percentage_training + percentage_validation);
        let training = total * percentage_training as usize / 100;
        let test = total * percentage_test as usize / 100;
        SplitCounts {
            training,
            validation: total - training - test,
            test,
        }
    }

    fn for_kind(&self, kind: SplitKind) -> usize {
        match kind {
            SplitKind::Training => self.training,
            SplitKind::Validation => self.validation,
            SplitKind::Test => self.test,
        }
    }
}

/// What one split ended up with after contour filtering.
#[derive(Debug, Clone)]
pub struct SplitSummary {
    pub kind: SplitKind,
    pub groups: usize,
    pub retained: usize,
    pub dropped: usize,
    pub manifest: PathBuf,
}

/// Assign shuffled group keys to contiguous split blocks in
/// [training][validation][test] order.
fn assign_splits<'a, R: Rng>(
    groups: &'a SampleGroups,
    counts: &SplitCounts,
    rng: &mut R,
) -> Vec<(SplitKind, Vec<&'a PathBuf>)> {
    let mut keys: Vec<&PathBuf> = groups.keys().collect();
    keys.shuffle(rng);
    let mut offset = 0;
    SplitKind::iter()
        .map(|kind| {
            let count = counts.for_kind(kind);
            let block = keys[offset..offset + count].to_vec();
            offset += count;
            (kind, block)
        })
        .collect()
}

/// Shuffle the sample groups into three splits, filter every triple through
/// contour derivation, and write one manifest per split under the output
/// root.
pub fn partition_and_write<R: Rng>(
    groups: &SampleGroups,
    config: &PreprocessConfig,
    rng: &mut R,
) -> Result<Vec<SplitSummary>> {
    if groups.len() < 3 {
        return Err(PreprocessError::NotEnoughGroups {
            found: groups.len(),
        });
    }
    let counts = SplitCounts::from_percentages(
        groups.len(),
        config.percentage_training,
        config.percentage_validation,
    );
    info!(
        training = counts.training,
        validation = counts.validation,
        test = counts.test,
        "sample groups per split"
    );

    let mut summaries = Vec::new();
    for (kind, block) in assign_splits(groups, &counts, rng) {
        let triples: Vec<&AugmentedTriple> = block
            .iter()
            .flat_map(|&key| groups.get(key).into_iter().flatten().flatten())
            .collect();
        let candidates = triples.len();
        let retained = retain_derivable(kind, triples)?;
        let manifest = config.folder_pre_processing.join(kind.manifest_name());
        write_manifest(&manifest, &retained)?;
        info!(
            split = %kind,
            retained = retained.len(),
            manifest = %manifest.display(),
            "wrote manifest"
        );
        summaries.push(SplitSummary {
            kind,
            groups: block.len(),
            retained: retained.len(),
            dropped: candidates - retained.len(),
            manifest,
        });
    }
    Ok(summaries)
}

/// Run every triple through contour derivation, keeping the ones whose
/// depth file now carries a usable contour raster.
fn retain_derivable<'a>(
    kind: SplitKind,
    triples: Vec<&'a AugmentedTriple>,
) -> Result<Vec<&'a AugmentedTriple>> {
    let total = triples.len();
    let mut kept = Vec::new();
    for (index, triple) in triples.into_iter().enumerate() {
        if index % 1000 == 0 {
            info!(split = %kind, "contour derivation progress {index}/{total}");
        }
        match derive_contours(&triple.depth, &triple.ground_truth)? {
            ContourOutcome::Derived => kept.push(triple),
            ContourOutcome::Degenerate => {
                debug!(depth = %triple.depth.display(), "dropped degenerate sample");
            }
        }
    }
    Ok(kept)
}

/// Write one manifest: a retained-count header line, then one
/// `depth;image;ground_truth;label` line per triple with backslashes
/// doubled.
pub fn write_manifest(path: &Path, triples: &[&AugmentedTriple]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{}", triples.len())?;
    for triple in triples {
        let image_name = triple
            .image
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let label = configuration_label(&image_name)
            .ok_or_else(|| PreprocessError::MalformedFileName {
                name: image_name.clone(),
            })?
            .to_string();
        writeln!(
            out,
            "{};{};{};{}",
            escape_path(&triple.depth),
            escape_path(&triple.image),
            escape_path(&triple.ground_truth),
            label
        )?;
    }
    out.flush()?;
    Ok(())
}

fn escape_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "\\\\")
}
