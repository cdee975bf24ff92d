//! End-to-end orchestration: discovery, augmentation, partitioning, and
//! manifest writing behind a single entry point.

use std::fs;

use rand::Rng;
use tracing::info;

use crate::config::PreprocessConfig;
use crate::discovery::{discover_ready_frames, rename_real_captures};
use crate::error::Result;
use crate::naming::FileNamer;
use crate::partition::{SplitSummary, partition_and_write};

/// What a run produced, depending on the configured mode.
#[derive(Debug)]
pub enum RunSummary {
    /// Full pipeline: capture tree subdivided, splits written.
    Preprocessed {
        groups: usize,
        splits: Vec<SplitSummary>,
    },
    /// Rename-only mode over a real capture tree.
    Renamed { files: usize },
}

/// The preprocessing pipeline, configured once and run to completion.
pub struct Pipeline {
    config: PreprocessConfig,
}

impl Pipeline {
    /// Validate the configuration and build a pipeline around it.
    pub fn new(config: PreprocessConfig) -> Result<Pipeline> {
        config.validate()?;
        Ok(Pipeline { config })
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Run with a thread-local RNG.
    pub fn run(&self) -> Result<RunSummary> {
        self.run_with_rng(&mut rand::thread_rng())
    }

    /// Run with a caller-supplied RNG, which fixes crop placement, output
    /// naming, and split assignment for a given seed.
    pub fn run_with_rng<R: Rng>(&self, rng: &mut R) -> Result<RunSummary> {
        fs::create_dir_all(&self.config.folder_pre_processing)?;
        if self.config.is_real_data {
            info!(root = %self.config.path_real_data.display(), "rename-only mode");
            let files = rename_real_captures(&self.config.path_real_data)?;
            info!(files, "renamed real captures");
            return Ok(RunSummary::Renamed { files });
        }

        info!(root = %self.config.root_path_data.display(), "scanning capture tree");
        let mut namer = FileNamer::new(rng);
        let groups = discover_ready_frames(&self.config, &mut namer, rng)?;
        info!(groups = groups.len(), "discovery complete");
        let splits = partition_and_write(&groups, &self.config, rng)?;
        Ok(RunSummary::Preprocessed {
            groups: groups.len(),
            splits,
        })
    }
}
