//! # Capture Preprocessing Library
//!
//! Turns a tree of rendered brick-scene captures into training-ready
//! datasets: discovers completed capture folders, extracts aligned
//! sub-images across the RGB/depth/object-index modalities, augments them,
//! derives thin object contours from depth discontinuities, and partitions
//! the results into training/validation/test manifests.
//!
//! ## Core Features
//!
//! - **Readiness-driven Discovery**: only capture folders marked complete by
//!   the render driver's sentinel file are consumed
//! - **Aligned Augmentation**: every crop window and geometric transform is
//!   applied identically across the three modalities
//! - **Contour Ground Truth**: dense segmentation masks become thin boundary
//!   maps, with depth as the edge signal
//! - **Leak-free Partitioning**: all crops of one source frame move into the
//!   same dataset split
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use preprocessing::{Pipeline, PreprocessConfig};
//!
//! let config = PreprocessConfig::from_json_file("config.json")?;
//! let summary = Pipeline::new(config)?.run()?;
//! println!("{summary:?}");
//! # Ok::<(), preprocessing::PreprocessError>(())
//! ```

// Core modules
pub mod algorithms;
pub mod codec;
pub mod config;
pub mod discovery;
pub mod error;
pub mod naming;
pub mod partition;
pub mod pipeline;
pub mod types;

// Re-exports for convenience
pub use algorithms::{Augmentation, ContourOutcome, derive_contours, refine_edges, subdivide_frame};
pub use config::PreprocessConfig;
pub use discovery::{EXCLUDE_TAG, SENTINEL_FILE, discover_ready_frames, rename_real_captures};
pub use error::{PreprocessError, Result};
pub use naming::FileNamer;
pub use partition::{SplitCounts, SplitSummary, partition_and_write};
pub use pipeline::{Pipeline, RunSummary};
pub use types::{AugmentedTriple, CropWindow, Modality, SampleGroups, SplitKind};
