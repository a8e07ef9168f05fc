//! Batch repair pipeline for upscaled textures
//!
//! Sorts a batch of upscaled images by color count and repairs the two
//! kinds an upscaler damages.
//!
//! # Overview
//!
//! The pipeline consists of:
//! - **Discovery**: Find image files by extension and write list files
//! - **Classification**: Move single-color and two-color images into their
//!   own directories
//! - **Repair**: Rebuild mask alpha and remap solid-color images from their
//!   originals, on a bounded worker pool
//!
//! # Example
//!
//! ```ignore
//! use texpack::batch::{BatchContext, Pipeline};
//! use texpack::config::load_config;
//! use texpack::image_access::FsImageAccess;
//! use texpack::originals::MirrorLocator;
//!
//! let config = load_config(None)?;
//! let context = BatchContext::new(config, output_dir);
//! let mut pipeline = Pipeline::new(
//!     context,
//!     Box::new(FsImageAccess::new()),
//!     Box::new(MirrorLocator::new("originals")),
//! );
//!
//! let report = pipeline.run(&images)?;
//! println!("{}", report.summary());
//! ```

pub mod context;
pub mod discovery;
pub mod parallel;
pub mod pipeline;
pub mod result;

pub use context::*;
pub use discovery::*;
pub use parallel::*;
pub use pipeline::*;
pub use result::*;
