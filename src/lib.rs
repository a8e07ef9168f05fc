//! texpack - Post-processing for AI-upscaled textures
//!
//! This library provides functionality to:
//! - Classify upscaled textures by their number of distinct colors
//! - Rebuild the alpha channel of two-color masks from luminance
//! - Replace solid-color upscales with block copies of their originals
//! - Run the whole batch on a bounded worker pool with a per-item report

pub mod batch;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod image_access;
pub mod mask;
pub mod originals;
pub mod solid;
pub mod upscaler;
