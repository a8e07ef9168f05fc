//! Ground-truth remapping for solid-color textures.
//!
//! A texture that was a single flat color before upscaling must still be
//! flat afterwards, but neural upscalers like to invent grain and noise.
//! Instead of trying to clean the upscaled pixels, the pre-upscale original
//! is expanded with nearest-neighbor replication: each original pixel fills
//! its `s × s` block in the upscaled frame.
//!
//! Only images with one distinct color are routed here by the classifier.
//! The replication itself is exact for any original, so supporting textures
//! made of several flat regions only requires a different classification
//! gate, not a different mapping.

use crate::error::PipelineError;
use crate::image_access::ImageAsset;
use image::RgbaImage;

/// One original pixel and the block of upscaled pixels it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBlockMapping {
    /// Original x coordinate
    pub x: u32,
    /// Original y coordinate
    pub y: u32,
    /// Block edge length (the scale factor)
    pub scale: u32,
}

impl PixelBlockMapping {
    pub fn new(x: u32, y: u32, scale: u32) -> Self {
        Self { x, y, scale }
    }

    /// Top-left corner of the block in upscaled coordinates.
    pub fn origin(&self) -> (u32, u32) {
        (self.x * self.scale, self.y * self.scale)
    }

    /// Every upscaled coordinate covered by the block, row-major.
    pub fn coordinates(&self) -> impl Iterator<Item = (u32, u32)> {
        let (ox, oy) = self.origin();
        let scale = self.scale;
        (0..scale).flat_map(move |j| (0..scale).map(move |i| (ox + i, oy + j)))
    }
}

/// Integer scale factor between `original` and `upscaled` dimensions.
///
/// Both axes must scale by the same positive integer.
pub fn scale_factor(original: (u32, u32), upscaled: (u32, u32)) -> Option<u32> {
    let (ow, oh) = original;
    let (uw, uh) = upscaled;
    if ow == 0 || oh == 0 || uw % ow != 0 || uh % oh != 0 {
        return None;
    }
    let sx = uw / ow;
    let sy = uh / oh;
    if sx == sy && sx >= 1 {
        Some(sx)
    } else {
        None
    }
}

/// Replace the upscaled image with a block-replicated copy of the original.
///
/// Fails with [`PipelineError::DimensionMismatch`] when the dimensions are
/// not related by a single integer factor; nothing is guessed.
pub fn remap_solid_color(
    original: &ImageAsset,
    upscaled: &ImageAsset,
) -> Result<RgbaImage, PipelineError> {
    let scale = scale_factor(original.dimensions(), upscaled.dimensions()).ok_or_else(|| {
        PipelineError::DimensionMismatch {
            path: upscaled.path().to_path_buf(),
            original: original.dimensions(),
            upscaled: upscaled.dimensions(),
        }
    })?;

    let (width, height) = upscaled.dimensions();
    let mut remapped = RgbaImage::new(width, height);
    for (x, y, color) in original.image().enumerate_pixels() {
        for (ux, uy) in PixelBlockMapping::new(x, y, scale).coordinates() {
            remapped.put_pixel(ux, uy, *color);
        }
    }
    Ok(remapped)
}
