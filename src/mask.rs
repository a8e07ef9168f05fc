//! Alpha reconstruction for mask textures.
//!
//! Upscalers drop the alpha channel of stencil textures and hand back an
//! opaque two-tone image. The darker of the observed colors is mapped to
//! fully transparent, the lighter to fully opaque, and anything in between
//! (anti-aliased edges) is interpolated linearly on luminance. Color
//! channels are never touched.

use crate::classify::ColorHistogram;
use image::{Rgba, RgbaImage};

/// Rec. 601 luma scaled by 1000, exact in integer arithmetic.
pub fn luminance(color: [u8; 4]) -> u32 {
    299 * color[0] as u32 + 587 * color[1] as u32 + 114 * color[2] as u32
}

/// Linear luminance → alpha ramp between two anchor luminances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlphaMapping {
    transparent: u32,
    opaque: u32,
}

impl AlphaMapping {
    /// Ramp from `transparent` (alpha 0) to `opaque` (alpha 255).
    pub fn new(transparent: u32, opaque: u32) -> Self {
        Self { transparent: transparent.min(opaque), opaque: transparent.max(opaque) }
    }

    /// Anchor the ramp on the darkest and lightest colors of `histogram`.
    pub fn from_histogram(histogram: &ColorHistogram) -> Option<Self> {
        let (dark, light) = histogram.luminance_extremes()?;
        Some(Self::new(luminance(dark), luminance(light)))
    }

    /// Alpha for a luminance value. A ramp without contrast is fully opaque.
    pub fn alpha(&self, luma: u32) -> u8 {
        let span = self.opaque - self.transparent;
        if span == 0 {
            return u8::MAX;
        }
        let offset = luma.clamp(self.transparent, self.opaque) - self.transparent;
        ((offset as u64 * 255 + span as u64 / 2) / span as u64) as u8
    }
}

/// Rebuild the alpha channel of a mask image.
///
/// The returned image has the same dimensions and RGB values as `image`.
pub fn fix_mask(image: &RgbaImage) -> RgbaImage {
    let histogram = ColorHistogram::from_image(image);
    let Some(mapping) = AlphaMapping::from_histogram(&histogram) else {
        return image.clone();
    };

    let mut fixed = image.clone();
    for pixel in fixed.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        *pixel = Rgba([r, g, b, mapping.alpha(luminance(pixel.0))]);
    }
    fixed
}
