//! Color-complexity classification of upscaled textures.
//!
//! Every output image lands in exactly one bucket based on how many distinct
//! RGBA values it contains:
//!
//! | Distinct colors | Classification | Destination |
//! |-----------------|----------------|-------------|
//! | 1 | [`Classification::SolidColor`] | `solid_color/` |
//! | 2 | [`Classification::Mask`] | `masks/` |
//! | 3+ | [`Classification::Unclassified`] | stays in place |

use crate::error::PipelineError;
use crate::image_access::ImageAsset;
use crate::mask::luminance;
use image::RgbaImage;
use serde::Serialize;
use std::collections::HashMap;

/// Occurrence count of every RGBA value in an image.
#[derive(Debug, Clone, Default)]
pub struct ColorHistogram {
    counts: HashMap<[u8; 4], usize>,
}

impl ColorHistogram {
    /// Count every pixel of `image`.
    pub fn from_image(image: &RgbaImage) -> Self {
        let mut counts = HashMap::new();
        for pixel in image.pixels() {
            *counts.entry(pixel.0).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Number of distinct colors.
    pub fn distinct_colors(&self) -> usize {
        self.counts.len()
    }

    /// How often `color` occurs.
    pub fn count(&self, color: [u8; 4]) -> usize {
        self.counts.get(&color).copied().unwrap_or(0)
    }

    /// Total number of pixels counted.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// The darkest and lightest colors by luminance, or `None` when empty.
    ///
    /// Ties on luminance are broken by the raw channel values so the result
    /// does not depend on hash iteration order.
    pub fn luminance_extremes(&self) -> Option<([u8; 4], [u8; 4])> {
        let key = |c: &&[u8; 4]| (luminance(**c), **c);
        let darkest = self.counts.keys().min_by_key(key)?;
        let lightest = self.counts.keys().max_by_key(key)?;
        Some((*darkest, *lightest))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8; 4], &usize)> {
        self.counts.iter()
    }
}

/// Bucket assigned to an upscaled image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Exactly one color
    SolidColor,
    /// Exactly two colors
    Mask,
    /// Anything else
    Unclassified,
}

impl Classification {
    /// Map a distinct-color count to its bucket.
    pub fn from_distinct_colors(n: usize) -> Self {
        match n {
            1 => Classification::SolidColor,
            2 => Classification::Mask,
            _ => Classification::Unclassified,
        }
    }

    /// Whether this bucket has a repair stage.
    pub fn needs_repair(&self) -> bool {
        !matches!(self, Classification::Unclassified)
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::SolidColor => write!(f, "solid color"),
            Classification::Mask => write!(f, "mask"),
            Classification::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// Classify a decoded image by its distinct-color count.
///
/// Fails with [`PipelineError::Decode`] for an image without pixels.
pub fn classify(asset: &ImageAsset) -> Result<Classification, PipelineError> {
    if asset.is_empty() {
        return Err(PipelineError::decode(
            asset.path(),
            format!("image has no pixels ({}x{})", asset.width(), asset.height()),
        ));
    }
    let histogram = ColorHistogram::from_image(asset.image());
    Ok(Classification::from_distinct_colors(histogram.distinct_colors()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn asset_with_colors(colors: &[[u8; 4]], width: u32, height: u32) -> ImageAsset {
        let image = RgbaImage::from_fn(width, height, |x, y| {
            Rgba(colors[((y * width + x) as usize) % colors.len()])
        });
        ImageAsset::new("tex.png", image)
    }

    #[test]
    fn test_single_color_is_solid() {
        let asset = asset_with_colors(&[[255, 0, 0, 255]], 50, 50);
        assert_eq!(classify(&asset).unwrap(), Classification::SolidColor);
    }

    #[test]
    fn test_two_colors_is_mask() {
        let asset = asset_with_colors(&[[0, 0, 0, 255], [255, 255, 255, 255]], 100, 100);
        assert_eq!(classify(&asset).unwrap(), Classification::Mask);
    }

    #[test]
    fn test_three_or_more_colors_is_unclassified() {
        for n in 3..8u8 {
            let colors: Vec<[u8; 4]> = (0..n).map(|i| [i * 30, 0, 0, 255]).collect();
            let asset = asset_with_colors(&colors, 16, 16);
            assert_eq!(classify(&asset).unwrap(), Classification::Unclassified, "{} colors", n);
        }
    }

    #[test]
    fn test_alpha_counts_as_distinct_color() {
        let asset = asset_with_colors(&[[0, 0, 0, 255], [0, 0, 0, 0]], 4, 4);
        assert_eq!(classify(&asset).unwrap(), Classification::Mask);
    }

    #[test]
    fn test_empty_image_is_decode_error() {
        let asset = ImageAsset::new("empty.png", RgbaImage::new(0, 0));
        assert!(matches!(classify(&asset), Err(PipelineError::Decode { .. })));
    }

    #[test]
    fn test_histogram_counts() {
        let asset = asset_with_colors(&[[1, 2, 3, 255], [4, 5, 6, 255]], 4, 4);
        let histogram = ColorHistogram::from_image(asset.image());

        assert_eq!(histogram.distinct_colors(), 2);
        assert_eq!(histogram.count([1, 2, 3, 255]), 8);
        assert_eq!(histogram.count([4, 5, 6, 255]), 8);
        assert_eq!(histogram.count([9, 9, 9, 255]), 0);
        assert_eq!(histogram.total(), 16);
    }

    #[test]
    fn test_luminance_extremes() {
        let asset = asset_with_colors(&[[200, 200, 200, 255], [20, 30, 40, 255]], 2, 2);
        let histogram = ColorHistogram::from_image(asset.image());

        let (dark, light) = histogram.luminance_extremes().unwrap();
        assert_eq!(dark, [20, 30, 40, 255]);
        assert_eq!(light, [200, 200, 200, 255]);
        assert!(ColorHistogram::default().luminance_extremes().is_none());
    }

    #[test]
    fn test_needs_repair() {
        assert!(Classification::SolidColor.needs_repair());
        assert!(Classification::Mask.needs_repair());
        assert!(!Classification::Unclassified.needs_repair());
    }
}
