//! Image decode/encode behind a narrow capability interface.
//!
//! The pipeline never talks to the `image` crate directly; it goes through
//! [`ImageAccess`] so tests can substitute fakes. [`FsImageAccess`] is the
//! production implementation and always writes through a temporary file in
//! the destination directory that is renamed over the target, so an
//! interrupted write never leaves a truncated image behind.

use crate::error::PipelineError;
use image::{ColorType, ImageError, ImageFormat, RgbaImage};
use std::path::{Path, PathBuf};

/// Decode and encode RGBA pixel buffers.
pub trait ImageAccess: Send + Sync {
    /// Decode the file at `path` into an RGBA buffer.
    fn decode(&self, path: &Path) -> Result<RgbaImage, PipelineError>;

    /// Encode `image` to `path`, replacing any existing file.
    fn encode(&self, path: &Path, image: &RgbaImage) -> Result<(), PipelineError>;
}

/// An image file and its decoded pixels.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    path: PathBuf,
    image: RgbaImage,
}

impl ImageAsset {
    /// Wrap an already decoded buffer.
    pub fn new(path: impl Into<PathBuf>, image: RgbaImage) -> Self {
        Self { path: path.into(), image }
    }

    /// Decode `path` through `access`.
    pub fn load(access: &dyn ImageAccess, path: &Path) -> Result<Self, PipelineError> {
        let image = access.decode(path)?;
        Ok(Self::new(path, image))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// True when the buffer holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Filesystem-backed [`ImageAccess`] using the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageAccess;

impl FsImageAccess {
    pub fn new() -> Self {
        Self
    }
}

impl ImageAccess for FsImageAccess {
    fn decode(&self, path: &Path) -> Result<RgbaImage, PipelineError> {
        let image = image::open(path).map_err(|e| match e {
            ImageError::IoError(source) => PipelineError::io(path, source),
            other => PipelineError::decode(path, other.to_string()),
        })?;
        Ok(image.to_rgba8())
    }

    fn encode(&self, path: &Path, image: &RgbaImage) -> Result<(), PipelineError> {
        let format = ImageFormat::from_path(path)
            .map_err(|e| PipelineError::encode(path, e.to_string()))?;
        if !supports_alpha(format) {
            return Err(PipelineError::encode(
                path,
                format!("{:?} output cannot store an alpha channel", format),
            ));
        }

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = tempfile::Builder::new()
            .prefix(".texpack-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| PipelineError::io(path, e))?;

        let (width, height) = image.dimensions();
        image::write_buffer_with_format(
            temp.as_file_mut(),
            image.as_raw(),
            width,
            height,
            ColorType::Rgba8,
            format,
        )
        .map_err(|e| match e {
            ImageError::IoError(source) => PipelineError::io(path, source),
            other => PipelineError::encode(path, other.to_string()),
        })?;

        temp.persist(path).map_err(|e| PipelineError::io(path, e.error))?;
        tracing::trace!(path = %path.display(), "Wrote image");
        Ok(())
    }
}

/// Whether `format` can carry an RGBA buffer without dropping alpha.
pub fn supports_alpha(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png
            | ImageFormat::Tiff
            | ImageFormat::Tga
            | ImageFormat::Bmp
            | ImageFormat::Qoi
    )
}
