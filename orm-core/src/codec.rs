//! Image decoding and encoding.
//!
//! Loads PNG, JPG, TGA, and TIFF files into per-channel planes and writes
//! single-channel planes back out as grayscale PNG.

use crate::Result;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, ImageReader, Luma};
use std::path::Path;

/// Supported input extensions (lowercase) and the format each one decodes as
pub const SUPPORTED_EXTENSIONS: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("tga", ImageFormat::Tga),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
];

/// Format for a path based on its extension (case-insensitive)
pub fn format_for_path(path: &Path) -> Option<ImageFormat> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    SUPPORTED_EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, format)| *format)
}

pub fn is_supported_extension(path: &Path) -> bool {
    format_for_path(path).is_some()
}

/// Sample precision of a decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    Eight,
    Sixteen,
}

impl BitDepth {
    /// Largest representable intensity
    pub fn max_value(self) -> u16 {
        match self {
            BitDepth::Eight => u8::MAX as u16,
            BitDepth::Sixteen => u16::MAX,
        }
    }
}

/// A decoded image split into channel planes (R, G, B and optional A).
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub width: u32,
    pub height: u32,
    pub depth: BitDepth,
    /// One row-major plane per channel
    pub planes: Vec<Vec<u16>>,
}

impl SourceImage {
    /// Build from explicit planes. Every plane must hold width * height samples.
    pub fn from_planes(width: u32, height: u32, depth: BitDepth, planes: Vec<Vec<u16>>) -> Result<Self> {
        let expected = (width as usize) * (height as usize);
        if let Some(bad) = planes.iter().find(|p| p.len() != expected) {
            return Err(crate::Error::InvalidConfiguration(format!(
                "plane holds {} samples, expected {} for {}x{}",
                bad.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            depth,
            planes,
        })
    }

    pub fn channel_count(&self) -> usize {
        self.planes.len()
    }

    pub fn alpha(&self) -> Option<&[u16]> {
        self.planes.get(3).map(Vec::as_slice)
    }

    fn from_dynamic(image: DynamicImage) -> Result<Self> {
        let color = image.color();
        let channels = color.channel_count();
        if channels < 3 {
            return Err(crate::Error::UnsupportedChannelCount(channels));
        }

        let (width, height) = image.dimensions();
        let wide = color.bytes_per_pixel() / channels > 1;
        let has_alpha = color.has_alpha();

        // into_* reuses the decoded buffer when it already has the target layout
        let (depth, planes) = match (wide, has_alpha) {
            (false, false) => (BitDepth::Eight, split_planes(image.into_rgb8().into_raw(), 3)),
            (false, true) => (BitDepth::Eight, split_planes(image.into_rgba8().into_raw(), 4)),
            (true, false) => (BitDepth::Sixteen, split_planes(image.into_rgb16().into_raw(), 3)),
            (true, true) => (BitDepth::Sixteen, split_planes(image.into_rgba16().into_raw(), 4)),
        };

        Ok(Self {
            width,
            height,
            depth,
            planes,
        })
    }
}

/// De-interleaves `samples` into `stride` planes. The interleaved buffer is
/// dropped on return.
fn split_planes<T: Copy + Into<u16>>(samples: Vec<T>, stride: usize) -> Vec<Vec<u16>> {
    let mut planes: Vec<Vec<u16>> = (0..stride)
        .map(|_| Vec::with_capacity(samples.len() / stride))
        .collect();
    for pixel in samples.chunks_exact(stride) {
        for (plane, &sample) in planes.iter_mut().zip(pixel) {
            plane.push(sample.into());
        }
    }
    planes
}

/// A single grayscale plane ready for encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayPlane {
    pub width: u32,
    pub height: u32,
    pub depth: BitDepth,
    /// Row-major intensities, one per pixel
    pub samples: Vec<u16>,
}

impl GrayPlane {
    /// Intensity at (x, y)
    pub fn get(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

/// Decodes source images and encodes output planes.
pub trait ImageAccessor {
    fn decode(&self, path: &Path) -> Result<SourceImage>;

    fn encode(&self, plane: &GrayPlane, path: &Path) -> Result<()>;
}

/// [`ImageAccessor`] backed by the `image` crate. Output is always PNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl ImageAccessor for ImageCodec {
    fn decode(&self, path: &Path) -> Result<SourceImage> {
        let decode_err = |reason: String| crate::Error::Decode {
            path: path.to_path_buf(),
            reason,
        };

        let mut reader = ImageReader::open(path).map_err(|e| decode_err(e.to_string()))?;
        let format = format_for_path(path);
        if let Some(format) = format {
            reader.set_format(format);
        }
        // TGA has no magic bytes; for everything else the header wins over the extension
        if format != Some(ImageFormat::Tga) {
            reader = reader
                .with_guessed_format()
                .map_err(|e| decode_err(e.to_string()))?;
        }
        let image = reader.decode().map_err(|e| decode_err(e.to_string()))?;

        SourceImage::from_dynamic(image)
    }

    fn encode(&self, plane: &GrayPlane, path: &Path) -> Result<()> {
        let encode_err = |reason: String| crate::Error::Encode {
            path: path.to_path_buf(),
            reason,
        };
        let invalid = || encode_err("Invalid plane dimensions".into());

        let saved = match plane.depth {
            BitDepth::Eight => {
                let bytes: Vec<u8> = plane
                    .samples
                    .iter()
                    .map(|&v| v.min(u8::MAX as u16) as u8)
                    .collect();
                let img: ImageBuffer<Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(plane.width, plane.height, bytes).ok_or_else(invalid)?;
                img.save_with_format(path, ImageFormat::Png)
            }
            BitDepth::Sixteen => {
                let img: ImageBuffer<Luma<u16>, Vec<u16>> =
                    ImageBuffer::from_raw(plane.width, plane.height, plane.samples.clone())
                        .ok_or_else(invalid)?;
                img.save_with_format(path, ImageFormat::Png)
            }
        };

        saved.map_err(|e| encode_err(e.to_string()))
    }
}
