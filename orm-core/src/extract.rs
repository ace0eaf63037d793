//! Channel extraction.
//!
//! Splits a packed texture into grayscale AO, Roughness, and Metallic maps
//! (plus Height from alpha when requested). The inverse of RMA packing.

use crate::codec::{GrayPlane, SourceImage};
use crate::options::ProcessingOptions;
use crate::preset::{Channel, ChannelMapping};
use crate::Result;

/// Semantic map produced by extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKind {
    AmbientOcclusion,
    Roughness,
    Metallic,
    Height,
}

impl MapKind {
    /// File name suffix for outputs of this kind
    pub fn suffix(&self) -> &'static str {
        match self {
            MapKind::AmbientOcclusion => "AO",
            MapKind::Roughness => "Roughness",
            MapKind::Metallic => "Metallic",
            MapKind::Height => "Height",
        }
    }
}

/// Extracts the grayscale maps from a packed image.
///
/// Returns AO, Roughness, and Metallic in that order, followed by Height when
/// `export_alpha_as_height` is set and the image has an alpha plane. Output
/// planes always have the source dimensions and bit depth.
pub fn extract(
    image: &SourceImage,
    mapping: &ChannelMapping,
    options: &ProcessingOptions,
) -> Result<Vec<(MapKind, GrayPlane)>> {
    let channels = image.channel_count();
    if channels < 3 {
        return Err(crate::Error::UnsupportedChannelCount(channels as u8));
    }

    let mut maps = vec![
        (
            MapKind::AmbientOcclusion,
            channel_plane(image, mapping.ao, false),
        ),
        (
            MapKind::Roughness,
            channel_plane(image, mapping.roughness, options.invert_roughness),
        ),
        (
            MapKind::Metallic,
            channel_plane(image, mapping.metallic, options.invert_metallic),
        ),
    ];

    if options.export_alpha_as_height {
        if let Some(alpha) = image.alpha() {
            maps.push((MapKind::Height, plane_from(image, alpha.to_vec())));
        }
    }

    Ok(maps)
}

fn channel_plane(image: &SourceImage, channel: Channel, invert: bool) -> GrayPlane {
    let source = &image.planes[channel.index()];
    let samples = if invert {
        let max = image.depth.max_value();
        source.iter().map(|&v| max - v.min(max)).collect()
    } else {
        source.clone()
    };
    plane_from(image, samples)
}

fn plane_from(image: &SourceImage, samples: Vec<u16>) -> GrayPlane {
    GrayPlane {
        width: image.width,
        height: image.height,
        depth: image.depth,
        samples,
    }
}
