//! # ORM Core
//!
//! Engine for unpacking channel-packed PBR textures (ORM, MRA, RMA) into
//! separate grayscale maps. Designed for use by CLI tools and desktop applications.
//!
//! ## Architecture
//!
//! - [`preset`] - Channel presets and their R/G/B assignments
//! - [`codec`] - Image decoding/encoding and the supported format table
//! - [`extract`] - Channel extraction and inversion
//! - [`naming`] - Output file naming
//! - [`options`] - Processing options and TOML config
//! - [`batch`] - Single-file and folder orchestration
//! - [`report`] - Run summary for JSON export

pub mod batch;
pub mod codec;
pub mod extract;
pub mod naming;
pub mod options;
pub mod preset;
pub mod report;

use std::path::PathBuf;

// Re-export main types for convenient access
pub use batch::{discover_images, BatchResult, FailureKind, Outcome, Unpacker};
pub use codec::{
    is_supported_extension, BitDepth, GrayPlane, ImageAccessor, ImageCodec, SourceImage,
    SUPPORTED_EXTENSIONS,
};
pub use extract::{extract, MapKind};
pub use naming::output_path;
pub use options::{ProcessingOptions, UnpackConfig};
pub use preset::{resolve, Channel, ChannelMapping, ChannelPreset};
pub use report::BatchReport;

/// Common result type for unpack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Library-wide error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unknown preset: {0}. Use ORM, MRA, or RMA.")]
    UnknownPreset(String),

    #[error("Failed to decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("Unsupported channel count: {0} (RGB or RGBA required)")]
    UnsupportedChannelCount(u8),

    #[error("Failed to encode {}: {reason}", .path.display())]
    Encode { path: PathBuf, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Classifies errors that are recoverable per file in batch mode.
    /// Returns `None` for fatal setup errors.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Error::Decode { .. } => Some(FailureKind::Decode),
            Error::UnsupportedChannelCount(_) => Some(FailureKind::UnsupportedChannelCount),
            Error::Encode { .. } => Some(FailureKind::Encode),
            _ => None,
        }
    }
}
