//! Processing options and TOML config.
//!
//! Options are fixed for one invocation. A config file supplies defaults that
//! command-line flags can override.

use crate::preset::ChannelPreset;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Options shared by every file in a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingOptions {
    pub preset: ChannelPreset,
    /// Invert roughness (gloss → rough)
    pub invert_roughness: bool,
    pub invert_metallic: bool,
    /// Write the alpha channel, when present, as a Height map
    pub export_alpha_as_height: bool,
    /// Treat the input as a folder and process it recursively
    pub batch: bool,
}

/// Config file contents (TOML)
///
/// ```toml
/// output_dir = "unpacked"
/// preset = "MRA"
/// invert_roughness = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpackConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(flatten)]
    pub options: ProcessingOptions,
}

impl UnpackConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let table: toml::Table = s
            .parse()
            .map_err(|e: toml::de::Error| crate::Error::Config(e.message().to_string()))?;
        // Unknown presets surface as UnknownPreset rather than a generic config error
        if let Some(preset) = table.get("preset").and_then(|v| v.as_str()) {
            preset.parse::<ChannelPreset>()?;
        }
        toml::from_str(s).map_err(|e: toml::de::Error| crate::Error::Config(e.message().to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::Config(format!("could not read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }
}
