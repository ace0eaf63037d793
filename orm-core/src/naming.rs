//! Output file naming.

use crate::extract::MapKind;
use std::path::{Path, PathBuf};

/// Output extension; every map is written as PNG.
pub const OUTPUT_EXTENSION: &str = "png";

/// `<output_dir>/<input stem>_<Suffix>.png`
///
/// No collision detection: an existing file at that path is overwritten.
pub fn output_path(input: &Path, output_dir: &Path, kind: MapKind) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "texture".to_string());
    output_dir.join(format!("{}_{}.{}", stem, kind.suffix(), OUTPUT_EXTENSION))
}
