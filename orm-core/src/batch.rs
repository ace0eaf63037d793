//! Single-file and folder orchestration.
//!
//! Validates the run configuration, discovers input images, and unpacks each
//! one in turn. In batch mode a file that fails is recorded and the run moves
//! on; in single-file mode the failure is returned as an error.
//!
//! Discovery recurses into subdirectories in file-name order. Symlinked
//! directories are not descended; symlinked files are processed like any
//! other file. When the output folder lies inside the input folder it is not
//! scanned, so earlier outputs are never picked up as inputs.

use crate::codec::{is_supported_extension, ImageAccessor, ImageCodec};
use crate::extract::extract;
use crate::naming::output_path;
use crate::options::ProcessingOptions;
use crate::preset::ChannelMapping;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Why a file could not be unpacked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Decode,
    UnsupportedChannelCount,
    Encode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success { outputs: Vec<PathBuf> },
    Failure { kind: FailureKind, message: String },
}

/// Result of unpacking one input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl BatchResult {
    pub fn success(path: PathBuf, outputs: Vec<PathBuf>) -> Self {
        Self {
            path,
            outcome: Outcome::Success { outputs },
        }
    }

    pub fn failure(path: PathBuf, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            path,
            outcome: Outcome::Failure {
                kind,
                message: message.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    /// Written output paths (empty on failure)
    pub fn outputs(&self) -> &[PathBuf] {
        match &self.outcome {
            Outcome::Success { outputs } => outputs,
            Outcome::Failure { .. } => &[],
        }
    }
}

/// Unpacks packed textures with a fixed set of options.
pub struct Unpacker<A: ImageAccessor = ImageCodec> {
    options: ProcessingOptions,
    mapping: ChannelMapping,
    accessor: A,
}

impl Unpacker<ImageCodec> {
    pub fn new(options: ProcessingOptions) -> Self {
        Self::with_accessor(options, ImageCodec)
    }
}

impl<A: ImageAccessor> Unpacker<A> {
    pub fn with_accessor(options: ProcessingOptions, accessor: A) -> Self {
        Self {
            mapping: options.preset.mapping(),
            options,
            accessor,
        }
    }

    /// Unpacks `input` (a file, or a folder in batch mode) into `output_dir`.
    ///
    /// Results are returned in discovery order. Configuration errors are
    /// returned before any file is read.
    pub fn run(&self, input: &Path, output_dir: &Path) -> Result<Vec<BatchResult>> {
        validate_paths(input, output_dir, self.options.batch)?;
        fs::create_dir_all(output_dir)?;

        let files = if self.options.batch {
            discover_images(input, Some(output_dir))?
        } else {
            vec![input.to_path_buf()]
        };
        tracing::debug!("Discovered {} image(s) under {}", files.len(), input.display());

        let mut results = Vec::with_capacity(files.len());
        for file in files {
            match self.process_file(&file, output_dir) {
                Ok(outputs) => results.push(BatchResult::success(file, outputs)),
                Err(e) => match e.failure_kind() {
                    Some(kind) if self.options.batch => {
                        tracing::debug!("Recorded failure for {}: {}", file.display(), e);
                        results.push(BatchResult::failure(file, kind, e.to_string()));
                    }
                    _ => return Err(e),
                },
            }
        }
        Ok(results)
    }

    /// Decodes, extracts, and writes the maps for one file.
    pub fn process_file(&self, input: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let image = self.accessor.decode(input)?;
        tracing::debug!(
            "Decoded {} ({}x{}, {} channel(s), {:?})",
            input.display(),
            image.width,
            image.height,
            image.channel_count(),
            image.depth
        );

        let maps = extract(&image, &self.mapping, &self.options)?;
        drop(image);

        let mut written = Vec::with_capacity(maps.len());
        for (kind, plane) in &maps {
            let path = output_path(input, output_dir, *kind);
            self.accessor.encode(plane, &path)?;
            tracing::info!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

fn validate_paths(input: &Path, output_dir: &Path, batch: bool) -> Result<()> {
    if output_dir.as_os_str().is_empty() {
        return Err(crate::Error::InvalidConfiguration(
            "an output folder is required".into(),
        ));
    }
    if !input.exists() {
        return Err(crate::Error::InvalidConfiguration(format!(
            "input path does not exist: {}",
            input.display()
        )));
    }
    if batch && !input.is_dir() {
        return Err(crate::Error::InvalidConfiguration(format!(
            "in batch mode the input must be a folder: {}",
            input.display()
        )));
    }
    if !batch && !input.is_file() {
        return Err(crate::Error::InvalidConfiguration(format!(
            "input path is not a file: {} (use batch mode for folders)",
            input.display()
        )));
    }
    Ok(())
}

/// Recursively collects supported images under `root`, in file-name order.
///
/// Files with other extensions are skipped silently, as is the `exclude`
/// folder. Unreadable subfolders are logged and skipped; an unreadable `root`
/// is an error.
pub fn discover_images(root: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
    let exclude = exclude.and_then(|p| p.canonicalize().ok());
    let mut results = Vec::new();
    scan_dir(root, exclude.as_deref(), &mut results)?;
    Ok(results)
}

fn scan_dir(dir: &Path, exclude: Option<&Path>, results: &mut Vec<PathBuf>) -> std::io::Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.flatten().collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if exclude.is_some() && path.canonicalize().ok().as_deref() == exclude {
                tracing::debug!("Not scanning output folder {}", path.display());
                continue;
            }
            if let Err(e) = scan_dir(&path, exclude, results) {
                tracing::warn!("Skipping unreadable folder {}: {}", path.display(), e);
            }
        } else if file_type.is_symlink() {
            if path.is_dir() {
                tracing::debug!("Not following symlinked folder {}", path.display());
            } else if path.is_file() && is_supported_extension(&path) {
                results.push(path);
            }
        } else if file_type.is_file() && is_supported_extension(&path) {
            results.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{GrayPlane, SourceImage};
    use crate::preset::ChannelPreset;
    use std::cell::RefCell;

    fn write_rgb(path: &Path, pixel: [u8; 3]) {
        let data: Vec<u8> = pixel.iter().copied().cycle().take(2 * 2 * 3).collect();
        image::RgbImage::from_raw(2, 2, data).unwrap().save(path).unwrap();
    }

    fn batch_options() -> ProcessingOptions {
        ProcessingOptions {
            batch: true,
            ..Default::default()
        }
    }

    #[test]
    fn single_file_default_outputs() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("wood_orm.png");
        write_rgb(&input, [10, 20, 30]);
        let out = tmp.path().join("outputs");

        let results = Unpacker::new(ProcessingOptions::default()).run(&input, &out).unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].is_success());
        assert_eq!(
            results[0].outputs(),
            &[
                out.join("wood_orm_AO.png"),
                out.join("wood_orm_Roughness.png"),
                out.join("wood_orm_Metallic.png"),
            ]
        );
        let rough = image::open(out.join("wood_orm_Roughness.png")).unwrap().to_luma8();
        assert_eq!(rough.dimensions(), (2, 2));
        assert!(rough.pixels().all(|p| p.0[0] == 20));
    }

    #[test]
    fn preset_and_inversion_reach_written_files() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("metal.png");
        write_rgb(&input, [10, 20, 30]);
        let out = tmp.path().join("out");
        let options = ProcessingOptions {
            preset: ChannelPreset::Mra,
            invert_metallic: true,
            ..Default::default()
        };

        Unpacker::new(options).run(&input, &out).unwrap();

        let ao = image::open(out.join("metal_AO.png")).unwrap().to_luma8();
        let metal = image::open(out.join("metal_Metallic.png")).unwrap().to_luma8();
        assert_eq!(ao.get_pixel(0, 0).0[0], 30);
        assert_eq!(metal.get_pixel(1, 1).0[0], 255 - 10);
    }

    #[test]
    fn alpha_written_as_height_when_requested() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("cliff.png");
        image::RgbaImage::from_raw(1, 1, vec![1, 2, 3, 200])
            .unwrap()
            .save(&input)
            .unwrap();
        let out = tmp.path().join("out");
        let options = ProcessingOptions {
            export_alpha_as_height: true,
            ..Default::default()
        };

        let results = Unpacker::new(options).run(&input, &out).unwrap();

        assert_eq!(results[0].outputs().len(), 4);
        let height = image::open(out.join("cliff_Height.png")).unwrap().to_luma8();
        assert_eq!(height.get_pixel(0, 0).0[0], 200);
    }

    #[test]
    fn batch_records_corrupt_file_and_continues() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("in");
        fs::create_dir_all(&src).unwrap();
        write_rgb(&src.join("a_valid.png"), [1, 2, 3]);
        fs::write(src.join("b_corrupt.png"), b"garbage").unwrap();
        let out = tmp.path().join("out");

        let results = Unpacker::new(batch_options()).run(&src, &out).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].path, src.join("a_valid.png"));
        assert_eq!(results[0].outputs().len(), 3);
        assert_eq!(results[1].path, src.join("b_corrupt.png"));
        assert!(matches!(
            results[1].outcome,
            Outcome::Failure { kind: FailureKind::Decode, .. }
        ));
    }

    #[test]
    fn batch_records_grayscale_source() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("in");
        fs::create_dir_all(&src).unwrap();
        image::GrayImage::from_raw(1, 1, vec![5])
            .unwrap()
            .save(src.join("gray.png"))
            .unwrap();

        let results = Unpacker::new(batch_options()).run(&src, &tmp.path().join("out")).unwrap();

        assert!(matches!(
            results[0].outcome,
            Outcome::Failure { kind: FailureKind::UnsupportedChannelCount, .. }
        ));
    }

    #[test]
    fn single_file_failure_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("broken.png");
        fs::write(&input, b"garbage").unwrap();

        let err = Unpacker::new(ProcessingOptions::default())
            .run(&input, &tmp.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, crate::Error::Decode { .. }));
    }

    #[test]
    fn discovery_recurses_and_filters_extensions() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        for name in ["b.PNG", "a.tga", "notes.txt", "sub/c.jpeg", "sub/deeper/d.tiff", "sub/e.exr"] {
            fs::write(root.join(name), b"x").unwrap();
        }

        let found = discover_images(root, None).unwrap();

        assert_eq!(
            found,
            vec![
                root.join("a.tga"),
                root.join("b.PNG"),
                root.join("sub/c.jpeg"),
                root.join("sub/deeper/d.tiff"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn discovery_does_not_follow_symlinked_folders() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("root");
        let elsewhere = tmp.path().join("elsewhere");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&elsewhere).unwrap();
        fs::write(elsewhere.join("x.png"), b"x").unwrap();
        std::os::unix::fs::symlink(&elsewhere, root.join("linked")).unwrap();
        std::os::unix::fs::symlink(elsewhere.join("x.png"), root.join("y.png")).unwrap();

        let found = discover_images(&root, None).unwrap();
        assert_eq!(found, vec![root.join("y.png")]);
    }

    #[test]
    fn invalid_configuration_is_rejected_before_processing() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("t.png");
        write_rgb(&file, [0, 0, 0]);
        let out = tmp.path().join("out");

        let batch_on_file = Unpacker::new(batch_options()).run(&file, &out);
        assert!(matches!(batch_on_file, Err(crate::Error::InvalidConfiguration(_))));

        let single_on_dir = Unpacker::new(ProcessingOptions::default()).run(tmp.path(), &out);
        assert!(matches!(single_on_dir, Err(crate::Error::InvalidConfiguration(_))));

        let missing = Unpacker::new(ProcessingOptions::default()).run(&tmp.path().join("nope.png"), &out);
        assert!(matches!(missing, Err(crate::Error::InvalidConfiguration(_))));

        let no_output = Unpacker::new(ProcessingOptions::default()).run(&file, Path::new(""));
        assert!(matches!(no_output, Err(crate::Error::InvalidConfiguration(_))));

        assert!(!out.exists());
    }

    #[test]
    fn output_folder_inside_input_is_not_rescanned() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("in");
        fs::create_dir_all(&src).unwrap();
        write_rgb(&src.join("wood.png"), [1, 2, 3]);
        let out = src.join("out");
        let unpacker = Unpacker::new(batch_options());

        let first = unpacker.run(&src, &out).unwrap();
        let second = unpacker.run(&src, &out).unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].path, src.join("wood.png"));
        assert!(second[0].is_success());
    }

    #[test]
    fn discovery_skips_excluded_folder() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("maps")).unwrap();
        fs::create_dir_all(root.join("packed")).unwrap();
        fs::write(root.join("maps/a_AO.png"), b"x").unwrap();
        fs::write(root.join("packed/a.png"), b"x").unwrap();

        let found = discover_images(root, Some(&root.join("maps"))).unwrap();
        assert_eq!(found, vec![root.join("packed/a.png")]);
    }

    /// Decodes through the real codec but refuses to write.
    struct ReadOnlyAccessor {
        attempts: RefCell<Vec<PathBuf>>,
    }

    impl ImageAccessor for ReadOnlyAccessor {
        fn decode(&self, path: &Path) -> Result<SourceImage> {
            ImageCodec.decode(path)
        }

        fn encode(&self, _plane: &GrayPlane, path: &Path) -> Result<()> {
            self.attempts.borrow_mut().push(path.to_path_buf());
            Err(crate::Error::Encode {
                path: path.to_path_buf(),
                reason: "read-only".into(),
            })
        }
    }

    #[test]
    fn encode_failure_is_recorded_per_file() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("in");
        fs::create_dir_all(&src).unwrap();
        write_rgb(&src.join("one.png"), [1, 1, 1]);
        write_rgb(&src.join("two.png"), [2, 2, 2]);

        let accessor = ReadOnlyAccessor {
            attempts: RefCell::new(Vec::new()),
        };
        let unpacker = Unpacker::with_accessor(batch_options(), accessor);
        let results = unpacker.run(&src, &tmp.path().join("out")).unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| matches!(
            r.outcome,
            Outcome::Failure { kind: FailureKind::Encode, .. }
        )));
        // Each file stops at its first failed write
        assert_eq!(unpacker.accessor.attempts.borrow().len(), 2);
    }
}
