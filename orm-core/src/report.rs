//! Run summary for JSON export.

use crate::batch::BatchResult;
use crate::options::ProcessingOptions;
use crate::preset::ChannelPreset;
use crate::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Summary of one unpack run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// RFC 3339 timestamp
    pub generated_at: String,
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub preset: ChannelPreset,
    pub options: ProcessingOptions,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Total number of maps written
    pub outputs_written: usize,
    pub results: Vec<BatchResult>,
}

impl BatchReport {
    pub fn new(
        input: &Path,
        output_dir: &Path,
        options: &ProcessingOptions,
        results: Vec<BatchResult>,
    ) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        let outputs_written = results.iter().map(|r| r.outputs().len()).sum();
        Self {
            generated_at: Utc::now().to_rfc3339(),
            input: input.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            preset: options.preset,
            options: *options,
            processed: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            outputs_written,
            results,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &BatchResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
