use crate::error::PipelineError;
use crate::models::RecordLabel;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only response log for one run.
pub struct OutputSink {
    path: PathBuf,
    file: File,
}

impl OutputSink {
    /// Creates `path` or truncates it to zero length.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, PipelineError> {
        let path = path.into();
        File::create(&path).map_err(|source| PipelineError::OutputFile {
            path: path.clone(),
            source,
        })?;
        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|source| PipelineError::OutputFile {
                path: path.clone(),
                source,
            })?;

        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, label: &RecordLabel, response: &str) -> Result<(), PipelineError> {
        self.file.write_all(format_header(label).as_bytes())?;
        self.file.write_all(response.as_bytes())?;
        self.file.flush()?;
        Ok(())
    }
}

pub fn format_header(label: &RecordLabel) -> String {
    format!("\n\n=== Response for {label} ===\n")
}
