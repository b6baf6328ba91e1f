use crate::error::Result;
use crate::scanner::SampleRecord;
use std::path::{Path, PathBuf};

pub const MANIFEST_HEADER: [&str; 3] = ["original_name", "file_path", "slice_index"];

/// Writes the selection manifest: a CSV with one line per selected record.
pub struct ManifestWriter {
    manifest_path: PathBuf,
}

impl ManifestWriter {
    pub fn new<P: Into<PathBuf>>(manifest_path: P) -> Self {
        Self {
            manifest_path: manifest_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.manifest_path
    }

    /// Write all records and return how many data lines were written.
    pub fn write_manifest(&self, records: &[SampleRecord]) -> Result<usize> {
        let mut writer = csv::Writer::from_path(&self.manifest_path)?;

        writer.write_record(MANIFEST_HEADER)?;

        for record in records {
            writer.write_record([
                record.original_name.as_str(),
                &record.source_path.display().to_string(),
                &record.slice_index.to_string(),
            ])?;
        }

        writer.flush().map_err(std::io::Error::from)?;

        Ok(records.len())
    }
}
