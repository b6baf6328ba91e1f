use crate::error::{Result, SlicePickError};
use crate::scanner::SampleRecord;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ExportProgress {
    pub files_copied: usize,
    pub total_files: usize,
    pub bytes_copied: u64,
    pub current_file: Option<String>,
    pub start_time: Instant,
}

impl ExportProgress {
    pub fn new(total_files: usize) -> Self {
        Self {
            files_copied: 0,
            total_files,
            bytes_copied: 0,
            current_file: None,
            start_time: Instant::now(),
        }
    }

    pub fn update_file(&mut self, filename: String, bytes: u64) {
        self.files_copied += 1;
        self.bytes_copied += bytes;
        self.current_file = Some(filename);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Copies selected archives into the output directory under their original
/// names, disambiguating collisions with a numeric suffix. Unlike the
/// classifier, the exporter has no per-file recovery: any copy failure
/// aborts the run.
pub struct SampleExporter {
    preserve_timestamps: bool,
}

impl SampleExporter {
    pub fn new() -> Self {
        Self {
            preserve_timestamps: true,
        }
    }

    pub fn with_preserve_timestamps(mut self, preserve: bool) -> Self {
        self.preserve_timestamps = preserve;
        self
    }

    pub fn export_samples(
        &self,
        records: &[SampleRecord],
        output_dir: &Path,
        progress_callback: Option<&dyn Fn(&ExportProgress)>,
    ) -> Result<ExportProgress> {
        let mut progress = ExportProgress::new(records.len());

        fs::create_dir_all(output_dir).map_err(|e| map_io_error(output_dir, e))?;

        for record in records {
            if let Some(callback) = progress_callback {
                callback(&progress);
            }

            let bytes = self.copy_record(record, output_dir)?;
            progress.update_file(record.original_name.clone(), bytes);
        }

        if let Some(callback) = progress_callback {
            callback(&progress);
        }

        Ok(progress)
    }

    fn copy_record(&self, record: &SampleRecord, output_dir: &Path) -> Result<u64> {
        if !record.source_path.is_file() {
            return Err(SlicePickError::InvalidPath {
                path: format!(
                    "Source is not a file: {}",
                    record.source_path.display()
                ),
            });
        }

        let dest_path = collision_free_path(output_dir, &record.original_name);

        let bytes = fs::copy(&record.source_path, &dest_path)
            .map_err(|e| map_io_error(&dest_path, e))?;

        if self.preserve_timestamps {
            if let Ok(metadata) = fs::metadata(&record.source_path) {
                if let Ok(modified) = metadata.modified() {
                    let _ = filetime::set_file_mtime(
                        &dest_path,
                        filetime::FileTime::from_system_time(modified),
                    );
                }
            }
        }

        Ok(bytes)
    }
}

impl Default for SampleExporter {
    fn default() -> Self {
        Self::new()
    }
}

/// First free destination path for `name` in `dir`: the name itself, then
/// `stem_1.ext`, `stem_2.ext`, and so on. Never returns an existing path.
pub fn collision_free_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let name_path = Path::new(name);
    let stem = name_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    let extension = name_path.extension().and_then(|e| e.to_str());

    let mut counter = 1;
    loop {
        let suffixed = match extension {
            Some(ext) => format!("{}_{}.{}", stem, counter, ext),
            None => format!("{}_{}", stem, counter),
        };
        let candidate = dir.join(suffixed);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

fn map_io_error(path: &Path, error: std::io::Error) -> SlicePickError {
    if error.kind() == ErrorKind::PermissionDenied {
        SlicePickError::Permission {
            path: path.display().to_string(),
        }
    } else {
        SlicePickError::Io(error)
    }
}
