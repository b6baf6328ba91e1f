use crate::error::{Result, SlicePickError};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// A discovered candidate archive: one `.npz` file in the input directory.
#[derive(Debug, Clone)]
pub struct ArchiveFile {
    pub source_path: PathBuf,
    pub filename: String,
    pub size: u64,
    pub modified: SystemTime,
}

impl ArchiveFile {
    pub fn new(source_path: PathBuf, size: u64, modified: SystemTime) -> Self {
        let filename = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        Self {
            source_path,
            filename,
            size,
            modified,
        }
    }
}

pub struct ArchiveScanner {
    extension: String,
}

impl ArchiveScanner {
    pub fn new<S: Into<String>>(extension: S) -> Self {
        Self {
            extension: extension.into().to_lowercase(),
        }
    }

    /// Enumerate archive files at a single directory level. A missing or
    /// unreadable input directory is a top-level error, not recovered.
    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<Vec<ArchiveFile>> {
        let root_path = root.as_ref();

        if !root_path.exists() || !root_path.is_dir() {
            return Err(SlicePickError::InputDirectory {
                path: root_path.display().to_string(),
            });
        }

        let mut archives = Vec::new();

        // Non-recursive: candidate archives live directly in the input
        // directory, never in subdirectories.
        let walker = WalkDir::new(root_path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false);

        for entry in walker {
            let entry = entry.map_err(|e| SlicePickError::InputDirectory {
                path: format!("{}: {}", root_path.display(), e),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            if !self.matches_extension(entry.path()) {
                continue;
            }

            let metadata = entry.metadata().map_err(|e| SlicePickError::InputDirectory {
                path: format!("{}: {}", entry.path().display(), e),
            })?;

            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            archives.push(ArchiveFile::new(
                entry.path().to_path_buf(),
                metadata.len(),
                modified,
            ));
        }

        // Sort by file name for stable output; callers must not rely on
        // any particular order.
        archives.sort_by(|a, b| a.filename.cmp(&b.filename));

        Ok(archives)
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase() == self.extension)
            .unwrap_or(false)
    }
}
