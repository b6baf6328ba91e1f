use crate::config::OrganCatalog;
use crate::error::{Result, SlicePickError};
use crate::scanner::ArchiveFile;
use ndarray_npy::NpzReader;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// One selectable sample. Selection is whole-archive: `slice_index` is kept
/// for manifest compatibility and is always 0, no per-depth slicing is
/// performed. Record identity (Eq + Hash) covers the full field triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SampleRecord {
    pub source_path: PathBuf,
    pub original_name: String,
    pub slice_index: usize,
}

impl SampleRecord {
    pub fn new(source_path: PathBuf, original_name: String) -> Self {
        Self {
            source_path,
            original_name,
            slice_index: 0,
        }
    }
}

/// Classification result: the global valid-sample list, the per-organ
/// buckets, and the per-file failures that were skipped.
#[derive(Debug, Default)]
pub struct ClassifiedSamples {
    pub valid: Vec<SampleRecord>,
    pub buckets: HashMap<String, Vec<SampleRecord>>,
    pub skipped: Vec<String>,
}

impl ClassifiedSamples {
    pub fn bucket(&self, organ: &str) -> &[SampleRecord] {
        self.buckets.get(organ).map(|b| b.as_slice()).unwrap_or(&[])
    }

    pub fn display_summary(&self, catalog: &OrganCatalog) -> String {
        let mut summary = format!(
            "Classification results:\n  Valid samples: {}\n  Skipped files: {}\n",
            self.valid.len(),
            self.skipped.len()
        );

        summary.push_str("  Samples per organ:\n");
        for organ in catalog.iter() {
            summary.push_str(&format!(
                "    {}: {}\n",
                organ.name,
                self.bucket(&organ.name).len()
            ));
        }

        summary
    }
}

#[derive(Debug, Clone)]
pub struct ClassifyProgress {
    pub archives_processed: usize,
    pub total_archives: usize,
    pub valid_samples: usize,
    pub current_file: String,
}

pub struct OrganClassifier {
    catalog: OrganCatalog,
}

impl OrganClassifier {
    pub fn new(catalog: OrganCatalog) -> Self {
        Self { catalog }
    }

    /// Load every archive's label array and bucket the valid ones by organ.
    /// A single bad file never aborts the scan: its error is recorded in
    /// `skipped` and processing continues.
    pub fn classify_archives(
        &self,
        archives: &[ArchiveFile],
        progress_callback: Option<&dyn Fn(&ClassifyProgress)>,
    ) -> ClassifiedSamples {
        let mut classified = ClassifiedSamples::default();

        for (index, archive) in archives.iter().enumerate() {
            match self.organs_in_archive(&archive.source_path) {
                Ok(present) => {
                    if !present.is_empty() {
                        let record = SampleRecord::new(
                            archive.source_path.clone(),
                            archive.filename.clone(),
                        );

                        classified.valid.push(record.clone());
                        for organ in present {
                            classified.buckets.entry(organ).or_default().push(record.clone());
                        }
                    }
                }
                Err(e) => {
                    classified
                        .skipped
                        .push(format!("Error processing {}: {}", archive.filename, e));
                }
            }

            if let Some(callback) = progress_callback {
                callback(&ClassifyProgress {
                    archives_processed: index + 1,
                    total_archives: archives.len(),
                    valid_samples: classified.valid.len(),
                    current_file: archive.filename.clone(),
                });
            }
        }

        classified
    }

    /// Which catalog organs appear anywhere in the archive's label array.
    /// Also used by the sampler's diagnostic pass, which recomputes the
    /// distribution of the final selection.
    pub fn organs_in_archive(&self, path: &Path) -> Result<Vec<String>> {
        let values = load_label_values(path)?;
        Ok(self.catalog.organs_present(&values))
    }

    pub fn catalog(&self) -> &OrganCatalog {
        &self.catalog
    }
}

/// Numeric element types a label array may be stored as. Membership is
/// tested over integral values only: a float 2.5 matches no organ code.
trait LabelElement: ndarray_npy::ReadableElement + Copy {
    fn to_label(self) -> Option<i64>;
}

macro_rules! integer_label_element {
    ($($t:ty),*) => {
        $(impl LabelElement for $t {
            fn to_label(self) -> Option<i64> {
                Some(self as i64)
            }
        })*
    };
}

integer_label_element!(u8, u16, i16, i32, i64);

impl LabelElement for f32 {
    fn to_label(self) -> Option<i64> {
        if self.is_finite() && self.fract() == 0.0 {
            Some(self as i64)
        } else {
            None
        }
    }
}

impl LabelElement for f64 {
    fn to_label(self) -> Option<i64> {
        if self.is_finite() && self.fract() == 0.0 {
            Some(self as i64)
        } else {
            None
        }
    }
}

fn read_as<T: LabelElement>(npz: &mut NpzReader<File>, name: &str) -> Option<Vec<i64>> {
    npz.by_name::<ndarray::OwnedRepr<T>, ndarray::IxDyn>(name)
        .ok()
        .map(|array| array.iter().filter_map(|v| v.to_label()).collect())
}

/// Read the `label` array from an NPZ archive as a flat list of integral
/// values. The stored dtype varies between preprocessed datasets, so the
/// common numeric dtypes are tried in turn.
fn load_label_values(path: &Path) -> Result<Vec<i64>> {
    let archive_error = |message: String| SlicePickError::Archive {
        name: path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string(),
        message,
    };

    let file = File::open(path).map_err(|e| archive_error(e.to_string()))?;
    let mut npz = NpzReader::new(file).map_err(|e| archive_error(e.to_string()))?;

    let names = npz.names().map_err(|e| archive_error(e.to_string()))?;

    // np.savez stores entries with a trailing ".npy"; accept both spellings.
    for candidate in ["label", "label.npy"] {
        if !names.iter().any(|n| n == candidate) {
            continue;
        }

        if let Some(values) = read_as::<f32>(&mut npz, candidate) {
            return Ok(values);
        }
        if let Some(values) = read_as::<f64>(&mut npz, candidate) {
            return Ok(values);
        }
        if let Some(values) = read_as::<u8>(&mut npz, candidate) {
            return Ok(values);
        }
        if let Some(values) = read_as::<u16>(&mut npz, candidate) {
            return Ok(values);
        }
        if let Some(values) = read_as::<i16>(&mut npz, candidate) {
            return Ok(values);
        }
        if let Some(values) = read_as::<i32>(&mut npz, candidate) {
            return Ok(values);
        }
        if let Some(values) = read_as::<i64>(&mut npz, candidate) {
            return Ok(values);
        }

        return Err(archive_error(format!(
            "'{}' array has an unsupported dtype",
            candidate
        )));
    }

    Err(archive_error("no 'label' array found in archive".to_string()))
}
