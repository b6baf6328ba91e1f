pub mod archive_scanner;
pub mod classifier;

pub use archive_scanner::{ArchiveFile, ArchiveScanner};
pub use classifier::{ClassifiedSamples, ClassifyProgress, OrganClassifier, SampleRecord};
