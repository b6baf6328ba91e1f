pub mod manifest_writer;
pub mod sample_exporter;

pub use manifest_writer::ManifestWriter;
pub use sample_exporter::{ExportProgress, SampleExporter};
