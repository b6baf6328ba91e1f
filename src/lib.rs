pub mod cli;
pub mod config;
pub mod error;
pub mod exporter;
pub mod report;
pub mod sampler;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, OrganCatalog, OrganLabel};
pub use error::{Result, SlicePickError, UserFriendlyError};

// Core functionality re-exports
pub use exporter::{ExportProgress, ManifestWriter, SampleExporter};
pub use report::{ConfigSnapshot, SelectionReport};
pub use sampler::{BalancedSampler, OrganDistribution, Selection};
pub use scanner::{ArchiveFile, ArchiveScanner, ClassifiedSamples, OrganClassifier, SampleRecord};
pub use ui::{OutputFormatter, OutputMode, ProgressAwareOutput, ProgressManager};

use chrono::Utc;
use std::path::{Path, PathBuf};

/// Main library interface for the selection pipeline.
pub struct SlicePick {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl SlicePick {
    /// Create a new SlicePick instance with the provided configuration.
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    /// Create a SlicePick instance from CLI arguments.
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(
            config,
            output_mode,
            cli_args.verbosity_level(),
            cli_args.quiet,
        ))
    }

    /// Run the full pipeline: scan, classify, sample, export, manifest.
    pub fn run(&self) -> Result<SelectionReport> {
        self.output_formatter
            .start_operation("Starting balanced sample selection");

        // Step 1: Scan the input directory
        let archives = self.scan_archives()?;

        // Step 2: Classify archives into organ buckets
        let classified = self.classify_archives(&archives);

        // Step 3: Draw the balanced selection
        let selection = self.select_samples(&classified);

        // Step 4: Diagnostic distribution over the final selection
        let classifier = OrganClassifier::new(self.config.sampling.organs.clone());
        let distribution = OrganDistribution::survey(&selection.records, &classifier)?;
        self.output_formatter.print_distribution(&distribution);

        // Step 5: Copy the selected archives
        let export_progress = self.export_samples(&selection.records)?;

        // Step 6: Write the manifest
        let manifest_writer = ManifestWriter::new(&self.config.output.manifest_path);
        let manifest_lines = manifest_writer.write_manifest(&selection.records)?;
        self.output_formatter.success(&format!(
            "Manifest written: {} ({} records)",
            manifest_writer.path().display(),
            manifest_lines
        ));

        // Step 7: Build and persist the selection report
        let report = self.build_report(
            &archives,
            &classified,
            &selection,
            &export_progress,
            distribution,
        );

        if self.config.output.write_report {
            let report_path = self.report_path();
            report.save_json(&report_path)?;
            self.output_formatter
                .debug(&format!("Selection report saved: {}", report_path.display()));
        }

        self.output_formatter.print_export_summary(&export_progress);

        Ok(report)
    }

    fn scan_archives(&self) -> Result<Vec<ArchiveFile>> {
        self.output_formatter
            .start_operation("Scanning for archive files");

        let scanner = ArchiveScanner::new(self.config.input.extension.clone());
        let archives = scanner.scan_directory(&self.config.input.data_dir)?;

        self.output_formatter
            .info(&format!("Found {} archive files", archives.len()));

        Ok(archives)
    }

    fn classify_archives(&self, archives: &[ArchiveFile]) -> ClassifiedSamples {
        self.output_formatter
            .start_operation("Classifying archives by organ");

        let classifier = OrganClassifier::new(self.config.sampling.organs.clone());

        let classify_progress = self
            .progress_manager
            .create_classify_progress(archives.len() as u64);
        let progress_callback = {
            let pb = classify_progress.clone();
            move |progress: &scanner::ClassifyProgress| {
                ui::progress::update_classify_progress(&pb, progress);
            }
        };

        let classified = classifier.classify_archives(archives, Some(&progress_callback));

        ui::progress::finish_progress_with_summary(
            &classify_progress,
            &format!("Found {} valid samples in total", classified.valid.len()),
            classify_progress.elapsed(),
        );

        // Per-file failures were skipped during the scan; surface them now
        let output = ProgressAwareOutput::new(&self.output_formatter, Some(&self.progress_manager));
        for skipped in &classified.skipped {
            output.warning(skipped);
        }

        self.output_formatter.info(&format!(
            "Found {} valid samples in total",
            classified.valid.len()
        ));
        self.output_formatter
            .debug(&classified.display_summary(&self.config.sampling.organs));

        classified
    }

    fn select_samples(&self, classified: &ClassifiedSamples) -> Selection {
        self.output_formatter
            .start_operation("Drawing balanced selection");

        let sampler = BalancedSampler::new(&self.config.sampling);
        let selection = sampler.select(classified);

        for warning in &selection.warnings {
            self.output_formatter.warning(warning);
        }

        self.output_formatter.info(&format!(
            "Selected {} of {} requested samples",
            selection.records.len(),
            self.config.sampling.num_samples
        ));

        selection
    }

    fn export_samples(&self, records: &[SampleRecord]) -> Result<ExportProgress> {
        self.output_formatter
            .start_operation("Copying selected samples");

        let copy_progress = self
            .progress_manager
            .create_copy_progress(records.len() as u64);
        let progress_callback = {
            let pb = copy_progress.clone();
            move |progress: &ExportProgress| {
                ui::progress::update_copy_progress(&pb, progress);
            }
        };

        let exporter =
            SampleExporter::new().with_preserve_timestamps(self.config.output.preserve_timestamps);
        let progress = exporter.export_samples(
            records,
            &self.config.output.output_dir,
            Some(&progress_callback),
        )?;

        ui::progress::finish_progress_with_summary(
            &copy_progress,
            &format!("Copied {} samples", progress.files_copied),
            progress.elapsed(),
        );

        self.output_formatter.success(&format!(
            "Copied {} samples to {}",
            progress.files_copied,
            self.config.output.output_dir.display()
        ));

        Ok(progress)
    }

    fn build_report(
        &self,
        archives: &[ArchiveFile],
        classified: &ClassifiedSamples,
        selection: &Selection,
        export_progress: &ExportProgress,
        distribution: OrganDistribution,
    ) -> SelectionReport {
        SelectionReport {
            generated_at: Utc::now(),
            input_directory: self.config.input.data_dir.display().to_string(),
            output_directory: self.config.output.output_dir.display().to_string(),
            manifest_path: self.config.output.manifest_path.display().to_string(),
            archives_scanned: archives.len(),
            valid_samples: classified.valid.len(),
            skipped_files: classified.skipped.clone(),
            selected_samples: selection.records.len(),
            files_copied: export_progress.files_copied,
            distribution,
            warnings: selection.warnings.clone(),
            config_used: ConfigSnapshot::from_config(&self.config),
        }
    }

    fn report_path(&self) -> PathBuf {
        self.config
            .output
            .manifest_path
            .with_file_name("selection_report.json")
    }

    /// Generate sample configuration file.
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config).map_err(SlicePickError::Io)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    /// Handle error with user-friendly output.
    pub fn handle_error(&self, error: &SlicePickError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Convenience function to run a selection with minimal setup.
pub fn select_samples_simple(
    input_dir: &Path,
    output_dir: &Path,
    num_samples: usize,
) -> Result<SelectionReport> {
    let mut config = Config::default();
    config.input.data_dir = input_dir.to_path_buf();
    config.output.output_dir = output_dir.to_path_buf();
    config.output.manifest_path = output_dir.join("selected_samples.csv");
    config.sampling.num_samples = num_samples;

    let slicepick = SlicePick::new(config, OutputMode::Plain, 0, true);
    slicepick.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};
    use ndarray_npy::NpzWriter;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn write_npz(path: &Path, label_values: &[f32]) {
        let mut npz = NpzWriter::new(File::create(path).unwrap());
        let image = ArrayD::<f32>::zeros(IxDyn(&[2, 2]));
        let label =
            ArrayD::from_shape_vec(IxDyn(&[label_values.len()]), label_values.to_vec()).unwrap();
        npz.add_array("image.npy", &image).unwrap();
        npz.add_array("label.npy", &label).unwrap();
        npz.finish().unwrap();
    }

    fn test_config(input: &Path, workdir: &Path, num_samples: usize) -> Config {
        let mut config = Config::default();
        config.input.data_dir = input.to_path_buf();
        config.output.output_dir = workdir.join("selected");
        config.output.manifest_path = workdir.join("selected_samples.csv");
        config.sampling.num_samples = num_samples;
        config.sampling.seed = Some(42);
        config
    }

    #[test]
    fn test_full_pipeline_small_pool() {
        let input_dir = TempDir::new().unwrap();
        let work_dir = TempDir::new().unwrap();

        // 4 valid archives, 1 without organs, 1 corrupt
        for (i, value) in [1.0f32, 3.0, 6.0, 8.0].iter().enumerate() {
            write_npz(
                &input_dir.path().join(format!("case{:04}.npz", i)),
                &[0.0, *value],
            );
        }
        write_npz(&input_dir.path().join("background.npz"), &[0.0, 0.0]);
        fs::write(input_dir.path().join("broken.npz"), b"garbage").unwrap();

        let config = test_config(input_dir.path(), work_dir.path(), 300);
        let slicepick = SlicePick::new(config, OutputMode::Plain, 0, true);
        let report = slicepick.run().unwrap();

        assert_eq!(report.archives_scanned, 6);
        assert_eq!(report.valid_samples, 4);
        assert_eq!(report.selected_samples, 4);
        assert_eq!(report.files_copied, 4);
        assert_eq!(report.skipped_files.len(), 1);
        assert!(report.skipped_files[0].contains("broken.npz"));

        // Exported copies under original names
        for i in 0..4 {
            assert!(work_dir
                .path()
                .join("selected")
                .join(format!("case{:04}.npz", i))
                .exists());
        }

        // Manifest data-line count equals exported-file count
        let manifest = fs::read_to_string(work_dir.path().join("selected_samples.csv")).unwrap();
        assert_eq!(manifest.lines().count(), 5);
        assert!(manifest.starts_with("original_name,file_path,slice_index"));

        // Report persisted next to the manifest
        assert!(work_dir.path().join("selection_report.json").exists());
    }

    #[test]
    fn test_pipeline_respects_target_count() {
        let input_dir = TempDir::new().unwrap();
        let work_dir = TempDir::new().unwrap();

        for i in 0..10 {
            write_npz(&input_dir.path().join(format!("case{:04}.npz", i)), &[6.0]);
        }

        let config = test_config(input_dir.path(), work_dir.path(), 3);
        let slicepick = SlicePick::new(config, OutputMode::Plain, 0, true);
        let report = slicepick.run().unwrap();

        assert_eq!(report.valid_samples, 10);
        assert_eq!(report.selected_samples, 3);
        assert_eq!(report.files_copied, 3);
    }

    #[test]
    fn test_pipeline_missing_input_directory() {
        let work_dir = TempDir::new().unwrap();
        let config = test_config(Path::new("/does/not/exist"), work_dir.path(), 10);

        let slicepick = SlicePick::new(config, OutputMode::Plain, 0, true);
        let result = slicepick.run();
        assert!(matches!(
            result,
            Err(SlicePickError::InputDirectory { .. })
        ));
    }

    #[test]
    fn test_select_samples_simple() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();

        write_npz(&input_dir.path().join("a.npz"), &[3.0]);
        write_npz(&input_dir.path().join("b.npz"), &[6.0]);

        let report =
            select_samples_simple(input_dir.path(), output_dir.path(), 10).unwrap();
        assert_eq!(report.selected_samples, 2);
        assert!(output_dir.path().join("selected_samples.csv").exists());
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        SlicePick::generate_sample_config(&config_path).unwrap();
        assert!(config_path.exists());

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[input]"));
        assert!(content.contains("[sampling]"));
    }
}
