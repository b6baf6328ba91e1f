use clap::Parser;
use slicepick::{
    Cli, OutputFormatter, OutputMode, SlicePick, SlicePickError, UserFriendlyError,
};
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    if cli.input_dir.is_none() {
        eprintln!("error: an input directory is required (see --help)");
        return 2;
    }

    let slicepick = match SlicePick::from_cli(&cli) {
        Ok(slicepick) => slicepick,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    if cli.dry_run {
        return handle_dry_run(&slicepick);
    }

    match slicepick.run() {
        Ok(report) => {
            slicepick.output_formatter().print_selection_report(&report);
            0
        }
        Err(e) => {
            slicepick.handle_error(&e);

            // Map error types to appropriate exit codes
            match e {
                SlicePickError::Config { .. } => 2,
                SlicePickError::InputDirectory { .. } => 3,
                SlicePickError::InvalidPath { .. } => 4,
                SlicePickError::Manifest { .. } => 5,
                SlicePickError::Archive { .. } => 6,
                SlicePickError::Permission { .. } => 7,
                SlicePickError::Io(ref io)
                    if io.kind() == std::io::ErrorKind::PermissionDenied =>
                {
                    7
                }
                _ => 1, // General error
            }
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "slicepick.toml".to_string());

    match SlicePick::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  slicepick <input-dir> --config {}", config_path);
            println!("\nEdit the file to customize the organ catalog and paths.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(slicepick: &SlicePick) -> i32 {
    let formatter = slicepick.output_formatter();
    let config = slicepick.config();

    formatter.info("DRY RUN MODE - No files will be copied");
    formatter.print_separator();

    if !config.input.data_dir.is_dir() {
        formatter.error(&format!(
            "Input directory not found: {}",
            config.input.data_dir.display()
        ));
        return 3;
    }

    formatter.info("Configuration that would be used:");
    println!("  Input directory: {}", config.input.data_dir.display());
    println!("  Output directory: {}", config.output.output_dir.display());
    println!("  Manifest: {}", config.output.manifest_path.display());
    println!("  Target samples: {}", config.sampling.num_samples);
    println!("  Per-organ quota: {}", config.per_organ_quota());
    println!(
        "  Organ catalog: {}",
        config.sampling.organs.names().join(", ")
    );
    if let Some(seed) = config.sampling.seed {
        println!("  Seed: {}", seed);
    }

    formatter.print_separator();
    formatter.success("Dry run completed successfully");
    formatter.info("Run without --dry-run to perform the selection");

    0
}

fn print_startup_error(error: &SlicePickError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use slicepick::{Config, OutputFormat};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn cli_for(input_dir: Option<PathBuf>) -> Cli {
        Cli {
            input_dir,
            output: None,
            manifest: None,
            samples: None,
            seed: None,
            config: None,
            output_format: OutputFormat::Plain,
            verbose: 0,
            quiet: true,
            dry_run: false,
            generate_config: false,
        }
    }

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let mut cli = cli_for(None);
        cli.config = Some(config_path.clone());
        cli.generate_config = true;

        let exit_code = handle_generate_config(&cli);
        assert_eq!(exit_code, 0);
        assert!(config_path.exists());

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[sampling]"));
    }

    #[test]
    fn test_dry_run_mode() {
        let temp_dir = TempDir::new().unwrap();

        let mut config = Config::default();
        config.input.data_dir = temp_dir.path().to_path_buf();

        let slicepick = SlicePick::new(config, OutputMode::Plain, 0, true);
        assert_eq!(handle_dry_run(&slicepick), 0);
    }

    #[test]
    fn test_dry_run_missing_input_dir() {
        let mut config = Config::default();
        config.input.data_dir = PathBuf::from("/does/not/exist");

        let slicepick = SlicePick::new(config, OutputMode::Plain, 0, true);
        assert_eq!(handle_dry_run(&slicepick), 3);
    }

    #[test]
    fn test_from_cli_builds_instance() {
        let temp_dir = TempDir::new().unwrap();
        let cli = cli_for(Some(temp_dir.path().to_path_buf()));

        let slicepick = SlicePick::from_cli(&cli).unwrap();
        assert_eq!(slicepick.config().input.data_dir, temp_dir.path());
    }
}
