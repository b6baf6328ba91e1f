use crate::error::{Result, SlicePickError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub sampling: SamplingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    pub data_dir: PathBuf,
    pub extension: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub preserve_timestamps: bool,
    pub write_report: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub num_samples: usize,
    pub seed: Option<u64>,
    pub organs: OrganCatalog,
}

/// One entry of the organ catalog: a named anatomical label and the numeric
/// code used for it inside the archives' label arrays.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OrganLabel {
    pub name: String,
    pub value: i64,
}

/// Ordered catalog of organ labels. Catalog order drives the phase-one
/// sampling order, so this is a list rather than a map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct OrganCatalog(Vec<OrganLabel>);

impl OrganCatalog {
    pub fn new(organs: Vec<OrganLabel>) -> Self {
        Self(organs)
    }

    /// The 8-entry Synapse standard catalog.
    pub fn synapse() -> Self {
        let organs = [
            ("aorta", 1),
            ("gallbladder", 2),
            ("spleen", 3),
            ("left_kidney", 4),
            ("right_kidney", 5),
            ("liver", 6),
            ("pancreas", 7),
            ("stomach", 8),
        ];

        Self(
            organs
                .iter()
                .map(|(name, value)| OrganLabel {
                    name: name.to_string(),
                    value: *value,
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OrganLabel> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|o| o.name.clone()).collect()
    }

    pub fn contains_value(&self, value: i64) -> bool {
        self.0.iter().any(|o| o.value == value)
    }

    /// Organ names whose label values appear in the given element list.
    pub fn organs_present(&self, values: &[i64]) -> Vec<String> {
        self.0
            .iter()
            .filter(|o| values.contains(&o.value))
            .map(|o| o.name.clone())
            .collect()
    }
}

impl Default for OrganCatalog {
    fn default() -> Self {
        Self::synapse()
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            extension: "npz".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("selected_samples"),
            manifest_path: PathBuf::from("selected_samples.csv"),
            preserve_timestamps: true,
            write_report: true,
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            num_samples: 300,
            seed: None,
            organs: OrganCatalog::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SlicePickError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SlicePickError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| SlicePickError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["slicepick.toml", ".slicepick.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref data_dir) = cli_args.data_dir {
            self.input.data_dir = data_dir.clone();
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.output.output_dir = output_dir.clone();
        }

        if let Some(ref manifest_path) = cli_args.manifest_path {
            self.output.manifest_path = manifest_path.clone();
        }

        if let Some(num_samples) = cli_args.num_samples {
            self.sampling.num_samples = num_samples;
        }

        if let Some(seed) = cli_args.seed {
            self.sampling.seed = Some(seed);
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| SlicePickError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| SlicePickError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.input.extension.is_empty() {
            return Err(SlicePickError::Config {
                message: "Archive file extension must not be empty".to_string(),
            });
        }

        if self.sampling.num_samples == 0 {
            return Err(SlicePickError::Config {
                message: "Target sample count must be greater than 0".to_string(),
            });
        }

        if self.sampling.organs.is_empty() {
            return Err(SlicePickError::Config {
                message: "At least one organ label must be specified".to_string(),
            });
        }

        let mut seen_values = std::collections::HashSet::new();
        let mut seen_names = std::collections::HashSet::new();
        for organ in self.sampling.organs.iter() {
            if organ.name.is_empty() {
                return Err(SlicePickError::Config {
                    message: "Organ names must not be empty".to_string(),
                });
            }
            if !seen_names.insert(organ.name.as_str()) {
                return Err(SlicePickError::Config {
                    message: format!("Duplicate organ name in catalog: {}", organ.name),
                });
            }
            if !seen_values.insert(organ.value) {
                return Err(SlicePickError::Config {
                    message: format!(
                        "Duplicate label value in catalog: {} ({})",
                        organ.value, organ.name
                    ),
                });
            }
        }

        Ok(())
    }

    /// Phase-one cap: how many samples to draw per organ before topping up
    /// from the global pool.
    pub fn per_organ_quota(&self) -> usize {
        std::cmp::max(
            1,
            self.sampling.num_samples / (2 * self.sampling.organs.len()),
        )
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub data_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub manifest_path: Option<PathBuf>,
    pub num_samples: Option<usize>,
    pub seed: Option<u64>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        self.data_dir = data_dir;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_manifest_path(mut self, manifest_path: Option<PathBuf>) -> Self {
        self.manifest_path = manifest_path;
        self
    }

    pub fn with_num_samples(mut self, num_samples: Option<usize>) -> Self {
        self.num_samples = num_samples;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sampling.num_samples, 300);
        assert_eq!(config.sampling.organs.len(), 8);
        assert_eq!(config.input.extension, "npz");
        assert!(config.sampling.seed.is_none());
    }

    #[test]
    fn test_synapse_catalog_values() {
        let catalog = OrganCatalog::synapse();
        assert!(catalog.contains_value(1));
        assert!(catalog.contains_value(8));
        assert!(!catalog.contains_value(0));
        assert!(!catalog.contains_value(9));

        let names = catalog.names();
        assert_eq!(names[0], "aorta");
        assert_eq!(names[2], "spleen");
        assert_eq!(names[7], "stomach");
    }

    #[test]
    fn test_organs_present() {
        let catalog = OrganCatalog::synapse();
        let present = catalog.organs_present(&[0, 3, 6, 42]);
        assert_eq!(present, vec!["spleen".to_string(), "liver".to_string()]);
    }

    #[test]
    fn test_per_organ_quota() {
        let config = Config::default();
        // 300 / (2 * 8) = 18
        assert_eq!(config.per_organ_quota(), 18);

        let mut small = Config::default();
        small.sampling.num_samples = 4;
        assert_eq!(small.per_organ_quota(), 1);
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.sampling.num_samples = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sampling.organs = OrganCatalog::new(vec![]);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sampling.organs = OrganCatalog::new(vec![
            OrganLabel {
                name: "spleen".to_string(),
                value: 3,
            },
            OrganLabel {
                name: "liver".to_string(),
                value: 3,
            },
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let config = Config::default();
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(
            config.sampling.num_samples,
            loaded_config.sampling.num_samples
        );
        assert_eq!(config.sampling.organs, loaded_config.sampling.organs);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_num_samples(Some(50))
            .with_seed(Some(7))
            .with_output_dir(Some(PathBuf::from("/tmp/out")));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.sampling.num_samples, 50);
        assert_eq!(config.sampling.seed, Some(7));
        assert_eq!(config.output.output_dir, PathBuf::from("/tmp/out"));
        // Untouched fields keep their defaults
        assert_eq!(config.output.manifest_path, PathBuf::from("selected_samples.csv"));
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(!sample.is_empty());
        assert!(sample.contains("[input]"));
        assert!(sample.contains("[output]"));
        assert!(sample.contains("[sampling]"));
        assert!(sample.contains("spleen"));
    }
}
