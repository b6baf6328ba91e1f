use crate::config::Config;
use crate::error::{Result, SlicePickError};
use crate::sampler::OrganDistribution;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Summary of one selection run, persisted as JSON next to the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionReport {
    pub generated_at: DateTime<Utc>,
    pub input_directory: String,
    pub output_directory: String,
    pub manifest_path: String,
    pub archives_scanned: usize,
    pub valid_samples: usize,
    pub skipped_files: Vec<String>,
    pub selected_samples: usize,
    pub files_copied: usize,
    pub distribution: OrganDistribution,
    pub warnings: Vec<String>,
    pub config_used: ConfigSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub num_samples: usize,
    pub per_organ_quota: usize,
    pub organs: Vec<String>,
    pub extension: String,
    pub seed: Option<u64>,
}

impl ConfigSnapshot {
    pub fn from_config(config: &Config) -> Self {
        Self {
            num_samples: config.sampling.num_samples,
            per_organ_quota: config.per_organ_quota(),
            organs: config.sampling.organs.names(),
            extension: config.input.extension.clone(),
            seed: config.sampling.seed,
        }
    }
}

impl SelectionReport {
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json_content =
            serde_json::to_string_pretty(self).map_err(|e| SlicePickError::Config {
                message: format!("Failed to serialize report to JSON: {}", e),
            })?;

        fs::write(path.as_ref(), json_content)?;
        Ok(())
    }
}
