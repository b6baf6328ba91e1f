use crate::config::{OrganCatalog, SamplingConfig};
use crate::scanner::{ClassifiedSamples, SampleRecord};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;

/// Result of a sampling run. `records` is the (possibly truncated) selection
/// in set-iteration order, which is arbitrary and not stable across runs.
#[derive(Debug)]
pub struct Selection {
    pub records: Vec<SampleRecord>,
    pub warnings: Vec<String>,
    pub phase_one_counts: Vec<(String, usize)>,
}

/// Two-phase balanced sampler: a capped per-organ draw in catalog order,
/// then a top-up from the overall valid pool.
pub struct BalancedSampler {
    catalog: OrganCatalog,
    num_samples: usize,
    seed: Option<u64>,
}

impl BalancedSampler {
    pub fn new(config: &SamplingConfig) -> Self {
        Self {
            catalog: config.organs.clone(),
            num_samples: config.num_samples,
            seed: config.seed,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Cap on how many samples to draw per organ in phase one.
    pub fn per_organ_quota(&self) -> usize {
        std::cmp::max(1, self.num_samples / (2 * self.catalog.len()))
    }

    pub fn select(&self, classified: &ClassifiedSamples) -> Selection {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let quota = self.per_organ_quota();
        let mut selected: HashSet<SampleRecord> = HashSet::new();
        let mut warnings = Vec::new();
        let mut phase_one_counts = Vec::new();

        // Phase one: per-organ draw, in catalog order.
        for organ in self.catalog.iter() {
            let bucket = classified.bucket(&organ.name);
            if bucket.is_empty() {
                warnings.push(format!("No samples found for {}", organ.name));
                continue;
            }

            let available: Vec<&SampleRecord> =
                bucket.iter().filter(|s| !selected.contains(*s)).collect();
            if available.is_empty() {
                continue;
            }

            let take = std::cmp::min(quota, available.len());
            for record in available.choose_multiple(&mut rng, take) {
                selected.insert((*record).clone());
            }
            phase_one_counts.push((organ.name.clone(), take));
        }

        // Phase two: top up from the overall valid pool.
        let remaining = self.num_samples.saturating_sub(selected.len());
        if remaining > 0 {
            let available: Vec<&SampleRecord> = classified
                .valid
                .iter()
                .filter(|s| !selected.contains(*s))
                .collect();

            let take = std::cmp::min(remaining, available.len());
            for record in available.choose_multiple(&mut rng, take) {
                selected.insert((*record).clone());
            }
        }

        // Truncation happens on set-iteration order. That order is arbitrary,
        // so the per-organ balance from phase one is not guaranteed to survive
        // the cut. Known weakness of the selection scheme, kept as-is.
        let mut records: Vec<SampleRecord> = selected.into_iter().collect();
        records.truncate(self.num_samples);

        Selection {
            records,
            warnings,
            phase_one_counts,
        }
    }
}
