use crate::error::Result;
use crate::scanner::{OrganClassifier, SampleRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganCount {
    pub organ: String,
    pub count: usize,
}

/// Per-organ tally of the final selection, in catalog order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganDistribution {
    pub counts: Vec<OrganCount>,
}

impl OrganDistribution {
    /// Diagnostic pass: reload every selected record's label array and tally
    /// which organs it contains. This repeats the classification I/O on
    /// purpose so the report reflects the files as selected, not cached
    /// bucket state.
    pub fn survey(records: &[SampleRecord], classifier: &OrganClassifier) -> Result<Self> {
        let mut counts: Vec<OrganCount> = classifier
            .catalog()
            .iter()
            .map(|organ| OrganCount {
                organ: organ.name.clone(),
                count: 0,
            })
            .collect();

        for record in records {
            let present = classifier.organs_in_archive(&record.source_path)?;
            for organ in present {
                if let Some(entry) = counts.iter_mut().find(|c| c.organ == organ) {
                    entry.count += 1;
                }
            }
        }

        Ok(Self { counts })
    }

    pub fn display_summary(&self) -> String {
        let mut summary = String::from("Organ distribution:\n");
        for entry in &self.counts {
            summary.push_str(&format!("  {}: {} samples\n", entry.organ, entry.count));
        }
        summary
    }
}
