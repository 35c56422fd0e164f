// ABOUTME: Aggregate statistics derived from the full set of survey records.
// ABOUTME: Pure computation over in-memory records; never touches storage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Ratings at or above this value count as high satisfaction.
pub const HIGH_SATISFACTION_THRESHOLD: i64 = 4;

/// Label used in the context breakdown for responses with no context.
pub const UNSPECIFIED_CONTEXT: &str = "Não especificado";

/// Summary statistics over every stored response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total: usize,
    /// Mean rating rounded to one decimal place, 0 when empty.
    pub average: f64,
    /// Count per rating 1..=5. All five keys are always present.
    pub distribution: BTreeMap<u8, usize>,
    pub high_satisfaction: usize,
    /// Largest stored timestamp, None when there are no records.
    pub last_update: Option<String>,
    pub context_distribution: BTreeMap<String, usize>,
}

impl Stats {
    /// Compute statistics over the given records.
    pub fn compute(records: &[Record]) -> Self {
        let mut distribution: BTreeMap<u8, usize> = (1..=5).map(|r| (r, 0)).collect();
        let mut context_distribution = BTreeMap::new();
        let mut high_satisfaction = 0;
        let mut sum: i128 = 0;

        for record in records {
            sum += i128::from(record.rating);

            if let Ok(key) = u8::try_from(record.rating)
                && let Some(count) = distribution.get_mut(&key)
            {
                *count += 1;
            }

            if record.rating >= HIGH_SATISFACTION_THRESHOLD {
                high_satisfaction += 1;
            }

            let context = if record.context.is_empty() {
                UNSPECIFIED_CONTEXT
            } else {
                record.context.as_str()
            };
            *context_distribution.entry(context.to_string()).or_insert(0) += 1;
        }

        let total = records.len();
        let average = if total == 0 {
            0.0
        } else {
            round_one_decimal(sum as f64 / total as f64)
        };

        let last_update = records
            .iter()
            .map(|r| r.timestamp.as_str())
            .filter(|ts| !ts.is_empty())
            .max()
            .map(str::to_string);

        Self {
            total,
            average,
            distribution,
            high_satisfaction,
            last_update,
            context_distribution,
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
