//! Target threshold classification of aggregated buckets.
//!
//! The classifier has no built-in targets; per-granularity defaults belong to
//! the presentation layer.

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregatedBucket;

/// Per-bucket metric a target is compared against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Questions solved, or mean placement score for exam buckets.
    Total,
    TotalCorrect,
    TotalIncorrect,
    /// Correct answers as a percentage of attempted questions.
    CorrectRate,
    /// Questions attempted in one subject.
    SubjectTotal(String),
}

impl Metric {
    pub fn extract(&self, bucket: &AggregatedBucket) -> f64 {
        match self {
            Metric::Total => bucket.total,
            Metric::TotalCorrect => bucket.total_correct as f64,
            Metric::TotalIncorrect => bucket.total_incorrect as f64,
            Metric::CorrectRate => {
                crate::trend::correct_rate(bucket.total_correct, bucket.total_incorrect)
            }
            Metric::SubjectTotal(subject) => bucket
                .per_subject
                .get(subject)
                .map(|t| t.total() as f64)
                .unwrap_or(0.0),
        }
    }
}

/// Outcome of comparing every bucket with one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub target: f64,
    pub meets: usize,
    pub below: usize,
    /// `round(meets / (meets + below) * 100)`, 0 when there are no buckets.
    pub success_percent: u32,
    pub meets_keys: Vec<String>,
    pub below_keys: Vec<String>,
}

impl Classification {
    pub fn bucket_count(&self) -> usize {
        self.meets + self.below
    }
}

/// Partition buckets by `metric >= target`.
pub fn classify_by<F>(buckets: &[AggregatedBucket], metric: F, target: f64) -> Classification
where
    F: Fn(&AggregatedBucket) -> f64,
{
    let mut meets_keys = Vec::new();
    let mut below_keys = Vec::new();

    for bucket in buckets {
        if metric(bucket) >= target {
            meets_keys.push(bucket.bucket.key.clone());
        } else {
            below_keys.push(bucket.bucket.key.clone());
        }
    }

    let meets = meets_keys.len();
    let below = below_keys.len();
    Classification {
        target,
        meets,
        below,
        success_percent: success_percent(meets, below),
        meets_keys,
        below_keys,
    }
}

/// Partition buckets using a named [`Metric`].
pub fn classify(buckets: &[AggregatedBucket], metric: &Metric, target: f64) -> Classification {
    classify_by(buckets, |b| metric.extract(b), target)
}

fn success_percent(meets: usize, below: usize) -> u32 {
    let total = meets + below;
    if total == 0 {
        return 0;
    }
    (meets as f64 / total as f64 * 100.0).round() as u32
}
