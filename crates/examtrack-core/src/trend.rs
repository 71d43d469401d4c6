//! Secondary series derived from aggregated buckets.

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregatedBucket;
use crate::bucket::Bucket;

/// Default y-axis ladder for percentage series.
pub const PERCENT_LADDER: [f64; 3] = [0.0, 50.0, 75.0];

/// Which correct/incorrect sums an accuracy series reads.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectFilter {
    #[default]
    All,
    Subject(String),
}

impl SubjectFilter {
    /// `"all"` selects bucket totals; anything else names a subject.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("all") {
            SubjectFilter::All
        } else {
            SubjectFilter::Subject(value.to_string())
        }
    }
}

/// Accuracy of one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyPoint {
    pub bucket: Bucket,
    pub correct_rate_percent: f64,
    pub incorrect_rate_percent: f64,
}

/// Correct answers as a percentage of attempts; 0 with no attempts.
pub fn correct_rate(correct: u64, incorrect: u64) -> f64 {
    let attempted = correct + incorrect;
    if attempted == 0 {
        return 0.0;
    }
    correct as f64 / attempted as f64 * 100.0
}

/// Build the accuracy series in bucket order.
pub fn accuracy_series(buckets: &[AggregatedBucket], filter: &SubjectFilter) -> Vec<AccuracyPoint> {
    buckets
        .iter()
        .map(|b| {
            let (correct, incorrect) = match filter {
                SubjectFilter::All => (b.total_correct, b.total_incorrect),
                SubjectFilter::Subject(subject) => b
                    .per_subject
                    .get(subject)
                    .map(|t| (t.correct, t.incorrect))
                    .unwrap_or((0, 0)),
            };
            let correct_rate_percent = correct_rate(correct, incorrect);
            let incorrect_rate_percent = if correct + incorrect > 0 {
                100.0 - correct_rate_percent
            } else {
                0.0
            };
            AccuracyPoint {
                bucket: b.bucket.clone(),
                correct_rate_percent,
                incorrect_rate_percent,
            }
        })
        .collect()
}

/// Snap the series minimum down to the highest ladder rung not above it.
///
/// `ladder` must be ascending. An empty series, or a minimum below every
/// rung, gives the lowest rung (0 for an empty ladder).
pub fn domain_floor_with(values: &[f64], ladder: &[f64]) -> f64 {
    let lowest = ladder.first().copied().unwrap_or(0.0);
    let Some(min) = values.iter().copied().filter(|v| v.is_finite()).reduce(f64::min) else {
        return lowest;
    };
    ladder
        .iter()
        .copied()
        .filter(|rung| *rung <= min)
        .last()
        .unwrap_or(lowest)
}

/// Y-axis floor for a 0–100 percent series: below 50 → 0, below 75 → 50, else 75.
pub fn domain_floor(values: &[f64]) -> f64 {
    domain_floor_with(values, &PERCENT_LADDER)
}

/// Y-axis floor for the correct-rate line of an accuracy series.
pub fn accuracy_domain_floor(series: &[AccuracyPoint]) -> f64 {
    let values: Vec<f64> = series.iter().map(|p| p.correct_rate_percent).collect();
    domain_floor(&values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{AggregateKind, SubjectTotals};
    use crate::bucket::bucket_key;
    use crate::model::Granularity;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn bucket(day: u32, correct: u64, incorrect: u64) -> AggregatedBucket {
        let date = NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
        let mut per_subject = BTreeMap::new();
        per_subject.insert(
            "Fizik".to_string(),
            SubjectTotals {
                correct: correct / 2,
                incorrect,
            },
        );
        AggregatedBucket {
            bucket: bucket_key(date, Granularity::Daily),
            kind: AggregateKind::Practice,
            total: (correct + incorrect) as f64,
            total_correct: correct,
            total_incorrect: incorrect,
            per_subject,
            record_count: 1,
        }
    }

    #[test]
    fn overall_rates() {
        let series = accuracy_series(&[bucket(1, 75, 25), bucket(2, 0, 0)], &SubjectFilter::All);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].correct_rate_percent, 75.0);
        assert_eq!(series[0].incorrect_rate_percent, 25.0);
        assert_eq!(series[1].correct_rate_percent, 0.0);
        assert_eq!(series[1].incorrect_rate_percent, 0.0);
    }

    #[test]
    fn subject_rates_and_missing_subject() {
        let buckets = [bucket(1, 60, 30)];
        let fizik = accuracy_series(&buckets, &SubjectFilter::parse("Fizik"));
        assert_eq!(fizik[0].correct_rate_percent, 50.0);

        let missing = accuracy_series(&buckets, &SubjectFilter::parse("Kimya"));
        assert_eq!(missing[0].correct_rate_percent, 0.0);
        assert_eq!(missing[0].incorrect_rate_percent, 0.0);

        assert_eq!(SubjectFilter::parse("ALL"), SubjectFilter::All);
    }

    #[test]
    fn domain_floor_ladder() {
        assert_eq!(domain_floor(&[]), 0.0);
        assert_eq!(domain_floor(&[92.0, 49.9]), 0.0);
        assert_eq!(domain_floor(&[92.0, 50.0]), 50.0);
        assert_eq!(domain_floor(&[74.99, 80.0]), 50.0);
        assert_eq!(domain_floor(&[75.0, 99.0]), 75.0);
    }

    #[test]
    fn custom_ladder() {
        let ladder = [100.0, 200.0, 300.0, 400.0];
        assert_eq!(domain_floor_with(&[350.0, 420.0], &ladder), 300.0);
        assert_eq!(domain_floor_with(&[20.0], &ladder), 100.0);
        assert_eq!(domain_floor_with(&[20.0], &[]), 0.0);
    }

    #[test]
    fn accuracy_floor_from_series() {
        let series = accuracy_series(&[bucket(1, 80, 20), bucket(2, 60, 40)], &SubjectFilter::All);
        assert_eq!(accuracy_domain_floor(&series), 50.0);
    }
}
