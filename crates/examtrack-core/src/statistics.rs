//! Summary statistics over records and aggregated series.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregatedBucket;
use crate::logbook::PracticeLogBook;
use crate::model::{ExamRecord, PracticeLog, Subject};

/// Trailing moving average.
///
/// The first `window - 1` points average whatever is available so the output
/// has the same length as the input. A window of 0 is treated as 1.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;

    for (i, value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        let n = (i + 1).min(window);
        out.push(sum / n as f64);
    }

    out
}

/// Mean net per subject across exams, rounded to one decimal.
///
/// Subjects that no exam reports are omitted.
pub fn subject_net_averages(exams: &[ExamRecord]) -> BTreeMap<Subject, f64> {
    let mut sums: BTreeMap<Subject, (f64, usize)> = BTreeMap::new();
    for exam in exams {
        for (subject, net) in exam.nets() {
            let entry = sums.entry(subject).or_insert((0.0, 0));
            entry.0 += net;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(subject, (sum, n))| (subject, round1(sum / n as f64)))
        .collect()
}

/// Mean placement score rounded to the nearest integer; 0 with no exams.
pub fn average_placement(exams: &[ExamRecord]) -> f64 {
    if exams.is_empty() {
        return 0.0;
    }
    let sum: f64 = exams.iter().map(ExamRecord::placement_score).sum();
    (sum / exams.len() as f64).round()
}

/// Question totals over a set of practice logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub total: u64,
    pub correct: u64,
    pub incorrect: u64,
    /// Number of (student, date) logs that contributed.
    pub days: usize,
}

/// Sum questions, correct and incorrect answers across `logs`.
///
/// `logs` are taken in save order: a later save for the same student and day
/// replaces the earlier one, as in aggregation.
pub fn period_summary(logs: &[PracticeLog]) -> PeriodSummary {
    let book = PracticeLogBook::from_saves(logs.iter().cloned());
    book.iter().fold(PeriodSummary::default(), |mut acc, log| {
        acc.correct += log.total_correct();
        acc.incorrect += log.total_incorrect();
        acc.total = acc.correct + acc.incorrect;
        acc.days += 1;
        acc
    })
}

/// Change in `total` between consecutive buckets, keyed by the later bucket.
pub fn score_deltas(buckets: &[AggregatedBucket]) -> Vec<(String, f64)> {
    buckets
        .windows(2)
        .map(|pair| (pair[1].bucket.key.clone(), pair[1].total - pair[0].total))
        .collect()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
