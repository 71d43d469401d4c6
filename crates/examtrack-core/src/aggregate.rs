//! Folding records into per-bucket totals.
//!
//! Practice volume accumulates (sums); exam placement scores average (means).
//! The two semantics never mix: each aggregation runs over one record kind.
//! Empty buckets are omitted; the output is sorted by bucket key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bucket::{bucket_key, Bucket};
use crate::error::EngineError;
use crate::logbook::PracticeLogBook;
use crate::model::{ExamRecord, Granularity, PracticeLog};
use crate::net::round2;

/// Which record kind produced a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateKind {
    /// `total` is questions solved.
    Practice,
    /// `total` is the mean placement score.
    Exam,
}

/// Correct/incorrect sums for one subject within a bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectTotals {
    pub correct: u64,
    pub incorrect: u64,
}

impl SubjectTotals {
    pub fn total(&self) -> u64 {
        self.correct + self.incorrect
    }

    fn add(&mut self, correct: u64, incorrect: u64) {
        self.correct += correct;
        self.incorrect += incorrect;
    }
}

/// Totals for one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedBucket {
    pub bucket: Bucket,
    pub kind: AggregateKind,
    /// Questions solved for practice, mean placement score for exams.
    pub total: f64,
    pub total_correct: u64,
    pub total_incorrect: u64,
    pub per_subject: BTreeMap<String, SubjectTotals>,
    /// Records folded into this bucket.
    pub record_count: usize,
}

impl AggregatedBucket {
    /// `total` rounded to the nearest integer (dashboard view).
    pub fn dashboard_total(&self) -> f64 {
        self.total.round()
    }

    /// `total` rounded to two decimals (detail view).
    pub fn detail_total(&self) -> f64 {
        round2(self.total)
    }
}

/// Record kinds that can be folded into buckets.
pub trait Aggregate: Sized {
    fn aggregate(records: &[Self], granularity: Granularity) -> Vec<AggregatedBucket>;
}

/// Fold `records` into buckets ordered by key.
pub fn aggregate<R: Aggregate>(records: &[R], granularity: Granularity) -> Vec<AggregatedBucket> {
    R::aggregate(records, granularity)
}

#[derive(Debug)]
struct Accumulator {
    bucket: Bucket,
    kind: AggregateKind,
    /// (value, weight) pairs averaged for exam buckets.
    scores: Vec<(f64, usize)>,
    correct: u64,
    incorrect: u64,
    per_subject: BTreeMap<String, SubjectTotals>,
    record_count: usize,
}

impl Accumulator {
    fn new(bucket: Bucket, kind: AggregateKind) -> Self {
        Self {
            bucket,
            kind,
            scores: Vec::new(),
            correct: 0,
            incorrect: 0,
            per_subject: BTreeMap::new(),
            record_count: 0,
        }
    }

    fn finish(mut self) -> AggregatedBucket {
        let total = match self.kind {
            AggregateKind::Practice => (self.correct + self.incorrect) as f64,
            AggregateKind::Exam => weighted_mean(&mut self.scores),
        };
        AggregatedBucket {
            bucket: self.bucket,
            kind: self.kind,
            total,
            total_correct: self.correct,
            total_incorrect: self.incorrect,
            per_subject: self.per_subject,
            record_count: self.record_count,
        }
    }
}

/// Order-independent weighted mean: contributions are summed in sorted order.
fn weighted_mean(scores: &mut [(f64, usize)]) -> f64 {
    if scores.len() == 1 {
        return scores[0].0;
    }
    scores.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    let weight: usize = scores.iter().map(|(_, w)| *w).sum();
    if weight == 0 {
        return 0.0;
    }
    let sum: f64 = scores.iter().map(|(v, w)| v * *w as f64).sum();
    sum / weight as f64
}

fn finish_all(groups: BTreeMap<(String, AggregateKind), Accumulator>) -> Vec<AggregatedBucket> {
    groups.into_values().map(Accumulator::finish).collect()
}

impl Aggregate for PracticeLog {
    /// Sums practice volume per bucket. Duplicate saves for the same
    /// (student, date) collapse to the last one in slice order.
    fn aggregate(records: &[Self], granularity: Granularity) -> Vec<AggregatedBucket> {
        let book = PracticeLogBook::from_saves(records.iter().cloned());
        let mut groups: BTreeMap<(String, AggregateKind), Accumulator> = BTreeMap::new();

        for log in book.iter() {
            let bucket = bucket_key(log.date, granularity);
            let acc = groups
                .entry((bucket.key.clone(), AggregateKind::Practice))
                .or_insert_with(|| Accumulator::new(bucket, AggregateKind::Practice));
            for (subject, attempt) in &log.subjects {
                let correct = attempt.correct as u64;
                let incorrect = attempt.incorrect as u64;
                acc.correct += correct;
                acc.incorrect += incorrect;
                acc.per_subject
                    .entry(subject.clone())
                    .or_default()
                    .add(correct, incorrect);
            }
            acc.record_count += 1;
        }

        tracing::debug!(
            logs = records.len(),
            buckets = groups.len(),
            %granularity,
            "aggregated practice logs"
        );
        finish_all(groups)
    }
}

impl Aggregate for ExamRecord {
    /// Averages placement scores per bucket; correct/incorrect still sum.
    fn aggregate(records: &[Self], granularity: Granularity) -> Vec<AggregatedBucket> {
        let mut groups: BTreeMap<(String, AggregateKind), Accumulator> = BTreeMap::new();

        for record in records {
            let bucket = bucket_key(record.date(), granularity);
            let acc = groups
                .entry((bucket.key.clone(), AggregateKind::Exam))
                .or_insert_with(|| Accumulator::new(bucket, AggregateKind::Exam));
            acc.scores.push((record.placement_score(), 1));
            for (subject, attempt) in record.subjects() {
                let correct = attempt.correct as u64;
                let incorrect = attempt.incorrect as u64;
                acc.correct += correct;
                acc.incorrect += incorrect;
                acc.per_subject
                    .entry(subject.key().to_string())
                    .or_default()
                    .add(correct, incorrect);
            }
            acc.record_count += 1;
        }

        tracing::debug!(
            exams = records.len(),
            buckets = groups.len(),
            %granularity,
            "aggregated exam records"
        );
        finish_all(groups)
    }
}

/// Re-bucket already aggregated buckets, each treated as one unit record.
///
/// With the same granularity this is a fixed point. With a coarser one,
/// practice sums add up and exam means are weighted by `record_count`.
/// Every source period must lie inside a single target period; a weekly
/// bucket that crosses a month boundary cannot be split back into days, so
/// it is rejected rather than moved whole into one month.
pub fn reaggregate(
    buckets: &[AggregatedBucket],
    granularity: Granularity,
) -> Result<Vec<AggregatedBucket>, EngineError> {
    let mut groups: BTreeMap<(String, AggregateKind), Accumulator> = BTreeMap::new();

    for source in buckets {
        let bucket = bucket_key(source.bucket.period_start, granularity);
        if !bucket.contains(source.bucket.period_end) {
            return Err(EngineError::BucketSpansPeriods {
                key: source.bucket.key.clone(),
                granularity: granularity.to_string(),
            });
        }
        let acc = groups
            .entry((bucket.key.clone(), source.kind))
            .or_insert_with(|| Accumulator::new(bucket, source.kind));
        acc.scores.push((source.total, source.record_count));
        acc.correct += source.total_correct;
        acc.incorrect += source.total_incorrect;
        for (subject, totals) in &source.per_subject {
            acc.per_subject
                .entry(subject.clone())
                .or_default()
                .add(totals.correct, totals.incorrect);
        }
        acc.record_count += source.record_count;
    }

    Ok(finish_all(groups))
}
