//! Record filtering, applied strictly before aggregation.
//!
//! A [`RecordFilter`] is a plain value handed to the caller's pipeline. Filters
//! never reset one another; every field narrows independently.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bucket::{bucket_key, week_start};
use crate::model::{ExamFormat, ExamRecord, Granularity, PracticeLog};

/// Restricts records to a calendar period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PeriodFilter {
    /// Inclusive bucket-key range at a granularity. Open ends are unbounded.
    Range {
        granularity: Granularity,
        #[serde(default)]
        from: Option<String>,
        #[serde(default)]
        to: Option<String>,
    },
    /// A `YYYY-MM` month.
    Month { key: String },
    /// The Monday-anchored week starting on `monday`.
    Week { monday: NaiveDate },
}

impl PeriodFilter {
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            PeriodFilter::Range {
                granularity,
                from,
                to,
            } => {
                let key = bucket_key(date, *granularity).key;
                from.as_deref().map_or(true, |f| key.as_str() >= f)
                    && to.as_deref().map_or(true, |t| key.as_str() <= t)
            }
            PeriodFilter::Month { key } => bucket_key(date, Granularity::Monthly).key == *key,
            PeriodFilter::Week { monday } => week_start(date) == week_start(*monday),
        }
    }
}

/// Which records an aggregation should see.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    #[serde(default)]
    pub student_id: Option<String>,
    /// Exam format; ignored for practice logs.
    #[serde(default)]
    pub format: Option<ExamFormat>,
    #[serde(default)]
    pub period: Option<PeriodFilter>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn student(mut self, student_id: impl Into<String>) -> Self {
        self.student_id = Some(student_id.into());
        self
    }

    pub fn format(mut self, format: ExamFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn period(mut self, period: PeriodFilter) -> Self {
        self.period = Some(period);
        self
    }

    fn matches_common(&self, student_id: &str, date: NaiveDate) -> bool {
        self.student_id.as_deref().map_or(true, |s| s == student_id)
            && self.period.as_ref().map_or(true, |p| p.matches(date))
    }

    pub fn matches_exam(&self, record: &ExamRecord) -> bool {
        self.matches_common(record.student_id(), record.date())
            && self.format.map_or(true, |f| f == record.format())
    }

    pub fn matches_practice(&self, log: &PracticeLog) -> bool {
        self.matches_common(&log.student_id, log.date)
    }

    pub fn apply_exams(&self, records: &[ExamRecord]) -> Vec<ExamRecord> {
        records
            .iter()
            .filter(|r| self.matches_exam(r))
            .cloned()
            .collect()
    }

    pub fn apply_practice(&self, logs: &[PracticeLog]) -> Vec<PracticeLog> {
        logs.iter()
            .filter(|l| self.matches_practice(l))
            .cloned()
            .collect()
    }
}
