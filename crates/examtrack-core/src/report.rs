//! Progress report types with JSON persistence and markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregateKind, AggregatedBucket};
use crate::classify::{classify, Classification, Metric};
use crate::model::Granularity;
use crate::statistics::{rolling_mean, score_deltas};
use crate::trend::{
    accuracy_series, domain_floor_with, AccuracyPoint, SubjectFilter, PERCENT_LADDER,
};

/// Knobs for building a [`ProgressReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Threshold every bucket's `total` is classified against.
    pub target: f64,
    /// Subject the accuracy series reads.
    #[serde(default)]
    pub subject: SubjectFilter,
    /// Window of the trailing average over bucket totals.
    #[serde(default = "default_rolling_window")]
    pub rolling_window: usize,
    /// Ascending rungs the accuracy chart floor snaps to.
    #[serde(default = "default_accuracy_ladder")]
    pub accuracy_ladder: Vec<f64>,
}

fn default_rolling_window() -> usize {
    3
}

fn default_accuracy_ladder() -> Vec<f64> {
    PERCENT_LADDER.to_vec()
}

impl ReportOptions {
    pub fn new(target: f64) -> Self {
        Self {
            target,
            subject: SubjectFilter::All,
            rolling_window: default_rolling_window(),
            accuracy_ladder: default_accuracy_ladder(),
        }
    }
}

/// One aggregation run, ready to print or persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Free-form description of the records in scope ("ayse, 2024-03").
    pub scope: String,
    pub kind: AggregateKind,
    pub granularity: Granularity,
    pub options: ReportOptions,
    /// Aggregated buckets in chronological order.
    pub buckets: Vec<AggregatedBucket>,
    pub classification: Classification,
    pub accuracy: Vec<AccuracyPoint>,
    /// Suggested y-axis floor for the accuracy chart.
    pub accuracy_floor: f64,
    /// Trailing average of bucket totals, aligned with `buckets`.
    pub rolling_totals: Vec<f64>,
    /// Change of `total` from the previous bucket, keyed by bucket.
    pub deltas: Vec<(String, f64)>,
}

impl ProgressReport {
    /// Classify and derive series from already-aggregated buckets.
    pub fn build(
        scope: impl Into<String>,
        kind: AggregateKind,
        granularity: Granularity,
        buckets: Vec<AggregatedBucket>,
        options: ReportOptions,
    ) -> Self {
        let classification = classify(&buckets, &Metric::Total, options.target);
        let accuracy = accuracy_series(&buckets, &options.subject);
        let rates: Vec<f64> = accuracy.iter().map(|p| p.correct_rate_percent).collect();
        let accuracy_floor = domain_floor_with(&rates, &options.accuracy_ladder);
        let totals: Vec<f64> = buckets.iter().map(|b| b.total).collect();
        let rolling_totals = rolling_mean(&totals, options.rolling_window);
        let deltas = score_deltas(&buckets);

        Self {
            created_at: Utc::now(),
            scope: scope.into(),
            kind,
            granularity,
            options,
            buckets,
            classification,
            accuracy,
            accuracy_floor,
            rolling_totals,
            deltas,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ProgressReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let what = match self.kind {
            AggregateKind::Practice => "questions solved",
            AggregateKind::Exam => "mean placement score",
        };

        md.push_str(&format!(
            "## {} progress: {}\n\n",
            capitalize(&self.granularity.to_string()),
            self.scope
        ));
        md.push_str(&format!(
            "**Target:** {} {} | **Met:** {}/{} ({}%)\n\n",
            self.options.target,
            what,
            self.classification.meets,
            self.classification.bucket_count(),
            self.classification.success_percent
        ));

        if self.buckets.is_empty() {
            md.push_str("_No records in range._\n");
            return md;
        }

        md.push_str("| Period | Total | Correct | Incorrect | Correct % | Target |\n");
        md.push_str("|--------|-------|---------|-----------|-----------|--------|\n");
        for (bucket, point) in self.buckets.iter().zip(&self.accuracy) {
            let met = if bucket.total >= self.options.target {
                "met"
            } else {
                "below"
            };
            md.push_str(&format!(
                "| {} | {:.0} | {} | {} | {:.1}% | {} |\n",
                bucket.bucket.label,
                bucket.dashboard_total(),
                bucket.total_correct,
                bucket.total_incorrect,
                point.correct_rate_percent,
                met
            ));
        }

        md
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
