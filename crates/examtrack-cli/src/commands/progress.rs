//! The `examtrack progress` command.

use std::path::PathBuf;

use anyhow::Result;

use examtrack_core::aggregate::{aggregate, AggregateKind};
use examtrack_core::filter::{PeriodFilter, RecordFilter};
use examtrack_core::ingest::load_records;
use examtrack_core::model::{ExamFormat, Granularity};
use examtrack_core::report::{ProgressReport, ReportOptions};
use examtrack_core::trend::SubjectFilter;

use crate::config::load_config_from;

pub struct ProgressArgs {
    pub records: PathBuf,
    pub kind: String,
    pub granularity: Option<String>,
    pub student: Option<String>,
    pub exam_format: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub target: Option<f64>,
    pub subject: String,
    pub output: String,
    pub save: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub fn execute(args: ProgressArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;

    let kind = parse_kind(&args.kind)?;
    let granularity: Granularity = match &args.granularity {
        Some(g) => g.parse()?,
        None => config.default_granularity,
    };

    let mut filter = RecordFilter::new();
    if let Some(student) = &args.student {
        filter = filter.student(student.clone());
    }
    if let Some(format) = &args.exam_format {
        let format: ExamFormat = format.parse()?;
        filter = filter.format(format);
    }
    if args.from.is_some() || args.to.is_some() {
        filter = filter.period(PeriodFilter::Range {
            granularity,
            from: args.from.clone(),
            to: args.to.clone(),
        });
    }

    let set = load_records(&args.records)?;
    let buckets = match kind {
        AggregateKind::Practice => {
            let logs = filter.apply_practice(&set.practice_logs());
            aggregate(&logs, granularity)
        }
        AggregateKind::Exam => aggregate(&filter.apply_exams(&set.exams), granularity),
    };
    tracing::debug!(buckets = buckets.len(), %granularity, "aggregated records");

    let target = args.target.unwrap_or(match kind {
        AggregateKind::Practice => config.targets.practice(granularity),
        AggregateKind::Exam => config.targets.exam,
    });
    let mut options = ReportOptions::new(target);
    options.subject = SubjectFilter::parse(&args.subject);
    options.accuracy_ladder = config.accuracy_ladder.clone();

    let report = ProgressReport::build(scope(&args), kind, granularity, buckets, options);

    if let Some(path) = &args.save {
        report.save_json(path)?;
        tracing::info!("report saved to {}", path.display());
    }

    match args.output.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "markdown" | "md" => println!("{}", report.to_markdown()),
        _ => print_text(&report),
    }

    Ok(())
}

fn parse_kind(kind: &str) -> Result<AggregateKind> {
    match kind.to_lowercase().as_str() {
        "practice" => Ok(AggregateKind::Practice),
        "exams" | "exam" => Ok(AggregateKind::Exam),
        other => anyhow::bail!("unknown record kind: {other} (expected practice or exams)"),
    }
}

fn scope(args: &ProgressArgs) -> String {
    let mut scope = args
        .student
        .clone()
        .unwrap_or_else(|| "all students".to_string());
    if let Some(format) = &args.exam_format {
        scope.push_str(&format!(", {format}"));
    }
    match (&args.from, &args.to) {
        (Some(from), Some(to)) => scope.push_str(&format!(", {from} to {to}")),
        (Some(from), None) => scope.push_str(&format!(", from {from}")),
        (None, Some(to)) => scope.push_str(&format!(", until {to}")),
        (None, None) => {}
    }
    scope
}

fn print_text(report: &ProgressReport) {
    use comfy_table::{Cell, Table};

    println!("{} progress: {}", report.granularity, report.scope);

    if report.buckets.is_empty() {
        println!("No records in range.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Period",
        "Total",
        "Correct",
        "Incorrect",
        "Correct %",
        "Trend",
        "Target",
    ]);

    for ((bucket, point), rolling) in report
        .buckets
        .iter()
        .zip(&report.accuracy)
        .zip(&report.rolling_totals)
    {
        let total = match report.kind {
            AggregateKind::Practice => format!("{:.0}", bucket.total),
            AggregateKind::Exam => format!("{:.2}", bucket.detail_total()),
        };
        let met = if bucket.total >= report.options.target {
            "met"
        } else {
            "below"
        };
        table.add_row(vec![
            Cell::new(&bucket.bucket.label),
            Cell::new(total),
            Cell::new(bucket.total_correct),
            Cell::new(bucket.total_incorrect),
            Cell::new(format!("{:.1}%", point.correct_rate_percent)),
            Cell::new(format!("{rolling:.1}")),
            Cell::new(met),
        ]);
    }
    println!("{table}");

    let c = &report.classification;
    println!(
        "\nTarget {}: {}/{} periods met ({}%)",
        c.target,
        c.meets,
        c.bucket_count(),
        c.success_percent
    );
    println!("Accuracy chart floor: {}%", report.accuracy_floor);
}
