//! The `examtrack score` command.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;

use examtrack_core::model::{ExamFormat, Subject, SubjectAttempt};
use examtrack_core::net::round2;
use examtrack_core::scoring::{score_attempts, ScoreSet};

#[derive(Serialize)]
struct ScoreOutput {
    format: ExamFormat,
    nets: BTreeMap<Subject, f64>,
    total_net: f64,
    placement: f64,
    scores: ScoreSet,
}

pub fn execute(
    format: String,
    subjects: Vec<String>,
    diploma: Option<f64>,
    output: String,
) -> Result<()> {
    let format: ExamFormat = format.parse()?;

    let mut attempts = BTreeMap::new();
    for arg in &subjects {
        let (subject, attempt) = parse_subject_arg(arg)?;
        attempts.insert(subject, attempt);
    }

    let scores = score_attempts(format, &attempts, diploma)?;
    let divisor = format.penalty_divisor();
    let nets: BTreeMap<Subject, f64> = attempts
        .iter()
        .map(|(subject, attempt)| (*subject, attempt.net(divisor)))
        .collect();
    let total_net = examtrack_core::net::total_net(nets.values().copied());

    match output.as_str() {
        "json" => {
            let out = ScoreOutput {
                format,
                nets: nets.iter().map(|(s, n)| (*s, round2(*n))).collect(),
                total_net,
                placement: round2(scores.placement()),
                scores,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        _ => print_text(format, &attempts, &nets, total_net, &scores),
    }

    Ok(())
}

fn print_text(
    format: ExamFormat,
    attempts: &BTreeMap<Subject, SubjectAttempt>,
    nets: &BTreeMap<Subject, f64>,
    total_net: f64,
    scores: &ScoreSet,
) {
    use comfy_table::{Cell, Table};

    println!("{format} (wrong answers per lost question: {})", format.penalty_divisor());

    if !attempts.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Subject", "Correct", "Incorrect", "Net"]);
        for (subject, attempt) in attempts {
            let net = nets.get(subject).copied().unwrap_or(0.0);
            table.add_row(vec![
                Cell::new(subject),
                Cell::new(attempt.correct),
                Cell::new(attempt.incorrect),
                Cell::new(format!("{:.2}", net)),
            ]);
        }
        println!("{table}");
    }
    println!("Total net: {total_net:.2}");

    let mut table = Table::new();
    table.set_header(vec!["Track", "Score"]);
    for (track, value) in scores.iter() {
        let name = if track == scores.primary {
            format!("{track} *")
        } else {
            track.to_string()
        };
        table.add_row(vec![Cell::new(name), Cell::new(format!("{value:.2}"))]);
    }
    println!("{table}");
    println!("Placement score: {:.2}", scores.placement());
}

/// Parse `key=correct[:incorrect]`.
fn parse_subject_arg(arg: &str) -> Result<(Subject, SubjectAttempt)> {
    let (key, counts) = arg
        .split_once('=')
        .with_context(|| format!("expected key=correct[:incorrect], got {arg:?}"))?;
    let subject: Subject = key.parse()?;

    let (correct, incorrect) = match counts.split_once(':') {
        Some((c, w)) => (c, w),
        None => (counts, "0"),
    };
    let correct: u32 = correct
        .trim()
        .parse()
        .with_context(|| format!("invalid correct count in {arg:?}"))?;
    let incorrect: u32 = incorrect
        .trim()
        .parse()
        .with_context(|| format!("invalid incorrect count in {arg:?}"))?;

    Ok((subject, SubjectAttempt::new(correct, incorrect)))
}
