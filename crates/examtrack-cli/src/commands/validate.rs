//! The `examtrack validate` command.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;

use examtrack_core::ingest::{load_records, validate_record_file};

pub fn execute(records_path: PathBuf) -> Result<()> {
    let set = load_records(&records_path)?;

    println!(
        "Records: {} exams, {} practice logs",
        set.exams.len(),
        set.practice.len()
    );

    let students: BTreeSet<&str> = set
        .exams
        .iter()
        .map(|e| e.student_id())
        .chain(set.practice.iter().map(|l| l.student_id.as_str()))
        .collect();
    if !students.is_empty() {
        let names: Vec<&str> = students.into_iter().collect();
        println!("Students: {}", names.join(", "));
    }

    let warnings = validate_record_file(&set);
    for w in &warnings {
        let prefix = w
            .record
            .as_ref()
            .map(|r| format!("  [{r}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("All records valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
