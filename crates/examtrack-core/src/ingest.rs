//! TOML/JSON record file loader.
//!
//! Loads exam records and practice logs from files and directories, and
//! validates them.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::logbook::PracticeLogBook;
use crate::model::{ExamFormat, ExamRecord, PracticeLog, RawSubjectValue, Subject};

/// Intermediate structure for parsing record files.
#[derive(Debug, Deserialize)]
struct RawRecordFile {
    #[serde(default)]
    exams: Vec<RawExam>,
    #[serde(default)]
    practice: Vec<RawPractice>,
}

#[derive(Debug, Deserialize)]
struct RawExam {
    student_id: String,
    date: NaiveDate,
    format: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    diploma_score: Option<f64>,
    #[serde(default)]
    subjects: BTreeMap<String, RawSubjectValue>,
}

#[derive(Debug, Deserialize)]
struct RawPractice {
    student_id: String,
    date: NaiveDate,
    #[serde(default)]
    subjects: BTreeMap<String, RawSubjectValue>,
}

/// Records loaded from one or more files.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub exams: Vec<ExamRecord>,
    pub practice: PracticeLogBook,
    /// (student, date) of every practice log replaced by a later save.
    pub replaced_practice: Vec<(String, NaiveDate)>,
}

impl RecordSet {
    pub fn is_empty(&self) -> bool {
        self.exams.is_empty() && self.practice.is_empty()
    }

    /// Save a practice log, recording a replacement if one happened.
    pub fn save_practice(&mut self, log: PracticeLog) {
        let key = (log.student_id.clone(), log.date);
        if self.practice.upsert(log).is_some() {
            self.replaced_practice.push(key);
        }
    }

    /// Merge `other` into this set. Its practice logs count as later saves.
    pub fn extend(&mut self, other: RecordSet) {
        self.exams.extend(other.exams);
        self.replaced_practice.extend(other.replaced_practice);
        for log in other.practice.into_vec() {
            self.save_practice(log);
        }
    }

    pub fn practice_logs(&self) -> Vec<PracticeLog> {
        self.practice.iter().cloned().collect()
    }
}

/// Parse a single record file. `.json` files are JSON, anything else TOML.
pub fn parse_records_file(path: &Path) -> Result<RecordSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read record file: {}", path.display()))?;

    parse_records_str(&content, path)
}

/// Parse record file contents (useful for testing).
pub fn parse_records_str(content: &str, source_path: &Path) -> Result<RecordSet> {
    let is_json = source_path.extension().is_some_and(|ext| ext == "json");
    let parsed: RawRecordFile = if is_json {
        serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?
    } else {
        toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?
    };

    let mut set = RecordSet::default();

    for (i, raw) in parsed.exams.into_iter().enumerate() {
        let exam = convert_exam(raw).with_context(|| {
            format!("invalid exam #{} in {}", i + 1, source_path.display())
        })?;
        set.exams.push(exam);
    }

    for (i, raw) in parsed.practice.into_iter().enumerate() {
        let log = convert_practice(raw).with_context(|| {
            format!("invalid practice log #{} in {}", i + 1, source_path.display())
        })?;
        set.save_practice(log);
    }

    Ok(set)
}

fn convert_exam(raw: RawExam) -> Result<ExamRecord> {
    let format: ExamFormat = raw.format.parse()?;

    let mut subjects = BTreeMap::new();
    for (key, value) in &raw.subjects {
        let subject: Subject = key.parse()?;
        subjects.insert(subject, value.normalize(key)?);
    }

    let record = ExamRecord::new(raw.student_id, raw.date, format, subjects, raw.diploma_score)?;
    Ok(match raw.name {
        Some(name) => record.with_name(name),
        None => record,
    })
}

fn convert_practice(raw: RawPractice) -> Result<PracticeLog> {
    let mut log = PracticeLog::new(raw.student_id, raw.date);
    for (key, value) in &raw.subjects {
        log = log.with_subject(key.clone(), value.normalize(key)?);
    }
    Ok(log)
}

/// Recursively load all `.toml` and `.json` record files from a directory.
///
/// Files are visited in path order, so practice saves in later files replace
/// earlier ones. Unparsable files are skipped with a warning.
pub fn load_record_directory(dir: &Path) -> Result<RecordSet> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        paths.push(entry?.path());
    }
    paths.sort();

    let mut set = RecordSet::default();
    for path in paths {
        if path.is_dir() {
            set.extend(load_record_directory(&path)?);
        } else if path
            .extension()
            .is_some_and(|ext| ext == "toml" || ext == "json")
        {
            match parse_records_file(&path) {
                Ok(file_set) => {
                    tracing::debug!(
                        path = %path.display(),
                        exams = file_set.exams.len(),
                        practice = file_set.practice.len(),
                        "loaded record file"
                    );
                    set.extend(file_set);
                }
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(set)
}

/// Load a single file or a whole directory.
pub fn load_records(path: &Path) -> Result<RecordSet> {
    if path.is_dir() {
        load_record_directory(path)
    } else {
        parse_records_file(path)
    }
}

/// A warning from record validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// `student@date` of the offending record, if applicable.
    pub record: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check loaded records for issues that do not stop ingestion.
pub fn validate_record_file(set: &RecordSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if set.is_empty() {
        warnings.push(ValidationWarning {
            record: None,
            message: "no exams or practice logs found".into(),
        });
    }

    for (student, date) in &set.replaced_practice {
        warnings.push(ValidationWarning {
            record: Some(format!("{student}@{date}")),
            message: "practice log replaced by a later save for the same day".into(),
        });
    }

    for exam in &set.exams {
        let label = format!("{}@{}", exam.student_id(), exam.date());
        if exam.subjects().is_empty() {
            warnings.push(ValidationWarning {
                record: Some(label.clone()),
                message: format!("{} exam has no subject data", exam.format()),
            });
        }
        if exam.format().is_yks() && exam.diploma_score().is_none() {
            warnings.push(ValidationWarning {
                record: Some(label),
                message: format!(
                    "{} exam has no diploma_score; the diploma term is left out",
                    exam.format()
                ),
            });
        }
    }

    warnings
}
