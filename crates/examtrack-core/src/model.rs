//! Core data model types for examtrack.
//!
//! Exam formats, subjects, raw attempts and the two record kinds the engine
//! folds over. Everything here is validated on construction, so the
//! calculators downstream never see a negative count or a subject the
//! format does not score.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::net;

/// Supported exam variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExamFormat {
    #[serde(rename = "LGS")]
    Lgs,
    #[serde(rename = "TYT")]
    Tyt,
    #[serde(rename = "AYT_SAY")]
    AytSay,
    #[serde(rename = "AYT_EA")]
    AytEa,
    #[serde(rename = "AYT_SOZ")]
    AytSoz,
    #[serde(rename = "AYT_DIL")]
    AytDil,
    #[serde(rename = "GENERAL", alias = "GENEL")]
    General,
}

impl ExamFormat {
    pub const ALL: [ExamFormat; 7] = [
        ExamFormat::Lgs,
        ExamFormat::Tyt,
        ExamFormat::AytSay,
        ExamFormat::AytEa,
        ExamFormat::AytSoz,
        ExamFormat::AytDil,
        ExamFormat::General,
    ];

    /// Number of wrong answers that cancel one right answer.
    pub fn penalty_divisor(self) -> f64 {
        match self {
            ExamFormat::Lgs => 3.0,
            _ => 4.0,
        }
    }

    /// Whether this format belongs to the university entrance (YKS) family,
    /// whose scores carry a diploma term.
    pub fn is_yks(self) -> bool {
        self == ExamFormat::Tyt || self.is_ayt()
    }

    pub fn is_ayt(self) -> bool {
        matches!(
            self,
            ExamFormat::AytSay | ExamFormat::AytEa | ExamFormat::AytSoz | ExamFormat::AytDil
        )
    }

    /// Subjects a record of this format may carry.
    ///
    /// All AYT tracks share one table: a single sitting produces the four
    /// track scores from the same set of nets.
    pub fn relevant_subjects(self) -> &'static [Subject] {
        use Subject::*;
        match self {
            ExamFormat::Lgs => &[Turkish, Math, Science, Inkilap, Religion, ForeignLang],
            ExamFormat::Tyt => &[Turkish, Social, Math, Science],
            ExamFormat::AytSay | ExamFormat::AytEa | ExamFormat::AytSoz | ExamFormat::AytDil => &[
                TytTurkish,
                TytSocial,
                TytMath,
                TytScience,
                Math,
                Physics,
                Chemistry,
                Biology,
                Literature,
                History1,
                Geography1,
                History2,
                Geography2,
                Philosophy,
                Religion,
                ForeignLang,
            ],
            ExamFormat::General => &[Turkish, Math, Science, Social, ForeignLang, Religion],
        }
    }

    pub fn supports(self, subject: Subject) -> bool {
        self.relevant_subjects().contains(&subject)
    }
}

impl fmt::Display for ExamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExamFormat::Lgs => "LGS",
            ExamFormat::Tyt => "TYT",
            ExamFormat::AytSay => "AYT_SAY",
            ExamFormat::AytEa => "AYT_EA",
            ExamFormat::AytSoz => "AYT_SOZ",
            ExamFormat::AytDil => "AYT_DIL",
            ExamFormat::General => "GENERAL",
        };
        f.write_str(name)
    }
}

impl FromStr for ExamFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "LGS" => Ok(ExamFormat::Lgs),
            "TYT" => Ok(ExamFormat::Tyt),
            "AYT_SAY" => Ok(ExamFormat::AytSay),
            "AYT_EA" => Ok(ExamFormat::AytEa),
            "AYT_SOZ" => Ok(ExamFormat::AytSoz),
            "AYT_DIL" => Ok(ExamFormat::AytDil),
            "GENERAL" | "GENEL" => Ok(ExamFormat::General),
            _ => Err(EngineError::UnknownFormat(s.to_string())),
        }
    }
}

/// Exam subjects that carry a coefficient in at least one formula.
///
/// The `Tyt*` variants hold the TYT nets an AYT sitting reuses for its 40%
/// TYT contribution, kept apart from the AYT math net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Turkish,
    Math,
    Science,
    Social,
    Inkilap,
    Religion,
    ForeignLang,
    Physics,
    Chemistry,
    Biology,
    Literature,
    History1,
    History2,
    Geography1,
    Geography2,
    Philosophy,
    TytTurkish,
    TytSocial,
    TytMath,
    TytScience,
}

impl Subject {
    pub fn key(self) -> &'static str {
        match self {
            Subject::Turkish => "turkish",
            Subject::Math => "math",
            Subject::Science => "science",
            Subject::Social => "social",
            Subject::Inkilap => "inkilap",
            Subject::Religion => "religion",
            Subject::ForeignLang => "foreign_lang",
            Subject::Physics => "physics",
            Subject::Chemistry => "chemistry",
            Subject::Biology => "biology",
            Subject::Literature => "literature",
            Subject::History1 => "history1",
            Subject::History2 => "history2",
            Subject::Geography1 => "geography1",
            Subject::Geography2 => "geography2",
            Subject::Philosophy => "philosophy",
            Subject::TytTurkish => "tyt_turkish",
            Subject::TytSocial => "tyt_social",
            Subject::TytMath => "tyt_math",
            Subject::TytScience => "tyt_science",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Subject {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        let subject = match normalized.as_str() {
            "turkish" => Subject::Turkish,
            "math" | "mathematics" => Subject::Math,
            "science" => Subject::Science,
            "social" => Subject::Social,
            "inkilap" => Subject::Inkilap,
            "religion" => Subject::Religion,
            "foreign_lang" | "foreignlang" | "lang" => Subject::ForeignLang,
            "physics" => Subject::Physics,
            "chemistry" => Subject::Chemistry,
            "biology" => Subject::Biology,
            "literature" => Subject::Literature,
            "history1" | "history_1" => Subject::History1,
            "history2" | "history_2" => Subject::History2,
            "geography1" | "geography_1" => Subject::Geography1,
            "geography2" | "geography_2" => Subject::Geography2,
            "philosophy" => Subject::Philosophy,
            "tyt_turkish" => Subject::TytTurkish,
            "tyt_social" => Subject::TytSocial,
            "tyt_math" => Subject::TytMath,
            "tyt_science" => Subject::TytScience,
            _ => return Err(EngineError::UnknownSubject(s.to_string())),
        };
        Ok(subject)
    }
}

/// Subject nets keyed by subject, at full precision.
pub type SubjectNets = BTreeMap<Subject, f64>;

/// One subject's raw results on one exam or practice session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectAttempt {
    pub correct: u32,
    pub incorrect: u32,
}

impl SubjectAttempt {
    pub fn new(correct: u32, incorrect: u32) -> Self {
        Self { correct, incorrect }
    }

    /// Questions attempted (correct plus incorrect).
    pub fn total(&self) -> u64 {
        self.correct as u64 + self.incorrect as u64
    }

    /// Penalty-adjusted net at full precision.
    pub fn net(&self, penalty_divisor: f64) -> f64 {
        net::net(self.correct, self.incorrect, penalty_divisor)
    }
}

/// A subject value as it arrives from storage.
///
/// Legacy rows hold a bare correct count; current rows hold the pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSubjectValue {
    Count(f64),
    Pair {
        #[serde(default)]
        correct: f64,
        #[serde(default)]
        incorrect: f64,
    },
}

impl RawSubjectValue {
    /// Normalize into a [`SubjectAttempt`], rejecting negative or fractional counts.
    pub fn normalize(&self, subject: &str) -> Result<SubjectAttempt, EngineError> {
        match *self {
            RawSubjectValue::Count(correct) => Ok(SubjectAttempt::new(
                validate_count(subject, "correct", correct)?,
                0,
            )),
            RawSubjectValue::Pair { correct, incorrect } => Ok(SubjectAttempt::new(
                validate_count(subject, "correct", correct)?,
                validate_count(subject, "incorrect", incorrect)?,
            )),
        }
    }
}

fn validate_count(subject: &str, field: &'static str, value: f64) -> Result<u32, EngineError> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(EngineError::InvalidCount {
            subject: subject.to_string(),
            field,
            value,
        });
    }
    Ok(value as u32)
}

/// Bucket size selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Daily => write!(f, "daily"),
            Granularity::Weekly => write!(f, "weekly"),
            Granularity::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for Granularity {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" | "day" => Ok(Granularity::Daily),
            "weekly" | "week" => Ok(Granularity::Weekly),
            "monthly" | "month" => Ok(Granularity::Monthly),
            other => Err(EngineError::UnknownGranularity(other.to_string())),
        }
    }
}

/// A scored exam sitting. Immutable: corrections replace the whole record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamRecord {
    student_id: String,
    name: Option<String>,
    date: NaiveDate,
    format: ExamFormat,
    subjects: BTreeMap<Subject, SubjectAttempt>,
    diploma_score: Option<f64>,
}

impl ExamRecord {
    /// Build a record, rejecting subjects the format does not score and
    /// diploma scores outside `[0, 100]`.
    pub fn new(
        student_id: impl Into<String>,
        date: NaiveDate,
        format: ExamFormat,
        subjects: BTreeMap<Subject, SubjectAttempt>,
        diploma_score: Option<f64>,
    ) -> Result<Self, EngineError> {
        if let Some(subject) = subjects.keys().find(|s| !format.supports(**s)) {
            return Err(EngineError::UnsupportedSubject {
                format: format.to_string(),
                subject: subject.to_string(),
            });
        }
        if let Some(diploma) = diploma_score {
            validate_diploma(diploma)?;
        }
        Ok(Self {
            student_id: student_id.into(),
            name: None,
            date,
            format,
            subjects,
            diploma_score,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn format(&self) -> ExamFormat {
        self.format
    }

    pub fn subjects(&self) -> &BTreeMap<Subject, SubjectAttempt> {
        &self.subjects
    }

    pub fn diploma_score(&self) -> Option<f64> {
        self.diploma_score
    }

    /// Per-subject nets at full precision, for further arithmetic.
    pub fn nets(&self) -> SubjectNets {
        let divisor = self.format.penalty_divisor();
        self.subjects
            .iter()
            .map(|(subject, attempt)| (*subject, attempt.net(divisor)))
            .collect()
    }

    /// Per-subject nets rounded to two decimals, for storage and display.
    pub fn rounded_nets(&self) -> SubjectNets {
        self.nets()
            .into_iter()
            .map(|(subject, value)| (subject, net::round2(value)))
            .collect()
    }

    pub fn total_correct(&self) -> u64 {
        self.subjects.values().map(|a| a.correct as u64).sum()
    }

    pub fn total_incorrect(&self) -> u64 {
        self.subjects.values().map(|a| a.incorrect as u64).sum()
    }
}

pub(crate) fn validate_diploma(diploma: f64) -> Result<(), EngineError> {
    if !diploma.is_finite() || !(0.0..=100.0).contains(&diploma) {
        return Err(EngineError::InvalidDiplomaScore(diploma));
    }
    Ok(())
}

/// One student's practice questions for one calendar day.
///
/// Subject keys are free-form labels ("Paragraf", "Geometri", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeLog {
    pub student_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub subjects: BTreeMap<String, SubjectAttempt>,
}

impl PracticeLog {
    pub fn new(student_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            student_id: student_id.into(),
            date,
            subjects: BTreeMap::new(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>, attempt: SubjectAttempt) -> Self {
        self.subjects.insert(subject.into(), attempt);
        self
    }

    pub fn total_correct(&self) -> u64 {
        self.subjects.values().map(|a| a.correct as u64).sum()
    }

    pub fn total_incorrect(&self) -> u64 {
        self.subjects.values().map(|a| a.incorrect as u64).sum()
    }

    /// Questions solved that day.
    pub fn total(&self) -> u64 {
        self.total_correct() + self.total_incorrect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn format_display_and_parse() {
        for format in ExamFormat::ALL {
            assert_eq!(format.to_string().parse::<ExamFormat>().unwrap(), format);
        }
        assert_eq!("genel".parse::<ExamFormat>().unwrap(), ExamFormat::General);
        assert_eq!("ayt-say".parse::<ExamFormat>().unwrap(), ExamFormat::AytSay);
        assert_eq!(
            "KPSS".parse::<ExamFormat>(),
            Err(EngineError::UnknownFormat("KPSS".into()))
        );
    }

    #[test]
    fn penalty_divisors() {
        assert_eq!(ExamFormat::Lgs.penalty_divisor(), 3.0);
        for format in ExamFormat::ALL.iter().filter(|f| **f != ExamFormat::Lgs) {
            assert_eq!(format.penalty_divisor(), 4.0);
        }
    }

    #[test]
    fn yks_family() {
        assert!(!ExamFormat::Lgs.is_yks());
        assert!(!ExamFormat::General.is_yks());
        assert!(ExamFormat::Tyt.is_yks());
        assert!(ExamFormat::AytDil.is_yks() && ExamFormat::AytDil.is_ayt());
    }

    #[test]
    fn subject_keys_round_trip() {
        let subjects = [
            Subject::Turkish,
            Subject::ForeignLang,
            Subject::History1,
            Subject::Geography2,
            Subject::TytScience,
        ];
        for subject in subjects {
            assert_eq!(subject.key().parse::<Subject>().unwrap(), subject);
            let json = serde_json::to_string(&subject).unwrap();
            assert_eq!(json, format!("\"{}\"", subject.key()));
        }
        assert!("astrology".parse::<Subject>().is_err());
    }

    #[test]
    fn legacy_count_normalizes_to_pair() {
        let legacy: RawSubjectValue = serde_json::from_str("17").unwrap();
        assert_eq!(legacy.normalize("math").unwrap(), SubjectAttempt::new(17, 0));

        let pair: RawSubjectValue =
            serde_json::from_str(r#"{"correct": 12, "incorrect": 4}"#).unwrap();
        assert_eq!(pair.normalize("math").unwrap(), SubjectAttempt::new(12, 4));

        let partial: RawSubjectValue = serde_json::from_str(r#"{"incorrect": 2}"#).unwrap();
        assert_eq!(partial.normalize("math").unwrap(), SubjectAttempt::new(0, 2));
    }

    #[test]
    fn negative_or_fractional_counts_are_rejected() {
        let negative = RawSubjectValue::Pair {
            correct: 5.0,
            incorrect: -1.0,
        };
        let err = negative.normalize("turkish").unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidCount {
                field: "incorrect",
                ..
            }
        ));

        assert!(RawSubjectValue::Count(2.5).normalize("turkish").is_err());
        assert!(RawSubjectValue::Count(f64::NAN).normalize("turkish").is_err());
    }

    #[test]
    fn exam_record_rejects_foreign_subjects() {
        let mut subjects = BTreeMap::new();
        subjects.insert(Subject::Physics, SubjectAttempt::new(10, 2));
        let err = ExamRecord::new("s1", date("2024-03-04"), ExamFormat::Lgs, subjects, None)
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::UnsupportedSubject {
                format: "LGS".into(),
                subject: "physics".into(),
            }
        );
    }

    #[test]
    fn exam_record_rejects_out_of_range_diploma() {
        let result = ExamRecord::new(
            "s1",
            date("2024-03-04"),
            ExamFormat::Tyt,
            BTreeMap::new(),
            Some(101.0),
        );
        assert_eq!(result.unwrap_err(), EngineError::InvalidDiplomaScore(101.0));
    }

    #[test]
    fn exam_record_nets_keep_precision() {
        let mut subjects = BTreeMap::new();
        subjects.insert(Subject::Turkish, SubjectAttempt::new(10, 1));
        let record =
            ExamRecord::new("s1", date("2024-03-04"), ExamFormat::Lgs, subjects, None).unwrap();
        let full = record.nets()[&Subject::Turkish];
        let rounded = record.rounded_nets()[&Subject::Turkish];
        assert!((full - (10.0 - 1.0 / 3.0)).abs() < 1e-12);
        assert_eq!(rounded, 9.67);
    }

    #[test]
    fn practice_log_totals() {
        let log = PracticeLog::new("s1", date("2024-03-04"))
            .with_subject("Paragraf", SubjectAttempt::new(30, 5))
            .with_subject("Matematik", SubjectAttempt::new(20, 10));
        assert_eq!(log.total_correct(), 50);
        assert_eq!(log.total_incorrect(), 15);
        assert_eq!(log.total(), 65);
    }

    #[test]
    fn granularity_parse() {
        assert_eq!("Weekly".parse::<Granularity>().unwrap(), Granularity::Weekly);
        assert_eq!("month".parse::<Granularity>().unwrap(), Granularity::Monthly);
        assert!("hourly".parse::<Granularity>().is_err());
    }
}
