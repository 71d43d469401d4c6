//! Placement score formulas.
//!
//! Each format has a fixed coefficient table, a base constant and a clamp
//! range. AYT sittings produce four track scores (SAY, EA, SOZ, DIL) from the
//! same nets in one call; each is clamped on its own.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::{
    validate_diploma, ExamFormat, ExamRecord, Subject, SubjectAttempt, SubjectNets,
};

/// A named placement score produced by a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Lgs,
    Tyt,
    Say,
    Ea,
    Soz,
    Dil,
    General,
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Track::Lgs => "LGS",
            Track::Tyt => "TYT",
            Track::Say => "SAY",
            Track::Ea => "EA",
            Track::Soz => "SOZ",
            Track::Dil => "DIL",
            Track::General => "GENERAL",
        };
        f.write_str(name)
    }
}

impl Track {
    /// The track whose score counts as the record's placement score.
    pub fn primary_for(format: ExamFormat) -> Track {
        match format {
            ExamFormat::Lgs => Track::Lgs,
            ExamFormat::Tyt => Track::Tyt,
            ExamFormat::AytSay => Track::Say,
            ExamFormat::AytEa => Track::Ea,
            ExamFormat::AytSoz => Track::Soz,
            ExamFormat::AytDil => Track::Dil,
            ExamFormat::General => Track::General,
        }
    }
}

/// Inclusive clamp range of a format's scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBounds {
    pub floor: f64,
    pub ceiling: f64,
}

impl ScoreBounds {
    pub fn for_format(format: ExamFormat) -> Self {
        match format {
            ExamFormat::Lgs => LGS_BOUNDS,
            _ => YKS_BOUNDS,
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.floor, self.ceiling)
    }
}

const LGS_BOUNDS: ScoreBounds = ScoreBounds {
    floor: 100.0,
    ceiling: 500.0,
};

const YKS_BOUNDS: ScoreBounds = ScoreBounds {
    floor: 0.0,
    ceiling: 560.0,
};

const LGS_BASE: f64 = 194.76;
const YKS_BASE: f64 = 100.0;
const DIPLOMA_WEIGHT: f64 = 0.6;
const TYT_SHARE_IN_AYT: f64 = 0.4;

const LGS_WEIGHTS: &[(Subject, f64)] = &[
    (Subject::Turkish, 3.84),
    (Subject::Math, 4.90),
    (Subject::Science, 3.96),
    (Subject::Inkilap, 1.54),
    (Subject::Religion, 1.62),
    (Subject::ForeignLang, 1.52),
];

const TYT_WEIGHTS: &[(Subject, f64)] = &[
    (Subject::Turkish, 3.3),
    (Subject::Social, 3.4),
    (Subject::Math, 3.3),
    (Subject::Science, 3.4),
];

/// Simplified fixed weights used when an AYT sitting reuses TYT nets.
const TYT_CONTRIBUTION_WEIGHTS: &[(Subject, f64)] = &[
    (Subject::TytTurkish, 1.32),
    (Subject::TytSocial, 1.36),
    (Subject::TytMath, 1.32),
    (Subject::TytScience, 1.36),
];

const SAY_WEIGHTS: &[(Subject, f64)] = &[
    (Subject::Math, 3.0),
    (Subject::Physics, 2.85),
    (Subject::Chemistry, 3.07),
    (Subject::Biology, 3.07),
];

const EA_WEIGHTS: &[(Subject, f64)] = &[
    (Subject::Math, 3.0),
    (Subject::Literature, 3.0),
    (Subject::History1, 2.8),
    (Subject::Geography1, 3.33),
];

const SOZ_WEIGHTS: &[(Subject, f64)] = &[
    (Subject::Literature, 3.0),
    (Subject::History1, 2.8),
    (Subject::Geography1, 3.33),
    (Subject::History2, 2.91),
    (Subject::Geography2, 2.91),
    (Subject::Philosophy, 3.0),
    (Subject::Religion, 3.33),
];

const DIL_WEIGHTS: &[(Subject, f64)] = &[(Subject::ForeignLang, 3.0)];

/// All named scores from one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub format: ExamFormat,
    /// Track used as the record's placement score.
    pub primary: Track,
    pub scores: BTreeMap<Track, f64>,
}

impl ScoreSet {
    /// The placement score for the record's own format.
    pub fn placement(&self) -> f64 {
        self.scores.get(&self.primary).copied().unwrap_or(0.0)
    }

    pub fn get(&self, track: Track) -> Option<f64> {
        self.scores.get(&track).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Track, f64)> + '_ {
        self.scores.iter().map(|(t, v)| (*t, *v))
    }
}

/// Score a set of subject nets.
///
/// Missing subjects count as zero. Subjects the format does not score, negative
/// nets and diploma scores outside `[0, 100]` are rejected.
pub fn score(
    format: ExamFormat,
    nets: &SubjectNets,
    diploma_score: Option<f64>,
) -> Result<ScoreSet, EngineError> {
    for (subject, value) in nets {
        if !format.supports(*subject) {
            return Err(EngineError::UnsupportedSubject {
                format: format.to_string(),
                subject: subject.to_string(),
            });
        }
        if !value.is_finite() || *value < 0.0 {
            return Err(EngineError::InvalidNet {
                subject: subject.to_string(),
                value: *value,
            });
        }
    }
    if let Some(diploma) = diploma_score {
        validate_diploma(diploma)?;
    }
    Ok(compute(format, nets, diploma_score))
}

/// Score raw attempts, computing nets with the format's penalty divisor.
pub fn score_attempts(
    format: ExamFormat,
    attempts: &BTreeMap<Subject, SubjectAttempt>,
    diploma_score: Option<f64>,
) -> Result<ScoreSet, EngineError> {
    let divisor = format.penalty_divisor();
    let nets: SubjectNets = attempts
        .iter()
        .map(|(subject, attempt)| (*subject, attempt.net(divisor)))
        .collect();
    score(format, &nets, diploma_score)
}

impl ExamRecord {
    /// Score this record. Infallible: the record was validated on construction.
    pub fn score(&self) -> ScoreSet {
        compute(self.format(), &self.nets(), self.diploma_score())
    }

    /// Placement score for the record's own format.
    pub fn placement_score(&self) -> f64 {
        self.score().placement()
    }
}

fn compute(format: ExamFormat, nets: &SubjectNets, diploma_score: Option<f64>) -> ScoreSet {
    let bounds = ScoreBounds::for_format(format);
    let diploma_bonus = diploma_score.unwrap_or(0.0) * DIPLOMA_WEIGHT;
    let mut scores = BTreeMap::new();

    match format {
        ExamFormat::Lgs => {
            let raw = LGS_BASE + weighted(LGS_WEIGHTS, nets);
            scores.insert(Track::Lgs, bounds.clamp(raw));
        }
        ExamFormat::Tyt => {
            let raw = YKS_BASE + weighted(TYT_WEIGHTS, nets) + diploma_bonus;
            scores.insert(Track::Tyt, bounds.clamp(raw));
        }
        ExamFormat::AytSay | ExamFormat::AytEa | ExamFormat::AytSoz | ExamFormat::AytDil => {
            let base = YKS_BASE + tyt_contribution(nets) + diploma_bonus;
            for (track, weights) in [
                (Track::Say, SAY_WEIGHTS),
                (Track::Ea, EA_WEIGHTS),
                (Track::Soz, SOZ_WEIGHTS),
                (Track::Dil, DIL_WEIGHTS),
            ] {
                scores.insert(track, bounds.clamp(base + weighted(weights, nets)));
            }
        }
        ExamFormat::General => {
            // No official formula: the total net stands in for the score.
            let raw: f64 = nets.values().sum();
            scores.insert(Track::General, bounds.clamp(raw));
        }
    }

    ScoreSet {
        format,
        primary: Track::primary_for(format),
        scores,
    }
}

fn weighted(weights: &[(Subject, f64)], nets: &SubjectNets) -> f64 {
    weights
        .iter()
        .map(|(subject, coefficient)| nets.get(subject).copied().unwrap_or(0.0) * coefficient)
        .sum()
}

/// TYT share of an AYT placement score.
fn tyt_contribution(nets: &SubjectNets) -> f64 {
    (YKS_BASE + weighted(TYT_CONTRIBUTION_WEIGHTS, nets)) * TYT_SHARE_IN_AYT
}
