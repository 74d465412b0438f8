use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for candidates tracked by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub u64);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CandidateId {
    type Err = std::num::ParseIntError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.trim().parse::<u64>().map(CandidateId)
    }
}

/// Hiring funnel stage. Declaration order is the column order of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    Applied,
    Shortlisted,
    Interview,
    Offer,
    Hired,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Applied,
        Stage::Shortlisted,
        Stage::Interview,
        Stage::Offer,
        Stage::Hired,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Stage::Applied => "Applied",
            Stage::Shortlisted => "Shortlisted",
            Stage::Interview => "Interview",
            Stage::Offer => "Offer",
            Stage::Hired => "Hired",
        }
    }

    pub const fn position(self) -> usize {
        self as usize
    }

    /// The stage immediately after this one, if any.
    pub fn next(self) -> Option<Stage> {
        Stage::ALL.get(self.position() + 1).copied()
    }

    /// Candidates in every stage except `Hired` count toward the active pipeline.
    pub const fn is_active(self) -> bool {
        !matches!(self, Stage::Hired)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raised when a string does not name one of the five pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid pipeline stage")]
pub struct InvalidStage(pub String);

impl FromStr for Stage {
    type Err = InvalidStage;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Stage::ALL
            .into_iter()
            .find(|stage| stage.label() == trimmed)
            .ok_or_else(|| InvalidStage(raw.to_string()))
    }
}

/// Screening fit score, a percentage fixed when the candidate is ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FitScore(u8);

impl FitScore {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Result<Self, CandidateError> {
        if value > Self::MAX {
            return Err(CandidateError::FitScoreOutOfRange(value));
        }
        Ok(Self(value))
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub fn band(self) -> FitBand {
        match self.0 {
            90..=u8::MAX => FitBand::Strong,
            80..=89 => FitBand::Good,
            70..=79 => FitBand::Fair,
            _ => FitBand::Weak,
        }
    }
}

impl TryFrom<u8> for FitScore {
    type Error = CandidateError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        FitScore::new(value)
    }
}

impl From<FitScore> for u8 {
    fn from(score: FitScore) -> Self {
        score.0
    }
}

/// Coarse grouping of fit scores used to highlight cards on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitBand {
    Strong,
    Good,
    Fair,
    Weak,
}

/// Validation failures when constructing candidate records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CandidateError {
    #[error("fit score {0} exceeds 100")]
    FitScoreOutOfRange(u8),
    #[error("candidate name must not be empty")]
    MissingName,
}

/// Candidate as stored by the pipeline. Only `stage` and `version` change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    pub id: CandidateId,
    pub name: String,
    pub email: String,
    pub position: String,
    pub stage: Stage,
    pub fit_score: FitScore,
    pub created_at: DateTime<Utc>,
    /// Count of effective stage changes, starting at 1. Informational only: stale
    /// writes are detected through the expected stage, never through this counter.
    pub version: u64,
}

impl CandidateRecord {
    pub fn new(
        id: CandidateId,
        name: impl Into<String>,
        email: impl Into<String>,
        position: impl Into<String>,
        stage: Stage,
        fit_score: u8,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CandidateError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CandidateError::MissingName);
        }

        Ok(Self {
            id,
            name,
            email: email.into(),
            position: position.into(),
            stage,
            fit_score: FitScore::new(fit_score)?,
            created_at,
            version: 1,
        })
    }

    /// Uppercase initials of the first two words of the name.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .take(2)
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Outcome of a move request, reported back to HTTP callers and the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageChange {
    pub candidate_id: CandidateId,
    pub previous_stage: Stage,
    pub new_stage: Stage,
    pub changed: bool,
}

/// Body of a move request. Stage names stay raw so validation can report them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageMoveRequest {
    pub stage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_stage: Option<String>,
}

impl StageMoveRequest {
    pub fn to(stage: Stage) -> Self {
        Self {
            stage: stage.label().to_string(),
            expected_stage: None,
        }
    }

    pub fn expecting(mut self, stage: Stage) -> Self {
        self.expected_stage = Some(stage.label().to_string());
        self
    }
}
