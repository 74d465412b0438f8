use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use super::domain::{CandidateError, CandidateId, CandidateRecord, InvalidStage, Stage};

/// Failures while reading a candidate roster export.
#[derive(Debug, thiserror::Error)]
pub enum CandidateImportError {
    #[error("failed to read candidate roster: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid candidate CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {source}")]
    Stage {
        row: usize,
        #[source]
        source: InvalidStage,
    },
    #[error("row {row}: {source}")]
    Candidate {
        row: usize,
        #[source]
        source: CandidateError,
    },
    #[error("row {row}: unrecognised created_at '{value}'")]
    CreatedAt { row: usize, value: String },
    #[error("row {row}: duplicate candidate id {id}")]
    DuplicateId { row: usize, id: CandidateId },
}

/// Reads candidates from a CSV roster with the columns
/// `id,name,email,position,stage,fit_score,created_at`.
pub struct CandidateCsvImporter;

impl CandidateCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<CandidateRecord>, CandidateImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<CandidateRecord>, CandidateImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        // Row numbers count the header as row 1 to match spreadsheet views.
        for (index, row) in csv_reader.deserialize::<RosterRow>().enumerate() {
            let row_number = index + 2;
            let row = row?;
            let candidate = row.into_candidate(row_number)?;
            if !seen.insert(candidate.id) {
                return Err(CandidateImportError::DuplicateId {
                    row: row_number,
                    id: candidate.id,
                });
            }
            candidates.push(candidate);
        }

        Ok(candidates)
    }
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    id: u64,
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    position: String,
    stage: String,
    fit_score: u8,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    created_at: Option<String>,
}

impl RosterRow {
    fn into_candidate(self, row: usize) -> Result<CandidateRecord, CandidateImportError> {
        let stage: Stage = self
            .stage
            .parse()
            .map_err(|source| CandidateImportError::Stage { row, source })?;

        let created_at = match self.created_at {
            Some(raw) => parse_timestamp(&raw)
                .ok_or(CandidateImportError::CreatedAt { row, value: raw })?,
            None => Utc::now(),
        };

        CandidateRecord::new(
            CandidateId(self.id),
            self.name,
            self.email,
            self.position,
            stage,
            self.fit_score,
            created_at,
        )
        .map_err(|source| CandidateImportError::Candidate { row, source })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
