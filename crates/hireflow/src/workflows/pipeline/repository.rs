use super::domain::{CandidateId, CandidateRecord, Stage};

/// Storage abstraction so the pipeline service can be exercised in isolation.
///
/// `list` must return candidates in storage order; the pipeline keeps that order
/// inside every stage bucket.
pub trait CandidateRepository: Send + Sync {
    fn list(&self) -> Result<Vec<CandidateRecord>, RepositoryError>;
    fn fetch(&self, id: CandidateId) -> Result<Option<CandidateRecord>, RepositoryError>;
    fn insert(&self, record: CandidateRecord) -> Result<CandidateRecord, RepositoryError>;

    /// Set the stage of a stored candidate and return the updated record.
    ///
    /// When `expected` is present the write only happens if the stored stage still
    /// matches it; the comparison and the write must be atomic. Writing the current
    /// stage leaves the record, including its version, untouched.
    fn update_stage(
        &self,
        id: CandidateId,
        expected: Option<Stage>,
        target: Stage,
    ) -> Result<CandidateRecord, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("candidate {0} already exists")]
    Conflict(CandidateId),
    #[error("candidate {0} not found")]
    NotFound(CandidateId),
    #[error("candidate {id} is in {actual}, expected {expected}")]
    StageMismatch {
        id: CandidateId,
        expected: Stage,
        actual: Stage,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
