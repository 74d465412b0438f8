use std::sync::Arc;

use tracing::{debug, info, warn};

use super::domain::{CandidateId, InvalidStage, Stage, StageChange, StageMoveRequest};
use super::policy::TransitionPolicy;
use super::repository::{CandidateRepository, RepositoryError};
use super::snapshot::PipelineSnapshot;

/// Service owning the authoritative candidate to stage mapping.
pub struct PipelineService<R> {
    repository: Arc<R>,
    policy: TransitionPolicy,
}

impl<R> PipelineService<R>
where
    R: CandidateRepository + 'static,
{
    pub fn new(repository: Arc<R>, policy: TransitionPolicy) -> Self {
        Self { repository, policy }
    }

    pub fn policy(&self) -> &TransitionPolicy {
        &self.policy
    }

    /// Group every stored candidate by stage along with the aggregate counters.
    pub fn snapshot(&self) -> Result<PipelineSnapshot, PipelineServiceError> {
        let candidates = self
            .repository
            .list()
            .map_err(PipelineServiceError::DataUnavailable)?;
        Ok(PipelineSnapshot::from_candidates(candidates))
    }

    /// Move a candidate to the requested stage.
    ///
    /// Moving a candidate to its current stage succeeds without touching storage
    /// state. Nothing is written when validation, the policy, or the expected stage
    /// check rejects the move.
    pub fn move_candidate(
        &self,
        id: CandidateId,
        request: &StageMoveRequest,
    ) -> Result<StageChange, PipelineServiceError> {
        let target: Stage = request.stage.parse()?;
        let expected = request
            .expected_stage
            .as_deref()
            .map(str::parse::<Stage>)
            .transpose()?;

        let current = self
            .repository
            .fetch(id)
            .map_err(PipelineServiceError::DataUnavailable)?
            .ok_or(PipelineServiceError::NotFound(id))?;
        let from = current.stage;

        if let Some(expected) = expected {
            if expected != from {
                warn!(candidate = %id, %expected, actual = %from, "rejected stale stage move");
                return Err(PipelineServiceError::StaleStage {
                    id,
                    expected,
                    actual: from,
                });
            }
        }

        if from == target {
            debug!(candidate = %id, stage = %target, "candidate already in requested stage");
            return Ok(StageChange {
                candidate_id: id,
                previous_stage: from,
                new_stage: target,
                changed: false,
            });
        }

        if !self.policy.allows(from, target) {
            warn!(
                candidate = %id,
                %from,
                to = %target,
                policy = %self.policy,
                "transition not allowed by policy"
            );
            return Err(PipelineServiceError::TransitionNotAllowed {
                from,
                to: target,
            });
        }

        // The write is guarded by the stage the policy was checked against. Without a
        // caller expectation a lost race falls back to last write wins, reported against
        // the stage the concurrent writer left behind.
        let (previous, updated) = match self.repository.update_stage(id, Some(from), target) {
            Ok(record) => (from, record),
            Err(RepositoryError::StageMismatch { actual, .. }) if expected.is_none() => {
                if actual == target {
                    debug!(candidate = %id, stage = %target, "concurrent move already applied");
                    return Ok(StageChange {
                        candidate_id: id,
                        previous_stage: actual,
                        new_stage: target,
                        changed: false,
                    });
                }
                if !self.policy.allows(actual, target) {
                    return Err(PipelineServiceError::TransitionNotAllowed {
                        from: actual,
                        to: target,
                    });
                }
                (actual, self.repository.update_stage(id, None, target)?)
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            candidate = %id,
            from = %previous,
            to = %updated.stage,
            version = updated.version,
            "candidate moved"
        );

        Ok(StageChange {
            candidate_id: id,
            previous_stage: previous,
            new_stage: updated.stage,
            changed: previous != updated.stage,
        })
    }
}

/// Error raised by the pipeline service.
#[derive(Debug, thiserror::Error)]
pub enum PipelineServiceError {
    #[error("pipeline data unavailable: {0}")]
    DataUnavailable(RepositoryError),
    #[error("candidate {0} not found")]
    NotFound(CandidateId),
    #[error(transparent)]
    InvalidStage(#[from] InvalidStage),
    #[error("moving from {from} to {to} is not allowed")]
    TransitionNotAllowed { from: Stage, to: Stage },
    #[error("candidate {id} is in {actual}, expected {expected}")]
    StaleStage {
        id: CandidateId,
        expected: Stage,
        actual: Stage,
    },
}

impl From<RepositoryError> for PipelineServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound(id) => Self::NotFound(id),
            RepositoryError::StageMismatch {
                id,
                expected,
                actual,
            } => Self::StaleStage {
                id,
                expected,
                actual,
            },
            other => Self::DataUnavailable(other),
        }
    }
}
