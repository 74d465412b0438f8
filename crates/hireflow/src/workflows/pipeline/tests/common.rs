use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::workflows::pipeline::domain::{CandidateId, CandidateRecord, Stage};
use crate::workflows::pipeline::repository::{CandidateRepository, RepositoryError};
use crate::workflows::pipeline::{
    pipeline_router, PipelineService, PipelineServiceError, PipelineSnapshot, StageChange,
    StageMoveRequest, TransitionPolicy,
};
use crate::workflows::pipeline::board::PipelineGateway;

pub(super) fn candidate(id: u64, stage: Stage) -> CandidateRecord {
    let names = ["Sarah Johnson", "Emily Davis", "Alex Martinez", "Lisa Anderson"];
    let name = names[(id as usize) % names.len()];
    CandidateRecord::new(
        CandidateId(id),
        name,
        format!("candidate{id}@email.com"),
        "Node.js Developer",
        stage,
        80,
        Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
    )
    .expect("valid candidate")
}

/// Two candidates: 1 in Applied and 2 in Interview.
pub(super) fn scenario_candidates() -> Vec<CandidateRecord> {
    vec![candidate(1, Stage::Applied), candidate(2, Stage::Interview)]
}

pub(super) fn roster() -> Vec<CandidateRecord> {
    vec![
        candidate(1, Stage::Applied),
        candidate(2, Stage::Applied),
        candidate(3, Stage::Shortlisted),
        candidate(4, Stage::Interview),
        candidate(5, Stage::Interview),
        candidate(6, Stage::Offer),
        candidate(7, Stage::Hired),
    ]
}

pub(super) fn build_service(
    candidates: Vec<CandidateRecord>,
    policy: TransitionPolicy,
) -> (PipelineService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::with_candidates(candidates));
    let service = PipelineService::new(repository.clone(), policy);
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<Vec<CandidateRecord>>>,
}

impl MemoryRepository {
    pub(super) fn with_candidates(candidates: Vec<CandidateRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(candidates)),
        }
    }

    pub(super) fn stage_of(&self, id: u64) -> Option<Stage> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .iter()
            .find(|record| record.id == CandidateId(id))
            .map(|record| record.stage)
    }

    /// Simulate another session moving a candidate behind the service's back.
    pub(super) fn force_stage(&self, id: u64, stage: Stage) {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if let Some(record) = guard.iter_mut().find(|record| record.id == CandidateId(id)) {
            record.stage = stage;
        }
    }
}

impl CandidateRepository for MemoryRepository {
    fn list(&self) -> Result<Vec<CandidateRecord>, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").clone())
    }

    fn fetch(&self, id: CandidateId) -> Result<Option<CandidateRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| record.id == id).cloned())
    }

    fn insert(&self, record: CandidateRecord) -> Result<CandidateRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict(record.id));
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn update_stage(
        &self,
        id: CandidateId,
        expected: Option<Stage>,
        target: Stage,
    ) -> Result<CandidateRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(RepositoryError::NotFound(id))?;
        if let Some(expected) = expected {
            if record.stage != expected {
                return Err(RepositoryError::StageMismatch {
                    id,
                    expected,
                    actual: record.stage,
                });
            }
        }
        if record.stage != target {
            record.stage = target;
            record.version += 1;
        }
        Ok(record.clone())
    }
}

pub(super) struct UnavailableRepository;

impl CandidateRepository for UnavailableRepository {
    fn list(&self) -> Result<Vec<CandidateRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: CandidateId) -> Result<Option<CandidateRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert(&self, _record: CandidateRecord) -> Result<CandidateRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_stage(
        &self,
        _id: CandidateId,
        _expected: Option<Stage>,
        _target: Stage,
    ) -> Result<CandidateRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Repository where another session moves the candidate right after every lookup.
pub(super) struct RacingRepository {
    pub(super) inner: MemoryRepository,
    race_to: Stage,
}

impl RacingRepository {
    pub(super) fn new(candidates: Vec<CandidateRecord>, race_to: Stage) -> Self {
        Self {
            inner: MemoryRepository::with_candidates(candidates),
            race_to,
        }
    }
}

impl CandidateRepository for RacingRepository {
    fn list(&self) -> Result<Vec<CandidateRecord>, RepositoryError> {
        self.inner.list()
    }

    fn fetch(&self, id: CandidateId) -> Result<Option<CandidateRecord>, RepositoryError> {
        let record = self.inner.fetch(id)?;
        if record.is_some() {
            self.inner.force_stage(id.0, self.race_to);
        }
        Ok(record)
    }

    fn insert(&self, record: CandidateRecord) -> Result<CandidateRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn update_stage(
        &self,
        id: CandidateId,
        expected: Option<Stage>,
        target: Stage,
    ) -> Result<CandidateRecord, RepositoryError> {
        self.inner.update_stage(id, expected, target)
    }
}

/// Gateway that lists from a real service but refuses every move.
pub(super) struct RejectingGateway<'a> {
    pub(super) service: &'a PipelineService<MemoryRepository>,
}

impl PipelineGateway for RejectingGateway<'_> {
    fn snapshot(&self) -> Result<PipelineSnapshot, PipelineServiceError> {
        self.service.snapshot()
    }

    fn move_candidate(
        &self,
        _id: CandidateId,
        _request: &StageMoveRequest,
    ) -> Result<StageChange, PipelineServiceError> {
        Err(PipelineServiceError::DataUnavailable(
            RepositoryError::Unavailable("connection reset".to_string()),
        ))
    }
}

pub(super) fn snapshot_ids(snapshot: &PipelineSnapshot, stage: Stage) -> Vec<u64> {
    snapshot.bucket(stage).iter().map(|c| c.id.0).collect()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: PipelineService<MemoryRepository>) -> axum::Router {
    pipeline_router(Arc::new(service))
}
