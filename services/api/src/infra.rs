use hireflow::error::AppError;
use hireflow::workflows::pipeline::{
    CandidateCsvImporter, CandidateId, CandidateRecord, CandidateRepository, RepositoryError,
    Stage,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

/// Roster bundled with the binary for demos when no CSV is supplied.
pub(crate) const DEMO_ROSTER: &str = include_str!("../fixtures/pipeline.csv");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Vec-backed candidate store; insertion order is the listing order.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCandidateRepository {
    records: Arc<Mutex<Vec<CandidateRecord>>>,
}

impl InMemoryCandidateRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Vec<CandidateRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("candidate store lock poisoned".to_string()))
    }

    pub(crate) fn seeded(candidates: Vec<CandidateRecord>) -> Result<Self, RepositoryError> {
        let repository = Self::default();
        for candidate in candidates {
            repository.insert(candidate)?;
        }
        Ok(repository)
    }
}

impl CandidateRepository for InMemoryCandidateRepository {
    fn list(&self) -> Result<Vec<CandidateRecord>, RepositoryError> {
        Ok(self.lock()?.clone())
    }

    fn fetch(&self, id: CandidateId) -> Result<Option<CandidateRecord>, RepositoryError> {
        Ok(self.lock()?.iter().find(|record| record.id == id).cloned())
    }

    fn insert(&self, record: CandidateRecord) -> Result<CandidateRecord, RepositoryError> {
        let mut guard = self.lock()?;
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
        let mut guard = self.lock()?;
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

/// Load a roster from `path`, or the bundled demo roster when `path` is `None`.
pub(crate) fn load_roster(path: Option<&Path>) -> Result<Vec<CandidateRecord>, AppError> {
    let candidates = match path {
        Some(path) => CandidateCsvImporter::from_path(path)?,
        None => CandidateCsvImporter::from_reader(DEMO_ROSTER.as_bytes())?,
    };
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_roster_parses() {
        let candidates = load_roster(None).expect("bundled roster parses");
        assert_eq!(candidates.len(), 12);
        assert!(Stage::ALL
            .iter()
            .all(|stage| candidates.iter().any(|c| c.stage == *stage)));
    }

    #[test]
    fn update_stage_checks_expected_stage_atomically() {
        let repository =
            InMemoryCandidateRepository::seeded(load_roster(None).expect("roster parses"))
                .expect("seeds");

        match repository.update_stage(CandidateId(1), Some(Stage::Offer), Stage::Hired) {
            Err(RepositoryError::StageMismatch { actual, .. }) => {
                assert_eq!(actual, Stage::Applied)
            }
            other => panic!("expected stage mismatch, got {other:?}"),
        }

        let updated = repository
            .update_stage(CandidateId(1), Some(Stage::Applied), Stage::Hired)
            .expect("update succeeds");
        assert_eq!(updated.stage, Stage::Hired);
        assert_eq!(updated.version, 2);

        let unchanged = repository
            .update_stage(CandidateId(1), None, Stage::Hired)
            .expect("idempotent update succeeds");
        assert_eq!(unchanged.version, 2);
    }

    #[test]
    fn roster_path_matches_bundled_roster() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/pipeline.csv");
        let from_path = load_roster(Some(path.as_path())).expect("roster file parses");
        let bundled = load_roster(None).expect("bundled roster parses");
        assert_eq!(from_path, bundled);
    }

    #[test]
    fn missing_roster_file_is_an_import_error() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/missing.csv");
        assert!(matches!(
            load_roster(Some(path.as_path())),
            Err(AppError::Import(_))
        ));
    }

    #[test]
    fn seeding_rejects_duplicate_ids() {
        let mut candidates = load_roster(None).expect("roster parses");
        candidates.push(candidates[0].clone());
        assert!(matches!(
            InMemoryCandidateRepository::seeded(candidates),
            Err(RepositoryError::Conflict(CandidateId(1)))
        ));
    }

    #[test]
    fn list_preserves_insertion_order() {
        let repository =
            InMemoryCandidateRepository::seeded(load_roster(None).expect("roster parses"))
                .expect("seeds");
        let ids: Vec<u64> = repository
            .list()
            .expect("list succeeds")
            .iter()
            .map(|c| c.id.0)
            .collect();
        assert_eq!(ids, (1..=12).collect::<Vec<_>>());
    }
}
