//! Board controller backing the drag-and-drop pipeline view.
//!
//! The board keeps a local copy of the five stage columns. A move is applied to
//! the local columns first, then committed through a [`PipelineGateway`]; when the
//! gateway rejects it the local change is rolled back and the failure is kept for
//! display.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use super::domain::{CandidateId, CandidateRecord, FitBand, Stage, StageChange, StageMoveRequest};
use super::repository::CandidateRepository;
use super::service::{PipelineService, PipelineServiceError};
use super::snapshot::{PipelineSnapshot, PipelineStats};

/// Remote side of the board: anything able to list the pipeline and apply moves.
pub trait PipelineGateway {
    fn snapshot(&self) -> Result<PipelineSnapshot, PipelineServiceError>;
    fn move_candidate(
        &self,
        id: CandidateId,
        request: &StageMoveRequest,
    ) -> Result<StageChange, PipelineServiceError>;
}

impl<R> PipelineGateway for PipelineService<R>
where
    R: CandidateRepository + 'static,
{
    fn snapshot(&self) -> Result<PipelineSnapshot, PipelineServiceError> {
        PipelineService::snapshot(self)
    }

    fn move_candidate(
        &self,
        id: CandidateId,
        request: &StageMoveRequest,
    ) -> Result<StageChange, PipelineServiceError> {
        PipelineService::move_candidate(self, id, request)
    }
}

/// Card rendered inside a stage column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateCard {
    pub id: CandidateId,
    pub name: String,
    pub email: String,
    pub position: String,
    pub avatar: String,
    pub fit_score: u8,
    pub fit_band: FitBand,
    pub stage: Stage,
    pub created_at: DateTime<Utc>,
}

impl From<&CandidateRecord> for CandidateCard {
    fn from(record: &CandidateRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            email: record.email.clone(),
            position: record.position.clone(),
            avatar: record.initials(),
            fit_score: record.fit_score.value(),
            fit_band: record.fit_score.band(),
            stage: record.stage,
            created_at: record.created_at,
        }
    }
}

/// A locally applied move waiting for the gateway to confirm it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingMove {
    pub candidate_id: CandidateId,
    pub from: Stage,
    pub to: Stage,
    from_index: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("candidate {0} is not on the board")]
    UnknownCandidate(CandidateId),
    #[error("failed to load pipeline: {0}")]
    Load(#[source] PipelineServiceError),
    #[error("move was rejected: {0}")]
    Rejected(#[source] PipelineServiceError),
}

/// Result of a move gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The candidate was dropped onto its own column; nothing was sent.
    Unchanged,
    Committed(StageChange),
}

#[derive(Debug, Clone)]
pub struct PipelineBoard {
    columns: BTreeMap<Stage, Vec<CandidateCard>>,
    stats: PipelineStats,
    last_error: Option<String>,
}

impl PipelineBoard {
    pub fn from_snapshot(snapshot: &PipelineSnapshot) -> Self {
        let columns = Stage::ALL
            .into_iter()
            .map(|stage| {
                let cards = snapshot
                    .bucket(stage)
                    .iter()
                    .map(CandidateCard::from)
                    .collect();
                (stage, cards)
            })
            .collect();

        let mut board = Self {
            columns,
            stats: PipelineStats::default(),
            last_error: None,
        };
        board.recompute_stats();
        board
    }

    pub fn load<G: PipelineGateway>(gateway: &G) -> Result<Self, BoardError> {
        let snapshot = gateway.snapshot().map_err(BoardError::Load)?;
        Ok(Self::from_snapshot(&snapshot))
    }

    /// Reload every column from the gateway, discarding local state.
    pub fn refresh<G: PipelineGateway>(&mut self, gateway: &G) -> Result<(), BoardError> {
        *self = Self::load(gateway)?;
        Ok(())
    }

    pub fn column(&self, stage: Stage) -> &[CandidateCard] {
        self.columns.get(&stage).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Columns in board order with their count badge.
    pub fn columns(&self) -> impl Iterator<Item = (Stage, usize, &[CandidateCard])> + '_ {
        Stage::ALL.into_iter().map(move |stage| {
            let cards = self.column(stage);
            (stage, cards.len(), cards)
        })
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn stage_of(&self, id: CandidateId) -> Option<Stage> {
        self.locate(id).map(|(stage, _)| stage)
    }

    /// Apply a move to the local columns only.
    ///
    /// Returns `None` when the candidate already sits in `target`.
    pub fn begin_move(
        &mut self,
        id: CandidateId,
        target: Stage,
    ) -> Result<Option<PendingMove>, BoardError> {
        let (from, from_index) = self.locate(id).ok_or(BoardError::UnknownCandidate(id))?;
        if from == target {
            return Ok(None);
        }

        let mut card = self
            .columns
            .get_mut(&from)
            .map(|cards| cards.remove(from_index))
            .ok_or(BoardError::UnknownCandidate(id))?;
        card.stage = target;
        self.columns.entry(target).or_default().push(card);
        self.recompute_stats();

        Ok(Some(PendingMove {
            candidate_id: id,
            from,
            to: target,
            from_index,
        }))
    }

    /// Undo a pending move, putting the card back where it was.
    pub fn rollback(&mut self, pending: PendingMove) {
        let Some(column) = self.columns.get_mut(&pending.to) else {
            return;
        };
        let Some(index) = column
            .iter()
            .rposition(|card| card.id == pending.candidate_id)
        else {
            return;
        };

        let mut card = column.remove(index);
        card.stage = pending.from;
        let origin = self.columns.entry(pending.from).or_default();
        let index = pending.from_index.min(origin.len());
        origin.insert(index, card);
        self.recompute_stats();
    }

    /// Move a card optimistically, confirm it with the gateway and roll back on failure.
    ///
    /// The board sends the stage it last saw as the expected stage so a concurrent
    /// change is reported instead of overwritten.
    pub fn move_candidate<G: PipelineGateway>(
        &mut self,
        gateway: &G,
        id: CandidateId,
        target: Stage,
    ) -> Result<MoveOutcome, BoardError> {
        let Some(pending) = self.begin_move(id, target)? else {
            return Ok(MoveOutcome::Unchanged);
        };

        let request = StageMoveRequest::to(target).expecting(pending.from);
        match gateway.move_candidate(id, &request) {
            Ok(change) => {
                self.last_error = None;
                Ok(MoveOutcome::Committed(change))
            }
            Err(err) => {
                warn!(candidate = %id, from = %pending.from, to = %target, error = %err, "reverting board move");
                self.rollback(pending);
                self.last_error = Some(err.to_string());
                Err(BoardError::Rejected(err))
            }
        }
    }

    fn locate(&self, id: CandidateId) -> Option<(Stage, usize)> {
        self.columns.iter().find_map(|(stage, cards)| {
            cards
                .iter()
                .position(|card| card.id == id)
                .map(|index| (*stage, index))
        })
    }

    fn recompute_stats(&mut self) {
        self.stats = PipelineStats::from_stages(
            self.columns
                .iter()
                .flat_map(|(stage, cards)| cards.iter().map(move |_| *stage)),
        );
    }
}
