//! Candidate pipeline: stage-grouped listing, stage moves, and the board controller
//! that drives the drag-and-drop view.

pub mod board;
pub mod domain;
pub mod import;
pub mod policy;
pub mod repository;
pub mod router;
pub mod service;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use board::{
    BoardError, CandidateCard, MoveOutcome, PendingMove, PipelineBoard, PipelineGateway,
};
pub use domain::{
    CandidateError, CandidateId, CandidateRecord, FitBand, FitScore, InvalidStage, Stage,
    StageChange, StageMoveRequest,
};
pub use import::{CandidateCsvImporter, CandidateImportError};
pub use policy::{PolicyParseError, TransitionPolicy};
pub use repository::{CandidateRepository, RepositoryError};
pub use router::pipeline_router;
pub use service::{PipelineService, PipelineServiceError};
pub use snapshot::{PipelineSnapshot, PipelineStats};
