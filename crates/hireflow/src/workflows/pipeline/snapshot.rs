use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{CandidateRecord, Stage};

/// Aggregate counters shown above the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStats {
    pub total_candidates: usize,
    pub active_pipeline: usize,
}

impl PipelineStats {
    pub fn from_stages<I>(stages: I) -> Self
    where
        I: IntoIterator<Item = Stage>,
    {
        stages
            .into_iter()
            .fold(PipelineStats::default(), |mut stats, stage| {
                stats.total_candidates += 1;
                if stage.is_active() {
                    stats.active_pipeline += 1;
                }
                stats
            })
    }
}

/// Candidates partitioned by stage. Derived from the candidate set on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    pub pipeline: BTreeMap<Stage, Vec<CandidateRecord>>,
    pub stats: PipelineStats,
    pub candidates: Vec<CandidateRecord>,
}

impl PipelineSnapshot {
    /// Group candidates into the five stage buckets, keeping their input order.
    pub fn from_candidates(candidates: Vec<CandidateRecord>) -> Self {
        let mut pipeline: BTreeMap<Stage, Vec<CandidateRecord>> =
            Stage::ALL.into_iter().map(|stage| (stage, Vec::new())).collect();

        for candidate in &candidates {
            pipeline
                .entry(candidate.stage)
                .or_default()
                .push(candidate.clone());
        }

        let stats = PipelineStats::from_stages(candidates.iter().map(|c| c.stage));

        Self {
            pipeline,
            stats,
            candidates,
        }
    }

    pub fn bucket(&self, stage: Stage) -> &[CandidateRecord] {
        self.pipeline.get(&stage).map(Vec::as_slice).unwrap_or(&[])
    }
}
