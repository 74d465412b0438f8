use crate::infra::{load_roster, InMemoryCandidateRepository};
use clap::Args;
use hireflow::error::AppError;
use hireflow::workflows::pipeline::{
    BoardError, CandidateId, MoveOutcome, PipelineBoard, PipelineService, Stage, TransitionPolicy,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct PipelineReportArgs {
    /// Candidate roster CSV (id,name,email,position,stage,fit_score,created_at)
    #[arg(long)]
    pub(crate) candidates_csv: PathBuf,
    /// List the candidates inside each stage column
    #[arg(long)]
    pub(crate) list_candidates: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Candidate roster CSV. Defaults to the bundled demo roster.
    #[arg(long)]
    pub(crate) candidates_csv: Option<PathBuf>,
    /// Candidate to move. Defaults to the first candidate in the Applied column.
    #[arg(long)]
    pub(crate) candidate: Option<u64>,
    /// Target stage. Defaults to the stage after the candidate's current one.
    #[arg(long, value_parser = parse_stage)]
    pub(crate) stage: Option<Stage>,
    /// Transition policy: permissive, forward, sequential or 'From->To,...'
    #[arg(long, value_parser = parse_policy)]
    pub(crate) policy: Option<TransitionPolicy>,
}

fn parse_stage(raw: &str) -> Result<Stage, String> {
    raw.parse::<Stage>().map_err(|err| err.to_string())
}

fn parse_policy(raw: &str) -> Result<TransitionPolicy, String> {
    raw.parse::<TransitionPolicy>()
        .map_err(|err| err.to_string())
}

fn build_service(
    candidates_csv: Option<PathBuf>,
    policy: TransitionPolicy,
) -> Result<PipelineService<InMemoryCandidateRepository>, AppError> {
    let candidates = load_roster(candidates_csv.as_deref())?;
    let repository = InMemoryCandidateRepository::seeded(candidates)?;
    Ok(PipelineService::new(Arc::new(repository), policy))
}

pub(crate) fn run_pipeline_report(args: PipelineReportArgs) -> Result<(), AppError> {
    let PipelineReportArgs {
        candidates_csv,
        list_candidates,
    } = args;

    let service = build_service(Some(candidates_csv), TransitionPolicy::permissive())?;
    let board = load_board(&service)?;
    render_board(&board, list_candidates);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        candidates_csv,
        candidate,
        stage,
        policy,
    } = args;

    let policy = policy.unwrap_or_default();
    let service = build_service(candidates_csv, policy)?;
    let mut board = load_board(&service)?;

    println!("Candidate pipeline demo (policy: {})", service.policy());
    render_board(&board, true);

    let candidate = candidate.map(CandidateId).or_else(|| {
        board
            .column(Stage::Applied)
            .first()
            .map(|card| card.id)
    });
    let Some(candidate) = candidate else {
        println!("\nNo candidate available to move.");
        return Ok(());
    };

    let target = stage.or_else(|| board.stage_of(candidate).and_then(Stage::next));
    let Some(target) = target else {
        println!("\nCandidate {candidate} has no later stage to move to.");
        return Ok(());
    };

    println!("\nMoving candidate {candidate} to {target}");
    match board.move_candidate(&service, candidate, target) {
        Ok(MoveOutcome::Committed(change)) => println!(
            "- committed: {} -> {}",
            change.previous_stage, change.new_stage
        ),
        Ok(MoveOutcome::Unchanged) => println!("- already in {target}, nothing sent"),
        Err(BoardError::UnknownCandidate(id)) => println!("- candidate {id} is not on the board"),
        Err(err) => println!("- reverted: {err}"),
    }

    render_board(&board, true);
    Ok(())
}

fn load_board(
    service: &PipelineService<InMemoryCandidateRepository>,
) -> Result<PipelineBoard, AppError> {
    Ok(PipelineBoard::load(service)?)
}

fn render_board(board: &PipelineBoard, list_candidates: bool) {
    let stats = board.stats();
    println!(
        "\nTotal candidates: {} | Active pipeline: {}",
        stats.total_candidates, stats.active_pipeline
    );

    for (stage, count, cards) in board.columns() {
        println!("{stage} ({count})");
        if !list_candidates {
            continue;
        }
        for card in cards {
            println!(
                "  - [{}] {} <{}> | {} | fit {}% ({:?}) | applied {}",
                card.avatar,
                card.name,
                card.email,
                card.position,
                card.fit_score,
                card.fit_band,
                card.created_at.format("%b %-d, %Y")
            );
        }
    }

    if let Some(error) = board.last_error() {
        println!("Last error: {error}");
    }
}
