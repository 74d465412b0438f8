use crate::demo::{run_demo, run_pipeline_report, DemoArgs, PipelineReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hireflow::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Hireflow Pipeline",
    about = "Run and demonstrate the candidate pipeline service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect a candidate roster without starting the service
    Pipeline {
        #[command(subcommand)]
        command: PipelineCommand,
    },
    /// Load a roster, move a candidate through the board controller and print the result
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum PipelineCommand {
    /// Print the stage columns and counters for a roster
    Report(PipelineReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Seed the candidate store from this CSV roster
    #[arg(long)]
    pub(crate) candidates_csv: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Pipeline {
            command: PipelineCommand::Report(args),
        } => run_pipeline_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
