use crate::demo::{run_check, run_demo, run_states, CheckArgs, DemoArgs, StatesArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use ui_benefits::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "UI Benefits Eligibility",
    about = "Check unemployment-insurance monetary eligibility and run the eligibility service",
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
    /// Evaluate one claimant against a state's monetary requirements
    Check(CheckArgs),
    /// List the states covered by the rules dataset
    States(StatesArgs),
    /// Walk through sample claimants across several states
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Load state rules from this JSON file instead of the bundled dataset
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Check(args) => run_check(args),
        Command::States(args) => run_states(args),
        Command::Demo(args) => run_demo(args),
    }
}
