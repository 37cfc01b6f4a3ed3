use crate::demo::{run_demo, run_score, run_synthesize, DemoArgs, ScoreArgs, SynthesizeArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use itiva::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "ITIVA Security Assessment",
    about = "Score security self-assessments and serve the ITIVA report API",
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
    /// Score an answer file against the questionnaire
    Score(ScoreArgs),
    /// Generate a plausible answer set for target category scores
    Synthesize(SynthesizeArgs),
    /// Seed sample reports for a user and print the resulting dashboard
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
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Synthesize(args) => run_synthesize(args),
        Command::Demo(args) => run_demo(args),
    }
}
