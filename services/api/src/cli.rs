use crate::demo::{run_demo, run_preview, run_slips, DemoArgs, PreviewArgs, SlipsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use stitch_payroll::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Stitch Payroll",
    about = "Record embroidery production and compute staff payroll",
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
    /// Calculate one day's payable amount without storing it
    Preview(PreviewArgs),
    /// Build salary slips for a month or date range over demo records
    Slips(SlipsArgs),
    /// Record a simulated stretch of days for the demo roster and print salary slips
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
    /// Override the rate configuration history CSV
    #[arg(long)]
    pub(crate) rates_csv: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Preview(args) => run_preview(args),
        Command::Slips(args) => run_slips(args),
        Command::Demo(args) => run_demo(args),
    }
}
