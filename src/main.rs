use clap::Parser;
use tracing_subscriber::EnvFilter;

use gait_lab::cli::{Cli, Command};
use gait_lab::commands;
use gait_lab::teleop::{self, TeleopConfig};

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: commands::CmdResult = match cli.command {
        Command::Analyze(args) => commands::analyze(&args),
        Command::Batch(args) => commands::batch(&args),
        Command::Teleop(args) => teleop::run(TeleopConfig {
            port: args.port,
            baudrate: args.baud,
            mode: args.mode,
            vel_mult: args.vel_mult,
        })
        .await
        .map_err(Into::into),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
