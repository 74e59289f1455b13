// Command line interface
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{SERVO_BAUDRATE, SERVO_PORT, VEL_MULT};
use crate::teleop::TeleopMode;
use crate::trace::{Delimiter, ParseMode, ParseOptions, StraightnessForm};

#[derive(Debug, Parser)]
#[command(name = "gait-lab")]
#[command(about = "Gait trace analysis and servo teleoperation for the Y-robot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Metrics (and optional plot) for a single trace log
    Analyze(AnalyzeArgs),
    /// Metrics and per-gait plots for a directory of trial logs
    Batch(BatchArgs),
    /// Drive the servo controller from the keyboard
    Teleop(TeleopArgs),
}

/// Options shared by both analysis commands
#[derive(Debug, Clone, Args)]
pub struct TraceArgs {
    #[arg(long, value_enum, default_value_t = Delimiter::Auto)]
    pub delimiter: Delimiter,
    /// Skip malformed lines instead of failing
    #[arg(long)]
    pub lenient: bool,
    #[arg(long, value_enum, default_value_t = StraightnessForm::Ratio)]
    pub form: StraightnessForm,
    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

impl TraceArgs {
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            delimiter: self.delimiter,
            mode: if self.lenient {
                ParseMode::Lenient
            } else {
                ParseMode::Strict
            },
            ..ParseOptions::default()
        }
    }
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    pub file: PathBuf,
    #[command(flatten)]
    pub trace: TraceArgs,
    /// Write a position/time SVG plot here
    #[arg(long)]
    pub plot: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    pub dir: PathBuf,
    #[command(flatten)]
    pub trace: TraceArgs,
    /// Directory for Gait_*.svg plots
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
    #[arg(long)]
    pub no_plots: bool,
    #[arg(long)]
    pub surface: Option<String>,
    #[arg(long)]
    pub direction: Option<String>,
    #[arg(long)]
    pub gait: Option<String>,
    #[arg(long)]
    pub speed: Option<String>,
}

#[derive(Debug, Args)]
pub struct TeleopArgs {
    #[arg(long, default_value = SERVO_PORT)]
    pub port: String,
    #[arg(long, default_value_t = SERVO_BAUDRATE)]
    pub baud: u32,
    #[arg(long, value_enum, default_value_t = TeleopMode::Single)]
    pub mode: TeleopMode,
    /// Steps per key press
    #[arg(long, default_value_t = VEL_MULT, value_parser = clap::value_parser!(i32).range(1..=180))]
    pub vel_mult: i32,
}
