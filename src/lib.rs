// Gait trace analysis and servo teleoperation for the Y-robot
//
// Modules:
// - trace: log parsing, normalization, speed / straightness metrics
// - batch: named trial logs, flat records, filter / group-by / summaries
// - plot: SVG output
// - teleop: keyboard -> serial servo control

pub mod batch;
pub mod cli;
pub mod commands;
pub mod config;
pub mod plot;
pub mod teleop;
pub mod trace;
