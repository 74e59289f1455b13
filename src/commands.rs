// Analysis subcommands: single trace and directory batch
//
// Each command renders its report into a String; `analyze` / `batch` print it.

use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::batch::{self, RecordFilter, Summary, TrialRecord};
use crate::cli::{AnalyzeArgs, BatchArgs};
use crate::plot;
use crate::trace::{self, TraceMetrics};

pub type CmdError = Box<dyn std::error::Error + Send + Sync>;
pub type CmdResult = Result<(), CmdError>;

#[derive(Debug, Serialize)]
struct TraceReport {
    file: PathBuf,
    #[serde(flatten)]
    metrics: TraceMetrics,
}

#[derive(Debug, Serialize)]
struct BatchReport<'a> {
    trials: Vec<&'a TrialRecord>,
    summary: Summary,
}

fn format_straightness(metrics: &TraceMetrics) -> String {
    if metrics.is_straightness_infinite() {
        "inf (no net y displacement)".to_string()
    } else {
        format!("{:.4}", metrics.straightness)
    }
}

pub fn analyze(args: &AnalyzeArgs) -> CmdResult {
    print!("{}", render_analyze(args)?);
    Ok(())
}

pub fn batch(args: &BatchArgs) -> CmdResult {
    print!("{}", render_batch(args)?);
    Ok(())
}

/// Parse, measure and optionally plot one trace
pub fn render_analyze(args: &AnalyzeArgs) -> Result<String, CmdError> {
    let raw = trace::parse_file(&args.file, &args.trace.parse_options())?;
    let normalized = trace::normalize(&raw);
    info!("{}: {} samples", args.file.display(), normalized.len());

    let metrics = TraceMetrics::compute(&normalized, args.trace.form)?;

    if let Some(path) = &args.plot {
        let title = args
            .file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "trace".to_string());
        plot::plot_trace(path, &title, &normalized)?;
    }

    let mut out = String::new();
    if args.trace.json {
        let report = TraceReport {
            file: args.file.clone(),
            metrics,
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        writeln!(
            out,
            "Average Speed for {} : {:.4} cm/s",
            args.file.display(),
            metrics.average_speed
        )?;
        writeln!(
            out,
            "Straightness ({:?}) for {} : {}",
            metrics.form,
            args.file.display(),
            format_straightness(&metrics)
        )?;
    }
    Ok(out)
}

/// Analyse a trial directory, write per-gait plots and summarize
pub fn render_batch(args: &BatchArgs) -> Result<String, CmdError> {
    let records =
        batch::scan_directory(&args.dir, &args.trace.parse_options(), args.trace.form)?;

    let filter = RecordFilter {
        surface: args.surface.clone(),
        direction: args.direction.clone(),
        gait: args.gait.clone(),
        speed: args.speed.clone(),
    };
    let selected = filter.apply(&records);
    if selected.is_empty() {
        warn!("No trials matched in {}", args.dir.display());
    }

    let groups = batch::group_by(selected.iter().copied(), |r| r.key.group());

    if !args.no_plots {
        for (group, members) in &groups {
            let path = args.out.join(group.plot_file_name());
            plot::plot_group(&path, group, members)?;
        }
    }

    let summary = batch::summarize(selected.iter().copied());

    let mut out = String::new();
    if args.trace.json {
        let report = BatchReport {
            trials: selected,
            summary,
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(out);
    }

    for (group, members) in &groups {
        let group_summary = batch::summarize(members.iter().copied());
        writeln!(out, "{} ({} trials)", group, group_summary.count)?;
        for record in members {
            writeln!(
                out,
                "  speed {:>4} trial {:>3}: {:8.4} cm/s  straightness {}",
                record.key.speed,
                record.key.trial,
                record.metrics.average_speed,
                format_straightness(&record.metrics)
            )?;
        }
        if let Some(mean) = group_summary.mean_average_speed {
            writeln!(out, "  mean speed: {:.4} cm/s", mean)?;
        }
    }

    match (summary.mean_average_speed, summary.top_speed, &summary.top_trial) {
        (Some(mean), Some(top), Some(key)) => {
            writeln!(
                out,
                "Total Average Speed of the {} files: {:.4} cm/s",
                summary.count, mean
            )?;
            writeln!(out, "Top speed: {:.4} cm/s ({})", top, key)?;
        }
        _ => writeln!(out, "No trials analysed")?,
    }
    if let Some(s) = summary.mean_straightness {
        writeln!(out, "Mean straightness ({:?}): {:.4}", args.trace.form, s)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use std::fs;
    use std::path::Path;

    const HEADER: &str = "Tracker session\nt;x;y\n";

    fn write_log(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), format!("{}{}", HEADER, body)).unwrap();
    }

    fn trial_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write_log(dir.path(), "plast__left_crawl_05_1.txt", "0.0;0.0;0.0\n2.0;6.0;8.0\n");
        // No net y displacement: straightness is infinite
        write_log(dir.path(), "carpet__right_trot_10_1.txt", "0.0;0.0;0.0\n1.0;4.0;0.0\n");
        dir
    }

    fn batch_args(argv: &[&str]) -> BatchArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        let Command::Batch(args) = cli.command else {
            panic!("expected batch");
        };
        args
    }

    fn analyze_args(argv: &[&str]) -> AnalyzeArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        args
    }

    fn svg_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".svg"))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_analyze_text() {
        let dir = trial_dir();
        let file = dir.path().join("plast__left_crawl_05_1.txt");
        let args = analyze_args(&["gait-lab", "analyze", file.to_str().unwrap()]);

        let out = render_analyze(&args).unwrap();
        assert!(out.contains(": 5.0000 cm/s"), "{}", out);
        assert!(out.contains("Straightness (Ratio)"), "{}", out);
        assert!(out.contains("0.7500"), "{}", out);
    }

    #[test]
    fn test_analyze_json_infinite_is_null() {
        let dir = trial_dir();
        let file = dir.path().join("carpet__right_trot_10_1.txt");
        let args = analyze_args(&["gait-lab", "analyze", file.to_str().unwrap(), "--json"]);

        let out = render_analyze(&args).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value["straightness"].is_null());
        assert_eq!(value["average_speed"], 4.0);
        assert_eq!(value["form"], "ratio");
    }

    #[test]
    fn test_analyze_text_infinite() {
        let dir = trial_dir();
        let file = dir.path().join("carpet__right_trot_10_1.txt");
        let args = analyze_args(&["gait-lab", "analyze", file.to_str().unwrap()]);
        assert!(render_analyze(&args).unwrap().contains("inf (no net y displacement)"));
    }

    #[test]
    fn test_analyze_writes_plot() {
        let dir = trial_dir();
        let file = dir.path().join("plast__left_crawl_05_1.txt");
        let plot = dir.path().join("single.svg");
        let args = analyze_args(&[
            "gait-lab",
            "analyze",
            file.to_str().unwrap(),
            "--plot",
            plot.to_str().unwrap(),
        ]);

        render_analyze(&args).unwrap();
        assert!(fs::read_to_string(&plot).unwrap().contains("<svg"));
    }

    #[test]
    fn test_analyze_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("absent.txt");
        let args = analyze_args(&["gait-lab", "analyze", file.to_str().unwrap()]);
        assert!(render_analyze(&args).is_err());
    }

    #[test]
    fn test_batch_writes_group_plots() {
        let dir = trial_dir();
        let out_dir = tempfile::tempdir().unwrap();
        let args = batch_args(&[
            "gait-lab",
            "batch",
            dir.path().to_str().unwrap(),
            "--out",
            out_dir.path().to_str().unwrap(),
        ]);

        let out = render_batch(&args).unwrap();
        assert!(out.contains("Total Average Speed of the 2 files"), "{}", out);
        assert_eq!(
            svg_files(out_dir.path()),
            vec!["Gait_carpet+right+trot.svg", "Gait_plast+left+crawl.svg"]
        );
    }

    #[test]
    fn test_batch_no_plots() {
        let dir = trial_dir();
        let out_dir = tempfile::tempdir().unwrap();
        let args = batch_args(&[
            "gait-lab",
            "batch",
            dir.path().to_str().unwrap(),
            "--out",
            out_dir.path().to_str().unwrap(),
            "--no-plots",
        ]);

        render_batch(&args).unwrap();
        assert!(svg_files(out_dir.path()).is_empty());
    }

    #[test]
    fn test_batch_filter_and_json() {
        let dir = trial_dir();
        let args = batch_args(&[
            "gait-lab",
            "batch",
            dir.path().to_str().unwrap(),
            "--no-plots",
            "--surface",
            "carpet",
            "--json",
        ]);

        let out = render_batch(&args).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let trials = value["trials"].as_array().unwrap();
        assert_eq!(trials.len(), 1);
        assert_eq!(trials[0]["key"]["surface"], "carpet");
        assert!(trials[0]["metrics"]["straightness"].is_null());
        assert_eq!(value["summary"]["count"], 1);
        assert_eq!(value["summary"]["top_speed"], 4.0);
    }

    #[test]
    fn test_batch_filter_matches_nothing() {
        let dir = trial_dir();
        let args = batch_args(&[
            "gait-lab",
            "batch",
            dir.path().to_str().unwrap(),
            "--no-plots",
            "--gait",
            "gallop",
        ]);
        assert_eq!(render_batch(&args).unwrap(), "No trials analysed\n");
    }
}
