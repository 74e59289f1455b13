// SVG plots for single traces and trial groups

use plotters::element::PathElement;
use plotters::prelude::*;
use plotters::series::{DashedLineSeries, LineSeries};
use std::error::Error;
use std::ops::Range;
use std::path::Path;
use tracing::info;

use crate::batch::{GroupKey, TrialRecord};
use crate::config::PLOT_SIZE;
use crate::trace::{linear_fit, NormalizedTrace};

const LINE_WIDTH: u32 = 2;
const FONT_SIZE_TITLE: u32 = 24;
const FONT_SIZE_LABEL: u32 = 14;

#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error("Failed to create {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Plot rendering failed: {0}")]
    Render(String),

    #[error("Nothing to plot")]
    NoData,
}

/// Pad a value range so lines do not sit on the frame
pub fn calculate_range(min_val: f64, max_val: f64) -> Range<f64> {
    let (min, max) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };
    let span = max - min;
    let padding = if span < 1e-6 { 0.5 } else { span * 0.1 };
    (min - padding)..(max + padding)
}

fn bounds<'a, I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a f64>,
{
    values.into_iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn ensure_parent(path: &Path) -> Result<(), PlotError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|source| PlotError::Io {
                path: parent.display().to_string(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Position against time with least-squares trend lines for x and y
pub fn plot_trace(path: &Path, title: &str, trace: &NormalizedTrace) -> Result<(), PlotError> {
    if trace.is_empty() {
        return Err(PlotError::NoData);
    }
    ensure_parent(path)?;
    draw_trace(path, title, trace).map_err(|e| PlotError::Render(e.to_string()))?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn draw_trace(path: &Path, title: &str, trace: &NormalizedTrace) -> Result<(), Box<dyn Error>> {
    let x_series = trace.x_series();
    let y_series = trace.y_series();
    let x_fit = linear_fit(&x_series);
    let y_fit = linear_fit(&y_series);

    let times: Vec<f64> = x_series.iter().map(|p| p.0).collect();
    let values: Vec<f64> = x_series
        .iter()
        .chain(y_series.iter())
        .map(|p| p.1)
        .collect();
    let (t_min, t_max) = bounds(&times).ok_or("empty trace")?;
    let (v_min, v_max) = bounds(&values).ok_or("empty trace")?;

    let root = SVGBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", FONT_SIZE_TITLE))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(calculate_range(t_min, t_max), calculate_range(v_min, v_max))?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Position relative to start (cm)")
        .label_style(("sans-serif", FONT_SIZE_LABEL))
        .draw()?;

    for (label, series, fit, color) in [
        ("X position", &x_series, x_fit, BLUE),
        ("Y position", &y_series, y_fit, RED),
    ] {
        chart
            .draw_series(LineSeries::new(
                series.iter().copied(),
                color.stroke_width(LINE_WIDTH),
            ))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));

        if let Some(fit) = fit {
            let ends = [(t_min, fit.at(t_min)), (t_max, fit.at(t_max))];
            chart
                .draw_series(DashedLineSeries::new(
                    ends,
                    8,
                    4,
                    color.mix(0.6).stroke_width(LINE_WIDTH),
                ))?
                .label(format!("{} trend ({:+.2} cm/s)", label, fit.slope))
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.mix(0.6))
                });
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// One y-against-x trajectory per trial in a surface/direction/gait group
pub fn plot_group(path: &Path, group: &GroupKey, records: &[&TrialRecord]) -> Result<(), PlotError> {
    if records.iter().all(|r| r.trace.is_empty()) {
        return Err(PlotError::NoData);
    }
    ensure_parent(path)?;
    draw_group(path, group, records).map_err(|e| PlotError::Render(e.to_string()))?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn draw_group(
    path: &Path,
    group: &GroupKey,
    records: &[&TrialRecord],
) -> Result<(), Box<dyn Error>> {
    let paths: Vec<Vec<(f64, f64)>> = records.iter().map(|r| r.trace.path()).collect();
    let xs: Vec<f64> = paths.iter().flatten().map(|p| p.0).collect();
    let ys: Vec<f64> = paths.iter().flatten().map(|p| p.1).collect();
    let (x_min, x_max) = bounds(&xs).ok_or("empty group")?;
    let (y_min, y_max) = bounds(&ys).ok_or("empty group")?;

    let root = SVGBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Gait {}", group), ("sans-serif", FONT_SIZE_TITLE))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(calculate_range(x_min, x_max), calculate_range(y_min, y_max))?;

    chart
        .configure_mesh()
        .x_desc("X (cm)")
        .y_desc("Y (cm)")
        .label_style(("sans-serif", FONT_SIZE_LABEL))
        .draw()?;

    for (idx, (record, points)) in records.iter().zip(paths).enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(LINE_WIDTH)))?
            .label(format!(
                "speed {} / trial {} ({:.2} cm/s)",
                record.key.speed, record.key.trial, record.metrics.average_speed
            ))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
