// End-to-end trace metrics
//
// Both metrics only look at the first and last sample, so they are
// unaffected by normalization.

use serde::Serialize;

use super::{NormalizedTrace, Sample, Trace};

/// Errors for metrics that are undefined on the given trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MetricsError {
    #[error("Trace has no samples")]
    EmptyTrace,

    #[error("Trace has zero elapsed time")]
    ZeroElapsed,
}

/// How straightness is expressed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StraightnessForm {
    /// |dx| / |dy|: 0 is a perfectly straight run along y
    #[default]
    Ratio,
    /// atan2(|dy|, |dx|) in radians: pi/2 is a perfectly straight run along y
    Angle,
}

/// Metrics derived once per trace
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraceMetrics {
    /// cm/s
    pub average_speed: f64,
    /// `f64::INFINITY` when the run ends at the starting y
    pub straightness: f64,
    pub form: StraightnessForm,
    /// End-to-end displacement, cm
    pub distance: f64,
    /// Seconds
    pub elapsed: f64,
    pub samples: usize,
}

impl TraceMetrics {
    pub fn compute<T>(trace: &T, form: StraightnessForm) -> Result<Self, MetricsError>
    where
        T: AsRef<[Sample]> + ?Sized,
    {
        let (first, last) = endpoints(trace.as_ref())?;
        Ok(Self {
            average_speed: average_speed(trace)?,
            straightness: straightness(trace, form)?,
            form,
            distance: displacement(first, last),
            elapsed: last.time - first.time,
            samples: trace.as_ref().len(),
        })
    }

    pub fn is_straightness_infinite(&self) -> bool {
        self.straightness.is_infinite()
    }
}

fn endpoints(samples: &[Sample]) -> Result<(Sample, Sample), MetricsError> {
    match (samples.first(), samples.last()) {
        (Some(&first), Some(&last)) => Ok((first, last)),
        _ => Err(MetricsError::EmptyTrace),
    }
}

fn displacement(first: Sample, last: Sample) -> f64 {
    (last.x - first.x).hypot(last.y - first.y)
}

/// Shift every sample so the first one is at (0, 0); timestamps untouched
pub fn normalize(trace: &Trace) -> NormalizedTrace {
    let samples = match trace.samples().first() {
        Some(origin) => trace
            .samples()
            .iter()
            .map(|s| Sample::new(s.time, s.x - origin.x, s.y - origin.y))
            .collect(),
        None => Vec::new(),
    };
    NormalizedTrace { samples }
}

/// Straight-line distance between first and last position over elapsed time
pub fn average_speed<T>(trace: &T) -> Result<f64, MetricsError>
where
    T: AsRef<[Sample]> + ?Sized,
{
    let (first, last) = endpoints(trace.as_ref())?;
    let elapsed = last.time - first.time;
    if elapsed <= 0.0 {
        return Err(MetricsError::ZeroElapsed);
    }
    Ok(displacement(first, last) / elapsed)
}

/// Net x-displacement against net y-displacement
///
/// Returns `f64::INFINITY` if and only if the last y equals the first y,
/// in either form.
pub fn straightness<T>(trace: &T, form: StraightnessForm) -> Result<f64, MetricsError>
where
    T: AsRef<[Sample]> + ?Sized,
{
    let (first, last) = endpoints(trace.as_ref())?;
    let dx = (last.x - first.x).abs();
    let dy = (last.y - first.y).abs();

    if dy == 0.0 {
        return Ok(f64::INFINITY);
    }

    Ok(match form {
        // Tiny dy can overflow the ratio; INFINITY stays reserved for dy == 0
        StraightnessForm::Ratio => (dx / dy).min(f64::MAX),
        StraightnessForm::Angle => dy.atan2(dx),
    })
}

/// Least-squares line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least squares over (x, y) points
///
/// `None` for fewer than two points or when all x are equal.
pub fn linear_fit(points: &[(f64, f64)]) -> Option<LinearFit> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for &(x, y) in points {
        sxy += (x - mean_x) * (y - mean_y);
        sxx += (x - mean_x) * (x - mean_x);
    }
    if sxx.abs() < f64::EPSILON {
        return None;
    }

    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}
