// Flat trial records, directory scan, filter/group-by and aggregation

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::naming::TrialKey;
use crate::trace::{
    normalize, parse_file, NormalizedTrace, ParseOptions, StraightnessForm, TraceError,
    TraceMetrics,
};

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Failed to read directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Trace(#[from] TraceError),
}

/// One analysed trial: conditions, source, normalized trace and metrics
#[derive(Debug, Clone, Serialize)]
pub struct TrialRecord {
    pub key: TrialKey,
    pub path: PathBuf,
    #[serde(skip)]
    pub trace: NormalizedTrace,
    pub metrics: TraceMetrics,
}

/// Scan a directory (non-recursive) for trial logs and analyse each one
///
/// Files that do not follow the naming convention are skipped without error.
/// Parse errors abort the scan in strict mode; traces whose metrics are
/// undefined are logged and left out.
pub fn scan_directory(
    dir: &Path,
    options: &ParseOptions,
    form: StraightnessForm,
) -> Result<Vec<TrialRecord>, BatchError> {
    let io_err = |source| BatchError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .map_err(io_err)?;
    paths.sort();

    let mut records = Vec::new();
    for path in paths {
        if !path.is_file() {
            continue;
        }
        let Some(key) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(TrialKey::from_file_name)
        else {
            debug!("Ignoring {}", path.display());
            continue;
        };

        let trace = normalize(&parse_file(&path, options)?);
        match TraceMetrics::compute(&trace, form) {
            Ok(metrics) => {
                debug!("{}: {:.3} cm/s", key, metrics.average_speed);
                records.push(TrialRecord {
                    key,
                    path,
                    trace,
                    metrics,
                });
            }
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }

    info!("Loaded {} trials from {}", records.len(), dir.display());
    Ok(records)
}

/// Optional constraints on trial conditions; `None` matches anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub surface: Option<String>,
    pub direction: Option<String>,
    pub gait: Option<String>,
    pub speed: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, key: &TrialKey) -> bool {
        fn ok(want: &Option<String>, have: &str) -> bool {
            want.as_deref().is_none_or(|w| w == have)
        }
        ok(&self.surface, &key.surface)
            && ok(&self.direction, &key.direction)
            && ok(&self.gait, &key.gait)
            && ok(&self.speed, &key.speed)
    }

    pub fn apply<'a>(&self, records: &'a [TrialRecord]) -> Vec<&'a TrialRecord> {
        records.iter().filter(|r| self.matches(&r.key)).collect()
    }
}

/// Group records by any ordered key, preserving input order within a group
pub fn group_by<'a, K, I, F>(records: I, key_fn: F) -> BTreeMap<K, Vec<&'a TrialRecord>>
where
    K: Ord,
    I: IntoIterator<Item = &'a TrialRecord>,
    F: Fn(&TrialRecord) -> K,
{
    let mut groups: BTreeMap<K, Vec<&'a TrialRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(key_fn(record)).or_default().push(record);
    }
    groups
}

/// Running totals over a set of trials
#[derive(Debug, Clone, Default)]
pub struct SpeedAccumulator {
    count: usize,
    speed_sum: f64,
    top: Option<(TrialKey, f64)>,
    straightness_sum: f64,
    straightness_count: usize,
}

/// Aggregate over a set of trials
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean_average_speed: Option<f64>,
    pub top_speed: Option<f64>,
    pub top_trial: Option<TrialKey>,
    /// Mean over trials with finite straightness only
    pub mean_straightness: Option<f64>,
}

impl SpeedAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: &TrialRecord) {
        let speed = record.metrics.average_speed;
        self.count += 1;
        self.speed_sum += speed;
        if self.top.as_ref().is_none_or(|(_, best)| speed > *best) {
            self.top = Some((record.key.clone(), speed));
        }
        if record.metrics.straightness.is_finite() {
            self.straightness_sum += record.metrics.straightness;
            self.straightness_count += 1;
        }
    }

    pub fn merge(mut self, other: SpeedAccumulator) -> Self {
        self.count += other.count;
        self.speed_sum += other.speed_sum;
        self.straightness_sum += other.straightness_sum;
        self.straightness_count += other.straightness_count;
        if let Some((key, speed)) = other.top {
            if self.top.as_ref().is_none_or(|(_, best)| speed > *best) {
                self.top = Some((key, speed));
            }
        }
        self
    }

    pub fn finish(self) -> Summary {
        let mean = |sum: f64, n: usize| (n > 0).then(|| sum / n as f64);
        let (top_trial, top_speed) = match self.top {
            Some((key, speed)) => (Some(key), Some(speed)),
            None => (None, None),
        };
        Summary {
            count: self.count,
            mean_average_speed: mean(self.speed_sum, self.count),
            top_speed,
            top_trial,
            mean_straightness: mean(self.straightness_sum, self.straightness_count),
        }
    }
}

/// Fold a set of records into a summary
pub fn summarize<'a, I>(records: I) -> Summary
where
    I: IntoIterator<Item = &'a TrialRecord>,
{
    records
        .into_iter()
        .fold(SpeedAccumulator::new(), |mut acc, r| {
            acc.push(r);
            acc
        })
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{Sample, Trace};

    fn record(name: &str, end: (f64, f64, f64)) -> TrialRecord {
        let key = TrialKey::from_file_name(name).unwrap();
        let trace =
            Trace::from_ordered(vec![Sample::new(0.0, 0.0, 0.0), Sample::new(end.0, end.1, end.2)]);
        let trace = normalize(&trace);
        let metrics = TraceMetrics::compute(&trace, StraightnessForm::Ratio).unwrap();
        TrialRecord {
            key,
            path: PathBuf::from(name),
            trace,
            metrics,
        }
    }

    fn sample_records() -> Vec<TrialRecord> {
        vec![
            record("plast__left_crawl_05_1.txt", (1.0, 3.0, 4.0)), // 5 cm/s
            record("plast__left_crawl_05_2.txt", (2.0, 0.0, 6.0)), // 3 cm/s
            record("plast__left_crawl_10_1.txt", (1.0, 6.0, 8.0)), // 10 cm/s
            record("carpet__right_trot_05_1.txt", (1.0, 2.0, 0.0)), // 2 cm/s, infinite
        ]
    }

    #[test]
    fn test_filter() {
        let records = sample_records();
        let filter = RecordFilter {
            surface: Some("plast".into()),
            speed: Some("05".into()),
            ..RecordFilter::default()
        };
        let hits = filter.apply(&records);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|r| r.key.gait == "crawl"));

        assert_eq!(RecordFilter::default().apply(&records).len(), 4);
    }

    #[test]
    fn test_group_by_group_key() {
        let records = sample_records();
        let groups = group_by(&records, |r| r.key.group());
        assert_eq!(groups.len(), 2);
        let crawl = groups
            .iter()
            .find(|(k, _)| k.gait == "crawl")
            .map(|(_, v)| v)
            .unwrap();
        assert_eq!(crawl.len(), 3);
        assert_eq!(crawl[0].key.trial, "1");
        assert_eq!(crawl[1].key.trial, "2");
    }

    #[test]
    fn test_group_by_speed() {
        let records = sample_records();
        let groups = group_by(&records, |r| r.key.speed.clone());
        assert_eq!(groups["05"].len(), 3);
        assert_eq!(groups["10"].len(), 1);
    }

    #[test]
    fn test_summary() {
        let records = sample_records();
        let summary = summarize(&records);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean_average_speed, Some(5.0));
        assert_eq!(summary.top_speed, Some(10.0));
        assert_eq!(summary.top_trial.unwrap().speed, "10");
        // 0.75, 0.0, 0.75; the infinite one is left out
        assert_eq!(summary.mean_straightness, Some(0.5));
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&Vec::<TrialRecord>::new());
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean_average_speed, None);
        assert_eq!(summary.top_speed, None);
        assert_eq!(summary.mean_straightness, None);
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let records = sample_records();
        let (a, b) = records.split_at(2);
        let mut left = SpeedAccumulator::new();
        a.iter().for_each(|r| left.push(r));
        let mut right = SpeedAccumulator::new();
        b.iter().for_each(|r| right.push(r));

        assert_eq!(left.merge(right).finish(), summarize(&records));
    }
}
