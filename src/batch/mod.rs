// Batch analysis over a directory of named trial logs
//
// Provides:
// - Trial key extraction from file names
// - Flat trial records with filter / group-by
// - Explicit accumulators for speed and straightness summaries

pub mod naming;
pub mod records;

pub use naming::{GroupKey, TrialKey};
pub use records::{
    group_by, scan_directory, summarize, BatchError, RecordFilter, SpeedAccumulator, Summary,
    TrialRecord,
};
