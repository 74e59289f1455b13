// Trial file naming: {surface}__{direction}_{gait}_{speed}_{trial}.txt

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

use crate::config::{GROUP_PLOT_PREFIX, TRIAL_FILE_PATTERN};

fn trial_file_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TRIAL_FILE_PATTERN).expect("trial file pattern is valid"))
}

/// Experiment conditions encoded in a trial file name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TrialKey {
    pub surface: String,
    pub direction: String,
    pub gait: String,
    /// Kept verbatim ("05" stays "05")
    pub speed: String,
    pub trial: String,
}

impl TrialKey {
    /// Extract the key from a bare file name; `None` if it does not follow the convention
    pub fn from_file_name(name: &str) -> Option<Self> {
        let caps = trial_file_regex().captures(name)?;
        Some(Self {
            surface: caps[1].to_string(),
            direction: caps[2].to_string(),
            gait: caps[3].to_string(),
            speed: caps[4].to_string(),
            trial: caps[5].to_string(),
        })
    }

    pub fn group(&self) -> GroupKey {
        GroupKey {
            surface: self.surface.clone(),
            direction: self.direction.clone(),
            gait: self.gait.clone(),
        }
    }
}

impl fmt::Display for TrialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}__{}_{}_{}_{}",
            self.surface, self.direction, self.gait, self.speed, self.trial
        )
    }
}

/// One plot per surface/direction/gait combination
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupKey {
    pub surface: String,
    pub direction: String,
    pub gait: String,
}

impl GroupKey {
    pub fn plot_file_name(&self) -> String {
        format!(
            "{}{}+{}+{}.svg",
            GROUP_PLOT_PREFIX, self.surface, self.direction, self.gait
        )
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.surface, self.direction, self.gait)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trial_name() {
        let key = TrialKey::from_file_name("plast__left_crawl_05_1.txt").unwrap();
        assert_eq!(key.surface, "plast");
        assert_eq!(key.direction, "left");
        assert_eq!(key.gait, "crawl");
        assert_eq!(key.speed, "05");
        assert_eq!(key.trial, "1");
        assert_eq!(key.to_string(), "plast__left_crawl_05_1");
    }

    #[test]
    fn test_non_matching_names() {
        for name in [
            "plast_left_crawl_05_1.txt",
            "plast__left_crawl_05_1.csv",
            "plast__left_crawl_fast_1.txt",
            "notes.txt",
            "Wail_wag1.txt",
            "plast__left_crawl_05_1.txt.bak",
        ] {
            assert!(TrialKey::from_file_name(name).is_none(), "{} matched", name);
        }
    }

    #[test]
    fn test_group_plot_file_name() {
        let key = TrialKey::from_file_name("carpet__right_trot_10_3.txt").unwrap();
        assert_eq!(key.group().plot_file_name(), "Gait_carpet+right+trot.svg");
    }
}
