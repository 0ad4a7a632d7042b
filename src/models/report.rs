use crate::models::{ExtensionMapping, MaterializeOutcome};
use crate::utils::ExclusionSet;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    DryRun,
    Live,
}

impl RunMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            RunMode::DryRun
        } else {
            RunMode::Live
        }
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self, RunMode::DryRun)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::DryRun => write!(f, "DRY RUN (simulation)"),
            RunMode::Live => write!(f, "LIVE EXECUTION"),
        }
    }
}

/// Everything resolved before a single file is touched.
#[derive(Debug, Clone, Serialize)]
pub struct FlattenPlan {
    pub mode: RunMode,
    pub root: PathBuf,
    pub destination: PathBuf,
    pub mapping: ExtensionMapping,
    #[serde(serialize_with = "serialize_exclusions")]
    pub exclusions: ExclusionSet,
    /// Header timestamp shared by every file of the run.
    pub archived_at: String,
}

fn serialize_exclusions<S: serde::Serializer>(
    exclusions: &ExclusionSet,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(exclusions.patterns())
}

/// Aggregated counts for one run. Advisory only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub files_scanned: usize,
    pub files_written: usize,
    pub files_skipped: usize,
    pub dirs_pruned: usize,
    pub errors: usize,
    pub bytes_written: usize,
    pub completed: bool,
    pub outcomes: Vec<MaterializeOutcome>,
}

impl RunReport {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: MaterializeOutcome) {
        self.files_written += 1;
        self.bytes_written += outcome.bytes;
        self.outcomes.push(outcome);
    }

    pub fn destination_names(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .map(|outcome| outcome.destination_name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_record_accumulates_counts() {
        let mut report = RunReport::empty();
        for (name, bytes) in [("a.txt", 10), ("a_1.txt", 5)] {
            report.record(MaterializeOutcome {
                relative_path: format!("src/{}", name),
                destination_name: name.to_string(),
                bytes,
                written: true,
                elapsed: Duration::from_millis(1),
            });
        }
        assert_eq!(report.files_written, 2);
        assert_eq!(report.bytes_written, 15);
        assert_eq!(report.destination_names(), vec!["a.txt", "a_1.txt"]);
        assert!(!report.completed);
    }

    #[test]
    fn test_mode_from_flag() {
        assert!(RunMode::from_dry_run(true).is_dry_run());
        assert_eq!(RunMode::from_dry_run(false), RunMode::Live);
    }
}
