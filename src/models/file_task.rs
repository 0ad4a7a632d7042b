use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// One candidate file yielded by the walker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTask {
    pub source: PathBuf,
    /// Path from the scan root, `/`-separated.
    pub relative_path: String,
    /// File name without its final extension.
    pub stem: String,
    pub output_ext: String,
}

impl FileTask {
    /// Destination name before collision resolution.
    pub fn planned_name(&self) -> String {
        format!("{}.{}", self.stem, self.output_ext)
    }
}

/// Result of materializing one task.
#[derive(Debug, Clone, Serialize)]
pub struct MaterializeOutcome {
    pub relative_path: String,
    /// Final destination name, or the would-be name in a dry run.
    pub destination_name: String,
    pub bytes: usize,
    pub written: bool,
    #[serde(with = "duration_micros")]
    pub elapsed: Duration,
}

mod duration_micros {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_micros()).unwrap_or(u64::MAX))
    }
}
