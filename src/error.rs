use crate::models::RunReport;
use std::io;
use std::path::PathBuf;

/// Every failure the flattening pipeline can surface.
///
/// Configuration problems are reported before any traversal begins. All
/// other variants are fatal mid-run and carry the offending path.
#[derive(thiserror::Error, Debug)]
pub enum FlattenError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to read directory {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: content is not valid UTF-8 text", .path.display())]
    Encoding { path: PathBuf },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FlattenError {
    pub fn config(message: impl Into<String>) -> Self {
        FlattenError::Config(message.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, FlattenError::Config(_))
    }

    /// Source-side failures: directory enumeration, file reads and decoding.
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            FlattenError::Walk { .. } | FlattenError::Read { .. } | FlattenError::Encoding { .. }
        )
    }

    pub fn is_write(&self) -> bool {
        matches!(self, FlattenError::Write { .. })
    }

    /// Path the diagnostic refers to, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            FlattenError::Config(_) => None,
            FlattenError::Walk { path, .. }
            | FlattenError::Read { path, .. }
            | FlattenError::Encoding { path }
            | FlattenError::Write { path, .. } => Some(path),
        }
    }
}

/// A run that stopped on its first fatal error.
///
/// Files written before the failure stay on disk; `report.completed` is
/// false so callers never mistake the output for a complete set.
#[derive(thiserror::Error, Debug)]
#[error("run aborted after {} file(s): {error}", .report.files_written)]
pub struct RunAborted {
    pub report: RunReport,
    #[source]
    pub error: FlattenError,
}

pub type Result<T> = std::result::Result<T, FlattenError>;
