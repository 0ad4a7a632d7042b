pub mod error;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use error::{FlattenError, RunAborted};
pub use models::{
    ExtensionMapping, FileTask, FlattenPlan, MappingPolicy, MaterializeOutcome, RunMode, RunReport,
};
pub use services::{execute, plan, FlattenConfig, Materializer, TreeWalker};
pub use utils::ExclusionSet;

/// How plans and reports are rendered by the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub flatten: FlattenConfig,
    pub log_level: String,
    pub format: OutputFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            flatten: FlattenConfig::default(),
            log_level: "info".to_string(),
            format: OutputFormat::Text,
        }
    }
}
