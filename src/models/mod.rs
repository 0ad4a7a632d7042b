pub mod extension_mapping;
pub mod file_task;
pub mod report;

pub use extension_mapping::{ExtensionMapping, MappingEntry, MappingPolicy, FALLBACK_EXTENSION};
pub use file_task::{FileTask, MaterializeOutcome};
pub use report::{FlattenPlan, RunMode, RunReport};
