pub mod collision;
pub mod flatten;
pub mod materializer;
pub mod tree_walker;

pub use collision::{resolve, DestinationRegistry};
pub use flatten::{execute, execute_with_reader, plan, FlattenConfig, ARCHIVE_TIMESTAMP_FORMAT};
pub use materializer::{build_header, CommentStyle, Materializer};
pub use tree_walker::{DirEntryInfo, DirectoryReader, FsDirectoryReader, TreeWalker, WalkStats};
