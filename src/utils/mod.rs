pub mod file_operations;
pub mod pattern;

pub use file_operations::{
    absolute_path, file_extension, file_stem, read_text, relative_display, write_new_file,
};
pub use pattern::ExclusionSet;
