use crate::error::Result;
use crate::models::{FileTask, MaterializeOutcome, RunMode};
use crate::services::collision::{self, DestinationRegistry};
use crate::utils::{read_text, write_new_file};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// Line-comment syntax used for the provenance header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    Hash,
    DoubleSlash,
    DoubleDash,
    Markup,
    Generic,
}

impl CommentStyle {
    /// Pick the style for an output extension, ignoring case and a leading dot.
    pub fn for_extension(ext: &str) -> Self {
        let ext = ext.strip_prefix('.').unwrap_or(ext).to_ascii_lowercase();
        match ext.as_str() {
            "py" | "rb" | "sh" | "yaml" | "yml" | "conf" | "toml" | "pl" | "dockerfile" => {
                CommentStyle::Hash
            }
            "c" | "cpp" | "cs" | "java" | "js" | "jsx" | "ts" | "tsx" | "sol" | "go" | "rs"
            | "php" | "swift" | "dart" | "txt" | "css" | "scss" => CommentStyle::DoubleSlash,
            "sql" | "lua" | "hs" => CommentStyle::DoubleDash,
            "html" | "xml" | "htm" | "svg" | "ejs" | "vue" | "jsp" => CommentStyle::Markup,
            _ => CommentStyle::Generic,
        }
    }

    pub fn open(&self) -> &'static str {
        match self {
            CommentStyle::Hash => "#",
            CommentStyle::DoubleSlash => "//",
            CommentStyle::DoubleDash => "--",
            CommentStyle::Markup => "<!--",
            CommentStyle::Generic => "::",
        }
    }

    pub fn close(&self) -> Option<&'static str> {
        match self {
            CommentStyle::Markup => Some("-->"),
            _ => None,
        }
    }
}

/// Single-line provenance header, without a trailing newline.
pub fn build_header(output_ext: &str, relative_path: &str, archived_at: &str) -> String {
    let style = CommentStyle::for_extension(output_ext);
    let mut header = format!(
        "{} ORIGINAL_PATH: {} | ARCHIVED: {}",
        style.open(),
        relative_path,
        archived_at
    );
    if let Some(close) = style.close() {
        header.push(' ');
        header.push_str(close);
    }
    header
}

/// Reads candidates and writes (or simulates writing) their flattened copies.
///
/// Owns the run's [`DestinationRegistry`], so each run needs its own
/// materializer.
#[derive(Debug)]
pub struct Materializer {
    destination: PathBuf,
    mode: RunMode,
    archived_at: String,
    registry: DestinationRegistry,
}

impl Materializer {
    pub fn new(destination: &Path, mode: RunMode, archived_at: impl Into<String>) -> Self {
        Self {
            destination: destination.to_path_buf(),
            mode,
            archived_at: archived_at.into(),
            registry: DestinationRegistry::new(),
        }
    }

    pub fn registry(&self) -> &DestinationRegistry {
        &self.registry
    }

    /// Process one task. Any read or write failure is returned untouched and
    /// nothing is written for this task.
    pub fn process(&mut self, task: &FileTask) -> Result<MaterializeOutcome> {
        let started = Instant::now();

        let content = read_text(&task.source)?;
        let header = build_header(&task.output_ext, &task.relative_path, &self.archived_at);
        let output = format!("{}\n\n{}", header, content);

        let disk_check = match self.mode {
            RunMode::Live => Some(self.destination.as_path()),
            RunMode::DryRun => None,
        };
        let name = collision::resolve(disk_check, &task.stem, &task.output_ext, &mut self.registry);

        let written = match self.mode {
            RunMode::Live => {
                write_new_file(&self.destination, &name, output.as_bytes())?;
                true
            }
            RunMode::DryRun => false,
        };

        debug!(
            source = %task.relative_path,
            destination = %name,
            bytes = output.len(),
            written,
            "Materialized file"
        );

        Ok(MaterializeOutcome {
            relative_path: task.relative_path.clone(),
            destination_name: name,
            bytes: output.len(),
            written,
            elapsed: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const STAMP: &str = "2024-05-01 12:00:00";

    fn task(source: PathBuf, relative: &str, stem: &str, ext: &str) -> FileTask {
        FileTask {
            source,
            relative_path: relative.to_string(),
            stem: stem.to_string(),
            output_ext: ext.to_string(),
        }
    }

    #[test]
    fn test_comment_style_follows_output_extension() {
        assert_eq!(CommentStyle::for_extension("py"), CommentStyle::Hash);
        assert_eq!(CommentStyle::for_extension(".TXT"), CommentStyle::DoubleSlash);
        assert_eq!(CommentStyle::for_extension("sql"), CommentStyle::DoubleDash);
        assert_eq!(CommentStyle::for_extension("html"), CommentStyle::Markup);
        assert_eq!(CommentStyle::for_extension("md"), CommentStyle::Generic);
    }

    #[test]
    fn test_header_formats() {
        assert_eq!(
            build_header("txt", "a/index.js", STAMP),
            "// ORIGINAL_PATH: a/index.js | ARCHIVED: 2024-05-01 12:00:00"
        );
        assert_eq!(
            build_header("html", "site/index.html", STAMP),
            "<!-- ORIGINAL_PATH: site/index.html | ARCHIVED: 2024-05-01 12:00:00 -->"
        );
        assert_eq!(
            build_header("md", "README.md", STAMP),
            ":: ORIGINAL_PATH: README.md | ARCHIVED: 2024-05-01 12:00:00"
        );
    }

    #[test]
    fn test_live_process_writes_header_and_verbatim_content() {
        let src = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let source = src.path().join("app.py");
        fs::write(&source, "print('hi')\r\n\tindent\n").unwrap();

        let mut materializer = Materializer::new(dest.path(), RunMode::Live, STAMP);
        let outcome = materializer.process(&task(source, "app.py", "app", "sh")).unwrap();

        assert_eq!(outcome.destination_name, "app.sh");
        assert!(outcome.written);
        let written = fs::read_to_string(dest.path().join("app.sh")).unwrap();
        assert_eq!(
            written,
            "# ORIGINAL_PATH: app.py | ARCHIVED: 2024-05-01 12:00:00\n\nprint('hi')\r\n\tindent\n"
        );
        assert_eq!(outcome.bytes, written.len());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let src = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let source = src.path().join("a.js");
        fs::write(&source, "x").unwrap();

        let mut materializer = Materializer::new(dest.path(), RunMode::DryRun, STAMP);
        let outcome = materializer.process(&task(source, "a.js", "a", "txt")).unwrap();

        assert_eq!(outcome.destination_name, "a.txt");
        assert!(!outcome.written);
        assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
        assert!(materializer.registry().is_claimed("a.txt"));
    }

    #[test]
    fn test_unreadable_source_claims_no_name() {
        let src = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let source = src.path().join("bad.js");
        fs::write(&source, [0xc3, 0x28]).unwrap();

        let mut materializer = Materializer::new(dest.path(), RunMode::Live, STAMP);
        let err = materializer.process(&task(source, "bad.js", "bad", "txt")).unwrap_err();

        assert!(err.is_read());
        assert!(materializer.registry().is_empty());
        assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_leftover_destination_files_are_not_overwritten() {
        let src = tempdir().unwrap();
        let dest = tempdir().unwrap();
        fs::write(dest.path().join("a.txt"), "previous run").unwrap();
        let source = src.path().join("a.js");
        fs::write(&source, "new").unwrap();

        let mut materializer = Materializer::new(dest.path(), RunMode::Live, STAMP);
        let outcome = materializer.process(&task(source, "a.js", "a", "txt")).unwrap();

        assert_eq!(outcome.destination_name, "a_1.txt");
        assert_eq!(fs::read_to_string(dest.path().join("a.txt")).unwrap(), "previous run");
    }
}
