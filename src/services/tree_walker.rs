use crate::error::{FlattenError, Result};
use crate::models::{ExtensionMapping, FileTask};
use crate::utils::{file_extension, file_stem, relative_display, ExclusionSet};
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A child of a directory as seen by the walker.
#[derive(Debug, Clone)]
pub struct DirEntryInfo {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Enumerates a single directory level.
pub trait DirectoryReader {
    fn read_dir(&mut self, dir: &Path) -> io::Result<Vec<DirEntryInfo>>;
}

/// Reads the real filesystem. Symbolic links are never followed, so a link
/// to a directory is reported as a plain entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsDirectoryReader;

impl DirectoryReader for FsDirectoryReader {
    fn read_dir(&mut self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        fs::read_dir(dir)?
            .map(|entry| {
                let entry = entry?;
                Ok(DirEntryInfo {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    path: entry.path(),
                    is_dir: entry.file_type()?.is_dir(),
                })
            })
            .collect()
    }
}

/// Counters kept while walking.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkStats {
    pub dirs_visited: usize,
    pub dirs_pruned: usize,
    pub files_scanned: usize,
    pub files_skipped: usize,
}

/// Lazy depth-first walk yielding one [`FileTask`] per candidate file.
///
/// Each directory is read once, its entries sorted by name. Files of a
/// directory are yielded before its subdirectories are entered. Excluded
/// subdirectories are dropped before they are ever read. The first error
/// ends the walk.
pub struct TreeWalker<'a, R: DirectoryReader = FsDirectoryReader> {
    root: PathBuf,
    mapping: &'a ExtensionMapping,
    exclusions: &'a ExclusionSet,
    skip_paths: Vec<PathBuf>,
    reader: R,
    pending_dirs: Vec<PathBuf>,
    pending_files: VecDeque<FileTask>,
    stats: WalkStats,
}

impl<'a> TreeWalker<'a, FsDirectoryReader> {
    pub fn new(root: &Path, mapping: &'a ExtensionMapping, exclusions: &'a ExclusionSet) -> Self {
        Self::with_reader(root, mapping, exclusions, FsDirectoryReader)
    }
}

impl<'a, R: DirectoryReader> TreeWalker<'a, R> {
    pub fn with_reader(
        root: &Path,
        mapping: &'a ExtensionMapping,
        exclusions: &'a ExclusionSet,
        reader: R,
    ) -> Self {
        Self {
            root: root.to_path_buf(),
            mapping,
            exclusions,
            skip_paths: Vec::new(),
            reader,
            pending_dirs: vec![root.to_path_buf()],
            pending_files: VecDeque::new(),
            stats: WalkStats::default(),
        }
    }

    /// Never descend into `path`, whatever its name.
    pub fn skip_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.skip_paths.push(path.into());
        self
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    fn expand(&mut self, dir: &Path) -> Result<()> {
        let mut entries = self.reader.read_dir(dir).map_err(|source| FlattenError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        self.stats.dirs_visited += 1;

        let mut subdirs = Vec::new();
        for entry in entries {
            if entry.is_dir {
                if self.exclusions.matches(&entry.name) || self.skip_paths.contains(&entry.path) {
                    debug!(path = %entry.path.display(), "Pruning directory");
                    self.stats.dirs_pruned += 1;
                } else {
                    subdirs.push(entry.path);
                }
                continue;
            }

            self.stats.files_scanned += 1;
            match self.classify(&entry) {
                Some(task) => self.pending_files.push_back(task),
                None => self.stats.files_skipped += 1,
            }
        }

        // Reverse so the first sorted subdirectory is popped first.
        self.pending_dirs.extend(subdirs.into_iter().rev());
        Ok(())
    }

    fn classify(&self, entry: &DirEntryInfo) -> Option<FileTask> {
        if self.exclusions.matches(&entry.name) {
            debug!(path = %entry.path.display(), "Skipping excluded file");
            return None;
        }

        let name = Path::new(&entry.name);
        let Some(output_ext) = file_extension(name).and_then(|ext| self.mapping.lookup(ext)) else {
            debug!(path = %entry.path.display(), "Skipping unmapped extension");
            return None;
        };

        Some(FileTask {
            source: entry.path.clone(),
            relative_path: relative_display(&entry.path, &self.root),
            stem: file_stem(name),
            output_ext: output_ext.to_string(),
        })
    }
}

impl<R: DirectoryReader> Iterator for TreeWalker<'_, R> {
    type Item = Result<FileTask>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(task) = self.pending_files.pop_front() {
                return Some(Ok(task));
            }
            let dir = self.pending_dirs.pop()?;
            if let Err(e) = self.expand(&dir) {
                self.pending_dirs.clear();
                return Some(Err(e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn mapping() -> ExtensionMapping {
        ExtensionMapping::build(&["js", "css"], &["txt"]).unwrap()
    }

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, relative).unwrap();
    }

    fn relative_paths<R: DirectoryReader>(walker: TreeWalker<'_, R>) -> Vec<String> {
        walker.map(|task| task.unwrap().relative_path).collect()
    }

    #[test]
    fn test_yields_only_mapped_extensions() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "app.js");
        touch(dir.path(), "style.CSS");
        touch(dir.path(), "readme.md");
        touch(dir.path(), "Makefile");

        let mapping = mapping();
        let exclusions = ExclusionSet::default();
        let mut walker = TreeWalker::new(dir.path(), &mapping, &exclusions);
        let tasks: Vec<FileTask> = walker.by_ref().map(|t| t.unwrap()).collect();

        let names: Vec<String> = tasks.iter().map(|t| t.planned_name()).collect();
        assert_eq!(names, vec!["app.txt", "style.txt"]);
        let stats = walker.stats();
        assert_eq!(stats.files_scanned, 4);
        assert_eq!(stats.files_skipped, 2);
    }

    #[test]
    fn test_depth_first_order_is_stable() {
        let dir = tempdir().unwrap();
        for path in ["z.js", "b/inner/deep.js", "b/b.js", "a/a.js", "m.js"] {
            touch(dir.path(), path);
        }

        let mapping = mapping();
        let exclusions = ExclusionSet::default();
        let first = relative_paths(TreeWalker::new(dir.path(), &mapping, &exclusions));
        let second = relative_paths(TreeWalker::new(dir.path(), &mapping, &exclusions));

        assert_eq!(first, vec!["m.js", "z.js", "a/a.js", "b/b.js", "b/inner/deep.js"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_excluded_directories_are_pruned() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "src/main.js");
        touch(dir.path(), "node_modules/lib/index.js");
        touch(dir.path(), "src/node_modules/x.js");
        touch(dir.path(), "dist-old/bundle.js");

        let mapping = mapping();
        let exclusions = ExclusionSet::new(&["node_modules", "dist*"]).unwrap();
        let mut walker = TreeWalker::new(dir.path(), &mapping, &exclusions);
        let paths: Vec<String> = walker.by_ref().map(|t| t.unwrap().relative_path).collect();

        assert_eq!(paths, vec!["src/main.js"]);
        assert_eq!(walker.stats().dirs_pruned, 3);
    }

    #[test]
    fn test_excluded_file_names_are_skipped() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "app.js");
        touch(dir.path(), "app.min.js");

        let mapping = mapping();
        let exclusions = ExclusionSet::new(&["*.min.js"]).unwrap();
        let paths = relative_paths(TreeWalker::new(dir.path(), &mapping, &exclusions));
        assert_eq!(paths, vec!["app.js"]);
    }

    #[test]
    fn test_skip_path_prunes_by_location() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "keep/a.js");
        touch(dir.path(), "out/a.txt.js");

        let mapping = mapping();
        let exclusions = ExclusionSet::default();
        let walker =
            TreeWalker::new(dir.path(), &mapping, &exclusions).skip_path(dir.path().join("out"));
        assert_eq!(relative_paths(walker), vec!["keep/a.js"]);
    }

    #[test]
    fn test_missing_root_is_walk_error() {
        let dir = tempdir().unwrap();
        let mapping = mapping();
        let exclusions = ExclusionSet::default();
        let mut walker = TreeWalker::new(&dir.path().join("absent"), &mapping, &exclusions);
        let err = walker.next().unwrap().unwrap_err();
        assert!(matches!(err, FlattenError::Walk { .. }));
        assert!(walker.next().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_not_descended() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "real/a.js");
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        let mapping = mapping();
        let exclusions = ExclusionSet::default();
        let paths = relative_paths(TreeWalker::new(dir.path(), &mapping, &exclusions));
        assert_eq!(paths, vec!["real/a.js"]);
    }
}
