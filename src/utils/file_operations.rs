use crate::error::{FlattenError, Result};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

/// Extension after the final dot of the base name, if any.
///
/// Dotfiles such as `.gitignore` have no extension.
pub fn file_extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str()).filter(|ext| !ext.is_empty())
}

/// Base name without its final extension.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Render `path` relative to `root` with `/` separators.
///
/// Falls back to the full path when `path` is not under `root`.
pub fn relative_display(path: &Path, root: &Path) -> String {
    let Ok(relative) = path.strip_prefix(root) else {
        return path.to_string_lossy().into_owned();
    };

    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Read a whole file as UTF-8 text without touching it.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| FlattenError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    String::from_utf8(bytes).map_err(|_| FlattenError::Encoding {
        path: path.to_path_buf(),
    })
}

/// Atomically create `dest_dir/name` with `content`; never overwrites.
///
/// The content is staged in a temporary file inside `dest_dir` and renamed
/// into place only if the final name is still free.
pub fn write_new_file(dest_dir: &Path, name: &str, content: &[u8]) -> Result<PathBuf> {
    let dest_path = dest_dir.join(name);
    let write_err = |source| FlattenError::Write {
        path: dest_path.clone(),
        source,
    };

    let mut staged = NamedTempFile::new_in(dest_dir).map_err(write_err)?;
    staged.write_all(content).map_err(write_err)?;
    staged.as_file().sync_all().map_err(write_err)?;
    staged
        .persist_noclobber(&dest_path)
        .map_err(|e| write_err(e.error))?;

    Ok(dest_path)
}

/// Absolute form of a path that may not exist yet.
///
/// An existing path is canonicalized; otherwise its parent must exist and is
/// canonicalized instead.
pub fn absolute_path(path: &Path) -> std::io::Result<PathBuf> {
    if path.exists() {
        return fs::canonicalize(path);
    }

    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no final component")
    })?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok(fs::canonicalize(parent)?.join(file_name))
}
