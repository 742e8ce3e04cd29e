//! Source directory traversal

use sdfdex_core::{IndexError, Result};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// A file found under the root directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Path on disk
    pub path: PathBuf,
    /// Root-relative path with `/` separators
    pub relative_path: String,
}

/// Result of walking the root directory
#[derive(Debug, Clone, Default)]
pub struct SourceListing {
    /// Candidates sorted by relative path
    pub files: Vec<CandidateFile>,
    /// Files with a matching extension but a path that is not UTF-8, plus
    /// entries below the root that could not be read
    pub unreadable_paths: u64,
}

/// Root-relative path joined with `/`, or `None` when not UTF-8.
fn forward_slash_path(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            parts.push(part.to_str()?);
        }
    }
    Some(parts.join("/"))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// List every regular file under `root` whose extension is in `extensions`
/// (case-insensitive), sorted by relative path. Symlinks are not followed.
///
/// An entry below the root that cannot be read is skipped with a warning; a
/// root that cannot be read is an `Io` error.
pub fn walk_source_files(root: &Path, extensions: &[String]) -> Result<SourceListing> {
    if !root.is_dir() {
        return Err(IndexError::invalid_input(format!(
            "root '{}' is not a directory",
            root.display()
        )));
    }

    let mut listing = SourceListing::default();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() > 0 => {
                warn!(target: "sdfdex::build", path = ?e.path(), error = %e, "Skipping unreadable entry");
                listing.unreadable_paths += 1;
                continue;
            }
            Err(e) => return Err(IndexError::Io(io::Error::from(e))),
        };
        if !entry.file_type().is_file() || !has_extension(entry.path(), extensions) {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        match forward_slash_path(relative) {
            Some(relative_path) => listing.files.push(CandidateFile {
                path: entry.into_path(),
                relative_path,
            }),
            None => {
                warn!(target: "sdfdex::build", path = ?entry.path(), "Skipping file with non UTF-8 path");
                listing.unreadable_paths += 1;
            }
        }
    }
    listing
        .files
        .sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(listing)
}
