//! In-memory bundle of one dependency's schema files
//!
//! A [`Bundle`] holds the (relative path, content) pairs that make up one
//! dependency's materialized files, staged in memory before anything touches
//! the output tree. Paths are bundle-relative and always use forward slashes,
//! regardless of the host filesystem convention, so digests computed over a
//! bundle are stable across platforms.

use crate::error::{Error, Result};
use glob::Pattern;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// File extension that marks a schema file during discovery.
const SCHEMA_EXTENSION: &str = "proto";

/// One file in a bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleFile {
    /// Bundle-relative path, forward-slash separated.
    pub path: String,
    /// Raw file content.
    pub content: Vec<u8>,
}

/// An ordered-by-path, unique-by-path collection of schema files, plus the
/// commit the files were acquired at (`None` when the bundle was rebuilt from
/// local output rather than freshly cloned).
#[derive(Debug, Clone, Default)]
pub struct Bundle {
    files: Vec<BundleFile>,
    commit: Option<String>,
}

impl Bundle {
    /// Create an empty bundle with no acquisition commit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty bundle labeled with the commit it was acquired at.
    pub fn with_commit(commit: String) -> Self {
        Self {
            files: Vec::new(),
            commit: Some(commit),
        }
    }

    /// The commit this bundle was acquired at, if it came from a fresh clone.
    pub fn commit(&self) -> Option<&str> {
        self.commit.as_deref()
    }

    /// Iterate over the files in path order.
    pub fn files(&self) -> impl Iterator<Item = &BundleFile> {
        self.files.iter()
    }

    /// Number of files in the bundle.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the bundle holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Read one file from `base/relative` and append it.
    ///
    /// `relative` must be forward-slash separated; it is recorded verbatim as
    /// the bundle path.
    pub fn add_file(&mut self, base: &Path, relative: &str) -> Result<()> {
        let content = fs::read(join_relative(base, relative))?;
        self.files.push(BundleFile {
            path: relative.to_string(),
            content,
        });
        Ok(())
    }

    /// Discover every schema file under `base` passing `filters`, and add
    /// them all in path order.
    ///
    /// Fails with [`Error::NoMatchingFiles`] when discovery yields nothing: a
    /// dependency that contributes zero files is a configuration problem, not
    /// a no-op.
    pub fn add_all_matching(&mut self, base: &Path, filters: &[String]) -> Result<()> {
        let found = find_schema_files(base, filters)?;
        if found.is_empty() {
            return Err(Error::NoMatchingFiles {
                dir: base.display().to_string(),
                filters: filters.to_vec(),
            });
        }

        for relative in &found {
            log::debug!("adding {} from {}", relative, base.display());
            self.add_file(base, relative)?;
        }
        self.files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(())
    }

    /// Write every file under `output_base`, creating intermediate
    /// directories as needed and overwriting existing files unconditionally.
    pub fn write_to(&self, output_base: &Path) -> Result<()> {
        if self.files.is_empty() {
            return Err(Error::DegenerateBundle {
                message: format!(
                    "refusing to write an empty bundle to {}",
                    output_base.display()
                ),
            });
        }

        for file in &self.files {
            let out = join_relative(output_base, &file.path);
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&out, &file.content)?;
        }
        Ok(())
    }
}

/// Find every `.proto` file under `base`, as sorted forward-slash relative
/// paths, keeping only those that match **every** filter pattern.
///
/// Filters are ANDed together, not ORed: a candidate survives only if all
/// patterns match it. An empty filter list keeps everything. Returns an empty
/// list (not an error) when nothing matches; callers decide whether that is
/// fatal.
pub fn find_schema_files(base: &Path, filters: &[String]) -> Result<Vec<String>> {
    let patterns = filters
        .iter()
        .map(|f| Pattern::new(f))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut found = Vec::new();
    for entry in WalkDir::new(base) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some(SCHEMA_EXTENSION) {
            continue;
        }

        let relative = relative_slash_path(entry.path(), base)?;
        if patterns.iter().all(|p| p.matches(&relative)) {
            found.push(relative);
        }
    }

    found.sort();
    Ok(found)
}

/// Render `path` relative to `base` with forward-slash separators.
fn relative_slash_path(path: &Path, base: &Path) -> Result<String> {
    let relative = path.strip_prefix(base).map_err(|_| Error::Path {
        message: format!(
            "{} is not under {}",
            path.display(),
            base.display()
        ),
    })?;

    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(segments.join("/"))
}

/// Join a forward-slash relative path onto a native base path.
fn join_relative(base: &Path, relative: &str) -> std::path::PathBuf {
    let mut out = base.to_path_buf();
    for segment in relative.split('/') {
        out.push(segment);
    }
    out
}
