//! Filtered `.tar.gz` export of a directory tree.
//!
//! Excluded names are checked twice: directories are pruned before the walk
//! descends into them, and every file's root-relative path is re-checked
//! segment by segment before it is appended. Both guards share
//! [`ExclusionSet`].

use flate2::{write::GzEncoder, Compression};
use service_core::error::AppError;
use std::collections::BTreeSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

/// Names that never appear in an export, at any depth.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".git",
    "__pycache__",
    "logs",
    ".env",
    ".venv",
    "env",
    ".pytest_cache",
    "target",
];

/// Literal path-segment names (not patterns).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    names: BTreeSet<OsString>,
}

impl ExclusionSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().to_os_string())
                .collect(),
        }
    }

    /// The default names plus `extra`; defaults cannot be removed.
    pub fn with_defaults<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut set = Self::new(DEFAULT_EXCLUDES);
        set.names
            .extend(extra.into_iter().map(|n| n.as_ref().to_os_string()));
        set
    }

    pub fn contains(&self, name: &OsStr) -> bool {
        self.names.contains(name)
    }

    /// True when any normal segment of `relative` is excluded.
    pub fn matches_path(&self, relative: &Path) -> bool {
        relative.components().any(|component| match component {
            Component::Normal(segment) => self.contains(segment),
            _ => false,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDES)
    }
}

/// A finished export.
#[derive(Debug)]
pub struct Archive {
    pub bytes: Vec<u8>,
    /// Files and symlinks written to the archive.
    pub entries: usize,
    /// Excluded directories pruned plus files dropped by the path check or
    /// because they are neither regular files nor symlinks.
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct ArchiveExporter {
    root: PathBuf,
    prefix: String,
    excludes: ExclusionSet,
}

impl ArchiveExporter {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>, excludes: ExclusionSet) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
            excludes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn excludes(&self) -> &ExclusionSet {
        &self.excludes
    }

    /// Walks the root and returns gzip-compressed tar bytes. Any unreadable
    /// directory or file fails the whole export.
    pub fn export(&self) -> io::Result<Archive> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder.follow_symlinks(false);

        let mut entries = 0;
        let mut skipped = 0;
        self.walk(&mut builder, &self.root, &mut entries, &mut skipped)?;

        let bytes = builder.into_inner()?.finish()?;
        Ok(Archive {
            bytes,
            entries,
            skipped,
        })
    }

    /// Runs [`export`](Self::export) on the blocking pool.
    pub async fn export_blocking(&self) -> Result<Archive, AppError> {
        let exporter = self.clone();
        let archive = tokio::task::spawn_blocking(move || exporter.export())
            .await
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Export task failed: {}", e)))?
            .map_err(|e| {
                tracing::error!(root = %self.root.display(), error = %e, "Archive export failed");
                AppError::from(e)
            })?;
        Ok(archive)
    }

    fn walk<W: Write>(
        &self,
        builder: &mut tar::Builder<W>,
        dir: &Path,
        entries: &mut usize,
        skipped: &mut usize,
    ) -> io::Result<()> {
        let mut children = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
        children.sort_by_key(|child| child.file_name());

        for child in children {
            let path = child.path();
            // Does not follow symlinks, so a link to a directory is not descended.
            let file_type = child.file_type()?;

            if file_type.is_dir() {
                if self.excludes.contains(&child.file_name()) {
                    tracing::debug!(path = %path.display(), "Pruning excluded directory");
                    *skipped += 1;
                    continue;
                }
                self.walk(builder, &path, entries, skipped)?;
                continue;
            }

            let relative = path
                .strip_prefix(&self.root)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            if self.excludes.matches_path(relative) {
                *skipped += 1;
                continue;
            }

            if !file_type.is_file() && !file_type.is_symlink() {
                tracing::debug!(path = %path.display(), "Skipping special file");
                *skipped += 1;
                continue;
            }

            let name = self.entry_name(relative)?;
            builder.append_path_with_name(&path, &name)?;
            *entries += 1;
        }

        Ok(())
    }

    fn entry_name(&self, relative: &Path) -> io::Result<PathBuf> {
        let mut name = PathBuf::from(&self.prefix);
        for component in relative.components() {
            match component {
                Component::Normal(segment) => name.push(segment),
                Component::CurDir => {}
                _ => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("refusing to archive path {}", relative.display()),
                    ))
                }
            }
        }
        Ok(name)
    }
}
