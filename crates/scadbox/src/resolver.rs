//! Confines caller-supplied filenames to the project root.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{FsError, Result};

/// A filename that has been validated to lie inside the project root.
///
/// Produced fresh for every operation and never cached: the filesystem may
/// change between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    absolute: PathBuf,
    relative: PathBuf,
}

impl ResolvedPath {
    /// Absolute path with symlinks in the existing prefix resolved.
    pub fn absolute(&self) -> &Path {
        &self.absolute
    }

    /// Path relative to the project root.
    pub fn relative(&self) -> &Path {
        &self.relative
    }
}

/// Resolves filenames against a fixed project root.
///
/// The root is canonicalized once at construction and never changes.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Create a resolver for the given project root.
    ///
    /// Fails with [`FsError::DirectoryUnavailable`] if the root does not exist
    /// or is not a directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let unavailable = |source| FsError::DirectoryUnavailable {
            root: root.to_path_buf(),
            source,
        };

        let canonical = fs::canonicalize(root).map_err(unavailable)?;
        let metadata = fs::metadata(&canonical).map_err(unavailable)?;
        if !metadata.is_dir() {
            return Err(unavailable(io::Error::other("not a directory")));
        }

        Ok(Self { root: canonical })
    }

    /// The canonical project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a caller-supplied filename to a path inside the project root.
    ///
    /// The name is first normalized lexically (`.` dropped, `..` collapsed),
    /// then the deepest existing ancestor is canonicalized so that symlinks
    /// pointing out of the project are caught even for files that do not
    /// exist yet.
    pub fn resolve(&self, name: &str) -> Result<ResolvedPath> {
        let relative = normalize(name)?;
        let absolute = self.confine(name, &self.root.join(&relative))?;

        let relative = absolute
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .map_err(|_| FsError::path_escape(name))?;
        if relative.as_os_str().is_empty() {
            return Err(FsError::invalid_name(name, "filename names the project root"));
        }

        Ok(ResolvedPath { absolute, relative })
    }

    fn confine(&self, name: &str, candidate: &Path) -> Result<PathBuf> {
        // Walk up to the deepest ancestor that exists (or is a symlink).
        let mut existing = candidate;
        let mut tail = Vec::new();
        while fs::symlink_metadata(existing).is_err() {
            let (Some(parent), Some(file_name)) = (existing.parent(), existing.file_name()) else {
                return Err(FsError::path_escape(name));
            };
            tail.push(file_name);
            existing = parent;
        }

        // A dangling symlink can't be verified to stay inside, so it is refused.
        let mut canonical = fs::canonicalize(existing).map_err(|e| {
            tracing::debug!(path = %existing.display(), error = %e, "cannot canonicalize");
            FsError::path_escape(name)
        })?;
        for part in tail.into_iter().rev() {
            canonical.push(part);
        }

        if canonical.starts_with(&self.root) {
            Ok(canonical)
        } else {
            tracing::warn!(name = %name, resolved = %canonical.display(), "path escape rejected");
            Err(FsError::path_escape(name))
        }
    }
}

/// Lexically normalize a relative filename.
fn normalize(name: &str) -> Result<PathBuf> {
    if name.trim().is_empty() {
        return Err(FsError::invalid_name(name, "filename is empty"));
    }
    if name.contains('\0') {
        return Err(FsError::invalid_name(name, "filename contains a NUL byte"));
    }

    let mut parts = Vec::new();
    for component in Path::new(name).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                return Err(FsError::path_escape(name));
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(FsError::path_escape(name));
                }
            }
            Component::Normal(part) => parts.push(part),
        }
    }

    if parts.is_empty() {
        return Err(FsError::invalid_name(name, "filename names the project root"));
    }
    Ok(parts.into_iter().collect())
}
