//! File operations confined to a project root.
//!
//! [`ProjectFiles`] is the only way this crate touches the filesystem. Every
//! filename goes through the [`PathResolver`] first; mutations of a single
//! path are serialized through [`PathLocks`].

use std::fs::{self, OpenOptions};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{FsError, Result};
use crate::listing::{ExtensionFilter, ListingEntry, is_hidden};
use crate::locks::PathLocks;
use crate::resolver::{PathResolver, ResolvedPath};

/// What a successful [`ProjectFiles::write_file`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteAction {
    /// The file did not exist and was created
    Created,
    /// An existing file was replaced
    Overwritten,
}

/// Result of a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOutcome {
    /// Whether the file was created or replaced
    pub action: WriteAction,
    /// Number of bytes written
    pub bytes: u64,
}

/// Result of a successful append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendOutcome {
    /// Number of bytes appended
    pub bytes: u64,
    /// File length after the append
    pub len: u64,
}

/// Sandboxed access to the files of one project directory.
#[derive(Debug)]
pub struct ProjectFiles {
    resolver: PathResolver,
    locks: PathLocks,
}

impl ProjectFiles {
    /// Open the project rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_resolver(PathResolver::new(root)?))
    }

    /// Build from an existing resolver.
    pub fn with_resolver(resolver: PathResolver) -> Self {
        Self {
            resolver,
            locks: PathLocks::new(),
        }
    }

    /// The canonical project root.
    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    /// List the immediate entries of the project root.
    ///
    /// Hidden entries are skipped. With a filter only `*.<ext>` entries are
    /// returned. Entries are sorted by name (byte order).
    pub fn list_files(&self, extension_filter: Option<&str>) -> Result<Vec<ListingEntry>> {
        let filter = extension_filter.and_then(ExtensionFilter::parse);
        tracing::debug!(filter = ?filter.as_ref().map(ExtensionFilter::extension), "list_files");

        let root = self.root();
        let unavailable = |source| FsError::DirectoryUnavailable {
            root: root.to_path_buf(),
            source,
        };

        let mut entries = Vec::new();
        for entry in fs::read_dir(root).map_err(unavailable)? {
            let entry = entry.map_err(unavailable)?;
            let Ok(name) = entry.file_name().into_string() else {
                tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 name");
                continue;
            };
            if is_hidden(&name) {
                continue;
            }
            if let Some(filter) = &filter
                && !filter.matches(&name)
            {
                continue;
            }

            // Follow symlinks so a linked directory lists as a directory.
            let is_dir = fs::metadata(entry.path())
                .map(|m| m.is_dir())
                .unwrap_or(false);
            entries.push(ListingEntry {
                name,
                is_dir,
                matches_filter: true,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Read a file as UTF-8 text.
    pub fn read_file(&self, filename: &str) -> Result<String> {
        let bytes = self.read_bytes(filename)?;
        String::from_utf8(bytes).map_err(|e| {
            FsError::read(
                filename,
                io::Error::new(io::ErrorKind::InvalidData, e.utf8_error()),
            )
        })
    }

    /// Read a file as opaque bytes.
    pub fn read_bytes(&self, filename: &str) -> Result<Vec<u8>> {
        tracing::debug!(filename = %filename, "read_file");
        let resolved = self.resolver.resolve(filename)?;
        let path = resolved.absolute();

        self.locks.with_lock(path, || {
            fs::read(path).map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => FsError::not_found(filename),
                _ => FsError::read(filename, e),
            })
        })
    }

    /// Write `content` to `filename`.
    ///
    /// An existing file is only replaced when `overwrite` is `true`;
    /// otherwise the call fails with [`FsError::OverwriteRefused`] and the
    /// file is left untouched. Replacement goes through a temporary file in
    /// the same directory, so a failed write never leaves partial content
    /// behind. Missing parent directories are created.
    pub fn write_file(
        &self,
        filename: &str,
        content: impl AsRef<[u8]>,
        overwrite: bool,
    ) -> Result<WriteOutcome> {
        let content = content.as_ref();
        tracing::debug!(filename = %filename, bytes = content.len(), overwrite, "write_file");
        let resolved = self.resolver.resolve(filename)?;
        let path = resolved.absolute();

        let outcome = self.locks.with_lock(path, || {
            let existing = match fs::symlink_metadata(path) {
                Ok(metadata) if metadata.is_dir() => {
                    return Err(FsError::write(
                        filename,
                        io::Error::other("target is a directory"),
                    ));
                }
                Ok(metadata) => Some(metadata.permissions()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => None,
                Err(e) => return Err(FsError::write(filename, e)),
            };
            if existing.is_some() && !overwrite {
                return Err(FsError::overwrite_refused(filename));
            }
            if let Some(permissions) = &existing
                && permissions.readonly()
            {
                return Err(FsError::write(
                    filename,
                    io::Error::new(io::ErrorKind::PermissionDenied, "target is read-only"),
                ));
            }

            let staged = stage(&resolved, content, existing.as_ref())
                .map_err(|e| FsError::write(filename, e))?;
            if existing.is_some() {
                staged
                    .persist(path)
                    .map_err(|e| FsError::write(filename, e.error))?;
                Ok(WriteAction::Overwritten)
            } else {
                // Another process may have created the file since the check.
                staged.persist_noclobber(path).map_err(|e| {
                    if e.error.kind() == io::ErrorKind::AlreadyExists {
                        FsError::overwrite_refused(filename)
                    } else {
                        FsError::write(filename, e.error)
                    }
                })?;
                Ok(WriteAction::Created)
            }
        });

        match outcome {
            Ok(action) => {
                tracing::info!(path = %resolved.relative().display(), bytes = content.len(), ?action, "file written");
                Ok(WriteOutcome {
                    action,
                    bytes: content.len() as u64,
                })
            }
            Err(e) => {
                tracing::warn!(filename = %filename, error = %e, "write refused");
                Err(e)
            }
        }
    }

    /// Append `content` to the end of an existing file.
    ///
    /// Never creates the file: a missing target fails with
    /// [`FsError::NotFound`].
    pub fn append_to_file(
        &self,
        filename: &str,
        content: impl AsRef<[u8]>,
    ) -> Result<AppendOutcome> {
        let content = content.as_ref();
        tracing::debug!(filename = %filename, bytes = content.len(), "append_to_file");
        let resolved = self.resolver.resolve(filename)?;
        let path = resolved.absolute();

        let outcome = self.locks.with_lock(path, || {
            let mut file = OpenOptions::new()
                .append(true)
                .open(path)
                .map_err(|e| match e.kind() {
                    io::ErrorKind::NotFound => FsError::not_found(filename),
                    _ => FsError::write(filename, e),
                })?;

            let write = |file: &mut fs::File| -> io::Result<u64> {
                if file.metadata()?.is_dir() {
                    return Err(io::Error::other("target is a directory"));
                }
                file.write_all(content)?;
                file.flush()?;
                Ok(file.metadata()?.len())
            };
            write(&mut file).map_err(|e| FsError::write(filename, e))
        });

        match outcome {
            Ok(len) => {
                tracing::info!(path = %resolved.relative().display(), bytes = content.len(), len, "file appended");
                Ok(AppendOutcome {
                    bytes: content.len() as u64,
                    len,
                })
            }
            Err(e) => {
                tracing::warn!(filename = %filename, error = %e, "append failed");
                Err(e)
            }
        }
    }
}

/// Write `content` to a temporary file next to the target.
///
/// The staged file takes over `existing` permissions when replacing a file.
/// New files get the mode a plain create would give them (0666 minus umask).
fn stage(
    resolved: &ResolvedPath,
    content: &[u8],
    existing: Option<&fs::Permissions>,
) -> io::Result<NamedTempFile> {
    let parent = resolved
        .absolute()
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(PathBuf::new);
    fs::create_dir_all(&parent)?;

    let mut builder = tempfile::Builder::new();
    builder.prefix(".scadbox-").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut staged = builder.tempfile_in(&parent)?;
    staged.write_all(content)?;
    if let Some(permissions) = existing {
        staged.as_file().set_permissions(permissions.clone())?;
    }
    staged.as_file().sync_all()?;
    Ok(staged)
}
