//! Error taxonomy for project file operations

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = FsError> = std::result::Result<T, E>;

/// Errors that can occur during project file operations
///
/// Every variant is scoped to a single call. The [`ProjectFiles`] handle that
/// produced it stays usable afterwards.
///
/// [`ProjectFiles`]: crate::ProjectFiles
#[derive(Debug, Error)]
pub enum FsError {
    /// The filename resolves to a location outside the project root
    #[error("'{name}' resolves outside the project root")]
    PathEscape {
        /// Filename as supplied by the caller
        name: String,
    },
    /// The filename is empty, absolute, or otherwise malformed
    #[error("invalid filename '{name}': {reason}")]
    InvalidName {
        /// Filename as supplied by the caller
        name: String,
        /// Why the name was rejected
        reason: &'static str,
    },
    /// The target file does not exist
    #[error("file '{name}' not found")]
    NotFound {
        /// Filename as supplied by the caller
        name: String,
    },
    /// The project root is missing, not a directory, or unreadable
    #[error("project directory {} is unavailable: {source}", .root.display())]
    DirectoryUnavailable {
        /// The configured project root
        root: std::path::PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
    /// The target exists and the caller did not ask to overwrite it
    #[error("file '{name}' already exists; set overwrite to true to replace it")]
    OverwriteRefused {
        /// Filename as supplied by the caller
        name: String,
    },
    /// IO failure while reading
    #[error("could not read '{name}': {source}")]
    Read {
        /// Filename as supplied by the caller
        name: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
    /// IO failure while writing or appending
    #[error("could not write '{name}': {source}")]
    Write {
        /// Filename as supplied by the caller
        name: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    /// The machine-readable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FsError::PathEscape { .. } => ErrorKind::PathEscape,
            FsError::InvalidName { .. } => ErrorKind::InvalidName,
            FsError::NotFound { .. } => ErrorKind::NotFound,
            FsError::DirectoryUnavailable { .. } => ErrorKind::DirectoryUnavailable,
            FsError::OverwriteRefused { .. } => ErrorKind::OverwriteRefused,
            FsError::Read { .. } => ErrorKind::Read,
            FsError::Write { .. } => ErrorKind::Write,
        }
    }

    pub(crate) fn path_escape(name: &str) -> Self {
        FsError::PathEscape {
            name: name.to_string(),
        }
    }

    pub(crate) fn invalid_name(name: &str, reason: &'static str) -> Self {
        FsError::InvalidName {
            name: name.to_string(),
            reason,
        }
    }

    pub(crate) fn not_found(name: &str) -> Self {
        FsError::NotFound {
            name: name.to_string(),
        }
    }

    pub(crate) fn overwrite_refused(name: &str) -> Self {
        FsError::OverwriteRefused {
            name: name.to_string(),
        }
    }

    pub(crate) fn read(name: &str, source: std::io::Error) -> Self {
        FsError::Read {
            name: name.to_string(),
            source,
        }
    }

    pub(crate) fn write(name: &str, source: std::io::Error) -> Self {
        FsError::Write {
            name: name.to_string(),
            source,
        }
    }
}

/// Kind of a [`FsError`], as reported to tool callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Security boundary violation
    PathEscape,
    /// Malformed filename
    InvalidName,
    /// Missing file
    NotFound,
    /// Missing or unreadable project root
    DirectoryUnavailable,
    /// Refused to replace an existing file
    OverwriteRefused,
    /// Read failure
    #[serde(rename = "read_error")]
    Read,
    /// Write failure
    #[serde(rename = "write_error")]
    Write,
}

impl ErrorKind {
    /// The snake_case name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::PathEscape => "path_escape",
            ErrorKind::InvalidName => "invalid_name",
            ErrorKind::NotFound => "not_found",
            ErrorKind::DirectoryUnavailable => "directory_unavailable",
            ErrorKind::OverwriteRefused => "overwrite_refused",
            ErrorKind::Read => "read_error",
            ErrorKind::Write => "write_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(FsError::path_escape("../x").kind(), ErrorKind::PathEscape);
        assert_eq!(
            FsError::overwrite_refused("a.scad").kind(),
            ErrorKind::OverwriteRefused
        );
        let io = std::io::Error::other("disk full");
        assert_eq!(FsError::write("a.scad", io).kind(), ErrorKind::Write);
    }

    #[test]
    fn test_kind_serializes_like_as_str() {
        for kind in [
            ErrorKind::PathEscape,
            ErrorKind::InvalidName,
            ErrorKind::NotFound,
            ErrorKind::DirectoryUnavailable,
            ErrorKind::OverwriteRefused,
            ErrorKind::Read,
            ErrorKind::Write,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.as_str().into()));
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn test_messages_name_the_file() {
        let msg = FsError::overwrite_refused("box.scad").to_string();
        assert!(msg.contains("box.scad"), "message: {msg}");
        assert!(msg.contains("overwrite"), "message: {msg}");

        let msg = FsError::invalid_name("", "filename is empty").to_string();
        assert_eq!(msg, "invalid filename '': filename is empty");
    }
}
