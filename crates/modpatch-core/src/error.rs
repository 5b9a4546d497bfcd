//! Error types for the modpatch-core library.
//!
//! This module provides comprehensive error handling using the `thiserror` crate,
//! with detailed error variants for different failure modes.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for modpatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all modpatch operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to create output directory
    #[error("failed to create directory '{path}': {source}")]
    DirectoryCreate {
        /// Path to the directory that failed to create
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to enumerate a directory
    #[error("failed to read directory '{path}': {source}")]
    DirectoryRead {
        /// Path to the directory that failed to enumerate
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O failure while reading an executable image
    #[error("failed to read image at offset {offset:#x}: {source}")]
    ImageRead {
        /// Byte offset of the failed read
        offset: usize,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid or corrupt executable image
    #[error("malformed executable image at offset {offset:#x}: {details}")]
    MalformedImage {
        /// Byte offset where the error occurred
        offset: usize,
        /// Detailed description of the issue
        details: String,
    },

    /// No target executable found in the installation root
    #[error("no target executable (.exe) found in '{dir}'")]
    ExecutableNotFound {
        /// Directory that was searched
        dir: PathBuf,
    },

    /// The game's data directory does not exist
    #[error("game data directory '{path}' not found")]
    DataDirectoryNotFound {
        /// Expected data directory path
        path: PathBuf,
    },

    /// An embedded resource required for installation is missing
    #[error("embedded resource '{key}' not found")]
    ResourceNotFound {
        /// Registry key of the missing resource
        key: String,
    },

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new directory creation error
    pub fn directory_create(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreate {
            path: path.into(),
            source,
        }
    }

    /// Creates a new directory enumeration error
    pub fn directory_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new image read error
    pub fn image_read(offset: usize, source: std::io::Error) -> Self {
        Self::ImageRead { offset, source }
    }

    /// Creates a new malformed image error
    pub fn malformed_image(offset: usize, details: impl Into<String>) -> Self {
        Self::MalformedImage {
            offset,
            details: details.into(),
        }
    }

    /// Creates a new missing resource error
    pub fn resource_not_found(key: impl Into<String>) -> Self {
        Self::ResourceNotFound { key: key.into() }
    }

    /// Creates a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if this error must abort the patch run.
    ///
    /// Inspection-stage failures (unreadable or malformed images) degrade to
    /// an "unknown" report; installation-stage failures are fatal because the
    /// proxy and configuration are the whole point of the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::FileRead { .. } | Self::ImageRead { .. } | Self::MalformedImage { .. }
        )
    }
}
