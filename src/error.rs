//! Error types for the SimpleIDE release packager.
//!
//! Resolution failures carry installation guidance for the Qt toolchain.
//! Filesystem and subprocess failures from later stages surface through
//! [`ReleaseError::Io`] or one of the stage-specific variants.

use camino::Utf8PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Where to fetch a compatible Qt release when qmake is missing or too old.
pub const QT_DOWNLOAD_HINT: &str = "download.qt.io/official_releases/qt/5.4/5.4.2";

/// Errors that can occur while producing a release package.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// The build tool is not present on the executable search path.
    #[error("{tool} was not found on PATH; Qt must be installed. Please install Qt 5.4 from {hint}")]
    ToolNotFound {
        /// Name of the missing executable.
        tool: String,
        /// Installation guidance.
        hint: &'static str,
    },

    /// The build tool exists but cannot provide Qt 5.
    #[error(
        "{tool} must be from Qt 5.4 or newer ({detail}); adjust PATH to include a Qt 5 build or install Qt 5.4 from {hint}"
    )]
    IncompatibleToolVersion {
        /// Path of the executable that was rejected.
        tool: Utf8PathBuf,
        /// What the version probe reported.
        detail: String,
        /// Installation guidance.
        hint: &'static str,
    },

    /// A tool whose output is required exited unsuccessfully.
    #[error("{tool} failed: {reason}")]
    ToolFailed {
        /// Program that failed.
        tool: String,
        /// Trimmed stderr, or a placeholder when it was empty.
        reason: String,
    },

    /// A build step exited unsuccessfully while strict mode was enabled.
    #[error("build step `{step}` exited with {status}")]
    BuildFailed {
        /// The command line that was run.
        step: String,
        /// Exit status reported by the process.
        status: ExitStatus,
    },

    /// The project file did not yield any version component.
    #[error("no VERSION= lines found in {path}")]
    VersionNotFound {
        /// Project file that was scanned.
        path: Utf8PathBuf,
    },

    /// A copy destination already exists and merging is not supported.
    #[error("destination {path} already exists")]
    DestinationExists {
        /// The conflicting path.
        path: Utf8PathBuf,
    },

    /// The release tree could not be materialised.
    #[error("staging failed: {reason}")]
    StagingFailed {
        /// Description of the staging failure.
        reason: String,
    },

    /// A path encountered on disk is not valid UTF-8.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the offending path.
        path: String,
    },

    /// Writing the zip archive failed.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

impl ReleaseError {
    /// Build a [`ReleaseError::ToolNotFound`] for `tool`.
    #[must_use]
    pub fn tool_not_found(tool: &str) -> Self {
        Self::ToolNotFound {
            tool: tool.to_owned(),
            hint: QT_DOWNLOAD_HINT,
        }
    }

    /// Build a [`ReleaseError::IncompatibleToolVersion`] for `tool`.
    #[must_use]
    pub fn incompatible(tool: Utf8PathBuf, detail: impl Into<String>) -> Self {
        Self::IncompatibleToolVersion {
            tool,
            detail: detail.into(),
            hint: QT_DOWNLOAD_HINT,
        }
    }
}

impl From<walkdir::Error> for ReleaseError {
    fn from(err: walkdir::Error) -> Self {
        let reason = err.to_string();
        match err.into_io_error() {
            Some(io) => Self::Io(io),
            None => Self::StagingFailed { reason },
        }
    }
}

/// Result type alias using [`ReleaseError`].
pub type Result<T> = std::result::Result<T, ReleaseError>;
