//! Package version extraction.
//!
//! The qmake project declares its version across several `VERSION=` lines
//! (major, minor, build). They are joined with `.` in file order to name the
//! package directory, e.g. `SimpleIDE-1.1.2`.

use crate::config::APP_NAME;
use crate::error::{ReleaseError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;

/// Marker preceding each version component in the project file.
pub const VERSION_MARKER: &str = "VERSION=";

/// Join the `VERSION=` components found in `contents`.
///
/// Every line containing the marker contributes the trimmed text that
/// follows it. No numeric validation is performed; a file without markers
/// yields an empty string.
///
/// # Examples
///
/// ```
/// use simpleide_release::version::extract_version;
///
/// assert_eq!(extract_version("VERSION=1\nVERSION=2\n"), "1.2");
/// assert_eq!(extract_version("TEMPLATE = app\n"), "");
/// ```
#[must_use]
pub fn extract_version(contents: &str) -> String {
    contents
        .lines()
        .filter_map(|line| line.trim().split(VERSION_MARKER).nth(1))
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(".")
}

/// Read `project_file` and join its version components.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_version(project_file: &Utf8Path) -> Result<String> {
    let contents = fs::read_to_string(project_file)?;
    let version = extract_version(&contents);
    debug!("{project_file} declares version {version:?}");
    Ok(version)
}

/// The versioned package directory, `<build_root>/<AppName>-<version>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePath {
    name: String,
    path: Utf8PathBuf,
}

impl PackagePath {
    /// Name the package for `version` under `build_root`.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::VersionNotFound`] when `version` is empty;
    /// `project_file` is only used for the error message.
    pub fn new(build_root: &Utf8Path, version: &str, project_file: &Utf8Path) -> Result<Self> {
        if version.is_empty() {
            return Err(ReleaseError::VersionNotFound {
                path: project_file.to_owned(),
            });
        }
        let name = format!("{APP_NAME}-{version}");
        let path = build_root.join(&name);
        Ok(Self { name, path })
    }

    /// Read the version from `project_file` and name the package.
    ///
    /// # Errors
    ///
    /// Returns an error if the project file cannot be read or declares no
    /// version.
    pub fn from_project_file(build_root: &Utf8Path, project_file: &Utf8Path) -> Result<Self> {
        let version = read_version(project_file)?;
        Self::new(build_root, &version, project_file)
    }

    /// Directory name, e.g. `SimpleIDE-1.1.2`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full path of the package directory.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Executable directory inside the package.
    #[must_use]
    pub fn bin_dir(&self) -> Utf8PathBuf {
        self.path.join("bin")
    }

    /// Translations directory inside the package.
    #[must_use]
    pub fn translations_dir(&self) -> Utf8PathBuf {
        self.path.join("translations")
    }
}
