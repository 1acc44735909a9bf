//! Zip packaging of the staged release.
//!
//! The package directory is stored under its own name inside the archive so
//! that unpacking yields `SimpleIDE-<version>/...`. Unix permission bits are
//! preserved, keeping the setup and launcher scripts executable.

use crate::error::{ReleaseError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use std::fs::{self, File};
use std::io;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Summary of a written archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOutput {
    /// Where the archive was written.
    pub archive_path: Utf8PathBuf,
    /// Number of regular files stored.
    pub files: usize,
}

/// Compress `package_dir` into a zip file at `archive_path`.
///
/// An existing archive is replaced. Missing parent directories of
/// `archive_path` are created.
///
/// # Errors
///
/// Returns [`ReleaseError::StagingFailed`] if `archive_path` lies inside
/// `package_dir`. Otherwise returns an error if the package cannot be
/// walked, contains a non-UTF-8 path, or the archive cannot be written.
pub fn create_archive(package_dir: &Utf8Path, archive_path: &Utf8Path) -> Result<ArchiveOutput> {
    let root_name = package_dir.file_name().ok_or_else(|| ReleaseError::StagingFailed {
        reason: format!("package directory {package_dir} has no name"),
    })?;

    if archive_path.starts_with(package_dir) {
        return Err(ReleaseError::StagingFailed {
            reason: format!("archive {archive_path} must not be inside the package {package_dir}"),
        });
    }

    if let Some(parent) = archive_path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut zip = ZipWriter::new(File::create(archive_path)?);
    let mut files = 0;

    for entry in WalkDir::new(package_dir).sort_by_file_name() {
        let entry = entry?;
        let path = Utf8Path::from_path(entry.path()).ok_or_else(|| ReleaseError::NonUtf8Path {
            path: entry.path().display().to_string(),
        })?;
        let name = entry_name(root_name, package_dir, path)?;
        let options = entry_options(unix_mode(path)?);

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{name}/"), options)?;
        } else {
            zip.start_file(name.as_str(), options)?;
            io::copy(&mut File::open(path)?, &mut zip)?;
            files += 1;
            debug!("archived {name}");
        }
    }

    zip.finish()?;
    info!("wrote {files} file(s) to {archive_path}");
    Ok(ArchiveOutput {
        archive_path: archive_path.to_owned(),
        files,
    })
}

/// Resolve the archive location: relative paths are taken relative to
/// `build_root`.
#[must_use]
pub fn resolve_archive_path(build_root: &Utf8Path, requested: &Utf8Path) -> Utf8PathBuf {
    if requested.is_absolute() {
        requested.to_owned()
    } else {
        build_root.join(requested)
    }
}

fn entry_options(mode: u32) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(mode)
}

fn entry_name(root_name: &str, package_dir: &Utf8Path, path: &Utf8Path) -> Result<String> {
    let relative = path
        .strip_prefix(package_dir)
        .map_err(|e| ReleaseError::StagingFailed {
            reason: format!("{path} is outside {package_dir}: {e}"),
        })?;
    let mut name = root_name.to_owned();
    for component in relative.components() {
        name.push('/');
        name.push_str(component.as_str());
    }
    Ok(name)
}

#[cfg(unix)]
fn unix_mode(path: &Utf8Path) -> Result<u32> {
    use std::os::unix::fs::PermissionsExt;

    Ok(fs::metadata(path)?.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn unix_mode(path: &Utf8Path) -> Result<u32> {
    Ok(if path.is_dir() { 0o755 } else { 0o644 })
}
