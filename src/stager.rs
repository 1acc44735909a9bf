//! Release tree staging.
//!
//! Materialises the package directory from the release template, adds the
//! Linux setup and launcher scripts, and copies the translation catalogues.
//! Files are copied with their permissions and timestamps.

use crate::config::SourceLayout;
use crate::error::{ReleaseError, Result};
use crate::version::PackagePath;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use std::fs::{self, File, FileTimes};
use std::io::ErrorKind;
use walkdir::WalkDir;

/// Mode of the setup script at the package root.
pub const SETUP_SCRIPT_MODE: u32 = 0o744;

/// Mode of the launcher script next to the binary.
pub const LAUNCHER_SCRIPT_MODE: u32 = 0o755;

/// Mode of the IDE executable in `bin/`.
pub const BINARY_MODE: u32 = 0o755;

/// Handles staging of the release tree into the package directory.
pub struct Stager {
    package: PackagePath,
    template_dir: Utf8PathBuf,
    setup_script: Utf8PathBuf,
    launcher_script: Utf8PathBuf,
    translations_dir: Utf8PathBuf,
}

impl Stager {
    /// Create a stager copying from `source` into `package`.
    #[must_use]
    pub fn new(source: &SourceLayout, package: PackagePath) -> Self {
        Self {
            package,
            template_dir: source.release_template_dir(),
            setup_script: source.setup_script(),
            launcher_script: source.launcher_script(),
            translations_dir: source.translations_dir(),
        }
    }

    /// The package being staged.
    #[must_use]
    pub fn package(&self) -> &PackagePath {
        &self.package
    }

    /// Run every staging step in order.
    ///
    /// # Errors
    ///
    /// Returns the first filesystem error encountered; the package directory
    /// is left as far as it got.
    pub fn stage(&self) -> Result<()> {
        self.prepare()?;
        self.mirror_template()?;
        self.install_scripts()?;
        self.copy_translations()?;
        Ok(())
    }

    /// Remove any previous package directory and create it afresh.
    ///
    /// A missing package directory is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if removal or creation fails.
    pub fn prepare(&self) -> Result<()> {
        let path = self.package.path();
        match fs::remove_dir_all(path) {
            Ok(()) => debug!("removed previous package at {path}"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::create_dir_all(path)?;
        Ok(())
    }

    /// Mirror the release template into the package directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be walked or a copy fails.
    pub fn mirror_template(&self) -> Result<usize> {
        let copied = copy_tree(&self.template_dir, self.package.path())?;
        info!("mirrored {copied} template file(s) into {}", self.package.path());
        Ok(copied)
    }

    /// Copy the setup and launcher scripts and mark them executable.
    ///
    /// The setup script lands at the package root, the launcher in `bin/`.
    ///
    /// # Errors
    ///
    /// Returns an error if a script cannot be copied or its mode set.
    pub fn install_scripts(&self) -> Result<()> {
        let bin_dir = self.package.bin_dir();
        fs::create_dir_all(&bin_dir)?;

        let setup = install_file(&self.setup_script, self.package.path())?;
        set_mode(&setup, SETUP_SCRIPT_MODE)?;

        let launcher = install_file(&self.launcher_script, &bin_dir)?;
        set_mode(&launcher, LAUNCHER_SCRIPT_MODE)?;
        Ok(())
    }

    /// Copy the compiled IDE binary into `bin/` and mark it executable.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::StagingFailed`] when `binary` was never built,
    /// or any copy error.
    pub fn install_binary(&self, binary: &Utf8Path) -> Result<Utf8PathBuf> {
        if !binary.is_file() {
            return Err(ReleaseError::StagingFailed {
                reason: format!("IDE binary {binary} was not built"),
            });
        }
        let bin_dir = self.package.bin_dir();
        fs::create_dir_all(&bin_dir)?;

        let target = install_file(binary, &bin_dir)?;
        set_mode(&target, BINARY_MODE)?;
        info!("installed {target}");
        Ok(target)
    }

    /// Copy the translation catalogues into `translations/`.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::DestinationExists`] if the package already has
    /// a `translations/` directory, or any copy error.
    pub fn copy_translations(&self) -> Result<usize> {
        let destination = self.package.translations_dir();
        if destination.symlink_metadata().is_ok() {
            return Err(ReleaseError::DestinationExists { path: destination });
        }
        copy_tree(&self.translations_dir, &destination)
    }
}

/// Recursively copy `source` into `destination`, preserving the relative
/// layout and each file's permissions and timestamps.
///
/// Symlinks to files are copied as regular files; symlinked directories are
/// not descended into. Returns the number of files copied.
///
/// # Errors
///
/// Returns an error if `source` cannot be walked or any copy fails.
pub fn copy_tree(source: &Utf8Path, destination: &Utf8Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| ReleaseError::StagingFailed {
                reason: format!("{} is outside {source}: {e}", entry.path().display()),
            })?;
        let target = destination.as_std_path().join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if fs::metadata(entry.path()).is_ok_and(|meta| meta.is_file()) {
            copy_with_metadata(entry.path(), &target)?;
            copied += 1;
        } else {
            debug!("skipping {}", entry.path().display());
        }
    }
    Ok(copied)
}

fn install_file(source: &Utf8Path, dir: &Utf8Path) -> Result<Utf8PathBuf> {
    let name = source.file_name().ok_or_else(|| ReleaseError::StagingFailed {
        reason: format!("{source} has no file name"),
    })?;
    let target = dir.join(name);
    copy_with_metadata(source.as_std_path(), target.as_std_path())?;
    Ok(target)
}

fn copy_with_metadata(source: &std::path::Path, target: &std::path::Path) -> Result<()> {
    fs::copy(source, target)?;
    let meta = fs::metadata(source)?;
    let times = FileTimes::new()
        .set_accessed(meta.accessed()?)
        .set_modified(meta.modified()?);
    File::open(target)?.set_times(times)?;
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Utf8Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Utf8Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(all(test, unix))]
#[path = "stager_tests.rs"]
mod tests;
