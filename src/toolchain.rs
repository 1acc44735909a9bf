//! Qt toolchain resolution.
//!
//! Locates `qmake` on the executable search path and checks that it can build
//! against Qt 5. Distribution packages often install `qmake` as a symlink to
//! `qtchooser`, which multiplexes several Qt versions; in that case the
//! chooser is asked which versions it knows and Qt 5 is selected explicitly on
//! every later invocation.

use crate::error::{ReleaseError, Result};
use crate::exec::{CommandExecutor, ToolInvocation, stderr_message};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use std::ffi::{OsStr, OsString};
use std::path::Path;

/// Name of the build tool looked up on the search path.
pub const QMAKE: &str = "qmake";

/// File name of the Qt version multiplexer.
pub const QTCHOOSER: &str = "qtchooser";

/// Argument that makes `qtchooser` dispatch to Qt 5.
pub const QT5_SELECTOR: &str = "-qt=5";

/// A `qmake` that is known to target Qt 5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QtToolchain {
    path: Utf8PathBuf,
    real_path: Utf8PathBuf,
    selector: Option<&'static str>,
}

impl QtToolchain {
    /// Find `qmake` on `search_path` and verify it provides Qt 5.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::ToolNotFound`] when no executable `qmake` is on
    /// the search path, [`ReleaseError::IncompatibleToolVersion`] when neither
    /// the binary nor its chooser can provide Qt 5, and
    /// [`ReleaseError::ToolFailed`] when a version probe exits unsuccessfully.
    pub fn resolve(search_path: &OsStr, executor: &dyn CommandExecutor) -> Result<Self> {
        let path = find_executable(QMAKE, search_path)
            .ok_or_else(|| ReleaseError::tool_not_found(QMAKE))?;
        let real_path = canonicalize_utf8(&path)?;
        debug!("found {QMAKE} at {path} (resolves to {real_path})");

        let selector = if real_path.file_name() == Some(QTCHOOSER) {
            select_qt5_from_chooser(&real_path, executor)?;
            Some(QT5_SELECTOR)
        } else {
            verify_qt5_version(&path, executor)?;
            None
        };

        info!("using {path} for Qt 5 builds");
        Ok(Self {
            path,
            real_path,
            selector,
        })
    }

    /// The `qmake` path as found on the search path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// The `qmake` path with all symlinks resolved.
    #[must_use]
    pub fn real_path(&self) -> &Utf8Path {
        &self.real_path
    }

    /// Whether Qt 5 is selected through `qtchooser`.
    #[must_use]
    pub fn uses_chooser(&self) -> bool {
        self.selector.is_some()
    }

    /// Base invocation for every `qmake` run, including the Qt 5 selector when
    /// a chooser is involved.
    ///
    /// The unresolved path is used because `qtchooser` dispatches on the name
    /// it was invoked as.
    #[must_use]
    pub fn qmake_invocation(&self) -> ToolInvocation {
        ToolInvocation::new(self.path.as_str()).args(self.selector)
    }
}

/// The host's executable search path (`PATH`), empty when unset.
#[must_use]
pub fn host_search_path() -> OsString {
    std::env::var_os("PATH").unwrap_or_default()
}

/// Find the first executable regular file called `name` in `search_path`.
///
/// Entries are scanned in order; surrounding double quotes on an entry are
/// ignored and non-UTF-8 entries are skipped.
#[must_use]
pub fn find_executable(name: &str, search_path: &OsStr) -> Option<Utf8PathBuf> {
    std::env::split_paths(search_path)
        .filter_map(|dir| Utf8PathBuf::try_from(dir).ok())
        .map(|dir| Utf8PathBuf::from(dir.as_str().trim_matches('"')))
        .filter(|dir| !dir.as_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate.as_std_path()))
}

fn select_qt5_from_chooser(chooser: &Utf8Path, executor: &dyn CommandExecutor) -> Result<()> {
    let output = probe(chooser, "-list-versions", executor)?;
    let versions: Vec<&str> = output.split_whitespace().collect();
    debug!("{QTCHOOSER} offers {versions:?}");

    if versions.iter().any(|&v| v == "5" || v == "qt5") {
        Ok(())
    } else {
        Err(ReleaseError::incompatible(
            chooser.to_owned(),
            format!("{QTCHOOSER} offers only: {}", versions.join(" ")),
        ))
    }
}

fn verify_qt5_version(qmake: &Utf8Path, executor: &dyn CommandExecutor) -> Result<()> {
    let output = probe(qmake, "-version", executor)?;
    if reports_qt5(&output) {
        Ok(())
    } else {
        Err(ReleaseError::incompatible(
            qmake.to_owned(),
            output.trim().replace('\n', "; "),
        ))
    }
}

/// Whether `qmake -version` output names Qt 5.
///
/// Matching is case-insensitive and accepts either a `qt5` token (install
/// paths such as `/usr/lib/qt5`) or the `Using Qt version 5.x` banner.
#[must_use]
pub fn reports_qt5(version_output: &str) -> bool {
    let lowered = version_output.to_lowercase();
    lowered.contains("qt5") || lowered.contains("qt version 5.")
}

fn probe(tool: &Utf8Path, flag: &str, executor: &dyn CommandExecutor) -> Result<String> {
    let output = executor.run(&ToolInvocation::new(tool.as_str()).arg(flag))?;
    if !output.status.success() {
        return Err(ReleaseError::ToolFailed {
            tool: tool.to_string(),
            reason: stderr_message(&output),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn canonicalize_utf8(path: &Utf8Path) -> Result<Utf8PathBuf> {
    let real = std::fs::canonicalize(path)?;
    Utf8PathBuf::try_from(real).map_err(|e| ReleaseError::NonUtf8Path {
        path: e.as_path().display().to_string(),
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
