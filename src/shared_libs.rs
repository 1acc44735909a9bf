//! Runtime library bundling.
//!
//! `ldd` lists the shared objects the IDE binary links against. Qt and
//! NAS audio libraries are copied next to the binary so the package runs on
//! hosts without a matching Qt installation.

use crate::error::{ReleaseError, Result};
use crate::exec::{CommandExecutor, ToolInvocation, stderr_message};
use crate::output::write_stderr_line;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;
use std::io::Write;

/// Program used to list dynamic dependencies.
pub const LDD: &str = "ldd";

/// Substrings selecting the libraries that are bundled.
pub const LIBRARY_MARKERS: &[&str] = &["libQt", "libaudio"];

/// Pick the resolved paths of bundled libraries out of `ldd` output.
///
/// A line qualifies when it contains one of [`LIBRARY_MARKERS`]; its third
/// whitespace-separated token is the library path (`name => path (address)`).
///
/// # Errors
///
/// Returns [`ReleaseError::StagingFailed`] when `ldd` reports a qualifying
/// library as `not found`, or prints a qualifying line without a third token
/// (such as the bare `/path/libQt5Core.so.5 (address)` form).
///
/// # Examples
///
/// ```
/// use simpleide_release::shared_libs::parse_ldd_output;
///
/// let output = "\tlibQt5Core.so.5 => /opt/Qt/lib/libQt5Core.so.5 (0x00007f)\n\
///               \tlibc.so.6 => /lib/x86_64-linux-gnu/libc.so.6 (0x00007e)\n";
/// let libs = parse_ldd_output(output)?;
/// assert_eq!(libs, ["/opt/Qt/lib/libQt5Core.so.5"]);
/// # Ok::<(), simpleide_release::error::ReleaseError>(())
/// ```
pub fn parse_ldd_output(output: &str) -> Result<Vec<Utf8PathBuf>> {
    let mut libraries = Vec::new();
    for line in output.lines() {
        if !LIBRARY_MARKERS.iter().any(|marker| line.contains(marker)) {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [name, "=>", "not", "found", ..] => {
                return Err(ReleaseError::StagingFailed {
                    reason: format!("{LDD} could not resolve {name}"),
                });
            }
            [_, _, path, ..] => libraries.push(Utf8PathBuf::from(*path)),
            _ => {
                return Err(ReleaseError::StagingFailed {
                    reason: format!("unexpected {LDD} line for a bundled library: {}", line.trim()),
                });
            }
        }
    }
    Ok(libraries)
}

/// Copies the bundled runtime libraries of a binary into a directory.
pub struct LibraryCollector<'a> {
    executor: &'a dyn CommandExecutor,
}

impl<'a> LibraryCollector<'a> {
    /// Create a collector running `ldd` through `executor`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor) -> Self {
        Self { executor }
    }

    /// List the bundled libraries `binary` links against.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::ToolFailed`] when `ldd` exits unsuccessfully,
    /// or any error from [`parse_ldd_output`].
    pub fn list(&self, binary: &Utf8Path, stderr: &mut dyn Write) -> Result<Vec<Utf8PathBuf>> {
        let invocation = ToolInvocation::new(LDD).arg(binary.as_str());
        write_stderr_line(stderr, &invocation);

        let output = self.executor.run(&invocation)?;
        if !output.status.success() {
            return Err(ReleaseError::ToolFailed {
                tool: LDD.to_owned(),
                reason: stderr_message(&output),
            });
        }
        parse_ldd_output(&String::from_utf8_lossy(&output.stdout))
    }

    /// Copy the bundled libraries of `binary` into `bin_dir`, returning the
    /// copied destinations.
    ///
    /// Symlinks are followed; each library lands under the file name `ldd`
    /// reported.
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails or a library cannot be copied.
    pub fn collect(
        &self,
        binary: &Utf8Path,
        bin_dir: &Utf8Path,
        stderr: &mut dyn Write,
    ) -> Result<Vec<Utf8PathBuf>> {
        let libraries = self.list(binary, stderr)?;
        fs::create_dir_all(bin_dir)?;

        libraries
            .iter()
            .map(|library| copy_library(library, bin_dir))
            .collect()
    }
}

fn copy_library(library: &Utf8Path, bin_dir: &Utf8Path) -> Result<Utf8PathBuf> {
    let name = library.file_name().ok_or_else(|| ReleaseError::StagingFailed {
        reason: format!("library path {library} has no file name"),
    })?;
    let destination = bin_dir.join(name);
    fs::copy(library, &destination).map_err(|e| ReleaseError::StagingFailed {
        reason: format!("failed to copy {library} to {destination}: {e}"),
    })?;
    debug!("bundled {library}");
    Ok(destination)
}
