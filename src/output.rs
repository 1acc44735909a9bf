//! Output formatting for the release packager CLI.
//!
//! Progress lines and the dry-run summary are written to a caller-supplied
//! writer (stderr in the binary) so tests can capture them.

use camino::Utf8Path;
use std::io::Write;

/// Write a single line, ignoring failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Announce the package version being produced.
#[must_use]
pub fn version_banner(package_name: &str) -> String {
    format!("Creating Version {package_name}")
}

/// Format a success message after packaging.
#[must_use]
pub fn success_message(package_dir: &Utf8Path, archive: Option<&Utf8Path>) -> String {
    match archive {
        Some(archive) => format!("Release staged in {package_dir} and archived to {archive}"),
        None => format!("Release staged in {package_dir}"),
    }
}

/// Format the number of bundled runtime libraries.
#[must_use]
pub fn libraries_message(count: usize, bin_dir: &Utf8Path) -> String {
    let plural = if count == 1 { "library" } else { "libraries" };
    format!("Copied {count} runtime {plural} into {bin_dir}")
}

/// Configuration information for dry-run output.
///
/// # Example
///
/// ```
/// use camino::Utf8PathBuf;
/// use simpleide_release::output::DryRunInfo;
///
/// let source = Utf8PathBuf::from("/src/SimpleIDE");
/// let build = Utf8PathBuf::from("/src/SimpleIDE/build");
/// let package = Utf8PathBuf::from("/src/SimpleIDE/build/SimpleIDE-1.1.2");
/// let propgcc = Utf8PathBuf::from("/opt/parallax");
///
/// let info = DryRunInfo {
///     source_root: &source,
///     build_root: &build,
///     package_dir: &package,
///     archive_path: None,
///     qmake: "/usr/bin/qmake -qt=5",
///     jobs: 9,
///     strict: false,
///     propgcc_path: &propgcc,
/// };
///
/// let output = info.display_text();
/// assert!(output.contains("Dry run"));
/// assert!(output.contains("SimpleIDE-1.1.2"));
/// ```
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// Source checkout root.
    pub source_root: &'a Utf8Path,
    /// Build output root.
    pub build_root: &'a Utf8Path,
    /// Package directory that would be created.
    pub package_dir: &'a Utf8Path,
    /// Archive that would be written, if any.
    pub archive_path: Option<&'a Utf8Path>,
    /// The qmake command line.
    pub qmake: &'a str,
    /// Parallel make jobs.
    pub jobs: usize,
    /// Whether build failures abort the run.
    pub strict: bool,
    /// PropGCC installation path.
    pub propgcc_path: &'a Utf8Path,
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let archive = self
            .archive_path
            .map_or_else(|| "(skipped)".to_owned(), ToString::to_string);

        [
            "Dry run - no files will be modified".to_owned(),
            String::new(),
            format!("Source root: {}", self.source_root),
            format!("Build root: {}", self.build_root),
            format!("Package directory: {}", self.package_dir),
            format!("Archive: {archive}"),
            format!("qmake: {}", self.qmake),
            format!("Parallel jobs: {}", self.jobs),
            format!("Strict build: {}", self.strict),
            format!("PropGCC: {}", self.propgcc_path),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};

    #[fixture]
    fn package_dir() -> Utf8PathBuf {
        Utf8PathBuf::from("/tmp/out/SimpleIDE-2.0.1")
    }

    #[rstest]
    fn success_message_mentions_archive_when_present(package_dir: Utf8PathBuf) {
        let archive = Utf8PathBuf::from("/tmp/out/SimpleIDE.zip");
        let msg = success_message(&package_dir, Some(&archive));
        assert!(msg.contains("SimpleIDE-2.0.1"));
        assert!(msg.contains("SimpleIDE.zip"));
    }

    #[rstest]
    fn success_message_without_archive(package_dir: Utf8PathBuf) {
        let msg = success_message(&package_dir, None);
        assert!(!msg.contains("archived"));
    }

    #[rstest]
    #[case::singular(1, "1 runtime library")]
    #[case::plural(7, "7 runtime libraries")]
    fn libraries_message_pluralises_correctly(#[case] count: usize, #[case] expected: &str) {
        let msg = libraries_message(count, Utf8Path::new("/tmp/out/SimpleIDE-2.0.1/bin"));
        assert!(msg.contains(expected));
    }

    #[test]
    fn version_banner_names_package() {
        assert_eq!(version_banner("SimpleIDE-2.0.1"), "Creating Version SimpleIDE-2.0.1");
    }

    #[rstest]
    fn dry_run_reports_skipped_archive(package_dir: Utf8PathBuf) {
        let root = Utf8PathBuf::from("/src");
        let info = DryRunInfo {
            source_root: &root,
            build_root: &root,
            package_dir: &package_dir,
            archive_path: None,
            qmake: "qmake",
            jobs: 3,
            strict: true,
            propgcc_path: &root,
        };
        let text = info.display_text();
        assert!(text.contains("Archive: (skipped)"));
        assert!(text.contains("Parallel jobs: 3"));
        assert!(text.contains("Strict build: true"));
    }

    #[test]
    fn write_stderr_line_appends_newline() {
        let mut buffer = Vec::new();
        write_stderr_line(&mut buffer, "make -j9");
        assert_eq!(buffer, b"make -j9\n");
    }
}
