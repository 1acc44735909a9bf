//! Release pipeline orchestration.
//!
//! Runs the stages in order: resolve a Qt 5 `qmake`, build the IDE, name the
//! package from the project version, stage the release tree with the binary,
//! bundle the runtime libraries, and zip the result. The first failing stage
//! aborts the run; whatever earlier stages produced is left on disk.

use crate::archive::{ArchiveOutput, create_archive};
use crate::builder::{BuildConfig, BuildResult, Builder};
use crate::config::ReleaseConfig;
use crate::error::Result;
use crate::exec::CommandExecutor;
use crate::output::{
    DryRunInfo, libraries_message, success_message, version_banner, write_stderr_line,
};
use crate::shared_libs::LibraryCollector;
use crate::stager::Stager;
use crate::toolchain::QtToolchain;
use crate::version::PackagePath;
use camino::Utf8PathBuf;
use log::info;
use std::ffi::OsStr;
use std::io::{self, Write};

/// Inputs shared by every pipeline stage.
pub struct PipelineContext<'a> {
    /// Run configuration derived from the command line.
    pub config: &'a ReleaseConfig,
    /// Runs external tools.
    pub executor: &'a dyn CommandExecutor,
    /// Directories searched for `qmake`.
    pub search_path: &'a OsStr,
    /// Suppress progress output.
    pub quiet: bool,
}

/// What a completed run produced.
#[derive(Debug)]
pub struct ReleaseReport {
    /// The staged package directory.
    pub package: PackagePath,
    /// Exit statuses of the build steps.
    pub build: BuildResult,
    /// Libraries copied into the package's `bin/`.
    pub libraries: Vec<Utf8PathBuf>,
    /// The written archive, unless archiving was skipped.
    pub archive: Option<ArchiveOutput>,
}

/// Run every stage and report what was produced.
///
/// The toolchain is resolved before anything is written under the build
/// root, so a missing or incompatible `qmake` leaves the filesystem untouched.
///
/// # Errors
///
/// Returns the first error raised by any stage.
pub fn run_release(context: &PipelineContext<'_>, stderr: &mut dyn Write) -> Result<ReleaseReport> {
    let mut sink = io::sink();
    let progress: &mut dyn Write = if context.quiet { &mut sink } else { stderr };

    let toolchain = QtToolchain::resolve(context.search_path, context.executor)?;
    let build = perform_build(context, &toolchain, progress)?;

    let config = context.config;
    let package = PackagePath::from_project_file(&config.build_root, &config.source.project_file())?;
    write_stderr_line(progress, version_banner(package.name()));

    let stager = Stager::new(&config.source, package);
    stager.stage()?;
    let installed = stager.install_binary(&build.binary_path)?;
    write_stderr_line(progress, format!("Installed {installed}"));
    let package = stager.package().clone();

    let libraries = LibraryCollector::new(context.executor).collect(
        &build.binary_path,
        &package.bin_dir(),
        progress,
    )?;
    write_stderr_line(progress, libraries_message(libraries.len(), &package.bin_dir()));

    let archive = match &config.archive_path {
        Some(path) => Some(create_archive(package.path(), path)?),
        None => None,
    };

    write_stderr_line(
        progress,
        success_message(
            package.path(),
            archive.as_ref().map(|a| a.archive_path.as_path()),
        ),
    );
    info!("release {} complete", package.name());

    Ok(ReleaseReport {
        package,
        build,
        libraries,
        archive,
    })
}

/// Resolve the toolchain and version, then describe the run without
/// building or writing anything.
///
/// # Errors
///
/// Returns an error if `qmake` cannot be resolved or the project file cannot
/// be read or declares no version.
pub fn run_dry(context: &PipelineContext<'_>, stderr: &mut dyn Write) -> Result<()> {
    let config = context.config;
    let toolchain = QtToolchain::resolve(context.search_path, context.executor)?;
    let package = PackagePath::from_project_file(&config.build_root, &config.source.project_file())?;
    let qmake = toolchain.qmake_invocation().to_string();

    let info = DryRunInfo {
        source_root: config.source.root(),
        build_root: &config.build_root,
        package_dir: package.path(),
        archive_path: config.archive_path.as_deref(),
        qmake: &qmake,
        jobs: config.effective_jobs(),
        strict: config.strict,
        propgcc_path: &config.propgcc_path,
    };
    write_stderr_line(stderr, info.display_text());
    Ok(())
}

/// Configure and compile the IDE with `toolchain`.
///
/// # Errors
///
/// Returns an error if the build cannot run, or fails in strict mode.
pub fn perform_build(
    context: &PipelineContext<'_>,
    toolchain: &QtToolchain,
    stderr: &mut dyn Write,
) -> Result<BuildResult> {
    let config = BuildConfig {
        qmake: toolchain.qmake_invocation(),
        project_dir: context.config.source.project_dir(),
        compile_dir: context.config.compile_dir(),
        jobs: context.config.effective_jobs(),
        strict: context.config.strict,
    };
    Builder::new(config).build(context.executor, stderr)
}

#[cfg(all(test, unix))]
#[path = "pipeline_tests.rs"]
mod tests;
