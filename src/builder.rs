//! qmake/make orchestration for the IDE binary.
//!
//! The project is configured with qmake inside an out-of-tree build directory
//! and compiled with a parallel `make`. Both tools stream their output to the
//! console.

use crate::config::APP_NAME;
use crate::error::{ReleaseError, Result};
use crate::exec::{CommandExecutor, OutputMode, ToolInvocation};
use crate::output::write_stderr_line;
use camino::Utf8PathBuf;
use log::warn;
use std::fs;
use std::io::Write;
use std::process::ExitStatus;

/// Name of the binary qmake produces.
pub const BINARY_NAME: &str = APP_NAME;

/// Configuration for the build process.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Base qmake invocation, including any Qt version selector.
    pub qmake: ToolInvocation,
    /// Directory holding the qmake project.
    pub project_dir: Utf8PathBuf,
    /// Out-of-tree build directory; qmake and make run here.
    pub compile_dir: Utf8PathBuf,
    /// Number of parallel make jobs.
    pub jobs: usize,
    /// Fail the build when qmake or make exit unsuccessfully.
    pub strict: bool,
}

/// Result of compiling the IDE.
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Where the binary is expected; not checked for existence.
    pub binary_path: Utf8PathBuf,
    /// Exit status of qmake.
    pub qmake_status: ExitStatus,
    /// Exit status of make.
    pub make_status: ExitStatus,
}

impl BuildResult {
    /// Returns `true` when both steps exited successfully.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.qmake_status.success() && self.make_status.success()
    }
}

/// Drives qmake and make for the IDE project.
pub struct Builder {
    config: BuildConfig,
}

impl Builder {
    /// Create a new builder with the given configuration.
    #[must_use]
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Configure and compile the project, returning the expected binary path.
    ///
    /// Each command line is echoed to `stderr` before it runs. Unless strict
    /// mode is enabled a failing step is only logged, and the pipeline carries
    /// on with whatever binary is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the build directory cannot be created, a tool
    /// cannot be spawned, or (in strict mode) a step exits unsuccessfully.
    pub fn build(
        &self,
        executor: &dyn CommandExecutor,
        stderr: &mut dyn Write,
    ) -> Result<BuildResult> {
        fs::create_dir_all(&self.config.compile_dir)?;

        let qmake_status = self.run_step(executor, self.qmake_invocation(), stderr)?;
        let make_status = self.run_step(executor, self.make_invocation(), stderr)?;

        Ok(BuildResult {
            binary_path: self.binary_path(),
            qmake_status,
            make_status,
        })
    }

    /// The qmake command that generates the Makefile.
    #[must_use]
    pub fn qmake_invocation(&self) -> ToolInvocation {
        self.config
            .qmake
            .clone()
            .arg(self.config.project_dir.as_str())
            .current_dir(self.config.compile_dir.clone())
            .output_mode(OutputMode::Inherit)
    }

    /// The parallel make command.
    #[must_use]
    pub fn make_invocation(&self) -> ToolInvocation {
        ToolInvocation::new("make")
            .arg(format!("-j{}", self.config.jobs))
            .current_dir(self.config.compile_dir.clone())
            .output_mode(OutputMode::Inherit)
    }

    /// Where qmake places the linked binary.
    #[must_use]
    pub fn binary_path(&self) -> Utf8PathBuf {
        self.config.compile_dir.join(BINARY_NAME)
    }

    fn run_step(
        &self,
        executor: &dyn CommandExecutor,
        invocation: ToolInvocation,
        stderr: &mut dyn Write,
    ) -> Result<ExitStatus> {
        write_stderr_line(stderr, &invocation);
        let status = executor.run(&invocation)?.status;

        if !status.success() {
            if self.config.strict {
                return Err(ReleaseError::BuildFailed {
                    step: invocation.to_string(),
                    status,
                });
            }
            warn!("`{invocation}` exited with {status}; continuing");
        }

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::MockCommandExecutor;
    use crate::test_utils::{failure_output, success_output};
    use camino::Utf8Path;
    use mockall::Sequence;
    use rstest::rstest;
    use std::process::Output;
    use tempfile::TempDir;

    fn config(compile_dir: &Utf8Path, strict: bool) -> BuildConfig {
        BuildConfig {
            qmake: ToolInvocation::new("/usr/bin/qmake").arg("-qt=5"),
            project_dir: Utf8PathBuf::from("/src/SimpleIDE/propside"),
            compile_dir: compile_dir.to_owned(),
            jobs: 9,
            strict,
        }
    }

    fn temp_compile_dir() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dir = Utf8PathBuf::try_from(temp.path().join("build").join("propside"))
            .expect("temp dir path not UTF-8");
        (temp, dir)
    }

    fn expect_steps(executor: &mut MockCommandExecutor, qmake: Output, make: Output) {
        let mut seq = Sequence::new();
        executor
            .expect_run()
            .withf(|inv| inv.program() == "/usr/bin/qmake")
            .times(1)
            .in_sequence(&mut seq)
            .return_once(move |_| Ok(qmake));
        executor
            .expect_run()
            .withf(|inv| inv.program() == "make")
            .times(1)
            .in_sequence(&mut seq)
            .return_once(move |_| Ok(make));
    }

    #[test]
    fn qmake_invocation_targets_project_from_compile_dir() {
        let builder = Builder::new(config(Utf8Path::new("/tmp/out/propside"), false));
        let qmake = builder.qmake_invocation();

        assert_eq!(qmake.arguments(), ["-qt=5", "/src/SimpleIDE/propside"]);
        assert_eq!(qmake.working_dir(), Some(Utf8Path::new("/tmp/out/propside")));
        assert_eq!(qmake.mode(), OutputMode::Inherit);
    }

    #[test]
    fn make_invocation_uses_job_count() {
        let builder = Builder::new(config(Utf8Path::new("/tmp/out/propside"), false));
        let make = builder.make_invocation();

        assert_eq!(make.to_string(), "make -j9");
        assert_eq!(make.working_dir(), Some(Utf8Path::new("/tmp/out/propside")));
    }

    #[test]
    fn binary_path_follows_naming_convention() {
        let builder = Builder::new(config(Utf8Path::new("/tmp/out/propside"), false));
        assert_eq!(
            builder.binary_path(),
            Utf8PathBuf::from("/tmp/out/propside/SimpleIDE")
        );
    }

    #[test]
    fn build_creates_compile_dir_and_echoes_commands() {
        let (_temp, dir) = temp_compile_dir();
        let mut executor = MockCommandExecutor::new();
        expect_steps(&mut executor, success_output(), success_output());

        let mut stderr = Vec::new();
        let result = Builder::new(config(&dir, false))
            .build(&executor, &mut stderr)
            .expect("build should succeed");

        assert!(dir.is_dir());
        assert!(result.succeeded());
        assert_eq!(result.binary_path, dir.join(BINARY_NAME));
        let echoed = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(echoed.contains("/usr/bin/qmake -qt=5 /src/SimpleIDE/propside"));
        assert!(echoed.contains("make -j9"));
    }

    #[test]
    fn build_tolerates_existing_compile_dir() {
        let (_temp, dir) = temp_compile_dir();
        fs::create_dir_all(&dir).expect("failed to pre-create dir");
        let mut executor = MockCommandExecutor::new();
        expect_steps(&mut executor, success_output(), success_output());

        let result = Builder::new(config(&dir, false)).build(&executor, &mut Vec::new());
        assert!(result.is_ok());
    }

    #[rstest]
    #[case::qmake_fails(failure_output("Project ERROR"), success_output())]
    #[case::make_fails(success_output(), failure_output("undefined reference"))]
    fn lenient_build_continues_after_failures(#[case] qmake: Output, #[case] make: Output) {
        let (_temp, dir) = temp_compile_dir();
        let mut executor = MockCommandExecutor::new();
        expect_steps(&mut executor, qmake, make);

        let result = Builder::new(config(&dir, false))
            .build(&executor, &mut Vec::new())
            .expect("lenient build returns the expected binary path");
        assert!(!result.succeeded());
        assert_eq!(result.binary_path, dir.join(BINARY_NAME));
    }

    #[test]
    fn strict_build_stops_at_failing_make() {
        let (_temp, dir) = temp_compile_dir();
        let mut executor = MockCommandExecutor::new();
        expect_steps(&mut executor, success_output(), failure_output("error"));

        let err = Builder::new(config(&dir, true))
            .build(&executor, &mut Vec::new())
            .expect_err("strict build fails");
        assert!(matches!(err, ReleaseError::BuildFailed { ref step, .. } if step == "make -j9"));
    }

    #[test]
    fn strict_build_skips_make_when_qmake_fails() {
        let (_temp, dir) = temp_compile_dir();
        let mut executor = MockCommandExecutor::new();
        executor
            .expect_run()
            .withf(|inv| inv.program() == "/usr/bin/qmake")
            .times(1)
            .return_once(|_| Ok(failure_output("Project ERROR")));

        let err = Builder::new(config(&dir, true))
            .build(&executor, &mut Vec::new())
            .expect_err("strict build fails");
        assert!(matches!(err, ReleaseError::BuildFailed { .. }));
    }
}
