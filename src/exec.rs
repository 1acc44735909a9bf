//! External tool invocation.
//!
//! Every subprocess the packager starts is described by a [`ToolInvocation`]
//! and run through a [`CommandExecutor`], so the stages can be exercised
//! against a fake runner.

use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fmt;
use std::process::{Command, Output, Stdio};

/// How a subprocess's standard streams are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Collect stdout and stderr into the returned [`Output`].
    #[default]
    Capture,
    /// Let the child write straight to the console; the returned output has
    /// empty stdout and stderr.
    Inherit,
}

/// A command line plus the directory it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    program: String,
    args: Vec<String>,
    working_dir: Option<Utf8PathBuf>,
    output: OutputMode,
}

impl ToolInvocation {
    /// Start an invocation of `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            output: OutputMode::Capture,
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the command inside `dir`.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Select how standard streams are handled.
    #[must_use]
    pub fn output_mode(mut self, mode: OutputMode) -> Self {
        self.output = mode;
        self
    }

    /// Program name or path.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments in order.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Working directory, if one was set.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Utf8Path> {
        self.working_dir.as_deref()
    }

    /// Stream handling for this invocation.
    #[must_use]
    pub fn mode(&self) -> OutputMode {
        self.output
    }
}

impl fmt::Display for ToolInvocation {
    /// Renders the space-joined command line, as echoed before each run.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Runs the invocation to completion and returns its output.
    ///
    /// A non-zero exit is not an error at this level; callers decide.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or waiting for the
    /// command.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use simpleide_release::exec::{CommandExecutor, SystemCommandExecutor, ToolInvocation};
    ///
    /// let executor = SystemCommandExecutor;
    /// let output = executor.run(&ToolInvocation::new("qmake").arg("-version"))?;
    /// assert!(output.status.success());
    /// # Ok::<(), simpleide_release::error::ReleaseError>(())
    /// ```
    fn run(&self, invocation: &ToolInvocation) -> Result<Output>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, invocation: &ToolInvocation) -> Result<Output> {
        let mut cmd = Command::new(invocation.program());
        cmd.args(invocation.arguments());
        if let Some(dir) = invocation.working_dir() {
            cmd.current_dir(dir);
        }

        debug!("running `{invocation}` ({:?})", invocation.mode());

        match invocation.mode() {
            OutputMode::Capture => Ok(cmd.output()?),
            OutputMode::Inherit => {
                let status = cmd
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()?;
                Ok(Output {
                    status,
                    stdout: Vec::new(),
                    stderr: Vec::new(),
                })
            }
        }
    }
}

/// Trimmed stderr of a failed command, or `"unknown error"` when empty.
#[must_use]
pub fn stderr_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        "unknown error".to_owned()
    } else {
        trimmed.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_arguments() {
        let invocation = ToolInvocation::new("make").arg("-j9");
        assert_eq!(invocation.to_string(), "make -j9");
    }

    #[test]
    fn builder_records_directory_and_mode() {
        let invocation = ToolInvocation::new("qmake")
            .args(["-qt=5", "/src/propside"])
            .current_dir("/tmp/out/propside")
            .output_mode(OutputMode::Inherit);

        assert_eq!(invocation.program(), "qmake");
        assert_eq!(invocation.arguments(), ["-qt=5", "/src/propside"]);
        assert_eq!(
            invocation.working_dir(),
            Some(Utf8Path::new("/tmp/out/propside"))
        );
        assert_eq!(invocation.mode(), OutputMode::Inherit);
    }

    #[test]
    fn invocations_default_to_capture() {
        assert_eq!(ToolInvocation::new("ldd").mode(), OutputMode::Capture);
    }

    #[cfg(unix)]
    #[test]
    fn system_executor_captures_stdout() {
        let output = SystemCommandExecutor
            .run(&ToolInvocation::new("sh").args(["-c", "echo hello"]))
            .expect("sh should run");
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn system_executor_honours_working_dir() {
        let dir = tempfile::tempdir().expect("temp dir");
        let utf8 = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf8 temp dir");
        let output = SystemCommandExecutor
            .run(
                &ToolInvocation::new("sh")
                    .args(["-c", "pwd -P"])
                    .current_dir(utf8),
            )
            .expect("pwd should run");
        let reported = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        let expected = std::fs::canonicalize(dir.path()).expect("canonical temp dir");
        assert_eq!(std::path::PathBuf::from(reported), expected);
    }

    #[test]
    fn stderr_message_falls_back_when_empty() {
        let output = Output {
            status: crate::test_utils::exit_status(1),
            stdout: Vec::new(),
            stderr: b"  \n".to_vec(),
        };
        assert_eq!(stderr_message(&output), "unknown error");
    }
}
