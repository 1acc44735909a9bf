//! SimpleIDE release packager CLI entrypoint.
//!
//! Parses the command line, installs the log subscriber, and hands off to the
//! pipeline with the host's process runner and `PATH`.

use camino::Utf8PathBuf;
use clap::Parser;
use simpleide_release::cli::Cli;
use simpleide_release::error::{ReleaseError, Result};
use simpleide_release::exec::SystemCommandExecutor;
use simpleide_release::output::write_stderr_line;
use simpleide_release::pipeline::{PipelineContext, run_dry, run_release};
use simpleide_release::toolchain::host_search_path;
use std::io::Write;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// `RUST_LOG` takes precedence over `-v`.
fn init_logging(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let current_dir = current_dir()?;
    let config = cli.release_config(&current_dir);
    let search_path = host_search_path();
    let executor = SystemCommandExecutor;

    let context = PipelineContext {
        config: &config,
        executor: &executor,
        search_path: &search_path,
        quiet: cli.quiet,
    };

    if cli.dry_run {
        return run_dry(&context, stderr);
    }

    run_release(&context, stderr)?;
    Ok(())
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir()?;
    Utf8PathBuf::try_from(cwd).map_err(|e| ReleaseError::NonUtf8Path {
        path: e.as_path().display().to_string(),
    })
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_one() {
        let err = ReleaseError::VersionNotFound {
            path: Utf8Path::new("/src/propside/propside.pro").to_owned(),
        };

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.starts_with("error: "));
        assert!(stderr_text.contains("propside.pro"));
    }
}
