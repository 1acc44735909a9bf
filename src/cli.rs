//! CLI argument definitions for the SimpleIDE release packager.
//!
//! Parsing lives here so the binary stays a thin wrapper around
//! [`crate::pipeline`].

use crate::archive::resolve_archive_path;
use crate::config::{DEFAULT_PROPGCC_PATH, ReleaseConfig, default_archive_name};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;

/// Build SimpleIDE and stage a Linux release package.
#[derive(Parser, Debug, Clone)]
#[command(name = "simpleide-release")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build SimpleIDE and stage a Linux release package.\n\n",
    "The packager locates a Qt 5 qmake on PATH, configures and compiles the ",
    "propside project, and assembles SimpleIDE-<version> under the build root ",
    "from the release template, the Linux setup and launcher scripts, the ",
    "translation catalogues, and the Qt runtime libraries the binary links ",
    "against. The package is then zipped.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Package the checkout in the current directory:\n",
    "    $ simpleide-release\n\n",
    "  Build out of tree and write the archive elsewhere:\n",
    "    $ simpleide-release -s ~/src/SimpleIDE -b /tmp/simpleide -p /srv/dist/SimpleIDE.zip\n\n",
    "  Preview without building:\n",
    "    $ simpleide-release --dry-run\n\n",
    "Qt 5 downloads: https://download.qt.io/official_releases/qt/5.4/5.4.2",
))]
pub struct Cli {
    /// Archive to write; relative paths are placed under the build root.
    #[arg(short, long, value_name = "FILE")]
    pub package: Option<Utf8PathBuf>,

    /// PropGCC installation used by the IDE.
    #[arg(short = 'g', long, value_name = "DIR", default_value = DEFAULT_PROPGCC_PATH)]
    pub propgcc: Utf8PathBuf,

    /// Build output root [default: <SOURCE>/build].
    #[arg(short, long, value_name = "DIR")]
    pub build: Option<Utf8PathBuf>,

    /// SimpleIDE source checkout [default: current directory].
    #[arg(short, long, value_name = "DIR")]
    pub source: Option<Utf8PathBuf>,

    /// Number of parallel make jobs [default: CPU cores + 1].
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Abort when qmake or make exit unsuccessfully.
    #[arg(long)]
    pub strict: bool,

    /// Stage the package without writing the zip archive.
    #[arg(long, conflicts_with = "package")]
    pub skip_archive: bool,

    /// Show configuration and exit without building.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Default for Cli {
    /// Creates a `Cli` matching an invocation without arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use simpleide_release::cli::Cli;
    ///
    /// let cli = Cli::default();
    /// assert!(cli.source.is_none());
    /// assert_eq!(cli.propgcc, "/opt/parallax");
    /// ```
    fn default() -> Self {
        Self {
            package: None,
            propgcc: Utf8PathBuf::from(DEFAULT_PROPGCC_PATH),
            build: None,
            source: None,
            jobs: None,
            strict: false,
            skip_archive: false,
            dry_run: false,
            verbosity: 0,
            quiet: false,
        }
    }
}

impl Cli {
    /// Turn the parsed flags into a run configuration.
    ///
    /// `current_dir` stands in for a missing `--source`; relative source and
    /// build paths are anchored there too.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use simpleide_release::cli::Cli;
    ///
    /// let config = Cli::default().release_config(Utf8Path::new("/src/SimpleIDE"));
    /// assert_eq!(config.build_root, "/src/SimpleIDE/build");
    /// ```
    #[must_use]
    pub fn release_config(&self, current_dir: &Utf8Path) -> ReleaseConfig {
        let source_root = self
            .source
            .as_deref()
            .map_or_else(|| current_dir.to_owned(), |s| anchor(current_dir, s));
        let mut config = ReleaseConfig::new(source_root);

        if let Some(build) = &self.build {
            config.build_root = anchor(current_dir, build);
        }

        config.archive_path = if self.skip_archive {
            None
        } else {
            let requested = self
                .package
                .clone()
                .unwrap_or_else(|| Utf8PathBuf::from(default_archive_name()));
            Some(resolve_archive_path(&config.build_root, &requested))
        };

        config.propgcc_path.clone_from(&self.propgcc);
        config.jobs = self.jobs;
        config.strict = self.strict;
        config
    }

    /// Default log filter directive for the requested verbosity.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn anchor(base: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_owned()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
