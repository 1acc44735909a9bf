//! Build configuration and the fixed SimpleIDE source-tree layout.
//!
//! [`ReleaseConfig`] is built once from the command line and passed by
//! reference to every stage. [`SourceLayout`] names the inputs the packager
//! reads from a SimpleIDE checkout.

use camino::{Utf8Path, Utf8PathBuf};

/// Application name used for the binary and the package directory.
pub const APP_NAME: &str = "SimpleIDE";

/// Default auxiliary toolchain location.
pub const DEFAULT_PROPGCC_PATH: &str = "/opt/parallax";

/// Locations of the inputs inside a SimpleIDE source checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    root: Utf8PathBuf,
}

impl SourceLayout {
    /// Describe the checkout rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root of the checkout.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// The qmake project directory of the IDE.
    #[must_use]
    pub fn project_dir(&self) -> Utf8PathBuf {
        self.root.join("propside")
    }

    /// The qmake project file carrying `VERSION=` lines.
    #[must_use]
    pub fn project_file(&self) -> Utf8PathBuf {
        self.project_dir().join("propside.pro")
    }

    /// Compiled Qt translation catalogues.
    #[must_use]
    pub fn translations_dir(&self) -> Utf8PathBuf {
        self.project_dir().join("translations")
    }

    /// Template mirrored into every package.
    #[must_use]
    pub fn release_template_dir(&self) -> Utf8PathBuf {
        self.root.join("release").join("template")
    }

    /// Installer script placed at the package root.
    #[must_use]
    pub fn setup_script(&self) -> Utf8PathBuf {
        self.linux_release_dir().join("setup.sh")
    }

    /// Launcher script placed next to the binary.
    #[must_use]
    pub fn launcher_script(&self) -> Utf8PathBuf {
        self.linux_release_dir().join("simpleide.sh")
    }

    fn linux_release_dir(&self) -> Utf8PathBuf {
        self.root.join("release").join("linux")
    }
}

/// Immutable inputs for one packaging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    /// Source checkout being packaged.
    pub source: SourceLayout,
    /// Root under which build output and the package directory are placed.
    pub build_root: Utf8PathBuf,
    /// Destination of the zip archive, or `None` to skip archiving.
    pub archive_path: Option<Utf8PathBuf>,
    /// Auxiliary PropGCC installation.
    pub propgcc_path: Utf8PathBuf,
    /// Parallel make jobs; `None` means detected cores plus one.
    pub jobs: Option<usize>,
    /// Fail when qmake or make exit unsuccessfully.
    pub strict: bool,
}

impl ReleaseConfig {
    /// Create a configuration with defaults derived from `source_root`.
    ///
    /// The build root defaults to `<source_root>/build` and the archive to
    /// `<build_root>/SimpleIDE.zip`.
    ///
    /// # Examples
    ///
    /// ```
    /// use simpleide_release::config::ReleaseConfig;
    ///
    /// let config = ReleaseConfig::new("/src/SimpleIDE");
    /// assert_eq!(config.build_root, "/src/SimpleIDE/build");
    /// assert_eq!(
    ///     config.archive_path.as_deref().map(|p| p.as_str()),
    ///     Some("/src/SimpleIDE/build/SimpleIDE.zip"),
    /// );
    /// ```
    #[must_use]
    pub fn new(source_root: impl Into<Utf8PathBuf>) -> Self {
        let source = SourceLayout::new(source_root);
        let build_root = source.root().join("build");
        let archive_path = Some(build_root.join(default_archive_name()));
        Self {
            source,
            build_root,
            archive_path,
            propgcc_path: Utf8PathBuf::from(DEFAULT_PROPGCC_PATH),
            jobs: None,
            strict: false,
        }
    }

    /// Directory qmake and make run in.
    #[must_use]
    pub fn compile_dir(&self) -> Utf8PathBuf {
        self.build_root.join("propside")
    }

    /// Number of make jobs for this run.
    #[must_use]
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(default_jobs)
    }
}

/// Default archive file name, `SimpleIDE.zip`.
#[must_use]
pub fn default_archive_name() -> String {
    format!("{APP_NAME}.zip")
}

/// Detected CPU cores plus one.
#[must_use]
pub fn default_jobs() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get) + 1
}
