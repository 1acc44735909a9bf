//! Test support utilities for release packager behavioural tests.
//!
//! Builds throwaway SimpleIDE checkouts and fake Qt installations inside a
//! temporary directory.

#![allow(dead_code, reason = "each behaviour binary uses a different subset")]

use camino::{Utf8Path, Utf8PathBuf};
use simpleide_release::config::ReleaseConfig;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use tempfile::TempDir;

/// `qmake -version` output of a Qt 5 installation.
pub const QT5_VERSION_OUTPUT: &str =
    "QMake version 3.0\nUsing Qt version 5.4.2 in /opt/Qt5.4.2/lib\n";

/// A temporary SimpleIDE checkout with a release configuration pointing at it.
pub struct Checkout {
    _temp: TempDir,
    /// Canonical temporary root; the checkout lives in `SimpleIDE/`.
    pub root: Utf8PathBuf,
    /// Configuration building into `out/`.
    pub config: ReleaseConfig,
}

impl Checkout {
    /// Create a checkout whose project file declares `versions`, one
    /// `VERSION=` line per whitespace-separated component.
    pub fn new(versions: &str) -> Self {
        let temp = TempDir::new().expect("failed to create temp dir");
        let canonical = fs::canonicalize(temp.path()).expect("canonical temp dir");
        let root = Utf8PathBuf::try_from(canonical).expect("temp dir path not UTF-8");

        let mut config = ReleaseConfig::new(root.join("SimpleIDE"));
        config.build_root = root.join("out");
        config.archive_path = Some(root.join("out/SimpleIDE.zip"));
        config.jobs = Some(2);

        let source = &config.source;
        let project: String = versions
            .split_whitespace()
            .map(|v| format!("VERSION={v}\n"))
            .collect();
        write_file(&source.project_file(), &format!("TEMPLATE = app\n{project}"));
        write_file(&source.release_template_dir().join("bin/README"), "binaries");
        write_file(&source.release_template_dir().join("LICENSE"), "GPL");
        write_file(&source.setup_script(), "#!/bin/sh\necho setup\n");
        write_file(&source.launcher_script(), "#!/bin/sh\nexec ./SimpleIDE \"$@\"\n");
        write_file(&source.translations_dir().join("simpleide_zh.qm"), "qm");

        Self {
            _temp: temp,
            root,
            config,
        }
    }

    /// Directory holding the fake `qmake`.
    pub fn qt_bin(&self) -> Utf8PathBuf {
        self.root.join("qt/bin")
    }

    /// Install an executable stand-in for `name` in [`Self::qt_bin`].
    pub fn install_tool(&self, name: &str) -> Utf8PathBuf {
        let path = self.qt_bin().join(name);
        write_file(&path, "#!/bin/sh\n");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod tool");
        path
    }

    /// Create a fake shared library under the Qt prefix.
    pub fn install_library(&self, name: &str) -> Utf8PathBuf {
        let path = self.root.join("qt/lib").join(name);
        write_file(&path, "ELF");
        path
    }

    /// Where the build is expected to leave the IDE binary.
    pub fn binary(&self) -> Utf8PathBuf {
        self.config.compile_dir().join("SimpleIDE")
    }
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Utf8Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create parent");
    }
    fs::write(path, contents).expect("failed to write file");
}

/// Permission bits of `path`.
pub fn mode_of(path: &Utf8Path) -> u32 {
    fs::metadata(path).expect("metadata").permissions().mode() & 0o777
}
