//! SimpleIDE release packager library.
//!
//! Builds the SimpleIDE Qt project and stages a distributable Linux package:
//! a versioned directory holding the binary, its Qt runtime libraries, the
//! setup and launcher scripts, and the translation catalogues, optionally
//! compressed into a zip archive. The `simpleide-release` binary is a thin
//! wrapper around [`pipeline`].
//!
//! # Modules
//!
//! - [`archive`] - Zip packaging of the staged release
//! - [`builder`] - qmake and make invocation
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Run configuration and source tree layout
//! - [`error`] - Error taxonomy with install hints
//! - [`exec`] - External tool invocation
//! - [`output`] - Progress lines and dry-run summary
//! - [`pipeline`] - Stage orchestration
//! - [`shared_libs`] - Runtime library bundling via `ldd`
//! - [`stager`] - Release tree staging
//! - [`toolchain`] - Qt 5 `qmake` resolution
//! - [`version`] - Package version extraction

pub mod archive;
pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod output;
pub mod pipeline;
pub mod shared_libs;
pub mod stager;
pub mod toolchain;
pub mod version;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
