//! MOOS Docs Core - documentation builder for the MOOS source tree
//!
//! This library drives the external tools that produce the MOOS manuals and
//! API reference. It does no typesetting itself: every artifact is made by
//! `latex`, `dvipdf`, `doxygen` or `make`, and the only feedback it reads back
//! is the text those tools print.
//!
//! # Architecture
//!
//! The build is organized around a central [`DocsBuildSystem`] that runs
//! three steps in order:
//!
//! - **LaTeX pass**: typesets every `.tex` file found in `latex` directories
//!   ([`latex`])
//! - **Doxygen pass**: renders the doxygen template per project and builds
//!   the HTML and PDF reference ([`doxygen`], [`template`])
//! - **Report**: scrapes every results file for `Error` and `Warning`
//!   lines ([`report`])
//!
//! External commands go through [`runner::CommandRunner`], and every change
//! of working directory is scoped by [`workdir::DirGuard`].

#![forbid(unsafe_code)]

pub use std::path::{Path, PathBuf};

pub use anyhow::{Context, Result};

pub mod build;
pub mod config;
pub mod diagnostics;
pub mod doxygen;
pub mod error;
pub mod latex;
pub mod report;
pub mod runner;
pub mod template;
pub mod tools;
pub mod workdir;

// Public API
pub use build::{BuildSummary, DocsBuildSystem};
pub use config::{DocsConfig, RunOptions};
pub use error::{BuildError, BuildResult};

/// Build system version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Locate the documentation root by walking up from the current directory
/// until a directory holding the doxygen template is found.
pub fn detect_docs_root() -> Result<PathBuf> {
    let current = std::env::current_dir().context("Failed to get current directory")?;
    let template = DocsConfig::default().template;
    find_docs_root(&current, &template)
        .with_context(|| format!("Could not find docs root (directory containing {})", template))
}

/// Walk up from `start` looking for a directory that contains `template`,
/// either directly or in a `Docs` child directory.
pub fn find_docs_root(start: &Path, template: &str) -> Result<PathBuf> {
    let mut path = start;
    loop {
        if path.join(template).is_file() {
            return Ok(path.to_path_buf());
        }
        let docs = path.join("Docs");
        if docs.join(template).is_file() {
            return Ok(docs);
        }

        match path.parent() {
            Some(parent) => path = parent,
            None => break,
        }
    }

    anyhow::bail!("no {} found above {}", template, start.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_docs_root_from_nested_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("Docs");
        let nested = tmp.path().join("Core").join("MOOSLIB");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(docs.join("Template.doxy"), "PROJECT_NAME = $PROJECTNAME").unwrap();

        let root = find_docs_root(&nested, "Template.doxy").unwrap();
        assert_eq!(root, docs);

        let from_docs = find_docs_root(&docs, "Template.doxy").unwrap();
        assert_eq!(from_docs, docs);
    }

    #[test]
    fn test_find_docs_root_missing_template() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(find_docs_root(tmp.path(), "Nope-Template.doxy").is_err());
    }

    #[test]
    fn test_version_defined() {
        assert!(!VERSION.is_empty(), "Version should be defined");
    }
}
