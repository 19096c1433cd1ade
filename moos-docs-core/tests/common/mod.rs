//! Shared fixtures: a scratch MOOS tree and shell stand-ins for the
//! external tools.

#![allow(dead_code)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{
        Path,
        PathBuf,
    },
};

use moos_docs_core::DocsConfig;
use tempfile::TempDir;

pub const FAKE_LATEX: &str = r#"#!/bin/sh
echo "This is fakeTeX, processing $1"
echo "LaTeX Warning: There were undefined references."
: > "${1%.tex}.dvi"
"#;

pub const FAKE_DVIPDF: &str = r#"#!/bin/sh
echo "converting $1 to $2"
cp "$1" "$2"
"#;

pub const FAKE_DOXYGEN: &str = r#"#!/bin/sh
out=$(sed -n 's/^OUTPUT_DIRECTORY *= *//p' "$1")
mkdir -p "$out/html" "$out/latex"
echo "doxygen wrote $out"
"#;

pub const FAKE_MAKE: &str = r#"#!/bin/sh
: > refman.dvi
"#;

pub const FAILING_TOOL: &str = r#"#!/bin/sh
echo "! LaTeX Error: Something's wrong"
exit 1
"#;

pub const TEMPLATE: &str = "PROJECT_NAME = $PROJECTNAME\n\
                            OUTPUT_DIRECTORY = $DOCDIR\n\
                            INPUT = $SOURCEDIR\n";

/// Scratch tree laid out like the MOOS checkout: `<tmp>/Docs` is the docs
/// root, the libraries live next to it, tools in `<tmp>/bin`.
pub struct Fixture {
    pub tmp:  TempDir,
    pub root: PathBuf,
    pub bin:  PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().canonicalize().unwrap();
        let root = base.join("Docs");
        let bin = base.join("bin");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&bin).unwrap();
        Self { tmp, root, bin }
    }

    /// Base directory holding `Docs`, `bin` and the sources
    pub fn base(&self) -> PathBuf {
        self.root.parent().unwrap().to_path_buf()
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.base().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    pub fn script(&self, name: &str, body: &str) -> String {
        let path = self.bin.join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    /// Configuration pointing every tool at a stand-in script
    pub fn config(&self) -> DocsConfig {
        let mut config = DocsConfig::default();
        config.tools.latex = self.script("latex", FAKE_LATEX);
        config.tools.dvipdf = self.script("dvipdf", FAKE_DVIPDF);
        config.tools.doxygen = self.script("doxygen", FAKE_DOXYGEN);
        config.tools.make = self.script("make", FAKE_MAKE);
        config
    }

    /// Template, header image and two project directories
    pub fn doxygen_tree(&self) {
        self.write("Docs/Template.doxy", TEMPLATE);
        self.write("Docs/resources/moose7.gif", "GIF89a");
        fs::create_dir_all(self.base().join("Core/MOOSLIB")).unwrap();
        fs::create_dir_all(self.base().join("Core/MOOSGenLib")).unwrap();
        fs::create_dir_all(self.base().join("Docs/MOOSLIB")).unwrap();
    }
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}
