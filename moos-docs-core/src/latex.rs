//! LaTeX pass: typeset every hand-written manual in the tree
//!
//! A directory is built when its name ends with the LaTeX suffix, it is not
//! itself named like the excluded directory, and it does not contain the
//! doxygen style file. That style file marks LaTeX sources generated by the
//! doxygen pass, which are built there with `make` instead.
//!
//! Each `.tex` file is typeset several times so cross references settle,
//! then converted from DVI to PDF. The tool output of a document goes to the
//! directory's results file, recreated before each document, so it ends up
//! holding the output of the last document built there.

use std::path::{
    Path,
    PathBuf,
};

use colored::Colorize;
use serde::Serialize;
use walkdir::WalkDir;

use crate::{
    config::DocsConfig,
    error::{
        BuildResult,
        IoResultExt,
    },
    runner::{
        Capture,
        CommandOutcome,
        CommandRunner,
        ResultsLog,
        ToolCommand,
    },
    workdir::DirGuard,
};

/// A LaTeX directory selected for building
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatexTarget {
    /// Directory holding the sources
    pub dir:       PathBuf,
    /// `.tex` files directly inside `dir`, sorted by name
    pub tex_files: Vec<String>,
}

/// Outcome of building one `.tex` file
#[derive(Debug, Clone, Serialize)]
pub struct DocumentBuild {
    pub tex_file: String,
    /// PDF the conversion is expected to produce
    pub pdf:      PathBuf,
    pub commands: Vec<CommandOutcome>,
}

/// Outcome of one LaTeX directory
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryBuild {
    pub dir:          PathBuf,
    pub results_file: PathBuf,
    pub documents:    Vec<DocumentBuild>,
}

/// Everything the LaTeX pass did
#[derive(Debug, Clone, Default, Serialize)]
pub struct LatexReport {
    pub directories: Vec<DirectoryBuild>,
}

impl LatexReport {
    pub fn document_count(&self) -> usize {
        self.directories.iter().map(|d| d.documents.len()).sum()
    }

    /// Commands that did not succeed
    pub fn failed_commands(&self) -> Vec<&CommandOutcome> {
        self.directories
            .iter()
            .flat_map(|d| &d.documents)
            .flat_map(|doc| &doc.commands)
            .filter(|c| !c.success())
            .collect()
    }
}

/// Find every LaTeX directory under `root` that should be built
pub fn discover_latex_dirs(root: &Path, config: &DocsConfig) -> BuildResult<Vec<LatexTarget>> {
    let mut targets = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            },
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name == config.excluded_dir.as_str() || !name.ends_with(config.latex_suffix.as_str()) {
            continue;
        }

        let files = direct_files(entry.path())?;
        if files.iter().any(|f| f == &config.style_marker) {
            tracing::debug!(dir = %entry.path().display(), "style marker present, skipping");
            continue;
        }

        let mut tex_files: Vec<String> =
            files.into_iter().filter(|f| f.ends_with(".tex")).collect();
        if tex_files.is_empty() {
            continue;
        }
        tex_files.sort();

        targets.push(LatexTarget {
            dir: entry.path().to_path_buf(),
            tex_files,
        });
    }

    Ok(targets)
}

fn direct_files(dir: &Path) -> BuildResult<Vec<String>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).at_path(dir)? {
        let entry = entry.at_path(dir)?;
        // follows symlinks, so a linked marker or source still counts
        if entry.path().is_file() {
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(files)
}

/// Strip the `.tex` extension
fn stem(tex_file: &str) -> &str {
    tex_file.strip_suffix(".tex").unwrap_or(tex_file)
}

/// The LaTeX build pass
#[derive(Debug)]
pub struct LatexPass<'a> {
    config: &'a DocsConfig,
    runner: &'a CommandRunner,
}

impl<'a> LatexPass<'a> {
    pub fn new(config: &'a DocsConfig, runner: &'a CommandRunner) -> Self {
        Self { config, runner }
    }

    /// Build every LaTeX directory under `root`
    pub fn run(&self, root: &Path) -> BuildResult<LatexReport> {
        let targets = discover_latex_dirs(root, self.config)?;
        tracing::info!(count = targets.len(), "LaTeX directories found");

        let mut report = LatexReport::default();
        for target in &targets {
            report.directories.push(self.build_directory(target)?);
        }
        Ok(report)
    }

    /// Build all documents of one directory from inside it
    pub fn build_directory(&self, target: &LatexTarget) -> BuildResult<DirectoryBuild> {
        let guard = DirGuard::enter(&target.dir)?;
        let dir = guard.path().to_path_buf();
        let results_file = dir.join(&self.config.results_file);

        let mut documents = Vec::new();
        for tex_file in &target.tex_files {
            let log = if self.runner.options().dry_run {
                ResultsLog::existing(&results_file)
            } else {
                ResultsLog::fresh(&dir, &self.config.results_file)?
            };
            self.runner.progress(format_args!(
                "{} making latex in {} from {}",
                "📄".bright_blue(),
                dir.display(),
                tex_file.bright_cyan()
            ));
            tracing::info!(dir = %dir.display(), file = %tex_file, "typesetting");
            documents.push(self.build_document(&dir, tex_file, &log)?);
        }

        Ok(DirectoryBuild {
            dir,
            results_file,
            documents,
        })
    }

    fn build_document(
        &self,
        dir: &Path,
        tex_file: &str,
        log: &ResultsLog,
    ) -> BuildResult<DocumentBuild> {
        let tools = &self.config.tools;
        let name = stem(tex_file);
        let dvi = format!("{}.dvi", name);
        let pdf = format!("{}.pdf", name);

        let mut commands = Vec::new();
        let latex = ToolCommand::new(&tools.latex).arg(tex_file);
        for _ in 0..self.config.latex_passes {
            let outcome = self.runner.run(&latex, dir, Capture::Log(log))?;
            self.runner.check(&outcome)?;
            commands.push(outcome);
        }

        let convert = ToolCommand::new(&tools.dvipdf).args([dvi, pdf.clone()]);
        let outcome = self.runner.run(&convert, dir, Capture::Log(log))?;
        self.runner.check(&outcome)?;
        commands.push(outcome);

        Ok(DocumentBuild {
            tex_file: tex_file.to_string(),
            pdf: dir.join(pdf),
            commands,
        })
    }
}
