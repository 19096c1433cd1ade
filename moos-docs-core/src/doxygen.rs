//! Doxygen pass: API reference for the MOOS libraries
//!
//! Walks the source root for the configured project directories and, for
//! each one, renders the template configuration, runs doxygen, copies the
//! header image into the HTML output and builds the LaTeX reference manual
//! into `<Project>.pdf`.
//!
//! There is no rollback: when doxygen fails to create its output, the
//! following steps fail on the missing directories and stop the build.

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
        BuildError,
        BuildResult,
        IoResultExt,
    },
    runner::{
        Capture,
        CommandOutcome,
        CommandRunner,
        ToolCommand,
    },
    template::{
        DoxyTemplate,
        TemplateValues,
    },
    workdir::DirGuard,
};

/// A project directory to document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoxygenProject {
    /// Project name (the directory's base name)
    pub name:        String,
    /// Source directory as found under the source root
    pub source:      PathBuf,
    /// Path of `source` relative to the source root
    pub relative:    PathBuf,
    /// Output directory for the generated documentation
    pub destination: PathBuf,
}

/// Outcome of documenting one project
#[derive(Debug, Clone, Serialize)]
pub struct ProjectBuild {
    pub project:  DoxygenProject,
    /// Reference manual the conversion is expected to produce
    pub pdf:      PathBuf,
    pub commands: Vec<CommandOutcome>,
}

/// Everything the doxygen pass did
#[derive(Debug, Clone, Default, Serialize)]
pub struct DoxygenReport {
    pub projects: Vec<ProjectBuild>,
}

impl DoxygenReport {
    pub fn failed_commands(&self) -> Vec<&CommandOutcome> {
        self.projects
            .iter()
            .flat_map(|p| &p.commands)
            .filter(|c| !c.success())
            .collect()
    }
}

/// Output directory for a project: the destination segment inserted
/// between the source root and the project's relative path. The pass hands
/// in the canonical source root, so for a checkout at `/moos`,
/// `/moos/Core/MOOSLIB` maps to `/moos/Docs/Source/Core/MOOSLIB`, and both
/// are rendered into the template as absolute paths.
pub fn destination_for(source_root: &Path, relative: &Path, config: &DocsConfig) -> PathBuf {
    source_root.join(&config.destination).join(relative)
}

/// Whether a directory, given relative to the source root, is a project to
/// document: its base name is a project name, it lies below the source root
/// and it is not inside the generated documentation tree.
pub fn is_project_dir(relative: &Path, config: &DocsConfig) -> bool {
    let mut segments = relative.iter();
    let first = match segments.next() {
        Some(first) => first,
        None => return false,
    };
    if first == config.docs_dir.as_str() {
        return false;
    }
    relative
        .file_name()
        .map(|name| config.projects.iter().any(|p| name == p.as_str()))
        .unwrap_or(false)
}

/// Find the project directories under `source_root`
pub fn discover_projects(source_root: &Path, config: &DocsConfig) -> Vec<DoxygenProject> {
    let docs_dir = config.docs_dir.as_str();
    let walker = WalkDir::new(source_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.depth() == 1 && e.file_name() == docs_dir));

    let mut projects = Vec::new();
    for entry in walker {
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
        let relative = match entry.path().strip_prefix(source_root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => continue,
        };
        if !is_project_dir(&relative, config) {
            continue;
        }

        projects.push(DoxygenProject {
            name: entry.file_name().to_string_lossy().into_owned(),
            source: entry.path().to_path_buf(),
            destination: destination_for(source_root, &relative, config),
            relative,
        });
    }
    projects
}

/// The doxygen documentation pass
#[derive(Debug)]
pub struct DoxygenPass<'a> {
    config: &'a DocsConfig,
    runner: &'a CommandRunner,
}

impl<'a> DoxygenPass<'a> {
    pub fn new(config: &'a DocsConfig, runner: &'a CommandRunner) -> Self {
        Self { config, runner }
    }

    /// Document every project found under the source root. Template,
    /// rendered configuration and header image are resolved against `root`.
    pub fn run(&self, root: &Path) -> BuildResult<DoxygenReport> {
        let source_root = root.join(&self.config.source_root);
        let source_root = source_root.canonicalize().map_err(|e| {
            BuildError::Workspace(format!(
                "source root {} not found: {}",
                source_root.display(),
                e
            ))
        })?;

        let projects = discover_projects(&source_root, self.config);
        tracing::info!(count = projects.len(), root = %source_root.display(), "doxygen projects found");

        let mut report = DoxygenReport::default();
        for project in &projects {
            report.projects.push(self.build_project(root, project)?);
        }
        Ok(report)
    }

    /// Render, generate, decorate and typeset one project
    pub fn build_project(&self, root: &Path, project: &DoxygenProject) -> BuildResult<ProjectBuild> {
        let config = self.config;
        self.runner.progress(format_args!(
            "{} Making Doxygen documentation for {} in {}",
            "📚".bright_blue(),
            project.source.display(),
            project.destination.display()
        ));
        tracing::info!(project = %project.name, "generating API documentation");

        let template = DoxyTemplate::load(&root.join(&config.template))?;
        let rendered = root.join(&config.rendered);
        let values = TemplateValues {
            project_name: project.name.clone(),
            doc_dir:      project.destination.display().to_string(),
            source_dir:   project.source.display().to_string(),
        };

        let mut commands = Vec::new();
        let pdf_name = format!("{}.pdf", project.name);

        if self.runner.options().dry_run {
            self.runner.progress(format_args!(
                "  {} render {} -> {}",
                "[dry-run]".bright_black(),
                config.template,
                rendered.display()
            ));
        } else {
            template.write_rendered(&rendered, &values)?;
        }

        let doxygen = ToolCommand::new(&config.tools.doxygen).arg(config.rendered.as_str());
        let outcome = self.runner.run(&doxygen, root, Capture::Inherit)?;
        self.runner.check(&outcome)?;
        commands.push(outcome);

        let latex_dir = project.destination.join("latex");
        if self.runner.options().dry_run {
            self.runner.progress(format_args!(
                "  {} copy {} -> {}",
                "[dry-run]".bright_black(),
                config.header_image.display(),
                project.destination.join("html").display()
            ));
            for cmd in [
                ToolCommand::new(&config.tools.make),
                ToolCommand::new(&config.tools.dvipdf).args([config.refman.clone(), pdf_name.clone()]),
            ] {
                commands.push(self.runner.run(&cmd, &latex_dir, Capture::Inherit)?);
            }
        } else {
            self.copy_header_image(root, &project.destination)?;

            let guard = DirGuard::enter(&latex_dir)?;
            let make = ToolCommand::new(&config.tools.make);
            let outcome = self.runner.run(&make, guard.path(), Capture::Inherit)?;
            self.runner.check(&outcome)?;
            commands.push(outcome);

            let convert = ToolCommand::new(&config.tools.dvipdf)
                .args([config.refman.clone(), pdf_name.clone()]);
            let outcome = self.runner.run(&convert, guard.path(), Capture::Inherit)?;
            self.runner.check(&outcome)?;
            commands.push(outcome);
        }

        Ok(ProjectBuild {
            project: project.clone(),
            pdf: latex_dir.join(pdf_name),
            commands,
        })
    }

    /// Copy the header image into `<destination>/html`, which doxygen must
    /// already have created
    fn copy_header_image(&self, root: &Path, destination: &Path) -> BuildResult<()> {
        let image = root.join(&self.config.header_image);
        let html = destination.join("html");
        if !html.is_dir() {
            return Err(BuildError::Workspace(format!(
                "doxygen output directory not found: {}",
                html.display()
            )));
        }
        let file_name = image.file_name().ok_or_else(|| {
            BuildError::Config(format!("header image has no file name: {}", image.display()))
        })?;
        let target = html.join(file_name);
        std::fs::copy(&image, &target).at_path(&image)?;
        tracing::debug!(from = %image.display(), to = %target.display(), "copied header image");
        Ok(())
    }
}
