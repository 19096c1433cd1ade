//! Core build system implementation

use std::path::{
    Path,
    PathBuf,
};

use colored::Colorize;
use serde::Serialize;

use crate::{
    config::{
        DocsConfig,
        RunOptions,
    },
    doxygen::{
        DoxygenPass,
        DoxygenReport,
    },
    error::{
        BuildError,
        BuildResult,
    },
    latex::{
        LatexPass,
        LatexReport,
    },
    report::{
        self,
        ScrapeReport,
    },
    runner::CommandRunner,
    tools::ToolManager,
};

/// Central documentation build coordinator
#[derive(Debug)]
pub struct DocsBuildSystem {
    /// Docs root: where the build starts and where results are scraped
    root:   PathBuf,
    /// Names, paths and programs
    config: DocsConfig,
    /// External command execution
    runner: CommandRunner,
}

/// Results of a complete run
#[derive(Debug, Serialize)]
pub struct BuildSummary {
    pub latex:       LatexReport,
    pub doxygen:     DoxygenReport,
    pub findings:    ScrapeReport,
    /// Build duration in milliseconds
    pub duration_ms: u64,
}

impl BuildSummary {
    /// Number of external commands that did not succeed
    pub fn failed_command_count(&self) -> usize {
        self.latex.failed_commands().len() + self.doxygen.failed_commands().len()
    }

    pub fn to_json(&self) -> BuildResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BuildError::Workspace(format!("Failed to serialize summary: {}", e)))
    }
}

impl DocsBuildSystem {
    /// Create a build system for `root` with the configuration found there
    pub fn new(root: &Path) -> BuildResult<Self> {
        let root = Self::resolve_root(root)?;
        let config = DocsConfig::load_or_default(&root)?;
        Ok(Self::with_config(root, config, RunOptions::default()))
    }

    /// Create a build system with explicit configuration. `root` should be
    /// absolute: the passes change the working directory while they run.
    pub fn with_config(root: PathBuf, config: DocsConfig, options: RunOptions) -> Self {
        Self {
            root,
            config,
            runner: CommandRunner::new(options),
        }
    }

    fn resolve_root(root: &Path) -> BuildResult<PathBuf> {
        root.canonicalize().map_err(|e| {
            BuildError::Workspace(format!("docs root {} not found: {}", root.display(), e))
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &DocsConfig {
        &self.config
    }

    pub fn options(&self) -> &RunOptions {
        self.runner.options()
    }

    pub fn set_options(&mut self, options: RunOptions) {
        self.runner = CommandRunner::new(options);
    }

    pub fn set_config(&mut self, config: DocsConfig) {
        self.config = config;
    }

    pub fn tool_manager(&self) -> ToolManager {
        ToolManager::new(&self.config)
    }

    /// Typeset every LaTeX directory under the root
    pub fn run_latex(&self) -> BuildResult<LatexReport> {
        self.runner.progress(format_args!("{} Building LaTeX documents...", "🔨".bright_blue()));
        LatexPass::new(&self.config, &self.runner).run(&self.root)
    }

    /// Generate API documentation for every project
    pub fn run_doxygen(&self) -> BuildResult<DoxygenReport> {
        self.runner
            .progress(format_args!("{} Generating API documentation...", "📚".bright_blue()));
        DoxygenPass::new(&self.config, &self.runner).run(&self.root)
    }

    /// Scrape every results file under the root
    pub fn scrape(&self) -> BuildResult<ScrapeReport> {
        report::scrape(&self.root, &self.config.results_file)
    }

    /// LaTeX pass, doxygen pass, then the results scrape
    pub fn run_all(&self) -> BuildResult<BuildSummary> {
        let start_time = std::time::Instant::now();

        let latex = self.run_latex()?;
        let doxygen = self.run_doxygen()?;
        let findings = self.scrape()?;

        let duration = start_time.elapsed();
        self.runner.progress(format_args!(
            "{} Documentation build completed in {:.2}s",
            "✅".bright_green(),
            duration.as_secs_f64()
        ));

        Ok(BuildSummary {
            latex,
            doxygen,
            findings,
            duration_ms: duration.as_millis() as u64,
        })
    }
}
