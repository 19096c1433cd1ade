//! Console output for command results

use std::io::{
    self,
    Write,
};

use anyhow::Result;
use colored::Colorize;
use moos_docs_core::{
    build::BuildSummary,
    doxygen::DoxygenReport,
    latex::LatexReport,
    report::ScrapeReport,
    runner::CommandOutcome,
    tools::ToolStatus,
};
use serde::Serialize;

/// Output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable with colors
    Human,
    /// Pretty JSON for tooling
    Json,
}

/// Writes results in the selected format
#[derive(Debug, Clone)]
pub struct OutputManager {
    format:  OutputFormat,
    colored: bool,
}

impl OutputManager {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colored: false,
        }
    }

    pub fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        colored::control::set_override(colored);
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_colored(&self) -> bool {
        self.colored
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    fn json<T: Serialize>(&self, value: &T) -> Result<()> {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, value)?;
        writeln!(stdout)?;
        Ok(())
    }

    /// Result of `moos-docs all`
    pub fn summary(&self, summary: &BuildSummary) -> Result<()> {
        if self.is_json() {
            println!("{}", summary.to_json()?);
            return Ok(());
        }
        self.scrape_report(&summary.findings)?;
        failed_commands(
            summary
                .latex
                .failed_commands()
                .into_iter()
                .chain(summary.doxygen.failed_commands()),
        );
        Ok(())
    }

    pub fn latex_report(&self, report: &LatexReport) -> Result<()> {
        if self.is_json() {
            return self.json(report);
        }
        println!(
            "{} {} document(s) in {} directory(ies)",
            "✅".bright_green(),
            report.document_count(),
            report.directories.len()
        );
        for dir in &report.directories {
            println!("  results: {}", dir.results_file.display());
        }
        failed_commands(report.failed_commands());
        Ok(())
    }

    pub fn doxygen_report(&self, report: &DoxygenReport) -> Result<()> {
        if self.is_json() {
            return self.json(report);
        }
        for build in &report.projects {
            println!(
                "{} {} -> {}",
                "✅".bright_green(),
                build.project.name.bright_cyan(),
                build.pdf.display()
            );
        }
        failed_commands(report.failed_commands());
        Ok(())
    }

    pub fn scrape_report(&self, report: &ScrapeReport) -> Result<()> {
        if self.is_json() {
            return self.json(report);
        }
        report.print_human(&mut io::stdout().lock())?;
        Ok(())
    }

    pub fn tool_statuses(&self, statuses: &[ToolStatus]) -> Result<()> {
        self.json(&statuses)
    }
}

fn failed_commands<'a>(failed: impl IntoIterator<Item = &'a CommandOutcome>) {
    let failed: Vec<_> = failed.into_iter().collect();
    if failed.is_empty() {
        return;
    }
    println!("{} {} command(s) failed:", "⚠️".bright_yellow(), failed.len());
    for outcome in failed {
        println!(
            "  {} {} (in {}): {}",
            "✗".bright_red(),
            outcome.command,
            outcome.dir.display(),
            outcome.status()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_manager_human_format() {
        let output = OutputManager::new(OutputFormat::Human).with_color(false);

        assert_eq!(output.format(), OutputFormat::Human);
        assert!(!output.is_colored());
        assert!(!output.is_json());
    }

    #[test]
    fn test_output_manager_json_format() {
        let output = OutputManager::new(OutputFormat::Json);

        assert!(output.is_json());
        assert!(!output.is_colored());
    }
}
