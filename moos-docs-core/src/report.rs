//! Results scraper
//!
//! Collects every results file below the docs root and lists the lines
//! mentioning `Error`, then the lines mentioning `Warning`. Reporting never
//! affects the outcome of the build.

use std::{
    io::Write,
    path::{
        Path,
        PathBuf,
    },
};

use colored::Colorize;
use serde::Serialize;
use walkdir::WalkDir;

use crate::{
    diagnostics::{
        Finding,
        Severity,
    },
    error::{
        BuildResult,
        IoResultExt,
    },
};

/// Errors and warnings found in results files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeReport {
    /// Results files that were read
    pub files:    Vec<PathBuf>,
    pub errors:   Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl ScrapeReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Print both listings the way the build has always reported them
    pub fn print_human(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(out, "{}", "Any Errors in compilation are stated here...".bold())?;
        for finding in &self.errors {
            writeln!(out, "{}", finding.to_string().bright_red())?;
        }
        writeln!(out, "{}", "Any warnings in compilation are stated here...".bold())?;
        for finding in &self.warnings {
            writeln!(out, "{}", finding.to_string().bright_yellow())?;
        }
        Ok(())
    }
}

/// All files named `name` below `root`, sorted by path
pub fn find_results_files(root: &Path, name: &str) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == name)
        .map(|e| e.into_path())
        .collect()
}

/// Lines of `content` containing the severity's marker
pub fn matching_lines(file: &Path, content: &str, severity: Severity) -> Vec<Finding> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| line.contains(severity.marker()))
        .map(|(index, line)| Finding {
            file: file.to_path_buf(),
            line: index + 1,
            severity,
            text: line.to_string(),
        })
        .collect()
}

/// Scrape every results file named `name` below `root`
pub fn scrape(root: &Path, name: &str) -> BuildResult<ScrapeReport> {
    let mut report = ScrapeReport::default();

    for file in find_results_files(root, name) {
        let bytes = std::fs::read(&file).at_path(&file)?;
        let content = String::from_utf8_lossy(&bytes);
        report.errors.extend(matching_lines(&file, &content, Severity::Error));
        report.warnings.extend(matching_lines(&file, &content, Severity::Warning));
        report.files.push(file);
    }

    tracing::info!(
        files = report.files.len(),
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "scraped results files"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_lists_errors_then_warnings() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("a/latex")).unwrap();
        std::fs::create_dir_all(root.join("b/latex")).unwrap();
        std::fs::write(
            root.join("a/latex/buildresult"),
            "This is TeX\nLaTeX Warning: Reference `fig:1' undefined\nOutput written\n",
        )
        .unwrap();
        std::fs::write(root.join("b/latex/buildresult"), "! LaTeX Error: Missing \\begin{document}\n")
            .unwrap();
        std::fs::write(root.join("b/latex/other.log"), "Error everywhere\n").unwrap();

        let report = scrape(root, "buildresult").unwrap();

        assert_eq!(report.files.len(), 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].line, 1);
        assert!(report.errors[0].file.ends_with("b/latex/buildresult"));
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].line, 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_matching_is_case_sensitive_substring() {
        let content = "error: lowercase\nErrorHandler.cpp compiled\nWARNING shouting\n";
        let errors = matching_lines(Path::new("buildresult"), content, Severity::Error);
        let warnings = matching_lines(Path::new("buildresult"), content, Severity::Warning);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].text, "ErrorHandler.cpp compiled");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_human_output_has_both_banners() {
        let report = ScrapeReport {
            files:    vec![PathBuf::from("buildresult")],
            errors:   matching_lines(Path::new("buildresult"), "! Error here", Severity::Error),
            warnings: vec![],
        };
        colored::control::set_override(false);

        let mut out = Vec::new();
        report.print_human(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "Any Errors in compilation are stated here...\nbuildresult:1:! Error here\n\
             Any warnings in compilation are stated here...\n"
        );
    }

    #[test]
    fn test_empty_tree_is_clean() {
        let tmp = tempfile::tempdir().unwrap();
        let report = scrape(tmp.path(), "buildresult").unwrap();
        assert!(report.files.is_empty());
        assert!(report.is_clean());
    }
}
