//! External tool detection
//!
//! The build shells out to a typesetting engine, a DVI converter, doxygen
//! and make. This module finds them on `PATH` and reports what is missing
//! together with a hint on how to install it. A missing tool does not stop
//! the build: its launch failure is logged in the results file instead.

use std::{
    path::{
        Path,
        PathBuf,
    },
    process::{
        Command,
        Stdio,
    },
};

use colored::Colorize;
use serde::Serialize;

use crate::config::DocsConfig;

/// Information about an external tool
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Program name as invoked
    pub name:            String,
    /// Description of what the tool does
    pub description:     String,
    /// Installation command or instructions
    pub install_command: String,
    /// Flag printing the tool's version
    pub version_flag:    &'static str,
    /// Which passes need this tool
    pub used_by:         Vec<&'static str>,
}

/// Tool detection results
#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub name:      String,
    /// Whether the tool is available
    pub available: bool,
    /// Resolved location on `PATH`
    pub path:      Option<PathBuf>,
    /// First line of the version output, if any
    pub version:   Option<String>,
}

/// Tool manager for detecting external dependencies
#[derive(Debug)]
pub struct ToolManager {
    tools: Vec<ToolInfo>,
}

impl ToolManager {
    /// Tools named by the configuration
    pub fn new(config: &DocsConfig) -> Self {
        let tools = &config.tools;
        let tex_hint = "Install a TeX distribution (e.g. `apt install texlive`)";

        Self {
            tools: vec![
                ToolInfo {
                    name:            tools.latex.clone(),
                    description:     "LaTeX typesetting engine".to_string(),
                    install_command: tex_hint.to_string(),
                    version_flag:    "--version",
                    used_by:         vec!["latex"],
                },
                ToolInfo {
                    name:            tools.dvipdf.clone(),
                    description:     "DVI to PDF converter (ghostscript)".to_string(),
                    install_command: "Install ghostscript (e.g. `apt install ghostscript`)"
                        .to_string(),
                    version_flag:    "--help",
                    used_by:         vec!["latex", "doxygen"],
                },
                ToolInfo {
                    name:            tools.doxygen.clone(),
                    description:     "API documentation generator".to_string(),
                    install_command: "Install doxygen from https://www.doxygen.nl/ or via package \
                                      manager"
                        .to_string(),
                    version_flag:    "--version",
                    used_by:         vec!["doxygen"],
                },
                ToolInfo {
                    name:            tools.make.clone(),
                    description:     "Build tool for the generated LaTeX reference".to_string(),
                    install_command: "Install make (e.g. `apt install make`)".to_string(),
                    version_flag:    "--version",
                    used_by:         vec!["doxygen"],
                },
            ],
        }
    }

    pub fn tools(&self) -> &[ToolInfo] {
        &self.tools
    }

    /// Check whether one tool is on `PATH`
    pub fn check_tool(&self, tool: &ToolInfo) -> ToolStatus {
        match which::which(&tool.name) {
            Ok(path) => ToolStatus {
                name:      tool.name.clone(),
                available: true,
                version:   probe_version(&path, tool.version_flag),
                path:      Some(path),
            },
            Err(_) => ToolStatus {
                name:      tool.name.clone(),
                available: false,
                path:      None,
                version:   None,
            },
        }
    }

    /// Check all tools
    pub fn check_all_tools(&self) -> Vec<ToolStatus> {
        self.tools.iter().map(|t| self.check_tool(t)).collect()
    }

    /// Tools not found on `PATH`
    pub fn missing_tools(&self) -> Vec<&ToolInfo> {
        self.tools.iter().filter(|t| which::which(&t.name).is_err()).collect()
    }

    /// Print a tool status report
    pub fn print_tool_status(&self) {
        println!("{} Tool Status Report", "🔧".bright_blue());
        println!();

        for tool in &self.tools {
            let status = self.check_tool(tool);
            if status.available {
                println!(
                    "  {} {:<10} {}",
                    "✓".bright_green(),
                    tool.name,
                    status.version.as_deref().unwrap_or("(version unknown)").bright_black()
                );
            } else {
                println!("  {} {:<10} {}", "✗".bright_red(), tool.name, tool.description);
                println!("      {} {}", "install:".bright_blue(), tool.install_command.bright_green());
            }
            println!("      used by: {}", tool.used_by.join(", "));
        }
    }

    /// Warn about missing tools before a run
    pub fn warn_missing(&self) {
        for tool in self.missing_tools() {
            println!(
                "{} {} not found on PATH ({}); its steps will be reported as errors",
                "⚠️".bright_yellow(),
                tool.name.bright_yellow(),
                tool.install_command
            );
            tracing::warn!(tool = %tool.name, "tool not found");
        }
    }
}

fn probe_version(path: &Path, flag: &str) -> Option<String> {
    let output = Command::new(path).arg(flag).stdin(Stdio::null()).output().ok()?;
    let text = if output.stdout.is_empty() { output.stderr } else { output.stdout };
    String::from_utf8_lossy(&text)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tools_follow_configuration() {
        let mut config = DocsConfig::default();
        config.tools.latex = "pdflatex".to_string();

        let manager = ToolManager::new(&config);
        let names: Vec<_> = manager.tools().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["pdflatex", "dvipdf", "doxygen", "make"]);
    }

    #[test]
    fn test_unknown_tool_is_missing() {
        let mut config = DocsConfig::default();
        config.tools.doxygen = "moos-docs-no-such-doxygen".to_string();

        let manager = ToolManager::new(&config);
        let missing = manager.missing_tools();
        assert!(missing.iter().any(|t| t.name == "moos-docs-no-such-doxygen"));

        let doxygen = &manager.tools()[2];
        let status = manager.check_tool(doxygen);
        assert!(!status.available);
        assert!(status.path.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_is_found() {
        let mut config = DocsConfig::default();
        config.tools.make = "sh".to_string();

        let manager = ToolManager::new(&config);
        let status = manager.check_tool(&manager.tools()[3]);
        assert!(status.available);
    }
}
