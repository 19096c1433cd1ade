//! Configuration management for the documentation build

use std::path::{
    Path,
    PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::error::{
    BuildError,
    BuildResult,
};

/// Name of the optional configuration file looked up in the docs root
pub const CONFIG_FILE_NAME: &str = "moos-docs.toml";

/// Names, paths and programs used by the passes.
///
/// Relative paths are resolved against the docs root (the directory the
/// build starts from).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Per-directory results file collecting tool output
    pub results_file: String,
    /// Style file whose presence marks a generated LaTeX directory
    pub style_marker: String,
    /// Directory-name suffix selecting LaTeX directories
    pub latex_suffix: String,
    /// Directory name that is never processed
    pub excluded_dir: String,
    /// Number of typesetting runs per `.tex` file
    pub latex_passes: usize,
    /// Parent directory walked for doxygen projects
    pub source_root:  PathBuf,
    /// Project directory names documented with doxygen
    pub projects:     Vec<String>,
    /// Directory name holding generated documentation
    pub docs_dir:     String,
    /// Destination segment replacing the parent reference of a source path
    pub destination:  PathBuf,
    /// Doxygen configuration template
    pub template:     String,
    /// Rendered doxygen configuration, overwritten on every project
    pub rendered:     String,
    /// Image copied into each generated `html` directory
    pub header_image: PathBuf,
    /// DVI file produced by `make` in the generated `latex` directory
    pub refman:       String,
    /// External programs
    pub tools:        ToolCommands,
}

/// Programs invoked by the passes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolCommands {
    /// Typesetting engine
    pub latex:   String,
    /// DVI to PDF converter
    pub dvipdf:  String,
    /// Documentation generator
    pub doxygen: String,
    /// Build tool run in the generated LaTeX directory
    pub make:    String,
}

impl Default for ToolCommands {
    fn default() -> Self {
        Self {
            latex:   "latex".to_string(),
            dvipdf:  "dvipdf".to_string(),
            doxygen: "doxygen".to_string(),
            make:    "make".to_string(),
        }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            results_file: "buildresult".to_string(),
            style_marker: "doxygen.sty".to_string(),
            latex_suffix: "latex".to_string(),
            excluded_dir: "Legacy".to_string(),
            latex_passes: 2,
            source_root:  PathBuf::from(".."),
            projects:     vec!["MOOSLIB".to_string(), "MOOSGenLib".to_string()],
            docs_dir:     "Docs".to_string(),
            destination:  PathBuf::from("Docs").join("Source"),
            template:     "Template.doxy".to_string(),
            rendered:     "MOOS.doxy".to_string(),
            header_image: PathBuf::from("resources").join("moose7.gif"),
            refman:       "refman.dvi".to_string(),
            tools:        ToolCommands::default(),
        }
    }
}

impl DocsConfig {
    /// Load configuration from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> BuildResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BuildError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| BuildError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> BuildResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| BuildError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `moos-docs.toml` from the docs root, or fall back to defaults
    pub fn load_or_default(root: &Path) -> BuildResult<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading configuration");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Serialize to TOML, as written by `moos-docs init`
    pub fn to_toml(&self) -> BuildResult<String> {
        toml::to_string_pretty(self).map_err(|e| BuildError::Config(e.to_string()))
    }

    fn validate(&self) -> BuildResult<()> {
        if self.results_file.is_empty() {
            return Err(BuildError::Config("results_file must not be empty".to_string()));
        }
        if self.latex_passes == 0 {
            return Err(BuildError::Config("latex_passes must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Run-time options, independent of the tree being built
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Echo captured tool output to the console
    pub verbose:        bool,
    /// Show commands without executing them
    pub dry_run:        bool,
    /// Trace all external commands being executed
    pub trace_commands: bool,
    /// Continue after a failed command and report at the end
    pub keep_going:     bool,
    /// Keep stdout free of progress lines (machine-readable output)
    pub quiet:          bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            verbose:        false,
            dry_run:        false,
            trace_commands: false,
            keep_going:     true,
            quiet:          false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_docs_config() {
        let config = DocsConfig::default();
        assert_eq!(config.results_file, "buildresult");
        assert_eq!(config.style_marker, "doxygen.sty");
        assert_eq!(config.latex_passes, 2);
        assert_eq!(config.projects, vec!["MOOSLIB", "MOOSGenLib"]);
        assert_eq!(config.destination, Path::new("Docs/Source"));
        assert_eq!(config.tools.latex, "latex");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let content = r#"
results_file = "latex.log"
projects = ["MOOSLIB"]

[tools]
latex = "pdflatex"
        "#;

        let config = DocsConfig::from_toml(content).unwrap();
        assert_eq!(config.results_file, "latex.log");
        assert_eq!(config.projects, vec!["MOOSLIB"]);
        assert_eq!(config.tools.latex, "pdflatex");
        assert_eq!(config.tools.dvipdf, "dvipdf");
        assert_eq!(config.template, "Template.doxy");
    }

    #[test]
    fn test_zero_latex_passes_rejected() {
        let err = DocsConfig::from_toml("latex_passes = 0").unwrap_err();
        assert!(matches!(err, BuildError::Config(_)));
    }

    #[test]
    fn test_toml_round_trip_of_defaults() {
        let config = DocsConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(DocsConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_load_or_default_without_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config = DocsConfig::load_or_default(tmp.path()).unwrap();
        assert_eq!(config, DocsConfig::default());
    }

    #[test]
    fn test_default_run_options_keep_going() {
        let options = RunOptions::default();
        assert!(options.keep_going);
        assert!(!options.dry_run);
    }
}
