//! Doxygen configuration template
//!
//! The template is an ordinary doxygen configuration file with three
//! placeholder tokens. Rendering replaces all of them in one scan of the
//! text, so a substituted value is never scanned again: the result does not
//! depend on the order of the tokens, and a value that happens to contain
//! token text is inserted literally.

use std::{
    path::Path,
    sync::OnceLock,
};

use regex::{
    Captures,
    Regex,
};

use crate::error::{
    BuildError,
    BuildResult,
    IoResultExt,
};

/// Placeholder for the project name
pub const PROJECT_NAME_TOKEN: &str = "$PROJECTNAME";
/// Placeholder for the output directory
pub const DOC_DIR_TOKEN: &str = "$DOCDIR";
/// Placeholder for the input directory
pub const SOURCE_DIR_TOKEN: &str = "$SOURCEDIR";

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let alternatives = [PROJECT_NAME_TOKEN, DOC_DIR_TOKEN, SOURCE_DIR_TOKEN]
            .iter()
            .map(|token| regex::escape(token))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&alternatives).expect("placeholder pattern is valid")
    })
}

/// Values substituted into the template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateValues {
    pub project_name: String,
    pub doc_dir:      String,
    pub source_dir:   String,
}

impl TemplateValues {
    fn value_for(&self, token: &str) -> &str {
        match token {
            PROJECT_NAME_TOKEN => &self.project_name,
            DOC_DIR_TOKEN => &self.doc_dir,
            _ => &self.source_dir,
        }
    }
}

/// A loaded doxygen template
#[derive(Debug, Clone)]
pub struct DoxyTemplate {
    text: String,
}

impl DoxyTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Read the template file. A missing template stops the build.
    pub fn load(path: &Path) -> BuildResult<Self> {
        if !path.is_file() {
            return Err(BuildError::Template(format!(
                "template not found: {}",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path).at_path(path)?;
        Ok(Self { text })
    }

    /// Substitute every placeholder
    pub fn render(&self, values: &TemplateValues) -> String {
        token_pattern()
            .replace_all(&self.text, |caps: &Captures<'_>| values.value_for(&caps[0]).to_string())
            .into_owned()
    }

    /// Render and write to `path`, replacing any earlier rendering
    pub fn write_rendered(&self, path: &Path, values: &TemplateValues) -> BuildResult<()> {
        std::fs::write(path, self.render(values)).at_path(path)
    }
}
