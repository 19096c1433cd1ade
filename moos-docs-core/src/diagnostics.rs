//! Diagnostics scraped from tool output

use std::{
    fmt,
    path::PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};

/// Severity of a scraped line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Line mentions `Error`
    Error,
    /// Line mentions `Warning`
    Warning,
}

impl Severity {
    /// Literal marker searched for in results files. Matching is
    /// case-sensitive and not anchored to word boundaries.
    pub fn marker(self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One matching line of a results file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Results file the line came from
    pub file:     PathBuf,
    /// Line number (1-indexed)
    pub line:     usize,
    pub severity: Severity,
    /// The line as written by the tool
    pub text:     String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }

    #[test]
    fn test_finding_display_matches_grep_style() {
        let finding = Finding {
            file:     PathBuf::from("proj/latex/buildresult"),
            line:     12,
            severity: Severity::Error,
            text:     "! LaTeX Error: File `foo.sty' not found.".to_string(),
        };
        assert_eq!(
            finding.to_string(),
            "proj/latex/buildresult:12:! LaTeX Error: File `foo.sty' not found."
        );
    }
}
