//! Error types for the documentation build

use std::path::PathBuf;

/// Errors that stop a documentation build.
///
/// Failing external commands are not errors by themselves: their outcome is
/// returned to the caller, which only turns it into
/// [`BuildError::CommandFailed`] when asked to stop on the first failure.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("I/O error at '{}': {source}", .path.display())]
    Io {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("template error: {0}")]
    Template(String),

    #[error("command `{command}` failed ({status})")]
    CommandFailed { command: String, status: String },

    #[error("workspace error: {0}")]
    Workspace(String),
}

/// Result alias used across the core crate
pub type BuildResult<T> = Result<T, BuildError>;

impl BuildError {
    /// Wrap an I/O error together with the path it concerns
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Attach a path to a bare `io::Result`
pub(crate) trait IoResultExt<T> {
    fn at_path(self, path: impl Into<PathBuf>) -> BuildResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn at_path(self, path: impl Into<PathBuf>) -> BuildResult<T> {
        self.map_err(|e| BuildError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mentions_path() {
        let err = BuildError::io(
            "/tmp/Template.doxy",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        let message = err.to_string();
        assert!(message.contains("/tmp/Template.doxy"));
        assert!(message.contains("missing"));
    }

    #[test]
    fn test_command_failed_display() {
        let err = BuildError::CommandFailed {
            command: "latex main.tex".to_string(),
            status:  "exit status 1".to_string(),
        };
        assert_eq!(err.to_string(), "command `latex main.tex` failed (exit status 1)");
    }
}
