//! Scoped changes of the process working directory
//!
//! The passes run each unit of work from inside its target directory. A
//! [`DirGuard`] changes into that directory and puts the previous working
//! directory back when it goes out of scope, so an early `?` return or an
//! unwinding panic never leaves the process somewhere unexpected.
//!
//! The working directory is process-wide state: guards must not be held from
//! several threads at once.

use std::path::{
    Path,
    PathBuf,
};

use scopeguard::ScopeGuard;

use crate::error::{
    BuildError,
    BuildResult,
    IoResultExt,
};

fn restore(previous: PathBuf) {
    if let Err(e) = std::env::set_current_dir(&previous) {
        tracing::error!(
            dir = %previous.display(),
            error = %e,
            "failed to restore working directory"
        );
    }
}

/// Working directory held for the lifetime of the guard
pub struct DirGuard {
    current:  PathBuf,
    previous: ScopeGuard<PathBuf, fn(PathBuf)>,
}

impl DirGuard {
    /// Change into `dir`, remembering the current working directory
    pub fn enter(dir: &Path) -> BuildResult<Self> {
        let previous = std::env::current_dir().at_path(".")?;
        let current = if dir.is_absolute() { dir.to_path_buf() } else { previous.join(dir) };

        if !current.is_dir() {
            return Err(BuildError::Workspace(format!(
                "directory not found: {}",
                current.display()
            )));
        }
        std::env::set_current_dir(&current).at_path(&current)?;
        tracing::trace!(from = %previous.display(), to = %current.display(), "entered directory");

        Ok(Self {
            current,
            previous: scopeguard::guard(previous, restore as fn(PathBuf)),
        })
    }

    /// Directory the guard changed into
    pub fn path(&self) -> &Path {
        &self.current
    }

    /// Directory that will be restored on drop
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl std::fmt::Debug for DirGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirGuard")
            .field("current", &self.current)
            .field("previous", &*self.previous)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_guard_restores_on_drop() {
        let tmp = tempfile::tempdir().unwrap();
        let start = std::env::current_dir().unwrap();
        let target = tmp.path().canonicalize().unwrap();

        {
            let guard = DirGuard::enter(&target).unwrap();
            assert_eq!(std::env::current_dir().unwrap().canonicalize().unwrap(), target);
            assert_eq!(guard.previous(), start.as_path());
        }

        assert_eq!(std::env::current_dir().unwrap(), start);
    }

    #[test]
    #[serial]
    fn test_guard_restores_on_early_return() {
        fn fails_inside(dir: &Path) -> BuildResult<()> {
            let _guard = DirGuard::enter(dir)?;
            Err(BuildError::Template("template not found".to_string()))
        }

        let tmp = tempfile::tempdir().unwrap();
        let start = std::env::current_dir().unwrap();

        assert!(fails_inside(tmp.path()).is_err());
        assert_eq!(std::env::current_dir().unwrap(), start);
    }

    #[test]
    #[serial]
    fn test_nested_guards_unwind_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let outer = tmp.path().canonicalize().unwrap();
        let inner = outer.join("latex");
        std::fs::create_dir(&inner).unwrap();
        let start = std::env::current_dir().unwrap();

        {
            let _outer = DirGuard::enter(&outer).unwrap();
            {
                let _inner = DirGuard::enter(Path::new("latex")).unwrap();
                assert_eq!(std::env::current_dir().unwrap().canonicalize().unwrap(), inner);
            }
            assert_eq!(std::env::current_dir().unwrap().canonicalize().unwrap(), outer);
        }
        assert_eq!(std::env::current_dir().unwrap(), start);
    }

    #[test]
    #[serial]
    fn test_missing_directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let start = std::env::current_dir().unwrap();

        let err = DirGuard::enter(&tmp.path().join("html")).unwrap_err();
        assert!(matches!(err, BuildError::Workspace(_)));
        assert_eq!(std::env::current_dir().unwrap(), start);
    }
}
