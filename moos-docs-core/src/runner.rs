//! External command execution
//!
//! Every tool invocation goes through [`CommandRunner`]. Commands run one at
//! a time, blocking until they finish, in an explicit working directory.
//! Their combined stdout and stderr either go to the console or are appended
//! to a [`ResultsLog`], the per-directory results file later scraped for
//! `Error` and `Warning` lines.

use std::{
    fmt,
    fs::{
        File,
        OpenOptions,
    },
    io::Write,
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

use crate::{
    config::RunOptions,
    error::{
        BuildError,
        BuildResult,
        IoResultExt,
    },
};

/// A program with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    /// Program name or path
    pub program: String,
    /// Arguments passed verbatim
    pub args:    Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args:    Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Results file of one directory
#[derive(Debug, Clone)]
pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    /// Start a new results file in `dir`, deleting whatever a previous run
    /// left there
    pub fn fresh(dir: &Path, name: &str) -> BuildResult<Self> {
        let path = dir.join(name);
        if path.exists() {
            tracing::debug!(path = %path.display(), "removing existing results file");
            std::fs::remove_file(&path).at_path(&path)?;
        }
        File::create(&path).at_path(&path)?;
        Ok(Self { path })
    }

    /// Refer to a results file without touching it
    pub fn existing(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_append(&self) -> BuildResult<File> {
        OpenOptions::new().create(true).append(true).open(&self.path).at_path(&self.path)
    }

    /// Append one line of text
    pub fn append_line(&self, line: &str) -> BuildResult<()> {
        let mut file = self.open_append()?;
        writeln!(file, "{}", line).at_path(&self.path)
    }

    fn len(&self) -> u64 {
        std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }
}

/// Where a command's output goes
#[derive(Debug, Clone, Copy)]
pub enum Capture<'a> {
    /// Share the console with the builder
    Inherit,
    /// Append combined stdout and stderr to a results file
    Log(&'a ResultsLog),
}

/// What happened to one external command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    /// Command line as displayed
    pub command:  String,
    /// Working directory the command ran in
    pub dir:      PathBuf,
    /// Exit code, if the process ran and exited normally
    pub code:     Option<i32>,
    /// Whether the process could be started at all
    pub launched: bool,
    /// Not executed (dry run)
    pub skipped:  bool,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.skipped || (self.launched && self.code == Some(0))
    }

    /// Short human description of the status
    pub fn status(&self) -> String {
        if self.skipped {
            "skipped".to_string()
        } else if !self.launched {
            "not launched".to_string()
        } else {
            match self.code {
                Some(code) => format!("exit status {}", code),
                None => "terminated by signal".to_string(),
            }
        }
    }
}

/// Runs external tools sequentially
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    options: RunOptions,
}

impl CommandRunner {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Print a progress line unless running quiet
    pub fn progress(&self, message: impl fmt::Display) {
        if !self.options.quiet {
            println!("{}", message);
        }
    }

    /// Run `command` in `dir` and wait for it.
    ///
    /// A non-zero exit status is reported in the outcome, not as an error.
    /// Only a failure to write the results file is an `Err`.
    pub fn run(
        &self,
        command: &ToolCommand,
        dir: &Path,
        capture: Capture<'_>,
    ) -> BuildResult<CommandOutcome> {
        let mut outcome = CommandOutcome {
            command:  command.to_string(),
            dir:      dir.to_path_buf(),
            code:     None,
            launched: false,
            skipped:  false,
        };

        if self.options.dry_run {
            self.progress(format_args!(
                "  {} (in {}) {}",
                "[dry-run]".bright_black(),
                dir.display(),
                command
            ));
            outcome.skipped = true;
            return Ok(outcome);
        }

        if self.options.trace_commands {
            self.progress(format_args!("  {} {}", "→".bright_black(), command.to_string().bright_black()));
        }
        tracing::debug!(command = %command, dir = %dir.display(), "running command");

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args).current_dir(dir).stdin(Stdio::null());

        let start_len = match capture {
            Capture::Log(log) => {
                let out = log.open_append()?;
                let err = out.try_clone().at_path(log.path())?;
                cmd.stdout(Stdio::from(out)).stderr(Stdio::from(err));
                log.len()
            },
            Capture::Inherit if self.options.quiet => {
                cmd.stdout(std::io::stderr());
                0
            },
            Capture::Inherit => 0,
        };

        match cmd.status() {
            Ok(status) => {
                outcome.launched = true;
                outcome.code = status.code();
            },
            Err(e) => {
                let message = format!("Error: failed to launch `{}`: {}", command, e);
                eprintln!("  {} {}", "✗".bright_red(), message);
                if let Capture::Log(log) = capture {
                    log.append_line(&message)?;
                }
            },
        }

        if let Capture::Log(log) = capture {
            if self.options.verbose && !self.options.quiet {
                echo_new_output(log, start_len)?;
            }
        }

        if !outcome.success() {
            tracing::warn!(command = %outcome.command, status = %outcome.status(), "command failed");
        }
        Ok(outcome)
    }

    /// Apply the failure policy to an outcome: under `keep_going` every
    /// outcome is accepted, otherwise a failed command stops the build.
    pub fn check(&self, outcome: &CommandOutcome) -> BuildResult<()> {
        if self.options.keep_going || outcome.success() {
            Ok(())
        } else {
            Err(BuildError::CommandFailed {
                command: outcome.command.clone(),
                status:  outcome.status(),
            })
        }
    }
}

/// Print what a command appended to the results file, like `tee -a`
fn echo_new_output(log: &ResultsLog, start_len: u64) -> BuildResult<()> {
    let bytes = std::fs::read(log.path()).at_path(log.path())?;
    let start = (start_len as usize).min(bytes.len());
    print!("{}", String::from_utf8_lossy(&bytes[start..]));
    Ok(())
}
