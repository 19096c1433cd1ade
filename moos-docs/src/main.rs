//! moos-docs - documentation builder for the MOOS tree
//!
//! Typesets the LaTeX manuals, generates the doxygen API reference for the
//! MOOS libraries and lists every error and warning the tools reported.
//! Run it from the `Docs` directory, or point it there with `--root`.

mod output;

use std::path::PathBuf;

use anyhow::{
    Context,
    Result,
};
use clap::{
    Parser,
    Subcommand,
};
use colored::Colorize;
use moos_docs_core::{
    config::CONFIG_FILE_NAME,
    DocsBuildSystem,
    DocsConfig,
    RunOptions,
};
use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    FmtSubscriber,
};

use crate::output::{
    OutputFormat,
    OutputManager,
};

/// MOOS documentation builder
#[derive(Parser, Debug)]
#[command(name = "moos-docs")]
#[command(
    version,
    about = "Builds the MOOS LaTeX manuals and doxygen API documentation",
    long_about = "
Builds the MOOS LaTeX manuals and doxygen API documentation

Without a subcommand every step runs in order: LaTeX pass, doxygen pass,
then the report of all Error and Warning lines found in results files.

Examples:
  moos-docs                      # everything, from the Docs directory
  moos-docs latex --verbose      # LaTeX manuals only, echoing tool output
  moos-docs report --output json # scraped errors and warnings as JSON
  moos-docs tools                # check latex, dvipdf, doxygen and make
"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Echo captured tool output to the console
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Show commands being executed without running them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Trace all external commands being executed
    #[arg(long, global = true)]
    trace_commands: bool,

    /// Stop at the first failing command instead of reporting at the end
    #[arg(long, global = true)]
    fail_fast: bool,

    /// Docs root directory (default: detected from the current directory)
    #[arg(long, global = true, env = "MOOS_DOCS_ROOT")]
    root: Option<PathBuf>,

    /// Configuration file (default: <root>/moos-docs.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, global = true, value_enum, default_value = "human")]
    output: OutputFormatArg,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

/// Available output formats
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OutputFormatArg {
    /// Human-readable format with colors (default)
    Human,
    /// JSON format for tooling
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(format: OutputFormatArg) -> Self {
        match format {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// LaTeX pass, doxygen pass, then the report (default)
    All,

    /// Typeset every LaTeX directory
    Latex,

    /// Generate the doxygen API documentation
    Doxygen,

    /// List Error and Warning lines from all results files
    Report,

    /// Check that the external tools are installed
    Tools,

    /// Write the default configuration to <root>/moos-docs.toml
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(cli: &Cli, output: &OutputManager) -> Result<()> {
    if output.is_json() {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::ERROR)
            .with_writer(std::io::empty)
            .without_time()
            .finish();
        return tracing::subscriber::set_global_default(subscriber)
            .context("Failed to set silent tracing subscriber");
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("Invalid log level")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global default tracing subscriber")
}

fn build_system(cli: &Cli, output: &OutputManager) -> Result<DocsBuildSystem> {
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => moos_docs_core::detect_docs_root().or_else(|_| {
            std::env::current_dir().context("Failed to get current directory")
        })?,
    };

    let mut system = DocsBuildSystem::new(&root).context("Failed to initialize build system")?;
    if let Some(path) = &cli.config {
        let config = DocsConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?;
        system.set_config(config);
    }
    system.set_options(RunOptions {
        verbose:        cli.verbose,
        dry_run:        cli.dry_run,
        trace_commands: cli.trace_commands,
        keep_going:     !cli.fail_fast,
        quiet:          output.is_json(),
    });
    tracing::info!(root = %system.root().display(), "docs root");
    Ok(system)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = OutputManager::new(cli.output.into())
        .with_color(cli.output.is_human() && atty::is(atty::Stream::Stdout));
    init_logging(&cli, &output)?;

    if cli.verbose && !output.is_json() {
        println!("{} moos-docs v{}", "🚀".bright_blue(), moos_docs_core::VERSION);
        println!();
    }

    let system = build_system(&cli, &output)?;
    match cli.command.clone().unwrap_or(Commands::All) {
        Commands::All => cmd_all(&system, &output),
        Commands::Latex => cmd_latex(&system, &output),
        Commands::Doxygen => cmd_doxygen(&system, &output),
        Commands::Report => cmd_report(&system, &output),
        Commands::Tools => cmd_tools(&system, &output),
        Commands::Init { force } => cmd_init(&system, force),
    }
}

impl OutputFormatArg {
    fn is_human(self) -> bool {
        matches!(self, OutputFormatArg::Human)
    }
}

/// Everything, in the order the passes depend on each other
fn cmd_all(system: &DocsBuildSystem, output: &OutputManager) -> Result<()> {
    if !output.is_json() {
        system.tool_manager().warn_missing();
    }
    let summary = system.run_all().context("Documentation build failed")?;
    output.summary(&summary)
}

fn cmd_latex(system: &DocsBuildSystem, output: &OutputManager) -> Result<()> {
    let report = system.run_latex().context("LaTeX pass failed")?;
    output.latex_report(&report)
}

fn cmd_doxygen(system: &DocsBuildSystem, output: &OutputManager) -> Result<()> {
    let report = system.run_doxygen().context("Doxygen pass failed")?;
    output.doxygen_report(&report)
}

fn cmd_report(system: &DocsBuildSystem, output: &OutputManager) -> Result<()> {
    let report = system.scrape().context("Failed to scrape results files")?;
    output.scrape_report(&report)
}

fn cmd_tools(system: &DocsBuildSystem, output: &OutputManager) -> Result<()> {
    let manager = system.tool_manager();
    if output.is_json() {
        output.tool_statuses(&manager.check_all_tools())
    } else {
        manager.print_tool_status();
        Ok(())
    }
}

fn cmd_init(system: &DocsBuildSystem, force: bool) -> Result<()> {
    let path = system.root().join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let content = system.config().to_toml()?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} Wrote {}", "✅".bright_green(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_all() {
        let cli = Cli::try_parse_from(["moos-docs"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "warn");
        assert!(!cli.fail_fast);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "moos-docs",
            "latex",
            "--dry-run",
            "--fail-fast",
            "--root",
            "/tmp/Docs",
            "--output",
            "json",
        ])
        .unwrap();

        assert!(matches!(cli.command, Some(Commands::Latex)));
        assert!(cli.dry_run);
        assert!(cli.fail_fast);
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/Docs")));
        assert!(!cli.output.is_human());
    }

    #[test]
    fn test_init_force_flag() {
        let cli = Cli::try_parse_from(["moos-docs", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Init { force: true })));
    }
}
