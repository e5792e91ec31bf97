// CLI argument definitions using Clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Progress indicator modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    Dots,
    Bar,
    None,
    Verbose,
}

/// Extra renderings produced after the JSON data files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFormat {
    Markdown,
    JUnit,
}

impl RenderFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Some(Self::Markdown),
            "junit" | "xml" => Some(Self::JUnit),
            _ => None,
        }
    }
}

/// BDD test result aggregation and reporting
#[derive(Parser, Debug)]
#[command(name = "flowbdd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Aggregate BDD test results into JSON, Markdown and JUnit reports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose debug output
    #[arg(short = 'v', long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Base directory for data/ and report/ (overrides config and FLOWBDD_BASE_DIR)
    #[arg(short = 'b', long, global = true, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Show current configuration and exit
    #[arg(long, default_value_t = false)]
    pub config: bool,

    /// Create default configuration file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub init_config: Option<PathBuf>,

    /// Install shell completion (bash, zsh, fish, elvish, powershell)
    #[arg(long, value_name = "SHELL_TYPE", value_parser = ["bash", "zsh", "fish", "elvish", "powershell"])]
    pub completion: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay an NDJSON engine event stream and persist the report
    Ingest(IngestArgs),

    /// Show the run summary from index.json
    Index(ShowArgs),

    /// List indexed suites
    Suites(ShowArgs),

    /// Show one suite by class name, or by data file with --file
    Suite(SuiteArgs),

    /// Render Markdown or JUnit from the persisted data
    Render(RenderArgs),

    /// Check that index links and suite files on disk agree
    Verify(ShowArgs),
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// NDJSON file with one engine event per line ("-" for stdin)
    #[arg(required = true)]
    pub events: PathBuf,

    /// Record case events with N workers
    #[arg(short = 'p', long, default_value = "auto")]
    pub parallel: String,

    /// Give up on the run after N seconds (0 disables)
    #[arg(short = 't', long, default_value_t = 0)]
    pub timeout: u64,

    /// On timeout, write whatever has been recorded so far
    #[arg(long, default_value_t = false)]
    pub flush_partial: bool,

    /// Extra renderings to write (markdown, junit); defaults to the config file
    #[arg(long, value_name = "FORMAT", value_delimiter = ',')]
    pub format: Vec<String>,

    /// Output streaming JSON events instead of console progress
    #[arg(long, default_value_t = false)]
    pub stream: bool,

    /// Progress indicator style (auto, dots, bar, none)
    #[arg(long, default_value = "auto")]
    pub progress: String,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(Args, Debug, Clone)]
pub struct SuiteArgs {
    /// Fully-qualified class name, or data file name with --file
    #[arg(required = true)]
    pub name: String,

    /// Treat NAME as a data file name (TEST-<class>.json)
    #[arg(long, default_value_t = false)]
    pub file: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Renderings to produce (markdown, junit)
    #[arg(long, value_name = "FORMAT", value_delimiter = ',', default_value = "markdown")]
    pub format: Vec<String>,

    /// Output directory (defaults to the configured report directory)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// Progress mode for a progress setting
    pub fn progress_mode(&self, progress: &str) -> ProgressMode {
        match progress {
            "dots" => ProgressMode::Dots,
            "bar" => ProgressMode::Bar,
            "none" => ProgressMode::None,
            "auto" => {
                if self.verbose {
                    ProgressMode::Verbose
                } else {
                    ProgressMode::Dots
                }
            }
            _ => ProgressMode::Dots,
        }
    }
}

impl IngestArgs {
    /// Get parallel job count (auto-detect if set to "auto")
    pub fn parallel_jobs(&self) -> usize {
        if self.parallel == "auto" {
            std::thread::available_parallelism()
                .ok()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.parallel.parse().unwrap_or(1).max(1)
        }
    }
}

fn is_json_format(value: &str) -> bool {
    value.eq_ignore_ascii_case("json")
}

impl ShowArgs {
    pub fn is_json(&self) -> bool {
        is_json_format(&self.format)
    }
}

impl SuiteArgs {
    pub fn is_json(&self) -> bool {
        is_json_format(&self.format)
    }
}

/// Parse format names, warning about unknown ones
pub fn render_formats(values: &[String]) -> Vec<RenderFormat> {
    let mut formats = Vec::new();
    for value in values {
        match RenderFormat::parse(value.trim()) {
            Some(format) if !formats.contains(&format) => formats.push(format),
            Some(_) => {}
            None => tracing::warn!("Unknown report format '{}' ignored", value),
        }
    }
    formats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_args_parse() {
        let cli = Cli::parse_from([
            "flowbdd",
            "--base-dir",
            "/tmp/x",
            "ingest",
            "events.ndjson",
            "--parallel",
            "3",
            "--format",
            "markdown,junit",
        ]);
        match cli.command {
            Some(Commands::Ingest(args)) => {
                assert_eq!(args.parallel_jobs(), 3);
                assert_eq!(
                    render_formats(&args.format),
                    vec![RenderFormat::Markdown, RenderFormat::JUnit]
                );
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.base_dir, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn test_render_formats_dedup_and_unknown() {
        let values = vec!["md".to_string(), "markdown".into(), "pdf".into()];
        assert_eq!(render_formats(&values), vec![RenderFormat::Markdown]);
    }

    #[test]
    fn test_parallel_zero_is_one() {
        let cli = Cli::parse_from(["flowbdd", "ingest", "e.ndjson", "-p", "0"]);
        match cli.command {
            Some(Commands::Ingest(args)) => assert_eq!(args.parallel_jobs(), 1),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
