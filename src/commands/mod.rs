// Commands module - handles CLI command execution

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

pub mod ingest;
pub mod render;
pub mod show;
pub mod verify;

pub use ingest::handle_ingest;
pub use render::handle_render;
pub use show::{handle_index, handle_suite, handle_suites};
pub use verify::handle_verify;

use crate::cli::RenderFormat;
use crate::report::{JunitReporter, MarkdownReporter, Reporter};

/// Handle shell completion
pub fn handle_completion(shell_type: &str) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{Shell, generate};

    let shell = match shell_type.to_lowercase().as_str() {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "elvish" => Shell::Elvish,
        "powershell" => Shell::PowerShell,
        _ => {
            anyhow::bail!(
                "Unsupported shell: {}. Supported: bash, zsh, fish, elvish, powershell",
                shell_type
            );
        }
    };

    let mut cmd = crate::cli::Cli::command();
    let name = cmd.get_name().to_string();
    let mut stdout = std::io::stdout();

    generate(shell, &mut cmd, name, &mut stdout);

    Ok(())
}

/// File reporters for the requested renderings, rooted at `report_dir`
pub fn file_reporters(formats: &[RenderFormat], report_dir: &Path) -> Vec<Arc<dyn Reporter>> {
    formats
        .iter()
        .map(|format| -> Arc<dyn Reporter> {
            match format {
                RenderFormat::Markdown => Arc::new(MarkdownReporter::new(report_dir.to_path_buf())),
                RenderFormat::JUnit => Arc::new(JunitReporter::new(report_dir.join("junit.xml"))),
            }
        })
        .collect()
}
