// Render command - Markdown / JUnit from previously written data files

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::args::RenderArgs;
use crate::cli::render_formats;
use crate::config::ReportPaths;
use crate::report::ReportReader;

pub fn handle_render(args: &RenderArgs, paths: &ReportPaths) -> Result<()> {
    let report = ReportReader::from_paths(paths)
        .read_report()
        .with_context(|| format!("Failed to load report from {}", paths.data.display()))?;

    let formats = render_formats(&args.format);
    if formats.is_empty() {
        warn!("No known format requested; nothing rendered");
        return Ok(());
    }

    let output = args.output.clone().unwrap_or_else(|| paths.report.clone());
    for reporter in super::file_reporters(&formats, &output) {
        reporter.on_run_finished(&report)?;
        info!("Rendered {} report into {}", reporter.name(), output.display());
    }

    println!("Report rendered to {}", output.display());
    Ok(())
}
