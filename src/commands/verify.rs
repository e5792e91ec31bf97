// Verify command - compare index links with the suite files on disk

use anyhow::Result;

use crate::cli::args::ShowArgs;
use crate::config::ReportPaths;
use crate::report::ReportReader;

/// Returns whether the data directory is consistent
pub fn handle_verify(args: &ShowArgs, paths: &ReportPaths) -> Result<bool> {
    let reader = ReportReader::from_paths(paths);
    let consistency = reader.verify()?;

    if args.is_json() {
        println!("{}", serde_json::to_string_pretty(&consistency)?);
        return Ok(consistency.is_clean());
    }

    if consistency.is_clean() {
        println!("✅ {} is consistent", reader.data_dir().display());
        return Ok(true);
    }

    for file in &consistency.missing {
        println!("❌ missing: {}", file);
    }
    for file in &consistency.orphaned {
        println!("⚠️  not indexed: {}", file);
    }
    Ok(false)
}
