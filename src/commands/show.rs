// Show commands - read persisted reports back from the data directory

use anyhow::Result;

use crate::cli::args::{ShowArgs, SuiteArgs};
use crate::config::ReportPaths;
use crate::report::{ReportReader, Status, Summary, TestSuite};

fn summary_line(summary: &Summary) -> String {
    format!(
        "{} tests: {} passed, {} failed, {} aborted, {} skipped",
        summary.tests, summary.passed, summary.failed, summary.aborted, summary.skipped
    )
}

pub fn handle_index(args: &ShowArgs, paths: &ReportPaths) -> Result<()> {
    let index = ReportReader::from_paths(paths).read_index()?;

    if args.is_json() {
        println!("{}", serde_json::to_string_pretty(&index)?);
        return Ok(());
    }

    println!("Report: {}", paths.index_file().display());
    println!("Generated: {}", index.time_stamp);
    if let Some(version) = &index.version {
        println!("Version: {}", version);
    }
    println!("Summary: {}", summary_line(&index.summary));
    println!("Suites: {}", index.links.test_suites.len());
    Ok(())
}

pub fn handle_suites(args: &ShowArgs, paths: &ReportPaths) -> Result<()> {
    let suites = ReportReader::from_paths(paths).suites()?;

    if args.is_json() {
        println!("{}", serde_json::to_string_pretty(&suites)?);
        return Ok(());
    }

    if suites.is_empty() {
        println!("No suites indexed");
    }
    for link in &suites {
        println!("{}\t{}", link.name, link.file);
    }
    Ok(())
}

pub fn handle_suite(args: &SuiteArgs, paths: &ReportPaths) -> Result<()> {
    let reader = ReportReader::from_paths(paths);
    let suite = if args.file {
        reader.read_suite_file(&args.name)?
    } else {
        reader.read_suite(&args.name)?
    };

    if args.is_json() {
        println!("{}", serde_json::to_string_pretty(&suite)?);
    } else {
        print_suite(&suite);
    }
    Ok(())
}

fn print_suite(suite: &TestSuite) {
    println!("{} ({})", suite.title, suite.name);
    println!("{}", summary_line(&suite.summary));
    for case in &suite.test_cases {
        let marker = match case.status {
            Status::Passed => "✅",
            Status::Failed => "❌",
            Status::Aborted => "⚠️ ",
            Status::Skipped => "⏭️ ",
        };
        println!("  {} {}", marker, case.wordify);
        if let Some(cause) = &case.cause {
            match &cause.message {
                Some(message) => println!("      {}: {}", cause.clazz.class_name, message),
                None => println!("      {}", cause.clazz.class_name),
            }
        }
    }
}
