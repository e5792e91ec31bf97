// Main entry point for flowbdd

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use flowbdd_report::cli::{Cli, Commands};
use flowbdd_report::commands;
use flowbdd_report::config::{self, Config, ReportPaths};
use flowbdd_report::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if cli.verbose {
        info!("Starting flowbdd v{}", env!("CARGO_PKG_VERSION"));
    }

    let loaded = Config::load();
    let config = loaded.clone().unwrap_or_default();
    let paths = ReportPaths::resolve(cli.base_dir.as_deref(), &config.paths);

    // Handle config flag
    if cli.config {
        print_config(loaded.as_ref(), &paths);
        return Ok(());
    }

    // Handle init_config flag
    if let Some(config_file) = &cli.init_config {
        let toml_content = Config::default().to_toml();
        std::fs::write(config_file, toml_content)?;
        println!("Configuration file created: {}", config_file.display());
        println!("\nYou can now edit the file to customize your settings.");
        return Ok(());
    }

    // Handle completion flag
    if let Some(shell_type) = &cli.completion {
        return commands::handle_completion(shell_type);
    }

    match &cli.command {
        Some(Commands::Ingest(args)) => {
            let outcome = commands::handle_ingest(&cli, args, &config, &paths).await?;
            if !outcome.all_passed() {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Commands::Index(args)) => commands::handle_index(args, &paths),
        Some(Commands::Suites(args)) => commands::handle_suites(args, &paths),
        Some(Commands::Suite(args)) => commands::handle_suite(args, &paths),
        Some(Commands::Render(args)) => commands::handle_render(args, &paths),
        Some(Commands::Verify(args)) => {
            if !commands::handle_verify(args, &paths)? {
                std::process::exit(1);
            }
            Ok(())
        }
        None => {
            warn!("No command given. Use 'flowbdd --help' for usage.");
            Ok(())
        }
    }
}

fn print_config(loaded: Option<&Config>, paths: &ReportPaths) {
    println!("Current configuration:");
    println!("\n  Report locations:");
    println!("    Base directory: {} ({})", paths.base.display(), paths.source);
    println!("    Data directory: {}", paths.data.display());
    println!("    Report directory: {}", paths.report.display());

    match loaded {
        Some(cfg) => {
            println!("\n  Configuration file loaded:");
            if let Some(base) = &cfg.paths.base_dir {
                println!("    Base dir: {}", base.display());
            }
            if !cfg.report.formats.is_empty() {
                println!("    Formats: {}", cfg.report.formats.join(", "));
            }
            println!(
                "    Console summary: {}",
                if cfg.report.console { "enabled" } else { "disabled" }
            );
        }
        None => {
            println!("\n  No configuration file loaded");
            println!("  Create one with: flowbdd --init-config .flowbddrc.toml");
        }
    }

    println!("\n  Environment variables:");
    match std::env::var(config::ENV_FLOWBDD_BASE_DIR) {
        Ok(dir) => println!("    {}: {}", config::ENV_FLOWBDD_BASE_DIR, dir),
        Err(_) => println!("    {}: not set", config::ENV_FLOWBDD_BASE_DIR),
    }

    println!("\nBase directory precedence:");
    println!("  1. --base-dir (highest)");
    println!("  2. Configuration file [paths] base_dir");
    println!("  3. {}", config::ENV_FLOWBDD_BASE_DIR);
    println!("  4. <temp>/{} (lowest)", config::DEFAULT_BASE_NAME);
}
