//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `cms_version_scanner` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use cms_version_scanner::config::{
    BuildCandidatesArgs, Cli, Command, ReleasesArgs, ScanArgs, IDENTIFIER_LIMIT,
};
use cms_version_scanner::initialization::{init_api_client, init_logger_with};
use cms_version_scanner::{
    rebuild_candidates, run_scan, update_database, ReleaseRegistry, ScanConfig, ScanResult,
    UpdateConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists), e.g. RUST_LOG
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();
    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = dispatch(cli.command).await {
        eprintln!("cms_version_scanner error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Scan(args) => scan(&args).await,
        Command::UpdateDatabase(args) => {
            let config = UpdateConfig::from(&args);
            let registry = ReleaseRegistry::with_defaults(init_api_client()?);
            let summary = update_database(&config, &registry).await?;
            println!(
                "Ingested {} release{}, {} release tree{} missing",
                summary.ingested.len(),
                if summary.ingested.len() == 1 { "" } else { "s" },
                summary.missing_trees,
                if summary.missing_trees == 1 { "" } else { "s" },
            );
            println!("Candidates saved in {}", config.candidates_path.display());
            Ok(())
        }
        Command::BuildCandidates(BuildCandidatesArgs {
            signatures,
            candidates,
        }) => {
            let database = rebuild_candidates(&signatures, &candidates, IDENTIFIER_LIMIT).await?;
            for (family, built) in &database.families {
                println!("{}: {} identifier files", family, built.identifier.len());
            }
            println!("Candidates saved in {}", candidates.display());
            Ok(())
        }
        Command::Releases(ReleasesArgs { family }) => {
            let registry = ReleaseRegistry::with_defaults(init_api_client()?);
            let provider = registry.require(&family)?;
            for branch in provider.latest_branches().await? {
                println!(
                    "{:<8} latest {:<12} {}",
                    branch.branch,
                    branch.latest_version,
                    if branch.supported { "supported" } else { "unsupported" }
                );
            }
            Ok(())
        }
    }
}

async fn scan(args: &ScanArgs) -> Result<()> {
    let config = ScanConfig::from(args);
    let result = run_scan(&config).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

fn print_result(result: &ScanResult) {
    let Some(cms) = &result.cms else {
        println!("No CMS detected");
        return;
    };
    println!("CMS: {}", cms);
    if result.versions.is_empty() {
        println!("Version: unknown");
    }

    let show = |value: Option<String>| value.unwrap_or_else(|| "Unknown".to_string());
    for (version, details) in &result.versions {
        println!(
            "Version {}: latest {}, is latest {}, supported {}",
            version,
            show(details.latest_in_branch.clone()),
            show(details.is_latest.map(|b| b.to_string())),
            show(details.supported.map(|b| b.to_string())),
        );
    }
}
