//! Organization registry normalization runner
//!
//! Converts legacy organization records (embedded members and Base64
//! payloads) into the normalized member and document collections, or rolls
//! them back.
//!
//! ## Usage
//!
//! ```bash
//! # Preview what a migration would write
//! registry-migrate --dry-run
//!
//! # Migrate in batches of 25
//! registry-migrate --batch-size 25
//!
//! # Roll back one organization
//! registry-migrate --rollback --organization-id 6f1c...
//! ```
//!
//! Exit status: 0 when every record succeeded, 2 when some records failed,
//! 1 when the run could not start or was aborted.

use anyhow::Result;
use clap::Parser;
use org_registry::contract::{RecordFailure, RollbackSummary};
use org_registry::{Config, MigrationOptions, MigrationSummary, OrgRegistryModule};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "registry-migrate")]
#[command(about = "Normalize organization records or roll them back")]
struct Args {
    /// Plan and count without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Organizations per batch (overrides config)
    #[arg(long)]
    batch_size: Option<usize>,

    /// Process only this organization
    #[arg(long)]
    organization_id: Option<Uuid>,

    /// Revert normalized organizations to legacy reads
    #[arg(long)]
    rollback: bool,

    /// Path to YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database connection string (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.json_logs);

    match run(args).await {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            error!(failed, "some organizations failed; see the summary above");
            ExitCode::from(2)
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "run aborted");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Returns the number of failed organizations
async fn run(args: Args) -> Result<usize> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(url) = args.database_url {
        config.database_url = url;
    }
    let options = MigrationOptions {
        dry_run: args.dry_run,
        batch_size: args.batch_size.unwrap_or(config.batch_size),
        organization_id: args.organization_id,
    };

    let module = OrgRegistryModule::default();
    module.init(config).await?;
    let service = module.service()?;

    if args.rollback {
        info!(dry_run = options.dry_run, "rolling back organizations");
        let summary = service.run_rollback(&options).await?;
        print_rollback_summary(&summary);
        Ok(summary.errors)
    } else {
        info!(dry_run = options.dry_run, "migrating organizations");
        let summary = service.run_migration(&options).await?;
        print_migration_summary(&summary);
        Ok(summary.errors)
    }
}

fn print_migration_summary(summary: &MigrationSummary) {
    println!();
    println!("=== Migration summary{} ===", dry_run_tag(summary.dry_run));
    println!("  processed:          {}", summary.processed);
    println!("  migrated:           {}", summary.migrated);
    println!("  skipped (already):  {}", summary.skipped);
    println!("  errors:             {}", summary.errors);
    println!("  members created:    {}", summary.members_created);
    println!("  documents created:  {}", summary.documents_created);
    print_failures(&summary.failures);
}

fn print_rollback_summary(summary: &RollbackSummary) {
    println!();
    println!("=== Rollback summary{} ===", dry_run_tag(summary.dry_run));
    println!("  processed:          {}", summary.processed);
    println!("  rolled back:        {}", summary.rolled_back);
    println!("  skipped (legacy):   {}", summary.skipped);
    println!("  errors:             {}", summary.errors);
    println!("  members deleted:    {}", summary.members_deleted);
    println!("  documents deleted:  {}", summary.documents_deleted);
    print_failures(&summary.failures);
}

fn print_failures(failures: &[RecordFailure]) {
    for failure in failures {
        println!("  ! {}: {}", failure.organization_id, failure.error);
    }
}

fn dry_run_tag(dry_run: bool) -> &'static str {
    if dry_run {
        " (dry run, nothing written)"
    } else {
        ""
    }
}
