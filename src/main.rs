// Installment Tracker - operator CLI
//
// Maintenance commands against the configured SQLite database:
// schema setup, a one-off reconciliation run, manual propagation, the
// client status count and the dashboard figures.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use installment_tracker::{
    BulkStateReconciler, ClientId, Config, InstallmentService, QuotaId, SaleId, SqliteStore,
    StatePropagator,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "installment-tracker", version, about = "Installment sales state tracker")]
struct Cli {
    /// SQLite database path (overrides INSTALLMENTS_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database schema
    Init,
    /// Run one full reconciliation and print the report
    Reconcile,
    /// Recompute state starting from one entity
    Propagate {
        #[command(subcommand)]
        target: Target,
    },
    /// Number of clients per state
    StatusCount,
    /// Dashboard collection figures for the current month
    Dashboard,
}

#[derive(Subcommand)]
enum Target {
    /// Quota, then its sale and client
    Quota { id: String },
    /// Sale only (its client is not touched)
    Sale { id: String },
    /// Client from all of its sales
    Client { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    if let Some(dir) = config.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let store = Arc::new(
        SqliteStore::open(&config.db_path, config.store_timeout)
            .with_context(|| format!("Failed to open database {}", config.db_path.display()))?,
    );

    match cli.command {
        Command::Init => {
            println!("✓ Database ready at {} (WAL mode)", config.db_path.display());
        }
        Command::Reconcile => {
            let reconciler =
                BulkStateReconciler::with_concurrency(store, config.reconcile_concurrency);
            let report = reconciler
                .run_full_reconciliation()
                .await
                .context("Reconciliation failed")?;
            println!("{}", report.summary());
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Propagate { target } => run_propagate(store, target)?,
        Command::StatusCount => {
            let counts = InstallmentService::new(store).client_status_counts()?;
            for count in counts {
                println!("{:<10} {}", count.state, count.client_count);
            }
        }
        Command::Dashboard => {
            let stats = InstallmentService::new(store).dashboard_stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}

fn run_propagate(store: Arc<SqliteStore>, target: Target) -> Result<()> {
    let propagator = StatePropagator::new(store);

    match target {
        Target::Quota { id } => {
            let id: QuotaId = id.parse()?;
            let state = propagator
                .propagate_from_quota(id)
                .with_context(|| format!("Propagation from quota {} failed", id))?;
            println!("✓ quota {}: paid={} state={}", id, state.is_paid, state.state);
        }
        Target::Sale { id } => {
            let id: SaleId = id.parse()?;
            let state = propagator
                .propagate_from_sale(id)
                .with_context(|| format!("Propagation from sale {} failed", id))?;
            println!("✓ sale {}: paid={} state={}", id, state.is_paid, state.state);
        }
        Target::Client { id } => {
            let id: ClientId = id.parse()?;
            let state = propagator
                .propagate_from_client(id)
                .with_context(|| format!("Propagation from client {} failed", id))?;
            println!("✓ client {}: state={}", id, state);
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
